//! Construction options for [`JunctionFS`](crate::JunctionFS)

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options controlling how a [`JunctionFS`](crate::JunctionFS) splits and compares paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct JunctionOptions {
    /// Separator used to split path strings passed to the junction methods
    pub path_separator: char,
    /// If false, virtual paths and queries are lower-cased before comparison
    pub case_sensitive: bool,
    /// If true, `map_file` also maps the `.finf` and `.rsrc` companions of a file
    pub auto_junction_mac_files: bool,
}

impl Default for JunctionOptions {
    fn default() -> Self {
        JunctionOptions {
            path_separator: '/',
            case_sensitive: true,
            auto_junction_mac_files: false,
        }
    }
}

impl JunctionOptions {
    /// Create a new instance with the default options
    pub fn new() -> JunctionOptions {
        Default::default()
    }

    /// Split path strings on this separator
    pub fn path_separator(&mut self, path_separator: char) -> &mut JunctionOptions {
        self.path_separator = path_separator;
        self
    }

    /// Compare virtual paths case-sensitively
    pub fn case_sensitive(&mut self, case_sensitive: bool) -> &mut JunctionOptions {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Map Finder info and resource fork companions along with every file junction
    pub fn auto_junction_mac_files(&mut self, auto_junction_mac_files: bool) -> &mut JunctionOptions {
        self.auto_junction_mac_files = auto_junction_mac_files;
        self
    }
}
