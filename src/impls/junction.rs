//! A virtual file system routing virtual paths into other archives through junctions
//!
//! A junction maps a virtual path either onto a single physical file (a file junction) or
//! onto a whole physical directory (a directory junction) inside some [`Archive`]. Queries
//! are routed to the most specific junction that matches:
//!
//! * a file junction matches only the exact path it was registered for
//! * a directory junction matches every path strictly below its virtual path
//! * a junction with a longer virtual path always wins over a shorter one
//! * between equally long matches, the junction registered first wins
//!
//! The junction table is append-only. Archives are borrowed, never owned: every archive
//! handed to a `JunctionFS` must outlive it.

use crate::error::VfsErrorKind;
use crate::{
    Archive, ArchiveMemberList, ArchiveMemberPtr, ArchivePath, JunctionOptions, SeekAndRead,
    VfsError, VfsResult,
};
use std::fmt::{self, Debug, Formatter};
use tracing::{debug, trace, warn};

/// Suffix of the Finder info companion mapped along with each file junction
pub const FINDER_INFO_SUFFIX: &str = ".finf";
/// Suffix of the resource fork companion mapped along with each file junction
pub const RESOURCE_FORK_SUFFIX: &str = ".rsrc";

/// Whether a junction routes a single file or a directory subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionKind {
    File,
    Directory,
}

/// A single routing rule
#[derive(Clone)]
pub struct Junction<'a> {
    archive: &'a dyn Archive,
    virtual_path: ArchivePath,
    physical_path: ArchivePath,
    kind: JunctionKind,
}

impl Debug for Junction<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Junction")
            .field("kind", &self.kind)
            .field("virtual_path", &self.virtual_path.to_string())
            .field("physical_path", &self.physical_path.to_string())
            .field("archive", &self.archive)
            .finish()
    }
}

impl<'a> Junction<'a> {
    /// The archive this junction routes into
    pub fn archive(&self) -> &'a dyn Archive {
        self.archive
    }

    /// The virtual path, already lower-cased if the owning `JunctionFS` is case-insensitive
    pub fn virtual_path(&self) -> &ArchivePath {
        &self.virtual_path
    }

    pub fn physical_path(&self) -> &ArchivePath {
        &self.physical_path
    }

    pub fn kind(&self) -> JunctionKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.kind == JunctionKind::Directory
    }

    /// Maps a path this junction matched onto the physical path inside its archive
    ///
    /// # Panics
    ///
    /// For a directory junction, panics if `path` is not longer than the virtual path.
    /// Paths returned by [`JunctionFS::resolve`] always are.
    pub fn remap(&self, path: &ArchivePath) -> ArchivePath {
        match self.kind {
            JunctionKind::File => self.physical_path.clone(),
            JunctionKind::Directory => {
                let prefix_len = self.virtual_path.len();
                assert!(
                    path.len() > prefix_len,
                    "path '{}' is not below directory junction '{}'",
                    path,
                    self.virtual_path
                );
                let mut physical = self.physical_path.clone();
                for component in &path.components()[prefix_len..] {
                    physical.append_component(component.as_str());
                }
                physical
            }
        }
    }
}

/// A virtual file system mapping virtual paths onto members of other archives
///
/// `JunctionFS` is itself an [`Archive`], so one junction file system can back the junctions
/// of another.
pub struct JunctionFS<'a> {
    default_archive: &'a dyn Archive,
    junctions: Vec<Junction<'a>>,
    options: JunctionOptions,
}

impl Debug for JunctionFS<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("JunctionFS")
            .field("options", &self.options)
            .field("junctions", &self.junctions)
            .finish()
    }
}

impl<'a> JunctionFS<'a> {
    /// Create an empty junction file system
    ///
    /// `default_archive` backs the junctions created by [`map_file`](Self::map_file) and
    /// [`map_directory`](Self::map_directory).
    pub fn new(default_archive: &'a dyn Archive, options: JunctionOptions) -> Self {
        JunctionFS {
            default_archive,
            junctions: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> &JunctionOptions {
        &self.options
    }

    /// All junctions, in registration order
    pub fn junctions(&self) -> &[Junction<'a>] {
        &self.junctions
    }

    /// Splits `path` with the configured separator
    pub fn path(&self, path: &str) -> ArchivePath {
        ArchivePath::parse(path, self.options.path_separator)
    }

    /// Maps `virtual_path` onto the file `physical_path` of the default archive
    pub fn map_file(&mut self, virtual_path: &str, physical_path: &str) {
        self.map_file_in(self.default_archive, virtual_path, physical_path);
    }

    /// Maps `virtual_path` onto the file `physical_path` of `archive`
    ///
    /// With `auto_junction_mac_files` enabled, the `.finf` and `.rsrc` companions of the
    /// file are mapped as well.
    pub fn map_file_in(&mut self, archive: &'a dyn Archive, virtual_path: &str, physical_path: &str) {
        self.add_junction(archive, virtual_path, physical_path, JunctionKind::File);

        if self.options.auto_junction_mac_files {
            for suffix in [FINDER_INFO_SUFFIX, RESOURCE_FORK_SUFFIX] {
                self.add_junction(
                    archive,
                    &format!("{}{}", virtual_path, suffix),
                    &format!("{}{}", physical_path, suffix),
                    JunctionKind::File,
                );
            }
        }
    }

    /// Maps everything below `virtual_path` onto the directory `physical_path` of the
    /// default archive
    pub fn map_directory(&mut self, virtual_path: &str, physical_path: &str) {
        self.map_directory_in(self.default_archive, virtual_path, physical_path);
    }

    /// Maps everything below `virtual_path` onto the directory `physical_path` of `archive`
    pub fn map_directory_in(
        &mut self,
        archive: &'a dyn Archive,
        virtual_path: &str,
        physical_path: &str,
    ) {
        self.add_junction(archive, virtual_path, physical_path, JunctionKind::Directory);
    }

    fn add_junction(
        &mut self,
        archive: &'a dyn Archive,
        virtual_path: &str,
        physical_path: &str,
        kind: JunctionKind,
    ) {
        let junction = Junction {
            archive,
            virtual_path: self.normalize(self.path(virtual_path)),
            physical_path: self.path(physical_path),
            kind,
        };
        debug!(
            ?kind,
            virtual_path = %junction.virtual_path,
            physical_path = %junction.physical_path,
            "adding junction"
        );
        self.junctions.push(junction);
    }

    fn normalize(&self, path: ArchivePath) -> ArchivePath {
        if self.options.case_sensitive {
            path
        } else {
            path.to_lowercase()
        }
    }

    /// Finds the most specific junction matching `path`
    pub fn resolve(&self, path: &ArchivePath) -> Option<&Junction<'a>> {
        let query = if self.options.case_sensitive {
            None
        } else {
            Some(path.to_lowercase())
        };
        let query = query.as_ref().unwrap_or(path);

        let mut best: Option<&Junction<'a>> = None;
        let mut longest = 0;

        for junction in &self.junctions {
            let length = junction.virtual_path.len();

            // Only a strictly longer junction replaces the current best, so ties go to the
            // junction registered first
            if best.is_some() && length <= longest {
                continue;
            }

            let length_matches = match junction.kind {
                // Directory junctions only match paths strictly below them
                JunctionKind::Directory => length < query.len(),
                // File junctions must be exactly the requested length
                JunctionKind::File => length == query.len(),
            };
            if !length_matches {
                continue;
            }

            if query.starts_with(&junction.virtual_path) {
                longest = length;
                best = Some(junction);
            }
        }

        match best {
            Some(junction) => trace!(%path, virtual_path = %junction.virtual_path, "resolved"),
            None => debug!(%path, "no junction matches"),
        }
        best
    }

    // The junction for `path` along with the physical path inside its archive
    fn route(&self, path: &ArchivePath) -> Option<(&'a dyn Archive, ArchivePath)> {
        let junction = self.resolve(path)?;
        let physical = junction.remap(path);
        trace!(%path, %physical, "remapped");
        Some((junction.archive, physical))
    }

    /// Returns true if `path` resolves to a junction whose archive has the routed member
    pub fn exists(&self, path: &ArchivePath) -> bool {
        match self.route(path) {
            Some((archive, physical)) => archive.has_member(&physical),
            None => false,
        }
    }

    /// Looks up the member `path` is routed to
    pub fn lookup(&self, path: &ArchivePath) -> Option<ArchiveMemberPtr> {
        let (archive, physical) = self.route(path)?;
        archive.get_member(&physical)
    }

    /// Opens the member `path` is routed to, or `None` if there is none or it cannot be opened
    pub fn open_stream(&self, path: &ArchivePath) -> Option<Box<dyn SeekAndRead + Send>> {
        let member = self.lookup(path)?;
        match member.open_read_stream() {
            Ok(stream) => Some(stream),
            Err(error) => {
                warn!(%path, %error, "could not open member");
                None
            }
        }
    }

    /// Like [`open_stream`](Self::open_stream), but reports why nothing could be opened
    pub fn try_open_stream(&self, path: &ArchivePath) -> VfsResult<Box<dyn SeekAndRead + Send>> {
        let member = self.lookup(path).ok_or_else(|| {
            VfsError::from(VfsErrorKind::FileNotFound)
                .with_path(path.to_string())
                .with_context(|| "No member for virtual path")
        })?;
        member.open_read_stream()
    }

    /// Reads the whole member `path` is routed to
    pub fn read_to_bytes(&self, path: &ArchivePath) -> VfsResult<Vec<u8>> {
        let member = self.lookup(path).ok_or_else(|| {
            VfsError::from(VfsErrorKind::FileNotFound)
                .with_path(path.to_string())
                .with_context(|| "Could not read virtual path")
        })?;
        member.read_to_bytes()
    }

    /// Appends the members reachable through every junction to `list`
    ///
    /// Directory junctions contribute every member below their physical path, file junctions
    /// their single member if it exists. Members reachable through several junctions are
    /// appended once per junction. Returns the number of members appended.
    pub fn list_all(&self, list: &mut ArchiveMemberList) -> usize {
        let mut count = 0;

        for junction in &self.junctions {
            match junction.kind {
                JunctionKind::Directory => {
                    let mut pattern = junction.physical_path.clone();
                    pattern.append_component("*");
                    count += junction
                        .archive
                        .list_matching_members(list, &pattern, true);
                }
                JunctionKind::File => {
                    if let Some(member) = junction.archive.get_member(&junction.physical_path) {
                        list.push(member);
                        count += 1;
                    }
                }
            }
        }

        count
    }

    /// Appends the members whose virtual path matches `pattern`
    ///
    /// As with [`list_all`](Self::list_all), the members keep the paths of the archives they
    /// live in. Returns the number of members appended.
    pub fn list_matching(
        &self,
        list: &mut ArchiveMemberList,
        pattern: &ArchivePath,
        recursive: bool,
    ) -> usize {
        let literal = self.normalize(pattern.literal_prefix());
        let mut count = 0;

        for junction in &self.junctions {
            let virtual_path = &junction.virtual_path;
            match junction.kind {
                // The pattern names a directory at or below the junction: rewrite it
                JunctionKind::Directory
                    if literal.starts_with(virtual_path) && pattern.len() > virtual_path.len() =>
                {
                    let physical = junction.remap(pattern);
                    trace!(%pattern, %physical, "listing through junction");
                    count += junction
                        .archive
                        .list_matching_members(list, &physical, recursive);
                }
                // The junction lies below the literal part: list all of it and match the
                // virtual path of every member
                JunctionKind::Directory if virtual_path.starts_with(&literal) => {
                    let pattern = self.fold_prefix(pattern, virtual_path.len());
                    let mut everything = junction.physical_path.clone();
                    everything.append_component("*");
                    let mut candidates = ArchiveMemberList::new();
                    junction
                        .archive
                        .list_matching_members(&mut candidates, &everything, true);

                    let physical_len = junction.physical_path.len();
                    for member in candidates {
                        if !member.path().starts_with(&junction.physical_path) {
                            continue;
                        }
                        let mut path = virtual_path.clone();
                        for component in &member.path().components()[physical_len..] {
                            path.append_component(component.as_str());
                        }
                        if path.matches(&pattern, recursive) {
                            list.push(member);
                            count += 1;
                        }
                    }
                }
                JunctionKind::Directory => {}
                JunctionKind::File => {
                    let pattern = self.fold_prefix(pattern, pattern.len());
                    if !virtual_path.matches(&pattern, recursive) {
                        continue;
                    }
                    if let Some(member) = junction.archive.get_member(&junction.physical_path) {
                        list.push(member);
                        count += 1;
                    }
                }
            }
        }

        count
    }

    // Lower-cases the first `len` components of `pattern` when matching case-insensitively
    fn fold_prefix(&self, pattern: &ArchivePath, len: usize) -> ArchivePath {
        if self.options.case_sensitive {
            return pattern.clone();
        }
        let components = pattern.components();
        let split = len.min(components.len());
        ArchivePath::from_components(
            components[..split]
                .iter()
                .map(|component| component.to_ascii_lowercase())
                .chain(components[split..].iter().cloned()),
        )
    }
}

impl Archive for JunctionFS<'_> {
    fn has_member(&self, path: &ArchivePath) -> bool {
        self.exists(path)
    }

    fn get_member(&self, path: &ArchivePath) -> Option<ArchiveMemberPtr> {
        self.lookup(path)
    }

    fn list_members(&self, list: &mut ArchiveMemberList) -> usize {
        self.list_all(list)
    }

    fn list_matching_members(
        &self,
        list: &mut ArchiveMemberList,
        pattern: &ArchivePath,
        recursive: bool,
    ) -> usize {
        self.list_matching(list, pattern, recursive)
    }
}
