//! Component-based paths used on both sides of a junction
//!
//! An [`ArchivePath`] never stores separators. Strings are split into components once,
//! at the boundary, with whatever separator the caller uses; everything after that
//! compares and rewrites component sequences.

use std::fmt::{self, Display, Formatter};

/// The separator used by [`Display`] and by pattern matching
pub const SEPARATOR: char = '/';

/// An ordered sequence of path components
///
/// Empty components are never stored, so `"a//b/"` and `"a/b"` parse to the same path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchivePath {
    components: Vec<String>,
}

impl ArchivePath {
    /// The empty path, with no components
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `path` on `separator`
    pub fn parse(path: &str, separator: char) -> Self {
        Self::from_components(path.split(separator))
    }

    /// Builds a path from already split components, skipping empty ones
    pub fn from_components<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ArchivePath {
            components: components
                .into_iter()
                .map(Into::into)
                .filter(|component: &String| !component.is_empty())
                .collect(),
        }
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn append_component(&mut self, component: impl Into<String>) {
        let component = component.into();
        if !component.is_empty() {
            self.components.push(component);
        }
    }

    /// The last component, or `""` for the empty path
    pub fn file_name(&self) -> &str {
        self.components.last().map(String::as_str).unwrap_or("")
    }

    /// Returns true if the first components of this path equal all of `prefix`
    pub fn starts_with(&self, prefix: &ArchivePath) -> bool {
        self.components.starts_with(&prefix.components)
    }

    /// Joins the components with `separator`
    pub fn join(&self, separator: char) -> String {
        let mut result = String::new();
        for (index, component) in self.components.iter().enumerate() {
            if index > 0 {
                result.push(separator);
            }
            result.push_str(component);
        }
        result
    }

    /// Returns a copy with every component lower-cased
    ///
    /// Only ASCII letters are folded. Other characters are kept as they are, so every
    /// component keeps its length.
    pub fn to_lowercase(&self) -> Self {
        ArchivePath {
            components: self
                .components
                .iter()
                .map(|component| component.to_ascii_lowercase())
                .collect(),
        }
    }

    /// The leading directory components of a pattern that contain no wildcard
    ///
    /// The last component is never part of the prefix, even without wildcards.
    pub fn literal_prefix(&self) -> Self {
        ArchivePath {
            components: self
                .components
                .iter()
                .take(self.len().saturating_sub(1))
                .take_while(|component| !component.contains(['*', '?']))
                .cloned()
                .collect(),
        }
    }

    /// Matches this path against a wildcard `pattern`
    ///
    /// `*` matches any run of characters and `?` a single character. Unless `recursive` is
    /// set, neither wildcard matches across a separator.
    pub fn matches(&self, pattern: &ArchivePath, recursive: bool) -> bool {
        let text: Vec<char> = self.join(SEPARATOR).chars().collect();
        let pattern: Vec<char> = pattern.join(SEPARATOR).chars().collect();
        wildcard_match(&pattern, &text, recursive)
    }
}

impl Display for ArchivePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(SEPARATOR))
    }
}

impl From<&str> for ArchivePath {
    fn from(path: &str) -> Self {
        ArchivePath::parse(path, SEPARATOR)
    }
}

impl From<String> for ArchivePath {
    fn from(path: String) -> Self {
        ArchivePath::parse(&path, SEPARATOR)
    }
}

// Iterative glob matching with single-star backtracking
fn wildcard_match(pattern: &[char], text: &[char], cross_separators: bool) -> bool {
    let mut p = 0;
    let mut t = 0;
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        let c = text[t];
        if p < pattern.len() {
            match pattern[p] {
                '*' => {
                    star = Some((p, t));
                    p += 1;
                    continue;
                }
                '?' if c != SEPARATOR || cross_separators => {
                    p += 1;
                    t += 1;
                    continue;
                }
                expected if expected != '?' && expected == c => {
                    p += 1;
                    t += 1;
                    continue;
                }
                _ => {}
            }
        }
        // Mismatch: let the last star swallow one more character, if it may
        match star {
            Some((star_p, star_t)) if text[star_t] != SEPARATOR || cross_separators => {
                star = Some((star_p, star_t + 1));
                p = star_p + 1;
                t = star_t + 1;
            }
            _ => return false,
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
