//! The archive trait definitions consumed by the junction layer
//!
//! An archive is any container of addressable members: an in-memory table, a directory of
//! loose files, a packed archive file or another [`JunctionFS`](crate::JunctionFS).
//! Paths handed to an archive are always relative to its own root.

use crate::{ArchivePath, SeekAndRead, VfsResult};
use std::fmt::Debug;
use std::io::Read;
use std::sync::Arc;

/// A shared handle to a single archive member
pub type ArchiveMemberPtr = Arc<dyn ArchiveMember>;

/// The output collection filled by listing operations
pub type ArchiveMemberList = Vec<ArchiveMemberPtr>;

/// A single addressable resource inside an archive
pub trait ArchiveMember: Debug + Send + Sync {
    /// The path of this member inside its own archive
    fn path(&self) -> &ArchivePath;

    /// The bare member name
    fn name(&self) -> &str {
        self.path().file_name()
    }

    /// Opens the member contents for reading
    fn open_read_stream(&self) -> VfsResult<Box<dyn SeekAndRead + Send>>;

    /// Reads the whole member into a ``Vec<u8>``
    fn read_to_bytes(&self) -> VfsResult<Vec<u8>> {
        let mut stream = self.open_read_stream()?;
        let mut contents = Vec::new();
        stream.read_to_end(&mut contents).map_err(|source| {
            crate::VfsError::from(source)
                .with_path(self.path().to_string())
                .with_context(|| "Could not read member")
        })?;
        Ok(contents)
    }
}

/// Archive implementations must implement this trait
///
/// None of these operations report errors: a member that cannot be found, or an archive
/// that cannot be read, simply yields `false`, `None` or no entries.
///
/// Please use the test macro [`test_archive!`](crate::test_archive) to check conformance.
pub trait Archive: Debug + Send + Sync {
    /// Returns true if a member exists at this path
    fn has_member(&self, path: &ArchivePath) -> bool;

    /// Looks up the member at this path
    fn get_member(&self, path: &ArchivePath) -> Option<ArchiveMemberPtr>;

    /// Appends every member to `list`, returning the number of members appended
    fn list_members(&self, list: &mut ArchiveMemberList) -> usize;

    /// Appends every member whose path matches `pattern` to `list`
    ///
    /// See [`ArchivePath::matches`] for the pattern syntax and the meaning of `recursive`.
    fn list_matching_members(
        &self,
        list: &mut ArchiveMemberList,
        pattern: &ArchivePath,
        recursive: bool,
    ) -> usize {
        let mut all = ArchiveMemberList::new();
        self.list_members(&mut all);
        let before = list.len();
        list.extend(
            all.into_iter()
                .filter(|member| member.path().matches(pattern, recursive)),
        );
        list.len() - before
    }
}

impl Archive for Box<dyn Archive> {
    fn has_member(&self, path: &ArchivePath) -> bool {
        self.as_ref().has_member(path)
    }

    fn get_member(&self, path: &ArchivePath) -> Option<ArchiveMemberPtr> {
        self.as_ref().get_member(path)
    }

    fn list_members(&self, list: &mut ArchiveMemberList) -> usize {
        self.as_ref().list_members(list)
    }

    fn list_matching_members(
        &self,
        list: &mut ArchiveMemberList,
        pattern: &ArchivePath,
        recursive: bool,
    ) -> usize {
        self.as_ref()
            .list_matching_members(list, pattern, recursive)
    }
}

impl Archive for Arc<dyn Archive> {
    fn has_member(&self, path: &ArchivePath) -> bool {
        self.as_ref().has_member(path)
    }

    fn get_member(&self, path: &ArchivePath) -> Option<ArchiveMemberPtr> {
        self.as_ref().get_member(path)
    }

    fn list_members(&self, list: &mut ArchiveMemberList) -> usize {
        self.as_ref().list_members(list)
    }

    fn list_matching_members(
        &self,
        list: &mut ArchiveMemberList,
        pattern: &ArchivePath,
        recursive: bool,
    ) -> usize {
        self.as_ref()
            .list_matching_members(list, pattern, recursive)
    }
}
