//! An ephemeral in-memory archive, intended mainly for unit tests

use crate::{
    Archive, ArchiveMember, ArchiveMemberList, ArchiveMemberPtr, ArchivePath, SeekAndRead,
    VfsResult,
};
use core::cmp;
use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
    io::{Read, Seek, SeekFrom},
    sync::{Arc, RwLock},
};

type MemoryArchiveHandle = Arc<RwLock<MemoryArchiveImpl>>;

/// An ephemeral in-memory archive, intended mainly for unit tests
///
/// Only files are stored; directories exist implicitly through the paths of their members.
/// Clones share the same contents.
#[derive(Clone)]
pub struct MemoryArchive {
    handle: MemoryArchiveHandle,
}

impl Debug for MemoryArchive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("In Memory Archive")
    }
}

impl MemoryArchive {
    /// Create a new, empty in-memory archive
    pub fn new() -> Self {
        MemoryArchive {
            handle: Arc::new(RwLock::new(MemoryArchiveImpl::default())),
        }
    }

    /// Stores `contents` at `path`, replacing any previous member
    pub fn insert(&self, path: impl Into<ArchivePath>, contents: impl Into<Vec<u8>>) {
        let path = path.into();
        let mut handle = self.handle.write().unwrap();
        handle.files.insert(path, Arc::new(contents.into()));
    }

    /// Number of stored members
    pub fn len(&self) -> usize {
        self.handle.read().unwrap().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn member(path: &ArchivePath, content: &Arc<Vec<u8>>) -> ArchiveMemberPtr {
        Arc::new(MemoryMember {
            path: path.clone(),
            content: content.clone(),
        })
    }
}

impl Default for MemoryArchive {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct MemoryArchiveImpl {
    #[allow(clippy::rc_buffer)] // members keep reading the contents they were created with
    files: BTreeMap<ArchivePath, Arc<Vec<u8>>>,
}

struct MemoryMember {
    path: ArchivePath,
    #[allow(clippy::rc_buffer)]
    content: Arc<Vec<u8>>,
}

impl Debug for MemoryMember {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryMember")
            .field("path", &self.path)
            .field("len", &self.content.len())
            .finish()
    }
}

impl ArchiveMember for MemoryMember {
    fn path(&self) -> &ArchivePath {
        &self.path
    }

    fn open_read_stream(&self) -> VfsResult<Box<dyn SeekAndRead + Send>> {
        Ok(Box::new(ReadableFile {
            content: self.content.clone(),
            position: 0,
        }))
    }

    fn read_to_bytes(&self) -> VfsResult<Vec<u8>> {
        Ok(self.content.as_ref().clone())
    }
}

struct ReadableFile {
    #[allow(clippy::rc_buffer)]
    content: Arc<Vec<u8>>,
    position: u64,
}

impl ReadableFile {
    fn len(&self) -> u64 {
        (self.content.len() as u64).saturating_sub(self.position)
    }
}

impl Read for ReadableFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let amt = cmp::min(buf.len(), self.len() as usize);
        if amt == 0 {
            return Ok(0);
        }
        let start = self.position as usize;
        buf[..amt].copy_from_slice(&self.content[start..start + amt]);
        self.position += amt as u64;
        Ok(amt)
    }
}

impl Seek for ReadableFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let position = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(offset) => self.position.checked_add_signed(offset),
            SeekFrom::End(offset) => (self.content.len() as u64).checked_add_signed(offset),
        };
        match position {
            Some(position) => {
                self.position = position;
                Ok(position)
            }
            None => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "invalid seek to a negative position",
            )),
        }
    }
}

impl Archive for MemoryArchive {
    fn has_member(&self, path: &ArchivePath) -> bool {
        self.handle.read().unwrap().files.contains_key(path)
    }

    fn get_member(&self, path: &ArchivePath) -> Option<ArchiveMemberPtr> {
        let handle = self.handle.read().unwrap();
        handle
            .files
            .get_key_value(path)
            .map(|(path, content)| Self::member(path, content))
    }

    fn list_members(&self, list: &mut ArchiveMemberList) -> usize {
        let handle = self.handle.read().unwrap();
        list.extend(
            handle
                .files
                .iter()
                .map(|(path, content)| Self::member(path, content)),
        );
        handle.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom};

    test_archive!({
        let archive = MemoryArchive::new();
        for (path, contents) in crate::test_macros::FIXTURE {
            archive.insert(*path, *contents);
        }
        archive
    });

    #[test]
    fn insert_replaces_existing_member() -> VfsResult<()> {
        let archive = MemoryArchive::new();
        archive.insert("a.txt", "first");
        let old_member = archive.get_member(&"a.txt".into()).unwrap();
        archive.insert("a.txt", "second");
        assert_eq!(archive.len(), 1);
        assert_eq!(
            archive.get_member(&"a.txt".into()).unwrap().read_to_bytes()?,
            b"second"
        );
        // Members handed out earlier keep their snapshot
        assert_eq!(old_member.read_to_bytes()?, b"first");
        Ok(())
    }

    #[test]
    fn directories_are_not_members() {
        let archive = MemoryArchive::new();
        archive.insert("dir/file.bin", vec![1u8, 2, 3]);
        assert!(!archive.has_member(&"dir".into()));
        assert!(archive.get_member(&"dir".into()).is_none());
    }

    #[test]
    fn seek_and_read() -> VfsResult<()> {
        let archive = MemoryArchive::new();
        archive.insert("seek.txt", "Hello world!");
        let member = archive.get_member(&"seek.txt".into()).unwrap();
        let mut stream = member.open_read_stream()?;
        stream.seek(SeekFrom::Start(6))?;
        let mut string = String::new();
        stream.read_to_string(&mut string)?;
        assert_eq!(string, "world!");
        stream.seek(SeekFrom::End(-6))?;
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf)?;
        assert_eq!(&buf, b"world");
        assert!(stream.seek(SeekFrom::Current(-100)).is_err());
        Ok(())
    }

    #[test]
    fn read_past_end_yields_nothing() -> VfsResult<()> {
        let archive = MemoryArchive::new();
        archive.insert("short.txt", "ab");
        let mut stream = archive
            .get_member(&"short.txt".into())
            .unwrap()
            .open_read_stream()?;
        stream.seek(SeekFrom::Start(10))?;
        let mut buf = Vec::new();
        assert_eq!(stream.read_to_end(&mut buf)?, 0);
        Ok(())
    }

    #[test]
    fn clones_share_contents() {
        let archive = MemoryArchive::new();
        let clone = archive.clone();
        clone.insert("shared.txt", "x");
        assert!(archive.has_member(&"shared.txt".into()));
    }
}
