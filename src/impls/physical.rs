//! A "physical" archive of loose files using the underlying OS file system

use crate::{
    Archive, ArchiveMember, ArchiveMemberList, ArchiveMemberPtr, ArchivePath, SeekAndRead,
    VfsError, VfsResult,
};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// An archive exposing the regular files below a directory
///
/// Directories are never members themselves. Member paths are relative to `root`.
#[derive(Debug, Clone)]
pub struct PhysicalArchive {
    root: PathBuf,
}

impl PhysicalArchive {
    pub fn new<T: AsRef<Path>>(root: T) -> Self {
        PhysicalArchive {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // None if the path would step outside the root
    fn get_path(&self, path: &ArchivePath) -> Option<PathBuf> {
        let mut result = self.root.clone();
        for component in path.components() {
            if component == "." || component == ".." || component.contains(['/', '\\']) {
                return None;
            }
            result.push(component);
        }
        Some(result)
    }

    fn member(path: ArchivePath, full_path: PathBuf) -> ArchiveMemberPtr {
        Arc::new(PhysicalMember { path, full_path })
    }

    // Collects every regular file below `start`, which lies at `start_path` inside the archive.
    // Symlinks are followed the same way `get_member` follows them, but every directory is
    // entered at most once.
    fn walk(
        &self,
        start: PathBuf,
        start_path: ArchivePath,
        max_depth: Option<usize>,
        list: &mut ArchiveMemberList,
    ) {
        let mut visited = HashSet::new();
        let mut todo = vec![(start, start_path)];
        while let Some((directory, directory_path)) = todo.pop() {
            if let Ok(canonical) = directory.canonicalize() {
                if !visited.insert(canonical) {
                    debug!(directory = %directory.display(), "skipping directory already walked");
                    continue;
                }
            }
            let entries = match std::fs::read_dir(&directory) {
                Ok(entries) => entries,
                Err(error) => {
                    debug!(directory = %directory.display(), %error, "skipping unreadable directory");
                    continue;
                }
            };
            for entry in entries.flatten() {
                let name = match entry.file_name().into_string() {
                    Ok(name) => name,
                    Err(name) => {
                        debug!(?name, "skipping non UTF-8 file name");
                        continue;
                    }
                };
                let mut path = directory_path.clone();
                path.append_component(name);
                let full_path = entry.path();
                match std::fs::metadata(&full_path) {
                    Ok(metadata) if metadata.is_dir() => {
                        if max_depth.map_or(true, |depth| path.len() < depth) {
                            todo.push((full_path, path));
                        }
                    }
                    Ok(metadata) if metadata.is_file() => {
                        list.push(Self::member(path, full_path))
                    }
                    Ok(_) => {}
                    Err(error) => {
                        debug!(path = %full_path.display(), %error, "skipping broken entry")
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
struct PhysicalMember {
    path: ArchivePath,
    full_path: PathBuf,
}

impl ArchiveMember for PhysicalMember {
    fn path(&self) -> &ArchivePath {
        &self.path
    }

    fn open_read_stream(&self) -> VfsResult<Box<dyn SeekAndRead + Send>> {
        let file = File::open(&self.full_path).map_err(|error| {
            VfsError::from(error)
                .with_path(self.full_path.display().to_string())
                .with_context(|| "Could not open member")
        })?;
        Ok(Box::new(file))
    }
}

impl Archive for PhysicalArchive {
    fn has_member(&self, path: &ArchivePath) -> bool {
        self.get_path(path)
            .map(|full_path| full_path.is_file())
            .unwrap_or(false)
    }

    fn get_member(&self, path: &ArchivePath) -> Option<ArchiveMemberPtr> {
        let full_path = self.get_path(path)?;
        if !full_path.is_file() {
            return None;
        }
        Some(Self::member(path.clone(), full_path))
    }

    fn list_members(&self, list: &mut ArchiveMemberList) -> usize {
        let before = list.len();
        self.walk(self.root.clone(), ArchivePath::new(), None, list);
        list.len() - before
    }

    fn list_matching_members(
        &self,
        list: &mut ArchiveMemberList,
        pattern: &ArchivePath,
        recursive: bool,
    ) -> usize {
        // Only walk below the directories the pattern names literally
        let start_path = pattern.literal_prefix();
        let start = match self.get_path(&start_path) {
            Some(start) => start,
            None => return 0,
        };
        let max_depth = if recursive { None } else { Some(pattern.len()) };

        let mut candidates = ArchiveMemberList::new();
        self.walk(start, start_path, max_depth, &mut candidates);
        let before = list.len();
        list.extend(
            candidates
                .into_iter()
                .filter(|member| member.path().matches(pattern, recursive)),
        );
        list.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VfsErrorKind;
    use std::io::Read;

    fn create_root() -> PathBuf {
        let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        for (path, contents) in crate::test_macros::FIXTURE {
            let file = dir.join(path);
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(file, contents).unwrap();
        }
        dir
    }

    test_archive!(PhysicalArchive::new(create_root()));

    #[test]
    fn rejects_parent_components() {
        let root = create_root();
        let archive = PhysicalArchive::new(root.join("a"));
        assert!(archive.has_member(&"d.txt".into()));
        assert!(!archive.has_member(&"../a.txt".into()));
        assert!(archive.get_member(&"../a.txt".into()).is_none());
        assert!(!archive.has_member(&"./d.txt".into()));
    }

    #[test]
    fn directories_are_not_members() {
        let archive = PhysicalArchive::new(create_root());
        assert!(!archive.has_member(&"a".into()));
        assert!(archive.get_member(&"a/x".into()).is_none());
    }

    #[test]
    fn missing_root_lists_nothing() {
        let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        let archive = PhysicalArchive::new(dir);
        let mut list = ArchiveMemberList::new();
        assert_eq!(archive.list_members(&mut list), 0);
        assert_eq!(archive.list_matching_members(&mut list, &"a/*".into(), true), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn member_removed_after_lookup_fails_to_open() -> VfsResult<()> {
        let root = create_root();
        let archive = PhysicalArchive::new(&root);
        let member = archive.get_member(&"b.txt".into()).unwrap();
        std::fs::remove_file(root.join("b.txt"))?;
        let error = member.open_read_stream().err().unwrap();
        assert!(matches!(error.kind(), VfsErrorKind::FileNotFound));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn lists_members_below_symlinked_directories() {
        let root = create_root();
        let target = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir_all(target.join("deep")).unwrap();
        std::fs::write(target.join("deep/z.txt"), "z").unwrap();
        std::os::unix::fs::symlink(&target, root.join("linked")).unwrap();

        let archive = PhysicalArchive::new(&root);
        assert!(archive.has_member(&"linked/deep/z.txt".into()));

        let mut list = ArchiveMemberList::new();
        assert_eq!(archive.list_members(&mut list), 6);
        assert!(list
            .iter()
            .any(|member| member.path() == &ArchivePath::from("linked/deep/z.txt")));

        let mut list = ArchiveMemberList::new();
        assert_eq!(
            archive.list_matching_members(&mut list, &"linked/*".into(), true),
            1
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycles_are_walked_once() {
        let root = create_root();
        std::os::unix::fs::symlink(&root, root.join("c/up")).unwrap();

        let archive = PhysicalArchive::new(&root);
        assert!(archive.has_member(&"c/up/a.txt".into()));
        let mut list = ArchiveMemberList::new();
        assert_eq!(archive.list_members(&mut list), 5);
    }

    #[test]
    fn reads_file_contents() -> VfsResult<()> {
        let archive = PhysicalArchive::new(create_root());
        let mut string = String::new();
        archive
            .get_member(&"a/x/y.txt".into())
            .unwrap()
            .open_read_stream()?
            .read_to_string(&mut string)?;
        assert_eq!(string, "y");
        Ok(())
    }
}
