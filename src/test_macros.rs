/// The member tree every archive under [`test_archive!`] must be preloaded with
pub const FIXTURE: &[(&str, &str)] = &[
    ("a.txt", "a"),
    ("b.txt", "b"),
    ("a/d.txt", "d"),
    ("a/x/y.txt", "y"),
    ("c/e.dat", "e"),
];

/// Run read-only archive tests to check for conformance
///
/// The expression must evaluate to an [`Archive`](crate::Archive) holding exactly the
/// members of [`FIXTURE`](crate::test_macros::FIXTURE).
#[macro_export]
macro_rules! test_archive {
    ($archive:expr) => {
        #[cfg(test)]
        mod archive_tests {
            use super::*;
            use std::io::Read;
            use $crate::Archive;
            use $crate::ArchiveMemberList;
            use $crate::ArchivePath;
            use $crate::VfsResult;

            fn fixture_archive() -> impl Archive {
                $archive
            }

            fn sorted_paths(list: &ArchiveMemberList) -> Vec<String> {
                let mut paths: Vec<_> = list
                    .iter()
                    .map(|member| member.path().to_string())
                    .collect();
                paths.sort();
                paths
            }

            #[test]
            fn archive_can_be_created() {
                fixture_archive();
            }

            #[test]
            fn has_member() {
                let archive = fixture_archive();
                for (path, _) in $crate::test_macros::FIXTURE {
                    assert!(archive.has_member(&ArchivePath::from(*path)), "{}", path);
                }
                assert!(!archive.has_member(&"missing.txt".into()));
                assert!(!archive.has_member(&"a/missing.txt".into()));
                assert!(!archive.has_member(&"a.txt/more".into()));
            }

            #[test]
            fn get_member_and_read() -> VfsResult<()> {
                let archive = fixture_archive();
                for (path, contents) in $crate::test_macros::FIXTURE {
                    let path = ArchivePath::from(*path);
                    let member = archive.get_member(&path).unwrap();
                    assert_eq!(member.path(), &path);
                    assert_eq!(member.name(), path.file_name());
                    let mut string = String::new();
                    member.open_read_stream()?.read_to_string(&mut string)?;
                    assert_eq!(&string, contents);
                    assert_eq!(member.read_to_bytes()?, contents.as_bytes());
                }
                Ok(())
            }

            #[test]
            fn get_member_missing() {
                let archive = fixture_archive();
                assert!(archive.get_member(&"missing.txt".into()).is_none());
                assert!(archive.get_member(&"c/missing.dat".into()).is_none());
            }

            #[test]
            fn list_members() {
                let archive = fixture_archive();
                let mut list = ArchiveMemberList::new();
                assert_eq!(archive.list_members(&mut list), 5);
                assert_eq!(
                    sorted_paths(&list),
                    vec!["a.txt", "a/d.txt", "a/x/y.txt", "b.txt", "c/e.dat"]
                );
            }

            #[test]
            fn list_matching_members_recursive() {
                let archive = fixture_archive();
                let mut list = ArchiveMemberList::new();
                assert_eq!(
                    archive.list_matching_members(&mut list, &"a/*".into(), true),
                    2
                );
                assert_eq!(sorted_paths(&list), vec!["a/d.txt", "a/x/y.txt"]);
            }

            #[test]
            fn list_matching_members_flat() {
                let archive = fixture_archive();
                let mut list = ArchiveMemberList::new();
                assert_eq!(
                    archive.list_matching_members(&mut list, &"a/*".into(), false),
                    1
                );
                assert_eq!(sorted_paths(&list), vec!["a/d.txt"]);

                let mut list = ArchiveMemberList::new();
                archive.list_matching_members(&mut list, &"*.txt".into(), false);
                assert_eq!(sorted_paths(&list), vec!["a.txt", "b.txt"]);
            }

            #[test]
            fn list_matching_members_appends() {
                let archive = fixture_archive();
                let mut list = ArchiveMemberList::new();
                archive.list_matching_members(&mut list, &"c/*".into(), true);
                assert_eq!(
                    archive.list_matching_members(&mut list, &"?.txt".into(), false),
                    2
                );
                assert_eq!(sorted_paths(&list), vec!["a.txt", "b.txt", "c/e.dat"]);
            }

            #[test]
            fn list_matching_members_no_match() {
                let archive = fixture_archive();
                let mut list = ArchiveMemberList::new();
                assert_eq!(
                    archive.list_matching_members(&mut list, &"missing/*".into(), true),
                    0
                );
                assert!(list.is_empty());
            }
        }
    };
}
