//! Virtual file system overlay built from junctions
//!
//! A [`JunctionFS`] presents a stable, virtual path namespace while the bytes behind it live
//! in arbitrary places: a directory of loose files, an in-memory table, a packed archive or
//! another `JunctionFS`. Every such container implements the [`Archive`] trait, and the
//! junction table decides which archive (and which path inside it) a virtual path refers to.
//!
//! The crate consists of these basic types
//!
//!  * **ArchivePath** - a path split into components, independent of any separator
//!  * **Archive** - a container of members addressed by `ArchivePath`
//!  * **ArchiveMember** - a single resource that can be opened for reading
//!  * **JunctionFS** - the router mapping virtual paths onto archives
//!
//! The following archive implementations are included:
//!
//!  * **PhysicalArchive** - the regular files below a directory of the OS filesystem
//!  * **MemoryArchive** - an ephemeral in-memory implementation (intended for unit tests)
//!
//! # Usage Examples
//!
//! ```
//! use junction_vfs::{ArchivePath, JunctionFS, JunctionOptions, MemoryArchive};
//!
//! let archive = MemoryArchive::new();
//! archive.insert("data/assets/logo.png", "png bytes");
//! archive.insert("install/game.exe", "exe bytes");
//!
//! let mut vfs = JunctionFS::new(&archive, *JunctionOptions::new().case_sensitive(false));
//! vfs.map_directory("Assets", "data/assets");
//! vfs.map_file("Game.exe", "install/game.exe");
//!
//! assert!(vfs.exists(&ArchivePath::from("assets/logo.png")));
//! assert!(vfs.exists(&ArchivePath::from("GAME.EXE")));
//! assert!(!vfs.exists(&ArchivePath::from("data/assets/logo.png")));
//! ```

#[cfg(any(test, feature = "export-test-macros"))]
#[macro_use]
pub mod test_macros;

pub mod archive;
pub mod error;
pub mod impls;
pub mod options;
pub mod path;

pub use archive::{Archive, ArchiveMember, ArchiveMemberList, ArchiveMemberPtr};
pub use error::{VfsError, VfsResult};
pub use impls::junction::{Junction, JunctionFS, JunctionKind};
pub use impls::memory::MemoryArchive;
pub use impls::physical::PhysicalArchive;
pub use options::JunctionOptions;
pub use path::ArchivePath;

use std::io::{Read, Seek};

/// A byte stream that can be read and seeked
pub trait SeekAndRead: Seek + Read {}

impl<T> SeekAndRead for T where T: Seek + Read {}
