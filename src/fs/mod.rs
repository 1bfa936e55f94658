//! Filesystem access used by the tree builder.
//!
//! The builder never calls OS primitives directly. It talks to an
//! [`FsProvider`], so the same engine runs against the real filesystem
//! ([`OsFs`]) or a synthetic tree ([`MemoryFs`]).

mod memory;
mod os;

use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

pub use memory::MemoryFs;
pub use os::OsFs;

/// Source of metadata and directory listings.
pub trait FsProvider: Send + Sync {
    /// Metadata for `path` without following a final symlink.
    fn stat(&self, path: &Path) -> io::Result<Metadata>;

    /// Entry names of the directory at `path`, in listing order.
    fn list_names(&self, path: &Path) -> io::Result<Vec<String>>;

    /// The raw target of the symlink at `path`.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// `path` with every symlink resolved.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    Symlink,
    Fifo,
    Socket,
    BlockDevice,
    CharDevice,
}

/// Identity and ownership numbers from the underlying stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawStat {
    pub inode: u64,
    pub device: u64,
    pub uid: u32,
    pub gid: u32,
}

/// Metadata for one entry, independent of any particular provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub kind: FileKind,
    pub len: u64,
    /// Permission bits including setuid, setgid and sticky (`0o7777`).
    pub permissions: u32,
    pub modified: SystemTime,
    /// Last status change, where the provider knows it.
    pub changed: Option<SystemTime>,
    pub raw: Option<RawStat>,
}

impl Metadata {
    pub fn new(kind: FileKind, len: u64) -> Self {
        let permissions = match kind {
            FileKind::Dir => 0o755,
            FileKind::Symlink => 0o777,
            _ => 0o644,
        };
        Self {
            kind,
            len,
            permissions,
            modified: SystemTime::UNIX_EPOCH,
            changed: None,
            raw: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == FileKind::Symlink
    }

    pub fn is_executable(&self) -> bool {
        self.kind == FileKind::File && self.permissions & 0o111 != 0
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Symlinks are not consulted.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    _ => false,
                };
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Absolute, lexically cleaned form of `path`, used as the key for cycle
/// detection.
pub fn absolute_clean(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    clean_path(&absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(clean_path(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(clean_path(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(clean_path(Path::new("/a/b/")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_absolute_clean_keeps_absolute_paths() {
        assert_eq!(absolute_clean(Path::new("/r/a/../b")), PathBuf::from("/r/b"));
    }

    #[test]
    fn test_executable_only_for_files() {
        let mut meta = Metadata::new(FileKind::File, 0);
        meta.permissions = 0o755;
        assert!(meta.is_executable());

        let dir = Metadata::new(FileKind::Dir, 0);
        assert!(!dir.is_executable());
    }
}
