//! Provider backed by the real filesystem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[cfg(unix)]
use std::os::unix::fs::{FileTypeExt, MetadataExt};

use super::{FileKind, FsProvider, Metadata, RawStat};

/// Reads the local filesystem. `stat` does not follow a final symlink.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FsProvider for OsFs {
    fn stat(&self, path: &Path) -> io::Result<Metadata> {
        fs::symlink_metadata(path).map(|meta| convert(&meta))
    }

    fn list_names(&self, path: &Path) -> io::Result<Vec<String>> {
        fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect()
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}

fn convert(meta: &fs::Metadata) -> Metadata {
    Metadata {
        kind: kind_of(meta.file_type()),
        len: meta.len(),
        permissions: permissions_of(meta),
        modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        changed: changed_of(meta),
        raw: raw_of(meta),
    }
}

#[cfg(unix)]
fn kind_of(ft: fs::FileType) -> FileKind {
    if ft.is_dir() {
        FileKind::Dir
    } else if ft.is_symlink() {
        FileKind::Symlink
    } else if ft.is_fifo() {
        FileKind::Fifo
    } else if ft.is_socket() {
        FileKind::Socket
    } else if ft.is_block_device() {
        FileKind::BlockDevice
    } else if ft.is_char_device() {
        FileKind::CharDevice
    } else {
        FileKind::File
    }
}

#[cfg(not(unix))]
fn kind_of(ft: fs::FileType) -> FileKind {
    if ft.is_dir() {
        FileKind::Dir
    } else if ft.is_symlink() {
        FileKind::Symlink
    } else {
        FileKind::File
    }
}

#[cfg(unix)]
fn permissions_of(meta: &fs::Metadata) -> u32 {
    meta.mode() & 0o7777
}

#[cfg(not(unix))]
fn permissions_of(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() { 0o444 } else { 0o644 }
}

#[cfg(unix)]
fn changed_of(meta: &fs::Metadata) -> Option<SystemTime> {
    let secs = u64::try_from(meta.ctime()).ok()?;
    let nanos = u32::try_from(meta.ctime_nsec()).unwrap_or(0);
    SystemTime::UNIX_EPOCH.checked_add(std::time::Duration::new(secs, nanos))
}

#[cfg(not(unix))]
fn changed_of(_meta: &fs::Metadata) -> Option<SystemTime> {
    None
}

#[cfg(unix)]
fn raw_of(meta: &fs::Metadata) -> Option<RawStat> {
    Some(RawStat {
        inode: meta.ino(),
        device: meta.dev(),
        uid: meta.uid(),
        gid: meta.gid(),
    })
}

#[cfg(not(unix))]
fn raw_of(_meta: &fs::Metadata) -> Option<RawStat> {
    None
}
