//! Provider backed by an in-memory tree, for tests and benchmarks.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use super::{FileKind, FsProvider, Metadata, RawStat, clean_path};

const MAX_LINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
struct Entry {
    meta: Metadata,
    names: Vec<String>,
    target: Option<PathBuf>,
    list_error: Option<io::ErrorKind>,
    stat_error: Option<io::ErrorKind>,
}

/// A synthetic filesystem. Paths are absolute; parents are created on demand
/// and children list in insertion order.
///
/// ```
/// use arbor::fs::{FsProvider, MemoryFs};
/// use std::path::Path;
///
/// let fs = MemoryFs::new()
///     .file("/r/a.txt", 10)
///     .dir("/r/sub")
///     .symlink("/r/link", "/r/sub");
/// assert_eq!(fs.list_names(Path::new("/r")).unwrap(), ["a.txt", "sub", "link"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    entries: HashMap<PathBuf, Entry>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory (and any missing parents).
    pub fn dir(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), Metadata::new(FileKind::Dir, 4096), None);
        self
    }

    /// Add a regular file of `len` bytes.
    pub fn file(mut self, path: impl AsRef<Path>, len: u64) -> Self {
        self.insert(path.as_ref(), Metadata::new(FileKind::File, len), None);
        self
    }

    /// Add a symlink pointing at `target` (absolute or relative to its parent).
    pub fn symlink(mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) -> Self {
        let target = target.as_ref().to_path_buf();
        let len = target.as_os_str().len() as u64;
        self.insert(path.as_ref(), Metadata::new(FileKind::Symlink, len), Some(target));
        self
    }

    /// Add an entry of an arbitrary kind.
    pub fn special(mut self, path: impl AsRef<Path>, kind: FileKind) -> Self {
        self.insert(path.as_ref(), Metadata::new(kind, 0), None);
        self
    }

    /// Make listing the directory at `path` fail with permission denied.
    pub fn deny_listing(mut self, path: impl AsRef<Path>) -> Self {
        if let Some(entry) = self.entry_mut(path.as_ref()) {
            entry.list_error = Some(io::ErrorKind::PermissionDenied);
        }
        self
    }

    /// Make `stat` of `path` fail while the entry still shows in its parent.
    pub fn deny_stat(mut self, path: impl AsRef<Path>) -> Self {
        if let Some(entry) = self.entry_mut(path.as_ref()) {
            entry.stat_error = Some(io::ErrorKind::PermissionDenied);
        }
        self
    }

    pub fn with_modified(mut self, path: impl AsRef<Path>, time: SystemTime) -> Self {
        if let Some(entry) = self.entry_mut(path.as_ref()) {
            entry.meta.modified = time;
        }
        self
    }

    pub fn with_changed(mut self, path: impl AsRef<Path>, time: SystemTime) -> Self {
        if let Some(entry) = self.entry_mut(path.as_ref()) {
            entry.meta.changed = Some(time);
        }
        self
    }

    pub fn with_permissions(mut self, path: impl AsRef<Path>, permissions: u32) -> Self {
        if let Some(entry) = self.entry_mut(path.as_ref()) {
            entry.meta.permissions = permissions;
        }
        self
    }

    pub fn with_raw(mut self, path: impl AsRef<Path>, raw: RawStat) -> Self {
        if let Some(entry) = self.entry_mut(path.as_ref()) {
            entry.meta.raw = Some(raw);
        }
        self
    }

    fn entry_mut(&mut self, path: &Path) -> Option<&mut Entry> {
        self.entries.get_mut(&clean_path(path))
    }

    fn insert(&mut self, path: &Path, meta: Metadata, target: Option<PathBuf>) {
        let path = clean_path(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !self.entries.contains_key(parent) {
                self.insert(parent, Metadata::new(FileKind::Dir, 4096), None);
            }
            if let (Some(name), Some(entry)) = (path.file_name(), self.entries.get_mut(parent)) {
                let name = name.to_string_lossy().into_owned();
                if !entry.names.contains(&name) {
                    entry.names.push(name);
                }
            }
        }
        // Re-adding a directory keeps the children already listed under it.
        let names = match self.entries.remove(&path) {
            Some(existing) if meta.is_dir() => existing.names,
            _ => Vec::new(),
        };
        self.entries.insert(
            path,
            Entry {
                meta,
                names,
                target,
                list_error: None,
                stat_error: None,
            },
        );
    }

    fn lookup(&self, path: &Path) -> io::Result<&Entry> {
        self.entries
            .get(&clean_path(path))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn resolve_target(link: &Path, target: &Path) -> PathBuf {
        if target.is_absolute() {
            clean_path(target)
        } else {
            let parent = link.parent().unwrap_or_else(|| Path::new("/"));
            clean_path(&parent.join(target))
        }
    }
}

impl FsProvider for MemoryFs {
    fn stat(&self, path: &Path) -> io::Result<Metadata> {
        let entry = self.lookup(path)?;
        match entry.stat_error {
            Some(kind) => Err(io::Error::from(kind)),
            None => Ok(entry.meta.clone()),
        }
    }

    fn list_names(&self, path: &Path) -> io::Result<Vec<String>> {
        let entry = self.lookup(path)?;
        if let Some(kind) = entry.list_error.or(entry.stat_error) {
            return Err(io::Error::from(kind));
        }
        if !entry.meta.is_dir() {
            return Err(io::Error::from(io::ErrorKind::NotADirectory));
        }
        Ok(entry.names.clone())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.lookup(path)?
            .target
            .clone()
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let mut resolved = PathBuf::from("/");
        let mut pending = pending_parts(&clean_path(path));
        let mut hops = 0;

        while let Some(component) = pending.pop() {
            let candidate = clean_path(&resolved.join(&component));
            let entry = self.lookup(&candidate)?;
            match &entry.target {
                Some(target) => {
                    hops += 1;
                    if hops > MAX_LINK_HOPS {
                        return Err(io::Error::other("too many levels of symbolic links"));
                    }
                    let next = Self::resolve_target(&candidate, target);
                    // Restart from the root with the target's components queued.
                    pending.extend(pending_parts(&next));
                    resolved = PathBuf::from("/");
                }
                None => resolved = candidate,
            }
        }
        Ok(resolved)
    }
}

/// Components below the root of an absolute path, last one first, so that
/// popping yields them in path order.
fn pending_parts(path: &Path) -> Vec<PathBuf> {
    let mut parts: Vec<PathBuf> = path
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .map(|c| PathBuf::from(c.as_os_str()))
        .collect();
    parts.reverse();
    parts
}
