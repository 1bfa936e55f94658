//! In-memory tree node.

use std::path::{Path, PathBuf};

use crate::error::TreeError;
use crate::fs::Metadata;

use super::size::SizeTotal;

/// One filesystem entry and, for directories, its children.
///
/// Populated by the visitor during the build phase. After the build has been
/// joined the only mutations are the one-time child sort, the one-time size
/// memo, and adopting a followed symlink's target children while printing.
#[derive(Debug)]
pub struct Node {
    path: PathBuf,
    name: String,
    depth: usize,
    ordinal: usize,
    pub(crate) metadata: Option<Metadata>,
    pub(crate) error: Option<TreeError>,
    pub(crate) children: Vec<Node>,
    pub(crate) sorted: bool,
    pub(crate) followed: bool,
    pub(crate) size_memo: Option<SizeTotal>,
}

impl Node {
    /// A root node for `path` at depth 0.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = base_name(&path);
        Self::with_depth(path, name, 0, 0)
    }

    /// A child of `parent` named `name`, at position `ordinal` in its listing.
    pub fn child_of(parent_path: &Path, parent_depth: usize, name: &str, ordinal: usize) -> Self {
        Self::with_depth(parent_path.join(name), name.to_string(), parent_depth + 1, ordinal)
    }

    /// A detached node for `path` that hangs at `depth` (used for symlink targets).
    pub(crate) fn detached(path: PathBuf, depth: usize) -> Self {
        let name = base_name(&path);
        Self::with_depth(path, name, depth, 0)
    }

    fn with_depth(path: PathBuf, name: String, depth: usize, ordinal: usize) -> Self {
        Self {
            path,
            name,
            depth,
            ordinal,
            metadata: None,
            error: None,
            children: Vec::new(),
            sorted: false,
            followed: false,
            size_memo: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Position in the parent's listing.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn error(&self) -> Option<&TreeError> {
        self.error.as_ref()
    }

    /// Children in their current order (sorted only once a printer has
    /// visited the node).
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// True for directories and for symlinks whose target has been expanded.
    pub fn is_dir(&self) -> bool {
        self.followed || self.metadata.as_ref().is_some_and(Metadata::is_dir)
    }

    pub fn is_symlink(&self) -> bool {
        self.metadata.as_ref().is_some_and(Metadata::is_symlink)
    }

    /// Own byte size from metadata, 0 when unknown.
    pub fn own_size(&self) -> u64 {
        self.metadata.as_ref().map_or(0, |m| m.len)
    }

    pub(crate) fn set_error(&mut self, error: TreeError) {
        self.error = Some(error);
    }

    /// Take over the children of an expanded symlink target.
    pub(crate) fn adopt(&mut self, target: Node) {
        self.children = target.children;
        self.followed = true;
        self.sorted = false;
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
