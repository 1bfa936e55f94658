//! Aggregate size rollups and recursive entry counts.

use tracing::trace;

use crate::config::Options;
use crate::error::TreeError;

use super::node::Node;

/// Recursive byte total of a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeTotal {
    pub bytes: u64,
    /// False when some descendant could not be read; `bytes` then only
    /// covers what is known.
    pub complete: bool,
}

impl Node {
    /// Own size for non-directories, the memoized sum of the children's
    /// aggregates for directories.
    ///
    /// Errored children contribute nothing and mark the total incomplete.
    /// Whether to show a placeholder for partial totals is up to the caller.
    pub fn aggregate_size(&mut self) -> SizeTotal {
        if !self.is_dir() {
            return SizeTotal {
                bytes: self.own_size(),
                complete: self.error.is_none(),
            };
        }
        if let Some(memo) = self.size_memo {
            return memo;
        }

        let mut total = SizeTotal {
            bytes: 0,
            complete: self.error.is_none(),
        };
        for child in &mut self.children {
            if child.error.is_some() {
                total.complete = false;
                if !child.is_dir() {
                    continue;
                }
            }
            let sub = child.aggregate_size();
            total.bytes = total.bytes.saturating_add(sub.bytes);
            total.complete &= sub.complete;
        }

        self.size_memo = Some(total);
        total
    }

    /// The memoized aggregate, or the own size when nothing has been computed.
    pub fn cached_size(&self) -> u64 {
        match self.size_memo {
            Some(memo) => memo.bytes,
            None => self.own_size(),
        }
    }
}

/// Number of entries (files and directories) below `node`.
///
/// Directories that were never expanded because of a fixed depth limit
/// count as a single entry.
pub fn descendant_count(node: &Node, options: &Options) -> u64 {
    count_entries(node, options).unwrap_or(1)
}

fn count_entries(node: &Node, options: &Options) -> Result<u64, TreeError> {
    if options.stops_at(node.depth()) {
        return Err(TreeError::DepthExceeded {
            depth: node.depth(),
        });
    }

    let mut total = node.children.len() as u64;
    for child in &node.children {
        if child.error.is_some() || !child.is_dir() {
            continue;
        }
        total += match count_entries(child, options) {
            Ok(n) => n,
            Err(err) => {
                trace!(path = %child.path().display(), %err, "counting stopped");
                1
            }
        };
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DepthLimit;
    use crate::fs::{FileKind, Metadata};
    use std::io;
    use std::path::Path;

    fn file(parent: &Node, name: &str, len: u64) -> Node {
        let mut node = Node::child_of(parent.path(), parent.depth(), name, 0);
        node.metadata = Some(Metadata::new(FileKind::File, len));
        node
    }

    fn dir(parent_path: &Path, depth: usize, name: &str) -> Node {
        let mut node = Node::child_of(parent_path, depth, name, 0);
        node.metadata = Some(Metadata::new(FileKind::Dir, 4096));
        node
    }

    #[test]
    fn test_aggregate_sums_files_recursively() {
        let mut root = Node::new("/r");
        root.metadata = Some(Metadata::new(FileKind::Dir, 4096));
        let mut sub = dir(root.path(), 0, "sub");
        let x_node = file(&sub, "x", 5);
        sub.children.push(x_node);
        let a_node = file(&root, "a", 10);
        root.children.push(a_node);
        root.children.push(sub);

        let total = root.aggregate_size();
        assert_eq!(total.bytes, 15);
        assert!(total.complete);
        assert_eq!(root.cached_size(), 15);
        assert_eq!(root.children[1].cached_size(), 5);
    }

    #[test]
    fn test_aggregate_is_partial_with_errors() {
        let mut root = Node::new("/r");
        root.metadata = Some(Metadata::new(FileKind::Dir, 4096));
        let mut locked = dir(root.path(), 0, "locked");
        locked.set_error(TreeError::access(
            "/r/locked",
            io::Error::from(io::ErrorKind::PermissionDenied),
        ));
        let a_node = file(&root, "a", 7);
        root.children.push(a_node);
        root.children.push(locked);

        let total = root.aggregate_size();
        assert_eq!(total.bytes, 7);
        assert!(!total.complete);
    }

    #[test]
    fn test_aggregate_memo_is_stable() {
        let mut root = Node::new("/r");
        root.metadata = Some(Metadata::new(FileKind::Dir, 4096));
        let a_node = file(&root, "a", 3);
        root.children.push(a_node);
        assert_eq!(root.aggregate_size().bytes, 3);

        // The tree is immutable after building; a late change is not observed.
        let b_node = file(&root, "b", 4);
        root.children.push(b_node);
        assert_eq!(root.aggregate_size().bytes, 3);
    }

    #[test]
    fn test_descendant_count() {
        let mut root = Node::new("/r");
        root.metadata = Some(Metadata::new(FileKind::Dir, 4096));
        let mut sub = dir(root.path(), 0, "sub");
        let x_node = file(&sub, "x", 1);
        sub.children.push(x_node);
        let y_node = file(&sub, "y", 1);
        sub.children.push(y_node);
        let a_node = file(&root, "a", 1);
        root.children.push(a_node);
        root.children.push(sub);

        assert_eq!(descendant_count(&root, &Options::default()), 4);
    }

    #[test]
    fn test_descendant_count_caps_unexpanded_depth() {
        let mut root = Node::new("/r");
        root.metadata = Some(Metadata::new(FileKind::Dir, 4096));
        let sub = dir(root.path(), 0, "sub");
        root.children.push(sub);
        let opts = Options {
            depth: DepthLimit::Fixed(1),
            ..Default::default()
        };

        // "sub" sits at the limit and was never listed: it counts as one.
        assert_eq!(descendant_count(&root, &opts), 2);
        // The root itself is past a zero-depth limit.
        let opts = Options {
            depth: DepthLimit::Fixed(0),
            ..Default::default()
        };
        assert_eq!(descendant_count(&root, &opts), 1);
    }
}
