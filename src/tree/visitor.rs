//! Tree building: stat, list, filter and fan out.

use std::collections::HashSet;
use std::ops::{Add, AddAssign};
use std::path::{Path, PathBuf};

use crossbeam_channel::unbounded;
use tracing::{debug, trace, warn};

use crate::config::Options;
use crate::error::TreeError;
use crate::fs::{FsProvider, absolute_clean};

use super::filter::NameFilter;
use super::node::Node;
use super::pool::{TASK_WEIGHT, WorkerPool};

/// Directory and file totals for a subtree. The root is not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub directories: u64,
    pub files: u64,
}

impl Counts {
    fn directory() -> Self {
        Self {
            directories: 1,
            files: 0,
        }
    }

    fn file() -> Self {
        Self {
            directories: 0,
            files: 1,
        }
    }
}

impl Add for Counts {
    type Output = Counts;

    fn add(self, rhs: Counts) -> Counts {
        Counts {
            directories: self.directories + rhs.directories,
            files: self.files + rhs.files,
        }
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, rhs: Counts) {
        *self = *self + rhs;
    }
}

/// Absolute, cleaned paths seen while following symlinks.
#[derive(Debug, Clone, Default)]
pub struct VisitedPaths(HashSet<PathBuf>);

impl VisitedPaths {
    /// Record `path`; returns false if it was already present.
    pub fn insert(&mut self, path: &Path) -> bool {
        self.0.insert(absolute_clean(path))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.0.contains(&absolute_clean(path))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What happened when a symlink was followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followed {
    /// Broken, or pointing at something other than a directory.
    NotDirectory,
    /// The target is already part of the tree.
    Recursive,
    /// The target's entries now hang under the link. `error` is set when
    /// the target itself could not be listed.
    Expanded { error: Option<String> },
}

/// Expands nodes for one root.
///
/// Without symlink following, children are expanded on a bounded worker
/// pool. With it, the walk is sequential so the visited set can be updated
/// in order.
pub struct Visitor<'a> {
    provider: &'a dyn FsProvider,
    options: &'a Options,
    filter: NameFilter,
    pool: Option<WorkerPool>,
}

impl<'a> Visitor<'a> {
    /// A visitor sized by `options.workers`.
    pub fn new(provider: &'a dyn FsProvider, options: &'a Options) -> Self {
        let pool = if options.follow_links || options.workers == 1 {
            None
        } else {
            match WorkerPool::new(options.workers) {
                Ok(pool) => {
                    debug!(threads = pool.threads(), "worker pool ready");
                    Some(pool)
                }
                Err(err) => {
                    warn!("cannot start worker pool, walking sequentially: {err}");
                    None
                }
            }
        };
        Self {
            provider,
            options,
            filter: NameFilter::new(options),
            pool,
        }
    }

    /// A visitor that never spawns and reuses an already compiled filter.
    pub fn sequential(
        provider: &'a dyn FsProvider,
        options: &'a Options,
        filter: NameFilter,
    ) -> Self {
        Self {
            provider,
            options,
            filter,
            pool: None,
        }
    }

    pub fn filter(&self) -> &NameFilter {
        &self.filter
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Build the subtree under `root`. Any spawned work has finished when
    /// this returns.
    pub fn visit_root(&self, root: &mut Node, visited: &mut VisitedPaths) -> Counts {
        if self.options.follow_links {
            return self.visit_tracked(root, visited);
        }
        match &self.pool {
            Some(pool) => pool.pool.install(|| self.visit(root, None)),
            None => self.visit(root, None),
        }
    }

    /// Build the subtree under `node` sequentially, recording every visited
    /// path.
    pub fn visit_tracked(&self, node: &mut Node, visited: &mut VisitedPaths) -> Counts {
        self.visit(node, Some(visited))
    }

    /// Expand the directory a symlink points to into `link`, unless the
    /// target is not a directory or has already been visited.
    pub fn follow_link(&self, link: &mut Node, visited: &mut VisitedPaths) -> Followed {
        let Ok(target) = self.provider.canonicalize(link.path()) else {
            return Followed::NotDirectory;
        };
        if !self.provider.stat(&target).is_ok_and(|meta| meta.is_dir()) {
            return Followed::NotDirectory;
        }
        if visited.contains(&target) {
            trace!(link = %link.path().display(), "link target already visited");
            return Followed::Recursive;
        }

        let mut expanded = Node::detached(target, link.depth());
        self.visit_tracked(&mut expanded, visited);
        let error = expanded.error().map(TreeError::short_message);
        link.adopt(expanded);
        Followed::Expanded { error }
    }

    fn visit(&self, node: &mut Node, mut visited: Option<&mut VisitedPaths>) -> Counts {
        if let Some(seen) = visited.as_deref_mut() {
            seen.insert(node.path());
        }

        let meta = match self.provider.stat(node.path()) {
            Ok(meta) => meta,
            Err(err) => {
                trace!(path = %node.path().display(), %err, "stat failed");
                node.set_error(TreeError::access(node.path(), err));
                return Counts::default();
            }
        };
        let is_dir = meta.is_dir();
        node.metadata = Some(meta);
        if !is_dir {
            return Counts::file();
        }

        let mut counts = if node.depth() == 0 {
            Counts::default()
        } else {
            Counts::directory()
        };
        if self.options.stops_at(node.depth()) {
            return counts;
        }

        let names = match self.provider.list_names(node.path()) {
            Ok(names) => names,
            Err(err) => {
                trace!(path = %node.path().display(), %err, "listing failed");
                node.set_error(TreeError::access(node.path(), err));
                return counts;
            }
        };
        let names: Vec<(usize, String)> = names
            .into_iter()
            .enumerate()
            .filter(|(_, name)| !self.filter.skips_name(name))
            .collect();

        counts += match (visited, &self.pool) {
            (Some(seen), _) => self.expand_tracked(node, names, seen),
            (None, Some(pool)) => self.fan_out(node, names, pool),
            (None, None) => self.expand_inline(node, names),
        };
        counts
    }

    fn expand_tracked(
        &self,
        node: &mut Node,
        names: Vec<(usize, String)>,
        visited: &mut VisitedPaths,
    ) -> Counts {
        let mut counts = Counts::default();
        for (ordinal, name) in names {
            let mut child = Node::child_of(node.path(), node.depth(), &name, ordinal);
            let sub = self.visit(&mut child, Some(&mut *visited));
            if self.filter.keeps(&child) {
                node.children.push(child);
                counts += sub;
            }
        }
        counts
    }

    fn expand_inline(&self, node: &mut Node, names: Vec<(usize, String)>) -> Counts {
        let mut counts = Counts::default();
        for (ordinal, name) in names {
            let mut child = Node::child_of(node.path(), node.depth(), &name, ordinal);
            let sub = self.visit(&mut child, None);
            if self.filter.keeps(&child) {
                node.children.push(child);
                counts += sub;
            }
        }
        counts
    }

    /// Expand children concurrently where admission allows, inline
    /// otherwise. Results come back over one channel per parent and are
    /// appended here after every task has joined.
    fn fan_out(&self, node: &mut Node, names: Vec<(usize, String)>, pool: &WorkerPool) -> Counts {
        let (tx, rx) = unbounded::<(Node, Counts)>();
        let parent = node.path().to_path_buf();
        let depth = node.depth();

        rayon::scope(|scope| {
            for (ordinal, name) in names {
                let tx = tx.clone();
                let parent = &parent;
                let task = move || {
                    let mut child = Node::child_of(parent, depth, &name, ordinal);
                    let sub = self.visit(&mut child, None);
                    if self.filter.keeps(&child) {
                        // The receiver outlives the scope.
                        let _ = tx.send((child, sub));
                    }
                };
                match pool.admission.try_acquire(TASK_WEIGHT) {
                    Some(permit) => scope.spawn(move |_| {
                        let _permit = permit;
                        task();
                    }),
                    None => task(),
                }
            }
        });
        drop(tx);

        let mut counts = Counts::default();
        for (child, sub) in rx.try_iter() {
            node.children.push(child);
            counts += sub;
        }
        node.children.sort_by_key(Node::ordinal);
        counts
    }
}

/// A fully built tree for one root.
#[derive(Debug)]
pub struct Tree {
    pub(crate) root: Node,
    pub(crate) visited: VisitedPaths,
    pub(crate) filter: NameFilter,
    counts: Counts,
}

impl Tree {
    /// Walk `path` and build its tree.
    pub fn build(path: impl Into<PathBuf>, provider: &dyn FsProvider, options: &Options) -> Self {
        let mut root = Node::new(path);
        let mut visited = VisitedPaths::default();
        let visitor = Visitor::new(provider, options);

        debug!(root = %root.path().display(), parallel = visitor.is_parallel(), "building tree");
        let counts = visitor.visit_root(&mut root, &mut visited);
        debug!(
            root = %root.path().display(),
            directories = counts.directories,
            files = counts.files,
            "tree built"
        );

        Self {
            root,
            visited,
            filter: visitor.filter,
            counts,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn visited(&self) -> &VisitedPaths {
        &self.visited
    }

    /// Aggregate size of the whole tree.
    pub fn total_size(&mut self) -> u64 {
        self.root.aggregate_size().bytes
    }
}
