//! Child ordering.

use std::cmp::Ordering;
use std::time::SystemTime;

use crate::config::Options;

use super::node::Node;

/// Primary sort key for sibling entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKind {
    /// Keep the order the provider listed entries in.
    None,
    /// Byte-wise name order.
    #[default]
    Name,
    /// Names with numeric runs compared as numbers (`file2` < `file10`).
    Version,
    /// Aggregate size, smallest first.
    Size,
    /// Modification time, oldest first.
    ModTime,
    /// Status change time, oldest first.
    ChangeTime,
}

/// The ordering resolved once from [`Options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparator {
    kind: SortKind,
    dirs_first: bool,
    reverse: bool,
}

impl Comparator {
    pub fn new(kind: SortKind, dirs_first: bool, reverse: bool) -> Self {
        Self {
            kind,
            dirs_first,
            reverse,
        }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::new(options.sort, options.dirs_first, options.reverse)
    }

    /// Whether directory sizes must be aggregated before sorting.
    pub fn needs_sizes(&self) -> bool {
        self.kind == SortKind::Size
    }

    pub fn compare(&self, a: &Node, b: &Node) -> Ordering {
        // Listing order ignores both decorators.
        if self.kind == SortKind::None {
            return a.ordinal().cmp(&b.ordinal());
        }

        let ordering = if self.dirs_first {
            b.is_dir()
                .cmp(&a.is_dir())
                .then_with(|| self.primary(a, b))
        } else {
            self.primary(a, b)
        };

        if self.reverse {
            ordering.reverse()
        } else {
            ordering
        }
    }

    fn primary(&self, a: &Node, b: &Node) -> Ordering {
        let by_name = || a.name().cmp(b.name());
        match self.kind {
            SortKind::None => a.ordinal().cmp(&b.ordinal()),
            SortKind::Name => by_name(),
            SortKind::Version => version_cmp(a.name(), b.name()),
            SortKind::Size => a.cached_size().cmp(&b.cached_size()).then_with(by_name),
            SortKind::ModTime => modified(a).cmp(&modified(b)).then_with(by_name),
            SortKind::ChangeTime => match (changed(a), changed(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => modified(a).cmp(&modified(b)),
            }
            .then_with(by_name),
        }
    }

    /// Sort a sibling list in place (stable).
    pub fn sort(&self, nodes: &mut [Node]) {
        nodes.sort_by(|a, b| self.compare(a, b));
    }
}

fn modified(node: &Node) -> SystemTime {
    node.metadata()
        .map_or(SystemTime::UNIX_EPOCH, |m| m.modified)
}

fn changed(node: &Node) -> Option<SystemTime> {
    node.metadata().and_then(|m| m.changed)
}

impl Node {
    /// Children ordered by `comparator`. The sort happens once per node;
    /// later calls return the cached order.
    pub fn sorted_children(&mut self, comparator: &Comparator) -> &mut [Node] {
        if !self.sorted {
            if comparator.needs_sizes() {
                for child in &mut self.children {
                    child.aggregate_size();
                }
            }
            comparator.sort(&mut self.children);
            self.sorted = true;
        }
        &mut self.children
    }
}

/// Compare names treating runs of ASCII digits as integers.
///
/// Leading zeros do not change the numeric value; when two names are
/// otherwise equal the plain byte order decides.
pub fn version_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (is_numeric(x), is_numeric(y)) {
                    (true, true) => numeric_cmp(x, y),
                    _ => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn is_numeric(chunk: &str) -> bool {
    chunk.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

fn numeric_cmp(x: &str, y: &str) -> Ordering {
    let x = x.trim_start_matches('0');
    let y = y.trim_start_matches('0');
    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
}

/// Splits a name into alternating digit and non-digit runs.
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.as_bytes().first()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .bytes()
            .position(|b| b.is_ascii_digit() != digits)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}
