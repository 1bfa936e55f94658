//! JSON output formatting

use std::io::{self, Write};

use serde::Serialize;

use crate::config::Options;
use crate::fs::FsProvider;
use crate::tree::{Comparator, Followed, Node, Tree, VisitedPaths, Visitor};

use super::printer::Report;

/// Error recorded on a followed link whose target is already in the tree.
const RECURSIVE_ERROR: &str = "recursive, not followed";

/// One element of the JSON array: a root tree or the closing report.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonEntry {
    Directory {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        contents: Vec<JsonEntry>,
    },
    File {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Link {
        name: String,
        target: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        /// Entries of a followed directory target.
        #[serde(skip_serializing_if = "Option::is_none")]
        contents: Option<Vec<JsonEntry>>,
    },
    Report {
        directories: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        files: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
    },
}

impl JsonEntry {
    /// Convert a built tree, sorting children the same way the text output
    /// does. With `follow_links`, directory targets of symlinks are expanded
    /// into the link's `contents`.
    pub fn from_tree(tree: &mut Tree, provider: &dyn FsProvider, options: &Options) -> Self {
        let converter = Converter {
            provider,
            options,
            comparator: Comparator::from_options(options),
            visitor: options
                .follow_links
                .then(|| Visitor::sequential(provider, options, tree.filter.clone())),
        };
        converter.convert(&mut tree.root, &mut tree.visited)
    }

    pub fn report(report: &Report, options: &Options) -> Self {
        JsonEntry::Report {
            directories: report.directories,
            files: (!options.dirs_only).then_some(report.files),
            size: options.show_size().then_some(report.size),
        }
    }
}

struct Converter<'a> {
    provider: &'a dyn FsProvider,
    options: &'a Options,
    comparator: Comparator,
    visitor: Option<Visitor<'a>>,
}

impl Converter<'_> {
    fn convert(&self, node: &mut Node, visited: &mut VisitedPaths) -> JsonEntry {
        let name = if node.depth() == 0 || self.options.full_path {
            node.path().display().to_string()
        } else {
            node.name().to_string()
        };
        let size = self.options.show_size().then(|| node.aggregate_size().bytes);
        let error = node.error().map(|e| e.short_message());

        if node.is_symlink() {
            return self.convert_link(node, visited, name, size, error);
        }
        if !node.is_dir() {
            return JsonEntry::File { name, size, error };
        }

        let contents = self.convert_children(node, visited);
        JsonEntry::Directory {
            name,
            size,
            error,
            contents,
        }
    }

    fn convert_link(
        &self,
        node: &mut Node,
        visited: &mut VisitedPaths,
        name: String,
        size: Option<u64>,
        mut error: Option<String>,
    ) -> JsonEntry {
        let target = self
            .provider
            .read_link(node.path())
            .map(|t| t.display().to_string())
            .unwrap_or_default();

        let mut contents = None;
        if let Some(visitor) = &self.visitor {
            match visitor.follow_link(node, visited) {
                Followed::NotDirectory => {}
                Followed::Recursive => {
                    error.get_or_insert_with(|| RECURSIVE_ERROR.to_string());
                }
                Followed::Expanded { error: listing } => {
                    if listing.is_some() {
                        error = listing;
                    }
                    contents = Some(self.convert_children(node, visited));
                }
            }
        }
        JsonEntry::Link {
            name,
            target,
            size,
            error,
            contents,
        }
    }

    fn convert_children(&self, node: &mut Node, visited: &mut VisitedPaths) -> Vec<JsonEntry> {
        node.sorted_children(&self.comparator)
            .iter_mut()
            .map(|child| self.convert(child, visited))
            .collect()
    }
}

/// Write entries as a pretty-printed JSON array followed by a newline.
pub fn write_json<W: Write>(out: &mut W, entries: &[JsonEntry]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, entries).map_err(io::Error::other)?;
    writeln!(out)
}
