//! Text tree renderer.
//!
//! `Printer` walks a built [`Tree`] depth first. Sorting, size aggregation
//! and symlink following happen lazily here, after the build has joined, so
//! every mutation of the tree in this module is single threaded.

use std::io::{self, Write};
use std::path::Path;

use crate::config::Options;
use crate::fs::FsProvider;
use crate::tree::{
    Budget, Comparator, Counts, Followed, Node, Tree, VisitedPaths, Visitor, descend,
    descendant_count,
};

use super::color::{Styled, indicator, paint};
use super::columns::{ColumnWidths, OwnerCache, human_size, join_cells, property_cells, size_cell};

const BRANCH: &str = "┣━ ";
const LAST_BRANCH: &str = "┗━ ";
const PIPE: &str = "┃ ";
const SPACE: &str = "  ";
const SUMMARY: &str = "┖┄ ";

/// Appended to a symlink whose target directory is already in the tree.
pub const RECURSIVE_NOTE: &str = " [recursive, not followed]";

/// Renders trees as indented text.
pub struct Printer<'a, W: Write> {
    out: W,
    options: &'a Options,
    provider: &'a dyn FsProvider,
    visitor: Option<Visitor<'a>>,
    comparator: Comparator,
    owners: OwnerCache,
    widths: ColumnWidths,
}

impl<'a, W: Write> Printer<'a, W> {
    pub fn new(out: W, provider: &'a dyn FsProvider, options: &'a Options) -> Self {
        Self {
            out,
            options,
            provider,
            visitor: None,
            comparator: Comparator::from_options(options),
            owners: OwnerCache::new(options.numeric_ids),
            widths: ColumnWidths::default(),
        }
    }

    /// Print one tree.
    pub fn print(&mut self, tree: &mut Tree) -> io::Result<()> {
        if self.options.follow_links {
            let filter = tree.filter.clone();
            self.visitor = Some(Visitor::sequential(self.provider, self.options, filter));
        }
        self.widths = ColumnWidths::measure(&tree.root, self.options, &mut self.owners);
        let budget = if self.options.depth.is_auto() {
            Budget::Pending
        } else {
            Budget::Unlimited
        };
        self.print_node(&mut tree.root, &mut tree.visited, "", "", budget)
    }

    /// Print the footer for everything printed so far.
    pub fn write_report(&mut self, report: &Report) -> io::Result<()> {
        writeln!(self.out, "{}", report.render(self.options))
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_node(
        &mut self,
        node: &mut Node,
        visited: &mut VisitedPaths,
        indent: &str,
        child_indent: &str,
        budget: Budget,
    ) -> io::Result<()> {
        if let Some(err) = node.error() {
            let name = self.quoted(display_name(node, self.options));
            return writeln!(self.out, "{indent}{name} [{}]", err.short_message());
        }

        let props = self.properties(node);
        let props_width = props.chars().count();

        let mut name = self.styled(node, self.quoted(display_name(node, self.options)));
        let node = self.join_chain(node, &mut name);
        if self.options.classify {
            if let Some(mark) = indicator(node.metadata(), node.is_dir()) {
                name.push(mark);
            }
        }
        if node.is_symlink() {
            self.describe_link(node, visited, &mut name);
        }
        writeln!(self.out, "{props}{indent}{name}")?;

        if node.children().is_empty() {
            return Ok(());
        }

        // Only reachable with size display: the visitor stops at the limit
        // otherwise.
        if let Some(max) = self.options.depth.fixed() {
            if node.depth() >= max {
                if max > 1 {
                    self.write_summary(node, props_width, child_indent)?;
                }
                return Ok(());
            }
        }

        let Some(next) = descend(node, budget, self.joins()) else {
            return self.write_summary(node, props_width, child_indent);
        };

        let comparator = self.comparator;
        let children = node.sorted_children(&comparator);
        let last = children.len().saturating_sub(1);
        for (i, child) in children.iter_mut().enumerate() {
            let (current, continuation) = if self.options.no_indent {
                (String::new(), String::new())
            } else if i == last {
                (format!("{child_indent}{LAST_BRANCH}"), format!("{child_indent}{SPACE}"))
            } else {
                (format!("{child_indent}{BRANCH}"), format!("{child_indent}{PIPE}"))
            };
            self.print_node(child, visited, &current, &continuation, next)?;
        }
        Ok(())
    }

    fn properties(&mut self, node: &mut Node) -> String {
        let size = self.options.show_size().then(|| {
            let total = node.aggregate_size();
            size_cell(total.bytes, total.complete, self.options)
        });
        let Some(meta) = node.metadata() else {
            return String::new();
        };
        let cells = property_cells(meta, size, self.options, &self.widths, &mut self.owners);
        join_cells(&cells)
    }

    fn joins(&self) -> bool {
        self.options.join_single_dirs && !self.options.blocks_joining()
    }

    /// Follow single-child directories, extending `name` with each step.
    /// Returns the node whose children are printed next.
    fn join_chain<'n>(&self, mut node: &'n mut Node, name: &mut String) -> &'n mut Node {
        if !self.joins() {
            return node;
        }
        while node.children().len() == 1 && node.children()[0].error().is_none() {
            let next = &mut node.children[0];
            let part = self.styled(next, self.quoted(next.name().to_string()));
            name.push('/');
            name.push_str(&part);
            node = next;
        }
        node
    }

    /// Append ` -> target` and, when following links, expand the target or
    /// mark it as recursive.
    fn describe_link(&self, node: &mut Node, visited: &mut VisitedPaths, name: &mut String) {
        let raw_target = self
            .provider
            .read_link(node.path())
            .unwrap_or_else(|_| node.path().to_path_buf());
        let resolved = self.provider.canonicalize(node.path()).ok();
        let target_meta = resolved.as_deref().and_then(|p| self.provider.stat(p).ok());

        let mut target = raw_target.display().to_string();
        if self.options.colorize && target_meta.is_some() {
            let is_dir = target_meta.as_ref().is_some_and(|m| m.is_dir());
            target = paint(
                &target,
                Styled {
                    name: &target,
                    meta: target_meta.as_ref(),
                    is_dir,
                    broken_link: false,
                },
            );
        }
        name.push_str(" -> ");
        name.push_str(&target);

        let Some(visitor) = &self.visitor else {
            return;
        };
        match visitor.follow_link(node, visited) {
            Followed::NotDirectory | Followed::Expanded { error: None } => {}
            Followed::Recursive => name.push_str(RECURSIVE_NOTE),
            Followed::Expanded { error: Some(err) } => name.push_str(&format!(" [{err}]")),
        }
    }

    fn write_summary(&mut self, node: &Node, props_width: usize, child_indent: &str) -> io::Result<()> {
        let count = descendant_count(node, self.options);
        writeln!(
            self.out,
            "{:w$}{child_indent}{SUMMARY}[{} file(s)]",
            "",
            self.options.locale.format(count),
            w = props_width
        )
    }

    fn quoted(&self, name: String) -> String {
        if self.options.quote_names {
            format!("\"{name}\"")
        } else {
            name
        }
    }

    fn styled(&self, node: &Node, text: String) -> String {
        if !self.options.colorize {
            return text;
        }
        let broken_link = node.is_symlink() && self.provider.canonicalize(node.path()).is_err();
        paint(
            &text,
            Styled {
                name: node.name(),
                meta: node.metadata(),
                is_dir: node.is_dir(),
                broken_link,
            },
        )
    }
}

/// Path for the root or with `full_path`, base name otherwise.
fn display_name(node: &Node, options: &Options) -> String {
    if node.depth() == 0 || options.full_path {
        path_text(node.path())
    } else {
        node.name().to_string()
    }
}

fn path_text(path: &Path) -> String {
    path.display().to_string()
}

/// Totals printed after all roots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    pub directories: u64,
    pub files: u64,
    pub size: u64,
}

impl Report {
    /// Add one tree's counts and total size.
    pub fn add(&mut self, tree: &mut Tree) {
        let Counts { directories, files } = tree.counts();
        self.directories += directories;
        self.files += files;
        self.size = self.size.saturating_add(tree.total_size());
    }

    /// The footer text, starting with a blank line.
    pub fn render(&self, options: &Options) -> String {
        let locale = &options.locale;
        let mut footer = format!("\n{} directories", locale.format(self.directories));
        if !options.dirs_only {
            footer.push_str(&format!(", {} files", locale.format(self.files)));
        }
        if options.show_human_size {
            footer.push_str(&format!(", {:>4} size", human_size(self.size)));
        } else if options.show_bytes {
            footer.push_str(&format!(", {} size", locale.format(self.size)));
        }
        footer
    }
}
