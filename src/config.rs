//! Configuration record for one invocation.

use crate::locale::NumberLocale;
use crate::tree::SortKind;

/// How deep the tree is expanded and printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthLimit {
    /// Print everything.
    Unlimited,
    /// Stop after this many levels below the root.
    Fixed(usize),
    /// Let the render planner decide per directory.
    #[default]
    Auto,
}

impl DepthLimit {
    /// Map a `-L` style level: 0 is unlimited, negative is automatic.
    pub fn from_level(level: i64) -> Self {
        match level {
            0 => DepthLimit::Unlimited,
            n if n < 0 => DepthLimit::Auto,
            n => DepthLimit::Fixed(n as usize),
        }
    }

    /// The fixed limit, if one is configured.
    pub fn fixed(&self) -> Option<usize> {
        match self {
            DepthLimit::Fixed(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, DepthLimit::Auto)
    }
}

/// Options for a single invocation. Immutable once traversal starts.
#[derive(Debug, Clone)]
pub struct Options {
    // Listing
    pub all: bool,
    pub dirs_only: bool,
    pub full_path: bool,
    pub ignore_case: bool,
    pub follow_links: bool,
    pub depth: DepthLimit,
    pub include_pattern: Option<String>,
    pub exclude_pattern: Option<String>,
    // Columns
    pub show_bytes: bool,
    pub show_human_size: bool,
    pub show_mode: bool,
    pub show_owner: bool,
    pub show_group: bool,
    pub show_mod_time: bool,
    pub show_inodes: bool,
    pub show_device: bool,
    pub numeric_ids: bool,
    // Names
    pub quote_names: bool,
    pub classify: bool,
    // Sort
    pub sort: SortKind,
    pub dirs_first: bool,
    pub reverse: bool,
    // Graphics
    pub no_indent: bool,
    pub colorize: bool,
    pub join_single_dirs: bool,
    pub no_report: bool,
    /// Worker threads for the build phase.
    /// 0 = available parallelism, 1 = sequential.
    pub workers: usize,
    pub locale: NumberLocale,
}

impl Options {
    /// Whether any size column (bytes or human readable) is requested.
    pub fn show_size(&self) -> bool {
        self.show_bytes || self.show_human_size
    }

    /// Whether a column is shown that would make joined chains misleading.
    pub fn blocks_joining(&self) -> bool {
        self.show_inodes
            || self.show_device
            || self.show_mode
            || self.show_owner
            || self.show_group
            || self.show_mod_time
            || self.full_path
    }

    /// Whether the visitor stops expanding at this depth.
    ///
    /// Size display overrides a fixed limit so aggregate sizes stay correct.
    pub fn stops_at(&self, depth: usize) -> bool {
        !self.show_size() && self.depth.fixed().is_some_and(|max| depth >= max)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            all: false,
            dirs_only: false,
            full_path: false,
            ignore_case: false,
            follow_links: false,
            depth: DepthLimit::Auto,
            include_pattern: None,
            exclude_pattern: None,
            show_bytes: false,
            show_human_size: false,
            show_mode: false,
            show_owner: false,
            show_group: false,
            show_mod_time: false,
            show_inodes: false,
            show_device: false,
            numeric_ids: false,
            quote_names: false,
            classify: false,
            sort: SortKind::Name,
            dirs_first: false,
            reverse: false,
            no_indent: false,
            colorize: false,
            join_single_dirs: true,
            no_report: false,
            workers: 0,
            locale: NumberLocale::plain(),
        }
    }
}
