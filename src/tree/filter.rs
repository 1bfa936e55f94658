//! Name filtering for tree walking

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::config::Options;
use crate::error::TreeError;

use super::node::Node;

/// Decides which directory entries make it into the tree.
///
/// Hidden and backup names are rejected before the entry is visited. The
/// pattern and dirs-only rules apply after the visit, and only to entries
/// that were successfully read and are not directories.
#[derive(Debug, Clone)]
pub struct NameFilter {
    all: bool,
    dirs_only: bool,
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl NameFilter {
    pub fn new(options: &Options) -> Self {
        Self {
            all: options.all,
            dirs_only: options.dirs_only,
            include: compile_or_disable(options.include_pattern.as_deref(), options.ignore_case),
            exclude: compile_or_disable(options.exclude_pattern.as_deref(), options.ignore_case),
        }
    }

    /// Compile a user pattern.
    pub fn compile(pattern: &str, ignore_case: bool) -> Result<Regex, TreeError> {
        RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|source| TreeError::Pattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Whether a name is skipped without being visited.
    pub fn skips_name(&self, name: &str) -> bool {
        if !self.all && name.starts_with('.') {
            return true;
        }
        name.ends_with('~') || name.ends_with(".bak")
    }

    /// Whether a visited entry is kept.
    pub fn keeps(&self, node: &Node) -> bool {
        if node.error().is_some() || node.is_dir() {
            return true;
        }
        if self.dirs_only {
            return false;
        }
        let name = node.name();
        if let Some(re) = &self.include {
            if !re.is_match(name) {
                return false;
            }
        }
        if let Some(re) = &self.exclude {
            if re.is_match(name) {
                return false;
            }
        }
        true
    }
}

fn compile_or_disable(pattern: Option<&str>, ignore_case: bool) -> Option<Regex> {
    let pattern = pattern.filter(|p| !p.is_empty())?;
    match NameFilter::compile(pattern, ignore_case) {
        Ok(re) => Some(re),
        Err(err) => {
            warn!("{err}; filter disabled");
            None
        }
    }
}
