//! Error types for tree building and rendering.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while building or measuring a tree.
///
/// None of these abort a traversal. Access errors are stored on the node they
/// belong to and rendered inline; pattern errors disable the offending filter.
#[derive(Debug, Error)]
pub enum TreeError {
    /// `stat` or directory listing failed for a path.
    #[error("cannot access {path}: {source}")]
    NotAccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A user supplied include/exclude pattern did not compile.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Recursive counting reached a directory that was never expanded.
    #[error("depth {depth} was not expanded")]
    DepthExceeded { depth: usize },
}

impl TreeError {
    /// Create an access error with path context.
    pub fn access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::NotAccessible {
            path: path.into(),
            source,
        }
    }

    /// The short message shown in brackets next to an errored node.
    pub fn short_message(&self) -> String {
        match self {
            TreeError::NotAccessible { source, .. } => short_io_message(source),
            TreeError::Pattern { source, .. } => source.to_string(),
            TreeError::DepthExceeded { .. } => "depth too high".to_string(),
        }
    }
}

fn short_io_message(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "no such file or directory".to_string(),
        io::ErrorKind::PermissionDenied => "permission denied".to_string(),
        io::ErrorKind::NotADirectory => "not a directory".to_string(),
        _ => {
            let text = err.to_string();
            // Drop the " (os error N)" suffix std appends to raw OS errors.
            match text.find(" (os error") {
                Some(idx) => text[..idx].to_lowercase(),
                None => text.to_lowercase(),
            }
        }
    }
}
