//! Arbor - a tree command that builds concurrently and knows when to stop

pub mod config;
pub mod error;
pub mod fs;
pub mod locale;
pub mod logging;
pub mod output;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{DepthLimit, Options};
pub use error::TreeError;
pub use fs::{FsProvider, MemoryFs, OsFs};
pub use locale::NumberLocale;
pub use output::{JsonEntry, Printer, Report, write_json};
pub use tree::{Comparator, Counts, Node, SortKind, Tree, Visitor};
