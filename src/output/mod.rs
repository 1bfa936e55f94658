//! Tree formatting and display
//!
//! - `printer` - indented text renderer, automatic depth and the footer report
//! - `columns` - property columns (inode, device, mode, owner, group, size, mtime)
//! - `color` - ANSI name colors and `-F` indicators
//! - `json` - JSON output

mod color;
mod columns;
mod json;
mod printer;

pub use color::{Styled, indicator, paint, style_for};
pub use columns::{
    ColumnWidths, OwnerCache, UNKNOWN_BYTES, UNKNOWN_HUMAN, format_mtime, human_size, mode_string,
};
pub use json::{JsonEntry, write_json};
pub use printer::{Printer, RECURSIVE_NOTE, Report};
