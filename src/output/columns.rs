//! Property columns printed before each name.

use std::collections::HashMap;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::config::Options;
use crate::fs::{FileKind, Metadata};
use crate::tree::Node;

/// Placeholder for a directory size that could not be determined.
pub const UNKNOWN_BYTES: &str = "???????????";
pub const UNKNOWN_HUMAN: &str = "????";

/// Resolves and caches user and group names.
#[derive(Debug, Default)]
pub struct OwnerCache {
    numeric: bool,
    users: HashMap<u32, String>,
    groups: HashMap<u32, String>,
}

impl OwnerCache {
    /// With `numeric` set, ids are never resolved to names.
    pub fn new(numeric: bool) -> Self {
        Self {
            numeric,
            ..Default::default()
        }
    }

    pub fn user(&mut self, uid: u32) -> &str {
        let numeric = self.numeric;
        self.users
            .entry(uid)
            .or_insert_with(|| resolve(numeric, uid, lookup_user))
    }

    pub fn group(&mut self, gid: u32) -> &str {
        let numeric = self.numeric;
        self.groups
            .entry(gid)
            .or_insert_with(|| resolve(numeric, gid, lookup_group))
    }
}

fn resolve(numeric: bool, id: u32, lookup: fn(u32) -> Option<String>) -> String {
    if numeric {
        return id.to_string();
    }
    lookup(id).unwrap_or_else(|| id.to_string())
}

#[cfg(unix)]
fn lookup_user(uid: u32) -> Option<String> {
    use nix::unistd::{Uid, User};
    User::from_uid(Uid::from_raw(uid)).ok().flatten().map(|u| u.name)
}

#[cfg(unix)]
fn lookup_group(gid: u32) -> Option<String> {
    use nix::unistd::{Gid, Group};
    Group::from_gid(Gid::from_raw(gid)).ok().flatten().map(|g| g.name)
}

#[cfg(not(unix))]
fn lookup_user(_uid: u32) -> Option<String> {
    None
}

#[cfg(not(unix))]
fn lookup_group(_gid: u32) -> Option<String> {
    None
}

/// Column widths measured over a whole tree before printing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnWidths {
    pub inode: usize,
    pub device: usize,
    pub owner: usize,
    pub group: usize,
}

impl ColumnWidths {
    /// Walk every node under `root` (printed or not) and record the widest
    /// value of each enabled column.
    pub fn measure(root: &Node, options: &Options, owners: &mut OwnerCache) -> Self {
        let mut widths = Self::default();
        widths.visit(root, options, owners);
        widths
    }

    fn visit(&mut self, node: &Node, options: &Options, owners: &mut OwnerCache) {
        let Some(raw) = node.metadata().and_then(|m| m.raw) else {
            return;
        };
        if options.show_inodes {
            self.inode = self.inode.max(digits(raw.inode));
        }
        if options.show_device {
            self.device = self.device.max(digits(raw.device));
        }
        if options.show_owner {
            self.owner = self.owner.max(owners.user(raw.uid).chars().count());
        }
        if options.show_group {
            self.group = self.group.max(owners.group(raw.gid).chars().count());
        }
        for child in node.children() {
            self.visit(child, options, owners);
        }
    }
}

fn digits(mut n: u64) -> usize {
    let mut count = 0;
    while n > 0 {
        count += 1;
        n /= 10;
    }
    count
}

/// The property cells for one node, in display order.
///
/// `size` is the already-resolved size cell; directories pass their
/// aggregate.
pub fn property_cells(
    meta: &Metadata,
    size: Option<String>,
    options: &Options,
    widths: &ColumnWidths,
    owners: &mut OwnerCache,
) -> Vec<String> {
    let mut cells = Vec::new();
    let raw = meta.raw;

    if let (true, Some(raw)) = (options.show_inodes, raw) {
        cells.push(format!("{:>w$}", raw.inode, w = widths.inode));
    }
    if let (true, Some(raw)) = (options.show_device, raw) {
        cells.push(format!("{:>w$}", raw.device, w = widths.device));
    }
    if options.show_mode {
        cells.push(mode_string(meta));
    }
    if let (true, Some(raw)) = (options.show_owner, raw) {
        cells.push(format!("{:<w$}", owners.user(raw.uid), w = widths.owner));
    }
    if let (true, Some(raw)) = (options.show_group, raw) {
        cells.push(format!("{:<w$}", owners.group(raw.gid), w = widths.group));
    }
    if let Some(size) = size {
        cells.push(size);
    }
    if options.show_mod_time {
        cells.push(format_mtime(meta.modified));
    }
    cells
}

/// Join property cells: one cell is followed by a space, several are
/// bracketed.
pub fn join_cells(cells: &[String]) -> String {
    match cells {
        [] => String::new(),
        [one] => format!("{one} "),
        many => format!("[{}] ", many.join(" ")),
    }
}

/// The size cell, right aligned. `known` is false for partial directory
/// totals; they only show a placeholder when nothing at all was counted.
pub fn size_cell(bytes: u64, known: bool, options: &Options) -> String {
    if options.show_human_size {
        if !known && bytes == 0 {
            return UNKNOWN_HUMAN.to_string();
        }
        format!("{:>4}", human_size(bytes))
    } else {
        if !known && bytes == 0 {
            return UNKNOWN_BYTES.to_string();
        }
        format!("{bytes:>11}")
    }
}

/// Format a size in bytes to at most four characters (`999`, `1.5K`, `12M`).
pub fn human_size(bytes: u64) -> String {
    const UNITS: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];
    const STEP: f64 = 1024.0;

    if bytes < 1024 {
        return bytes.to_string();
    }
    let mut value = bytes as f64 / STEP;
    let mut unit = 0;
    while value >= STEP && unit < UNITS.len() - 1 {
        value /= STEP;
        unit += 1;
    }
    if value < 9.95 {
        format!("{:.1}{}", value, UNITS[unit])
    } else {
        format!("{:.0}{}", value, UNITS[unit])
    }
}

/// `ls -l` style type and permission string, e.g. `drwxr-xr-x`.
pub fn mode_string(meta: &Metadata) -> String {
    let kind = match meta.kind {
        FileKind::Dir => 'd',
        FileKind::Symlink => 'l',
        FileKind::Fifo => 'p',
        FileKind::Socket => 's',
        FileKind::BlockDevice => 'b',
        FileKind::CharDevice => 'c',
        FileKind::File => '-',
    };
    let bits = meta.permissions;
    let mut out = String::with_capacity(10);
    out.push(kind);
    for (shift, special, lower, upper) in [(6, 0o4000, 's', 'S'), (3, 0o2000, 's', 'S'), (0, 0o1000, 't', 'T')] {
        let triad = (bits >> shift) & 0o7;
        out.push(if triad & 0o4 != 0 { 'r' } else { '-' });
        out.push(if triad & 0o2 != 0 { 'w' } else { '-' });
        let exec = triad & 0o1 != 0;
        out.push(match (bits & special != 0, exec) {
            (true, true) => lower,
            (true, false) => upper,
            (false, true) => 'x',
            (false, false) => '-',
        });
    }
    out
}

/// Local modification time as `YYYY-MM-DD HH:MM`.
pub fn format_mtime(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}
