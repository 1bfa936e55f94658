//! Name styling: dircolors-like ANSI colors and `-F` indicators.

use std::io::{self, Write};
use std::path::Path;

use termcolor::{Ansi, Color, ColorSpec, WriteColor};

use crate::fs::{FileKind, Metadata};

const EXECUTABLE_EXTS: &[&str] = &["bat", "btm", "cmd", "com", "dll", "exe"];

const ARCHIVE_EXTS: &[&str] = &[
    "tar", "tgz", "arc", "arj", "taz", "lha", "lz4", "lzh", "lzma", "tlz", "txz", "tzo", "t7z",
    "zip", "z", "dz", "gz", "lrz", "lz", "lzo", "xz", "zst", "tzst", "bz2", "bz", "tbz", "tbz2",
    "tz", "deb", "rpm", "jar", "war", "ear", "sar", "rar", "alz", "ace", "zoo", "cpio", "7z", "rz",
    "cab", "wim", "swm", "dwm", "esd",
];

const IMAGE_EXTS: &[&str] = &[
    "jpg", "jpeg", "mjpg", "mjpeg", "gif", "bmp", "pbm", "pgm", "ppm", "tga", "xbm", "xpm", "tif",
    "tiff", "png", "svg", "svgz", "mng", "pcx", "mov", "mpg", "mpeg", "m2v", "mkv", "webm", "webp",
    "ogm", "mp4", "m4v", "mp4v", "vob", "qt", "nuv", "wmv", "asf", "rm", "rmvb", "flc", "avi",
    "fli", "flv", "gl", "dl", "xcf", "xwd", "yuv", "cgm", "emf", "ogv", "ogx",
];

const AUDIO_EXTS: &[&str] = &[
    "aac", "au", "flac", "m4a", "mid", "midi", "mka", "mp3", "mpc", "ogg", "ra", "wav", "oga",
    "opus", "spx", "xspf",
];

/// What the styler needs to know about an entry.
#[derive(Debug, Clone, Copy)]
pub struct Styled<'a> {
    pub name: &'a str,
    pub meta: Option<&'a Metadata>,
    /// Directories and followed symlinks.
    pub is_dir: bool,
    /// A symlink whose target cannot be resolved.
    pub broken_link: bool,
}

fn spec(fg: Color, bg: Option<Color>, bold: bool) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(fg)).set_bg(bg).set_bold(bold);
    spec
}

/// The color for an entry, or `None` for plain text.
pub fn style_for(entry: Styled<'_>) -> Option<ColorSpec> {
    let ext = Path::new(entry.name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    let has_ext = |list: &[&str]| ext.as_deref().is_some_and(|e| list.contains(&e));
    let kind = entry.meta.map(|m| m.kind);

    if has_ext(EXECUTABLE_EXTS) {
        return Some(spec(Color::Green, None, true));
    }
    if has_ext(ARCHIVE_EXTS) {
        return Some(spec(Color::Red, None, true));
    }
    if has_ext(IMAGE_EXTS) {
        return Some(spec(Color::Magenta, None, true));
    }
    if has_ext(AUDIO_EXTS) {
        return Some(spec(Color::Cyan, None, true));
    }
    if entry.is_dir {
        return Some(spec(Color::Blue, None, true));
    }
    match kind {
        Some(FileKind::Fifo) => Some(spec(Color::Yellow, Some(Color::Black), false)),
        Some(FileKind::Socket) => Some(spec(Color::Magenta, Some(Color::Black), true)),
        Some(FileKind::BlockDevice | FileKind::CharDevice) => {
            Some(spec(Color::Yellow, Some(Color::Black), true))
        }
        Some(FileKind::Symlink) if entry.broken_link => {
            Some(spec(Color::Red, Some(Color::Black), true))
        }
        Some(FileKind::Symlink) => Some(spec(Color::Cyan, None, true)),
        _ if entry.meta.is_some_and(Metadata::is_executable) => {
            Some(spec(Color::Green, None, true))
        }
        _ => None,
    }
}

/// `text` wrapped in the ANSI sequences for `entry`'s style.
pub fn paint(text: &str, entry: Styled<'_>) -> String {
    let Some(spec) = style_for(entry) else {
        return text.to_string();
    };
    match write_ansi(text, &spec) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => text.to_string(),
    }
}

fn write_ansi(text: &str, spec: &ColorSpec) -> io::Result<Vec<u8>> {
    let mut out = Ansi::new(Vec::new());
    out.set_color(spec)?;
    out.write_all(text.as_bytes())?;
    out.reset()?;
    Ok(out.into_inner())
}

/// The `-F` indicator for an entry: `/` directory, `*` executable,
/// `=` socket, `|` fifo.
pub fn indicator(meta: Option<&Metadata>, is_dir: bool) -> Option<char> {
    if is_dir {
        return Some('/');
    }
    let meta = meta?;
    match meta.kind {
        FileKind::Socket => Some('='),
        FileKind::Fifo => Some('|'),
        FileKind::File if meta.is_executable() => Some('*'),
        _ => None,
    }
}
