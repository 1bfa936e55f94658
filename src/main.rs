//! CLI entry point for arbor

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use arbor::fs::{FsProvider, absolute_clean};
use arbor::logging::init_logging;
use arbor::tree::NameFilter;
use arbor::{
    DepthLimit, JsonEntry, NumberLocale, Options, OsFs, Printer, Report, SortKind, Tree,
    write_json,
};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, warn};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Sort order selectable with --sort
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Version,
    Size,
    Mtime,
    Ctime,
    None,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            // Respect FORCE_COLOR environment variable
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            // Respect TERM=dumb
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            // Check if stdout is a TTY
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(about = "A tree command that builds in parallel and knows when to stop")]
#[command(version)]
#[command(disable_help_flag = true)]
struct Args {
    /// Directories to display
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    // ----------------------- Listing options ----------------------
    /// All files are listed (hidden files too)
    #[arg(short, long)]
    all: bool,

    /// List directories only
    #[arg(short = 'd', long = "dirs-only")]
    dirs_only: bool,

    /// Print the full path prefix for each file
    #[arg(short = 'f', long = "full-path")]
    full_path: bool,

    /// Follow symbolic links like directories
    #[arg(short = 'l', long = "follow")]
    follow: bool,

    /// Descend only N levels deep (0 = all, negative = automatic)
    #[arg(
        short = 'L',
        long = "level",
        value_name = "N",
        default_value_t = -1,
        allow_negative_numbers = true
    )]
    level: i64,

    /// List only files matching the regular expression
    #[arg(short = 'P', long = "pattern", value_name = "REGEX")]
    pattern: Option<String>,

    /// Do not list files matching the regular expression
    #[arg(short = 'I', long = "ignore", value_name = "REGEX")]
    ignore: Option<String>,

    /// Ignore case when pattern matching
    #[arg(long = "ignore-case")]
    ignore_case: bool,

    /// Output to file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Turn off the file/directory count at the end of the listing
    #[arg(long = "noreport")]
    no_report: bool,

    // ----------------------- File options -------------------------
    /// Print the date of last modification
    #[arg(short = 'D', long = "mtime")]
    mtime: bool,

    /// Print the group owner or GID number
    #[arg(short = 'g', long = "gid")]
    gid: bool,

    /// Print sizes in a human readable way
    #[arg(short = 'h', long = "human")]
    human: bool,

    /// Print the protections for each file
    #[arg(short = 'p', long = "protections")]
    protections: bool,

    /// Print the size in bytes of each file
    #[arg(short = 's', long = "bytes")]
    bytes: bool,

    /// Print the file owner or UID number
    #[arg(short = 'u', long = "uid")]
    uid: bool,

    /// Print the device ID each file belongs to
    #[arg(long = "device")]
    device: bool,

    /// Print the inode number of each file
    #[arg(long = "inodes")]
    inodes: bool,

    /// Print user and group IDs as numbers
    #[arg(long = "numeric-uid-gid")]
    numeric_ids: bool,

    // ---------------------- Sorting options -----------------------
    /// Leave files unsorted
    #[arg(short = 'U')]
    unsorted: bool,

    /// Sort files alphanumerically by version
    #[arg(short = 'v')]
    version_sort: bool,

    /// Sort files by last modification time
    #[arg(short = 't')]
    mtime_sort: bool,

    /// Sort files by last status change time
    #[arg(short = 'c')]
    ctime_sort: bool,

    /// Reverse the order of the sort
    #[arg(short = 'r')]
    reverse: bool,

    /// List directories before files (-U disables)
    #[arg(long = "dirsfirst")]
    dirs_first: bool,

    /// Select sort order
    #[arg(long = "sort", value_name = "KIND")]
    sort: Option<SortArg>,

    // ---------------------- Graphics options ----------------------
    /// Turn colorization on always
    #[arg(short = 'C')]
    force_color: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Append an indicator (one of /*=|) to entries
    #[arg(short = 'F', long = "classify")]
    classify: bool,

    /// Turn joining of single-child directories off
    #[arg(short = 'J', long = "nojoin")]
    no_join: bool,

    /// Quote file names with double quotes
    #[arg(short = 'Q', long = "quote")]
    quote: bool,

    /// Don't print indentation lines
    #[arg(short = 'i', long = "noindent")]
    no_indent: bool,

    // ---------------------- Other options -------------------------
    /// Number of worker threads for scanning (0 = all cores, 1 = sequential)
    #[arg(short = 'j', long = "jobs", value_name = "N", default_value_t = 0)]
    jobs: usize,

    /// Output in JSON format
    #[arg(long = "json")]
    json: bool,

    /// Print help
    #[arg(long = "help", action = ArgAction::Help)]
    help: Option<bool>,
}

fn sort_kind(args: &Args) -> SortKind {
    if args.unsorted || matches!(args.sort, Some(SortArg::None)) {
        return SortKind::None;
    }
    match args.sort {
        Some(SortArg::Mtime) => SortKind::ModTime,
        Some(SortArg::Ctime) => SortKind::ChangeTime,
        Some(SortArg::Version) => SortKind::Version,
        Some(SortArg::Size) => SortKind::Size,
        Some(SortArg::Name) => SortKind::Name,
        _ if args.mtime_sort => SortKind::ModTime,
        _ if args.ctime_sort => SortKind::ChangeTime,
        _ if args.version_sort => SortKind::Version,
        _ => SortKind::Name,
    }
}

fn build_options(args: &Args) -> Options {
    let colorize = args.force_color || (args.output.is_none() && should_use_color(args.color));
    Options {
        all: args.all,
        dirs_only: args.dirs_only,
        full_path: args.full_path,
        ignore_case: args.ignore_case,
        follow_links: args.follow,
        depth: DepthLimit::from_level(args.level),
        include_pattern: args.pattern.clone(),
        exclude_pattern: args.ignore.clone(),
        show_bytes: args.bytes,
        show_human_size: args.human,
        show_mode: args.protections,
        show_owner: args.uid,
        show_group: args.gid,
        show_mod_time: args.mtime,
        show_inodes: args.inodes,
        show_device: args.device,
        numeric_ids: args.numeric_ids,
        quote_names: args.quote,
        classify: args.classify,
        sort: sort_kind(args),
        dirs_first: args.dirs_first,
        reverse: args.reverse,
        no_indent: args.no_indent,
        colorize,
        join_single_dirs: !args.no_join,
        no_report: args.no_report,
        workers: args.jobs,
        locale: NumberLocale::from_env(),
    }
}

/// Drop patterns that do not compile so the warning is only logged once.
fn disable_invalid_patterns(options: &mut Options) {
    let ignore_case = options.ignore_case;
    for pattern in [&mut options.include_pattern, &mut options.exclude_pattern] {
        if let Some(p) = pattern.as_deref() {
            if let Err(err) = NameFilter::compile(p, ignore_case) {
                warn!("{err}; filter disabled");
                *pattern = None;
            }
        }
    }
}

/// Make a root absolute and resolve it if it is itself a symlink.
fn normalize_root(provider: &dyn FsProvider, root: &Path) -> PathBuf {
    let absolute = absolute_clean(root);
    match provider.stat(&absolute) {
        Ok(meta) if meta.is_symlink() => provider.canonicalize(&absolute).unwrap_or(absolute),
        _ => absolute,
    }
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn run_text(roots: &[PathBuf], options: &Options, out: Box<dyn Write>) -> io::Result<()> {
    let mut printer = Printer::new(out, &OsFs, options);
    let mut report = Report::default();
    for root in roots {
        let mut tree = Tree::build(root.clone(), &OsFs, options);
        report.add(&mut tree);
        printer.print(&mut tree)?;
    }
    if !options.no_report {
        printer.write_report(&report)?;
    }
    printer.into_inner().flush()
}

fn run_json(roots: &[PathBuf], options: &Options, mut out: Box<dyn Write>) -> io::Result<()> {
    let mut report = Report::default();
    let mut entries = Vec::with_capacity(roots.len() + 1);
    for root in roots {
        let mut tree = Tree::build(root.clone(), &OsFs, options);
        report.add(&mut tree);
        entries.push(JsonEntry::from_tree(&mut tree, &OsFs, options));
    }
    if !options.no_report {
        entries.push(JsonEntry::report(&report, options));
    }
    write_json(&mut out, &entries)?;
    out.flush()
}

fn main() {
    init_logging();
    let args = Args::parse();

    let mut options = build_options(&args);
    disable_invalid_patterns(&mut options);
    debug!(?options, "options resolved");

    let roots: Vec<PathBuf> = args
        .paths
        .iter()
        .map(|p| normalize_root(&OsFs, p))
        .collect();

    let out = match open_output(args.output.as_deref()) {
        Ok(out) => out,
        Err(e) => {
            let target = args
                .output
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "stdout".to_string());
            eprintln!("arbor: cannot open '{}': {}", target, e);
            process::exit(1);
        }
    };

    let result = if args.json {
        run_json(&roots, &options, out)
    } else {
        run_text(&roots, &options, out)
    };

    if let Err(e) = result {
        eprintln!("arbor: error writing output: {}", e);
        process::exit(1);
    }
}
