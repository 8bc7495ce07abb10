//! CLI entry point for dtscan

use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use dtscan::{
    Entry, FullFormatter, JsonFormatter, LocalBackend, LocalConfig, RecordFormatter,
    StreamingWalker, TreeWalker, format_size,
};
use tracing::{Level, error, info};

/// Report format
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    /// Full paths with recursive sizes, parents before children
    #[default]
    Full,
    /// Streaming parent-indexed records
    Reverse,
    /// Full mode as JSON lines
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "dtscan")]
#[command(about = "Report per-entry sizes and recursive directory totals, like du")]
#[command(version)]
struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_name = "FORMAT", default_value = "full")]
    format: Format,

    /// Name given to the scan root in emitted paths (empty leaves it out)
    #[arg(long = "root-name", value_name = "NAME", default_value = "")]
    root_name: String,

    /// Leave out entries matching pattern (can be used multiple times)
    #[arg(short = 'I', long = "ignore")]
    ignore: Vec<String>,

    /// Follow symbolic links
    #[arg(short = 'L', long = "follow-symlinks")]
    follow_symlinks: bool,

    /// Leave out dot-files and dot-directories
    #[arg(long = "skip-hidden")]
    skip_hidden: bool,

    /// Omit entries whose path is longer than this many bytes
    #[arg(long = "max-path-len", value_name = "BYTES", default_value = "4096")]
    max_path_len: usize,

    /// Log skipped entries and navigation failures
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    let config = LocalConfig {
        follow_symlinks: args.follow_symlinks,
        ignore_patterns: args.ignore.clone(),
        max_path_len: args.max_path_len,
        skip_hidden: args.skip_hidden,
    };

    let backend = match LocalBackend::open(&args.path, config) {
        Ok(b) => b,
        Err(e) => {
            error!("cannot scan '{}': {}", args.path.display(), e);
            process::exit(1);
        }
    };

    let started = Instant::now();
    let mut root = Entry::root(args.root_name.clone().into_bytes());
    let out = BufWriter::new(io::stdout().lock());

    let result = match args.format {
        Format::Full => TreeWalker::new(backend).walk(&mut root, &mut FullFormatter::new(out)),
        Format::Json => TreeWalker::new(backend).walk(&mut root, &mut JsonFormatter::new(out)),
        Format::Reverse => StreamingWalker::new(backend)
            .walk_streaming(&mut root, &mut RecordFormatter::new(out)),
    };

    match result {
        Ok(summary) => {
            let elapsed = Duration::from_millis(started.elapsed().as_millis() as u64);
            info!(
                dirs = summary.dirs,
                files = summary.files,
                skipped = summary.skipped,
                total = %format_size(summary.total_size),
                elapsed = %humantime::format_duration(elapsed),
                "scan finished"
            );
        }
        Err(e) => {
            error!(code = e.code(), "scan aborted: {}", e);
            process::exit(1);
        }
    }
}
