//! chunkdupe - Incremental Duplicate File Finder
//!
//! Finds groups of byte-identical files by reading them chunk by chunk and
//! refining candidate groups round by round. Files stop being read as soon
//! as no other file shares their running hash, so distinct files are told
//! apart after their first differing chunk instead of a full read.
//!
//! The detector itself is independent of the filesystem: it works over any
//! [`source::ItemSource`] with any [`hasher::HashCombiner`].
//!
//! ```
//! use chunkdupe::duplicates::DupDetector;
//! use chunkdupe::hasher::Xxh3Combiner;
//! use chunkdupe::source::MemorySource;
//!
//! let source = MemorySource::new(
//!     vec![b"same".to_vec(), b"diff".to_vec(), b"same".to_vec()],
//!     2,
//! )
//! .unwrap();
//! let mut detector = DupDetector::new(source, Xxh3Combiner).unwrap();
//! detector.detect().unwrap();
//!
//! let clusters = detector.result().unwrap();
//! assert!(clusters.contains(&vec![0, 2]));
//! assert!(clusters.contains(&vec![1]));
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod source;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use cli::{Cli, Commands, OutputFormat, ScanArgs};
use config::Config;
use duplicates::{DuplicateFinder, FinderConfig};
use error::ExitCode;
use output::{CsvOutput, JsonOutput, TextOutput};
use progress::Progress;
use scanner::WalkerConfig;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a directory cannot be
/// scanned, or results cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    log::debug!("Log level: {}", logging::current_level_name());

    if cli.no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    log::debug!("Configuration: {:?}", config);

    match cli.command {
        Commands::Scan(args) => run_scan(&args, config, cli.quiet),
    }
}

fn run_scan(args: &ScanArgs, mut config: Config, quiet: bool) -> Result<ExitCode> {
    config.apply_scan_args(args);

    if let (Some(min), Some(max)) = (args.min_size, args.max_size) {
        if min > max {
            bail!("--min-size ({min}) is larger than --max-size ({max})");
        }
    }

    let walker_config = WalkerConfig {
        recursive: config.recursive,
        follow_symlinks: config.follow_symlinks,
        skip_hidden: config.skip_hidden,
        min_size: args.min_size,
        max_size: args.max_size,
        ignore_patterns: config.ignore_patterns.clone(),
    };

    let mut finder_config = FinderConfig::default()
        .with_chunk_size(config.chunk_size)
        .with_hash(config.hash)
        .with_walker_config(walker_config)
        .with_include_unique(args.include_unique);

    let show_progress = args.output == OutputFormat::Text && io::stderr().is_terminal();
    if show_progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(quiet)));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder.find_duplicates(&args.paths)?;
    let exit_code = ExitCode::from_duplicate_groups(summary.duplicate_groups);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => TextOutput::new(&groups, &summary)
            .write_to(&mut out)
            .context("Failed to write results")?,
        OutputFormat::Json => JsonOutput::new(&groups, &summary, exit_code)
            .write_to(&mut out, true)
            .context("Failed to write JSON results")?,
        OutputFormat::Csv => CsvOutput::new(&groups)
            .write_to(&mut out)
            .context("Failed to write CSV results")?,
    }
    out.flush().context("Failed to flush output")?;

    Ok(exit_code)
}
