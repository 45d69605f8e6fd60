//! CLI argument parsing for pdfsplice.
//!
//! This module defines the command-line interface using `clap` and turns
//! parsed arguments into [`SplitConfig`] and [`MergeConfig`] values.
//!
//! # Examples
//!
//! ```
//! use clap::Parser;
//! use pdfsplice::cli::{Cli, Command};
//!
//! let cli = Cli::parse_from(["pdfsplice", "split", "book.pdf", "--parts", "3"]);
//! assert!(matches!(cli.command, Command::Split(_)));
//! ```

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::SpliceError;
use crate::config::{
    CompressionLevel, DeliveryPolicy, MergeConfig, MergeInput, OverwriteMode, SplitConfig,
    SplitMode, SplitOptions,
};
use crate::range::RangeTokenPolicy;
use crate::utils::collect_paths_for_patterns;

/// Split and merge PDF files while keeping their bookmarks.
#[derive(Parser, Debug)]
#[command(name = "pdfsplice")]
#[command(version)]
#[command(about = "Split and merge PDF files while keeping their bookmarks", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output - show per-file details and statistics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite existing output files without confirmation
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Never overwrite existing output files
    #[arg(long, global = true, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Compression level for written PDFs
    ///
    /// - none: No compression (preserves exact structure)
    /// - standard: Compress content streams (default)
    /// - maximum: Also drop unreferenced objects
    #[arg(short, long, global = true, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split one PDF into several files
    Split(SplitArgs),
    /// Merge PDFs into one file with a bookmark per input
    Merge(MergeArgs),
    /// Print the bookmark tree of a PDF
    Outline(OutlineArgs),
}

/// Arguments of `pdfsplice split`.
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["pages_per_file", "parts", "ranges", "extract_all"])
))]
pub struct SplitArgs {
    /// PDF file to split
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory receiving the parts (created if missing)
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Put this many consecutive pages in each file
    #[arg(long, value_name = "N")]
    pub pages_per_file: Option<u32>,

    /// Split into this many files of nearly equal size
    #[arg(long, value_name = "N")]
    pub parts: Option<u32>,

    /// One file per range, e.g. "1-3, 5, 8-10"
    #[arg(long, value_name = "RANGES")]
    pub ranges: Option<String>,

    /// One file per page
    #[arg(long)]
    pub extract_all: bool,

    /// Reject malformed range tokens instead of skipping them (needs --ranges)
    #[arg(long)]
    pub strict_ranges: bool,

    /// Keep the files finished before a failing part
    #[arg(long)]
    pub best_effort: bool,
}

impl SplitArgs {
    fn mode(&self) -> SplitMode {
        if let Some(n) = self.pages_per_file {
            SplitMode::ByPageCount(n)
        } else if let Some(n) = self.parts {
            SplitMode::ByParts(n)
        } else if let Some(ranges) = &self.ranges {
            SplitMode::Custom(ranges.clone())
        } else {
            SplitMode::ExtractAll
        }
    }
}

/// Arguments of `pdfsplice merge`.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Input PDFs in merge order
    ///
    /// Append ":RANGES" to take only some pages, and use glob patterns to
    /// add several files at once.
    ///
    /// Examples:
    ///   pdfsplice merge a.pdf b.pdf:1-3,7 -o out.pdf
    ///   pdfsplice merge "chapters/*.pdf" -o book.pdf
    #[arg(value_name = "FILE[:RANGES]")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Read further inputs from a file (one per line, '-' for stdin)
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Number of files read concurrently (default: CPU cores)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
}

/// Arguments of `pdfsplice outline`.
#[derive(Args, Debug)]
pub struct OutlineArgs {
    /// PDF file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the tree as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Overwrite behavior selected by `--force` / `--no-clobber`.
    pub fn overwrite_mode(&self) -> OverwriteMode {
        if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        }
    }

    /// Parsed `--compression` value.
    pub fn compression_level(&self) -> crate::Result<CompressionLevel> {
        CompressionLevel::from_str(&self.compression)
    }

    /// Build a validated split configuration.
    pub fn split_config(&self, args: &SplitArgs) -> Result<SplitConfig> {
        if args.strict_ranges && args.ranges.is_none() {
            bail!("--strict-ranges can only be used with --ranges");
        }

        let options = SplitOptions {
            mode: args.mode(),
            token_policy: if args.strict_ranges {
                RangeTokenPolicy::Strict
            } else {
                RangeTokenPolicy::Lenient
            },
            delivery: if args.best_effort {
                DeliveryPolicy::BestEffort
            } else {
                DeliveryPolicy::AllOrNothing
            },
        };

        let config = SplitConfig {
            input: args.file.clone(),
            output_dir: args.output_dir.clone(),
            options,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode: self.overwrite_mode(),
            compression: self.compression_level()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build a validated merge configuration.
    ///
    /// Inputs from `--input-list` follow the positional ones. Glob patterns
    /// are expanded in place and share the page selection written after them.
    pub async fn merge_config(&self, args: &MergeArgs) -> Result<MergeConfig> {
        let mut entries = args.inputs.clone();
        if let Some(list) = &args.input_list {
            entries.extend(read_input_list(list).await?);
        }
        if entries.is_empty() {
            return Err(SpliceError::NoFilesToMerge.into());
        }

        let inputs = expand_inputs(&entries)?;
        let config = MergeConfig {
            inputs,
            output: args.output.clone(),
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode: self.overwrite_mode(),
            compression: self.compression_level()?,
            jobs: args.jobs,
        };
        config.validate()?;
        Ok(config)
    }
}

fn expand_inputs(entries: &[String]) -> Result<Vec<MergeInput>> {
    let mut inputs = Vec::with_capacity(entries.len());
    for entry in entries {
        let parsed = MergeInput::parse(entry);
        let pattern = parsed.path.to_string_lossy();
        let paths = collect_paths_for_patterns([pattern.as_ref()])
            .with_context(|| format!("Invalid input pattern: {pattern}"))?;
        inputs.extend(paths.into_iter().map(|path| MergeInput {
            path,
            pages: parsed.pages.clone(),
        }));
    }
    Ok(inputs)
}

/// Read input entries from a file, one per line.
///
/// Blank lines and lines starting with `#` are skipped. `-` reads stdin.
pub async fn read_input_list(path: &Path) -> crate::Result<Vec<String>> {
    use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

    let to_error = |source| SpliceError::FailedToReadInputList {
        path: path.to_path_buf(),
        source,
    };

    let source: Box<dyn AsyncRead + Unpin + Send> = if path.as_os_str() == "-" {
        Box::new(tokio::io::stdin())
    } else {
        Box::new(tokio::fs::File::open(path).await.map_err(to_error)?)
    };

    let mut lines = BufReader::new(source).lines();
    let mut entries = Vec::new();
    while let Some(line) = lines.next_line().await.map_err(to_error)? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        entries.push(line.to_string());
    }

    log::debug!("read {} input(s) from {}", entries.len(), path.display());
    Ok(entries)
}
