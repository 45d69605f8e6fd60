//! Configuration module for pdfsplice.
//!
//! This module turns CLI arguments into validated settings for the split
//! and merge jobs. It handles:
//! - Validation of argument combinations
//! - Parsing of per-file page selections for merges
//! - Application of defaults

use anyhow::{Context, Result, bail};

use crate::SpliceError;
use crate::range::{RangeTokenPolicy, parse_custom_ranges_checked};
use std::{path::PathBuf, str::FromStr};

/// Compression level for output PDFs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - preserves exact structure.
    None,
    /// Compress content streams.
    #[default]
    Standard,
    /// Compress streams and drop unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = SpliceError;

    /// Parse "none", "standard" or "maximum" (any case).
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(SpliceError::InvalidConfig {
                message: format!(
                    "Invalid compression level: {s}. Must be one of: none, standard, maximum"
                ),
            }),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// How a document is divided into page groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// Consecutive groups of this many pages.
    ByPageCount(u32),
    /// This many groups of (nearly) equal size.
    ByParts(u32),
    /// User-supplied ranges such as `1-3, 5, 8-10`; one group per token.
    Custom(String),
    /// One group per page.
    ExtractAll,
}

impl SplitMode {
    /// Short description used in messages.
    pub fn describe(&self) -> String {
        match self {
            Self::ByPageCount(n) => format!("{n} page(s) per file"),
            Self::ByParts(n) => format!("{n} part(s)"),
            Self::Custom(text) => format!("ranges '{text}'"),
            Self::ExtractAll => "one file per page".to_string(),
        }
    }
}

/// What a split returns when one group fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Fail the whole job.
    #[default]
    AllOrNothing,
    /// Keep the groups finished before the failure and report it alongside.
    BestEffort,
}

/// Job settings for [`Splitter`](crate::split::Splitter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// How pages are grouped.
    pub mode: SplitMode,
    /// How unusable custom range tokens are treated.
    pub token_policy: RangeTokenPolicy,
    /// Partial-result behavior.
    pub delivery: DeliveryPolicy,
}

impl SplitOptions {
    /// Options for `mode` with lenient tokens and all-or-nothing delivery.
    pub fn new(mode: SplitMode) -> Self {
        Self {
            mode,
            token_policy: RangeTokenPolicy::default(),
            delivery: DeliveryPolicy::default(),
        }
    }
}

/// Complete configuration for a split run.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Document to split.
    pub input: PathBuf,

    /// Directory receiving the parts.
    pub output_dir: PathBuf,

    /// Job settings.
    pub options: SplitOptions,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,
}

impl SplitConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A page or part count is zero
    /// - Custom ranges are blank
    /// - Verbose and quiet modes are both enabled
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        match &self.options.mode {
            SplitMode::ByPageCount(0) => bail!("Pages per file must be at least 1"),
            SplitMode::ByParts(0) => bail!("Number of parts must be at least 1"),
            SplitMode::Custom(text) if text.trim().is_empty() => {
                bail!("Custom ranges cannot be empty")
            }
            _ => {}
        }

        if self.output_dir.is_file() {
            bail!(
                "Output directory is a file: {}",
                self.output_dir.display()
            );
        }

        Ok(())
    }
}

/// One merge input: a file and, optionally, the pages to take from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeInput {
    /// Source file.
    pub path: PathBuf,

    /// Custom-range text selecting pages; `None` takes every page.
    pub pages: Option<String>,
}

impl MergeInput {
    /// Take every page of `path`.
    pub fn whole(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pages: None,
        }
    }

    /// Parse `path` or `path:RANGES`, e.g. `report.pdf:1-3,5`.
    ///
    /// The suffix after the last `:` only counts as a selection when it
    /// looks like one (digits, `-`, `,` and spaces), so paths containing a
    /// colon still work.
    pub fn parse(arg: &str) -> Self {
        if let Some((path, pages)) = arg.rsplit_once(':')
            && !path.is_empty()
            && !pages.trim().is_empty()
            && pages
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '-' | ',' | ' '))
        {
            return Self {
                path: PathBuf::from(path),
                pages: Some(pages.to_string()),
            };
        }

        Self::whole(arg)
    }

    /// Resolve the selection against a document of `total_pages` pages.
    ///
    /// Returns `None` when every page is taken. Selections are strict: one
    /// unusable token fails the whole input.
    ///
    /// # Errors
    ///
    /// Returns [`SpliceError::InvalidRangeToken`] for a bad token, or
    /// [`SpliceError::InvalidPageRange`] when nothing is selected.
    pub fn resolve_pages(&self, total_pages: u32) -> crate::Result<Option<Vec<u32>>> {
        let Some(text) = &self.pages else {
            return Ok(None);
        };

        let parsed = parse_custom_ranges_checked(text, total_pages, RangeTokenPolicy::Strict)?;
        let pages: Vec<u32> = parsed.groups().into_iter().flatten().collect();
        if pages.is_empty() {
            return Err(SpliceError::InvalidPageRange {
                name: self.path.display().to_string(),
                range: text.clone(),
                total_pages: total_pages as usize,
            });
        }

        Ok(Some(pages))
    }
}

/// Complete configuration for a merge run.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Inputs in merge order.
    pub inputs: Vec<MergeInput>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Number of files read concurrently (None = auto-detect).
    pub jobs: Option<usize>,
}

impl MergeConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output path is also an input
    /// - A page selection is malformed
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        for input in &self.inputs {
            if input.path == self.output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                );
            }

            // Syntax only; bounds wait for the real page count.
            if let Some(pages) = &input.pages {
                parse_custom_ranges_checked(pages, u32::MAX, RangeTokenPolicy::Strict)
                    .with_context(|| {
                        format!("Invalid page selection for {}", input.path.display())
                    })?;
            }
        }

        Ok(())
    }

    /// Get the effective number of concurrent reads.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
