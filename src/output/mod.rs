//! Output formatting and display for pdfsplice.
//!
//! This module handles all user-facing output:
//! - Formatted status messages
//! - Progress indicators
//! - Job summaries
//!
//! # Examples
//!
//! ```
//! use pdfsplice::output::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, true);
//! formatter.info("Merging 2 file(s)...");
//! formatter.debug("Loaded chapter1.pdf");
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{ProgressBar, ProgressStyle};

use crate::merge::MergeStatistics;
use crate::split::SplitStatistics;

/// Display the summary of a finished split.
pub fn display_split_statistics(formatter: &OutputFormatter, stats: &SplitStatistics) {
    if stats.groups_written < stats.groups_planned {
        formatter.warning(&format!(
            "Only {} of {} part(s) were written",
            stats.groups_written, stats.groups_planned
        ));
    }

    formatter.success(&format!(
        "Split {} page(s) into {} file(s) in {:.2}s",
        stats.source_pages,
        stats.groups_written,
        stats.split_time.as_secs_f64()
    ));
    formatter.detail(
        "Bookmarks",
        &format!(
            "{} in source, {} carried into parts",
            stats.source_bookmarks, stats.bookmarks_attached
        ),
    );
}

/// Display the summary of a finished merge.
pub fn display_merge_statistics(formatter: &OutputFormatter, stats: &MergeStatistics) {
    formatter.success(&format!(
        "Merged {} file(s) into {} page(s) in {:.2}s",
        stats.files_merged,
        stats.total_pages,
        stats.merge_time.as_secs_f64()
    ));
    formatter.detail("Bookmarks", &stats.bookmarks_added.to_string());
    formatter.detail("Input size", &stats.format_input_size());
    formatter.detail(
        "Load time",
        &format!("{:.2}s", stats.load_time.as_secs_f64()),
    );
}
