//! pdfsplice - Split and merge PDF files while keeping their bookmarks.
//!
//! Splitting divides one document into page groups and gives every part
//! the slice of the source outline that points into it. Merging
//! concatenates documents and nests each input's outline under a bookmark
//! named after the file.
//!
//! # Examples
//!
//! ## Split
//!
//! ```no_run
//! use std::ops::ControlFlow;
//! use std::path::Path;
//! use pdfsplice::config::{SplitMode, SplitOptions};
//! use pdfsplice::io::PdfReader;
//! use pdfsplice::split::Splitter;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = PdfReader::new().load(Path::new("book.pdf")).await?;
//! let options = SplitOptions::new(SplitMode::ByParts(3));
//!
//! let outcome = Splitter::new()
//!     .split(&source, &options, |_| ControlFlow::Continue(()))
//!     .await?;
//! for part in &outcome.results {
//!     println!("{} ({} bytes)", part.name, part.data.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Merge
//!
//! ```no_run
//! use std::ops::ControlFlow;
//! use std::path::Path;
//! use pdfsplice::io::PdfReader;
//! use pdfsplice::merge::{MergeItem, Merger};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let items = vec![
//!     MergeItem::whole(reader.load(Path::new("a.pdf")).await?),
//!     MergeItem::with_pages(reader.load(Path::new("b.pdf")).await?, vec![1, 2]),
//! ];
//!
//! let output = Merger::new()
//!     .merge(&items, |_| ControlFlow::Continue(()))
//!     .await?;
//! std::fs::write("merged.pdf", &output.data)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod outline;
pub mod output;
pub mod pages;
pub mod range;
pub mod split;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use error::{Result, SpliceError};
pub use outline::BookmarkNode;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Job progress reported after each finished unit of work.
///
/// `current` counts finished units (split parts or merged files) out of
/// `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Units finished so far.
    pub current: usize,
    /// Units in the whole job.
    pub total: usize,
}

impl Progress {
    /// Create a progress report.
    pub fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }

    /// Whether every unit is finished.
    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}
