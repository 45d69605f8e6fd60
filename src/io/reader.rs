//! PDF reading and loading operations.
//!
//! Documents are parsed from memory; the async entry points only add file
//! reading on top. Loading several files keeps their input order, which is
//! the order a merge concatenates them in.
//!
//! # Examples
//!
//! ```no_run
//! use pdfsplice::io::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let results = reader.load_all(&paths, 4).await;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{Result, SpliceError};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Display name, usually the file name.
    pub name: String,

    /// Source path, when loaded from disk.
    pub path: Option<PathBuf>,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Size of the parsed data in bytes.
    pub file_size: u64,

    /// Time taken to parse the document.
    pub load_time: Duration,
}

/// Result of a load operation (success or failure).
pub type LoadResult = Result<LoadedPdf>;

/// PDF reader.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Parse a document from memory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data is not a readable PDF
    /// - The PDF is encrypted
    /// - The PDF has no pages
    pub fn load_bytes(&self, name: impl Into<String>, bytes: &[u8]) -> Result<LoadedPdf> {
        let name = name.into();
        let start = Instant::now();

        let document = Document::load_mem(bytes).map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("encrypt") || err_msg.contains("password") {
                SpliceError::encrypted_pdf(name.clone())
            } else {
                SpliceError::failed_to_load_pdf(name.clone(), err_msg)
            }
        })?;

        if document.trailer.has(b"Encrypt") {
            return Err(SpliceError::encrypted_pdf(name));
        }

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(SpliceError::corrupted_pdf(name, "PDF has no pages"));
        }

        let load_time = start.elapsed();
        log::debug!("loaded {name}: {page_count} page(s) in {load_time:?}");

        Ok(LoadedPdf {
            document,
            name,
            path: None,
            page_count,
            file_size: bytes.len() as u64,
            load_time,
        })
    }

    /// Load a single PDF document from disk.
    ///
    /// Parsing runs on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - File is not a valid PDF
    /// - PDF is encrypted
    /// - PDF has no pages
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => SpliceError::file_not_found(path.to_path_buf()),
            _ => SpliceError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let reader = self.clone();
        let mut loaded = task::spawn_blocking(move || reader.load_bytes(name, &bytes))
            .await
            .map_err(|e| SpliceError::other(format!("Load task failed: {e}")))??;

        loaded.path = Some(path.to_path_buf());
        Ok(loaded)
    }

    /// Load several documents with at most `jobs` reads in flight.
    ///
    /// Results come back in the order of `paths`.
    pub async fn load_all(&self, paths: &[PathBuf], jobs: usize) -> Vec<LoadResult> {
        use futures::stream::{self, StreamExt};

        let jobs = jobs.max(1);

        let tasks = paths.iter().map(|path| {
            let path = path.clone();
            let reader = self.clone();
            async move { reader.load(&path).await }
        });

        stream::iter(tasks).buffered(jobs).collect::<Vec<_>>().await
    }
}
