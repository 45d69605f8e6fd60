//! Merging documents into one, keeping every input's bookmarks.
//!
//! Each input contributes one top-level bookmark named after its file,
//! with the input's own outline (projected onto the pages taken from it)
//! nested underneath.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use crate::Progress;
use crate::config::MergeConfig;
use crate::error::{Result, SpliceError};
use crate::io::{LoadedPdf, PdfReader, PdfWriter};
use crate::outline::{
    BookmarkNode, OutlineBuilder, OutlineExtractor, count_nodes, filter_for_pages, shift,
};
use crate::pages::{PageCopier, new_document};
use crate::utils::{format_file_size, strip_pdf_extension};

/// A loaded input and the pages to take from it.
#[derive(Debug)]
pub struct MergeItem {
    /// The source document.
    pub pdf: LoadedPdf,

    /// 1-based pages in output order; `None` takes every page.
    pub pages: Option<Vec<u32>>,
}

impl MergeItem {
    /// Take every page of `pdf`.
    pub fn whole(pdf: LoadedPdf) -> Self {
        Self { pdf, pages: None }
    }

    /// Take the given pages of `pdf`.
    pub fn with_pages(pdf: LoadedPdf, pages: Vec<u32>) -> Self {
        Self {
            pdf,
            pages: Some(pages),
        }
    }

    fn selected_pages(&self) -> Vec<u32> {
        match &self.pages {
            Some(pages) => pages.clone(),
            None => (1..=self.pdf.page_count as u32).collect(),
        }
    }
}

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of PDFs merged.
    pub files_merged: usize,

    /// Total number of pages in merged document.
    pub total_pages: usize,

    /// Total number of bookmarks attached, including the per-file ones.
    pub bookmarks_added: usize,

    /// Total size of input files.
    pub input_size: u64,

    /// Time spent parsing inputs.
    pub load_time: Duration,

    /// Time spent building the merged document.
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Result of a merge operation.
#[derive(Debug)]
pub struct MergeOutput {
    /// The serialized merged PDF.
    pub data: Vec<u8>,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// PDF merger that combines multiple documents.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    reader: PdfReader,
    writer: PdfWriter,
    extractor: OutlineExtractor,
    builder: OutlineBuilder,
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a merger serializing its output with `writer`.
    pub fn with_writer(writer: PdfWriter) -> Self {
        Self {
            writer,
            ..Default::default()
        }
    }

    /// Load the inputs named by `config` and resolve their page selections.
    ///
    /// Files are read concurrently but come back in input order.
    ///
    /// # Errors
    ///
    /// Returns the first load or selection error, in input order.
    pub async fn load(&self, config: &MergeConfig) -> Result<Vec<MergeItem>> {
        if config.inputs.is_empty() {
            return Err(SpliceError::NoFilesToMerge);
        }

        let paths: Vec<_> = config.inputs.iter().map(|i| i.path.clone()).collect();
        let loaded = self.reader.load_all(&paths, config.effective_jobs()).await;

        let mut items = Vec::with_capacity(loaded.len());
        for (input, result) in config.inputs.iter().zip(loaded) {
            let pdf = result?;
            let total = u32::try_from(pdf.page_count).unwrap_or(u32::MAX);
            let pages = input.resolve_pages(total).map_err(|err| match err {
                SpliceError::InvalidRangeToken { token, reason } => SpliceError::InvalidPageRange {
                    name: pdf.name.clone(),
                    range: format!("{token} ({reason})"),
                    total_pages: pdf.page_count,
                },
                other => other,
            })?;
            items.push(MergeItem { pdf, pages });
        }

        Ok(items)
    }

    /// Concatenate `items` into one document.
    ///
    /// `on_progress` runs after each input with `(done, total)`; returning
    /// [`ControlFlow::Break`] stops the job with [`SpliceError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Fails as a whole: no output is produced if any input fails.
    pub async fn merge<F>(&self, items: &[MergeItem], mut on_progress: F) -> Result<MergeOutput>
    where
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        let Some(first) = items.first() else {
            return Err(SpliceError::NoFilesToMerge);
        };

        let start = Instant::now();
        let mut merged = new_document(&first.pdf.document.version);
        let mut bookmarks = Vec::with_capacity(items.len());
        let mut offset = 0;
        let total = items.len();

        for (index, item) in items.iter().enumerate() {
            let pages = item.selected_pages();
            PageCopier::new(&item.pdf.document, &item.pdf.name).copy_into(&mut merged, &pages)?;

            let forest = self.extractor.extract(&item.pdf.document);
            let projected = match &item.pages {
                Some(_) => {
                    let indices: Vec<usize> = pages.iter().map(|&p| p as usize - 1).collect();
                    filter_for_pages(&forest, &indices)
                }
                None => forest,
            };

            bookmarks.push(BookmarkNode::with_children(
                strip_pdf_extension(&item.pdf.name),
                offset,
                shift(&projected, offset),
            ));
            log::debug!(
                "merged {} at page {} ({} page(s), {} bookmark(s))",
                item.pdf.name,
                offset + 1,
                pages.len(),
                count_nodes(&projected)
            );
            offset += pages.len();

            if on_progress(Progress::new(index + 1, total)).is_break() {
                return Err(SpliceError::Cancelled);
            }
            tokio::task::yield_now().await;
        }

        self.builder.attach(&mut merged, &bookmarks)?;
        let data = self
            .writer
            .to_bytes(&mut merged)
            .map_err(|e| SpliceError::merge_failed(e.to_string()))?;

        let statistics = MergeStatistics {
            files_merged: items.len(),
            total_pages: offset,
            bookmarks_added: count_nodes(&bookmarks),
            input_size: items.iter().map(|i| i.pdf.file_size).sum(),
            load_time: items.iter().map(|i| i.pdf.load_time).sum(),
            merge_time: start.elapsed(),
        };

        log::info!(
            "merged {} file(s), {} page(s), {} bookmark(s)",
            statistics.files_merged,
            statistics.total_pages,
            statistics.bookmarks_added
        );

        Ok(MergeOutput { data, statistics })
    }
}
