//! Splitting one document into several, keeping bookmarks.
//!
//! Each page group becomes its own document. The source outline is read
//! once and projected onto every group, so a part only carries the
//! bookmarks that point into it (plus the containers above them).

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use crate::Progress;
use crate::config::{DeliveryPolicy, SplitMode, SplitOptions};
use crate::error::{Result, SpliceError};
use crate::io::{LoadedPdf, PdfWriter};
use crate::outline::{
    BookmarkNode, OutlineBuilder, OutlineExtractor, count_nodes, filter_for_pages,
};
use crate::pages::{PageCopier, new_document};
use crate::range::{
    EvenSplit, PageGroup, RangeTokenPolicy, format_page_list, generate_even_ranges,
    parse_custom_ranges_checked,
};
use crate::utils::strip_pdf_extension;

/// One output document of a split.
#[derive(Debug, Clone)]
pub struct SplitResult {
    /// Suggested file name, e.g. `report_2_pages_4-6.pdf`.
    pub name: String,

    /// Serialized PDF.
    pub data: Vec<u8>,

    /// The group's pages in `1-3, 5` form.
    pub page_range: String,

    /// The group's 1-based source pages.
    pub pages: PageGroup,
}

/// Statistics about a split operation.
#[derive(Debug, Clone)]
pub struct SplitStatistics {
    /// Number of page groups computed.
    pub groups_planned: usize,

    /// Number of documents produced.
    pub groups_written: usize,

    /// Pages in the source document.
    pub source_pages: usize,

    /// Bookmarks in the source outline.
    pub source_bookmarks: usize,

    /// Bookmarks attached across all parts.
    pub bookmarks_attached: usize,

    /// Total time taken.
    pub split_time: Duration,
}

/// Everything a split produced.
#[derive(Debug)]
pub struct SplitOutcome {
    /// Finished parts, in group order.
    pub results: Vec<SplitResult>,

    /// Statistics about the run.
    pub statistics: SplitStatistics,

    /// The error that stopped a best-effort split early.
    pub failure: Option<SpliceError>,
}

/// Compute the page groups for `mode` over a document of `total_pages`.
///
/// # Errors
///
/// Only fails for [`SplitMode::Custom`] under [`RangeTokenPolicy::Strict`].
pub fn compute_page_groups(
    mode: &SplitMode,
    total_pages: u32,
    policy: RangeTokenPolicy,
) -> Result<Vec<PageGroup>> {
    let groups = match mode {
        SplitMode::ByPageCount(n) => generate_even_ranges(total_pages, EvenSplit::PerGroup(*n))
            .iter()
            .map(|r| r.pages())
            .collect(),
        SplitMode::ByParts(n) => generate_even_ranges(total_pages, EvenSplit::Groups(*n))
            .iter()
            .map(|r| r.pages())
            .collect(),
        SplitMode::Custom(text) => {
            parse_custom_ranges_checked(text, total_pages, policy)?.groups()
        }
        SplitMode::ExtractAll => (1..=total_pages).map(|page| vec![page]).collect(),
    };
    Ok(groups)
}

/// File name for the `index`-th (0-based) part.
///
/// `<base>_<index+1>_pages_<range>.pdf`, where the range's `", "`
/// separators become `-` and `base` loses a trailing `.pdf`.
pub fn output_name(source_name: &str, index: usize, page_range: &str) -> String {
    let base = strip_pdf_extension(source_name);
    let range = page_range
        .split(',')
        .map(str::trim_start)
        .collect::<Vec<_>>()
        .join("-");
    format!("{base}_{}_pages_{range}.pdf", index + 1)
}

/// Splits documents into page groups.
#[derive(Debug, Clone, Default)]
pub struct Splitter {
    writer: PdfWriter,
    extractor: OutlineExtractor,
    builder: OutlineBuilder,
}

impl Splitter {
    /// Create a splitter with the default writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a splitter serializing parts with `writer`.
    pub fn with_writer(writer: PdfWriter) -> Self {
        Self {
            writer,
            ..Default::default()
        }
    }

    /// Split `source` according to `options`.
    ///
    /// `on_progress` runs after each part with `(done, total)`; returning
    /// [`ControlFlow::Break`] stops the job with [`SpliceError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`SpliceError::NoPageGroups`] before doing any work if the
    /// mode selects nothing. A failing part fails the job unless
    /// [`DeliveryPolicy::BestEffort`] is set and the error is
    /// [recoverable](SpliceError::is_recoverable), in which case the parts
    /// built so far come back with the failure in [`SplitOutcome::failure`].
    pub async fn split<F>(
        &self,
        source: &LoadedPdf,
        options: &SplitOptions,
        mut on_progress: F,
    ) -> Result<SplitOutcome>
    where
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        let start = Instant::now();
        let total_pages = u32::try_from(source.page_count).unwrap_or(u32::MAX);

        let groups = compute_page_groups(&options.mode, total_pages, options.token_policy)?;
        if groups.is_empty() {
            return Err(SpliceError::no_page_groups(format!(
                "{} selects no pages of {} ({} page(s))",
                options.mode.describe(),
                source.name,
                total_pages
            )));
        }

        let forest = self.extractor.extract(&source.document);
        log::info!(
            "splitting {} into {} part(s), {} bookmark(s) in source",
            source.name,
            groups.len(),
            count_nodes(&forest)
        );

        let total = groups.len();
        let mut results = Vec::with_capacity(total);
        let mut bookmarks_attached = 0;
        let mut failure = None;

        for (index, group) in groups.into_iter().enumerate() {
            match self.split_group(source, &forest, index, group) {
                Ok((result, bookmarks)) => {
                    bookmarks_attached += bookmarks;
                    results.push(result);
                }
                Err(err) => match options.delivery {
                    DeliveryPolicy::BestEffort if err.is_recoverable() => {
                        log::warn!("part {} of {} failed: {err}", index + 1, total);
                        failure = Some(err);
                        break;
                    }
                    _ => return Err(err),
                },
            }

            if on_progress(Progress::new(index + 1, total)).is_break() {
                return Err(SpliceError::Cancelled);
            }
            tokio::task::yield_now().await;
        }

        let statistics = SplitStatistics {
            groups_planned: total,
            groups_written: results.len(),
            source_pages: source.page_count,
            source_bookmarks: count_nodes(&forest),
            bookmarks_attached,
            split_time: start.elapsed(),
        };

        Ok(SplitOutcome {
            results,
            statistics,
            failure,
        })
    }

    fn split_group(
        &self,
        source: &LoadedPdf,
        forest: &[BookmarkNode],
        index: usize,
        group: PageGroup,
    ) -> Result<(SplitResult, usize)> {
        let mut part = new_document(&source.document.version);
        PageCopier::new(&source.document, &source.name).copy_into(&mut part, &group)?;

        let indices: Vec<usize> = group.iter().map(|&page| page as usize - 1).collect();
        let bookmarks = filter_for_pages(forest, &indices);
        self.builder.attach(&mut part, &bookmarks)?;

        let data = self.writer.to_bytes(&mut part)?;
        let page_range = format_page_list(&group);
        let name = output_name(&source.name, index, &page_range);
        log::debug!("built {name} ({} bookmark(s))", count_nodes(&bookmarks));

        Ok((
            SplitResult {
                name,
                data,
                page_range,
                pages: group,
            },
            count_nodes(&bookmarks),
        ))
    }
}
