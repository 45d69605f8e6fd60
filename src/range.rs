//! Page-range algebra.
//!
//! Pure functions over page numbers that decide how a document is cut up:
//! parsing user-supplied custom ranges, dividing a document evenly, and
//! rendering a set of pages back into compact `1-3, 5` form.
//!
//! All page numbers here are 1-based and inclusive.
//!
//! # Examples
//!
//! ```
//! use pdfsplice::range::{format_page_list, generate_even_ranges, parse_custom_ranges, EvenSplit};
//!
//! let groups = parse_custom_ranges("1-3, 5, 8-10", 9);
//! assert_eq!(groups, vec![vec![1, 2, 3], vec![5]]);
//!
//! let ranges = generate_even_ranges(10, EvenSplit::Groups(3));
//! assert_eq!(ranges.len(), 3);
//!
//! assert_eq!(format_page_list(&[3, 1, 2, 5]), "1-3, 5");
//! ```

use serde::Serialize;
use std::fmt;

use crate::error::{Result, SpliceError};

/// An ordered list of 1-based page numbers that becomes one output document.
pub type PageGroup = Vec<u32>;

/// Inclusive span of 1-based page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    /// First page of the span.
    pub start: u32,
    /// Last page of the span (inclusive).
    pub end: u32,
}

impl PageRange {
    /// Create a range, returning `None` if `start > end` or `start == 0`.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start >= 1 && start <= end).then_some(Self { start, end })
    }

    /// Number of pages covered.
    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    /// Always false; a range covers at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Expand into the page group it describes.
    pub fn pages(&self) -> PageGroup {
        (self.start..=self.end).collect()
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// How to divide a document into equal parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvenSplit {
    /// A fixed number of pages per output document.
    PerGroup(u32),
    /// A fixed number of output documents.
    Groups(u32),
}

/// What to do with custom-range tokens that fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeTokenPolicy {
    /// Skip bad tokens silently and keep the rest.
    #[default]
    Lenient,
    /// Fail on the first bad token.
    Strict,
}

/// A custom-range token that was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedToken {
    /// The token as written, trimmed.
    pub token: String,
    /// Why it was dropped.
    pub reason: String,
}

/// Outcome of parsing custom ranges with rejection tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRanges {
    /// One range per accepted token, in input order.
    pub ranges: Vec<PageRange>,
    /// Tokens that were skipped, in input order.
    pub rejected: Vec<RejectedToken>,
}

impl ParsedRanges {
    /// Expand every accepted range into its page group.
    pub fn groups(&self) -> Vec<PageGroup> {
        self.ranges.iter().map(PageRange::pages).collect()
    }
}

/// Parse comma-separated custom ranges against a document of `total_pages`.
///
/// Each token is either a page number or `start-end`. Tokens that are not
/// integers, fall outside `1..=total_pages`, or are inverted are skipped
/// without error; blank tokens are ignored.
pub fn parse_custom_ranges(text: &str, total_pages: u32) -> Vec<PageGroup> {
    parse_tokens(text, total_pages).groups()
}

/// Parse custom ranges and report what was dropped.
///
/// Accepted tokens stay as [`PageRange`]s; nothing is expanded until the
/// caller asks for [`ParsedRanges::groups`].
///
/// # Errors
///
/// Under [`RangeTokenPolicy::Strict`], returns
/// [`SpliceError::InvalidRangeToken`] for the first rejected token.
pub fn parse_custom_ranges_checked(
    text: &str,
    total_pages: u32,
    policy: RangeTokenPolicy,
) -> Result<ParsedRanges> {
    let parsed = parse_tokens(text, total_pages);

    if policy == RangeTokenPolicy::Strict
        && let Some(first) = parsed.rejected.first()
    {
        return Err(SpliceError::InvalidRangeToken {
            token: first.token.clone(),
            reason: first.reason.clone(),
        });
    }

    for rejected in &parsed.rejected {
        log::debug!(
            "skipping range token '{}': {}",
            rejected.token,
            rejected.reason
        );
    }

    Ok(parsed)
}

fn parse_tokens(text: &str, total_pages: u32) -> ParsedRanges {
    let mut parsed = ParsedRanges::default();

    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_token(token, total_pages) {
            Ok(range) => parsed.ranges.push(range),
            Err(reason) => parsed.rejected.push(RejectedToken {
                token: token.to_string(),
                reason,
            }),
        }
    }

    parsed
}

fn parse_token(token: &str, total_pages: u32) -> std::result::Result<PageRange, String> {
    let (start, end) = match token.split_once('-') {
        Some((start, end)) => (parse_page(start)?, parse_page(end)?),
        None => {
            let page = parse_page(token)?;
            (page, page)
        }
    };

    if start < 1 || end > total_pages {
        return Err(format!("pages must be between 1 and {total_pages}"));
    }

    PageRange::new(start, end).ok_or_else(|| format!("start {start} is after end {end}"))
}

fn parse_page(s: &str) -> std::result::Result<u32, String> {
    let s = s.trim();
    s.parse::<u32>()
        .map_err(|_| format!("'{s}' is not a page number"))
}

/// Divide `total_pages` into contiguous spans with no gaps or overlaps.
///
/// With [`EvenSplit::Groups`], every span holds `ceil(total / n)` pages except
/// possibly the last; spans that would start past the end are omitted, so
/// fewer than `n` spans can come back. A zero divisor yields nothing.
pub fn generate_even_ranges(total_pages: u32, split: EvenSplit) -> Vec<PageRange> {
    let size = match split {
        EvenSplit::PerGroup(0) | EvenSplit::Groups(0) => return Vec::new(),
        EvenSplit::PerGroup(n) => n,
        EvenSplit::Groups(n) => total_pages.div_ceil(n),
    };

    if total_pages == 0 {
        return Vec::new();
    }

    let limit = match split {
        EvenSplit::Groups(n) => n as usize,
        EvenSplit::PerGroup(_) => usize::MAX,
    };

    (1..=total_pages)
        .step_by(size as usize)
        .take(limit)
        .map(|start| PageRange {
            start,
            end: start.saturating_add(size - 1).min(total_pages),
        })
        .collect()
}

/// Render page numbers as a compact range string.
///
/// Pages are sorted, duplicates collapsed, and maximal runs of consecutive
/// numbers written as `start-end`, joined by `", "`.
pub fn format_page_list(pages: &[u32]) -> String {
    let mut sorted = pages.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut runs: Vec<PageRange> = Vec::new();
    for page in sorted {
        match runs.last_mut() {
            Some(run) if run.end + 1 == page => run.end = page,
            _ => runs.push(PageRange {
                start: page,
                end: page,
            }),
        }
    }

    runs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_drops_out_of_bounds_token() {
        let groups = parse_custom_ranges("1-3, 5, 8-10", 9);
        assert_eq!(groups, vec![vec![1, 2, 3], vec![5]]);
    }

    #[test]
    fn test_parse_ignores_whitespace() {
        let groups = parse_custom_ranges("  2 - 4 ,7 ", 10);
        assert_eq!(groups, vec![vec![2, 3, 4], vec![7]]);
    }

    #[test]
    fn test_parse_keeps_token_order() {
        let groups = parse_custom_ranges("9, 1-2, 5", 10);
        assert_eq!(groups, vec![vec![9], vec![1, 2], vec![5]]);
    }

    #[rstest]
    #[case::zero("0")]
    #[case::inverted("5-3")]
    #[case::past_end("11")]
    #[case::not_a_number("abc")]
    #[case::too_many_dashes("1-2-3")]
    #[case::negative("-1")]
    #[case::open_ended("3-")]
    fn test_parse_skips_invalid_token(#[case] token: &str) {
        // Skipping is the documented lenient contract, not an accident.
        assert!(parse_custom_ranges(token, 10).is_empty());
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(parse_custom_ranges("", 10).is_empty());
        assert!(parse_custom_ranges(" , ,", 10).is_empty());
    }

    #[test]
    fn test_checked_reports_rejections() {
        let parsed =
            parse_custom_ranges_checked("1, 4-2, x, 3", 5, RangeTokenPolicy::Lenient).unwrap();
        assert_eq!(parsed.groups(), vec![vec![1], vec![3]]);
        let tokens: Vec<&str> = parsed.rejected.iter().map(|r| r.token.as_str()).collect();
        assert_eq!(tokens, vec!["4-2", "x"]);
    }

    #[test]
    fn test_checked_strict_fails_on_first_rejection() {
        let err = parse_custom_ranges_checked("1, 7, 9", 5, RangeTokenPolicy::Strict).unwrap_err();
        match err {
            SpliceError::InvalidRangeToken { token, .. } => assert_eq!(token, "7"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_checked_strict_accepts_clean_input() {
        let parsed = parse_custom_ranges_checked("1-2,4", 5, RangeTokenPolicy::Strict).unwrap();
        assert_eq!(parsed.groups(), vec![vec![1, 2], vec![4]]);
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn test_checked_keeps_huge_ranges_unexpanded() {
        let parsed =
            parse_custom_ranges_checked("1-4000000000", u32::MAX, RangeTokenPolicy::Strict)
                .unwrap();
        assert_eq!(parsed.ranges, vec![PageRange::new(1, 4_000_000_000).unwrap()]);
    }

    #[test]
    fn test_even_split_by_parts() {
        let ranges = generate_even_ranges(10, EvenSplit::Groups(3));
        assert_eq!(
            ranges,
            vec![
                PageRange { start: 1, end: 4 },
                PageRange { start: 5, end: 8 },
                PageRange { start: 9, end: 10 },
            ]
        );
    }

    #[test]
    fn test_even_split_by_parts_omits_empty_groups() {
        // ceil(4 / 3) = 2, so the third group would start at page 5.
        let ranges = generate_even_ranges(4, EvenSplit::Groups(3));
        assert_eq!(
            ranges,
            vec![PageRange { start: 1, end: 2 }, PageRange { start: 3, end: 4 }]
        );
    }

    #[test]
    fn test_even_split_more_parts_than_pages() {
        let ranges = generate_even_ranges(3, EvenSplit::Groups(5));
        assert_eq!(ranges.len(), 3);
        assert!(ranges.iter().all(|r| r.len() == 1));
    }

    #[test]
    fn test_even_split_by_page_count() {
        let ranges = generate_even_ranges(7, EvenSplit::PerGroup(3));
        assert_eq!(
            ranges,
            vec![
                PageRange { start: 1, end: 3 },
                PageRange { start: 4, end: 6 },
                PageRange { start: 7, end: 7 },
            ]
        );
    }

    #[rstest]
    #[case(EvenSplit::PerGroup(0), 10)]
    #[case(EvenSplit::Groups(0), 10)]
    #[case(EvenSplit::Groups(2), 0)]
    #[case(EvenSplit::PerGroup(2), 0)]
    fn test_even_split_degenerate(#[case] split: EvenSplit, #[case] total: u32) {
        assert!(generate_even_ranges(total, split).is_empty());
    }

    #[rstest]
    #[case(1, 1)]
    #[case(10, 3)]
    #[case(17, 4)]
    #[case(100, 7)]
    fn test_even_split_covers_all_pages(#[case] total: u32, #[case] n: u32) {
        for split in [EvenSplit::Groups(n), EvenSplit::PerGroup(n)] {
            let pages: Vec<u32> = generate_even_ranges(total, split)
                .iter()
                .flat_map(PageRange::pages)
                .collect();
            assert_eq!(pages, (1..=total).collect::<Vec<_>>());
        }
    }

    #[rstest]
    #[case(&[5, 1, 2, 3], "1-3, 5")]
    #[case(&[3, 1, 2, 5], "1-3, 5")]
    #[case(&[7], "7")]
    #[case(&[], "")]
    #[case(&[1, 3, 5], "1, 3, 5")]
    #[case(&[4, 4, 5], "4-5")]
    #[case(&[10, 9, 8, 2, 1], "1-2, 8-10")]
    fn test_format_page_list(#[case] pages: &[u32], #[case] expected: &str) {
        assert_eq!(format_page_list(pages), expected);
    }

    #[test]
    fn test_page_range_new() {
        assert!(PageRange::new(0, 3).is_none());
        assert!(PageRange::new(4, 3).is_none());
        assert_eq!(PageRange::new(2, 4).unwrap().pages(), vec![2, 3, 4]);
    }
}
