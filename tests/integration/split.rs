//! Integration tests for splitting documents.

use std::ops::ControlFlow;

use pdfsplice::config::{DeliveryPolicy, SplitMode, SplitOptions};
use pdfsplice::io::{PdfReader, PdfWriter};
use pdfsplice::range::RangeTokenPolicy;
use pdfsplice::split::Splitter;
use pdfsplice::{BookmarkNode, Progress, SpliceError};

use crate::common::{book_outline, outline_of, reload, write_pdf};

fn keep_going(_: Progress) -> ControlFlow<()> {
    ControlFlow::Continue(())
}

#[tokio::test]
async fn test_split_into_parts_keeps_bookmarks() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "book.pdf", 9, &book_outline());
    let source = PdfReader::new().load(&path).await.unwrap();

    let outcome = Splitter::new()
        .split(&source, &SplitOptions::new(SplitMode::ByParts(3)), keep_going)
        .await
        .unwrap();

    let names: Vec<_> = outcome.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "book_1_pages_1-3.pdf",
            "book_2_pages_4-6.pdf",
            "book_3_pages_7-9.pdf"
        ]
    );

    assert_eq!(
        outline_of(&outcome.results[0].data),
        vec![BookmarkNode::with_children(
            "Chapter 1",
            0,
            vec![BookmarkNode::new("Section 1.1", 1)]
        )]
    );
    assert_eq!(
        outline_of(&outcome.results[1].data),
        vec![BookmarkNode::new("Chapter 2", 1)]
    );
    assert_eq!(
        outline_of(&outcome.results[2].data),
        vec![BookmarkNode::new("Chapter 3", 1)]
    );

    for part in &outcome.results {
        assert_eq!(reload(&part.name, &part.data).page_count, 3);
    }

    let stats = &outcome.statistics;
    assert_eq!(stats.groups_written, 3);
    assert_eq!(stats.source_pages, 9);
    assert_eq!(stats.source_bookmarks, 4);
    assert_eq!(stats.bookmarks_attached, 4);
    assert!(outcome.failure.is_none());
}

#[tokio::test]
async fn test_split_by_page_count_uneven_tail() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "notes.pdf", 5, &[]);
    let source = PdfReader::new().load(&path).await.unwrap();

    let outcome = Splitter::new()
        .split(&source, &SplitOptions::new(SplitMode::ByPageCount(2)), keep_going)
        .await
        .unwrap();

    let ranges: Vec<_> = outcome.results.iter().map(|r| r.page_range.as_str()).collect();
    assert_eq!(ranges, vec!["1-2", "3-4", "5"]);
    assert!(outline_of(&outcome.results[2].data).is_empty());
}

#[tokio::test]
async fn test_custom_ranges_skip_bad_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "book.pdf", 9, &book_outline());
    let source = PdfReader::new().load(&path).await.unwrap();

    let options = SplitOptions::new(SplitMode::Custom("2, x, 12, 5-8".to_string()));
    let outcome = Splitter::new().split(&source, &options, keep_going).await.unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].pages, vec![2]);
    assert_eq!(outcome.results[1].name, "book_2_pages_5-8.pdf");

    // Chapter 1 starts outside the part but stays as the section's container.
    assert_eq!(
        outline_of(&outcome.results[0].data),
        vec![BookmarkNode::with_children(
            "Chapter 1",
            0,
            vec![BookmarkNode::new("Section 1.1", 0)]
        )]
    );
    assert_eq!(
        outline_of(&outcome.results[1].data),
        vec![
            BookmarkNode::new("Chapter 2", 0),
            BookmarkNode::new("Chapter 3", 3)
        ]
    );
}

#[tokio::test]
async fn test_strict_ranges_reject_bad_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "book.pdf", 9, &[]);
    let source = PdfReader::new().load(&path).await.unwrap();

    let options = SplitOptions {
        token_policy: RangeTokenPolicy::Strict,
        ..SplitOptions::new(SplitMode::Custom("1-3, 7-4".to_string()))
    };
    let err = Splitter::new()
        .split(&source, &options, keep_going)
        .await
        .unwrap_err();
    assert!(matches!(err, SpliceError::InvalidRangeToken { ref token, .. } if token == "7-4"));
}

#[tokio::test]
async fn test_nothing_selected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "book.pdf", 4, &[]);
    let source = PdfReader::new().load(&path).await.unwrap();

    let options = SplitOptions::new(SplitMode::Custom("10-12".to_string()));
    let err = Splitter::new()
        .split(&source, &options, keep_going)
        .await
        .unwrap_err();
    assert!(matches!(err, SpliceError::NoPageGroups { .. }));
}

#[tokio::test]
async fn test_extract_all_and_write_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "book.pdf", 3, &book_outline()[..1]);
    let source = PdfReader::new().load(&path).await.unwrap();

    let options = SplitOptions {
        delivery: DeliveryPolicy::BestEffort,
        ..SplitOptions::new(SplitMode::ExtractAll)
    };
    let outcome = Splitter::new().split(&source, &options, keep_going).await.unwrap();
    assert_eq!(outcome.results.len(), 3);

    let out_dir = dir.path().join("parts");
    std::fs::create_dir(&out_dir).unwrap();
    let writer = PdfWriter::new();
    for part in outcome.results {
        let target = out_dir.join(&part.name);
        writer.save_bytes(part.data, &target).await.unwrap();

        let reloaded = PdfReader::new().load(&target).await.unwrap();
        assert_eq!(reloaded.page_count, 1);
    }

    let second = PdfReader::new()
        .load(&out_dir.join("book_2_pages_2.pdf"))
        .await
        .unwrap();
    let outline = pdfsplice::outline::OutlineExtractor::new().extract(&second.document);
    assert_eq!(
        outline,
        vec![BookmarkNode::with_children(
            "Chapter 1",
            0,
            vec![BookmarkNode::new("Section 1.1", 0)]
        )]
    );
}
