//! Integration tests for merging documents.

use std::ops::ControlFlow;
use std::path::PathBuf;

use pdfsplice::config::{
    CompressionLevel, MergeConfig, MergeInput, OverwriteMode, SplitMode, SplitOptions,
};
use pdfsplice::io::PdfReader;
use pdfsplice::merge::{MergeItem, Merger};
use pdfsplice::split::Splitter;
use pdfsplice::{BookmarkNode, SpliceError};

use crate::common::{book_outline, outline_of, reload, write_pdf};

fn merge_config(inputs: Vec<MergeInput>, output: PathBuf) -> MergeConfig {
    MergeConfig {
        inputs,
        output,
        verbose: false,
        quiet: true,
        overwrite_mode: OverwriteMode::Force,
        compression: CompressionLevel::Standard,
        jobs: Some(2),
    }
}

#[tokio::test]
async fn test_merge_nests_outlines_under_file_titles() {
    let dir = tempfile::tempdir().unwrap();
    let intro = write_pdf(
        dir.path(),
        "intro.pdf",
        2,
        &[BookmarkNode::new("Welcome", 1)],
    );
    let book = write_pdf(dir.path(), "book.pdf", 9, &book_outline());

    let config = merge_config(
        vec![MergeInput::whole(intro), MergeInput::whole(book)],
        dir.path().join("out.pdf"),
    );
    let merger = Merger::new();
    let items = merger.load(&config).await.unwrap();
    let output = merger
        .merge(&items, |_| ControlFlow::Continue(()))
        .await
        .unwrap();

    assert_eq!(reload("out.pdf", &output.data).page_count, 11);
    assert_eq!(
        outline_of(&output.data),
        vec![
            BookmarkNode::with_children("intro", 0, vec![BookmarkNode::new("Welcome", 1)]),
            BookmarkNode::with_children(
                "book",
                2,
                vec![
                    BookmarkNode::with_children(
                        "Chapter 1",
                        2,
                        vec![BookmarkNode::new("Section 1.1", 3)]
                    ),
                    BookmarkNode::new("Chapter 2", 6),
                    BookmarkNode::new("Chapter 3", 9),
                ]
            ),
        ]
    );

    let stats = &output.statistics;
    assert_eq!(stats.files_merged, 2);
    assert_eq!(stats.total_pages, 11);
    assert_eq!(stats.bookmarks_added, 7);
    assert!(stats.input_size > 0);
}

#[tokio::test]
async fn test_merge_with_page_selection() {
    let dir = tempfile::tempdir().unwrap();
    let cover = write_pdf(dir.path(), "cover.pdf", 1, &[]);
    let book = write_pdf(dir.path(), "book.pdf", 9, &book_outline());

    let book_arg = format!("{}:5-9", book.display());
    let config = merge_config(
        vec![MergeInput::whole(cover), MergeInput::parse(&book_arg)],
        dir.path().join("out.pdf"),
    );
    let merger = Merger::new();
    let items = merger.load(&config).await.unwrap();
    assert_eq!(items[1].pages, Some(vec![5, 6, 7, 8, 9]));

    let output = merger
        .merge(&items, |_| ControlFlow::Continue(()))
        .await
        .unwrap();

    assert_eq!(reload("out.pdf", &output.data).page_count, 6);
    assert_eq!(
        outline_of(&output.data),
        vec![
            BookmarkNode::new("cover", 0),
            BookmarkNode::with_children(
                "book",
                1,
                vec![
                    BookmarkNode::new("Chapter 2", 1),
                    BookmarkNode::new("Chapter 3", 4),
                ]
            ),
        ]
    );
}

#[tokio::test]
async fn test_merge_selection_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let short = write_pdf(dir.path(), "short.pdf", 2, &[]);

    let arg = format!("{}:1-5", short.display());
    let config = merge_config(vec![MergeInput::parse(&arg)], dir.path().join("out.pdf"));
    let err = Merger::new().load(&config).await.unwrap_err();
    assert!(matches!(err, SpliceError::InvalidPageRange { total_pages: 2, .. }));
}

#[tokio::test]
async fn test_merge_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let present = write_pdf(dir.path(), "present.pdf", 1, &[]);

    let config = merge_config(
        vec![
            MergeInput::whole(present),
            MergeInput::whole(dir.path().join("missing.pdf")),
        ],
        dir.path().join("out.pdf"),
    );
    let err = Merger::new().load(&config).await.unwrap_err();
    assert!(matches!(err, SpliceError::FileNotFound { .. }));
}

#[tokio::test]
async fn test_merge_rejects_non_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("notes.pdf");
    std::fs::write(&bogus, b"just some text").unwrap();

    let config = merge_config(vec![MergeInput::whole(bogus)], dir.path().join("out.pdf"));
    let err = Merger::new().load(&config).await.unwrap_err();
    assert!(matches!(err, SpliceError::FailedToLoadPdf { .. }));
}

#[tokio::test]
async fn test_split_then_merge_restores_outline() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "book.pdf", 9, &book_outline());
    let source = PdfReader::new().load(&path).await.unwrap();

    let outcome = Splitter::new()
        .split(
            &source,
            &SplitOptions::new(SplitMode::ByPageCount(4)),
            |_| ControlFlow::Continue(()),
        )
        .await
        .unwrap();

    let items: Vec<_> = outcome
        .results
        .iter()
        .map(|part| MergeItem::whole(reload(&part.name, &part.data)))
        .collect();
    let output = Merger::new()
        .merge(&items, |_| ControlFlow::Continue(()))
        .await
        .unwrap();

    let merged = outline_of(&output.data);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0].title, "book_1_pages_1-4");
    assert_eq!(merged[0].children, book_outline()[..1].to_vec());
    assert_eq!(
        merged[1].children,
        vec![
            BookmarkNode::new("Chapter 2", 4),
            BookmarkNode::new("Chapter 3", 7)
        ]
    );
    assert!(merged[2].children.is_empty());
    assert_eq!(reload("out.pdf", &output.data).page_count, 9);
}
