//! Integration tests for reading and rendering outlines.

use pdfsplice::BookmarkNode;
use pdfsplice::io::PdfReader;
use pdfsplice::outline::{OutlineExtractor, count_nodes, render_tree};

use crate::common::{book_outline, write_pdf};

#[tokio::test]
async fn test_outline_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "book.pdf", 9, &book_outline());

    let loaded = PdfReader::new().load(&path).await.unwrap();
    let forest = OutlineExtractor::new().extract(&loaded.document);

    assert_eq!(forest, book_outline());
    assert_eq!(count_nodes(&forest), 4);
    assert_eq!(
        render_tree(&forest),
        "Chapter 1 (p. 1)\n  Section 1.1 (p. 2)\nChapter 2 (p. 5)\nChapter 3 (p. 8)\n"
    );
}

#[tokio::test]
async fn test_outline_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "book.pdf", 9, &book_outline()[..1]);

    let loaded = PdfReader::new().load(&path).await.unwrap();
    let forest = OutlineExtractor::new().extract(&loaded.document);
    let json = serde_json::to_value(&forest).unwrap();

    assert_eq!(
        json,
        serde_json::json!([{
            "title": "Chapter 1",
            "pageIndex": 0,
            "children": [{ "title": "Section 1.1", "pageIndex": 1, "children": [] }]
        }])
    );
}

#[tokio::test]
async fn test_unicode_titles() {
    let dir = tempfile::tempdir().unwrap();
    let forest = vec![
        BookmarkNode::new("Einführung", 0),
        BookmarkNode::new("章节 二", 1),
    ];
    let path = write_pdf(dir.path(), "intl.pdf", 2, &forest);

    let loaded = PdfReader::new().load(&path).await.unwrap();
    assert_eq!(OutlineExtractor::new().extract(&loaded.document), forest);
}

#[tokio::test]
async fn test_document_without_outline() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "plain.pdf", 3, &[]);

    let loaded = PdfReader::new().load(&path).await.unwrap();
    assert!(OutlineExtractor::new().extract(&loaded.document).is_empty());
}
