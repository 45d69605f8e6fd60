//! Shared fixtures: documents are generated in memory and written to a
//! temporary directory, so no binary fixtures are checked in.

use std::path::{Path, PathBuf};

use lopdf::{Document, Object, dictionary};
use pdfsplice::BookmarkNode;
use pdfsplice::io::{LoadedPdf, PdfReader};
use pdfsplice::outline::{OutlineBuilder, OutlineExtractor};

/// A document of `page_count` Letter pages carrying `forest` as its outline.
pub fn build_pdf(page_count: usize, forest: &[BookmarkNode]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (1..=page_count)
        .map(|number| {
            let content = doc.add_object(lopdf::Stream::new(
                dictionary! {},
                format!("BT /F1 12 Tf 72 720 Td (Page {number}) Tj ET").into_bytes(),
            ));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    OutlineBuilder::new()
        .attach(&mut doc, forest)
        .expect("outline attaches");

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("document serializes");
    bytes
}

/// Write a generated document to `dir/name` and return its path.
pub fn write_pdf(dir: &Path, name: &str, page_count: usize, forest: &[BookmarkNode]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(page_count, forest)).expect("fixture written");
    path
}

/// Parse serialized output back into a loaded document.
pub fn reload(name: &str, data: &[u8]) -> LoadedPdf {
    PdfReader::new()
        .load_bytes(name, data)
        .expect("output parses")
}

/// Outline of serialized output.
pub fn outline_of(data: &[u8]) -> Vec<BookmarkNode> {
    OutlineExtractor::new().extract(&reload("output.pdf", data).document)
}

/// Nine pages in three chapters; chapter 1 has a section on page 2.
pub fn book_outline() -> Vec<BookmarkNode> {
    vec![
        BookmarkNode::with_children("Chapter 1", 0, vec![BookmarkNode::new("Section 1.1", 1)]),
        BookmarkNode::new("Chapter 2", 4),
        BookmarkNode::new("Chapter 3", 7),
    ]
}
