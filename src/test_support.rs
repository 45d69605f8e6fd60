//! Builders for in-memory test documents.

use lopdf::{Document, Object, ObjectId, dictionary};

/// A document with `page_count` Letter-sized pages. Each page carries a
/// `Label` entry holding its 1-based number so copies can be told apart.
pub fn document_with_pages(page_count: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    let catalog_id = doc.new_object_id();
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for number in 1..=page_count {
        let page_id = doc.new_object_id();
        let page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Label" => number as i64,
        };
        doc.objects.insert(page_id, page.into());
        page_ids.push(page_id);
    }

    let catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.into_iter().map(|id| id.into()).collect::<Vec<Object>>(),
        "Count" => page_count as i64,
    };

    doc.objects.insert(catalog_id, catalog.into());
    doc.objects.insert(pages_id, pages_dict.into());
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Add a bare outline item pointing at `page` (or nowhere).
pub fn add_outline_item(doc: &mut Document, title: &str, page: Option<ObjectId>) -> ObjectId {
    let mut item = dictionary! { "Title" => Object::string_literal(title) };
    if let Some(page) = page {
        item.set("Dest", vec![page.into(), "Fit".into()]);
    }
    doc.add_object(item)
}

/// Point the catalog at a new outline root spanning `first..=last`.
pub fn set_outline_root(doc: &mut Document, first: ObjectId, last: ObjectId) {
    let root = doc.add_object(dictionary! {
        "Type" => "Outlines",
        "First" => first,
        "Last" => last,
    });
    doc.catalog_mut().unwrap().set("Outlines", root);
}
