//! Writing a bookmark forest into a document.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};

use super::text::encode_text_string;
use super::{BookmarkNode, count_nodes};
use crate::error::{Result, SpliceError};
use crate::pages::inherited_attribute;

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_LEFT: f32 = 0.0;
const DEFAULT_TOP: f32 = 792.0;

/// Attaches a [`BookmarkNode`] forest to a document as its outline.
#[derive(Debug, Clone, Default)]
pub struct OutlineBuilder;

/// Where an outline item jumps to.
struct Target {
    page: ObjectId,
    left: f32,
    top: f32,
}

impl OutlineBuilder {
    /// Create a new outline builder.
    pub fn new() -> Self {
        Self
    }

    /// Replace the document's outline with `forest`.
    ///
    /// Page indices are clamped to the document's pages. An empty forest
    /// leaves the document alone, as does a document without pages (with a
    /// warning, since the bookmarks would have nowhere to point).
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no catalog.
    pub fn attach(&self, doc: &mut Document, forest: &[BookmarkNode]) -> Result<()> {
        if forest.is_empty() {
            return Ok(());
        }

        let targets: Vec<Target> = doc
            .get_pages()
            .into_values()
            .map(|page| page_target(doc, page))
            .collect();

        if targets.is_empty() {
            log::warn!(
                "document has no pages, skipping {} bookmark(s)",
                count_nodes(forest)
            );
            return Ok(());
        }

        let catalog = doc
            .catalog_mut()
            .map_err(|e| SpliceError::other(format!("Failed to get catalog: {e}")))?;
        catalog.remove(b"Outlines");

        let root_id = doc.new_object_id();
        let mut root = dictionary! {
            "Type" => "Outlines",
            "Count" => count_nodes(forest) as i64,
        };
        if let Some((first, last)) = build_level(doc, forest, root_id, &targets) {
            root.set("First", first);
            root.set("Last", last);
        }
        doc.objects.insert(root_id, Object::Dictionary(root));

        doc.catalog_mut()
            .map_err(|e| SpliceError::other(format!("Failed to get catalog: {e}")))?
            .set("Outlines", root_id);

        log::debug!("attached outline with {} item(s)", count_nodes(forest));
        Ok(())
    }
}

/// Build one sibling level under `parent` and return its first and last ids.
fn build_level(
    doc: &mut Document,
    nodes: &[BookmarkNode],
    parent: ObjectId,
    targets: &[Target],
) -> Option<(ObjectId, ObjectId)> {
    let ids: Vec<ObjectId> = nodes.iter().map(|_| doc.new_object_id()).collect();

    for (i, node) in nodes.iter().enumerate() {
        let target = &targets[node.page_index.min(targets.len() - 1)];

        let mut item = Dictionary::new();
        item.set("Title", encode_text_string(&node.title));
        item.set("Parent", parent);
        item.set(
            "Dest",
            vec![
                target.page.into(),
                "XYZ".into(),
                Object::Real(target.left),
                Object::Real(target.top),
                Object::Null,
            ],
        );

        if i > 0 {
            item.set("Prev", ids[i - 1]);
        }
        if let Some(next) = ids.get(i + 1) {
            item.set("Next", *next);
        }

        if let Some((first, last)) = build_level(doc, &node.children, ids[i], targets) {
            item.set("First", first);
            item.set("Last", last);
            item.set("Count", node.descendant_count() as i64);
        }

        doc.objects.insert(ids[i], Object::Dictionary(item));
    }

    Some((*ids.first()?, *ids.last()?))
}

fn page_target(doc: &Document, page: ObjectId) -> Target {
    let corner = inherited_attribute(doc, page, b"MediaBox")
        .and_then(|mbox| mbox.as_array().ok())
        .and_then(|values| {
            let coords: Vec<f32> = values.iter().filter_map(|v| v.as_float().ok()).collect();
            match coords.as_slice() {
                [x0, y0, x1, y1] => Some((x0.min(*x1), y0.max(*y1))),
                _ => None,
            }
        });

    let (left, top) = corner.unwrap_or((DEFAULT_LEFT, DEFAULT_TOP));
    Target { page, left, top }
}
