//! Reading an outline out of a document's object graph.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, HashSet};

use super::BookmarkNode;
use super::text::decode_text_string;
use crate::utils::resolve;

/// Upper bound on outline items read from one document.
const DEFAULT_NODE_LIMIT: usize = 100_000;

/// Name-tree nesting and named-destination indirection limits.
const MAX_NAME_TREE_DEPTH: usize = 32;
const MAX_DEST_INDIRECTION: usize = 4;

/// Deepest outline nesting that is read; deeper children are dropped.
pub const MAX_OUTLINE_DEPTH: usize = 256;

/// Reads a document's outline into an owned [`BookmarkNode`] forest.
///
/// Extraction never fails. Missing entries, dangling references, cycles and
/// nesting past [`MAX_OUTLINE_DEPTH`] end the affected chain (or the whole
/// outline) and leave whatever was read so far.
#[derive(Debug, Clone)]
pub struct OutlineExtractor {
    node_limit: usize,
}

impl OutlineExtractor {
    /// Create an extractor with the default node limit.
    pub fn new() -> Self {
        Self {
            node_limit: DEFAULT_NODE_LIMIT,
        }
    }

    /// Create an extractor that stops after `limit` items.
    pub fn with_node_limit(limit: usize) -> Self {
        Self { node_limit: limit }
    }

    /// Extract the outline, resolving destinations against the document's
    /// own page order.
    pub fn extract(&self, doc: &Document) -> Vec<BookmarkNode> {
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        self.extract_with_pages(doc, &page_ids)
    }

    /// Extract the outline, resolving destinations against `page_ids`.
    ///
    /// A destination matches a page when it references the same object id.
    /// Unmatched or absent destinations map to index 0.
    pub fn extract_with_pages(&self, doc: &Document, page_ids: &[ObjectId]) -> Vec<BookmarkNode> {
        let Some(first) = first_item(doc) else {
            return Vec::new();
        };

        let mut pages = HashMap::with_capacity(page_ids.len());
        for (index, id) in page_ids.iter().enumerate() {
            pages.entry(*id).or_insert(index);
        }

        let mut walk = Walk {
            doc,
            pages,
            visited: HashSet::new(),
            node_limit: self.node_limit,
        };
        walk.chain(first, 0)
    }
}

impl Default for OutlineExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn first_item(doc: &Document) -> Option<ObjectId> {
    let catalog = doc.catalog().ok()?;
    let outlines = resolve(doc, catalog.get(b"Outlines").ok()?)?.as_dict().ok()?;
    outlines.get(b"First").and_then(Object::as_reference).ok()
}

struct Walk<'a> {
    doc: &'a Document,
    pages: HashMap<ObjectId, usize>,
    visited: HashSet<ObjectId>,
    node_limit: usize,
}

impl<'a> Walk<'a> {
    /// Read a sibling chain starting at `first`, children before parents.
    fn chain(&mut self, first: ObjectId, depth: usize) -> Vec<BookmarkNode> {
        if depth >= MAX_OUTLINE_DEPTH {
            log::debug!("outline nests deeper than {MAX_OUTLINE_DEPTH} levels, dropping children");
            return Vec::new();
        }

        let doc = self.doc;
        let mut items = Vec::new();
        let mut current = Some(first);

        while let Some(id) = current {
            if !self.visited.insert(id) {
                log::debug!("outline item {} {} seen before, ending chain", id.0, id.1);
                break;
            }
            if self.visited.len() > self.node_limit {
                log::warn!("outline exceeds {} items, truncating", self.node_limit);
                break;
            }

            let Ok(item) = doc.get_dictionary(id) else {
                log::debug!("outline item {} {} is not a dictionary", id.0, id.1);
                break;
            };

            let title = item
                .get(b"Title")
                .ok()
                .and_then(|title| resolve(doc, title))
                .and_then(|title| match title {
                    Object::String(bytes, _) => Some(decode_text_string(bytes)),
                    _ => None,
                })
                .unwrap_or_default();

            let page_index = self.destination_page(item).unwrap_or(0);

            let children = match item.get(b"First").and_then(Object::as_reference) {
                Ok(child) => self.chain(child, depth + 1),
                Err(_) => Vec::new(),
            };

            items.push(BookmarkNode {
                title,
                page_index,
                children,
            });

            current = item.get(b"Next").and_then(Object::as_reference).ok();
        }

        items
    }

    /// `Dest` wins; the `A` action's `D` entry is only consulted without one.
    fn destination_page(&self, item: &'a Dictionary) -> Option<usize> {
        let dest = match item.get(b"Dest") {
            Ok(dest) => dest,
            Err(_) => {
                let action = resolve(self.doc, item.get(b"A").ok()?)?.as_dict().ok()?;
                action.get(b"D").ok()?
            }
        };
        self.page_of(dest, 0)
    }

    fn page_of(&self, dest: &'a Object, depth: usize) -> Option<usize> {
        if depth > MAX_DEST_INDIRECTION {
            return None;
        }

        match resolve(self.doc, dest)? {
            Object::Array(parts) => {
                let page = parts.first()?.as_reference().ok()?;
                self.pages.get(&page).copied()
            }
            Object::Dictionary(dict) => self.page_of(dict.get(b"D").ok()?, depth + 1),
            Object::Name(name) | Object::String(name, _) => {
                let target = named_destination(self.doc, name)?;
                self.page_of(target, depth + 1)
            }
            _ => None,
        }
    }
}

/// Look a named destination up in the catalog `Dests` dictionary, then in
/// the `Names` → `Dests` name tree.
fn named_destination<'a>(doc: &'a Document, name: &[u8]) -> Option<&'a Object> {
    let catalog = doc.catalog().ok()?;

    let legacy = catalog
        .get(b"Dests")
        .ok()
        .and_then(|dests| resolve(doc, dests))
        .and_then(|dests| dests.as_dict().ok())
        .and_then(|dests| dests.get(name).ok());
    if legacy.is_some() {
        return legacy;
    }

    let names = resolve(doc, catalog.get(b"Names").ok()?)?.as_dict().ok()?;
    let root = resolve(doc, names.get(b"Dests").ok()?)?.as_dict().ok()?;
    search_name_tree(doc, root, name, 0)
}

fn search_name_tree<'a>(
    doc: &'a Document,
    node: &'a Dictionary,
    key: &[u8],
    depth: usize,
) -> Option<&'a Object> {
    if depth > MAX_NAME_TREE_DEPTH {
        return None;
    }

    if let Some(Object::Array(entries)) = node.get(b"Names").ok().and_then(|n| resolve(doc, n)) {
        for pair in entries.chunks_exact(2) {
            if let Some(Object::String(candidate, _)) = resolve(doc, &pair[0])
                && candidate.as_slice() == key
            {
                return Some(&pair[1]);
            }
        }
    }

    if let Some(Object::Array(kids)) = node.get(b"Kids").ok().and_then(|k| resolve(doc, k)) {
        for kid in kids {
            if let Some(kid) = resolve(doc, kid).and_then(|k| k.as_dict().ok())
                && let Some(found) = search_name_tree(doc, kid, key, depth + 1)
            {
                return Some(found);
            }
        }
    }

    None
}
