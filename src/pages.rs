//! Page copying between documents.
//!
//! Split and merge both build their output the same way: start from an
//! empty document and copy selected pages into it. A copied page takes
//! along everything it references (fonts, images, content streams) but
//! never the source's page tree or catalog, and inheritable attributes are
//! written onto the page itself so it no longer depends on its old parent.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::{HashMap, HashSet};

use crate::error::{Result, SpliceError};
use crate::utils::resolve;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Maximum page-tree depth followed when looking up inherited attributes.
const MAX_TREE_DEPTH: usize = 32;

/// Create an empty document with a catalog and an empty page tree.
pub fn new_document(version: &str) -> Document {
    let mut doc = Document::with_version(version);

    let pages_id = doc.new_object_id();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Look up a page attribute, walking up through `Parent` links if the page
/// does not carry it.
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return resolve(doc, value);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

/// Copies pages out of one source document.
pub struct PageCopier<'a> {
    source: &'a Document,
    name: &'a str,
}

impl<'a> PageCopier<'a> {
    /// Create a copier for `source`; `name` is used in error messages.
    pub fn new(source: &'a Document, name: &'a str) -> Self {
        Self { source, name }
    }

    /// Append the given 1-based pages of the source to `target`, in order.
    ///
    /// Selecting a page twice produces two independent page objects. Objects
    /// shared between selected pages are copied once. References to source
    /// pages that are not selected become `null`.
    ///
    /// Returns the ids of the new pages in `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SpliceError::InvalidPageRange`] if a page number is outside
    /// the source, or an error if either document's page tree is unusable.
    pub fn copy_into(&self, target: &mut Document, page_numbers: &[u32]) -> Result<Vec<ObjectId>> {
        let source_pages = self.source.get_pages();

        let mut selected = Vec::with_capacity(page_numbers.len());
        for &number in page_numbers {
            let page_id = source_pages.get(&number).copied().ok_or_else(|| {
                SpliceError::InvalidPageRange {
                    name: self.name.to_string(),
                    range: number.to_string(),
                    total_pages: source_pages.len(),
                }
            })?;
            selected.push(page_id);
        }

        let pages_root = page_tree_root(target)?;

        let new_ids: Vec<ObjectId> = selected.iter().map(|_| target.new_object_id()).collect();

        let mut copier = ObjectCopier {
            source: self.source,
            source_pages: source_pages.values().copied().collect(),
            pages: HashMap::new(),
            objects: HashMap::new(),
        };
        for (old, new) in selected.iter().zip(&new_ids) {
            copier.pages.entry(*old).or_insert(*new);
        }

        for (old, new) in selected.iter().zip(&new_ids) {
            let mut page = self.flattened_page(*old)?;
            page.remove(b"Parent");
            let mut page = copier.rewrite_dict(target, &page);
            page.set("Parent", pages_root);
            target.objects.insert(*new, Object::Dictionary(page));
        }

        add_pages_to_tree(target, pages_root, &new_ids)?;

        log::debug!(
            "copied {} page(s) from {} ({} object(s))",
            new_ids.len(),
            self.name,
            copier.objects.len()
        );

        Ok(new_ids)
    }

    /// The page dictionary with inherited attributes written onto it.
    fn flattened_page(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut page = self
            .source
            .get_dictionary(page_id)
            .map_err(|e| {
                SpliceError::corrupted_pdf(self.name, format!("page {page_id:?} unreadable: {e}"))
            })?
            .clone();

        for key in INHERITABLE_ATTRIBUTES {
            if !page.has(key)
                && let Some(value) = inherited_attribute(self.source, page_id, key)
            {
                page.set(key.to_vec(), value.clone());
            }
        }

        Ok(page)
    }
}

/// Deep copy state for one [`PageCopier::copy_into`] call.
struct ObjectCopier<'a> {
    source: &'a Document,
    source_pages: HashSet<ObjectId>,
    pages: HashMap<ObjectId, ObjectId>,
    objects: HashMap<ObjectId, ObjectId>,
}

impl ObjectCopier<'_> {
    fn rewrite(&mut self, target: &mut Document, obj: &Object) -> Object {
        match obj {
            Object::Reference(id) => self.map_reference(target, *id),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.rewrite(target, item)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.rewrite_dict(target, dict)),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.rewrite_dict(target, &stream.dict);
                Object::Stream(copy)
            }
            other => other.clone(),
        }
    }

    fn rewrite_dict(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut out = Dictionary::new();
        for (key, value) in dict.iter() {
            out.set(key.clone(), self.rewrite(target, value));
        }
        out
    }

    fn map_reference(&mut self, target: &mut Document, id: ObjectId) -> Object {
        if let Some(new) = self.pages.get(&id) {
            return Object::Reference(*new);
        }
        if self.source_pages.contains(&id) {
            return Object::Null;
        }
        if let Some(new) = self.objects.get(&id) {
            return Object::Reference(*new);
        }

        let Ok(obj) = self.source.get_object(id) else {
            return Object::Null;
        };
        if is_tree_node(obj) {
            return Object::Null;
        }

        let new_id = target.new_object_id();
        self.objects.insert(id, new_id);
        let copy = self.rewrite(target, obj);
        target.objects.insert(new_id, copy);
        Object::Reference(new_id)
    }
}

/// Page-tree interior nodes and catalogs stay behind when pages move.
fn is_tree_node(obj: &Object) -> bool {
    let dict = match obj {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return false,
    };
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Pages") | Ok(b"Catalog")
    )
}

fn page_tree_root(doc: &Document) -> Result<ObjectId> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| SpliceError::other(format!("Failed to get pages reference: {e}")))
}

/// Append page references to the root `Pages` node and bump its `Count`.
fn add_pages_to_tree(doc: &mut Document, pages_id: ObjectId, page_ids: &[ObjectId]) -> Result<()> {
    let dict = doc
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| SpliceError::other(format!("Failed to get pages object: {e}")))?;

    match dict.get_mut(b"Kids") {
        Ok(Object::Array(kids)) => kids.extend(page_ids.iter().map(|&id| Object::Reference(id))),
        _ => {
            dict.set(
                "Kids",
                page_ids
                    .iter()
                    .map(|&id| Object::Reference(id))
                    .collect::<Vec<Object>>(),
            );
        }
    }

    let current = dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    dict.set("Count", current + page_ids.len() as i64);

    Ok(())
}
