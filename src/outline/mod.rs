//! Bookmark (outline) handling.
//!
//! A document's outline lives in its object graph as a doubly linked list of
//! dictionaries (`First`/`Last`/`Next`/`Prev`/`Parent`). This module lifts it
//! into an owned [`BookmarkNode`] tree, reshapes that tree for a new page
//! layout, and writes it back out:
//!
//! - [`OutlineExtractor`] reads the graph into a forest.
//! - [`filter_for_pages`] projects a forest onto a page selection.
//! - [`OutlineBuilder`] links a forest into a target document.
//!
//! Page indices inside a forest are only meaningful for the document the
//! forest was read from or built for; moving between the two always goes
//! through the filter (or [`shift`] for merges).

pub mod builder;
pub mod extract;
pub mod filter;
pub mod text;

pub use builder::OutlineBuilder;
pub use extract::OutlineExtractor;
pub use filter::{filter_for_pages, shift};

use serde::Serialize;

/// One bookmark and its sub-bookmarks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkNode {
    /// Display title.
    pub title: String,

    /// Zero-based index into the owning document's page list.
    pub page_index: usize,

    /// Child bookmarks in display order.
    pub children: Vec<BookmarkNode>,
}

impl BookmarkNode {
    /// Create a bookmark without children.
    pub fn new(title: impl Into<String>, page_index: usize) -> Self {
        Self {
            title: title.into(),
            page_index,
            children: Vec::new(),
        }
    }

    /// Create a bookmark with children.
    pub fn with_children(
        title: impl Into<String>,
        page_index: usize,
        children: Vec<BookmarkNode>,
    ) -> Self {
        Self {
            title: title.into(),
            page_index,
            children,
        }
    }

    /// Number of nodes below this one, at any depth.
    pub fn descendant_count(&self) -> usize {
        count_nodes(&self.children)
    }
}

/// Total number of nodes in a forest, counting every depth.
pub fn count_nodes(forest: &[BookmarkNode]) -> usize {
    forest.iter().map(|node| 1 + node.descendant_count()).sum()
}

/// Render a forest as an indented, human-readable listing.
///
/// Pages are shown 1-based.
pub fn render_tree(forest: &[BookmarkNode]) -> String {
    fn walk(nodes: &[BookmarkNode], depth: usize, out: &mut String) {
        for node in nodes {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&format!("{} (p. {})\n", node.title, node.page_index + 1));
            walk(&node.children, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(forest, 0, &mut out);
    out
}
