//! Projecting a bookmark forest onto a page selection.

use std::collections::HashMap;

use super::BookmarkNode;

/// Re-map a forest onto a new page layout.
///
/// `selected` lists the zero-based source page indices that make up the new
/// document, in output order. A node survives when its own page is selected
/// (its index becomes the first output position of that page) or when any
/// descendant survives (it becomes a container pointing at index 0). Sibling
/// order is kept and the input is left untouched.
pub fn filter_for_pages(forest: &[BookmarkNode], selected: &[usize]) -> Vec<BookmarkNode> {
    let mut positions = HashMap::with_capacity(selected.len());
    for (position, page) in selected.iter().enumerate() {
        positions.entry(*page).or_insert(position);
    }

    filter_level(forest, &positions)
}

fn filter_level(nodes: &[BookmarkNode], positions: &HashMap<usize, usize>) -> Vec<BookmarkNode> {
    nodes
        .iter()
        .filter_map(|node| {
            let children = filter_level(&node.children, positions);
            let page_index = match positions.get(&node.page_index) {
                Some(position) => *position,
                None if !children.is_empty() => 0,
                None => return None,
            };
            Some(BookmarkNode {
                title: node.title.clone(),
                page_index,
                children,
            })
        })
        .collect()
}

/// Move every node of a forest `offset` pages later.
pub fn shift(forest: &[BookmarkNode], offset: usize) -> Vec<BookmarkNode> {
    forest
        .iter()
        .map(|node| BookmarkNode {
            title: node.title.clone(),
            page_index: node.page_index + offset,
            children: shift(&node.children, offset),
        })
        .collect()
}
