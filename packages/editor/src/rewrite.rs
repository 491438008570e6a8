//! Whole-list rewrites behind each projection write.
//!
//! Every write computes a complete new list from the current snapshot; the
//! caller commits it with `TreeStore::replace_all`. Records are stored as
//! given: nothing here rewrites a record's fields except the parent id
//! clearing done by [`remove_and_promote`].

use canvas_model::{Block, BlockId};
use std::collections::HashSet;

/// Replace the record with `id` in place, or append `block` if absent
pub fn upsert(blocks: &[Block], id: &BlockId, block: Block) -> Vec<Block> {
    let mut next = blocks.to_vec();
    match next.iter().position(|existing| &existing.id == id) {
        Some(index) => next[index] = block,
        None => next.push(block),
    }
    next
}

/// Remove the record with `id` and turn its direct children into roots.
///
/// Deeper descendants keep their parent, so the removed subtree survives
/// with the former children as new roots.
pub fn remove_and_promote(blocks: &[Block], id: &BlockId) -> Vec<Block> {
    blocks
        .iter()
        .filter(|block| &block.id != id)
        .map(|block| {
            if block.parent_id.as_ref() == Some(id) {
                Block {
                    parent_id: None,
                    ..block.clone()
                }
            } else {
                block.clone()
            }
        })
        .collect()
}

/// Replace the sibling set under `parent` with `children`.
///
/// Records currently under `parent` are dropped, as is any record elsewhere
/// whose id appears in `children`; `children` are then appended verbatim.
/// Appending an existing block to a new sibling set therefore moves it
/// instead of duplicating it.
pub fn replace_children(blocks: &[Block], parent: Option<&BlockId>, children: Vec<Block>) -> Vec<Block> {
    let written: HashSet<&BlockId> = children.iter().map(|child| &child.id).collect();

    let mut next: Vec<Block> = blocks
        .iter()
        .filter(|block| block.parent_id.as_ref() != parent && !written.contains(&block.id))
        .cloned()
        .collect();
    next.extend(children);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_model::BlockType;

    fn block(id: &str, parent: Option<&str>) -> Block {
        Block::with_id(id, BlockType::Container, parent.map(BlockId::from))
    }

    fn ids(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let blocks = vec![block("1", None), block("2", None), block("3", None)];
        let mut edited = block("2", None);
        edited.layout.reverse = true;

        let next = upsert(&blocks, &BlockId::from("2"), edited.clone());
        assert_eq!(ids(&next), vec!["1", "2", "3"]);
        assert_eq!(next[1], edited);
    }

    #[test]
    fn test_upsert_appends_missing() {
        let blocks = vec![block("1", None)];
        let next = upsert(&blocks, &BlockId::from("2"), block("2", Some("1")));
        assert_eq!(ids(&next), vec!["1", "2"]);
    }

    #[test]
    fn test_remove_promotes_direct_children_only() {
        let blocks = vec![
            block("p", None),
            block("c1", Some("p")),
            block("c2", Some("p")),
            block("g", Some("c1")),
            block("other", None),
        ];

        let next = remove_and_promote(&blocks, &BlockId::from("p"));
        assert_eq!(ids(&next), vec!["c1", "c2", "g", "other"]);
        assert!(next[0].parent_id.is_none());
        assert!(next[1].parent_id.is_none());
        assert_eq!(next[2].parent_id, Some(BlockId::from("c1")));
        assert_eq!(next[3], blocks[4]);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let blocks = vec![block("1", None), block("2", Some("1"))];
        assert_eq!(remove_and_promote(&blocks, &BlockId::from("9")), blocks);
    }

    #[test]
    fn test_replace_children_appends_after_other_records() {
        let blocks = vec![block("a", Some("p")), block("p", None), block("b", Some("p"))];
        let children = vec![block("b", Some("p")), block("a", Some("p"))];

        let next = replace_children(&blocks, Some(&BlockId::from("p")), children);
        assert_eq!(ids(&next), vec!["p", "b", "a"]);
    }

    #[test]
    fn test_replace_children_moves_instead_of_duplicating() {
        let blocks = vec![block("p", None), block("q", None), block("x", Some("q"))];
        let moved = block("x", Some("p"));

        let next = replace_children(&blocks, Some(&BlockId::from("p")), vec![moved]);
        assert_eq!(ids(&next), vec!["p", "q", "x"]);
        assert_eq!(next[2].parent_id, Some(BlockId::from("p")));
    }
}
