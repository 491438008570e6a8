//! # Tree Walking
//!
//! The canvas renderer and the outline both consume the flat store as a
//! tree: roots first, then `children_of(id)` recursively. This module is that
//! contract.
//!
//! Blocks whose parent id points nowhere are walked as roots. Walks keep a
//! visited set and a depth limit, so duplicate ids or a parent chain that
//! loops back on itself end the descent with a warning instead of recursing
//! forever.

use crate::views::ViewIndex;
use canvas_model::{Block, BlockId, BlockType};
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

/// Callbacks for a depth-first walk.
///
/// `leave` is called once for every block `enter` was called for.
pub trait Visitor {
    /// Return false to skip the block's children
    fn enter(&mut self, block: &Block, depth: usize) -> bool;

    fn leave(&mut self, _block: &Block, _depth: usize) {}

    /// The block was already visited during this walk
    fn revisit(&mut self, _block: &Block, _depth: usize) {}
}

/// Blocks rendered at the top level: real roots plus dangling-parent blocks
pub fn roots(views: &ViewIndex) -> Vec<Block> {
    let blocks = views.store().get_all();
    let ids: HashSet<&BlockId> = blocks.iter().map(|block| &block.id).collect();

    blocks
        .iter()
        .filter(|block| match &block.parent_id {
            None => true,
            Some(parent_id) => !ids.contains(parent_id),
        })
        .cloned()
        .collect()
}

/// Walk every block reachable from the roots
pub fn walk<V: Visitor>(views: &ViewIndex, max_depth: usize, visitor: &mut V) {
    let mut visited = HashSet::new();
    for root in roots(views) {
        walk_block(views, &root, 0, max_depth, &mut visited, visitor);
    }
}

/// Walk the subtree under `id`
pub fn walk_from<V: Visitor>(views: &ViewIndex, id: &BlockId, max_depth: usize, visitor: &mut V) -> bool {
    match views.for_id(id).read() {
        Some(block) => {
            walk_block(views, &block, 0, max_depth, &mut HashSet::new(), visitor);
            true
        }
        None => false,
    }
}

fn walk_block<V: Visitor>(
    views: &ViewIndex,
    block: &Block,
    depth: usize,
    max_depth: usize,
    visited: &mut HashSet<BlockId>,
    visitor: &mut V,
) {
    if !visited.insert(block.id.clone()) {
        warn!(block_id = %block.id, depth, "Block reached twice, not descending again");
        visitor.revisit(block, depth);
        return;
    }

    if visitor.enter(block, depth) {
        if depth >= max_depth {
            warn!(block_id = %block.id, max_depth, "Tree deeper than max depth, children skipped");
        } else {
            for child in views.children_of(Some(&block.id)).read().iter() {
                walk_block(views, child, depth + 1, max_depth, visited, visitor);
            }
        }
    }

    visitor.leave(block, depth);
}

/// Ids from the parent of `id` up to its root, nearest first.
///
/// Stops at a missing parent or when the chain loops.
pub fn ancestors(blocks: &[Block], id: &BlockId) -> Vec<BlockId> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(id.clone());

    let mut current = crate::store::find_block(blocks, id).and_then(|block| block.parent_id.clone());
    while let Some(parent_id) = current {
        if !seen.insert(parent_id.clone()) {
            break;
        }
        current = crate::store::find_block(blocks, &parent_id).and_then(|block| block.parent_id.clone());
        chain.push(parent_id);
    }
    chain
}

/// Whether putting `id` under `new_parent` would make it its own ancestor
pub fn would_create_cycle(blocks: &[Block], id: &BlockId, new_parent: &BlockId) -> bool {
    new_parent == id || ancestors(blocks, new_parent).contains(id)
}

/// Nodes assembled into a nested tree during a walk
pub trait TreeNode {
    fn push_child(&mut self, child: Self);
}

/// Visitor that builds one node per block and nests them
struct Nest<T, F> {
    make: F,
    stack: Vec<T>,
    roots: Vec<T>,
}

impl<T, F> Nest<T, F> {
    fn new(make: F) -> Self {
        Self {
            make,
            stack: Vec::new(),
            roots: Vec::new(),
        }
    }
}

impl<T: TreeNode, F: FnMut(&Block, usize) -> T> Visitor for Nest<T, F> {
    fn enter(&mut self, block: &Block, depth: usize) -> bool {
        self.stack.push((self.make)(block, depth));
        true
    }

    fn leave(&mut self, _block: &Block, _depth: usize) {
        if let Some(node) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(parent) => parent.push_child(node),
                None => self.roots.push(node),
            }
        }
    }
}

/// What the canvas renderer draws for one block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub block: Block,
    pub active: bool,
    pub depth: usize,
    pub children: Vec<RenderNode>,
}

impl TreeNode for RenderNode {
    fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }
}

fn render_node(views: &ViewIndex) -> impl FnMut(&Block, usize) -> RenderNode + '_ {
    let active = views.active();
    move |block, depth| RenderNode {
        block: block.clone(),
        active: active.is_active(&block.id),
        depth,
        children: Vec::new(),
    }
}

/// Render tree of the whole canvas
pub fn render_tree(views: &ViewIndex, max_depth: usize) -> Vec<RenderNode> {
    let mut nest = Nest::new(render_node(views));
    walk(views, max_depth, &mut nest);
    nest.roots
}

/// Render tree under a single block
pub fn render_subtree(views: &ViewIndex, id: &BlockId, max_depth: usize) -> Option<RenderNode> {
    let mut nest = Nest::new(render_node(views));
    if walk_from(views, id, max_depth, &mut nest) {
        nest.roots.pop()
    } else {
        None
    }
}

/// One row of the component outline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineItem {
    pub id: BlockId,
    pub label: String,
    pub block_type: BlockType,
    pub active: bool,
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    /// Only containers offer "add block"
    pub fn can_add_children(&self) -> bool {
        self.block_type == BlockType::Container
    }

    pub fn child_ids(&self) -> Vec<&BlockId> {
        self.children.iter().map(|child| &child.id).collect()
    }
}

impl TreeNode for OutlineItem {
    fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }
}

/// Outline of the whole canvas
pub fn outline(views: &ViewIndex, max_depth: usize) -> Vec<OutlineItem> {
    let active = views.active();
    let mut nest = Nest::new(|block: &Block, _depth: usize| OutlineItem {
        id: block.id.clone(),
        label: block.label(),
        block_type: block.block_type(),
        active: active.is_active(&block.id),
        children: Vec::new(),
    });
    walk(views, max_depth, &mut nest);
    nest.roots
}

/// Shape summary of the canvas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub total: usize,
    pub containers: usize,
    pub texts: usize,
    pub images: usize,
    pub roots: usize,
    /// Blocks whose parent id does not resolve
    pub orphans: usize,
    /// Blocks not reachable from any root (parent chain loops)
    pub unreachable: usize,
    pub max_depth: usize,
}

struct StatsVisitor {
    reached: usize,
    max_depth: usize,
}

impl Visitor for StatsVisitor {
    fn enter(&mut self, _block: &Block, depth: usize) -> bool {
        self.reached += 1;
        self.max_depth = self.max_depth.max(depth);
        true
    }
}

impl TreeStats {
    pub fn collect(views: &ViewIndex, max_depth: usize) -> Self {
        let blocks = views.store().get_all();
        let ids: HashSet<&BlockId> = blocks.iter().map(|block| &block.id).collect();

        let mut stats = TreeStats {
            total: blocks.len(),
            ..TreeStats::default()
        };

        for block in blocks.iter() {
            match block.block_type() {
                BlockType::Container => stats.containers += 1,
                BlockType::Text => stats.texts += 1,
                BlockType::Image => stats.images += 1,
            }
            match &block.parent_id {
                None => stats.roots += 1,
                Some(parent_id) if !ids.contains(parent_id) => stats.orphans += 1,
                Some(_) => {}
            }
        }

        let mut visitor = StatsVisitor {
            reached: 0,
            max_depth: 0,
        };
        walk(views, max_depth, &mut visitor);
        stats.unreachable = stats.total.saturating_sub(visitor.reached);
        stats.max_depth = visitor.max_depth;
        stats
    }
}
