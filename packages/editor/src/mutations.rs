//! # Block Mutations
//!
//! Intent-level edits issued by the outline and the property panel.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each mutation names one editing action
//! 2. **Validated**: structural constraints are checked before anything is written
//! 3. **Expressed through projections**: every mutation is a read and a write
//!    on a [`ViewIndex`] handle, so subscribers see ordinary commits
//!
//! The projections themselves never fail. Validation lives only at this
//! layer, where a rejected edit can be reported back to the caller.
//!
//! ## Mutation Semantics
//!
//! ### InsertBlock
//! - Appends a fully built block to its parent's children
//! - Parent must exist and be a container
//!
//! ### MoveBlock
//! - Rewrites the parent id and appends to the new sibling set
//! - Fails if it would put a block under itself (when cycles are rejected)
//!
//! ### RemoveBlock
//! - Removes the block and promotes its direct children to roots
//! - Never cascades

use crate::store::find_block;
use crate::tree::would_create_cycle;
use crate::views::ViewIndex;
use canvas_model::{Block, BlockId, BlockKind, Layout, Position, Size, TextDecoration};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Insert a new block under `block.parent_id`
    InsertBlock { block: Block },

    /// Replace a whole record (upsert)
    UpdateBlock { block: Block },

    /// Remove a block, promoting its direct children to roots
    RemoveBlock { block_id: BlockId },

    /// Reparent a block (`None` moves it to the canvas root)
    MoveBlock {
        block_id: BlockId,
        new_parent_id: Option<BlockId>,
    },

    SetSize { block_id: BlockId, size: Size },

    SetPosition { block_id: BlockId, position: Position },

    SetLayout { block_id: BlockId, layout: Layout },

    /// Replace text content (atomic, no merging)
    UpdateText { block_id: BlockId, content: String },

    SetFontSize { block_id: BlockId, font_size: String },

    SetTextColor { block_id: BlockId, color: String },

    SetTextDecoration {
        block_id: BlockId,
        decoration: TextDecoration,
    },

    SetImageSource { block_id: BlockId, source: String },

    /// Change the active block
    Select { block_id: Option<BlockId> },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Parent not found: {0}")]
    ParentNotFound(BlockId),

    #[error("Block already exists: {0}")]
    DuplicateId(BlockId),

    #[error("Block cannot have children: {0}")]
    NotAContainer(BlockId),

    #[error("Would create cycle: {0}")]
    CycleDetected(BlockId),

    #[error("Block is not text: {0}")]
    NotText(BlockId),

    #[error("Block is not an image: {0}")]
    NotImage(BlockId),
}

/// Checks applied before a mutation is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationPolicy {
    pub reject_cycles: bool,
}

impl Default for MutationPolicy {
    fn default() -> Self {
        Self { reject_cycles: true }
    }
}

impl Mutation {
    /// Debug name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertBlock { .. } => "insert_block",
            Mutation::UpdateBlock { .. } => "update_block",
            Mutation::RemoveBlock { .. } => "remove_block",
            Mutation::MoveBlock { .. } => "move_block",
            Mutation::SetSize { .. } => "set_size",
            Mutation::SetPosition { .. } => "set_position",
            Mutation::SetLayout { .. } => "set_layout",
            Mutation::UpdateText { .. } => "update_text",
            Mutation::SetFontSize { .. } => "set_font_size",
            Mutation::SetTextColor { .. } => "set_text_color",
            Mutation::SetTextDecoration { .. } => "set_text_decoration",
            Mutation::SetImageSource { .. } => "set_image_source",
            Mutation::Select { .. } => "select",
        }
    }

    /// Block the mutation is about, if any
    pub fn target(&self) -> Option<&BlockId> {
        match self {
            Mutation::InsertBlock { block } | Mutation::UpdateBlock { block } => Some(&block.id),
            Mutation::RemoveBlock { block_id }
            | Mutation::MoveBlock { block_id, .. }
            | Mutation::SetSize { block_id, .. }
            | Mutation::SetPosition { block_id, .. }
            | Mutation::SetLayout { block_id, .. }
            | Mutation::UpdateText { block_id, .. }
            | Mutation::SetFontSize { block_id, .. }
            | Mutation::SetTextColor { block_id, .. }
            | Mutation::SetTextDecoration { block_id, .. }
            | Mutation::SetImageSource { block_id, .. } => Some(block_id),
            Mutation::Select { block_id } => block_id.as_ref(),
        }
    }

    /// Validate, then apply through the projections. Returns the store revision.
    pub fn apply(&self, views: &ViewIndex, policy: &MutationPolicy) -> Result<u64, MutationError> {
        self.validate(views, policy)?;

        let revision = match self {
            Mutation::InsertBlock { block } => views.children_of(block.parent_id.as_ref()).push(block.clone()),

            Mutation::UpdateBlock { block } => views.for_id(&block.id).write(Some(block.clone())),

            Mutation::RemoveBlock { block_id } => views.for_id(block_id).write(None),

            Mutation::MoveBlock { block_id, new_parent_id } => {
                let mut block = Self::existing(views, block_id)?;
                block.parent_id = new_parent_id.clone();
                views.children_of(new_parent_id.as_ref()).push(block)
            }

            Mutation::SetSize { block_id, size } => Self::edit(views, block_id, |block| {
                block.size = size.clone();
            })?,

            Mutation::SetPosition { block_id, position } => Self::edit(views, block_id, |block| {
                block.position = position.clone();
            })?,

            Mutation::SetLayout { block_id, layout } => Self::edit(views, block_id, |block| {
                block.layout = layout.clone();
            })?,

            Mutation::UpdateText { block_id, content: new_content } => {
                Self::edit(views, block_id, |block| {
                    if let BlockKind::Text { content, .. } = &mut block.kind {
                        *content = new_content.clone();
                    }
                })?
            }

            Mutation::SetFontSize { block_id, font_size: new_size } => {
                Self::edit(views, block_id, |block| {
                    if let BlockKind::Text { font_size, .. } = &mut block.kind {
                        *font_size = new_size.clone();
                    }
                })?
            }

            Mutation::SetTextColor { block_id, color: new_color } => {
                Self::edit(views, block_id, |block| {
                    if let BlockKind::Text { color, .. } = &mut block.kind {
                        *color = new_color.clone();
                    }
                })?
            }

            Mutation::SetTextDecoration { block_id, decoration: new_decoration } => {
                Self::edit(views, block_id, |block| {
                    if let BlockKind::Text { decoration, .. } = &mut block.kind {
                        *decoration = *new_decoration;
                    }
                })?
            }

            Mutation::SetImageSource { block_id, source: new_source } => {
                Self::edit(views, block_id, |block| {
                    if let BlockKind::Image { source } = &mut block.kind {
                        *source = new_source.clone();
                    }
                })?
            }

            Mutation::Select { block_id } => {
                views.active().select(block_id.clone());
                views.store().revision()
            }
        };

        Ok(revision)
    }

    fn existing(views: &ViewIndex, block_id: &BlockId) -> Result<Block, MutationError> {
        views
            .for_id(block_id)
            .read()
            .ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))
    }

    fn edit(views: &ViewIndex, block_id: &BlockId, f: impl FnOnce(&mut Block)) -> Result<u64, MutationError> {
        views
            .for_id(block_id)
            .update(f)
            .ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))
    }

    /// Validate without applying
    pub fn validate(&self, views: &ViewIndex, policy: &MutationPolicy) -> Result<(), MutationError> {
        let blocks = views.store().get_all();

        let require = |block_id: &BlockId| {
            find_block(&blocks, block_id).ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))
        };

        let require_container = |parent_id: &BlockId| {
            let parent = find_block(&blocks, parent_id)
                .ok_or_else(|| MutationError::ParentNotFound(parent_id.clone()))?;
            if parent.kind.is_container() {
                Ok(())
            } else {
                Err(MutationError::NotAContainer(parent_id.clone()))
            }
        };

        let check_cycle = |block_id: &BlockId, parent_id: Option<&BlockId>| match parent_id {
            Some(parent_id) if policy.reject_cycles && would_create_cycle(&blocks, block_id, parent_id) => {
                Err(MutationError::CycleDetected(block_id.clone()))
            }
            _ => Ok(()),
        };

        match self {
            Mutation::InsertBlock { block } => {
                if find_block(&blocks, &block.id).is_some() {
                    return Err(MutationError::DuplicateId(block.id.clone()));
                }
                if let Some(parent_id) = &block.parent_id {
                    require_container(parent_id)?;
                }
                check_cycle(&block.id, block.parent_id.as_ref())
            }

            Mutation::UpdateBlock { block } => {
                check_cycle(&block.id, block.parent_id.as_ref())?;
                let current_parent = find_block(&blocks, &block.id).and_then(|b| b.parent_id.as_ref());
                match &block.parent_id {
                    Some(parent_id) if current_parent != Some(parent_id) => require_container(parent_id),
                    _ => Ok(()),
                }
            }

            Mutation::RemoveBlock { block_id } => require(block_id).map(|_| ()),

            Mutation::MoveBlock { block_id, new_parent_id } => {
                require(block_id)?;
                if let Some(parent_id) = new_parent_id {
                    require_container(parent_id)?;
                }
                check_cycle(block_id, new_parent_id.as_ref())
            }

            Mutation::SetSize { block_id, .. }
            | Mutation::SetPosition { block_id, .. }
            | Mutation::SetLayout { block_id, .. } => require(block_id).map(|_| ()),

            Mutation::UpdateText { block_id, .. }
            | Mutation::SetFontSize { block_id, .. }
            | Mutation::SetTextColor { block_id, .. }
            | Mutation::SetTextDecoration { block_id, .. } => match &require(block_id)?.kind {
                BlockKind::Text { .. } => Ok(()),
                _ => Err(MutationError::NotText(block_id.clone())),
            },

            Mutation::SetImageSource { block_id, .. } => match &require(block_id)?.kind {
                BlockKind::Image { .. } => Ok(()),
                _ => Err(MutationError::NotImage(block_id.clone())),
            },

            Mutation::Select { block_id } => match block_id {
                Some(block_id) => require(block_id).map(|_| ()),
                None => Ok(()),
            },
        }
    }
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Store revision after the mutation and its post-effects
    pub revision: u64,

    /// Primary mutation followed by any secondary ones
    pub applied: Vec<Mutation>,
}
