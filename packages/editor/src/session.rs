//! # Edit Session
//!
//! One editing session over one canvas: the store, its view index, the id
//! generator for new blocks and the configured post-effects. Consumers get
//! handles from the session instead of sharing global state; dropping the
//! session ends the canvas.

use crate::config::EditorConfig;
use crate::mutations::{Mutation, MutationPolicy, MutationResult};
use crate::post_effects::{ClearStaleSelection, PostEffectEngine};
use crate::store::TreeStore;
use crate::tree::{self, OutlineItem, RenderNode, TreeStats};
use crate::views::ViewIndex;
use crate::EditorError;
use canvas_model::{Block, BlockId, BlockTemplate, BlockType, IdGenerator};
use tracing::{info, instrument};

pub struct EditSession {
    config: EditorConfig,
    views: ViewIndex,
    ids: IdGenerator,
    template: BlockTemplate,
    effects: PostEffectEngine,
    policy: MutationPolicy,
}

impl EditSession {
    /// Session over an empty canvas
    pub fn new(config: EditorConfig) -> Self {
        Self::with_blocks(config, Vec::new())
    }

    pub fn with_blocks(config: EditorConfig, blocks: Vec<Block>) -> Self {
        let mut effects = PostEffectEngine::new();
        if config.clear_selection_on_delete {
            effects = effects.with_effect(ClearStaleSelection);
        }

        let ids = config.id_generator();
        info!(seed = ids.seed(), blocks = blocks.len(), "Starting edit session");

        Self {
            views: ViewIndex::new(TreeStore::with_blocks(blocks)),
            ids,
            template: config.block_template(),
            effects,
            policy: MutationPolicy {
                reject_cycles: config.reject_cycles,
            },
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &TreeStore {
        self.views.store()
    }

    pub fn views(&self) -> &ViewIndex {
        &self.views
    }

    /// Build a default block with a fresh id, without inserting it
    pub fn create_block(&mut self, block_type: BlockType, parent_id: Option<BlockId>) -> Block {
        self.template.create(block_type, parent_id, &mut self.ids)
    }

    /// Create a default block and append it under `parent_id`
    pub fn add_block(&mut self, block_type: BlockType, parent_id: Option<BlockId>) -> Result<BlockId, EditorError> {
        let block = self.create_block(block_type, parent_id);
        let id = block.id.clone();
        self.apply(Mutation::InsertBlock { block })?;
        Ok(id)
    }

    /// Validate and apply a mutation plus its post-effects
    #[instrument(skip(self, mutation), fields(mutation = mutation.name()))]
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let removed = match &mutation {
            Mutation::RemoveBlock { block_id } => Some(block_id.clone()),
            _ => None,
        };

        let result = self.effects.apply_with_effects(mutation, &self.views, &self.policy)?;

        if let Some(block_id) = removed {
            self.views.evict(&block_id);
        }

        Ok(result)
    }

    pub fn select(&mut self, block_id: Option<BlockId>) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::Select { block_id })
    }

    pub fn selected(&self) -> Option<Block> {
        self.views.active().read()
    }

    pub fn render_tree(&self) -> Vec<RenderNode> {
        tree::render_tree(&self.views, self.config.max_depth)
    }

    pub fn outline(&self) -> Vec<OutlineItem> {
        tree::outline(&self.views, self.config.max_depth)
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats::collect(&self.views, self.config.max_depth)
    }

    /// Replace the canvas and clear the selection
    pub fn reset(&mut self, blocks: Vec<Block>) {
        info!(blocks = blocks.len(), "Resetting canvas");
        self.views = ViewIndex::new(self.views.store().clone());
        self.views.store().reset(blocks);
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("seed", &self.ids.seed())
            .field("views", &self.views)
            .field("effects", &self.effects)
            .finish()
    }
}
