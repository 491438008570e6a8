//! # Post-Effect System
//!
//! A mutation may call for follow-up edits to keep editor state coherent.
//! Post-effects look at a mutation after it was applied and return the
//! secondary mutations to apply next.
//!
//! Post-effects are:
//! - **Deterministic**: same mutation and store state, same effects
//! - **Opt-in**: the session registers only the effects its config enables

use crate::mutations::{Mutation, MutationError, MutationPolicy, MutationResult};
use crate::store::TreeStore;
use crate::views::ViewIndex;
use tracing::debug;

/// Post-effect that can be triggered by a mutation
pub trait PostEffect: std::fmt::Debug {
    /// Analyze the applied mutation and generate secondary mutations if needed
    fn analyze(&self, mutation: &Mutation, store: &TreeStore) -> Vec<Mutation>;
}

/// Deselect when the active block is removed.
///
/// Without this effect the selection keeps pointing at the removed id and
/// resolves to no block.
#[derive(Debug)]
pub struct ClearStaleSelection;

impl PostEffect for ClearStaleSelection {
    fn analyze(&self, mutation: &Mutation, store: &TreeStore) -> Vec<Mutation> {
        match mutation {
            Mutation::RemoveBlock { block_id } if store.selected_id().as_ref() == Some(block_id) => {
                vec![Mutation::Select { block_id: None }]
            }
            _ => vec![],
        }
    }
}

/// Post-effect engine that applies all registered effects
#[derive(Debug, Default)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Engine with no effects
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effect(mut self, effect: impl PostEffect + 'static) -> Self {
        self.effects.push(Box::new(effect));
        self
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Analyze a mutation and generate all secondary mutations
    pub fn analyze(&self, mutation: &Mutation, store: &TreeStore) -> Vec<Mutation> {
        let mut secondary_mutations = Vec::new();

        for effect in &self.effects {
            let mut effect_mutations = effect.analyze(mutation, store);
            secondary_mutations.append(&mut effect_mutations);
        }

        secondary_mutations
    }

    /// Apply a mutation with all its post-effects
    pub fn apply_with_effects(
        &self,
        mutation: Mutation,
        views: &ViewIndex,
        policy: &MutationPolicy,
    ) -> Result<MutationResult, MutationError> {
        let mut revision = mutation.apply(views, policy)?;

        let secondary = self.analyze(&mutation, views.store());
        let mut applied = vec![mutation];

        for secondary_mutation in secondary {
            debug!(mutation = secondary_mutation.name(), "Applying post-effect");
            revision = secondary_mutation.apply(views, policy)?;
            applied.push(secondary_mutation);
        }

        Ok(MutationResult { revision, applied })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_model::{Block, BlockId, BlockType};

    fn views() -> ViewIndex {
        ViewIndex::new(TreeStore::with_blocks(vec![
            Block::with_id("1", BlockType::Container, None),
            Block::with_id("2", BlockType::Text, Some(BlockId::from("1"))),
        ]))
    }

    #[test]
    fn test_empty_engine_applies_only_primary() {
        let views = views();
        let engine = PostEffectEngine::new();
        assert!(engine.is_empty());

        views.active().select(Some(BlockId::from("1")));
        let result = engine
            .apply_with_effects(
                Mutation::RemoveBlock {
                    block_id: BlockId::from("1"),
                },
                &views,
                &MutationPolicy::default(),
            )
            .unwrap();

        assert_eq!(result.applied.len(), 1);
        assert_eq!(views.active().selected_id(), Some(BlockId::from("1")));
    }

    #[test]
    fn test_clear_stale_selection() {
        let views = views();
        let engine = PostEffectEngine::new().with_effect(ClearStaleSelection);
        assert_eq!(engine.len(), 1);

        views.active().select(Some(BlockId::from("1")));
        let result = engine
            .apply_with_effects(
                Mutation::RemoveBlock {
                    block_id: BlockId::from("1"),
                },
                &views,
                &MutationPolicy::default(),
            )
            .unwrap();

        assert_eq!(
            result.applied,
            vec![
                Mutation::RemoveBlock {
                    block_id: BlockId::from("1")
                },
                Mutation::Select { block_id: None },
            ]
        );
        assert!(views.active().selected_id().is_none());
    }

    #[test]
    fn test_removing_other_block_keeps_selection() {
        let views = views();
        let engine = PostEffectEngine::new().with_effect(ClearStaleSelection);

        views.active().select(Some(BlockId::from("1")));
        let mutation = Mutation::RemoveBlock {
            block_id: BlockId::from("2"),
        };
        assert!(engine.analyze(&mutation, views.store()).is_empty());
    }
}
