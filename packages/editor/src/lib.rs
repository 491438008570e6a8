//! # Canvas Editor
//!
//! In-memory editing core for the block canvas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Block records + factory              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: canonical list + selection           │
//! │  - replace_all is the only mutation         │
//! │  - keyed change notifications               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ views: memoized projections per key         │
//! │  - for_id / children_of / active            │
//! │  - writes rebuild the full list             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mutations + session: validated edits        │
//! │ tree: render tree / outline walks           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Flat list is source of truth**: the tree, the outline and every
//!    projection are derived from it
//! 2. **Whole-list commits**: no partial writes; each edit replaces the list
//! 3. **Permissive core**: projections never fail; dangling ids degrade to
//!    "root" or "nothing selected"
//! 4. **Validation at the edges**: semantic mutations check structure before
//!    writing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use canvas_editor::{EditSession, EditorConfig, Mutation};
//! use canvas_model::BlockType;
//!
//! let mut session = EditSession::new(EditorConfig::default());
//!
//! // Outline "add block" action
//! let container = session.add_block(BlockType::Container, None)?;
//! let text = session.add_block(BlockType::Text, Some(container.clone()))?;
//!
//! // Property panel edit
//! session.apply(Mutation::UpdateText {
//!     block_id: text.clone(),
//!     content: "Hello".to_string(),
//! })?;
//!
//! // Canvas renderer
//! let roots = session.views().children_of(None).read();
//! ```

mod config;
mod errors;
mod mutations;
mod post_effects;
pub mod rewrite;
mod session;
mod store;
pub mod tree;
mod views;

pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use errors::EditorError;
pub use mutations::{Mutation, MutationError, MutationPolicy, MutationResult};
pub use post_effects::{ClearStaleSelection, PostEffect, PostEffectEngine};
pub use session::EditSession;
pub use store::{
    children_in, find_block, Change, Snapshot, SubscriptionId, SubscriptionKey, TreeStore,
};
pub use tree::{OutlineItem, RenderNode, TreeStats, Visitor};
pub use views::{ActiveBlockView, BlockView, ChildrenView, ViewIndex};

// Re-export model types for convenience
pub use canvas_model::{Block, BlockId, BlockKind, BlockType};
