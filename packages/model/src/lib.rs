//! # Canvas Model
//!
//! Block records for the canvas editor: the variant payloads, size, position
//! and flex layout, plus the factory that creates blocks with fresh ids and
//! variant defaults.

pub mod block;
pub mod id_generator;
pub mod style;

pub use block::{Block, BlockKind, BlockTemplate, BlockType, TextDecoration, DEFAULT_IMAGE_SOURCE};
pub use id_generator::{get_session_seed, BlockId, IdGenerator};
pub use style::{Align, Dimension, Direction, JustifyContent, Layout, Offsets, Position, PositionKind, Size};
