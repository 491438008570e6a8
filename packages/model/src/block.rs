//! Block records: the nodes of the canvas tree.
//!
//! The tree is implicit. Each record points at its parent by id and a record
//! without a parent sits directly on the canvas.

use crate::id_generator::{BlockId, IdGenerator};
use crate::style::{Layout, Position, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown by freshly created image blocks
pub const DEFAULT_IMAGE_SOURCE: &str = "https://png.pngtree.com/png-vector/20191126/ourmid/pngtree-image-of-cute-radish-vector-or-color-illustration-png-image_2040180.jpg";

/// Block variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Container,
    Text,
    Image,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Container => "container",
            BlockType::Text => "text",
            BlockType::Image => "image",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextDecoration {
    Normal,
    Italic,
    Bold,
    Strikethrough,
}

/// Variant payload of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum BlockKind {
    Container,
    #[serde(rename_all = "camelCase")]
    Text {
        content: String,
        font_size: String,
        color: String,
        decoration: TextDecoration,
    },
    Image {
        source: String,
    },
}

impl BlockKind {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Container => BlockType::Container,
            BlockKind::Text { .. } => BlockType::Text,
            BlockKind::Image { .. } => BlockType::Image,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, BlockKind::Container)
    }

    /// Default text payload
    pub fn text(content: impl Into<String>) -> Self {
        BlockKind::Text {
            content: content.into(),
            font_size: "14px".to_string(),
            color: "#000000".to_string(),
            decoration: TextDecoration::Normal,
        }
    }

    pub fn image(source: impl Into<String>) -> Self {
        BlockKind::Image {
            source: source.into(),
        }
    }
}

/// One node of the canvas tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<BlockId>,
    pub kind: BlockKind,
    pub size: Size,
    pub position: Position,
    pub layout: Layout,
}

impl Block {
    /// Create a block of `block_type` with a fresh id and variant defaults
    pub fn new(block_type: BlockType, parent_id: Option<BlockId>, ids: &mut IdGenerator) -> Self {
        Self::with_id(ids.new_id(), block_type, parent_id)
    }

    /// Like [`Block::new`] but with a caller-chosen id
    pub fn with_id(id: impl Into<BlockId>, block_type: BlockType, parent_id: Option<BlockId>) -> Self {
        BlockTemplate::default().build(id.into(), block_type, parent_id)
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Outline label, `<type>-<id>`
    pub fn label(&self) -> String {
        format!("{}-{}", self.block_type(), self.id)
    }
}

/// Default values used when creating blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    pub image_source: String,
}

impl Default for BlockTemplate {
    fn default() -> Self {
        Self {
            image_source: DEFAULT_IMAGE_SOURCE.to_string(),
        }
    }
}

impl BlockTemplate {
    pub fn build(&self, id: BlockId, block_type: BlockType, parent_id: Option<BlockId>) -> Block {
        let (kind, size) = match block_type {
            BlockType::Container => (BlockKind::Container, Size::new("100%", "300px")),
            BlockType::Text => (BlockKind::text("New text"), Size::new("100%", "auto")),
            BlockType::Image => (BlockKind::image(self.image_source.clone()), Size::new("auto", "auto")),
        };

        Block {
            id,
            parent_id,
            kind,
            size,
            position: Position::Relative,
            layout: Layout::default(),
        }
    }

    pub fn create(&self, block_type: BlockType, parent_id: Option<BlockId>, ids: &mut IdGenerator) -> Block {
        self.build(ids.new_id(), block_type, parent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Dimension;

    #[test]
    fn test_container_defaults() {
        let block = Block::with_id("c", BlockType::Container, None);
        assert!(block.is_root());
        assert_eq!(block.size.width, Dimension::length("100%"));
        assert_eq!(block.size.height, Dimension::length("300px"));
        assert_eq!(block.position, Position::Relative);
        assert_eq!(block.layout, Layout::default());
    }

    #[test]
    fn test_text_defaults() {
        let block = Block::with_id("t", BlockType::Text, Some(BlockId::from("c")));
        assert_eq!(block.parent_id, Some(BlockId::from("c")));
        match &block.kind {
            BlockKind::Text { content, font_size, decoration, .. } => {
                assert_eq!(content, "New text");
                assert_eq!(font_size, "14px");
                assert_eq!(*decoration, TextDecoration::Normal);
            }
            other => panic!("expected text block, got {:?}", other),
        }
        assert!(block.size.height.is_auto());
    }

    #[test]
    fn test_image_uses_template_source() {
        let template = BlockTemplate {
            image_source: "https://example.com/cat.png".to_string(),
        };
        let mut ids = IdGenerator::new("images");
        let block = template.create(BlockType::Image, None, &mut ids);
        assert_eq!(block.kind, BlockKind::image("https://example.com/cat.png"));
        assert!(block.size.width.is_auto());
    }

    #[test]
    fn test_factory_assigns_fresh_ids() {
        let mut ids = IdGenerator::new("fresh");
        let a = Block::new(BlockType::Text, None, &mut ids);
        let b = Block::new(BlockType::Text, None, &mut ids);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_label() {
        let block = Block::with_id("42", BlockType::Image, None);
        assert_eq!(block.label(), "image-42");
    }

    #[test]
    fn test_kind_serializes_with_type_tag() {
        let json = serde_json::to_value(BlockKind::text("hi")).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["fontSize"], "14px");
    }
}
