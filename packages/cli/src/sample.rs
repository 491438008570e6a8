//! The canvas every command starts from

use anyhow::Result;
use canvas_editor::{EditSession, EditorConfig};
use canvas_model::{Block, BlockId, BlockKind, BlockTemplate, BlockType, Size};

/// A page container holding a card, with a loose heading and a side panel
pub fn sample_canvas(template: &BlockTemplate) -> Vec<Block> {
    let page = template.build(BlockId::from("1"), BlockType::Container, None);

    let mut card = template.build(BlockId::from("2"), BlockType::Container, Some(page.id.clone()));
    card.size = Size::new("100px", "100px");

    let mut heading = template.build(BlockId::from("3"), BlockType::Text, None);
    heading.kind = BlockKind::text("hello world");
    heading.size = Size::new("100%", "20px");

    let mut body = template.build(BlockId::from("4"), BlockType::Text, Some(card.id.clone()));
    body.kind = BlockKind::text("hello world");
    body.size = Size::new("100%", "20px");

    let mut panel = template.build(BlockId::from("5"), BlockType::Container, None);
    panel.size = Size::new("200px", "300px");

    vec![page, card, heading, body, panel]
}

/// Session over the sample canvas, optionally with a block selected
pub fn sample_session(config: EditorConfig, select: Option<&str>) -> Result<EditSession> {
    let blocks = sample_canvas(&config.block_template());
    let mut session = EditSession::with_blocks(config, blocks);

    if let Some(id) = select {
        session.select(Some(BlockId::from(id)))?;
    }

    Ok(session)
}
