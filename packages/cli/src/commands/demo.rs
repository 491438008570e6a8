use super::show::Output;
use crate::sample::sample_session;
use anyhow::Result;
use canvas_editor::{EditSession, EditorConfig, Mutation};
use canvas_model::{BlockId, BlockType, TextDecoration};
use colored::Colorize;
use serde_json::{json, Value};

struct Steps<'a> {
    output: &'a Output,
    recorded: Vec<Value>,
}

impl Steps<'_> {
    fn record(&mut self, title: &str, session: &EditSession) -> Result<()> {
        if self.output.json {
            self.recorded.push(json!({
                "step": title,
                "selected": session.store().selected_id(),
                "outline": session.outline(),
            }));
            return Ok(());
        }

        println!("{} {}", "▶".bright_blue(), title.bold());
        self.output.print_outline(&session.outline())?;
        println!();
        Ok(())
    }
}

/// Walks through the outline actions a user would take on the sample canvas
pub fn demo(config: EditorConfig, output: &Output) -> Result<()> {
    let mut session = sample_session(config, None)?;
    let mut steps = Steps {
        output,
        recorded: Vec::new(),
    };
    let page = BlockId::from("1");
    let panel = BlockId::from("5");

    steps.record("Sample canvas", &session)?;

    let text = session.add_block(BlockType::Text, Some(page.clone()))?;
    session.select(Some(text.clone()))?;
    steps.record(&format!("Add text {} to the page and select it", text), &session)?;

    session.apply(Mutation::UpdateText {
        block_id: text.clone(),
        content: "Welcome".to_string(),
    })?;
    session.apply(Mutation::SetTextDecoration {
        block_id: text.clone(),
        decoration: TextDecoration::Bold,
    })?;

    session.apply(Mutation::MoveBlock {
        block_id: text.clone(),
        new_parent_id: Some(panel.clone()),
    })?;
    steps.record("Edit the text and move it into the side panel", &session)?;

    let image = session.add_block(BlockType::Image, Some(page.clone()))?;
    steps.record(&format!("Add image {} to the page", image), &session)?;

    session.apply(Mutation::RemoveBlock { block_id: page })?;
    steps.record("Remove the page (its children become roots)", &session)?;

    if output.json {
        output.print_json(&json!({
            "steps": steps.recorded,
            "stats": session.stats(),
        }))?;
    } else {
        println!("{} {}", "✨".green(), "Done".green().bold());
        output.print_stats(&session.stats())?;
    }

    Ok(())
}
