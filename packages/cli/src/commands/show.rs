use crate::sample::sample_session;
use anyhow::Result;
use canvas_editor::{EditorConfig, OutlineItem, RenderNode, TreeStats};
use canvas_model::{BlockKind, Position};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Select a block before printing
    #[arg(short, long)]
    pub select: Option<String>,
}

/// How results are written to stdout
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn print_outline(&self, items: &[OutlineItem]) -> Result<()> {
        if self.json {
            return self.print_json(items);
        }
        if items.is_empty() {
            println!("  {}", "(empty canvas)".dimmed());
        }
        for item in items {
            print_outline_item(item, 1);
        }
        Ok(())
    }

    pub fn print_render_tree(&self, nodes: &[RenderNode]) -> Result<()> {
        if self.json {
            return self.print_json(nodes);
        }
        for node in nodes {
            print_render_node(node);
        }
        Ok(())
    }

    pub fn print_stats(&self, stats: &TreeStats) -> Result<()> {
        if self.json {
            return self.print_json(stats);
        }
        println!("   Blocks:      {}", stats.total);
        println!("   Containers:  {}", stats.containers);
        println!("   Texts:       {}", stats.texts);
        println!("   Images:      {}", stats.images);
        println!("   Roots:       {}", stats.roots);
        println!("   Max depth:   {}", stats.max_depth);
        if stats.orphans > 0 {
            println!("   {} {}", "Orphans:".yellow(), stats.orphans);
        }
        if stats.unreachable > 0 {
            println!("   {} {}", "Unreachable:".red(), stats.unreachable);
        }
        Ok(())
    }
}

fn print_outline_item(item: &OutlineItem, indent: usize) {
    let marker = if item.can_add_children() { "▸" } else { "·" };
    let label = if item.active {
        item.label.green().bold()
    } else {
        item.label.normal()
    };
    println!("{}{} {}", "  ".repeat(indent), marker, label);

    for child in &item.children {
        print_outline_item(child, indent + 1);
    }
}

fn describe(node: &RenderNode) -> String {
    let block = &node.block;
    let mut parts = vec![format!("{}x{}", block.size.width, block.size.height)];

    match &block.position {
        Position::Relative => {}
        other => parts.push(format!("{:?}", other.kind()).to_lowercase()),
    }

    match &block.kind {
        BlockKind::Container => parts.push(format!("{:?} gap {}", block.layout.direction, block.layout.gap).to_lowercase()),
        BlockKind::Text { content, font_size, .. } => parts.push(format!("\"{}\" {}", content, font_size)),
        BlockKind::Image { source } => parts.push(source.clone()),
    }

    parts.join("  ")
}

fn print_render_node(node: &RenderNode) {
    let name = format!("<{} id={}>", node.block.block_type(), node.block.id);
    let name = if node.active { name.green().bold() } else { name.cyan() };
    println!("{}{}  {}", "  ".repeat(node.depth + 1), name, describe(node).dimmed());

    for child in &node.children {
        print_render_node(child);
    }
}

pub fn outline(args: ShowArgs, config: EditorConfig, output: &Output) -> Result<()> {
    let session = sample_session(config, args.select.as_deref())?;
    output.print_outline(&session.outline())
}

pub fn render(args: ShowArgs, config: EditorConfig, output: &Output) -> Result<()> {
    let session = sample_session(config, args.select.as_deref())?;
    output.print_render_tree(&session.render_tree())
}

pub fn stats(config: EditorConfig, output: &Output) -> Result<()> {
    let session = sample_session(config, None)?;
    output.print_stats(&session.stats())
}
