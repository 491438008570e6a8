use anyhow::{Context, Result};
use canvas_editor::{EditorConfig, DEFAULT_CONFIG_NAME};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Session name used to seed block ids
    #[arg(short, long)]
    pub name: Option<String>,

    /// Deselect when the active block is removed
    #[arg(long)]
    pub clear_selection_on_delete: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, dir: &Path) -> Result<()> {
    let config_path = dir.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = EditorConfig {
        session_name: args.name,
        clear_selection_on_delete: args.clear_selection_on_delete,
        ..EditorConfig::default()
    };

    fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)
        .with_context(|| format!("Cannot write {}", config_path.display()))?;

    println!("  {} Created {}", "✓".green(), config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Run: canvas outline");
    println!("  2. Run: canvas demo");

    Ok(())
}
