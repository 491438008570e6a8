use super::show::Output;
use crate::sample::sample_session;
use anyhow::{Context, Result};
use canvas_editor::{EditorConfig, Mutation};
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// JSON file holding an array of mutations
    pub input: PathBuf,

    /// Keep going after a rejected mutation
    #[arg(short, long)]
    pub keep_going: bool,
}

pub fn apply(args: ApplyArgs, config: EditorConfig, output: &Output) -> Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Cannot read {}", args.input.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&source)
        .with_context(|| format!("Invalid mutation list in {}", args.input.display()))?;

    let mut session = sample_session(config, None)?;
    let total = mutations.len();
    let mut rejected = Vec::new();

    for (index, mutation) in mutations.into_iter().enumerate() {
        let name = mutation.name();
        match session.apply(mutation) {
            Ok(result) => {
                if !output.json {
                    println!("  {} {} (revision {})", "✓".green(), name, result.revision);
                }
            }
            Err(err) => {
                if !output.json {
                    println!("  {} {} #{}: {}", "✗".red(), name, index, err);
                }
                rejected.push(json!({ "index": index, "mutation": name, "error": err.to_string() }));
                if !args.keep_going {
                    break;
                }
            }
        }
    }

    if output.json {
        output.print_json(&json!({
            "rejected": rejected,
            "outline": session.outline(),
        }))?;
    } else {
        println!();
        output.print_outline(&session.outline())?;
    }

    if !rejected.is_empty() {
        return Err(anyhow::anyhow!("{} of {} mutations rejected", rejected.len(), total));
    }

    Ok(())
}
