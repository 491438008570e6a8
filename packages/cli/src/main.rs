mod commands;
mod sample;

use anyhow::{Context, Result};
use canvas_editor::EditorConfig;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, demo, init, outline, render, stats, ApplyArgs, InitArgs, Output, ShowArgs};
use std::path::PathBuf;
use tracing::debug;

/// Canvas CLI - inspect and script edits on a block canvas
#[derive(Parser, Debug)]
#[command(name = "canvas")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding canvas.config.json (defaults to the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default canvas.config.json
    Init(InitArgs),

    /// Print the outline of the sample canvas
    Outline(ShowArgs),

    /// Print the render tree of the sample canvas
    Render(ShowArgs),

    /// Print block counts and tree shape
    Stats,

    /// Apply a JSON list of mutations to the sample canvas
    Apply(ApplyArgs),

    /// Run a scripted editing session and print each step
    Demo,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Cannot get current directory")?;
    let config_dir = cli.config.unwrap_or(cwd);
    let output = Output { json: cli.json };

    let load_config = || {
        let config = EditorConfig::load(&config_dir)
            .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;
        debug!(dir = %config_dir.display(), ?config, "Loaded config");
        Ok::<_, anyhow::Error>(config)
    };

    match cli.command {
        Command::Init(args) => init(args, &config_dir),
        Command::Outline(args) => outline(args, load_config()?, &output),
        Command::Render(args) => render(args, load_config()?, &output),
        Command::Stats => stats(load_config()?, &output),
        Command::Apply(args) => apply(args, load_config()?, &output),
        Command::Demo => demo(load_config()?, &output),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
