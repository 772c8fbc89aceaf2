use clap::{Parser, Subcommand};
use hatch3r_cli::{cmd, root};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hatch3r",
    about = "Sync one canonical agent setup to thirteen AI coding tools",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .agents/ or .git/)
    #[arg(long, global = true, env = "HATCH3R_ROOT")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a complete agent setup into the current repo
    Init {
        /// Comma-separated tools (cursor,copilot,claude,opencode,windsurf,amp,codex,gemini,cline,aider,kiro,goose,zed)
        #[arg(long)]
        tools: Option<String>,

        /// Skip confirmation when an existing .agents/ would be overwritten
        #[arg(long)]
        yes: bool,
    },

    /// Re-generate tool outputs from canonical .agents/ state
    Sync,

    /// Check sync status between canonical .agents/ and generated files
    Status,

    /// Refresh hatch3r-managed canonical files and re-sync with safe merge
    Update {
        /// Create backups before overwriting (the default)
        #[arg(long, overrides_with = "no_backup")]
        backup: bool,

        /// Skip creating backups before overwriting
        #[arg(long)]
        no_backup: bool,
    },

    /// Validate the canonical .agents/ structure
    Validate,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { tools, yes } => cmd::init::run(&root, tools.as_deref(), yes),
        Commands::Sync => cmd::sync::run(&root),
        Commands::Status => cmd::status::run(&root),
        Commands::Update { backup: _, no_backup } => cmd::update::run(&root, !no_backup),
        Commands::Validate => cmd::validate::run(&root),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
