use anyhow::anyhow;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod notebook;
mod tools;

use config::Config;
use notebook::Notebook;

#[derive(Debug, Parser)]
#[command(name = "link-index", version, about = "Query links, block references and embeds in a notebook")]
struct Cli {
    /// Config file (defaults to ./link-index.toml when present).
    #[arg(long, env = "LINK_INDEX_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Notebook directory containing `pages/*.json`.
    #[arg(long, env = "LINK_INDEX_NOTEBOOK", global = true)]
    notebook: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, env = "LINK_INDEX_LOG", global = true)]
    log: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Backlinks and forward links of a page.
    Links { title: String },
    /// Pages citing a block.
    BlockRefs { block_id: String },
    /// Pages live-embedding a block.
    Embeds { block_id: String },
    /// Link titles that match no page.
    Unresolved,
    /// Index counters.
    Stats,
}

impl Command {
    fn tool(&self) -> (&'static str, Value) {
        match self {
            Command::Links { title } => ("get_links", json!({ "title": title })),
            Command::BlockRefs { block_id } => ("get_block_refs", json!({ "block_id": block_id })),
            Command::Embeds { block_id } => ("get_embeds", json!({ "block_id": block_id })),
            Command::Unresolved => ("unresolved", json!({})),
            Command::Stats => ("stats", json!({})),
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.notebook, cli.log);
    init_tracing(&config);

    let notebook = Notebook::open(config.notebook_dir()?)?;
    tracing::debug!("Opened notebook with {} pages", notebook.pages().len());

    let (name, mut arguments) = cli.command.tool();
    if cli.json {
        arguments["format"] = json!("json");
    }
    let output = tools::call(&notebook, name, &arguments).map_err(|e| anyhow!(e))?;
    print!("{}", output);
    if cli.json {
        println!();
    }
    Ok(())
}
