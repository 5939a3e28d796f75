//! # Export Q&A CLI (`eqa`)
//!
//! Builds and queries the store for one personal data export.
//!
//! ## Usage
//!
//! ```bash
//! eqa --config ./config/eqa.toml <command>
//! eqa --session ./sessions/abc123 <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `eqa index` | Build the store if it is missing or stale |
//! | `eqa index --rebuild` | Rebuild the store unconditionally |
//! | `eqa ask "<question>"` | Answer a question |
//! | `eqa stats` | Connection statistics |
//! | `eqa count <source>` | Row count of a named source |
//! | `eqa sources` | List ingested sources |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use export_qa::config::{self, Config};
use export_qa::error::QaError;
use export_qa::models::Answer;
use export_qa::session::SessionPaths;
use export_qa::{answer, manifest, sources, stats};

/// Export Q&A: index a personal data export and ask questions about it.
#[derive(Parser)]
#[command(
    name = "eqa",
    about = "Index a personal data export and answer questions about it",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/eqa.toml")]
    config: PathBuf,

    /// Session directory holding the export and its store.
    ///
    /// Overrides `store.path` and `export.root` from the config file. When
    /// the config file does not exist, defaults are used.
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the store when it is missing or stale.
    Index {
        /// Discard the current store and rebuild from the export.
        #[arg(long)]
        rebuild: bool,
    },

    /// Answer a free-text question.
    Ask {
        question: String,

        /// Print the structured answer as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show connection statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Print the row count of a source, by alias (`positions`) or file name.
    Count { source: String },

    /// List ingested sources with row counts and columns.
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = resolve_config(&cli.config, cli.session.as_deref())?;

    match cli.command {
        Commands::Index { rebuild } => run_index(&cfg, rebuild).await?,
        Commands::Ask { question, json } => {
            let answer = answer::answer_question(&cfg, &question).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                print_answer(&answer);
            }
        }
        Commands::Stats { json } => {
            let stats = stats::collect_stats(&cfg).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                stats::print_stats(&cfg, &stats);
            }
        }
        Commands::Count { source } => match sources::row_count(&cfg, &source).await? {
            Some(n) => println!("{}", n),
            None => {
                println!("No rows found for '{}'.", source);
                std::process::exit(1);
            }
        },
        Commands::Sources => {
            let list = sources::list_sources(&cfg).await?;
            if list.is_empty() {
                println!("No sources indexed. Run `eqa index` first.");
                return Ok(());
            }
            println!("{:<56} {:>8}  COLUMNS", "SOURCE", "ROWS");
            for s in list {
                println!(
                    "{:<56} {:>8}  {}",
                    s.source_file,
                    s.row_count,
                    s.columns.join(", ")
                );
            }
        }
    }

    Ok(())
}

fn resolve_config(config_path: &Path, session: Option<&Path>) -> Result<Config> {
    let Some(session_root) = session else {
        return config::load_config(config_path);
    };
    let paths = SessionPaths::resolve(session_root);
    if config_path.exists() {
        Ok(config::load_config(config_path)?.for_session(&paths))
    } else {
        Ok(Config::new(&paths.store_path, &paths.export_root))
    }
}

async fn run_index(cfg: &Config, rebuild: bool) -> Result<()> {
    let outcome = match manifest::ensure_index(cfg, rebuild).await {
        Ok(outcome) => outcome,
        Err(e) if QaError::is_export_not_found(&e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
        Err(e) => return Err(e),
    };

    println!("Store:  {}", cfg.store.path.display());
    println!("Export: {}", cfg.export.root.display());
    println!("State:  {}", outcome.state);
    match outcome.rebuilt {
        Some(summary) => {
            println!();
            println!("Rebuilt:");
            println!("  documents: {}", summary.total_docs);
            println!("  sources:   {}", summary.sources);
            println!("  signature: {}", summary.signature);
        }
        None => println!("Up to date; nothing to do."),
    }
    Ok(())
}

fn print_answer(answer: &Answer) {
    println!("{}", answer.answer);
    if answer.matches.is_empty() {
        return;
    }
    println!();
    for (i, m) in answer.matches.iter().enumerate() {
        println!("{}. {}", i + 1, m.title);
        println!("    source: {} (row {})", m.source_file, m.row_id);
        for line in m.snippet.lines() {
            println!("    > {}", line);
        }
        println!();
    }
}
