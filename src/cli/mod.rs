//! Command-line entry points
//!
//! - `serve`: HTTP chat server
//! - `telegram`: long-polling Telegram bot
//! - `build-index` / `append-index` / `search`: index maintenance
//! - `ask`: one-off question from the terminal
//! - `evaluate` / `count-verdicts`: benchmark runs
//! - `update-config`: edit `params.json`
//! - `label-uuids`: stamp Q/A CSV rows with fresh uuids

pub mod ask;
pub mod evaluate;
pub mod index;
pub mod label;
pub mod params;
pub mod serve;
pub mod telegram;

use clap::{Parser, Subcommand};
use tracing::info;

/// RAG-backed Q/A chatbot
#[derive(Parser, Debug)]
#[command(name = "qa-rag-chatbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP chat server
    Serve(serve::ServeArgs),

    /// Run the Telegram bot
    Telegram,

    /// Build a new index from CSV / JSON sources
    BuildIndex(index::BuildIndexArgs),

    /// Add texts to an existing index
    AppendIndex(index::AppendIndexArgs),

    /// Show the passages retrieved for a query
    Search(index::SearchArgs),

    /// Ask the chatbot a single question
    Ask(ask::AskArgs),

    /// Run a benchmark evaluation
    Evaluate(evaluate::EvaluateArgs),

    /// Tally judge verdicts of a generation results CSV
    CountVerdicts(evaluate::CountVerdictsArgs),

    /// Update params.json from a preset and/or individual fields
    UpdateConfig(params::UpdateConfigArgs),

    /// Assign fresh uuids to the rows of Q/A CSV files
    LabelUuids(label::LabelUuidsArgs),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = crate::bootstrap()?;

    match cli.command {
        Command::Serve(args) => serve::run(&config, args).await,
        Command::Telegram => telegram::run(&config).await,
        Command::BuildIndex(args) => index::build(&config, args).await,
        Command::AppendIndex(args) => index::append(&config, args).await,
        Command::Search(args) => index::search(&config, args).await,
        Command::Ask(args) => ask::run(&config, args).await,
        Command::Evaluate(args) => evaluate::run(&config, args).await,
        Command::CountVerdicts(args) => evaluate::count(&config, args),
        Command::UpdateConfig(args) => params::run(&config, args).await,
        Command::LabelUuids(args) => label::run(args),
    }
}

/// Resolves on Ctrl-C
pub(crate) async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
