//! Terminal chat client for a screening session.
//!
//! Reads candidate messages from stdin, one per line, and prints the
//! interviewer's replies. Typing an exit phrase (`exit`, `quit`, `bye`, ...)
//! closes the session and appends the transcript to the JSONL log. End of
//! input abandons the session without persisting it.
//!
//! ```bash
//! cargo run --bin talentscout-chat -- --persona clara
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use talentscout::persistence::JsonlConversationStore;
use talentscout::screening::{ConfiguredModelSelector, ModelSelector, TurnOutcome};
use talentscout::sentiment::analyze_sentiment;
use talentscout::{Persona, ScreeningConfig, ScreeningSession};

#[derive(Parser)]
#[command(name = "talentscout-chat")]
#[command(about = "Chat with a TalentScout hiring assistant in the terminal", long_about = None)]
struct Cli {
    /// Interviewer persona: Lani, Malik or Clara
    #[arg(short, long, default_value_t = Persona::Lani)]
    persona: Persona,

    /// YAML configuration file (overrides TALENTSCOUT_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not annotate messages with their sentiment
    #[arg(long)]
    no_sentiment: bool,
}

fn prompt() -> Result<()> {
    print!("You: ");
    std::io::stdout().flush().context("Failed to flush stdout")
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config =
        ScreeningConfig::from_env(cli.config.as_deref()).context("Failed to load configuration")?;

    let selector = ConfiguredModelSelector::new(config.clone());
    let sink = Arc::new(JsonlConversationStore::new(config.records_path()));
    let mut session = ScreeningSession::initialize(cli.persona, selector.select(cli.persona), sink)
        .with_turn_timeout(Duration::from_secs(config.request_timeout_secs));

    println!("{}: {}", session.persona(), session.greeting());
    println!();
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            prompt()?;
            continue;
        }

        if !cli.no_sentiment {
            println!("  [{}]", analyze_sentiment(&line).annotation());
        }

        match session.submit(&line).await {
            Ok(turn) => {
                if let TurnOutcome::Fallback(kind) = turn.outcome {
                    log::warn!("turn fell back: {:?}", kind);
                }
                println!("{}: {}", session.persona(), turn.reply);
                println!();
                if turn.ended() {
                    return Ok(());
                }
            }
            Err(err) => eprintln!("{}", err),
        }
        prompt()?;
    }

    println!();
    log::info!(
        "Input closed; session {} abandoned after {} messages",
        session.id(),
        session.history().len()
    );
    Ok(())
}
