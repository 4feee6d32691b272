//! `mailrag` command-line interface.
//!
//! Credentials come from the environment (or a `.env` file):
//! `GRAPH_ACCESS_TOKEN` for the mail API, `EMBEDDINGS_API_KEY` for the
//! embedding endpoint, and `GENERATION_API_KEY` for answer generation.
//! Missing credentials are reported here, at the boundary, before any
//! network call is made.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use mailrag_embeddings::{EmbeddingProvider, OpenAiCompatProvider};
use mailrag_mail_client::MailClient;
use mailrag_rag::{AskOutcome, GenerationClient, RagConfig, RagEngine};

#[derive(Parser)]
#[command(name = "mailrag", about = "Ask questions about a day's email")]
struct Cli {
    /// Root directory for per-date index storage.
    #[arg(long, default_value = "vector_store")]
    store_root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a day's messages and print a short preview of each.
    Fetch {
        /// Calendar date to fetch, as YYYY-MM-DD.
        #[arg(long)]
        date: NaiveDate,
    },

    /// Fetch a day's messages, index them if needed, and answer a question.
    Ask {
        /// Calendar date to query, as YYYY-MM-DD.
        #[arg(long)]
        date: NaiveDate,

        /// The question to answer from that day's mail.
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Fetch { date } => fetch(date).await,
        Command::Ask { date, question } => ask(cli.store_root, date, &question).await,
    }
}

fn mail_client() -> anyhow::Result<MailClient> {
    let client = MailClient::new();
    if !client.is_available() {
        bail!("GRAPH_ACCESS_TOKEN is not set");
    }
    Ok(client)
}

async fn fetch(date: NaiveDate) -> anyhow::Result<()> {
    let client = mail_client()?;
    let messages = client
        .fetch_messages(date)
        .await
        .with_context(|| format!("failed to fetch mail for {date}"))?;

    if messages.is_empty() {
        println!("No mail on {date}.");
        return Ok(());
    }

    println!("Fetched {} messages for {date}:", messages.len());
    for (i, message) in messages.iter().enumerate() {
        let subject = message.subject.as_deref().unwrap_or("No Subject");
        let preview: String = message.body_preview.chars().take(100).collect();
        println!("{:>3}. {subject}", i + 1);
        if !preview.is_empty() {
            println!("     {preview}");
        }
    }
    Ok(())
}

async fn ask(store_root: PathBuf, date: NaiveDate, question: &str) -> anyhow::Result<()> {
    let client = mail_client()?;

    let embeddings = OpenAiCompatProvider::new();
    if !embeddings.is_available() {
        bail!("EMBEDDINGS_API_KEY is not set");
    }

    let generation = GenerationClient::new();
    if !generation.is_available() {
        bail!("GENERATION_API_KEY is not set");
    }

    let engine = RagEngine::new(RagConfig::new(store_root), Arc::new(embeddings), generation);

    // Only fetch when the day still needs indexing; a persisted index is
    // reused as-is.
    let records = if engine.store().exists(date).await {
        Vec::new()
    } else {
        client
            .fetch_messages(date)
            .await
            .with_context(|| format!("failed to fetch mail for {date}"))?
    };

    match engine.ask(date, &records, question).await? {
        AskOutcome::Answer(answer) => println!("{answer}"),
        AskOutcome::NoData => println!("No mail to index for {date}."),
    }
    Ok(())
}
