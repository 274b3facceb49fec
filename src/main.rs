use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_log_db::cli::{Cli, Command};
use git_log_db::stream::{read_records, write_records};
use git_log_db::{CommitStore, Extractor};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        // Logs go to stderr so a record stream on stdout stays clean.
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract { repo, file } => extract(&repo, &file),
        Command::Load {
            connection_string,
            file,
        } => load(&connection_string, &file).await,
    }
}

fn extract(repo: &Path, file: &str) -> Result<()> {
    let extractor = Extractor::open(repo)?;
    let history = extractor.walk()?;

    let written = if file == "-" {
        write_records(history, io::stdout().lock())?
    } else {
        let out = File::create(file).with_context(|| format!("failed to create '{file}'"))?;
        write_records(history, out)?
    };

    tracing::info!("Wrote {} records", written);
    Ok(())
}

async fn load(connection_string: &str, file: &str) -> Result<()> {
    let store = CommitStore::connect(connection_string)
        .await
        .context("failed to connect to database")?;
    store.init_schema().await?;

    let input: Box<dyn BufRead> = if file == "-" {
        Box::new(io::stdin().lock())
    } else {
        let f = File::open(file).with_context(|| format!("failed to open '{file}'"))?;
        Box::new(BufReader::new(f))
    };

    let mut loaded = 0usize;
    for record in read_records(input) {
        let record = record?;
        store.insert_record(&record).await?;
        loaded += 1;
        if loaded % 500 == 0 {
            tracing::debug!("Loaded {} commits so far", loaded);
        }
    }
    store.close().await;

    tracing::info!("Loaded {} commits", loaded);
    Ok(())
}
