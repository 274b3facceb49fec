use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a Git log to lines of JSON
    Extract {
        /// Path to the Git repository
        #[arg(short, long)]
        repo: PathBuf,

        /// File to write the JSON lines to; use '-' for stdout
        #[arg(default_value = "-")]
        file: String,
    },

    /// Write a JSON Git log to a database
    Load {
        /// Database connection URL, e.g. sqlite://commits.db
        #[arg(short = 'c', long, env = "DATABASE_URL")]
        connection_string: String,

        /// File to read the JSON lines from; use '-' for stdin
        #[arg(default_value = "-")]
        file: String,
    },
}
