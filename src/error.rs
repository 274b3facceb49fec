use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while walking a repository and normalizing commits.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The object store could not be opened. Fatal; raised before any record
    /// is produced.
    #[error("cannot open repository at '{}': {source}", path.display())]
    RepositoryUnavailable {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    /// A commit's own tree or one of its parent trees could not be loaded.
    /// Policy is strict: the run aborts on the offending commit.
    #[error("cannot resolve tree for commit {commit}: {source}")]
    TreeResolution {
        commit: String,
        #[source]
        source: git2::Error,
    },

    /// The history traversal itself failed mid-walk.
    #[error("history traversal failed: {0}")]
    Traversal(#[from] git2::Error),
}

/// Errors raised while reading a record stream and writing it to a database.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A line of the record stream did not parse into the expected shape.
    /// The record fails rather than being loaded with missing fields.
    #[error("malformed record on line {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read record stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
