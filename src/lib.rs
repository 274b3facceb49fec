//! Extract a git repository's commit history into a line-delimited JSON
//! record stream, and load such streams into a relational store.
//!
//! The core is [`git::Extractor`]: a lazy topological walk over the commit
//! graph that normalizes each commit into a [`models::CommitRecord`], with
//! merge commits collapsed into a single change set by folding one diff per
//! parent through the engine's merge primitive.

pub mod cli;
pub mod db;
pub mod error;
pub mod git;
pub mod models;
pub mod stream;

pub use db::CommitStore;
pub use error::{ExtractError, LoadError};
pub use git::Extractor;
pub use models::{CommitRecord, PatchEntry};
