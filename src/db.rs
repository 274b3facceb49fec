use std::str::FromStr;
use std::time::Duration;

use chrono::{FixedOffset, TimeZone};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::LoadError;
use crate::models::CommitRecord;

/// Relational sink for the record stream: one `commits` row per record, one
/// `patches` row per entry in its merged diff.
pub struct CommitStore {
    pool: SqlitePool,
}

impl CommitStore {
    pub async fn connect(url: &str) -> Result<Self, LoadError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // A single connection is plenty for a one-shot batch load, and SQLite
        // serializes writers anyway.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(60))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database");
        Ok(Self { pool })
    }

    /// Create the two-table schema if it does not exist yet. Safe to call on
    /// an already-initialized database.
    pub async fn init_schema(&self) -> Result<(), LoadError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS commits (
                commit_id TEXT PRIMARY KEY,
                first_parent_id TEXT,
                second_parent_id TEXT,
                kind TEXT NOT NULL,
                author_name TEXT NOT NULL,
                author_email TEXT NOT NULL,
                author_datetime TEXT NOT NULL,
                committer_name TEXT NOT NULL,
                committer_email TEXT NOT NULL,
                committer_datetime TEXT NOT NULL,
                message TEXT NOT NULL,
                message_encoding TEXT,
                commit_datetime TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_commits_first_parent ON commits(first_parent_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_commits_second_parent ON commits(second_parent_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS patches (
                commit_id TEXT NOT NULL REFERENCES commits(commit_id),
                old_id TEXT NOT NULL,
                new_id TEXT NOT NULL,
                old_file_path TEXT NOT NULL,
                new_file_path TEXT NOT NULL,
                status TEXT,
                similarity INTEGER,
                additions INTEGER,
                deletions INTEGER,
                PRIMARY KEY (commit_id, old_id, new_id, old_file_path, new_file_path)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert one record: the commit row and its patch rows commit
    /// atomically. Parents beyond the second survive only in the record
    /// stream's `parent_ids`, a documented limitation of this schema.
    pub async fn insert_record(&self, record: &CommitRecord) -> Result<(), LoadError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO commits (
                commit_id, first_parent_id, second_parent_id, kind,
                author_name, author_email, author_datetime,
                committer_name, committer_email, committer_datetime,
                message, message_encoding, commit_datetime
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(record.parent_ids.first())
        .bind(record.parent_ids.get(1))
        .bind(&record.kind)
        .bind(&record.author_name)
        .bind(&record.author_email)
        .bind(timestamp_text(record.author_time, record.author_time_offset))
        .bind(&record.committer_name)
        .bind(&record.committer_email)
        .bind(timestamp_text(
            record.committer_time,
            record.committer_time_offset,
        ))
        .bind(&record.message)
        .bind(&record.message_encoding)
        .bind(timestamp_text(record.commit_time, record.commit_time_offset))
        .execute(&mut *tx)
        .await?;

        for patch in &record.patches {
            sqlx::query(
                r#"
                INSERT INTO patches (
                    commit_id, old_id, new_id, old_file_path, new_file_path,
                    status, similarity, additions, deletions
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.id)
            .bind(&patch.old_id)
            .bind(&patch.new_id)
            .bind(patch.old_file_path.as_deref().unwrap_or(""))
            .bind(patch.new_file_path.as_deref().unwrap_or(""))
            .bind(&patch.status)
            .bind(i64::from(patch.similarity))
            .bind(patch.additions as i64)
            .bind(patch.deletions as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Close the pool, flushing any pending writes.
    pub async fn close(self) {
        self.pool.close().await;
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Render epoch seconds plus a UTC offset in minutes as RFC 3339 text, the
/// timezone-aware form the schema stores.
fn timestamp_text(epoch: i64, offset_minutes: i32) -> String {
    let offset = FixedOffset::east_opt(offset_minutes * 60)
        .or_else(|| FixedOffset::east_opt(0))
        .unwrap();
    match offset.timestamp_opt(epoch, 0).single() {
        Some(dt) => dt.to_rfc3339(),
        // A clock far enough outside the representable range keeps its raw
        // seconds instead of a rendered timestamp.
        None => epoch.to_string(),
    }
}
