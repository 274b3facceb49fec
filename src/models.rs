use serde::{Deserialize, Serialize};

/// One normalized commit. Field order is the wire order of the JSON-lines
/// record stream; serde emits fields in declaration order, which keeps two
/// runs over the same repository byte-identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: String,
    /// Object category as reported by the object store. Always "commit" in a
    /// history walk; anything else signals a corrupt traversal.
    pub kind: String,
    pub author_name: String,
    pub author_email: String,
    /// Unix epoch seconds.
    pub author_time: i64,
    /// Minutes east of UTC.
    pub author_time_offset: i32,
    pub committer_name: String,
    pub committer_email: String,
    pub committer_time: i64,
    pub committer_time_offset: i32,
    pub message: String,
    /// Encoding label from the commit header; absent means UTF-8.
    pub message_encoding: Option<String>,
    pub patches: Vec<PatchEntry>,
    /// Ordered: index 0 is the first parent.
    pub parent_ids: Vec<String>,
    pub commit_time: i64,
    pub commit_time_offset: i32,
}

/// One changed file in a commit's merged diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchEntry {
    pub old_file_path: Option<String>,
    pub new_file_path: Option<String>,
    /// Blob hashes; the zero id means the file did not exist on that side.
    pub old_id: String,
    pub new_id: String,
    /// Single-character status tag as assigned by the diff engine
    /// ('A', 'D', 'M', 'R', 'C', 'T', ...). Opaque, not a closed set.
    pub status: String,
    /// 0-100, meaningful only for rename/copy entries.
    pub similarity: u32,
    pub additions: usize,
    pub deletions: usize,
}
