//! Transcript persistence.
//!
//! Every concluded screening is written once, as a single line of JSON, to
//! an append-only log shared by all sessions:
//!
//! ```text
//! {"session_id":"1438960512386539405","conversation_log":[{"role":"assistant","content":"..."},...]}
//! ```
//!
//! The session id is passed through a non-cryptographic hash before it is
//! stored. That only keeps raw ids out of the file; it is not anonymization
//! in any security sense.

use std::fs::{self, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::llms::base_llm::LLMMessage;
use crate::utilities::errors::PersistenceError;

/// Default file name of the transcript log.
pub const DEFAULT_RECORDS_FILE: &str = "simulated_database.jsonl";

/// One persisted screening transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    /// Hashed session id.
    pub session_id: String,
    /// Full history in order, greeting and closing line included.
    pub conversation_log: Vec<LLMMessage>,
}

impl PersistedRecord {
    pub fn new(session_id: &str, history: &[LLMMessage]) -> Self {
        Self {
            session_id: hash_session_id(session_id),
            conversation_log: history.to_vec(),
        }
    }
}

/// Obscure a session id with a non-cryptographic hash.
///
/// Deterministic within a build, so records of the same session id share a
/// key.
pub fn hash_session_id(session_id: &str) -> String {
    let mut h = std::collections::hash_map::DefaultHasher::new();
    session_id.hash(&mut h);
    h.finish().to_string()
}

/// Sink that receives the history of every ended session.
///
/// `append` may block. Sessions call it from tokio's blocking pool, never
/// directly on an async worker.
pub trait ConversationSink: Send + Sync + std::fmt::Debug {
    /// Append one record. Never deduplicates.
    fn append(&self, session_id: &str, history: &[LLMMessage]) -> Result<(), PersistenceError>;
}

/// Newline-delimited JSON file store.
///
/// Appends are serialized through a process-wide lock on the store, so lines
/// from concurrent sessions never interleave. Share one store (behind an
/// `Arc`) between all sessions writing the same file.
#[derive(Debug)]
pub struct JsonlConversationStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlConversationStore {
    /// Create a store writing to `path`. Nothing is touched until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store for `file_name` inside `directory`.
    pub fn in_directory(directory: impl AsRef<Path>, file_name: &str) -> Self {
        Self::new(directory.as_ref().join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back, in file order.
    ///
    /// Returns an empty list if nothing was written yet.
    pub fn load_all(&self) -> Result<Vec<PersistedRecord>, PersistenceError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(&self.path)?;
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }
}

impl ConversationSink for JsonlConversationStore {
    fn append(&self, session_id: &str, history: &[LLMMessage]) -> Result<(), PersistenceError> {
        let record = PersistedRecord::new(session_id, history);
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        log::info!(
            "Appended transcript {} ({} messages) to {}",
            record.session_id,
            record.conversation_log.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Sink that keeps records in memory.
///
/// Useful for embedding the session without a file system and in tests.
#[derive(Debug, Default)]
pub struct InMemoryConversationSink {
    records: Mutex<Vec<PersistedRecord>>,
}

impl InMemoryConversationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<PersistedRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl ConversationSink for InMemoryConversationSink {
    fn append(&self, session_id: &str, history: &[LLMMessage]) -> Result<(), PersistenceError> {
        self.records
            .lock()
            .push(PersistedRecord::new(session_id, history));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sample_history() -> Vec<LLMMessage> {
        vec![
            LLMMessage::assistant("Please provide your Full Name."),
            LLMMessage::user("Alice Smith"),
            LLMMessage::assistant("Thank you. Your email address?"),
        ]
    }

    #[test]
    fn test_hash_is_stable_and_hides_id() {
        let a = hash_session_id("default_user");
        assert_eq!(a, hash_session_id("default_user"));
        assert_ne!(a, hash_session_id("other_user"));
        assert!(!a.contains("default_user"));
        assert!(a.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_append_creates_directory_and_writes_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlConversationStore::in_directory(dir.path().join("data"), DEFAULT_RECORDS_FILE);

        store.append("session-1", &sample_history()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.lines().count(), 1);
        assert!(raw.ends_with('\n'));

        let json: serde_json::Value = serde_json::from_str(raw.trim_end()).unwrap();
        assert_eq!(json["session_id"], hash_session_id("session-1"));
        assert_eq!(json["conversation_log"][1]["role"], "user");
        assert_eq!(json["conversation_log"][1]["content"], "Alice Smith");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_append_twice_keeps_both_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlConversationStore::in_directory(dir.path(), DEFAULT_RECORDS_FILE);

        store.append("session-1", &sample_history()).unwrap();
        store.append("session-1", &sample_history()).unwrap();

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
    }

    #[test]
    fn test_load_all_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlConversationStore::in_directory(dir.path(), "missing.jsonl");
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonlConversationStore::in_directory(
            dir.path(),
            DEFAULT_RECORDS_FILE,
        ));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let history = vec![LLMMessage::user("x".repeat(4096 + i))];
                    for _ in 0..5 {
                        store.append(&format!("session-{i}"), &history).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 40);
    }

    #[test]
    fn test_in_memory_sink() {
        let sink = InMemoryConversationSink::new();
        assert!(sink.is_empty());
        sink.append("s", &sample_history()).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.records()[0].conversation_log.len(), 3);
    }
}
