//! Durable URL store: an append-only JSON-lines journal.
//!
//! Every mutation is a single appended line `{hash, url, done}`; replay
//! applies records in order with last-wins per hash, so flipping a URL to
//! done is just another append. The file is opened per access and all
//! writes happen under the frontier lock.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error talking to the journal file.
#[derive(Debug)]
pub struct StoreError {
    pub message: String,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

/// One journal line.
#[derive(Debug, Serialize, Deserialize)]
struct StoreRecord {
    hash: u64,
    url: String,
    done: bool,
}

/// In-memory view of a URL's latest record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub url: String,
    pub done: bool,
}

pub struct UrlStore {
    path: PathBuf,
}

impl UrlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the journal if it exists (restart semantics).
    pub fn wipe(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Replay the journal into a hash → latest-record map. A missing file
    /// is an empty store; a truncated final line (crash mid-append) is
    /// skipped with a warning.
    pub fn load(&self) -> Result<HashMap<u64, UrlRecord>, StoreError> {
        let mut records = HashMap::new();
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(records),
            Err(e) => return Err(e.into()),
        };

        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StoreRecord>(line) {
                Ok(record) => {
                    records.insert(
                        record.hash,
                        UrlRecord {
                            url: record.url,
                            done: record.done,
                        },
                    );
                }
                Err(e) => {
                    log::warn!(
                        "skipping malformed journal line in {}: {e}",
                        self.path.display()
                    );
                }
            }
        }
        Ok(records)
    }

    /// Append one record. Opens the file for this write only.
    pub fn append(&self, hash: u64, url: &str, done: bool) -> Result<(), StoreError> {
        let record = StoreRecord {
            hash,
            url: url.to_string(),
            done,
        };
        let line = serde_json::to_string(&record).map_err(|e| StoreError {
            message: e.to_string(),
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_store(tag: &str) -> UrlStore {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "anteater-store-{tag}-{}-{n}.jsonl",
            std::process::id()
        ));
        let store = UrlStore::new(path);
        store.wipe().unwrap();
        store
    }

    #[test]
    fn missing_file_is_empty_store() {
        let store = temp_store("missing");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn last_record_wins_on_replay() {
        let store = temp_store("replay");
        store.append(1, "http://ics.uci.edu/a", false).unwrap();
        store.append(2, "http://ics.uci.edu/b", false).unwrap();
        store.append(1, "http://ics.uci.edu/a", true).unwrap();

        let records = store.load().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[&1].done);
        assert!(!records[&2].done);

        store.wipe().unwrap();
    }

    #[test]
    fn truncated_trailing_line_is_skipped() {
        let store = temp_store("truncated");
        store.append(1, "http://ics.uci.edu/a", false).unwrap();
        // Simulate a crash mid-append.
        let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
        write!(file, "{{\"hash\":2,\"url\":\"http:").unwrap();
        drop(file);

        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.contains_key(&1));

        store.wipe().unwrap();
    }

    #[test]
    fn wipe_removes_everything() {
        let store = temp_store("wipe");
        store.append(1, "http://ics.uci.edu/a", false).unwrap();
        store.wipe().unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
