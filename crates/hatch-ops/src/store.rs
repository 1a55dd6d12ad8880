//! Persistence backends for the operation log.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LogError, io_err};
use crate::log::LogEntry;

/// Storage for log entries, newest first.
///
/// Implementations only store; merge rules live in
/// [`OperationLog`](crate::OperationLog).
pub trait OperationLogStore: Send {
    /// Look up an entry by id.
    fn get(&self, id: &str) -> Result<Option<LogEntry>, LogError>;

    /// Replace the entry with the same id in place, or insert it as newest.
    fn upsert(&mut self, entry: LogEntry) -> Result<(), LogError>;

    /// All entries, newest first.
    fn list(&self) -> Result<Vec<LogEntry>, LogError>;

    /// Remove every entry.
    fn clear(&mut self) -> Result<(), LogError>;
}

fn upsert_into(entries: &mut Vec<LogEntry>, entry: LogEntry) {
    match entries.iter_mut().find(|e| e.id == entry.id) {
        Some(existing) => *existing = entry,
        None => entries.insert(0, entry),
    }
}

/// Volatile store, for tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    entries: Vec<LogEntry>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OperationLogStore for MemoryLogStore {
    fn get(&self, id: &str) -> Result<Option<LogEntry>, LogError> {
        Ok(self.entries.iter().find(|e| e.id == id).cloned())
    }

    fn upsert(&mut self, entry: LogEntry) -> Result<(), LogError> {
        upsert_into(&mut self.entries, entry);
        Ok(())
    }

    fn list(&self) -> Result<Vec<LogEntry>, LogError> {
        Ok(self.entries.clone())
    }

    fn clear(&mut self) -> Result<(), LogError> {
        self.entries.clear();
        Ok(())
    }
}

/// On-disk document: a single `ingestLogs` key holding every entry.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogDocument {
    #[serde(default)]
    ingest_logs: Vec<LogEntry>,
}

/// JSON file store.
///
/// The whole document is cached in memory and rewritten on every change
/// via `<path>.tmp` + rename. The cache only changes once the write has
/// succeeded.
#[derive(Debug)]
pub struct JsonLogStore {
    path: PathBuf,
    entries: Vec<LogEntry>,
}

impl JsonLogStore {
    /// Open the store at `path`; a missing file is an empty log.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogError> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            if contents.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str::<LogDocument>(&contents)?.ingest_logs
            }
        } else {
            Vec::new()
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "opened operation log");
        Ok(Self { path, entries })
    }

    fn save(&self, entries: &[LogEntry]) -> Result<(), LogError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }

        let document = LogDocument {
            ingest_logs: entries.to_vec(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }
}

impl OperationLogStore for JsonLogStore {
    fn get(&self, id: &str) -> Result<Option<LogEntry>, LogError> {
        Ok(self.entries.iter().find(|e| e.id == id).cloned())
    }

    fn upsert(&mut self, entry: LogEntry) -> Result<(), LogError> {
        let mut entries = self.entries.clone();
        upsert_into(&mut entries, entry);
        self.save(&entries)?;
        self.entries = entries;
        Ok(())
    }

    fn list(&self) -> Result<Vec<LogEntry>, LogError> {
        Ok(self.entries.clone())
    }

    fn clear(&mut self) -> Result<(), LogError> {
        self.save(&[])?;
        self.entries.clear();
        Ok(())
    }
}
