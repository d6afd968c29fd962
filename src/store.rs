use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::ProgressMap;
use crate::scheduler::MAX_BOX;

const PROGRESS_KEY: &str = "progress";

/// Whole-map persistence of progress records.
///
/// Callers read the full map, change their copy and write it back. `get`
/// never fails: a missing or unreadable map is an empty one. Writers are not
/// serialised against each other, so one store must have a single writer.
pub trait ProgressStore {
    fn get(&self) -> ProgressMap;
    fn set(&mut self, records: &ProgressMap) -> Result<()>;
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: ProgressMap,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl ProgressStore for MemoryStore {
    fn get(&self) -> ProgressMap {
        self.records.clone()
    }

    fn set(&mut self, records: &ProgressMap) -> Result<()> {
        self.records = records.clone();
        Ok(())
    }
}

/// SQLite-backed key-value store. The progress map lives as one JSON
/// document under the `progress` key.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn read_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

impl ProgressStore for SqliteStore {
    fn get(&self) -> ProgressMap {
        let raw = match self.read_value(PROGRESS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ProgressMap::new(),
            Err(e) => {
                log::warn!("Failed to read progress, starting empty: {}", e);
                return ProgressMap::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Stored progress is unparsable, starting empty: {}", e);
                ProgressMap::new()
            }
        }
    }

    fn set(&mut self, records: &ProgressMap) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.write_value(PROGRESS_KEY, &json)
    }
}

// Export/import envelope. Never carries anything but progress.
#[derive(Debug, Serialize, Deserialize)]
struct ExportData {
    progress: ProgressMap,
}

pub fn export_progress<S: ProgressStore + ?Sized>(store: &S) -> Result<String> {
    let data = ExportData {
        progress: store.get(),
    };
    Ok(serde_json::to_string_pretty(&data)?)
}

/// Replaces the whole progress map from an export document. On any error the
/// store is left untouched.
pub fn import_progress<S: ProgressStore + ?Sized>(store: &mut S, json: &str) -> Result<usize> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| Error::InvalidImport(e.to_string()))?;

    let progress = match value.get("progress") {
        Some(p) if p.is_object() => p.clone(),
        _ => {
            return Err(Error::InvalidImport(
                "missing \"progress\" object".to_string(),
            ))
        }
    };

    let records: ProgressMap =
        serde_json::from_value(progress).map_err(|e| Error::InvalidImport(e.to_string()))?;
    validate_records(&records)?;

    store.set(&records)?;
    log::info!("Imported {} progress records", records.len());
    Ok(records.len())
}

fn validate_records(records: &ProgressMap) -> Result<()> {
    for (key, record) in records {
        if record.item_id != *key {
            return Err(Error::InvalidImport(format!(
                "record under key {} has itemId {}",
                key, record.item_id
            )));
        }
        if record.box_level > MAX_BOX {
            return Err(Error::InvalidImport(format!(
                "item {} has box {} (max {})",
                key, record.box_level, MAX_BOX
            )));
        }
    }
    Ok(())
}
