//! Durable preference store on redb
//!
//! One table of string keys to string values. Values are small (a volume
//! level, a bearer token and its expiry) so every write is its own
//! transaction.

use crate::error::{Result, StorageError};
use forza_core::PreferenceStore;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use std::path::Path;

const PREFERENCES: TableDefinition<&str, &str> = TableDefinition::new("preferences");

/// redb-backed preference store
pub struct RedbPreferences {
    db: Database,
}

impl RedbPreferences {
    /// Open or create the database at `path`, creating parent directories
    ///
    /// # Errors
    /// Returns an error if the directory or database cannot be created
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path).map_err(StorageError::database)?;
        tracing::debug!(path = %path.display(), "Opened preference store");
        Ok(Self { db })
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read().map_err(StorageError::database)?;
        let table = match txn.open_table(PREFERENCES) {
            Ok(table) => table,
            // Nothing has been written yet
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(StorageError::database(e)),
        };

        let value = table.get(key).map_err(StorageError::database)?;
        Ok(value.map(|v| v.value().to_string()))
    }

    fn write(&self, key: &str, value: Option<&str>) -> Result<()> {
        let txn = self.db.begin_write().map_err(StorageError::database)?;
        {
            let mut table = txn.open_table(PREFERENCES).map_err(StorageError::database)?;
            match value {
                Some(value) => {
                    table.insert(key, value).map_err(StorageError::database)?;
                }
                None => {
                    table.remove(key).map_err(StorageError::database)?;
                }
            }
        }
        txn.commit().map_err(StorageError::database)?;
        Ok(())
    }

    /// All stored keys, sorted
    ///
    /// # Errors
    /// Returns an error if the database cannot be read
    pub fn keys(&self) -> Result<Vec<String>> {
        let txn = self.db.begin_read().map_err(StorageError::database)?;
        let table = match txn.open_table(PREFERENCES) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::database(e)),
        };

        let mut keys = Vec::new();
        for entry in table.iter().map_err(StorageError::database)? {
            let (key, _) = entry.map_err(StorageError::database)?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }
}

impl PreferenceStore for RedbPreferences {
    fn get(&self, key: &str) -> forza_core::Result<Option<String>> {
        Ok(self.read(key)?)
    }

    fn set(&self, key: &str, value: &str) -> forza_core::Result<()> {
        tracing::trace!(key, "Writing preference");
        Ok(self.write(key, Some(value))?)
    }

    fn remove(&self, key: &str) -> forza_core::Result<()> {
        Ok(self.write(key, None)?)
    }
}
