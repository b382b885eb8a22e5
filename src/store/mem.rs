//! In-memory store — a mutex-guarded map, discarded on drop.
//!
//! Used by tests and by ephemeral runs that don't want a data directory.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::AppError;

use super::StateStore;

#[derive(Debug, Default)]
pub struct MemStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemStore {
    fn store_type(&self) -> &str {
        "mem"
    }

    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let records = self
            .records
            .lock()
            .map_err(|e| AppError::Store(format!("mem store poisoned: {e}")))?;
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| AppError::Store(format!("mem store poisoned: {e}")))?;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
