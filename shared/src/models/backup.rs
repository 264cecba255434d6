//! Backup dump

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};

/// Table dumps, as returned by the backup endpoint and accepted by restore
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub tables: BTreeMap<String, Vec<Value>>,
}

impl Backup {
    /// Total row count across tables
    pub fn row_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Parse a backup file, rejecting anything that is not a table map
    pub fn from_slice(bytes: &[u8]) -> AppResult<Self> {
        let backup: Backup = serde_json::from_slice(bytes)
            .map_err(|e| AppError::validation(format!("Not a backup file: {e}")))?;
        if backup.tables.is_empty() {
            return Err(AppError::validation("Backup file contains no tables"));
        }
        Ok(backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice() {
        let backup =
            Backup::from_slice(br#"{"tables":{"products":[{"id":"p1"},{"id":"p2"}],"brands":[]}}"#)
                .unwrap();
        assert_eq!(backup.tables.len(), 2);
        assert_eq!(backup.row_count(), 2);
    }

    #[test]
    fn test_rejects_empty_or_garbage() {
        assert!(Backup::from_slice(br#"{"tables":{}}"#).is_err());
        assert!(Backup::from_slice(b"<html></html>").is_err());
    }
}
