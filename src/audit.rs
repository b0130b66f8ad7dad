// Copyright (c) 2025 - Cowboy AI, Inc.
//! Object audit log
//!
//! Append-only, human-readable history attached to objects. Entries are never updated
//! or deleted.

use chrono::Utc;
use tracing::info;

use crate::domain::LogEntry;
use crate::errors::InventoryResult;
use crate::inventory::Inventory;
use crate::sql_params;
use crate::store::StoreGateway;

/// Timestamp layout of `ObjectLog.date`
pub const LOG_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl<G: StoreGateway> Inventory<G> {
    /// Attach a log message to an object
    pub fn insert_log(&self, object_id: i64, message: impl AsRef<str>) -> InventoryResult<()> {
        let message = message.as_ref();
        let date = Utc::now().format(LOG_DATE_FORMAT).to_string();

        self.store().execute(
            "INSERT INTO ObjectLog (object_id, user, date, content) VALUES (?1, ?2, ?3, ?4)",
            sql_params![object_id, self.author(), date, message],
        )?;

        info!(object_id, author = self.author(), "{}", message);
        Ok(())
    }

    /// Log entries of an object, oldest first
    pub fn object_log(&self, object_id: i64) -> InventoryResult<Vec<LogEntry>> {
        self.store()
            .query_all(
                "SELECT id, object_id, user, date, content FROM ObjectLog \
                 WHERE object_id = ?1 ORDER BY id",
                sql_params![object_id],
            )?
            .iter()
            .map(|row| {
                Ok(LogEntry {
                    id: row.get_i64(0)?,
                    object_id: row.get_i64(1)?,
                    author: row.get_string(2)?,
                    date: row.get_string(3)?,
                    message: row.get_string(4)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::StoreConfig;
    use crate::inventory::testing::memory_inventory;
    use crate::inventory::Inventory;
    use crate::store::schema::DEFAULT_OBJECT_TYPES;
    use crate::store::SqliteGateway;

    #[test]
    fn test_log_entries_are_ordered() {
        let inv = memory_inventory();
        inv.insert_log(7, "first").unwrap();
        inv.insert_log(7, "second").unwrap();
        inv.insert_log(8, "other object").unwrap();

        let log = inv.object_log(7).unwrap();
        let messages: Vec<&str> = log.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert!(log.iter().all(|e| e.author == "script"));
        assert_eq!(log[0].date.len(), 19);
    }

    #[test]
    fn test_log_uses_configured_author() {
        let gateway = SqliteGateway::open_in_memory().unwrap();
        gateway.initialize_schema().unwrap();
        gateway.seed_object_types(DEFAULT_OBJECT_TYPES).unwrap();
        let config = StoreConfig::default().with_author("vsphere-sync");
        let inv = Inventory::new(gateway, &config);

        inv.insert_log(1, "hello").unwrap();
        assert_eq!(inv.object_log(1).unwrap()[0].author, "vsphere-sync");
    }
}
