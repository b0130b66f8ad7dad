// Copyright (c) 2025 - Cowboy AI, Inc.
//! SQLite-backed Store Gateway

use std::time::Duration;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, ErrorCode};
use tracing::{debug, error, info, trace, warn};

use super::schema::{OBJECT_TYPE_CHAPTER, SCHEMA};
use super::{Row, StoreGateway, Value};
use crate::config::StoreConfig;
use crate::errors::{InventoryError, InventoryResult};

/// Store gateway over a single SQLite connection
pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    /// Open (or create) the database named by the configuration
    pub fn open(config: &StoreConfig) -> InventoryResult<Self> {
        info!("Opening inventory database at {}", config.database_path.display());

        let conn = Connection::open(&config.database_path)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

        Ok(Self { conn })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> InventoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create every inventory table, index and trigger if missing
    pub fn initialize_schema(&self) -> InventoryResult<()> {
        debug!("Initializing inventory schema");
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Ensure the ObjectType chapter exists and holds the given `(dict_key, label)` entries
    pub fn seed_object_types(&self, entries: &[(i64, &str)]) -> InventoryResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO Chapter (id, sticky, name) VALUES (1, 'yes', ?1)",
            [OBJECT_TYPE_CHAPTER],
        )?;

        for (key, label) in entries {
            self.conn.execute(
                "INSERT OR IGNORE INTO Dictionary (dict_key, chapter_id, dict_value) \
                 SELECT ?1, id, ?2 FROM Chapter WHERE name = ?3",
                rusqlite::params![key, label, OBJECT_TYPE_CHAPTER],
            )?;
        }

        debug!("Seeded {} object types", entries.len());
        Ok(())
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
    }
}

fn from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Integer(i),
        // No REAL columns are read by the core; keep the text rendering if one shows up.
        SqlValue::Real(f) => Value::Text(f.to_string()),
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Blob(b) => Value::Blob(b),
    }
}

fn map_error(err: rusqlite::Error) -> InventoryError {
    match err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            InventoryError::ConstraintViolation(message.unwrap_or_else(|| failure.to_string()))
        }
        other => InventoryError::Database(other),
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> InventoryResult<Row> {
    let count = row.as_ref().column_count();
    let mut columns = Vec::with_capacity(count);
    for index in 0..count {
        let value: SqlValue = row.get(index)?;
        columns.push(from_sql(value));
    }
    Ok(Row::new(columns))
}

fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .map(|head| head.eq_ignore_ascii_case("insert"))
        .unwrap_or(false)
}

/// Map a driver error and report it with the statement that raised it
fn failed(sql: &str) -> impl Fn(rusqlite::Error) -> InventoryError + '_ {
    move |e| {
        let err = map_error(e);
        error!("Statement failed: {} ({})", err, sql);
        err
    }
}

impl StoreGateway for SqliteGateway {
    fn query_one(&self, sql: &str, params: &[Value]) -> InventoryResult<Option<Row>> {
        trace!(sql, "query_one");

        let mut stmt = self.conn.prepare_cached(sql).map_err(failed(sql))?;
        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_sql)))
            .map_err(failed(sql))?;

        match rows.next().map_err(failed(sql))? {
            Some(row) => Ok(Some(read_row(row)?)),
            None => Ok(None),
        }
    }

    fn query_all(&self, sql: &str, params: &[Value]) -> InventoryResult<Vec<Row>> {
        trace!(sql, "query_all");

        let mut stmt = self.conn.prepare_cached(sql).map_err(failed(sql))?;
        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_sql)))
            .map_err(failed(sql))?;

        let mut result = Vec::new();
        while let Some(row) = rows.next().map_err(failed(sql))? {
            result.push(read_row(row)?);
        }
        Ok(result)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> InventoryResult<Option<i64>> {
        trace!(sql, "execute");

        let mut stmt = self.conn.prepare_cached(sql).map_err(failed(sql))?;
        let changed = stmt
            .execute(params_from_iter(params.iter().map(to_sql)))
            .map_err(failed(sql))?;

        if is_insert(sql) && changed > 0 {
            Ok(Some(self.conn.last_insert_rowid()))
        } else {
            Ok(None)
        }
    }

    fn atomic(&self, work: &mut dyn FnMut() -> InventoryResult<()>) -> InventoryResult<()> {
        // Already inside a transaction: the outermost unit commits or rolls back.
        if !self.conn.is_autocommit() {
            return work();
        }

        let tx = self.conn.unchecked_transaction().map_err(map_error)?;
        match work() {
            Ok(()) => {
                tx.commit().map_err(map_error)?;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Rolling back");
                tx.rollback().map_err(map_error)?;
                Err(e)
            }
        }
    }
}
