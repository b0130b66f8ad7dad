// Copyright (c) 2025 - Cowboy AI, Inc.
//! Store Gateway
//!
//! The inventory core talks to the relational backend exclusively through
//! [`StoreGateway`]: one-row queries, multi-row queries, auto-committing statements and
//! atomic units that group several statements.
//! Values cross the boundary as [`Value`] so the core never depends on a driver type.
//!
//! ```text
//! Inventory ──query_one / query_all / execute──▶ StoreGateway ──▶ SqliteGateway ──▶ SQLite
//! ```

pub mod cursor;
pub mod schema;
pub mod sqlite;

pub use cursor::KeysetCursor;
pub use sqlite::SqliteGateway;

use std::fmt;

use crate::errors::{InventoryError, InventoryResult};

/// A single column value exchanged with the store
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Check if this value is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "'{}'", s),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Build a `&[Value]` parameter list from heterogeneous arguments
#[macro_export]
macro_rules! sql_params {
    () => {
        &[] as &[$crate::store::Value]
    };
    ($($value:expr),+ $(,)?) => {
        &[$($crate::store::Value::from($value)),+]
    };
}

/// A positional result row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<Value>,
}

impl Row {
    /// Create a row from its column values
    pub fn new(columns: Vec<Value>) -> Self {
        Self { columns }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the row has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Raw column access
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.columns.get(index)
    }

    fn column(&self, index: usize) -> InventoryResult<&Value> {
        self.columns.get(index).ok_or_else(|| {
            InventoryError::RowDecode(format!(
                "column {} out of range (row has {})",
                index,
                self.columns.len()
            ))
        })
    }

    /// Non-null integer column
    pub fn get_i64(&self, index: usize) -> InventoryResult<i64> {
        match self.column(index)? {
            Value::Integer(i) => Ok(*i),
            other => Err(mismatch(index, "integer", other)),
        }
    }

    /// Nullable integer column
    pub fn get_opt_i64(&self, index: usize) -> InventoryResult<Option<i64>> {
        match self.column(index)? {
            Value::Null => Ok(None),
            Value::Integer(i) => Ok(Some(*i)),
            other => Err(mismatch(index, "integer or null", other)),
        }
    }

    /// Non-null text column
    pub fn get_string(&self, index: usize) -> InventoryResult<String> {
        match self.column(index)? {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch(index, "text", other)),
        }
    }

    /// Nullable text column
    pub fn get_opt_string(&self, index: usize) -> InventoryResult<Option<String>> {
        match self.column(index)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.clone())),
            other => Err(mismatch(index, "text or null", other)),
        }
    }

    /// Non-null blob column
    pub fn get_blob(&self, index: usize) -> InventoryResult<Vec<u8>> {
        match self.column(index)? {
            Value::Blob(b) => Ok(b.clone()),
            other => Err(mismatch(index, "blob", other)),
        }
    }
}

fn mismatch(index: usize, expected: &str, found: &Value) -> InventoryError {
    InventoryError::RowDecode(format!(
        "column {}: expected {}, found {}",
        index, expected, found
    ))
}

/// Synchronous query/execute interface against the relational backend
///
/// Every call is one blocking round trip. `execute` auto-commits and returns the id of
/// the inserted row for `INSERT` statements.
pub trait StoreGateway {
    /// Run a query and return its first row, if any
    fn query_one(&self, sql: &str, params: &[Value]) -> InventoryResult<Option<Row>>;

    /// Run a query and return every row
    fn query_all(&self, sql: &str, params: &[Value]) -> InventoryResult<Vec<Row>>;

    /// Run a mutating statement
    fn execute(&self, sql: &str, params: &[Value]) -> InventoryResult<Option<i64>>;

    /// Run `work` so that all of its statements commit together or not at all
    ///
    /// Called while another `atomic` is running, `work` joins the outer unit: an error
    /// propagated out of it rolls back everything.
    fn atomic(&self, work: &mut dyn FnMut() -> InventoryResult<()>) -> InventoryResult<()>;
}

impl<G: StoreGateway + ?Sized> StoreGateway for &G {
    fn query_one(&self, sql: &str, params: &[Value]) -> InventoryResult<Option<Row>> {
        (**self).query_one(sql, params)
    }

    fn query_all(&self, sql: &str, params: &[Value]) -> InventoryResult<Vec<Row>> {
        (**self).query_all(sql, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> InventoryResult<Option<i64>> {
        (**self).execute(sql, params)
    }

    fn atomic(&self, work: &mut dyn FnMut() -> InventoryResult<()>) -> InventoryResult<()> {
        (**self).atomic(work)
    }
}

impl<G: StoreGateway + ?Sized> StoreGateway for Box<G> {
    fn query_one(&self, sql: &str, params: &[Value]) -> InventoryResult<Option<Row>> {
        (**self).query_one(sql, params)
    }

    fn query_all(&self, sql: &str, params: &[Value]) -> InventoryResult<Vec<Row>> {
        (**self).query_all(sql, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> InventoryResult<Option<i64>> {
        (**self).execute(sql, params)
    }

    fn atomic(&self, work: &mut dyn FnMut() -> InventoryResult<()>) -> InventoryResult<()> {
        (**self).atomic(work)
    }
}
