// Copyright (c) 2025 - Cowboy AI, Inc.
//! Lazy keyset cursor
//!
//! Walks a table in ascending primary-key order, fetching one page per round trip.
//! The cursor is finite and single-pass: once drained (or after an error) it yields
//! nothing more.

use std::collections::VecDeque;

use tracing::trace;

use super::{Row, StoreGateway, Value};
use crate::errors::InventoryResult;

/// Lazy, page-at-a-time iterator over query results
///
/// `sql` must select the key as its first column and accept two parameters:
/// `?1` the last key already seen (exclusive) and `?2` the page size, e.g.
/// `SELECT id, name FROM Object WHERE id > ?1 ORDER BY id LIMIT ?2`.
pub struct KeysetCursor<'a, G: StoreGateway + ?Sized, T> {
    gateway: &'a G,
    sql: &'static str,
    page_size: u32,
    last_key: i64,
    buffer: VecDeque<Row>,
    exhausted: bool,
    decode: fn(&Row) -> InventoryResult<T>,
}

impl<'a, G: StoreGateway + ?Sized, T> KeysetCursor<'a, G, T> {
    /// Create a cursor; nothing is fetched until the first `next()`
    pub fn new(
        gateway: &'a G,
        sql: &'static str,
        page_size: u32,
        decode: fn(&Row) -> InventoryResult<T>,
    ) -> Self {
        Self {
            gateway,
            sql,
            page_size: page_size.max(1),
            last_key: i64::MIN,
            buffer: VecDeque::new(),
            exhausted: false,
            decode,
        }
    }

    fn fetch_page(&mut self) -> InventoryResult<()> {
        let params = [Value::Integer(self.last_key), Value::from(self.page_size)];
        let rows = self.gateway.query_all(self.sql, &params)?;
        trace!(rows = rows.len(), after = self.last_key, "Fetched cursor page");

        if rows.len() < self.page_size as usize {
            self.exhausted = true;
        }
        if let Some(last) = rows.last() {
            self.last_key = last.get_i64(0)?;
        }
        self.buffer.extend(rows);
        Ok(())
    }
}

impl<G: StoreGateway + ?Sized, T> Iterator for KeysetCursor<'_, G, T> {
    type Item = InventoryResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                self.buffer.clear();
                return Some(Err(e));
            }
        }

        let row = self.buffer.pop_front()?;
        Some((self.decode)(&row))
    }
}
