// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory capability facade
//!
//! [`Inventory`] owns a [`StoreGateway`] and exposes every operation of the data-access
//! layer. The operations live in their own modules as `impl` blocks on this type:
//!
//! - [`crate::resolver`] - names ⇄ ids
//! - [`crate::objects`] - object lifecycle and read-side accessors
//! - [`crate::attributes`] - typed attribute upsert
//! - [`crate::topology`] - ports, port links, parent/child entity links
//! - [`crate::addresses`] - IPv4/IPv6 allocation and reconciliation
//! - [`crate::virtuals`] - hypervisor membership reconciliation
//! - [`crate::audit`] - object log
//!
//! No state is cached between calls: every read goes back to the store.

use crate::config::StoreConfig;
use crate::errors::{InventoryError, InventoryResult};
use crate::store::{StoreGateway, Value};

/// Data-access facade over an inventory store
pub struct Inventory<G: StoreGateway> {
    store: G,
    author: String,
    page_size: u32,
}

impl<G: StoreGateway> Inventory<G> {
    /// Create a facade using the author and page size from `config`
    pub fn new(store: G, config: &StoreConfig) -> Self {
        Self {
            store,
            author: config.author.clone(),
            page_size: config.page_size,
        }
    }

    /// Create a facade with default settings
    pub fn with_defaults(store: G) -> Self {
        Self::new(store, &StoreConfig::default())
    }

    /// The underlying gateway
    pub fn store(&self) -> &G {
        &self.store
    }

    /// Author recorded on log entries
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Rows fetched per round trip by lazy cursors
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Give the gateway back
    pub fn into_store(self) -> G {
        self.store
    }

    /// Run an INSERT and return the new row id
    pub(crate) fn insert(&self, sql: &str, params: &[Value]) -> InventoryResult<i64> {
        self.store
            .execute(sql, params)?
            .ok_or(InventoryError::MissingRowId)
    }

    /// Run `work` as one atomic unit of the store and pass its result through
    pub(crate) fn atomically<T>(
        &self,
        work: impl FnOnce() -> InventoryResult<T>,
    ) -> InventoryResult<T> {
        let mut work = Some(work);
        let mut result = None;
        self.store.atomic(&mut || {
            if let Some(work) = work.take() {
                result = Some(work()?);
            }
            Ok(())
        })?;
        result.ok_or(InventoryError::IncompleteTransaction)
    }

    /// Single integer column of the first row, if any
    pub(crate) fn query_id(&self, sql: &str, params: &[Value]) -> InventoryResult<Option<i64>> {
        match self.store.query_one(sql, params)? {
            Some(row) => row.get_opt_i64(0),
            None => Ok(None),
        }
    }

    /// Single integer column of every row
    pub(crate) fn query_ids(&self, sql: &str, params: &[Value]) -> InventoryResult<Vec<i64>> {
        self.store
            .query_all(sql, params)?
            .iter()
            .map(|row| row.get_i64(0))
            .collect()
    }
}
