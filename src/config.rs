// Copyright (c) 2025 - Cowboy AI, Inc.
//! Store configuration
//!
//! Configuration is an explicit value handed to the gateway constructor. Nothing is read
//! from global state at import time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{InventoryError, InventoryResult};

/// Configuration for the inventory store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite database file
    pub database_path: PathBuf,

    /// Author recorded on every object log entry
    #[serde(default = "default_author")]
    pub author: String,

    /// Rows fetched per round trip by lazy cursors
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// How long a statement waits on a locked database
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_author() -> String {
    "script".to_string()
}

fn default_page_size() -> u32 {
    256
}

fn default_busy_timeout() -> u64 {
    5000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("inventory.db"),
            author: default_author(),
            page_size: default_page_size(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

impl StoreConfig {
    /// Create a configuration for the given database file
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Self::default()
        }
    }

    /// Set the log author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the cursor page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Load configuration from environment variables
    ///
    /// - `INVENTORY_DB`: database path
    /// - `INVENTORY_AUTHOR`: log author
    /// - `INVENTORY_PAGE_SIZE`: cursor page size
    pub fn from_env() -> InventoryResult<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("INVENTORY_DB") {
            config.database_path = PathBuf::from(path);
        }
        if let Ok(author) = std::env::var("INVENTORY_AUTHOR") {
            config.author = author;
        }
        if let Ok(page_size) = std::env::var("INVENTORY_PAGE_SIZE") {
            config.page_size = page_size.parse().map_err(|_| {
                InventoryError::Configuration(format!(
                    "INVENTORY_PAGE_SIZE is not a number: {}",
                    page_size
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> InventoryResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            InventoryError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> InventoryResult<()> {
        if self.page_size == 0 {
            return Err(InventoryError::Configuration(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.author.trim().is_empty() {
            return Err(InventoryError::Configuration(
                "author must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
