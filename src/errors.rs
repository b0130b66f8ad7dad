// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for inventory operations
//!
//! Lookups never fail with "not found": they return `Option`. Errors are reserved for
//! store failures, malformed input and the few fatal conditions of the import driver.

use thiserror::Error;

use crate::domain::address::AddressError;

/// Errors that can occur in inventory operations
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Backing store failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A uniqueness or foreign key constraint rejected a write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A row did not have the expected shape
    #[error("Row decode error: {0}")]
    RowDecode(String),

    /// An INSERT completed without reporting the new row id
    #[error("Store did not return an inserted row id")]
    MissingRowId,

    /// A value does not fit the store's column range
    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    /// Malformed IPv4/IPv6 literal or stored address
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),

    /// A dictionary chapter required by an operation does not exist
    #[error("Dictionary chapter not found: {0}")]
    MissingChapter(String),

    /// The object type needed by the import driver does not exist
    #[error("Object type not found: {0}")]
    MissingObjectType(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// CSV input error
    #[error("CSV error: {0}")]
    Csv(String),

    /// The gateway returned from an atomic unit without running it
    #[error("Store gateway did not run the atomic unit")]
    IncompleteTransaction,
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

impl From<csv::Error> for InventoryError {
    fn from(err: csv::Error) -> Self {
        InventoryError::Csv(err.to_string())
    }
}

impl From<toml::de::Error> for InventoryError {
    fn from(err: toml::de::Error) -> Self {
        InventoryError::Configuration(err.to_string())
    }
}

impl InventoryError {
    /// True when the store rejected a write because of a constraint
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, InventoryError::ConstraintViolation(_))
    }
}
