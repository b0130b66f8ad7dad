// Copyright (c) 2025 - Cowboy AI, Inc.
//! Rack inventory data-access layer for the Composable Information Machine
//!
//! This crate keeps a RackTables-style inventory in a relational store: objects, typed
//! attributes, ports and links, parent/child entity links, IPv4/IPv6 allocations and an
//! append-only object log. Reconciliation operations converge stored state towards a
//! desired list by removing extras, so a scheduled re-run is always safe.
//!
//! The [`import`] module and the `import-vms` binary feed a CSV export of virtual machines
//! into the inventory.

pub mod addresses;
pub mod attributes;
pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod import;
pub mod inventory;
pub mod objects;
pub mod resolver;
pub mod store;
pub mod topology;
pub mod virtuals;

// Re-export commonly used types
pub use config::StoreConfig;
pub use domain::{AttributeValue, AttributeWrite, InventoryObject, LinkOutcome, ParentOutcome};
pub use errors::{InventoryError, InventoryResult};
pub use import::{ImportOptions, ImportSummary, VmImporter, VmRecord};
pub use inventory::Inventory;
pub use store::{SqliteGateway, StoreGateway};
