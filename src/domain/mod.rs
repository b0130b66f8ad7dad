// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Domain Models
//!
//! Plain values shared by every inventory operation.
//!
//! - [`address`] - IPv4/IPv6 codecs between human notation and stored form
//! - [`AttributeValue`] - explicit string/number attribute values
//! - [`InventoryObject`], [`Port`], [`Link`], [`EntityLink`], [`LogEntry`], [`Tag`] - records
//! - [`LinkOutcome`], [`ParentOutcome`] - results of the linking operations

pub mod address;
pub mod attribute;
pub mod outcome;
pub mod records;

pub use address::AddressError;
pub use attribute::{AttributeValue, AttributeWrite};
pub use outcome::{LinkOutcome, ParentOutcome};
pub use records::{
    EntityLink, InventoryObject, Ipv4Allocation, Ipv4Network, Ipv6Allocation, Link, LogEntry,
    Port, Tag, ENTITY_OBJECT,
};
