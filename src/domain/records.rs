// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plain data-transfer records returned by inventory queries
//!
//! These are snapshots: nothing here talks to the store, and nothing is refreshed
//! after construction. Re-query to observe newer state.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use serde::{Deserialize, Serialize};

/// Entity type tag used on both sides of an [`EntityLink`]
pub const ENTITY_OBJECT: &str = "object";

/// A tracked inventory item (device, rack, VM)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryObject {
    pub id: i64,
    pub name: Option<String>,
    pub label: Option<String>,
    pub type_id: i64,
    pub asset_no: Option<String>,
    pub has_problems: bool,
    pub comment: Option<String>,
}

impl fmt::Display for InventoryObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "#{}", self.id),
        }
    }
}

/// A named network interface on an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: i64,
    pub object_id: i64,
    pub name: String,
    pub iif_id: i64,
    pub type_id: i64,
}

/// Physical connection between two ports; `porta < portb` always holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub porta: i64,
    pub portb: i64,
}

impl Link {
    /// Build a link with the canonical ordering: the higher port id goes to `portb`
    pub fn between(a: i64, b: i64) -> Self {
        if a <= b {
            Self { porta: a, portb: b }
        } else {
            Self { porta: b, portb: a }
        }
    }

    /// The far end of the link as seen from `port`
    pub fn peer_of(&self, port: i64) -> Option<i64> {
        if self.porta == port {
            Some(self.portb)
        } else if self.portb == port {
            Some(self.porta)
        } else {
            None
        }
    }
}

/// Directed parent → child relation between two objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLink {
    pub id: i64,
    pub parent_id: i64,
    pub child_id: i64,
}

/// One object log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub object_id: i64,
    pub author: String,
    pub date: String,
    pub message: String,
}

/// Hierarchical tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub tag: String,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)
    }
}

/// IPv4 address allocated to an object's interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Allocation {
    pub object_id: i64,
    pub address: Ipv4Addr,
    pub interface: String,
    pub allocation_type: String,
}

/// IPv6 address allocated to an object's interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv6Allocation {
    pub object_id: i64,
    pub address: Ipv6Addr,
    pub interface: String,
    pub allocation_type: String,
}

/// IPv4 network segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Network {
    pub id: i64,
    pub address: Ipv4Addr,
    pub mask: u8,
    pub name: Option<String>,
}

impl fmt::Display for Ipv4Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.mask)
    }
}
