// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed attribute values
//!
//! Storage keeps two nullable columns per row; this type is the only thing callers see.
//! The variant of the first stored value fixes the attribute's type for good.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value of an object attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    String(String),
    Number(u64),
}

impl AttributeValue {
    /// Check if both values have the same variant
    pub fn same_kind(&self, other: &AttributeValue) -> bool {
        matches!(
            (self, other),
            (AttributeValue::String(_), AttributeValue::String(_))
                | (AttributeValue::Number(_), AttributeValue::Number(_))
        )
    }

    /// Name of the variant, for log messages
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::String(_) => "string",
            AttributeValue::Number(_) => "number",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{}", s),
            AttributeValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        AttributeValue::Number(value)
    }
}

/// What an attribute upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeWrite {
    /// No row existed; one was inserted
    Inserted,
    /// The stored value differed and was overwritten
    Updated,
    /// The stored value already matched
    Unchanged,
    /// The stored value has the other type; nothing was written
    TypeMismatch,
}

impl AttributeWrite {
    /// Check if the store was written
    pub fn wrote(&self) -> bool {
        matches!(self, AttributeWrite::Inserted | AttributeWrite::Updated)
    }
}
