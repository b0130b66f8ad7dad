// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties of address normalization and desired-state reconciliation that must hold
//! for all inputs.

mod address_normalization;
mod reconciliation;
