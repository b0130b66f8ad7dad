// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Desired-State Reconciliation
//!
//! For any stored set and desired list, reconciliation leaves exactly the stored
//! addresses that are also desired, and a second run changes nothing.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use proptest::prelude::*;

use crate::fixtures::*;

/// Small address pool so stored and desired sets overlap often
fn address_set() -> impl Strategy<Value = BTreeSet<Ipv4Addr>> {
    prop::collection::btree_set((1u8..16).prop_map(|n| Ipv4Addr::new(10, 0, 0, n)), 0..10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: stored set converges to stored ∩ desired
    #[test]
    fn prop_reconcile_keeps_intersection(stored in address_set(), desired in address_set()) {
        let inv = seeded_inventory();
        let id = add(&inv, "vm01", VM);
        for ip in &stored {
            inv.add_ipv4(id, "eth0", &ip.to_string()).unwrap();
        }
        let desired_text: Vec<String> = desired.iter().map(Ipv4Addr::to_string).collect();

        let removed: BTreeSet<Ipv4Addr> = inv
            .reconcile_ipv4_addresses(id, "eth0", &desired_text)
            .unwrap()
            .into_iter()
            .collect();
        let remaining: BTreeSet<Ipv4Addr> = inv
            .interface_ipv4_addresses(id, "eth0")
            .unwrap()
            .into_iter()
            .collect();

        prop_assert_eq!(&remaining, &stored.intersection(&desired).copied().collect::<BTreeSet<_>>());
        prop_assert_eq!(&removed, &stored.difference(&desired).copied().collect::<BTreeSet<_>>());

        let again = inv.reconcile_ipv4_addresses(id, "eth0", &desired_text).unwrap();
        prop_assert!(again.is_empty(), "Second reconciliation must be a no-op");
    }
}
