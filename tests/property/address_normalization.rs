// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Address Normalization
//!
//! Every textual spelling of one IPv6 address must collapse to the same hex key, and the
//! key must expand back to the same 128-bit value.

use std::net::{Ipv4Addr, Ipv6Addr};

use cim_inventory::domain::address::{
    explode_ipv6, hex_to_ipv6, ipv4_from_stored, ipv4_to_stored, ipv6_to_hex, normalize_ipv6,
};
use proptest::prelude::*;

// ============================================================================
// Spellings
// ============================================================================

/// Textual forms an exporter might produce for one address
#[derive(Debug, Clone, Copy)]
enum Spelling {
    Compressed,
    Exploded,
    ExplodedUpper,
    NoLeadingZeros,
    MixedIpv4Tail,
}

fn spell(addr: Ipv6Addr, spelling: Spelling) -> String {
    let segments = addr.segments();
    match spelling {
        Spelling::Compressed => addr.to_string(),
        Spelling::Exploded => explode_ipv6(addr),
        Spelling::ExplodedUpper => explode_ipv6(addr).to_uppercase(),
        Spelling::NoLeadingZeros => segments
            .iter()
            .map(|s| format!("{:x}", s))
            .collect::<Vec<_>>()
            .join(":"),
        Spelling::MixedIpv4Tail => {
            let head = segments[..6]
                .iter()
                .map(|s| format!("{:x}", s))
                .collect::<Vec<_>>()
                .join(":");
            let octets = addr.octets();
            let tail = Ipv4Addr::new(octets[12], octets[13], octets[14], octets[15]);
            format!("{}:{}", head, tail)
        }
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Addresses biased towards runs of zero hextets so `::` compression shows up
fn ipv6_address() -> impl Strategy<Value = Ipv6Addr> {
    prop_oneof![
        any::<u128>().prop_map(Ipv6Addr::from),
        prop::array::uniform8(prop_oneof![Just(0u16), any::<u16>()]).prop_map(|s| {
            Ipv6Addr::new(s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7])
        }),
    ]
}

fn spelling() -> impl Strategy<Value = Spelling> {
    prop_oneof![
        Just(Spelling::Compressed),
        Just(Spelling::Exploded),
        Just(Spelling::ExplodedUpper),
        Just(Spelling::NoLeadingZeros),
        Just(Spelling::MixedIpv4Tail),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: any spelling normalizes to the hex key of the address
    #[test]
    fn prop_every_spelling_has_one_key(addr in ipv6_address(), spelling in spelling()) {
        let text = spell(addr, spelling);
        let key = normalize_ipv6(&text).unwrap();

        prop_assert_eq!(&key, &ipv6_to_hex(addr), "Spelling {:?} ({}) changed the key", spelling, text);
        prop_assert_eq!(key.len(), 32);
        prop_assert!(key.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    /// Property: normalizing then expanding gives back the same 128-bit value
    #[test]
    fn prop_key_expands_to_same_address(addr in ipv6_address(), spelling in spelling()) {
        let text = spell(addr, spelling);
        let expanded = hex_to_ipv6(&normalize_ipv6(&text).unwrap()).unwrap();

        prop_assert_eq!(expanded, addr);
        prop_assert_eq!(explode_ipv6(expanded).len(), 39);
    }

    /// Property: the stored IPv4 integer preserves address order
    #[test]
    fn prop_ipv4_stored_form_is_ordered(a in any::<u32>(), b in any::<u32>()) {
        let (a, b) = (Ipv4Addr::from(a), Ipv4Addr::from(b));

        prop_assert_eq!(a.cmp(&b), ipv4_to_stored(a).cmp(&ipv4_to_stored(b)));
        prop_assert_eq!(ipv4_from_stored(ipv4_to_stored(a)).unwrap(), a);
    }
}
