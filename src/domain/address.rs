// Copyright (c) 2025 - Cowboy AI, Inc.
//! Address codecs between human notation and stored form
//!
//! - IPv4 is stored as the 32-bit integer of the address in network byte order
//!   (the value `INET_ATON` would produce).
//! - IPv6 is stored as its 16 raw bytes. Comparisons go through the 32-digit lower-case
//!   hex string, which is the same for every textual form of one address.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use thiserror::Error;

/// Address validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid IPv4 address: {0}")]
    InvalidIpv4(String),

    #[error("Invalid IPv6 address: {0}")]
    InvalidIpv6(String),

    #[error("Invalid stored IPv4 value: {0}")]
    InvalidStoredIpv4(i64),

    #[error("Invalid stored IPv6 value: {0}")]
    InvalidStoredIpv6(String),
}

/// Parse a dotted-quad IPv4 literal
pub fn parse_ipv4(text: &str) -> Result<Ipv4Addr, AddressError> {
    Ipv4Addr::from_str(text.trim()).map_err(|_| AddressError::InvalidIpv4(text.to_string()))
}

/// Parse any textual IPv6 form (compressed, exploded or with an embedded IPv4 tail)
pub fn parse_ipv6(text: &str) -> Result<Ipv6Addr, AddressError> {
    Ipv6Addr::from_str(text.trim()).map_err(|_| AddressError::InvalidIpv6(text.to_string()))
}

/// Parse either family; the error names the family the text looks like
pub fn parse_ip(text: &str) -> Result<IpAddr, AddressError> {
    if text.contains(':') {
        parse_ipv6(text).map(IpAddr::V6)
    } else {
        parse_ipv4(text).map(IpAddr::V4)
    }
}

/// Stored integer form of an IPv4 address
pub fn ipv4_to_stored(addr: Ipv4Addr) -> i64 {
    i64::from(u32::from(addr))
}

/// Decode the stored integer form of an IPv4 address
pub fn ipv4_from_stored(value: i64) -> Result<Ipv4Addr, AddressError> {
    u32::try_from(value)
        .map(Ipv4Addr::from)
        .map_err(|_| AddressError::InvalidStoredIpv4(value))
}

/// Stored byte form of an IPv6 address
pub fn ipv6_to_stored(addr: Ipv6Addr) -> Vec<u8> {
    addr.octets().to_vec()
}

/// Decode the stored byte form of an IPv6 address
pub fn ipv6_from_stored(bytes: &[u8]) -> Result<Ipv6Addr, AddressError> {
    let octets: [u8; 16] = bytes.try_into().map_err(|_| {
        AddressError::InvalidStoredIpv6(format!("expected 16 bytes, found {}", bytes.len()))
    })?;
    Ok(Ipv6Addr::from(octets))
}

/// Colon-free, zero-padded, lower-case hex digits of an IPv6 address
///
/// ```rust
/// use cim_inventory::domain::address::{ipv6_to_hex, parse_ipv6};
///
/// let addr = parse_ipv6("2001:DB8::1").unwrap();
/// assert_eq!(ipv6_to_hex(addr), "20010db8000000000000000000000001");
/// ```
pub fn ipv6_to_hex(addr: Ipv6Addr) -> String {
    format!("{:032x}", u128::from(addr))
}

/// Inverse of [`ipv6_to_hex`]; accepts either letter case
pub fn hex_to_ipv6(hex: &str) -> Result<Ipv6Addr, AddressError> {
    if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidStoredIpv6(hex.to_string()));
    }
    u128::from_str_radix(hex, 16)
        .map(Ipv6Addr::from)
        .map_err(|_| AddressError::InvalidStoredIpv6(hex.to_string()))
}

/// Fully expanded form: eight 4-digit lower-case hextets
pub fn explode_ipv6(addr: Ipv6Addr) -> String {
    addr.segments()
        .iter()
        .map(|segment| format!("{:04x}", segment))
        .collect::<Vec<_>>()
        .join(":")
}

/// Normalise any IPv6 literal straight to its hex comparison key
pub fn normalize_ipv6(text: &str) -> Result<String, AddressError> {
    parse_ipv6(text).map(ipv6_to_hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2001:db8::1" ; "compressed")]
    #[test_case("2001:0db8:0000:0000:0000:0000:0000:0001" ; "exploded")]
    #[test_case("2001:DB8:0:0:0:0:0:1" ; "upper case")]
    #[test_case("2001:db8:0::0:1" ; "partially compressed")]
    fn test_ipv6_forms_share_one_key(text: &str) {
        assert_eq!(
            normalize_ipv6(text).unwrap(),
            "20010db8000000000000000000000001"
        );
    }

    #[test]
    fn test_ipv6_mixed_notation() {
        let addr = parse_ipv6("::ffff:192.0.2.128").unwrap();
        assert_eq!(ipv6_to_hex(addr), "00000000000000000000ffffc0000280");
        assert_eq!(explode_ipv6(addr), "0000:0000:0000:0000:0000:ffff:c000:0280");
    }

    #[test]
    fn test_ipv6_unspecified() {
        let addr = parse_ipv6("::").unwrap();
        assert_eq!(ipv6_to_hex(addr), "0".repeat(32));
        assert_eq!(hex_to_ipv6(&"0".repeat(32)).unwrap(), addr);
    }

    #[test]
    fn test_hex_to_ipv6_rejects_garbage() {
        assert!(hex_to_ipv6("2001").is_err());
        assert!(hex_to_ipv6(&"g".repeat(32)).is_err());
        assert!(hex_to_ipv6(&format!("+{}", "0".repeat(31))).is_err());
    }

    #[test]
    fn test_hex_to_ipv6_accepts_upper_case() {
        let addr = hex_to_ipv6("20010DB8000000000000000000000001").unwrap();
        assert_eq!(addr, parse_ipv6("2001:db8::1").unwrap());
    }

    #[test]
    fn test_ipv4_stored_form() {
        let addr = parse_ipv4("10.0.0.1").unwrap();
        assert_eq!(ipv4_to_stored(addr), 167_772_161);
        assert_eq!(ipv4_from_stored(167_772_161).unwrap(), addr);
        assert_eq!(ipv4_to_stored(parse_ipv4("255.255.255.255").unwrap()), 4_294_967_295);
    }

    #[test]
    fn test_ipv4_stored_out_of_range() {
        assert!(ipv4_from_stored(-1).is_err());
        assert!(ipv4_from_stored(1 << 32).is_err());
    }

    #[test_case("999.1.1.1" ; "octet out of range")]
    #[test_case("10.0.0" ; "three octets")]
    #[test_case("" ; "empty")]
    #[test_case("fe80::1" ; "ipv6 literal")]
    fn test_invalid_ipv4(text: &str) {
        assert!(matches!(parse_ipv4(text), Err(AddressError::InvalidIpv4(_))));
    }

    #[test]
    fn test_parse_ip_picks_family() {
        assert!(matches!(parse_ip("10.1.2.3"), Ok(IpAddr::V4(_))));
        assert!(matches!(parse_ip("fe80::1"), Ok(IpAddr::V6(_))));
        assert!(matches!(parse_ip("fe80:::1"), Err(AddressError::InvalidIpv6(_))));
        assert!(matches!(parse_ip("10.1.2"), Err(AddressError::InvalidIpv4(_))));
    }

    #[test]
    fn test_ipv6_stored_bytes() {
        let addr = parse_ipv6("fe80::1").unwrap();
        let stored = ipv6_to_stored(addr);
        assert_eq!(stored.len(), 16);
        assert_eq!(ipv6_from_stored(&stored).unwrap(), addr);
        assert!(ipv6_from_stored(&stored[..4]).is_err());
    }
}
