// Copyright (c) 2025 - Cowboy AI, Inc.
//! Address Reconciler
//!
//! Adds IPv4/IPv6 allocations to an object's interface one at a time, and converges an
//! interface's stored set towards a desired list by removing extras. Reconciliation
//! never adds: callers add explicitly. A reconciliation pass commits as one unit, so a
//! failed removal or log write leaves the interface as it was.
//!
//! IPv6 addresses are compared through their 32-digit hex key so every textual form of
//! one address (compressed, exploded, mixed notation) is the same address.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use tracing::debug;

use crate::domain::address::{
    ipv4_from_stored, ipv4_to_stored, ipv6_from_stored, ipv6_to_hex, ipv6_to_stored, parse_ip,
    parse_ipv4, parse_ipv6,
};
use crate::errors::InventoryResult;
use crate::inventory::Inventory;
use crate::sql_params;
use crate::store::StoreGateway;

impl<G: StoreGateway> Inventory<G> {
    /// IPv4 addresses allocated to one interface
    pub fn interface_ipv4_addresses(
        &self,
        object_id: i64,
        interface: &str,
    ) -> InventoryResult<Vec<Ipv4Addr>> {
        self.store()
            .query_all(
                "SELECT ip FROM IPv4Allocation WHERE object_id = ?1 AND name = ?2 ORDER BY ip",
                sql_params![object_id, interface],
            )?
            .iter()
            .map(|row| Ok(ipv4_from_stored(row.get_i64(0)?)?))
            .collect()
    }

    /// IPv6 addresses allocated to one interface
    pub fn interface_ipv6_addresses(
        &self,
        object_id: i64,
        interface: &str,
    ) -> InventoryResult<Vec<Ipv6Addr>> {
        self.store()
            .query_all(
                "SELECT ip FROM IPv6Allocation WHERE object_id = ?1 AND name = ?2 ORDER BY ip",
                sql_params![object_id, interface],
            )?
            .iter()
            .map(|row| Ok(ipv6_from_stored(&row.get_blob(0)?)?))
            .collect()
    }

    /// Allocate an IPv4 address to an interface unless it is already there
    ///
    /// Returns whether a row was inserted. A malformed literal is an error and nothing is
    /// written.
    pub fn add_ipv4(&self, object_id: i64, interface: &str, address: &str) -> InventoryResult<bool> {
        let ip = parse_ipv4(address)?;
        self.atomically(|| {
            if self.interface_ipv4_addresses(object_id, interface)?.contains(&ip) {
                debug!(object_id, interface, %ip, "IPv4 address already allocated");
                return Ok(false);
            }

            self.store().execute(
                "INSERT INTO IPv4Allocation (object_id, ip, name) VALUES (?1, ?2, ?3)",
                sql_params![object_id, ipv4_to_stored(ip), interface],
            )?;
            self.insert_log(object_id, format!("Added IP {} on {}", ip, interface))?;
            Ok(true)
        })
    }

    /// Allocate an IPv6 address to an interface unless it is already there
    ///
    /// The duplicate check is a membership test over every address already stored on the
    /// interface, compared by hex key.
    pub fn add_ipv6(&self, object_id: i64, interface: &str, address: &str) -> InventoryResult<bool> {
        let ip = parse_ipv6(address)?;
        let key = ipv6_to_hex(ip);
        self.atomically(|| {
            let present = self
                .interface_ipv6_addresses(object_id, interface)?
                .into_iter()
                .any(|stored| ipv6_to_hex(stored) == key);
            if present {
                debug!(object_id, interface, %ip, "IPv6 address already allocated");
                return Ok(false);
            }

            self.store().execute(
                "INSERT INTO IPv6Allocation (object_id, ip, name) VALUES (?1, ?2, ?3)",
                sql_params![object_id, ipv6_to_stored(ip), interface],
            )?;
            self.insert_log(object_id, format!("Added IPv6 IP {} on {}", ip, interface))?;
            Ok(true)
        })
    }

    /// Remove every IPv4 address of the interface that is not in `desired`
    ///
    /// Every desired entry is parsed before anything is deleted, so one malformed entry
    /// leaves the interface untouched. Returns the removed addresses.
    pub fn reconcile_ipv4_addresses<S: AsRef<str>>(
        &self,
        object_id: i64,
        interface: &str,
        desired: &[S],
    ) -> InventoryResult<Vec<Ipv4Addr>> {
        let desired = desired
            .iter()
            .map(|text| parse_ipv4(text.as_ref()))
            .collect::<Result<HashSet<_>, _>>()?;
        self.remove_stale_ipv4(object_id, interface, &desired)
    }

    /// Remove every IPv6 address of the interface that is not in `desired`
    pub fn reconcile_ipv6_addresses<S: AsRef<str>>(
        &self,
        object_id: i64,
        interface: &str,
        desired: &[S],
    ) -> InventoryResult<Vec<Ipv6Addr>> {
        let desired = desired
            .iter()
            .map(|text| parse_ipv6(text.as_ref()).map(ipv6_to_hex))
            .collect::<Result<HashSet<_>, _>>()?;
        self.remove_stale_ipv6(object_id, interface, &desired)
    }

    /// Reconcile both families against one mixed list
    ///
    /// An interface with no desired address of a family loses every address of it.
    pub fn reconcile_addresses<S: AsRef<str>>(
        &self,
        object_id: i64,
        interface: &str,
        desired: &[S],
    ) -> InventoryResult<Vec<IpAddr>> {
        let mut v4 = HashSet::new();
        let mut v6 = HashSet::new();
        for text in desired {
            match parse_ip(text.as_ref())? {
                IpAddr::V4(ip) => {
                    v4.insert(ip);
                }
                IpAddr::V6(ip) => {
                    v6.insert(ipv6_to_hex(ip));
                }
            }
        }

        self.atomically(|| {
            let mut removed: Vec<IpAddr> = self
                .remove_stale_ipv4(object_id, interface, &v4)?
                .into_iter()
                .map(IpAddr::V4)
                .collect();
            removed.extend(
                self.remove_stale_ipv6(object_id, interface, &v6)?
                    .into_iter()
                    .map(IpAddr::V6),
            );
            Ok(removed)
        })
    }

    fn remove_stale_ipv4(
        &self,
        object_id: i64,
        interface: &str,
        desired: &HashSet<Ipv4Addr>,
    ) -> InventoryResult<Vec<Ipv4Addr>> {
        self.atomically(|| {
            let stale: Vec<Ipv4Addr> = self
                .interface_ipv4_addresses(object_id, interface)?
                .into_iter()
                .filter(|ip| !desired.contains(ip))
                .collect();

            for ip in &stale {
                self.store().execute(
                    "DELETE FROM IPv4Allocation WHERE object_id = ?1 AND name = ?2 AND ip = ?3",
                    sql_params![object_id, interface, ipv4_to_stored(*ip)],
                )?;
                self.insert_log(object_id, format!("Removed IP {} from {}", ip, interface))?;
            }
            Ok(stale)
        })
    }

    fn remove_stale_ipv6(
        &self,
        object_id: i64,
        interface: &str,
        desired: &HashSet<String>,
    ) -> InventoryResult<Vec<Ipv6Addr>> {
        self.atomically(|| {
            let stale: Vec<Ipv6Addr> = self
                .interface_ipv6_addresses(object_id, interface)?
                .into_iter()
                .filter(|ip| !desired.contains(&ipv6_to_hex(*ip)))
                .collect();

            for ip in &stale {
                self.store().execute(
                    "DELETE FROM IPv6Allocation WHERE object_id = ?1 AND name = ?2 AND ip = ?3",
                    sql_params![object_id, interface, ipv6_to_stored(*ip)],
                )?;
                self.insert_log(object_id, format!("Removed IP {} from {}", ip, interface))?;
            }
            Ok(stale)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use crate::errors::InventoryError;
    use crate::inventory::testing::{memory_inventory, object, VM};
    use crate::sql_params;
    use crate::store::StoreGateway;

    #[test]
    fn test_add_ipv4_once() {
        let inv = memory_inventory();
        let id = object(&inv, "vm01", VM);

        assert!(inv.add_ipv4(id, "eth0", "10.0.0.1").unwrap());
        assert!(!inv.add_ipv4(id, "eth0", " 10.0.0.1 ").unwrap());
        assert_eq!(
            inv.interface_ipv4_addresses(id, "eth0").unwrap(),
            vec![Ipv4Addr::new(10, 0, 0, 1)]
        );

        let log = inv.object_log(id).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].message, "Added IP 10.0.0.1 on eth0");
    }

    #[test]
    fn test_add_ipv4_malformed_writes_nothing() {
        let inv = memory_inventory();
        let id = object(&inv, "vm01", VM);

        let err = inv.add_ipv4(id, "eth0", "10.0.0.256").unwrap_err();
        assert!(matches!(err, InventoryError::Address(_)));
        assert!(inv.interface_ipv4_addresses(id, "eth0").unwrap().is_empty());
    }

    #[test_case("2001:db8::1", "2001:0DB8:0000:0000:0000:0000:0000:0001" ; "exploded upper case")]
    #[test_case("::ffff:10.0.0.1", "::ffff:a00:1" ; "mixed notation")]
    #[test_case("fe80::", "fe80:0:0:0:0:0:0:0" ; "trailing compression")]
    fn test_add_ipv6_detects_other_spellings(first: &str, second: &str) {
        let inv = memory_inventory();
        let id = object(&inv, "vm01", VM);

        assert!(inv.add_ipv6(id, "eth0", first).unwrap());
        assert!(!inv.add_ipv6(id, "eth0", second).unwrap());
        assert_eq!(inv.interface_ipv6_addresses(id, "eth0").unwrap().len(), 1);
    }

    #[test]
    fn test_add_ipv6_many_addresses_on_one_interface() {
        let inv = memory_inventory();
        let id = object(&inv, "vm01", VM);

        for text in ["2001:db8::1", "2001:db8::2", "2001:db8::3"] {
            assert!(inv.add_ipv6(id, "eth0", text).unwrap());
        }
        // present but not first or last in the stored list
        assert!(!inv.add_ipv6(id, "eth0", "2001:db8::2").unwrap());
        assert_eq!(inv.interface_ipv6_addresses(id, "eth0").unwrap().len(), 3);
        assert_eq!(
            inv.object_log(id).unwrap()[0].message,
            "Added IPv6 IP 2001:db8::1 on eth0"
        );
    }

    #[test]
    fn test_reconcile_ipv4_is_removal_only() {
        let inv = memory_inventory();
        let id = object(&inv, "vm01", VM);
        inv.add_ipv4(id, "eth0", "10.0.0.1").unwrap();
        inv.add_ipv4(id, "eth0", "10.0.0.2").unwrap();
        inv.add_ipv4(id, "eth1", "10.0.1.1").unwrap();

        let removed = inv
            .reconcile_ipv4_addresses(id, "eth0", &["10.0.0.2", "10.0.0.3"])
            .unwrap();
        assert_eq!(removed, vec![Ipv4Addr::new(10, 0, 0, 1)]);
        assert_eq!(
            inv.interface_ipv4_addresses(id, "eth0").unwrap(),
            vec![Ipv4Addr::new(10, 0, 0, 2)]
        );
        // other interfaces are untouched
        assert_eq!(inv.interface_ipv4_addresses(id, "eth1").unwrap().len(), 1);
        assert_eq!(
            inv.object_log(id).unwrap().last().unwrap().message,
            "Removed IP 10.0.0.1 from eth0"
        );

        // converged: a second run removes nothing
        let removed = inv
            .reconcile_ipv4_addresses(id, "eth0", &["10.0.0.2", "10.0.0.3"])
            .unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn test_reconcile_with_malformed_entry_deletes_nothing() {
        let inv = memory_inventory();
        let id = object(&inv, "vm01", VM);
        inv.add_ipv4(id, "eth0", "10.0.0.1").unwrap();

        assert!(inv
            .reconcile_ipv4_addresses(id, "eth0", &["not-an-ip"])
            .is_err());
        assert_eq!(inv.interface_ipv4_addresses(id, "eth0").unwrap().len(), 1);
    }

    #[test]
    fn test_reconcile_ipv6_compares_normalised_forms() {
        let inv = memory_inventory();
        let id = object(&inv, "vm01", VM);
        inv.add_ipv6(id, "eth0", "2001:db8::1").unwrap();
        inv.add_ipv6(id, "eth0", "2001:db8::2").unwrap();

        let removed = inv
            .reconcile_ipv6_addresses(id, "eth0", &["2001:0db8:0:0:0:0:0:1"])
            .unwrap();
        assert_eq!(removed, vec!["2001:db8::2".parse::<Ipv6Addr>().unwrap()]);
    }

    #[test]
    fn test_same_address_on_two_interfaces() {
        let inv = memory_inventory();
        let id = object(&inv, "vm01", VM);

        assert!(inv.add_ipv4(id, "eth0", "10.0.0.1").unwrap());
        assert!(inv.add_ipv4(id, "ens192", "10.0.0.1").unwrap());
        assert!(inv.add_ipv6(id, "eth0", "2001:db8::1").unwrap());
        assert!(inv.add_ipv6(id, "ens192", "2001:db8::1").unwrap());

        for interface in ["eth0", "ens192"] {
            assert_eq!(
                inv.interface_ipv4_addresses(id, interface).unwrap(),
                vec![Ipv4Addr::new(10, 0, 0, 1)]
            );
            assert_eq!(inv.interface_ipv6_addresses(id, interface).unwrap().len(), 1);
        }

        // removing it from one interface keeps the other
        inv.reconcile_ipv4_addresses::<&str>(id, "eth0", &[]).unwrap();
        assert_eq!(inv.interface_ipv4_addresses(id, "ens192").unwrap().len(), 1);
    }

    #[test]
    fn test_failed_removal_log_keeps_every_address() {
        let inv = memory_inventory();
        let id = object(&inv, "vm01", VM);
        inv.add_ipv4(id, "eth0", "10.0.0.1").unwrap();
        inv.add_ipv4(id, "eth0", "10.0.0.2").unwrap();
        inv.store()
            .execute(
                "CREATE TRIGGER ObjectLog_reject_removal BEFORE INSERT ON ObjectLog \
                 WHEN NEW.content LIKE 'Removed IP 10.0.0.2%' \
                 BEGIN SELECT RAISE(ABORT, 'log unavailable'); END",
                sql_params![],
            )
            .unwrap();

        let err = inv
            .reconcile_ipv4_addresses::<&str>(id, "eth0", &[])
            .unwrap_err();

        assert!(err.is_constraint_violation());
        assert_eq!(inv.interface_ipv4_addresses(id, "eth0").unwrap().len(), 2);
        assert_eq!(inv.object_log(id).unwrap().len(), 2);
    }

    #[test]
    fn test_reconcile_mixed_families() {
        let inv = memory_inventory();
        let id = object(&inv, "vm01", VM);
        inv.add_ipv4(id, "eth0", "10.0.0.1").unwrap();
        inv.add_ipv4(id, "eth0", "10.0.0.2").unwrap();
        inv.add_ipv6(id, "eth0", "2001:db8::1").unwrap();

        let removed = inv
            .reconcile_addresses(id, "eth0", &["10.0.0.1".to_string()])
            .unwrap();
        assert_eq!(removed.len(), 2);
        assert!(inv.interface_ipv6_addresses(id, "eth0").unwrap().is_empty());
        assert_eq!(
            inv.interface_ipv4_addresses(id, "eth0").unwrap(),
            vec![Ipv4Addr::new(10, 0, 0, 1)]
        );
    }
}
