// Copyright (c) 2025 - Cowboy AI, Inc.
//! VM import driver
//!
//! Reads a CSV export of virtual machines and feeds it into the inventory:
//!
//! ```text
//! CSV ──read_records──▶ VmRecord ──VmImporter::run──▶ Inventory
//!                                    │
//!                                    ├─ resolve or create the object (rename on folder prefix)
//!                                    ├─ update_network_interface per NIC
//!                                    ├─ add_ipv4 / add_ipv6 per address
//!                                    └─ reconcile_addresses per NIC (optional prune)
//! ```
//!
//! The CSV needs a header row with `Name`, `NIC`, `IP`, `VLAN` and `Folder`. NIC, IP and
//! VLAN hold comma-separated lists aligned by position; one IP position may carry several
//! addresses separated by `;` or whitespace.
//!
//! A missing VM object type, or a failure while creating an object, stops the run.
//! Malformed addresses are logged and skipped.

use std::io::Read;
use std::net::IpAddr;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::audit::LOG_DATE_FORMAT;
use crate::domain::address::parse_ip;
use crate::errors::{InventoryError, InventoryResult};
use crate::inventory::Inventory;
use crate::store::StoreGateway;

/// Columns the CSV header must contain
pub const REQUIRED_COLUMNS: [&str; 5] = ["Name", "NIC", "IP", "VLAN", "Folder"];

/// One network interface of an imported VM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmInterface {
    pub name: String,
    pub vlan: Option<String>,
    /// Address literals as they appeared in the CSV, not yet validated
    pub addresses: Vec<String>,
}

/// One CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmRecord {
    pub name: String,
    pub folder: String,
    pub interfaces: Vec<VmInterface>,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "NIC", default)]
    nic: String,
    #[serde(rename = "IP", default)]
    ip: String,
    #[serde(rename = "VLAN", default)]
    vlan: String,
    #[serde(rename = "Folder", default)]
    folder: String,
}

fn split_list(field: &str) -> Vec<&str> {
    if field.trim().is_empty() {
        Vec::new()
    } else {
        field.split(',').map(str::trim).collect()
    }
}

impl From<CsvRow> for VmRecord {
    fn from(row: CsvRow) -> Self {
        let ips = split_list(&row.ip);
        let vlans = split_list(&row.vlan);

        let interfaces = split_list(&row.nic)
            .into_iter()
            .enumerate()
            .filter(|(_, nic)| !nic.is_empty())
            .map(|(i, nic)| VmInterface {
                name: nic.to_string(),
                vlan: vlans
                    .get(i)
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_string()),
                addresses: ips
                    .get(i)
                    .map(|field| {
                        field
                            .split(|c: char| c == ';' || c.is_whitespace())
                            .filter(|a| !a.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();

        VmRecord {
            name: row.name.trim().to_string(),
            folder: row.folder.trim().to_string(),
            interfaces,
        }
    }
}

/// Parse VM records from CSV text
pub fn read_records<R: Read>(reader: R) -> InventoryResult<Vec<VmRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    records_from(&mut csv_reader)
}

/// Parse VM records from a CSV file
pub fn read_records_from_path(path: impl AsRef<Path>) -> InventoryResult<Vec<VmRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    records_from(&mut csv_reader)
}

fn records_from<R: Read>(csv_reader: &mut csv::Reader<R>) -> InventoryResult<Vec<VmRecord>> {
    let headers = csv_reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(InventoryError::Csv(format!(
            "missing required column: {}",
            missing
        )));
    }

    csv_reader
        .deserialize::<CsvRow>()
        .map(|row| Ok(VmRecord::from(row?)))
        .collect()
}

/// Name the object gets in the inventory
///
/// With `prefix_folder`, the last path segment of the folder is prepended:
/// `("web01", "Datacenter/prod")` becomes `prod-web01`.
pub fn canonical_name(name: &str, folder: &str, prefix_folder: bool) -> String {
    let leaf = folder
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .trim();
    if prefix_folder && !leaf.is_empty() {
        format!("{}-{}", leaf, name)
    } else {
        name.to_string()
    }
}

/// Import behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Prefix object names with the leaf of their folder
    pub prefix_folder: bool,
    /// Remove addresses not listed in the CSV from each imported interface
    pub prune_addresses: bool,
    /// Object type label of imported objects
    pub object_type: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            prefix_folder: false,
            prune_addresses: false,
            object_type: "VM".to_string(),
        }
    }
}

/// Counters of one import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub records: usize,
    pub created: usize,
    pub renamed: usize,
    pub interfaces: usize,
    pub addresses_added: usize,
    pub addresses_removed: usize,
    pub skipped_addresses: usize,
}

/// Feeds VM records into an inventory
pub struct VmImporter<'a, G: StoreGateway> {
    inventory: &'a Inventory<G>,
    options: ImportOptions,
}

impl<'a, G: StoreGateway> VmImporter<'a, G> {
    pub fn new(inventory: &'a Inventory<G>, options: ImportOptions) -> Self {
        Self { inventory, options }
    }

    /// Import every record, stopping at the first fatal error
    pub fn run<I>(&self, records: I) -> InventoryResult<ImportSummary>
    where
        I: IntoIterator<Item = VmRecord>,
    {
        let run_id = Uuid::now_v7();
        let span = info_span!("import", %run_id);
        let _enter = span.enter();

        let type_id = self
            .inventory
            .object_type_id(&self.options.object_type)?
            .ok_or_else(|| InventoryError::MissingObjectType(self.options.object_type.clone()))?;
        debug!(type_id, object_type = %self.options.object_type, "Resolved object type");

        let mut summary = ImportSummary::default();
        for record in records {
            self.import_record(type_id, &record, &mut summary)?;
            summary.records += 1;
        }

        info!(
            records = summary.records,
            created = summary.created,
            renamed = summary.renamed,
            addresses_added = summary.addresses_added,
            addresses_removed = summary.addresses_removed,
            skipped_addresses = summary.skipped_addresses,
            "Import finished"
        );
        Ok(summary)
    }

    fn import_record(
        &self,
        type_id: i64,
        record: &VmRecord,
        summary: &mut ImportSummary,
    ) -> InventoryResult<()> {
        let inv = self.inventory;
        if record.name.is_empty() {
            warn!("Skipping record without a name");
            return Ok(());
        }
        let name = canonical_name(&record.name, &record.folder, self.options.prefix_folder);

        let object_id = if let Some(id) = inv.object_id(&name)? {
            debug!(name = %name, "Object already exists, not adding");
            id
        } else if let Some(id) = inv
            .object_id(&record.name)?
            .filter(|_| name != record.name)
        {
            inv.rename_object(id, &name)?;
            summary.renamed += 1;
            id
        } else {
            let id = inv.atomically(|| {
                let object = inv.add_object(&name, type_id, None, Some(&record.name))?;
                inv.insert_log(
                    object.id,
                    format!(
                        "Object imported by script at {}",
                        Utc::now().format(LOG_DATE_FORMAT)
                    ),
                )?;
                Ok(object.id)
            })?;
            summary.created += 1;
            id
        };

        for interface in &record.interfaces {
            inv.update_network_interface(object_id, &interface.name)?;
            summary.interfaces += 1;

            let mut listed = Vec::with_capacity(interface.addresses.len());
            for text in &interface.addresses {
                let added = match parse_ip(text) {
                    Ok(IpAddr::V4(ip)) => inv.add_ipv4(object_id, &interface.name, &ip.to_string())?,
                    Ok(IpAddr::V6(ip)) => inv.add_ipv6(object_id, &interface.name, &ip.to_string())?,
                    Err(e) => {
                        warn!(object = %name, interface = %interface.name, error = %e, "Skipping address");
                        summary.skipped_addresses += 1;
                        continue;
                    }
                };
                if added {
                    summary.addresses_added += 1;
                }
                listed.push(text.as_str());
            }

            if self.options.prune_addresses {
                summary.addresses_removed += inv
                    .reconcile_addresses(object_id, &interface.name, &listed)?
                    .len();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test_case("web01", "", true, "web01" ; "no folder")]
    #[test_case("web01", "Datacenter/prod", true, "prod-web01" ; "nested folder")]
    #[test_case("web01", "prod/", true, "prod-web01" ; "trailing slash")]
    #[test_case("web01", "Datacenter/prod", false, "web01" ; "prefix disabled")]
    fn test_canonical_name(name: &str, folder: &str, prefix: bool, expected: &str) {
        assert_eq!(canonical_name(name, folder, prefix), expected);
    }

    #[test]
    fn test_read_records_aligns_lists() {
        let csv = "Name,NIC,IP,VLAN,Folder,Notes\n\
                   web01,\"eth0,eth1\",\"10.0.0.5;2001:db8::5,192.168.1.5\",\"100,200\",prod,ignored\n\
                   db01,eth0,,,,\n";
        let records = read_records(csv.as_bytes()).unwrap();

        assert_eq!(
            records[0],
            VmRecord {
                name: "web01".to_string(),
                folder: "prod".to_string(),
                interfaces: vec![
                    VmInterface {
                        name: "eth0".to_string(),
                        vlan: Some("100".to_string()),
                        addresses: vec!["10.0.0.5".to_string(), "2001:db8::5".to_string()],
                    },
                    VmInterface {
                        name: "eth1".to_string(),
                        vlan: Some("200".to_string()),
                        addresses: vec!["192.168.1.5".to_string()],
                    },
                ],
            }
        );
        assert_eq!(records[1].interfaces[0].addresses, Vec::<String>::new());
        assert_eq!(records[1].interfaces[0].vlan, None);
    }

    #[test]
    fn test_read_records_requires_columns() {
        let err = read_records("Name,NIC,IP\nweb01,eth0,10.0.0.1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InventoryError::Csv(msg) if msg.contains("VLAN")));
    }

    #[test]
    fn test_header_order_is_free() {
        let csv = "Folder,VLAN,IP,NIC,Name\nprod,,10.0.0.1,eth0,web01\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].name, "web01");
        assert_eq!(records[0].interfaces[0].addresses, vec!["10.0.0.1"]);
    }
}
