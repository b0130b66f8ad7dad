// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-inventory
//!
//! Every test gets its own in-memory database with the schema and the stock object
//! types loaded. Names and addresses are fixed constants so failures are reproducible.
#![allow(dead_code)]

use cim_inventory::store::schema::DEFAULT_OBJECT_TYPES;
use cim_inventory::{Inventory, SqliteGateway, StoreGateway};

pub const SERVER: i64 = 4;
pub const VM: i64 = 1504;

pub const HYPERVISOR: &str = "esx01.example.com";
pub const SWITCH: &str = "sw01.example.com";

/// VM export with two folders, a dual-stack NIC and one malformed address
pub const VM_CSV: &str = "\
Name,NIC,IP,VLAN,Folder
web01,\"eth0,eth1\",\"10.0.0.11;2001:db8::11,10.0.1.11\",\"100,200\",Datacenter/prod
db01,eth0,10.0.0.21,100,Datacenter/prod
batch01,eth0,10.0.0.300,100,
";

/// Empty store with the schema and stock object types
pub fn seeded_inventory() -> Inventory<SqliteGateway> {
    let gateway = SqliteGateway::open_in_memory().expect("Failed to open in-memory store");
    gateway.initialize_schema().expect("Failed to create schema");
    gateway
        .seed_object_types(DEFAULT_OBJECT_TYPES)
        .expect("Failed to seed object types");
    Inventory::with_defaults(gateway)
}

/// Store with the schema but without the "VM" object type
pub fn inventory_without_vm_type() -> Inventory<SqliteGateway> {
    let types: Vec<(i64, &str)> = DEFAULT_OBJECT_TYPES
        .iter()
        .copied()
        .filter(|(_, label)| *label != "VM")
        .collect();
    let gateway = SqliteGateway::open_in_memory().expect("Failed to open in-memory store");
    gateway.initialize_schema().expect("Failed to create schema");
    gateway
        .seed_object_types(&types)
        .expect("Failed to seed object types");
    Inventory::with_defaults(gateway)
}

/// Create an object named `name` and return its id
pub fn add(inventory: &Inventory<SqliteGateway>, name: &str, type_id: i64) -> i64 {
    inventory
        .add_object(name, type_id, None, Some(name))
        .expect("Failed to add object")
        .id
}

/// Number of rows in a table
pub fn count(inventory: &Inventory<SqliteGateway>, table: &str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    inventory
        .store()
        .query_one(&sql, &[])
        .expect("Count query failed")
        .expect("Count returned no row")
        .get_i64(0)
        .expect("Count is not an integer")
}

/// Messages logged on an object, oldest first
pub fn log_messages(inventory: &Inventory<SqliteGateway>, object_id: i64) -> Vec<String> {
    inventory
        .object_log(object_id)
        .expect("Failed to read object log")
        .into_iter()
        .map(|entry| entry.message)
        .collect()
}
