// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory schema
//!
//! Table and column names follow the RackTables layout. Each "at most one" rule of the
//! data model is backed by a constraint so a racing writer fails instead of duplicating.

/// Dictionary chapter holding object types
pub const OBJECT_TYPE_CHAPTER: &str = "ObjectType";

/// Dictionary keys of the stock object types
pub const DEFAULT_OBJECT_TYPES: &[(i64, &str)] = &[
    (4, "Server"),
    (8, "Network switch"),
    (1502, "Server chassis"),
    (1504, "VM"),
    (1505, "VM Cluster"),
];

/// DDL for every table the core touches
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS Chapter (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sticky TEXT NOT NULL DEFAULT 'no',
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS Dictionary (
    dict_key INTEGER PRIMARY KEY AUTOINCREMENT,
    chapter_id INTEGER NOT NULL REFERENCES Chapter(id),
    dict_sticky TEXT NOT NULL DEFAULT 'no',
    dict_value TEXT,
    UNIQUE (chapter_id, dict_value)
);

CREATE TABLE IF NOT EXISTS Object (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE,
    label TEXT,
    objtype_id INTEGER NOT NULL DEFAULT 1,
    asset_no TEXT UNIQUE,
    has_problems TEXT NOT NULL DEFAULT 'no',
    comment TEXT
);

CREATE TABLE IF NOT EXISTS Attribute (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL DEFAULT 'string',
    name TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS AttributeValue (
    object_id INTEGER NOT NULL,
    object_tid INTEGER NOT NULL,
    attr_id INTEGER NOT NULL,
    string_value TEXT,
    uint_value INTEGER,
    UNIQUE (object_id, object_tid, attr_id)
);

CREATE TABLE IF NOT EXISTS Port (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    object_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    iif_id INTEGER NOT NULL DEFAULT 1,
    type INTEGER NOT NULL DEFAULT 24,
    l2address TEXT,
    label TEXT,
    UNIQUE (object_id, name)
);

CREATE TABLE IF NOT EXISTS Link (
    porta INTEGER NOT NULL,
    portb INTEGER NOT NULL,
    cable TEXT,
    PRIMARY KEY (porta, portb),
    UNIQUE (porta),
    UNIQUE (portb),
    CHECK (porta < portb)
);

CREATE TRIGGER IF NOT EXISTS Link_single_peer_insert
BEFORE INSERT ON Link
WHEN EXISTS (
    SELECT 1 FROM Link
    WHERE porta IN (NEW.porta, NEW.portb) OR portb IN (NEW.porta, NEW.portb)
)
BEGIN
    SELECT RAISE(ABORT, 'port already linked');
END;

CREATE TRIGGER IF NOT EXISTS Link_single_peer_update
BEFORE UPDATE ON Link
WHEN EXISTS (
    SELECT 1 FROM Link
    WHERE rowid != OLD.rowid
      AND (porta IN (NEW.porta, NEW.portb) OR portb IN (NEW.porta, NEW.portb))
)
BEGIN
    SELECT RAISE(ABORT, 'port already linked');
END;

CREATE TABLE IF NOT EXISTS IPv4Network (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ip INTEGER NOT NULL,
    mask INTEGER NOT NULL,
    name TEXT,
    comment TEXT,
    UNIQUE (ip, mask)
);

CREATE TABLE IF NOT EXISTS IPv4Allocation (
    object_id INTEGER NOT NULL,
    ip INTEGER NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    type TEXT NOT NULL DEFAULT 'regular',
    PRIMARY KEY (object_id, name, ip)
);

CREATE INDEX IF NOT EXISTS IPv4Allocation_ip ON IPv4Allocation (ip);

CREATE TABLE IF NOT EXISTS IPv6Allocation (
    object_id INTEGER NOT NULL,
    ip BLOB NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    type TEXT NOT NULL DEFAULT 'regular',
    PRIMARY KEY (object_id, name, ip)
);

CREATE INDEX IF NOT EXISTS IPv6Allocation_ip ON IPv6Allocation (ip);

CREATE TABLE IF NOT EXISTS EntityLink (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_entity_type TEXT NOT NULL,
    parent_entity_id INTEGER NOT NULL,
    child_entity_type TEXT NOT NULL,
    child_entity_id INTEGER NOT NULL,
    UNIQUE (child_entity_type, child_entity_id)
);

CREATE INDEX IF NOT EXISTS EntityLink_parent ON EntityLink (parent_entity_type, parent_entity_id);

CREATE TABLE IF NOT EXISTS ObjectLog (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    object_id INTEGER NOT NULL,
    user TEXT NOT NULL,
    date TEXT NOT NULL,
    content TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS ObjectLog_object ON ObjectLog (object_id);

CREATE TABLE IF NOT EXISTS TagTree (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_id INTEGER REFERENCES TagTree(id),
    tag TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS TagStorage (
    entity_realm TEXT NOT NULL DEFAULT 'object',
    entity_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    UNIQUE (entity_realm, entity_id, tag_id)
);
"#;
