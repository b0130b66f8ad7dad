// Copyright (c) 2025 - Cowboy AI, Inc.
//! Object lifecycle and read-side accessors
//!
//! Objects are created explicitly and only removed by [`Inventory::delete_object`],
//! which does not cascade: ports, links, allocations and entity links of a deleted
//! object are the caller's to clean up.

use tracing::{debug, info};

use crate::domain::address::{ipv4_from_stored, ipv6_from_stored};
use crate::domain::{InventoryObject, Ipv4Allocation, Ipv4Network, Ipv6Allocation, Tag};
use crate::errors::{InventoryError, InventoryResult};
use crate::inventory::Inventory;
use crate::sql_params;
use crate::store::{KeysetCursor, Row, StoreGateway};

const OBJECT_COLUMNS: &str = "id, name, label, objtype_id, asset_no, has_problems, comment";

fn decode_object(row: &Row) -> InventoryResult<InventoryObject> {
    Ok(InventoryObject {
        id: row.get_i64(0)?,
        name: row.get_opt_string(1)?,
        label: row.get_opt_string(2)?,
        type_id: row.get_i64(3)?,
        asset_no: row.get_opt_string(4)?,
        has_problems: row.get_string(5)? == "yes",
        comment: row.get_opt_string(6)?,
    })
}

fn decode_tag(row: &Row) -> InventoryResult<Tag> {
    Ok(Tag {
        id: row.get_i64(0)?,
        parent_id: row.get_opt_i64(1)?,
        tag: row.get_opt_string(2)?.unwrap_or_default(),
    })
}

fn decode_network(row: &Row) -> InventoryResult<Ipv4Network> {
    let mask = row.get_i64(2)?;
    Ok(Ipv4Network {
        id: row.get_i64(0)?,
        address: ipv4_from_stored(row.get_i64(1)?)?,
        mask: u8::try_from(mask)
            .ok()
            .filter(|m| *m <= 32)
            .ok_or_else(|| InventoryError::RowDecode(format!("invalid network mask {}", mask)))?,
        name: row.get_opt_string(3)?,
    })
}

impl<G: StoreGateway> Inventory<G> {
    /// Create an object and return the stored record
    pub fn add_object(
        &self,
        name: &str,
        type_id: i64,
        asset_no: Option<&str>,
        label: Option<&str>,
    ) -> InventoryResult<InventoryObject> {
        let id = self.insert(
            "INSERT INTO Object (name, objtype_id, asset_no, label) VALUES (?1, ?2, ?3, ?4)",
            sql_params![name, type_id, asset_no, label],
        )?;
        info!(object_id = id, name, type_id, "Added object");

        self.object(id)?
            .ok_or_else(|| InventoryError::RowDecode(format!("object {} vanished after insert", id)))
    }

    /// Fetch one object
    pub fn object(&self, object_id: i64) -> InventoryResult<Option<InventoryObject>> {
        let sql = format!("SELECT {} FROM Object WHERE id = ?1", OBJECT_COLUMNS);
        self.store()
            .query_one(&sql, sql_params![object_id])?
            .as_ref()
            .map(decode_object)
            .transpose()
    }

    /// Lazily walk every object in id order
    pub fn objects(&self) -> KeysetCursor<'_, G, InventoryObject> {
        KeysetCursor::new(
            self.store(),
            "SELECT id, name, label, objtype_id, asset_no, has_problems, comment \
             FROM Object WHERE id > ?1 ORDER BY id LIMIT ?2",
            self.page_size(),
            decode_object,
        )
    }

    /// Rename an object and log the change; returns false when nothing changed
    pub fn rename_object(&self, object_id: i64, new_name: &str) -> InventoryResult<bool> {
        let Some(object) = self.object(object_id)? else {
            debug!(object_id, "Rename skipped: object not found");
            return Ok(false);
        };
        if object.name.as_deref() == Some(new_name) {
            return Ok(false);
        }

        self.atomically(|| {
            self.store().execute(
                "UPDATE Object SET name = ?1 WHERE id = ?2",
                sql_params![new_name, object_id],
            )?;
            self.insert_log(
                object_id,
                format!(
                    "Name changed from {} to {}",
                    object.name.as_deref().unwrap_or(""),
                    new_name
                ),
            )?;
            Ok(true)
        })
    }

    /// Replace an object's label
    pub fn update_object_label(&self, object_id: i64, label: &str) -> InventoryResult<()> {
        self.store().execute(
            "UPDATE Object SET label = ?1 WHERE id = ?2",
            sql_params![label, object_id],
        )?;
        debug!(object_id, label, "Updated label");
        Ok(())
    }

    /// Replace an object's comment
    pub fn update_object_comment(&self, object_id: i64, comment: &str) -> InventoryResult<()> {
        self.store().execute(
            "UPDATE Object SET comment = ?1 WHERE id = ?2",
            sql_params![comment, object_id],
        )?;
        debug!(object_id, "Updated comment");
        Ok(())
    }

    /// Delete the object row only
    pub fn delete_object(&self, object_id: i64) -> InventoryResult<()> {
        self.store()
            .execute("DELETE FROM Object WHERE id = ?1", sql_params![object_id])?;
        info!(object_id, "Deleted object");
        Ok(())
    }

    /// Label of the object's type in the ObjectType chapter
    pub fn object_type_name(&self, object: &InventoryObject) -> InventoryResult<Option<String>> {
        Ok(self
            .object_types()?
            .into_iter()
            .find(|(key, _)| *key == object.type_id)
            .map(|(_, label)| label))
    }

    /// Tags attached to an object
    pub fn object_tags(&self, object_id: i64) -> InventoryResult<Vec<Tag>> {
        self.store()
            .query_all(
                "SELECT t.id, t.parent_id, t.tag FROM TagStorage s \
                 JOIN TagTree t ON t.id = s.tag_id \
                 WHERE s.entity_realm = 'object' AND s.entity_id = ?1 ORDER BY t.id",
                sql_params![object_id],
            )?
            .iter()
            .map(decode_tag)
            .collect()
    }

    /// Fetch one tag
    pub fn tag(&self, tag_id: i64) -> InventoryResult<Option<Tag>> {
        self.store()
            .query_one(
                "SELECT id, parent_id, tag FROM TagTree WHERE id = ?1",
                sql_params![tag_id],
            )?
            .as_ref()
            .map(decode_tag)
            .transpose()
    }

    /// Parent of a tag, if it has one
    pub fn tag_parent(&self, tag: &Tag) -> InventoryResult<Option<Tag>> {
        match tag.parent_id {
            Some(parent_id) => self.tag(parent_id),
            None => Ok(None),
        }
    }

    /// Rename a tag
    pub fn rename_tag(&self, tag_id: i64, new_name: &str) -> InventoryResult<()> {
        self.store().execute(
            "UPDATE TagTree SET tag = ?1 WHERE id = ?2",
            sql_params![new_name, tag_id],
        )?;
        debug!(tag_id, new_name, "Renamed tag");
        Ok(())
    }

    /// Every IPv4 allocation of an object
    pub fn ipv4_allocations(&self, object_id: i64) -> InventoryResult<Vec<Ipv4Allocation>> {
        self.store()
            .query_all(
                "SELECT object_id, ip, name, type FROM IPv4Allocation \
                 WHERE object_id = ?1 ORDER BY ip",
                sql_params![object_id],
            )?
            .iter()
            .map(|row| {
                Ok(Ipv4Allocation {
                    object_id: row.get_i64(0)?,
                    address: ipv4_from_stored(row.get_i64(1)?)?,
                    interface: row.get_string(2)?,
                    allocation_type: row.get_string(3)?,
                })
            })
            .collect()
    }

    /// Every IPv6 allocation of an object
    pub fn ipv6_allocations(&self, object_id: i64) -> InventoryResult<Vec<Ipv6Allocation>> {
        self.store()
            .query_all(
                "SELECT object_id, ip, name, type FROM IPv6Allocation \
                 WHERE object_id = ?1 ORDER BY ip",
                sql_params![object_id],
            )?
            .iter()
            .map(|row| {
                Ok(Ipv6Allocation {
                    object_id: row.get_i64(0)?,
                    address: ipv6_from_stored(&row.get_blob(1)?)?,
                    interface: row.get_string(2)?,
                    allocation_type: row.get_string(3)?,
                })
            })
            .collect()
    }

    /// Lazily walk every IPv4 network
    pub fn ipv4_networks(&self) -> KeysetCursor<'_, G, Ipv4Network> {
        KeysetCursor::new(
            self.store(),
            "SELECT id, ip, mask, name FROM IPv4Network WHERE id > ?1 ORDER BY id LIMIT ?2",
            self.page_size(),
            decode_network,
        )
    }
}
