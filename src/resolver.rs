// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identity Resolver
//!
//! Translates human-facing identifiers into internal ids and back. A missing entity is
//! `Ok(None)`, never an error.
//!
//! Substring lookups (`attribute_id`, `dictionary_id`) return the lowest-id match and
//! do not report ambiguity.

use tracing::debug;

use crate::errors::{InventoryError, InventoryResult};
use crate::inventory::Inventory;
use crate::sql_params;
use crate::store::schema::OBJECT_TYPE_CHAPTER;
use crate::store::StoreGateway;

fn like_pattern(search: &str) -> String {
    format!("%{}%", search)
}

impl<G: StoreGateway> Inventory<G> {
    /// Object id by exact name
    pub fn object_id(&self, name: &str) -> InventoryResult<Option<i64>> {
        let id = self.query_id("SELECT id FROM Object WHERE name = ?1", sql_params![name])?;
        debug!(name, ?id, "Resolved object");
        Ok(id)
    }

    /// Object name by id
    pub fn object_name(&self, object_id: i64) -> InventoryResult<Option<String>> {
        self.object_text_column("name", object_id)
    }

    /// Object label by id
    pub fn object_label(&self, object_id: i64) -> InventoryResult<Option<String>> {
        self.object_text_column("label", object_id)
    }

    /// Object comment by id
    pub fn object_comment(&self, object_id: i64) -> InventoryResult<Option<String>> {
        self.object_text_column("comment", object_id)
    }

    fn object_text_column(&self, column: &str, object_id: i64) -> InventoryResult<Option<String>> {
        let sql = format!("SELECT {} FROM Object WHERE id = ?1", column);
        match self.store().query_one(&sql, sql_params![object_id])? {
            Some(row) => row.get_opt_string(0),
            None => Ok(None),
        }
    }

    /// Check if an object with this asset number exists
    pub fn object_exists_by_asset(&self, asset_no: &str) -> InventoryResult<bool> {
        Ok(self
            .query_id("SELECT id FROM Object WHERE asset_no = ?1", sql_params![asset_no])?
            .is_some())
    }

    /// Check if an object with this name and asset number exists
    pub fn object_exists_by_name_and_asset(
        &self,
        name: &str,
        asset_no: &str,
    ) -> InventoryResult<bool> {
        Ok(self
            .query_id(
                "SELECT id FROM Object WHERE name = ?1 AND asset_no = ?2",
                sql_params![name, asset_no],
            )?
            .is_some())
    }

    /// Port id by owning object and interface name
    pub fn port_id(&self, object_id: i64, name: &str) -> InventoryResult<Option<i64>> {
        self.query_id(
            "SELECT id FROM Port WHERE object_id = ?1 AND name = ?2",
            sql_params![object_id, name],
        )
    }

    /// Interface name if the object has an interface with that name
    pub fn port_name(&self, object_id: i64, name: &str) -> InventoryResult<Option<String>> {
        match self.store().query_one(
            "SELECT name FROM Port WHERE object_id = ?1 AND name = ?2",
            sql_params![object_id, name],
        )? {
            Some(row) => row.get_opt_string(0),
            None => Ok(None),
        }
    }

    /// First attribute whose name contains `search`
    pub fn attribute_id(&self, search: &str) -> InventoryResult<Option<i64>> {
        self.query_id(
            "SELECT id FROM Attribute WHERE name LIKE ?1 ORDER BY id LIMIT 1",
            sql_params![like_pattern(search)],
        )
    }

    /// First dictionary entry whose label contains `search`
    pub fn dictionary_id(&self, search: &str) -> InventoryResult<Option<i64>> {
        self.query_id(
            "SELECT dict_key FROM Dictionary WHERE dict_value LIKE ?1 ORDER BY dict_key LIMIT 1",
            sql_params![like_pattern(search)],
        )
    }

    /// Every `(dict_key, label)` of the ObjectType chapter
    ///
    /// Fails with [`InventoryError::MissingChapter`] when the chapter itself is absent.
    pub fn object_types(&self) -> InventoryResult<Vec<(i64, String)>> {
        let chapter_id = self
            .query_id(
                "SELECT id FROM Chapter WHERE name = ?1",
                sql_params![OBJECT_TYPE_CHAPTER],
            )?
            .ok_or_else(|| InventoryError::MissingChapter(OBJECT_TYPE_CHAPTER.to_string()))?;

        self.store()
            .query_all(
                "SELECT dict_key, dict_value FROM Dictionary WHERE chapter_id = ?1 ORDER BY dict_key",
                sql_params![chapter_id],
            )?
            .iter()
            .map(|row| Ok((row.get_i64(0)?, row.get_opt_string(1)?.unwrap_or_default())))
            .collect()
    }

    /// Object type id by exact label
    pub fn object_type_id(&self, label: &str) -> InventoryResult<Option<i64>> {
        Ok(self
            .object_types()?
            .into_iter()
            .find(|(_, value)| value == label)
            .map(|(key, _)| key))
    }
}
