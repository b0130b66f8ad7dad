// Copyright (c) 2025 - Cowboy AI, Inc.
//! Attribute Reconciler
//!
//! Upserts typed attribute values keyed by `(object_id, object_tid, attr_id)`. The stored
//! row keeps a string column and a numeric column; whichever one is populated fixes the
//! attribute's type. A request of the other type is refused rather than coerced.
//!
//! Nothing here writes to the object log.

use tracing::debug;

use crate::domain::{AttributeValue, AttributeWrite};
use crate::errors::{InventoryError, InventoryResult};
use crate::inventory::Inventory;
use crate::sql_params;
use crate::store::{Row, StoreGateway, Value};

fn number_to_stored(value: u64) -> InventoryResult<i64> {
    i64::try_from(value).map_err(|_| {
        InventoryError::ValueOutOfRange(format!("attribute value {} exceeds store range", value))
    })
}

/// Column name and bound value for a requested attribute value
fn column_for(value: &AttributeValue) -> InventoryResult<(&'static str, Value)> {
    match value {
        AttributeValue::String(s) => Ok(("string_value", Value::from(s))),
        AttributeValue::Number(n) => Ok(("uint_value", Value::from(number_to_stored(*n)?))),
    }
}

fn decode_stored(row: &Row) -> InventoryResult<Option<AttributeValue>> {
    if let Some(s) = row.get_opt_string(0)? {
        return Ok(Some(AttributeValue::String(s)));
    }
    match row.get_opt_i64(1)? {
        Some(n) => u64::try_from(n)
            .map(|n| Some(AttributeValue::Number(n)))
            .map_err(|_| InventoryError::RowDecode(format!("negative attribute value {}", n))),
        None => Ok(None),
    }
}

impl<G: StoreGateway> Inventory<G> {
    /// Insert or update one attribute value
    ///
    /// Writing the value already stored is a no-op. Writing a value of the other type
    /// than the stored one leaves the row untouched and returns
    /// [`AttributeWrite::TypeMismatch`].
    pub fn set_attribute(
        &self,
        object_id: i64,
        object_tid: i64,
        attr_id: i64,
        value: AttributeValue,
    ) -> InventoryResult<AttributeWrite> {
        let (column, bound) = column_for(&value)?;

        let existing = self.store().query_one(
            "SELECT string_value, uint_value FROM AttributeValue \
             WHERE object_id = ?1 AND object_tid = ?2 AND attr_id = ?3",
            sql_params![object_id, object_tid, attr_id],
        )?;

        let Some(row) = existing else {
            let sql = format!(
                "INSERT INTO AttributeValue (object_id, object_tid, attr_id, {}) \
                 VALUES (?1, ?2, ?3, ?4)",
                column
            );
            self.store()
                .execute(&sql, &[object_id.into(), object_tid.into(), attr_id.into(), bound])?;
            debug!(object_id, attr_id, %value, "Inserted attribute value");
            return Ok(AttributeWrite::Inserted);
        };

        match decode_stored(&row)? {
            Some(stored) if stored == value => return Ok(AttributeWrite::Unchanged),
            Some(stored) if !stored.same_kind(&value) => {
                debug!(
                    object_id,
                    attr_id,
                    stored = stored.kind(),
                    requested = value.kind(),
                    "Attribute type mismatch, not updated"
                );
                return Ok(AttributeWrite::TypeMismatch);
            }
            // same kind with a different value, or a row that has no value yet
            _ => {}
        }

        let sql = format!(
            "UPDATE AttributeValue SET {} = ?1 \
             WHERE object_id = ?2 AND object_tid = ?3 AND attr_id = ?4",
            column
        );
        self.store()
            .execute(&sql, &[bound, object_id.into(), object_tid.into(), attr_id.into()])?;
        debug!(object_id, attr_id, %value, "Updated attribute value");
        Ok(AttributeWrite::Updated)
    }

    /// Stored attribute value, if any
    pub fn attribute(
        &self,
        object_id: i64,
        object_tid: i64,
        attr_id: i64,
    ) -> InventoryResult<Option<AttributeValue>> {
        match self.store().query_one(
            "SELECT string_value, uint_value FROM AttributeValue \
             WHERE object_id = ?1 AND object_tid = ?2 AND attr_id = ?3",
            sql_params![object_id, object_tid, attr_id],
        )? {
            Some(row) => decode_stored(&row),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use crate::domain::{AttributeValue, AttributeWrite};
    use crate::errors::InventoryError;
    use crate::inventory::testing::{memory_inventory, object, SERVER};
    use crate::sql_params;
    use crate::store::StoreGateway;

    fn row_count(inv: &crate::inventory::Inventory<crate::store::SqliteGateway>) -> i64 {
        inv.store()
            .query_one("SELECT COUNT(*) FROM AttributeValue", sql_params![])
            .unwrap()
            .unwrap()
            .get_i64(0)
            .unwrap()
    }

    #[test_case(AttributeValue::from("HP BL460c") ; "string value")]
    #[test_case(AttributeValue::from(994u64) ; "number value")]
    fn test_second_identical_write_is_a_no_op(value: AttributeValue) {
        let inv = memory_inventory();
        let id = object(&inv, "blade01", SERVER);

        assert_eq!(
            inv.set_attribute(id, SERVER, 2, value.clone()).unwrap(),
            AttributeWrite::Inserted
        );
        assert_eq!(
            inv.set_attribute(id, SERVER, 2, value.clone()).unwrap(),
            AttributeWrite::Unchanged
        );
        assert_eq!(row_count(&inv), 1);
        assert_eq!(inv.attribute(id, SERVER, 2).unwrap(), Some(value));
    }

    #[test]
    fn test_changed_value_is_updated() {
        let inv = memory_inventory();
        let id = object(&inv, "blade01", SERVER);

        inv.set_attribute(id, SERVER, 1, AttributeValue::Number(3)).unwrap();
        assert_eq!(
            inv.set_attribute(id, SERVER, 1, AttributeValue::Number(4)).unwrap(),
            AttributeWrite::Updated
        );
        assert_eq!(
            inv.attribute(id, SERVER, 1).unwrap(),
            Some(AttributeValue::Number(4))
        );
        assert_eq!(row_count(&inv), 1);
    }

    #[test]
    fn test_type_is_fixed_by_first_value() {
        let inv = memory_inventory();
        let id = object(&inv, "blade01", SERVER);

        inv.set_attribute(id, SERVER, 1, AttributeValue::Number(3)).unwrap();
        assert_eq!(
            inv.set_attribute(id, SERVER, 1, AttributeValue::from("3")).unwrap(),
            AttributeWrite::TypeMismatch
        );
        assert_eq!(
            inv.attribute(id, SERVER, 1).unwrap(),
            Some(AttributeValue::Number(3))
        );
    }

    #[test]
    fn test_row_without_value_takes_requested_value() {
        let inv = memory_inventory();
        inv.store()
            .execute(
                "INSERT INTO AttributeValue (object_id, object_tid, attr_id) VALUES (1, 4, 1)",
                sql_params![],
            )
            .unwrap();

        assert_eq!(inv.attribute(1, SERVER, 1).unwrap(), None);
        assert_eq!(
            inv.set_attribute(1, SERVER, 1, AttributeValue::from("x")).unwrap(),
            AttributeWrite::Updated
        );
        assert_eq!(
            inv.attribute(1, SERVER, 1).unwrap(),
            Some(AttributeValue::from("x"))
        );
    }

    #[test]
    fn test_out_of_range_number() {
        let inv = memory_inventory();
        let err = inv
            .set_attribute(1, SERVER, 1, AttributeValue::Number(u64::MAX))
            .unwrap_err();
        assert!(matches!(err, InventoryError::ValueOutOfRange(_)));
        assert_eq!(row_count(&inv), 0);
    }

    #[test]
    fn test_no_log_written() {
        let inv = memory_inventory();
        let id = object(&inv, "blade01", SERVER);
        inv.set_attribute(id, SERVER, 1, AttributeValue::Number(3)).unwrap();
        assert!(inv.object_log(id).unwrap().is_empty());
    }
}
