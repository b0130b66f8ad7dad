// Copyright (c) 2025 - Cowboy AI, Inc.
//! Virtual Inventory Reconciler
//!
//! Converges a hypervisor's set of child VMs towards a desired list of names by deleting
//! the entity links of VMs that are no longer wanted. VMs named in the list but not yet
//! linked are left alone; use [`Inventory::link_virtual_hypervisor`] to add them.
//! The removals and their log entries commit together.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::ENTITY_OBJECT;
use crate::errors::InventoryResult;
use crate::inventory::Inventory;
use crate::sql_params;
use crate::store::StoreGateway;

impl<G: StoreGateway> Inventory<G> {
    /// Unlink every child of the hypervisor whose name is not in `desired`
    ///
    /// Names that resolve to no object are skipped. Returns the ids of the unlinked VMs.
    pub fn reconcile_virtuals<S: AsRef<str>>(
        &self,
        hypervisor_id: i64,
        desired: &[S],
    ) -> InventoryResult<Vec<i64>> {
        let mut wanted = HashSet::new();
        for name in desired {
            match self.object_id(name.as_ref())? {
                Some(id) => {
                    wanted.insert(id);
                }
                None => debug!(name = name.as_ref(), "Desired virtual not found, skipped"),
            }
        }

        self.atomically(|| {
            let stale: Vec<i64> = self
                .entity_children(hypervisor_id)?
                .into_iter()
                .filter(|id| !wanted.contains(id))
                .collect();

            for child_id in &stale {
                let name = self
                    .object_name(*child_id)?
                    .unwrap_or_else(|| format!("#{}", child_id));
                self.store().execute(
                    "DELETE FROM EntityLink \
                     WHERE parent_entity_type = ?1 AND parent_entity_id = ?2 \
                       AND child_entity_type = ?1 AND child_entity_id = ?3",
                    sql_params![ENTITY_OBJECT, hypervisor_id, *child_id],
                )?;
                self.insert_log(hypervisor_id, format!("Removed virtual {}", name))?;
            }
            Ok(stale)
        })
    }
}
