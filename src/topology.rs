// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Linker
//!
//! Ports, physical links between ports, and parent → child entity links between objects
//! (chassis → blade, hypervisor → virtual machine).
//!
//! Invariants backed by the schema:
//! - a port appears in at most one `Link` row, stored with `porta < portb`
//! - a child object appears in at most one `EntityLink` row
//!
//! Re-linking updates the existing row in place instead of inserting a second one. Each
//! write runs in one atomic unit with its log entries.

use tracing::{debug, info, warn};

use crate::domain::{
    AttributeValue, EntityLink, Link, LinkOutcome, ParentOutcome, Port, ENTITY_OBJECT,
};
use crate::errors::InventoryResult;
use crate::inventory::Inventory;
use crate::sql_params;
use crate::store::{Row, StoreGateway};

/// Interface id given to ports created on first reference
pub const DEFAULT_IIF_ID: i64 = 1;

/// Port type given to ports created on first reference (1000Base-T)
pub const DEFAULT_PORT_TYPE: i64 = 24;

/// Object type id used when writing the blade slot attribute
pub const SERVER_OBJECT_TYPE: i64 = 4;

/// Attribute holding the hardware type
pub const HW_TYPE_ATTRIBUTE_ID: i64 = 2;

/// Hardware type dictionary key of server chassis
pub const SERVER_CHASSIS_HW_TYPE: i64 = 994;

const SLOT_ATTRIBUTE: &str = "Slot number";

/// Which relation a parent/child link expresses; only affects log wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Generic,
    Chassis,
    Hypervisor,
}

impl Placement {
    fn linked_on_parent(self, child: &str) -> String {
        match self {
            Placement::Generic => format!("Linked with {}", child),
            Placement::Chassis => format!("Linked with server {}", child),
            Placement::Hypervisor => format!("Linked virtual {} with hypervisor", child),
        }
    }

    fn linked_on_child(self, parent: &str) -> String {
        match self {
            Placement::Generic => format!("Linked with {}", parent),
            Placement::Chassis => format!("Linked with Blade Chassis {}", parent),
            Placement::Hypervisor => format!("Linked with hypervisor {}", parent),
        }
    }

    fn unlinked_on_parent(self, child: &str) -> String {
        match self {
            Placement::Generic => format!("Unlinked {}", child),
            Placement::Chassis => format!("Unlinked server {}", child),
            Placement::Hypervisor => format!("Unlinked virtual {}", child),
        }
    }

    fn unlinked_on_child(self, old_parent: &str) -> String {
        match self {
            Placement::Generic => format!("Unlinked from {}", old_parent),
            Placement::Chassis => format!("Unlinked from Blade Chassis {}", old_parent),
            Placement::Hypervisor => format!("Unlinked from hypervisor {}", old_parent),
        }
    }
}

fn decode_port(row: &Row) -> InventoryResult<Port> {
    Ok(Port {
        id: row.get_i64(0)?,
        object_id: row.get_i64(1)?,
        name: row.get_string(2)?,
        iif_id: row.get_i64(3)?,
        type_id: row.get_i64(4)?,
    })
}

impl<G: StoreGateway> Inventory<G> {
    /// Port id of a named interface, creating the port on first reference
    pub fn update_network_interface(&self, object_id: i64, name: &str) -> InventoryResult<i64> {
        self.atomically(|| {
            if let Some(id) = self.port_id(object_id, name)? {
                return Ok(id);
            }

            let id = self.insert(
                "INSERT INTO Port (object_id, name, iif_id, type) VALUES (?1, ?2, ?3, ?4)",
                sql_params![object_id, name, DEFAULT_IIF_ID, DEFAULT_PORT_TYPE],
            )?;
            self.insert_log(object_id, format!("Added interface {}", name))?;
            Ok(id)
        })
    }

    /// Fetch one port
    pub fn port(&self, port_id: i64) -> InventoryResult<Option<Port>> {
        self.store()
            .query_one(
                "SELECT id, object_id, name, iif_id, type FROM Port WHERE id = ?1",
                sql_params![port_id],
            )?
            .as_ref()
            .map(decode_port)
            .transpose()
    }

    /// Every port of an object, by name
    pub fn ports(&self, object_id: i64) -> InventoryResult<Vec<Port>> {
        self.store()
            .query_all(
                "SELECT id, object_id, name, iif_id, type FROM Port \
                 WHERE object_id = ?1 ORDER BY name",
                sql_params![object_id],
            )?
            .iter()
            .map(decode_port)
            .collect()
    }

    /// The link row touching a port, if any
    pub fn port_link(&self, port_id: i64) -> InventoryResult<Option<Link>> {
        match self.store().query_one(
            "SELECT porta, portb FROM Link WHERE porta = ?1 OR portb = ?1",
            sql_params![port_id],
        )? {
            Some(row) => Ok(Some(Link {
                porta: row.get_i64(0)?,
                portb: row.get_i64(1)?,
            })),
            None => Ok(None),
        }
    }

    /// The port on the far end of a port's link
    pub fn port_peer(&self, port_id: i64) -> InventoryResult<Option<i64>> {
        Ok(self
            .port_link(port_id)?
            .and_then(|link| link.peer_of(port_id)))
    }

    /// Connect a local interface to an interface on a named peer object
    ///
    /// Rewiring a port that is already linked elsewhere updates its row and logs the old
    /// and new peer on the local object. A peer port that is itself linked to a third port
    /// makes the store reject the write.
    pub fn link_ports(
        &self,
        object_id: i64,
        interface: &str,
        peer_object_name: &str,
        peer_interface: &str,
    ) -> InventoryResult<LinkOutcome> {
        let Some(local) = self.port_id(object_id, interface)? else {
            debug!(object_id, interface, "Link skipped: local port not found");
            return Ok(LinkOutcome::Unresolved);
        };
        let Some(peer_object) = self.object_id(peer_object_name)? else {
            debug!(peer_object_name, "Link skipped: peer object not found");
            return Ok(LinkOutcome::Unresolved);
        };
        let Some(peer) = self.port_id(peer_object, peer_interface)? else {
            debug!(peer_object_name, peer_interface, "Link skipped: peer port not found");
            return Ok(LinkOutcome::Unresolved);
        };
        if local == peer {
            return Ok(LinkOutcome::Unresolved);
        }

        self.atomically(|| {
            let wanted = Link::between(local, peer);
            let Some(existing) = self.port_link(local)? else {
                self.store().execute(
                    "INSERT INTO Link (porta, portb) VALUES (?1, ?2)",
                    sql_params![wanted.porta, wanted.portb],
                )?;
                self.insert_log(
                    object_id,
                    format!(
                        "Linked {} with {} -> {}",
                        interface, peer_object_name, peer_interface
                    ),
                )?;
                return Ok(LinkOutcome::Linked);
            };

            if existing == wanted {
                return Ok(LinkOutcome::AlreadyLinked);
            }

            let (old_object, old_port) = match existing.peer_of(local) {
                Some(old_peer) => self.port_owner(old_peer)?,
                None => (String::new(), String::new()),
            };

            self.store().execute(
                "UPDATE Link SET porta = ?1, portb = ?2 WHERE porta = ?3 AND portb = ?4",
                sql_params![wanted.porta, wanted.portb, existing.porta, existing.portb],
            )?;
            self.insert_log(
                object_id,
                format!(
                    "Changed link from {} -> {} to {} -> {}",
                    old_object, old_port, peer_object_name, peer_interface
                ),
            )?;
            Ok(LinkOutcome::Linked)
        })
    }

    /// Object name and port name of a port, for log messages
    fn port_owner(&self, port_id: i64) -> InventoryResult<(String, String)> {
        match self.store().query_one(
            "SELECT o.name, p.name FROM Port p LEFT JOIN Object o ON o.id = p.object_id \
             WHERE p.id = ?1",
            sql_params![port_id],
        )? {
            Some(row) => Ok((
                row.get_opt_string(0)?.unwrap_or_default(),
                row.get_string(1)?,
            )),
            None => Ok((String::new(), format!("#{}", port_id))),
        }
    }

    /// The entity link placing `child_id` under a parent, if any
    pub fn entity_link(&self, child_id: i64) -> InventoryResult<Option<EntityLink>> {
        match self.store().query_one(
            "SELECT id, parent_entity_id, child_entity_id FROM EntityLink \
             WHERE child_entity_type = ?1 AND child_entity_id = ?2",
            sql_params![ENTITY_OBJECT, child_id],
        )? {
            Some(row) => Ok(Some(EntityLink {
                id: row.get_i64(0)?,
                parent_id: row.get_i64(1)?,
                child_id: row.get_i64(2)?,
            })),
            None => Ok(None),
        }
    }

    /// Parent object of a child
    pub fn entity_parent(&self, child_id: i64) -> InventoryResult<Option<i64>> {
        Ok(self.entity_link(child_id)?.map(|link| link.parent_id))
    }

    /// Child objects of a parent
    pub fn entity_children(&self, parent_id: i64) -> InventoryResult<Vec<i64>> {
        self.query_ids(
            "SELECT child_entity_id FROM EntityLink \
             WHERE parent_entity_type = ?1 AND parent_entity_id = ?2 AND child_entity_type = ?1 \
             ORDER BY id",
            sql_params![ENTITY_OBJECT, parent_id],
        )
    }

    /// Place a named child object under a named parent object
    pub fn assign_to_parent(
        &self,
        parent_name: &str,
        child_name: &str,
    ) -> InventoryResult<ParentOutcome> {
        self.assign_by_name(parent_name, child_name, Placement::Generic)
    }

    /// Put a VM under a hypervisor
    pub fn link_virtual_hypervisor(
        &self,
        hypervisor_id: i64,
        virtual_id: i64,
    ) -> InventoryResult<ParentOutcome> {
        if self.object(hypervisor_id)?.is_none() || self.object(virtual_id)?.is_none() {
            return Ok(ParentOutcome::Unresolved);
        }
        self.place_under(hypervisor_id, virtual_id, Placement::Hypervisor)
    }

    /// Seat a server in a blade chassis slot
    ///
    /// The slot number is written to the server's "Slot number" attribute first. A
    /// failure of that write is logged and ignored so the chassis link still happens.
    pub fn assign_chassis_slot(
        &self,
        chassis_name: &str,
        slot: &str,
        server_name: &str,
    ) -> InventoryResult<ParentOutcome> {
        let Some(server_id) = self.object_id(server_name)? else {
            return Ok(ParentOutcome::Unresolved);
        };
        if self.object_id(chassis_name)?.is_none() {
            return Ok(ParentOutcome::Unresolved);
        }

        let written = self.attribute_id(SLOT_ATTRIBUTE).and_then(|attr| match attr {
            Some(attr_id) => self
                .set_attribute(
                    server_id,
                    SERVER_OBJECT_TYPE,
                    attr_id,
                    AttributeValue::from(slot),
                )
                .map(Some),
            None => Ok(None),
        });
        match written {
            Ok(Some(write)) => debug!(server_id, slot, ?write, "Slot attribute written"),
            Ok(None) => warn!(server_name, "No slot attribute defined, slot not recorded"),
            Err(e) => warn!(server_name, slot, error = %e, "Failed to write slot attribute"),
        }

        self.assign_by_name(chassis_name, server_name, Placement::Chassis)
    }

    /// Objects whose hardware type is a server chassis
    pub fn server_chassis_ids(&self) -> InventoryResult<Vec<i64>> {
        self.query_ids(
            "SELECT object_id FROM AttributeValue \
             WHERE attr_id = ?1 AND uint_value = ?2 ORDER BY object_id",
            sql_params![HW_TYPE_ATTRIBUTE_ID, SERVER_CHASSIS_HW_TYPE],
        )
    }

    fn assign_by_name(
        &self,
        parent_name: &str,
        child_name: &str,
        placement: Placement,
    ) -> InventoryResult<ParentOutcome> {
        let (Some(parent_id), Some(child_id)) =
            (self.object_id(parent_name)?, self.object_id(child_name)?)
        else {
            debug!(parent_name, child_name, "Parent link skipped: object not found");
            return Ok(ParentOutcome::Unresolved);
        };
        self.place_under(parent_id, child_id, placement)
    }

    fn display_name(&self, object_id: i64) -> InventoryResult<String> {
        Ok(self
            .object_name(object_id)?
            .unwrap_or_else(|| format!("#{}", object_id)))
    }

    fn place_under(
        &self,
        parent_id: i64,
        child_id: i64,
        placement: Placement,
    ) -> InventoryResult<ParentOutcome> {
        if parent_id == child_id {
            return Ok(ParentOutcome::Unresolved);
        }

        self.atomically(|| {
            let parent = self.display_name(parent_id)?;
            let child = self.display_name(child_id)?;

            match self.entity_link(child_id)? {
                None => {
                    self.store().execute(
                        "INSERT INTO EntityLink \
                         (parent_entity_type, parent_entity_id, child_entity_type, child_entity_id) \
                         VALUES (?1, ?2, ?1, ?3)",
                        sql_params![ENTITY_OBJECT, parent_id, child_id],
                    )?;
                    info!(parent_id, child_id, "Entity linked");
                    self.insert_log(parent_id, placement.linked_on_parent(&child))?;
                    self.insert_log(child_id, placement.linked_on_child(&parent))?;
                    Ok(ParentOutcome::Linked)
                }
                Some(link) if link.parent_id == parent_id => Ok(ParentOutcome::Unchanged),
                Some(link) => {
                    let previous_parent = link.parent_id;
                    let old_parent = self.display_name(previous_parent)?;

                    self.store().execute(
                        "UPDATE EntityLink SET parent_entity_id = ?1 WHERE id = ?2",
                        sql_params![parent_id, link.id],
                    )?;
                    info!(parent_id, child_id, previous_parent, "Entity relinked");
                    self.insert_log(previous_parent, placement.unlinked_on_parent(&child))?;
                    self.insert_log(child_id, placement.unlinked_on_child(&old_parent))?;
                    self.insert_log(parent_id, placement.linked_on_parent(&child))?;
                    self.insert_log(child_id, placement.linked_on_child(&parent))?;
                    Ok(ParentOutcome::Relinked { previous_parent })
                }
            }
        })
    }
}
