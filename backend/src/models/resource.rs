//! Resource model
//!
//! A resource is where an entity ends up: the CPU for scheduling lessons, a
//! memory partition (cupboard compartment, parking slot, hospital bed) for
//! allocation lessons.
//!
//! Invariant for partitions:
//! `remaining_capacity == capacity - Σ size(occupants)` and never negative.
//!
//! A server holds at most one occupant. Its capacity counts logical servers,
//! not demand units, so `remaining_capacity` is 1 when idle and 0 when busy.

use crate::models::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Stable resource identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// What kind of service point a resource is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Single logical server (CPU)
    Server,
    /// Fixed-size container (memory partition)
    Partition,
}

#[derive(Debug, Error, PartialEq)]
pub enum ResourceError {
    #[error("Resource {id} has {available} free, {requested} requested")]
    InsufficientCapacity {
        id: ResourceId,
        requested: u64,
        available: u64,
    },

    #[error("Server {id} is already serving {occupant}")]
    ServerBusy { id: ResourceId, occupant: EntityId },

    #[error("Entity {entity} does not occupy resource {id}")]
    NotAnOccupant { id: ResourceId, entity: EntityId },

    #[error("Resource {id} violates invariant: {detail}")]
    InvariantViolated { id: ResourceId, detail: String },
}

/// A server or container entities are matched to
///
/// # Example
/// ```
/// use algorithm_judge_core_rs::{EntityId, Resource, ResourceId};
///
/// let mut slot = Resource::partition(ResourceId(1), "Block A", 100);
/// slot.admit(EntityId(7), 60).unwrap();
/// assert_eq!(slot.remaining_capacity(), 40);
/// assert!(!slot.can_fit(50));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    id: ResourceId,
    label: String,
    kind: ResourceKind,
    capacity: u64,
    remaining_capacity: u64,
    occupants: BTreeSet<EntityId>,
}

impl Resource {
    /// The single CPU of a scheduling lesson
    pub fn server(id: ResourceId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            kind: ResourceKind::Server,
            capacity: 1,
            remaining_capacity: 1,
            occupants: BTreeSet::new(),
        }
    }

    /// A memory partition of fixed capacity
    ///
    /// # Panics
    /// Panics if `capacity` is zero
    pub fn partition(id: ResourceId, label: impl Into<String>, capacity: u64) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            id,
            label: label.into(),
            kind: ResourceKind::Partition,
            capacity,
            remaining_capacity: capacity,
            occupants: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_server(&self) -> bool {
        self.kind == ResourceKind::Server
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn remaining_capacity(&self) -> u64 {
        self.remaining_capacity
    }

    pub fn occupants(&self) -> &BTreeSet<EntityId> {
        &self.occupants
    }

    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }

    /// The entity on a server, if any
    pub fn current_occupant(&self) -> Option<EntityId> {
        self.occupants.iter().next().copied()
    }

    /// Whether an entity of `size` could be admitted right now
    pub fn can_fit(&self, size: u64) -> bool {
        match self.kind {
            ResourceKind::Server => self.occupants.is_empty(),
            ResourceKind::Partition => self.remaining_capacity >= size,
        }
    }

    /// Admit an entity, consuming capacity
    pub fn admit(&mut self, entity: EntityId, size: u64) -> Result<(), ResourceError> {
        match self.kind {
            ResourceKind::Server => {
                if let Some(occupant) = self.current_occupant() {
                    return Err(ResourceError::ServerBusy {
                        id: self.id,
                        occupant,
                    });
                }
                self.remaining_capacity = 0;
            }
            ResourceKind::Partition => {
                if self.remaining_capacity < size {
                    return Err(ResourceError::InsufficientCapacity {
                        id: self.id,
                        requested: size,
                        available: self.remaining_capacity,
                    });
                }
                self.remaining_capacity -= size;
            }
        }
        self.occupants.insert(entity);
        Ok(())
    }

    /// Release an occupant, returning its capacity
    pub fn release(&mut self, entity: EntityId, size: u64) -> Result<(), ResourceError> {
        if !self.occupants.remove(&entity) {
            return Err(ResourceError::NotAnOccupant {
                id: self.id,
                entity,
            });
        }
        match self.kind {
            ResourceKind::Server => self.remaining_capacity = 1,
            ResourceKind::Partition => self.remaining_capacity += size,
        }
        Ok(())
    }

    /// Check capacity accounting against the sizes of the occupants
    pub fn validate(&self, occupant_sizes: u64) -> Result<(), ResourceError> {
        let consistent = match self.kind {
            ResourceKind::Server => {
                self.occupants.len() <= 1
                    && self.remaining_capacity == 1 - self.occupants.len() as u64
            }
            ResourceKind::Partition => {
                occupant_sizes <= self.capacity
                    && self.remaining_capacity == self.capacity - occupant_sizes
            }
        };
        if consistent {
            Ok(())
        } else {
            Err(ResourceError::InvariantViolated {
                id: self.id,
                detail: format!(
                    "remaining {} of {} with {} occupant(s) sized {}",
                    self.remaining_capacity,
                    self.capacity,
                    self.occupants.len(),
                    occupant_sizes
                ),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_holds_one_occupant() {
        let mut cpu = Resource::server(ResourceId(0), "CPU");
        cpu.admit(EntityId(1), 10).unwrap();
        assert_eq!(cpu.remaining_capacity(), 0);
        assert_eq!(
            cpu.admit(EntityId(2), 1),
            Err(ResourceError::ServerBusy {
                id: ResourceId(0),
                occupant: EntityId(1)
            })
        );

        cpu.release(EntityId(1), 10).unwrap();
        assert!(cpu.can_fit(1000));
    }

    #[test]
    fn test_partition_accepts_several_occupants() {
        let mut block = Resource::partition(ResourceId(2), "Block", 100);
        block.admit(EntityId(1), 30).unwrap();
        block.admit(EntityId(2), 70).unwrap();
        assert_eq!(block.remaining_capacity(), 0);
        assert!(block.validate(100).is_ok());
        assert!(block.validate(90).is_err());
    }

    #[test]
    fn test_release_unknown_occupant_fails() {
        let mut block = Resource::partition(ResourceId(2), "Block", 100);
        assert!(matches!(
            block.release(EntityId(9), 10),
            Err(ResourceError::NotAnOccupant { .. })
        ));
    }
}
