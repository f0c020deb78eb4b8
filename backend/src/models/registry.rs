//! Entity and resource registries
//!
//! The registries are the only mutable model state of a run. The engine owns
//! them; callers outside the crate see them through read-only snapshots.
//!
//! # Critical Invariants
//!
//! 1. **Id uniqueness**: each entity and resource id appears once
//! 2. **No removal**: terminal entities stay registered
//! 3. **Declaration order**: resources keep the order they were configured in,
//!    which First-Fit depends on

use crate::models::entity::{Entity, EntityId, EntityStatus};
use crate::models::resource::{Resource, ResourceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Duplicate entity id {0}")]
    DuplicateEntity(EntityId),

    #[error("Duplicate resource id {0}")]
    DuplicateResource(ResourceId),
}

/// Every entity of the run, ordered by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new entity
    pub fn insert(&mut self, entity: Entity) -> Result<(), RegistryError> {
        if self.entities.contains_key(&entity.id()) {
            return Err(RegistryError::DuplicateEntity(entity.id()));
        }
        self.entities.insert(entity.id(), entity);
        Ok(())
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// All entities in id order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities waiting at `now`, in id order
    pub fn eligible(&self, now: u64) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(move |e| e.is_eligible(now))
    }

    /// The entity currently holding a server, if any
    pub fn in_service(&self) -> Option<&Entity> {
        self.entities
            .values()
            .find(|e| e.status() == EntityStatus::InService)
    }

    pub fn count_with_status(&self, status: EntityStatus) -> usize {
        self.entities
            .values()
            .filter(|e| e.status() == status)
            .count()
    }

    /// True once every registered entity is completed or rejected
    pub fn all_terminal(&self) -> bool {
        self.entities.values().all(Entity::is_terminal)
    }

    /// Smallest size among entities still needing a decision
    pub fn smallest_outstanding_size(&self) -> Option<u64> {
        self.entities
            .values()
            .filter(|e| !e.is_terminal())
            .map(Entity::size)
            .min()
    }
}

/// Every resource of the run, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRegistry {
    resources: Vec<Resource>,
}

impl ResourceRegistry {
    /// Build from resources in their enumeration order
    pub fn new(resources: Vec<Resource>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for resource in resources {
            registry.push(resource)?;
        }
        Ok(registry)
    }

    fn push(&mut self, resource: Resource) -> Result<(), RegistryError> {
        if self.get(resource.id()).is_some() {
            return Err(RegistryError::DuplicateResource(resource.id()));
        }
        self.resources.push(resource);
        Ok(())
    }

    pub fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.id() == id)
    }

    /// Resources in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// The first server, for single-server scheduling lessons
    pub fn server(&self) -> Option<&Resource> {
        self.resources.iter().find(|r| r.is_server())
    }
}
