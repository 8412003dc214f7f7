//! Live entity records: field values plus the key the server is known to hold them under.

use crate::error::{RoaError, RoaResult};
use crate::schema::EntityType;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct EntityInstance {
    entity: Arc<EntityType>,
    values: Map<String, Value>,
    confirmed_pk: Option<Value>,
}

impl EntityInstance {
    pub fn new(entity: &Arc<EntityType>) -> RoaResult<Self> {
        if entity.is_abstract() {
            return Err(RoaError::Abstract {
                entity: entity.key().to_string(),
            });
        }
        Ok(EntityInstance {
            entity: entity.clone(),
            values: Map::new(),
            confirmed_pk: None,
        })
    }

    pub(crate) fn from_values(entity: Arc<EntityType>, values: Map<String, Value>) -> Self {
        EntityInstance {
            entity,
            values,
            confirmed_pk: None,
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn entity(&self) -> &Arc<EntityType> {
        &self.entity
    }

    /// Primary key of the instance's own type; null counts as absent.
    pub fn pk(&self) -> Option<&Value> {
        self.pk_for(&self.entity)
    }

    /// Primary key as seen by `level` (the instance's type or one of its ancestors).
    pub fn pk_for(&self, level: &EntityType) -> Option<&Value> {
        level
            .pk_name()
            .and_then(|name| self.values.get(name))
            .filter(|v| !v.is_null())
    }

    pub(crate) fn set_pk_for(&mut self, level: &EntityType, value: Value) {
        if let Some(name) = level.pk_name() {
            self.values.insert(name.to_string(), value);
        }
    }

    pub(crate) fn clear_pk(&mut self) {
        if let Some(name) = self.entity.pk_name() {
            self.values.shift_remove(name);
        }
        self.confirmed_pk = None;
    }

    /// True while the primary key is the one the server last confirmed, by a successful
    /// save or a read. Changing or clearing the key drops the confirmation.
    pub fn is_persisted(&self) -> bool {
        match (&self.confirmed_pk, self.pk()) {
            (Some(confirmed), Some(pk)) => confirmed == pk,
            _ => false,
        }
    }

    pub(crate) fn mark_persisted(&mut self) {
        self.confirmed_pk = self.pk().cloned();
    }
}

impl fmt::Display for EntityInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pk() {
            Some(pk) => write!(f, "{} object ({})", self.entity.name(), pk),
            None => write!(f, "{} object (None)", self.entity.name()),
        }
    }
}

impl fmt::Debug for EntityInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityInstance")
            .field("entity", &self.entity.key().to_string())
            .field("values", &self.values)
            .field("persisted", &self.is_persisted())
            .finish()
    }
}
