//! Lookup table of built entity types, plus the "type ready" broadcast.

use crate::error::{ConfigError, RoaResult};
use crate::schema::builder::{build_entity, BuiltType};
use crate::schema::{EntityDeclaration, EntityKey, EntityType};
use std::collections::HashMap;
use std::sync::Arc;

/// Notified once per concrete type, after it is registered.
pub trait TypeReadyListener: Send + Sync {
    fn type_ready(&self, entity: &Arc<EntityType>);
}

#[derive(Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityKey, Arc<EntityType>>,
    order: Vec<EntityKey>,
    accessors: HashMap<EntityKey, Vec<String>>,
    /// Order accessors waiting for their target type to be registered.
    pending_accessors: HashMap<EntityKey, Vec<String>>,
    listeners: Vec<Arc<dyn TypeReadyListener>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a declaration. Concrete types are registered; building the same key twice
    /// returns the type registered first.
    pub fn build(&mut self, decl: &EntityDeclaration) -> RoaResult<BuiltType> {
        build_entity(self, decl)
    }

    pub fn get(&self, key: &EntityKey) -> Option<Arc<EntityType>> {
        self.entities.get(key).cloned()
    }

    /// Find a type by its settings key, e.g. `shop.restaurant`.
    pub fn get_by_lookup(&self, lookup: &str) -> Option<Arc<EntityType>> {
        self.order
            .iter()
            .find(|key| key.lookup_key() == lookup)
            .and_then(|key| self.entities.get(key).cloned())
    }

    /// Registered types in registration order.
    pub fn entities(&self) -> Vec<Arc<EntityType>> {
        self.order.iter().filter_map(|k| self.entities.get(k).cloned()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Order helpers installed on `key` (`get_next_in_order`, `get_<child>_order`, ...).
    pub fn accessors(&self, key: &EntityKey) -> &[String] {
        self.accessors.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_listener(&mut self, listener: Arc<dyn TypeReadyListener>) {
        self.listeners.push(listener);
    }

    pub(crate) fn register(&mut self, entity: EntityType) -> RoaResult<Arc<EntityType>> {
        let key = entity.key().clone();
        let mut target_accessors = None;
        if let Some(field_name) = &entity.options().order_with_respect_to {
            let target = entity
                .field(field_name)
                .and_then(|f| f.kind.related())
                .cloned()
                .ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "{}: order_with_respect_to '{}' is not a relation field",
                        key, field_name
                    ))
                })?;
            let model = key.model_name();
            target_accessors = Some((target, vec![format!("get_{}_order", model), format!("set_{}_order", model)]));
        }

        let entity = Arc::new(entity);
        self.entities.insert(key.clone(), entity.clone());
        self.order.push(key.clone());

        if let Some((target, names)) = target_accessors {
            self.accessors
                .entry(key.clone())
                .or_default()
                .extend(["get_next_in_order".to_string(), "get_previous_in_order".to_string()]);
            if self.entities.contains_key(&target) {
                self.accessors.entry(target).or_default().extend(names);
            } else {
                self.pending_accessors.entry(target).or_default().extend(names);
            }
        }
        if let Some(pending) = self.pending_accessors.remove(&key) {
            self.accessors.entry(key.clone()).or_default().extend(pending);
        }

        tracing::debug!(entity = %key, fields = ?entity.field_names(), "entity type registered");
        for listener in &self.listeners {
            listener.type_ready(&entity);
        }
        Ok(entity)
    }
}
