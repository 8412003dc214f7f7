//! Save lifecycle observers, registered globally or per entity type.

use crate::schema::{EntityInstance, EntityKey, EntityType};
use std::collections::HashMap;
use std::sync::Arc;

/// Fired before the remote write. `sender` is the type the caller saved (a proxy stays a proxy).
pub struct PreSave<'a> {
    pub sender: &'a Arc<EntityType>,
    pub instance: &'a EntityInstance,
    pub raw: bool,
}

/// Fired after the write with the instance decoded from the response.
pub struct PostSave<'a> {
    pub sender: &'a Arc<EntityType>,
    pub instance: &'a EntityInstance,
    pub created: bool,
    pub raw: bool,
}

/// Both hooks default to no-ops; implement the ones you need.
pub trait SaveObserver: Send + Sync {
    fn pre_save(&self, _event: &PreSave<'_>) {}

    fn post_save(&self, _event: &PostSave<'_>) {}
}

#[derive(Clone, Default)]
pub struct Signals {
    global: Vec<Arc<dyn SaveObserver>>,
    per_type: HashMap<EntityKey, Vec<Arc<dyn SaveObserver>>>,
}

impl Signals {
    pub fn connect(&mut self, observer: Arc<dyn SaveObserver>) {
        self.global.push(observer);
    }

    /// Observe saves whose sender is `key`.
    pub fn connect_for(&mut self, key: EntityKey, observer: Arc<dyn SaveObserver>) {
        self.per_type.entry(key).or_default().push(observer);
    }

    fn observers<'a>(&'a self, sender: &EntityType) -> impl Iterator<Item = &'a Arc<dyn SaveObserver>> + 'a {
        let scoped = self.per_type.get(sender.key()).into_iter().flatten();
        self.global.iter().chain(scoped)
    }

    pub fn pre_save(&self, event: &PreSave<'_>) {
        for observer in self.observers(event.sender) {
            observer.pre_save(event);
        }
    }

    pub fn post_save(&self, event: &PostSave<'_>) {
        for observer in self.observers(event.sender) {
            observer.post_save(event);
        }
    }
}
