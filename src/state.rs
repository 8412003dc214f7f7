//! Shared handle for persistence calls. Settings, registry and observers are swappable at runtime.

use crate::config::{settings_handle, snapshot, RoaSettings, SettingsHandle};
use crate::error::RoaResult;
use crate::schema::{BuiltType, EntityDeclaration, EntityKey, EntityRegistry, EntityType};
use crate::signals::{SaveObserver, Signals};
use crate::transport::Transport;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub struct RoaState {
    pub transport: Arc<dyn Transport>,
    pub settings: SettingsHandle,
    pub registry: Arc<RwLock<EntityRegistry>>,
    pub signals: Arc<RwLock<Signals>>,
}

impl RoaState {
    pub fn new(transport: Arc<dyn Transport>, settings: RoaSettings) -> Self {
        RoaState {
            transport,
            settings: settings_handle(settings),
            registry: Arc::new(RwLock::new(EntityRegistry::new())),
            signals: Arc::new(RwLock::new(Signals::default())),
        }
    }

    /// Build and register a declaration.
    pub fn build(&self, decl: &EntityDeclaration) -> RoaResult<BuiltType> {
        let mut registry = match self.registry.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        registry.build(decl)
    }

    pub fn entity(&self, key: &EntityKey) -> Option<Arc<EntityType>> {
        match self.registry.read() {
            Ok(registry) => registry.get(key),
            Err(poisoned) => poisoned.into_inner().get(key),
        }
    }

    pub fn connect(&self, observer: Arc<dyn SaveObserver>) {
        self.with_signals(|s| s.connect(observer));
    }

    pub fn connect_for(&self, key: EntityKey, observer: Arc<dyn SaveObserver>) {
        self.with_signals(|s| s.connect_for(key, observer));
    }

    fn with_signals(&self, f: impl FnOnce(&mut Signals)) {
        let mut guard = match self.signals.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut *guard);
    }

    /// Observers as registered right now; a running save keeps the set it started with.
    pub(crate) fn signals_snapshot(&self) -> Signals {
        match self.signals.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn settings(&self) -> RoaSettings {
        snapshot(&self.settings)
    }

    /// Replace the settings; the next operation sees them.
    pub fn update_settings(&self, f: impl FnOnce(&mut RoaSettings)) {
        let mut guard = match self.settings.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut *guard);
    }
}
