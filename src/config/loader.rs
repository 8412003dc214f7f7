//! Load settings from a JSON file and the environment.

use crate::config::{validate_settings, RoaSettings};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Shared settings, read at the start of every operation so updates apply to the next call.
pub type SettingsHandle = Arc<RwLock<RoaSettings>>;

pub fn settings_handle(settings: RoaSettings) -> SettingsHandle {
    Arc::new(RwLock::new(settings))
}

/// Copy of the current settings. A poisoned lock still yields the last written value.
pub fn snapshot(handle: &SettingsHandle) -> RoaSettings {
    match handle.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Read settings from a JSON file. Missing keys take their defaults.
pub async fn load_settings_from_path(path: &Path) -> Result<RoaSettings, ConfigError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

/// Apply `ROA_FORMAT` and `ROA_SSL_CA` style overrides from any variable source.
pub fn apply_env_overrides<F>(settings: &mut RoaSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(format) = lookup("ROA_FORMAT").filter(|s| !s.is_empty()) {
        settings.format = format.to_lowercase();
    }
    if let Some(ca) = lookup("ROA_SSL_CA").filter(|s| !s.is_empty()) {
        settings.ssl_ca = Some(PathBuf::from(ca));
    }
}

/// Load `.env`, then the file named by `ROA_SETTINGS_PATH` (if any), then env overrides; validate.
pub async fn load_settings() -> Result<RoaSettings, ConfigError> {
    dotenvy::dotenv().ok();
    let mut settings = match std::env::var("ROA_SETTINGS_PATH") {
        Ok(path) if !path.is_empty() => load_settings_from_path(Path::new(&path)).await?,
        _ => RoaSettings::default(),
    };
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    validate_settings(&settings)?;
    tracing::debug!(format = %settings.format, ca = ?settings.ssl_ca, "settings loaded");
    Ok(settings)
}
