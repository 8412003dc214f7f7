//! Settings validation: override keys and CA path. The wire format is left to first use.

use crate::config::RoaSettings;
use crate::error::ConfigError;

fn is_entity_key(key: &str) -> bool {
    match key.split_once('.') {
        Some((namespace, name)) => !namespace.is_empty() && !name.is_empty() && !name.contains('.'),
        None => false,
    }
}

pub fn validate_settings(settings: &RoaSettings) -> Result<(), ConfigError> {
    let overrides = &settings.url_overrides;
    for key in overrides
        .list
        .keys()
        .chain(overrides.count.keys())
        .chain(overrides.detail.keys())
        .chain(settings.filters.keys())
    {
        if !is_entity_key(key) {
            return Err(ConfigError::InvalidOverrideKey(key.clone()));
        }
    }

    if let Some(ca) = &settings.ssl_ca {
        if ca.as_os_str().is_empty() {
            return Err(ConfigError::Validation("ssl_ca must not be empty".into()));
        }
    }

    for (name, value) in &settings.headers {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "default header with value '{}' has an empty name",
                value
            )));
        }
    }

    Ok(())
}
