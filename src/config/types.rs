//! Settings types matching the JSON settings file.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Per-entity url overrides keyed by `namespace.name`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UrlOverrides {
    #[serde(default)]
    pub list: HashMap<String, String>,
    #[serde(default)]
    pub count: HashMap<String, String>,
    #[serde(default)]
    pub detail: HashMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoaSettings {
    /// Wire format name. Checked when a codec is first needed, not at load.
    #[serde(default = "default_format")]
    pub format: String,
    /// Static headers sent with every request; the request context overlays them.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub url_overrides: UrlOverrides,
    /// CA bundle handed to the transport as the verify parameter.
    #[serde(default)]
    pub ssl_ca: Option<PathBuf>,
    /// Extra query arguments merged into list and count reads.
    #[serde(default)]
    pub custom_args: BTreeMap<String, String>,
    /// Renames well-known query argument names, e.g. `FORMAT` -> `fmt`.
    #[serde(default)]
    pub args_names_mapping: HashMap<String, String>,
    /// Default list filters per entity key.
    #[serde(default)]
    pub filters: HashMap<String, BTreeMap<String, String>>,
}

fn default_format() -> String {
    "json".into()
}

impl Default for RoaSettings {
    fn default() -> Self {
        RoaSettings {
            format: default_format(),
            headers: HashMap::new(),
            url_overrides: UrlOverrides::default(),
            ssl_ca: None,
            custom_args: BTreeMap::new(),
            args_names_mapping: HashMap::new(),
            filters: HashMap::new(),
        }
    }
}

impl RoaSettings {
    /// Query argument name carrying the wire format.
    pub fn format_arg(&self) -> &str {
        self.args_names_mapping
            .get("FORMAT")
            .map(String::as_str)
            .unwrap_or("format")
    }

    /// Query arguments for a read: format, custom args, then per-entity default filters.
    pub fn read_args(&self, entity_key: &str) -> BTreeMap<String, String> {
        let mut args = BTreeMap::new();
        args.insert(self.format_arg().to_string(), self.format.clone());
        args.extend(self.custom_args.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(filters) = self.filters.get(entity_key) {
            args.extend(filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        args
    }
}
