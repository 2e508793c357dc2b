//! Settings, override and compose document types

use crate::error::{DupError, Result};
use crate::runtime::replay::ReplayPolicy;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Extension of every document handled by the tool
pub const EXTENSION: &str = ".yml";

/// Default settings file name
pub const DEFAULT_SETTINGS_FILE: &str = "settings.yml";

/// Default compose output file name
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Default compose file version
pub const DEFAULT_VERSION: &str = "3.7";

/// Default image directory prefix
pub const DEFAULT_IMAGE_DIR: &str = "./";

/// How override entries are matched against settings entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideMatch {
    /// Only an identical `codes%name` key replaces a settings entry
    #[default]
    Exact,
    /// Any override entry with the same base name replaces the settings entry,
    /// codes included
    Name,
}

/// What happens when two entries expand to the same final name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// The entry expanded last wins
    #[default]
    Overwrite,
    /// Fail with a name collision error
    Reject,
}

/// Expansion and replay policies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionPolicy {
    #[serde(default)]
    pub override_match: OverrideMatch,
    #[serde(default)]
    pub collisions: CollisionPolicy,
    #[serde(default)]
    pub replay: ReplayPolicy,
}

impl ExpansionPolicy {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Base settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Compose file version copied into the output
    #[serde(default = "default_version")]
    pub version: String,
    /// Prefix joined with a service name to form its build path
    #[serde(default = "default_image_dir")]
    pub image_dir: String,
    /// User placeholder values, kept as written (`10.10` stays `10.10`)
    #[serde(default)]
    pub variables: Option<IndexMap<String, String>>,
    /// Service entries keyed by directive name
    #[serde(default)]
    pub services: Option<Mapping>,
    /// Network entries keyed by directive name
    #[serde(default)]
    pub networks: Option<Mapping>,
    /// Script directives replayed after startup
    #[serde(default)]
    pub scripts: Option<Vec<String>>,
    /// Expansion and replay policies
    #[serde(default, skip_serializing_if = "ExpansionPolicy::is_default")]
    pub expansion: ExpansionPolicy,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_image_dir() -> String {
    DEFAULT_IMAGE_DIR.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        let mut variables = IndexMap::new();
        variables.insert("subnet".to_string(), "10.0".to_string());

        Self {
            version: default_version(),
            image_dir: default_image_dir(),
            variables: Some(variables),
            services: None,
            networks: None,
            scripts: None,
            expansion: ExpansionPolicy::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a string
    pub fn parse_str(content: &str) -> Result<Self> {
        parse_document(content)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DupError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Write settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Load settings, creating the file with defaults if it does not exist
    pub fn ensure_default(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        tracing::info!("Creating default settings at {}", path.display());
        let settings = Self::default();
        settings.save(path)?;
        Ok(settings)
    }

    /// User variables as ordered string pairs
    pub fn variable_pairs(&self) -> Vec<(String, String)> {
        self.variables
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Per-run override document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideConfig {
    /// Service entries keyed by directive name
    #[serde(default)]
    pub services: Option<Mapping>,
    /// Script directives appended after the settings scripts
    #[serde(default)]
    pub scripts: Option<Vec<String>>,
}

impl OverrideConfig {
    /// Parse an override document from a string
    pub fn parse_str(content: &str) -> Result<Self> {
        parse_document(content)
    }

    /// Load an override document from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DupError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Write an empty override template
    pub fn write_template(path: &Path) -> Result<()> {
        std::fs::write(path, serde_yaml::to_string(&Self::default())?)?;
        Ok(())
    }
}

/// Fully expanded compose document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalDocument {
    pub version: String,
    #[serde(default)]
    pub services: Mapping,
    #[serde(default)]
    pub networks: Mapping,
}

impl FinalDocument {
    /// Create an empty document
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            services: Mapping::new(),
            networks: Mapping::new(),
        }
    }

    /// Service names in document order
    pub fn service_names(&self) -> Vec<String> {
        keys(&self.services)
    }

    /// Network names in document order
    pub fn network_names(&self) -> Vec<String> {
        keys(&self.networks)
    }

    /// Look up a service body by name
    pub fn service(&self, name: &str) -> Option<&Value> {
        self.services.get(name)
    }

    /// Serialize the document body as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Serialize the document body as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn keys(mapping: &Mapping) -> Vec<String> {
    mapping
        .keys()
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect()
}

/// Resolve a config argument given with or without the extension
pub fn config_path(arg: &str) -> PathBuf {
    if arg.ends_with(EXTENSION) {
        PathBuf::from(arg)
    } else {
        PathBuf::from(format!("{}{}", arg, EXTENSION))
    }
}

fn parse_document<T>(content: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_yaml::from_str(content)?)
}
