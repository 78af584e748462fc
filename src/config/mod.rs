//! Configuration access.
//!
//! Engine parameters come from an externally persisted JSON document read
//! through a [`ConfigSource`] at the start of every cycle. Process-level
//! settings (URLs, ports, environment) come from environment variables.

pub mod params;

use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};

pub use params::{EngineConfig, FusionParams, MacroParams, ScalpingParams, TrendParams};

/// Snapshot of the configuration document with dotted-key lookups.
///
/// Every typed getter falls back to the supplied default when the key is
/// missing or holds a value of the wrong type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    root: Value,
}

impl ConfigTree {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn empty() -> Self {
        Self::new(Value::Object(Default::default()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    /// Looks up `a.b.c` by walking nested objects.
    pub fn get(&self, dotted_key: &str) -> Option<&Value> {
        dotted_key
            .split('.')
            .try_fold(&self.root, |node, segment| node.get(segment))
    }

    pub fn get_f64(&self, dotted_key: &str, default: f64) -> f64 {
        self.get(dotted_key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }

    pub fn get_usize(&self, dotted_key: &str, default: usize) -> usize {
        self.get(dotted_key)
            .and_then(Value::as_u64)
            .map(|v| v as usize)
            .unwrap_or(default)
    }

    pub fn get_u32(&self, dotted_key: &str, default: u32) -> u32 {
        self.get(dotted_key)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(default)
    }

    pub fn get_str(&self, dotted_key: &str, default: &str) -> String {
        self.get(dotted_key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    /// Array of unsigned integers; the default applies unless every element parses.
    pub fn get_u32_list(&self, dotted_key: &str, default: &[u32]) -> Vec<u32> {
        self.get(dotted_key)
            .and_then(Value::as_array)
            .and_then(|items| {
                items
                    .iter()
                    .map(|v| v.as_u64().and_then(|n| u32::try_from(n).ok()))
                    .collect::<Option<Vec<u32>>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| default.to_vec())
    }
}

/// Supplier of configuration snapshots.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<ConfigTree>;
}

/// Fixed in-memory configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    tree: ConfigTree,
}

impl StaticConfig {
    pub fn new(tree: ConfigTree) -> Self {
        Self { tree }
    }

    pub fn from_value(root: Value) -> Self {
        Self::new(ConfigTree::new(root))
    }
}

impl ConfigSource for StaticConfig {
    fn load(&self) -> Result<ConfigTree> {
        Ok(self.tree.clone())
    }
}

/// JSON file re-read on every `load()`.
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfig {
    fn load(&self) -> Result<ConfigTree> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => ConfigTree::from_json_str(&raw).map_err(|e| {
                EngineError::Config(format!(
                    "failed to parse {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Config file not found, using defaults");
                Ok(ConfigTree::empty())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Loads a snapshot, degrading to an empty tree (all defaults) on error.
pub fn load_or_default(source: &dyn ConfigSource) -> ConfigTree {
    match source.load() {
        Ok(tree) => tree,
        Err(e) => {
            warn!(error = %e, "Failed to load configuration, falling back to defaults");
            ConfigTree::empty()
        }
    }
}

pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_config_path() -> String {
    env::var("TIERFUSION_CONFIG").unwrap_or_else(|_| "config/engine.json".to_string())
}

pub fn get_questdb_url() -> String {
    env::var("QUESTDB_URL").unwrap_or_else(|_| {
        "host=localhost port=8812 user=admin password=quest dbname=qdb".to_string()
    })
}

pub fn get_upbit_url() -> String {
    env::var("UPBIT_API_URL").unwrap_or_else(|_| "https://api.upbit.com".to_string())
}

pub fn get_http_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

pub fn get_cycle_interval_seconds() -> u64 {
    env::var("CYCLE_INTERVAL_SECONDS")
        .ok()
        .and_then(|i| i.parse().ok())
        .unwrap_or(300)
}
