use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde::de::DeserializeOwned;
use toml::Value;
use tracing::debug;

use crate::deps::{Approval, Config, Runtime};

/// Layers searched after the built-in defaults, later ones win.
const SEARCH_PATHS: [&str; 2] = ["config/agent-tools.toml", "./agent-tools.toml"];

const DEFAULTS: &str = r#"
[config]
project_name = "vibe-with-kimi"
max_iterations = 10
debug_mode = true

[runtime]
model_name = "kimi-k2-thinking"
api_endpoint = "https://api.moonshot.cn"
timeout = 30

[approval]
yolo_mode = true
"#;

/// Mergeable TOML document holding the values the demo registers.
///
/// ```text
/// [config]    -> Config
/// [runtime]   -> Runtime
/// [approval]  -> Approval
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredConfig {
    value: Value,
}

impl FromStr for LayeredConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = toml::from_str(s)?;
        Ok(Self { value })
    }
}

impl fmt::Display for LayeredConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl LayeredConfig {
    pub fn defaults() -> Result<Self, anyhow::Error> {
        DEFAULTS.parse()
    }

    pub fn from_file<P: AsRef<Path>>(fname: P) -> Result<Self, anyhow::Error> {
        let path = fname.as_ref();
        if !path.exists() {
            return Err(anyhow!("File {} does not exist", path.display()));
        }
        let content = std::fs::read_to_string(path)?;
        content
            .parse()
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Deep merge: tables merge recursively, arrays concatenate, anything
    /// else is replaced by `other`.
    pub fn merge(&mut self, other: Self) {
        self.value = merge_values(&self.value, &other.value);
    }

    /// Value at a dotted path such as `runtime.timeout`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.value;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn section<T: DeserializeOwned>(&self, prefix: &str) -> Result<T, anyhow::Error> {
        let part = self
            .get(prefix)
            .ok_or_else(|| anyhow!("No config found for {}", prefix))?;
        part.clone()
            .try_into::<T>()
            .with_context(|| format!("Invalid [{}] section", prefix))
    }

    pub fn config(&self) -> Result<Config, anyhow::Error> {
        self.section("config")
    }

    pub fn runtime(&self) -> Result<Runtime, anyhow::Error> {
        self.section("runtime")
    }

    pub fn approval(&self) -> Result<Approval, anyhow::Error> {
        self.section("approval")
    }
}

fn merge_values(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Table(a_map), Value::Table(b_map)) => {
            let mut result: BTreeMap<String, Value> =
                a_map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            for (k, v) in b_map {
                let merged = match result.get(k) {
                    Some(existing) => merge_values(existing, v),
                    None => v.clone(),
                };
                result.insert(k.clone(), merged);
            }
            Value::Table(result.into_iter().collect())
        }
        (Value::Array(a_vec), Value::Array(b_vec)) => {
            let mut result = a_vec.clone();
            result.extend(b_vec.iter().cloned());
            Value::Array(result)
        }
        _ => b.clone(),
    }
}

/// Built-in defaults, then every file in [`SEARCH_PATHS`] that exists, then
/// `extra`, which must exist when given.
pub fn load(extra: Option<&Path>) -> Result<LayeredConfig, anyhow::Error> {
    let mut config = LayeredConfig::defaults()?;

    for path in SEARCH_PATHS {
        if Path::new(path).exists() {
            debug!(path, "merging config layer");
            config.merge(LayeredConfig::from_file(path)?);
        }
    }

    if let Some(path) = extra {
        debug!(path = %path.display(), "merging config layer");
        config.merge(LayeredConfig::from_file(path)?);
    }

    Ok(config)
}
