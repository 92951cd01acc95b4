use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::priority::PriorityWeights;

pub const CONFIG_ENV: &str = "GRADE_PRIORITY_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub priority: PriorityWeights,
}

impl EngineConfig {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid engine config in {}", path.display()))
    }

    /// Loads from the explicit path, then `GRADE_PRIORITY_CONFIG`, falling
    /// back to the built-in weights when neither is set.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        match path {
            Some(path) => {
                let config = Self::from_path(&path)?;
                tracing::info!(path = %path.display(), "loaded engine config");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}
