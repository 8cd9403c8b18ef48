//! Top-level configuration.
//!
//! Every heuristic threshold of the visualization (wheel cooldown, settle
//! delays, fade durations, picking radius, star counts) is tuned empirically,
//! so all of them are exposed here instead of being hard-coded. Each section
//! lives next to the code that consumes it; this module only aggregates and
//! loads them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::render::animator::AnimationConfig;
use crate::render::picking::PickingConfig;
use crate::render::starfield::StarFieldParams;
use crate::scroll::ScrollConfig;

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV: &str = "CONCEPT_GALAXY_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "concept-galaxy.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
    pub scroll: ScrollConfig,
    pub animation: AnimationConfig,
    pub picking: PickingConfig,
    pub starfield: StarFieldParams,
    /// JSON concept list; `None` uses the bundled sample data
    pub concepts_path: Option<PathBuf>,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            scroll: ScrollConfig::default(),
            animation: AnimationConfig::default(),
            picking: PickingConfig::default(),
            starfield: StarFieldParams::default(),
            concepts_path: None,
        }
    }
}

impl GalaxyConfig {
    /// Load from a TOML file. A missing file yields the defaults; a present
    /// but malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| LoadError::new("config", format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, LoadError> {
        toml::from_str(content).map_err(|e| LoadError::new("config", e.to_string()))
    }

    /// Resolve the config path from `CONCEPT_GALAXY_CONFIG`, falling back to
    /// `concept-galaxy.toml`.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}
