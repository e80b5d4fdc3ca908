//! TOML configuration for a Geocoin session.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use geocoin_system_spawning::Config as SpawningConfig;
use geocoin_world::Config as WorldConfig;
use serde::Deserialize;

/// Settings assembled from the optional configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Board geometry, movement and start position.
    pub(crate) world: WorldConfig,
    /// Cache spawning parameters.
    pub(crate) spawning: SpawningConfig,
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when no file is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
