//! Viewer settings loaded from an optional TOML file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Zoom factor between consecutive view levels.
    pub zoom_level_change: f64,
    /// Minimum fraction of a pileup a letter needs to count as an allele.
    pub min_allele_fraction: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            zoom_level_change: 2.0,
            min_allele_fraction: 0.2,
        }
    }
}

impl ViewConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: ViewConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        anyhow::ensure!(
            config.zoom_level_change > 1.0,
            "zoom_level_change must be greater than 1, got {}",
            config.zoom_level_change
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&config.min_allele_fraction),
            "min_allele_fraction must be in [0, 1), got {}",
            config.min_allele_fraction
        );
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
