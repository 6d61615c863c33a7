//! Tracker configuration.
//!
//! Every section has defaults, so an empty YAML document is a valid
//! configuration:
//!
//! ```yaml
//! region: inner_lips
//! scheduler:
//!   cadence_ms: 600
//! sweeper:
//!   cadence_ms: 1000
//!   stale_after_ms: 1500
//! localizer:
//!   attempts: 3
//!   attempt_delay_ms: 12
//!   min_hit_distance: 0.10
//!   hit_selection: first_remaining
//! registry:
//!   hysteresis_distance: 0.03
//! ```

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::anchors::RegistryConfig;
use crate::detection::LandmarkRegion;
use crate::localization::LocalizerConfig;
use crate::system::{SchedulerConfig, SweeperConfig};

/// Complete configuration of a tracking session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Landmark group the anchor follows.
    pub region: LandmarkRegion,
    pub scheduler: SchedulerConfig,
    pub sweeper: SweeperConfig,
    pub localizer: LocalizerConfig,
    pub registry: RegistryConfig,
}

impl TrackerConfig {
    /// Load and validate a YAML configuration file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let config: Self =
            serde_yaml::from_reader(file).with_context(|| format!("Failed to parse {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML configuration string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Name given to anchors created by this session.
    pub fn anchor_name(&self) -> &'static str {
        self.region.anchor_name()
    }

    pub fn validate(&self) -> Result<()> {
        if self.scheduler.cadence_ms == 0 {
            bail!("scheduler.cadence_ms must be positive");
        }
        if self.sweeper.cadence_ms == 0 {
            bail!("sweeper.cadence_ms must be positive");
        }
        if self.localizer.attempts == 0 {
            bail!("localizer.attempts must be at least 1");
        }
        if self.localizer.min_hit_distance < 0.0 || self.localizer.min_hit_distance.is_nan() {
            bail!(
                "localizer.min_hit_distance must be non-negative, got {}",
                self.localizer.min_hit_distance
            );
        }
        if self.registry.hysteresis_distance < 0.0 || self.registry.hysteresis_distance.is_nan() {
            bail!(
                "registry.hysteresis_distance must be non-negative, got {}",
                self.registry.hysteresis_distance
            );
        }
        Ok(())
    }
}
