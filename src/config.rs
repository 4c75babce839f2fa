use serde::Deserialize;
use std::{path::Path, time::Duration};

use crate::physics::BodyKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tuning for the world streaming controller.
///
/// Every field has a default, so a TOML file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chebyshev radius, in chunks, of the cube kept loaded around the observer.
    pub load_radius: i32,
    /// Terrain generation jobs dispatched per frame.
    pub generations_per_frame: usize,
    /// Out-of-range chunks unloaded per frame.
    pub removals_per_frame: usize,
    /// Mesh/collider refreshes per frame, further capped by `refresh_budget_ms`.
    pub refreshes_per_frame: usize,
    pub refresh_budget_ms: u64,
    /// Background workers; 0 means one per logical CPU.
    pub worker_count: usize,
    /// Voxel buffers in the chunk pool; 0 derives it from the load radius.
    pub pool_capacity: usize,
    /// Block once per frame until the dispatched generation batch finishes,
    /// so a batch of chunks lands together.
    pub wait_for_generation_batch: bool,
    pub collider_body: BodyKind,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            load_radius: 4,
            generations_per_frame: 16,
            removals_per_frame: 10,
            refreshes_per_frame: 8,
            refresh_budget_ms: 4,
            worker_count: 0,
            pool_capacity: 0,
            wait_for_generation_batch: true,
            collider_body: BodyKind::Static,
        }
    }
}

impl StreamingConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading streaming config from {}", path.display());

        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.load_radius < 0 {
            return Err(ConfigError::Invalid {
                field: "load_radius",
                reason: format!("must not be negative, got {}", self.load_radius),
            });
        }

        for (field, value) in [
            ("generations_per_frame", self.generations_per_frame),
            ("removals_per_frame", self.removals_per_frame),
            ("refreshes_per_frame", self.refreshes_per_frame),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if self.pool_capacity != 0 && self.pool_capacity < self.min_pool_capacity() {
            return Err(ConfigError::Invalid {
                field: "pool_capacity",
                reason: format!(
                    "{} buffers cannot hold the loaded cube, need at least {}",
                    self.pool_capacity,
                    self.min_pool_capacity()
                ),
            });
        }

        Ok(())
    }

    /// Chunks stay loaded out to `load_radius + 1`, plus one generation batch
    /// in flight.
    pub fn min_pool_capacity(&self) -> usize {
        let side = (2 * (self.load_radius.max(0) as usize + 1)) + 1;
        side.pow(3) + self.generations_per_frame
    }

    pub fn effective_pool_capacity(&self) -> usize {
        if self.pool_capacity == 0 {
            self.min_pool_capacity() * 2
        } else {
            self.pool_capacity
        }
    }

    pub fn refresh_budget(&self) -> Duration {
        Duration::from_millis(self.refresh_budget_ms)
    }
}
