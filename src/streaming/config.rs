//! Streaming radii, budgets and worker settings

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Regions within this Chebyshev distance of the viewer are requested
    pub load_radius: i32,
    /// Loaded regions beyond this distance are evicted
    pub unload_radius: i32,
    /// Completed meshes integrated per update at most
    pub max_integrations_per_tick: usize,
    /// Minimum time between region recomputations
    pub update_interval_ms: u64,
    /// Generation threads; `None` uses the available parallelism
    pub worker_threads: Option<usize>,
    /// Keep each region's sampled density grid after meshing
    pub retain_density: bool,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            load_radius: 4,
            unload_radius: 5,
            max_integrations_per_tick: 30,
            update_interval_ms: 200,
            worker_threads: None,
            retain_density: false,
        }
    }
}

impl StreamingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.load_radius < 0 {
            return Err(Error::Config(format!(
                "load_radius must be non-negative, got {}",
                self.load_radius
            )));
        }
        if self.unload_radius <= self.load_radius {
            return Err(Error::Config(format!(
                "unload_radius ({}) must be greater than load_radius ({})",
                self.unload_radius, self.load_radius
            )));
        }
        if self.max_integrations_per_tick == 0 {
            return Err(Error::Config(
                "max_integrations_per_tick must be at least 1".to_string(),
            ));
        }
        if self.worker_threads == Some(0) {
            return Err(Error::Config("worker_threads must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Worker count to spawn
    pub fn resolved_worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn update_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.update_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StreamingConfig::default();
        assert_eq!(config.load_radius, 4);
        assert_eq!(config.unload_radius, 5);
        assert_eq!(config.max_integrations_per_tick, 30);
        assert_eq!(config.update_interval().as_millis(), 200);
        assert!(config.validate().is_ok());
        assert!(config.resolved_worker_threads() >= 1);
    }

    #[test]
    fn test_unload_inside_load_rejected() {
        let config = StreamingConfig {
            load_radius: 6,
            unload_radius: 5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let equal = StreamingConfig {
            load_radius: 4,
            unload_radius: 4,
            ..Default::default()
        };
        assert!(matches!(equal.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = StreamingConfig {
            max_integrations_per_tick: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_workers() {
        let config = StreamingConfig {
            worker_threads: Some(3),
            ..Default::default()
        };
        assert_eq!(config.resolved_worker_threads(), 3);
        let zero = StreamingConfig {
            worker_threads: Some(0),
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }
}
