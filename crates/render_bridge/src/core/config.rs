//! # Bridge Configuration
//!
//! Settings for the pieces of the bridge that are tunable per host application:
//! the scene node pool, the command buffer lease window, the active render
//! pipeline used for material variant lookup, and logging.
//!
//! All structs are serde-serializable and can be loaded from TOML or RON files
//! through the [`Config`] trait.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use crate::config::{Config, ConfigError};
use crate::render::resources::RenderPipeline;

/// Number of frames a producer command buffer stays valid after it is handed out
pub const DEFAULT_LEASE_FRAMES: u64 = 5;

/// Number of scene nodes created up front by the pool
pub const DEFAULT_INITIAL_POOL_SIZE: usize = 500;

/// # Scene Node Pool Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Nodes pre-created and parked in the free list at startup
    pub initial_size: usize,
    /// Whether mesh colliders start enabled
    pub mesh_colliders_enabled: bool,
    /// Name given to the container object that parks free nodes
    pub unused_container_name: String,
}

impl PoolConfig {
    /// Create a pool configuration with the given initial size
    pub fn new(initial_size: usize) -> Self {
        Self {
            initial_size,
            ..Self::default()
        }
    }

    /// Enable or disable mesh colliders at startup
    pub fn with_mesh_colliders(mut self, enabled: bool) -> Self {
        self.mesh_colliders_enabled = enabled;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_POOL_SIZE,
            mesh_colliders_enabled: false,
            unused_container_name: "UnusedPoolObjects".to_string(),
        }
    }
}

/// # Frame Configuration
///
/// Controls how command buffers handed over by the producer are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// How many frames a command buffer stays valid after it was produced
    pub lease_frames: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            lease_frames: DEFAULT_LEASE_FRAMES,
        }
    }
}

/// # Logging Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is not set
    pub level: String,
    /// Route output through the test harness capture
    pub test_mode: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            test_mode: false,
        }
    }
}

/// # Complete Renderer Configuration
///
/// Top-level configuration handed to [`crate::render::Renderer::new`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Render pipeline the host is running, used to pick material variants
    pub render_pipeline: RenderPipeline,
    /// Scene node pool settings
    pub pool: PoolConfig,
    /// Command buffer acceptance settings
    pub frame: FrameConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl RendererConfig {
    /// Set the active render pipeline
    pub fn with_render_pipeline(mut self, pipeline: RenderPipeline) -> Self {
        self.render_pipeline = pipeline;
        self
    }

    /// Set the scene node pool configuration
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame.lease_frames == 0 {
            return Err(ConfigError::Invalid(
                "lease_frames must be at least 1".to_string(),
            ));
        }

        if log::LevelFilter::from_str(&self.logging.level).is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}

impl Config for RendererConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.pool.initial_size, DEFAULT_INITIAL_POOL_SIZE);
        assert_eq!(config.frame.lease_frames, DEFAULT_LEASE_FRAMES);
        assert_eq!(config.render_pipeline, RenderPipeline::Legacy);
        assert!(!config.pool.mesh_colliders_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RendererConfig::default()
            .with_render_pipeline(RenderPipeline::Universal)
            .with_pool(PoolConfig::new(32).with_mesh_colliders(true));

        let text = config.to_toml_string().expect("serialize");
        let parsed = RendererConfig::from_toml_str(&text).expect("parse");

        assert_eq!(parsed.render_pipeline, RenderPipeline::Universal);
        assert_eq!(parsed.pool.initial_size, 32);
        assert!(parsed.pool.mesh_colliders_enabled);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let parsed = RendererConfig::from_ron_str("(frame: (lease_frames: 3))").expect("parse");
        assert_eq!(parsed.frame.lease_frames, 3);
        assert_eq!(parsed.pool.initial_size, DEFAULT_INITIAL_POOL_SIZE);
    }

    #[test]
    fn test_validation_rejects_zero_lease() {
        let mut config = RendererConfig::default();
        config.frame.lease_frames = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validation_rejects_unknown_log_level() {
        let mut config = RendererConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_round_trip_and_unknown_extension() {
        let dir = std::env::temp_dir().join(format!("render_bridge_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");

        let config = RendererConfig::default().with_pool(PoolConfig::new(7));
        let path = dir.join("renderer.ron");
        config.save_to_file(&path).expect("save");
        let loaded = RendererConfig::load_from_file(&path).expect("load");
        assert_eq!(loaded.pool.initial_size, 7);

        let unsupported = config.save_to_file(dir.join("renderer.json"));
        assert!(matches!(unsupported, Err(ConfigError::UnsupportedFormat(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
