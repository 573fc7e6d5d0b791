//! # Core Module
//!
//! Shared configuration used to wire the decoder, resource registry and scene
//! node pool together.

pub mod config;

pub use config::{
    Config,
    ConfigError,
    FrameConfig,
    LoggingConfig,
    PoolConfig,
    RendererConfig,
};
