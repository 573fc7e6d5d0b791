//! # Rendering Bridge
//!
//! Consumer side of the command stream. The [`Renderer`] pulls one command
//! buffer per frame, decodes it and applies every command through the
//! [`RenderCommandClient`] to the [`GpuResourceRegistry`] and the scene node
//! pool.
//!
//! ## Error policy
//!
//! Malformed streams and id desyncs are returned as [`RenderError`] and end the
//! frame's processing. Unsupported formats and unmapped material properties are
//! logged and recovered from locally.

pub mod backend;
pub mod client;
pub mod payload;
pub mod renderer;
pub mod resources;
pub mod task_queue;

use thiserror::Error;

use crate::config::ConfigError;
use crate::protocol::DecodeError;

pub use backend::{
    BackendHandle, BackendResult, ComposableImage, GraphicsBackend, ImageComposer, NormalMapGenerator,
    ResourceKind,
};
pub use client::RenderCommandClient;
pub use payload::{PayloadArena, PayloadSource};
pub use renderer::{CommandBuffer, RenderCommandServer, Renderer, SharedRenderer};
pub use resources::{GpuResourceRegistry, RenderPipeline};
pub use task_queue::{TaskQueue, TaskQueueClosed, TaskSender};

/// Errors raised while applying render commands
#[derive(Error, Debug)]
pub enum RenderError {
    /// The command stream is malformed
    #[error("Malformed command stream: {0}")]
    Decode(#[from] DecodeError),

    /// A create command reused a live id
    #[error("Duplicate {kind} id {id}")]
    DuplicateResourceId {
        /// Resource namespace
        kind: ResourceKind,
        /// Offending id
        id: u32,
    },

    /// A command referenced an id that is not live
    #[error("Unknown {kind} id {id}")]
    UnknownResourceId {
        /// Resource namespace
        kind: ResourceKind,
        /// Offending id
        id: u32,
    },

    /// A command referenced a scene component that is not active
    #[error("Unknown scene component id {0}")]
    UnknownSceneComponentId(u32),

    /// A scene component id was created twice
    #[error("Duplicate scene component id {0}")]
    DuplicateSceneComponentId(u32),

    /// A payload view could not be resolved or has the wrong size
    #[error("Invalid payload at {data:#x} ({size} bytes): {reason}")]
    InvalidPayload {
        /// Producer address
        data: u64,
        /// Declared size
        size: u32,
        /// What is wrong with it
        reason: &'static str,
    },

    /// The command buffer was handed over after its lease ran out
    #[error("Command buffer from frame {produced} expired at frame {current} (lease {lease_frames} frames)")]
    LeaseExpired {
        /// Frame the buffer was produced in
        produced: u64,
        /// Frame it was presented in
        current: u64,
        /// Lease length
        lease_frames: u64,
    },

    /// The renderer configuration is unusable
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The renderer was used after it was released
    #[error("Renderer has been released")]
    Released,

    /// A thread panicked while holding the shared renderer
    #[error("Renderer lock poisoned; state may be out of sync with the producer")]
    LockPoisoned,

    /// The host backend failed
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
