//! # Render Bridge
//!
//! Consumer side of a map engine's render command stream. The native engine
//! writes one command buffer per frame; the bridge decodes it and applies every
//! command to host GPU resources and pooled scene nodes.
//!
//! ## Features
//!
//! - **Command Decoding**: Zero-copy, fail-fast decoding of the tagged command stream
//! - **GPU Resource Registry**: Id-keyed materials, meshes, textures and render targets
//! - **Scene Node Pool**: Recycled renderable placeholders with picking and terrain masking
//! - **Pluggable Hosts**: Graphics and scene graph backends behind traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::VecDeque;
//! use render_bridge::prelude::*;
//!
//! fn run(
//!     backend: Box<dyn GraphicsBackend>,
//!     scene: Box<dyn SceneGraphBackend>,
//!     composer: Box<dyn ImageComposer>,
//!     normals: Box<dyn NormalMapGenerator>,
//! ) -> Result<(), RenderError> {
//!     let config = RendererConfig::load_from_file("renderer.toml").unwrap_or_default();
//!     let mut renderer = Renderer::new(config, backend, scene, composer, normals)?;
//!
//!     let mut writer = CommandBufferWriter::new();
//!     writer.push(RenderCommand::CreateSceneComponent(CreateSceneComponentParams {
//!         scene_component_id: 1,
//!         scene_component_type: 0,
//!         layer_id: 0,
//!     }));
//!
//!     let mut server = VecDeque::from([CommandBuffer::new(0, writer.into_bytes(), PayloadArena::new())]);
//!     renderer.update(&mut server)?;
//!     renderer.release();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod config;
pub mod foundation;
pub mod protocol;
pub mod render;
pub mod scene;

#[cfg(test)]
mod tests;

/// Common imports for bridge users
pub mod prelude {
    pub use crate::{
        config::Config,
        core::config::{FrameConfig, LoggingConfig, PoolConfig, RendererConfig},
        protocol::{CommandBufferWriter, CommandType, DecodeError, DecodedCommandQueue, RenderCommand},
        protocol::params::*,
        render::{
            BackendHandle, CommandBuffer, GpuResourceRegistry, GraphicsBackend, ImageComposer,
            NormalMapGenerator, PayloadArena, PayloadSource, RenderCommandServer, RenderError,
            RenderResult, Renderer, ResourceKind, SharedRenderer,
        },
        scene::{SceneGraphBackend, SceneNode, SceneNodePool, SceneObjectId},
    };
}
