//! # Renderer
//!
//! Owns the registry, the scene node pool and the command client, and runs
//! one decode-and-apply pass per frame.
//!
//! ```text
//! producer ──CommandBuffer──▶ Renderer::update ──▶ DecodedCommandQueue
//!                                                   │
//!                                                   ▼
//!                                     RenderCommandClient::execute
//!                                       │                    │
//!                                       ▼                    ▼
//!                             GpuResourceRegistry      SceneNodePool
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::backend::{GraphicsBackend, ImageComposer, NormalMapGenerator};
use super::client::RenderCommandClient;
use super::payload::PayloadArena;
use super::resources::GpuResourceRegistry;
use super::{RenderError, RenderResult};
use crate::core::config::RendererConfig;
use crate::foundation::logging::{debug, info};
use crate::protocol::DecodedCommandQueue;
use crate::scene::{SceneGraphBackend, SceneNode, SceneNodePool, SceneObjectId};

/// One frame's worth of commands handed over by the producer
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    /// Frame the buffer was produced in
    pub frame: u64,
    /// Encoded commands
    pub bytes: Vec<u8>,
    /// Blocks referenced by buffer views inside the commands
    pub payloads: PayloadArena,
}

impl CommandBuffer {
    /// Create a buffer produced in `frame`
    pub fn new(frame: u64, bytes: Vec<u8>, payloads: PayloadArena) -> Self {
        Self { frame, bytes, payloads }
    }
}

/// Producer of command buffers
pub trait RenderCommandServer {
    /// Next buffer to apply, if the producer has one ready
    fn next_command_buffer(&mut self) -> Option<CommandBuffer>;
}

impl RenderCommandServer for VecDeque<CommandBuffer> {
    fn next_command_buffer(&mut self) -> Option<CommandBuffer> {
        self.pop_front()
    }
}

/// Consumer side of the command stream
pub struct Renderer {
    config: RendererConfig,
    registry: GpuResourceRegistry,
    pool: SceneNodePool,
    client: RenderCommandClient,
    frame: u64,
    released: bool,
}

impl Renderer {
    /// Create a renderer with its registry, pool and command client
    pub fn new(
        config: RendererConfig,
        backend: Box<dyn GraphicsBackend>,
        scene_backend: Box<dyn SceneGraphBackend>,
        composer: Box<dyn ImageComposer>,
        normal_generator: Box<dyn NormalMapGenerator>,
    ) -> RenderResult<Self> {
        config.validate()?;

        info!("Initializing renderer ({:?} pipeline)", config.render_pipeline);

        let mut registry = GpuResourceRegistry::new(backend, config.render_pipeline);
        let pool = SceneNodePool::new(&config.pool, scene_backend);
        let client = RenderCommandClient::new(&mut registry, composer, normal_generator)?;

        Ok(Self {
            config,
            registry,
            pool,
            client,
            frame: 0,
            released: false,
        })
    }

    /// Pull and apply the next command buffer, then advance the frame counter
    ///
    /// Returns the number of commands applied, 0 when the producer had nothing.
    pub fn update(&mut self, server: &mut dyn RenderCommandServer) -> RenderResult<usize> {
        if self.released {
            return Err(RenderError::Released);
        }

        let current = self.frame;
        self.frame += 1;

        let Some(buffer) = server.next_command_buffer() else {
            return Ok(0);
        };

        self.apply(&buffer, current)
    }

    /// Apply a command buffer as if presented in frame `current`
    pub fn apply(&mut self, buffer: &CommandBuffer, current: u64) -> RenderResult<usize> {
        if self.released {
            return Err(RenderError::Released);
        }

        let lease_frames = self.config.frame.lease_frames;
        if current.saturating_sub(buffer.frame) >= lease_frames {
            return Err(RenderError::LeaseExpired {
                produced: buffer.frame,
                current,
                lease_frames,
            });
        }

        let queue = DecodedCommandQueue::new(&buffer.bytes);
        let applied = self
            .client
            .execute_queue(queue, &mut self.registry, &mut self.pool, &buffer.payloads)?;

        debug!("Frame {current}: applied {applied} commands ({} bytes)", buffer.bytes.len());
        Ok(applied)
    }

    /// Frames processed so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Active configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// GPU resources
    pub fn registry(&self) -> &GpuResourceRegistry {
        &self.registry
    }

    /// Scene nodes
    pub fn pool(&self) -> &SceneNodePool {
        &self.pool
    }

    /// Enable or disable mesh colliders on all scene nodes
    pub fn set_mesh_colliders_enabled(&mut self, enabled: bool) {
        self.pool.set_mesh_colliders_enabled(enabled);
    }

    /// Visible scene nodes that cut the terrain
    pub fn terrain_masking_meshes(&self) -> impl Iterator<Item = (u32, &SceneNode)> + '_ {
        self.pool.terrain_masking_meshes()
    }

    /// Scene component displayed by a host object, for picking
    pub fn scene_component_for_object(&self, object: SceneObjectId) -> Option<u32> {
        self.pool.scene_component_for_object(object)
    }

    /// Whether [`Self::release`] has run
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Tear down every GPU resource and scene node
    ///
    /// Later calls do nothing, and every further update fails with
    /// [`RenderError::Released`].
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        info!("Releasing renderer after {} frames", self.frame);
        self.client.release(&mut self.registry);
        self.registry.release_all();
        self.pool.release();
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("frame", &self.frame)
            .field("registry", &self.registry)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

/// Renderer shared between threads behind a single coarse lock
///
/// One frame's batch is applied while holding the lock, matching the
/// producer's one-buffer-per-frame cadence.
#[derive(Debug, Clone)]
pub struct SharedRenderer {
    inner: Arc<Mutex<Renderer>>,
}

impl SharedRenderer {
    /// Wrap a renderer
    pub fn new(renderer: Renderer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(renderer)),
        }
    }

    /// Apply the next command buffer under the lock
    pub fn update(&self, server: &mut dyn RenderCommandServer) -> RenderResult<usize> {
        self.with(|renderer| renderer.update(server))?
    }

    /// Run `f` with exclusive access to the renderer
    ///
    /// Fails with [`RenderError::LockPoisoned`] once a thread has panicked
    /// while holding the lock; the renderer may be half way through a batch.
    pub fn with<R>(&self, f: impl FnOnce(&mut Renderer) -> R) -> RenderResult<R> {
        let mut guard = self.inner.lock().map_err(|_| RenderError::LockPoisoned)?;
        Ok(f(&mut guard))
    }
}
