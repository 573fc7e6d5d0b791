//! Recording backends for tests
//!
//! Every mock is a cheap handle onto shared state, so a test can give one
//! clone to the renderer and inspect the calls through another.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::config::{PoolConfig, RendererConfig};
use crate::foundation::math::{DVec3, Vec4};
use crate::render::backend::{
    BackendHandle, BackendResult, ComposableImage, GraphicsBackend, ImageComposer, NormalMapGenerator,
    ResourceKind,
};
use crate::render::resources::{
    GpuRenderTexture, GpuTexture, MaterialSource, MeshData, RenderTextureDescriptor, TextureDescriptor,
};
use crate::render::Renderer;
use crate::scene::{SceneGraphBackend, SceneObjectId};

fn lock<T>(state: &Arc<Mutex<T>>) -> MutexGuard<'_, T> {
    state.lock().expect("mock state poisoned")
}

/// A call made on [`RecordingGraphicsBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateMaterial { shader: Option<String>, template: Option<u64> },
    CreateMesh(BackendHandle),
    CreateTexture(BackendHandle, TextureDescriptor),
    CreateRenderTexture(BackendHandle, RenderTextureDescriptor),
    ReleaseRenderTexture(BackendHandle),
    Destroy(ResourceKind, BackendHandle),
    SetFloat(BackendHandle, String, f32),
    SetVector(BackendHandle, String, Vec4),
    SetTexture(BackendHandle, String, BackendHandle),
    UploadMesh(BackendHandle, MeshData),
    SetPixels(BackendHandle, Vec<u8>),
    GenerateMipMaps(BackendHandle),
}

#[derive(Debug, Default)]
struct GraphicsState {
    calls: Vec<BackendCall>,
    next_handle: u64,
    live: HashSet<BackendHandle>,
}

impl GraphicsState {
    fn allocate(&mut self) -> BackendHandle {
        self.next_handle += 1;
        let handle = BackendHandle(self.next_handle);
        self.live.insert(handle);
        handle
    }
}

/// Graphics backend that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingGraphicsBackend {
    state: Arc<Mutex<GraphicsState>>,
}

impl RecordingGraphicsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.state).calls.clone()
    }

    pub fn live_objects(&self) -> usize {
        lock(&self.state).live.len()
    }

    pub fn last_upload(&self, mesh: BackendHandle) -> Option<MeshData> {
        lock(&self.state).calls.iter().rev().find_map(|call| match call {
            BackendCall::UploadMesh(handle, data) if *handle == mesh => Some(data.clone()),
            _ => None,
        })
    }
}

impl GraphicsBackend for RecordingGraphicsBackend {
    fn create_material(&mut self, source: MaterialSource<'_>) -> BackendResult<BackendHandle> {
        let mut state = lock(&self.state);
        let call = match source {
            MaterialSource::Shader(path) => BackendCall::CreateMaterial { shader: Some(path.to_string()), template: None },
            MaterialSource::Template(template) => BackendCall::CreateMaterial { shader: None, template: Some(template) },
        };
        state.calls.push(call);
        Ok(state.allocate())
    }

    fn create_mesh(&mut self) -> BackendResult<BackendHandle> {
        let mut state = lock(&self.state);
        let handle = state.allocate();
        state.calls.push(BackendCall::CreateMesh(handle));
        Ok(handle)
    }

    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> BackendResult<BackendHandle> {
        let mut state = lock(&self.state);
        let handle = state.allocate();
        state.calls.push(BackendCall::CreateTexture(handle, *descriptor));
        Ok(handle)
    }

    fn create_render_texture(&mut self, descriptor: &RenderTextureDescriptor) -> BackendResult<BackendHandle> {
        let mut state = lock(&self.state);
        let handle = state.allocate();
        state.calls.push(BackendCall::CreateRenderTexture(handle, *descriptor));
        Ok(handle)
    }

    fn release_render_texture(&mut self, handle: BackendHandle) {
        lock(&self.state).calls.push(BackendCall::ReleaseRenderTexture(handle));
    }

    fn destroy(&mut self, kind: ResourceKind, handle: BackendHandle) {
        let mut state = lock(&self.state);
        state.live.remove(&handle);
        state.calls.push(BackendCall::Destroy(kind, handle));
    }

    fn set_material_float(&mut self, material: BackendHandle, name: &str, value: f32) {
        lock(&self.state).calls.push(BackendCall::SetFloat(material, name.to_string(), value));
    }

    fn set_material_vector(&mut self, material: BackendHandle, name: &str, value: Vec4) {
        lock(&self.state).calls.push(BackendCall::SetVector(material, name.to_string(), value));
    }

    fn set_material_texture(&mut self, material: BackendHandle, name: &str, texture: BackendHandle) {
        lock(&self.state).calls.push(BackendCall::SetTexture(material, name.to_string(), texture));
    }

    fn upload_mesh(&mut self, mesh: BackendHandle, data: &MeshData) -> BackendResult<()> {
        lock(&self.state).calls.push(BackendCall::UploadMesh(mesh, data.clone()));
        Ok(())
    }

    fn set_texture_pixels(&mut self, texture: BackendHandle, pixels: &[u8]) -> BackendResult<()> {
        lock(&self.state).calls.push(BackendCall::SetPixels(texture, pixels.to_vec()));
        Ok(())
    }

    fn generate_mip_maps(&mut self, render_texture: BackendHandle) {
        lock(&self.state).calls.push(BackendCall::GenerateMipMaps(render_texture));
    }
}

/// A call made on [`RecordingSceneBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCall {
    CreateNode(SceneObjectId, usize),
    CreateContainer(SceneObjectId, String),
    Destroy(SceneObjectId),
    SetParent(SceneObjectId, Option<SceneObjectId>),
    SetActive(SceneObjectId, bool),
    SetName(SceneObjectId, String),
    SetMesh(SceneObjectId, Option<BackendHandle>),
    SetMaterial(SceneObjectId, BackendHandle),
    SetCollider(SceneObjectId, bool, Option<BackendHandle>),
    SetLocation(SceneObjectId, DVec3),
}

#[derive(Debug, Default)]
struct SceneState {
    calls: Vec<SceneCall>,
    next_id: u64,
    nodes_created: usize,
    containers: Vec<String>,
    live: HashSet<SceneObjectId>,
}

impl SceneState {
    fn allocate(&mut self) -> SceneObjectId {
        let object = SceneObjectId(self.next_id);
        self.next_id += 1;
        self.live.insert(object);
        object
    }
}

/// Scene graph backend that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingSceneBackend {
    state: Arc<Mutex<SceneState>>,
}

impl RecordingSceneBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SceneCall> {
        lock(&self.state).calls.clone()
    }

    pub fn nodes_created(&self) -> usize {
        lock(&self.state).nodes_created
    }

    pub fn containers(&self) -> Vec<String> {
        lock(&self.state).containers.clone()
    }

    pub fn live_objects(&self) -> usize {
        lock(&self.state).live.len()
    }
}

impl SceneGraphBackend for RecordingSceneBackend {
    fn create_node(&mut self, index: usize) -> SceneObjectId {
        let mut state = lock(&self.state);
        let object = state.allocate();
        state.nodes_created += 1;
        state.calls.push(SceneCall::CreateNode(object, index));
        object
    }

    fn create_container(&mut self, name: &str) -> SceneObjectId {
        let mut state = lock(&self.state);
        let object = state.allocate();
        state.containers.push(name.to_string());
        state.calls.push(SceneCall::CreateContainer(object, name.to_string()));
        object
    }

    fn destroy_object(&mut self, object: SceneObjectId) {
        let mut state = lock(&self.state);
        state.live.remove(&object);
        state.calls.push(SceneCall::Destroy(object));
    }

    fn set_parent(&mut self, object: SceneObjectId, parent: Option<SceneObjectId>) {
        lock(&self.state).calls.push(SceneCall::SetParent(object, parent));
    }

    fn set_active(&mut self, object: SceneObjectId, active: bool) {
        lock(&self.state).calls.push(SceneCall::SetActive(object, active));
    }

    fn set_name(&mut self, object: SceneObjectId, name: &str) {
        lock(&self.state).calls.push(SceneCall::SetName(object, name.to_string()));
    }

    fn set_mesh(&mut self, object: SceneObjectId, mesh: Option<BackendHandle>) {
        lock(&self.state).calls.push(SceneCall::SetMesh(object, mesh));
    }

    fn set_material(&mut self, object: SceneObjectId, material: BackendHandle) {
        lock(&self.state).calls.push(SceneCall::SetMaterial(object, material));
    }

    fn set_collider(&mut self, object: SceneObjectId, enabled: bool, mesh: Option<BackendHandle>) {
        lock(&self.state).calls.push(SceneCall::SetCollider(object, enabled, mesh));
    }

    fn set_location(&mut self, object: SceneObjectId, location: DVec3) {
        lock(&self.state).calls.push(SceneCall::SetLocation(object, location));
    }
}

/// One recorded composition: layers and target
pub type Composition = (Vec<ComposableImage>, BackendHandle);

/// Image composer that records its inputs
#[derive(Debug, Clone, Default)]
pub struct RecordingComposer {
    compositions: Arc<Mutex<Vec<Composition>>>,
}

impl RecordingComposer {
    pub fn compositions(&self) -> Vec<Composition> {
        lock(&self.compositions).clone()
    }
}

impl ImageComposer for RecordingComposer {
    fn compose(&mut self, layers: &[ComposableImage], target: &GpuRenderTexture) -> BackendResult<()> {
        lock(&self.compositions).push((layers.to_vec(), target.handle));
        Ok(())
    }
}

/// One recorded normal map computation
#[derive(Debug, Clone, PartialEq)]
pub struct NormalMapRequest {
    pub elevation: BackendHandle,
    pub tile_extent: Vec4,
    pub texture_extent: Vec4,
    pub target: BackendHandle,
}

/// Normal map generator that records its inputs
#[derive(Debug, Clone, Default)]
pub struct RecordingNormalMapGenerator {
    requests: Arc<Mutex<Vec<NormalMapRequest>>>,
}

impl RecordingNormalMapGenerator {
    pub fn requests(&self) -> Vec<NormalMapRequest> {
        lock(&self.requests).clone()
    }
}

impl NormalMapGenerator for RecordingNormalMapGenerator {
    fn compute(
        &mut self,
        elevation: &GpuTexture,
        tile_extent: Vec4,
        texture_extent: Vec4,
        target: &GpuRenderTexture,
    ) -> BackendResult<()> {
        lock(&self.requests).push(NormalMapRequest {
            elevation: elevation.handle,
            tile_extent,
            texture_extent,
            target: target.handle,
        });
        Ok(())
    }
}

/// Inspection handles onto a renderer built by [`test_renderer`]
#[derive(Debug, Clone, Default)]
pub struct MockHandles {
    pub graphics: RecordingGraphicsBackend,
    pub scene: RecordingSceneBackend,
    pub composer: RecordingComposer,
    pub normals: RecordingNormalMapGenerator,
}

/// Renderer on recording backends with `initial_size` pooled nodes
pub fn test_renderer(initial_size: usize) -> (Renderer, MockHandles) {
    let mut config = RendererConfig::default().with_pool(PoolConfig::new(initial_size));
    config.logging.test_mode = true;
    crate::foundation::logging::init_with_config(&config.logging);

    let mocks = MockHandles::default();
    let renderer = Renderer::new(
        config,
        Box::new(mocks.graphics.clone()),
        Box::new(mocks.scene.clone()),
        Box::new(mocks.composer.clone()),
        Box::new(mocks.normals.clone()),
    )
    .expect("renderer");

    (renderer, mocks)
}
