//! GPU Resource Registry
//!
//! Four independent id-keyed stores, one per resource kind. The registry is the
//! single owner of every backend object it creates; callers borrow entries for
//! the duration of a frame and refer to them by id otherwise.
//!
//! Creating an id that already exists, or destroying one that does not, means
//! producer and consumer disagree about what is alive. Both are reported as
//! errors and never ignored.

use std::collections::HashMap;

use super::material::{GpuMaterial, MaterialSource, RenderPipeline, ShaderLibrary};
use super::mesh::GpuMesh;
use super::texture::{
    native_render_texture_format, native_texture_format, GpuRenderTexture, GpuTexture,
    RenderTextureDescriptor, TextureDescriptor,
};
use crate::foundation::logging::{debug, info};
use crate::protocol::MaterialType;
use crate::render::backend::{GraphicsBackend, ResourceKind};
use crate::render::{RenderError, RenderResult};

/// Per-kind entry counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Live materials
    pub materials: usize,
    /// Live meshes
    pub meshes: usize,
    /// Live textures
    pub textures: usize,
    /// Live render textures
    pub render_textures: usize,
}

impl RegistryStats {
    /// Sum over all kinds
    pub fn total(&self) -> usize {
        self.materials + self.meshes + self.textures + self.render_textures
    }
}

/// Id-keyed owner of every GPU resource created by the producer
pub struct GpuResourceRegistry {
    backend: Box<dyn GraphicsBackend>,
    shaders: ShaderLibrary,
    render_pipeline: RenderPipeline,
    materials: HashMap<u32, GpuMaterial>,
    meshes: HashMap<u32, GpuMesh>,
    textures: HashMap<u32, GpuTexture>,
    render_textures: HashMap<u32, GpuRenderTexture>,
}

impl GpuResourceRegistry {
    /// Create an empty registry on top of a graphics backend
    pub fn new(backend: Box<dyn GraphicsBackend>, render_pipeline: RenderPipeline) -> Self {
        info!("Creating GPU resource registry for {render_pipeline:?} pipeline");
        Self {
            backend,
            shaders: ShaderLibrary::with_standard_variants(),
            render_pipeline,
            materials: HashMap::new(),
            meshes: HashMap::new(),
            textures: HashMap::new(),
            render_textures: HashMap::new(),
        }
    }

    /// Replace the shader variant table
    pub fn with_shader_library(mut self, shaders: ShaderLibrary) -> Self {
        self.shaders = shaders;
        self
    }

    /// Active render pipeline
    pub fn render_pipeline(&self) -> RenderPipeline {
        self.render_pipeline
    }

    /// Shader variant table
    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    /// Direct access to the backend for property updates on live resources
    pub fn backend_mut(&mut self) -> &mut dyn GraphicsBackend {
        self.backend.as_mut()
    }

    // Creation

    /// Create a material
    ///
    /// A non-zero `template` clones that producer material; otherwise the
    /// shader variant for `material_type` on the active pipeline is used.
    pub fn create_material(&mut self, id: u32, material_type: MaterialType, template: u64) -> RenderResult<&GpuMaterial> {
        ensure_absent(&self.materials, ResourceKind::Material, id)?;

        let source = if template != 0 {
            MaterialSource::Template(template)
        } else {
            MaterialSource::Shader(self.shaders.resolve(material_type, self.render_pipeline))
        };
        debug!("Creating material {id} from {source:?}");

        let handle = self.backend.create_material(source)?;
        let material = GpuMaterial { handle, material_type, template };
        Ok(self.materials.entry(id).or_insert(material))
    }

    /// Create an empty mesh
    pub fn create_mesh(&mut self, id: u32) -> RenderResult<&GpuMesh> {
        ensure_absent(&self.meshes, ResourceKind::Mesh, id)?;

        let handle = self.backend.create_mesh()?;
        Ok(self.meshes.entry(id).or_insert_with(|| GpuMesh::new(handle)))
    }

    /// Create a sampled texture from a raw protocol format
    ///
    /// Unsupported formats are logged and replaced, never rejected.
    pub fn create_texture(&mut self, id: u32, width: u32, height: u32, texture_format: i32, is_srgb: bool) -> RenderResult<&GpuTexture> {
        ensure_absent(&self.textures, ResourceKind::Texture, id)?;

        let descriptor = TextureDescriptor::new(width, height, native_texture_format(texture_format), is_srgb);
        let handle = self.backend.create_texture(&descriptor)?;
        Ok(self.textures.entry(id).or_insert(GpuTexture { handle, descriptor }))
    }

    /// Create a render target from a raw protocol format
    pub fn create_render_texture(&mut self, id: u32, width: u32, height: u32, texture_format: i32, has_mip_maps: bool) -> RenderResult<&GpuRenderTexture> {
        ensure_absent(&self.render_textures, ResourceKind::RenderTexture, id)?;

        let descriptor =
            RenderTextureDescriptor::new(width, height, native_render_texture_format(texture_format), has_mip_maps);
        let handle = self.backend.create_render_texture(&descriptor)?;
        Ok(self.render_textures.entry(id).or_insert(GpuRenderTexture { handle, descriptor }))
    }

    // Destruction

    /// Destroy a material
    pub fn destroy_material(&mut self, id: u32) -> RenderResult<()> {
        let material = self
            .materials
            .remove(&id)
            .ok_or(RenderError::UnknownResourceId { kind: ResourceKind::Material, id })?;
        self.backend.destroy(ResourceKind::Material, material.handle);
        Ok(())
    }

    /// Destroy a mesh
    pub fn destroy_mesh(&mut self, id: u32) -> RenderResult<()> {
        let mesh = self
            .meshes
            .remove(&id)
            .ok_or(RenderError::UnknownResourceId { kind: ResourceKind::Mesh, id })?;
        self.backend.destroy(ResourceKind::Mesh, mesh.handle);
        Ok(())
    }

    /// Destroy a texture
    pub fn destroy_texture(&mut self, id: u32) -> RenderResult<()> {
        let texture = self
            .textures
            .remove(&id)
            .ok_or(RenderError::UnknownResourceId { kind: ResourceKind::Texture, id })?;
        self.backend.destroy(ResourceKind::Texture, texture.handle);
        Ok(())
    }

    /// Release and destroy a render target
    pub fn destroy_render_texture(&mut self, id: u32) -> RenderResult<()> {
        let render_texture = self
            .render_textures
            .remove(&id)
            .ok_or(RenderError::UnknownResourceId { kind: ResourceKind::RenderTexture, id })?;
        self.backend.release_render_texture(render_texture.handle);
        self.backend.destroy(ResourceKind::RenderTexture, render_texture.handle);
        Ok(())
    }

    /// Destroy every resource of every kind
    pub fn release_all(&mut self) {
        let stats = self.stats();
        info!("Releasing {} GPU resources", stats.total());

        for (_, material) in self.materials.drain() {
            self.backend.destroy(ResourceKind::Material, material.handle);
        }
        for (_, mesh) in self.meshes.drain() {
            self.backend.destroy(ResourceKind::Mesh, mesh.handle);
        }
        for (_, texture) in self.textures.drain() {
            self.backend.destroy(ResourceKind::Texture, texture.handle);
        }
        for (_, render_texture) in self.render_textures.drain() {
            self.backend.release_render_texture(render_texture.handle);
            self.backend.destroy(ResourceKind::RenderTexture, render_texture.handle);
        }
    }

    // Lookup

    /// Material by id
    pub fn material(&self, id: u32) -> Option<&GpuMaterial> {
        self.materials.get(&id)
    }

    /// Mesh by id
    pub fn mesh(&self, id: u32) -> Option<&GpuMesh> {
        self.meshes.get(&id)
    }

    /// Mutable mesh by id
    pub fn mesh_mut(&mut self, id: u32) -> Option<&mut GpuMesh> {
        self.meshes.get_mut(&id)
    }

    /// Texture by id
    pub fn texture(&self, id: u32) -> Option<&GpuTexture> {
        self.textures.get(&id)
    }

    /// Render texture by id
    pub fn render_texture(&self, id: u32) -> Option<&GpuRenderTexture> {
        self.render_textures.get(&id)
    }

    /// Material that must exist
    pub fn require_material(&self, id: u32) -> RenderResult<&GpuMaterial> {
        self.material(id).ok_or(RenderError::UnknownResourceId { kind: ResourceKind::Material, id })
    }

    /// Mesh that must exist
    pub fn require_mesh_mut(&mut self, id: u32) -> RenderResult<&mut GpuMesh> {
        self.meshes
            .get_mut(&id)
            .ok_or(RenderError::UnknownResourceId { kind: ResourceKind::Mesh, id })
    }

    /// Texture that must exist
    pub fn require_texture(&self, id: u32) -> RenderResult<&GpuTexture> {
        self.texture(id).ok_or(RenderError::UnknownResourceId { kind: ResourceKind::Texture, id })
    }

    /// Render texture that must exist
    pub fn require_render_texture(&self, id: u32) -> RenderResult<&GpuRenderTexture> {
        self.render_texture(id)
            .ok_or(RenderError::UnknownResourceId { kind: ResourceKind::RenderTexture, id })
    }

    /// Whether an id is live in the given namespace
    pub fn contains(&self, kind: ResourceKind, id: u32) -> bool {
        match kind {
            ResourceKind::Material => self.materials.contains_key(&id),
            ResourceKind::Mesh => self.meshes.contains_key(&id),
            ResourceKind::Texture => self.textures.contains_key(&id),
            ResourceKind::RenderTexture => self.render_textures.contains_key(&id),
        }
    }

    /// Number of live entries of one kind
    pub fn len_of(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Material => self.materials.len(),
            ResourceKind::Mesh => self.meshes.len(),
            ResourceKind::Texture => self.textures.len(),
            ResourceKind::RenderTexture => self.render_textures.len(),
        }
    }

    /// Number of live entries over all kinds
    pub fn len(&self) -> usize {
        self.stats().total()
    }

    /// Whether every store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-kind counts
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            materials: self.materials.len(),
            meshes: self.meshes.len(),
            textures: self.textures.len(),
            render_textures: self.render_textures.len(),
        }
    }
}

impl std::fmt::Debug for GpuResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuResourceRegistry")
            .field("render_pipeline", &self.render_pipeline)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn ensure_absent<T>(store: &HashMap<u32, T>, kind: ResourceKind, id: u32) -> RenderResult<()> {
    if store.contains_key(&id) {
        return Err(RenderError::DuplicateResourceId { kind, id });
    }
    Ok(())
}
