//! # Host Backend Abstraction
//!
//! The bridge never touches a graphics API directly. Everything that allocates
//! or mutates host objects goes through the traits in this module:
//!
//! - [`GraphicsBackend`]: materials, meshes, textures and render targets
//! - [`ImageComposer`]: layered blending of textures into a render target
//! - [`NormalMapGenerator`]: normal maps derived from elevation textures
//!
//! Backends hand out opaque [`BackendHandle`]s. The registry owns the mapping
//! from producer ids to handles; backends own the objects behind them.

use std::fmt;

use super::resources::{
    GpuRenderTexture, GpuTexture, MaterialSource, MeshData, RenderTextureDescriptor,
    TextureDescriptor,
};
use super::RenderError;
use crate::foundation::math::Vec4;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Opaque reference to an object owned by the graphics backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendHandle(pub u64);

impl fmt::Display for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The four resource namespaces kept by the registry
///
/// Ids are unique within a kind and may repeat across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Shader + parameter block
    Material,
    /// Vertex and index streams
    Mesh,
    /// Sampled 2D texture
    Texture,
    /// Writable render target
    RenderTexture,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Material => "material",
            Self::Mesh => "mesh",
            Self::Texture => "texture",
            Self::RenderTexture => "render texture",
        };
        f.write_str(name)
    }
}

/// # Graphics Backend Trait
///
/// Allocation calls are fallible; property setters are fire-and-forget, the
/// same way a host engine's material API behaves.
pub trait GraphicsBackend: Send {
    /// Create a material from a shader path or by cloning a template
    fn create_material(&mut self, source: MaterialSource<'_>) -> BackendResult<BackendHandle>;

    /// Create an empty, dynamic mesh
    fn create_mesh(&mut self) -> BackendResult<BackendHandle>;

    /// Allocate a sampled texture
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> BackendResult<BackendHandle>;

    /// Allocate a render target
    fn create_render_texture(&mut self, descriptor: &RenderTextureDescriptor) -> BackendResult<BackendHandle>;

    /// Release the GPU memory of a render target ahead of destroying it
    fn release_render_texture(&mut self, handle: BackendHandle);

    /// Destroy an object of the given kind
    fn destroy(&mut self, kind: ResourceKind, handle: BackendHandle);

    /// Set a float shader parameter
    fn set_material_float(&mut self, material: BackendHandle, name: &str, value: f32);

    /// Set a vector shader parameter
    fn set_material_vector(&mut self, material: BackendHandle, name: &str, value: Vec4);

    /// Bind a texture or render target to a shader parameter
    fn set_material_texture(&mut self, material: BackendHandle, name: &str, texture: BackendHandle);

    /// Replace every vertex stream of a mesh and recompute its bounds
    ///
    /// UV data goes to the channels listed by [`MeshData::uv_channels`].
    fn upload_mesh(&mut self, mesh: BackendHandle, data: &MeshData) -> BackendResult<()>;

    /// Upload raw texel data
    fn set_texture_pixels(&mut self, texture: BackendHandle, pixels: &[u8]) -> BackendResult<()>;

    /// Regenerate a render target's mip chain
    fn generate_mip_maps(&mut self, render_texture: BackendHandle);
}

/// One input layer of an image composition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposableImage {
    /// Source texture
    pub texture: BackendHandle,
    /// Destination region in target UV space
    pub region: Vec4,
    /// Layer opacity
    pub opacity: f32,
}

/// Blends texture layers into a render target, bottom layer first
pub trait ImageComposer: Send {
    /// Compose `layers` into `target`
    fn compose(&mut self, layers: &[ComposableImage], target: &GpuRenderTexture) -> BackendResult<()>;
}

/// Derives a normal map from an elevation texture
pub trait NormalMapGenerator: Send {
    /// Compute the normal map for one tile into `target`
    fn compute(
        &mut self,
        elevation: &GpuTexture,
        tile_extent: Vec4,
        texture_extent: Vec4,
        target: &GpuRenderTexture,
    ) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_names() {
        assert_eq!(ResourceKind::RenderTexture.to_string(), "render texture");
        assert_eq!(ResourceKind::Mesh.to_string(), "mesh");
        assert_eq!(BackendHandle(12).to_string(), "#12");
    }
}
