//! GPU resources owned by the bridge
//!
//! - [`registry`]: id-keyed stores for the four resource kinds
//! - [`material`]: shader variant resolution
//! - [`texture`]: pixel format tables and texture descriptors
//! - [`mesh`]: vertex stream storage

pub mod material;
pub mod mesh;
pub mod registry;
pub mod texture;

pub use material::{
    legacy_shader, material_type_from_raw, GpuMaterial, MaterialSource, RenderPipeline, ShaderLibrary,
};
pub use mesh::{
    GpuMesh, MeshData, MeshStream, UvChannel, BASE_TEXTURE_UV_CHANNEL, FEATURE_INDICES_UV_CHANNEL,
    UV_REGION_IDS_UV_CHANNEL,
};
pub use registry::{GpuResourceRegistry, RegistryStats};
pub use texture::{
    native_render_texture_format, native_texture_format, ColorSpace, FilterMode, GpuRenderTexture,
    GpuTexture, NativeRenderTextureFormat, NativeTextureFormat, RenderTextureDescriptor,
    TextureDescriptor, WrapMode,
};
