//! Render Command Client
//!
//! Applies decoded render commands to the GPU resource registry and the scene
//! node pool. Commands between `CommandGroupBegin` and `CommandGroupEnd` are
//! held back and applied together when the group closes, so a stream that
//! turns out to be malformed halfway through a group applies none of it.

use super::backend::{ComposableImage, ImageComposer, NormalMapGenerator};
use super::payload::{read_array, read_name, view_bytes, PayloadSource};
use super::resources::{
    material_type_from_raw, GpuResourceRegistry, GpuTexture, MeshData, MeshStream, TextureDescriptor,
};
use super::resources::texture::NativeTextureFormat;
use super::{RenderError, RenderResult};
use crate::foundation::logging::{debug, trace, warn};
use crate::foundation::math::{vec4_from_array, Vec4};
use crate::protocol::params::*;
use crate::protocol::{
    DecodedCommandQueue, MaterialRenderTargetProperty, MaterialScalarProperty, MaterialTextureProperty,
    MaterialVectorProperty, MeshBufferChangeType, RenderCommand,
};
use crate::render::backend::ResourceKind;
use crate::scene::SceneNodePool;

/// Shader parameter for a scalar material property
pub fn scalar_shader_parameter(property: MaterialScalarProperty) -> Option<&'static str> {
    match property {
        MaterialScalarProperty::ClippingMode => Some("_ClippingMode"),
        MaterialScalarProperty::UseUvRegionLut => Some("_UseUvRegionLut"),
        MaterialScalarProperty::Opacity => Some("_Opacity"),
        MaterialScalarProperty::BlendFactor | MaterialScalarProperty::PositionsBlendFactor => None,
    }
}

/// Shader parameter for a vector material property
pub fn vector_shader_parameter(property: MaterialVectorProperty) -> Option<&'static str> {
    match property {
        MaterialVectorProperty::MapAreaMin => Some("_MapAreaMin"),
        MaterialVectorProperty::MapAreaMax => Some("_MapAreaMax"),
    }
}

/// Shader parameter for a texture material slot
pub fn texture_shader_parameter(property: MaterialTextureProperty) -> Option<&'static str> {
    match property {
        MaterialTextureProperty::BaseMap => Some("_MainTex"),
        MaterialTextureProperty::UvRegionLut => Some("_UVRegionLUT"),
        MaterialTextureProperty::FeatureIds => Some("_FeatureIds"),
        MaterialTextureProperty::PositionsMap0 => Some("_VertexOffset"),
        MaterialTextureProperty::PositionsMap1 => None,
    }
}

/// Shader parameter for a render target material slot
pub fn render_target_shader_parameter(property: MaterialRenderTargetProperty) -> Option<&'static str> {
    match property {
        MaterialRenderTargetProperty::ImageryMap0 => Some("_MainTex"),
        MaterialRenderTargetProperty::NormalMap0 => Some("_BumpMap"),
        MaterialRenderTargetProperty::ImageryMap1 | MaterialRenderTargetProperty::NormalMap1 => None,
    }
}

/// Applies render commands
pub struct RenderCommandClient {
    composer: Box<dyn ImageComposer>,
    normal_generator: Box<dyn NormalMapGenerator>,
    flat_elevation: Option<GpuTexture>,
}

impl RenderCommandClient {
    /// Create a client, allocating its 1x1 flat elevation texture on the registry's backend
    pub fn new(
        registry: &mut GpuResourceRegistry,
        composer: Box<dyn ImageComposer>,
        normal_generator: Box<dyn NormalMapGenerator>,
    ) -> RenderResult<Self> {
        let descriptor = TextureDescriptor::new(1, 1, NativeTextureFormat::RFloat, false);
        let backend = registry.backend_mut();
        let handle = backend.create_texture(&descriptor)?;
        backend.set_texture_pixels(handle, bytemuck::bytes_of(&0.0_f32))?;

        Ok(Self {
            composer,
            normal_generator,
            flat_elevation: Some(GpuTexture { handle, descriptor }),
        })
    }

    /// Texture used for tiles without elevation data, `None` once released
    pub fn flat_elevation(&self) -> Option<&GpuTexture> {
        self.flat_elevation.as_ref()
    }

    /// Decode and apply a whole command queue
    ///
    /// Returns the number of commands applied. Stops at the first decode or
    /// apply error; commands of a group that was still open are dropped.
    pub fn execute_queue(
        &mut self,
        queue: DecodedCommandQueue<'_>,
        registry: &mut GpuResourceRegistry,
        pool: &mut SceneNodePool,
        payloads: &dyn PayloadSource,
    ) -> RenderResult<usize> {
        let mut group: Option<Vec<RenderCommand>> = None;
        let mut applied = 0;

        for command in queue {
            match command? {
                RenderCommand::CommandGroupBegin(_) => group = Some(Vec::new()),
                RenderCommand::CommandGroupEnd(_) => {
                    let staged = group.take().unwrap_or_default();
                    trace!("Applying command group of {} commands", staged.len());
                    for command in staged {
                        self.execute(command, registry, pool, payloads)?;
                        applied += 1;
                    }
                }
                command => match group.as_mut() {
                    Some(staged) => staged.push(command),
                    None => {
                        self.execute(command, registry, pool, payloads)?;
                        applied += 1;
                    }
                },
            }
        }

        Ok(applied)
    }

    /// Apply a single command
    ///
    /// Group markers are ignored here; grouping is handled by
    /// [`Self::execute_queue`].
    pub fn execute(
        &mut self,
        command: RenderCommand,
        registry: &mut GpuResourceRegistry,
        pool: &mut SceneNodePool,
        payloads: &dyn PayloadSource,
    ) -> RenderResult<()> {
        trace!("Executing {}", command.command_type());

        match command {
            // Creation
            RenderCommand::CreateMaterial(params) => {
                let material_type = material_type_from_raw(params.material_type);
                registry.create_material(params.material_id, material_type, params.material_template)?;
            }
            RenderCommand::CreateRenderTarget(params) => {
                registry.create_render_texture(
                    params.render_target_id,
                    params.width,
                    params.height,
                    params.texture_format,
                    params.has_mip_maps(),
                )?;
            }
            RenderCommand::CreateTexture(params) => {
                registry.create_texture(
                    params.texture_id,
                    params.width,
                    params.height,
                    params.texture_format,
                    params.is_srgb(),
                )?;
            }
            RenderCommand::CreateSceneComponent(params) => {
                pool.create(params.scene_component_id, params.layer_id)?;
            }

            // Destruction
            RenderCommand::DestroyMaterial(params) => registry.destroy_material(params.material_id)?,
            RenderCommand::DestroyRenderTarget(params) => {
                registry.destroy_render_texture(params.render_target_id)?;
            }
            RenderCommand::DestroyTexture(params) => registry.destroy_texture(params.texture_id)?,
            RenderCommand::DestroySceneComponent(params) => {
                let id = params.scene_component_id;
                pool.destroy(id)?;
                if registry.contains(ResourceKind::Mesh, id) {
                    registry.destroy_mesh(id)?;
                }
            }

            // Scene components
            RenderCommand::SetVisible(params) => {
                pool.set_visible(params.scene_component_id, params.is_visible())?;
            }
            RenderCommand::SetMaterial(params) => Self::set_material(&params, registry, pool)?,
            RenderCommand::SetMesh(params) => Self::set_mesh(&params, registry, pool, payloads)?,
            RenderCommand::SetMeshBuffer(params) => {
                Self::set_mesh_buffer(&params, registry, pool, payloads)?;
            }
            RenderCommand::SetSceneComponentPivot(params) => {
                pool.set_location(params.scene_component_id, params.location())?;
            }

            // Textures and render targets
            RenderCommand::SetTexturePixelData(params) => {
                let handle = registry.require_texture(params.texture_id)?.handle;
                let pixels = view_bytes(payloads, &params.pixels)?;
                registry.backend_mut().set_texture_pixels(handle, pixels)?;
            }
            RenderCommand::GenerateMipMaps(params) => {
                let handle = registry.require_render_texture(params.render_target_id)?.handle;
                registry.backend_mut().generate_mip_maps(handle);
            }

            // Materials
            RenderCommand::SetMaterialScalarProperty(params) => {
                Self::set_scalar_property(&params, registry)?;
            }
            RenderCommand::SetMaterialVectorProperty(params) => {
                Self::set_vector_property(&params, registry)?;
            }
            RenderCommand::SetMaterialTextureProperty(params) => {
                Self::set_texture_property(&params, registry)?;
            }
            RenderCommand::SetMaterialRenderTargetProperty(params) => {
                Self::set_render_target_property(&params, registry)?;
            }
            RenderCommand::SetMaterialNamedTextureProperty(params) => {
                let material = registry.require_material(params.material_id)?.handle;
                let texture = registry.require_texture(params.value)?.handle;
                let name = read_name(payloads, &params.texture_name)?;
                registry.backend_mut().set_material_texture(material, &name, texture);
            }

            // Composition
            RenderCommand::MultipleCompose(params) => {
                self.multiple_compose(&params, registry, payloads)?;
            }
            RenderCommand::Compose(params) => {
                let layers = [
                    Self::layer(registry, params.source_id_1, params.region(), 1.0)?,
                    Self::layer(registry, params.source_id_2, params.region(), params.alpha)?,
                ];
                let target = registry.require_render_texture(params.target_id)?;
                self.composer.compose(&layers, target)?;
            }
            RenderCommand::Copy(params) => {
                let layers = [Self::layer(registry, params.source_id, params.region(), 1.0)?];
                let target = registry.require_render_texture(params.target_id)?;
                self.composer.compose(&layers, target)?;
            }
            RenderCommand::GenerateNormalTexture(params) => {
                self.generate_normal_texture(&params, registry)?;
            }

            RenderCommand::CommandGroupBegin(_) | RenderCommand::CommandGroupEnd(_) => {}
        }

        Ok(())
    }

    fn set_material(
        params: &SetMaterialParams,
        registry: &GpuResourceRegistry,
        pool: &mut SceneNodePool,
    ) -> RenderResult<()> {
        let material = registry.require_material(params.material_id)?.handle;
        pool.set_material(
            params.scene_component_id,
            params.material_id,
            material,
            params.oriented_bounding_box.to_obb(),
            params.mask_terrain(),
        )
    }

    fn set_mesh(
        params: &SetMeshParams,
        registry: &mut GpuResourceRegistry,
        pool: &mut SceneNodePool,
        payloads: &dyn PayloadSource,
    ) -> RenderResult<()> {
        let id = params.scene_component_id;
        let needs_mesh = pool.require(id)?.mesh().is_none();

        let data = MeshData {
            triangles: read_array(payloads, &params.triangles)?,
            positions: read_array(payloads, &params.positions)?,
            normals: read_array(payloads, &params.normals)?,
            tangents: read_array(payloads, &params.tangents)?,
            uvs: read_array(payloads, &params.uvs)?,
            colors: read_array(payloads, &params.colors)?,
            uv_region_ids: read_array(payloads, &params.uv_region_ids)?,
            feature_indices: read_array(payloads, &params.feature_indices)?,
        };

        if needs_mesh {
            let handle = registry.create_mesh(id)?.handle;
            pool.set_mesh(id, Some(handle))?;
        }

        Self::upload_mesh(registry, id, |mesh_data| *mesh_data = data)
    }

    fn set_mesh_buffer(
        params: &SetMeshBufferParams,
        registry: &mut GpuResourceRegistry,
        pool: &SceneNodePool,
        payloads: &dyn PayloadSource,
    ) -> RenderResult<()> {
        let id = params.scene_component_id;
        pool.require(id)?;

        let stream = match MeshBufferChangeType::from_raw(params.change_type) {
            Some(MeshBufferChangeType::Positions) => MeshStream::Positions(read_array(payloads, &params.buffer)?),
            Some(MeshBufferChangeType::Normals) => MeshStream::Normals(read_array(payloads, &params.buffer)?),
            Some(MeshBufferChangeType::Tangents) => MeshStream::Tangents(read_array(payloads, &params.buffer)?),
            Some(MeshBufferChangeType::Colors) => MeshStream::Colors(read_array(payloads, &params.buffer)?),
            Some(MeshBufferChangeType::Uv0) => MeshStream::Uvs(read_array(payloads, &params.buffer)?),
            other => {
                debug!("Ignoring mesh buffer change {other:?} (raw {}) for {id}", params.change_type);
                return Ok(());
            }
        };

        Self::upload_mesh(registry, id, |mesh_data| mesh_data.apply(stream))
    }

    fn upload_mesh(
        registry: &mut GpuResourceRegistry,
        id: u32,
        update: impl FnOnce(&mut MeshData),
    ) -> RenderResult<()> {
        let mesh = registry.require_mesh_mut(id)?;
        update(&mut mesh.data);
        let handle = mesh.handle;
        let data = std::mem::take(&mut mesh.data);

        let result = registry.backend_mut().upload_mesh(handle, &data);
        registry.require_mesh_mut(id)?.data = data;
        result
    }

    fn set_scalar_property(params: &SetMaterialScalarPropertyParams, registry: &mut GpuResourceRegistry) -> RenderResult<()> {
        let material = registry.require_material(params.material_id)?.handle;
        let Some(name) = MaterialScalarProperty::from_raw(params.property).and_then(scalar_shader_parameter) else {
            warn!("Scalar material property {} not supported", params.property);
            return Ok(());
        };
        registry.backend_mut().set_material_float(material, name, params.value);
        Ok(())
    }

    fn set_vector_property(params: &SetMaterialVectorPropertyParams, registry: &mut GpuResourceRegistry) -> RenderResult<()> {
        let material = registry.require_material(params.material_id)?.handle;
        let Some(name) = MaterialVectorProperty::from_raw(params.property).and_then(vector_shader_parameter) else {
            warn!("Vector material property {} not supported", params.property);
            return Ok(());
        };
        registry.backend_mut().set_material_vector(material, name, vec4_from_array(params.value));
        Ok(())
    }

    fn set_texture_property(params: &SetMaterialTexturePropertyParams, registry: &mut GpuResourceRegistry) -> RenderResult<()> {
        let material = registry.require_material(params.material_id)?.handle;
        let texture = registry.require_texture(params.value)?.handle;
        let Some(name) = MaterialTextureProperty::from_raw(params.property).and_then(texture_shader_parameter) else {
            warn!("Texture material property {} not supported", params.property);
            return Ok(());
        };
        registry.backend_mut().set_material_texture(material, name, texture);
        Ok(())
    }

    fn set_render_target_property(
        params: &SetMaterialRenderTargetPropertyParams,
        registry: &mut GpuResourceRegistry,
    ) -> RenderResult<()> {
        let material = registry.require_material(params.material_id)?.handle;
        let render_texture = registry.require_render_texture(params.value)?.handle;
        let Some(name) =
            MaterialRenderTargetProperty::from_raw(params.property).and_then(render_target_shader_parameter)
        else {
            warn!("Render target material property {} not supported", params.property);
            return Ok(());
        };
        registry.backend_mut().set_material_texture(material, name, render_texture);
        Ok(())
    }

    fn layer(registry: &GpuResourceRegistry, texture_id: u32, region: Vec4, opacity: f32) -> RenderResult<ComposableImage> {
        let texture = registry.require_texture(texture_id)?.handle;
        Ok(ComposableImage { texture, region, opacity })
    }

    fn multiple_compose(
        &mut self,
        params: &MultipleComposeParams,
        registry: &GpuResourceRegistry,
        payloads: &dyn PayloadSource,
    ) -> RenderResult<()> {
        let target = registry.require_render_texture(params.target_id)?;
        let elements: Vec<ComposedTextureElement> = read_array(payloads, &params.composed_textures)?;

        let layers = elements
            .iter()
            .map(|element| {
                Self::layer(registry, element.texture_id, vec4_from_array(element.region), element.opacity)
            })
            .collect::<RenderResult<Vec<_>>>()?;

        self.composer.compose(&layers, target)
    }

    fn generate_normal_texture(
        &mut self,
        params: &GenerateNormalTextureParams,
        registry: &GpuResourceRegistry,
    ) -> RenderResult<()> {
        let elevation = if params.elevation_id == 0 {
            self.flat_elevation.as_ref().ok_or(RenderError::Released)?
        } else {
            registry.require_texture(params.elevation_id)?
        };
        let target = registry.require_render_texture(params.target_id)?;

        let single_texel = elevation.width() == 1 || elevation.height() == 1;
        let bordered = elevation.width() == target.width() + 1 && elevation.height() == target.height() + 1;
        if !single_texel && !bordered {
            warn!(
                "Elevation texture {}x{} should be 1 texel or one texel larger than the {}x{} normal map",
                elevation.width(),
                elevation.height(),
                target.width(),
                target.height()
            );
        }

        self.normal_generator.compute(
            elevation,
            vec4_from_array(params.tile_extent),
            vec4_from_array(params.texture_extent),
            target,
        )
    }

    /// Destroy the client-owned flat elevation texture; later calls do nothing
    pub fn release(&mut self, registry: &mut GpuResourceRegistry) {
        if let Some(flat_elevation) = self.flat_elevation.take() {
            registry.backend_mut().destroy(ResourceKind::Texture, flat_elevation.handle);
        }
    }
}

impl std::fmt::Debug for RenderCommandClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCommandClient")
            .field("flat_elevation", &self.flat_elevation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_parameter_names() {
        assert_eq!(scalar_shader_parameter(MaterialScalarProperty::Opacity), Some("_Opacity"));
        assert_eq!(scalar_shader_parameter(MaterialScalarProperty::BlendFactor), None);
        assert_eq!(vector_shader_parameter(MaterialVectorProperty::MapAreaMax), Some("_MapAreaMax"));
        assert_eq!(texture_shader_parameter(MaterialTextureProperty::UvRegionLut), Some("_UVRegionLUT"));
        assert_eq!(texture_shader_parameter(MaterialTextureProperty::PositionsMap1), None);
        assert_eq!(render_target_shader_parameter(MaterialRenderTargetProperty::NormalMap0), Some("_BumpMap"));
        assert_eq!(render_target_shader_parameter(MaterialRenderTargetProperty::ImageryMap1), None);
    }

    #[test]
    fn test_flat_elevation_is_destroyed_once() {
        use crate::render::resources::RenderPipeline;
        use crate::tests::mock_backend::{
            BackendCall, RecordingComposer, RecordingGraphicsBackend, RecordingNormalMapGenerator,
        };

        let graphics = RecordingGraphicsBackend::new();
        let mut registry = GpuResourceRegistry::new(Box::new(graphics.clone()), RenderPipeline::Legacy);
        let mut client = RenderCommandClient::new(
            &mut registry,
            Box::new(RecordingComposer::default()),
            Box::new(RecordingNormalMapGenerator::default()),
        )
        .expect("client");
        let handle = client.flat_elevation().expect("flat elevation").handle;

        client.release(&mut registry);
        client.release(&mut registry);

        let destroys: Vec<BackendCall> = graphics
            .calls()
            .into_iter()
            .filter(|call| matches!(call, BackendCall::Destroy(..)))
            .collect();
        assert_eq!(destroys, vec![BackendCall::Destroy(ResourceKind::Texture, handle)]);
        assert!(client.flat_elevation().is_none());
        assert_eq!(graphics.live_objects(), 0);
    }
}
