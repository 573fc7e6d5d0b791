//! Fixed-layout parameter records
//!
//! Every record mirrors the producer's C layout field for field: natural
//! alignment, no reordering, padding written out as explicit zeroed fields.
//! Because of that each record is plain old data and can be read straight out
//! of the command buffer with `bytemuck`.
//!
//! Enumerations stay as raw `i32` and booleans as `u8`; the typed accessors
//! convert them.

use bytemuck::{Pod, Zeroable};

use super::enums::{
    MaterialRenderTargetProperty, MaterialScalarProperty, MaterialTextureProperty, MaterialType,
    MaterialVectorProperty, MeshBufferChangeType, TextureFormat,
};
use crate::foundation::math::{vec4_from_array, DQuat, DVec3, OrientedBoundingBox, Vec4};

/// View into producer memory that travels alongside the command stream
///
/// `data` is an address in the producer's address space. It is only meaningful
/// to a [`crate::render::PayloadSource`] that knows how to map it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct DataBufferView {
    /// Producer address of the first byte
    pub data: u64,
    /// Length in bytes
    pub size: u32,
    _pad: u32,
}

impl DataBufferView {
    /// Create a view over `size` bytes at `data`
    pub fn new(data: u64, size: u32) -> Self {
        Self { data, size, _pad: 0 }
    }

    /// A view that references nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the view covers no bytes
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Wire form of an oriented bounding box
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct WireOrientedBoundingBox {
    /// Center (x, y, z)
    pub center: [f64; 3],
    /// Half extents (x, y, z)
    pub extent: [f32; 3],
    _pad: u32,
    /// Orientation quaternion (x, y, z, w)
    pub orientation: [f64; 4],
}

impl WireOrientedBoundingBox {
    /// Create a wire bounding box
    pub fn new(center: [f64; 3], extent: [f32; 3], orientation: [f64; 4]) -> Self {
        Self { center, extent, _pad: 0, orientation }
    }

    /// Convert to the typed representation
    pub fn to_obb(&self) -> OrientedBoundingBox {
        let [cx, cy, cz] = self.center;
        let [ex, ey, ez] = self.extent;
        let [ox, oy, oz, ow] = self.orientation;
        OrientedBoundingBox::new(
            DVec3::new(cx, cy, cz),
            DVec3::new(f64::from(ex), f64::from(ey), f64::from(ez)),
            DQuat::new(ow, ox, oy, oz),
        )
    }
}

/// One layer of a `MultipleCompose` command
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ComposedTextureElement {
    /// Destination region (x, y, z, w) in target UV space
    pub region: [f32; 4],
    /// Source texture id
    pub texture_id: u32,
    /// Layer opacity
    pub opacity: f32,
}

/// `CreateMaterial`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct CreateMaterialParams {
    /// Material id
    pub material_id: u32,
    /// Raw [`MaterialType`]
    pub material_type: i32,
    /// Producer reference to a material to clone, 0 for none
    pub material_template: u64,
}

impl CreateMaterialParams {
    /// Create the record
    pub fn new(material_id: u32, material_type: MaterialType, material_template: u64) -> Self {
        Self { material_id, material_type: material_type.as_raw(), material_template }
    }

    /// Typed material type, `None` when the raw value is unknown
    pub fn material_type(&self) -> Option<MaterialType> {
        MaterialType::from_raw(self.material_type)
    }
}

/// `CreateRenderTarget`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct CreateRenderTargetParams {
    /// Render target id
    pub render_target_id: u32,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Raw [`TextureFormat`]
    pub texture_format: i32,
    has_mip_maps: u8,
    _pad: [u8; 3],
}

impl CreateRenderTargetParams {
    /// Create the record
    pub fn new(render_target_id: u32, width: u32, height: u32, texture_format: i32, has_mip_maps: bool) -> Self {
        Self {
            render_target_id,
            width,
            height,
            texture_format,
            has_mip_maps: u8::from(has_mip_maps),
            _pad: [0; 3],
        }
    }

    /// Whether the render target carries a mip chain
    pub fn has_mip_maps(&self) -> bool {
        self.has_mip_maps != 0
    }
}

/// `CreateTexture`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct CreateTextureParams {
    /// Texture id
    pub texture_id: u32,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Raw [`TextureFormat`]
    pub texture_format: i32,
    is_srgb: u8,
    _pad: [u8; 3],
}

impl CreateTextureParams {
    /// Create the record
    pub fn new(texture_id: u32, width: u32, height: u32, texture_format: i32, is_srgb: bool) -> Self {
        Self {
            texture_id,
            width,
            height,
            texture_format,
            is_srgb: u8::from(is_srgb),
            _pad: [0; 3],
        }
    }

    /// Whether texel data is sRGB encoded
    pub fn is_srgb(&self) -> bool {
        self.is_srgb != 0
    }

    /// Typed pixel format, `None` when the raw value is unknown
    pub fn texture_format(&self) -> Option<TextureFormat> {
        TextureFormat::from_raw(self.texture_format)
    }
}

/// `CreateSceneComponent`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct CreateSceneComponentParams {
    /// Scene component id
    pub scene_component_id: u32,
    /// Raw scene component type (currently unused by the consumer)
    pub scene_component_type: i32,
    /// Owning layer id
    pub layer_id: u32,
}

/// `DestroyMaterial`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct DestroyMaterialParams {
    /// Material id
    pub material_id: u32,
}

/// `DestroyRenderTarget`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct DestroyRenderTargetParams {
    /// Render target id
    pub render_target_id: u32,
}

/// `DestroyTexture`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct DestroyTextureParams {
    /// Texture id
    pub texture_id: u32,
}

/// `DestroySceneComponent`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct DestroySceneComponentParams {
    /// Scene component id
    pub scene_component_id: u32,
}

/// `MultipleCompose`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct MultipleComposeParams {
    /// Render target receiving the composition
    pub target_id: u32,
    _pad: u32,
    /// Array of [`ComposedTextureElement`]
    pub composed_textures: DataBufferView,
}

impl MultipleComposeParams {
    /// Create the record
    pub fn new(target_id: u32, composed_textures: DataBufferView) -> Self {
        Self { target_id, _pad: 0, composed_textures }
    }
}

/// `Compose`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ComposeParams {
    /// Bottom layer texture id
    pub source_id_1: u32,
    /// Top layer texture id
    pub source_id_2: u32,
    /// Opacity of the top layer
    pub alpha: f32,
    /// Render target receiving the composition
    pub target_id: u32,
    /// Destination region
    pub region: [f32; 4],
}

impl ComposeParams {
    /// Destination region as a vector
    pub fn region(&self) -> Vec4 {
        vec4_from_array(self.region)
    }
}

/// `Copy`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct CopyParams {
    /// Source texture id
    pub source_id: u32,
    /// Render target id
    pub target_id: u32,
    /// Destination region
    pub region: [f32; 4],
}

impl CopyParams {
    /// Destination region as a vector
    pub fn region(&self) -> Vec4 {
        vec4_from_array(self.region)
    }
}

/// `GenerateNormalTexture`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct GenerateNormalTextureParams {
    /// Elevation texture id, 0 for flat terrain
    pub elevation_id: u32,
    /// Tile extent in map units
    pub tile_extent: [f32; 4],
    /// Extent covered by the elevation texture
    pub texture_extent: [f32; 4],
    /// Render target receiving the normal map
    pub target_id: u32,
}

/// `SetTexturePixelData`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct SetTexturePixelDataParams {
    /// Texture id
    pub texture_id: u32,
    _pad: u32,
    /// Raw texel bytes
    pub pixels: DataBufferView,
}

impl SetTexturePixelDataParams {
    /// Create the record
    pub fn new(texture_id: u32, pixels: DataBufferView) -> Self {
        Self { texture_id, _pad: 0, pixels }
    }
}

/// `SetMaterialScalarProperty`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SetMaterialScalarPropertyParams {
    /// Material id
    pub material_id: u32,
    /// Raw [`MaterialScalarProperty`]
    pub property: i32,
    /// New value
    pub value: f32,
}

impl SetMaterialScalarPropertyParams {
    /// Create the record
    pub fn new(material_id: u32, property: MaterialScalarProperty, value: f32) -> Self {
        Self { material_id, property: property.as_raw(), value }
    }
}

/// `SetMaterialVectorProperty`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SetMaterialVectorPropertyParams {
    /// Material id
    pub material_id: u32,
    /// Raw [`MaterialVectorProperty`]
    pub property: i32,
    /// New value (x, y, z, w)
    pub value: [f32; 4],
}

impl SetMaterialVectorPropertyParams {
    /// Create the record
    pub fn new(material_id: u32, property: MaterialVectorProperty, value: [f32; 4]) -> Self {
        Self { material_id, property: property.as_raw(), value }
    }
}

/// `SetMaterialRenderTargetProperty`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct SetMaterialRenderTargetPropertyParams {
    /// Material id
    pub material_id: u32,
    /// Raw [`MaterialRenderTargetProperty`]
    pub property: i32,
    /// Render target id
    pub value: u32,
}

impl SetMaterialRenderTargetPropertyParams {
    /// Create the record
    pub fn new(material_id: u32, property: MaterialRenderTargetProperty, value: u32) -> Self {
        Self { material_id, property: property.as_raw(), value }
    }
}

/// `SetMaterialTextureProperty`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct SetMaterialTexturePropertyParams {
    /// Material id
    pub material_id: u32,
    /// Raw [`MaterialTextureProperty`]
    pub property: i32,
    /// Texture id
    pub value: u32,
}

impl SetMaterialTexturePropertyParams {
    /// Create the record
    pub fn new(material_id: u32, property: MaterialTextureProperty, value: u32) -> Self {
        Self { material_id, property: property.as_raw(), value }
    }
}

/// `SetMaterialNamedTextureProperty`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct SetMaterialNamedTexturePropertyParams {
    /// Material id
    pub material_id: u32,
    _pad0: u32,
    /// NUL-terminated shader property name
    pub texture_name: DataBufferView,
    /// Texture id
    pub value: u32,
    _pad1: u32,
}

impl SetMaterialNamedTexturePropertyParams {
    /// Create the record
    pub fn new(material_id: u32, texture_name: DataBufferView, value: u32) -> Self {
        Self { material_id, _pad0: 0, texture_name, value, _pad1: 0 }
    }
}

/// `GenerateMipMaps`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct GenerateMipMapsParams {
    /// Render target id
    pub render_target_id: u32,
}

/// `SetVisible`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct SetVisibleParams {
    /// Scene component id
    pub scene_component_id: u32,
    is_visible: u8,
    _pad: [u8; 3],
}

impl SetVisibleParams {
    /// Create the record
    pub fn new(scene_component_id: u32, is_visible: bool) -> Self {
        Self { scene_component_id, is_visible: u8::from(is_visible), _pad: [0; 3] }
    }

    /// Requested visibility
    pub fn is_visible(&self) -> bool {
        self.is_visible != 0
    }
}

/// `SetMaterial`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SetMaterialParams {
    /// Scene component id
    pub scene_component_id: u32,
    /// Material id
    pub material_id: u32,
    /// Bounds of the node's geometry
    pub oriented_bounding_box: WireOrientedBoundingBox,
    mask_terrain: u8,
    _pad: [u8; 7],
}

impl SetMaterialParams {
    /// Create the record
    pub fn new(
        scene_component_id: u32,
        material_id: u32,
        oriented_bounding_box: WireOrientedBoundingBox,
        mask_terrain: bool,
    ) -> Self {
        Self {
            scene_component_id,
            material_id,
            oriented_bounding_box,
            mask_terrain: u8::from(mask_terrain),
            _pad: [0; 7],
        }
    }

    /// Whether the node's geometry should cut the terrain
    pub fn mask_terrain(&self) -> bool {
        self.mask_terrain != 0
    }
}

/// `SetMesh`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct SetMeshParams {
    /// Scene component id
    pub scene_component_id: u32,
    _pad: u32,
    /// `i32` triangle indices
    pub triangles: DataBufferView,
    /// `[f32; 3]` positions
    pub positions: DataBufferView,
    /// `[f32; 3]` normals
    pub normals: DataBufferView,
    /// `[f32; 4]` tangents
    pub tangents: DataBufferView,
    /// `[f32; 2]` texture coordinates
    pub uvs: DataBufferView,
    /// `[u8; 4]` vertex colors
    pub colors: DataBufferView,
    /// `f32` UV region ids
    pub uv_region_ids: DataBufferView,
    /// `f32` feature indices
    pub feature_indices: DataBufferView,
}

impl SetMeshParams {
    /// Create a record with every stream empty
    pub fn new(scene_component_id: u32) -> Self {
        Self { scene_component_id, ..Self::default() }
    }
}

/// `SetMeshBuffer`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct SetMeshBufferParams {
    /// Scene component id
    pub scene_component_id: u32,
    /// Raw [`MeshBufferChangeType`]
    pub change_type: i32,
    /// Replacement stream
    pub buffer: DataBufferView,
}

impl SetMeshBufferParams {
    /// Create the record
    pub fn new(scene_component_id: u32, change_type: MeshBufferChangeType, buffer: DataBufferView) -> Self {
        Self { scene_component_id, change_type: change_type.as_raw(), buffer }
    }
}

/// `SetSceneComponentPivot`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SetSceneComponentPivotParams {
    /// Scene component id
    pub scene_component_id: u32,
    _pad: u32,
    /// World x
    pub x: f64,
    /// World y
    pub y: f64,
    /// World z
    pub z: f64,
}

impl SetSceneComponentPivotParams {
    /// Create the record
    pub fn new(scene_component_id: u32, x: f64, y: f64, z: f64) -> Self {
        Self { scene_component_id, _pad: 0, x, y, z }
    }

    /// Pivot as a vector
    pub fn location(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }
}

/// `CommandGroupBegin` / `CommandGroupEnd`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct NullParams {
    /// Always zero
    pub unused: u32,
}

macro_rules! assert_record_size {
    ($($ty:ty => $size:expr),+ $(,)?) => {
        $( const _: () = assert!(std::mem::size_of::<$ty>() == $size); )+
    };
}

assert_record_size! {
    DataBufferView => 16,
    WireOrientedBoundingBox => 72,
    ComposedTextureElement => 24,
    CreateMaterialParams => 16,
    CreateRenderTargetParams => 20,
    CreateTextureParams => 20,
    CreateSceneComponentParams => 12,
    MultipleComposeParams => 24,
    ComposeParams => 32,
    CopyParams => 24,
    GenerateNormalTextureParams => 40,
    SetTexturePixelDataParams => 24,
    SetMaterialVectorPropertyParams => 24,
    SetMaterialNamedTexturePropertyParams => 32,
    SetVisibleParams => 8,
    SetMaterialParams => 88,
    SetMeshParams => 136,
    SetMeshBufferParams => 24,
    SetSceneComponentPivotParams => 32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bool_fields_read_back() {
        assert!(SetVisibleParams::new(1, true).is_visible());
        assert!(!SetVisibleParams::new(1, false).is_visible());
        assert!(CreateTextureParams::new(1, 4, 4, 3, true).is_srgb());
        assert!(CreateRenderTargetParams::new(1, 4, 4, 3, true).has_mip_maps());
    }

    #[test]
    fn test_wire_obb_converts_quaternion_order() {
        let wire = WireOrientedBoundingBox::new([1.0, 2.0, 3.0], [0.5, 0.5, 0.5], [0.0, 0.0, 0.0, 1.0]);
        let obb = wire.to_obb();
        assert_eq!(obb.orientation, DQuat::identity());
        assert_relative_eq!(obb.center.z, 3.0);
        assert_relative_eq!(obb.extent.x, 0.5);
    }

    #[test]
    fn test_padding_is_zeroed_in_bytes() {
        let params = SetVisibleParams::new(7, true);
        assert_eq!(bytemuck::bytes_of(&params), &[7, 0, 0, 0, 1, 0, 0, 0]);
    }
}
