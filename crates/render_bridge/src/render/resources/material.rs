//! Material resources and shader variant resolution
//!
//! A material is created either by cloning a template supplied by the
//! producer or from the shader variant registered for its surface type and the
//! render pipeline the host runs. Resolution always succeeds: a missing
//! pipeline variant falls back to the legacy shader for the surface type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::foundation::logging::warn;
use crate::protocol::MaterialType;
use crate::render::backend::BackendHandle;

/// Root of the shader asset tree
pub const SHADER_BASE_PATH: &str = "Shaders/Materials";

/// Legacy tile surface shader
pub const LEGACY_TILE_SURFACE: &str = "Shaders/Materials/Legacy/TileSurface";

/// Legacy scene node surface shader
pub const LEGACY_SCENE_NODE_SURFACE: &str = "Shaders/Materials/Legacy/SceneNodeSurface";

/// Render pipeline the host renders with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderPipeline {
    /// Built-in forward pipeline
    #[default]
    Legacy,
    /// Universal scriptable pipeline
    Universal,
    /// High definition scriptable pipeline
    HighDefinition,
}

impl RenderPipeline {
    /// Directory holding this pipeline's shader variants
    pub fn directory(self) -> &'static str {
        match self {
            Self::Legacy => "Legacy",
            Self::Universal => "URP",
            Self::HighDefinition => "HDRP",
        }
    }
}

/// Where a new material's shader comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialSource<'a> {
    /// Instantiate the shader at this asset path
    Shader(&'a str),
    /// Clone the producer-supplied material with this reference
    Template(u64),
}

/// Table of shader variants keyed by surface type and render pipeline
#[derive(Debug, Clone, Default)]
pub struct ShaderLibrary {
    variants: HashMap<(MaterialType, RenderPipeline), String>,
}

impl ShaderLibrary {
    /// Create an empty library; every lookup resolves to the legacy shader
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with the universal and high definition variants of both surfaces
    pub fn with_standard_variants() -> Self {
        let mut library = Self::new();
        for pipeline in [RenderPipeline::Universal, RenderPipeline::HighDefinition] {
            for material_type in MaterialType::ALL {
                let path = format!(
                    "{SHADER_BASE_PATH}/{}/{}",
                    pipeline.directory(),
                    surface_name(*material_type)
                );
                library.register(*material_type, pipeline, path);
            }
        }
        library
    }

    /// Register or replace the shader used for a surface type on a pipeline
    pub fn register(&mut self, material_type: MaterialType, pipeline: RenderPipeline, path: impl Into<String>) {
        self.variants.insert((material_type, pipeline), path.into());
    }

    /// Shader path for a surface type on a pipeline
    pub fn resolve(&self, material_type: MaterialType, pipeline: RenderPipeline) -> &str {
        self.variants
            .get(&(material_type, pipeline))
            .map_or_else(|| legacy_shader(material_type), String::as_str)
    }

    /// Number of registered variants
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Whether no variants are registered
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Legacy shader path for a surface type
pub fn legacy_shader(material_type: MaterialType) -> &'static str {
    match material_type {
        MaterialType::Tile => LEGACY_TILE_SURFACE,
        MaterialType::SceneNode => LEGACY_SCENE_NODE_SURFACE,
    }
}

fn surface_name(material_type: MaterialType) -> &'static str {
    match material_type {
        MaterialType::Tile => "TileSurface",
        MaterialType::SceneNode => "SceneNodeSurface",
    }
}

/// Convert a raw material type, treating unknown values as scene node surfaces
pub fn material_type_from_raw(raw: i32) -> MaterialType {
    MaterialType::from_raw(raw).unwrap_or_else(|| {
        warn!("Unknown material type {raw}, using SceneNode");
        MaterialType::SceneNode
    })
}

/// A live material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuMaterial {
    /// Backend object
    pub handle: BackendHandle,
    /// Surface type the material was created for
    pub material_type: MaterialType,
    /// Producer template the material was cloned from, 0 if none
    pub template: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_library_falls_back_to_legacy() {
        let library = ShaderLibrary::new();
        for pipeline in [RenderPipeline::Legacy, RenderPipeline::Universal, RenderPipeline::HighDefinition] {
            assert_eq!(library.resolve(MaterialType::Tile, pipeline), LEGACY_TILE_SURFACE);
            assert_eq!(library.resolve(MaterialType::SceneNode, pipeline), LEGACY_SCENE_NODE_SURFACE);
        }
    }

    #[test]
    fn test_standard_variants_cover_scriptable_pipelines() {
        let library = ShaderLibrary::with_standard_variants();
        assert_eq!(library.len(), 4);
        assert_eq!(
            library.resolve(MaterialType::Tile, RenderPipeline::Universal),
            "Shaders/Materials/URP/TileSurface"
        );
        assert_eq!(
            library.resolve(MaterialType::SceneNode, RenderPipeline::HighDefinition),
            "Shaders/Materials/HDRP/SceneNodeSurface"
        );
        assert_eq!(library.resolve(MaterialType::Tile, RenderPipeline::Legacy), LEGACY_TILE_SURFACE);
    }

    #[test]
    fn test_registered_variant_overrides_fallback() {
        let mut library = ShaderLibrary::new();
        library.register(MaterialType::Tile, RenderPipeline::Legacy, "Custom/Tile");
        assert_eq!(library.resolve(MaterialType::Tile, RenderPipeline::Legacy), "Custom/Tile");
    }

    #[test]
    fn test_unknown_material_type_is_scene_node() {
        assert_eq!(material_type_from_raw(1), MaterialType::Tile);
        assert_eq!(material_type_from_raw(42), MaterialType::SceneNode);
    }
}
