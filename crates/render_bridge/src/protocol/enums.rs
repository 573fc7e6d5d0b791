//! Protocol enumerations carried inside command records
//!
//! These travel as raw `i32` values. Records keep the raw value so that decoding
//! never fails on an enumeration the consumer does not know yet; conversion
//! happens when a command is applied, where unknown values fall back.

use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(i32)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $name {
            /// Every value of this enumeration, in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Convert a raw wire value
            pub fn from_raw(raw: i32) -> Option<Self> {
                match raw {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Raw wire value
            pub fn as_raw(self) -> i32 {
                self as i32
            }
        }
    };
}

wire_enum! {
    /// Pixel formats the producer may request for textures and render targets
    pub enum TextureFormat {
        /// Single 32-bit float channel
        R32Float = 2,
        /// 8-bit RGBA, normalized
        RGBA8UNorm = 3,
        /// 8-bit RGB, normalized
        RGB8UNorm = 4,
        /// 32-bit float RGBA
        RGBA32Float = 5,
        /// BC1 compressed
        DXT1 = 6,
        /// BC2 compressed
        DXT3 = 7,
        /// BC3 compressed
        DXT5 = 8,
        /// Single 32-bit unsigned normalized channel
        R32UNorm = 9,
        /// Single 32-bit signed normalized channel
        R32Norm = 10,
        /// 16-bit RGBA, normalized
        RGBA16UNorm = 11,
        /// ETC2 RGB
        ETC2RGB8 = 12,
        /// ETC2 sRGB
        ETC2SRGB8 = 13,
        /// ETC2 RGB with 1-bit alpha
        ETC2RGB8PunchthroughAlpha1 = 14,
        /// ETC2 sRGB with 1-bit alpha
        ETC2SRGB8PunchthroughAlpha1 = 15,
        /// ETC2 EAC RGBA
        ETC2EacRGBA8 = 16,
        /// ETC2 EAC sRGBA
        ETC2EacSRGBA8 = 17,
        /// 8-bit BGRA, normalized
        BGRA8UNorm = 18,
    }
}

wire_enum! {
    /// Surface a material is created for
    pub enum MaterialType {
        /// Mesh of a 3D object layer
        SceneNode = 0,
        /// Terrain / imagery tile
        Tile = 1,
    }
}

wire_enum! {
    /// Scalar material properties
    pub enum MaterialScalarProperty {
        /// Clipping mode selector
        ClippingMode = 0,
        /// Whether the UV region lookup table is sampled
        UseUvRegionLut = 1,
        /// Blend between two imagery maps
        BlendFactor = 2,
        /// Blend between two position maps
        PositionsBlendFactor = 3,
        /// Surface opacity
        Opacity = 4,
    }
}

wire_enum! {
    /// Vector material properties
    pub enum MaterialVectorProperty {
        /// Lower corner of the mapped area
        MapAreaMin = 0,
        /// Upper corner of the mapped area
        MapAreaMax = 1,
    }
}

wire_enum! {
    /// Texture slots of a material
    pub enum MaterialTextureProperty {
        /// Base color map
        BaseMap = 0,
        /// UV region lookup table
        UvRegionLut = 1,
        /// Vertex offset map
        PositionsMap0 = 2,
        /// Secondary vertex offset map
        PositionsMap1 = 3,
        /// Per-vertex feature ids
        FeatureIds = 4,
    }
}

wire_enum! {
    /// Render target slots of a material
    pub enum MaterialRenderTargetProperty {
        /// Composed imagery
        ImageryMap0 = 0,
        /// Secondary composed imagery
        ImageryMap1 = 1,
        /// Generated normal map
        NormalMap0 = 2,
        /// Secondary generated normal map
        NormalMap1 = 3,
    }
}

wire_enum! {
    /// Which vertex stream a `SetMeshBuffer` command replaces
    pub enum MeshBufferChangeType {
        /// Vertex positions
        Positions = 0,
        /// Vertex normals
        Normals = 1,
        /// Vertex tangents
        Tangents = 2,
        /// Vertex colors
        Colors = 3,
        /// First UV channel
        Uv0 = 4,
        /// Second UV channel
        Uv1 = 5,
        /// Third UV channel
        Uv2 = 6,
        /// Fourth UV channel
        Uv3 = 7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_format_values_match_wire() {
        assert_eq!(TextureFormat::R32Float.as_raw(), 2);
        assert_eq!(TextureFormat::BGRA8UNorm.as_raw(), 18);
        assert_eq!(TextureFormat::ALL.len(), 17);
    }

    #[test]
    fn test_unknown_raw_values_are_rejected() {
        assert_eq!(TextureFormat::from_raw(0), None);
        assert_eq!(TextureFormat::from_raw(1), None);
        assert_eq!(TextureFormat::from_raw(19), None);
        assert_eq!(MaterialType::from_raw(2), None);
        assert_eq!(MeshBufferChangeType::from_raw(-1), None);
    }

    #[test]
    fn test_every_value_converts_back() {
        for format in TextureFormat::ALL {
            assert_eq!(TextureFormat::from_raw(format.as_raw()), Some(*format));
        }
        for property in MaterialScalarProperty::ALL {
            assert_eq!(MaterialScalarProperty::from_raw(property.as_raw()), Some(*property));
        }
    }
}
