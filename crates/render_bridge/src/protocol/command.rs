//! Command kinds and the decoded command enum

use std::fmt;

use super::params::{
    ComposeParams, CopyParams, CreateMaterialParams, CreateRenderTargetParams,
    CreateSceneComponentParams, CreateTextureParams, DestroyMaterialParams,
    DestroyRenderTargetParams, DestroySceneComponentParams, DestroyTextureParams,
    GenerateMipMapsParams, GenerateNormalTextureParams, MultipleComposeParams, NullParams,
    SetMaterialNamedTexturePropertyParams, SetMaterialParams, SetMaterialRenderTargetPropertyParams,
    SetMaterialScalarPropertyParams, SetMaterialTexturePropertyParams,
    SetMaterialVectorPropertyParams, SetMeshBufferParams, SetMeshParams,
    SetSceneComponentPivotParams, SetTexturePixelDataParams, SetVisibleParams,
};

/// Size in bytes of the tag that precedes every record
pub const TAG_SIZE: usize = std::mem::size_of::<i32>();

macro_rules! command_kinds {
    ($( $(#[$meta:meta])* $variant:ident = $tag:literal => $params:ty ),+ $(,)?) => {
        /// Kind of a render command, identified on the wire by its tag
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum CommandType {
            $( $(#[$meta])* $variant = $tag ),+
        }

        impl CommandType {
            /// Every command kind, in tag order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Look up the command kind for a wire tag
            pub fn from_tag(tag: i32) -> Option<Self> {
                match tag {
                    $( $tag => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Wire tag
            pub fn tag(self) -> i32 {
                self as i32
            }

            /// Size in bytes of the parameter record that follows the tag
            pub fn record_size(self) -> usize {
                match self {
                    $( Self::$variant => std::mem::size_of::<$params>(), )+
                }
            }

            /// Name used in diagnostics
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => stringify!($variant), )+
                }
            }
        }

        /// One decoded render command together with its parameters
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub enum RenderCommand {
            $( $(#[$meta])* $variant($params) ),+
        }

        impl RenderCommand {
            /// Kind of this command
            pub fn command_type(&self) -> CommandType {
                match self {
                    $( Self::$variant(_) => CommandType::$variant, )+
                }
            }

            /// Raw bytes of the parameter record
            pub fn record_bytes(&self) -> &[u8] {
                match self {
                    $( Self::$variant(params) => bytemuck::bytes_of(params), )+
                }
            }

            pub(crate) fn from_record(command_type: CommandType, record: &[u8]) -> Self {
                match command_type {
                    $( CommandType::$variant => Self::$variant(bytemuck::pod_read_unaligned(record)), )+
                }
            }
        }
    };
}

command_kinds! {
    /// Create a material from a shader variant or a template
    CreateMaterial = 0 => CreateMaterialParams,
    /// Create a GPU render target
    CreateRenderTarget = 1 => CreateRenderTargetParams,
    /// Create a sampled texture
    CreateTexture = 2 => CreateTextureParams,
    /// Claim a scene node for a scene component
    CreateSceneComponent = 3 => CreateSceneComponentParams,
    /// Destroy a material
    DestroyMaterial = 4 => DestroyMaterialParams,
    /// Destroy a render target
    DestroyRenderTarget = 5 => DestroyRenderTargetParams,
    /// Destroy a texture
    DestroyTexture = 6 => DestroyTextureParams,
    /// Return a scene node to the pool
    DestroySceneComponent = 7 => DestroySceneComponentParams,
    /// Blend an array of textures into a render target
    MultipleCompose = 8 => MultipleComposeParams,
    /// Blend two textures into a render target
    Compose = 9 => ComposeParams,
    /// Copy a texture region into a render target
    Copy = 10 => CopyParams,
    /// Derive a normal map from an elevation texture
    GenerateNormalTexture = 11 => GenerateNormalTextureParams,
    /// Upload texel data
    SetTexturePixelData = 12 => SetTexturePixelDataParams,
    /// Set a scalar material property
    SetMaterialScalarProperty = 13 => SetMaterialScalarPropertyParams,
    /// Set a vector material property
    SetMaterialVectorProperty = 14 => SetMaterialVectorPropertyParams,
    /// Bind a render target to a material slot
    SetMaterialRenderTargetProperty = 15 => SetMaterialRenderTargetPropertyParams,
    /// Bind a texture to a material slot
    SetMaterialTextureProperty = 16 => SetMaterialTexturePropertyParams,
    /// Regenerate a render target's mip chain
    GenerateMipMaps = 17 => GenerateMipMapsParams,
    /// Show or hide a scene node
    SetVisible = 18 => SetVisibleParams,
    /// Attach a material and bounds to a scene node
    SetMaterial = 19 => SetMaterialParams,
    /// Upload all vertex streams of a scene node's mesh
    SetMesh = 20 => SetMeshParams,
    /// Replace one vertex stream of a scene node's mesh
    SetMeshBuffer = 21 => SetMeshBufferParams,
    /// Move a scene node
    SetSceneComponentPivot = 22 => SetSceneComponentPivotParams,
    /// Bind a texture to a material slot named in the payload
    SetMaterialNamedTextureProperty = 23 => SetMaterialNamedTexturePropertyParams,
    /// Start a group of commands applied together
    CommandGroupBegin = 24 => NullParams,
    /// Apply the open group
    CommandGroupEnd = 25 => NullParams,
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
