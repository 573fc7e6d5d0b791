//! Texture and render target resources
//!
//! Protocol pixel formats are translated into the formats the host graphics
//! API understands. The translation is total: a format the host cannot express
//! is logged and replaced with a safe default so the frame keeps going.

use serde::{Deserialize, Serialize};

use crate::render::backend::BackendHandle;
use crate::foundation::logging::error;
use crate::protocol::TextureFormat;

/// Anisotropic filtering level applied to every render target
pub const RENDER_TEXTURE_ANISO_LEVEL: u32 = 9;

/// Sampled texture formats supported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeTextureFormat {
    /// 8-bit RGB
    RGB24,
    /// 8-bit RGBA
    RGBA32,
    /// 8-bit BGRA
    BGRA32,
    /// Single 32-bit float channel
    RFloat,
    /// 32-bit float RGBA
    RGBAFloat,
    /// BC1
    DXT1,
    /// BC3
    DXT5,
    /// ETC2 RGB
    ETC2RGB,
    /// ETC2 RGB with 1-bit alpha
    ETC2RGBA1,
    /// ETC2 EAC RGBA
    ETC2RGBA8,
}

/// Render target formats supported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeRenderTextureFormat {
    /// 8-bit ARGB
    ARGB32,
    /// 8-bit BGRA
    BGRA32,
    /// Single 32-bit float channel
    RFloat,
    /// 16-bit float ARGB
    ARGBHalf,
    /// 32-bit float ARGB
    ARGBFloat,
}

/// How texel values are interpreted when sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Values are used as stored
    Linear,
    /// Values are sRGB encoded
    Srgb,
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Coordinates outside [0, 1] are clamped
    Clamp,
    /// Coordinates outside [0, 1] repeat
    Repeat,
}

/// Texture filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest texel
    Point,
    /// Linear interpolation between texels
    Bilinear,
}

/// Everything the backend needs to allocate a sampled texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Pixel format
    pub format: NativeTextureFormat,
    /// Color space of the stored data
    pub color_space: ColorSpace,
    /// Wrapping mode
    pub wrap_mode: WrapMode,
    /// Filtering mode
    pub filter_mode: FilterMode,
}

impl TextureDescriptor {
    /// Clamp/bilinear texture, linear unless the data is sRGB
    pub fn new(width: u32, height: u32, format: NativeTextureFormat, is_srgb: bool) -> Self {
        Self {
            width,
            height,
            format,
            color_space: if is_srgb { ColorSpace::Srgb } else { ColorSpace::Linear },
            wrap_mode: WrapMode::Clamp,
            filter_mode: FilterMode::Bilinear,
        }
    }
}

/// Everything the backend needs to allocate a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTextureDescriptor {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Pixel format
    pub format: NativeRenderTextureFormat,
    /// Color space, always linear for render targets
    pub color_space: ColorSpace,
    /// Whether compute passes may write to the target
    pub random_write: bool,
    /// Whether the host regenerates mips after every write
    pub auto_generate_mips: bool,
    /// Whether the target carries a mip chain
    pub use_mip_maps: bool,
    /// Anisotropic filtering level
    pub aniso_level: u32,
}

impl RenderTextureDescriptor {
    /// Linear, random-write render target without automatic mip generation
    pub fn new(width: u32, height: u32, format: NativeRenderTextureFormat, use_mip_maps: bool) -> Self {
        Self {
            width,
            height,
            format,
            color_space: ColorSpace::Linear,
            random_write: true,
            auto_generate_mips: false,
            use_mip_maps,
            aniso_level: RENDER_TEXTURE_ANISO_LEVEL,
        }
    }
}

/// A live sampled texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuTexture {
    /// Backend object
    pub handle: BackendHandle,
    /// Creation parameters
    pub descriptor: TextureDescriptor,
}

impl GpuTexture {
    /// Width in texels
    pub fn width(&self) -> u32 {
        self.descriptor.width
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        self.descriptor.height
    }
}

/// A live render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuRenderTexture {
    /// Backend object
    pub handle: BackendHandle,
    /// Creation parameters
    pub descriptor: RenderTextureDescriptor,
}

impl GpuRenderTexture {
    /// Width in texels
    pub fn width(&self) -> u32 {
        self.descriptor.width
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        self.descriptor.height
    }
}

/// Map a raw protocol format to a sampled texture format
///
/// Unknown values and formats without a host equivalent fall back to
/// [`NativeTextureFormat::RGB24`].
pub fn native_texture_format(raw: i32) -> NativeTextureFormat {
    use NativeTextureFormat as Native;

    match TextureFormat::from_raw(raw) {
        Some(TextureFormat::RGB8UNorm) => Native::RGB24,
        Some(TextureFormat::R32Float) => Native::RFloat,
        Some(TextureFormat::RGBA16UNorm | TextureFormat::RGBA32Float) => Native::RGBAFloat,
        Some(TextureFormat::RGBA8UNorm | TextureFormat::R32Norm) => Native::RGBA32,
        Some(TextureFormat::BGRA8UNorm) => Native::BGRA32,
        Some(TextureFormat::DXT1) => Native::DXT1,
        Some(TextureFormat::DXT5) => Native::DXT5,
        Some(TextureFormat::ETC2RGB8 | TextureFormat::ETC2SRGB8) => Native::ETC2RGB,
        Some(
            TextureFormat::ETC2RGB8PunchthroughAlpha1 | TextureFormat::ETC2SRGB8PunchthroughAlpha1,
        ) => Native::ETC2RGBA1,
        Some(TextureFormat::ETC2EacRGBA8 | TextureFormat::ETC2EacSRGBA8) => Native::ETC2RGBA8,
        Some(TextureFormat::DXT3 | TextureFormat::R32UNorm) | None => {
            error!("Texture format {raw} not supported, using RGB24");
            Native::RGB24
        }
    }
}

/// Map a raw protocol format to a render target format
///
/// Anything outside the small set of renderable formats falls back to
/// [`NativeRenderTextureFormat::ARGB32`].
pub fn native_render_texture_format(raw: i32) -> NativeRenderTextureFormat {
    use NativeRenderTextureFormat as Native;

    match TextureFormat::from_raw(raw) {
        Some(TextureFormat::RGBA8UNorm) => Native::ARGB32,
        Some(TextureFormat::BGRA8UNorm) => Native::BGRA32,
        Some(TextureFormat::R32Float) => Native::RFloat,
        Some(TextureFormat::RGBA16UNorm) => Native::ARGBHalf,
        Some(TextureFormat::RGBA32Float) => Native::ARGBFloat,
        _ => {
            error!("Render texture format {raw} not supported, using ARGB32");
            Native::ARGB32
        }
    }
}
