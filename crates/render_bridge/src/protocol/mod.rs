//! Wire protocol between the map producer and the rendering host
//!
//! The producer writes render commands into a flat byte buffer; this module
//! describes their layout and turns the buffer back into typed commands.

pub mod command;
pub mod decoder;
pub mod encoder;
pub mod enums;
pub mod params;

pub use command::{CommandType, RenderCommand, TAG_SIZE};
pub use decoder::{DecodeError, DecodedCommandQueue, TruncatedPart};
pub use encoder::CommandBufferWriter;
pub use enums::{
    MaterialRenderTargetProperty, MaterialScalarProperty, MaterialTextureProperty, MaterialType,
    MaterialVectorProperty, MeshBufferChangeType, TextureFormat,
};
pub use params::*;
