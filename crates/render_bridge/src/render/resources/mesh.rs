//! Mesh resources
//!
//! Meshes are owned by the registry under the id of the scene component that
//! displays them. The registry keeps the last uploaded vertex streams so that a
//! partial update can re-upload a consistent mesh.

use crate::render::backend::BackendHandle;

/// UV channel holding base texture coordinates
pub const BASE_TEXTURE_UV_CHANNEL: u32 = 0;

/// UV channel holding per-vertex feature indices
pub const FEATURE_INDICES_UV_CHANNEL: u32 = 1;

/// UV channel holding per-vertex UV region ids
pub const UV_REGION_IDS_UV_CHANNEL: u32 = 2;

/// CPU-side copy of a mesh's vertex streams
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Triangle list indices
    pub triangles: Vec<i32>,
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals
    pub normals: Vec<[f32; 3]>,
    /// Vertex tangents
    pub tangents: Vec<[f32; 4]>,
    /// Base texture coordinates
    pub uvs: Vec<[f32; 2]>,
    /// Vertex colors
    pub colors: Vec<[u8; 4]>,
    /// UV region id per vertex
    pub uv_region_ids: Vec<f32>,
    /// Feature index per vertex
    pub feature_indices: Vec<f32>,
}

impl MeshData {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Whether the mesh holds no geometry
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.triangles.is_empty()
    }

    /// UV channel layout a backend uploads: base coordinates, feature indices
    /// and UV region ids, each paired with its channel index
    pub fn uv_channels(&self) -> [(u32, UvChannel<'_>); 3] {
        [
            (BASE_TEXTURE_UV_CHANNEL, UvChannel::Coordinates(&self.uvs)),
            (FEATURE_INDICES_UV_CHANNEL, UvChannel::Scalars(&self.feature_indices)),
            (UV_REGION_IDS_UV_CHANNEL, UvChannel::Scalars(&self.uv_region_ids)),
        ]
    }

    /// Replace a single vertex stream
    pub fn apply(&mut self, stream: MeshStream) {
        match stream {
            MeshStream::Positions(positions) => self.positions = positions,
            MeshStream::Normals(normals) => self.normals = normals,
            MeshStream::Tangents(tangents) => self.tangents = tangents,
            MeshStream::Colors(colors) => self.colors = colors,
            MeshStream::Uvs(uvs) => self.uvs = uvs,
        }
    }
}

/// Contents of one UV channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UvChannel<'a> {
    /// Two-component texture coordinates
    Coordinates(&'a [[f32; 2]]),
    /// One scalar per vertex
    Scalars(&'a [f32]),
}

/// Replacement for one vertex stream
#[derive(Debug, Clone, PartialEq)]
pub enum MeshStream {
    /// Vertex positions
    Positions(Vec<[f32; 3]>),
    /// Vertex normals
    Normals(Vec<[f32; 3]>),
    /// Vertex tangents
    Tangents(Vec<[f32; 4]>),
    /// Vertex colors
    Colors(Vec<[u8; 4]>),
    /// Base texture coordinates
    Uvs(Vec<[f32; 2]>),
}

/// A live mesh
#[derive(Debug, Clone, PartialEq)]
pub struct GpuMesh {
    /// Backend object
    pub handle: BackendHandle,
    /// Last uploaded streams
    pub data: MeshData,
}

impl GpuMesh {
    /// Wrap a freshly created, empty backend mesh
    pub fn new(handle: BackendHandle) -> Self {
        Self {
            handle,
            data: MeshData::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replaces_only_one_stream() {
        let mut data = MeshData {
            triangles: vec![0, 1, 2],
            positions: vec![[0.0; 3]; 3],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            ..MeshData::default()
        };

        data.apply(MeshStream::Positions(vec![[1.0, 2.0, 3.0]; 3]));

        assert_eq!(data.positions[0], [1.0, 2.0, 3.0]);
        assert_eq!(data.normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(data.triangle_count(), 1);
        assert_eq!(data.vertex_count(), 3);
    }

    #[test]
    fn test_new_mesh_is_empty() {
        let mesh = GpuMesh::new(BackendHandle(9));
        assert!(mesh.data.is_empty());
    }

    #[test]
    fn test_uv_channel_layout() {
        let data = MeshData {
            uvs: vec![[0.5, 0.25]],
            feature_indices: vec![3.0],
            uv_region_ids: vec![9.0],
            ..MeshData::default()
        };

        let channels = data.uv_channels();

        assert_eq!(channels[0], (BASE_TEXTURE_UV_CHANNEL, UvChannel::Coordinates(&[[0.5, 0.25]])));
        assert_eq!(channels[1], (FEATURE_INDICES_UV_CHANNEL, UvChannel::Scalars(&[3.0])));
        assert_eq!(channels[2], (UV_REGION_IDS_UV_CHANNEL, UvChannel::Scalars(&[9.0])));
    }
}
