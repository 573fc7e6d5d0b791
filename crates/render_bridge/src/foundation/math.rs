//! Math utilities and types
//!
//! The producer speaks in double precision for anything placed in the world
//! (pivots, bounding box centers, orientations) and single precision for texture
//! space regions. These aliases keep the two apart.

pub use nalgebra::{Quaternion, Vector2, Vector3, Vector4};

/// World-space position or extent (double precision)
pub type DVec3 = Vector3<f64>;

/// Orientation quaternion (double precision, `x, y, z, w` on the wire)
pub type DQuat = Quaternion<f64>;

/// Texture-space region or material vector property
pub type Vec4 = Vector4<f32>;

/// Oriented bounding box of a placed scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBoundingBox {
    /// Box center in world space
    pub center: DVec3,
    /// Half sizes along each local axis
    pub extent: DVec3,
    /// Local-to-world rotation
    pub orientation: DQuat,
}

impl OrientedBoundingBox {
    /// Create a new oriented bounding box
    pub fn new(center: DVec3, extent: DVec3, orientation: DQuat) -> Self {
        Self { center, extent, orientation }
    }

    /// Full size of the box along each local axis
    pub fn size(&self) -> DVec3 {
        self.extent * 2.0
    }
}

impl Default for OrientedBoundingBox {
    fn default() -> Self {
        Self {
            center: DVec3::zeros(),
            extent: DVec3::zeros(),
            orientation: DQuat::identity(),
        }
    }
}

/// Build a `Vec4` from a plain `[x, y, z, w]` array
pub fn vec4_from_array(v: [f32; 4]) -> Vec4 {
    Vec4::new(v[0], v[1], v[2], v[3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_obb_size_is_twice_extent() {
        let obb = OrientedBoundingBox::new(
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(0.5, 1.5, 2.5),
            DQuat::identity(),
        );
        let size = obb.size();
        assert_relative_eq!(size.x, 1.0);
        assert_relative_eq!(size.y, 3.0);
        assert_relative_eq!(size.z, 5.0);
    }

    #[test]
    fn test_default_obb_has_identity_orientation() {
        let obb = OrientedBoundingBox::default();
        assert_eq!(obb.orientation, DQuat::identity());
        assert_eq!(obb.center, DVec3::zeros());
    }
}
