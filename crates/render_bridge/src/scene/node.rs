//! Scene nodes
//!
//! A node wraps one host scene object for its whole lifetime. Across
//! create/destroy cycles only its logical state is reset; the host object is
//! kept and reused.

use slotmap::new_key_type;

use super::backend::SceneObjectId;
use crate::foundation::math::{DVec3, OrientedBoundingBox};
use crate::render::BackendHandle;

new_key_type! {
    /// Generation-checked key of an active scene node
    ///
    /// A key stops resolving once its node is returned to the pool, even if
    /// the same host object is later reused under a new key.
    pub struct SceneNodeKey;
}

/// Name given to the node of an active scene component
pub fn scene_component_name(id: u32) -> String {
    format!("SceneComponent_{id}")
}

/// One pooled renderable placeholder
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    object: SceneObjectId,
    pub(crate) name: String,
    pub(crate) layer_id: u32,
    pub(crate) visible: bool,
    pub(crate) mask_terrain: bool,
    pub(crate) oriented_bounding_box: OrientedBoundingBox,
    pub(crate) material: Option<BackendHandle>,
    pub(crate) material_id: Option<u32>,
    pub(crate) mesh: Option<BackendHandle>,
    pub(crate) location: DVec3,
    pub(crate) mesh_collider_enabled: bool,
}

impl SceneNode {
    pub(crate) fn new(object: SceneObjectId, name: String) -> Self {
        Self {
            object,
            name,
            layer_id: 0,
            visible: false,
            mask_terrain: false,
            oriented_bounding_box: OrientedBoundingBox::default(),
            material: None,
            material_id: None,
            mesh: None,
            location: DVec3::zeros(),
            mesh_collider_enabled: false,
        }
    }

    /// Host object backing this node
    pub fn object(&self) -> SceneObjectId {
        self.object
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning layer
    pub fn layer_id(&self) -> u32 {
        self.layer_id
    }

    /// Whether the node is shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the node's geometry cuts the terrain
    pub fn mask_terrain(&self) -> bool {
        self.mask_terrain
    }

    /// Bounds of the node's geometry
    pub fn oriented_bounding_box(&self) -> &OrientedBoundingBox {
        &self.oriented_bounding_box
    }

    /// Assigned material
    pub fn material(&self) -> Option<BackendHandle> {
        self.material
    }

    /// Registry id of the assigned material
    pub fn material_id(&self) -> Option<u32> {
        self.material_id
    }

    /// Assigned mesh
    pub fn mesh(&self) -> Option<BackendHandle> {
        self.mesh
    }

    /// World-space pivot
    pub fn location(&self) -> DVec3 {
        self.location
    }

    /// Whether the mesh collider is enabled
    pub fn is_mesh_collider_enabled(&self) -> bool {
        self.mesh_collider_enabled
    }

    /// Whether the node participates in terrain masking right now
    pub fn is_terrain_masking(&self) -> bool {
        self.visible && self.mask_terrain
    }

    pub(crate) fn reset(&mut self) {
        self.visible = false;
        self.mask_terrain = false;
        self.mesh = None;
        self.material = None;
        self.material_id = None;
        self.oriented_bounding_box = OrientedBoundingBox::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_hidden_and_empty() {
        let node = SceneNode::new(SceneObjectId(3), "Pooled_3".to_string());
        assert!(!node.is_visible());
        assert!(node.mesh().is_none());
        assert!(node.material().is_none());
        assert_eq!(node.object(), SceneObjectId(3));
    }

    #[test]
    fn test_terrain_masking_needs_both_flags() {
        let mut node = SceneNode::new(SceneObjectId(1), String::new());
        node.mask_terrain = true;
        assert!(!node.is_terrain_masking());
        node.visible = true;
        assert!(node.is_terrain_masking());
    }

    #[test]
    fn test_component_name() {
        assert_eq!(scene_component_name(42), "SceneComponent_42");
    }
}
