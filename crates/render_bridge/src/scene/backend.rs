//! Scene graph backend abstraction
//!
//! The pool places, hides and reparents host scene objects through this trait.
//! Host objects are identified by an opaque [`SceneObjectId`], which is also
//! what picking and hit-testing callbacks report back.

use std::fmt;

use crate::foundation::math::DVec3;
use crate::render::BackendHandle;

/// Opaque identity of a host scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneObjectId(pub u64);

impl fmt::Display for SceneObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object {}", self.0)
    }
}

/// Operations the pool needs from the host scene graph
pub trait SceneGraphBackend: Send {
    /// Create an inactive renderable object with mesh, material and collider slots
    fn create_node(&mut self, index: usize) -> SceneObjectId;

    /// Create an empty grouping object
    fn create_container(&mut self, name: &str) -> SceneObjectId;

    /// Destroy an object created by this backend
    fn destroy_object(&mut self, object: SceneObjectId);

    /// Attach to a container, or to the host's map root when `parent` is `None`
    fn set_parent(&mut self, object: SceneObjectId, parent: Option<SceneObjectId>);

    /// Show or hide an object
    fn set_active(&mut self, object: SceneObjectId, active: bool);

    /// Rename an object
    fn set_name(&mut self, object: SceneObjectId, name: &str);

    /// Assign the mesh rendered by an object
    fn set_mesh(&mut self, object: SceneObjectId, mesh: Option<BackendHandle>);

    /// Assign the material rendered by an object
    fn set_material(&mut self, object: SceneObjectId, material: BackendHandle);

    /// Enable or disable the mesh collider, binding `mesh` when enabled
    fn set_collider(&mut self, object: SceneObjectId, enabled: bool, mesh: Option<BackendHandle>);

    /// Move an object to a world-space position with identity rotation
    fn set_location(&mut self, object: SceneObjectId, location: DVec3);
}
