//! Scene Node Pool
//!
//! Renderable placeholders are expensive host objects, and the producer
//! creates and destroys thousands of them while streaming tiles. The pool keeps
//! them alive across create/destroy cycles:
//!
//! - active nodes live in a generational arena and are indexed by scene
//!   component id
//! - destroyed nodes leave the arena (so their keys go stale) and wait in a
//!   FIFO free list, parked under a hidden container object
//! - creation reuses the oldest free node and only builds a new host object
//!   when the free list is empty
//!
//! Host objects are only destroyed by [`SceneNodePool::release`].

use std::collections::{HashMap, VecDeque};

use slotmap::SlotMap;

use super::backend::{SceneGraphBackend, SceneObjectId};
use super::node::{scene_component_name, SceneNode, SceneNodeKey};
use crate::core::config::PoolConfig;
use crate::foundation::logging::{debug, info};
use crate::foundation::math::{DVec3, OrientedBoundingBox};
use crate::render::{BackendHandle, RenderError, RenderResult};

/// Pool of reusable scene nodes keyed by scene component id
pub struct SceneNodePool {
    backend: Box<dyn SceneGraphBackend>,
    nodes: SlotMap<SceneNodeKey, SceneNode>,
    active: HashMap<u32, SceneNodeKey>,
    free: VecDeque<SceneNode>,
    objects: HashMap<SceneObjectId, u32>,
    unused_container: Option<SceneObjectId>,
    mesh_colliders_enabled: bool,
    constructed: usize,
}

impl SceneNodePool {
    /// Create a pool and pre-build `config.initial_size` parked nodes
    pub fn new(config: &PoolConfig, mut backend: Box<dyn SceneGraphBackend>) -> Self {
        info!("Creating scene node pool with {} nodes", config.initial_size);

        let container = backend.create_container(&config.unused_container_name);
        let mut pool = Self {
            backend,
            nodes: SlotMap::with_capacity_and_key(config.initial_size),
            active: HashMap::with_capacity(config.initial_size),
            free: VecDeque::with_capacity(config.initial_size),
            objects: HashMap::with_capacity(config.initial_size),
            unused_container: Some(container),
            mesh_colliders_enabled: config.mesh_colliders_enabled,
            constructed: 0,
        };

        for _ in 0..config.initial_size {
            let node = pool.construct_node();
            pool.backend.set_parent(node.object(), Some(container));
            pool.free.push_back(node);
        }

        pool
    }

    fn construct_node(&mut self) -> SceneNode {
        let index = self.constructed;
        self.constructed += 1;
        let object = self.backend.create_node(index);
        SceneNode::new(object, format!("PooledSceneNode{index}"))
    }

    /// Activate a node for scene component `id`
    ///
    /// Reuses the oldest free node when one is available. The node starts
    /// hidden, with the pool-wide collider setting applied.
    pub fn create(&mut self, id: u32, layer_id: u32) -> RenderResult<SceneNodeKey> {
        if self.unused_container.is_none() {
            return Err(RenderError::Released);
        }
        if self.active.contains_key(&id) {
            return Err(RenderError::DuplicateSceneComponentId(id));
        }

        let mut node = match self.free.pop_front() {
            Some(node) => node,
            None => {
                debug!("Scene node pool exhausted, constructing node for {id}");
                self.construct_node()
            }
        };

        let object = node.object();
        node.name = scene_component_name(id);
        node.layer_id = layer_id;
        node.visible = false;
        node.mesh_collider_enabled = self.mesh_colliders_enabled;

        self.backend.set_parent(object, None);
        self.backend.set_active(object, false);
        self.backend.set_name(object, &node.name);
        self.backend.set_collider(object, node.mesh_collider_enabled, collider_mesh(&node));

        let key = self.nodes.insert(node);
        self.active.insert(id, key);
        self.objects.insert(object, id);

        Ok(key)
    }

    /// Return the node of scene component `id` to the free list
    pub fn destroy(&mut self, id: u32) -> RenderResult<()> {
        let key = self
            .active
            .remove(&id)
            .ok_or(RenderError::UnknownSceneComponentId(id))?;
        let mut node = self
            .nodes
            .remove(key)
            .ok_or(RenderError::UnknownSceneComponentId(id))?;

        let object = node.object();
        self.objects.remove(&object);

        node.reset();
        self.backend.set_parent(object, self.unused_container);
        self.backend.set_active(object, false);
        self.backend.set_mesh(object, None);
        if node.mesh_collider_enabled {
            self.backend.set_collider(object, true, None);
        }

        self.free.push_back(node);
        Ok(())
    }

    fn active_node_mut(&mut self, id: u32) -> RenderResult<&mut SceneNode> {
        let key = self
            .active
            .get(&id)
            .copied()
            .ok_or(RenderError::UnknownSceneComponentId(id))?;
        self.nodes
            .get_mut(key)
            .ok_or(RenderError::UnknownSceneComponentId(id))
    }

    /// Show or hide a node
    pub fn set_visible(&mut self, id: u32, visible: bool) -> RenderResult<()> {
        let node = self.active_node_mut(id)?;
        node.visible = visible;
        let object = node.object();
        self.backend.set_active(object, visible);
        Ok(())
    }

    /// Assign material, bounds and terrain masking to a node
    pub fn set_material(
        &mut self,
        id: u32,
        material_id: u32,
        material: BackendHandle,
        oriented_bounding_box: OrientedBoundingBox,
        mask_terrain: bool,
    ) -> RenderResult<()> {
        let node = self.active_node_mut(id)?;
        node.material = Some(material);
        node.material_id = Some(material_id);
        node.oriented_bounding_box = oriented_bounding_box;
        node.mask_terrain = mask_terrain;
        let object = node.object();
        self.backend.set_material(object, material);
        Ok(())
    }

    /// Assign or clear a node's mesh; an enabled collider follows it
    pub fn set_mesh(&mut self, id: u32, mesh: Option<BackendHandle>) -> RenderResult<()> {
        let node = self.active_node_mut(id)?;
        node.mesh = mesh;
        let object = node.object();
        let collider_enabled = node.mesh_collider_enabled;
        self.backend.set_mesh(object, mesh);
        if collider_enabled {
            self.backend.set_collider(object, true, mesh);
        }
        Ok(())
    }

    /// Move a node's pivot
    pub fn set_location(&mut self, id: u32, location: DVec3) -> RenderResult<()> {
        let node = self.active_node_mut(id)?;
        node.location = location;
        let object = node.object();
        self.backend.set_location(object, location);
        Ok(())
    }

    /// Whether mesh colliders are enabled
    pub fn mesh_colliders_enabled(&self) -> bool {
        self.mesh_colliders_enabled
    }

    /// Enable or disable mesh colliders on every active node and on future ones
    pub fn set_mesh_colliders_enabled(&mut self, enabled: bool) {
        if self.mesh_colliders_enabled == enabled {
            return;
        }

        debug!("Mesh colliders {}", if enabled { "enabled" } else { "disabled" });
        self.mesh_colliders_enabled = enabled;

        for key in self.active.values() {
            if let Some(node) = self.nodes.get_mut(*key) {
                node.mesh_collider_enabled = enabled;
                self.backend.set_collider(node.object(), enabled, collider_mesh(node));
            }
        }
    }

    /// Active node of scene component `id`
    pub fn get(&self, id: u32) -> Option<&SceneNode> {
        self.active.get(&id).and_then(|key| self.nodes.get(*key))
    }

    /// Active node that must exist
    pub fn require(&self, id: u32) -> RenderResult<&SceneNode> {
        self.get(id).ok_or(RenderError::UnknownSceneComponentId(id))
    }

    /// Arena key of the active node of scene component `id`
    pub fn key(&self, id: u32) -> Option<SceneNodeKey> {
        self.active.get(&id).copied()
    }

    /// Node behind an arena key; stale keys resolve to `None`
    pub fn node(&self, key: SceneNodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Whether scene component `id` is active
    pub fn contains(&self, id: u32) -> bool {
        self.active.contains_key(&id)
    }

    /// Scene component shown by a host object
    pub fn scene_component_for_object(&self, object: SceneObjectId) -> Option<u32> {
        self.objects.get(&object).copied()
    }

    /// Active node backed by a host object
    pub fn node_for_object(&self, object: SceneObjectId) -> Option<&SceneNode> {
        self.scene_component_for_object(object).and_then(|id| self.get(id))
    }

    /// Active nodes with their scene component ids
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SceneNode)> + '_ {
        self.active
            .iter()
            .filter_map(|(id, key)| self.nodes.get(*key).map(|node| (*id, node)))
    }

    /// Visible active nodes that mask the terrain, evaluated on every call
    pub fn terrain_masking_meshes(&self) -> impl Iterator<Item = (u32, &SceneNode)> + '_ {
        self.iter().filter(|(_, node)| node.is_terrain_masking())
    }

    /// Number of active nodes
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Number of parked nodes
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Number of host objects owned by the pool
    pub fn capacity(&self) -> usize {
        self.active.len() + self.free.len()
    }

    /// Destroy every node, active or free, and the parking container
    ///
    /// The pool refuses new nodes afterwards.
    pub fn release(&mut self) {
        info!("Releasing scene node pool ({} active, {} free)", self.active.len(), self.free.len());

        for (_, node) in self.nodes.drain() {
            self.backend.destroy_object(node.object());
        }
        for node in self.free.drain(..) {
            self.backend.destroy_object(node.object());
        }
        if let Some(container) = self.unused_container.take() {
            self.backend.destroy_object(container);
        }

        self.active.clear();
        self.objects.clear();
    }
}

impl std::fmt::Debug for SceneNodePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNodePool")
            .field("active", &self.active.len())
            .field("free", &self.free.len())
            .field("mesh_colliders_enabled", &self.mesh_colliders_enabled)
            .finish_non_exhaustive()
    }
}

fn collider_mesh(node: &SceneNode) -> Option<BackendHandle> {
    if node.mesh_collider_enabled {
        node.mesh
    } else {
        None
    }
}
