//! # Scene Nodes
//!
//! Pooled renderable placeholders driven by scene component commands.

pub mod backend;
pub mod node;
pub mod pool;

pub use backend::{SceneGraphBackend, SceneObjectId};
pub use node::{scene_component_name, SceneNode, SceneNodeKey};
pub use pool::SceneNodePool;
