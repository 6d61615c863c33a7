//! Scene graph contract and a logging implementation.
//!
//! The scene graph is not thread-safe: a single owner context performs every
//! node mutation (see `anchors::AnchorOwner`).

mod logging;

pub use logging::{LoggingScene, NodeState};

use nalgebra::Vector3;

/// Opaque handle to a node owned by the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u64);

impl NodeHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Positioned, showable scene nodes.
pub trait SceneGraph: Send {
    /// Add a labelled node at `position`. The node starts hidden.
    fn create_node(&mut self, name: &str, position: Vector3<f64>) -> NodeHandle;

    /// Place the node at `position` immediately.
    fn set_position(&mut self, node: NodeHandle, position: Vector3<f64>);

    /// Move a visible node to `position`. Implementations may animate.
    fn move_to(&mut self, node: NodeHandle, position: Vector3<f64>) {
        self.set_position(node, position);
    }

    fn show(&mut self, node: NodeHandle);

    fn hide(&mut self, node: NodeHandle);
}
