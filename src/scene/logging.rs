//! In-memory scene graph that logs every mutation.

use std::collections::HashMap;

use nalgebra::Vector3;
use tracing::info;

use super::{NodeHandle, SceneGraph};

/// Last known state of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeState {
    pub name: String,
    pub position: Vector3<f64>,
    pub visible: bool,
    /// Number of position changes after creation.
    pub moves: usize,
}

/// Scene graph without rendering. Useful for replays and headless runs.
#[derive(Debug, Default)]
pub struct LoggingScene {
    nodes: HashMap<NodeHandle, NodeState>,
    next_id: u64,
}

impl LoggingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&NodeState> {
        self.nodes.get(&handle)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_visible(&self) -> usize {
        self.nodes.values().filter(|n| n.visible).count()
    }
}

impl SceneGraph for LoggingScene {
    fn create_node(&mut self, name: &str, position: Vector3<f64>) -> NodeHandle {
        let handle = NodeHandle::new(self.next_id);
        self.next_id += 1;
        info!(
            "Create node {} '{}' at [{:.3}, {:.3}, {:.3}]",
            handle, name, position.x, position.y, position.z
        );
        self.nodes.insert(
            handle,
            NodeState {
                name: name.to_string(),
                position,
                visible: false,
                moves: 0,
            },
        );
        handle
    }

    fn set_position(&mut self, node: NodeHandle, position: Vector3<f64>) {
        if let Some(state) = self.nodes.get_mut(&node) {
            info!(
                "Move node {} to [{:.3}, {:.3}, {:.3}]",
                node, position.x, position.y, position.z
            );
            state.position = position;
            state.moves += 1;
        }
    }

    fn show(&mut self, node: NodeHandle) {
        if let Some(state) = self.nodes.get_mut(&node) {
            info!("Show node {} '{}'", node, state.name);
            state.visible = true;
        }
    }

    fn hide(&mut self, node: NodeHandle) {
        if let Some(state) = self.nodes.get_mut(&node) {
            info!("Hide node {} '{}'", node, state.name);
            state.visible = false;
        }
    }
}
