use nalgebra as na;
use tracing::debug;

use crate::{errors::*, pose::Pose};

/// Index of a node inside [`RrtTree`]
pub type NodeId = usize;

/// A pose and the link to the node it was grown from
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pose: Pose,
    parent: Option<NodeId>,
}

impl Node {
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn position(&self) -> &na::Point3<f64> {
        &self.pose.position
    }

    /// `None` only for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Append-only tree of explored poses, kept in insertion order
///
/// The root is inserted on construction, so the tree is never empty. A node's
/// parent always has a smaller id than the node itself, which makes every
/// parent walk terminate at the root.
#[derive(Debug, Clone)]
pub struct RrtTree {
    nodes: Vec<Node>,
}

impl RrtTree {
    pub fn new(root: Pose) -> Self {
        Self {
            nodes: vec![Node {
                pose: root,
                parent: None,
            }],
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no node, which never happens after `new`
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn last_id(&self) -> NodeId {
        self.nodes.len() - 1
    }

    /// Pose of the most recently inserted node
    pub fn last_pose(&self) -> &Pose {
        &self.nodes[self.last_id()].pose
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Append `pose` as a child of `parent`
    pub fn insert(&mut self, pose: Pose, parent: NodeId) -> Result<NodeId> {
        if parent >= self.nodes.len() {
            return Err(Error::InvalidTreeState(format!(
                "parent {parent} does not exist (tree has {} nodes)",
                self.nodes.len()
            )));
        }
        self.nodes.push(Node {
            pose,
            parent: Some(parent),
        });
        let id = self.last_id();
        debug!(id, parent, position = ?pose.position, "insert node");
        Ok(id)
    }

    /// Find the node whose position is closest to `position`
    ///
    /// Distances are truncated to integers before they are compared and ties
    /// go to the node inserted first. Rotation is ignored.
    pub fn nearest(&self, position: &na::Point3<f64>) -> (NodeId, &Node) {
        let mut nearest = 0;
        let mut min_distance = i64::MAX;
        for (id, node) in self.nodes.iter().enumerate() {
            let distance = (node.position() - position).norm() as i64;
            if distance < min_distance {
                min_distance = distance;
                nearest = id;
            }
        }
        (nearest, &self.nodes[nearest])
    }

    /// Returns true if a node has exactly the same position and orientation
    pub fn contains_pose(&self, pose: &Pose) -> bool {
        self.nodes.iter().any(|node| node.pose == *pose)
    }

    /// Positions of all nodes in insertion order
    pub fn positions(&self) -> Vec<na::Point3<f64>> {
        self.nodes.iter().map(|node| node.pose.position).collect()
    }

    /// Poses from the root to `terminal`
    pub fn path_to(&self, terminal: NodeId) -> Result<Vec<Pose>> {
        self.path_to_with(terminal, |_, _| {})
    }

    /// Poses from the root to `terminal`, calling `visit` for every node on
    /// the way back from `terminal` to the root
    pub fn path_to_with<F>(&self, terminal: NodeId, mut visit: F) -> Result<Vec<Pose>>
    where
        F: FnMut(NodeId, &Node),
    {
        let mut path = Vec::new();
        let mut current = Some(terminal);
        while let Some(id) = current {
            let node = self.nodes.get(id).ok_or_else(|| {
                Error::InvalidTreeState(format!("node {id} does not exist"))
            })?;
            if let Some(parent) = node.parent {
                if parent >= id {
                    return Err(Error::InvalidTreeState(format!(
                        "node {id} has parent {parent} inserted after it"
                    )));
                }
            }
            visit(id, node);
            path.push(node.pose);
            current = node.parent;
        }
        path.reverse();
        Ok(path)
    }
}

/// Extract the path ending at the most recently inserted node
///
/// A tree holding only the root has no path to play back.
pub fn extract_path(tree: &RrtTree) -> Result<Vec<Pose>> {
    if tree.len() < 2 {
        return Err(Error::InvalidTreeState(format!(
            "cannot extract a path from a tree of {} node(s)",
            tree.len()
        )));
    }
    tree.path_to(tree.last_id())
}
