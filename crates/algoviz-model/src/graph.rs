//! Undirected graph drawn by clicking on a canvas.
//!
//! Node ids are assigned in insertion order and never reused. Edges are stored
//! as normalized `(low, high)` pairs so `{a, b}` and `{b, a}` are the same edge.

use crate::error::{MutationError, Result};
use crate::Point;

/// Radius within which a click selects an existing node.
pub const NODE_RADIUS: f64 = 20.0;

/// Stable node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node and where it was placed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphNode {
    pub id: NodeId,
    pub position: Point,
}

/// An unordered edge, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
}

impl Edge {
    /// Normalize an endpoint pair.
    pub fn new(x: NodeId, y: NodeId) -> Self {
        Self {
            a: x.min(y),
            b: x.max(y),
        }
    }

    /// Endpoint opposite to `node`, if `node` is an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.a == node {
            Some(self.b)
        } else if self.b == node {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Graph with designated start and end nodes for traversals.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
    start: Option<NodeId>,
    end: Option<NodeId>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `id` refers to an existing node.
    pub fn contains(&self, id: NodeId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    /// Designated start node.
    pub fn start(&self) -> Option<NodeId> {
        self.start
    }

    /// Designated end node.
    pub fn end(&self) -> Option<NodeId> {
        self.end
    }

    /// Add a node at `position`, returning its id.
    pub fn add_node(&mut self, position: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(GraphNode { id, position });
        id
    }

    /// Connect two existing, distinct, not yet connected nodes.
    pub fn add_edge(&mut self, x: NodeId, y: NodeId) -> Result<Edge> {
        for id in [x, y] {
            if !self.contains(id) {
                return Err(MutationError::UnknownNode(id));
            }
        }
        if x == y {
            return Err(MutationError::SelfLoop(x));
        }
        let edge = Edge::new(x, y);
        if self.has_edge(x, y) {
            return Err(MutationError::DuplicateEdge(edge.a, edge.b));
        }
        self.edges.push(edge);
        Ok(edge)
    }

    /// Whether an edge joins `x` and `y`.
    pub fn has_edge(&self, x: NodeId, y: NodeId) -> bool {
        self.edges.contains(&Edge::new(x, y))
    }

    /// Designate the traversal start.
    pub fn set_start(&mut self, id: NodeId) -> Result<()> {
        if !self.contains(id) {
            return Err(MutationError::UnknownNode(id));
        }
        self.start = Some(id);
        Ok(())
    }

    /// Designate the traversal target.
    pub fn set_end(&mut self, id: NodeId) -> Result<()> {
        if !self.contains(id) {
            return Err(MutationError::UnknownNode(id));
        }
        self.end = Some(id);
        Ok(())
    }

    /// Neighbors of `id` in ascending id order.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self.edges.iter().filter_map(|e| e.other(id)).collect();
        out.sort_unstable();
        out
    }

    /// Node under a click at `point`, nearest first, within [`NODE_RADIUS`].
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        self.nodes
            .iter()
            .map(|n| (n.id, n.position.distance(&point)))
            .filter(|&(_, d)| d < NODE_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}
