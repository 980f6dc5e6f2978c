use serde::Serialize;

use crate::graph::{Direction, NodeId, RelId};

/// One hop of a [`Path`]: the relationship walked and the node it led to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub relationship: RelId,
    pub rel_type: String,
    /// Direction the relationship was walked, relative to the previous node.
    pub direction: Direction,
    pub node: NodeId,
}

/// An alternating node/relationship sequence starting at `start`.
/// A path of length 0 is the start node alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    pub start: NodeId,
    pub steps: Vec<PathStep>,
}

impl Path {
    pub fn start_node(&self) -> NodeId {
        self.start
    }

    pub fn end_node(&self) -> NodeId {
        self.steps.last().map_or(self.start, |s| s.node)
    }

    /// Number of relationships.
    pub fn length(&self) -> usize {
        self.steps.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(self.start).chain(self.steps.iter().map(|s| s.node))
    }

    pub fn relationships(&self) -> impl Iterator<Item = RelId> + '_ {
        self.steps.iter().map(|s| s.relationship)
    }

    /// Relationship type names in walk order.
    pub fn rel_types(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.rel_type.as_str())
    }
}
