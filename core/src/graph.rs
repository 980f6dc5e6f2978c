use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Node identifier as assigned by the graph store.
pub type NodeId = u64;

/// Relationship identifier, unique across the whole graph.
pub type RelId = u64;

/// Interned relationship type index (avoids storing duplicate strings per edge).
pub type RelTypeId = u16;

/// Maximum number of distinct relationship types the graph can intern.
pub const MAX_REL_TYPES: usize = RelTypeId::MAX as usize + 1;

/// Direction a relationship was walked when it became part of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Which relationships to follow relative to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TraversalDirection {
    Outgoing,
    Incoming,
    #[default]
    Both,
}

impl TraversalDirection {
    pub fn follows_outgoing(self) -> bool {
        matches!(self, TraversalDirection::Outgoing | TraversalDirection::Both)
    }

    pub fn follows_incoming(self) -> bool {
        matches!(self, TraversalDirection::Incoming | TraversalDirection::Both)
    }
}

/// Metadata about a node.
#[derive(Debug, Clone, Default)]
pub struct NodeInfo {
    pub labels: Vec<String>,
}

/// A directed edge in the adjacency list.
///
/// `target` is the far endpoint relative to the list that owns the edge:
/// the end node in `outgoing`, the start node in `incoming`.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub id: RelId,
    pub target: NodeId,
    pub rel_type: RelTypeId,
}

/// A relationship as handed out by [`GraphAccess::relationships`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub id: RelId,
    pub rel_type: RelTypeId,
    pub start: NodeId,
    pub end: NodeId,
}

impl Relationship {
    /// The endpoint that is not `node`. For a self-loop this is `node` itself.
    pub fn other_node(&self, node: NodeId) -> NodeId {
        if self.start == node {
            self.end
        } else {
            self.start
        }
    }

    /// Direction of this relationship when walked away from `node`.
    pub fn direction_from(&self, node: NodeId) -> Direction {
        if self.start == node {
            Direction::Outgoing
        } else {
            Direction::Incoming
        }
    }
}

/// A single relationship record for bulk loading.
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub from_id: NodeId,
    pub to_id: NodeId,
    pub rel_type: String,
    pub from_labels: Vec<String>,
    pub to_labels: Vec<String>,
}

/// Read-only access to a labeled, typed-edge graph.
///
/// This is everything the traversal engine needs from a graph store. Every
/// per-node lookup fails with [`GraphError::NodeNotFound`] when the node is
/// absent, which lets callers treat concurrently deleted nodes as dead ends.
pub trait GraphAccess {
    /// Whether a node with this identifier exists.
    fn contains_node(&self, node: NodeId) -> bool;

    fn labels(&self, node: NodeId) -> Result<&[String], GraphError>;

    /// Number of relationships of `rel_type` (or of any type when `None`)
    /// attached to `node` in `direction`. A self-loop counts once.
    fn degree(
        &self,
        node: NodeId,
        rel_type: Option<RelTypeId>,
        direction: TraversalDirection,
    ) -> Result<u64, GraphError>;

    fn total_degree(&self, node: NodeId) -> Result<u64, GraphError> {
        self.degree(node, None, TraversalDirection::Both)
    }

    /// Relationships of `rel_type` (or of any type when `None`) attached to
    /// `node` in `direction`: outgoing first, then incoming, each in insertion
    /// order. A self-loop is returned once.
    fn relationships(
        &self,
        node: NodeId,
        rel_type: Option<RelTypeId>,
        direction: TraversalDirection,
    ) -> Result<Vec<Relationship>, GraphError>;

    fn rel_type_id(&self, name: &str) -> Option<RelTypeId>;

    fn rel_type_name(&self, id: RelTypeId) -> Option<&str>;
}

/// In-memory graph: adjacency lists + node metadata + relationship type interning.
///
/// Edges are stored bidirectionally: `outgoing[a]` contains edges from a,
/// `incoming[b]` contains edges into b. Both are populated on insert.
pub struct Graph {
    outgoing: HashMap<NodeId, Vec<Edge>>,
    incoming: HashMap<NodeId, Vec<Edge>>,
    nodes: HashMap<NodeId, NodeInfo>,
    rel_types: Vec<String>,
    rel_type_map: HashMap<String, RelTypeId>,
    /// Self-loops per node; they sit in both adjacency lists.
    self_loops: HashMap<NodeId, u64>,
    next_rel_id: RelId,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            nodes: HashMap::new(),
            rel_types: Vec::new(),
            rel_type_map: HashMap::new(),
            self_loops: HashMap::new(),
            next_rel_id: 0,
        }
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            outgoing: HashMap::with_capacity(node_count),
            incoming: HashMap::with_capacity(node_count),
            nodes: HashMap::with_capacity(node_count),
            rel_types: Vec::new(),
            rel_type_map: HashMap::new(),
            self_loops: HashMap::new(),
            next_rel_id: 0,
        }
    }

    /// Intern a relationship type string, returning its compact ID.
    ///
    /// Panics if more than [`MAX_REL_TYPES`] distinct types are interned;
    /// use [`Graph::try_intern_rel_type`] for types from untrusted input.
    pub fn intern_rel_type(&mut self, rel_type: &str) -> RelTypeId {
        match self.try_intern_rel_type(rel_type) {
            Ok(id) => id,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`Graph::intern_rel_type`], but fails with
    /// [`GraphError::TooManyRelTypes`] once the id space is used up.
    pub fn try_intern_rel_type(&mut self, rel_type: &str) -> Result<RelTypeId, GraphError> {
        if let Some(&id) = self.rel_type_map.get(rel_type) {
            return Ok(id);
        }
        if self.rel_types.len() >= MAX_REL_TYPES {
            return Err(GraphError::TooManyRelTypes);
        }
        let id = self.rel_types.len() as RelTypeId;
        self.rel_types.push(rel_type.to_string());
        self.rel_type_map.insert(rel_type.to_string(), id);
        Ok(id)
    }

    /// Register a node, replacing the labels of an existing node with the same id.
    pub fn add_node<I, S>(&mut self, id: NodeId, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = labels.into_iter().map(Into::into).collect();
        self.nodes.insert(id, NodeInfo { labels });
    }

    /// Add a directed relationship, creating unlabeled endpoints as needed.
    /// Returns the new relationship's id.
    pub fn add_relationship(&mut self, from: NodeId, to: NodeId, rel_type: RelTypeId) -> RelId {
        let id = self.next_rel_id;
        self.next_rel_id += 1;

        self.nodes.entry(from).or_default();
        self.nodes.entry(to).or_default();
        if from == to {
            *self.self_loops.entry(from).or_default() += 1;
        }
        self.outgoing
            .entry(from)
            .or_default()
            .push(Edge { id, target: to, rel_type });
        self.incoming
            .entry(to)
            .or_default()
            .push(Edge { id, target: from, rel_type });
        id
    }

    /// Bulk load from relationship records. Labels are applied only to nodes
    /// that are seen for the first time.
    pub fn load_edges<I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = EdgeRecord>,
    {
        for rec in edges {
            self.nodes
                .entry(rec.from_id)
                .or_insert_with(|| NodeInfo { labels: rec.from_labels });
            self.nodes
                .entry(rec.to_id)
                .or_insert_with(|| NodeInfo { labels: rec.to_labels });

            let rt = self.intern_rel_type(&rec.rel_type);
            self.add_relationship(rec.from_id, rec.to_id, rt);
        }
    }

    /// Delete a node and detach every relationship touching it.
    /// Returns false if the node did not exist.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if self.nodes.remove(&id).is_none() {
            return false;
        }
        self.self_loops.remove(&id);

        for edge in self.outgoing.remove(&id).unwrap_or_default() {
            if let Some(list) = self.incoming.get_mut(&edge.target) {
                list.retain(|e| e.id != edge.id);
            }
        }
        for edge in self.incoming.remove(&id).unwrap_or_default() {
            if let Some(list) = self.outgoing.get_mut(&edge.target) {
                list.retain(|e| e.id != edge.id);
            }
        }
        true
    }

    /// Get outgoing edges for a node.
    pub fn neighbors_out(&self, id: NodeId) -> &[Edge] {
        self.outgoing.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get incoming edges for a node.
    pub fn neighbors_in(&self, id: NodeId) -> &[Edge] {
        self.incoming.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.outgoing.values().map(|v| v.len()).sum()
    }

    pub fn rel_type_count(&self) -> usize {
        self.rel_types.len()
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let label_mem: usize = self
            .nodes
            .values()
            .map(|n| n.labels.iter().map(|l| l.len() + size_of::<String>()).sum::<usize>())
            .sum();
        let nodes_mem = self.nodes.len() * (size_of::<NodeId>() + size_of::<NodeInfo>() + 40);
        let out_edges: usize = self.outgoing.values().map(|v| v.len() * size_of::<Edge>()).sum();
        let in_edges: usize = self.incoming.values().map(|v| v.len() * size_of::<Edge>()).sum();

        nodes_mem + label_mem + out_edges + in_edges
    }

    /// Iterate edges attached to `node` in `direction`, optionally restricted
    /// to one relationship type.
    ///
    /// Uses boolean flags to avoid Box/dyn dispatch. A self-loop sits in both
    /// adjacency lists, so the incoming half skips it when both directions are
    /// walked.
    fn iter_edges(
        &self,
        node: NodeId,
        rel_type: Option<RelTypeId>,
        direction: TraversalDirection,
    ) -> impl Iterator<Item = (&Edge, Direction)> {
        let use_out = direction.follows_outgoing();
        let use_in = direction.follows_incoming();

        let out_iter = self
            .neighbors_out(node)
            .iter()
            .filter(move |_| use_out)
            .map(|e| (e, Direction::Outgoing));

        let in_iter = self
            .neighbors_in(node)
            .iter()
            .filter(move |_| use_in)
            .filter(move |e| !(use_out && e.target == node))
            .map(|e| (e, Direction::Incoming));

        out_iter
            .chain(in_iter)
            .filter(move |(e, _)| rel_type.map_or(true, |t| e.rel_type == t))
    }

    fn require(&self, node: NodeId) -> Result<&NodeInfo, GraphError> {
        self.nodes.get(&node).ok_or(GraphError::NodeNotFound(node))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphAccess for Graph {
    fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn labels(&self, node: NodeId) -> Result<&[String], GraphError> {
        self.require(node).map(|info| info.labels.as_slice())
    }

    fn degree(
        &self,
        node: NodeId,
        rel_type: Option<RelTypeId>,
        direction: TraversalDirection,
    ) -> Result<u64, GraphError> {
        self.require(node)?;
        if rel_type.is_some() {
            return Ok(self.iter_edges(node, rel_type, direction).count() as u64);
        }

        let out = self.neighbors_out(node).len() as u64;
        let inc = self.neighbors_in(node).len() as u64;
        Ok(match direction {
            TraversalDirection::Outgoing => out,
            TraversalDirection::Incoming => inc,
            TraversalDirection::Both => out + inc - self.self_loops.get(&node).copied().unwrap_or(0),
        })
    }

    fn relationships(
        &self,
        node: NodeId,
        rel_type: Option<RelTypeId>,
        direction: TraversalDirection,
    ) -> Result<Vec<Relationship>, GraphError> {
        self.require(node)?;
        Ok(self
            .iter_edges(node, rel_type, direction)
            .map(|(edge, dir)| {
                let (start, end) = match dir {
                    Direction::Outgoing => (node, edge.target),
                    Direction::Incoming => (edge.target, node),
                };
                Relationship {
                    id: edge.id,
                    rel_type: edge.rel_type,
                    start,
                    end,
                }
            })
            .collect())
    }

    fn rel_type_id(&self, name: &str) -> Option<RelTypeId> {
        self.rel_type_map.get(name).copied()
    }

    /// Resolve a RelTypeId back to its string name.
    /// Returns None if the ID is out of range.
    fn rel_type_name(&self, id: RelTypeId) -> Option<&str> {
        self.rel_types.get(id as usize).map(|s| s.as_str())
    }
}
