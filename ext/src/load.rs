use std::time::Instant;

use dense_expand_core::{Graph, NodeId};
use serde::Deserialize;
use tracing::info;

use crate::error::Result;

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: NodeId,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RelationshipRecord {
    from: NodeId,
    to: NodeId,
    #[serde(rename = "type")]
    rel_type: String,
}

#[derive(Debug, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    relationships: Vec<RelationshipRecord>,
}

/// Build an in-memory graph from a JSON document of the form
/// `{"nodes": [{"id", "labels"}], "relationships": [{"from", "to", "type"}]}`.
///
/// Relationships may reference undeclared nodes; those are created unlabeled.
/// Documents naming more relationship types than the graph can intern are
/// rejected with [`ExpandError::TooManyRelTypes`](crate::ExpandError::TooManyRelTypes).
pub fn load_graph_json(json: &str) -> Result<Graph> {
    let start = Instant::now();
    let doc: GraphDocument = serde_json::from_str(json)?;

    let mut graph = Graph::with_capacity(doc.nodes.len());
    for node in doc.nodes {
        graph.add_node(node.id, node.labels);
    }
    for rel in doc.relationships {
        let rel_type = graph.try_intern_rel_type(&rel.rel_type)?;
        graph.add_relationship(rel.from, rel.to, rel_type);
    }

    info!(
        nodes = graph.node_count(),
        relationships = graph.relationship_count(),
        rel_types = graph.rel_type_count(),
        memory_bytes = graph.memory_usage(),
        load_time_ms = start.elapsed().as_secs_f64() * 1000.0,
        "graph loaded"
    );
    Ok(graph)
}
