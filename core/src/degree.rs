use crate::error::GraphError;
use crate::graph::{GraphAccess, NodeId};
use crate::pattern::RelPattern;

/// Degree of `node` restricted to a relationship pattern string.
///
/// An absent or empty pattern returns the node's total degree. Otherwise the
/// per-entry degrees are summed; an entry without a type counts every type in
/// its direction, and a type the graph has never seen counts zero.
pub fn degree<G>(graph: &G, node: NodeId, pattern: Option<&str>) -> Result<u64, GraphError>
where
    G: GraphAccess + ?Sized,
{
    match pattern {
        None | Some("") => graph.total_degree(node),
        Some(p) => degree_for(graph, node, &RelPattern::parse(Some(p))),
    }
}

/// Degree of `node` summed over an already parsed pattern.
pub fn degree_for<G>(graph: &G, node: NodeId, pattern: &RelPattern) -> Result<u64, GraphError>
where
    G: GraphAccess + ?Sized,
{
    if !graph.contains_node(node) {
        return Err(GraphError::NodeNotFound(node));
    }

    let mut total = 0;
    for entry in pattern {
        total += match &entry.rel_type {
            None => graph.degree(node, None, entry.direction)?,
            Some(name) => match graph.rel_type_id(name) {
                Some(id) => graph.degree(node, Some(id), entry.direction)?,
                None => 0,
            },
        };
    }
    Ok(total)
}
