//! The `expand.denseNodes.*` entry operations.

use dense_expand_core::{optional, traverse, GraphAccess, NodeId, Optional, Path, ResultShape, Traverser};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ExpandConfig;
use crate::error::{ExpandError, Result};
use crate::start::StartSpec;

/// A row of the path-producing procedures. `path` is `None` only for the
/// optional placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathResult {
    pub path: Option<Path>,
}

/// A row of the node-producing procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeResult {
    pub node: Option<NodeId>,
}

/// Shared front half of every entry operation: validate `start`, coerce the
/// config, shape it and start the traversal. Fails before any expansion.
fn expand<'g, G>(
    graph: &'g G,
    start: &Value,
    config: &Value,
    shape: ResultShape,
) -> Result<Optional<Traverser<'g, G>>>
where
    G: GraphAccess + ?Sized,
{
    let starts = StartSpec::from_value(start)?.resolve(graph)?;
    let config = ExpandConfig::from_value(config);
    let placeholder = config.optional;

    let mut traversal = config.into_traversal_config();
    shape.apply(&mut traversal);
    debug!(?shape, starts = starts.len(), ?traversal, "expanding to dense nodes");

    Ok(optional(traverse(graph, starts, &traversal), placeholder))
}

/// Every path from the start nodes to a dense node.
pub fn expand_dense_nodes_paths<'g, G>(
    graph: &'g G,
    start: &Value,
    config: &Value,
) -> Result<impl Iterator<Item = PathResult> + 'g>
where
    G: GraphAccess + ?Sized,
{
    Ok(expand(graph, start, config, ResultShape::Paths)?.map(|path| PathResult { path }))
}

/// Each reachable dense node once. `minLevel` is ignored.
pub fn expand_dense_nodes_nodes<'g, G>(
    graph: &'g G,
    start: &Value,
    config: &Value,
) -> Result<impl Iterator<Item = NodeResult> + 'g>
where
    G: GraphAccess + ?Sized,
{
    Ok(expand(graph, start, config, ResultShape::Nodes)?.map(|path| NodeResult {
        node: path.map(|p| p.end_node()),
    }))
}

/// One path to each reachable dense node. `minLevel` is ignored.
pub fn expand_dense_nodes_single_path<'g, G>(
    graph: &'g G,
    start: &Value,
    config: &Value,
) -> Result<impl Iterator<Item = PathResult> + 'g>
where
    G: GraphAccess + ?Sized,
{
    Ok(expand(graph, start, config, ResultShape::SinglePath)?.map(|path| PathResult { path }))
}

/// Name-addressable view of the entry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    Paths,
    Nodes,
    SinglePath,
}

impl Procedure {
    pub const ALL: [Procedure; 3] = [Procedure::Paths, Procedure::Nodes, Procedure::SinglePath];

    pub fn name(self) -> &'static str {
        match self {
            Procedure::Paths => "expand.denseNodes.paths",
            Procedure::Nodes => "expand.denseNodes.nodes",
            Procedure::SinglePath => "expand.denseNodes.singlePath",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Procedure::Paths => {
                "expand.denseNodes.paths(start <id>|node|list, {minLevel, maxLevel, relationshipFilter, \
                 labelFilter, uniqueness:'RELATIONSHIP_PATH', bfs:true, filterStartNode:false, optional:false, \
                 limit, degree:1000, denseRels, continueBelow:0}) yield path - expand paths from the start nodes \
                 to dense nodes (degree over denseRels at or above the threshold)"
            }
            Procedure::Nodes => {
                "expand.denseNodes.nodes(start <id>|node|list, {maxLevel, relationshipFilter, labelFilter, \
                 bfs:true, filterStartNode:false, optional:false, limit, degree:1000, denseRels, continueBelow:0}) \
                 yield node - dense nodes reachable from the start nodes, each once"
            }
            Procedure::SinglePath => {
                "expand.denseNodes.singlePath(start <id>|node|list, {maxLevel, relationshipFilter, labelFilter, \
                 bfs:true, filterStartNode:false, optional:false, limit, degree:1000, denseRels, continueBelow:0}) \
                 yield path - a single path to each dense node reachable from the start nodes"
            }
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ExpandError::UnknownProcedure(name.to_string()))
    }

    /// Run the procedure to completion and return its rows as JSON.
    pub fn call<G>(self, graph: &G, start: &Value, config: &Value) -> Result<Vec<Value>>
    where
        G: GraphAccess + ?Sized,
    {
        fn rows<T: Serialize>(results: impl Iterator<Item = T>) -> Result<Vec<Value>> {
            results
                .map(|row| serde_json::to_value(row).map_err(ExpandError::Serialization))
                .collect()
        }

        match self {
            Procedure::Paths => rows(expand_dense_nodes_paths(graph, start, config)?),
            Procedure::Nodes => rows(expand_dense_nodes_nodes(graph, start, config)?),
            Procedure::SinglePath => rows(expand_dense_nodes_single_path(graph, start, config)?),
        }
    }
}

/// Look up a procedure by name and run it.
pub fn call_procedure<G>(graph: &G, name: &str, start: &Value, config: &Value) -> Result<Vec<Value>>
where
    G: GraphAccess + ?Sized,
{
    Procedure::from_name(name)?.call(graph, start, config)
}
