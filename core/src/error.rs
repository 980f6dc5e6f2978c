use thiserror::Error;

use crate::graph::{NodeId, MAX_REL_TYPES};

/// Failures surfaced by a [`GraphAccess`](crate::GraphAccess) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The node does not exist, or was deleted while a traversal was running.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("relationship type limit ({}) exceeded", MAX_REL_TYPES)]
    TooManyRelTypes,
}
