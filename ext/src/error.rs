use dense_expand_core::{GraphError, MAX_REL_TYPES};
use thiserror::Error;

/// Errors surfaced by the procedure layer. They all abort an invocation
/// before any traversal work is done.
#[derive(Debug, Error)]
pub enum ExpandError {
    #[error(
        "unsupported start parameter ({0}): a node, a node id, or a list of nodes or node ids must be given"
    )]
    UnsupportedInput(String),

    #[error("node {0} not found")]
    NodeNotFound(i64),

    #[error("unknown procedure '{0}'")]
    UnknownProcedure(String),

    #[error("graph document has more than {} relationship types", MAX_REL_TYPES)]
    TooManyRelTypes,

    #[error("invalid graph document: {0}")]
    InvalidGraph(#[from] serde_json::Error),

    #[error("failed to serialise result row: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl From<GraphError> for ExpandError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NodeNotFound(id) => {
                ExpandError::NodeNotFound(i64::try_from(id).unwrap_or(i64::MAX))
            }
            GraphError::TooManyRelTypes => ExpandError::TooManyRelTypes,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExpandError>;
