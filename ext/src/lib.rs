//! dense-expand-ext: procedure surface for dense-node expansion.
//!
//! Wraps dense-expand-core with the three `expand.denseNodes.*` entry
//! operations. Callers hand in a dynamically typed `start` and a loosely
//! typed option map (both as `serde_json::Value`); this crate validates and
//! coerces them, runs the traversal and yields serialisable result rows.

mod config;
mod error;
mod load;
mod procedures;
mod start;

pub use config::{to_bool, to_long, ExpandConfig};
pub use error::{ExpandError, Result};
pub use load::load_graph_json;
pub use procedures::{
    call_procedure, expand_dense_nodes_nodes, expand_dense_nodes_paths,
    expand_dense_nodes_single_path, NodeResult, PathResult, Procedure,
};
pub use start::StartSpec;
