//! dense-expand-core: evaluator-driven graph expansion that stops at dense nodes.
//!
//! Starting from one or more nodes, the traverser expands along a relationship
//! pattern (breadth- or depth-first) and emits paths that end on nodes whose
//! degree meets a threshold. Label allow/deny rules, depth bounds and
//! uniqueness modes shape which branches are explored and which are emitted.
//!
//! The engine works against any store implementing [`GraphAccess`]; an
//! in-memory [`Graph`] is included. No procedure or config-map concerns live
//! here, so the crate compiles standalone.

mod degree;
mod dense;
mod error;
mod evaluator;
mod graph;
mod label;
mod path;
mod pattern;
mod results;
mod traversal;
mod uniqueness;

pub use degree::{degree, degree_for};
pub use dense::DenseNodeEvaluator;
pub use error::GraphError;
pub use evaluator::{
    DepthCeiling, DepthFloor, Evaluation, Evaluator, EvaluatorChain, EvaluatorState, Position,
};
pub use graph::{
    Direction, Edge, EdgeRecord, Graph, GraphAccess, NodeId, NodeInfo, RelId, RelTypeId,
    Relationship, TraversalDirection, MAX_REL_TYPES,
};
pub use label::{LabelFilter, LabelFilterSpec};
pub use path::{Path, PathStep};
pub use pattern::{RelPattern, RelTypeAndDirection};
pub use results::{optional, Optional, OptionalResults, ResultShape};
pub use traversal::{traverse, TraversalConfig, TraversalStats, Traverser, DEFAULT_DEGREE_THRESHOLD};
pub use uniqueness::{Uniqueness, RECENT_WINDOW};
