//! The dense-node stage: emit a branch when its end node is a hub.

use tracing::warn;

use crate::degree::degree_for;
use crate::evaluator::{Evaluation, Evaluator, EvaluatorState, Position};
use crate::graph::GraphAccess;
use crate::pattern::RelPattern;

/// Includes branches ending on a node whose degree reaches `threshold`.
///
/// Such a branch keeps expanding only when the degree is still under
/// `continue_below`; a non-positive `continue_below` stops at every dense node.
/// Degrees are measured against `pattern`, or over every relationship when
/// there is none.
#[derive(Debug, Clone)]
pub struct DenseNodeEvaluator {
    pattern: Option<RelPattern>,
    threshold: i64,
    continue_below: i64,
    filter_start_node: bool,
}

impl DenseNodeEvaluator {
    pub fn new(
        pattern: Option<RelPattern>,
        threshold: i64,
        continue_below: i64,
        filter_start_node: bool,
    ) -> Self {
        Self {
            pattern,
            threshold,
            continue_below,
            filter_start_node,
        }
    }
}

/// `degree >= bound` with a signed bound; anything non-positive always holds.
fn at_least(degree: u64, bound: i64) -> bool {
    u64::try_from(bound).map_or(true, |bound| degree >= bound)
}

impl<G: GraphAccess + ?Sized> Evaluator<G> for DenseNodeEvaluator {
    fn evaluate(&self, graph: &G, position: Position, _state: &EvaluatorState) -> Evaluation {
        if position.depth == 0 && !self.filter_start_node {
            return Evaluation::ExcludeAndContinue;
        }

        let result = match &self.pattern {
            Some(pattern) => degree_for(graph, position.end_node, pattern),
            None => graph.total_degree(position.end_node),
        };
        let degree = match result {
            Ok(degree) => degree,
            Err(err) => {
                warn!(node = position.end_node, %err, "degree lookup failed, pruning branch");
                return Evaluation::ExcludeAndPrune;
            }
        };

        if !at_least(degree, self.threshold) {
            return Evaluation::ExcludeAndContinue;
        }
        if self.continue_below > 0 && !at_least(degree, self.continue_below) {
            Evaluation::IncludeAndContinue
        } else {
            Evaluation::IncludeAndPrune
        }
    }
}
