//! Per-branch verdicts and the fixed evaluation pipeline.
//!
//! Every candidate branch is run through `[depth floor, depth ceiling, label
//! filter, dense node]`. The branch keeps expanding only if every stage lets
//! it continue. Whether it is emitted is up to the dense-node stage, subject
//! to vetoes: a depth stage vetoes by excluding, the label filter only by
//! excluding *and* pruning.

use crate::dense::DenseNodeEvaluator;
use crate::graph::{GraphAccess, NodeId};
use crate::label::LabelFilter;

/// Outcome of evaluating one branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Evaluation {
    ExcludeAndContinue,
    ExcludeAndPrune,
    IncludeAndContinue,
    IncludeAndPrune,
}

impl Evaluation {
    pub fn of(includes: bool, continues: bool) -> Self {
        match (includes, continues) {
            (false, true) => Evaluation::ExcludeAndContinue,
            (false, false) => Evaluation::ExcludeAndPrune,
            (true, true) => Evaluation::IncludeAndContinue,
            (true, false) => Evaluation::IncludeAndPrune,
        }
    }

    /// Whether the branch is emitted.
    pub fn includes(self) -> bool {
        matches!(self, Evaluation::IncludeAndContinue | Evaluation::IncludeAndPrune)
    }

    /// Whether the branch is expanded further.
    pub fn continues(self) -> bool {
        matches!(self, Evaluation::ExcludeAndContinue | Evaluation::IncludeAndContinue)
    }

    /// Fold a stage whose exclusion always vetoes emission.
    fn and_gate(self, stage: Evaluation) -> Evaluation {
        Evaluation::of(
            self.includes() && stage.includes(),
            self.continues() && stage.continues(),
        )
    }

    /// Fold a stage whose exclusion vetoes emission only when it also prunes.
    fn and_filter(self, stage: Evaluation) -> Evaluation {
        let vetoed = stage == Evaluation::ExcludeAndPrune;
        Evaluation::of(
            self.includes() && !vetoed,
            self.continues() && stage.continues(),
        )
    }
}

/// Where a candidate branch ends and how many relationships it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub end_node: NodeId,
    pub depth: usize,
}

/// Counters scoped to a single traversal invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluatorState {
    /// Paths emitted so far.
    pub emitted: u64,
}

/// A single stage of the evaluation pipeline.
pub trait Evaluator<G: GraphAccess + ?Sized> {
    fn evaluate(&self, graph: &G, position: Position, state: &EvaluatorState) -> Evaluation;
}

/// Excludes branches shorter than `min_level` but keeps expanding them.
#[derive(Debug, Clone, Copy)]
pub struct DepthFloor {
    pub min_level: usize,
}

impl<G: GraphAccess + ?Sized> Evaluator<G> for DepthFloor {
    fn evaluate(&self, _graph: &G, position: Position, _state: &EvaluatorState) -> Evaluation {
        if position.depth < self.min_level {
            Evaluation::ExcludeAndContinue
        } else {
            Evaluation::IncludeAndContinue
        }
    }
}

/// Stops expanding at `max_level`.
#[derive(Debug, Clone, Copy)]
pub struct DepthCeiling {
    pub max_level: usize,
}

impl<G: GraphAccess + ?Sized> Evaluator<G> for DepthCeiling {
    fn evaluate(&self, _graph: &G, position: Position, _state: &EvaluatorState) -> Evaluation {
        use std::cmp::Ordering;

        match position.depth.cmp(&self.max_level) {
            Ordering::Less => Evaluation::IncludeAndContinue,
            Ordering::Equal => Evaluation::IncludeAndPrune,
            Ordering::Greater => Evaluation::ExcludeAndPrune,
        }
    }
}

/// The composed pipeline. Stage order is fixed.
#[derive(Debug, Clone)]
pub struct EvaluatorChain {
    floor: Option<DepthFloor>,
    ceiling: Option<DepthCeiling>,
    labels: Option<LabelFilter>,
    dense: DenseNodeEvaluator,
}

impl EvaluatorChain {
    pub fn new(dense: DenseNodeEvaluator) -> Self {
        Self {
            floor: None,
            ceiling: None,
            labels: None,
            dense,
        }
    }

    pub fn with_min_level(mut self, min_level: usize) -> Self {
        self.floor = Some(DepthFloor { min_level });
        self
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.ceiling = Some(DepthCeiling { max_level });
        self
    }

    pub fn with_label_filter(mut self, labels: LabelFilter) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Run every stage against `position`. Stages after a verdict of
    /// exclude-and-prune are skipped; nothing can revive such a branch.
    pub fn evaluate<G>(&self, graph: &G, position: Position, state: &EvaluatorState) -> Evaluation
    where
        G: GraphAccess + ?Sized,
    {
        let mut verdict = Evaluation::IncludeAndContinue;

        if let Some(floor) = &self.floor {
            verdict = verdict.and_gate(floor.evaluate(graph, position, state));
        }
        if let Some(ceiling) = &self.ceiling {
            verdict = verdict.and_gate(ceiling.evaluate(graph, position, state));
        }
        if let Some(labels) = &self.labels {
            if verdict == Evaluation::ExcludeAndPrune {
                return verdict;
            }
            verdict = verdict.and_filter(labels.evaluate(graph, position, state));
        }
        if verdict == Evaluation::ExcludeAndPrune {
            return verdict;
        }
        verdict.and_gate(self.dense.evaluate(graph, position, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::label::LabelFilterSpec;
    use Evaluation::*;

    fn at(depth: usize) -> Position {
        Position { end_node: 0, depth }
    }

    /// Node 0 (label Hub) with three leaves; node 9 isolated.
    fn make_graph() -> Graph {
        let mut g = Graph::new();
        g.add_node(0, ["Hub"]);
        g.add_node(9, ["Lonely"]);
        let t = g.intern_rel_type("R");
        for leaf in 1..=3 {
            g.add_relationship(0, leaf, t);
        }
        g
    }

    #[test]
    fn test_of_roundtrips_flags() {
        for e in [ExcludeAndContinue, ExcludeAndPrune, IncludeAndContinue, IncludeAndPrune] {
            assert_eq!(Evaluation::of(e.includes(), e.continues()), e);
        }
    }

    #[test]
    fn test_gate_combination() {
        assert_eq!(IncludeAndContinue.and_gate(ExcludeAndContinue), ExcludeAndContinue);
        assert_eq!(IncludeAndContinue.and_gate(IncludeAndPrune), IncludeAndPrune);
        assert_eq!(ExcludeAndContinue.and_gate(IncludeAndPrune), ExcludeAndPrune);
    }

    #[test]
    fn test_filter_combination() {
        // Continuing exclusion from a filter is neutral for emission
        assert_eq!(IncludeAndContinue.and_filter(ExcludeAndContinue), IncludeAndContinue);
        assert_eq!(IncludeAndContinue.and_filter(ExcludeAndPrune), ExcludeAndPrune);
        assert_eq!(IncludeAndContinue.and_filter(IncludeAndPrune), IncludeAndPrune);
    }

    #[test]
    fn test_depth_floor() {
        let g = Graph::new();
        let floor = DepthFloor { min_level: 2 };
        let s = EvaluatorState::default();
        assert_eq!(floor.evaluate(&g, at(1), &s), ExcludeAndContinue);
        assert_eq!(floor.evaluate(&g, at(2), &s), IncludeAndContinue);
    }

    #[test]
    fn test_depth_ceiling() {
        let g = Graph::new();
        let ceiling = DepthCeiling { max_level: 2 };
        let s = EvaluatorState::default();
        assert_eq!(ceiling.evaluate(&g, at(1), &s), IncludeAndContinue);
        assert_eq!(ceiling.evaluate(&g, at(2), &s), IncludeAndPrune);
        assert_eq!(ceiling.evaluate(&g, at(3), &s), ExcludeAndPrune);
    }

    #[test]
    fn test_chain_dense_node_decides() {
        let g = make_graph();
        let chain = EvaluatorChain::new(DenseNodeEvaluator::new(None, 3, 0, false));
        let s = EvaluatorState::default();
        assert_eq!(chain.evaluate(&g, Position { end_node: 0, depth: 1 }, &s), IncludeAndPrune);
        assert_eq!(chain.evaluate(&g, Position { end_node: 1, depth: 1 }, &s), ExcludeAndContinue);
    }

    #[test]
    fn test_chain_floor_vetoes_dense_inclusion() {
        let g = make_graph();
        let chain = EvaluatorChain::new(DenseNodeEvaluator::new(None, 3, 0, false)).with_min_level(2);
        let s = EvaluatorState::default();
        assert_eq!(chain.evaluate(&g, Position { end_node: 0, depth: 1 }, &s), ExcludeAndPrune);
    }

    #[test]
    fn test_chain_ceiling_prunes() {
        let g = make_graph();
        let chain = EvaluatorChain::new(DenseNodeEvaluator::new(None, 100, 0, false)).with_max_level(1);
        let s = EvaluatorState::default();
        assert_eq!(chain.evaluate(&g, Position { end_node: 1, depth: 1 }, &s), ExcludeAndPrune);
        assert_eq!(chain.evaluate(&g, Position { end_node: 1, depth: 0 }, &s), ExcludeAndContinue);
    }

    #[test]
    fn test_chain_label_deny_vetoes_dense_node() {
        let g = make_graph();
        let labels = LabelFilter::new(LabelFilterSpec::parse("-Hub"), false, None, None);
        let chain = EvaluatorChain::new(DenseNodeEvaluator::new(None, 3, 0, false)).with_label_filter(labels);
        let s = EvaluatorState::default();
        assert_eq!(chain.evaluate(&g, Position { end_node: 0, depth: 1 }, &s), ExcludeAndPrune);
    }

    #[test]
    fn test_chain_label_allow_lets_dense_node_through() {
        let g = make_graph();
        let labels = LabelFilter::new(LabelFilterSpec::parse("+Hub"), false, None, None);
        let chain = EvaluatorChain::new(DenseNodeEvaluator::new(None, 3, 0, false)).with_label_filter(labels);
        let s = EvaluatorState::default();
        assert_eq!(chain.evaluate(&g, Position { end_node: 0, depth: 1 }, &s), IncludeAndPrune);
        // Leaves lack the allowed label
        assert_eq!(chain.evaluate(&g, Position { end_node: 1, depth: 1 }, &s), ExcludeAndPrune);
    }

    #[test]
    fn test_chain_missing_node_is_dead_end() {
        let g = make_graph();
        let chain = EvaluatorChain::new(DenseNodeEvaluator::new(None, 1, 0, false));
        let s = EvaluatorState::default();
        assert_eq!(chain.evaluate(&g, Position { end_node: 404, depth: 1 }, &s), ExcludeAndPrune);
    }
}
