//! Label allow/deny filtering.
//!
//! Filter strings are `|`-separated tokens: `+Label` allows, `-Label` denies,
//! and either may carry a leading `:` (`+:Person`). A denied label always
//! wins over an allowed one.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::evaluator::{Evaluation, Evaluator, EvaluatorState, Position};
use crate::graph::GraphAccess;

/// Parsed allow and deny label sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelFilterSpec {
    pub allow: HashSet<String>,
    pub deny: HashSet<String>,
}

impl LabelFilterSpec {
    pub fn parse(filter: &str) -> Self {
        let mut spec = Self::default();

        for token in filter.split('|') {
            let (target, rest) = match token.chars().next() {
                Some('+') => (&mut spec.allow, &token[1..]),
                Some('-') => (&mut spec.deny, &token[1..]),
                _ => {
                    if !token.is_empty() {
                        debug!(token, "label filter token without +/- prefix ignored");
                    }
                    continue;
                }
            };

            let label = rest.strip_prefix(':').unwrap_or(rest);
            if !label.is_empty() {
                target.insert(label.to_string());
            }
        }

        spec
    }

    pub fn is_denied(&self, labels: &[String]) -> bool {
        !self.deny.is_empty() && labels.iter().any(|l| self.deny.contains(l))
    }

    /// An empty allow set permits everything.
    pub fn is_allowed(&self, labels: &[String]) -> bool {
        self.allow.is_empty() || labels.iter().any(|l| self.allow.contains(l))
    }

    /// Not denied and allowed.
    pub fn permits(&self, labels: &[String]) -> bool {
        !self.is_denied(labels) && self.is_allowed(labels)
    }
}

/// Pipeline stage that stops expansion through nodes the label rules reject.
///
/// It never includes a branch on its own account; its only inclusion is the
/// limit cut-off, which also prunes.
#[derive(Debug, Clone)]
pub struct LabelFilter {
    spec: LabelFilterSpec,
    filter_start_node: bool,
    limit: Option<u64>,
    min_level: Option<usize>,
}

impl LabelFilter {
    pub fn new(
        spec: LabelFilterSpec,
        filter_start_node: bool,
        limit: Option<u64>,
        min_level: Option<usize>,
    ) -> Self {
        Self {
            spec,
            filter_start_node,
            limit,
            min_level,
        }
    }
}

impl<G: GraphAccess + ?Sized> Evaluator<G> for LabelFilter {
    fn evaluate(&self, graph: &G, position: Position, state: &EvaluatorState) -> Evaluation {
        if position.depth == 0 && !self.filter_start_node {
            return Evaluation::ExcludeAndContinue;
        }

        let labels = match graph.labels(position.end_node) {
            Ok(labels) => labels,
            Err(err) => {
                warn!(node = position.end_node, %err, "label lookup failed, pruning branch");
                return Evaluation::ExcludeAndPrune;
            }
        };
        let verdict = if self.spec.permits(labels) {
            Evaluation::ExcludeAndContinue
        } else {
            Evaluation::ExcludeAndPrune
        };

        // Below the floor nothing is emitted, but the label rules still decide
        // whether deeper nodes are reachable through this one
        if self.min_level.is_some_and(|min| position.depth < min) {
            return verdict;
        }

        // Once enough results are out, stop expanding everywhere
        if self.limit.is_some_and(|limit| state.emitted >= limit) {
            return Evaluation::IncludeAndPrune;
        }

        verdict
    }
}
