//! Lazy, evaluator-driven graph expansion.
//!
//! A [`Traverser`] keeps every branch it creates in an arena with parent
//! pointers; a full [`Path`] is only materialised for branches that are
//! emitted. Nothing is expanded until the iterator is pulled, and dropping
//! it stops all work.

use std::collections::{HashSet, VecDeque};
use std::iter::FusedIterator;

use tracing::{debug, warn};

use crate::dense::DenseNodeEvaluator;
use crate::error::GraphError;
use crate::evaluator::{EvaluatorChain, EvaluatorState, Position};
use crate::graph::{Direction, GraphAccess, NodeId, RelId, RelTypeId, Relationship, TraversalDirection};
use crate::label::{LabelFilter, LabelFilterSpec};
use crate::path::{Path, PathStep};
use crate::pattern::RelPattern;
use crate::uniqueness::{Uniqueness, UniquenessFilter};

/// Degree at which a node counts as dense unless configured otherwise.
pub const DEFAULT_DEGREE_THRESHOLD: i64 = 1000;

/// Every knob of a dense-node traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalConfig {
    /// Relationship pattern to expand along. `None` or blank follows everything.
    pub relationship_filter: Option<String>,
    /// `+Label|-Label` filter. `None` or blank disables label filtering.
    pub label_filter: Option<String>,
    pub min_level: Option<usize>,
    pub max_level: Option<usize>,
    pub uniqueness: Uniqueness,
    /// Breadth-first when true, depth-first otherwise.
    pub bfs: bool,
    /// Apply the label and dense-node rules to the start node as well.
    pub filter_start_node: bool,
    /// Emission count after which the label filter prunes every branch.
    pub limit: Option<u64>,
    /// Pattern the degree is measured against. `None` or blank counts every
    /// relationship.
    pub dense_rels: Option<String>,
    pub degree_threshold: i64,
    /// Dense nodes with a degree below this are emitted and expanded further.
    pub continue_below: i64,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            relationship_filter: None,
            label_filter: None,
            min_level: None,
            max_level: None,
            uniqueness: Uniqueness::default(),
            bfs: true,
            filter_start_node: false,
            limit: None,
            dense_rels: None,
            degree_threshold: DEFAULT_DEGREE_THRESHOLD,
            continue_below: 0,
        }
    }
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.trim().is_empty())
}

impl TraversalConfig {
    pub fn with_relationship_filter(mut self, pattern: impl Into<String>) -> Self {
        self.relationship_filter = Some(pattern.into());
        self
    }

    pub fn with_label_filter(mut self, filter: impl Into<String>) -> Self {
        self.label_filter = Some(filter.into());
        self
    }

    pub fn with_min_level(mut self, min_level: usize) -> Self {
        self.min_level = Some(min_level);
        self
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = Some(max_level);
        self
    }

    pub fn with_uniqueness(mut self, uniqueness: Uniqueness) -> Self {
        self.uniqueness = uniqueness;
        self
    }

    pub fn with_bfs(mut self, bfs: bool) -> Self {
        self.bfs = bfs;
        self
    }

    pub fn with_filter_start_node(mut self, filter_start_node: bool) -> Self {
        self.filter_start_node = filter_start_node;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_dense_rels(mut self, pattern: impl Into<String>) -> Self {
        self.dense_rels = Some(pattern.into());
        self
    }

    pub fn with_degree_threshold(mut self, threshold: i64) -> Self {
        self.degree_threshold = threshold;
        self
    }

    pub fn with_continue_below(mut self, continue_below: i64) -> Self {
        self.continue_below = continue_below;
        self
    }

    /// The relationship pattern to expand along.
    pub fn expansion_pattern(&self) -> RelPattern {
        RelPattern::parse(non_blank(&self.relationship_filter))
    }

    /// Assemble the evaluation pipeline this configuration describes.
    pub fn evaluator_chain(&self) -> EvaluatorChain {
        let dense_pattern = non_blank(&self.dense_rels).map(|p| RelPattern::parse(Some(p)));
        let dense = DenseNodeEvaluator::new(
            dense_pattern,
            self.degree_threshold,
            self.continue_below,
            self.filter_start_node,
        );

        let mut chain = EvaluatorChain::new(dense);
        if let Some(min_level) = self.min_level {
            chain = chain.with_min_level(min_level);
        }
        if let Some(max_level) = self.max_level {
            chain = chain.with_max_level(max_level);
        }
        if let Some(filter) = non_blank(&self.label_filter) {
            chain = chain.with_label_filter(LabelFilter::new(
                LabelFilterSpec::parse(filter),
                self.filter_start_node,
                self.limit,
                self.min_level,
            ));
        }
        chain
    }
}

/// Resolved expansion rules: which relationship types to follow in which
/// direction.
#[derive(Debug, Clone)]
struct Expander {
    rules: Vec<(Option<RelTypeId>, TraversalDirection)>,
}

impl Expander {
    /// Type names the graph has never seen match nothing.
    fn new<G: GraphAccess + ?Sized>(graph: &G, pattern: &RelPattern) -> Self {
        let mut rules = Vec::with_capacity(pattern.entries().len());
        for entry in pattern {
            match &entry.rel_type {
                None => rules.push((None, entry.direction)),
                Some(name) => match graph.rel_type_id(name) {
                    Some(id) => rules.push((Some(id), entry.direction)),
                    None => debug!(rel_type = %name, "relationship type not in graph, nothing to expand"),
                },
            }
        }
        Self { rules }
    }

    /// Relationships to follow from `node`, each at most once.
    fn expand<G: GraphAccess + ?Sized>(&self, graph: &G, node: NodeId) -> Result<Vec<Relationship>, GraphError> {
        match self.rules.as_slice() {
            [] => Ok(Vec::new()),
            [(rel_type, direction)] => graph.relationships(node, *rel_type, *direction),
            rules => {
                let mut seen = HashSet::new();
                let mut out = Vec::new();
                for &(rel_type, direction) in rules {
                    for rel in graph.relationships(node, rel_type, direction)? {
                        if seen.insert(rel.id) {
                            out.push(rel);
                        }
                    }
                }
                Ok(out)
            }
        }
    }
}

/// The relationship that led to a branch's end node.
#[derive(Debug, Clone, Copy)]
struct Via {
    rel: RelId,
    rel_type: RelTypeId,
    direction: Direction,
}

#[derive(Debug, Clone, Copy)]
struct Branch {
    node: NodeId,
    parent: Option<usize>,
    via: Option<Via>,
    depth: usize,
}

/// Walks parent pointers from a branch back to its start branch.
struct Ancestry<'a> {
    branches: &'a [Branch],
    next: Option<usize>,
}

impl Iterator for Ancestry<'_> {
    type Item = (NodeId, Option<RelId>);

    fn next(&mut self) -> Option<Self::Item> {
        let branch = &self.branches[self.next?];
        self.next = branch.parent;
        Some((branch.node, branch.via.map(|v| v.rel)))
    }
}

/// Counters describing the work a traversal has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub branches_created: u64,
    pub branches_evaluated: u64,
    pub paths_emitted: u64,
}

/// Pull-driven traversal yielding every emitted [`Path`].
pub struct Traverser<'g, G: ?Sized> {
    graph: &'g G,
    expander: Expander,
    chain: EvaluatorChain,
    uniqueness: UniquenessFilter,
    bfs: bool,
    branches: Vec<Branch>,
    frontier: VecDeque<usize>,
    state: EvaluatorState,
    stats: TraversalStats,
}

/// Start a traversal from `starts`.
///
/// Start nodes missing from the graph are skipped. Start nodes rejected by
/// the uniqueness mode (a repeated start under `NODE_GLOBAL`, say) are
/// dropped silently.
pub fn traverse<'g, G, I>(graph: &'g G, starts: I, config: &TraversalConfig) -> Traverser<'g, G>
where
    G: GraphAccess + ?Sized,
    I: IntoIterator<Item = NodeId>,
{
    let mut traverser = Traverser {
        graph,
        expander: Expander::new(graph, &config.expansion_pattern()),
        chain: config.evaluator_chain(),
        uniqueness: UniquenessFilter::new(config.uniqueness),
        bfs: config.bfs,
        branches: Vec::new(),
        frontier: VecDeque::new(),
        state: EvaluatorState::default(),
        stats: TraversalStats::default(),
    };

    for node in starts {
        if !graph.contains_node(node) {
            warn!(node, "start node not found, skipping");
            continue;
        }
        if traverser.uniqueness.admit(node, None, 0, std::iter::empty()) {
            traverser.branches.push(Branch {
                node,
                parent: None,
                via: None,
                depth: 0,
            });
        }
    }
    traverser.stats.branches_created = traverser.branches.len() as u64;
    traverser.schedule(0..traverser.branches.len());
    traverser
}

impl<'g, G: GraphAccess + ?Sized> Traverser<'g, G> {
    pub fn stats(&self) -> TraversalStats {
        self.stats
    }

    /// Queue freshly created branches. Depth-first pops from the back, so
    /// they go in reversed to explore the first one first.
    fn schedule(&mut self, created: std::ops::Range<usize>) {
        if self.bfs {
            self.frontier.extend(created);
        } else {
            self.frontier.extend(created.rev());
        }
    }

    fn pop(&mut self) -> Option<usize> {
        if self.bfs {
            self.frontier.pop_front()
        } else {
            self.frontier.pop_back()
        }
    }

    fn expand(&mut self, idx: usize) {
        let branch = self.branches[idx];
        let rels = match self.expander.expand(self.graph, branch.node) {
            Ok(rels) => rels,
            Err(err) => {
                warn!(node = branch.node, %err, "expansion failed, pruning branch");
                return;
            }
        };

        let first = self.branches.len();
        for rel in rels {
            let node = rel.other_node(branch.node);
            let depth = branch.depth + 1;
            let ancestry = Ancestry {
                branches: &self.branches,
                next: Some(idx),
            };
            if !self.uniqueness.admit(node, Some(rel.id), depth, ancestry) {
                continue;
            }
            self.branches.push(Branch {
                node,
                parent: Some(idx),
                via: Some(Via {
                    rel: rel.id,
                    rel_type: rel.rel_type,
                    direction: rel.direction_from(branch.node),
                }),
                depth,
            });
        }

        let created = first..self.branches.len();
        self.stats.branches_created += created.len() as u64;
        self.schedule(created);
    }

    fn materialize(&self, idx: usize) -> Path {
        let mut steps = Vec::with_capacity(self.branches[idx].depth);
        let mut current = idx;

        loop {
            let branch = &self.branches[current];
            match (branch.via, branch.parent) {
                (Some(via), Some(parent)) => {
                    steps.push(PathStep {
                        relationship: via.rel,
                        rel_type: self.graph.rel_type_name(via.rel_type).unwrap_or_default().to_string(),
                        direction: via.direction,
                        node: branch.node,
                    });
                    current = parent;
                }
                _ => break,
            }
        }

        steps.reverse();
        Path {
            start: self.branches[current].node,
            steps,
        }
    }
}

impl<G: GraphAccess + ?Sized> Iterator for Traverser<'_, G> {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        while let Some(idx) = self.pop() {
            let branch = self.branches[idx];
            self.stats.branches_evaluated += 1;

            let position = Position {
                end_node: branch.node,
                depth: branch.depth,
            };
            let verdict = self.chain.evaluate(self.graph, position, &self.state);

            if verdict.continues() {
                self.expand(idx);
            }
            if verdict.includes() {
                self.state.emitted += 1;
                self.stats.paths_emitted += 1;
                return Some(self.materialize(idx));
            }
        }
        None
    }
}

impl<G: GraphAccess + ?Sized> FusedIterator for Traverser<'_, G> {}
