//! Shaping traversal output: which paths to keep and the optional-placeholder
//! behaviour.

use std::iter::FusedIterator;

use crate::traversal::TraversalConfig;
use crate::uniqueness::Uniqueness;

/// What a caller wants back from a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultShape {
    /// Every emitted path.
    Paths,
    /// The end node of each emitted path, each node at most once.
    Nodes,
    /// One path per reachable end node.
    SinglePath,
}

impl ResultShape {
    /// Adjust `config` for this shape. Node-oriented shapes visit every node
    /// once and ignore the minimum level.
    pub fn apply(self, config: &mut TraversalConfig) {
        match self {
            ResultShape::Paths => {}
            ResultShape::Nodes | ResultShape::SinglePath => {
                config.uniqueness = Uniqueness::NodeGlobal;
                config.min_level = None;
            }
        }
    }
}

/// Wraps an iterator so that an empty sequence yields a single `None`.
///
/// Non-empty sequences pass through as `Some(item)` in order. Only one item
/// is ever pulled ahead.
#[derive(Debug)]
pub struct OptionalResults<I: Iterator> {
    inner: I,
    peeked: Option<I::Item>,
    started: bool,
    done: bool,
}

impl<I: Iterator> OptionalResults<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            peeked: None,
            started: false,
            done: false,
        }
    }
}

impl<I: Iterator> Iterator for OptionalResults<I> {
    type Item = Option<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            self.peeked = self.inner.next();
            if self.peeked.is_none() {
                self.done = true;
                return Some(None);
            }
        }
        if let Some(item) = self.peeked.take() {
            return Some(Some(item));
        }
        match self.inner.next() {
            Some(item) => Some(Some(item)),
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl<I: Iterator> FusedIterator for OptionalResults<I> {}

/// Either the placeholder-producing wrapper or a plain `Some` mapping.
pub enum Optional<I: Iterator> {
    Placeholder(OptionalResults<I>),
    Passthrough(I),
}

impl<I: Iterator> Iterator for Optional<I> {
    type Item = Option<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Optional::Placeholder(inner) => inner.next(),
            Optional::Passthrough(inner) => inner.next().map(Some),
        }
    }
}

/// Wrap `iter` with optional semantics when `enabled`.
pub fn optional<I: Iterator>(iter: I, enabled: bool) -> Optional<I> {
    if enabled {
        Optional::Placeholder(OptionalResults::new(iter))
    } else {
        Optional::Passthrough(iter)
    }
}
