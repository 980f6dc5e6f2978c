//! Uniqueness rules that keep a traversal from revisiting graph elements.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use tracing::warn;

use crate::graph::{NodeId, RelId};

/// How many recently visited elements the `*_RECENT` modes remember.
pub const RECENT_WINDOW: usize = 10_000;

/// Which elements of a branch must not repeat, and over what scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Uniqueness {
    /// No restriction; cyclic graphs need a level bound.
    None,
    /// A node is visited at most once per traversal.
    NodeGlobal,
    /// A node appears at most once within one path.
    NodePath,
    /// Like `NodeGlobal`, but only over the most recently visited nodes.
    NodeRecent,
    /// A node is visited at most once per depth.
    NodeLevel,
    RelationshipGlobal,
    /// A relationship appears at most once within one path.
    #[default]
    RelationshipPath,
    RelationshipRecent,
    RelationshipLevel,
}

impl Uniqueness {
    pub const ALL: [Uniqueness; 9] = [
        Uniqueness::None,
        Uniqueness::NodeGlobal,
        Uniqueness::NodePath,
        Uniqueness::NodeRecent,
        Uniqueness::NodeLevel,
        Uniqueness::RelationshipGlobal,
        Uniqueness::RelationshipPath,
        Uniqueness::RelationshipRecent,
        Uniqueness::RelationshipLevel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Uniqueness::None => "NONE",
            Uniqueness::NodeGlobal => "NODE_GLOBAL",
            Uniqueness::NodePath => "NODE_PATH",
            Uniqueness::NodeRecent => "NODE_RECENT",
            Uniqueness::NodeLevel => "NODE_LEVEL",
            Uniqueness::RelationshipGlobal => "RELATIONSHIP_GLOBAL",
            Uniqueness::RelationshipPath => "RELATIONSHIP_PATH",
            Uniqueness::RelationshipRecent => "RELATIONSHIP_RECENT",
            Uniqueness::RelationshipLevel => "RELATIONSHIP_LEVEL",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|u| u.name().eq_ignore_ascii_case(name))
    }

    /// Like [`Uniqueness::from_name`], falling back to the default for
    /// absent or unrecognised names.
    pub fn parse_or_default(name: Option<&str>) -> Self {
        match name {
            None => Self::default(),
            Some(name) => Self::from_name(name).unwrap_or_else(|| {
                warn!(uniqueness = name, fallback = Self::default().name(), "unknown uniqueness");
                Self::default()
            }),
        }
    }

    fn scope(self) -> Option<(Element, Scope)> {
        match self {
            Uniqueness::None => None,
            Uniqueness::NodeGlobal => Some((Element::Node, Scope::Global)),
            Uniqueness::NodePath => Some((Element::Node, Scope::Path)),
            Uniqueness::NodeRecent => Some((Element::Node, Scope::Recent)),
            Uniqueness::NodeLevel => Some((Element::Node, Scope::Level)),
            Uniqueness::RelationshipGlobal => Some((Element::Relationship, Scope::Global)),
            Uniqueness::RelationshipPath => Some((Element::Relationship, Scope::Path)),
            Uniqueness::RelationshipRecent => Some((Element::Relationship, Scope::Recent)),
            Uniqueness::RelationshipLevel => Some((Element::Relationship, Scope::Level)),
        }
    }
}

impl fmt::Display for Uniqueness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Node,
    Relationship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Global,
    Path,
    Recent,
    Level,
}

/// Bounded FIFO set.
#[derive(Debug, Default)]
struct RecentSet {
    members: HashSet<u64>,
    order: VecDeque<u64>,
    capacity: usize,
}

impl RecentSet {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            members: HashSet::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Returns false if `id` is already remembered.
    fn insert(&mut self, id: u64) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push_back(id);
        if self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.members.remove(&evicted);
            }
        }
        true
    }
}

/// Per-traversal uniqueness bookkeeping.
#[derive(Debug)]
pub(crate) struct UniquenessFilter {
    mode: Option<(Element, Scope)>,
    global: HashSet<u64>,
    recent: RecentSet,
    levels: HashMap<usize, HashSet<u64>>,
}

impl UniquenessFilter {
    pub(crate) fn new(uniqueness: Uniqueness) -> Self {
        Self::with_window(uniqueness, RECENT_WINDOW)
    }

    fn with_window(uniqueness: Uniqueness, window: usize) -> Self {
        Self {
            mode: uniqueness.scope(),
            global: HashSet::new(),
            recent: RecentSet::with_capacity(window),
            levels: HashMap::new(),
        }
    }

    /// Decide whether a new branch may be created, recording it if so.
    ///
    /// `rel` is the relationship that reached `node` (`None` for a start
    /// branch, which relationship modes always admit). `ancestry` yields the
    /// `(node, reaching relationship)` pairs of the parent chain, nearest first.
    pub(crate) fn admit<A>(&mut self, node: NodeId, rel: Option<RelId>, depth: usize, ancestry: A) -> bool
    where
        A: IntoIterator<Item = (NodeId, Option<RelId>)>,
    {
        let Some((element, scope)) = self.mode else {
            return true;
        };
        let id = match element {
            Element::Node => node,
            Element::Relationship => match rel {
                Some(rel) => rel,
                None => return true,
            },
        };

        match scope {
            Scope::Global => self.global.insert(id),
            Scope::Recent => self.recent.insert(id),
            Scope::Level => self.levels.entry(depth).or_default().insert(id),
            Scope::Path => match element {
                Element::Node => !ancestry.into_iter().any(|(n, _)| n == id),
                Element::Relationship => !ancestry.into_iter().any(|(_, r)| r == Some(id)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_ancestry() -> Vec<(NodeId, Option<RelId>)> {
        Vec::new()
    }

    #[test]
    fn test_names_round_trip() {
        for u in Uniqueness::ALL {
            assert_eq!(Uniqueness::from_name(u.name()), Some(u));
            assert_eq!(u.to_string(), u.name());
        }
    }

    #[test]
    fn test_name_lookup_ignores_case() {
        assert_eq!(Uniqueness::from_name("node_global"), Some(Uniqueness::NodeGlobal));
        assert_eq!(Uniqueness::from_name(" Relationship_Path "), Some(Uniqueness::RelationshipPath));
        assert_eq!(Uniqueness::from_name("NODE GLOBAL"), None);
    }

    #[test]
    fn test_unknown_falls_back_to_default() {
        assert_eq!(Uniqueness::parse_or_default(Some("bogus")), Uniqueness::RelationshipPath);
        assert_eq!(Uniqueness::parse_or_default(None), Uniqueness::RelationshipPath);
        assert_eq!(Uniqueness::parse_or_default(Some("none")), Uniqueness::None);
    }

    #[test]
    fn test_none_admits_everything() {
        let mut f = UniquenessFilter::new(Uniqueness::None);
        assert!(f.admit(1, Some(1), 1, no_ancestry()));
        assert!(f.admit(1, Some(1), 1, vec![(1, Some(1))]));
    }

    #[test]
    fn test_node_global() {
        let mut f = UniquenessFilter::new(Uniqueness::NodeGlobal);
        assert!(f.admit(1, None, 0, no_ancestry()));
        assert!(f.admit(2, Some(10), 1, no_ancestry()));
        assert!(!f.admit(2, Some(11), 3, no_ancestry()));
        // Duplicate start nodes are rejected too
        assert!(!f.admit(1, None, 0, no_ancestry()));
    }

    #[test]
    fn test_node_path() {
        let mut f = UniquenessFilter::new(Uniqueness::NodePath);
        assert!(f.admit(3, Some(7), 2, vec![(2, Some(6)), (1, None)]));
        assert!(!f.admit(1, Some(8), 2, vec![(2, Some(6)), (1, None)]));
        // Other paths may reach the same node
        assert!(f.admit(3, Some(9), 2, vec![(4, Some(5)), (1, None)]));
    }

    #[test]
    fn test_relationship_path() {
        let mut f = UniquenessFilter::new(Uniqueness::RelationshipPath);
        assert!(f.admit(1, None, 0, no_ancestry()));
        assert!(f.admit(1, None, 0, no_ancestry()));
        assert!(f.admit(2, Some(6), 2, vec![(1, Some(5)), (2, None)]));
        assert!(!f.admit(1, Some(5), 2, vec![(2, Some(5)), (1, None)]));
    }

    #[test]
    fn test_relationship_global() {
        let mut f = UniquenessFilter::new(Uniqueness::RelationshipGlobal);
        assert!(f.admit(2, Some(5), 1, no_ancestry()));
        assert!(!f.admit(1, Some(5), 2, no_ancestry()));
        assert!(f.admit(1, Some(6), 2, no_ancestry()));
    }

    #[test]
    fn test_level_scopes_per_depth() {
        let mut f = UniquenessFilter::new(Uniqueness::NodeLevel);
        assert!(f.admit(5, Some(1), 1, no_ancestry()));
        assert!(!f.admit(5, Some(2), 1, no_ancestry()));
        assert!(f.admit(5, Some(3), 2, no_ancestry()));

        let mut f = UniquenessFilter::new(Uniqueness::RelationshipLevel);
        assert!(f.admit(1, Some(9), 1, no_ancestry()));
        assert!(!f.admit(2, Some(9), 1, no_ancestry()));
        assert!(f.admit(2, Some(9), 2, no_ancestry()));
    }

    #[test]
    fn test_recent_window_evicts_oldest() {
        let mut f = UniquenessFilter::with_window(Uniqueness::NodeRecent, 2);
        assert!(f.admit(1, None, 0, no_ancestry()));
        assert!(f.admit(2, Some(1), 1, no_ancestry()));
        assert!(!f.admit(2, Some(2), 1, no_ancestry()));
        assert!(f.admit(3, Some(3), 1, no_ancestry()));
        // 1 fell out of the window
        assert!(f.admit(1, Some(4), 2, no_ancestry()));
        assert!(!f.admit(3, Some(5), 2, no_ancestry()));
    }
}
