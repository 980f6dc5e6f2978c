//! Relationship patterns: `|`-separated segments such as `KNOWS>`, `<OWNS`,
//! `LIKES`, `>` or `` `odd:name` ``.
//!
//! A trailing `>` means outgoing, a leading `<` incoming, neither means both.
//! Parsing never fails; a segment without a usable type name matches every
//! relationship type in its direction.

use std::fmt;

use crate::graph::TraversalDirection;

const BACKTICK: char = '`';

/// One `(type, direction)` entry of a [`RelPattern`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelTypeAndDirection {
    /// `None` matches every relationship type.
    pub rel_type: Option<String>,
    pub direction: TraversalDirection,
}

impl RelTypeAndDirection {
    pub fn new(rel_type: Option<&str>, direction: TraversalDirection) -> Self {
        Self {
            rel_type: rel_type.map(str::to_string),
            direction,
        }
    }

    fn parse(segment: &str) -> Self {
        Self {
            rel_type: type_for(segment),
            direction: direction_for(segment),
        }
    }
}

/// An ordered list of relationship types and directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelPattern {
    entries: Vec<RelTypeAndDirection>,
}

impl RelPattern {
    /// Parse a pattern string. `None` and `""` both mean every type in both
    /// directions.
    pub fn parse(pattern: Option<&str>) -> Self {
        match pattern {
            None => Self::unrestricted(),
            Some(pattern) => Self {
                entries: pattern.split('|').map(RelTypeAndDirection::parse).collect(),
            },
        }
    }

    /// A pattern that follows every relationship in both directions.
    pub fn unrestricted() -> Self {
        Self {
            entries: vec![RelTypeAndDirection::new(None, TraversalDirection::Both)],
        }
    }

    pub fn entries(&self) -> &[RelTypeAndDirection] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RelTypeAndDirection> {
        self.entries.iter()
    }

    /// True if some entry already admits every relationship of a node.
    pub fn is_unrestricted(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.rel_type.is_none() && e.direction == TraversalDirection::Both)
    }
}

impl<'a> IntoIterator for &'a RelPattern {
    type Item = &'a RelTypeAndDirection;
    type IntoIter = std::slice::Iter<'a, RelTypeAndDirection>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Direction markers are read from the raw segment: `<` anywhere wins over `>`.
fn direction_for(segment: &str) -> TraversalDirection {
    if segment.contains('<') {
        TraversalDirection::Incoming
    } else if segment.contains('>') {
        TraversalDirection::Outgoing
    } else {
        TraversalDirection::Both
    }
}

/// Backticked names are taken verbatim between the first and last backtick
/// (everything after a lone backtick). Bare names lose `<`, `>` and `:`.
fn type_for(segment: &str) -> Option<String> {
    let name = match (segment.find(BACKTICK), segment.rfind(BACKTICK)) {
        (Some(first), Some(last)) if first < last => segment[first + 1..last].to_string(),
        (Some(first), _) => segment[first + 1..].to_string(),
        _ => segment
            .chars()
            .filter(|c| !matches!(c, '<' | '>' | ':'))
            .collect::<String>()
            .trim()
            .to_string(),
    };

    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}

fn needs_quoting(name: &str) -> bool {
    name != name.trim() || name.contains(['<', '>', ':', '|'])
}

impl fmt::Display for RelTypeAndDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.direction == TraversalDirection::Incoming {
            f.write_str("<")?;
        }
        match &self.rel_type {
            Some(name) if needs_quoting(name) => write!(f, "`{name}`")?,
            Some(name) => f.write_str(name)?,
            None => {}
        }
        if self.direction == TraversalDirection::Outgoing {
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Display for RelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
