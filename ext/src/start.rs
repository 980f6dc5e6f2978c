//! Resolution of the dynamically typed `start` argument.
//!
//! Accepted shapes: `null`, an integer node id, a node reference
//! (`{"id": n}`), or a list of either kind. The first list element decides
//! which kind the whole list is.

use dense_expand_core::{GraphAccess, NodeId};
use serde_json::Value;

use crate::error::{ExpandError, Result};

/// A `start` argument after shape checking, before graph lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartSpec {
    Empty,
    /// A node handle; it may have been deleted since it was obtained.
    Node(NodeId),
    /// A raw identifier that must resolve to an existing node.
    Id(i64),
    Nodes(Vec<NodeId>),
    Ids(Vec<i64>),
}

/// Integral value of a JSON number; fractions are truncated.
fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

/// A node reference is an object carrying a non-negative integer `id`.
fn as_node_ref(value: &Value) -> Option<NodeId> {
    value.as_object()?.get("id")?.as_u64()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

impl StartSpec {
    pub fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            return Ok(StartSpec::Empty);
        }
        if let Some(node) = as_node_ref(value) {
            return Ok(StartSpec::Node(node));
        }
        if let Some(id) = as_id(value) {
            return Ok(StartSpec::Id(id));
        }

        let Value::Array(items) = value else {
            return Err(ExpandError::UnsupportedInput(describe(value).to_string()));
        };
        let Some(first) = items.first() else {
            return Ok(StartSpec::Empty);
        };

        if as_node_ref(first).is_some() {
            items
                .iter()
                .map(|item| {
                    as_node_ref(item).ok_or_else(|| {
                        ExpandError::UnsupportedInput(format!("list of nodes containing a {}", describe(item)))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(StartSpec::Nodes)
        } else if as_id(first).is_some() {
            items
                .iter()
                .map(|item| {
                    as_id(item).ok_or_else(|| {
                        ExpandError::UnsupportedInput(format!("list of ids containing a {}", describe(item)))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(StartSpec::Ids)
        } else {
            Err(ExpandError::UnsupportedInput(format!("list of {}", describe(first))))
        }
    }

    /// Turn the start argument into start nodes. Raw ids must exist in `graph`; node
    /// handles are passed through and left for the traversal to skip if gone.
    pub fn resolve<G: GraphAccess + ?Sized>(&self, graph: &G) -> Result<Vec<NodeId>> {
        let lookup = |id: i64| -> Result<NodeId> {
            NodeId::try_from(id)
                .ok()
                .filter(|&node| graph.contains_node(node))
                .ok_or(ExpandError::NodeNotFound(id))
        };

        match self {
            StartSpec::Empty => Ok(Vec::new()),
            StartSpec::Node(node) => Ok(vec![*node]),
            StartSpec::Nodes(nodes) => Ok(nodes.clone()),
            StartSpec::Id(id) => Ok(vec![lookup(*id)?]),
            StartSpec::Ids(ids) => ids.iter().map(|&id| lookup(id)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dense_expand_core::Graph;
    use serde_json::json;

    fn parse(value: Value) -> StartSpec {
        StartSpec::from_value(&value).unwrap()
    }

    #[test]
    fn test_accepted_shapes() {
        assert_eq!(parse(Value::Null), StartSpec::Empty);
        assert_eq!(parse(json!(7)), StartSpec::Id(7));
        assert_eq!(parse(json!(7.9)), StartSpec::Id(7));
        assert_eq!(parse(json!({"id": 3, "labels": ["A"]})), StartSpec::Node(3));
        assert_eq!(parse(json!([])), StartSpec::Empty);
        assert_eq!(parse(json!([1, 2])), StartSpec::Ids(vec![1, 2]));
        assert_eq!(parse(json!([{"id": 1}, {"id": 2}])), StartSpec::Nodes(vec![1, 2]));
    }

    #[test]
    fn test_unsupported_shapes() {
        for bad in [json!("7"), json!(true), json!({"name": "x"}), json!(["a"]), json!([1, "a"]), json!([{"id": 1}, 2])] {
            let err = StartSpec::from_value(&bad).unwrap_err();
            assert!(matches!(err, ExpandError::UnsupportedInput(_)), "{bad}");
            assert!(err.to_string().contains("a node, a node id, or a list"));
        }
    }

    #[test]
    fn test_resolve_ids_must_exist() {
        let mut g = Graph::new();
        g.add_node(1, ["A"]);
        g.add_node(2, ["B"]);

        assert_eq!(StartSpec::Ids(vec![2, 1]).resolve(&g).unwrap(), [2, 1]);
        assert!(matches!(StartSpec::Id(9).resolve(&g), Err(ExpandError::NodeNotFound(9))));
        assert!(matches!(StartSpec::Ids(vec![1, -4]).resolve(&g), Err(ExpandError::NodeNotFound(-4))));
    }

    #[test]
    fn test_resolve_node_handles_pass_through() {
        let g = Graph::new();
        assert_eq!(StartSpec::Node(5).resolve(&g).unwrap(), [5]);
        assert_eq!(StartSpec::Nodes(vec![5, 6]).resolve(&g).unwrap(), [5, 6]);
        assert!(StartSpec::Empty.resolve(&g).unwrap().is_empty());
    }
}
