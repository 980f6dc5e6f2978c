//! Lenient coercion of the procedure configuration map.
//!
//! Every option is optional and malformed values never fail: they fall back
//! to the option's default.

use dense_expand_core::{TraversalConfig, Uniqueness, DEFAULT_DEGREE_THRESHOLD};
use serde_json::{Map, Value};
use tracing::debug;

/// Integer view of a config value: numbers truncate, strings must parse.
pub fn to_long(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Boolean view of a config value. `null`, zero, `false` and the strings
/// `""`, `"false"`, `"no"`, `"0"` (any case) are false; everything else is true.
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(_) => to_long(value) != Some(0),
        Value::String(s) => {
            !(s.is_empty()
                || s.eq_ignore_ascii_case("false")
                || s.eq_ignore_ascii_case("no")
                || s == "0")
        }
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Options of the `expand.denseNodes.*` procedures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandConfig {
    pub min_level: Option<usize>,
    pub max_level: Option<usize>,
    pub relationship_filter: String,
    pub label_filter: Option<String>,
    pub uniqueness: Uniqueness,
    pub bfs: bool,
    pub filter_start_node: bool,
    pub optional: bool,
    pub limit: Option<u64>,
    pub degree: i64,
    pub dense_rels: String,
    pub continue_below: i64,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            min_level: None,
            max_level: None,
            relationship_filter: String::new(),
            label_filter: None,
            uniqueness: Uniqueness::default(),
            bfs: true,
            filter_start_node: false,
            optional: false,
            limit: None,
            degree: DEFAULT_DEGREE_THRESHOLD,
            dense_rels: String::new(),
            continue_below: 0,
        }
    }
}

fn long_or(map: &Map<String, Value>, key: &str, default: i64) -> i64 {
    match map.get(key) {
        None => default,
        Some(value) => to_long(value).unwrap_or_else(|| {
            debug!(option = key, %value, default, "config value is not an integer, using default");
            default
        }),
    }
}

/// Negative values mean "unset".
fn unsigned(map: &Map<String, Value>, key: &str) -> Option<u64> {
    u64::try_from(long_or(map, key, -1)).ok()
}

fn bool_or(map: &Map<String, Value>, key: &str, default: bool) -> bool {
    map.get(key).map_or(default, to_bool)
}

fn string(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(value) => {
            debug!(option = key, %value, "config value is not a string, ignoring");
            None
        }
    }
}

impl ExpandConfig {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        let degree = if map.contains_key("degree") {
            long_or(map, "degree", defaults.degree)
        } else {
            long_or(map, "density", defaults.degree)
        };

        Self {
            min_level: unsigned(map, "minLevel").map(|v| v as usize),
            max_level: unsigned(map, "maxLevel").map(|v| v as usize),
            relationship_filter: string(map, "relationshipFilter").unwrap_or_default(),
            label_filter: string(map, "labelFilter"),
            uniqueness: Uniqueness::parse_or_default(string(map, "uniqueness").as_deref()),
            bfs: bool_or(map, "bfs", defaults.bfs),
            filter_start_node: bool_or(map, "filterStartNode", defaults.filter_start_node),
            optional: bool_or(map, "optional", defaults.optional),
            limit: unsigned(map, "limit"),
            degree,
            dense_rels: string(map, "denseRels").unwrap_or_default(),
            continue_below: long_or(map, "continueBelow", defaults.continue_below),
        }
    }

    /// Parse from any JSON value; anything but an object yields the defaults.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            Value::Null => Self::default(),
            other => {
                debug!(config = %other, "config is not a map, using defaults");
                Self::default()
            }
        }
    }

    pub fn into_traversal_config(self) -> TraversalConfig {
        TraversalConfig {
            relationship_filter: Some(self.relationship_filter),
            label_filter: self.label_filter,
            min_level: self.min_level,
            max_level: self.max_level,
            uniqueness: self.uniqueness,
            bfs: self.bfs,
            filter_start_node: self.filter_start_node,
            limit: self.limit,
            dense_rels: Some(self.dense_rels),
            degree_threshold: self.degree,
            continue_below: self.continue_below,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> ExpandConfig {
        ExpandConfig::from_value(&value)
    }

    #[test]
    fn test_to_long() {
        assert_eq!(to_long(&json!(12)), Some(12));
        assert_eq!(to_long(&json!(12.9)), Some(12));
        assert_eq!(to_long(&json!("-3")), Some(-3));
        assert_eq!(to_long(&json!("3.5")), None);
        assert_eq!(to_long(&json!("abc")), None);
        assert_eq!(to_long(&json!(true)), None);
        assert_eq!(to_long(&Value::Null), None);
    }

    #[test]
    fn test_to_bool() {
        for falsy in [Value::Null, json!(false), json!(0), json!(0.4), json!(""), json!("FALSE"), json!("No"), json!("0")] {
            assert!(!to_bool(&falsy), "{falsy}");
        }
        for truthy in [json!(true), json!(1), json!(-2), json!("yes"), json!("off"), json!(" "), json!([]), json!({})] {
            assert!(to_bool(&truthy), "{truthy}");
        }
    }

    #[test]
    fn test_defaults() {
        let c = config(json!({}));
        assert_eq!(c, ExpandConfig::default());
        assert_eq!(c.degree, 1000);
        assert!(c.bfs);
        assert_eq!(c.uniqueness, Uniqueness::RelationshipPath);
        assert_eq!(config(Value::Null), c);
        assert_eq!(config(json!("nonsense")), c);
    }

    #[test]
    fn test_all_options() {
        let c = config(json!({
            "minLevel": 1,
            "maxLevel": "4",
            "relationshipFilter": "KNOWS>",
            "labelFilter": "+Person",
            "uniqueness": "node_path",
            "bfs": "false",
            "filterStartNode": 1,
            "optional": "yes",
            "limit": 10,
            "degree": "50",
            "denseRels": "<OWNS",
            "continueBelow": 200,
        }));
        assert_eq!(c.min_level, Some(1));
        assert_eq!(c.max_level, Some(4));
        assert_eq!(c.relationship_filter, "KNOWS>");
        assert_eq!(c.label_filter.as_deref(), Some("+Person"));
        assert_eq!(c.uniqueness, Uniqueness::NodePath);
        assert!(!c.bfs);
        assert!(c.filter_start_node);
        assert!(c.optional);
        assert_eq!(c.limit, Some(10));
        assert_eq!(c.degree, 50);
        assert_eq!(c.dense_rels, "<OWNS");
        assert_eq!(c.continue_below, 200);
    }

    #[test]
    fn test_negative_means_unset() {
        let c = config(json!({"minLevel": -1, "maxLevel": "-5", "limit": -1}));
        assert_eq!(c.min_level, None);
        assert_eq!(c.max_level, None);
        assert_eq!(c.limit, None);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let c = config(json!({
            "degree": "lots",
            "maxLevel": [1],
            "continueBelow": null,
            "relationshipFilter": 5,
            "uniqueness": "sideways",
            "bfs": null,
        }));
        assert_eq!(c.degree, 1000);
        assert_eq!(c.max_level, None);
        assert_eq!(c.continue_below, 0);
        assert_eq!(c.relationship_filter, "");
        assert_eq!(c.uniqueness, Uniqueness::RelationshipPath);
        // An explicit null coerces to false rather than the default
        assert!(!c.bfs);
    }

    #[test]
    fn test_density_alias() {
        assert_eq!(config(json!({"density": 25})).degree, 25);
        assert_eq!(config(json!({"density": 25, "degree": 30})).degree, 30);
    }

    #[test]
    fn test_into_traversal_config() {
        let t = config(json!({"maxLevel": 3, "degree": 7, "labelFilter": "-X"})).into_traversal_config();
        assert_eq!(t.max_level, Some(3));
        assert_eq!(t.degree_threshold, 7);
        assert_eq!(t.label_filter.as_deref(), Some("-X"));
        assert!(t.expansion_pattern().is_unrestricted());
    }
}
