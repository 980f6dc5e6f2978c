//! Property-based tests for the traversal engine.
//!
//! Invariants that should hold for all inputs:
//! - Parsing: a single bare segment yields exactly one both-direction entry
//! - Labels: a label both allowed and denied is always denied
//! - Optional: an empty sequence becomes one placeholder, anything else is unchanged
//! - Idempotence: the same traversal on an unchanged graph gives the same paths
//! - Start node: under node-global uniqueness the start is never emitted

use dense_expand_core::*;
use proptest::prelude::*;

fn build_graph(nodes: u64, edges: &[(u64, u64, bool)]) -> Graph {
    let mut g = Graph::with_capacity(nodes as usize);
    let a = g.intern_rel_type("A");
    let b = g.intern_rel_type("B");
    for id in 0..nodes {
        g.add_node(id, [if id % 3 == 0 { "Even" } else { "Odd" }]);
    }
    for &(from, to, is_a) in edges {
        g.add_relationship(from % nodes, to % nodes, if is_a { a } else { b });
    }
    g
}

fn edges_strategy() -> impl Strategy<Value = Vec<(u64, u64, bool)>> {
    prop::collection::vec((0u64..20, 0u64..20, any::<bool>()), 0..60)
}

proptest! {
    #[test]
    fn prop_single_segment_is_both_directions(name in "[A-Za-z_][A-Za-z0-9_]{0,15}") {
        let parsed = RelPattern::parse(Some(&name));
        prop_assert_eq!(parsed.entries().len(), 1);
        prop_assert_eq!(parsed.entries()[0].rel_type.as_deref(), Some(name.as_str()));
        prop_assert_eq!(parsed.entries()[0].direction, TraversalDirection::Both);
    }

    #[test]
    fn prop_deny_precedence(
        allowed in prop::collection::vec("[A-Z][a-z]{0,6}", 0..4),
        denied in prop::collection::vec("[A-Z][a-z]{0,6}", 0..4),
        shared in "[A-Z][a-z]{0,6}",
        extra in prop::collection::vec("[A-Z][a-z]{0,6}", 0..4),
    ) {
        let mut tokens: Vec<String> = allowed.iter().map(|l| format!("+{l}")).collect();
        tokens.extend(denied.iter().map(|l| format!("-:{l}")));
        tokens.push(format!("+{shared}"));
        tokens.push(format!("-{shared}"));
        let spec = LabelFilterSpec::parse(&tokens.join("|"));

        let mut labels = extra.clone();
        labels.push(shared.clone());
        prop_assert!(spec.is_denied(&labels));
        prop_assert!(!spec.permits(&labels));
    }

    #[test]
    fn prop_optional_semantics(items in prop::collection::vec(any::<i32>(), 0..20)) {
        let with: Vec<Option<i32>> = optional(items.clone().into_iter(), true).collect();
        let without: Vec<Option<i32>> = optional(items.clone().into_iter(), false).collect();
        if items.is_empty() {
            prop_assert_eq!(with, vec![None]);
            prop_assert!(without.is_empty());
        } else {
            prop_assert_eq!(with, without);
        }
    }

    #[test]
    fn prop_directed_degrees_sum_to_undirected(
        edges in edges_strategy(),
        node in 0u64..20,
    ) {
        let loop_free: Vec<_> = edges.into_iter().filter(|(f, t, _)| f != t).collect();
        let g = build_graph(20, &loop_free);
        let out = degree(&g, node, Some("A>")).unwrap();
        let inc = degree(&g, node, Some("<A")).unwrap();
        prop_assert_eq!(degree(&g, node, Some("A")).unwrap(), out + inc);
        prop_assert_eq!(
            degree(&g, node, None).unwrap(),
            degree(&g, node, Some("A|B")).unwrap()
        );
    }

    #[test]
    fn prop_traversal_is_idempotent(
        edges in edges_strategy(),
        start in 0u64..20,
        threshold in 0i64..8,
        bfs in any::<bool>(),
        max_level in 1usize..5,
    ) {
        let g = build_graph(20, &edges);
        let config = TraversalConfig::default()
            .with_degree_threshold(threshold)
            .with_bfs(bfs)
            .with_max_level(max_level);
        let first: Vec<Path> = traverse(&g, [start], &config).collect();
        let second: Vec<Path> = traverse(&g, [start], &config).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_start_never_emitted_in_node_mode(
        edges in edges_strategy(),
        start in 0u64..20,
        threshold in 0i64..8,
        continue_below in 0i64..10,
        label_filter in prop::option::of(prop::sample::select(vec!["+Even", "-Odd", "+Odd|-Even"])),
    ) {
        let g = build_graph(20, &edges);
        let mut config = TraversalConfig::default()
            .with_degree_threshold(threshold)
            .with_continue_below(continue_below);
        config.label_filter = label_filter.map(str::to_string);
        ResultShape::Nodes.apply(&mut config);

        for path in traverse(&g, [start], &config) {
            prop_assert_ne!(path.end_node(), start);
            prop_assert!(path.length() > 0);
        }
    }

    #[test]
    fn prop_emitted_paths_are_connected(
        edges in edges_strategy(),
        start in 0u64..20,
        threshold in 0i64..6,
    ) {
        let g = build_graph(20, &edges);
        let config = TraversalConfig::default()
            .with_degree_threshold(threshold)
            .with_continue_below(100)
            .with_max_level(4);

        for path in traverse(&g, [start], &config) {
            prop_assert_eq!(path.start_node(), start);
            let mut prev = start;
            for step in &path.steps {
                let rels = g.relationships(prev, None, TraversalDirection::Both).unwrap();
                let rel = rels.iter().find(|r| r.id == step.relationship);
                prop_assert!(rel.is_some());
                let rel = rel.unwrap();
                prop_assert_eq!(rel.other_node(prev), step.node);
                prop_assert_eq!(rel.direction_from(prev), step.direction);
                prev = step.node;
            }
        }
    }
}
