use dense_expand_core::{traverse, Graph, ResultShape, TraversalConfig, Traverser};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Paths runs stop after this many results; relationship-path uniqueness on
/// a well-connected graph is exponential in depth.
const PATH_CAP: usize = 100_000;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let node_count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1_000_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: dense-expand-bench [mode] [node_count]");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and benchmark each (default)");
        println!("  lsystem     Fractal branching tree (uniform degree, nothing dense)");
        println!("  scalefree   Preferential attachment via edge sampling (hub-and-spoke)");
        println!("  random      Erdos-Renyi uniform random edges");
        println!("  hubchain    Chain of hubs with growing fan-out");
        println!();
        println!("Default node_count: 1000000");
        println!("Set RUST_LOG=debug to see traversal internals.");
        return;
    }

    println!("dense-expand-bench");
    println!("==================");
    println!();

    let generators: Vec<(&str, fn(u64) -> Graph)> = match mode {
        "lsystem" => vec![("L-system tree", gen_lsystem)],
        "scalefree" => vec![("Scale-free (edge sampling)", gen_scale_free)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "hubchain" => vec![("Hub chain", gen_hub_chain)],
        "all" => vec![
            ("L-system tree", gen_lsystem as fn(u64) -> Graph),
            ("Scale-free (edge sampling)", gen_scale_free),
            ("Erdos-Renyi random", gen_random),
            ("Hub chain", gen_hub_chain),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in generators {
        run_benchmark(name, generator, node_count);
    }
}

/// Drain a traversal, returning how many results it produced and the
/// traverser itself for its counters.
fn drain<'g>(mut traverser: Traverser<'g, Graph>, cap: usize) -> (usize, Traverser<'g, Graph>) {
    let found = traverser.by_ref().take(cap).count();
    (found, traverser)
}

fn run_benchmark(name: &str, generator: fn(u64) -> Graph, node_count: u64) {
    println!("--- {} ---", name);
    println!("Target: {} nodes", node_count);

    let t = Instant::now();
    let graph = generator(node_count);
    let gen_time = t.elapsed();
    info!(
        generator = name,
        nodes = graph.node_count(),
        relationships = graph.relationship_count(),
        memory_mb = graph.memory_usage() as f64 / 1_048_576.0,
        gen_time_ms = gen_time.as_secs_f64() * 1000.0,
        "graph generated"
    );

    // Dense nodes reachable from node 0, one row per threshold
    println!();
    println!(
        "{:>10} {:>10} {:>12} {:>12} {:>10}",
        "threshold", "found", "created", "evaluated", "time"
    );
    println!("{:->10} {:->10} {:->12} {:->12} {:->10}", "", "", "", "", "");

    for threshold in [10, 50, 100, 1_000, 10_000] {
        let mut config = TraversalConfig::default().with_degree_threshold(threshold);
        ResultShape::Nodes.apply(&mut config);

        let t = Instant::now();
        let (found, traverser) = drain(traverse(&graph, [0], &config), usize::MAX);
        let elapsed = t.elapsed();
        let stats = traverser.stats();
        println!(
            "{:>10} {:>10} {:>12} {:>12} {:>8.1}ms",
            threshold,
            found,
            stats.branches_created,
            stats.branches_evaluated,
            elapsed.as_secs_f64() * 1000.0
        );
    }

    // Expanding past moderately dense nodes
    println!();
    println!(
        "{:>14} {:>10} {:>12} {:>10}",
        "continueBelow", "found", "evaluated", "time"
    );
    println!("{:->14} {:->10} {:->12} {:->10}", "", "", "", "");

    for continue_below in [0, 100, 500, 5_000] {
        let mut config = TraversalConfig::default()
            .with_degree_threshold(50)
            .with_continue_below(continue_below);
        ResultShape::Nodes.apply(&mut config);

        let t = Instant::now();
        let (found, traverser) = drain(traverse(&graph, [0], &config), usize::MAX);
        let elapsed = t.elapsed();
        println!(
            "{:>14} {:>10} {:>12} {:>8.1}ms",
            continue_below,
            found,
            traverser.stats().branches_evaluated,
            elapsed.as_secs_f64() * 1000.0
        );
    }

    // Every path (capped) versus one path per dense node
    println!();
    for (label, shape) in [("paths", ResultShape::Paths), ("singlePath", ResultShape::SinglePath)] {
        let mut config = TraversalConfig::default()
            .with_degree_threshold(100)
            .with_max_level(4);
        shape.apply(&mut config);

        let t = Instant::now();
        let (found, traverser) = drain(traverse(&graph, [0], &config), PATH_CAP);
        let elapsed = t.elapsed();
        let capped = if found == PATH_CAP { " (capped)" } else { "" };
        println!(
            "{:<10} maxLevel 4: {} paths{}, {} branches in {:.1}ms",
            label,
            found,
            capped,
            traverser.stats().branches_created,
            elapsed.as_secs_f64() * 1000.0
        );
    }
    println!();
}

// ---------------------------------------------------------------------------
// Generators: all O(n) or O(n + relationships), single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
}

const REL_TYPES: [&str; 4] = ["KNOWS", "FOLLOWS", "OWNS", "LIKES"];

fn relate(graph: &mut Graph, rng: &mut FastRng, from: u64, to: u64) {
    let rt = graph.intern_rel_type(REL_TYPES[rng.next(REL_TYPES.len() as u64) as usize]);
    graph.add_relationship(from, to, rt);
}

/// L-system fractal tree: every node has three children, so with any
/// threshold above 4 the traversal walks the whole tree and finds nothing.
fn gen_lsystem(node_count: u64) -> Graph {
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(42);

    let branching = 3u64;
    graph.add_node(0, ["Root"]);

    let mut next_id: u64 = 1;
    let mut frontier: Vec<u64> = vec![0];

    while next_id < node_count && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching as usize);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= node_count {
                    break;
                }
                let child = next_id;
                next_id += 1;
                graph.add_node(child, ["Person"]);
                relate(&mut graph, &mut rng, parent, child);
                next_frontier.push(child);
            }
        }
        frontier = next_frontier;
    }

    graph
}

/// Scale-free via edge-list sampling (O(relationships), not O(n²)).
///
/// Preferential attachment by picking a random existing relationship and
/// connecting to one of its endpoints; well-connected nodes grow into hubs.
fn gen_scale_free(node_count: u64) -> Graph {
    let edges_per_node = 5u64;
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(12345);

    // Endpoint list for O(1) preferential attachment sampling
    let mut endpoints: Vec<u64> = Vec::with_capacity((node_count * edges_per_node * 2) as usize);

    let seed = 5u64;
    for i in 0..seed {
        graph.add_node(i, ["Person"]);
    }
    for i in 0..seed {
        for j in (i + 1)..seed {
            relate(&mut graph, &mut rng, i, j);
            endpoints.push(i);
            endpoints.push(j);
        }
    }

    for new_node in seed..node_count {
        graph.add_node(new_node, ["Person"]);

        for _ in 0..edges_per_node.min(new_node) {
            let target = endpoints[rng.next(endpoints.len() as u64) as usize];
            if target != new_node {
                relate(&mut graph, &mut rng, new_node, target);
                endpoints.push(new_node);
                endpoints.push(target);
            }
        }
    }

    graph
}

/// Erdos-Renyi: ~10 uniformly random relationships per node. Degrees
/// cluster around 20, so thresholds above ~40 find almost nothing.
fn gen_random(node_count: u64) -> Graph {
    let target_edges = node_count * 10;
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(54321);

    for i in 0..node_count {
        graph.add_node(i, ["Person"]);
    }

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        if from != to {
            relate(&mut graph, &mut rng, from, to);
        }
    }

    graph
}

/// Hub chain: 0 -> h1 -> h2 -> ... where hub k has a fan-out of 20 * k
/// leaves. Each continueBelow step lets the traversal past a few more hubs.
fn gen_hub_chain(node_count: u64) -> Graph {
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(99999);

    graph.add_node(0, ["Root"]);
    let mut previous = 0u64;
    let mut next_id = 1u64;
    let mut fan_out = 20u64;

    while next_id + fan_out < node_count {
        let hub = next_id;
        next_id += 1;
        graph.add_node(hub, ["Hub"]);
        relate(&mut graph, &mut rng, previous, hub);

        for _ in 0..fan_out {
            graph.add_node(next_id, ["Leaf"]);
            relate(&mut graph, &mut rng, hub, next_id);
            next_id += 1;
        }
        previous = hub;
        fan_out += 20;
    }

    graph
}
