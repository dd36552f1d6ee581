use std::collections::VecDeque;
use std::time::Instant;

use anyhow::Context;
use chrono::NaiveTime;
use clap::{Parser, ValueEnum};
use shelter_graph_core::{Connection, MemoryStore, Shelter, ShelterEngine, ShelterId, Year};
use tracing_subscriber::EnvFilter;

const FIRST_YEAR: Year = 1950;
const LAST_YEAR: Year = 2024;

#[derive(Parser, Debug)]
#[command(name = "shelter-graph-bench", about = "Time graph rebuilds and reachability traversals")]
struct Args {
    /// Network shape to generate.
    #[arg(value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Number of shelters to generate.
    #[arg(default_value_t = 200_000)]
    node_count: u64,

    /// Skip the recursive traversal when the graph has more nodes than this.
    #[arg(long, default_value_t = 1_000_000)]
    recursive_limit: usize,

    /// Stack size for the benchmark thread, in MiB. The recursive traversal
    /// can descend once per node of the start's component.
    #[arg(long, default_value_t = 1024)]
    stack_mb: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Run all generators (default)
    All,
    /// Branching trail tree from a single valley floor
    Lsystem,
    /// Ring of valleys with occasional cross-ridge shortcuts
    Smallworld,
    /// Uniform random trails
    Random,
    /// Two dense massifs joined by a thin pass
    Barbell,
    /// Organic growth with long winding trails
    Dla,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let generators: Vec<(&'static str, fn(u64) -> Network)> = match args.mode {
        Mode::Lsystem => vec![("L-system trail tree", gen_lsystem)],
        Mode::Smallworld => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        Mode::Random => vec![("Erdos-Renyi random", gen_random)],
        Mode::Barbell => vec![("Barbell (massif-pass-massif)", gen_barbell)],
        Mode::Dla => vec![("DLA (organic branching)", gen_dla)],
        Mode::All => vec![
            ("L-system trail tree", gen_lsystem as fn(u64) -> Network),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
            ("Barbell (massif-pass-massif)", gen_barbell),
            ("DLA (organic branching)", gen_dla),
        ],
    };

    println!("shelter-graph-bench");
    println!("===================");
    println!();

    let node_count = args.node_count.max(16);
    let recursive_limit = args.recursive_limit;

    // The recursive traversal needs a deep stack on chain-like networks.
    let worker = std::thread::Builder::new()
        .name("bench".into())
        .stack_size(args.stack_mb * 1024 * 1024)
        .spawn(move || {
            for (name, generator) in generators {
                run_benchmark(name, generator, node_count, recursive_limit);
            }
        })
        .context("spawning benchmark thread")?;

    worker
        .join()
        .map_err(|_| anyhow::anyhow!("benchmark thread panicked"))
}

fn run_benchmark(name: &str, generator: fn(u64) -> Network, node_count: u64, recursive_limit: usize) {
    println!("--- {} ---", name);
    println!("Target: {} shelters", node_count);

    let t = Instant::now();
    let network = generator(node_count);
    println!(
        "Generated in {:.2}s: {} shelters, {} connections",
        t.elapsed().as_secs_f64(),
        network.shelters.len(),
        network.connections.len()
    );

    let mut engine = ShelterEngine::new(MemoryStore::new(network.shelters, network.connections));

    // Rebuild at several cutoffs; the graph grows with the year.
    println!();
    println!(
        "{:>8} {:>12} {:>12} {:>12} {:>10}",
        "year", "nodes", "edges", "components", "build"
    );
    println!("{:->8} {:->12} {:->12} {:->12} {:->10}", "", "", "", "", "");

    for year in [1960, 1980, 2000, LAST_YEAR] {
        let report = engine.build_graph(year);
        let t = Instant::now();
        let components = engine.num_connected_components();
        let cc_time = t.elapsed();
        println!(
            "{:>8} {:>12} {:>12} {:>12} {:>8.1}ms  (components {:.1}ms)",
            year,
            report.node_count,
            report.edge_count,
            components,
            report.load_time_ms,
            cc_time.as_secs_f64() * 1000.0
        );
    }

    // Traversals from shelter 0 on the full graph
    let Some(start) = engine.shelter(0).cloned() else {
        println!("shelter 0 missing from catalog");
        return;
    };
    if !engine.graph().contains_node(start.id) {
        println!("shelter 0 has no trails; skipping traversals");
        println!();
        return;
    }

    println!();
    println!("{:>10} {:>12} {:>10}", "method", "reachable", "time");
    println!("{:->10} {:->12} {:->10}", "", "", "");

    let mut sizes: Vec<usize> = Vec::new();

    let t = Instant::now();
    if let Ok(found) = engine.reachable_tree(&start) {
        report_traversal("tree", found.len(), t);
        sizes.push(found.len());
    }

    let t = Instant::now();
    if let Ok(found) = engine.reachable_iterative(&start) {
        report_traversal("iterative", found.len(), t);
        sizes.push(found.len());
    }

    if engine.graph().node_count() <= recursive_limit {
        let t = Instant::now();
        if let Ok(found) = engine.reachable_recursive(&start) {
            report_traversal("recursive", found.len(), t);
            sizes.push(found.len());
        }
    } else {
        println!("{:>10} {:>12}", "recursive", "skipped");
    }

    if sizes.windows(2).any(|w| w[0] != w[1]) {
        println!("WARNING: traversals disagree: {:?}", sizes);
    }
    println!();
}

fn report_traversal(method: &str, found: usize, started: Instant) {
    println!(
        "{:>10} {:>12} {:>8.1}ms",
        method,
        found,
        started.elapsed().as_secs_f64() * 1000.0
    );
}

// ---------------------------------------------------------------------------
// Generators: deterministic, single-threaded, O(n + connections)
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
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

const DIFFICULTIES: [&str; 3] = ["facile", "media", "difficile"];

/// Catalog plus year-tagged connections, ready for a `MemoryStore`.
struct Network {
    shelters: Vec<Shelter>,
    connections: Vec<Connection>,
    rng: FastRng,
}

impl Network {
    fn new(node_count: u64, seed: u64) -> Self {
        let mut rng = FastRng::new(seed);
        let shelters = (0..node_count)
            .map(|id| Shelter {
                id,
                name: format!("Rifugio {id}"),
                locality: format!("Valle {}", id % 97),
                altitude: 1200 + rng.next(2400) as i32,
                capacity: 10 + rng.next(90) as u32,
                is_open: rng.next(5) != 0,
            })
            .collect();
        Self {
            shelters,
            connections: Vec::new(),
            rng,
        }
    }

    fn connect(&mut self, a: ShelterId, b: ShelterId) {
        let year = FIRST_YEAR + self.rng.next((LAST_YEAR - FIRST_YEAR + 1) as u64) as Year;
        let minutes = 20 + self.rng.next(400) as u32;
        let duration = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or_default();
        self.connections.push(Connection {
            id: self.connections.len() as u64,
            shelter_id1: a,
            shelter_id2: b,
            distance: 0.5 + self.rng.next_f64() * 15.0,
            difficulty: DIFFICULTIES[self.rng.next(3) as usize].to_string(),
            duration,
            year,
        });
    }
}

/// L-system fractal tree: each shelter opens trails to three new ones.
fn gen_lsystem(node_count: u64) -> Network {
    let mut net = Network::new(node_count, 42);
    let branching = 3u64;

    let mut next_id: u64 = 1;
    let mut frontier: Vec<u64> = vec![0];

    while next_id < node_count && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching as usize);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= node_count {
                    break;
                }
                net.connect(parent, next_id);
                next_frontier.push(next_id);
                next_id += 1;
            }
        }
        frontier = next_frontier;
    }

    net
}

/// Small-world (Watts-Strogatz): ring lattice with rewired shortcuts.
fn gen_small_world(node_count: u64) -> Network {
    let k = 4u64;
    let p = 0.05f64;
    let mut net = Network::new(node_count, 67890);

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            if net.rng.next_f64() < p {
                let rewired = net.rng.next(node_count);
                net.connect(i, if rewired != i { rewired } else { neighbor });
            } else {
                net.connect(i, neighbor);
            }
        }
    }

    net
}

/// Erdos-Renyi: ~3 uniform random trails per shelter.
fn gen_random(node_count: u64) -> Network {
    let mut net = Network::new(node_count, 54321);
    for _ in 0..node_count * 3 {
        let from = net.rng.next(node_count);
        let to = net.rng.next(node_count);
        if from != to {
            net.connect(from, to);
        }
    }
    net
}

/// Barbell: two dense massifs joined by a chain of pass shelters.
fn gen_barbell(node_count: u64) -> Network {
    let bridge_len = 10u64;
    let massif = (node_count - bridge_len) / 2;
    let mut net = Network::new(massif * 2 + bridge_len, 99999);

    for offset in [0, massif + bridge_len] {
        for i in 0..massif {
            for _ in 0..5u64.min(massif - 1) {
                let target = net.rng.next(massif);
                if target != i {
                    net.connect(offset + i, offset + target);
                }
            }
        }
    }

    // pass: last of the first massif → bridge chain → first of the second
    let mut prev = massif - 1;
    for id in massif..=massif + bridge_len {
        net.connect(prev, id);
        prev = id;
    }

    net
}

/// DLA: each shelter hangs off a recent one, with occasional shortcuts.
fn gen_dla(node_count: u64) -> Network {
    let mut net = Network::new(node_count, 77777);

    let surface_max = 10_000usize;
    let mut surface: VecDeque<u64> = VecDeque::with_capacity(surface_max + 1);
    surface.push_back(0);

    for new_node in 1..node_count {
        let attach_to = surface[net.rng.next(surface.len() as u64) as usize];
        net.connect(new_node, attach_to);

        // 10% chance of a second trail (loops / shortcuts)
        if net.rng.next(10) == 0 && new_node > 1 {
            let other = net.rng.next(new_node);
            if other != attach_to {
                net.connect(new_node, other);
            }
        }

        surface.push_back(new_node);
        if surface.len() > surface_max {
            surface.pop_front();
        }
    }

    net
}
