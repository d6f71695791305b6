use std::path::PathBuf;
use std::time::Instant;
use clap::{Parser, ValueEnum};
use graph_bisect::algorithms::{
    CostAccumulation, FmBisector, GreedyColorer, KMedoids, KlBisector, LevelSetBfs, RecursiveBisector,
    SccKlBisector, Side, SpectralBisector,
};
use graph_bisect::graph::Graph;
use graph_bisect::imbalance::unit_imbalance;
use graph_bisect::io::{read_matrix_market_as_graph, write_partition_data_to_file};
use graph_bisect::Partition;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// Level-set breadth-first search from `--start`
    Bfs,
    /// Kernighan-Lin swap refinement
    Kl,
    /// Fiduccia-Mattheyses move refinement
    Fm,
    /// Sign split of the Fiedler vector
    Spectral,
    /// Kernighan-Lin on every connected component
    SccKl,
    /// Recursive Kernighan-Lin bisection
    Recursive,
    /// Greedy vertex coloring
    Coloring,
    /// K-medoids clustering on shortest path distances
    KMedoids,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the .mtx file
    mtx_filepath: PathBuf,

    /// Filename where the vertex labels are stored
    output_file: PathBuf,

    /// Algorithm to run
    #[arg(short, long, value_enum, default_value_t = Algorithm::Kl)]
    algorithm: Algorithm,

    /// BFS start vertex
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// BFS level threshold
    #[arg(long, default_value_t = 1)]
    threshold: usize,

    /// Seed of the randomized algorithms (FM, k-medoids)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Keep the KL/FM cost accumulators across iterations
    #[arg(long)]
    cumulative_costs: bool,

    /// FM balance factor
    #[arg(short, long, default_value_t = 0.1)]
    balance_factor: f64,

    /// Number of k-medoids clusters
    #[arg(short = 'k', long, default_value_t = 2)]
    clusters: usize,

    /// K-medoids convergence threshold
    #[arg(long, default_value_t = 1e-3)]
    convergence_threshold: f64,

    /// K-medoids iteration budget
    #[arg(long, default_value_t = 500)]
    max_iterations: usize,

    /// Recursive bisection depth
    #[arg(long, default_value_t = 3)]
    max_levels: usize,

    /// Recursive bisection size floor
    #[arg(long, default_value_t = 1)]
    min_size: usize,

    /// Recursive bisection weight balance tolerance
    #[arg(long, default_value_t = 0.02)]
    weight_threshold: f64,
}

impl Args {
    fn kl(&self) -> KlBisector {
        let cost_accumulation = if self.cumulative_costs {
            CostAccumulation::Cumulative
        } else {
            CostAccumulation::ResetEachPass
        };
        KlBisector { cost_accumulation, ..Default::default() }
    }
}

// Labels of every vertex, and part ids when the result is a partition of the graph.
fn run(args: &Args, graph: &Graph) -> Result<(Vec<String>, Option<Vec<usize>>), Box<dyn std::error::Error>> {
    let mut part_ids = vec![0; graph.len()];

    let result: (Vec<String>, Option<Vec<usize>>) = match args.algorithm {
        Algorithm::Bfs => {
            let level_sets = LevelSetBfs { threshold: args.threshold }.partition(graph, args.start)?;
            let labels = graph
                .vertices()
                .map(|vertex| {
                    if level_sets.group_1.contains(&vertex) {
                        "group 1".to_string()
                    } else if level_sets.group_2.contains(&vertex) {
                        "group 2".to_string()
                    } else {
                        "unreached".to_string()
                    }
                })
                .collect();
            (labels, None)
        }
        Algorithm::Kl => {
            args.kl().partition(&mut part_ids, graph)?;
            (side_labels(&part_ids), Some(part_ids))
        }
        Algorithm::Fm => {
            let mut fm = FmBisector {
                seed: args.seed,
                balance_factor: args.balance_factor,
                cost_accumulation: args.kl().cost_accumulation,
                ..Default::default()
            };
            fm.partition(&mut part_ids, graph)?;
            (side_labels(&part_ids), Some(part_ids))
        }
        Algorithm::Spectral => {
            SpectralBisector.partition(&mut part_ids, graph)?;
            (side_labels(&part_ids), Some(part_ids))
        }
        Algorithm::SccKl => {
            let outcome = SccKlBisector { kl: args.kl() }.bisect(graph);
            let mut labels = vec![String::new(); graph.len()];
            for (index, bisection) in outcome.components.iter().enumerate() {
                // Boundary vertices belong to another component and keep that label.
                for (side, group) in [("A", &bisection.group_a), ("B", &bisection.group_b)] {
                    for &vertex in group {
                        if bisection.component.binary_search(&vertex).is_ok() {
                            labels[vertex] = format!("component {} {}", index, side);
                        }
                    }
                }
            }
            (labels, None)
        }
        Algorithm::Recursive => {
            let mut recursive = RecursiveBisector {
                max_levels: args.max_levels,
                min_size: args.min_size,
                weight_threshold: args.weight_threshold,
                kl: args.kl(),
            };
            recursive.partition(&mut part_ids, graph)?;
            (side_labels(&part_ids), Some(part_ids))
        }
        Algorithm::Coloring => {
            let coloring = GreedyColorer.color(graph);
            info!("Number of colors {}", coloring.num_colors());
            let labels = coloring.colors.iter().map(|color| format!("color {}", color)).collect();
            (labels, None)
        }
        Algorithm::KMedoids => {
            let mut k_medoids = KMedoids {
                k: args.clusters,
                threshold: args.convergence_threshold,
                max_iterations: args.max_iterations,
                seed: args.seed,
            };
            let outcome = k_medoids.partition(&mut part_ids, graph)?;
            info!("Converged {} after {} iterations", outcome.converged, outcome.iterations);
            let labels = part_ids.iter().map(|cluster| format!("cluster {}", cluster)).collect();
            (labels, None)
        }
    };

    Ok(result)
}

fn side_labels(part_ids: &[usize]) -> Vec<String> {
    part_ids
        .iter()
        .map(|&part| (if part == Side::A.index() { Side::A } else { Side::B }).to_string())
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let graph = read_matrix_market_as_graph(&args.mtx_filepath)?;
    info!("Loaded {} vertices with total weight {}", graph.len(), graph.total_weight());

    let start = Instant::now();
    let (labels, part_ids) = run(&args, &graph)?;
    let elapsed_time = start.elapsed();

    write_partition_data_to_file(&labels, &args.output_file)?;
    if let Some(part_ids) = part_ids {
        info!("Edge cut {:?}", graph.edge_cut(&part_ids));
        info!("Imbalance {:?}", unit_imbalance(2, &part_ids));
    }
    info!("Execution time {:?}", elapsed_time);
    Ok(())
}
