// Fiduccia-Mattheyses bisection.
//
// # Reference
//
// Fiduccia, C. M., and Mattheyses, R. M. "A linear-time heuristic for improving network
// partitions." 19th Design Automation Conference (1982): 175-181.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use crate::algorithms::refinement::{Bisection, CostAccumulation, Side};
use crate::algorithms::{check_part_ids_len, Error};
use crate::graph::Graph;
use crate::Partition;

/// Outcome of a Fiduccia-Mattheyses run.
#[derive(Debug, Clone, PartialEq)]
pub struct FmOutcome {
    /// Weight of the edges between the two groups.
    pub cut_cost: f64,

    /// Vertices labelled A, in increasing order.
    pub group_a: Vec<usize>,

    /// Vertices labelled B, in increasing order.
    pub group_b: Vec<usize>,

    /// Sum of the gains of every committed move.
    pub total_gain: f64,

    /// Number of committed moves.
    pub iterations: usize,

    /// Cut after the initial bisection and after every committed move.
    pub cut_history: Vec<f64>,

    /// Whether no admissible move was left when the run stopped. `false` means the move
    /// budget cut the refinement short.
    pub converged: bool,
}

/// Fiduccia-Mattheyses Bisector
///
/// Uses the same D-values as the Kernighan-Lin bisector, but commits single vertex
/// moves instead of swaps. Each iteration takes the best-gain vertex of side A and the
/// best-gain vertex of side B and flips a coin to decide which of the pair moves
/// first. The move is committed only if it reduces the cut and keeps the destination
/// side within the balance bound; otherwise the other vertex of the pair is tried.
/// The run stops when neither vertex can move, or after `len / 2` moves.
#[derive(Debug, Clone, Copy)]
pub struct FmBisector {
    /// Seed of the coin flips, entropy when `None`.
    pub seed: Option<u64>,

    /// A numerical factor ranging between 0.0 and 1.0. After a move, the larger side
    /// may hold at most (1 + balance factor) * len / 2 vertices, rounded up, and never
    /// less than one vertex above an even split.
    pub balance_factor: f64,

    /// Whether the cost accumulators are reset before every iteration.
    pub cost_accumulation: CostAccumulation,

    /// Upper bound on the number of moves, `len / 2` when `None`.
    pub max_iterations: Option<usize>,
}

impl Default for FmBisector {
    fn default() -> Self {
        FmBisector {
            seed: None,
            balance_factor: 0.1,
            cost_accumulation: CostAccumulation::ResetEachPass,
            max_iterations: None,
        }
    }
}

impl FmBisector {
    pub fn bisect(&self, graph: &Graph) -> FmOutcome {
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let num_of_vertices = graph.len();
        let max_iterations = self.max_iterations.unwrap_or(num_of_vertices / 2);
        let max_side_size = max_side_size(num_of_vertices, self.balance_factor);

        let mut bisection = Bisection::halved(num_of_vertices);
        let mut side_sizes = [(num_of_vertices + 1) / 2, num_of_vertices / 2];
        let mut total_gain = 0.0;
        let mut iterations = 0;
        let mut cut_history = vec![bisection.cut_cost(graph)];
        let mut converged = false;

        while iterations < max_iterations {
            bisection.refresh_costs(graph, self.cost_accumulation);

            let best_a = bisection.best_move(Side::A);
            let best_b = bisection.best_move(Side::B);

            // The coin decides which side commits first.
            let candidates = if rng.gen_bool(0.5) { [best_a, best_b] } else { [best_b, best_a] };
            let chosen = candidates
                .into_iter()
                .flatten()
                .find(|&candidate| admissible(&bisection, &side_sizes, max_side_size, candidate));

            let (vertex, gain) = match chosen {
                Some(best) => best,
                None => {
                    converged = true;
                    break;
                }
            };

            let source = bisection.sides[vertex];
            debug!(vertex, gain, "best move");
            bisection.move_vertex(graph, vertex);
            side_sizes[source.index()] -= 1;
            side_sizes[source.opposite().index()] += 1;

            total_gain += gain;
            iterations += 1;
            cut_history.push(bisection.cut_cost(graph));
        }

        if !converged {
            bisection.refresh_costs(graph, self.cost_accumulation);
            converged = [Side::A, Side::B]
                .into_iter()
                .filter_map(|side| bisection.best_move(side))
                .all(|candidate| !admissible(&bisection, &side_sizes, max_side_size, candidate));
        }

        let outcome = FmOutcome {
            cut_cost: bisection.cut_cost(graph),
            group_a: bisection.members(Side::A),
            group_b: bisection.members(Side::B),
            total_gain,
            iterations,
            cut_history,
            converged,
        };

        info!("Cut size: {}", outcome.cut_cost);
        info!("Group A vertices: {:?}", outcome.group_a);
        info!("Group B vertices: {:?}", outcome.group_b);
        outcome
    }
}

// A move must reduce the cut and leave room on the destination side.
fn admissible(bisection: &Bisection, side_sizes: &[usize; 2], max_side_size: usize, (vertex, gain): (usize, f64)) -> bool {
    let destination = bisection.sides[vertex].opposite();
    gain > 0.0 && side_sizes[destination.index()] < max_side_size
}

// Largest number of vertices a side may hold.
fn max_side_size(num_of_vertices: usize, balance_factor: f64) -> usize {
    let relaxed = ((1.0 + balance_factor.max(0.0)) * num_of_vertices as f64 / 2.0).ceil() as usize;
    relaxed.max((num_of_vertices + 1) / 2 + 1)
}

impl<'a> Partition<&'a Graph> for FmBisector {
    type Metadata = FmOutcome;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        graph: &'a Graph,
    ) -> Result<Self::Metadata, Self::Error> {
        check_part_ids_len(part_ids, graph.len())?;

        let outcome = self.bisect(graph);
        for &vertex in &outcome.group_a {
            part_ids[vertex] = Side::A.index();
        }
        for &vertex in &outcome.group_b {
            part_ids[vertex] = Side::B.index();
        }
        Ok(outcome)
    }
}
