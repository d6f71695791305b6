// Kernighan-Lin bisection.
//
// # Reference
//
// Kernighan, B. W., and Lin, S. "An efficient heuristic procedure for partitioning graphs."
// The Bell System Technical Journal 49.2 (1970): 291-307.

use tracing::{debug, info};
use crate::algorithms::refinement::{Bisection, CostAccumulation, Side};
use crate::algorithms::{check_part_ids_len, Error};
use crate::graph::Graph;
use crate::Partition;

/// Outcome of a Kernighan-Lin run.
#[derive(Debug, Clone, PartialEq)]
pub struct KlOutcome {
    /// Weight of the edges between the two groups.
    pub cut_cost: f64,

    /// Vertices labelled A, in increasing order.
    pub group_a: Vec<usize>,

    /// Vertices labelled B, in increasing order.
    pub group_b: Vec<usize>,

    /// Sum of the gains of every committed swap.
    pub total_gain: f64,

    /// Number of committed swaps.
    pub iterations: usize,

    /// Cut after the initial bisection and after every committed swap.
    pub cut_history: Vec<f64>,

    /// Whether no swap with a positive gain was left when the run stopped. `false` means
    /// the iteration budget cut the refinement short.
    pub converged: bool,
}

pub(crate) struct RefinementStats {
    pub(crate) total_gain: f64,
    pub(crate) iterations: usize,
    pub(crate) cut_history: Vec<f64>,
    pub(crate) converged: bool,
}

/// Kernighan-Lin Bisector
///
/// Starts from the bisection that labels the first half of the vertex identifiers A
/// and the second half B, then repeatedly swaps the cross pair with the largest gain.
/// The loop stops as soon as no pair has a positive gain, or after `len / 2` swaps.
///
/// # Example
///
/// ```rust
/// use graph_bisect::graph::Graph;
/// use graph_bisect::algorithms::KlBisector;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut graph = Graph::new();
///     graph.add_edge(0, 2, 4.0)?;
///     graph.add_edge(1, 3, 4.0)?;
///     graph.add_edge(0, 1, 1.0)?;
///
///     let outcome = KlBisector::default().bisect(&graph);
///
///     assert_eq!(outcome.cut_cost, 1.0);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KlBisector {
    /// Whether the cost accumulators are reset before every iteration.
    pub cost_accumulation: CostAccumulation,

    /// Upper bound on the number of swaps, `len / 2` when `None`.
    pub max_iterations: Option<usize>,
}

impl KlBisector {
    pub fn bisect(&self, graph: &Graph) -> KlOutcome {
        let mut bisection = Bisection::halved(graph.len());
        let stats = self.refine(graph, &mut bisection);

        let outcome = KlOutcome {
            cut_cost: bisection.cut_cost(graph),
            group_a: bisection.members(Side::A),
            group_b: bisection.members(Side::B),
            total_gain: stats.total_gain,
            iterations: stats.iterations,
            cut_history: stats.cut_history,
            converged: stats.converged,
        };

        info!("Cut size: {}", outcome.cut_cost);
        info!("Group A vertices: {:?}", outcome.group_a);
        info!("Group B vertices: {:?}", outcome.group_b);
        outcome
    }

    /// Improve `bisection` in place with best-gain swaps.
    pub(crate) fn refine(&self, graph: &Graph, bisection: &mut Bisection) -> RefinementStats {
        let max_iterations = self.max_iterations.unwrap_or(graph.len() / 2);
        let mut total_gain = 0.0;
        let mut iterations = 0;
        let mut cut_history = vec![bisection.cut_cost(graph)];
        let mut converged = false;

        while iterations < max_iterations {
            bisection.refresh_costs(graph, self.cost_accumulation);

            let (a, b, max_gain) = match bisection.best_swap(graph) {
                Some(best) if best.2 > 0.0 => best,
                _ => {
                    converged = true;
                    break;
                }
            };

            debug!(a, b, max_gain, "best swap");
            bisection.swap(graph, a, b);
            total_gain += max_gain;
            iterations += 1;
            cut_history.push(bisection.cut_cost(graph));
        }

        if !converged {
            bisection.refresh_costs(graph, self.cost_accumulation);
            converged = !matches!(bisection.best_swap(graph), Some((_, _, gain)) if gain > 0.0);
        }

        RefinementStats { total_gain, iterations, cut_history, converged }
    }
}

impl<'a> Partition<&'a Graph> for KlBisector {
    type Metadata = KlOutcome;
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

#[cfg(test)]
mod tests {
    use approx::assert_ulps_eq;
    use itertools::assert_equal;
    use crate::graph::tests::{six_vertex_graph, two_triangles};
    use super::*;

    #[test]
    fn test_two_triangles_are_separated() {
        // Arrange
        let mut graph = Graph::new();
        // Interleave the triangles so that the initial bisection is bad.
        for &(vertex1, vertex2) in &[(0, 3), (3, 4), (4, 0), (1, 2), (2, 5), (5, 1)] {
            graph.add_edge(vertex1, vertex2, 10.0).unwrap();
        }
        graph.add_edge(0, 1, 1.0).unwrap();

        // Act
        let outcome = KlBisector::default().bisect(&graph);

        // Assert
        assert_ulps_eq!(outcome.cut_cost, 1.0);
        assert_eq!(outcome.group_a.len(), 3);
        assert_eq!(outcome.group_b.len(), 3);
        assert_ulps_eq!(outcome.cut_history[0] - outcome.cut_cost, outcome.total_gain);
    }

    #[test]
    fn test_already_optimal_bisection_is_kept() {
        // Arrange
        let graph = two_triangles();

        // Act
        let outcome = KlBisector::default().bisect(&graph);

        // Assert
        assert_equal(outcome.group_a, vec![0, 1, 2]);
        assert_equal(outcome.group_b, vec![3, 4, 5]);
        assert_eq!(outcome.iterations, 0);
        assert_ulps_eq!(outcome.cut_cost, 1.0);
    }

    #[test]
    fn test_cut_is_non_increasing() {
        // Arrange
        let graph = six_vertex_graph();

        // Act
        let outcome = KlBisector::default().bisect(&graph);

        // Assert
        assert!(outcome.iterations <= graph.len() / 2);
        assert_eq!(outcome.cut_history.len(), outcome.iterations + 1);
        for window in outcome.cut_history.windows(2) {
            assert!(window[1] <= window[0]);
        }
        assert_ulps_eq!(*outcome.cut_history.last().unwrap(), outcome.cut_cost);
    }

    #[test]
    fn test_every_vertex_is_in_exactly_one_group() {
        // Arrange
        let mut graph = six_vertex_graph();
        graph.add_edge(6, 2, 3.0).unwrap();

        // Act
        let outcome = KlBisector::default().bisect(&graph);

        // Assert
        let mut vertices: Vec<usize> = outcome.group_a.iter().chain(&outcome.group_b).cloned().collect();
        vertices.sort_unstable();
        assert_equal(vertices, 0..graph.len());
        assert_eq!(outcome.group_a.len(), 4);
    }

    #[test]
    fn test_runs_are_deterministic() {
        // Arrange
        let graph = six_vertex_graph();

        // Act
        let first = KlBisector::default().bisect(&graph);
        let second = KlBisector::default().bisect(&graph);

        // Assert
        assert_eq!(first, second);
    }

    #[test]
    fn test_trivial_graphs() {
        // Arrange
        let empty = Graph::new();
        let single = Graph::with_vertices(1);

        // Act
        let empty_outcome = KlBisector::default().bisect(&empty);
        let single_outcome = KlBisector::default().bisect(&single);

        // Assert
        assert!(empty_outcome.group_a.is_empty() && empty_outcome.group_b.is_empty());
        assert_equal(single_outcome.group_a, vec![0]);
        assert!(single_outcome.group_b.is_empty());
        assert_ulps_eq!(single_outcome.cut_cost, 0.0);
    }

    #[test]
    fn test_cumulative_costs_respect_iteration_budget() {
        // Arrange
        let graph = six_vertex_graph();

        // Act
        let outcome = KlBisector {
            cost_accumulation: CostAccumulation::Cumulative,
            max_iterations: None,
        }.bisect(&graph);

        // Assert
        assert!(outcome.iterations <= 3);
        assert_eq!(outcome.group_a.len() + outcome.group_b.len(), 6);
        assert_eq!(outcome.group_a.len(), 3);
    }

    fn interleaved_cliques() -> Graph {
        // Cliques {0, 1, 4, 5} and {2, 3, 6, 7}, each split by the halved start.
        let mut graph = Graph::new();
        for clique in [[0, 1, 4, 5], [2, 3, 6, 7]] {
            for (i, &vertex1) in clique.iter().enumerate() {
                for &vertex2 in &clique[i + 1..] {
                    graph.add_edge(vertex1, vertex2, 10.0).unwrap();
                }
            }
        }
        graph
    }

    #[test]
    fn test_budget_exhausted_is_not_converged() {
        // Arrange
        let graph = interleaved_cliques();
        let limited = KlBisector { max_iterations: Some(1), ..Default::default() };

        // Act
        let limited_outcome = limited.bisect(&graph);
        let full_outcome = KlBisector::default().bisect(&graph);

        // Assert
        assert_eq!(limited_outcome.iterations, 1);
        assert!(!limited_outcome.converged);
        assert!(limited_outcome.cut_cost > 0.0);
        assert!(full_outcome.converged);
        assert_ulps_eq!(full_outcome.cut_cost, 0.0);
        assert!(full_outcome.cut_cost.is_sign_positive());
    }

    #[test]
    fn test_partition_trait_fills_part_ids() {
        // Arrange
        let graph = two_triangles();
        let mut part_ids = vec![7; graph.len()];
        let mut too_short = vec![0; 2];

        // Act
        let outcome = KlBisector::default().partition(&mut part_ids, &graph).unwrap();
        let mismatch = KlBisector::default().partition(&mut too_short, &graph);

        // Assert
        assert_equal(part_ids.iter().cloned(), vec![0, 0, 0, 1, 1, 1]);
        assert_ulps_eq!(graph.edge_cut(&part_ids), outcome.cut_cost);
        assert!(matches!(mismatch, Err(Error::InputLenMismatch { expected: 6, actual: 2 })));
    }
}
