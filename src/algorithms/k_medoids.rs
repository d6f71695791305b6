use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use crate::algorithms::{check_part_ids_len, Error};
use crate::graph::Graph;
use crate::Partition;

/// Outcome of a k-medoids clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct KMedoidsOutcome {
    /// Medoid of every cluster.
    pub medoids: Vec<usize>,

    /// Members of every cluster, in increasing order.
    pub clusters: Vec<Vec<usize>>,

    /// Sum of the distances from each medoid to the members of its cluster.
    pub total_distances: Vec<f64>,

    /// Whether the summed relative change fell below the threshold.
    pub converged: bool,

    /// Number of assignment and update rounds that ran.
    pub iterations: usize,
}

impl KMedoidsOutcome {
    /// Cluster index of every vertex.
    pub fn labels(&self) -> Vec<usize> {
        let num_of_vertices = self.clusters.iter().map(Vec::len).sum();
        let mut labels = vec![0; num_of_vertices];
        for (cluster, members) in self.clusters.iter().enumerate() {
            for &vertex in members {
                labels[vertex] = cluster;
            }
        }
        labels
    }
}

/// K-Medoids Clusterer
///
/// Groups the vertices around `k` medoid vertices using shortest path distances.
/// Medoids start as `k` distinct vertices sampled uniformly. Every round assigns each
/// vertex to its nearest medoid (ties go to the lowest cluster index, and a medoid
/// always stays in its own cluster), then moves each medoid to the member with the
/// smallest total distance to its cluster. Clusters are never empty and medoids stay
/// distinct, even across zero-weight edges.
///
/// The relative change of a cluster is `|new total - previous total| / previous total`.
/// The clustering has converged once the changes summed over all clusters drop below
/// `threshold`. Running out of rounds is not an error: the outcome is returned with
/// `converged` set to `false`.
///
/// # Example
///
/// ```rust
/// use graph_bisect::algorithms::KMedoids;
/// use graph_bisect::graph::Graph;
///
/// let mut graph = Graph::new();
/// graph.add_edge(0, 1, 1.0).unwrap();
/// graph.add_edge(1, 2, 1.0).unwrap();
///
/// let outcome = KMedoids { k: 1, seed: Some(5), ..Default::default() }
///     .cluster(&graph)
///     .unwrap();
///
/// assert_eq!(outcome.medoids, vec![1]);
/// assert!(outcome.converged);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KMedoids {
    /// Number of clusters, clamped to the number of vertices.
    pub k: usize,

    /// Summed relative change under which the clustering has converged.
    pub threshold: f64,

    pub max_iterations: usize,

    /// Seed of the initial sampling, entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for KMedoids {
    fn default() -> Self {
        KMedoids {
            k: 2,
            threshold: 1e-3,
            max_iterations: 500,
            seed: None,
        }
    }
}

impl KMedoids {
    pub fn cluster(&self, graph: &Graph) -> Result<KMedoidsOutcome, Error> {
        if graph.is_empty() {
            return Err(Error::EmptyGraph);
        }
        if self.k == 0 {
            return Err(Error::DegenerateInput { reason: "k-medoids needs at least one cluster" });
        }

        let num_of_vertices = graph.len();
        let k = if self.k > num_of_vertices {
            warn!(k = self.k, num_of_vertices, "more clusters than vertices, using one cluster per vertex");
            num_of_vertices
        } else {
            self.k
        };

        let distances = graph
            .vertices()
            .map(|vertex| graph.distances_from(vertex))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut medoids = rand::seq::index::sample(&mut rng, num_of_vertices, k).into_vec();
        debug!("Initial medoids: {:?}", medoids);

        let mut best_totals = vec![f64::INFINITY; k];
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;

            let clusters = assign(&distances, &medoids);
            let (new_medoids, new_totals): (Vec<usize>, Vec<f64>) = clusters
                .iter()
                .zip(&medoids)
                .map(|(members, &medoid)| best_medoid(&distances, members, medoid))
                .unzip();

            let change: f64 = best_totals
                .iter()
                .zip(&new_totals)
                .map(|(&old, &new)| relative_change(old, new))
                .sum();
            debug!(iteration = iterations, change, "medoids {:?}", new_medoids);

            medoids = new_medoids;
            best_totals = new_totals;

            if change < self.threshold {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(iterations, "k-medoids did not converge");
        }

        let clusters = assign(&distances, &medoids);
        let total_distances = clusters
            .iter()
            .zip(&medoids)
            .map(|(members, &medoid)| total_distance(&distances, medoid, members))
            .collect();

        let outcome = KMedoidsOutcome { medoids, clusters, total_distances, converged, iterations };
        for (cluster, members) in outcome.clusters.iter().enumerate() {
            info!("Cluster {} (medoid {}): {:?}", cluster, outcome.medoids[cluster], members);
        }
        Ok(outcome)
    }
}

// Members of every medoid's cluster. A medoid stays in its own cluster, any other
// vertex joins the first nearest medoid.
fn assign(distances: &[Vec<f64>], medoids: &[usize]) -> Vec<Vec<usize>> {
    let mut clusters = vec![Vec::new(); medoids.len()];
    for vertex in 0..distances.len() {
        if let Some(own) = medoids.iter().position(|&medoid| medoid == vertex) {
            clusters[own].push(vertex);
            continue;
        }

        let mut nearest = 0;
        for (cluster, &medoid) in medoids.iter().enumerate().skip(1) {
            if distances[medoid][vertex] < distances[medoids[nearest]][vertex] {
                nearest = cluster;
            }
        }
        clusters[nearest].push(vertex);
    }
    clusters
}

fn total_distance(distances: &[Vec<f64>], medoid: usize, members: &[usize]) -> f64 {
    members.iter().map(|&member| distances[medoid][member]).sum()
}

// Member with the smallest total distance to the cluster, the first one on ties.
fn best_medoid(distances: &[Vec<f64>], members: &[usize], medoid: usize) -> (usize, f64) {
    let mut best = (medoid, 0.0);
    for (position, &candidate) in members.iter().enumerate() {
        let total = total_distance(distances, candidate, members);
        if position == 0 || total < best.1 {
            best = (candidate, total);
        }
    }
    best
}

fn relative_change(old: f64, new: f64) -> f64 {
    if new == old {
        0.0
    } else if old.is_infinite() || old == 0.0 {
        f64::INFINITY
    } else {
        (new - old).abs() / old
    }
}

impl<'a> Partition<&'a Graph> for KMedoids {
    type Metadata = KMedoidsOutcome;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        graph: &'a Graph,
    ) -> Result<Self::Metadata, Self::Error> {
        check_part_ids_len(part_ids, graph.len())?;

        let outcome = self.cluster(graph)?;
        part_ids.copy_from_slice(&outcome.labels());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_ulps_eq;
    use itertools::assert_equal;
    use crate::graph::tests::{six_vertex_graph, two_triangles};
    use super::*;

    fn seeded(k: usize, seed: u64) -> KMedoids {
        KMedoids { k, seed: Some(seed), ..Default::default() }
    }

    #[test]
    fn test_relative_change() {
        // Arrange and Act and Assert
        assert_ulps_eq!(relative_change(10.0, 8.0), 0.2);
        assert_ulps_eq!(relative_change(f64::INFINITY, f64::INFINITY), 0.0);
        assert_ulps_eq!(relative_change(0.0, 0.0), 0.0);
        assert!(relative_change(f64::INFINITY, 14.0).is_infinite());
        assert!(relative_change(0.0, 3.0).is_infinite());
    }

    #[test]
    fn test_assign_breaks_ties_by_lowest_cluster() {
        // Arrange
        let distances = vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ];

        // Act
        let clusters = assign(&distances, &[2, 0]);

        // Assert
        // Vertex 1 is at distance 1 from both medoids.
        assert_equal(clusters, vec![vec![1, 2], vec![0]]);
    }

    #[test]
    fn test_single_cluster_finds_one_median() {
        // Arrange
        let graph = six_vertex_graph();

        for seed in 0..6 {
            // Act
            let outcome = seeded(1, seed).cluster(&graph).unwrap();

            // Assert
            // Totals from each vertex: 16, 28, 16, 26, 20 and 14.
            assert_equal(outcome.medoids.clone(), vec![5]);
            assert_equal(outcome.clusters[0].clone(), 0..6);
            assert_ulps_eq!(outcome.total_distances[0], 14.0);
            assert!(outcome.converged);
        }
    }

    #[test]
    fn test_one_cluster_per_vertex() {
        // Arrange
        let graph = six_vertex_graph();

        // Act
        let outcome = seeded(10, 3).cluster(&graph).unwrap();

        // Assert
        let mut medoids = outcome.medoids.clone();
        medoids.sort_unstable();
        assert_equal(medoids, 0..6);
        for (members, &medoid) in outcome.clusters.iter().zip(&outcome.medoids) {
            assert_equal(members.clone(), vec![medoid]);
        }
        assert!(outcome.total_distances.iter().all(|&total| total == 0.0));
    }

    #[test]
    fn test_zero_weight_edge_keeps_medoids_distinct() {
        // Arrange
        let mut graph = Graph::new();
        graph.add_edge(0, 1, 0.0).unwrap();
        graph.add_edge(1, 2, 3.0).unwrap();

        for seed in 0..50 {
            // Act
            let outcome = seeded(3, seed).cluster(&graph).unwrap();

            // Assert
            let mut medoids = outcome.medoids.clone();
            medoids.sort_unstable();
            assert_equal(medoids, 0..3);
            for (members, &medoid) in outcome.clusters.iter().zip(&outcome.medoids) {
                assert_equal(members.clone(), vec![medoid]);
            }
        }
    }

    #[test]
    fn test_medoid_stays_in_own_cluster() {
        // Arrange
        // Vertices 0 and 1 are at distance 0 from each other.
        let distances = vec![
            vec![0.0, 0.0, 3.0],
            vec![0.0, 0.0, 3.0],
            vec![3.0, 3.0, 0.0],
        ];

        // Act
        let clusters = assign(&distances, &[0, 1, 2]);

        // Assert
        assert_equal(clusters, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        // Arrange
        let graph = two_triangles();

        // Act
        let first = seeded(2, 9).cluster(&graph).unwrap();
        let second = seeded(2, 9).cluster(&graph).unwrap();

        // Assert
        assert_eq!(first, second);
        assert_eq!(first.clusters.iter().map(Vec::len).sum::<usize>(), graph.len());
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        // Arrange
        let graph = six_vertex_graph();
        let clusterer = KMedoids { max_iterations: 1, ..seeded(1, 0) };

        // Act
        let outcome = clusterer.cluster(&graph).unwrap();

        // Assert
        // The first round always changes from an infinite previous total.
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_equal(outcome.medoids, vec![5]);
    }

    #[test]
    fn test_degenerate_inputs() {
        // Arrange
        let graph = six_vertex_graph();

        // Act
        let no_cluster = seeded(0, 0).cluster(&graph);
        let empty = seeded(2, 0).cluster(&Graph::new());

        // Assert
        assert!(matches!(no_cluster, Err(Error::DegenerateInput { .. })));
        assert!(matches!(empty, Err(Error::EmptyGraph)));
    }

    #[test]
    fn test_partition_trait_fills_labels() {
        // Arrange
        let graph = six_vertex_graph();
        let mut part_ids = vec![7; graph.len()];

        // Act
        let outcome = seeded(2, 1).partition(&mut part_ids, &graph).unwrap();

        // Assert
        assert_equal(part_ids, outcome.labels());
        assert!(outcome.labels().iter().all(|&label| label < 2));
    }
}
