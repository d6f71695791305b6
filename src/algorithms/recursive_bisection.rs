use std::collections::BTreeMap;
use tracing::{debug, info};
use crate::algorithms::refinement::{Bisection, Side};
use crate::algorithms::{check_part_ids_len, Error, KlBisector};
use crate::graph::Graph;
use crate::Partition;

/// Outcome of a recursive bisection.
#[derive(Debug, Clone, PartialEq)]
pub struct RecursiveBisection {
    /// Final label of every vertex.
    pub labels: BTreeMap<usize, Side>,

    /// Vertices labelled A, in increasing order.
    pub group_a: Vec<usize>,

    /// Vertices labelled B, in increasing order.
    pub group_b: Vec<usize>,

    /// Weight of the edges between the two groups.
    pub cut_cost: f64,
}

/// Recursive Bisector
///
/// Bisects the graph with Kernighan-Lin swaps and recurses into both induced
/// subgraphs. A subgraph stops being split when it has at most `min_size` vertices or
/// `max_levels` bisections were already applied above it; its vertices are then
/// labelled A and B alternately, following the number of vertices labelled so far. A
/// subgraph also stops when its two halves carry nearly the same edge weight, i.e.
/// `|weight(half 1) - weight(half 2)| / weight(subgraph)` is below `weight_threshold`;
/// its first half is then labelled A and its second half B.
#[derive(Debug, Clone, Copy)]
pub struct RecursiveBisector {
    /// Number of bisection levels allowed below the whole graph.
    pub max_levels: usize,

    /// Subgraphs with at most this many vertices are not split.
    pub min_size: usize,

    /// Relative edge weight difference under which a split counts as balanced.
    pub weight_threshold: f64,

    /// Refinement used at every level.
    pub kl: KlBisector,
}

impl Default for RecursiveBisector {
    fn default() -> Self {
        RecursiveBisector {
            max_levels: 3,
            min_size: 1,
            weight_threshold: 0.02,
            kl: KlBisector::default(),
        }
    }
}

impl RecursiveBisector {
    pub fn bisect(&self, graph: &Graph) -> RecursiveBisection {
        let mut labels = BTreeMap::new();
        let local_to_global: Vec<usize> = graph.vertices().collect();
        self.partition_graph(graph, &local_to_global, &mut labels, self.max_levels);

        let (group_a, group_b): (Vec<usize>, Vec<usize>) =
            labels.keys().partition(|&&vertex| labels[&vertex] == Side::A);
        let part_ids: Vec<usize> = labels.values().map(|side| side.index()).collect();

        let outcome = RecursiveBisection {
            cut_cost: graph.edge_cut(&part_ids),
            labels,
            group_a,
            group_b,
        };

        info!("Group A vertices: {:?}", outcome.group_a);
        info!("Group B vertices: {:?}", outcome.group_b);
        outcome
    }

    fn partition_graph(
        &self,
        graph: &Graph,
        local_to_global: &[usize],
        labels: &mut BTreeMap<usize, Side>,
        max_levels: usize,
    ) {
        if graph.len() <= self.min_size || max_levels == 0 {
            for &vertex in local_to_global {
                let side = if labels.len() % 2 == 0 { Side::A } else { Side::B };
                labels.insert(vertex, side);
            }
            return;
        }

        let mut bisection = Bisection::halved(graph.len());
        self.kl.refine(graph, &mut bisection);

        let (subgraph1, local_to_global1) = split(graph, local_to_global, &bisection, Side::A);
        let (subgraph2, local_to_global2) = split(graph, local_to_global, &bisection, Side::B);

        let balance = weight_imbalance(subgraph1.total_weight(), subgraph2.total_weight(), graph.total_weight());
        debug!(level = max_levels, balance, "bisected {} vertices", graph.len());

        if balance < self.weight_threshold {
            for (local, &vertex) in local_to_global.iter().enumerate() {
                labels.insert(vertex, bisection.sides[local]);
            }
            return;
        }

        self.partition_graph(&subgraph1, &local_to_global1, labels, max_levels - 1);
        self.partition_graph(&subgraph2, &local_to_global2, labels, max_levels - 1);
    }
}

// Subgraph induced by one side, with its vertices mapped to identifiers of the whole graph.
fn split(graph: &Graph, local_to_global: &[usize], bisection: &Bisection, side: Side) -> (Graph, Vec<usize>) {
    let members = bisection.members(side);
    let (subgraph, _) = graph.induced_subgraph(&members);
    let global = members.iter().map(|&local| local_to_global[local]).collect();
    (subgraph, global)
}

// A graph without edges splits into two weightless halves, which counts as balanced.
fn weight_imbalance(weight1: f64, weight2: f64, total_weight: f64) -> f64 {
    if total_weight > 0.0 {
        (weight1 - weight2).abs() / total_weight
    } else {
        0.0
    }
}

impl<'a> Partition<&'a Graph> for RecursiveBisector {
    type Metadata = RecursiveBisection;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        graph: &'a Graph,
    ) -> Result<Self::Metadata, Self::Error> {
        check_part_ids_len(part_ids, graph.len())?;

        let outcome = self.bisect(graph);
        for (&vertex, side) in &outcome.labels {
            part_ids[vertex] = side.index();
        }
        Ok(outcome)
    }
}
