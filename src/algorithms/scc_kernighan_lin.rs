use rustc_hash::FxHashMap;
use tracing::info;
use crate::algorithms::KlBisector;
use crate::graph::Graph;

/// Kernighan-Lin bisection of one component, in identifiers of the whole graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentBisection {
    /// Vertices of the component, sorted.
    pub component: Vec<usize>,

    /// Vertices of the component subgraph labelled A.
    pub group_a: Vec<usize>,

    /// Vertices of the component subgraph labelled B.
    pub group_b: Vec<usize>,

    /// Cut of the bisection inside the component subgraph.
    pub cut_cost: f64,
}

/// Per component results of the SCC guided Kernighan-Lin bisector, in processing order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SccKlOutcome {
    pub components: Vec<ComponentBisection>,
}

impl SccKlOutcome {
    /// Group A of every component.
    pub fn partition_1(&self) -> Vec<Vec<usize>> {
        self.components.iter().map(|bisection| bisection.group_a.clone()).collect()
    }

    /// Group B of every component.
    pub fn partition_2(&self) -> Vec<Vec<usize>> {
        self.components.iter().map(|bisection| bisection.group_b.clone()).collect()
    }
}

/// SCC guided Kernighan-Lin Bisector
///
/// Splits the graph into its strongly connected components and bisects each of them
/// independently with the Kernighan-Lin bisector. Components are processed by
/// decreasing `|size - len / 2|` (ties by smallest vertex). Every component is turned
/// into a subgraph made of its vertices, the outside vertices reachable through a
/// boundary edge, and the edges between them.
///
/// The result holds one bisection per component; merging them into a single bisection
/// of the graph is left to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SccKlBisector {
    pub kl: KlBisector,
}

impl SccKlBisector {
    pub fn bisect(&self, graph: &Graph) -> SccKlOutcome {
        let half = graph.len() as f64 / 2.0;
        let mut components = graph.strongly_connected_components();
        // Components come sorted by smallest vertex, the stable sort keeps that for ties.
        components.sort_by(|c1, c2| {
            let weight1 = (c1.len() as f64 - half).abs();
            let weight2 = (c2.len() as f64 - half).abs();
            weight2.total_cmp(&weight1)
        });

        let mut outcome = SccKlOutcome::default();
        for component in components {
            let (subgraph, local_to_global) = component_subgraph(graph, &component);
            let kl_outcome = self.kl.bisect(&subgraph);

            let bisection = ComponentBisection {
                group_a: kl_outcome.group_a.iter().map(|&local| local_to_global[local]).collect(),
                group_b: kl_outcome.group_b.iter().map(|&local| local_to_global[local]).collect(),
                cut_cost: kl_outcome.cut_cost,
                component,
            };
            info!("Component {:?}: A {:?}, B {:?}", bisection.component, bisection.group_a, bisection.group_b);
            outcome.components.push(bisection);
        }

        outcome
    }
}

// Subgraph of the component vertices followed by their outside neighbors, with every
// edge that touches the component. Returns the map from subgraph to graph vertices.
fn component_subgraph(graph: &Graph, component: &[usize]) -> (Graph, Vec<usize>) {
    let mut local_to_global: Vec<usize> = component.to_vec();
    let mut global_to_local = FxHashMap::with_capacity_and_hasher(component.len(), Default::default());
    for (local, &vertex) in component.iter().enumerate() {
        global_to_local.insert(vertex, local);
    }

    let mut subgraph = Graph::with_vertices(component.len());
    for (local, &vertex) in component.iter().enumerate() {
        for (neighbor, edge_weight) in graph.neighbors(vertex) {
            let local_neighbor = *global_to_local.entry(neighbor).or_insert_with(|| {
                local_to_global.push(neighbor);
                local_to_global.len() - 1
            });
            subgraph.add_vertex(local_neighbor);
            subgraph.graph_csr.insert(local, local_neighbor, edge_weight);
            subgraph.graph_csr.insert(local_neighbor, local, edge_weight);
        }
    }

    (subgraph, local_to_global)
}

#[cfg(test)]
mod tests {
    use approx::assert_ulps_eq;
    use itertools::assert_equal;
    use crate::graph::tests::two_triangles;
    use super::*;

    #[test]
    fn test_component_subgraph_adds_boundary_vertices() {
        // Arrange
        let graph = two_triangles();

        // Act
        let (subgraph, local_to_global) = component_subgraph(&graph, &[0, 1, 2]);

        // Assert
        assert_equal(local_to_global, vec![0, 1, 2, 3]);
        assert_eq!(subgraph.len(), 4);
        assert_eq!(subgraph.edge_weight(2, 3), 1.0);
        assert_eq!(subgraph.edge_weight(3, 2), 1.0);
        assert_ulps_eq!(subgraph.total_weight(), 31.0);
    }

    #[test]
    fn test_components_are_bisected_independently() {
        // Arrange
        let mut graph = two_triangles();
        // A separate square 6-7-8-9 with heavy edges 6-7 and 8-9.
        graph.add_edge(6, 7, 5.0).unwrap();
        graph.add_edge(7, 9, 1.0).unwrap();
        graph.add_edge(9, 8, 5.0).unwrap();
        graph.add_edge(8, 6, 1.0).unwrap();
        graph.add_vertex(10);

        // Act
        let outcome = SccKlBisector::default().bisect(&graph);

        // Assert
        // len / 2 = 5.5, so the lone vertex (4.5) comes first, then the square (1.5),
        // then the triangles (0.5).
        let order: Vec<Vec<usize>> = outcome.components.iter().map(|c| c.component.clone()).collect();
        assert_equal(order, vec![vec![10], vec![6, 7, 8, 9], vec![0, 1, 2, 3, 4, 5]]);

        assert_equal(outcome.partition_1()[0].clone(), vec![10]);
        assert!(outcome.partition_2()[0].is_empty());

        let square = &outcome.components[1];
        assert_ulps_eq!(square.cut_cost, 2.0);
        assert_equal(square.group_a.clone(), vec![6, 7]);
        assert_equal(square.group_b.clone(), vec![8, 9]);

        let triangles = &outcome.components[2];
        assert_ulps_eq!(triangles.cut_cost, 1.0);
        assert_equal(triangles.group_a.clone(), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_graph_has_no_components() {
        // Arrange
        let graph = Graph::new();

        // Act
        let outcome = SccKlBisector::default().bisect(&graph);

        // Assert
        assert!(outcome.components.is_empty());
    }
}
