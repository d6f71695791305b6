// This file has code from https://github.com/LIHPC-Computational-Geometry/coupe

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::iter::{Cloned, Zip};
use std::ops::Range;
use std::slice::Iter;
use nalgebra::DMatrix;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator};
use rayon::iter::ParallelIterator as _;
use ::sprs::CsMat;
use crate::algorithms::Error;

/// Struct that represents a weighted undirected graph.
///
/// Vertices are the dense identifiers `0..len()`. Every edge is stored twice, once in
/// each direction, so the adjacency matrix is always symmetric.
#[derive(Clone, Debug)]
pub struct Graph{
    /// The CsMat (from sprs) is used to store the graph as a sparse matrix in CSR format
    pub graph_csr: CsMat<f64>
}

impl Graph {

    /// Create a new graph
    pub fn new() -> Self {
        Self {
            graph_csr: CsMat::zero((0, 0))
        }
    }

    /// Create a graph with `num_of_vertices` isolated vertices.
    pub fn with_vertices(num_of_vertices: usize) -> Self {
        Self {
            graph_csr: CsMat::zero((num_of_vertices, num_of_vertices))
        }
    }

    /// The number of vertices in the graph.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.graph_csr.rows(), self.graph_csr.cols());
        self.graph_csr.rows()
    }

    /// Whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `vertex` is a vertex of the graph.
    pub fn contains(&self, vertex: usize) -> bool {
        vertex < self.len()
    }

    /// The vertex identifiers, in increasing order.
    pub fn vertices(&self) -> Range<usize> {
        0..self.len()
    }

    /// Add the vertex `vertex`. Identifiers are dense, so every missing identifier
    /// below `vertex` is added as well.
    pub fn add_vertex(&mut self, vertex: usize) {
        let len = self.len();
        if vertex < len {
            return;
        }

        let new_len = vertex + 1;
        let csr = std::mem::replace(&mut self.graph_csr, CsMat::zero((0, 0)));
        let (mut indptr, indices, data) = csr.into_raw_storage();
        let nnz = indptr.last().copied().unwrap_or(0);
        indptr.resize(new_len + 1, nnz);
        self.graph_csr = CsMat::new((new_len, new_len), indptr, indices, data);
    }

    /// Insert an undirected edge between two vertices, replacing any previous weight.
    pub fn add_edge(&mut self, vertex1: usize, vertex2: usize, edge_weight: f64) -> Result<(), Error> {
        if !(edge_weight >= 0.0) || !edge_weight.is_finite() {
            return Err(Error::NegativeValues);
        }
        if vertex1 == vertex2 {
            return Err(Error::SelfLoop { vertex: vertex1 });
        }

        self.add_vertex(vertex1.max(vertex2));
        self.graph_csr.insert(vertex1, vertex2, edge_weight);
        self.graph_csr.insert(vertex2, vertex1, edge_weight);
        Ok(())
    }

    /// An iterator over the neighbors of the given vertex.
    pub fn neighbors(&self, vertex: usize) -> Zip<Cloned<Iter<'_, usize>>, Cloned<Iter<'_, f64>>> {
        let (indices, data) = match self.graph_csr.outer_view(vertex) {
            Some(view) => view.into_raw_storage(),
            None => (&[][..], &[][..]),
        };
        indices.iter().cloned().zip(data.iter().cloned())
    }

    /// The number of neighbors of the given vertex.
    pub fn degree(&self, vertex: usize) -> usize {
        self.graph_csr.outer_view(vertex).map_or(0, |view| view.nnz())
    }

    /// Get edge weight for a pair of vertices.
    pub fn get_edge_weight(&self, vertex1: usize, vertex2: usize) -> Option<f64> {
        self.graph_csr.get(vertex1, vertex2).cloned()
    }

    /// Edge weight for a pair of vertices, zero when they are not adjacent.
    pub fn edge_weight(&self, vertex1: usize, vertex2: usize) -> f64 {
        self.get_edge_weight(vertex1, vertex2).unwrap_or(0.0)
    }

    /// The sum of all edge weights, each undirected edge counted once.
    pub fn total_weight(&self) -> f64 {
        self.graph_csr.data().iter().sum::<f64>() / 2.0
    }

    /// The graph Laplacian `L = D - W`.
    ///
    /// The diagonal holds the weighted degree of every vertex and each off-diagonal
    /// entry holds the negated weight of the corresponding edge.
    pub fn laplacian(&self) -> DMatrix<f64> {
        let len = self.len();
        let mut laplacian = DMatrix::zeros(len, len);

        for vertex in self.vertices() {
            for (neighbor, edge_weight) in self.neighbors(vertex) {
                laplacian[(vertex, neighbor)] -= edge_weight;
                laplacian[(vertex, vertex)] += edge_weight;
            }
        }

        laplacian
    }

    /// The edge cut of a partition.
    ///
    /// Given a partition and a weighted graph associated to a mesh, the edge
    /// cut of a partition is defined as the total weight of the edges that link
    /// graph nodes of different parts.
    ///
    /// # Example
    ///
    /// A partition with two parts (0 and 1)
    /// ```text,ignore
    ///          0
    ///    1*──┆─*────* 0
    ///    ╱ ╲ ┆╱    ╱
    ///  1*  1*┆ <┈┈╱┈┈┈ Dotted line passes through edged that contribute to edge cut.
    ///    ╲ ╱ ┆   ╱     If all edges have a weight of 1 then edge_cut = 3
    ///    1*  ┆╲ ╱
    ///          * 0
    /// ```
    pub fn edge_cut(&self, partition: &[usize]) -> f64
    {
        debug_assert_eq!(self.len(), partition.len());

        let indptr = self.graph_csr.indptr().into_raw_storage();
        let indices = self.graph_csr.indices();
        let data = self.graph_csr.data();
        let edge_cut: f64 = indptr
            .par_iter()
            .zip(&indptr[1..])
            .enumerate()
            .map(|(vertex, (start, end))| {
                let neighbors = &indices[*start..*end];
                let edge_weights = &data[*start..*end];
                let vertex_part = partition[vertex];
                neighbors
                    .iter()
                    .zip(edge_weights)
                    .take_while(|(neighbor, _edge_weight)| **neighbor < vertex)
                    .filter(|(neighbor, _edge_weight)| vertex_part != partition[**neighbor])
                    .map(|(_neighbor, edge_weight)| *edge_weight)
                    .sum::<f64>()
            })
            .sum();

        // A float sum without any term is -0.0.
        edge_cut + 0.0
    }

    /// The strongly connected components of the graph.
    ///
    /// The graph is undirected, so these are its connected components. Each component
    /// is sorted and components are listed by their smallest vertex.
    pub fn strongly_connected_components(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.len()];
        let mut queue = VecDeque::new();
        let mut components = Vec::new();

        for start in self.vertices() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            queue.push_back(start);

            let mut component = Vec::new();
            while let Some(vertex) = queue.pop_front() {
                component.push(vertex);
                for (neighbor, _) in self.neighbors(vertex) {
                    if !visited[neighbor] {
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }

        components
    }

    /// Shortest weighted path length from `source` to every vertex (Dijkstra).
    /// Unreachable vertices are at `f64::INFINITY`.
    pub fn distances_from(&self, source: usize) -> Result<Vec<f64>, Error> {
        self.check_vertex(source)?;
        Ok(self.dijkstra(source, None))
    }

    /// Shortest weighted path length between two vertices, `f64::INFINITY` when they
    /// are not connected.
    pub fn weighted_distance(&self, source: usize, target: usize) -> Result<f64, Error> {
        self.check_vertex(source)?;
        self.check_vertex(target)?;
        Ok(self.dijkstra(source, Some(target))[target])
    }

    /// Build the subgraph induced by `vertices`.
    ///
    /// Vertex `i` of the subgraph is `vertices[i]` of this graph; the returned vector
    /// maps subgraph identifiers back to identifiers of this graph.
    pub fn induced_subgraph(&self, vertices: &[usize]) -> (Graph, Vec<usize>) {
        let mut global_to_local = vec![None; self.len()];
        for (local, &vertex) in vertices.iter().enumerate() {
            global_to_local[vertex] = Some(local);
        }

        let mut subgraph = Graph::with_vertices(vertices.len());
        for (local, &vertex) in vertices.iter().enumerate() {
            for (neighbor, edge_weight) in self.neighbors(vertex) {
                if let Some(local_neighbor) = global_to_local[neighbor] {
                    subgraph.graph_csr.insert(local, local_neighbor, edge_weight);
                }
            }
        }

        (subgraph, vertices.to_vec())
    }

    pub(crate) fn check_vertex(&self, vertex: usize) -> Result<(), Error> {
        if self.contains(vertex) {
            Ok(())
        } else {
            Err(Error::InvalidVertex { vertex, len: self.len() })
        }
    }

    fn dijkstra(&self, source: usize, target: Option<usize>) -> Vec<f64> {
        let mut distances = vec![f64::INFINITY; self.len()];
        let mut heap = BinaryHeap::new();
        distances[source] = 0.0;
        heap.push(DijkstraEntry { vertex: source, distance: 0.0 });

        while let Some(DijkstraEntry { vertex, distance }) = heap.pop() {
            if Some(vertex) == target {
                break;
            }
            if distance > distances[vertex] {
                continue;
            }
            for (neighbor, edge_weight) in self.neighbors(vertex) {
                let candidate = distance + edge_weight;
                if candidate < distances[neighbor] {
                    distances[neighbor] = candidate;
                    heap.push(DijkstraEntry { vertex: neighbor, distance: candidate });
                }
            }
        }

        distances
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

// Entry in the priority queue of Dijkstra's algorithm, ordered as a min-heap.
struct DijkstraEntry {
    vertex: usize,
    distance: f64,
}

impl Eq for DijkstraEntry {}

impl PartialEq for DijkstraEntry {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.vertex == other.vertex
    }
}

impl Ord for DijkstraEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.distance.partial_cmp(&self.distance).unwrap_or(Ordering::Equal)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for DijkstraEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_ulps_eq;
    use itertools::assert_equal;
    use super::*;

    /// The six vertex weighted graph used across the algorithm tests.
    pub(crate) fn six_vertex_graph() -> Graph {
        let mut graph = Graph::with_vertices(6);
        for &(vertex1, vertex2, edge_weight) in &[
            (0, 1, 5.0),
            (0, 5, 2.0),
            (1, 2, 4.0),
            (2, 3, 9.0),
            (3, 4, 7.0),
            (3, 5, 3.0),
            (4, 0, 1.0),
            (5, 4, 8.0),
            (5, 2, 1.0),
        ] {
            graph.add_edge(vertex1, vertex2, edge_weight).unwrap();
        }
        graph
    }

    /// Two triangles joined by a single light edge.
    pub(crate) fn two_triangles() -> Graph {
        let mut graph = Graph::new();
        for &(vertex1, vertex2, edge_weight) in &[
            (0, 1, 10.0),
            (1, 2, 10.0),
            (2, 0, 10.0),
            (3, 4, 10.0),
            (4, 5, 10.0),
            (5, 3, 10.0),
            (2, 3, 1.0),
        ] {
            graph.add_edge(vertex1, vertex2, edge_weight).unwrap();
        }
        graph
    }

    #[test]
    fn test_add_edge_is_symmetric() {
        // Arrange
        let mut graph = Graph::new();

        // Act
        graph.add_edge(0, 3, 2.5).unwrap();

        // Assert
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.get_edge_weight(0, 3), Some(2.5));
        assert_eq!(graph.get_edge_weight(3, 0), Some(2.5));
        assert_eq!(graph.get_edge_weight(1, 2), None);
        assert_eq!(graph.edge_weight(1, 2), 0.0);
    }

    #[test]
    fn test_add_edge_rejects_negative_weights_and_self_loops() {
        // Arrange
        let mut graph = Graph::with_vertices(2);

        // Act
        let negative = graph.add_edge(0, 1, -1.0);
        let self_loop = graph.add_edge(1, 1, 1.0);

        // Assert
        assert!(matches!(negative, Err(Error::NegativeValues)));
        assert!(matches!(self_loop, Err(Error::SelfLoop { vertex: 1 })));
        assert_eq!(graph.graph_csr.nnz(), 0);
    }

    #[test]
    fn test_add_vertex_keeps_existing_edges() {
        // Arrange
        let mut graph = Graph::new();
        graph.add_edge(0, 1, 3.0).unwrap();

        // Act
        graph.add_vertex(4);

        // Assert
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.degree(4), 0);
        assert_eq!(graph.edge_weight(1, 0), 3.0);
        assert_eq!(graph.neighbors(4).count(), 0);
    }

    #[test]
    fn test_total_weight_and_degree() {
        // Arrange
        let graph = six_vertex_graph();

        // Act
        let total_weight = graph.total_weight();

        // Assert
        assert_ulps_eq!(total_weight, 40.0);
        assert_eq!(graph.degree(0), 3);
        assert_eq!(graph.degree(5), 4);
    }

    #[test]
    fn test_laplacian_rows_sum_to_zero() {
        // Arrange
        let graph = six_vertex_graph();

        // Act
        let laplacian = graph.laplacian();

        // Assert
        assert_ulps_eq!(laplacian[(0, 0)], 8.0);
        assert_ulps_eq!(laplacian[(0, 1)], -5.0);
        assert_ulps_eq!(laplacian[(1, 0)], -5.0);
        assert_ulps_eq!(laplacian[(1, 3)], 0.0);
        for row in 0..graph.len() {
            assert_ulps_eq!(laplacian.row(row).sum(), 0.0);
        }
    }

    #[test]
    fn test_edge_cut() {
        // Arrange
        let graph = two_triangles();
        let partition = [0, 0, 0, 1, 1, 1];

        // Act
        let edge_cut = graph.edge_cut(&partition);

        // Assert
        assert_ulps_eq!(edge_cut, 1.0);
    }

    #[test]
    fn test_clone_is_independent() {
        // Arrange
        let graph = two_triangles();

        // Act
        let mut copy = graph.clone();
        copy.add_edge(0, 5, 2.0).unwrap();

        // Assert
        assert_eq!(graph.get_edge_weight(0, 5), None);
        assert_eq!(copy.get_edge_weight(0, 5), Some(2.0));
        assert_ulps_eq!(copy.total_weight(), graph.total_weight() + 2.0);
    }

    #[test]
    fn test_edge_cut_without_cut_edges_is_positive_zero() {
        // Arrange
        let graph = two_triangles();
        let partition = [0; 6];

        // Act
        let edge_cut = graph.edge_cut(&partition);

        // Assert
        assert_eq!(edge_cut, 0.0);
        assert!(edge_cut.is_sign_positive());
    }

    #[test]
    fn test_strongly_connected_components() {
        // Arrange
        let mut graph = Graph::with_vertices(7);
        graph.add_edge(5, 1, 1.0).unwrap();
        graph.add_edge(1, 3, 1.0).unwrap();
        graph.add_edge(2, 4, 1.0).unwrap();

        // Act
        let components = graph.strongly_connected_components();

        // Assert
        assert_equal(components, vec![vec![0], vec![1, 3, 5], vec![2, 4], vec![6]]);
    }

    #[test]
    fn test_weighted_distance() {
        // Arrange
        let mut graph = six_vertex_graph();
        graph.add_vertex(6);

        // Act
        let distance = graph.weighted_distance(0, 3).unwrap();
        let unreachable = graph.weighted_distance(0, 6).unwrap();
        let invalid = graph.weighted_distance(0, 7);

        // Assert
        // 0 -> 5 -> 3 costs 2 + 3.
        assert_ulps_eq!(distance, 5.0);
        assert!(unreachable.is_infinite());
        assert!(matches!(invalid, Err(Error::InvalidVertex { vertex: 7, len: 7 })));
    }

    #[test]
    fn test_distances_from() {
        // Arrange
        let graph = six_vertex_graph();

        // Act
        let distances = graph.distances_from(0).unwrap();

        // Assert
        assert_equal(distances, vec![0.0, 5.0, 3.0, 5.0, 1.0, 2.0]);
    }

    #[test]
    fn test_induced_subgraph() {
        // Arrange
        let graph = two_triangles();

        // Act
        let (subgraph, local_to_global) = graph.induced_subgraph(&[2, 3, 4]);

        // Assert
        assert_eq!(subgraph.len(), 3);
        assert_equal(local_to_global, vec![2, 3, 4]);
        assert_eq!(subgraph.edge_weight(0, 1), 1.0);
        assert_eq!(subgraph.edge_weight(1, 2), 10.0);
        assert_eq!(subgraph.edge_weight(0, 2), 0.0);
        assert_ulps_eq!(subgraph.total_weight(), 11.0);
    }
}
