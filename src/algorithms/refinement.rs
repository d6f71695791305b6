// Gain bookkeeping shared by the Kernighan-Lin and Fiduccia-Mattheyses bisectors.
//
// A vertex v keeps an internal cost I(v) (weight towards its own side) and an external
// cost E(v) (negated weight towards the other side). Its D-value is the classic
// Kernighan-Lin difference |E(v)| - I(v) = -(I(v) + E(v)), so that swapping a and b
// reduces the cut by D(a) + D(b) - 2 c(a, b) and moving v alone reduces it by D(v).

use std::fmt;
use tracing::debug;
use crate::graph::Graph;

/// Label of one side of a bisection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The other side.
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Part id of the side in a `part_ids` array (A is 0, B is 1).
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Vertices labelled `side` in `sides`, in increasing order.
pub(crate) fn members(sides: &[Side], side: Side) -> Vec<usize> {
    sides
        .iter()
        .enumerate()
        .filter(|(_, &vertex_side)| vertex_side == side)
        .map(|(vertex, _)| vertex)
        .collect()
}

/// How the internal/external cost accumulators behave between refinement iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostAccumulation {
    /// Accumulators are zeroed before every iteration, so D-values always describe
    /// the current bisection.
    #[default]
    ResetEachPass,

    /// Accumulators keep growing across iterations and D-values become the sum of
    /// every iteration's D-values. The cut is no longer guaranteed to decrease.
    Cumulative,
}

/// Scratch state of one bisection run. It is owned by the run and never stored in
/// the graph.
#[derive(Debug, Clone)]
pub(crate) struct Bisection {
    pub(crate) sides: Vec<Side>,
    internal_cost: Vec<f64>,
    external_cost: Vec<f64>,
    pub(crate) d_values: Vec<f64>,
}

impl Bisection {
    /// Label the first half of the identifiers A and the rest B. With an odd number of
    /// vertices A gets the extra one.
    pub(crate) fn halved(num_of_vertices: usize) -> Self {
        let half = (num_of_vertices + 1) / 2;
        let sides = (0..num_of_vertices)
            .map(|vertex| if vertex < half { Side::A } else { Side::B })
            .collect();

        Self {
            sides,
            internal_cost: vec![0.0; num_of_vertices],
            external_cost: vec![0.0; num_of_vertices],
            d_values: vec![0.0; num_of_vertices],
        }
    }

    /// Accumulate internal and external costs for the current labels and derive the
    /// D-values from them.
    pub(crate) fn refresh_costs(&mut self, graph: &Graph, accumulation: CostAccumulation) {
        if accumulation == CostAccumulation::ResetEachPass {
            self.internal_cost.fill(0.0);
            self.external_cost.fill(0.0);
        }

        for vertex in graph.vertices() {
            for (neighbor, edge_weight) in graph.neighbors(vertex) {
                if self.sides[vertex] == self.sides[neighbor] {
                    self.internal_cost[vertex] += edge_weight;
                } else {
                    self.external_cost[vertex] -= edge_weight;
                }
            }
            self.d_values[vertex] = -(self.internal_cost[vertex] + self.external_cost[vertex]);
        }
    }

    /// Vertices currently labelled `side`, in increasing order.
    pub(crate) fn members(&self, side: Side) -> Vec<usize> {
        members(&self.sides, side)
    }

    /// Reduction of the cut achieved by swapping `a` and `b`.
    pub(crate) fn swap_gain(&self, graph: &Graph, a: usize, b: usize) -> f64 {
        self.d_values[a] + self.d_values[b] - 2.0 * graph.edge_weight(a, b)
    }

    /// The cross pair `(a, b)` with the largest swap gain. Ties keep the first pair in
    /// (a, b) identifier order.
    pub(crate) fn best_swap(&self, graph: &Graph) -> Option<(usize, usize, f64)> {
        let group_a = self.members(Side::A);
        let group_b = self.members(Side::B);

        let mut best: Option<(usize, usize, f64)> = None;
        for &a in &group_a {
            for &b in &group_b {
                let gain = self.swap_gain(graph, a, b);
                if best.map_or(true, |(_, _, best_gain)| gain > best_gain) {
                    best = Some((a, b, gain));
                }
            }
        }

        best
    }

    /// The vertex of `side` whose move to the other side gains the most. Ties keep the
    /// lowest identifier.
    pub(crate) fn best_move(&self, side: Side) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for vertex in self.members(side) {
            let gain = self.d_values[vertex];
            if best.map_or(true, |(_, best_gain)| gain > best_gain) {
                best = Some((vertex, gain));
            }
        }

        best
    }

    /// Swap the labels of `a` (on side A) and `b` (on side B) and update D-values.
    ///
    /// For x remaining in A: D(x) += 2 c(x, a) - 2 c(x, b).
    /// For y remaining in B: D(y) += 2 c(y, b) - 2 c(y, a).
    pub(crate) fn swap(&mut self, graph: &Graph, a: usize, b: usize) {
        debug_assert_eq!(self.sides[a], Side::A);
        debug_assert_eq!(self.sides[b], Side::B);

        let c_ab = graph.edge_weight(a, b);
        for (vertex, edge_weight) in graph.neighbors(a) {
            if vertex == b {
                continue;
            }
            match self.sides[vertex] {
                Side::A => self.d_values[vertex] += 2.0 * edge_weight,
                Side::B => self.d_values[vertex] -= 2.0 * edge_weight,
            }
        }
        for (vertex, edge_weight) in graph.neighbors(b) {
            if vertex == a {
                continue;
            }
            match self.sides[vertex] {
                Side::A => self.d_values[vertex] -= 2.0 * edge_weight,
                Side::B => self.d_values[vertex] += 2.0 * edge_weight,
            }
        }

        // The swapped pair stays cut, every other edge of a and b flips.
        self.d_values[a] = 2.0 * c_ab - self.d_values[a];
        self.d_values[b] = 2.0 * c_ab - self.d_values[b];

        self.sides[a] = Side::B;
        self.sides[b] = Side::A;
        debug!(a, b, "swapped");
    }

    /// Move `vertex` to the other side and update D-values.
    pub(crate) fn move_vertex(&mut self, graph: &Graph, vertex: usize) {
        let source = self.sides[vertex];

        for (neighbor, edge_weight) in graph.neighbors(vertex) {
            if self.sides[neighbor] == source {
                self.d_values[neighbor] += 2.0 * edge_weight;
            } else {
                self.d_values[neighbor] -= 2.0 * edge_weight;
            }
        }

        self.d_values[vertex] = -self.d_values[vertex];
        self.sides[vertex] = source.opposite();
        debug!(vertex, from = ?source, "moved");
    }

    /// Part ids of the current labels (A is 0, B is 1).
    pub(crate) fn part_ids(&self) -> Vec<usize> {
        self.sides.iter().map(|side| side.index()).collect()
    }

    /// Weight of the edges crossing the bisection.
    pub(crate) fn cut_cost(&self, graph: &Graph) -> f64 {
        graph.edge_cut(&self.part_ids())
    }
}
