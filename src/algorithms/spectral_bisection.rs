// Spectral bisection.
//
// # Reference
//
// Fiedler, M. "A property of eigenvectors of nonnegative symmetric matrices and its
// application to graph theory." Czechoslovak Mathematical Journal 25.4 (1975): 619-633.

use nalgebra::{DVector, SymmetricEigen};
use tracing::{debug, info};
use crate::algorithms::refinement::{members, Side};
use crate::algorithms::{check_part_ids_len, Error};
use crate::graph::Graph;
use crate::Partition;

/// Outcome of a spectral bisection.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralOutcome {
    /// Weight of the edges between the two groups.
    pub cut_cost: f64,

    /// Vertices with a non-negative Fiedler vector component.
    pub group_a: Vec<usize>,

    /// Vertices with a negative Fiedler vector component.
    pub group_b: Vec<usize>,

    /// Second smallest eigenvalue of the Laplacian (algebraic connectivity).
    pub fiedler_value: f64,

    /// Eigenvector of the second smallest eigenvalue.
    pub fiedler_vector: Vec<f64>,
}

/// Spectral Bisector
///
/// Computes the full eigendecomposition of the graph Laplacian and splits the vertices
/// by the sign of their component in the Fiedler vector. Components equal to zero go
/// to group A. There is no refinement step.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralBisector;

impl SpectralBisector {
    pub fn bisect(&self, graph: &Graph) -> Result<SpectralOutcome, Error> {
        if graph.len() < 2 {
            return Err(Error::NumericError { reason: "a second eigenvalue needs at least two vertices" });
        }

        let laplacian = graph.laplacian();
        info!("Computing the eigenvectors and eigenvalues");
        let eigen = SymmetricEigen::new(laplacian);

        if eigen.eigenvalues.iter().any(|value| !value.is_finite()) {
            return Err(Error::NumericError { reason: "the Laplacian has non-finite eigenvalues" });
        }

        // nalgebra does not sort the eigenvalues.
        let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
        order.sort_by(|&i, &j| eigen.eigenvalues[i].total_cmp(&eigen.eigenvalues[j]));
        let fiedler_index = order[1];

        let fiedler_value = eigen.eigenvalues[fiedler_index];
        let fiedler_vector: DVector<f64> = eigen.eigenvectors.column(fiedler_index).into_owned();
        debug!("Eigenvector for #{} eigenvalue ({}): {:?}", fiedler_index, fiedler_value, fiedler_vector.as_slice());

        if fiedler_vector.iter().any(|value| !value.is_finite()) {
            return Err(Error::NumericError { reason: "the Fiedler vector has non-finite components" });
        }

        let sides = split_by_sign(fiedler_vector.as_slice());
        let part_ids: Vec<usize> = sides.iter().map(|side| side.index()).collect();
        let outcome = SpectralOutcome {
            cut_cost: graph.edge_cut(&part_ids),
            group_a: members(&sides, Side::A),
            group_b: members(&sides, Side::B),
            fiedler_value,
            fiedler_vector: fiedler_vector.iter().cloned().collect(),
        };

        info!("Group A vertices: {:?}", outcome.group_a);
        info!("Group B vertices: {:?}", outcome.group_b);
        Ok(outcome)
    }
}

fn split_by_sign(vector: &[f64]) -> Vec<Side> {
    vector
        .iter()
        .map(|&value| if value >= 0.0 { Side::A } else { Side::B })
        .collect()
}

impl<'a> Partition<&'a Graph> for SpectralBisector {
    type Metadata = SpectralOutcome;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        graph: &'a Graph,
    ) -> Result<Self::Metadata, Self::Error> {
        check_part_ids_len(part_ids, graph.len())?;

        let outcome = self.bisect(graph)?;
        for &vertex in &outcome.group_a {
            part_ids[vertex] = Side::A.index();
        }
        for &vertex in &outcome.group_b {
            part_ids[vertex] = Side::B.index();
        }
        Ok(outcome)
    }
}
