// This file has code from https://github.com/LIHPC-Computational-Geometry/coupe
use thiserror::Error;

mod refinement;
mod level_set_bfs;
mod kernighan_lin;
mod fiduccia_mattheyses;
mod spectral_bisection;
mod scc_kernighan_lin;
mod recursive_bisection;
mod greedy_coloring;
mod k_medoids;

pub use refinement::{CostAccumulation, Side};
pub use level_set_bfs::{LevelSetBfs, LevelSets};
pub use kernighan_lin::{KlBisector, KlOutcome};
pub use fiduccia_mattheyses::{FmBisector, FmOutcome};
pub use spectral_bisection::{SpectralBisector, SpectralOutcome};
pub use scc_kernighan_lin::{ComponentBisection, SccKlBisector, SccKlOutcome};
pub use recursive_bisection::{RecursiveBisection, RecursiveBisector};
pub use greedy_coloring::{Coloring, GreedyColorer};
pub use k_medoids::{KMedoids, KMedoidsOutcome};


/// Common errors thrown by algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A vertex identifier is not part of the graph.
    #[error("invalid vertex id {vertex}, the graph has {len} vertices")]
    InvalidVertex { vertex: usize, len: usize },

    /// The algorithm needs at least one vertex.
    #[error("the graph has no vertices")]
    EmptyGraph,

    /// The parameters cannot produce a meaningful result for this graph.
    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: &'static str },

    /// A numeric routine failed, e.g. no second eigenvalue exists.
    #[error("numeric error: {reason}")]
    NumericError { reason: &'static str },

    /// Input sets don't have matching lengths.
    #[error("input sets don't have the same length (expected {expected} items, got {actual})")]
    InputLenMismatch { expected: usize, actual: usize },

    /// Input contains negative values and such values are not supported.
    #[error("input contains negative values")]
    NegativeValues,

    /// An edge would connect a vertex to itself.
    #[error("self loop on vertex {vertex}")]
    SelfLoop { vertex: usize },
}

/// Check that a caller provided `part_ids` array covers every vertex.
pub(crate) fn check_part_ids_len(part_ids: &[usize], num_of_vertices: usize) -> Result<(), Error> {
    if part_ids.len() != num_of_vertices {
        return Err(Error::InputLenMismatch {
            expected: num_of_vertices,
            actual: part_ids.len(),
        });
    }
    Ok(())
}
