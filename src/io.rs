use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use sprs::io::{read_matrix_market, IoError};
use sprs::CsMat;
use thiserror::Error;
use tracing::debug;
use crate::algorithms;
use crate::graph::Graph;

/// Errors raised while loading a graph.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot read the matrix market file: {0}")]
    MatrixMarket(#[from] IoError),

    #[error("invalid edge in the matrix market file: {0}")]
    Graph(#[from] algorithms::Error),
}

/// Read a matrix market file and output Graph struct.
///
/// Every off-diagonal entry `(i, j)` becomes an undirected edge weighted by the
/// magnitude of the value; diagonal entries are ignored. When both `(i, j)` and
/// `(j, i)` are present, the one stored last wins.
pub fn read_matrix_market_as_graph(file_path: &Path) -> Result<Graph, ReadError> {
    // read the matrix market file as a TriMat with edge lengths.
    let tri_mat = read_matrix_market::<f64, usize, _>(file_path)?;
    let csr_matrix: CsMat<f64> = tri_mat.to_csr();

    let mut graph = Graph::with_vertices(csr_matrix.rows().max(csr_matrix.cols()));
    for (&value, (row, col)) in csr_matrix.iter() {
        if row != col {
            graph.add_edge(row, col, value.abs())?;
        }
    }

    debug!(vertices = graph.len(), total_weight = graph.total_weight(), "loaded {}", file_path.display());
    Ok(graph)
}

/// Write one `vertex <id> => <label>` line per vertex.
pub fn write_partition_data_to_file<L: Display>(labels: &[L], file_path: &Path) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(file_path)?);
    for (vertex_id, label) in labels.iter().enumerate() {
        writeln!(file, "vertex {} => {}", vertex_id, label)?;
    }
    file.flush()
}
