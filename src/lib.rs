// This file has code from https://github.com/LIHPC-Computational-Geometry/coupe
pub mod graph;
pub mod imbalance;
pub mod io;
pub mod algorithms;

// The `Partition` trait allows for partitioning data.
// Partitioning algorithms implement this trait.
// The generic argument `M` defines the input of the algorithms, here a
// `&Graph`.
// The input partition must cover every vertex of the graph; its previous
// contents are overwritten.
pub trait Partition<M> {
    // Diagnostic data returned for a specific run of the algorithm, e.g. the
    // realized cut and the groups.
    type Metadata;

    // Error details, should the algorithm fail to run.
    type Error;

    // Partition the given data and output the part ID of each element in
    // `part_ids`.
    //
    // Two-way partitioners write 0 for group A and 1 for group B. Clusterers
    // write the cluster index.
    fn partition(&mut self, part_ids: &mut [usize], data: M)
                 -> Result<Self::Metadata, Self::Error>;
}
