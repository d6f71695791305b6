use std::collections::{BTreeSet, VecDeque};
use tracing::info;
use crate::algorithms::Error;
use crate::graph::Graph;

/// Result of a level-set breadth first search.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSets {
    /// Vertices discovered at a depth lower than or equal to the threshold.
    pub group_1: BTreeSet<usize>,

    /// Vertices discovered deeper than the threshold.
    pub group_2: BTreeSet<usize>,

    /// Discovery depth of every vertex, `None` for vertices the search never reached.
    pub levels: Vec<Option<usize>>,
}

/// Level-Set BFS Partitioner
///
/// Traverses the graph breadth first from a start vertex and splits the vertices by
/// the depth at which they were discovered: the start vertex has depth 0, its
/// neighbors depth 1 and so on. Vertices with a depth lower than or equal to
/// `threshold` go to the first group, deeper vertices go to the second one.
///
/// Vertices that cannot be reached from the start vertex end up in neither group, so
/// `threshold` has to be chosen relative to the diameter of the graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelSetBfs {
    /// Deepest level that still belongs to the first group.
    pub threshold: usize,
}

impl LevelSetBfs {
    pub fn partition(&self, graph: &Graph, start: usize) -> Result<LevelSets, Error> {
        graph.check_vertex(start)?;

        let mut levels = vec![None; graph.len()];
        let mut queue = VecDeque::new();
        let mut group_1 = BTreeSet::new();
        let mut group_2 = BTreeSet::new();

        levels[start] = Some(0);
        queue.push_back(start);

        while let Some(vertex) = queue.pop_front() {
            let level = levels[vertex].unwrap_or(0);

            if level <= self.threshold {
                group_1.insert(vertex);
            } else {
                group_2.insert(vertex);
            }

            for (neighbor, _) in graph.neighbors(vertex) {
                if levels[neighbor].is_none() {
                    levels[neighbor] = Some(level + 1);
                    queue.push_back(neighbor);
                }
            }
        }

        info!("Group 1 vertices: {:?}", group_1);
        info!("Group 2 vertices: {:?}", group_2);

        Ok(LevelSets { group_1, group_2, levels })
    }
}
