use std::collections::BTreeMap;
use tracing::info;
use crate::graph::Graph;

/// A vertex coloring, `colors[vertex]` is the color index of `vertex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coloring {
    pub colors: Vec<usize>,
}

impl Coloring {
    /// Number of distinct colors.
    pub fn num_colors(&self) -> usize {
        self.colors.iter().max().map_or(0, |&max_color| max_color + 1)
    }

    /// Vertices grouped by color, each group in increasing order.
    pub fn classes(&self) -> BTreeMap<usize, Vec<usize>> {
        let mut classes: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (vertex, &color) in self.colors.iter().enumerate() {
            classes.entry(color).or_default().push(vertex);
        }
        classes
    }
}

/// Greedy Colorer
///
/// Colors vertices by decreasing degree (ties by identifier), giving each vertex the
/// smallest color not used by its already colored neighbors. A graph of maximum degree
/// d never needs more than d + 1 colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyColorer;

impl GreedyColorer {
    pub fn color(&self, graph: &Graph) -> Coloring {
        let num_of_vertices = graph.len();
        let mut order: Vec<usize> = graph.vertices().collect();
        order.sort_by_key(|&vertex| std::cmp::Reverse(graph.degree(vertex)));

        let mut colors: Vec<Option<usize>> = vec![None; num_of_vertices];
        let mut used_colors = vec![false; num_of_vertices];

        for vertex in order {
            for (neighbor, _) in graph.neighbors(vertex) {
                if let Some(color) = colors[neighbor] {
                    used_colors[color] = true;
                }
            }

            // A vertex has fewer neighbors than there are vertices, so a free color exists.
            let color = (0..num_of_vertices).find(|&color| !used_colors[color]).unwrap_or(0);
            colors[vertex] = Some(color);

            for (neighbor, _) in graph.neighbors(vertex) {
                if let Some(color) = colors[neighbor] {
                    used_colors[color] = false;
                }
            }
        }

        let coloring = Coloring { colors: colors.into_iter().map(|color| color.unwrap_or(0)).collect() };
        for (color, group) in coloring.classes() {
            info!("Color {}: {:?}", color, group);
        }
        coloring
    }
}
