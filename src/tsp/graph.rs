//! Undirected graph with edge list, adjacency list and Kruskal MST.

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::Cost;

/// Weighted undirected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub first: usize,
    pub second: usize,
    pub weight: Cost,
}

impl Edge {
    pub fn new(first: usize, second: usize, weight: Cost) -> Self {
        Edge {
            first,
            second,
            weight,
        }
    }
}

/// Undirected graph over vertices 0..size. Parallel edges are allowed, so
/// the same pair may appear several times in the edge list and a neighbor
/// may be duplicated in the adjacency list.
#[derive(Debug, Clone)]
pub struct UndirectedGraph {
    size: usize,
    edges: Vec<Edge>,
}

impl UndirectedGraph {
    /// Complete graph from a symmetric matrix: one edge per pair i < j
    /// with weight `m[i][j]`.
    pub fn from_matrix(m: &Matrix) -> Self {
        let size = m.size();
        let mut edges = Vec::with_capacity(size * (size.saturating_sub(1)) / 2);

        for i in 0..size {
            for j in i + 1..size {
                edges.push(Edge::new(i, j, m.get(i, j)));
            }
        }

        UndirectedGraph { size, edges }
    }

    /// Graph from an explicit edge list over vertices 0..size.
    pub fn from_edges(size: usize, edges: Vec<Edge>) -> Self {
        debug_assert!(edges.iter().all(|e| e.first < size && e.second < size));
        UndirectedGraph { size, edges }
    }

    /// Number of vertices.
    pub fn size(&self) -> usize {
        self.size
    }

    /// All edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Neighbor lists per vertex. A parallel edge contributes one entry
    /// per copy, so list lengths are vertex degrees.
    pub fn adjacency_list(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.size];

        for edge in &self.edges {
            adjacency[edge.first].push(edge.second);
            adjacency[edge.second].push(edge.first);
        }

        adjacency
    }
}

/// Minimum spanning tree by Kruskal's algorithm. Returns a graph over the
/// same vertex set with exactly size − 1 edges, or
/// [`Error::DisconnectedGraph`] when the input does not connect.
pub fn minimum_spanning_tree(graph: &UndirectedGraph) -> Result<UndirectedGraph> {
    let size = graph.size();

    let mut sorted_edges = graph.edges().to_vec();
    sorted_edges.sort_by_key(|e| (e.weight, e.first, e.second));

    // Union-find over vertices.
    let mut parent: Vec<usize> = (0..size).collect();

    fn find(parent: &mut Vec<usize>, mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    let mut mst_edges = Vec::with_capacity(size.saturating_sub(1));

    for edge in sorted_edges {
        let root_first = find(&mut parent, edge.first);
        let root_second = find(&mut parent, edge.second);

        if root_first != root_second {
            parent[root_first] = root_second;
            mst_edges.push(edge);

            if mst_edges.len() + 1 == size {
                break;
            }
        }
    }

    if mst_edges.len() + 1 < size && size > 0 {
        return Err(Error::DisconnectedGraph);
    }

    Ok(UndirectedGraph::from_edges(size, mst_edges))
}
