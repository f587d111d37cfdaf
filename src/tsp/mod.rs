//! Christofides heuristic for the symmetric TSP.
//!
//! Used by the engine to re-optimize the stop order of a single route:
//! minimum spanning tree, minimum-weight perfect matching on the odd
//! degree vertices, Eulerian circuit, shortcutting.

pub mod graph;
pub mod munkres;

use log::trace;
use std::collections::BTreeSet;

use crate::error::Result;
use crate::matrix::Matrix;
use crate::tsp::graph::{minimum_spanning_tree, Edge, UndirectedGraph};
use crate::tsp::munkres::{greedy_symmetric_approx_mwpm, minimum_weight_perfect_matching};

/// Compute a tour over all vertices of a symmetric cost matrix. Returns a
/// permutation of 0..size; for metric instances the tour costs at most
/// 1.5 times the optimum.
pub fn christofides(sym_matrix: &Matrix) -> Result<Vec<usize>> {
    let n = sym_matrix.size();
    if n <= 1 {
        return Ok((0..n).collect());
    }

    // The Eulerian sub-graph used below is made of a minimum spanning
    // tree with a minimum-weight perfect matching on its odd-degree
    // vertices.
    let sym_graph = UndirectedGraph::from_matrix(sym_matrix);
    trace!("graph has {} nodes", sym_graph.size());

    let mst_graph = minimum_spanning_tree(&sym_graph)?;
    let adjacency_list = mst_graph.adjacency_list();

    // Odd-degree vertices of the spanning tree, in ascending order.
    let mst_odd_vertices: Vec<usize> = (0..n)
        .filter(|&v| adjacency_list[v].len() % 2 == 1)
        .collect();
    trace!(
        "{} nodes with odd degree in the minimum spanning tree",
        mst_odd_vertices.len()
    );

    let sub_matrix = sym_matrix.sub_matrix(&mst_odd_vertices);
    let mwpm = minimum_weight_perfect_matching(&sub_matrix)?;

    // Keep the edges that are coherent regarding symmetry (y -> x whenever
    // x -> y); remember the rest for the greedy fallback. Pairs are stored
    // once with first < second.
    let mut mwpm_final: BTreeSet<(usize, usize)> = BTreeSet::new();
    let mut wrong_vertices = Vec::new();

    for (first, &second) in mwpm.iter().enumerate() {
        if mwpm[second] == first {
            mwpm_final.insert((first.min(second), first.max(second)));
        } else {
            wrong_vertices.push(first);
        }
    }

    if !wrong_vertices.is_empty() {
        trace!(
            "munkres: {} vertices unusable for symmetry",
            wrong_vertices.len()
        );

        let remaining = greedy_symmetric_approx_mwpm(&sub_matrix.sub_matrix(&wrong_vertices));
        for (first, second) in remaining {
            let a = wrong_vertices[first];
            let b = wrong_vertices[second];
            mwpm_final.insert((a.min(b), a.max(b)));
        }
    }

    // Eulerian multigraph: spanning tree plus matching edges, each added
    // once.
    let mut eulerian_edges = mst_graph.edges().to_vec();
    for &(first, second) in &mwpm_final {
        let first_index = mst_odd_vertices[first];
        let second_index = mst_odd_vertices[second];
        eulerian_edges.push(Edge::new(
            first_index,
            second_index,
            sym_matrix.get(first_index, second_index),
        ));
    }

    let eulerian_graph = UndirectedGraph::from_edges(n, eulerian_edges);
    let mut adjacency = eulerian_graph.adjacency_list();
    debug_assert!(adjacency.iter().all(|l| l.len() % 2 == 0));

    // Hierholzer's algorithm: build and splice closed sub-tours at
    // vertices that still have adjacent edges.
    let mut eulerian_path = vec![0];

    loop {
        // First vertex along the current path with a remaining edge.
        let restart = eulerian_path
            .iter()
            .position(|&v| !adjacency[v].is_empty());

        let insert_at = match restart {
            Some(pos) => pos,
            None => break,
        };

        let initial_vertex = eulerian_path[insert_at];
        let mut new_tour = Vec::new();
        let mut current_vertex = initial_vertex;

        // Walk a closed sub-tour, consuming each traversed edge from both
        // endpoints' neighbor lists.
        loop {
            new_tour.push(current_vertex);

            let next_vertex = adjacency[current_vertex].remove(0);
            let back = adjacency[next_vertex]
                .iter()
                .position(|&v| v == current_vertex)
                .expect("edge missing from reverse adjacency");
            adjacency[next_vertex].remove(back);

            current_vertex = next_vertex;
            if current_vertex == initial_vertex {
                break;
            }
        }

        // Splice the sub-tour into the path at the restart point.
        for (offset, vertex) in new_tour.into_iter().enumerate() {
            eulerian_path.insert(insert_at + offset, vertex);
        }
    }

    // Shortcut the circuit: keep each vertex at its first appearance.
    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n);
    for &vertex in &eulerian_path {
        if !visited[vertex] {
            visited[vertex] = true;
            tour.push(vertex);
        }
    }

    Ok(tour)
}
