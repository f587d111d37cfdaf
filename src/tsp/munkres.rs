//! Minimum-weight perfect matching on a symmetric cost matrix.
//!
//! The Munkres (Hungarian) assignment is computed on the matrix with its
//! diagonal masked out, so a vertex never matches itself. Because the
//! assignment problem is bipartite, the resulting mapping need not be
//! symmetric; callers split it and fall back to the greedy pairing for the
//! vertices left over.

use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// Minimum-weight assignment on a symmetric matrix of even order.
/// Returns `mates` where vertex `v` is assigned to `mates[v]`; the mapping
/// may be asymmetric (`mates[mates[v]] != v` for some `v`).
pub fn minimum_weight_perfect_matching(m: &Matrix) -> Result<Vec<usize>> {
    let n = m.size();
    if n % 2 == 1 {
        return Err(Error::OddVertexCount(n));
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    let inf = i64::MAX / 4;

    // Dense O(n^3) Hungarian algorithm with row/column potentials and
    // augmenting paths. The diagonal is masked so self-assignment is never
    // optimal.
    let cost = |i: usize, j: usize| -> i64 {
        if i == j {
            inf
        } else {
            m.get(i, j) as i64
        }
    };

    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![inf; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = inf;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut mates = vec![0usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            mates[p[j] - 1] = j - 1;
        }
    }
    Ok(mates)
}

/// Greedy symmetric approximation: repeatedly pair the two unmatched
/// vertices joined by the cheapest remaining edge. Returns pairs of local
/// indices with `first < second`.
pub fn greedy_symmetric_approx_mwpm(m: &Matrix) -> Vec<(usize, usize)> {
    let n = m.size();
    debug_assert!(n % 2 == 0);

    let mut matched = vec![false; n];
    let mut pairs = Vec::with_capacity(n / 2);

    for _ in 0..n / 2 {
        let mut best = None;
        let mut best_cost = crate::Cost::MAX;

        for i in 0..n {
            if matched[i] {
                continue;
            }
            for j in i + 1..n {
                if matched[j] {
                    continue;
                }
                if m.get(i, j) < best_cost {
                    best_cost = m.get(i, j);
                    best = Some((i, j));
                }
            }
        }

        if let Some((i, j)) = best {
            matched[i] = true;
            matched[j] = true;
            pairs.push((i, j));
        }
    }

    pairs
}
