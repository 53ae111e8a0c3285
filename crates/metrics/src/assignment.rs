//! Weighted bipartite assignment via the Hungarian algorithm.
//!
//! O(n³) potentials formulation over a zero-padded square matrix.

/// Find the one-to-one row/column assignment maximizing total weight.
///
/// `weights` is a `rows x cols` matrix of non-negative weights (rows
/// and columns need not match in count; the matrix is padded
/// internally). Returns `(row, col)` pairs; pairs whose weight is zero
/// are dropped, since a zero-weight match is no better than leaving
/// both sides unmatched.
pub fn max_weight_assignment(weights: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let rows = weights.len();
    let cols = weights.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let n = rows.max(cols);
    // Minimize negated weight; padding cells cost 0.
    let cost = |i: usize, j: usize| -> f64 {
        if i < rows && j < cols {
            -weights[i][j]
        } else {
            0.0
        }
    };

    // 1-based potentials; `assigned[j]` is the row matched to column j.
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; n + 1];
    let mut assigned = vec![0_usize; n + 1];
    let mut way = vec![0_usize; n + 1];

    for row in 1..=n {
        assigned[0] = row;
        let mut j0 = 0_usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = assigned[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0_usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[assigned[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if assigned[j0] == 0 {
                break;
            }
        }

        // Augment along the alternating path back to the virtual column.
        loop {
            let j1 = way[j0];
            assigned[j0] = assigned[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs = Vec::new();
    for j in 1..=n {
        let i = assigned[j];
        if i >= 1 && i - 1 < rows && j - 1 < cols && weights[i - 1][j - 1] > 0.0 {
            pairs.push((i - 1, j - 1));
        }
    }
    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matrix_yields_no_pairs() {
        assert!(max_weight_assignment(&[]).is_empty());
        assert!(max_weight_assignment(&[vec![], vec![]]).is_empty());
    }

    #[test]
    fn picks_the_globally_best_pairing() {
        // (0,0)+(1,1) = 5.0 beats the greedy-looking (0,1)+(1,0) = 4.0.
        let weights = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert_eq!(max_weight_assignment(&weights), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn prefers_cross_pairing_when_it_wins() {
        let weights = vec![vec![1.0, 10.0], vec![10.0, 1.0]];
        assert_eq!(max_weight_assignment(&weights), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn rectangular_matrices_leave_extras_unmatched() {
        // Three rows, one column: only the heaviest row is matched.
        let weights = vec![vec![1.0], vec![5.0], vec![2.0]];
        assert_eq!(max_weight_assignment(&weights), vec![(1, 0)]);

        // One row, three columns.
        let weights = vec![vec![0.5, 3.0, 1.0]];
        assert_eq!(max_weight_assignment(&weights), vec![(0, 1)]);
    }

    #[test]
    fn zero_weight_pairs_are_dropped() {
        let weights = vec![vec![0.0, 0.0], vec![0.0, 7.0]];
        assert_eq!(max_weight_assignment(&weights), vec![(1, 1)]);
    }

    #[test]
    fn three_by_three_known_optimum() {
        let weights = vec![
            vec![7.0, 4.0, 3.0],
            vec![6.0, 8.0, 5.0],
            vec![9.0, 4.0, 4.0],
        ];
        // Exhaustive optimum: (0,2)+(1,1)+(2,0) = 3+8+9 = 20, beating
        // the diagonal 7+8+4 = 19.
        let pairs = max_weight_assignment(&weights);
        let total: f64 = pairs.iter().map(|&(i, j)| weights[i][j]).sum();
        assert_eq!(pairs, vec![(0, 2), (1, 1), (2, 0)]);
        assert!((total - 20.0).abs() < 1e-9);
    }
}
