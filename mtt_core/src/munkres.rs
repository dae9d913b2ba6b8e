//! Kuhn-Munkres optimal assignment (Jonker-Volgenant style O(n³) potentials
//! formulation) on a square cost matrix.
//!
//! The tracker pads its (tracks × observations) cost matrix to a square with
//! the gate sentinel; rows/columns assigned to padding are simply unmatched.

/// Solve the assignment problem on a row-major square `n×n` cost matrix.
/// Returns `assignment[row] = column` minimizing the total cost.
pub fn munkres_solve(cost: &[f64], n: usize) -> Vec<usize> {
    debug_assert_eq!(cost.len(), n * n);
    if n == 0 {
        return Vec::new();
    }

    // Row (u) and column (v) potentials; p[j] = row assigned to column j,
    // 1-indexed with 0 meaning unassigned; way[j] = previous column on the
    // augmenting path.
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=n {
                if !used[j] {
                    let val = cost[(i0 - 1) * n + (j - 1)] - u[i0] - v[j];
                    if val < minv[j] {
                        minv[j] = val;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
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

        // Augment along the alternating path.
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n {
        if p[j] != 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn total(cost: &[f64], n: usize, assignment: &[usize]) -> f64 {
        assignment
            .iter()
            .enumerate()
            .map(|(r, &c)| cost[r * n + c])
            .sum()
    }

    /// Minimal total cost over all n! permutations.
    fn brute_force(cost: &[f64], n: usize) -> f64 {
        fn permute(cols: &mut Vec<usize>, k: usize, cost: &[f64], n: usize, best: &mut f64) {
            if k == n {
                let sum: f64 = cols.iter().enumerate().map(|(r, &c)| cost[r * n + c]).sum();
                if sum < *best {
                    *best = sum;
                }
                return;
            }
            for i in k..n {
                cols.swap(k, i);
                permute(cols, k + 1, cost, n, best);
                cols.swap(k, i);
            }
        }
        let mut cols: Vec<usize> = (0..n).collect();
        let mut best = f64::INFINITY;
        permute(&mut cols, 0, cost, n, &mut best);
        best
    }

    #[test]
    fn known_3x3() {
        let cost = vec![4.0, 1.0, 3.0, 2.0, 0.0, 5.0, 3.0, 2.0, 2.0];
        let a = munkres_solve(&cost, 3);
        assert!((total(&cost, 3, &a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn matches_brute_force_up_to_4x4() {
        // Deterministic pseudo-random matrices via a tiny LCG.
        let mut seed = 0x2545_f491u64;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) % 1000) as f64 / 10.0
        };
        for n in 2..=4usize {
            for _ in 0..20 {
                let cost: Vec<f64> = (0..n * n).map(|_| next()).collect();
                let a = munkres_solve(&cost, n);
                // Valid permutation
                let mut seen = vec![false; n];
                for &c in &a {
                    assert!(!seen[c], "column assigned twice");
                    seen[c] = true;
                }
                let expect = brute_force(&cost, n);
                assert!(
                    (total(&cost, n, &a) - expect).abs() < 1e-9,
                    "suboptimal assignment for n={n}"
                );
            }
        }
    }

    #[test]
    fn one_by_one() {
        assert_eq!(munkres_solve(&[7.0], 1), vec![0]);
    }

    #[test]
    fn empty_matrix() {
        assert!(munkres_solve(&[], 0).is_empty());
    }
}
