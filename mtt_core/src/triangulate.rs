//! Triangulation: overlap records → per-receiver TOA chip indices →
//! bistatic ranges → cartesian candidate via two-ellipse intersection.
//!
//! Geometry: the transmitter sits at the origin, the receivers at `x1` and
//! `x2` on the baseline (y = 0). A TOA of `k` chips corresponds to a total
//! transmitter→target→receiver path of `k · CHIP_LENGTH_M`, i.e. an ellipse
//! with foci at the origin and the receiver. Two receivers give two ellipses;
//! their intersection in the upper half-plane is the candidate position.

use crate::constants::{CHIP_LENGTH_M, EPS, MIN_Y_M};
use crate::correlate::{OverlapRecord, Side};

/// Per-receiver TOA chip indices for one overlap record: `[A, B]`.
pub type ToaPair = [i64; 2];

/// Split each overlap record into the two receivers' TOA chip indices.
///
/// The TOAs straddle the centre by `±round(m − width/2)`, the sign chosen by
/// the side flag, with a `+1` parity correction on the trailing TOA when the
/// width is even (the true centre falls between chips).
pub fn toa_couple(records: &[OverlapRecord], half_width: usize) -> Vec<ToaPair> {
    let m = half_width as f64;
    records
        .iter()
        .map(|rec| {
            let delta = (m - rec.width as f64 / 2.0).round() as i64;
            let corr = if rec.width % 2 == 0 { 1 } else { 0 };
            let c = rec.center as i64;
            let near = (c - delta).max(0);
            let far = (c + delta + corr).max(0);
            match rec.side {
                Side::ChannelA | Side::Balanced => [near, far],
                Side::ChannelB => [far, near],
            }
        })
        .collect()
}

/// Chip index to bistatic path length (m).
pub fn chip_to_range(chip: i64) -> f64 {
    chip as f64 * CHIP_LENGTH_M
}

/// Intersect the two bistatic ellipses with total path lengths `d0`, `d1`
/// and receiver baseline abscissae `x1`, `x2`. Returns the candidate in the
/// upper half-plane, or `(0, 0)` when the geometry is degenerate
/// (near-collinear baseline, negative radicands, or |y| under `MIN_Y_M`).
pub fn intersect_ellipses(d0: f64, d1: f64, x1: f64, x2: f64) -> (f64, f64) {
    if d0 < EPS || d1 < EPS {
        return (0.0, 0.0);
    }
    let k1 = (d0 * d0 - x1 * x1) / 2.0;
    let k2 = (d1 * d1 - x2 * x2) / 2.0;
    let denom = x1 * d1 - x2 * d0;
    if denom.abs() < EPS {
        return (0.0, 0.0);
    }
    let x = -(k1 * d1 - k2 * d0) / denom;

    // Target range from the transmitter, via either ellipse; prefer the one
    // with a non-negative radicand.
    let r_a = (k1 + x * x1) / d0;
    let r_b = (k2 + x * x2) / d1;
    let radicand = [r_a * r_a - x * x, r_b * r_b - x * x]
        .into_iter()
        .find(|&rad| rad >= 0.0);
    let y = match radicand {
        Some(rad) => rad.sqrt(),
        None => return (0.0, 0.0),
    };
    if y.abs() < MIN_Y_M {
        return (0.0, 0.0);
    }
    (x, y)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
