//! Statistical gating: the 3σ residual test admitting an observation into a
//! track's predicted uncertainty region, and the assignment cost for pairs
//! that pass.
//!
//! # Gating criterion
//! Both residuals must hold simultaneously:
//! |r_obs − r_pred| ≤ 3·σ_r with σ_r = √(R_rr + P_p[0][0])
//! |φ_obs − φ_pred| ≤ 3·σ_φ with σ_φ = √(R_φφ + P_p[2][2])
//!
//! On a pass the cost is the Mahalanobis form νᵀ·S⁻¹·ν over the (r, φ)
//! sub-block; on a fail it is [`COST_SENTINEL`].

use crate::constants::EPS;
use crate::types::{MeasCov, PolarState, StateCov};

/// Cost assigned to gate-failed pairs; large enough that Munkres only picks
/// them when a row/column has no gated alternative.
pub const COST_SENTINEL: f64 = 1.0e6;

/// Gate decision and assignment cost for one (observation, track) pair.
#[derive(Clone, Copy, Debug)]
pub struct GateResult {
    pub passes: bool,
    pub cost: f64,
}

/// Apply the 3σ gate of observation `(r_obs, phi_obs)` against a track's
/// prediction pair.
pub fn residual_gate(
    y_p: &PolarState,
    p_p: &StateCov,
    r_noise: &MeasCov,
    r_obs: f64,
    phi_obs: f64,
) -> GateResult {
    let dr = (r_obs - y_p[0]).abs();
    let dphi = (phi_obs - y_p[2]).abs();
    let sigma_r = (r_noise[(0, 0)] + p_p[(0, 0)]).sqrt();
    let sigma_phi = (r_noise[(1, 1)] + p_p[(2, 2)]).sqrt();

    if dr > 3.0 * sigma_r || dphi > 3.0 * sigma_phi {
        return GateResult {
            passes: false,
            cost: COST_SENTINEL,
        };
    }

    // Mahalanobis cost over the (r, φ) innovation covariance sub-block.
    let s00 = p_p[(0, 0)] + r_noise[(0, 0)];
    let s01 = p_p[(0, 2)];
    let s10 = p_p[(2, 0)];
    let s11 = p_p[(2, 2)] + r_noise[(1, 1)];
    let det = s00 * s11 - s01 * s10;
    let cost = if det.abs() < EPS {
        // Degenerate sub-block: fall back to the plain squared residual.
        dr * dr + dphi * dphi
    } else {
        let nu_r = r_obs - y_p[0];
        let nu_phi = phi_obs - y_p[2];
        (s11 * nu_r * nu_r - (s01 + s10) * nu_r * nu_phi + s00 * nu_phi * nu_phi) / det
    };

    GateResult { passes: true, cost }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix2, Matrix4, Vector2, Vector4};

    fn setup() -> (PolarState, StateCov, MeasCov) {
        let y_p = Vector4::new(5.0, 0.0, 0.9, 0.0);
        let p_p = Matrix4::from_diagonal(&Vector4::new(0.02, 0.01, 0.005, 0.0001));
        let r = Matrix2::from_diagonal(&Vector2::new(0.1, 0.01));
        (y_p, p_p, r)
    }

    #[test]
    fn passes_iff_both_residuals_within_3_sigma() {
        let (y_p, p_p, r) = setup();
        let sigma_r = (0.1f64 + 0.02).sqrt();
        let sigma_phi = (0.01f64 + 0.005).sqrt();

        // Just inside both bounds.
        let res = residual_gate(
            &y_p,
            &p_p,
            &r,
            5.0 + 2.99 * sigma_r,
            0.9 + 2.99 * sigma_phi,
        );
        assert!(res.passes);
        assert!(res.cost < COST_SENTINEL);

        // Range residual pushed past 3σ: the gate must flip.
        let res = residual_gate(&y_p, &p_p, &r, 5.0 + 3.01 * sigma_r, 0.9);
        assert!(!res.passes);
        assert_eq!(res.cost, COST_SENTINEL);

        // Bearing residual pushed past 3σ: same.
        let res = residual_gate(&y_p, &p_p, &r, 5.0, 0.9 + 3.01 * sigma_phi);
        assert!(!res.passes);
    }

    #[test]
    fn cost_grows_with_residual() {
        let (y_p, p_p, r) = setup();
        let near = residual_gate(&y_p, &p_p, &r, 5.01, 0.9).cost;
        let far = residual_gate(&y_p, &p_p, &r, 5.5, 0.9).cost;
        assert!(near < far);
    }

    #[test]
    fn zero_residual_zero_cost() {
        let (y_p, p_p, r) = setup();
        let res = residual_gate(&y_p, &p_p, &r, 5.0, 0.9);
        assert!(res.passes);
        assert!(res.cost.abs() < 1e-12);
    }
}
