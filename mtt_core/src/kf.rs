//! Polar-state constant-velocity Kalman filter.
//!
//! ## State vector
//! Y = [r, ṙ, φ, φ̇]ᵀ — range, range rate, bearing, bearing rate.
//!
//! ## Transition model
//! r' = r + T·ṙ, φ' = φ + T·φ̇ (rates unchanged); T is the scan period.
//!
//! ## Observation model
//! H selects (r, φ) from the state. The innovation covariance is 2×2 and is
//! inverted in closed form; a near-zero determinant skips the update rather
//! than propagating garbage (no panics anywhere in the scan path).

use crate::constants::EPS;
use crate::types::{MeasCov, PolarState, StateCov};
use nalgebra::{Matrix2, Matrix2x4, Matrix4, Vector2};

/// Initial estimation covariance for a freshly seeded track.
pub fn initial_covariance() -> StateCov {
    Matrix4::from_diagonal(&nalgebra::Vector4::new(0.01, 0.01, 0.01, 0.01))
}

/// Observation matrix H selecting (r, φ).
pub fn observation_matrix() -> Matrix2x4<f64> {
    Matrix2x4::new(
        1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    )
}

/// Constant-velocity polar Kalman filter. Q and R are diagonal, fixed at
/// construction from the configured noise vectors.
#[derive(Clone, Debug)]
pub struct PolarKalman {
    /// State transition matrix A for the scan period.
    a: Matrix4<f64>,
    /// Process noise Q = diag(q).
    q: StateCov,
    /// Measurement noise R = diag(r).
    r: MeasCov,
}

impl PolarKalman {
    pub fn new(q: [f64; 4], r: [f64; 2], scan_period: f64) -> Self {
        let mut a = Matrix4::identity();
        a[(0, 1)] = scan_period;
        a[(2, 3)] = scan_period;
        Self {
            a,
            q: Matrix4::from_diagonal(&nalgebra::Vector4::new(q[0], q[1], q[2], q[3])),
            r: Matrix2::from_diagonal(&Vector2::new(r[0], r[1])),
        }
    }

    pub fn measurement_noise(&self) -> &MeasCov {
        &self.r
    }

    /// Predict one scan ahead: Y_p = A·Y_e, P_p = A·P_e·Aᵀ + Q.
    pub fn predict(&self, state: &PolarState, cov: &StateCov) -> (PolarState, StateCov) {
        let y_p = self.a * state;
        let p_p = self.a * cov * self.a.transpose() + self.q;
        (y_p, p_p)
    }

    /// Correct a prediction with the observation `z = (r, φ)`.
    ///
    /// K = P_p·Hᵀ·(H·P_p·Hᵀ + R)⁻¹ with the 2×2 inverse in closed form.
    /// Returns `None` when the innovation covariance is numerically singular;
    /// the caller keeps the prediction in that case.
    pub fn correct(
        &self,
        state: &PolarState,
        cov: &StateCov,
        z: Vector2<f64>,
    ) -> Option<(PolarState, StateCov)> {
        let h = observation_matrix();
        let s = h * cov * h.transpose() + self.r;
        let det = s[(0, 0)] * s[(1, 1)] - s[(0, 1)] * s[(1, 0)];
        if det.abs() < EPS {
            return None;
        }
        let s_inv = Matrix2::new(s[(1, 1)], -s[(0, 1)], -s[(1, 0)], s[(0, 0)]) / det;
        let k = cov * h.transpose() * s_inv;
        let innovation = z - h * state;
        let new_state = state + k * innovation;
        let new_cov = (Matrix4::identity() - k * h) * cov;
        Some((new_state, new_cov))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
