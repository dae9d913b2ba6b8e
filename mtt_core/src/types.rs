//! Fundamental types shared across the pipeline.

use nalgebra::{Matrix2, Matrix4, Vector4};
use serde::{Deserialize, Serialize};

/// 4-component polar track state: [r, ṙ, φ, φ̇]
pub type PolarState = Vector4<f64>;

/// 4×4 state covariance matrix
pub type StateCov = Matrix4<f64>;

/// 2×2 measurement noise / innovation covariance
pub type MeasCov = Matrix2<f64>;

// ---------------------------------------------------------------------------
// Receive channels
// ---------------------------------------------------------------------------

/// One of the two receive channels. The mark value doubles as the additive
/// tag used by the trace correlator (A=1, B=2, A+B=3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    A,
    B,
}

impl Channel {
    /// Additive mark value for this channel's reflection marks.
    pub fn mark(self) -> u8 {
        match self {
            Channel::A => 1,
            Channel::B => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// A polar observation Z = (r, φ) derived from one cartesian candidate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Range (m)
    pub r: f64,
    /// Bearing (rad), sign(y)·acos(x/r)
    pub phi: f64,
}

impl Observation {
    /// Convert a cartesian candidate to polar. Returns `None` for candidates
    /// the tracker must reject: non-finite components or y == 0 (the
    /// upstream triangulation failure sentinel is the origin, which has y=0).
    pub fn from_cartesian(x: f64, y: f64) -> Option<Self> {
        if !x.is_finite() || !y.is_finite() || y == 0.0 {
            return None;
        }
        let r = (x * x + y * y).sqrt();
        let phi = y.signum() * (x / r).clamp(-1.0, 1.0).acos();
        Some(Self { r, phi })
    }

    /// Back to cartesian (x, y).
    pub fn to_cartesian(self) -> (f64, f64) {
        (self.r * self.phi.cos(), self.r * self.phi.sin())
    }
}

/// Cartesian position of a polar track state (uses the r and φ components).
pub fn polar_to_cartesian(state: &PolarState) -> (f64, f64) {
    (state[0] * state[2].cos(), state[0] * state[2].sin())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
