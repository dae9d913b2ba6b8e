//! Target trajectory models and state propagation.
//!
//! Each target has a true 2D state [px, py, vx, vy] in the radar frame
//! (transmitter at the origin, observed half-plane y > 0) and a
//! `MotionSpec` describing how it moves. The simulator steps each target
//! forward once per scan.

use serde::{Deserialize, Serialize};

/// Describes target motion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MotionSpec {
    /// Constant velocity: no acceleration.
    ConstantVelocity,
    /// Constant-turn-rate on the XY plane. `omega` = yaw rate (rad/s).
    ConstantTurn { omega: f64 },
    /// Segmented: switch motion model at given sim times.
    /// `segments` is sorted by time ascending: [(t_start, MotionSpec), ...].
    /// The active spec is the last one whose t_start <= current t.
    Segmented {
        segments: Vec<(f64, Box<MotionSpec>)>,
    },
}

/// A simulated target with ground-truth state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Target {
    /// Unique target ID (used for metrics)
    pub id: u64,
    /// True state [px, py, vx, vy]
    pub state: [f64; 4],
    /// Motion model for this target
    pub motion: MotionSpec,
    /// Optional: target disappears after this time
    pub disappear_at: Option<f64>,
    /// Optional: target appears after this time (no echo before)
    pub appear_at: Option<f64>,
}

impl Target {
    pub fn new(id: u64, pos: [f64; 2], vel: [f64; 2], motion: MotionSpec) -> Self {
        Self {
            id,
            state: [pos[0], pos[1], vel[0], vel[1]],
            motion,
            disappear_at: None,
            appear_at: None,
        }
    }

    /// Propagate true state by `dt` seconds according to the motion spec.
    pub fn step(&mut self, t: f64, dt: f64) {
        let s = &mut self.state;
        match &self.motion.clone() {
            MotionSpec::ConstantVelocity => {
                s[0] += s[2] * dt;
                s[1] += s[3] * dt;
            }
            MotionSpec::ConstantTurn { omega } => {
                let v = (s[2] * s[2] + s[3] * s[3]).sqrt();
                let heading = s[3].atan2(s[2]);
                let new_heading = heading + omega * dt;
                s[0] += v * heading.cos() * dt;
                s[1] += v * heading.sin() * dt;
                s[2] = v * new_heading.cos();
                s[3] = v * new_heading.sin();
            }
            MotionSpec::Segmented { segments } => {
                // Last segment whose start time <= t; CV before the first.
                let active = segments.iter().filter(|(t_start, _)| *t_start <= t).last();
                if let Some((_, spec)) = active {
                    let mut tmp = Target {
                        id: 0,
                        state: *s,
                        motion: *spec.clone(),
                        appear_at: None,
                        disappear_at: None,
                    };
                    tmp.step(t, dt);
                    *s = tmp.state;
                } else {
                    s[0] += s[2] * dt;
                    s[1] += s[3] * dt;
                }
            }
        }
    }

    /// True if the target is active at time `t`.
    pub fn is_active(&self, t: f64) -> bool {
        if let Some(appear) = self.appear_at {
            if t < appear {
                return false;
            }
        }
        if let Some(disappear) = self.disappear_at {
            if t >= disappear {
                return false;
            }
        }
        true
    }

    pub fn pos(&self) -> (f64, f64) {
        (self.state[0], self.state[1])
    }
}
