//! Signal conditioning: exponential background subtraction and adaptive
//! CFAR detection.
//!
//! Both stages are long-running adaptive filters. Their running state
//! (background estimate, fast/slow magnitude trackers, energy tracker) is
//! owned by the [`SignalConditioner`] instance and persists across scans.
//! One instance serves exactly one receive channel; instances must never be
//! shared across channels.

use crate::constants::{CFAR_SEED_CHIPS, GUARD_CHIPS, SCAN_LENGTH};
use serde::{Deserialize, Serialize};

/// Tuning for one channel's conditioner.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Background memory α ∈ (0, 1): bg' = (1−α)·s + α·bg.
    /// α = 0 disables background adaptation entirely (pass-through).
    pub alpha: f64,
    /// Fast magnitude tracker memory (short, follows the echo).
    pub beta_fast: f64,
    /// Slow magnitude tracker memory (long, follows the noise floor).
    pub beta_slow: f64,
    /// Detection threshold factor: detect iff X > α_det·√S² + Y.
    pub alpha_det: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            beta_fast: 0.4,
            beta_slow: 0.95,
            alpha_det: 3.0,
        }
    }
}

/// Per-channel signal conditioner with persistent adaptive state.
#[derive(Clone, Debug)]
pub struct SignalConditioner {
    config: SignalConfig,
    /// Exponential background estimate, one value per chip.
    background: Vec<f64>,
    /// Fast magnitude tracker X.
    fast: Vec<f64>,
    /// Slow magnitude tracker Y.
    slow: Vec<f64>,
    /// Energy tracker S².
    energy: Vec<f64>,
    /// Scratch output buffers, reused every scan.
    subtracted: Vec<f64>,
    detections: Vec<u8>,
    scans_seen: u64,
}

impl SignalConditioner {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            config,
            background: vec![0.0; SCAN_LENGTH],
            fast: vec![0.0; SCAN_LENGTH],
            slow: vec![0.0; SCAN_LENGTH],
            energy: vec![0.0; SCAN_LENGTH],
            subtracted: vec![0.0; SCAN_LENGTH],
            detections: vec![0; SCAN_LENGTH],
            scans_seen: 0,
        }
    }

    /// Subtract the running exponential background estimate from `samples`.
    /// The estimate is updated in place before subtraction:
    /// bg[n] = (1−α)·s[n] + α·bg_prev[n].
    pub fn background_subtract(&mut self, samples: &[f64]) -> &[f64] {
        let n = samples.len().min(SCAN_LENGTH);
        let alpha = self.config.alpha;
        if alpha == 0.0 {
            self.subtracted[..n].copy_from_slice(&samples[..n]);
            return &self.subtracted[..n];
        }
        for i in 0..n {
            self.background[i] = (1.0 - alpha) * samples[i] + alpha * self.background[i];
            self.subtracted[i] = samples[i] - self.background[i];
        }
        &self.subtracted[..n]
    }

    /// CFAR detection over one (background-subtracted) scan. Returns the
    /// binary detection vector: 1 where the fast tracker exceeds the
    /// adaptive threshold α_det·√S²[n] + Y[n].
    ///
    /// The first scan only seeds the trackers: X from the per-chip
    /// magnitude, Y and S² from the mean magnitude/energy of the first
    /// `CFAR_SEED_CHIPS` chips. The first `GUARD_CHIPS` chips are always
    /// forced to 0 (antenna crosstalk).
    pub fn cfar_detect(&mut self, samples: &[f64]) -> &[u8] {
        let n = samples.len().min(SCAN_LENGTH);
        self.detections[..n].fill(0);

        if self.scans_seen == 0 {
            self.seed(&samples[..n]);
            self.scans_seen = 1;
            return &self.detections[..n];
        }

        let bf = self.config.beta_fast;
        let bs = self.config.beta_slow;
        let ad = self.config.alpha_det;
        for i in 0..n {
            let mag = samples[i].abs();
            self.fast[i] = (1.0 - bf) * mag + bf * self.fast[i];

            // Test against the noise statistics carried over from previous
            // scans, then fold this scan in. Updating first would let a
            // strong echo raise its own threshold.
            if i >= GUARD_CHIPS && self.fast[i] > ad * self.energy[i].sqrt() + self.slow[i] {
                self.detections[i] = 1;
            }

            self.slow[i] = (1.0 - bs) * mag + bs * self.slow[i];
            self.energy[i] = (1.0 - bs) * samples[i] * samples[i] + bs * self.energy[i];
        }
        self.scans_seen += 1;
        &self.detections[..n]
    }

    fn seed(&mut self, samples: &[f64]) {
        let k = samples.len().min(CFAR_SEED_CHIPS).max(1);
        let mean_mag = samples[..k].iter().map(|s| s.abs()).sum::<f64>() / k as f64;
        let mean_energy = samples[..k].iter().map(|s| s * s).sum::<f64>() / k as f64;
        for i in 0..samples.len() {
            self.fast[i] = samples[i].abs();
            self.slow[i] = mean_mag;
            self.energy[i] = mean_energy;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn background_converges_to_static_scene() {
        let mut sc = SignalConditioner::new(SignalConfig {
            alpha: 0.8,
            ..Default::default()
        });
        let scene = vec![2.0; SCAN_LENGTH];
        let mut last = 0.0;
        for _ in 0..60 {
            let out = sc.background_subtract(&scene);
            last = out[100];
        }
        // Static returns vanish once the background has adapted.
        assert_abs_diff_eq!(last, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn alpha_zero_is_passthrough() {
        let mut sc = SignalConditioner::new(SignalConfig {
            alpha: 0.0,
            ..Default::default()
        });
        let scene: Vec<f64> = (0..SCAN_LENGTH).map(|i| i as f64 * 0.001).collect();
        let out = sc.background_subtract(&scene);
        assert_abs_diff_eq!(out[1234], scene[1234], epsilon = 0.0);
    }

    #[test]
    fn cfar_flags_a_new_echo() {
        let mut sc = SignalConditioner::new(SignalConfig::default());
        let quiet = vec![0.1; SCAN_LENGTH];
        // Seed scan plus a few quiet scans to settle the trackers.
        for _ in 0..5 {
            sc.cfar_detect(&quiet);
        }
        // An echo appears at chip 1000.
        let mut scan = quiet.clone();
        for i in 1000..1010 {
            scan[i] = 5.0;
        }
        let det = sc.cfar_detect(&scan).to_vec();
        assert!(det[1000..1010].iter().any(|&d| d == 1), "echo not detected");
        assert!(det[..500].iter().all(|&d| d == 0), "false alarms in noise");
    }

    #[test]
    fn cfar_guard_band_always_zero() {
        let mut sc = SignalConditioner::new(SignalConfig::default());
        let mut scan = vec![0.1; SCAN_LENGTH];
        for i in 0..GUARD_CHIPS {
            scan[i] = 100.0;
        }
        sc.cfar_detect(&scan);
        let det = sc.cfar_detect(&scan).to_vec();
        assert!(det[..GUARD_CHIPS].iter().all(|&d| d == 0));
    }

    #[test]
    fn first_scan_never_detects() {
        let mut sc = SignalConditioner::new(SignalConfig::default());
        let mut scan = vec![0.1; SCAN_LENGTH];
        scan[2000] = 50.0;
        let det = sc.cfar_detect(&scan);
        assert!(det.iter().all(|&d| d == 0), "seed scan must not detect");
    }
}
