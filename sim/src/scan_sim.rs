//! Raw scan synthesis.
//!
//! Generates the two receive channels' impulse responses for one scan:
//! - a flat noise floor with uniform jitter
//! - one rectangular echo per visible target, placed at the chip matching
//!   its bistatic path (Tx at the origin, Rx at ±baseline/2)
//! - miss probability (1 − P_D), drawn once per target so a fade affects
//!   both channels
//! - Poisson clutter pulses, drawn per channel so they stay uncorrelated
//!   between channels

use crate::target::Target;
use mtt_core::constants::{CHIP_LENGTH_M, SCAN_LENGTH};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Radar front-end parameters for scan synthesis.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RadarParams {
    /// Receiver spacing (m); receivers sit at ±baseline/2.
    pub baseline: f64,
    /// Echo pulse width (chips).
    pub pulse_width: usize,
    /// Echo amplitude over the floor.
    pub echo_amplitude: f64,
    /// Mean sample level with no echo present.
    pub noise_floor: f64,
    /// Uniform jitter half-width around the floor.
    pub noise_std: f64,
    /// Per-scan target detection probability.
    pub p_detection: f64,
    /// Mean clutter pulses per channel per scan.
    pub lambda_clutter: f64,
}

impl Default for RadarParams {
    fn default() -> Self {
        Self {
            baseline: 0.4,
            pulse_width: 6,
            echo_amplitude: 5.0,
            noise_floor: 0.1,
            noise_std: 0.02,
            p_detection: 0.95,
            lambda_clutter: 0.2,
        }
    }
}

/// Generates raw two-channel scans from a set of targets.
pub struct ScanSimulator {
    pub params: RadarParams,
    rng: ChaCha8Rng,
}

impl ScanSimulator {
    pub fn new(params: RadarParams, seed: u64) -> Self {
        Self {
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Synthesize one scan at simulation time `t`. Returns the channel A
    /// and channel B impulse responses.
    pub fn generate_scan(&mut self, targets: &[Target], t: f64) -> (Vec<f64>, Vec<f64>) {
        let p = self.params;
        let mut chan_a = self.noise_scan();
        let mut chan_b = self.noise_scan();

        let x1 = -p.baseline / 2.0;
        let x2 = p.baseline / 2.0;

        for target in targets {
            if !target.is_active(t) {
                continue;
            }
            if self.rng.gen::<f64>() > p.p_detection {
                continue;
            }
            let (tx, ty) = target.pos();
            let r = (tx * tx + ty * ty).sqrt();
            let ra = ((tx - x1) * (tx - x1) + ty * ty).sqrt();
            let rb = ((tx - x2) * (tx - x2) + ty * ty).sqrt();

            // ±20% amplitude jitter per echo, shared across channels.
            let amp = p.echo_amplitude * (0.8 + 0.4 * self.rng.gen::<f64>());
            add_pulse(&mut chan_a, path_to_chip(r + ra), p.pulse_width, amp);
            add_pulse(&mut chan_b, path_to_chip(r + rb), p.pulse_width, amp);
        }

        let n_a = self.poisson(p.lambda_clutter);
        let n_b = self.poisson(p.lambda_clutter);
        for _ in 0..n_a {
            let (chip, amp) = self.clutter_pulse();
            add_pulse(&mut chan_a, chip, p.pulse_width, amp);
        }
        for _ in 0..n_b {
            let (chip, amp) = self.clutter_pulse();
            add_pulse(&mut chan_b, chip, p.pulse_width, amp);
        }

        (chan_a, chan_b)
    }

    fn noise_scan(&mut self) -> Vec<f64> {
        let p = self.params;
        (0..SCAN_LENGTH)
            .map(|_| p.noise_floor + (self.rng.gen::<f64>() * 2.0 - 1.0) * p.noise_std)
            .collect()
    }

    fn clutter_pulse(&mut self) -> (usize, f64) {
        let p = self.params;
        let chip = self.rng.gen_range(0..SCAN_LENGTH - p.pulse_width);
        let amp = p.echo_amplitude * (0.5 + self.rng.gen::<f64>());
        (chip, amp)
    }

    /// Poisson sample by multiplying uniforms until the product drops
    /// below e^-lambda.
    fn poisson(&mut self, lambda: f64) -> usize {
        if lambda <= 0.0 {
            return 0;
        }
        let threshold = (-lambda).exp();
        let mut n = 0usize;
        let mut prod = self.rng.gen::<f64>();
        while prod > threshold && n < 50 {
            prod *= self.rng.gen::<f64>();
            n += 1;
        }
        n
    }
}

fn path_to_chip(path_m: f64) -> usize {
    (path_m / CHIP_LENGTH_M).round() as usize
}

fn add_pulse(scan: &mut [f64], chip: usize, width: usize, amplitude: f64) {
    for sample in scan.iter_mut().skip(chip).take(width) {
        *sample += amplitude;
    }
}
