//! The multi-target tracker: an explicit state machine consuming one scan's
//! cartesian observations per call and maintaining persistent track
//! estimates across scans.
//!
//! # Per-scan steady-state cycle
//! 1. Convert non-zero cartesian detections to polar observations (invalid
//!    candidates rejected, capacity capped)
//! 2. Re-seed a first track if all tracks were previously pruned
//! 3. Predict every track one scan period ahead
//! 4. Gate every (observation, track) pair (3σ residual test + cost)
//! 5. Munkres assignment, intersected with the gate mask; fall back to the
//!    raw gate mask when the intersection is empty but the mask is not
//! 6. Kalman-correct matched tracks, age and prune unmatched ones
//!    (swap-with-last compaction)
//! 7. New-target identification over observations no gate explained
//! 8. Emit the fixed-capacity interleaved cartesian output buffer
//!
//! Calls must be serialized per instance; independent instances may run on
//! separate radars concurrently.

use crate::constants::{scan_period, COORDS_LEN, MAX_TARGETS};
use crate::gating::{residual_gate, COST_SENTINEL};
use crate::kf::PolarKalman;
use crate::munkres::munkres_solve;
use crate::track::{NewTargetTable, Track, TrackId};
use crate::types::{polar_to_cartesian, Observation};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Tracker tuning, supplied by the settings collaborator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Process noise diagonal q for [r, ṙ, φ, φ̇].
    pub q: [f64; 4],
    /// Measurement noise diagonal r for (r, φ).
    pub r: [f64; 2],
    /// New-target range proximity tolerance (m).
    pub dif_d: f64,
    /// New-target bearing proximity tolerance (rad).
    pub dif_fi: f64,
    /// Scans without a gated observation before a track is removed.
    pub min_olgi: u32,
    /// Consecutive candidate sightings before a track is born.
    pub min_nti: u32,
    /// Initial scans discarded for sensor warm-up.
    pub warmup_scans: u32,
    /// Scan repetition period T (s).
    pub scan_period: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            q: [0.0, 0.01, 0.0, 0.0001],
            r: [0.1, 0.01],
            dif_d: 1.0,
            dif_fi: 0.6,
            min_olgi: 10,
            min_nti: 10,
            warmup_scans: 3,
            scan_period: scan_period(),
        }
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Explicit tracker lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Discarding initial scans (sensor warm-up).
    Warmup { remaining: u32 },
    /// Waiting for the first non-empty scan to seed the first track.
    Bootstrap,
    /// Steady state, re-entered every scan thereafter.
    Steady,
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Stateful multi-target tracker for one radar unit.
pub struct Tracker {
    config: TrackerConfig,
    kf: PolarKalman,
    phase: Phase,
    tracks: Vec<Track>,
    candidates: NewTargetTable,
    next_id: u64,
    output: [f64; COORDS_LEN],
    /// Valid observations dropped to the `MAX_TARGETS` cap (observability).
    pub dropped_observations: u64,
    /// Non-finite / y = 0 candidates rejected before use.
    pub rejected_observations: u64,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        let kf = PolarKalman::new(config.q, config.r, config.scan_period);
        let phase = if config.warmup_scans > 0 {
            Phase::Warmup {
                remaining: config.warmup_scans,
            }
        } else {
            Phase::Bootstrap
        };
        Self {
            kf,
            phase,
            tracks: Vec::with_capacity(MAX_TARGETS),
            candidates: NewTargetTable::new(config.dif_d, config.dif_fi, config.min_nti),
            next_id: 0,
            output: [0.0; COORDS_LEN],
            dropped_observations: 0,
            rejected_observations: 0,
            config,
        }
    }

    /// Active tracks after the last processed scan.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Tracks seeded since construction (ids are never reused, so this is
    /// also the next id to be assigned).
    pub fn track_births(&self) -> u64 {
        self.next_id
    }

    /// Process one scan's interleaved cartesian detections (x0,y0,x1,y1,…,
    /// zero-padded). Returns the interleaved, zero-padded track positions.
    pub fn process_scan(&mut self, coords: &[f64]) -> &[f64; COORDS_LEN] {
        let observations = self.collect_observations(coords);

        self.phase = match self.phase {
            Phase::Warmup { remaining } => {
                self.output.fill(0.0);
                if remaining > 1 {
                    Phase::Warmup {
                        remaining: remaining - 1,
                    }
                } else {
                    Phase::Bootstrap
                }
            }
            Phase::Bootstrap => {
                if let Some(&first) = observations.first() {
                    self.seed_track(first);
                    self.emit();
                    Phase::Steady
                } else {
                    self.output.fill(0.0);
                    Phase::Bootstrap
                }
            }
            Phase::Steady => {
                self.steady_scan(&observations);
                self.emit();
                Phase::Steady
            }
        };

        &self.output
    }

    // -----------------------------------------------------------------
    // Steady state
    // -----------------------------------------------------------------

    fn steady_scan(&mut self, observations: &[Observation]) {
        // All tracks pruned earlier: re-seed from the first observation and
        // run the scan normally; the fresh track trivially gates its seed.
        if self.tracks.is_empty() {
            if let Some(&first) = observations.first() {
                self.seed_track(first);
            }
        }

        let n_tracks = self.tracks.len();
        let n_obs = observations.len();

        // Predict every track to this scan.
        for track in &mut self.tracks {
            let (y_p, p_p) = self.kf.predict(&track.state, &track.cov);
            track.predicted_state = y_p;
            track.predicted_cov = p_p;
        }

        // Gate mask and cost matrix over (track, observation) pairs.
        let mut gate = [[false; MAX_TARGETS]; MAX_TARGETS];
        let mut cost = [[COST_SENTINEL; MAX_TARGETS]; MAX_TARGETS];
        for (ti, track) in self.tracks.iter().enumerate() {
            for (oi, obs) in observations.iter().enumerate() {
                let res = residual_gate(
                    &track.predicted_state,
                    &track.predicted_cov,
                    self.kf.measurement_noise(),
                    obs.r,
                    obs.phi,
                );
                gate[ti][oi] = res.passes;
                cost[ti][oi] = res.cost;
            }
        }

        // Munkres on the square-padded cost matrix, intersected with the
        // gate mask.
        let matches = self.assign(&gate, &cost, n_tracks, n_obs);

        // Correct matched tracks, age the rest.
        let mut matched_track = [false; MAX_TARGETS];
        let mut gated_obs = [false; MAX_TARGETS];
        for oi in 0..n_obs {
            gated_obs[oi] = (0..n_tracks).any(|ti| gate[ti][oi]);
        }
        for &(ti, oi) in &matches {
            matched_track[ti] = true;
            let track = &mut self.tracks[ti];
            let z = Vector2::new(observations[oi].r, observations[oi].phi);
            match self
                .kf
                .correct(&track.predicted_state, &track.predicted_cov, z)
            {
                Some((y_e, p_e)) => {
                    track.state = y_e;
                    track.cov = p_e;
                }
                None => {
                    // Singular innovation: keep the prediction.
                    track.state = track.predicted_state;
                    track.cov = track.predicted_cov;
                }
            }
            track.olgi = 0;
        }
        for (ti, track) in self.tracks.iter_mut().enumerate() {
            if !matched_track[ti] {
                track.state = track.predicted_state;
                track.cov = track.predicted_cov;
                track.olgi += 1;
            }
        }

        // Prune dead tracks; swap-with-last keeps the pool compact.
        let min_olgi = self.config.min_olgi;
        let mut i = 0;
        while i < self.tracks.len() {
            if self.tracks[i].olgi >= min_olgi {
                let dead = self.tracks.swap_remove(i);
                debug!(track = %dead.id, olgi = dead.olgi, "track removed");
            } else {
                i += 1;
            }
        }

        // New-target identification over observations no gate explained.
        self.candidates.begin_scan();
        for oi in 0..n_obs {
            if gated_obs[oi] {
                continue;
            }
            if let Some(obs) = self.candidates.offer(observations[oi]) {
                if self.tracks.len() < MAX_TARGETS {
                    self.seed_track(obs);
                }
            }
        }
        self.candidates.end_scan();
    }

    /// Intersect the Munkres assignment with the gate mask. When the
    /// intersection is empty but the mask is not (a degenerate cost matrix
    /// can make Munkres match only gated-out pairs), fall back to a
    /// first-fit pass over the raw gate mask.
    fn assign(
        &self,
        gate: &[[bool; MAX_TARGETS]; MAX_TARGETS],
        cost: &[[f64; MAX_TARGETS]; MAX_TARGETS],
        n_tracks: usize,
        n_obs: usize,
    ) -> Vec<(usize, usize)> {
        let n = n_tracks.max(n_obs);
        if n == 0 {
            return Vec::new();
        }

        let mut square = vec![COST_SENTINEL; n * n];
        for ti in 0..n_tracks {
            square[ti * n..ti * n + n_obs].copy_from_slice(&cost[ti][..n_obs]);
        }
        let assignment = munkres_solve(&square, n);

        let mut matches: Vec<(usize, usize)> = assignment
            .iter()
            .enumerate()
            .take(n_tracks)
            .filter(|&(ti, &oi)| oi < n_obs && gate[ti][oi])
            .map(|(ti, &oi)| (ti, oi))
            .collect();

        if matches.is_empty() {
            let any_gated = (0..n_tracks).any(|ti| (0..n_obs).any(|oi| gate[ti][oi]));
            if any_gated {
                let mut obs_taken = [false; MAX_TARGETS];
                for ti in 0..n_tracks {
                    if let Some(oi) = (0..n_obs).find(|&oi| gate[ti][oi] && !obs_taken[oi]) {
                        obs_taken[oi] = true;
                        matches.push((ti, oi));
                    }
                }
            }
        }
        matches
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    fn collect_observations(&mut self, coords: &[f64]) -> Vec<Observation> {
        let mut observations = Vec::with_capacity(MAX_TARGETS);
        for pair in coords.chunks_exact(2) {
            let (x, y) = (pair[0], pair[1]);
            if x == 0.0 && y == 0.0 {
                // Zero padding, not a detection.
                continue;
            }
            match Observation::from_cartesian(x, y) {
                Some(obs) if observations.len() < MAX_TARGETS => observations.push(obs),
                Some(_) => self.dropped_observations += 1,
                None => self.rejected_observations += 1,
            }
        }
        observations
    }

    fn seed_track(&mut self, obs: Observation) {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        self.tracks.push(Track::seed(id, obs));
        debug!(track = %id, r = obs.r, phi = obs.phi, "track seeded");
    }

    fn emit(&mut self) {
        self.output.fill(0.0);
        for (i, track) in self.tracks.iter().enumerate().take(MAX_TARGETS) {
            let (x, y) = polar_to_cartesian(&track.state);
            self.output[2 * i] = x;
            self.output[2 * i + 1] = y;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
