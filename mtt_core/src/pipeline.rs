//! Pipeline orchestrator: one radar unit's full chain from raw two-channel
//! impulse responses to tracked target positions.
//!
//! # Processing steps per scan
//! 1. Background subtraction per channel (exponential estimate)
//! 2. CFAR detection per channel
//! 3. Detection-run integration + point extraction into reflection marks
//! 4. Trace correlation into overlap records
//! 5. TOA coupling + two-ellipse triangulation into cartesian candidates
//! 6. Multi-target tracker (predict / gate / assign / correct / lifecycle)
//!
//! A host running several radars owns one `Pipeline` per unit; instances
//! share nothing. The stack manager may instead feed fused coordinates to a
//! bare [`Tracker`] via [`Pipeline::process_coords`].

use crate::constants::COORDS_LEN;
use crate::correlate::TraceCorrelator;
use crate::extract::{ExtractConfig, PointExtractor};
use crate::signal::{SignalConditioner, SignalConfig};
use crate::tracker::{Tracker, TrackerConfig};
use crate::triangulate::{chip_to_range, intersect_ellipses, toa_couple};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Full per-radar pipeline configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub signal: SignalConfig,
    pub extract: ExtractConfig,
    pub tracker: TrackerConfig,
    /// Receiver baseline spacing (m); receivers sit at ±baseline/2 around
    /// the transmitter.
    pub baseline: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            signal: SignalConfig::default(),
            extract: ExtractConfig::default(),
            tracker: TrackerConfig::default(),
            baseline: 0.4,
        }
    }
}

/// Result of one processed scan.
#[derive(Clone, Copy, Debug)]
pub struct ScanOutput {
    /// Interleaved x,y track positions, zero-padded.
    pub coords: [f64; COORDS_LEN],
    /// Interleaved x,y candidates handed to the tracker, zero-padded.
    /// Recorded so a scan can be replayed through a bare tracker later.
    pub candidates: [f64; COORDS_LEN],
    /// Cartesian candidates handed to the tracker this scan.
    pub n_candidates: usize,
    /// Active tracks after the scan.
    pub n_tracks: usize,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// One radar unit's processing chain. All working buffers are owned here
/// and reused scan to scan.
pub struct Pipeline {
    conditioner_a: SignalConditioner,
    conditioner_b: SignalConditioner,
    extractor: PointExtractor,
    correlator: TraceCorrelator,
    tracker: Tracker,
    /// Receiver abscissae on the baseline.
    x1: f64,
    x2: f64,
    /// Scratch: background-subtracted samples of the channel in flight.
    scratch: Vec<f64>,
    /// Scratch: interleaved candidate coordinates for the tracker.
    coords: [f64; COORDS_LEN],
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            conditioner_a: SignalConditioner::new(config.signal),
            conditioner_b: SignalConditioner::new(config.signal),
            extractor: PointExtractor::new(config.extract),
            correlator: TraceCorrelator::new(config.extract.half_width),
            tracker: Tracker::new(config.tracker),
            x1: -config.baseline / 2.0,
            x2: config.baseline / 2.0,
            scratch: Vec::new(),
            coords: [0.0; COORDS_LEN],
        }
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Process one scan's raw impulse responses (one buffer per receive
    /// channel) through the full chain.
    pub fn process_scan(&mut self, raw_a: &[f64], raw_b: &[f64]) -> ScanOutput {
        let marks_a = {
            self.scratch.clear();
            self.scratch
                .extend_from_slice(self.conditioner_a.background_subtract(raw_a));
            let det = self.conditioner_a.cfar_detect(&self.scratch);
            let integrated = self.extractor.integrate(det);
            self.extractor
                .extract_points(&integrated, crate::types::Channel::A)
        };
        let marks_b = {
            self.scratch.clear();
            self.scratch
                .extend_from_slice(self.conditioner_b.background_subtract(raw_b));
            let det = self.conditioner_b.cfar_detect(&self.scratch);
            let integrated = self.extractor.integrate(det);
            self.extractor
                .extract_points(&integrated, crate::types::Channel::B)
        };

        let records = self.correlator.correlate(&marks_a, &marks_b);
        let toa_pairs = toa_couple(&records, self.extractor.half_width());

        self.coords.fill(0.0);
        let mut n_candidates = 0;
        for toa in &toa_pairs {
            let d0 = chip_to_range(toa[0]);
            let d1 = chip_to_range(toa[1]);
            let (x, y) = intersect_ellipses(d0, d1, self.x1, self.x2);
            if x == 0.0 && y == 0.0 {
                tracing::debug!(toa_a = toa[0], toa_b = toa[1], "degenerate geometry, candidate discarded");
                continue;
            }
            self.coords[2 * n_candidates] = x;
            self.coords[2 * n_candidates + 1] = y;
            n_candidates += 1;
        }

        let candidates = self.coords;
        let output = self.tracker.process_scan(&candidates);
        ScanOutput {
            coords: *output,
            candidates,
            n_candidates,
            n_tracks: self.tracker.tracks().len(),
        }
    }

    /// Feed pre-extracted (or cross-radar fused) cartesian coordinates
    /// straight to the tracker, bypassing the signal front end.
    pub fn process_coords(&mut self, coords: &[f64]) -> ScanOutput {
        self.coords.fill(0.0);
        let n = coords.len().min(COORDS_LEN);
        self.coords[..n].copy_from_slice(&coords[..n]);
        let candidates = self.coords;
        let output = self.tracker.process_scan(&candidates);
        ScanOutput {
            coords: *output,
            candidates,
            n_candidates: candidates
                .chunks_exact(2)
                .filter(|p| p[0] != 0.0 || p[1] != 0.0)
                .count(),
            n_tracks: self.tracker.tracks().len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
