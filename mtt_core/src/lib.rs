//! `mtt_core` — Multi-target tracking pipeline for a two-receiver UWB radar.
//!
//! # Module layout
//! - [`constants`]   — Scan geometry and hardware timing constants
//! - [`types`]       — Fundamental types (observations, channels, track IDs)
//! - [`signal`]      — Background subtraction + CFAR detection per channel
//! - [`extract`]     — Detection-run integration and point extraction
//! - [`correlate`]   — Two-channel trace correlation into overlap records
//! - [`triangulate`] — TOA coupling and two-ellipse position solving
//! - [`kf`]          — Polar-state constant-velocity Kalman filter
//! - [`gating`]      — 3σ residual gate and assignment cost
//! - [`munkres`]     — Kuhn-Munkres optimal assignment
//! - [`track`]       — Track slots and new-target candidate table
//! - [`tracker`]     — Per-scan predict / gate / assign / correct state machine
//! - [`pipeline`]    — Full per-radar orchestrator (raw scans → track positions)

pub mod constants;
pub mod correlate;
pub mod extract;
pub mod gating;
pub mod kf;
pub mod munkres;
pub mod pipeline;
pub mod signal;
pub mod track;
pub mod tracker;
pub mod triangulate;
pub mod types;

pub use pipeline::{Pipeline, PipelineConfig, ScanOutput};
pub use track::{Track, TrackId};
pub use tracker::{Tracker, TrackerConfig};
pub use types::{Channel, Observation};
