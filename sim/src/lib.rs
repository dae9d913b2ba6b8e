//! `sim` — Scenario simulator: target trajectories, raw scan synthesis,
//! replay logs.

pub mod replay;
pub mod scan_sim;
pub mod scenarios;
pub mod target;

pub use replay::{load_replay, save_replay, ReplayLog, ScanRecord, TargetState};
pub use scan_sim::{RadarParams, ScanSimulator};
pub use scenarios::{Scenario, ScenarioKind};
pub use target::{MotionSpec, Target};
