//! Replay: serialize/deserialize per-scan candidate logs for offline
//! tracker runs.
//!
//! A replay log stores the cartesian candidates the front end produced
//! each scan (not the raw impulse responses), so a recorded run can be
//! re-fed to a bare tracker with different tuning.

use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A full recorded simulation log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayLog {
    pub scenario_name: String,
    pub seed: u64,
    /// Scan repetition period (s).
    pub scan_period: f64,
    /// All scans in chronological order.
    pub scans: Vec<ScanRecord>,
}

/// One scan: ground truth plus the candidates the front end extracted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanRecord {
    pub time: f64,
    pub truth: Vec<TargetState>,
    /// Interleaved x,y candidate coordinates, zero-padded.
    pub candidates: Vec<f64>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TargetState {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// Save a replay log to a JSON file.
pub fn save_replay(log: &ReplayLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}

/// Load a replay log from a JSON file.
pub fn load_replay(path: &Path) -> anyhow::Result<ReplayLog> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let log: ReplayLog = serde_json::from_reader(reader)?;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_round_trip() {
        let log = ReplayLog {
            scenario_name: "single_static".into(),
            seed: 42,
            scan_period: 0.1,
            scans: vec![ScanRecord {
                time: 0.1,
                truth: vec![TargetState {
                    id: 0,
                    x: 1.0,
                    y: 3.0,
                }],
                candidates: vec![1.02, 2.98, 0.0, 0.0],
            }],
        };
        let path = std::env::temp_dir().join("mtt_replay_round_trip.json");
        save_replay(&log, &path).unwrap();
        let loaded = load_replay(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.scenario_name, log.scenario_name);
        assert_eq!(loaded.seed, 42);
        assert_eq!(loaded.scans.len(), 1);
        assert_eq!(loaded.scans[0].truth[0].id, 0);
        assert_eq!(loaded.scans[0].candidates, log.scans[0].candidates);
    }
}
