//! `uwbtrack` CLI: batch scenario runs and replay of recorded candidate logs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use mtt_core::constants::COORDS_LEN;
use mtt_core::{Pipeline, PipelineConfig, Tracker, TrackerConfig};
use sim::replay::{load_replay, save_replay, ReplayLog, ScanRecord, TargetState};
use sim::scenarios::{Scenario, ScenarioKind};
use sim::ScanSimulator;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "uwbtrack", about = "Two-receiver UWB radar tracking CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a named scenario through the full pipeline and output metrics.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the per-scan candidate log
        #[arg(long)]
        save_replay: Option<PathBuf>,
    },
    /// Re-feed a recorded candidate log to a bare tracker.
    Replay {
        /// Path to replay JSON file
        input: PathBuf,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RunScenario {
            scenario,
            seed,
            output,
            save_replay: save_path,
        } => {
            run_scenario(scenario, seed, output.as_deref(), save_path.as_deref())?;
        }
        Commands::Replay { input, output } => {
            run_replay(&input, output.as_deref())?;
        }
    }

    Ok(())
}

/// Running sum of track-to-nearest-truth distances.
#[derive(Default)]
struct ErrorAccum {
    sum: f64,
    count: u64,
}

impl ErrorAccum {
    fn add_scan(&mut self, coords: &[f64; COORDS_LEN], truth: &[TargetState]) {
        if truth.is_empty() {
            return;
        }
        for pair in coords.chunks_exact(2) {
            let (x, y) = (pair[0], pair[1]);
            if x == 0.0 && y == 0.0 {
                continue;
            }
            let nearest = truth
                .iter()
                .map(|t| ((x - t.x).powi(2) + (y - t.y).powi(2)).sqrt())
                .fold(f64::INFINITY, f64::min);
            self.sum += nearest;
            self.count += 1;
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

fn run_scenario(
    kind: ScenarioKind,
    seed: u64,
    output_path: Option<&std::path::Path>,
    replay_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut scenario = Scenario::build(kind, seed);
    let mut scan_sim = ScanSimulator::new(scenario.radar, seed);
    let mut pipeline = Pipeline::new(PipelineConfig {
        baseline: scenario.radar.baseline,
        tracker: TrackerConfig {
            scan_period: scenario.scan_period,
            ..Default::default()
        },
        ..Default::default()
    });

    println!(
        "Running scenario '{}' (seed={}, duration={:.0}s)...",
        scenario.name, seed, scenario.duration
    );

    let start = std::time::Instant::now();
    let mut errors = ErrorAccum::default();
    let mut scans: Vec<ScanRecord> = Vec::new();
    let mut n_scans = 0u64;
    let mut time = 0.0f64;

    while time < scenario.duration {
        for target in &mut scenario.targets {
            target.step(time, scenario.scan_period);
        }
        time += scenario.scan_period;
        n_scans += 1;

        let (raw_a, raw_b) = scan_sim.generate_scan(&scenario.targets, time);
        let out = pipeline.process_scan(&raw_a, &raw_b);

        let truth: Vec<TargetState> = scenario
            .targets
            .iter()
            .filter(|t| t.is_active(time))
            .map(|t| TargetState {
                id: t.id,
                x: t.state[0],
                y: t.state[1],
            })
            .collect();
        errors.add_scan(&out.coords, &truth);

        if replay_path.is_some() {
            scans.push(ScanRecord {
                time,
                truth,
                candidates: out.candidates.to_vec(),
            });
        }
    }

    let elapsed = start.elapsed();
    let tracker = pipeline.tracker();
    println!(
        "Done: {} scans, {} tracks alive, mean error {:.3} m, elapsed={:.2}s",
        n_scans,
        tracker.tracks().len(),
        errors.mean(),
        elapsed.as_secs_f64(),
    );
    let births = tracker.track_births();
    let deaths = births - tracker.tracks().len() as u64;
    println!(
        "Lifecycle: {} births, {} deaths; {} dropped to capacity, {} rejected as invalid",
        births, deaths, tracker.dropped_observations, tracker.rejected_observations,
    );

    if let Some(rpath) = replay_path {
        let log = ReplayLog {
            scenario_name: scenario.name.clone(),
            seed,
            scan_period: scenario.scan_period,
            scans,
        };
        save_replay(&log, rpath)?;
        println!("Replay saved to {}", rpath.display());
    }

    if let Some(opath) = output_path {
        let json = serde_json::json!({
            "scenario": scenario.name,
            "seed": seed,
            "scans": n_scans,
            "elapsed_s": elapsed.as_secs_f64(),
            "mean_position_error_m": errors.mean(),
            "final_tracks": tracker.tracks().len(),
            "track_births": births,
            "track_deaths": deaths,
            "dropped_observations": tracker.dropped_observations,
            "rejected_observations": tracker.rejected_observations,
        });
        std::fs::write(opath, serde_json::to_string_pretty(&json)?)?;
        println!("Metrics saved to {}", opath.display());
    }

    Ok(())
}

fn run_replay(input: &std::path::Path, output_path: Option<&std::path::Path>) -> Result<()> {
    let log = load_replay(input)?;
    println!(
        "Replaying '{}' ({} scans)...",
        log.scenario_name,
        log.scans.len()
    );

    let mut tracker = Tracker::new(TrackerConfig {
        scan_period: log.scan_period,
        ..Default::default()
    });
    let start = std::time::Instant::now();
    let mut errors = ErrorAccum::default();

    for scan in &log.scans {
        let out = *tracker.process_scan(&scan.candidates);
        errors.add_scan(&out, &scan.truth);
    }

    let elapsed = start.elapsed();
    println!(
        "Replay done: {} tracks alive, mean error {:.3} m, elapsed={:.2}s",
        tracker.tracks().len(),
        errors.mean(),
        elapsed.as_secs_f64()
    );

    if let Some(opath) = output_path {
        let json = serde_json::json!({
            "scenario": log.scenario_name,
            "seed": log.seed,
            "elapsed_s": elapsed.as_secs_f64(),
            "mean_position_error_m": errors.mean(),
            "final_tracks": tracker.tracks().len(),
        });
        std::fs::write(opath, serde_json::to_string_pretty(&json)?)?;
    }

    Ok(())
}
