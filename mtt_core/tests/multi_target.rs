//! Multi-target lifecycle: birth by candidate promotion, stable identities,
//! deletion of a vanished target while its neighbour survives.

use mtt_core::constants::COORDS_LEN;
use mtt_core::{Tracker, TrackerConfig};

fn coords(points: &[(f64, f64)]) -> Vec<f64> {
    let mut v = vec![0.0; COORDS_LEN];
    for (i, &(x, y)) in points.iter().enumerate() {
        v[2 * i] = x;
        v[2 * i + 1] = y;
    }
    v
}

fn live(out: &[f64; COORDS_LEN]) -> Vec<(f64, f64)> {
    out.chunks_exact(2)
        .filter(|p| p[0] != 0.0 || p[1] != 0.0)
        .map(|p| (p[0], p[1]))
        .collect()
}

#[test]
fn two_targets_full_lifecycle() {
    let mut tracker = Tracker::new(TrackerConfig {
        warmup_scans: 0,
        min_nti: 3,
        min_olgi: 4,
        scan_period: 0.01,
        ..Default::default()
    });

    let a = (3.0, 4.0);
    let b = (-6.0, 8.0);

    // Scan 1: bootstrap seeds the first track from target A.
    let out = tracker.process_scan(&coords(&[a]));
    assert_eq!(live(out).len(), 1);

    // Scans 2–4: target B appears; its candidate streak promotes on the
    // third sighting.
    for scan in 2..=4 {
        let out = tracker.process_scan(&coords(&[a, b]));
        let expect = if scan < 4 { 1 } else { 2 };
        assert_eq!(live(out).len(), expect, "wrong track count at scan {scan}");
    }

    // Both tracks are live with distinct, stable identifiers.
    let ids: Vec<_> = tracker.tracks().iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    // Scans 5–6: both targets persist; the id set must not change.
    for _ in 0..2 {
        tracker.process_scan(&coords(&[a, b]));
    }
    let ids_after: Vec<_> = tracker.tracks().iter().map(|t| t.id).collect();
    assert_eq!(ids, ids_after);
    let id_b = ids[1];

    // Target A vanishes. Its track coasts for min_olgi − 1 scans and is
    // removed on the fourth; B's track must survive with its id intact.
    for scan in 1..=3 {
        let out = tracker.process_scan(&coords(&[b]));
        assert_eq!(live(out).len(), 2, "A must coast at miss {scan}");
    }
    let out = tracker.process_scan(&coords(&[b]));
    let survivors = live(out);
    assert_eq!(survivors.len(), 1, "A's track must be pruned");
    assert_eq!(tracker.tracks().len(), 1);
    assert_eq!(tracker.tracks()[0].id, id_b);
    let (x, y) = survivors[0];
    assert!(((x - b.0).powi(2) + (y - b.1).powi(2)).sqrt() < 0.1);

    // No observation was ever dropped or rejected in this scenario.
    assert_eq!(tracker.dropped_observations, 0);
    assert_eq!(tracker.rejected_observations, 0);
}
