//! Track slots and the new-target candidate table.
//!
//! Track slots are compacted by swap-with-last on deletion, so the slot
//! index is not stable across scans. Each track therefore carries a
//! generation-tagged [`TrackId`] that downstream consumers can rely on
//! instead of the position in the output buffer.

use crate::kf::initial_covariance;
use crate::types::{Observation, PolarState, StateCov};
use nalgebra::Vector4;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Concurrent new-target candidate slots.
pub const CANDIDATE_SLOTS: usize = 3;

/// Stable, generation-tagged track identifier (monotonically increasing,
/// never reused).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// One active track: polar estimate, covariance, the prediction pair valid
/// for the current scan, and the observation-less gate counter.
#[derive(Clone, Debug)]
pub struct Track {
    pub id: TrackId,
    /// Estimated state Y_e = [r, ṙ, φ, φ̇]
    pub state: PolarState,
    /// Estimation covariance P_e
    pub cov: StateCov,
    /// Prediction pair (Y_p, P_p), recomputed every scan.
    pub predicted_state: PolarState,
    pub predicted_cov: StateCov,
    /// Consecutive scans without a gated observation (OLGI).
    pub olgi: u32,
}

impl Track {
    /// Seed a track from a single observation: zero rates, fixed initial
    /// covariance. Used at bootstrap and at candidate promotion alike.
    pub fn seed(id: TrackId, obs: Observation) -> Self {
        let state = Vector4::new(obs.r, 0.0, obs.phi, 0.0);
        let cov = initial_covariance();
        Self {
            id,
            state,
            cov,
            predicted_state: state,
            predicted_cov: cov,
            olgi: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// New-target identification (NTI)
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
struct CandidateSlot {
    /// Last qualifying observation (scan-to-scan proximity memory).
    obs: Observation,
    /// Consecutive qualifying scans.
    streak: u32,
    /// Seen this scan; untouched slots are cleared at scan end.
    touched: bool,
}

/// The ≤3-slot candidate table turning repeated unexplained observations
/// into new tracks.
#[derive(Clone, Debug)]
pub struct NewTargetTable {
    slots: [Option<CandidateSlot>; CANDIDATE_SLOTS],
    dif_d: f64,
    dif_fi: f64,
    min_nti: u32,
}

impl NewTargetTable {
    pub fn new(dif_d: f64, dif_fi: f64, min_nti: u32) -> Self {
        Self {
            slots: [None; CANDIDATE_SLOTS],
            dif_d,
            dif_fi,
            min_nti,
        }
    }

    /// Start of a scan: forget which slots were touched.
    pub fn begin_scan(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.touched = false;
        }
    }

    /// Offer an observation that matched no track gate. Returns the
    /// observation back when its slot's streak reaches `min_nti`, i.e. the
    /// caller must promote it to a track this scan; the slot is freed.
    pub fn offer(&mut self, obs: Observation) -> Option<Observation> {
        // Proximity test against an existing slot's last observation.
        for i in 0..CANDIDATE_SLOTS {
            let Some(slot) = &mut self.slots[i] else {
                continue;
            };
            if !slot.touched
                && (obs.r - slot.obs.r).abs() <= self.dif_d
                && (obs.phi - slot.obs.phi).abs() <= self.dif_fi
            {
                slot.streak += 1;
                slot.obs = obs;
                slot.touched = true;
                if slot.streak >= self.min_nti {
                    self.slots[i] = None;
                    return Some(obs);
                }
                return None;
            }
        }

        // No match: occupy the first empty slot, if any.
        if let Some(empty) = self.slots.iter_mut().find(|s| s.is_none()) {
            if self.min_nti <= 1 {
                return Some(obs);
            }
            *empty = Some(CandidateSlot {
                obs,
                streak: 1,
                touched: true,
            });
        }
        None
    }

    /// End of a scan: candidates not re-observed lose their streak entirely.
    pub fn end_scan(&mut self) {
        for slot in self.slots.iter_mut() {
            if matches!(slot, Some(s) if !s.touched) {
                *slot = None;
            }
        }
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
