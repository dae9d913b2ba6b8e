//! Trace correlation: merge the two channel-tagged mark vectors and decide
//! which chip pairs between the receivers belong to the same physical
//! reflection.
//!
//! The combined trace is T[n] = mark_A[n] + mark_B[n] ∈ {0, 1, 2, 3}
//! (3 = both channels cover chip n). One forward pass inspects a
//! `2m+1`-wide window at every positive trace position and classifies it:
//!
//! - **equal boundary values** — fully overlapped (both bounds 3) or an
//!   isolated single-channel reflection, resolved against the previous
//!   scan's centre list;
//! - **covering** — the window tail is a 3-run while the start is not: the
//!   overlap centre is placed inside the covered part, followed by a peek
//!   for a chained (connected) overlap right after the window;
//! - **irregular** — anything else: if a 3-run exists inside the window its
//!   mean boundary position is taken, with a parity-derived side flag.
//!
//! There is no backtracking. Capacity exhaustion (more than `MAX_TARGETS`
//! records) forces the cursor to the end of the scan: stop early, keep what
//! was found.
//!
//! The integer offset arithmetic below matches the fielded processing
//! chain, including its `+1` corrections; boundary tests pin the exact
//! values.

use crate::constants::MAX_TARGETS;
use serde::{Deserialize, Serialize};

/// Which receiver's raw edge the overlap centre favours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Symmetric overlap, no receiver favoured (flag 0).
    Balanced,
    /// Channel A's edge leads (flag 1).
    ChannelA,
    /// Channel B's edge leads (flag 2).
    ChannelB,
}

impl Side {
    fn from_mark(mark: u8) -> Side {
        match mark {
            1 => Side::ChannelA,
            2 => Side::ChannelB,
            _ => Side::Balanced,
        }
    }
}

/// One correlated reflection pair: aligned chip centre, overlap width and
/// the side flag disambiguating the TOA split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapRecord {
    pub center: usize,
    pub width: usize,
    pub side: Side,
}

/// Single-pass correlator. Keeps the previous scan's centre list to resolve
/// reflections visible to only one receiver.
#[derive(Clone, Debug, Default)]
pub struct TraceCorrelator {
    /// Mark half-width m (must match the extractor's).
    half_width: usize,
    /// Overlap centres emitted for the previous scan.
    prev_centers: Vec<usize>,
}

impl TraceCorrelator {
    pub fn new(half_width: usize) -> Self {
        Self {
            half_width,
            prev_centers: Vec::new(),
        }
    }

    /// Correlate one scan's mark vectors into at most `MAX_TARGETS` overlap
    /// records. Both inputs must have the same length.
    pub fn correlate(&mut self, mark_a: &[u8], mark_b: &[u8]) -> Vec<OverlapRecord> {
        let n = mark_a.len().min(mark_b.len());
        let m = self.half_width;
        let w = 2 * m;
        let t = |i: usize| mark_a[i] + mark_b[i];

        let mut records: Vec<OverlapRecord> = Vec::with_capacity(MAX_TARGETS);
        let mut ch = 0usize;

        while ch < n {
            if t(ch) == 0 {
                ch += 1;
                continue;
            }
            if records.len() == MAX_TARGETS {
                // Capacity exhausted: cursor to end of scan.
                break;
            }
            if ch + w >= n {
                break;
            }
            let end = ch + w;

            if t(ch) == t(end) {
                if t(ch) == 3 {
                    // Fully overlapped reflection: both edges aligned.
                    records.push(OverlapRecord {
                        center: ch + m,
                        width: w + 1,
                        side: Side::Balanced,
                    });
                    ch = end + 1;
                    self.connected_reflection(&t, n, &mut ch, &mut records);
                } else if let Some((s3, e3)) = find_cover_run(&t, ch, end) {
                    // Equal single-channel bounds with an interior 3-run:
                    // partial overlap clipped on both sides by the same
                    // channel. Mean boundary position + parity side.
                    records.push(irregular_record(s3, e3, t(ch)));
                    ch = end + 1;
                } else {
                    // Isolated single-channel reflection: pair it with a
                    // previous-scan centre falling inside the window, if any.
                    let side = Side::from_mark(t(ch));
                    if let Some(&p) = self
                        .prev_centers
                        .iter()
                        .find(|&&p| p >= ch && p <= end)
                    {
                        records.push(OverlapRecord {
                            center: p,
                            width: 0,
                            side,
                        });
                    }
                    ch = end + 1;
                }
            } else if t(end) == 3 {
                // Covering: the window tail is overlapped, the start is one
                // channel alone. Locate the first covered chip.
                let cover_b = (ch..=end).find(|&i| t(i) == 3).unwrap_or(end);
                let center = cover_b + (w - (cover_b - ch) + 1) / 2;
                records.push(OverlapRecord {
                    center,
                    width: end - cover_b + 1,
                    side: Side::from_mark(t(ch)),
                });
                ch = end + 1;
                self.connected_reflection(&t, n, &mut ch, &mut records);
            } else {
                // Irregular width, possibly no overlap at all.
                if let Some((s3, e3)) = find_cover_run(&t, ch, end) {
                    records.push(irregular_record(s3, e3, t(ch)));
                    ch = end + 1;
                } else {
                    // Pure single-channel block with nothing to pair against
                    // the window bounds: advance past it.
                    let v = t(ch);
                    while ch < n && t(ch) == v {
                        ch += 1;
                    }
                }
            }
        }

        self.prev_centers = records.iter().map(|r| r.center).collect();
        records
    }

    /// After a consumed overlap window, an immediately following 3-run is a
    /// chained reflection pair; emit a second record for it.
    fn connected_reflection(
        &self,
        t: &dyn Fn(usize) -> u8,
        n: usize,
        ch: &mut usize,
        records: &mut Vec<OverlapRecord>,
    ) {
        if *ch >= n || t(*ch) != 3 || records.len() == MAX_TARGETS {
            return;
        }
        let s = *ch;
        let mut e = s;
        while e + 1 < n && t(e + 1) == 3 {
            e += 1;
        }
        records.push(OverlapRecord {
            center: (s + e + 1) / 2,
            width: e - s + 1,
            side: Side::Balanced,
        });
        *ch = e + 1;
    }
}

/// First run of trace value 3 inside `[lo, hi]`, as inclusive bounds.
fn find_cover_run(t: &dyn Fn(usize) -> u8, lo: usize, hi: usize) -> Option<(usize, usize)> {
    let s3 = (lo..=hi).find(|&i| t(i) == 3)?;
    let mut e3 = s3;
    while e3 + 1 <= hi && t(e3 + 1) == 3 {
        e3 += 1;
    }
    Some((s3, e3))
}

/// Record for an irregular 3-run: mean boundary position, with the leading
/// channel as side flag when the even width leaves the centre ambiguous.
fn irregular_record(s3: usize, e3: usize, lead_mark: u8) -> OverlapRecord {
    let width = e3 - s3 + 1;
    let side = if width % 2 == 0 {
        Side::from_mark(lead_mark)
    } else {
        Side::Balanced
    };
    OverlapRecord {
        center: (s3 + e3 + 1) / 2,
        width,
        side,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const M: usize = 3;

    fn marks(len: usize, runs: &[(usize, usize)], tag: u8) -> Vec<u8> {
        let mut v = vec![0u8; len];
        for &(lo, hi) in runs {
            for i in lo..=hi {
                v[i] = tag;
            }
        }
        v
    }

    #[test]
    fn full_overlap_emits_centre_of_window() {
        let a = marks(256, &[(100, 106)], 1);
        let b = marks(256, &[(100, 106)], 2);
        let mut corr = TraceCorrelator::new(M);
        let recs = corr.correlate(&a, &b);
        assert_eq!(
            recs,
            vec![OverlapRecord {
                center: 103,
                width: 7,
                side: Side::Balanced
            }]
        );
    }

    #[test]
    fn covering_tail_literal_arithmetic() {
        // A leads by 4 chips: T = 1,1,1,1,3,3,3,2,2,2,2
        let a = marks(256, &[(100, 106)], 1);
        let b = marks(256, &[(104, 110)], 2);
        let mut corr = TraceCorrelator::new(M);
        let recs = corr.correlate(&a, &b);
        // cover_b = 104; center = 104 + (6 − 4 + 1)/2 = 105; width = 3.
        assert_eq!(
            recs,
            vec![OverlapRecord {
                center: 105,
                width: 3,
                side: Side::ChannelA
            }]
        );
    }

    #[test]
    fn connected_overlap_emits_second_record() {
        // Two A marks back to back, the second fully covered by B's mark.
        let a = marks(256, &[(100, 113)], 1);
        let b = marks(256, &[(104, 110)], 2);
        let mut corr = TraceCorrelator::new(M);
        let recs = corr.correlate(&a, &b);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].center, 105);
        // Chained 3-run at 107..=110: centre (107+110+1)/2 = 109, width 4.
        assert_eq!(
            recs[1],
            OverlapRecord {
                center: 109,
                width: 4,
                side: Side::Balanced
            }
        );
    }

    #[test]
    fn interior_run_between_equal_bounds() {
        // B clipped to a narrow run inside A's window: T = 1,1,3,3,3,1,1.
        let a = marks(256, &[(10, 16)], 1);
        let b = marks(256, &[(12, 14)], 2);
        let mut corr = TraceCorrelator::new(M);
        let recs = corr.correlate(&a, &b);
        assert_eq!(
            recs,
            vec![OverlapRecord {
                center: 13,
                width: 3,
                side: Side::Balanced
            }]
        );
    }

    #[test]
    fn irregular_even_width_takes_leading_side() {
        // T = 1,1,1,3,3,2,2,2,2,2 with window end on a 2.
        let a = marks(256, &[(10, 14)], 1);
        let b = marks(256, &[(13, 19)], 2);
        let mut corr = TraceCorrelator::new(M);
        let recs = corr.correlate(&a, &b);
        assert_eq!(
            recs,
            vec![OverlapRecord {
                center: 14,
                width: 2,
                side: Side::ChannelA
            }]
        );
    }

    #[test]
    fn single_channel_resolved_against_previous_scan() {
        let mut corr = TraceCorrelator::new(M);
        // Scan 1: a full overlap fixes centre 103.
        let a = marks(256, &[(100, 106)], 1);
        let b = marks(256, &[(100, 106)], 2);
        assert_eq!(corr.correlate(&a, &b).len(), 1);
        // Scan 2: only channel A sees the target.
        let a2 = marks(256, &[(100, 106)], 1);
        let b2 = vec![0u8; 256];
        let recs = corr.correlate(&a2, &b2);
        assert_eq!(
            recs,
            vec![OverlapRecord {
                center: 103,
                width: 0,
                side: Side::ChannelA
            }]
        );
    }

    #[test]
    fn single_channel_without_history_is_dropped() {
        let mut corr = TraceCorrelator::new(M);
        let a = marks(256, &[(100, 106)], 1);
        let b = vec![0u8; 256];
        assert!(corr.correlate(&a, &b).is_empty());
    }

    #[test]
    fn capacity_stops_early() {
        // 14 well-separated full overlaps; only MAX_TARGETS survive.
        let runs: Vec<(usize, usize)> = (0..14).map(|k| (50 + 20 * k, 56 + 20 * k)).collect();
        let a = marks(512, &runs, 1);
        let b = marks(512, &runs, 2);
        let mut corr = TraceCorrelator::new(M);
        let recs = corr.correlate(&a, &b);
        assert_eq!(recs.len(), MAX_TARGETS);
    }

    #[test]
    fn empty_trace_is_empty() {
        let mut corr = TraceCorrelator::new(M);
        let z = vec![0u8; 256];
        assert!(corr.correlate(&z, &z).is_empty());
    }
}
