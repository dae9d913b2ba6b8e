//! Point extraction: integrate CFAR detection runs and collapse each
//! physical reflection to a channel-tagged mark window.
//!
//! Integration smooths the raw detection bits with a trailing sliding-window
//! sum; extraction then finds rising edges of the integrated vector and
//! expands each into a `2m+1`-wide reflection mark centred on the first-edge
//! chip, tagged with the channel's mark value (A=1, B=2).

use crate::types::Channel;
use serde::{Deserialize, Serialize};

/// Tuning for the extractor, shared by both channels.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Trailing integration window length (chips).
    pub window_size: usize,
    /// Detections required inside the window to keep a position.
    pub min_count: usize,
    /// Mark half-width m: each reflection expands to 2m+1 chips.
    pub half_width: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            window_size: 8,
            min_count: 4,
            half_width: 10,
        }
    }
}

/// Integrates detection bits and extracts reflection marks.
#[derive(Clone, Debug)]
pub struct PointExtractor {
    config: ExtractConfig,
}

impl PointExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn half_width(&self) -> usize {
        self.config.half_width
    }

    /// Trailing sliding-window sum of `det_bits`: output is 1 where at least
    /// `min_count` detections fall in the last `window_size` positions.
    /// Leading positions use the growing, not-yet-full window.
    pub fn integrate(&self, det_bits: &[u8]) -> Vec<u8> {
        let w = self.config.window_size.max(1);
        let mut out = vec![0u8; det_bits.len()];
        let mut sum: usize = 0;
        for i in 0..det_bits.len() {
            sum += det_bits[i] as usize;
            if i >= w {
                sum -= det_bits[i - w] as usize;
            }
            if sum >= self.config.min_count {
                out[i] = 1;
            }
        }
        out
    }

    /// Find rising edges (diff == 1) of the integrated bits and mark a
    /// `2m+1`-wide window around `edge - min_count` with the channel tag,
    /// clipped to the scan bounds. The `min_count` back-shift compensates
    /// the integration delay of the trailing window.
    pub fn extract_points(&self, int_bits: &[u8], channel: Channel) -> Vec<u8> {
        let m = self.config.half_width as i64;
        let tag = channel.mark();
        let n = int_bits.len() as i64;
        let mut marks = vec![0u8; int_bits.len()];

        let mut prev = 0u8;
        for i in 0..int_bits.len() {
            let cur = int_bits[i];
            if cur == 1 && prev == 0 {
                let centre = i as i64 - self.config.min_count as i64;
                let lo = (centre - m).max(0);
                let hi = (centre + m).min(n - 1);
                for k in lo..=hi {
                    marks[k as usize] = tag;
                }
            }
            prev = cur;
        }
        marks
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(window: usize, min_count: usize, m: usize) -> PointExtractor {
        PointExtractor::new(ExtractConfig {
            window_size: window,
            min_count,
            half_width: m,
        })
    }

    #[test]
    fn integrate_keeps_dense_runs_only() {
        let ex = extractor(4, 3, 2);
        // Sparse singleton at 2, dense run at 10..16.
        let mut bits = vec![0u8; 32];
        bits[2] = 1;
        for i in 10..16 {
            bits[i] = 1;
        }
        let out = ex.integrate(&bits);
        assert_eq!(out[2], 0, "isolated detection must not survive");
        assert_eq!(out[12], 1, "dense run must survive from the 3rd bit on");
        assert_eq!(out[10], 0, "window sum below min_count at run start");
    }

    #[test]
    fn integrate_growing_window_at_start() {
        let ex = extractor(8, 2, 2);
        let mut bits = vec![0u8; 16];
        bits[0] = 1;
        bits[1] = 1;
        let out = ex.integrate(&bits);
        // Window not yet full but the sum already reaches min_count.
        assert_eq!(out[1], 1);
    }

    #[test]
    fn extract_marks_window_around_shifted_edge() {
        let ex = extractor(4, 3, 2);
        let mut int_bits = vec![0u8; 32];
        for i in 12..20 {
            int_bits[i] = 1;
        }
        let marks = ex.extract_points(&int_bits, Channel::A);
        // Edge at 12, back-shifted by min_count=3 → centre 9, window 7..=11.
        for i in 7..=11 {
            assert_eq!(marks[i], 1, "chip {i} should carry the A tag");
        }
        assert_eq!(marks[6], 0);
        assert_eq!(marks[12], 0);
    }

    #[test]
    fn extract_clips_at_scan_start() {
        let ex = extractor(4, 3, 10);
        let mut int_bits = vec![0u8; 64];
        for i in 4..12 {
            int_bits[i] = 1;
        }
        // Centre 4-3=1, window would start at -9: must clip, not panic.
        let marks = ex.extract_points(&int_bits, Channel::B);
        assert_eq!(marks[0], 2);
        assert_eq!(marks[11], 2);
        assert_eq!(marks[12], 0);
    }

    #[test]
    fn two_reflections_two_windows() {
        let ex = extractor(4, 2, 1);
        let mut int_bits = vec![0u8; 64];
        for i in 10..14 {
            int_bits[i] = 1;
        }
        for i in 40..44 {
            int_bits[i] = 1;
        }
        let marks = ex.extract_points(&int_bits, Channel::A);
        let tagged: Vec<usize> = (0..64).filter(|&i| marks[i] == 1).collect();
        assert_eq!(tagged, vec![7, 8, 9, 37, 38, 39]);
    }
}
