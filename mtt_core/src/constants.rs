//! Scan geometry and hardware timing constants.
//!
//! The radar is an M-sequence UWB unit: one transmitter flanked by two
//! receivers on a common baseline. A scan is one impulse-response acquisition
//! of `SCAN_LENGTH` chips per receive channel. All values here are physical
//! (meters, radians, seconds); display-unit conversion belongs to consumers.

/// Chips per impulse response: 12th-order M-sequence, 2¹² − 1.
pub const SCAN_LENGTH: usize = 4095;

/// Maximum concurrently tracked targets, and the per-scan cap on
/// observations and overlap records.
pub const MAX_TARGETS: usize = 10;

/// Interleaved x,y output buffer length.
pub const COORDS_LEN: usize = 2 * MAX_TARGETS;

/// Speed of light (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Master system clock driving the M-sequence generator (Hz).
pub const SYSTEM_CLOCK_HZ: f64 = 13.824e9;

/// Physical length of one chip (m): one-way path increment per sample index.
pub const CHIP_LENGTH_M: f64 = SPEED_OF_LIGHT / SYSTEM_CLOCK_HZ;

/// Hardware synchronous averaging factor per recorded impulse response.
pub const HW_AVERAGING: f64 = 256.0;

/// Receiver subsampling factor (one sample captured every N clock periods).
pub const SUBSAMPLING: f64 = 128.0;

/// Leading chips forced to zero by the CFAR detector (antenna crosstalk).
pub const GUARD_CHIPS: usize = 5;

/// Chips used to seed the CFAR noise statistics on the first scan.
pub const CFAR_SEED_CHIPS: usize = 200;

/// Below this |y| the ellipse intersection is considered degenerate and the
/// candidate snaps to the origin (near-collinear geometry).
pub const MIN_Y_M: f64 = 0.2;

/// Guard for near-singular 2×2 inversions and near-zero denominators.
pub const EPS: f64 = 1e-9;

/// Scan repetition period (s), derived from the acquisition chain:
/// one impulse response takes `SCAN_LENGTH` chips, hardware-averaged
/// `HW_AVERAGING` times, subsampled by `SUBSAMPLING`.
pub fn scan_period() -> f64 {
    SCAN_LENGTH as f64 * HW_AVERAGING * SUBSAMPLING / SYSTEM_CLOCK_HZ
}
