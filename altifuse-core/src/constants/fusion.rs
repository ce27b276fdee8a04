//! Kalman Tuning for Altitude Estimation
//!
//! Defaults for the two estimator configurations. Process noise controls
//! responsiveness: smaller values give smoother, slower-responding output.

/// Process noise Q for the scalar altitude state.
pub const ALTITUDE_PROCESS_NOISE: f64 = 1e-6;

/// Measurement noise R for single-sensor smoothing (m²).
///
/// Tuned value, applied to altitude directly rather than derived from a
/// pressure noise figure.
pub const BARO_RMS_NOISE: f64 = 0.12;

/// Initial state covariance P₀.
pub const ALTITUDE_INITIAL_COVARIANCE: f64 = 0.5;

/// Barometer channel variance in the fused configuration (m²).
pub const FUSION_BARO_NOISE: f64 = 1.0;

/// Satellite channel variance in the fused configuration (m²).
///
/// Vertical fixes are noisier than the barometer.
pub const FUSION_GPS_NOISE: f64 = super::sensors::GPS_VERTICAL_VARIANCE_M2;

/// Variance assigned to a channel with no reading this cycle.
///
/// Large enough to make the channel's gain negligible, small enough that
/// `S⁻¹` stays well inside f64 range.
pub const MISSING_CHANNEL_VARIANCE: f64 = 1e8;
