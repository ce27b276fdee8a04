//! Kalman Estimation for Barometric and Satellite Altitude
//!
//! ## Overview
//!
//! One generic discrete linear Kalman filter, [`KalmanFilter<N, M>`], with
//! the state dimension `N` and measurement dimension `M` fixed at compile
//! time. The two altitude estimators are plain configurations of it rather
//! than subclasses:
//!
//! ```text
//! barometric_smoothing()  N=1 M=1   altitude ─→ smoothed altitude
//! baro_gps_fusion()       N=1 M=2   [baro, gps] ─→ fused altitude
//! ```
//!
//! [`AltitudeSmoother`] and [`BaroGpsFusion`] wrap those configurations with
//! the unit conversions and the missing-channel policy.
//!
//! ## Filter Equations
//!
//! ```text
//! Predict:     x = A·x
//!              P = A·P·Aᵀ + Q
//! Innovation:  y = z - C·x
//!              S = C·P·Cᵀ + R
//! Gain:        G = P·Cᵀ·S⁻¹
//! Correct:     x = x + G·y
//!              P = (I - G·C)·P
//! ```
//!
//! The first measurement seeds `x` directly and skips all of the above.
//!
//! ## Memory Model
//!
//! All matrices are fixed-size `f64` arrays on the stack:
//! ```text
//! KalmanFilter<1, 2> size:
//! ├── Config (A, C, Q, R, P₀):  (1 + 2 + 1 + 4 + 1) × 8 bytes
//! ├── State + covariance:       2 × 8 bytes + tag
//! ├── Gain + innovation:        4 × 8 bytes
//! └── Total:                    ~130 bytes
//! ```

pub mod kalman;
pub mod matrix;
pub mod models;

// Re-export main types
pub use kalman::{KalmanConfig, KalmanFilter, KalmanSnapshot};
pub use models::{
    AltitudeSmoother, BaroGpsFusion,
    barometric_smoothing, barometric_smoothing_with,
    baro_gps_fusion, baro_gps_fusion_with,
};

use thiserror_no_std::Error;

/// Result type for fusion operations
pub type FusionResult<T> = Result<T, FusionError>;

/// Errors that can occur during estimation
///
/// Every variant is returned before the filter commits anything, so the
/// state and covariance are exactly as they were before the failed call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionError {
    /// S = C·P·Cᵀ + R could not be inverted, gain undefined
    #[error("Innovation covariance is singular")]
    SingularInnovationCovariance,
    /// Measurement contained NaN or infinity
    #[error("Measurement is not finite")]
    InvalidMeasurement,
    /// Predict requested before the first measurement
    #[error("Filter not initialized")]
    NotInitialized,
    /// Slice length does not match the measurement dimension
    #[error("Expected {expected} measurements, got {actual}")]
    DimensionMismatch {
        /// Measurement dimension M
        expected: usize,
        /// Supplied length
        actual: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for FusionError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SingularInnovationCovariance =>
                defmt::write!(fmt, "Singular innovation covariance"),
            Self::InvalidMeasurement =>
                defmt::write!(fmt, "Invalid measurement"),
            Self::NotInitialized =>
                defmt::write!(fmt, "Filter not initialized"),
            Self::DimensionMismatch { expected, actual } =>
                defmt::write!(fmt, "Expected {} measurements, got {}", expected, actual),
        }
    }
}
