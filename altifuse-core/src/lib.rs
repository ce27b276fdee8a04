//! Calibration and estimation engine for barometric altitude
//!
//! Turns raw BMP280 register bytes into physical temperature and pressure,
//! converts pressure to altitude, and smooths or fuses altitude with a
//! discrete linear Kalman filter.
//!
//! ```text
//! raw bytes ─→ compensation ─→ hPa ─→ altitude ─→ Kalman ─→ smoothed m
//!                                  satellite m ──┘
//! ```
//!
//! Key constraints:
//! - No heap allocation, fixed-size matrices only
//! - Pure compensation transform (bit-identical for identical inputs)
//! - Failed updates never leave the filter half-written
//!
//! ```no_run
//! use altifuse_core::{CalibrationCoefficients, AltitudePipeline, RawSample};
//!
//! # fn main() -> Result<(), altifuse_core::EngineError> {
//! # let calibration_block = [0u8; 24];
//! let coefficients = CalibrationCoefficients::load(&calibration_block)?;
//! let mut pipeline = AltitudePipeline::new(coefficients);
//!
//! let raw = RawSample::new(415_148, 519_888)?;
//! let estimate = pipeline.process(&raw)?;
//! println!("{:.2} m", estimate.smoothed_altitude_m);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Optional logging, compiled out without the `log` feature
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub mod altitude;
pub mod calibration;
pub mod compensation;
pub mod constants;
pub mod device;
pub mod errors;
pub mod fusion;
pub mod pipeline;
pub mod settings;

// Public API
pub use altitude::{altitude_to_pressure, pressure_to_altitude};
pub use calibration::CalibrationCoefficients;
pub use compensation::{
    compensate, compensate_pressure, compensate_temperature,
    PhysicalSample, RawSample, TemperatureReading,
};
pub use device::{Barometer, RegisterBus};
pub use errors::{EngineError, EngineResult};
pub use fusion::{
    AltitudeSmoother, BaroGpsFusion, FusionError, FusionResult,
    KalmanConfig, KalmanFilter, KalmanSnapshot,
};
pub use pipeline::{AltitudeEstimate, AltitudePipeline};
pub use settings::MeasurementSettings;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
