//! Error Types for Compensation and Estimation Failures
//!
//! ## Design Philosophy
//!
//! Errors are returned from the sampling hot path and may be stored by the
//! acquisition loop, so they follow the same rules as everything else here:
//!
//! 1. **No Heap Allocation**: messages are `&'static str`, never `String`.
//! 2. **Copy Semantics**: errors are `Copy` and cheap to return by value.
//! 3. **Per-sample Failure**: every error means "this sample produced no
//!    estimate". Nothing in the engine retries or substitutes a default.
//!
//! ## Error Categories
//!
//! ### Device Data
//! - `MalformedCalibrationData`: the 24-byte calibration block was short
//! - `SensorReadFault`: compensation arithmetic degenerated, or raw counts
//!   were outside the 20-bit range
//! - `Bus`: the register transport reported a failure
//!
//! ### Estimation
//! - `SingularInnovationCovariance`: Kalman gain undefined for this update
//! - `InvalidMeasurement`: NaN or infinite measurement reached the filter
//! - `DimensionMismatch`: a slice-based entry point received the wrong length
//! - `NotSeeded`: the filter has no state to predict from yet
//!
//! ## Handling Strategy
//!
//! ```rust
//! use altifuse_core::{EngineError, AltitudePipeline};
//! # use altifuse_core::RawSample;
//! # fn handle(pipeline: &mut AltitudePipeline, raw: &RawSample) {
//! match pipeline.process(raw) {
//!     Ok(estimate) => {
//!         // publish(estimate.smoothed_altitude_m);
//!     }
//!     Err(EngineError::SensorReadFault { .. }) => {
//!         // drop the sample, the filter was not touched
//!     }
//!     Err(EngineError::SingularInnovationCovariance) => {
//!         // noise configuration is degenerate, needs operator attention
//!     }
//!     Err(_) => {}
//! }
//! # }
//! ```

use thiserror_no_std::Error;

use crate::fusion::FusionError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Calibration block shorter than the device register map
    #[error("Malformed calibration data: need {expected} bytes, got {actual}")]
    MalformedCalibrationData {
        /// Bytes required
        expected: usize,
        /// Bytes supplied by the transport
        actual: usize,
    },

    /// Raw data could not be turned into a physical value
    #[error("Sensor read fault: {reason}")]
    SensorReadFault {
        /// What degenerated
        reason: &'static str,
    },

    /// Innovation covariance S = C·P·Cᵀ + R could not be inverted
    #[error("Innovation covariance is singular")]
    SingularInnovationCovariance,

    /// Measurement is NaN or infinite
    #[error("Invalid measurement: not a finite number")]
    InvalidMeasurement,

    /// Wrong number of values for the configured dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Configured dimension
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// Filter must see a measurement before it can predict
    #[error("Filter has not been seeded with a measurement")]
    NotSeeded,

    /// Register transport failure
    #[error("Bus error at register {register:#04x}")]
    Bus {
        /// First register of the failed transfer
        register: u8,
    },
}

impl From<FusionError> for EngineError {
    fn from(err: FusionError) -> Self {
        match err {
            FusionError::SingularInnovationCovariance => EngineError::SingularInnovationCovariance,
            FusionError::InvalidMeasurement => EngineError::InvalidMeasurement,
            FusionError::NotInitialized => EngineError::NotSeeded,
            FusionError::DimensionMismatch { expected, actual } =>
                EngineError::DimensionMismatch { expected, actual },
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EngineError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::MalformedCalibrationData { expected, actual } =>
                defmt::write!(fmt, "Calibration: need {} bytes, got {}", expected, actual),
            Self::SensorReadFault { reason } =>
                defmt::write!(fmt, "Sensor read fault: {}", reason),
            Self::SingularInnovationCovariance =>
                defmt::write!(fmt, "Singular innovation covariance"),
            Self::InvalidMeasurement =>
                defmt::write!(fmt, "Invalid measurement"),
            Self::DimensionMismatch { expected, actual } =>
                defmt::write!(fmt, "Expected {} values, got {}", expected, actual),
            Self::NotSeeded =>
                defmt::write!(fmt, "Filter not seeded"),
            Self::Bus { register } =>
                defmt::write!(fmt, "Bus error at register {}", register),
        }
    }
}
