//! Single-Sensor Altitude Pipeline
//!
//! ## Overview
//!
//! One sampling cycle, from raw counts to a smoothed altitude:
//!
//! ```text
//! RawSample ─→ compensate ─→ hPa ─→ pressure_to_altitude ─→ AltitudeSmoother
//!                  │                        │                       │
//!            temperature_c            raw_altitude_m      smoothed_altitude_m
//! ```
//!
//! All four intermediate values are returned in an [`AltitudeEstimate`] so
//! the caller can log the raw and filtered altitude side by side.
//!
//! ## Failure Handling
//!
//! Stages run in order and stop at the first error. Compensation runs
//! before the filter, so a faulty sample never reaches the smoother and
//! its state is left as it was.
//!
//! ## Usage Example
//!
//! ```rust
//! use altifuse_core::{AltitudePipeline, CalibrationCoefficients, RawSample};
//!
//! # fn main() -> Result<(), altifuse_core::EngineError> {
//! let calibration = [
//!     112, 107, 67, 103, 24, 252, 125, 142, 67, 214, 208, 11,
//!     39, 11, 140, 0, 249, 255, 140, 60, 248, 198, 112, 23,
//! ];
//! let mut pipeline = AltitudePipeline::new(CalibrationCoefficients::load(&calibration)?);
//!
//! let estimate = pipeline.process(&RawSample::new(415_148, 519_888)?)?;
//! assert!((estimate.pressure_hpa - 1006.53).abs() < 0.01);
//! assert_eq!(estimate.smoothed_altitude_m, estimate.raw_altitude_m);
//! # Ok(())
//! # }
//! ```

use crate::{
    altitude::pressure_to_altitude,
    calibration::CalibrationCoefficients,
    compensation::{compensate, RawSample},
    errors::EngineResult,
    fusion::AltitudeSmoother,
};

/// Everything one cycle produced
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AltitudeEstimate {
    /// Compensated temperature (°C)
    pub temperature_c: f64,
    /// Compensated pressure (hPa)
    pub pressure_hpa: f64,
    /// Altitude from this sample alone (m)
    pub raw_altitude_m: f64,
    /// Filtered altitude (m)
    pub smoothed_altitude_m: f64,
}

/// Calibration, compensation, altitude and smoothing for one sensor
#[derive(Debug, Clone)]
pub struct AltitudePipeline {
    coefficients: CalibrationCoefficients,
    smoother: AltitudeSmoother,
}

impl AltitudePipeline {
    /// Pipeline with the default barometric smoothing filter
    pub fn new(coefficients: CalibrationCoefficients) -> Self {
        Self::with_smoother(coefficients, AltitudeSmoother::default())
    }

    /// Pipeline with a custom smoother
    pub fn with_smoother(coefficients: CalibrationCoefficients, smoother: AltitudeSmoother) -> Self {
        Self { coefficients, smoother }
    }

    /// Run one sample through every stage
    pub fn process(&mut self, raw: &RawSample) -> EngineResult<AltitudeEstimate> {
        let sample = compensate(&self.coefficients, raw)?;
        let raw_altitude_m = pressure_to_altitude(sample.pressure_hpa);
        let smoothed_altitude_m = self.smoother.update_altitude(raw_altitude_m)?;

        Ok(AltitudeEstimate {
            temperature_c: sample.temperature_c,
            pressure_hpa: sample.pressure_hpa,
            raw_altitude_m,
            smoothed_altitude_m,
        })
    }

    /// Decode a 0xF7 data burst, then [`process`](Self::process) it
    pub fn process_registers(&mut self, data: &[u8]) -> EngineResult<AltitudeEstimate> {
        let raw = RawSample::from_registers(data)?;
        self.process(&raw)
    }

    /// Calibration in use
    pub fn coefficients(&self) -> &CalibrationCoefficients {
        &self.coefficients
    }

    /// Smoothing stage
    pub fn smoother(&self) -> &AltitudeSmoother {
        &self.smoother
    }

    /// Mutable smoothing stage, e.g. to restore a snapshot
    pub fn smoother_mut(&mut self) -> &mut AltitudeSmoother {
        &mut self.smoother
    }
}
