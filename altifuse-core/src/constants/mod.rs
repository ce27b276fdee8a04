//! Constants for Altifuse Core
//!
//! Centralized, documented constants used by the compensation and
//! estimation code. Values come from the International Standard Atmosphere,
//! the BMP280 datasheet, or the tuning of the two altitude filters.
//!
//! ## Organization
//!
//! - **Physics**: standard atmosphere and the barometric formula
//! - **Sensors**: BMP280 register map, count widths and noise figures
//! - **Fusion**: default Kalman tuning for the altitude configurations

/// Standard atmosphere constants and barometric formula coefficients.
pub mod physics;

/// BMP280 register map, raw count widths and published noise figures.
pub mod sensors;

/// Kalman filter tuning for the altitude configurations.
pub mod fusion;

pub use physics::{SEA_LEVEL_PRESSURE_HPA, SEA_LEVEL_TEMPERATURE_K};

pub use sensors::{CALIBRATION_BLOCK_LEN, RAW_COUNT_LIMIT};

pub use fusion::{
    ALTITUDE_PROCESS_NOISE, BARO_RMS_NOISE, ALTITUDE_INITIAL_COVARIANCE,
    FUSION_BARO_NOISE, FUSION_GPS_NOISE, MISSING_CHANNEL_VARIANCE,
};
