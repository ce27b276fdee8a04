//! Barometric Altitude
//!
//! ## Physics Background
//!
//! In the troposphere temperature falls linearly with height, which together
//! with the hydrostatic equation and the ideal gas law gives:
//!
//! ```text
//! Hydrostatic equation: dP/dh = -ρg
//! Ideal gas law:        P = ρRT
//! Temperature model:    T = T₀ - L×h
//!
//! P/P₀ = (1 - L×h/T₀)^(g/(R×L))
//! h    = T₀/L × [1 - (P/P₀)^(R×L/g)]
//! ```
//!
//! With ISA reference values (1013.25 hPa, 288.15 K) the result is an
//! orthometric height valid up to roughly 10.8 km:
//!
//! ```text
//! Location        Pressure    Altitude
//! ------------------------------------
//! Sea level       1013.25     0 m
//! Denver           835        ~1 650 m
//! Mt. Everest      315        ~8 900 m
//! ```
//!
//! ## Limitations
//!
//! - Assumes standard sea-level pressure; local weather shifts the zero by
//!   roughly 8 m per hPa
//! - Dry air, no humidity correction
//! - Inputs outside the troposphere are still computed, never rejected, but
//!   the number loses physical meaning

use crate::constants::physics::{ALTITUDE_SCALE_M, BAROMETRIC_EXPONENT, SEA_LEVEL_PRESSURE_HPA};

/// Convert pressure (hPa) to barometric altitude (m)
///
/// Physically meaningful below
/// [`TROPOPAUSE_ALTITUDE_M`](crate::constants::physics::TROPOPAUSE_ALTITUDE_M).
/// `libm::pow` keeps the crate usable without `std` on FPU-less targets.
pub fn pressure_to_altitude(pressure_hpa: f64) -> f64 {
    let ratio = pressure_hpa / SEA_LEVEL_PRESSURE_HPA;
    ALTITUDE_SCALE_M * (1.0 - libm::pow(ratio, BAROMETRIC_EXPONENT))
}

/// Convert barometric altitude (m) back to pressure (hPa)
///
/// Exact inverse of [`pressure_to_altitude`] below the height scale.
pub fn altitude_to_pressure(altitude_m: f64) -> f64 {
    let fraction = 1.0 - altitude_m / ALTITUDE_SCALE_M;
    SEA_LEVEL_PRESSURE_HPA * libm::pow(fraction, 1.0 / BAROMETRIC_EXPONENT)
}
