//! Physical Constants for Barometric Altitude
//!
//! The barometric formula for the troposphere (0-11 km):
//!
//! ```text
//! h = (T₀/L) × [1 - (P/P₀)^(R×L/(g×M))]
//! ```
//!
//! With the ISA reference values below, `T₀/L` evaluates to
//! [`ALTITUDE_SCALE_M`] and the exponent to [`BAROMETRIC_EXPONENT`].

/// Standard atmospheric pressure at sea level (hPa).
///
/// Source: International Standard Atmosphere (ISA)
pub const SEA_LEVEL_PRESSURE_HPA: f64 = 1013.25;

/// Standard temperature at sea level (K).
///
/// Source: International Standard Atmosphere (ISA)
pub const SEA_LEVEL_TEMPERATURE_K: f64 = 288.15;

/// Temperature lapse rate in the troposphere (K/m).
pub const TEMPERATURE_LAPSE_K_PER_M: f64 = 0.0065;

/// Height scale `T₀/L` of the barometric formula (m).
pub const ALTITUDE_SCALE_M: f64 = 44330.7692307692;

/// Exponent `R×L/(g×M)` of the barometric formula.
///
/// Computed with R = 287.1 J/(kg·K) for dry air and g₀ = 9.80665 m/s².
pub const BAROMETRIC_EXPONENT: f64 = 0.1902949572;

/// Upper edge of the troposphere model (m).
///
/// Above this height the linear lapse rate no longer holds and the formula
/// loses physical meaning. Values are still computed.
pub const TROPOPAUSE_ALTITUDE_M: f64 = 10_769.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altitude_scale_matches_reference_atmosphere() {
        let scale = SEA_LEVEL_TEMPERATURE_K / TEMPERATURE_LAPSE_K_PER_M;
        assert!((scale - ALTITUDE_SCALE_M).abs() < 1e-6);
    }

    #[test]
    fn exponent_matches_gas_constant() {
        let exponent = 287.1 * TEMPERATURE_LAPSE_K_PER_M / 9.80665;
        assert!((exponent - BAROMETRIC_EXPONENT).abs() < 1e-6);
    }
}
