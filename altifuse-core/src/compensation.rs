//! Raw Count Compensation
//!
//! ## Data Path
//!
//! The BMP280 digitizes temperature and pressure into 20-bit counts that are
//! left-justified across three registers each:
//!
//! ```text
//! 0xF7 press_msb  0xF8 press_lsb  0xF9 press_xlsb[7:4]
//! 0xFA temp_msb   0xFB temp_lsb   0xFC temp_xlsb[7:4]
//!
//! count = msb << 12 | lsb << 4 | xlsb >> 4
//! ```
//!
//! Counts mean nothing without the factory coefficients. The datasheet
//! defines a fixed double-precision polynomial for each quantity:
//!
//! 1. Temperature first. Besides °C it yields `t_fine`, a fine-resolution
//!    temperature carried into the pressure polynomial.
//! 2. Pressure second, using `t_fine` from the same sample.
//!
//! `t_fine` lives inside [`TemperatureReading`] and cannot be read or built
//! outside this module, so pressure can only be compensated with the
//! temperature of a real reading.
//!
//! ## Determinism
//!
//! Both functions are pure. Identical inputs give bit-identical outputs; no
//! state is kept between calls.

use crate::{
    calibration::CalibrationCoefficients,
    constants::sensors::{DATA_BLOCK_LEN, RAW_COUNT_LIMIT},
    errors::{EngineError, EngineResult},
};

/// Raw pressure and temperature ADC counts of one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    adc_p: u32,
    adc_t: u32,
}

impl RawSample {
    /// Build from counts, rejecting anything outside 20 bits
    pub fn new(adc_p: u32, adc_t: u32) -> EngineResult<Self> {
        if adc_p >= RAW_COUNT_LIMIT || adc_t >= RAW_COUNT_LIMIT {
            return Err(EngineError::SensorReadFault {
                reason: "raw count exceeds 20 bits",
            });
        }
        Ok(Self { adc_p, adc_t })
    }

    /// Decode the data burst read from register 0xF7
    ///
    /// Needs at least six bytes (pressure then temperature). Longer bursts,
    /// such as the 8-byte read that also covers humidity on a BME280, are
    /// accepted and the extra bytes ignored.
    pub fn from_registers(data: &[u8]) -> EngineResult<Self> {
        if data.len() < DATA_BLOCK_LEN {
            return Err(EngineError::SensorReadFault {
                reason: "data burst shorter than 6 bytes",
            });
        }

        Ok(Self {
            adc_p: decode_count(data[0], data[1], data[2]),
            adc_t: decode_count(data[3], data[4], data[5]),
        })
    }

    /// Pressure count
    pub fn adc_p(&self) -> u32 {
        self.adc_p
    }

    /// Temperature count
    pub fn adc_t(&self) -> u32 {
        self.adc_t
    }
}

/// Assemble a left-justified 20-bit count, dropping the low nibble of xlsb
fn decode_count(msb: u8, lsb: u8, xlsb: u8) -> u32 {
    ((msb as u32) << 12) | ((lsb as u32) << 4) | ((xlsb as u32) >> 4)
}

/// Compensated temperature plus the fine value pressure compensation needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    celsius: f64,
    t_fine: f64,
}

impl TemperatureReading {
    /// Temperature in °C
    pub fn celsius(&self) -> f64 {
        self.celsius
    }
}

/// Physical values of one compensated sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalSample {
    /// Temperature in °C
    pub temperature_c: f64,
    /// Pressure in hPa
    pub pressure_hpa: f64,
}

/// Compensate a raw temperature count
///
/// ```text
/// var1   = (adc_t/16384 - T1/1024) × T2
/// var2   = (adc_t/131072 - T1/8192)² × T3
/// t_fine = var1 + var2
/// T      = t_fine / 5120
/// ```
pub fn compensate_temperature(coeffs: &CalibrationCoefficients, adc_t: u32) -> TemperatureReading {
    let adc_t = adc_t as f64;
    let t1 = coeffs.t1 as f64;
    let t2 = coeffs.t2 as f64;
    let t3 = coeffs.t3 as f64;

    let var1 = (adc_t / 16384.0 - t1 / 1024.0) * t2;
    let delta = adc_t / 131072.0 - t1 / 8192.0;
    let var2 = (delta * delta) * t3;
    let t_fine = var1 + var2;

    TemperatureReading {
        celsius: t_fine / 5120.0,
        t_fine,
    }
}

/// Compensate a raw pressure count, returning hPa
///
/// Follows the datasheet's floating-point polynomial, which produces Pa;
/// the result is divided by 100.
///
/// A zero divisor means the coefficients or the temperature are garbage.
/// That is reported as [`EngineError::SensorReadFault`] instead of letting
/// an infinite pressure through as a valid low reading.
pub fn compensate_pressure(
    coeffs: &CalibrationCoefficients,
    temperature: &TemperatureReading,
    adc_p: u32,
) -> EngineResult<f64> {
    let p1 = coeffs.p1 as f64;
    let p2 = coeffs.p2 as f64;
    let p3 = coeffs.p3 as f64;
    let p4 = coeffs.p4 as f64;
    let p5 = coeffs.p5 as f64;
    let p6 = coeffs.p6 as f64;
    let p7 = coeffs.p7 as f64;
    let p8 = coeffs.p8 as f64;
    let p9 = coeffs.p9 as f64;

    let mut var1 = temperature.t_fine / 2.0 - 64000.0;
    let mut var2 = var1 * var1 * p6 / 32768.0;
    var2 += var1 * p5 * 2.0;
    var2 = var2 / 4.0 + p4 * 65536.0;
    var1 = (p3 * var1 * var1 / 524288.0 + p2 * var1) / 524288.0;
    var1 = (1.0 + var1 / 32768.0) * p1;

    if var1 == 0.0 {
        log_warn!("Pressure compensation divisor is zero (P1={})", coeffs.p1);
        return Err(EngineError::SensorReadFault {
            reason: "pressure compensation divisor is zero",
        });
    }

    let mut pa = 1048576.0 - adc_p as f64;
    pa = (pa - var2 / 4096.0) * 6250.0 / var1;
    let var1 = p9 * pa * pa / 2147483648.0;
    let var2 = pa * p8 / 32768.0;
    pa += (var1 + var2 + p7) / 16.0;

    if !pa.is_finite() {
        return Err(EngineError::SensorReadFault {
            reason: "pressure compensation is not finite",
        });
    }

    Ok(pa / 100.0)
}

/// Compensate both channels of a sample, temperature first
pub fn compensate(coeffs: &CalibrationCoefficients, raw: &RawSample) -> EngineResult<PhysicalSample> {
    let temperature = compensate_temperature(coeffs, raw.adc_t);
    let pressure_hpa = compensate_pressure(coeffs, &temperature, raw.adc_p)?;

    Ok(PhysicalSample {
        temperature_c: temperature.celsius,
        pressure_hpa,
    })
}
