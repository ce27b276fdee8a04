//! Common test utilities for integration tests
//!
//! This module provides:
//! - Datasheet fixture bytes for calibration and data registers
//! - A deterministic noise source for filter scenarios
//! - A register-file bus for device tests
//! - Tolerance assertions

#![allow(dead_code)]

use altifuse_core::RegisterBus;

/// Calibration block from the BMP280 datasheet worked example
pub const DATASHEET_CALIBRATION: [u8; 24] = [
    112, 107, 67, 103, 24, 252, 125, 142, 67, 214, 208, 11,
    39, 11, 140, 0, 249, 255, 140, 60, 248, 198, 112, 23,
];

/// Data burst encoding adc_p = 415148, adc_t = 519888
pub const DATASHEET_DATA: [u8; 6] = [0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00];

/// Datasheet results for the fixtures above
pub const DATASHEET_TEMPERATURE_C: f64 = 25.08;
pub const DATASHEET_PRESSURE_HPA: f64 = 1006.5327;

macro_rules! assert_within_tolerance {
    ($actual:expr, $expected:expr, $tolerance:expr) => {
        let diff = ($actual - $expected).abs();
        if diff > $tolerance {
            panic!(
                "Value {} not within tolerance {} of expected {} (diff: {})",
                $actual, $tolerance, $expected, diff
            );
        }
    };
}

/// Deterministic random number generator for tests
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        // Xorshift algorithm
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u32() >> 8) as f64 / 16777216.0
    }

    pub fn gen_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Approximately normal noise (sum of 12 uniforms)
    pub fn gaussian(&mut self, std_dev: f64) -> f64 {
        let sum: f64 = (0..12).map(|_| self.next_f64()).sum();
        (sum - 6.0) * std_dev
    }
}

/// 256-byte register file preloaded with the datasheet fixtures
#[derive(Debug)]
pub struct RegisterFile {
    pub registers: [u8; 256],
    pub writes: Vec<(u8, u8)>,
    pub fail_reads: bool,
}

impl RegisterFile {
    pub fn datasheet() -> Self {
        let mut registers = [0u8; 256];
        registers[0x88..0x88 + 24].copy_from_slice(&DATASHEET_CALIBRATION);
        registers[0xF7..0xF7 + 6].copy_from_slice(&DATASHEET_DATA);
        Self { registers, writes: Vec::new(), fail_reads: false }
    }

    /// Overwrite the data registers with new counts
    pub fn set_counts(&mut self, adc_p: u32, adc_t: u32) {
        let encode = |count: u32| [(count >> 12) as u8, (count >> 4) as u8, ((count & 0x0F) << 4) as u8];
        self.registers[0xF7..0xFA].copy_from_slice(&encode(adc_p));
        self.registers[0xFA..0xFD].copy_from_slice(&encode(adc_t));
    }
}

impl RegisterBus for RegisterFile {
    type Error = &'static str;

    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        if self.fail_reads {
            return Err("bus timeout");
        }
        let start = register as usize;
        let bytes = self.registers.get(start..start + buf.len()).ok_or("out of range")?;
        buf.copy_from_slice(bytes);
        Ok(())
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.registers[register as usize] = value;
        self.writes.push((register, value));
        Ok(())
    }
}
