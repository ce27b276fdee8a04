//! Device Instance
//!
//! A [`Barometer`] owns its register transport and the calibration read from
//! the chip once at init. Nothing is global; two sensors on two buses are
//! two values.
//!
//! ## Init Sequence
//!
//! ```text
//! 1. read 24 bytes at 0x88   → CalibrationCoefficients
//! 2. write ctrl_meas to 0xF4 → oversampling + power mode
//! 3. write config to 0xF5    → standby + IIR
//! ```
//!
//! Each [`read`](Barometer::read) is then one 6-byte burst from 0xF7 and a
//! pure compensation.
//!
//! ## Transport
//!
//! I²C/SPI framing stays outside the crate. Implement [`RegisterBus`] for
//! whatever HAL handle the board provides:
//!
//! ```rust
//! use altifuse_core::RegisterBus;
//!
//! struct Registers([u8; 256]);
//!
//! impl RegisterBus for Registers {
//!     type Error = ();
//!
//!     fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), ()> {
//!         let start = register as usize;
//!         let bytes = self.0.get(start..start + buf.len()).ok_or(())?;
//!         buf.copy_from_slice(bytes);
//!         Ok(())
//!     }
//!
//!     fn write_register(&mut self, register: u8, value: u8) -> Result<(), ()> {
//!         self.0[register as usize] = value;
//!         Ok(())
//!     }
//! }
//! ```

use crate::{
    calibration::CalibrationCoefficients,
    compensation::{compensate, PhysicalSample, RawSample},
    constants::sensors::{
        CALIBRATION_BLOCK_LEN, DATA_BLOCK_LEN, REG_CALIBRATION, REG_CONFIG, REG_CTRL_MEAS, REG_DATA,
    },
    errors::{EngineError, EngineResult},
    settings::MeasurementSettings,
};

/// Register-level access to the sensor
///
/// Reads auto-increment from `register` for `buf.len()` bytes.
pub trait RegisterBus {
    /// Transport error, only inspected for logging
    type Error: core::fmt::Debug;

    /// Burst read starting at `register`
    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Single register write
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;
}

/// A configured sensor on a bus
#[derive(Debug)]
pub struct Barometer<B: RegisterBus> {
    bus: B,
    coefficients: CalibrationCoefficients,
    settings: MeasurementSettings,
}

impl<B: RegisterBus> Barometer<B> {
    /// Load calibration and apply `settings`
    pub fn init(mut bus: B, settings: MeasurementSettings) -> EngineResult<Self> {
        let mut block = [0u8; CALIBRATION_BLOCK_LEN];
        read(&mut bus, REG_CALIBRATION, &mut block)?;
        let coefficients = CalibrationCoefficients::load(&block)?;

        write(&mut bus, REG_CTRL_MEAS, settings.ctrl_meas())?;
        write(&mut bus, REG_CONFIG, settings.config())?;

        log_debug!(
            "Barometer configured: ctrl_meas={:#04x} config={:#04x}",
            settings.ctrl_meas(),
            settings.config()
        );

        Ok(Self { bus, coefficients, settings })
    }

    /// Read the latest raw counts
    pub fn read_raw(&mut self) -> EngineResult<RawSample> {
        let mut data = [0u8; DATA_BLOCK_LEN];
        read(&mut self.bus, REG_DATA, &mut data)?;
        RawSample::from_registers(&data)
    }

    /// Read and compensate one sample
    pub fn read(&mut self) -> EngineResult<PhysicalSample> {
        let raw = self.read_raw()?;
        compensate(&self.coefficients, &raw)
    }

    /// Calibration loaded at init
    pub fn coefficients(&self) -> &CalibrationCoefficients {
        &self.coefficients
    }

    /// Settings applied at init
    pub fn settings(&self) -> &MeasurementSettings {
        &self.settings
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }
}

fn read<B: RegisterBus>(bus: &mut B, register: u8, buf: &mut [u8]) -> EngineResult<()> {
    bus.read_registers(register, buf).map_err(|_err| {
        log_warn!("Register read at {:#04x} failed: {:?}", register, _err);
        EngineError::Bus { register }
    })
}

fn write<B: RegisterBus>(bus: &mut B, register: u8, value: u8) -> EngineResult<()> {
    bus.write_register(register, value).map_err(|_err| {
        log_warn!("Register write at {:#04x} failed: {:?}", register, _err);
        EngineError::Bus { register }
    })
}
