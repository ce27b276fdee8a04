//! Factory Calibration Coefficients
//!
//! Every BMP280 is trimmed at the factory and stores twelve 16-bit
//! compensation words in non-volatile memory starting at register 0x88:
//!
//! ```text
//! 0x88  dig_T1  u16      0x8E  dig_P1  u16
//! 0x8A  dig_T2  i16      0x90  dig_P2  i16
//! 0x8C  dig_T3  i16      ...   ...
//!                        0x9E  dig_P9  i16
//! ```
//!
//! Each word is stored low byte first. `dig_T1` and `dig_P1` are unsigned,
//! the other ten are two's-complement. The words never change while the
//! device is powered, so they are read once at init and kept immutable.

use crate::{
    constants::sensors::CALIBRATION_BLOCK_LEN,
    errors::{EngineError, EngineResult},
};

/// The sensor's twelve compensation constants, sign-normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationCoefficients {
    /// Temperature coefficient T1 (unsigned)
    pub t1: u16,
    /// Temperature coefficient T2
    pub t2: i16,
    /// Temperature coefficient T3
    pub t3: i16,
    /// Pressure coefficient P1 (unsigned)
    pub p1: u16,
    /// Pressure coefficient P2
    pub p2: i16,
    /// Pressure coefficient P3
    pub p3: i16,
    /// Pressure coefficient P4
    pub p4: i16,
    /// Pressure coefficient P5
    pub p5: i16,
    /// Pressure coefficient P6
    pub p6: i16,
    /// Pressure coefficient P7
    pub p7: i16,
    /// Pressure coefficient P8
    pub p8: i16,
    /// Pressure coefficient P9
    pub p9: i16,
}

/// Reinterpret an unsigned 16-bit word as two's-complement
///
/// Values above 32767 wrap to `value - 65536`.
pub const fn normalize_signed(raw: u16) -> i16 {
    if raw > i16::MAX as u16 {
        (raw as i32 - 65536) as i16
    } else {
        raw as i16
    }
}

impl CalibrationCoefficients {
    /// Decode the 24-byte calibration block read from register 0x88
    ///
    /// Bytes past the 24th are ignored; a shorter block is a malformed
    /// transport read and is rejected rather than truncated.
    pub fn load(bytes: &[u8]) -> EngineResult<Self> {
        if bytes.len() < CALIBRATION_BLOCK_LEN {
            return Err(EngineError::MalformedCalibrationData {
                expected: CALIBRATION_BLOCK_LEN,
                actual: bytes.len(),
            });
        }

        let word = |index: usize| -> u16 {
            let low = bytes[2 * index] as u16;
            let high = bytes[2 * index + 1] as u16;
            high * 256 + low
        };
        let signed = |index: usize| normalize_signed(word(index));

        let coefficients = Self {
            t1: word(0),
            t2: signed(1),
            t3: signed(2),
            p1: word(3),
            p2: signed(4),
            p3: signed(5),
            p4: signed(6),
            p5: signed(7),
            p6: signed(8),
            p7: signed(9),
            p8: signed(10),
            p9: signed(11),
        };

        log_debug!(
            "Calibration loaded: T1={} T2={} T3={} P1={}",
            coefficients.t1, coefficients.t2, coefficients.t3, coefficients.p1
        );

        Ok(coefficients)
    }

    /// Encode back into the register layout
    ///
    /// Inverse of [`load`](Self::load); used to build fixtures for tests and
    /// bus simulators.
    pub fn to_bytes(&self) -> [u8; CALIBRATION_BLOCK_LEN] {
        let words: [u16; 12] = [
            self.t1,
            self.t2 as u16,
            self.t3 as u16,
            self.p1,
            self.p2 as u16,
            self.p3 as u16,
            self.p4 as u16,
            self.p5 as u16,
            self.p6 as u16,
            self.p7 as u16,
            self.p8 as u16,
            self.p9 as u16,
        ];

        let mut bytes = [0u8; CALIBRATION_BLOCK_LEN];
        for (chunk, word) in bytes.chunks_exact_mut(2).zip(words.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}
