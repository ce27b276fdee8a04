//! BMP280 Register Map and Noise Figures
//!
//! Register addresses and data widths from the Bosch BMP280 datasheet
//! (BST-BMP280-DS001), plus the satellite noise figure used to tune fusion.

// ===== REGISTER MAP =====

/// First calibration register (`dig_T1` LSB).
pub const REG_CALIBRATION: u8 = 0x88;

/// Measurement control register (`osrs_t`, `osrs_p`, `mode`).
pub const REG_CTRL_MEAS: u8 = 0xF4;

/// Configuration register (`t_sb`, `filter`, `spi3w_en`).
pub const REG_CONFIG: u8 = 0xF5;

/// First data register (`press_msb`).
pub const REG_DATA: u8 = 0xF7;

// ===== DATA WIDTHS =====

/// Length of the calibration block: 12 little-endian 16-bit words.
pub const CALIBRATION_BLOCK_LEN: usize = 24;

/// Length of the pressure + temperature data burst.
pub const DATA_BLOCK_LEN: usize = 6;

/// Exclusive upper bound of a 20-bit ADC count.
pub const RAW_COUNT_LIMIT: u32 = 1 << 20;

// ===== NOISE =====

/// Variance of a consumer satellite vertical fix (m²).
pub const GPS_VERTICAL_VARIANCE_M2: f64 = 5.0;
