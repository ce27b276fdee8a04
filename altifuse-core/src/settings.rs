//! Measurement Settings
//!
//! Power mode, oversampling, standby time and IIR filter, encoded into the
//! two control registers written at init:
//!
//! ```text
//! ctrl_meas (0xF4) = osrs_t[7:5] | osrs_p[4:2] | mode[1:0]
//! config    (0xF5) = t_sb[7:5]   | filter[4:2] | spi3w_en[0]
//! ```
//!
//! `spi3w_en` is always left clear; the 3-wire SPI transport is not supported.
//!
//! Temperature oversampling above `LowPower` does not improve pressure
//! resolution, so it is rarely worth the extra conversion time.

/// Device power mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PowerMode {
    /// No conversions
    Sleep = 0x00,
    /// Single conversion, then back to sleep
    Forced = 0x01,
    /// Continuous conversions separated by the standby time
    Normal = 0x03,
}

/// Inactive time between conversions in normal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum StandbyTime {
    /// 0.5 ms
    Ms0_5 = 0x00,
    /// 62.5 ms
    Ms62_5 = 0x20,
    /// 125 ms
    Ms125 = 0x40,
    /// 250 ms
    Ms250 = 0x60,
    /// 500 ms
    Ms500 = 0x80,
    /// 1000 ms
    Ms1000 = 0xA0,
    /// 2000 ms
    Ms2000 = 0xC0,
    /// 4000 ms
    Ms4000 = 0xE0,
}

/// Pressure oversampling (`osrs_p`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PressureOversampling {
    /// Pressure not measured, count reads 0x80000
    Skipped = 0x00,
    /// ×1, 16 bit
    UltraLowPower = 0x04,
    /// ×2, 17 bit
    LowPower = 0x08,
    /// ×4, 18 bit
    Standard = 0x0C,
    /// ×8, 19 bit
    High = 0x10,
    /// ×16, 20 bit
    UltraHigh = 0x14,
}

/// Temperature oversampling (`osrs_t`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TemperatureOversampling {
    /// Temperature not measured, count reads 0x80000
    Skipped = 0x00,
    /// ×1
    UltraLowPower = 0x20,
    /// ×2
    LowPower = 0x40,
    /// ×4
    Standard = 0x60,
    /// ×8
    High = 0x80,
    /// ×16
    UltraHigh = 0xA0,
}

/// IIR filter coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum IirFilter {
    /// Filter off
    Off = 0x00,
    /// Coefficient 2
    Coef2 = 0x04,
    /// Coefficient 4
    Coef4 = 0x08,
    /// Coefficient 8
    Coef8 = 0x0C,
    /// Coefficient 16
    Coef16 = 0x10,
}

/// Complete measurement configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementSettings {
    /// Power mode
    pub power_mode: PowerMode,
    /// Standby time between normal-mode conversions
    pub standby: StandbyTime,
    /// Temperature oversampling
    pub temperature: TemperatureOversampling,
    /// Pressure oversampling
    pub pressure: PressureOversampling,
    /// On-chip IIR filter
    pub iir: IirFilter,
}

impl Default for MeasurementSettings {
    /// Continuous high-resolution pressure at ~8 Hz, on-chip filter off so
    /// the Kalman stage sees unsmoothed samples
    fn default() -> Self {
        Self {
            power_mode: PowerMode::Normal,
            standby: StandbyTime::Ms125,
            temperature: TemperatureOversampling::LowPower,
            pressure: PressureOversampling::UltraHigh,
            iir: IirFilter::Off,
        }
    }
}

impl MeasurementSettings {
    /// Value for the `ctrl_meas` register
    pub fn ctrl_meas(&self) -> u8 {
        self.temperature as u8 | self.pressure as u8 | self.power_mode as u8
    }

    /// Value for the `config` register
    pub fn config(&self) -> u8 {
        self.standby as u8 | self.iir as u8
    }

    /// Set the power mode
    pub fn with_power_mode(mut self, mode: PowerMode) -> Self {
        self.power_mode = mode;
        self
    }

    /// Set the standby time
    pub fn with_standby(mut self, standby: StandbyTime) -> Self {
        self.standby = standby;
        self
    }

    /// Set both oversampling rates
    pub fn with_oversampling(
        mut self,
        temperature: TemperatureOversampling,
        pressure: PressureOversampling,
    ) -> Self {
        self.temperature = temperature;
        self.pressure = pressure;
        self
    }

    /// Set the IIR filter
    pub fn with_iir(mut self, iir: IirFilter) -> Self {
        self.iir = iir;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_register_values() {
        let settings = MeasurementSettings::default();
        assert_eq!(settings.ctrl_meas(), 0x40 | 0x14 | 0x03);
        assert_eq!(settings.config(), 0x40);
    }

    #[test]
    fn single_oversampling_normal_mode() {
        // osrs_t ×1, osrs_p ×1, normal: the classic 0x27
        let settings = MeasurementSettings::default().with_oversampling(
            TemperatureOversampling::UltraLowPower,
            PressureOversampling::UltraLowPower,
        );
        assert_eq!(settings.ctrl_meas(), 0x27);
    }

    #[test]
    fn config_combines_standby_and_filter() {
        let settings = MeasurementSettings::default()
            .with_standby(StandbyTime::Ms0_5)
            .with_iir(IirFilter::Coef16);
        assert_eq!(settings.config(), 0x10);

        let settings = settings.with_standby(StandbyTime::Ms1000).with_iir(IirFilter::Off);
        assert_eq!(settings.config(), 0xA0);
    }

    #[test]
    fn forced_mode_bits() {
        let settings = MeasurementSettings::default().with_power_mode(PowerMode::Forced);
        assert_eq!(settings.ctrl_meas() & 0x03, 0x01);
    }
}
