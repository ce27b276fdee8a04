//! Altitude Estimator Configurations
//!
//! ## Overview
//!
//! Two parameterizations of [`KalmanFilter`], both with a scalar altitude
//! state and a random-walk model (`A = [1]`):
//!
//! ```text
//! Configuration        N  M  C        Q      R              P₀
//! ---------------------------------------------------------------
//! barometric_smoothing 1  1  [1]      1e-6   [0.12]         0.5
//! baro_gps_fusion      1  2  [1; 1]   1e-6   diag(1, 5)     0.5
//! ```
//!
//! `R = 0.12` is a tuned altitude variance (m²) for a sensor at high
//! oversampling; it is not derived from a pressure noise figure.
//!
//! ## Missing Channels
//!
//! The fusion filter always runs a full two-channel update when at least one
//! channel has a reading. A missing channel is fed the current estimate and
//! its variance is raised to [`MISSING_CHANNEL_VARIANCE`], so its gain drops
//! to almost nothing while `P` still grows by `Q` in the predict step:
//!
//! ```text
//! baro only:  z = [baro, x̂]   R = diag(r_baro, 1e8)
//! gps only:   z = [x̂, gps]    R = diag(1e8, r_gps)
//! neither:    predict only
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use altifuse_core::fusion::BaroGpsFusion;
//!
//! let mut fusion = BaroGpsFusion::default();
//!
//! fusion.update(Some(120.0), Some(126.0)).unwrap();
//! let altitude = fusion.update(Some(120.4), None).unwrap();
//! assert!(altitude > 119.0 && altitude < 127.0);
//! ```

use crate::altitude::pressure_to_altitude;
use crate::constants::fusion::{
    ALTITUDE_INITIAL_COVARIANCE, ALTITUDE_PROCESS_NOISE, BARO_RMS_NOISE,
    FUSION_BARO_NOISE, FUSION_GPS_NOISE, MISSING_CHANNEL_VARIANCE,
};
use crate::fusion::{FusionResult, KalmanConfig, KalmanFilter};

/// Single-channel barometric altitude smoothing
pub fn barometric_smoothing() -> KalmanConfig<1, 1> {
    barometric_smoothing_with(ALTITUDE_PROCESS_NOISE, BARO_RMS_NOISE)
}

/// Single-channel smoothing with explicit process and measurement variance
pub fn barometric_smoothing_with(process_noise: f64, measurement_noise: f64) -> KalmanConfig<1, 1> {
    KalmanConfig::new(
        [[1.0]],
        [[1.0]],
        [[process_noise]],
        [[measurement_noise]],
        [[ALTITUDE_INITIAL_COVARIANCE]],
    )
}

/// Barometer + satellite altitude fusion
pub fn baro_gps_fusion() -> KalmanConfig<1, 2> {
    baro_gps_fusion_with(ALTITUDE_PROCESS_NOISE, FUSION_BARO_NOISE, FUSION_GPS_NOISE)
}

/// Fusion with explicit process noise and per-channel variances
pub fn baro_gps_fusion_with(process_noise: f64, baro_noise: f64, gps_noise: f64) -> KalmanConfig<1, 2> {
    KalmanConfig::new(
        [[1.0]],
        [[1.0], [1.0]],
        [[process_noise]],
        [[baro_noise, 0.0], [0.0, gps_noise]],
        [[ALTITUDE_INITIAL_COVARIANCE]],
    )
}

/// Smooths barometric altitude from one sensor
#[derive(Debug, Clone)]
pub struct AltitudeSmoother {
    filter: KalmanFilter<1, 1>,
}

impl Default for AltitudeSmoother {
    fn default() -> Self {
        Self::new(barometric_smoothing())
    }
}

impl AltitudeSmoother {
    /// Create a smoother from a single-channel configuration
    pub fn new(config: KalmanConfig<1, 1>) -> Self {
        Self {
            filter: KalmanFilter::new(config),
        }
    }

    /// Smooth an altitude in meters
    ///
    /// The first reading is returned as-is.
    pub fn update_altitude(&mut self, altitude_m: f64) -> FusionResult<f64> {
        self.filter.update(&[altitude_m]).map(|state| state[0])
    }

    /// Convert a pressure in hPa to altitude, then smooth it
    pub fn update_pressure(&mut self, pressure_hpa: f64) -> FusionResult<f64> {
        self.update_altitude(pressure_to_altitude(pressure_hpa))
    }

    /// Current smoothed altitude, `None` before the first reading
    pub fn altitude(&self) -> Option<f64> {
        self.filter.state().map(|state| state[0])
    }

    /// Current estimate variance (m²)
    pub fn variance(&self) -> f64 {
        self.filter.covariance()[0][0]
    }

    /// Underlying filter, for snapshots and diagnostics
    pub fn filter(&self) -> &KalmanFilter<1, 1> {
        &self.filter
    }

    /// Mutable access to the underlying filter
    pub fn filter_mut(&mut self) -> &mut KalmanFilter<1, 1> {
        &mut self.filter
    }

    /// Forget the estimate; the next reading seeds again
    pub fn reset(&mut self) {
        self.filter.reset();
    }
}

/// Fuses barometric and satellite altitude into one estimate
#[derive(Debug, Clone)]
pub struct BaroGpsFusion {
    filter: KalmanFilter<1, 2>,
    missing_variance: f64,
}

impl Default for BaroGpsFusion {
    fn default() -> Self {
        Self::new(baro_gps_fusion())
    }
}

impl BaroGpsFusion {
    const BARO: usize = 0;
    const GPS: usize = 1;

    /// Create a fusion filter from a two-channel configuration
    pub fn new(config: KalmanConfig<1, 2>) -> Self {
        Self {
            filter: KalmanFilter::new(config),
            missing_variance: MISSING_CHANNEL_VARIANCE,
        }
    }

    /// Variance assigned to a channel with no reading this cycle
    ///
    /// Must be finite and positive. Singularity is judged per row, so the
    /// size of this value does not make the present channel look singular.
    pub fn with_missing_variance(mut self, variance: f64) -> Self {
        self.missing_variance = variance;
        self
    }

    /// Run one cycle with whichever readings are available (meters)
    ///
    /// Returns the fused altitude. With both channels missing the filter
    /// only predicts, which fails with [`FusionError::NotInitialized`](crate::fusion::FusionError::NotInitialized) before
    /// the first reading.
    pub fn update(&mut self, baro_m: Option<f64>, gps_m: Option<f64>) -> FusionResult<f64> {
        let (measurement, missing) = match (baro_m, gps_m) {
            (Some(baro), Some(gps)) => {
                return self.filter.update(&[baro, gps]).map(|state| state[0]);
            }
            (None, None) => return self.filter.predict().map(|state| state[0]),
            (Some(baro), None) => {
                let fill = self.fill_value(baro);
                ([baro, fill], Self::GPS)
            }
            (None, Some(gps)) => {
                let fill = self.fill_value(gps);
                ([fill, gps], Self::BARO)
            }
        };

        log_debug!("Channel {} missing, substituting {}", missing, measurement[missing]);

        let mut noise = self.filter.config().measurement_noise;
        for i in 0..2 {
            noise[missing][i] = 0.0;
            noise[i][missing] = 0.0;
        }
        noise[missing][missing] = self.missing_variance;

        self.filter
            .update_with_noise(&measurement, &noise)
            .map(|state| state[0])
    }

    /// Stand-in for a missing channel: the estimate, or the other channel
    /// before the filter is seeded
    fn fill_value(&self, present: f64) -> f64 {
        self.filter.state().map_or(present, |state| state[0])
    }

    /// Current fused altitude, `None` before the first reading
    pub fn altitude(&self) -> Option<f64> {
        self.filter.state().map(|state| state[0])
    }

    /// Current estimate variance (m²)
    pub fn variance(&self) -> f64 {
        self.filter.covariance()[0][0]
    }

    /// Underlying filter, for snapshots and diagnostics
    pub fn filter(&self) -> &KalmanFilter<1, 2> {
        &self.filter
    }

    /// Mutable access to the underlying filter
    pub fn filter_mut(&mut self) -> &mut KalmanFilter<1, 2> {
        &mut self.filter
    }

    /// Forget the estimate; the next reading seeds again
    pub fn reset(&mut self) {
        self.filter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::altitude::altitude_to_pressure;
    use crate::fusion::FusionError;

    #[test]
    fn smoothing_configuration_values() {
        let config = barometric_smoothing();
        assert_eq!(config.transition, [[1.0]]);
        assert_eq!(config.observation, [[1.0]]);
        assert_eq!(config.process_noise, [[1e-6]]);
        assert_eq!(config.measurement_noise, [[0.12]]);
        assert_eq!(config.initial_covariance, [[0.5]]);
    }

    #[test]
    fn fusion_configuration_values() {
        let config = baro_gps_fusion();
        assert_eq!(config.transition, [[1.0]]);
        assert_eq!(config.observation, [[1.0], [1.0]]);
        assert_eq!(config.measurement_noise, [[1.0, 0.0], [0.0, 5.0]]);
    }

    #[test]
    fn smoother_seeds_then_smooths() {
        let mut smoother = AltitudeSmoother::default();
        assert_eq!(smoother.altitude(), None);

        assert_eq!(smoother.update_altitude(100.0).unwrap(), 100.0);
        let second = smoother.update_altitude(102.0).unwrap();
        assert!(second > 100.0 && second < 102.0);
    }

    #[test]
    fn pressure_input_is_converted_first() {
        let mut smoother = AltitudeSmoother::default();
        let first = smoother.update_pressure(altitude_to_pressure(250.0)).unwrap();
        assert!((first - 250.0).abs() < 1e-6);
    }

    #[test]
    fn fused_estimate_leans_toward_quieter_channel() {
        let mut fusion = BaroGpsFusion::default();
        // Weighted seed: (100/1 + 110/5) / (1 + 1/5)
        let seeded = fusion.update(Some(100.0), Some(110.0)).unwrap();
        assert!((seeded - 101.666_666_666_666_67).abs() < 1e-9);
        assert!(seeded - 100.0 < 110.0 - seeded);
    }

    #[test]
    fn single_channel_seed_follows_that_channel() {
        let mut fusion = BaroGpsFusion::default();
        assert_eq!(fusion.update(None, Some(42.0)).unwrap(), 42.0);
        assert!(fusion.filter().is_seeded());

        let mut fusion = BaroGpsFusion::default();
        assert_eq!(fusion.update(Some(3.832_000_000_000_000_3), None).unwrap(), 3.832_000_000_000_000_3);
    }

    #[test]
    fn agreeing_channels_seed_to_their_value() {
        for i in 0..1000 {
            let v = 3.0 + i as f64 * 0.001;
            let mut fusion = BaroGpsFusion::default();
            assert_eq!(fusion.update(Some(v), Some(v)).unwrap(), v);
        }
    }

    #[test]
    fn very_large_missing_variance_still_updates() {
        for variance in [1e12, 1e15, 1e16] {
            let mut fusion = BaroGpsFusion::new(baro_gps_fusion_with(1e-6, 0.12, 5.0))
                .with_missing_variance(variance);
            fusion.update(Some(100.0), Some(100.0)).unwrap();

            for _ in 0..50 {
                let altitude = fusion.update(Some(100.0), None).unwrap();
                assert!((altitude - 100.0).abs() < 1e-9, "variance {}", variance);
                let altitude = fusion.update(None, Some(100.0)).unwrap();
                assert!((altitude - 100.0).abs() < 1e-9, "variance {}", variance);
            }
            assert!(fusion.variance() < 0.12);
        }
    }

    #[test]
    fn missing_channel_has_negligible_gain() {
        let mut fusion = BaroGpsFusion::default();
        fusion.update(Some(50.0), Some(50.0)).unwrap();
        fusion.update(Some(51.0), None).unwrap();

        let gain = fusion.filter().gain();
        assert!(gain[0][1].abs() < 1e-8);
        assert!(gain[0][0] > 0.1);
    }

    #[test]
    fn both_missing_only_predicts() {
        let mut fusion = BaroGpsFusion::default();
        assert_eq!(fusion.update(None, None), Err(FusionError::NotInitialized));

        fusion.update(Some(10.0), Some(10.0)).unwrap();
        let variance = fusion.variance();

        let predicted = fusion.update(None, None).unwrap();
        assert!((predicted - 10.0).abs() < 1e-12);
        assert!((fusion.variance() - (variance + 1e-6)).abs() < 1e-15);
    }

    #[test]
    fn alternating_channels_stay_bounded() {
        let config = baro_gps_fusion_with(1e-6, 0.12, 5.0);
        let mut fusion = BaroGpsFusion::new(config);

        fusion.update(Some(300.0), None).unwrap();
        for i in 0..2000 {
            let altitude = if i % 2 == 0 {
                fusion.update(Some(300.0), None)
            } else {
                fusion.update(None, Some(300.0))
            }
            .unwrap();

            assert!((altitude - 300.0).abs() < 1e-6);
            assert!(fusion.variance() <= 0.12 + 1e-5, "P diverged at {}", i);
        }
    }

    #[test]
    fn reset_forgets_estimate() {
        let mut fusion = BaroGpsFusion::default();
        fusion.update(Some(1.0), Some(2.0)).unwrap();
        fusion.reset();
        assert_eq!(fusion.altitude(), None);
        assert_eq!(fusion.variance(), 0.5);
    }
}
