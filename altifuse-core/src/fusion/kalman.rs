//! Discrete Linear Kalman Filter
//!
//! ## Overview
//!
//! Optimal state estimation from noisy measurements of a linear system.
//! The filter blends a prediction from the system model with each new
//! measurement, weighting them by their covariances.
//!
//! ### 1. Prediction Step
//! ```text
//! State prediction:      x̂ₖ|ₖ₋₁ = A·xₖ₋₁
//! Covariance prediction: Pₖ|ₖ₋₁ = A·Pₖ₋₁·Aᵀ + Q
//! ```
//!
//! ### 2. Correction Step
//! ```text
//! Innovation:      yₖ = zₖ - C·x̂ₖ|ₖ₋₁
//! Innovation cov:  Sₖ = C·Pₖ|ₖ₋₁·Cᵀ + R
//! Kalman gain:     Gₖ = Pₖ|ₖ₋₁·Cᵀ·Sₖ⁻¹
//! State update:    x̂ₖ = x̂ₖ|ₖ₋₁ + Gₖ·yₖ
//! Covariance:      Pₖ = (I - Gₖ·C)·Pₖ|ₖ₋₁
//! ```
//!
//! ## Lifecycle
//!
//! The state is empty until the first measurement, which seeds it directly
//! without prediction or correction. `P` stays at its configured initial
//! value on that call. Every later call runs predict-then-correct.
//!
//! ## Atomic Updates
//!
//! Each update is computed into locals and committed in one assignment at
//! the end. A singular `S` or a non-finite measurement returns an error
//! with `x`, `P`, gain and innovation exactly as they were.
//!
//! ## Usage Example
//!
//! ```rust
//! use altifuse_core::fusion::{KalmanConfig, KalmanFilter};
//!
//! // 1 state, 1 measurement
//! let config = KalmanConfig::<1, 1>::default()
//!     .with_process_noise(1e-6)
//!     .with_measurement_noise([0.12])
//!     .with_initial_covariance(0.5);
//!
//! let mut kf = KalmanFilter::new(config);
//!
//! let seeded = kf.update(&[120.0]).unwrap();
//! assert_eq!(seeded, [120.0]);
//!
//! let smoothed = kf.update(&[121.0]).unwrap();
//! assert!(smoothed[0] > 120.0 && smoothed[0] < 121.0);
//! ```

use crate::fusion::{
    FusionError, FusionResult,
    matrix::{
        Matrix, SquareMatrix, Vector,
        add, diagonal, identity, invert, make_symmetric, matvec, multiply, sub, transpose,
    },
};

/// Kalman filter configuration
///
/// Set once at construction; updates never modify it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanConfig<const N: usize, const M: usize> {
    /// State transition matrix (A)
    pub transition: SquareMatrix<N>,
    /// Observation matrix (C) - maps state to measurements
    pub observation: Matrix<M, N>,
    /// Process noise covariance (Q)
    pub process_noise: SquareMatrix<N>,
    /// Measurement noise covariance (R)
    pub measurement_noise: SquareMatrix<M>,
    /// Covariance before the first correction (P₀)
    pub initial_covariance: SquareMatrix<N>,
}

impl<const N: usize, const M: usize> Default for KalmanConfig<N, M> {
    fn default() -> Self {
        // Simple observation matrix (first M states observed)
        let mut observation = [[0.0; N]; M];
        for (i, row) in observation.iter_mut().enumerate().take(N) {
            row[i] = 1.0;
        }

        Self {
            transition: identity(),
            observation,
            process_noise: diagonal(&[0.01; N]),
            measurement_noise: diagonal(&[0.1; M]),
            initial_covariance: identity(),
        }
    }
}

impl<const N: usize, const M: usize> KalmanConfig<N, M> {
    /// Build from explicit matrices: A, C, Q, R, P₀
    pub fn new(
        transition: SquareMatrix<N>,
        observation: Matrix<M, N>,
        process_noise: SquareMatrix<N>,
        measurement_noise: SquareMatrix<M>,
        initial_covariance: SquareMatrix<N>,
    ) -> Self {
        Self {
            transition,
            observation,
            process_noise,
            measurement_noise,
            initial_covariance,
        }
    }

    /// Set process noise (higher = less trust in model)
    pub fn with_process_noise(mut self, noise: f64) -> Self {
        self.process_noise = diagonal(&[noise; N]);
        self
    }

    /// Set the measurement variance of each channel (diagonal of R)
    pub fn with_measurement_noise(mut self, variances: [f64; M]) -> Self {
        self.measurement_noise = diagonal(&variances);
        self
    }

    /// Set P₀ to `variance` on the diagonal
    pub fn with_initial_covariance(mut self, variance: f64) -> Self {
        self.initial_covariance = diagonal(&[variance; N]);
        self
    }

    /// Set state transition model
    pub fn with_transition(mut self, transition: SquareMatrix<N>) -> Self {
        self.transition = transition;
        self
    }

    /// Set observation model
    pub fn with_observation(mut self, observation: Matrix<M, N>) -> Self {
        self.observation = observation;
        self
    }
}

/// The durable part of a filter: enough to resume after a restart
///
/// `A`, `C`, `Q` and `R` come back from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KalmanSnapshot<const N: usize> {
    /// State estimate
    #[cfg_attr(feature = "serde", serde(with = "crate::fusion::matrix::serde_fixed::vector"))]
    pub state: Vector<N>,
    /// Estimation error covariance
    #[cfg_attr(feature = "serde", serde(with = "crate::fusion::matrix::serde_fixed::matrix"))]
    pub covariance: SquareMatrix<N>,
}

/// Kalman filter for linear state estimation
///
/// ## Type Parameters
/// - `N`: State vector dimension
/// - `M`: Measurement vector dimension
#[derive(Debug, Clone)]
pub struct KalmanFilter<const N: usize, const M: usize> {
    /// Current state estimate, empty until seeded
    state: Option<Vector<N>>,
    /// Estimation error covariance
    covariance: SquareMatrix<N>,
    /// Gain of the last correction
    gain: Matrix<N, M>,
    /// Innovation of the last correction
    innovation: Vector<M>,
    /// Configuration
    config: KalmanConfig<N, M>,
    /// Accepted measurements, seed included
    update_count: u32,
}

/// Result of one predict-correct cycle, not yet committed
struct Correction<const N: usize, const M: usize> {
    state: Vector<N>,
    covariance: SquareMatrix<N>,
    gain: Matrix<N, M>,
    innovation: Vector<M>,
}

impl<const N: usize, const M: usize> KalmanFilter<N, M> {
    /// Create new Kalman filter with configuration
    pub fn new(config: KalmanConfig<N, M>) -> Self {
        Self {
            state: None,
            covariance: config.initial_covariance,
            gain: [[0.0; M]; N],
            innovation: [0.0; M],
            config,
            update_count: 0,
        }
    }

    /// Feed one measurement using the configured R
    pub fn update(&mut self, measurement: &Vector<M>) -> FusionResult<Vector<N>> {
        let noise = self.config.measurement_noise;
        self.update_with_noise(measurement, &noise)
    }

    /// Feed one measurement with a per-call measurement covariance
    ///
    /// The configured R is not modified. Used to down-weight channels that
    /// have no fresh reading this cycle.
    pub fn update_with_noise(
        &mut self,
        measurement: &Vector<M>,
        noise: &SquareMatrix<M>,
    ) -> FusionResult<Vector<N>> {
        if measurement.iter().any(|v| !v.is_finite()) {
            return Err(FusionError::InvalidMeasurement);
        }

        let Some(state) = self.state else {
            return self.seed(measurement, noise);
        };

        let (predicted, predicted_cov) = self.predicted(&state);
        let correction = self.correct(&predicted, &predicted_cov, measurement, noise)?;

        self.state = Some(correction.state);
        self.covariance = correction.covariance;
        self.gain = correction.gain;
        self.innovation = correction.innovation;
        self.update_count = self.update_count.saturating_add(1);

        Ok(correction.state)
    }

    /// Slice entry point for callers that only know M at runtime
    pub fn update_from_slice(&mut self, measurement: &[f64]) -> FusionResult<Vector<N>> {
        let measurement: &Vector<M> = measurement.try_into().map_err(|_| {
            FusionError::DimensionMismatch { expected: M, actual: measurement.len() }
        })?;
        self.update(measurement)
    }

    /// Advance one step without a measurement
    ///
    /// The state follows `A` and the covariance grows by `Q`.
    pub fn predict(&mut self) -> FusionResult<Vector<N>> {
        let state = self.state.ok_or(FusionError::NotInitialized)?;

        let (predicted, predicted_cov) = self.predicted(&state);
        self.state = Some(predicted);
        self.covariance = predicted_cov;

        Ok(predicted)
    }

    /// x = A·x, P = A·P·Aᵀ + Q
    fn predicted(&self, state: &Vector<N>) -> (Vector<N>, SquareMatrix<N>) {
        let a = &self.config.transition;

        let mut predicted = [0.0; N];
        matvec(a, state, &mut predicted);

        let mut ap = [[0.0; N]; N];
        multiply(a, &self.covariance, &mut ap);
        let mut a_t = [[0.0; N]; N];
        transpose(a, &mut a_t);
        let mut apa_t = [[0.0; N]; N];
        multiply(&ap, &a_t, &mut apa_t);

        let mut predicted_cov = [[0.0; N]; N];
        add(&apa_t, &self.config.process_noise, &mut predicted_cov);
        make_symmetric(&mut predicted_cov);

        (predicted, predicted_cov)
    }

    fn correct(
        &self,
        predicted: &Vector<N>,
        predicted_cov: &SquareMatrix<N>,
        measurement: &Vector<M>,
        noise: &SquareMatrix<M>,
    ) -> FusionResult<Correction<N, M>> {
        let c = &self.config.observation;
        let mut c_t = [[0.0; M]; N];
        transpose(c, &mut c_t);

        // Innovation covariance: S = C·P·Cᵀ + R
        let mut cp = [[0.0; N]; M];
        multiply(c, predicted_cov, &mut cp);
        let mut cpc_t = [[0.0; M]; M];
        multiply(&cp, &c_t, &mut cpc_t);
        let mut innovation_cov = [[0.0; M]; M];
        add(&cpc_t, noise, &mut innovation_cov);

        let mut s_inv = [[0.0; M]; M];
        if !invert(&innovation_cov, &mut s_inv) {
            log_warn!("Innovation covariance is singular: S = {:?}", innovation_cov);
            return Err(FusionError::SingularInnovationCovariance);
        }

        // Kalman gain: G = P·Cᵀ·S⁻¹
        let mut pc_t = [[0.0; M]; N];
        multiply(predicted_cov, &c_t, &mut pc_t);
        let mut gain = [[0.0; M]; N];
        multiply(&pc_t, &s_inv, &mut gain);

        // Innovation: y = z - C·x̂
        let mut cx = [0.0; M];
        matvec(c, predicted, &mut cx);
        let mut innovation = [0.0; M];
        for i in 0..M {
            innovation[i] = measurement[i] - cx[i];
        }

        // State update: x̂ = x̂ + G·y
        let mut gy = [0.0; N];
        matvec(&gain, &innovation, &mut gy);
        let mut state = *predicted;
        for i in 0..N {
            state[i] += gy[i];
        }

        // Covariance update: P = (I - G·C)·P
        let mut gc = [[0.0; N]; N];
        multiply(&gain, c, &mut gc);
        let mut i_gc = [[0.0; N]; N];
        sub(&identity(), &gc, &mut i_gc);
        let mut covariance = [[0.0; N]; N];
        multiply(&i_gc, predicted_cov, &mut covariance);
        make_symmetric(&mut covariance);

        Ok(Correction { state, covariance, gain, innovation })
    }

    /// Seed the state from the first measurement
    ///
    /// With `N == M` the measurement is taken as the state. Otherwise it is
    /// projected: weighted least squares `(CᵀR⁻¹C)⁻¹CᵀR⁻¹z`, refined once
    /// against its own residual, when there are
    /// more channels than states, minimum norm `Cᵀ(CCᵀ)⁻¹z` when fewer.
    fn seed(&mut self, measurement: &Vector<M>, noise: &SquareMatrix<M>) -> FusionResult<Vector<N>> {
        let state = if N == M {
            core::array::from_fn(|i| measurement[i])
        } else if M > N {
            self.least_squares_seed(measurement, noise)?
        } else {
            self.minimum_norm_seed(measurement)?
        };

        log_debug!("Kalman filter seeded with {:?}", state);

        self.state = Some(state);
        self.update_count = 1;
        Ok(state)
    }

    fn least_squares_seed(
        &self,
        measurement: &Vector<M>,
        noise: &SquareMatrix<M>,
    ) -> FusionResult<Vector<N>> {
        let c = &self.config.observation;
        let mut c_t = [[0.0; M]; N];
        transpose(c, &mut c_t);

        let mut weight = [[0.0; M]; M];
        if !invert(noise, &mut weight) {
            return Err(FusionError::SingularInnovationCovariance);
        }

        let mut c_t_w = [[0.0; M]; N];
        multiply(&c_t, &weight, &mut c_t_w);
        let mut information = [[0.0; N]; N];
        multiply(&c_t_w, c, &mut information);

        let mut information_inv = [[0.0; N]; N];
        if !invert(&information, &mut information_inv) {
            return Err(FusionError::SingularInnovationCovariance);
        }

        let project = |z: &Vector<M>| {
            let mut weighted = [0.0; N];
            matvec(&c_t_w, z, &mut weighted);
            let mut x = [0.0; N];
            matvec(&information_inv, &weighted, &mut x);
            x
        };

        // One step of iterative refinement: agreeing channels land on
        // exactly their common value
        let mut state = project(measurement);
        let mut fitted = [0.0; M];
        matvec(c, &state, &mut fitted);
        let residual: Vector<M> = core::array::from_fn(|i| measurement[i] - fitted[i]);
        let correction = project(&residual);
        for i in 0..N {
            state[i] += correction[i];
        }
        Ok(state)
    }

    fn minimum_norm_seed(&self, measurement: &Vector<M>) -> FusionResult<Vector<N>> {
        let c = &self.config.observation;
        let mut c_t = [[0.0; M]; N];
        transpose(c, &mut c_t);

        let mut cc_t = [[0.0; M]; M];
        multiply(c, &c_t, &mut cc_t);
        let mut cc_t_inv = [[0.0; M]; M];
        if !invert(&cc_t, &mut cc_t_inv) {
            return Err(FusionError::SingularInnovationCovariance);
        }

        let mut solved = [0.0; M];
        matvec(&cc_t_inv, measurement, &mut solved);
        let mut state = [0.0; N];
        matvec(&c_t, &solved, &mut state);
        Ok(state)
    }

    /// Current state estimate, `None` until seeded
    pub fn state(&self) -> Option<&Vector<N>> {
        self.state.as_ref()
    }

    /// Estimation error covariance
    pub fn covariance(&self) -> &SquareMatrix<N> {
        &self.covariance
    }

    /// Diagonal of the covariance (per-state variances)
    pub fn uncertainty(&self) -> [f64; N] {
        core::array::from_fn(|i| self.covariance[i][i])
    }

    /// Gain of the most recent correction
    pub fn gain(&self) -> &Matrix<N, M> {
        &self.gain
    }

    /// Innovation of the most recent correction
    pub fn innovation(&self) -> &Vector<M> {
        &self.innovation
    }

    /// True once the first measurement has been accepted
    pub fn is_seeded(&self) -> bool {
        self.state.is_some()
    }

    /// Accepted measurements since construction, reset or restore
    ///
    /// A restored snapshot counts as the seed. Saturates at `u32::MAX`.
    pub fn update_count(&self) -> u32 {
        self.update_count
    }

    /// Configuration the filter was built with
    pub fn config(&self) -> &KalmanConfig<N, M> {
        &self.config
    }

    /// Capture `(X, P)` for checkpointing
    pub fn snapshot(&self) -> Option<KalmanSnapshot<N>> {
        self.state.map(|state| KalmanSnapshot {
            state,
            covariance: self.covariance,
        })
    }

    /// Resume from a checkpoint; the next update runs predict-correct
    pub fn restore(&mut self, snapshot: &KalmanSnapshot<N>) {
        self.state = Some(snapshot.state);
        self.covariance = snapshot.covariance;
        self.gain = [[0.0; M]; N];
        self.innovation = [0.0; M];
        self.update_count = 1;
    }

    /// Back to the unseeded state with P = P₀
    pub fn reset(&mut self) {
        self.state = None;
        self.covariance = self.config.initial_covariance;
        self.gain = [[0.0; M]; N];
        self.innovation = [0.0; M];
        self.update_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar() -> KalmanFilter<1, 1> {
        KalmanFilter::new(
            KalmanConfig::default()
                .with_process_noise(1e-6)
                .with_measurement_noise([0.12])
                .with_initial_covariance(0.5),
        )
    }

    #[test]
    fn first_update_seeds_without_smoothing() {
        let mut kf = scalar();
        assert!(!kf.is_seeded());

        assert_eq!(kf.update(&[250.5]).unwrap(), [250.5]);
        assert_eq!(kf.covariance(), &[[0.5]]);
        assert_eq!(kf.update_count(), 1);
    }

    #[test]
    fn second_update_applies_gain() {
        let mut kf = scalar();
        kf.update(&[100.0]).unwrap();
        let estimate = kf.update(&[101.0]).unwrap();

        // P⁻ = 0.5 + 1e-6, G = P⁻ / (P⁻ + 0.12)
        let prior = 0.5 + 1e-6;
        let gain = prior / (prior + 0.12);
        assert!((kf.gain()[0][0] - gain).abs() < 1e-12);
        assert!((estimate[0] - (100.0 + gain)).abs() < 1e-12);
        assert!((kf.covariance()[0][0] - (1.0 - gain) * prior).abs() < 1e-12);
        assert_eq!(kf.innovation(), &[1.0]);
    }

    #[test]
    fn converges_to_riccati_fixed_point() {
        let (q, r) = (1e-6, 0.12);
        let mut kf = scalar();
        kf.update(&[0.0]).unwrap();

        let mut previous = kf.covariance()[0][0];
        for i in 0..5000 {
            kf.update(&[0.0]).unwrap();
            let p = kf.covariance()[0][0];
            assert!(p <= previous + 1e-15, "P grew at step {}: {} -> {}", i, previous, p);
            previous = p;
        }

        // P² + QP - QR = 0
        let fixed_point = (-q + libm::sqrt(q * q + 4.0 * q * r)) / 2.0;
        assert!((previous - fixed_point).abs() < 1e-9);
    }

    #[test]
    fn singular_innovation_leaves_state_untouched() {
        let config = KalmanConfig::<1, 1>::default()
            .with_process_noise(0.0)
            .with_measurement_noise([0.0])
            .with_initial_covariance(0.0);
        let mut kf = KalmanFilter::new(config);

        kf.update(&[10.0]).unwrap();
        let before = kf.clone();

        assert_eq!(kf.update(&[11.0]), Err(FusionError::SingularInnovationCovariance));
        assert_eq!(kf.state(), before.state());
        assert_eq!(kf.covariance(), before.covariance());
        assert_eq!(kf.update_count(), before.update_count());
    }

    #[test]
    fn non_finite_measurement_is_rejected() {
        let mut kf = scalar();
        assert_eq!(kf.update(&[f64::NAN]), Err(FusionError::InvalidMeasurement));
        assert!(!kf.is_seeded());

        kf.update(&[5.0]).unwrap();
        assert_eq!(kf.update(&[f64::INFINITY]), Err(FusionError::InvalidMeasurement));
        assert_eq!(kf.state(), Some(&[5.0]));
    }

    #[test]
    fn two_state_constant_velocity_tracking() {
        // [position, velocity], position observed
        let config = KalmanConfig::<2, 1>::default()
            .with_transition([[1.0, 0.1], [0.0, 1.0]])
            .with_observation([[1.0, 0.0]])
            .with_process_noise(1e-4)
            .with_measurement_noise([0.01]);
        let mut kf = KalmanFilter::new(config);

        // Minimum-norm seed: velocity starts at zero
        assert_eq!(kf.update(&[0.0]).unwrap(), [0.0, 0.0]);

        for i in 1..200 {
            let position = i as f64 * 0.1;
            kf.update(&[position]).unwrap();
        }

        let state = kf.state().unwrap();
        assert!((state[0] - 19.9).abs() < 0.05);
        assert!((state[1] - 1.0).abs() < 0.05);
    }

    #[test]
    fn overdetermined_seed_weights_by_noise() {
        let config = KalmanConfig::<1, 2>::default()
            .with_observation([[1.0], [1.0]])
            .with_measurement_noise([1.0, 4.0]);
        let mut kf = KalmanFilter::new(config);

        // (1·10 + 0.25·20) / 1.25
        let seeded = kf.update(&[10.0, 20.0]).unwrap();
        assert!((seeded[0] - 12.0).abs() < 1e-12);
    }

    #[test]
    fn agreeing_channels_seed_exactly() {
        let config = KalmanConfig::<1, 2>::default()
            .with_observation([[1.0], [1.0]])
            .with_measurement_noise([1.0, 5.0]);

        for i in 0..1000 {
            let v = i as f64 * 0.004 + 0.832;
            let mut kf = KalmanFilter::new(config);
            assert_eq!(kf.update(&[v, v]).unwrap(), [v]);

            let mut kf = KalmanFilter::new(config);
            assert_eq!(kf.update_with_noise(&[v, v], &[[0.12, 0.0], [0.0, 1e8]]).unwrap(), [v]);
        }
    }

    #[test]
    fn update_count_saturates() {
        let mut kf = scalar();
        kf.update(&[1.0]).unwrap();
        kf.update_count = u32::MAX;

        kf.update(&[1.0]).unwrap();
        assert_eq!(kf.update_count(), u32::MAX);
    }

    #[test]
    fn predict_requires_seed() {
        let mut kf = scalar();
        assert_eq!(kf.predict(), Err(FusionError::NotInitialized));

        kf.update(&[3.0]).unwrap();
        assert_eq!(kf.predict().unwrap(), [3.0]);
        assert!((kf.covariance()[0][0] - (0.5 + 1e-6)).abs() < 1e-15);
    }

    #[test]
    fn slice_updates_check_length() {
        let mut kf = scalar();
        assert_eq!(
            kf.update_from_slice(&[1.0, 2.0]),
            Err(FusionError::DimensionMismatch { expected: 1, actual: 2 })
        );
        assert_eq!(kf.update_from_slice(&[1.0]).unwrap(), [1.0]);
    }

    #[test]
    fn snapshot_restore_and_reset() {
        let mut kf = scalar();
        assert!(kf.snapshot().is_none());

        for z in [10.0, 10.5, 9.8, 10.1] {
            kf.update(&[z]).unwrap();
        }
        let snapshot = kf.snapshot().unwrap();

        let mut resumed = scalar();
        resumed.restore(&snapshot);
        assert_eq!(resumed.update_count(), 1);
        assert_eq!(resumed.update(&[10.2]).unwrap(), kf.update(&[10.2]).unwrap());
        assert_eq!(resumed.update_count(), 2);

        kf.reset();
        assert!(!kf.is_seeded());
        assert_eq!(kf.covariance(), &[[0.5]]);
        assert_eq!(kf.update_count(), 0);
    }

    #[test]
    fn configured_noise_is_never_mutated() {
        let mut kf = scalar();
        let config = *kf.config();

        kf.update(&[1.0]).unwrap();
        kf.update_with_noise(&[2.0], &[[1e8]]).unwrap();
        kf.update(&[3.0]).unwrap();

        assert_eq!(kf.config(), &config);
    }
}
