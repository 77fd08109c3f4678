//! Extended Kalman Filter Engine
//!
//! ## Overview
//!
//! This module implements the predict/update recursion that turns a stream of
//! noisy, partial observations into a running estimate of a process state.
//! The engine owns the state vector and its error covariance; the process
//! physics live outside it, supplied per tick as a [`Linearization`] by a
//! [`MotionModel`](crate::filter::models::MotionModel).
//!
//! ## Filter Recursion
//!
//! ### 1. Prediction Step
//! ```text
//! State prediction:      x̂ₖ|ₖ₋₁ = f(xₖ₋₁)          (model-supplied fx)
//! Covariance prediction: Pₖ|ₖ₋₁ = F·Pₖ₋₁·Fᵀ + Q
//! ```
//!
//! ### 2. Update Step
//! ```text
//! Innovation:      yₖ = zₖ - h(x̂ₖ|ₖ₋₁)             (model-supplied hx)
//! Innovation cov:  Sₖ = H·Pₖ|ₖ₋₁·Hᵀ + R
//! Kalman gain:     Kₖ = Pₖ|ₖ₋₁·Hᵀ·Sₖ⁻¹
//! State update:    x̂ₖ = x̂ₖ|ₖ₋₁ + Kₖ·yₖ
//! Covariance:      Pₖ = (I - Kₖ·H)·Pₖ|ₖ₋₁
//! ```
//!
//! ## Numerical Stability
//!
//! - Covariance symmetrized after every predict and every update - cheap at
//!   these dimensions and keeps floating-point drift from breaking the
//!   symmetric-PSD invariant over long runs
//! - Innovation covariance inverted with pivoted Gauss-Jordan elimination;
//!   near-singular `S` is reported, never silently pseudo-inverted
//!
//! ## Failure Semantics
//!
//! [`Ekf::step`] runs predict and update back-to-back. When the update fails
//! (singular `S`), the predict phase has already been applied and is **not
//! rolled back**: `x` and `P` hold exactly the predicted values. Callers that
//! treat a failed step as fatal should reseed the engine; see the tracking
//! runner. The engine performs no NaN/bounds checking of its own state - NaN
//! can enter through the model physics, so divergence detection belongs to
//! the caller.
//!
//! ## Usage Example
//!
//! ```rust
//! use arctrack_core::filter::{Ekf, EkfConfig};
//! use arctrack_core::filter::models::{MotionModel, ConstantVelocity2d};
//!
//! let config = EkfConfig::<4, 2>::default()
//!     .with_initial_covariance(10.0)
//!     .with_process_noise(0.01)
//!     .with_measurement_noise([2.0, 2.0]);
//!
//! let model = ConstantVelocity2d;
//! let mut ekf = Ekf::new(config);
//!
//! let lin = model.linearize(ekf.state(), 0.1);
//! ekf.step(&lin, &[1.0, 1.0]).unwrap();
//! ```

pub mod models;

use crate::{
    errors::FilterResult,
    matrix::{self, Matrix, SquareMatrix, Vector},
};

/// Filter configuration: the seeds for `x`, `P`, `Q`, `R`
///
/// ## Type Parameters
/// - `N`: state vector dimension
/// - `M`: observation vector dimension
///
/// Invariants the seeds are expected to satisfy (not re-checked per call):
/// `initial_covariance` symmetric positive semi-definite, `process_noise`
/// symmetric with non-negative diagonal, `measurement_noise` symmetric
/// positive definite.
#[derive(Debug, Clone, Copy)]
pub struct EkfConfig<const N: usize, const M: usize> {
    /// Initial state estimate
    pub initial_state: Vector<N>,
    /// Initial covariance (uncertainty of the initial state)
    pub initial_covariance: SquareMatrix<N>,
    /// Process noise covariance (Q), injected every predict step
    pub process_noise: SquareMatrix<N>,
    /// Measurement noise covariance (R)
    pub measurement_noise: SquareMatrix<M>,
}

impl<const N: usize, const M: usize> Default for EkfConfig<N, M> {
    fn default() -> Self {
        let mut initial_covariance = [[0.0; N]; N];
        let mut process_noise = [[0.0; N]; N];
        let mut measurement_noise = [[0.0; M]; M];

        for i in 0..N {
            initial_covariance[i][i] = 1.0;
            process_noise[i][i] = 0.01;
        }
        for i in 0..M {
            measurement_noise[i][i] = 0.1;
        }

        Self {
            initial_state: [0.0; N],
            initial_covariance,
            process_noise,
            measurement_noise,
        }
    }
}

impl<const N: usize, const M: usize> EkfConfig<N, M> {
    /// Set the initial state estimate
    pub fn with_initial_state(mut self, state: Vector<N>) -> Self {
        self.initial_state = state;
        self
    }

    /// Set a uniform diagonal initial covariance
    pub fn with_initial_covariance(mut self, variance: f64) -> Self {
        for i in 0..N {
            self.initial_covariance[i][i] = variance;
        }
        self
    }

    /// Set a uniform diagonal process noise (higher = less trust in the model)
    pub fn with_process_noise(mut self, noise: f64) -> Self {
        for i in 0..N {
            self.process_noise[i][i] = noise;
        }
        self
    }

    /// Set the measurement noise variance per observed component
    pub fn with_measurement_noise(mut self, variances: [f64; M]) -> Self {
        for i in 0..M {
            self.measurement_noise[i][i] = variances[i];
        }
        self
    }
}

/// One tick's linearization of the process and measurement models
///
/// Produced fresh by the model every tick, evaluated at the engine's current
/// state and the tick's `dt`, consumed immediately by [`Ekf::step`]. Nothing
/// in here survives between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linearization<const N: usize, const M: usize> {
    /// Predicted state f(x), the model's forecast after `dt`
    pub predicted_state: Vector<N>,
    /// State-transition Jacobian F = ∂f/∂x evaluated at the current state
    pub transition_jacobian: SquareMatrix<N>,
    /// Predicted observation h(f(x)), what the sensor should read
    pub predicted_measurement: Vector<M>,
    /// Observation Jacobian H = ∂h/∂x
    pub measurement_jacobian: Matrix<M, N>,
}

/// Extended Kalman filter over an N-dimensional state and M-dimensional
/// observation
///
/// One engine instance per tracked object. Steps on a single instance must be
/// strictly ordered; independent instances share nothing and can run on
/// separate threads freely.
pub struct Ekf<const N: usize, const M: usize> {
    /// Current state estimate
    state: Vector<N>,
    /// Estimation error covariance
    covariance: SquareMatrix<N>,
    /// Retained seeds, used by [`Ekf::reset`]
    config: EkfConfig<N, M>,
    /// Successful steps since construction or last reset
    steps: u64,
}

impl<const N: usize, const M: usize> Ekf<N, M> {
    /// Create a new filter seeded from `config`
    pub fn new(config: EkfConfig<N, M>) -> Self {
        Self {
            state: config.initial_state,
            covariance: config.initial_covariance,
            config,
            steps: 0,
        }
    }

    /// Prediction phase: adopt the model's forecast and grow the uncertainty
    ///
    /// `x ← fx`, `P ← F·P·Fᵀ + Q`, then symmetrize.
    pub fn predict(&mut self, lin: &Linearization<N, M>) {
        self.state = lin.predicted_state;

        // P = F·P·Fᵀ + Q
        let mut fp = [[0.0; N]; N];
        matrix::multiply(&lin.transition_jacobian, &self.covariance, &mut fp);

        let mut f_transpose = [[0.0; N]; N];
        matrix::transpose(&lin.transition_jacobian, &mut f_transpose);

        let mut fpft = [[0.0; N]; N];
        matrix::multiply(&fp, &f_transpose, &mut fpft);

        matrix::add(&fpft, &self.config.process_noise, &mut self.covariance);
        matrix::make_symmetric(&mut self.covariance);
    }

    /// Update phase: blend the prediction with an observation
    ///
    /// Fails with [`crate::FilterError::SingularMatrix`] when the innovation
    /// covariance cannot be inverted; in that case `x` and `P` are left
    /// untouched by this call.
    pub fn update(
        &mut self,
        lin: &Linearization<N, M>,
        measurement: &Vector<M>,
    ) -> FilterResult<()> {
        // Innovation: y = z − hx
        let mut innovation = [0.0; M];
        for i in 0..M {
            innovation[i] = measurement[i] - lin.predicted_measurement[i];
        }

        // S = H·P·Hᵀ + R
        let mut h_transpose = [[0.0; M]; N];
        matrix::transpose(&lin.measurement_jacobian, &mut h_transpose);

        let mut hp = [[0.0; N]; M];
        matrix::multiply(&lin.measurement_jacobian, &self.covariance, &mut hp);

        let mut hpht = [[0.0; M]; M];
        matrix::multiply(&hp, &h_transpose, &mut hpht);

        let mut innovation_cov = [[0.0; M]; M];
        matrix::add(&hpht, &self.config.measurement_noise, &mut innovation_cov);

        // Invert S before touching any engine state, so a singular update
        // leaves the predict-phase values in place.
        let mut s_inv = [[0.0; M]; M];
        matrix::invert(&innovation_cov, &mut s_inv)?;

        // K = P·Hᵀ·S⁻¹
        let mut pht = [[0.0; M]; N];
        matrix::multiply(&self.covariance, &h_transpose, &mut pht);

        let mut gain = [[0.0; M]; N];
        matrix::multiply(&pht, &s_inv, &mut gain);

        // x ← x + K·y
        let mut correction = [0.0; N];
        matrix::matvec(&gain, &innovation, &mut correction);
        for i in 0..N {
            self.state[i] += correction[i];
        }

        // P ← (I − K·H)·P
        let mut kh = [[0.0; N]; N];
        matrix::multiply(&gain, &lin.measurement_jacobian, &mut kh);

        let mut i_kh = matrix::identity::<N>();
        for i in 0..N {
            for j in 0..N {
                i_kh[i][j] -= kh[i][j];
            }
        }

        let prior = self.covariance;
        matrix::multiply(&i_kh, &prior, &mut self.covariance);
        matrix::make_symmetric(&mut self.covariance);

        Ok(())
    }

    /// One full tick: predict, then update, back-to-back
    ///
    /// On [`crate::FilterError::SingularMatrix`] the predict phase stays
    /// applied: `x` and `P` hold the predicted (not the pre-step) values. This partial
    /// application is deliberate, inspected behavior: the caller can always
    /// see what was mutated and decide on recovery.
    pub fn step(
        &mut self,
        lin: &Linearization<N, M>,
        measurement: &Vector<M>,
    ) -> FilterResult<()> {
        self.predict(lin);
        self.update(lin, measurement)?;
        self.steps += 1;
        Ok(())
    }

    /// Current state estimate, read-only
    pub fn state(&self) -> &Vector<N> {
        &self.state
    }

    /// Current error covariance, read-only
    pub fn covariance(&self) -> &SquareMatrix<N> {
        &self.covariance
    }

    /// Covariance diagonal: the per-component variances
    pub fn uncertainty(&self) -> [f64; N] {
        let mut variances = [0.0; N];
        for i in 0..N {
            variances[i] = self.covariance[i][i];
        }
        variances
    }

    /// Successful steps since construction or the last reset
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Reseed `x` and `P` from the retained config
    pub fn reset(&mut self) {
        self.state = self.config.initial_state;
        self.covariance = self.config.initial_covariance;
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FilterError;
    use crate::filter::models::{ConstantVelocity2d, MotionModel};

    #[test]
    fn update_pulls_state_toward_measurement() {
        let config = EkfConfig::<4, 2>::default()
            .with_initial_covariance(10.0)
            .with_process_noise(0.001)
            .with_measurement_noise([2.0, 2.0]);
        let mut ekf = Ekf::new(config);
        let model = ConstantVelocity2d;

        let lin = model.linearize(ekf.state(), 0.1);
        ekf.step(&lin, &[5.0, -3.0]).unwrap();

        // Large P0 relative to R: the estimate should move most of the way.
        assert!(ekf.state()[0] > 3.0);
        assert!(ekf.state()[1] < -1.8);
        assert_eq!(ekf.steps(), 1);
    }

    #[test]
    fn update_shrinks_uncertainty() {
        let config = EkfConfig::<4, 2>::default()
            .with_initial_covariance(10.0)
            .with_measurement_noise([2.0, 2.0]);
        let mut ekf = Ekf::new(config);
        let model = ConstantVelocity2d;

        let before = ekf.uncertainty();
        let lin = model.linearize(ekf.state(), 0.1);
        ekf.step(&lin, &[0.0, 0.0]).unwrap();
        let after = ekf.uncertainty();

        // Observed components tighten
        assert!(after[0] < before[0]);
        assert!(after[1] < before[1]);
    }

    #[test]
    fn singular_update_reports_and_keeps_prediction() {
        // R = 0 with H = 0 makes S exactly singular.
        let mut config = EkfConfig::<4, 2>::default().with_initial_covariance(10.0);
        config.measurement_noise = [[0.0; 2]; 2];

        let mut stepped = Ekf::new(config);
        let mut predicted_only = Ekf::new(config);

        let model = ConstantVelocity2d;
        let mut lin = model.linearize(stepped.state(), 0.1);
        lin.measurement_jacobian = [[0.0; 4]; 2];

        assert_eq!(
            stepped.step(&lin, &[1.0, 1.0]),
            Err(FilterError::SingularMatrix)
        );
        predicted_only.predict(&lin);

        // Exactly the predict-phase values: no rollback, no partial update.
        assert_eq!(stepped.state(), predicted_only.state());
        assert_eq!(stepped.covariance(), predicted_only.covariance());
        assert_eq!(stepped.steps(), 0);
    }

    #[test]
    fn reset_restores_seed() {
        let config = EkfConfig::<4, 2>::default()
            .with_initial_state([1.0, 2.0, 3.0, 4.0])
            .with_initial_covariance(7.0);
        let mut ekf = Ekf::new(config);
        let model = ConstantVelocity2d;

        let lin = model.linearize(ekf.state(), 0.1);
        ekf.step(&lin, &[9.0, 9.0]).unwrap();
        assert_ne!(ekf.state(), &[1.0, 2.0, 3.0, 4.0]);

        ekf.reset();
        assert_eq!(ekf.state(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ekf.uncertainty(), [7.0; 4]);
        assert_eq!(ekf.steps(), 0);
    }
}
