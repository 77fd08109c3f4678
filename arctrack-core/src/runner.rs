//! Tracking Runner: the reset-on-divergence driver loop
//!
//! ## Overview
//!
//! The engine itself never inspects its own health - NaN can enter through
//! the model physics and look like any other number to the matrix algebra.
//! This module owns that policy: it drives one engine instance through a
//! stream of samples, scans the state for NaN/infinity after every step, and
//! reseeds the engine when a step fails or the state diverges.
//!
//! ## State Machine
//!
//! ```text
//!            step ok, state finite
//!           ┌───────────────┐
//!           ▼               │
//!        Running ───────────┘
//!           │
//!           │ SingularMatrix or DivergedState
//!           ▼
//!      Reinitializing ── reseed x, P from the initial config ──▶ Running
//! ```
//!
//! Every recovery is reported in the step's [`StepOutcome`] and logged, so a
//! caller can always see what was or wasn't mutated. No retries happen here:
//! the sample that triggered the recovery is consumed, and tracking resumes
//! from the seed state on the next sample.

use log::warn;

use crate::{
    errors::FilterError,
    filter::{models::MotionModel, Ekf, EkfConfig},
    stream::{Sample, Stream, StreamError},
};

/// Driver-loop phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// Stepping the filter normally
    Running,
    /// A failure was detected; the engine is being reseeded
    Reinitializing,
}

/// Per-step estimate snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate<const N: usize> {
    /// Timestamp of the sample that produced this estimate
    pub time: f64,
    /// State estimate after the step
    pub state: [f64; N],
    /// Covariance diagonal after the step
    pub variances: [f64; N],
}

/// What one processed sample produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome<const N: usize> {
    /// The step succeeded and the state is finite
    Estimate(Estimate<N>),
    /// The step failed or diverged; the engine was reseeded
    Recovered {
        /// Engine steps completed when the failure was detected
        after_steps: u64,
        /// What went wrong
        cause: FilterError,
    },
}

/// Drives one filter instance over a measurement stream
///
/// Owns the engine, the motion model, and the fixed per-tick `dt`. One
/// tracker per tracked object; instances share nothing.
pub struct Tracker<Mdl, const N: usize, const M: usize> {
    ekf: Ekf<N, M>,
    model: Mdl,
    dt: f64,
    phase: TrackerPhase,
    resets: u32,
}

impl<Mdl, const N: usize, const M: usize> Tracker<Mdl, N, M>
where
    Mdl: MotionModel<N, M>,
{
    /// Create a tracker from a model, engine seeds, and tick length
    pub fn new(model: Mdl, config: EkfConfig<N, M>, dt: f64) -> Self {
        Self {
            ekf: Ekf::new(config),
            model,
            dt,
            phase: TrackerPhase::Running,
            resets: 0,
        }
    }

    /// Current phase
    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    /// Number of recoveries so far
    pub fn resets(&self) -> u32 {
        self.resets
    }

    /// The underlying engine, read-only
    pub fn ekf(&self) -> &Ekf<N, M> {
        &self.ekf
    }

    /// Process one sample: linearize, step, health-check, maybe recover
    pub fn process(&mut self, sample: &Sample<M>) -> StepOutcome<N> {
        let lin = self.model.linearize(self.ekf.state(), self.dt);

        if let Err(cause) = self.ekf.step(&lin, &sample.values) {
            return self.recover(cause);
        }

        // Caller-side health check: the engine does not police its own state.
        if self.ekf.state().iter().any(|v| !v.is_finite()) {
            return self.recover(FilterError::DivergedState);
        }

        StepOutcome::Estimate(Estimate {
            time: sample.time,
            state: *self.ekf.state(),
            variances: self.ekf.uncertainty(),
        })
    }

    fn recover(&mut self, cause: FilterError) -> StepOutcome<N> {
        let after_steps = self.ekf.steps();
        warn!(
            "tracker recovery after {} steps: {}; reseeding filter",
            after_steps, cause
        );

        self.phase = TrackerPhase::Reinitializing;
        self.ekf.reset();
        self.phase = TrackerPhase::Running;
        self.resets += 1;

        StepOutcome::Recovered { after_steps, cause }
    }

    /// Drain a stream, feeding every sample through the tracker
    ///
    /// Invokes `sink` with each outcome. Returns the number of samples
    /// processed, or the first transport/format error the stream reports.
    pub fn run<E, S, F>(
        &mut self,
        stream: &mut S,
        mut sink: F,
    ) -> Result<usize, StreamError<E>>
    where
        S: Stream<Item = Sample<M>, Error = StreamError<E>>,
        F: FnMut(&StepOutcome<N>),
    {
        let mut processed = 0;
        loop {
            match stream.poll_next() {
                Ok(sample) => {
                    let outcome = self.process(&sample);
                    sink(&outcome);
                    processed += 1;
                }
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(StreamError::EndOfStream)) => break,
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
        Ok(processed)
    }
}
