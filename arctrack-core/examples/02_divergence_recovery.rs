//! Divergence Recovery Example
//!
//! Shows the tracking runner's reset policy in action: a NaN measurement
//! poisons the state, the health scan catches it, and the filter reseeds and
//! keeps tracking.
//!
//! ## Running the Example
//!
//! ```bash
//! RUST_LOG=warn cargo run --example 02_divergence_recovery
//! ```

use arctrack_core::filter::models::ConstantVelocity2d;
use arctrack_core::filter::EkfConfig;
use arctrack_core::runner::{StepOutcome, Tracker};
use arctrack_core::stream::Sample;

fn main() {
    println!("arctrack Divergence Recovery Example");
    println!("====================================\n");

    let config = EkfConfig::<4, 2>::default()
        .with_initial_covariance(10.0)
        .with_process_noise(1e-3)
        .with_measurement_noise([2.0, 2.0]);
    let mut tracker = Tracker::new(ConstantVelocity2d, config, 0.1);

    // A clean track with one poisoned sample in the middle
    let mut samples: Vec<Sample<2>> = (1..=10)
        .map(|k| Sample {
            time: k as f64 * 0.1,
            values: [k as f64, k as f64],
        })
        .collect();
    samples[5].values[0] = f64::NAN;

    for sample in &samples {
        match tracker.process(sample) {
            StepOutcome::Estimate(est) => {
                println!(
                    "t = {:.1}s  position ({:6.2}, {:6.2})  velocity ({:6.2}, {:6.2})",
                    est.time, est.state[0], est.state[1], est.state[2], est.state[3]
                );
            }
            StepOutcome::Recovered { after_steps, cause } => {
                println!(
                    "t = {:.1}s  !! {} after {} steps - filter reseeded",
                    sample.time, cause, after_steps
                );
            }
        }
    }

    println!("\nRecoveries: {}", tracker.resets());
    println!("The engine itself never checks for NaN - the runner owns that policy.");
}
