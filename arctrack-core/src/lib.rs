//! Extended Kalman filter core for arctrack
//!
//! Estimates the planar position and velocity of a projectile from a stream
//! of noisy position observations. The recursion and the fixed-dimension
//! matrix algebra underneath it are generic over state and observation
//! dimensions; the projectile physics is one pluggable model among others.
//!
//! Key constraints:
//! - No heap allocation in the filter hot path
//! - Matrix failures reported, never papered over with pseudo-inverses
//! - Divergence recovery is caller policy, not engine behavior
//!
//! ```no_run
//! use arctrack_core::filter::models::Projectile2d;
//! use arctrack_core::runner::Tracker;
//! use arctrack_core::stream::{CsvStream, Stream};
//!
//! let model = Projectile2d::new();
//! let config = Projectile2d::seed_config(0.1);
//! let mut tracker = Tracker::new(model, config, 0.1);
//!
//! let mut stream = CsvStream::<2>::open("measurements.csv")?.with_skip_lines(1);
//! tracker.run(&mut stream, |outcome| {
//!     // write the estimate, or note the recovery
//! })?;
//! # Ok::<(), arctrack_core::stream::StreamError<std::io::Error>>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod filter;
pub mod matrix;
pub mod stream;
pub mod traits;

#[cfg(feature = "std")]
pub mod runner;

// Public API
pub use errors::{FilterError, FilterResult};
pub use filter::{
    models::{ConstantVelocity2d, MotionModel, Projectile2d},
    Ekf, EkfConfig, Linearization,
};
pub use stream::{Sample, StreamError};
pub use traits::Stream;

#[cfg(feature = "std")]
pub use runner::{StepOutcome, Tracker, TrackerPhase};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
