//! Error Types for Filter and Matrix Failures
//!
//! ## Design Philosophy
//!
//! Errors follow the same rules the rest of the crate does:
//!
//! 1. **Small Size**: each variant carries only inline data, since errors are
//!    returned from the per-tick hot path and may be stored in outcome records.
//!
//! 2. **No Heap Allocation**: no `String` payloads - only plain integers.
//!
//! 3. **Copy Semantics**: errors implement `Copy` so the tracking runner can
//!    stash a failure cause in its outcome without move complications.
//!
//! ## Error Categories
//!
//! - `DimensionMismatch`: a runtime-sized input (slice, CSV row) disagrees
//!   with the filter's compile-time dimensions. Fatal to the call; shapes are
//!   never silently coerced.
//! - `SingularMatrix`: a matrix that must be inverted (in practice the
//!   innovation covariance `S`) is numerically non-invertible. Recoverable at
//!   the caller level by discarding the tick or reseeding the filter.
//! - `DivergedState`: NaN or infinity found in the state vector *after* a
//!   nominally successful step. The engine never raises this itself - it
//!   performs no sanity checking on its own state - it is produced by the
//!   caller-side health scan in the tracking runner.

use thiserror_no_std::Error;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Filter errors - kept small and heap-free
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterError {
    /// Supplied data does not match the filter's dimensions
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Length the filter's dimensions require
        expected: usize,
        /// Length actually supplied
        actual: usize,
    },

    /// Matrix inversion failed: pivot below the singularity threshold
    #[error("Matrix is numerically singular")]
    SingularMatrix,

    /// NaN or infinity detected in the state vector by the caller-side scan
    #[error("State vector diverged (NaN or infinity)")]
    DivergedState,
}
