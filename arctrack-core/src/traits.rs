//! Core Traits and Extension Points
//!
//! ## Design Philosophy
//!
//! Trait seams sit where a caller plugs behavior into the core: the motion
//! model (in [`filter::models`](crate::filter::models)) and the measurement
//! source (here). Streams follow a pull-based model using the `nb` crate for
//! non-blocking I/O, so consumers control when data is read and no async
//! runtime is required.
//!
//! ## Common Patterns
//!
//! ```rust,ignore
//! use arctrack_core::traits::Stream;
//!
//! fn drain<S: Stream>(stream: &mut S) -> Result<(), S::Error> {
//!     loop {
//!         match stream.poll_next() {
//!             Ok(item) => handle(item),
//!             Err(nb::Error::WouldBlock) => return Ok(()), // try again later
//!             Err(nb::Error::Other(e)) => return Err(e),
//!         }
//!     }
//! }
//! ```

/// Core stream trait for measurement sources
///
/// ## Implementation Notes
///
/// - Implementations should be lazy and pull-based
/// - Use `nb::Error::WouldBlock` when no data is available yet
/// - Memory allocation should be predictable/bounded
/// - Consider implementing `size_hint()` when the remaining length is known
///
/// ## Error Handling
///
/// Streams use a two-level error model:
/// - `nb::Error::WouldBlock` - temporary unavailability
/// - `nb::Error::Other(E)` - actual stream errors
pub trait Stream {
    /// Type of items produced by the stream
    type Item;

    /// Type of errors the stream can report
    type Error;

    /// Attempt to produce the next item
    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error>;

    /// Bounds on the number of remaining items, `(lower, upper)`
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}
