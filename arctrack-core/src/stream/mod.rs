//! Measurement Streams
//!
//! Sources of timestamped observation samples for the tracking loop:
//! - Core types and errors (this file)
//! - [`memory`] - in-memory streams for tests and replay
//! - [`csv`] - CSV file streams (requires `std`)

use core::fmt;

pub mod memory;

#[cfg(feature = "std")]
pub mod csv;

pub use memory::MemoryStream;

#[cfg(feature = "std")]
pub use csv::{CsvStream, StreamStats};

pub use crate::traits::Stream;

/// One measurement tick: a timestamp plus M observed values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<const M: usize> {
    /// Timestamp in seconds
    pub time: f64,
    /// Observed values for this tick
    pub values: [f64; M],
}

/// Errors that can occur during stream processing
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError<E> {
    /// Transport-level error (e.g., I/O error)
    Transport(E),
    /// Data format error
    Format(&'static str),
    /// End of stream reached
    EndOfStream,
    /// Line exceeded the bounded buffer
    Overflow,
}

impl<E: fmt::Display> fmt::Display for StreamError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Transport error: {}", e),
            Self::Format(msg) => write!(f, "Format error: {}", msg),
            Self::EndOfStream => write!(f, "End of stream"),
            Self::Overflow => write!(f, "Line buffer overflow"),
        }
    }
}
