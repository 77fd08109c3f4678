//! Memory-based streams for testing and replay

use super::{Sample, Stream, StreamError};

/// In-memory measurement stream
///
/// Streams a borrowed slice of samples, for unit tests and for replaying
/// recorded runs without touching the filesystem.
///
/// ## Example
///
/// ```rust
/// use arctrack_core::stream::{MemoryStream, Sample, Stream};
///
/// let samples = [
///     Sample { time: 0.1, values: [1.0, 1.0] },
///     Sample { time: 0.2, values: [2.0, 2.0] },
/// ];
///
/// let mut stream = MemoryStream::new(&samples);
/// while let Ok(sample) = stream.poll_next() {
///     // feed the tracker
/// }
/// ```
pub struct MemoryStream<'a, const M: usize> {
    /// Samples to stream
    samples: &'a [Sample<M>],
    /// Current position
    position: usize,
}

impl<'a, const M: usize> MemoryStream<'a, M> {
    /// Create new memory stream from a slice
    pub fn new(samples: &'a [Sample<M>]) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    /// Rewind to the beginning
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Current position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Check if the stream is exhausted
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.samples.len()
    }
}

impl<'a, const M: usize> Stream for MemoryStream<'a, M> {
    type Item = Sample<M>;
    type Error = StreamError<()>;

    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error> {
        if self.position >= self.samples.len() {
            return Err(nb::Error::Other(StreamError::EndOfStream));
        }

        let sample = self.samples[self.position];
        self.position += 1;
        Ok(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.samples.len() - self.position;
        (remaining, Some(remaining))
    }
}
