//! CSV file streaming for recorded measurements
//!
//! Reads measurement logs line by line: the first field is the timestamp in
//! seconds, followed by M observation fields. Lines are pulled through a
//! fixed 4 KiB read buffer and a bounded line buffer, so memory use does not
//! depend on file size.
//!
//! ```csv
//! time,x,y
//! 0.1,0.98,1.03
//! 0.2,2.01,1.95
//! ```
//!
//! Blank lines and `#` comments are skipped. Malformed lines are counted in
//! [`StreamStats`] and skipped rather than aborting the run - a long recording
//! with a few mangled rows should still replay. Additional trailing fields
//! beyond the expected `1 + M` are ignored.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::{Sample, Stream, StreamError};

/// Statistics for CSV streaming
#[derive(Debug, Default, Clone)]
pub struct StreamStats {
    /// Samples parsed successfully
    pub samples_read: usize,
    /// Total lines processed (including skipped and malformed)
    pub lines_processed: usize,
    /// Malformed lines skipped
    pub parse_errors: usize,
    /// Bytes read from the file
    pub bytes_read: usize,
}

/// CSV-backed measurement stream
///
/// ## Example
///
/// ```rust,no_run
/// use arctrack_core::stream::{CsvStream, Stream};
///
/// let mut stream = CsvStream::<2>::open("measurements.csv")?
///     .with_skip_lines(1); // skip the header row
///
/// while let Ok(sample) = stream.poll_next() {
///     // feed the tracker
/// }
/// # Ok::<(), arctrack_core::stream::StreamError<std::io::Error>>(())
/// ```
pub struct CsvStream<const M: usize> {
    /// File handle
    file: File,
    /// Read buffer
    buffer: [u8; 4096],
    /// Current position in buffer
    buffer_pos: usize,
    /// Valid bytes in buffer
    buffer_len: usize,
    /// Bounded line buffer
    line_buffer: heapless::String<256>,
    /// Whether EOF has been reached
    eof: bool,
    /// Skip first N lines (for headers)
    skip_lines: usize,
    /// Lines already skipped
    lines_skipped: usize,
    /// Statistics
    stats: StreamStats,
}

impl<const M: usize> CsvStream<M> {
    /// Open a measurement CSV
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StreamError<io::Error>> {
        let file = File::open(path).map_err(StreamError::Transport)?;

        Ok(Self {
            file,
            buffer: [0; 4096],
            buffer_pos: 0,
            buffer_len: 0,
            line_buffer: heapless::String::new(),
            eof: false,
            skip_lines: 0,
            lines_skipped: 0,
            stats: StreamStats::default(),
        })
    }

    /// Skip the first N lines (useful for headers)
    pub fn with_skip_lines(mut self, lines: usize) -> Self {
        self.skip_lines = lines;
        self
    }

    /// Get statistics
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Refill the read buffer from the file
    fn refill_buffer(&mut self) -> Result<bool, StreamError<io::Error>> {
        if self.eof {
            return Ok(false);
        }

        // Move remaining data to the beginning
        if self.buffer_pos < self.buffer_len {
            let remaining = self.buffer_len - self.buffer_pos;
            self.buffer.copy_within(self.buffer_pos..self.buffer_len, 0);
            self.buffer_len = remaining;
        } else {
            self.buffer_len = 0;
        }
        self.buffer_pos = 0;

        let bytes_read = self
            .file
            .read(&mut self.buffer[self.buffer_len..])
            .map_err(StreamError::Transport)?;

        if bytes_read == 0 {
            self.eof = true;
            return Ok(self.buffer_len > 0);
        }

        self.buffer_len += bytes_read;
        self.stats.bytes_read += bytes_read;
        Ok(true)
    }

    /// Read the next line into `line_buffer`; false on end of file
    fn read_line(&mut self) -> Result<bool, StreamError<io::Error>> {
        self.line_buffer.clear();

        loop {
            while self.buffer_pos < self.buffer_len {
                let byte = self.buffer[self.buffer_pos];
                self.buffer_pos += 1;

                if byte == b'\n' {
                    self.stats.lines_processed += 1;

                    if self.lines_skipped < self.skip_lines {
                        self.lines_skipped += 1;
                        self.line_buffer.clear();
                        continue;
                    }

                    return Ok(true);
                } else if byte != b'\r' {
                    if self.line_buffer.push(byte as char).is_err() {
                        return Err(StreamError::Overflow);
                    }
                }
            }

            if !self.refill_buffer()? {
                // EOF: flush a final unterminated line if present
                if !self.line_buffer.is_empty() && self.lines_skipped >= self.skip_lines {
                    self.stats.lines_processed += 1;
                    return Ok(true);
                }
                return Ok(false);
            }
        }
    }
}

/// Parse one `time,v₁,…` line into a sample
///
/// Requires at least `1 + M` comma-separated fields; extras are ignored.
fn parse_sample<const M: usize>(line: &str) -> Result<Sample<M>, &'static str> {
    let mut fields = line.split(',').map(str::trim);

    let time = fields
        .next()
        .filter(|f| !f.is_empty())
        .ok_or("missing timestamp field")?
        .parse::<f64>()
        .map_err(|_| "invalid timestamp")?;

    let mut values = [0.0; M];
    for slot in values.iter_mut() {
        let field = fields.next().ok_or("too few observation fields")?;
        *slot = field.parse::<f64>().map_err(|_| "invalid observation value")?;
    }

    Ok(Sample { time, values })
}

impl<const M: usize> Stream for CsvStream<M> {
    type Item = Sample<M>;
    type Error = StreamError<io::Error>;

    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error> {
        loop {
            if !self.read_line()? {
                return Err(nb::Error::Other(StreamError::EndOfStream));
            }

            let line = self.line_buffer.as_str();
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_sample::<M>(line) {
                Ok(sample) => {
                    self.stats.samples_read += 1;
                    return Ok(sample);
                }
                Err(_) => {
                    self.stats.parse_errors += 1;
                    continue;
                }
            }
        }
    }
}

// Extension methods for batch processing
impl<const M: usize> CsvStream<M> {
    /// Drain the file, invoking `callback` for every sample
    pub fn process_all<F>(
        &mut self,
        mut callback: F,
    ) -> Result<StreamStats, StreamError<io::Error>>
    where
        F: FnMut(&Sample<M>),
    {
        loop {
            match self.poll_next() {
                Ok(sample) => callback(&sample),
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(StreamError::EndOfStream)) => break,
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }

        Ok(self.stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn parses_time_and_observations() {
        let file = write_csv("time,x,y\n0.1,1.5,2.5\n0.2,3.0,4.0\n");
        let mut stream = CsvStream::<2>::open(file.path()).unwrap().with_skip_lines(1);

        let first = stream.poll_next().unwrap();
        assert_eq!(first.time, 0.1);
        assert_eq!(first.values, [1.5, 2.5]);

        let second = stream.poll_next().unwrap();
        assert_eq!(second.values, [3.0, 4.0]);

        assert!(matches!(
            stream.poll_next(),
            Err(nb::Error::Other(StreamError::EndOfStream))
        ));
        assert_eq!(stream.stats().samples_read, 2);
        assert_eq!(stream.stats().parse_errors, 0);
    }

    #[test]
    fn skips_malformed_and_comment_lines() {
        let file = write_csv(
            "0.1,1.0,1.0\n# calibration pause\nnot,a,number\n0.2\n\n0.3,2.0,2.0\n",
        );
        let mut stream = CsvStream::<2>::open(file.path()).unwrap();

        assert_eq!(stream.poll_next().unwrap().time, 0.1);
        assert_eq!(stream.poll_next().unwrap().time, 0.3);
        assert!(stream.poll_next().is_err());

        // "not,a,number" and the short "0.2" line are parse errors;
        // the comment and the blank line are not.
        assert_eq!(stream.stats().parse_errors, 2);
        assert_eq!(stream.stats().samples_read, 2);
    }

    #[test]
    fn ignores_extra_trailing_fields() {
        let file = write_csv("0.1,1.0,2.0,99.0,98.0\n");
        let mut stream = CsvStream::<2>::open(file.path()).unwrap();

        let sample = stream.poll_next().unwrap();
        assert_eq!(sample.values, [1.0, 2.0]);
    }

    #[test]
    fn handles_missing_trailing_newline() {
        let file = write_csv("0.1,1.0,2.0\n0.2,3.0,4.0");
        let mut stream = CsvStream::<2>::open(file.path()).unwrap();

        assert_eq!(stream.poll_next().unwrap().time, 0.1);
        assert_eq!(stream.poll_next().unwrap().time, 0.2);
        assert!(stream.poll_next().is_err());
    }

    #[test]
    fn process_all_collects_everything() {
        let file = write_csv("t,x,y\n0.1,1.0,1.0\n0.2,2.0,2.0\n0.3,3.0,3.0\n");
        let mut stream = CsvStream::<2>::open(file.path()).unwrap().with_skip_lines(1);

        let mut times = Vec::new();
        let stats = stream.process_all(|sample| times.push(sample.time)).unwrap();

        assert_eq!(times, vec![0.1, 0.2, 0.3]);
        assert_eq!(stats.samples_read, 3);
    }
}
