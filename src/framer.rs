//! Turns the byte stream of a serial line into sentence lines.
//!
//! The receiver terminates each sentence with `\r\n`, but a single read may
//! return part of a line, several lines, or nothing at all. `LineReader`
//! keeps the partial tail between reads and hands out one complete line at a
//! time with the terminator removed.

use std::io::{self, ErrorKind};
use std::thread;
use std::time::Duration;

use crate::err::Error;

/// Size of a single read, matching the longest NMEA sentence with headroom.
pub const DEFAULT_BUFFER_SIZE: usize = 255;

/// Pause after a read that returned no data.
pub const SILENCE_BACKOFF: Duration = Duration::from_secs(1);

/// How the reader waits out a silent receiver.
pub trait Wait {
    fn wait(&mut self, period: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Wait for ThreadSleep {
    fn wait(&mut self, period: Duration) {
        thread::sleep(period);
    }
}

#[derive(Debug)]
pub struct LineReader<R, W = ThreadSleep> {
    input: R,
    wait: W,
    backoff: Duration,
    chunk: Vec<u8>,
    pending: Vec<u8>,
    // set while the rest of an oversized line is being thrown away
    overflowed: bool,
}

impl<R: io::Read> LineReader<R> {
    /// Create a reader that reads at most `buffer_size` bytes at once.
    /// A line longer than `buffer_size` is discarded.
    pub fn new(input: R, buffer_size: usize) -> Result<Self, Error> {
        if buffer_size == 0 {
            return Err(Error::EmptyBuffer);
        }
        Ok(LineReader {
            input,
            wait: ThreadSleep,
            backoff: SILENCE_BACKOFF,
            chunk: vec![0; buffer_size],
            pending: Vec::with_capacity(buffer_size),
            overflowed: false,
        })
    }
}

impl<R: io::Read, W: Wait> LineReader<R, W> {
    /// Replace the way silence is waited out.
    pub fn with_wait<V: Wait>(self, wait: V) -> LineReader<R, V> {
        LineReader {
            input: self.input,
            wait,
            backoff: self.backoff,
            chunk: self.chunk,
            pending: self.pending,
            overflowed: self.overflowed,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn buffer_size(&self) -> usize {
        self.chunk.len()
    }

    pub fn get_ref(&self) -> &R {
        &self.input
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    /// Block until a complete line is available.
    pub fn read_line(&mut self) -> Result<String, Error> {
        self.read_line_until(|| Ok(()))
    }

    /// Like `read_line`, but `check` runs before every read attempt and
    /// aborts the wait when it returns an error.
    pub fn read_line_until<F>(&mut self, mut check: F) -> Result<String, Error>
    where
        F: FnMut() -> Result<(), Error>,
    {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(line);
            }
            check()?;

            match self.input.read(&mut self.chunk) {
                Ok(0) => self.silence(),
                Ok(n) => self.push(n),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => (),
                Err(ref e)
                    if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock =>
                {
                    self.silence()
                }
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }

    fn silence(&mut self) {
        debug!(
            "No data from GPS module, trying again in {:?}",
            self.backoff
        );
        self.wait.wait(self.backoff);
    }

    fn push(&mut self, n: usize) {
        self.pending.extend_from_slice(&self.chunk[..n]);

        if !self.pending.contains(&b'\n') && self.pending.len() >= self.chunk.len() {
            debug!(
                "Discarding line longer than {} bytes",
                self.chunk.len()
            );
            self.pending.clear();
            self.overflowed = true;
        }
    }

    /// Pop the next complete, usable line from the pending bytes.
    fn take_line(&mut self) -> Option<String> {
        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=end).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            if self.overflowed {
                self.overflowed = false;
                continue;
            }
            if line.is_empty() {
                continue;
            }
            if !line.is_ascii() {
                debug!("Discarding line with non-ASCII bytes");
                continue;
            }
            match String::from_utf8(line) {
                Ok(line) => return Some(line),
                Err(_) => continue,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;

    /// Replays a fixed sequence of read results, then fails.
    struct Script(VecDeque<io::Result<Vec<u8>>>);

    impl Script {
        fn new(steps: Vec<io::Result<Vec<u8>>>) -> Self {
            Script(steps.into_iter().collect())
        }
    }

    fn chunk(bytes: &[u8]) -> io::Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }

    impl io::Read for Script {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(Ok(bytes)) => {
                    assert!(bytes.len() <= buf.len());
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(e)) => Err(e),
                None => Err(io::Error::new(ErrorKind::BrokenPipe, "script exhausted")),
            }
        }
    }

    #[derive(Default)]
    struct Waits(Vec<Duration>);

    impl<'a> Wait for &'a mut Waits {
        fn wait(&mut self, period: Duration) {
            self.0.push(period);
        }
    }

    #[test]
    fn empty_buffer_is_rejected() {
        assert_matches!(
            LineReader::new(Cursor::new(Vec::new()), 0),
            Err(Error::EmptyBuffer)
        );
    }

    #[test]
    fn strips_terminators() {
        let mut reader =
            LineReader::new(Cursor::new(b"$GPGGA,1\r\n$GPRMC,2\n".to_vec()), 255).unwrap();
        assert_eq!(reader.read_line().unwrap(), "$GPGGA,1");
        assert_eq!(reader.read_line().unwrap(), "$GPRMC,2");
    }

    #[test]
    fn silence_waits_and_retries() {
        let mut waits = Waits::default();
        let script = Script::new(vec![chunk(b""), chunk(b""), chunk(b"$GPGGA\r\n")]);
        let mut reader = LineReader::new(script, 255)
            .unwrap()
            .with_wait(&mut waits);

        assert_eq!(reader.read_line().unwrap(), "$GPGGA");
        drop(reader);
        assert_eq!(waits.0, vec![SILENCE_BACKOFF, SILENCE_BACKOFF]);
    }

    #[test]
    fn timed_out_read_counts_as_silence() {
        let mut waits = Waits::default();
        let script = Script::new(vec![
            Err(io::Error::new(ErrorKind::TimedOut, "timeout")),
            Err(io::Error::new(ErrorKind::Interrupted, "signal")),
            chunk(b"ok\n"),
        ]);
        let mut reader = LineReader::new(script, 16)
            .unwrap()
            .with_wait(&mut waits)
            .with_backoff(Duration::from_millis(5));

        assert_eq!(reader.read_line().unwrap(), "ok");
        drop(reader);
        assert_eq!(waits.0, vec![Duration::from_millis(5)]);
    }

    #[test]
    fn read_error_is_fatal() {
        let script = Script::new(vec![Err(io::Error::new(ErrorKind::Other, "unplugged"))]);
        let mut reader = LineReader::new(script, 255).unwrap();
        assert_matches!(reader.read_line(), Err(Error::Io(_)));
    }

    #[test]
    fn joins_short_reads() {
        let script = Script::new(vec![chunk(b"$GPG"), chunk(b"GA,12"), chunk(b"3\r"), chunk(b"\n")]);
        let mut reader = LineReader::new(script, 255).unwrap();
        assert_eq!(reader.read_line().unwrap(), "$GPGGA,123");
    }

    #[test]
    fn skips_empty_and_non_ascii_lines() {
        let input = b"\r\n\n\xff\xfe\n$GPRMC\n".to_vec();
        let mut reader = LineReader::new(Cursor::new(input), 255).unwrap();
        assert_eq!(reader.read_line().unwrap(), "$GPRMC");
    }

    #[test]
    fn oversized_line_is_dropped_entirely() {
        let script = Script::new(vec![chunk(b"0123456789"), chunk(b"abcdef\n"), chunk(b"short\n")]);
        let mut reader = LineReader::new(script, 10).unwrap();
        assert_eq!(reader.read_line().unwrap(), "short");
    }

    #[test]
    fn check_aborts_before_reading() {
        let script = Script::new(vec![chunk(b"never read\n")]);
        let mut reader = LineReader::new(script, 255).unwrap();
        assert_matches!(
            reader.read_line_until(|| Err(Error::Cancelled)),
            Err(Error::Cancelled)
        );
    }
}
