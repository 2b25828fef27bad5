//! The acquisition loop: read lines until one of them is a usable position fix.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::convert::{has_coordinate, to_decimal_degrees, to_timestamp, FixTimestamp};
use crate::err::{Error, ParseError};
use crate::framer::{LineReader, ThreadSleep, Wait};
use crate::sentence::{classify, split, Field, SentenceKind, MAX_FIELDS};

/// Latitude and longitude in decimal degrees. A zero in either means
/// "no fix yet".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    /// Negative south of the equator.
    pub latitude: f64,
    /// Negative west of Greenwich.
    pub longitude: f64,
}

impl Position {
    pub fn is_fix(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }
}

/// A position fix as handed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub position: Position,
    /// Satellites in use, if the receiver reported them.
    pub satellites: Option<u32>,
    /// Date and time from the last RMC sentence before the fix. Only set
    /// when the request asked for it.
    pub utc: Option<FixTimestamp>,
}

/// What a single call to [`Acquirer::acquire`] should do.
#[derive(Debug, Clone, Default)]
pub struct FixRequest {
    /// Decode date and time from RMC sentences.
    pub parse_time: bool,
    /// Give up with `Error::Timeout` after this long.
    pub timeout: Option<Duration>,
    /// Give up with `Error::Cancelled` once this is set.
    pub stop: Option<Arc<AtomicBool>>,
}

impl FixRequest {
    pub fn new() -> Self {
        FixRequest::default()
    }

    pub fn with_time(mut self) -> Self {
        self.parse_time = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn stop_on(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn check(&self, started: Instant) -> Result<(), Error> {
        if let Some(ref stop) = self.stop {
            if stop.load(Ordering::SeqCst) {
                return Err(Error::Cancelled);
            }
        }
        if let Some(timeout) = self.timeout {
            if started.elapsed() >= timeout {
                return Err(Error::Timeout(timeout));
            }
        }
        Ok(())
    }
}

/// Content extracted from one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    Position {
        position: Position,
        satellites: Option<u32>,
    },
    TimeDate(FixTimestamp),
}

/// Why a line did not contribute to a fix.
#[derive(Debug, Clone, PartialEq)]
pub enum Discard {
    /// Talker or sentence type not understood.
    Unrecognized,
    TooFewFields { kind: SentenceKind, found: usize },
    /// A position sentence without coordinates.
    NoFix,
    /// A time sentence while time was not requested.
    TimeNotRequested,
    Invalid(ParseError),
}

impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Discard::Unrecognized => write!(f, "unrecognized sentence"),
            Discard::TooFewFields { kind, found } => write!(
                f,
                "{} sentence has {} fields, needs {}",
                kind.id(),
                found,
                kind.min_fields()
            ),
            Discard::NoFix => write!(f, "no position fix yet"),
            Discard::TimeNotRequested => write!(f, "time was not requested"),
            Discard::Invalid(err) => write!(f, "{}", err),
        }
    }
}

/// Extract whatever `line` holds that is useful for `request`.
pub fn decode(line: &str, request: &FixRequest) -> Result<Sentence, Discard> {
    let kind = classify(line).ok_or(Discard::Unrecognized)?;
    if kind == SentenceKind::TimeDate && !request.parse_time {
        return Err(Discard::TimeNotRequested);
    }

    let fields = split(line, MAX_FIELDS).map_err(Discard::Invalid)?;
    if fields.len() < kind.min_fields() {
        return Err(Discard::TooFewFields {
            kind,
            found: fields.len(),
        });
    }
    let field = |f: Field| fields.field(kind, f).unwrap_or("");

    match kind {
        SentenceKind::Position => {
            let (lat, lon) = (field(Field::Latitude), field(Field::Longitude));
            if !has_coordinate(lat) || !has_coordinate(lon) {
                return Err(Discard::NoFix);
            }
            let position = Position {
                latitude: to_decimal_degrees(lat, quadrant(field(Field::LatitudeQuadrant))),
                longitude: to_decimal_degrees(lon, quadrant(field(Field::LongitudeQuadrant))),
            };
            if !position.is_fix() {
                return Err(Discard::NoFix);
            }
            Ok(Sentence::Position {
                position,
                satellites: field(Field::Satellites).parse().ok(),
            })
        }
        SentenceKind::TimeDate => to_timestamp(field(Field::Date), field(Field::Time))
            .map(Sentence::TimeDate)
            .map_err(Discard::Invalid),
    }
}

#[inline]
fn quadrant(field: &str) -> char {
    field.chars().next().unwrap_or('\0')
}

/// Drives a [`LineReader`] until a fix is found.
#[derive(Debug)]
pub struct Acquirer<R, W = ThreadSleep> {
    reader: LineReader<R, W>,
}

impl<R: io::Read, W: Wait> Acquirer<R, W> {
    pub fn new(reader: LineReader<R, W>) -> Self {
        Acquirer { reader }
    }

    pub fn into_inner(self) -> LineReader<R, W> {
        self.reader
    }

    /// Block until a position sentence with coordinates arrives.
    ///
    /// Everything else is skipped. Returns early only on a read error, or
    /// when the request times out or is stopped.
    pub fn acquire(&mut self, request: &FixRequest) -> Result<Fix, Error> {
        let started = Instant::now();
        let mut utc = None;

        loop {
            let line = self.reader.read_line_until(|| request.check(started))?;
            match decode(&line, request) {
                Ok(Sentence::Position {
                    position,
                    satellites,
                }) => {
                    info!(
                        "Fix at {:.6}, {:.6} ({} satellites)",
                        position.latitude,
                        position.longitude,
                        satellites.map_or("?".to_string(), |n| n.to_string())
                    );
                    return Ok(Fix {
                        position,
                        satellites,
                        utc,
                    });
                }
                Ok(Sentence::TimeDate(ts)) => {
                    debug!("UTC {}", ts);
                    utc = Some(ts);
                }
                Err(reason) => trace!("Discarding {:?}: {}", line, reason),
            }
        }
    }
}
