//! Numeric conversions from raw NMEA fields.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::{self, FromStr};

use crate::err::ParseError;

/// A coordinate field of this length or shorter carries no fix.
const MIN_COORD_LEN: usize = 5;
/// `ddmmyy`
pub const DATE_FIELD_LEN: usize = 6;
/// `hhmmss.ss`
pub const TIME_FIELD_LEN: usize = 9;
/// NMEA years are two digits, counted from this year.
const EPOCH_YEAR: i32 = 2000;

/// The cardinal direction a coordinate is measured towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    North,
    South,
    East,
    West,
}

impl Quadrant {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'N' => Some(Quadrant::North),
            'S' => Some(Quadrant::South),
            'E' => Some(Quadrant::East),
            'W' => Some(Quadrant::West),
            _ => None,
        }
    }

    #[inline]
    fn sign(self) -> f64 {
        match self {
            Quadrant::North | Quadrant::East => 1.0,
            Quadrant::South | Quadrant::West => -1.0,
        }
    }
}

/// Whether `raw` is long enough to carry a coordinate at all.
pub fn has_coordinate(raw: &str) -> bool {
    raw.len() > MIN_COORD_LEN
}

/// Convert a coordinate in NMEA notation to signed decimal degrees.
///
/// Latitudes arrive as `ddmm.mmmm` and longitudes as `dddmm.mmmm`; which one
/// it is follows from whether the fifth character is the decimal point. The
/// result is negative in the southern and western quadrants.
///
/// Returns `0.0`, the "no fix" value, for fields of five characters or less.
/// Digits that cannot be read count as zero.
pub fn to_decimal_degrees(raw: &str, quadrant: char) -> f64 {
    if !has_coordinate(raw) {
        return 0.0;
    }
    let bytes = raw.as_bytes();

    let deg_split = if bytes[4] == b'.' { 2 } else { 3 };
    let (deg, min) = bytes.split_at(deg_split);
    let value = leading_int(deg) as f64 + leading_float(min) / 60.0;

    match Quadrant::from_char(quadrant) {
        Some(q) => value * q.sign(),
        None => value,
    }
}

/// Value of the longest integer prefix of `digits`, or 0.
fn leading_int(digits: &[u8]) -> i64 {
    let end = numeric_prefix(digits, false);
    parse_ascii(&digits[..end]).unwrap_or(0)
}

/// Value of the longest decimal prefix of `digits`, or 0.0.
fn leading_float(digits: &[u8]) -> f64 {
    let end = numeric_prefix(digits, true);
    parse_ascii(&digits[..end]).unwrap_or(0.0)
}

fn numeric_prefix(bytes: &[u8], allow_point: bool) -> usize {
    let mut end = 0;
    if let Some(b'-') | Some(b'+') = bytes.first() {
        end += 1;
    }
    let mut seen_point = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => (),
            b'.' if allow_point && !seen_point => seen_point = true,
            _ => break,
        }
        end += 1;
    }
    end
}

fn parse_ascii<T: FromStr>(bytes: &[u8]) -> Option<T> {
    str::from_utf8(bytes).ok().and_then(|s| T::from_str(s).ok())
}

/// UTC date and time of a fix, to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixTimestamp {
    /// Day of month, 1-31.
    pub day: u32,
    /// Month, 1-12. Unlike `struct tm`, not zero-based.
    pub month: u32,
    /// Full year, e.g. 2023. Unlike `struct tm`, not counted from 1900.
    pub year: i32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl FixTimestamp {
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?;
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, self.second)?;
        Some(NaiveDateTime::new(date, time))
    }
}

impl fmt::Display for FixTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Combine the `ddmmyy` date field and `hhmmss.ss` time field of an RMC
/// sentence. Fractional seconds are dropped, no timezone is applied.
pub fn to_timestamp(date: &str, time: &str) -> Result<FixTimestamp, ParseError> {
    if date.len() != DATE_FIELD_LEN {
        return Err(ParseError::InvalidTimestamp("date field must be ddmmyy"));
    }
    if time.len() != TIME_FIELD_LEN {
        return Err(ParseError::InvalidTimestamp("time field must be hhmmss.ss"));
    }

    let date = date.as_bytes();
    let time = time.as_bytes();
    let ts = FixTimestamp {
        day: two_digits(date, 0)?,
        month: two_digits(date, 2)?,
        year: EPOCH_YEAR + two_digits(date, 4)? as i32,
        hour: two_digits(time, 0)?,
        minute: two_digits(time, 2)?,
        second: two_digits(time, 4)?,
    };

    if ts.to_datetime().is_none() {
        return Err(ParseError::InvalidTimestamp("not a valid calendar date and time"));
    }
    Ok(ts)
}

fn two_digits(field: &[u8], at: usize) -> Result<u32, ParseError> {
    match field.get(at..at + 2) {
        Some(&[a, b]) if a.is_ascii_digit() && b.is_ascii_digit() => {
            Ok(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => Err(ParseError::InvalidTimestamp("expected two digits")),
    }
}
