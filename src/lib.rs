//! Acquires position fixes from a GPS receiver on a serial line.
//!
//! The receiver speaks *NMEA 0183*. Lines are framed by a
//! [`LineReader`](framer/struct.LineReader.html), only `GGA` and `RMC`
//! sentences from GPS and GNSS talkers are looked at, and the
//! [`Acquirer`](acquire/struct.Acquirer.html) keeps reading until a position
//! sentence with coordinates arrives.
//!
//! ```no_run
//! use gps_uplink::{port, Acquirer, FixRequest, LineReader};
//!
//! # fn main() -> Result<(), gps_uplink::Error> {
//! let port = port::open("/dev/ttyUSB0", 9600)?;
//! let mut acquirer = Acquirer::new(LineReader::new(port, 255)?);
//! let fix = acquirer.acquire(&FixRequest::new().with_time())?;
//! println!("{:?}", fix.position);
//! acquirer.into_inner().into_inner().close()?;
//! # Ok(())
//! # }
//! ```

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
extern crate arrayvec;
extern crate chrono;
#[macro_use]
extern crate log;
#[macro_use]
extern crate quick_error;
#[cfg(unix)]
extern crate nix;
extern crate serialport;

pub mod acquire;
pub mod convert;
pub mod err;
pub mod framer;
pub mod port;
pub mod sentence;
pub mod sink;

pub use acquire::{decode, Acquirer, Discard, Fix, FixRequest, Position, Sentence};
pub use convert::{to_decimal_degrees, to_timestamp, FixTimestamp, Quadrant};
pub use err::{Error, ParseError};
pub use framer::{LineReader, ThreadSleep, Wait};
pub use port::{GpsPort, SessionConfig};
pub use sentence::{classify, split, Field, SentenceFields, SentenceKind};
pub use sink::{LogSink, PayloadFormat, Sink, WriterSink};
