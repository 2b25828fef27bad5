//! Boundary to the telemetry sink that fixes are published to.
//!
//! Delivering payloads to a message broker is the sink's business. This
//! module only renders a [`Fix`](../acquire/struct.Fix.html) into a payload
//! string and defines what a sink looks like.

use std::io::{self, Write};

use crate::acquire::Fix;

/// Something that accepts a payload for a topic.
pub trait Sink {
    fn publish(&mut self, payload: &str, topic: &str) -> io::Result<()>;
}

/// How a fix is rendered into a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum PayloadFormat {
    /// `Latitude : 48.117300`
    Latitude,
    /// `48.117300,-11.516667`
    Position,
    /// Latitude, longitude, satellites and UTC, where known.
    Full,
}

impl PayloadFormat {
    pub fn render(self, fix: &Fix) -> String {
        let pos = &fix.position;
        match self {
            PayloadFormat::Latitude => format!("Latitude : {:.6}", pos.latitude),
            PayloadFormat::Position => format!("{:.6},{:.6}", pos.latitude, pos.longitude),
            PayloadFormat::Full => {
                let mut payload = format!(
                    "Latitude : {:.6}, Longitude : {:.6}",
                    pos.latitude, pos.longitude
                );
                if let Some(n) = fix.satellites {
                    payload.push_str(&format!(", Satellites : {}", n));
                }
                if let Some(ref utc) = fix.utc {
                    payload.push_str(&format!(", UTC : {}", utc));
                }
                payload
            }
        }
    }
}

impl Default for PayloadFormat {
    fn default() -> Self {
        PayloadFormat::Latitude
    }
}

/// Writes `<topic> <payload>` lines, e.g. to stdout.
#[derive(Debug)]
pub struct WriterSink<W> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        WriterSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn publish(&mut self, payload: &str, topic: &str) -> io::Result<()> {
        writeln!(self.out, "{} {}", topic, payload)?;
        self.out.flush()
    }
}

/// Publishes into the log at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl Sink for LogSink {
    fn publish(&mut self, payload: &str, topic: &str) -> io::Result<()> {
        info!("[{}] {}", topic, payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::Position;
    use crate::convert::FixTimestamp;

    fn fix() -> Fix {
        Fix {
            position: Position {
                latitude: 48.1173,
                longitude: -11.516_666_666,
            },
            satellites: Some(8),
            utc: None,
        }
    }

    #[test]
    fn render_formats() {
        let fix = fix();
        assert_eq!(PayloadFormat::Latitude.render(&fix), "Latitude : 48.117300");
        assert_eq!(PayloadFormat::Position.render(&fix), "48.117300,-11.516667");
        assert_eq!(
            PayloadFormat::Full.render(&fix),
            "Latitude : 48.117300, Longitude : -11.516667, Satellites : 8"
        );
    }

    #[test]
    fn render_full_with_time() {
        let mut fix = fix();
        fix.satellites = None;
        fix.utc = Some(FixTimestamp {
            day: 23,
            month: 3,
            year: 2094,
            hour: 12,
            minute: 35,
            second: 19,
        });
        assert_eq!(
            PayloadFormat::Full.render(&fix),
            "Latitude : 48.117300, Longitude : -11.516667, UTC : 2094-03-23T12:35:19Z"
        );
    }

    #[test]
    fn writer_sink_writes_lines() {
        let mut sink = WriterSink::new(Vec::new());
        sink.publish("Latitude : 48.117300", "gps/position").unwrap();
        sink.publish("48.117300,-11.516667", "gps/position").unwrap();
        assert_eq!(
            String::from_utf8(sink.into_inner()).unwrap(),
            "gps/position Latitude : 48.117300\ngps/position 48.117300,-11.516667\n"
        );
    }

    #[test]
    fn log_sink_accepts_everything() {
        assert!(LogSink.publish("", "").is_ok());
    }
}
