//! Serial line the GPS receiver is attached to.
//!
//! The line is always configured as 8 data bits, no parity, 1 stop bit and
//! no flow control. Line framing is not left to the terminal driver, see
//! [`LineReader`](../framer/struct.LineReader.html).

use serialport::{self, DataBits, FlowControl, Parity, StopBits};
use std::io::{self, Read, Write};
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::io::{IntoRawFd, RawFd};

#[cfg(unix)]
type NativePort = serialport::TTYPort;
#[cfg(windows)]
type NativePort = serialport::COMPort;

use crate::err::Error;

/// The only baud rate the receiver is driven at.
pub const SUPPORTED_BAUD_RATE: u32 = 9600;

/// Bound on a single blocking read before the port reports silence.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings for one acquisition session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Path of the serial device, e.g. `/dev/ttyUSB0`.
    pub device_path: String,
    /// Must equal [`SUPPORTED_BAUD_RATE`].
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl SessionConfig {
    pub fn new<P: Into<String>>(device_path: P, baud_rate: u32) -> Self {
        SessionConfig {
            device_path: device_path.into(),
            baud_rate,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Rejects settings that can never be opened, without touching the device.
    pub fn validate(&self) -> Result<(), Error> {
        if self.baud_rate != SUPPORTED_BAUD_RATE {
            return Err(Error::UnsupportedBaudRate(self.baud_rate));
        }
        Ok(())
    }
}

/// Open the device at `device_path` with the default read timeout.
pub fn open(device_path: &str, baud_rate: u32) -> Result<GpsPort, Error> {
    GpsPort::open(&SessionConfig::new(device_path, baud_rate))
}

/// An open serial line. Dropping it releases the device without reporting
/// errors, `close` drains pending output and reports a failed release.
pub struct GpsPort {
    path: String,
    port: NativePort,
}

impl GpsPort {
    pub fn open(config: &SessionConfig) -> Result<Self, Error> {
        config.validate()?;

        let port = serialport::new(config.device_path.as_str(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open_native()
            .map_err(|e| Error::PortUnavailable(config.device_path.clone(), e))?;

        info!(
            "Opened GPS port {} at {} baud",
            config.device_path, config.baud_rate
        );
        Ok(GpsPort::from_native(config.device_path.clone(), port))
    }

    fn from_native(path: String, port: NativePort) -> Self {
        GpsPort { path, port }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Drain pending output and release the device. Consuming `self` makes
    /// a second close impossible.
    pub fn close(mut self) -> Result<(), Error> {
        self.port.flush().map_err(Error::Close)?;
        let path = self.path;

        #[cfg(unix)]
        release(self.port.into_raw_fd())?;
        #[cfg(windows)]
        drop(self.port);

        info!("Closed GPS port {}", path);
        Ok(())
    }
}

/// close(2) on a descriptor nothing else owns any more.
#[cfg(unix)]
fn release(fd: RawFd) -> Result<(), Error> {
    nix::unistd::close(fd).map_err(|errno| Error::Close(io::Error::from(errno)))
}

impl io::Read for GpsPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl std::fmt::Debug for GpsPort {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("GpsPort").field("path", &self.path).finish()
    }
}
