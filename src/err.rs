use std::io;
use std::time::Duration;

use crate::port::SUPPORTED_BAUD_RATE;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        UnsupportedBaudRate(baud_rate: u32) {
            display("Baud rate {} not supported, only {} is accepted", baud_rate, SUPPORTED_BAUD_RATE)
        }
        PortUnavailable(path: String, err: serialport::Error) {
            display("Cannot open GPS port {}: {}", path, err)
            source(err)
        }
        Close(err: io::Error) {
            display("Cannot close GPS port: {}", err)
            source(err)
        }
        Io(err: io::Error) {
            from()
            display("Encountered I/O error while reading from the GPS port: {}", err)
            source(err)
        }
        EmptyBuffer {
            display("The read buffer must hold at least one byte")
        }
        Timeout(limit: Duration) {
            display("No valid fix within {:?}", limit)
        }
        Cancelled {
            display("Acquisition was cancelled")
        }
        Parse(err: ParseError) {
            from()
            display("Could not parse sentence: {}", err)
            source(err)
        }
    }
}

quick_error! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum ParseError {
        FieldCapacity(requested: usize, capacity: usize) {
            display("Tried to split into {} fields, the field buffer holds {}", requested, capacity)
        }
        InvalidTimestamp(reason: &'static str) {
            display("Invalid timestamp: {}", reason)
        }
    }
}
