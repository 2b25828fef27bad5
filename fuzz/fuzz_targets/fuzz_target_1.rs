#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate gps_uplink;

use std::io::Cursor;
use gps_uplink::{decode, Acquirer, FixRequest, LineReader, Wait};
use std::time::Duration;

struct NoWait;

impl Wait for NoWait {
    fn wait(&mut self, _: Duration) {}
}

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        let _ = decode(line, &FixRequest::new().with_time());
    }

    // the stream runs dry after `data`, the deadline ends the silence
    let reader = LineReader::new(Cursor::new(data), 64).unwrap().with_wait(NoWait);
    let mut acquirer = Acquirer::new(reader);
    let request = FixRequest::new().with_time().timeout(Duration::from_millis(1));
    while let Ok(_) = acquirer.acquire(&request) {}
});
