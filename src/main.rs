//! Relays GPS fixes from a serial NMEA receiver to a telemetry topic.

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use std::io;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gps_uplink::framer::DEFAULT_BUFFER_SIZE;
use gps_uplink::port::SUPPORTED_BAUD_RATE;
use gps_uplink::{
    Acquirer, Error, FixRequest, GpsPort, LineReader, PayloadFormat, SessionConfig, Sink,
    WriterSink,
};

#[derive(Parser, Debug)]
#[command(name = "gps-uplink", version)]
#[command(about = "Read position fixes from an NMEA 0183 GPS receiver and publish them")]
struct Cli {
    /// Serial port the GPS receiver is connected to, e.g. /dev/ttyUSB0
    device: String,
    /// Baud rate to connect with, only 9600 is supported
    #[arg(default_value_t = SUPPORTED_BAUD_RATE)]
    baud_rate: u32,
    /// Topic the payload is published to
    #[arg(long, default_value = "gps/position")]
    topic: String,
    #[arg(long, value_enum, default_value_t = PayloadFormat::Latitude)]
    format: PayloadFormat,
    /// Also decode date and time from RMC sentences
    #[arg(long)]
    time: bool,
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,
    /// Bound on a single blocking read from the port
    #[arg(long, default_value_t = 1000)]
    read_timeout_ms: u64,
    /// Give up on a fix after this many seconds and try again
    #[arg(long)]
    fix_timeout_secs: Option<u64>,
    /// Publish a single fix and exit
    #[arg(long)]
    once: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("gps-uplink: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let stop = install_ctrlc_handler()?;

    let config = SessionConfig::new(cli.device.as_str(), cli.baud_rate)
        .read_timeout(Duration::from_millis(cli.read_timeout_ms));
    let port = GpsPort::open(&config).context("cannot open GPS port")?;
    let reader = LineReader::new(port, cli.buffer_size)?;
    let mut acquirer = Acquirer::new(reader);

    let mut request = FixRequest::new().stop_on(stop);
    request.parse_time = cli.time;
    request.timeout = cli.fix_timeout_secs.map(Duration::from_secs);

    let mut sink = WriterSink::new(io::stdout());
    let result = relay(&mut acquirer, &request, &mut sink, &cli);

    acquirer
        .into_inner()
        .into_inner()
        .close()
        .context("cannot close GPS port")?;
    result
}

fn relay<R, S>(
    acquirer: &mut Acquirer<R>,
    request: &FixRequest,
    sink: &mut S,
    cli: &Cli,
) -> Result<()>
where
    R: io::Read,
    S: Sink,
{
    loop {
        let fix = match acquirer.acquire(request) {
            Ok(fix) => fix,
            Err(Error::Timeout(limit)) => {
                warn!("No fix within {:?}, still waiting", limit);
                continue;
            }
            Err(Error::Cancelled) => {
                info!("Stopping");
                return Ok(());
            }
            Err(e) => return Err(e).context("cannot get data from GPS receiver"),
        };

        let payload = cli.format.render(&fix);
        info!("Publishing {:?} to {}", payload, cli.topic);
        if let Err(e) = sink.publish(&payload, &cli.topic) {
            error!("Publishing to {} failed: {}", cli.topic, e);
        }

        if cli.once {
            return Ok(());
        }
    }
}

fn install_ctrlc_handler() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_for_signal = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        stop_for_signal.store(true, Ordering::SeqCst);
    })
    .context("installing Ctrl-C handler failed")?;
    Ok(stop)
}
