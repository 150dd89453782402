mod error;
mod replay;
mod trace;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wiegand_lib::constants::DEFAULT_TIMEOUT_MS;
use wiegand_lib::pulse::{PulseTiming, PulseTrain, encode_26, encode_34, encode_keypad_4, encode_keypad_8};
use wiegand_lib::{Config, Length, Snapshot};

use crate::replay::{Replayer, Report, Stamped};

/// Decode Wiegand reader traffic from line-level traces.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a recorded trace file ("-" for stdin)
    Replay {
        file: PathBuf,

        /// Do not assume the lines were idle before the first sample
        #[arg(long)]
        cold: bool,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Synthesize the line traffic for a frame
    Simulate {
        #[command(flatten)]
        frame: FrameArgs,

        /// Print the trace instead of decoding it
        #[arg(long)]
        emit: bool,

        /// Time of the first falling edge
        #[arg(long, default_value_t = 0)]
        start_ms: u32,

        /// Time between consecutive bits
        #[arg(long, default_value_t = 2)]
        interval_ms: u32,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Expected frame length in bits, or "any" to end frames by timeout
    #[arg(long, default_value = "any", value_parser = parse_length)]
    bits: Length,

    /// Deliver frames without validating or stripping parity
    #[arg(long)]
    raw: bool,

    /// Silence that ends an any-length frame
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u32,

    /// How often the timeout is polled
    #[arg(long, default_value_t = 5)]
    poll_ms: u32,

    /// One JSON object per report
    #[arg(long)]
    json: bool,
}

impl EngineArgs {
    fn config(&self) -> Config {
        Config::new(self.bits, !self.raw).with_timeout_ms(self.timeout_ms)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum FrameFormat {
    Keypad4,
    Keypad8,
    W26,
    W34,
    Raw,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[arg(long, value_enum, default_value_t = FrameFormat::W26)]
    format: FrameFormat,

    /// Facility code (26-bit)
    #[arg(long, default_value_t = 0)]
    facility: u8,

    /// Card number (26-bit) or payload (34-bit)
    #[arg(long, default_value_t = 0)]
    card: u32,

    /// Key 0-15 (keypad formats)
    #[arg(long, default_value_t = 0)]
    key: u8,

    /// Bit string such as 1011 (raw format)
    #[arg(long)]
    bits_str: Option<String>,
}

fn parse_length(s: &str) -> Result<Length, String> {
    if s.eq_ignore_ascii_case("any") {
        return Ok(Length::Any);
    }
    let bits = s
        .parse::<u8>()
        .map_err(|e| format!("expected a bit count or 'any': {}", e))?;
    let length = Length::Bits(bits);
    Config::new(length, true).validate().map_err(|e| e.to_string())?;
    Ok(length)
}

fn build_frame(args: &FrameArgs) -> Result<Snapshot> {
    let frame = match args.format {
        FrameFormat::Keypad4 => encode_keypad_4(args.key),
        FrameFormat::Keypad8 => encode_keypad_8(args.key),
        FrameFormat::W26 => {
            let card = u16::try_from(args.card).context("26-bit card numbers are 16 bits")?;
            encode_26(args.facility, card)
        }
        FrameFormat::W34 => encode_34(args.card),
        FrameFormat::Raw => {
            let bits = args.bits_str.as_deref().context("--bits-str is required for raw frames")?;
            if bits.is_empty() || bits.len() > usize::from(wiegand_lib::constants::MAX_BITS) {
                bail!("raw frames need 1 to {} bits", wiegand_lib::constants::MAX_BITS);
            }
            let value = u128::from_str_radix(bits, 2)
                .map_err(|e| error::Error::Frame(format!("'{}' is not a bit string: {}", bits, e)))?;
            Snapshot::from_value(value, bits.len() as u8)
        }
    };
    Ok(frame)
}

fn print_report(stamped: &Stamped, as_json: bool) {
    let at_ms = stamped.at_ms;
    if as_json {
        let value = match &stamped.report {
            Report::Received { data, bits } => json!({
                "at_ms": at_ms,
                "event": "received",
                "data": hex::encode(data),
                "bits": bits,
            }),
            Report::Rejected { error, raw, bits } => json!({
                "at_ms": at_ms,
                "event": "error",
                "error": error.to_string(),
                "code": u8::from(*error),
                "raw": hex::encode(raw),
                "bits": bits,
            }),
            Report::Connectivity { connected } => json!({
                "at_ms": at_ms,
                "event": "connectivity",
                "connected": connected,
            }),
        };
        println!("{}", value);
        return;
    }

    match &stamped.report {
        Report::Received { data, bits } => {
            if *bits == 24 {
                let card = u16::from_be_bytes([data[1], data[2]]);
                println!(
                    "[{:>8} ms] {} bits: {} (facility {}, card {})",
                    at_ms,
                    bits,
                    hex::encode(data),
                    data[0],
                    card
                );
            } else {
                println!("[{:>8} ms] {} bits: {}", at_ms, bits, hex::encode(data));
            }
        }
        Report::Rejected { error, raw, bits } => println!(
            "[{:>8} ms] error {}: {} ({} raw bits: {})",
            at_ms,
            error,
            error.description(),
            bits,
            hex::encode(raw)
        ),
        Report::Connectivity { connected } => println!(
            "[{:>8} ms] reader {}",
            at_ms,
            if *connected { "connected" } else { "disconnected" }
        ),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::builder()
        .with_default_directive(cli.verbose.tracing_level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Command::Replay { file, cold, engine } => {
            let samples = if file.as_os_str() == "-" {
                trace::read_trace(io::stdin().lock())?
            } else {
                let reader = File::open(&file).with_context(|| format!("opening {}", file.display()))?;
                trace::read_trace(BufReader::new(reader)).with_context(|| format!("reading {}", file.display()))?
            };
            info!("Loaded {} samples", samples.len());

            let mut replayer = Replayer::new(engine.config(), engine.poll_ms)?;
            if !cold {
                replayer.prime_idle();
            }
            for stamped in replayer.run(samples) {
                print_report(&stamped, engine.json);
            }
        }
        Command::Simulate {
            frame,
            emit,
            start_ms,
            interval_ms,
            engine,
        } => {
            let snapshot = build_frame(&frame)?;
            info!("Simulating {:?}", snapshot);
            let train = PulseTrain::new(
                snapshot,
                PulseTiming {
                    start_ms,
                    pulse_ms: 0,
                    interval_ms,
                },
            );

            if emit {
                trace::write_trace(io::stdout().lock(), train)?;
            } else {
                let mut replayer = Replayer::new(engine.config(), engine.poll_ms)?;
                replayer.prime_idle();
                for stamped in replayer.run(train) {
                    print_report(&stamped, engine.json);
                }
            }
        }
    }

    Ok(())
}
