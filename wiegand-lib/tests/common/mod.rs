//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use wiegand_lib::constants::*;
#[allow(unused_imports)]
pub use wiegand_lib::pulse::{PulseTiming, PulseTrain, encode_26, encode_34, encode_keypad_4, encode_keypad_8};
#[allow(unused_imports)]
pub use wiegand_lib::{Config, ConnectivityState, DataError, Length, Line, Snapshot, Wiegand, decode};

use std::sync::{Arc, Mutex};

/// Everything the handlers reported, in order
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Received { data: Vec<u8>, bits: u8 },
    Error { error: DataError, raw: Vec<u8>, bits: u8 },
    State(bool),
}

pub type Events = Arc<Mutex<Vec<Event>>>;

/// Routes the engine's tracing output to the test harness; `RUST_LOG=trace` shows every bit
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Engine with all three handlers recording into a shared log, lines primed idle
#[allow(dead_code)]
pub fn recording_wiegand(config: Config) -> (Wiegand, Events) {
    let mut wiegand = Wiegand::new(config).expect("valid config");
    let events: Events = Arc::new(Mutex::new(Vec::new()));

    wiegand.on_receive(
        |message, events: &mut Events| {
            events.lock().unwrap().push(Event::Received {
                data: message.data().to_vec(),
                bits: message.bits(),
            })
        },
        events.clone(),
    );
    wiegand.on_receive_error(
        |failure, events: &mut Events| {
            events.lock().unwrap().push(Event::Error {
                error: failure.error,
                raw: failure.raw.as_bytes().to_vec(),
                bits: failure.raw.bits(),
            })
        },
        events.clone(),
    );
    wiegand.on_state_change(
        |connected, events: &mut Events| events.lock().unwrap().push(Event::State(connected)),
        events.clone(),
    );

    wiegand.set_data0(true);
    wiegand.set_data1(true);
    (wiegand, events)
}

/// Takes and clears the recorded events
#[allow(dead_code)]
pub fn drain(events: &Events) -> Vec<Event> {
    std::mem::take(&mut *events.lock().unwrap())
}

/// Pulses one bit per entry, 2 ms apart starting at `start_ms`. Returns the time of the last bit.
#[allow(dead_code)]
pub fn send_bits(wiegand: &mut Wiegand, bits: &[u8], start_ms: u32) -> u32 {
    let mut at = start_ms;
    for (i, &bit) in bits.iter().enumerate() {
        at = start_ms + 2 * i as u32;
        let line = if bit == 1 { Line::Data1 } else { Line::Data0 };
        wiegand.set_line_at(at, line, false);
        wiegand.set_line_at(at, line, true);
    }
    at
}

/// Transmits a whole frame starting at `start_ms`. Returns the time of the last edge.
#[allow(dead_code)]
pub fn send_frame(wiegand: &mut Wiegand, frame: Snapshot, start_ms: u32) -> u32 {
    let train = PulseTrain::new(
        frame,
        PulseTiming {
            start_ms,
            ..PulseTiming::default()
        },
    );
    let end = train.end_ms();
    for sample in train {
        wiegand.set_line_at(sample.at_ms, sample.line, sample.level);
    }
    end
}

/// Frame from a string of '0'/'1' characters
#[allow(dead_code)]
pub fn frame(bits: &str) -> Snapshot {
    let value = u128::from_str_radix(bits, 2).expect("binary string");
    Snapshot::from_value(value, bits.len() as u8)
}
