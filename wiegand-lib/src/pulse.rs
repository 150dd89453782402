//! Frame encoding and line-level pulse generation, the transmitting side of the protocol.
//!
//! Used to synthesize reader traffic for simulation and tests.

use crate::buffer::Snapshot;
use crate::decode::split_parity_ok;
use crate::line::Line;

fn with_split_parity(data: u128, data_bits: u8) -> Snapshot {
    let count = data_bits + 2;
    let half_data = data_bits / 2;
    let first = (data >> (data_bits - half_data)).count_ones() % 2 == 1;
    let second = (data & ((1u128 << (data_bits - half_data)) - 1)).count_ones() % 2 == 0;
    let value = (u128::from(first) << (count - 1)) | (data << 1) | u128::from(second);
    debug_assert!(split_parity_ok(value, count));
    Snapshot::from_value(value, count)
}

/// 26-bit card frame: even parity, 8-bit facility code, 16-bit card number, odd parity.
pub fn encode_26(facility: u8, card: u16) -> Snapshot {
    with_split_parity((u128::from(facility) << 16) | u128::from(card), 24)
}

/// 34-bit card frame around a 32-bit payload.
pub fn encode_34(payload: u32) -> Snapshot {
    with_split_parity(u128::from(payload), 32)
}

/// 8-bit keypad frame: key nibble complement, then the key nibble.
pub fn encode_keypad_8(key: u8) -> Snapshot {
    let key = key & 0x0F;
    Snapshot::from_value(u128::from(((!key & 0x0F) << 4) | key), 8)
}

/// 4-bit keypad frame, no check bits.
pub fn encode_keypad_4(key: u8) -> Snapshot {
    Snapshot::from_value(u128::from(key & 0x0F), 4)
}

/// One line transition at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSample {
    pub at_ms: u32,
    pub line: Line,
    pub level: bool,
}

/// Pulse shape. Readers typically pulse for 50-100 µs every 1-2 ms; at millisecond resolution a
/// zero-length pulse is a falling and rising edge in the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTiming {
    pub start_ms: u32,
    pub pulse_ms: u32,
    pub interval_ms: u32,
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self {
            start_ms: 0,
            pulse_ms: 0,
            interval_ms: 2,
        }
    }
}

/// Iterator over the line transitions that transmit a frame, falling edge then rising edge
/// per bit. Times wrap at `u32`, like the receiver's clock.
#[derive(Debug, Clone)]
pub struct PulseTrain {
    frame: Snapshot,
    timing: PulseTiming,
    index: u8,
    released: bool,
}

impl PulseTrain {
    pub fn new(frame: Snapshot, timing: PulseTiming) -> Self {
        Self {
            frame,
            timing,
            index: 0,
            released: false,
        }
    }

    /// Time of the last rising edge, when the line returns to idle.
    pub fn end_ms(&self) -> u32 {
        let bits = u32::from(self.frame.bits());
        self.timing
            .start_ms
            .wrapping_add(bits.saturating_sub(1).wrapping_mul(self.timing.interval_ms))
            .wrapping_add(self.timing.pulse_ms)
    }
}

impl Iterator for PulseTrain {
    type Item = LineSample;

    fn next(&mut self) -> Option<LineSample> {
        let bit = self.frame.bit(self.index)?;
        let line = if bit { Line::Data1 } else { Line::Data0 };
        let start = self
            .timing
            .start_ms
            .wrapping_add(u32::from(self.index).wrapping_mul(self.timing.interval_ms));

        let sample = if self.released {
            self.released = false;
            self.index += 1;
            LineSample {
                at_ms: start.wrapping_add(self.timing.pulse_ms),
                line,
                level: true,
            }
        } else {
            self.released = true;
            LineSample {
                at_ms: start,
                line,
                level: false,
            }
        };
        Some(sample)
    }
}
