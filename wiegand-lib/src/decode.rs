//! Frame validation and payload extraction for the widely deployed Wiegand layouts.
//!
//! | bits | check                                   | payload        |
//! |------|-----------------------------------------|----------------|
//! | 4    | none                                    | all 4 bits     |
//! | 8    | low nibble is the complement of high    | low nibble     |
//! | 26   | even parity over 0..=12, odd over 13..=25 | bits 1..=24  |
//! | 32   | none                                    | all 32 bits    |
//! | 34   | even parity over 0..=16, odd over 17..=33 | bits 1..=32  |
//!
//! Bit 0 is the first bit on the wire.

use std::ops::Range;

use crate::buffer::Snapshot;
use crate::config::Config;
use crate::constants::*;
use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    None,
    Complement,
    SplitParity,
}

#[derive(Debug, Clone)]
struct Format {
    bits: u8,
    check: Check,
    payload: Range<u8>,
}

static FORMATS: [Format; 5] = [
    Format {
        bits: KEYPAD_4_BITS,
        check: Check::None,
        payload: 0..4,
    },
    Format {
        bits: KEYPAD_8_BITS,
        check: Check::Complement,
        payload: 4..8,
    },
    Format {
        bits: WIEGAND_26_BITS,
        check: Check::SplitParity,
        payload: 1..25,
    },
    Format {
        bits: WIEGAND_32_BITS,
        check: Check::None,
        payload: 0..32,
    },
    Format {
        bits: WIEGAND_34_BITS,
        check: Check::SplitParity,
        payload: 1..33,
    },
];

fn format_for(bits: u8) -> Option<&'static Format> {
    FORMATS.iter().find(|format| format.bits == bits)
}

/// Bits `range` of a frame (wire order), right-aligned.
fn extract(value: u128, count: u8, range: Range<u8>) -> u128 {
    let width = u32::from(range.end - range.start);
    if width == 0 {
        return 0;
    }
    (value >> (count - range.end)) & (u128::MAX >> (128 - width))
}

fn parity(value: u128) -> bool {
    value.count_ones() % 2 == 1
}

/// True when the first half has even parity and the second half odd parity.
pub fn split_parity_ok(value: u128, count: u8) -> bool {
    let half = count / 2;
    !parity(extract(value, count, 0..half)) && parity(extract(value, count, half..count))
}

fn verify(check: Check, value: u128, count: u8) -> bool {
    match check {
        Check::None => true,
        Check::Complement => {
            let high = extract(value, count, 0..4);
            let low = extract(value, count, 4..8);
            low == !high & 0x0F
        }
        Check::SplitParity => split_parity_ok(value, count),
    }
}

/// A frame accepted for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    payload: Snapshot,
}

impl Message {
    pub fn new(payload: Snapshot) -> Self {
        Self { payload }
    }

    /// Payload bytes, MSB-first, first byte zero-padded.
    pub fn data(&self) -> &[u8] {
        self.payload.as_bytes()
    }

    pub fn bits(&self) -> u8 {
        self.payload.bits()
    }

    /// Payload as an integer, or `None` if it does not fit in 64 bits.
    pub fn as_u64(&self) -> Option<u64> {
        u64::try_from(self.payload.value()).ok()
    }

    /// First 8 bits of a 24-bit (26-bit frame) payload.
    pub fn facility_code(&self) -> Option<u8> {
        (self.bits() == 24).then(|| self.data()[0])
    }

    /// Last 16 bits of a 24-bit (26-bit frame) payload.
    pub fn card_number(&self) -> Option<u16> {
        (self.bits() == 24).then(|| u16::from_be_bytes([self.data()[1], self.data()[2]]))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.payload
    }
}

/// A frame rejected with the reason and the raw bits as captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure {
    pub error: DataError,
    pub raw: Snapshot,
}

impl Failure {
    pub fn new(error: DataError, raw: Snapshot) -> Self {
        Self { error, raw }
    }
}

/// Turns a finished frame into a message or a failure. Pure: no state, no side effects.
pub fn decode(raw: &Snapshot, overflowed: bool, config: &Config) -> Result<Message, Failure> {
    let count = raw.bits();
    if overflowed {
        return Err(Failure::new(DataError::SizeTooBig, *raw));
    }
    if let Some(expected) = config.expected_length.fixed() {
        if count != expected {
            return Err(Failure::new(DataError::SizeUnexpected, *raw));
        }
    }
    if !config.decode_messages {
        return Ok(Message::new(*raw));
    }

    let format = format_for(count).ok_or(Failure::new(DataError::DecodeFailed, *raw))?;
    let value = raw.value();
    if !verify(format.check, value, count) {
        return Err(Failure::new(DataError::VerificationFailed, *raw));
    }

    let width = format.payload.end - format.payload.start;
    let payload = extract(value, count, format.payload.clone());
    Ok(Message::new(Snapshot::from_value(payload, width)))
}
