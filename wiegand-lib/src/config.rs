use std::fmt;

use crate::constants::{DEFAULT_TIMEOUT_MS, LENGTH_ANY, MAX_BITS};
use crate::error::WiegandError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the end of a frame is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Length {
    /// Frame ends after `timeout_ms` without a new bit
    #[default]
    Any,
    /// Frame ends as soon as this many bits are captured
    Bits(u8),
}

impl Length {
    /// Maps the raw byte convention (`LENGTH_ANY` or a bit count) to a `Length`.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            LENGTH_ANY => Length::Any,
            bits => Length::Bits(bits),
        }
    }

    pub fn to_raw(self) -> u8 {
        match self {
            Length::Any => LENGTH_ANY,
            Length::Bits(bits) => bits,
        }
    }

    pub fn fixed(self) -> Option<u8> {
        match self {
            Length::Any => None,
            Length::Bits(bits) => Some(bits),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Any => write!(f, "any"),
            Length::Bits(bits) => write!(f, "{} bits", bits),
        }
    }
}

/// Engine configuration, fixed at `begin` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    pub expected_length: Length,
    /// When false, frames are delivered raw (passthrough)
    pub decode_messages: bool,
    pub timeout_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expected_length: Length::Any,
            decode_messages: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    pub fn new(expected_length: Length, decode_messages: bool) -> Self {
        Self {
            expected_length,
            decode_messages,
            ..Self::default()
        }
    }

    pub fn with_expected_length(mut self, expected_length: Length) -> Self {
        self.expected_length = expected_length;
        self
    }

    pub fn with_decode_messages(mut self, decode_messages: bool) -> Self {
        self.decode_messages = decode_messages;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn validate(&self) -> Result<(), WiegandError> {
        match self.expected_length {
            Length::Bits(bits) if bits == 0 || bits > MAX_BITS => {
                Err(WiegandError::InvalidLength { bits, max: MAX_BITS })
            }
            _ => Ok(()),
        }
    }
}
