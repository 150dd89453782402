use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why a captured frame could not be delivered as a message.
///
/// Delivered through the receive-error handler together with the raw bits; never returned
/// from the input calls.
#[derive(Error, Debug, Display, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum DataError {
    /// First bit arrived without the lines ever having been seen idle
    Communication = 0,
    /// More bits than the buffer can hold
    SizeTooBig = 1,
    /// A fixed length is configured and the frame ended with a different count
    SizeUnexpected = 2,
    /// Decoding requested but the length matches no known format
    DecodeFailed = 3,
    /// Known length, but its check bits are wrong
    VerificationFailed = 4,
}

impl DataError {
    pub fn description(&self) -> &'static str {
        match self {
            DataError::Communication => "bits received before the lines were seen idle",
            DataError::SizeTooBig => "frame exceeds the bit buffer capacity",
            DataError::SizeUnexpected => "frame length differs from the configured length",
            DataError::DecodeFailed => "no known format for this frame length",
            DataError::VerificationFailed => "parity or complement check failed",
        }
    }
}

/// Errors returned by the engine's own API (misuse, not line conditions).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WiegandError {
    #[error("Invalid line index {0}, expected 0 (DATA0) or 1 (DATA1)")]
    InvalidLine(u8),

    #[error("Invalid expected length {bits}: must be between 1 and {max}")]
    InvalidLength { bits: u8, max: u8 },
}
