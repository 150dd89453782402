use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;

use crate::error::WiegandError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the two signal wires. Pulling DATA0 low sends a 0, pulling DATA1 low sends a 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Line {
    #[strum(to_string = "DATA0")]
    Data0 = 0,
    #[strum(to_string = "DATA1")]
    Data1 = 1,
}

impl Line {
    pub fn from_index(index: u8) -> Result<Self, WiegandError> {
        Line::try_from(index).map_err(|_| WiegandError::InvalidLine(index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConnectivityState {
    /// No sample seen yet
    #[default]
    Unknown,
    Connected,
    /// Both lines held low
    Disconnected,
}

/// What a single line update produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineEvent {
    /// A bit that was just asserted
    pub bit: Option<bool>,
    /// New connectivity, only on an actual edge
    pub connectivity: Option<bool>,
    /// Both lines have been sampled and are now high
    pub idle: bool,
}

/// Current levels of both lines (`true` = high) and the connectivity derived from them.
///
/// Lines start out assumed idle-high, but are only reported idle once each has been sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTracker {
    levels: [bool; 2],
    sampled: [bool; 2],
    state: ConnectivityState,
}

impl Default for LineTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LineTracker {
    pub const fn new() -> Self {
        Self {
            levels: [true, true],
            sampled: [false, false],
            state: ConnectivityState::Unknown,
        }
    }

    pub fn level(&self, line: Line) -> bool {
        self.levels[usize::from(u8::from(line))]
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.sampled == [true, true] && self.levels == [true, true]
    }

    /// Bit currently asserted by the levels, if exactly one line is low.
    fn asserted(levels: [bool; 2]) -> Option<bool> {
        match levels {
            [false, true] => Some(false),
            [true, false] => Some(true),
            _ => None,
        }
    }

    /// Applies a new level for one line; the other line keeps its last-known level.
    pub fn update(&mut self, line: Line, level: bool) -> LineEvent {
        let previous = self.levels;
        let index = usize::from(u8::from(line));
        self.levels[index] = level;
        self.sampled[index] = true;
        let both_low = self.levels == [false, false];

        let mut event = LineEvent {
            idle: self.is_idle(),
            ..LineEvent::default()
        };

        match (self.state, both_low) {
            (ConnectivityState::Disconnected, false) => {
                self.state = ConnectivityState::Connected;
                event.connectivity = Some(true);
                // Releasing one line of a pulled-down pair is a reconnect, not a bit
                return event;
            }
            (ConnectivityState::Connected | ConnectivityState::Unknown, true) => {
                self.state = ConnectivityState::Disconnected;
                event.connectivity = Some(false);
                return event;
            }
            (ConnectivityState::Unknown, false) => self.state = ConnectivityState::Connected,
            _ => {}
        }

        let now = Self::asserted(self.levels);
        if now != Self::asserted(previous) {
            event.bit = now;
        }
        event
    }
}
