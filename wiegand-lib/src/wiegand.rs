use tracing::{debug, trace};

use crate::buffer::{BitBuffer, Snapshot};
use crate::config::Config;
use crate::decode::{Failure, Message, decode};
use crate::dispatch::Dispatcher;
use crate::error::{DataError, WiegandError};
use crate::line::{ConnectivityState, Line, LineTracker};

/// One Wiegand receiver: line levels in, messages and connectivity changes out.
///
/// Driven from two call sites: line updates (typically an edge interrupt) and a periodic
/// [`check_timeout`](Self::check_timeout) poll. Both need `&mut self`, so the caller decides how
/// they are serialized. Handlers run synchronously inside whichever call completed the frame.
#[derive(Debug)]
pub struct Wiegand {
    config: Config,
    lines: LineTracker,
    buffer: BitBuffer,
    /// `None` while the latest bit has not been timestamped yet
    last_bit_ms: Option<u32>,
    /// Lines have been seen idle since start-up or since the last timed-out frame
    idle_seen: bool,
    dispatcher: Dispatcher,
}

impl Default for Wiegand {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl Wiegand {
    pub fn new(config: Config) -> Result<Self, WiegandError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: Config) -> Self {
        Self {
            config,
            lines: LineTracker::new(),
            buffer: BitBuffer::new(),
            last_bit_ms: None,
            idle_seen: false,
            dispatcher: Dispatcher::new(),
        }
    }

    /// Replaces the configuration and drops any frame in progress. Handlers are kept.
    pub fn begin(&mut self, config: Config) -> Result<(), WiegandError> {
        config.validate()?;
        debug!(
            expected = %config.expected_length,
            decode = config.decode_messages,
            timeout_ms = config.timeout_ms,
            "Wiegand configured"
        );
        self.config = config;
        self.reset();
        Ok(())
    }

    /// Unregisters all handlers and drops any frame in progress.
    pub fn end(&mut self) {
        self.dispatcher.clear();
        self.reset();
    }

    /// Drops the frame in progress without reporting it.
    pub fn reset(&mut self) {
        self.reset_session(false);
    }

    pub fn on_receive<C, F>(&mut self, handler: F, context: C)
    where
        F: FnMut(&Message, &mut C) + Send + 'static,
        C: Send + 'static,
    {
        self.dispatcher.on_receive(handler, context);
    }

    pub fn on_receive_error<C, F>(&mut self, handler: F, context: C)
    where
        F: FnMut(&Failure, &mut C) + Send + 'static,
        C: Send + 'static,
    {
        self.dispatcher.on_receive_error(handler, context);
    }

    pub fn on_state_change<C, F>(&mut self, handler: F, context: C)
    where
        F: FnMut(bool, &mut C) + Send + 'static,
        C: Send + 'static,
    {
        self.dispatcher.on_state_change(handler, context);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.lines.state()
    }

    pub fn is_connected(&self) -> bool {
        self.lines.state() == ConnectivityState::Connected
    }

    /// Bits captured so far in the current frame.
    pub fn pending_bits(&self) -> u8 {
        self.buffer.len()
    }

    /// Line update by index (0 = DATA0, 1 = DATA1). The bit is timestamped by the next poll,
    /// so a frame fed this way takes at least two `check_timeout` calls to complete: one to
    /// stamp the last bit and one `timeout_ms` later.
    pub fn set_line_state(&mut self, line: u8, level: bool) -> Result<(), WiegandError> {
        self.update(Line::from_index(line)?, level, None);
        Ok(())
    }

    /// Line update by index, with the time it was observed.
    pub fn set_line_state_at(&mut self, now_ms: u32, line: u8, level: bool) -> Result<(), WiegandError> {
        self.update(Line::from_index(line)?, level, Some(now_ms));
        Ok(())
    }

    pub fn set_line(&mut self, line: Line, level: bool) {
        self.update(line, level, None);
    }

    pub fn set_line_at(&mut self, now_ms: u32, line: Line, level: bool) {
        self.update(line, level, Some(now_ms));
    }

    pub fn set_data0(&mut self, level: bool) {
        self.update(Line::Data0, level, None);
    }

    pub fn set_data1(&mut self, level: bool) {
        self.update(Line::Data1, level, None);
    }

    /// Periodic poll: completes an any-length frame once `timeout_ms` has passed since its last
    /// bit. A fixed-length frame that stalls short of its length completes here too, as
    /// `SizeUnexpected`.
    pub fn check_timeout(&mut self, now_ms: u32) {
        if self.buffer.is_empty() {
            return;
        }
        match self.last_bit_ms {
            None => self.last_bit_ms = Some(now_ms),
            Some(last) if now_ms.wrapping_sub(last) >= self.config.timeout_ms => self.finalize(true),
            Some(_) => {}
        }
    }

    /// Completes the frame in progress now, as if its timeout had elapsed.
    pub fn flush_now(&mut self) {
        if !self.buffer.is_empty() {
            self.finalize(true);
        }
    }

    fn update(&mut self, line: Line, level: bool, now_ms: Option<u32>) {
        let event = self.lines.update(line, level);

        if let Some(connected) = event.connectivity {
            debug!(connected, "Wiegand connectivity changed");
            self.dispatcher.state_changed(connected);
        }
        if let Some(bit) = event.bit {
            self.capture(bit, now_ms);
        }
        if event.idle {
            self.idle_seen = true;
        }
    }

    fn capture(&mut self, bit: bool, now_ms: Option<u32>) {
        if self.buffer.is_empty() && !self.idle_seen {
            let raw = Snapshot::from_value(u128::from(bit), 1);
            self.dispatcher.failed(&Failure::new(DataError::Communication, raw));
        }

        if self.buffer.append(bit) {
            trace!(bit, count = self.buffer.len(), "Wiegand bit captured");
        } else {
            trace!(bit, "Wiegand buffer full, bit dropped");
        }
        self.last_bit_ms = now_ms;

        if self.config.expected_length.fixed() == Some(self.buffer.len()) {
            self.finalize(false);
        }
    }

    /// Single completion routine for both the length match and the timeout path.
    fn finalize(&mut self, timed_out: bool) {
        let raw = self.buffer.snapshot();
        let result = decode(&raw, self.buffer.overflowed(), &self.config);
        self.reset_session(timed_out);

        match &result {
            Ok(message) => debug!(raw_bits = raw.bits(), bits = message.bits(), "Wiegand message received"),
            Err(failure) => debug!(raw_bits = raw.bits(), error = %failure.error, "Wiegand frame rejected"),
        }
        self.dispatcher.dispatch(&result);
    }

    fn reset_session(&mut self, timed_out: bool) {
        self.buffer.clear();
        self.last_bit_ms = None;
        if timed_out {
            // A timeout is an idle period only if the lines are actually idle now
            self.idle_seen = self.lines.is_idle();
        }
    }
}
