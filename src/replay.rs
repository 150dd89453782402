//! Drives a `Wiegand` engine from recorded line samples, polling for timeouts the way a
//! firmware main loop would.

use std::sync::mpsc::{Receiver, Sender, channel};

use bytes::Bytes;
use tracing::{debug, info};
use wiegand_lib::pulse::LineSample;
use wiegand_lib::{Config, DataError, Wiegand};

use crate::error::Error;

/// What the engine reported, owned so it can leave the handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Received { data: Bytes, bits: u8 },
    Rejected { error: DataError, raw: Bytes, bits: u8 },
    Connectivity { connected: bool },
}

/// A report with the replay time at which it fired.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped {
    pub at_ms: u32,
    pub report: Report,
}

pub struct Replayer {
    wiegand: Wiegand,
    reports: Receiver<Report>,
    poll_ms: u32,
    next_poll_ms: Option<u32>,
    last_ms: u32,
}

impl Replayer {
    pub fn new(config: Config, poll_ms: u32) -> Result<Self, Error> {
        let mut wiegand = Wiegand::new(config)?;
        let (tx, reports) = channel();

        wiegand.on_receive(
            |message, tx: &mut Sender<Report>| {
                let _ = tx.send(Report::Received {
                    data: Bytes::copy_from_slice(message.data()),
                    bits: message.bits(),
                });
            },
            tx.clone(),
        );
        wiegand.on_receive_error(
            |failure, tx: &mut Sender<Report>| {
                let _ = tx.send(Report::Rejected {
                    error: failure.error,
                    raw: Bytes::copy_from_slice(failure.raw.as_bytes()),
                    bits: failure.raw.bits(),
                });
            },
            tx.clone(),
        );
        wiegand.on_state_change(
            |connected, tx: &mut Sender<Report>| {
                let _ = tx.send(Report::Connectivity { connected });
            },
            tx,
        );

        Ok(Self {
            wiegand,
            reports,
            poll_ms: poll_ms.max(1),
            next_poll_ms: None,
            last_ms: 0,
        })
    }

    /// Reports both lines idle, as a driver does when it first samples the pins.
    pub fn prime_idle(&mut self) {
        self.wiegand.set_data0(true);
        self.wiegand.set_data1(true);
    }

    fn collect(&self, at_ms: u32, out: &mut Vec<Stamped>) {
        out.extend(self.reports.try_iter().map(|report| Stamped { at_ms, report }));
    }

    /// First poll time on the current grid that is later than `until_ms`.
    fn first_poll_after(&self, next: u32, until_ms: u32) -> u32 {
        let steps = until_ms.wrapping_sub(next) / self.poll_ms + 1;
        next.wrapping_add(steps.wrapping_mul(self.poll_ms))
    }

    fn poll_until(&mut self, until_ms: u32, out: &mut Vec<Stamped>) {
        let mut next = self.next_poll_ms.unwrap_or(until_ms);
        // Times wrap at u32: `next` is due while it is not after `until_ms`
        while until_ms.wrapping_sub(next) as i32 >= 0 {
            if self.wiegand.pending_bits() == 0 {
                // Nothing can time out until the next bit arrives
                next = self.first_poll_after(next, until_ms);
                break;
            }
            self.wiegand.check_timeout(next);
            self.collect(next, out);
            next = next.wrapping_add(self.poll_ms);
        }
        self.next_poll_ms = Some(next);
    }

    /// Polls up to the sample's time, then applies it.
    pub fn feed(&mut self, sample: LineSample) -> Vec<Stamped> {
        let mut out = Vec::new();
        self.poll_until(sample.at_ms, &mut out);
        self.wiegand.set_line_at(sample.at_ms, sample.line, sample.level);
        self.collect(sample.at_ms, &mut out);
        self.last_ms = sample.at_ms;
        out
    }

    /// Keeps polling after the last sample until any frame in progress has timed out.
    pub fn finish(&mut self) -> Vec<Stamped> {
        let mut out = Vec::new();
        let deadline = self
            .last_ms
            .wrapping_add(self.wiegand.config().timeout_ms)
            .wrapping_add(self.poll_ms);
        self.poll_until(deadline, &mut out);
        if self.wiegand.pending_bits() > 0 {
            debug!(bits = self.wiegand.pending_bits(), "Flushing frame left at end of trace");
            self.wiegand.flush_now();
            self.collect(deadline, &mut out);
        }
        out
    }

    pub fn run(mut self, samples: impl IntoIterator<Item = LineSample>) -> Vec<Stamped> {
        let mut out = Vec::new();
        let mut count = 0usize;
        for sample in samples {
            out.extend(self.feed(sample));
            count += 1;
        }
        out.extend(self.finish());
        info!("Replayed {} line samples, {} reports", count, out.len());
        out
    }
}
