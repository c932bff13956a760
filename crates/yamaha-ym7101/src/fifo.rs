//! Write FIFO model.
//!
//! During active display the CPU only gets a VRAM access slot every so
//! often: 16 slots per line in H32, 18 in H40. The four-entry FIFO absorbs
//! bursts; a fifth write stalls the CPU until the oldest entry drains.
//!
//! Entries are not tracked individually. The counter is recomputed lazily
//! from the cycles elapsed since the head entry started draining.

use crate::status::Status;

/// Master cycles between access slots, H32.
pub const LATENCY_H32: u32 = 214;
/// Master cycles between access slots, H40.
pub const LATENCY_H40: u32 = 190;

const DEPTH: u8 = 4;

/// Slot latency for the current width and destination. A VRAM word takes
/// two byte slots.
#[must_use]
pub fn latency_for(h40: bool, vram_write: bool) -> u32 {
    let base = if h40 { LATENCY_H40 } else { LATENCY_H32 };
    base << u32::from(vram_write)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fifo {
    /// Entries still queued, 0..=4.
    pub count: u8,
    /// Cycle at which the head entry started draining.
    pub drain_start: u32,
    /// Cycles per entry.
    pub latency: u32,
}

impl Default for Fifo {
    fn default() -> Self {
        Self {
            count: 0,
            drain_start: 0,
            latency: LATENCY_H32,
        }
    }
}

impl Fifo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop entries whose slot has passed and update the FIFO flags.
    pub fn refresh(&mut self, now: u32, status: &mut Status) {
        if self.count == 0 || self.latency == 0 {
            return;
        }
        let drained = now.saturating_sub(self.drain_start) / self.latency;
        if drained == 0 {
            return;
        }

        status.remove(Status::FIFO_FULL);
        if drained >= u32::from(self.count) {
            self.count = 0;
            status.insert(Status::FIFO_EMPTY);
        } else {
            self.count -= drained as u8;
        }
        self.drain_start += drained * self.latency;
    }

    /// Queue one write at `now`.
    ///
    /// Returns the cycle the writing CPU must be stalled to when the FIFO is
    /// already full.
    pub fn push(&mut self, now: u32, status: &mut Status) -> Option<u32> {
        self.refresh(now, status);
        status.remove(Status::FIFO_EMPTY);

        if self.count < DEPTH {
            if self.count == 0 {
                self.drain_start = now;
            }
            self.count += 1;
            if self.count == DEPTH {
                status.insert(Status::FIFO_FULL);
            }
            None
        } else {
            self.drain_start += self.latency;
            Some(self.drain_start)
        }
    }

    /// Frame start: the queue is empty and timing restarts from cycle 0.
    pub fn restart(&mut self) {
        self.count = 0;
        self.drain_start = 0;
    }
}
