//! DMA engine state and transfer budget.
//!
//! Three transfer families share one length counter (regs 20:19):
//!
//! - 68000 bus to VRAM/CRAM/VSRAM. The 68000 is frozen for the duration.
//! - VRAM fill. Armed by the control port, started by the next data write.
//! - VRAM copy.
//!
//! Transfers are chunked per line. Each call to the engine works out how
//! many bytes fit between `now` and the end of the line (or the end of the
//! frame during vertical blanking), transfers that many and leaves the rest
//! for the next line.

use crate::MCYCLES_PER_LINE;
use crate::memory::VideoMemory;

/// Bytes per line, `[blanking][h40]`.
pub const DMA_RATE_TABLE: [[u32; 2]; 2] = [[16, 18], [167, 205]];

/// Reads 68000 bus memory on behalf of a bus DMA.
///
/// The implementor decides what the Z80 area, I/O area and unmapped space
/// return; addresses arrive already wrapped to the 128 KiB source window.
pub trait DmaSource {
    fn read_word(&mut self, address: u32) -> u16;
}

/// Transfer kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DmaKind {
    /// 68000 bus to CRAM or VSRAM.
    #[default]
    BusToColor,
    /// 68000 bus to VRAM (two byte accesses per word).
    BusToVram,
    Fill,
    Copy,
}

impl DmaKind {
    /// The 68000 is locked out while the transfer runs.
    #[must_use]
    pub fn freezes_cpu(self) -> bool {
        matches!(self, Self::BusToColor | Self::BusToVram)
    }

    /// Each unit costs two slots (word to VRAM, or read plus write).
    #[must_use]
    pub fn halves_rate(self) -> bool {
        matches!(self, Self::BusToVram | Self::Copy)
    }
}

/// Fill latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillLatch {
    #[default]
    Idle,
    /// Next data port write starts a fill.
    Armed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DmaState {
    pub kind: DmaKind,
    /// Units left to transfer. Zero when idle.
    pub length: u32,
    pub fill: FillLatch,
    /// Byte written by the current fill.
    pub fill_byte: u8,
    /// Cycle at which a fill or copy finishes.
    pub end_cycle: u32,
}

/// Work granted to one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaBudget {
    /// Units to transfer now.
    pub units: u32,
    /// Cycles those units occupy.
    pub cycles: u32,
}

impl DmaState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active(&self) -> bool {
        self.length != 0
    }

    /// Start a transfer of `length` units (already converted from zero).
    pub fn start(&mut self, kind: DmaKind, length: u32) {
        self.kind = kind;
        self.length = length;
        log::debug!("DMA {kind:?} start, {length} units");
    }

    /// Work out how much of the transfer fits before `limit`.
    ///
    /// `blanking` is true during vertical blanking or with the display off;
    /// `limit` is the end of the current line, or the end of the frame while
    /// vertically blanked.
    #[must_use]
    pub fn budget(&self, now: u32, limit: u32, blanking: bool, h40: bool) -> DmaBudget {
        let rate = DMA_RATE_TABLE[usize::from(blanking)][usize::from(h40)]
            >> u32::from(self.kind.halves_rate());
        let mut cycles = limit.saturating_sub(now);
        let mut units = (u64::from(cycles) * u64::from(rate) / u64::from(MCYCLES_PER_LINE)) as u32;

        if self.length < units {
            units = self.length;
            cycles = units * MCYCLES_PER_LINE / rate;
        }
        DmaBudget { units, cycles }
    }
}

/// Source address for a bus DMA from regs 23:22:21.
#[must_use]
pub fn bus_source(regs: &[u8; 32]) -> u32 {
    ((u32::from(regs[23]) << 17) | (u32::from(regs[22]) << 9) | (u32::from(regs[21]) << 1))
        & 0x00FF_FFFE
}

/// Advance a bus DMA source by one word inside its 128 KiB window.
#[must_use]
pub fn next_bus_source(base: u32, source: u32) -> u32 {
    (base & 0x00FE_0000) | (source.wrapping_add(2) & 0x1_FFFF)
}

/// VRAM fill: write `byte` to `addr ^ 1` for `units` steps.
///
/// Returns the updated address register.
pub fn fill(mem: &mut VideoMemory, mut addr: u16, increment: u16, byte: u8, units: u32) -> u16 {
    for _ in 0..units {
        mem.write_vram_byte(addr ^ 1, byte);
        addr = addr.wrapping_add(increment);
    }
    addr
}

/// VRAM copy from the 16-bit `source` cursor.
///
/// Returns the updated `(addr, source)`.
pub fn copy(
    mem: &mut VideoMemory,
    mut addr: u16,
    increment: u16,
    mut source: u16,
    units: u32,
) -> (u16, u16) {
    for _ in 0..units {
        let byte = mem.vram[usize::from(source)];
        mem.write_vram_byte(addr, byte);
        source = source.wrapping_add(1);
        addr = addr.wrapping_add(increment);
    }
    (addr, source)
}
