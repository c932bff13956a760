//! Save states.
//!
//! A [`VdpSnapshot`] is a flat copy of everything the VDP needs to resume
//! mid-frame. The pattern and palette caches are rebuilt from the memories
//! on restore. The picture and the index line of the line being drawn are
//! saved, since a mid-line palette or register write recolors that line
//! from them.

use thiserror::Error;

use crate::config::Region;
use crate::dma::{DmaKind, FillLatch};
use crate::irq::IrqLine;
use crate::memory::{SAT_SHADOW_SIZE, VRAM_SIZE};
use crate::port::Phase;
use crate::render::{FB_HEIGHT, FB_WIDTH, LineState, RenderTable, SpriteEntry};
use crate::status::Status;
use crate::timing::{Interlace, Viewport};
use crate::vdp::Vdp;

/// Bumped whenever a field is added, removed or reinterpreted.
pub const SNAPSHOT_VERSION: u32 = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {found} (expected {})", SNAPSHOT_VERSION)]
    UnsupportedVersion { found: u32 },
    #[error("snapshot {field} holds {found} entries, expected {expected}")]
    WrongLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("snapshot is for {found:?}, VDP is configured for {expected:?}")]
    RegionMismatch { expected: Region, found: Region },
    #[error("invalid control port phase {0}")]
    InvalidPhase(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VdpSnapshot {
    pub version: u32,
    pub region: Region,

    pub registers: Vec<u8>,
    pub vram: Vec<u8>,
    pub cram: Vec<u16>,
    pub vsram: Vec<u16>,
    pub sat: Vec<u8>,

    pub addr: u16,
    pub addr_latch: u16,
    pub code: u8,
    pub phase: u8,
    pub byte_latch: u8,
    pub read_buffer: u8,
    pub deferred: Option<u16>,

    pub status: u16,
    pub hvc_latch: u32,
    pub border: u8,

    pub dma_kind: DmaKind,
    pub dma_length: u32,
    pub fill_armed: bool,
    pub fill_byte: u8,
    pub dma_end_cycle: u32,

    pub fifo_count: u8,
    pub fifo_drain_start: u32,
    pub fifo_latency: u32,

    pub hint_pending: bool,
    pub vint_pending: bool,
    pub hint_counter: i32,
    pub m68k_irq: IrqLine,
    pub z80_int: bool,

    pub line_start: u32,
    pub v_counter: u16,
    pub odd_frame: bool,
    pub interlace: Interlace,
    pub viewport: Viewport,

    pub sprites: Vec<SpriteEntry>,
    pub line: LineState,
    pub framebuffer: Vec<u32>,
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), SnapshotError> {
    if expected == found {
        Ok(())
    } else {
        Err(SnapshotError::WrongLength {
            field,
            expected,
            found,
        })
    }
}

impl Vdp {
    #[must_use]
    pub fn snapshot(&self) -> VdpSnapshot {
        VdpSnapshot {
            version: SNAPSHOT_VERSION,
            region: self.config().region,
            registers: self.regs.raw().to_vec(),
            vram: self.mem.vram.to_vec(),
            cram: self.mem.cram.to_vec(),
            vsram: self.mem.vsram.to_vec(),
            sat: self.mem.sat.to_vec(),
            addr: self.port.addr,
            addr_latch: self.port.addr_latch,
            code: self.port.code,
            phase: self.port.phase.to_bits(),
            byte_latch: self.port.byte_latch,
            read_buffer: self.read_buffer,
            deferred: self.deferred,
            status: self.status.bits(),
            hvc_latch: self.hvc_latch,
            border: self.border,
            dma_kind: self.dma.kind,
            dma_length: self.dma.length,
            fill_armed: self.dma.fill == FillLatch::Armed,
            fill_byte: self.dma.fill_byte,
            dma_end_cycle: self.dma.end_cycle,
            fifo_count: self.fifo.count,
            fifo_drain_start: self.fifo.drain_start,
            fifo_latency: self.fifo.latency,
            hint_pending: self.irq.hint_pending,
            vint_pending: self.irq.vint_pending,
            hint_counter: self.irq.h_counter,
            m68k_irq: self.irq.m68k,
            z80_int: self.irq.z80_int,
            line_start: self.timing.line_start,
            v_counter: self.timing.v_counter,
            odd_frame: self.timing.odd_frame,
            interlace: self.timing.interlace,
            viewport: self.timing.viewport,
            sprites: self.renderer.sprites.visible().to_vec(),
            line: self.renderer.line_state(),
            framebuffer: self.renderer.framebuffer().to_vec(),
        }
    }

    /// Load a snapshot. The VDP is left untouched when it is rejected.
    pub fn restore(&mut self, snap: &VdpSnapshot) -> Result<(), SnapshotError> {
        if snap.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snap.version,
            });
        }
        let region = self.config().region;
        if snap.region != region {
            return Err(SnapshotError::RegionMismatch {
                expected: region,
                found: snap.region,
            });
        }
        check_len("registers", 32, snap.registers.len())?;
        check_len("vram", VRAM_SIZE, snap.vram.len())?;
        check_len("cram", 64, snap.cram.len())?;
        check_len("vsram", 64, snap.vsram.len())?;
        check_len("sat", SAT_SHADOW_SIZE, snap.sat.len())?;
        check_len("line indices", FB_WIDTH, snap.line.indices.len())?;
        check_len("framebuffer", FB_WIDTH * FB_HEIGHT, snap.framebuffer.len())?;
        let phase = Phase::from_bits(snap.phase).ok_or(SnapshotError::InvalidPhase(snap.phase))?;

        let mut registers = [0u8; 32];
        registers.copy_from_slice(&snap.registers);
        self.regs.load(&registers);

        self.mem.vram.copy_from_slice(&snap.vram);
        self.mem.cram.copy_from_slice(&snap.cram);
        self.mem.vsram.copy_from_slice(&snap.vsram);
        self.mem.sat.copy_from_slice(&snap.sat);
        self.mem.set_sat_window(self.regs.sat_window);

        self.port.addr = snap.addr;
        self.port.addr_latch = snap.addr_latch;
        self.port.code = snap.code;
        self.port.phase = phase;
        self.port.byte_latch = snap.byte_latch;
        self.read_buffer = snap.read_buffer;
        self.deferred = snap.deferred;

        self.status = Status::from_bits_truncate(snap.status);
        self.hvc_latch = snap.hvc_latch;
        self.border = snap.border;

        self.dma.kind = snap.dma_kind;
        self.dma.length = snap.dma_length;
        self.dma.fill = if snap.fill_armed {
            FillLatch::Armed
        } else {
            FillLatch::Idle
        };
        self.dma.fill_byte = snap.fill_byte;
        self.dma.end_cycle = snap.dma_end_cycle;

        self.fifo.count = snap.fifo_count.min(4);
        self.fifo.drain_start = snap.fifo_drain_start;
        self.fifo.latency = snap.fifo_latency;

        self.irq.hint_pending = snap.hint_pending;
        self.irq.vint_pending = snap.vint_pending;
        self.irq.h_counter = snap.hint_counter;
        self.irq.m68k = snap.m68k_irq;
        self.irq.z80_int = snap.z80_int;

        self.timing.line_start = snap.line_start;
        self.timing.v_counter = snap.v_counter;
        self.timing.odd_frame = snap.odd_frame;
        self.timing.interlace = snap.interlace;
        self.timing.viewport = snap.viewport;

        let table = RenderTable::select(&self.regs, self.timing.interlace);
        self.renderer.set_table(table);
        self.mem.dirty.invalidate(table.cache_updater.pattern_count());
        self.rebuild_palette();
        self.renderer.load_sprites(&snap.sprites);
        self.renderer.restore_line_state(&snap.line, &snap.framebuffer);

        log::debug!("restored snapshot at line {}", snap.v_counter);
        Ok(())
    }
}
