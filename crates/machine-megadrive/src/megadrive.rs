//! Top-level Mega Drive system: CPUs, VDP and the per-line schedule.

use emu_core::{Observable, Processor, Value};
use yamaha_ym7101::{
    DmaSource, MCYCLES_PER_LINE, VINT_CYCLES, VINT_FLAG_CYCLES, Vdp,
};

use crate::config::MegaDriveConfig;

/// Mega Drive system.
///
/// Each frame is run line by line. At every line boundary the VDP is
/// updated first (line counter, line interrupt, DMA, rendering), then both
/// CPUs run to the end of the line.
pub struct MegaDrive<M, Z> {
    config: MegaDriveConfig,
    vdp: Vdp,
    m68k: M,
    z80: Z,
    frame_count: u64,
}

impl<M, Z> MegaDrive<M, Z>
where
    M: Processor<Vdp> + DmaSource,
    Z: Processor<Vdp>,
{
    #[must_use]
    pub fn new(config: MegaDriveConfig, m68k: M, z80: Z) -> Self {
        Self {
            config,
            vdp: Vdp::new(config.vdp_config()),
            m68k,
            z80,
            frame_count: 0,
        }
    }

    /// Reset the VDP and restart both cycle counters. The CPUs' own reset
    /// is left to the caller.
    pub fn reset(&mut self) {
        self.vdp.reset();
        self.m68k.set_cycles(0);
        self.z80.set_cycles(0);
        self.frame_count = 0;
    }

    /// Run one complete frame.
    ///
    /// Returns the number of master cycles in the frame.
    pub fn run_frame(&mut self) -> u32 {
        self.vdp.begin_frame();
        let lines = self.vdp.lines_per_frame();

        // Pre-line: the previous frame's last line, where sprites for line
        // 0 are selected.
        self.update_dma(0);
        self.vdp.prepare_first_line();
        self.run_both(MCYCLES_PER_LINE);
        self.vdp.end_line();

        let mut line = 0;
        while line < self.vdp.viewport().height {
            let start = self.vdp.line_start();
            self.vdp.start_line(line);
            self.vdp.tick_line_interrupt();
            self.update_dma(start);
            self.vdp.render_line(line);
            self.run_both(start + MCYCLES_PER_LINE);
            self.vdp.end_line();
            line += 1;
        }

        // First blanking line: frame interrupt.
        let start = self.vdp.line_start();
        self.vdp.start_line(line);
        self.vdp.enter_vblank();
        self.vdp.tick_line_interrupt();
        self.update_dma(start);
        run_cpu(&mut self.m68k, &mut self.vdp, start + VINT_FLAG_CYCLES);
        self.vdp.set_vint_flag();
        self.run_both(start + VINT_CYCLES);
        self.vdp.raise_vint();
        self.vdp.set_z80_int(true);
        self.run_both(start + MCYCLES_PER_LINE);
        self.vdp.end_line();
        line += 1;

        // The Z80 INT pulse lasts one line.
        let mut z80_int_cleared = false;
        while line < lines - 1 {
            let start = self.vdp.line_start();
            self.vdp.start_line(line);
            if !z80_int_cleared {
                self.run_both(start + VINT_CYCLES);
                self.vdp.set_z80_int(false);
                z80_int_cleared = true;
            }
            self.run_both(start + MCYCLES_PER_LINE);
            self.vdp.end_line();
            line += 1;
        }

        let frame_cycles = self.vdp.frame_cycles();
        debug_assert_eq!(self.vdp.line_start(), frame_cycles);
        self.m68k.rebase(frame_cycles);
        self.z80.rebase(frame_cycles);
        self.vdp.end_frame();
        self.frame_count += 1;
        log::trace!("frame {} done", self.frame_count);
        frame_cycles
    }

    /// Continue the active DMA at `now`, freezing the 68000 for bus
    /// transfers.
    fn update_dma(&mut self, now: u32) {
        if let Some(until) = self.vdp.update_dma(now, &mut self.m68k) {
            if self.m68k.cycles() < until {
                self.m68k.set_cycles(until);
            }
        }
    }

    fn run_both(&mut self, to_cycle: u32) {
        run_cpu(&mut self.m68k, &mut self.vdp, to_cycle);
        run_cpu(&mut self.z80, &mut self.vdp, to_cycle);
    }

    #[must_use]
    pub fn config(&self) -> &MegaDriveConfig {
        &self.config
    }

    #[must_use]
    pub fn vdp(&self) -> &Vdp {
        &self.vdp
    }

    pub fn vdp_mut(&mut self) -> &mut Vdp {
        &mut self.vdp
    }

    #[must_use]
    pub fn m68k(&self) -> &M {
        &self.m68k
    }

    pub fn m68k_mut(&mut self) -> &mut M {
        &mut self.m68k
    }

    #[must_use]
    pub fn z80(&self) -> &Z {
        &self.z80
    }

    pub fn z80_mut(&mut self) -> &mut Z {
        &mut self.z80
    }

    /// Reference to the framebuffer (ARGB32, 320 pixels per row).
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        self.vdp.framebuffer()
    }

    /// Visible width of the last frame in pixels.
    #[must_use]
    pub fn framebuffer_width(&self) -> u32 {
        u32::from(self.vdp.viewport().width)
    }

    /// Visible height of the last frame in pixels.
    #[must_use]
    pub fn framebuffer_height(&self) -> u32 {
        u32::from(self.vdp.viewport().height)
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Bring one CPU up to `to_cycle`. A CPU that is not running (held in
/// reset, bus taken) just has its counter moved.
fn run_cpu<P: Processor<Vdp>>(cpu: &mut P, vdp: &mut Vdp, to_cycle: u32) {
    if !cpu.is_running() {
        if cpu.cycles() < to_cycle {
            cpu.set_cycles(to_cycle);
        }
    } else if cpu.cycles() < to_cycle {
        cpu.run(to_cycle, vdp);
    }
}

impl<M, Z> Observable for MegaDrive<M, Z>
where
    M: Processor<Vdp> + DmaSource,
    Z: Processor<Vdp>,
{
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("vdp.") {
            return self.vdp.query(rest);
        }
        match path {
            "frame" => Some(Value::U32(self.frame_count as u32)),
            "m68k.cycles" => Some(self.m68k.cycles().into()),
            "z80.cycles" => Some(self.z80.cycles().into()),
            "z80.running" => Some(self.z80.is_running().into()),
            "region" => Some(if self.config.region.is_pal() { "pal" } else { "ntsc" }.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "frame",
            "region",
            "m68k.cycles",
            "z80.cycles",
            "z80.running",
            "vdp.<path>",
        ]
    }
}
