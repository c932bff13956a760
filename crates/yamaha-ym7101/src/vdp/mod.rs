//! The VDP: ports, DMA, interrupts and the per-frame hooks the scheduler
//! calls between CPU slices.

mod control;
mod data;

use emu_core::{Observable, Value, parse_address};

use crate::config::{BOOT_REGISTERS, VdpConfig};
use crate::dma::{self, DmaKind, DmaSource, DmaState};
use crate::fifo::Fifo;
use crate::hvc;
use crate::irq::{InterruptController, IrqLine};
use crate::memory::VideoMemory;
use crate::port::AddressPort;
use crate::registers::RegisterFile;
use crate::render::{RenderTable, Renderer};
use crate::status::Status;
use crate::timing::{Interlace, Timing, Viewport};
use crate::{HBLANK_END_CYCLES, MCYCLES_PER_LINE};

/// Offset into a line where a sprite collision found on it shows in the
/// status (H counter 0xFF).
const COLLISION_VISIBLE_CYCLES: u32 = 105;

/// DMA source for transfers that never touch the 68000 bus.
struct NoBus;

impl DmaSource for NoBus {
    fn read_word(&mut self, _address: u32) -> u16 {
        0
    }
}

/// Sega 315-5313 video display processor.
pub struct Vdp {
    config: VdpConfig,
    pub(crate) mem: VideoMemory,
    pub(crate) regs: RegisterFile,
    pub(crate) port: AddressPort,
    pub(crate) fifo: Fifo,
    pub(crate) dma: DmaState,
    pub(crate) irq: InterruptController,
    pub(crate) status: Status,
    pub(crate) timing: Timing,
    /// Frozen HV value with bit 16 set, or 0 when the counters run free.
    /// Power-on latches a zero H counter.
    pub(crate) hvc_latch: u32,
    /// Backdrop index currently applied to the palette.
    pub(crate) border: u8,
    /// Z80 Mode 4 read-ahead byte.
    pub(crate) read_buffer: u8,
    /// Control word held back while a bus DMA freezes the 68000.
    pub(crate) deferred: Option<u16>,
    pub(crate) renderer: Renderer,
}

impl Vdp {
    #[must_use]
    pub fn new(config: VdpConfig) -> Self {
        let mut vdp = Self {
            config,
            mem: VideoMemory::new(),
            regs: RegisterFile::new(config.region),
            port: AddressPort::new(),
            fifo: Fifo::new(),
            dma: DmaState::new(),
            irq: InterruptController::new(config.irq_target),
            status: Status::power_on(config.region.is_pal()),
            timing: Timing::new(config.region),
            hvc_latch: 0x1_0000,
            border: 0,
            read_buffer: 0,
            deferred: None,
            renderer: Renderer::new(),
        };
        vdp.reset();
        vdp
    }

    /// Power-on state, followed by the boot register values when configured.
    pub fn reset(&mut self) {
        let region = self.config.region;
        self.mem.reset();
        self.regs = RegisterFile::new(region);
        self.port.reset();
        self.fifo = Fifo::new();
        self.dma = DmaState::new();
        self.irq.reset();
        self.status = Status::power_on(region.is_pal());
        self.timing = Timing::new(region);
        self.hvc_latch = 0x1_0000;
        self.border = 0;
        self.read_buffer = 0;
        self.deferred = None;
        self.renderer.reset();
        self.mem.set_sat_window(self.regs.sat_window);

        if self.config.boot_registers {
            for (index, value) in BOOT_REGISTERS {
                self.write_register(usize::from(index), value, 0);
            }
        }
        log::debug!("VDP reset ({:?})", region);
    }

    #[must_use]
    pub fn config(&self) -> &VdpConfig {
        &self.config
    }

    #[must_use]
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    #[must_use]
    pub fn memory(&self) -> &VideoMemory {
        &self.mem
    }

    /// Direct memory access for loaders and debuggers. Bypasses the ports,
    /// so no palette or line updates happen.
    pub fn memory_mut(&mut self) -> &mut VideoMemory {
        &mut self.mem
    }

    /// Status word without the side effects of a port read.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.timing.viewport
    }

    #[must_use]
    pub fn dma(&self) -> &DmaState {
        &self.dma
    }

    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        self.renderer.framebuffer()
    }

    #[must_use]
    pub fn frame_cycles(&self) -> u32 {
        self.timing.frame_cycles()
    }

    #[must_use]
    pub fn lines_per_frame(&self) -> u16 {
        self.timing.lines_per_frame
    }

    // -- status, HV counter, interrupts --

    /// 68000 control port read.
    pub fn read_status_68k(&mut self, now: u32) -> u16 {
        self.fifo.refresh(now, &mut self.status);
        self.refresh_dma_busy(now);

        let mut value = self.status;
        self.port.clear_pending();
        self.status.remove(Status::READ_ONCE);
        self.add_blanking_flags(&mut value, now);
        value.bits()
    }

    /// Z80 control port read. The Z80 bus picks the byte lane it needs.
    ///
    /// The Z80 may read the status while the scheduler is still behind it
    /// on the line count, so the line counter is caught up first: the
    /// frame interrupt flag appears one line after the active display ends
    /// and skipped active lines are rendered for their sprite flags. A
    /// collision on the line being read stays hidden until H counter 0xFF.
    pub fn read_status_z80(&mut self, now: u32) -> u16 {
        self.refresh_dma_busy(now);

        let lines = u32::from(self.timing.lines_per_frame);
        let line = ((lines + now / MCYCLES_PER_LINE - 1) % lines) as u16;
        if line > self.timing.v_counter {
            self.timing.v_counter = line;
            let height = self.timing.viewport.height;
            if line == height + 1 {
                self.status.insert(Status::VINT_OCCURRED);
            } else if line < height {
                self.render_line(line);
            }
        }

        let mut value = self.status;
        self.port.clear_pending();
        self.status
            .remove(Status::VINT_OCCURRED | Status::READ_ONCE);
        self.add_blanking_flags(&mut value, now);
        if value.contains(Status::SPRITE_COLLISION)
            && self.renderer.collision_line() == Some(line)
            && now % MCYCLES_PER_LINE < COLLISION_VISIBLE_CYCLES
        {
            self.status.insert(Status::SPRITE_COLLISION);
            value.remove(Status::SPRITE_COLLISION);
        }
        self.irq.clear_for_z80_read();
        value.bits()
    }

    fn refresh_dma_busy(&mut self, now: u32) {
        if self.status.contains(Status::DMA_BUSY) && !self.dma.active() && now >= self.dma.end_cycle {
            self.status.remove(Status::DMA_BUSY);
        }
    }

    fn add_blanking_flags(&self, value: &mut Status, now: u32) {
        if !self.regs.display_enabled() {
            value.insert(Status::VBLANK);
        }
        if now % MCYCLES_PER_LINE < HBLANK_END_CYCLES {
            value.insert(Status::HBLANK);
        }
    }

    /// HV counter port read.
    #[must_use]
    pub fn read_hv(&self, now: u32) -> u16 {
        let vc = u16::from(hvc::v_counter(
            now,
            self.regs.vc_max,
            self.timing.lines_per_frame,
            self.timing.interlace,
        ));
        if self.hvc_latch == 0 {
            (vc << 8) | u16::from(hvc::h_counter(now, self.regs.h40()))
        } else if self.regs.is_mode5() {
            self.hvc_latch as u16
        } else {
            (vc << 8) | (self.hvc_latch & 0xFF) as u16
        }
    }

    /// 68000 interrupt acknowledge cycle. Returns true when the frame
    /// interrupt was the one taken.
    pub fn acknowledge_interrupt(&mut self) -> bool {
        let vint = self
            .irq
            .acknowledge(self.regs.vint_enabled(), self.regs.hint_enabled());
        if vint {
            self.status.remove(Status::VINT_OCCURRED);
        }
        vint
    }

    /// Interrupt output towards the 68000.
    #[must_use]
    pub fn m68k_irq(&self) -> IrqLine {
        self.irq.m68k
    }

    /// Z80 INT line.
    #[must_use]
    pub fn z80_int(&self) -> bool {
        self.irq.z80_int
    }

    #[must_use]
    pub fn interrupts(&self) -> &InterruptController {
        &self.irq
    }

    // -- DMA --

    /// Run the active transfer up to the end of the current line (or of
    /// vertical blanking).
    ///
    /// Returns the cycle the 68000 stays frozen until when the transfer
    /// reads from its bus.
    pub fn update_dma(&mut self, now: u32, bus: &mut dyn DmaSource) -> Option<u32> {
        if !self.dma.active() {
            return None;
        }

        let vblank = self.status.contains(Status::VBLANK);
        let blanking = vblank || !self.regs.display_enabled();
        let limit = if vblank {
            self.timing.frame_cycles()
        } else {
            self.timing.line_start + MCYCLES_PER_LINE
        };
        let budget = self.dma.budget(now, limit, blanking, self.regs.h40());

        let mut freeze = None;
        if self.dma.kind.freezes_cpu() {
            freeze = Some(now + budget.cycles);
        } else {
            self.status.insert(Status::DMA_BUSY);
            self.dma.end_cycle = now + budget.cycles;
        }

        if budget.units == 0 {
            return freeze;
        }

        self.dma.length -= budget.units;
        let increment = self.regs.auto_increment();
        match self.dma.kind {
            DmaKind::BusToColor | DmaKind::BusToVram => {
                self.dma_from_bus(budget.units, now, bus);
            }
            DmaKind::Fill => {
                self.port.addr = dma::fill(
                    &mut self.mem,
                    self.port.addr,
                    increment,
                    self.dma.fill_byte,
                    budget.units,
                );
            }
            DmaKind::Copy => {
                let source = (u16::from(self.regs.get(22)) << 8) | u16::from(self.regs.get(21));
                let (addr, source) =
                    dma::copy(&mut self.mem, self.port.addr, increment, source, budget.units);
                self.port.addr = addr;
                self.regs.write(21, source as u8);
                self.regs.write(22, (source >> 8) as u8);
            }
        }

        if !self.dma.active() {
            self.regs.write(19, 0);
            self.regs.write(20, 0);
            log::debug!("DMA {:?} complete", self.dma.kind);
            let resume = freeze.unwrap_or(now);
            if let Some(stall) = self.complete_if_deferred(resume, bus) {
                freeze = Some(freeze.map_or(stall, |f| f.max(stall)));
            }
        }
        freeze
    }

    fn dma_from_bus(&mut self, units: u32, now: u32, bus: &mut dyn DmaSource) {
        let base = dma::bus_source(self.regs.raw());
        let mut source = base;
        for _ in 0..units {
            let word = bus.read_word(source);
            source = dma::next_bus_source(base, source);
            self.bus_write(word, now);
        }
        self.regs.write(21, (source >> 1) as u8);
        self.regs.write(22, (source >> 9) as u8);
    }

    /// Replay the control word held back during a bus DMA.
    pub(crate) fn complete_if_deferred(&mut self, now: u32, bus: &mut dyn DmaSource) -> Option<u32> {
        let data = self.deferred.take()?;
        log::trace!("replaying deferred control word {data:#06X}");
        self.write_control_68k(data, now, bus)
    }

    /// Run a fill or copy started from a port that has no bus to lend.
    fn update_internal_dma(&mut self, now: u32) {
        let _ = self.update_dma(now, &mut NoBus);
    }

    // -- frame hooks --

    /// Frame start: latch deferred viewport changes and reset the
    /// per-frame state.
    pub fn begin_frame(&mut self) {
        if self.timing.viewport.pending_change {
            self.timing.viewport.pending_change = false;

            let interlace = Interlace::from_reg12(self.regs.get(12));
            if interlace != self.timing.interlace {
                self.timing.interlace = interlace;
                self.timing.odd_frame = true;
                self.reselect_renderers();
            }
            self.timing.viewport.height = self.regs.height();
            self.timing.viewport.width = self.regs.width();
        }

        self.status.remove(Status::FRAME_START_CLEAR);
        self.status.insert(Status::FIFO_EMPTY);

        self.timing.odd_frame = !self.timing.odd_frame;
        if self.timing.interlace.enabled() && self.timing.odd_frame {
            self.status.insert(Status::ODD_FIELD);
        }

        self.fifo.restart();
        self.irq.reload(self.regs.get(10));
        self.timing.line_start = 0;
        self.timing.v_counter = self.timing.lines_per_frame - 1;
    }

    /// Parse the sprites of line 0. Called on the pre-line.
    pub fn prepare_first_line(&mut self) {
        if self.regs.display_enabled() {
            let raised = self
                .renderer
                .prepare_first_line(&self.mem, &self.regs, &self.timing);
            self.status |= raised;
        }
    }

    /// Move the V counter to `line`.
    pub fn start_line(&mut self, line: u16) {
        self.timing.v_counter = line;
    }

    /// Count one line for the line interrupt. Returns true when it fired.
    pub fn tick_line_interrupt(&mut self) -> bool {
        let fired = self
            .irq
            .tick_line(self.regs.get(10), self.regs.hint_enabled());
        if fired {
            log::trace!("line interrupt at line {}", self.timing.v_counter);
        }
        fired
    }

    /// The current line is done; the next starts a line later.
    pub fn end_line(&mut self) {
        self.timing.line_start += MCYCLES_PER_LINE;
    }

    /// Frame done: move the cycle stamps that outlive it into the next
    /// frame's time base.
    pub fn end_frame(&mut self) {
        let frame = self.timing.frame_cycles();
        self.dma.end_cycle = self.dma.end_cycle.saturating_sub(frame);
    }

    #[must_use]
    pub fn line_start(&self) -> u32 {
        self.timing.line_start
    }

    /// First line of vertical blanking.
    pub fn enter_vblank(&mut self) {
        self.status.insert(Status::VBLANK);
    }

    /// Frame interrupt flag in the status word, set ahead of the interrupt.
    pub fn set_vint_flag(&mut self) {
        self.status.insert(Status::VINT_OCCURRED);
    }

    /// Latch the frame interrupt and drive the 68000 line when enabled.
    pub fn raise_vint(&mut self) {
        self.irq.raise_vint(self.regs.vint_enabled());
        log::trace!("frame interrupt, level {}", self.irq.m68k.level);
    }

    pub fn set_z80_int(&mut self, asserted: bool) {
        self.irq.set_z80_int(asserted);
    }

    /// Render one active line into the framebuffer.
    pub fn render_line(&mut self, line: u16) {
        let raised = self
            .renderer
            .render_line(line, &mut self.mem, &self.regs, &self.timing);
        self.status |= raised;
    }

    // -- shared helpers --

    /// Recompute the whole palette cache from CRAM.
    pub(crate) fn rebuild_palette(&mut self) {
        let full = self.regs.get(0) & 0x04 != 0;
        self.renderer
            .palette
            .rebuild(&self.mem.cram, self.border, self.regs.is_mode5(), full);
    }

    /// Pick the renderers for the current registers. A new table
    /// re-decodes every pattern and recolors the palette.
    pub(crate) fn reselect_renderers(&mut self) {
        let table = RenderTable::select(&self.regs, self.timing.interlace);
        if self.renderer.set_table(table) {
            log::trace!("render table {table:?}");
            self.mem
                .dirty
                .invalidate(table.cache_updater.pattern_count());
            self.rebuild_palette();
        }
    }

    /// Current line is active, the display is on and the beam has not yet
    /// passed the point where a full re-render is still valid.
    pub(crate) fn line_redrawable(&self, now: u32) -> bool {
        self.timing.in_active_display()
            && self.regs.display_enabled()
            && self.timing.before_render_boundary(now)
    }

    pub(crate) fn remap_current_line(&mut self) {
        let width = usize::from(self.timing.viewport.width);
        self.renderer.remap_line(self.timing.v_counter, width);
    }
}

impl Observable for Vdp {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("reg.") {
            let index: usize = rest.parse().ok()?;
            (index < 24).then(|| self.regs.get(index).into())
        } else if let Some(rest) = path.strip_prefix("vram.") {
            let addr = parse_address(rest)?;
            self.mem.vram.get(addr as usize).map(|&b| b.into())
        } else if let Some(rest) = path.strip_prefix("cram.") {
            let index = parse_address(rest)?;
            self.mem.cram.get(index as usize).map(|&c| c.into())
        } else if let Some(rest) = path.strip_prefix("vsram.") {
            let index = parse_address(rest)?;
            self.mem.vsram.get(index as usize).map(|&v| v.into())
        } else {
            match path {
                "status" => Some(self.status.bits().into()),
                "mode" => Some(if self.regs.is_mode5() { "mode5" } else { "mode4" }.into()),
                "addr" => Some(self.port.addr.into()),
                "code" => Some(self.port.code.into()),
                "pending" => Some(self.port.pending().into()),
                "v_counter" => Some(self.timing.v_counter.into()),
                "line_start" => Some(self.timing.line_start.into()),
                "width" => Some(self.timing.viewport.width.into()),
                "height" => Some(self.timing.viewport.height.into()),
                "fifo.count" => Some(self.fifo.count.into()),
                "dma.length" => Some(self.dma.length.into()),
                "dma.kind" => Some(
                    match self.dma.kind {
                        DmaKind::BusToColor => "bus-color",
                        DmaKind::BusToVram => "bus-vram",
                        DmaKind::Fill => "fill",
                        DmaKind::Copy => "copy",
                    }
                    .into(),
                ),
                "irq.level" => Some(self.irq.m68k.level.into()),
                "irq.hint_pending" => Some(self.irq.hint_pending.into()),
                "irq.vint_pending" => Some(self.irq.vint_pending.into()),
                "irq.h_counter" => Some(self.irq.h_counter.into()),
                "irq.z80" => Some(self.irq.z80_int.into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "status",
            "mode",
            "reg.<n>",
            "vram.<address>",
            "cram.<index>",
            "vsram.<index>",
            "addr",
            "code",
            "pending",
            "v_counter",
            "line_start",
            "width",
            "height",
            "fifo.count",
            "dma.length",
            "dma.kind",
            "irq.level",
            "irq.hint_pending",
            "irq.vint_pending",
            "irq.h_counter",
            "irq.z80",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IrqTarget, Region};
    use pretty_assertions::assert_eq;

    pub(super) struct Ram(pub Vec<u16>);

    impl DmaSource for Ram {
        fn read_word(&mut self, address: u32) -> u16 {
            self.0.get((address as usize >> 1) % self.0.len()).copied().unwrap_or(0)
        }
    }

    /// A Mode 5 VDP with the display on, at the start of line 10.
    pub(super) fn mode5_vdp() -> Vdp {
        let mut vdp = Vdp::new(VdpConfig::default());
        let mut bus = Ram(vec![0]);
        for word in [0x8004, 0x8144, 0x8F02, 0x8C00] {
            vdp.write_control_68k(word, 0, &mut bus);
        }
        vdp.begin_frame();
        vdp.timing.line_start = 10 * MCYCLES_PER_LINE;
        vdp.start_line(10);
        vdp
    }

    #[test]
    fn power_on_status() {
        let mut vdp = Vdp::new(VdpConfig::default());
        // Display off forces VBLANK; cycle 0 is inside HBLANK.
        assert_eq!(vdp.read_status_68k(0), 0x020C);
        assert_eq!(vdp.read_status_68k(1000), 0x0208);

        let mut pal = Vdp::new(VdpConfig {
            region: Region::Pal,
            ..VdpConfig::default()
        });
        assert_eq!(pal.read_status_68k(1000) & 1, 1);
    }

    #[test]
    fn boot_registers_select_mode5_h40() {
        let vdp = Vdp::new(VdpConfig {
            boot_registers: true,
            ..VdpConfig::default()
        });
        assert!(vdp.registers().is_mode5());
        assert!(vdp.registers().h40());
        assert_eq!(vdp.registers().auto_increment(), 2);
        assert!(vdp.timing().viewport.pending_change);
    }

    #[test]
    fn viewport_change_applies_at_frame_start() {
        let mut vdp = Vdp::new(VdpConfig {
            boot_registers: true,
            ..VdpConfig::default()
        });
        assert_eq!(vdp.viewport().width, 256);
        vdp.begin_frame();
        assert_eq!((vdp.viewport().width, vdp.viewport().height), (320, 224));
        assert!(!vdp.timing().viewport.pending_change);
    }

    #[test]
    fn status_read_clears_sprite_flags_and_pending() {
        let mut vdp = mode5_vdp();
        vdp.status |= Status::SPRITE_COLLISION | Status::SPRITE_OVERFLOW;
        vdp.write_control_68k(0x4000, 0, &mut Ram(vec![0]));
        assert!(vdp.port.pending());

        let first = vdp.read_status_68k(10 * MCYCLES_PER_LINE + 1000);
        assert_eq!(first & 0x60, 0x60);
        assert!(!vdp.port.pending());
        let second = vdp.read_status_68k(10 * MCYCLES_PER_LINE + 1000);
        assert_eq!(second & 0x60, 0);
    }

    #[test]
    fn z80_status_read_clears_interrupts() {
        let mut vdp = Vdp::new(VdpConfig {
            irq_target: IrqTarget::M68k,
            ..VdpConfig::default()
        });
        vdp.write_control_68k(0x8164, 0, &mut Ram(vec![0]));
        vdp.set_vint_flag();
        vdp.raise_vint();
        vdp.set_z80_int(true);

        let value = vdp.read_status_z80(1000);
        assert_ne!(value & 0x80, 0);
        assert!(!vdp.z80_int());
        assert!(!vdp.interrupts().vint_pending);
        assert_eq!(vdp.status().bits() & 0x80, 0);
    }

    #[test]
    fn hv_counter_latch_freezes_both_counters_in_mode5() {
        let mut vdp = mode5_vdp();
        let now = 10 * MCYCLES_PER_LINE + 2000;
        let live = vdp.read_hv(now);
        assert_eq!(live >> 8, 9);

        vdp.write_control_68k(0x8006, now, &mut Ram(vec![0]));
        assert_eq!(vdp.read_hv(now + 5000), live);
        vdp.write_control_68k(0x8004, now, &mut Ram(vec![0]));
        assert_ne!(vdp.read_hv(now + 5000), live);
    }

    #[test]
    fn power_on_h_counter_is_latched_in_mode4() {
        let mut vdp = Vdp::new(VdpConfig::default());
        assert!(!vdp.registers().is_mode5());
        let early = vdp.read_hv(MCYCLES_PER_LINE + 100);
        let late = vdp.read_hv(MCYCLES_PER_LINE + 3000);
        assert_eq!((early & 0xFF, late & 0xFF), (0, 0));

        vdp.reset();
        assert_eq!(vdp.read_hv(MCYCLES_PER_LINE + 3000) & 0xFF, 0);
    }

    #[test]
    fn z80_sees_collision_only_from_h_counter_ff() {
        let mut vdp = mode5_vdp();
        vdp.write_control_68k(0x8578, 0, &mut Ram(vec![0]));
        let mem = vdp.memory_mut();
        for row in 0..16 {
            mem.write_vram_word(32 + row * 2, 0x1111);
        }
        for (entry, link, x) in [(0xF000, 1, 128), (0xF008, 0, 132)] {
            mem.write_vram_word(entry, 10 + 128);
            mem.write_vram_word(entry + 2, link);
            mem.write_vram_word(entry + 4, 0x0001);
            mem.write_vram_word(entry + 6, x);
        }
        vdp.render_line(9);
        vdp.render_line(10);
        assert_eq!(vdp.renderer.collision_line(), Some(10));

        // Line 10 spans cycles 11 * 3420 onwards in frame time.
        let line_10 = 11 * MCYCLES_PER_LINE;
        assert_eq!(vdp.read_status_z80(line_10 + 50) & 0x20, 0);
        assert_eq!(vdp.read_status_z80(line_10 + 200) & 0x20, 0x20);
        assert_eq!(vdp.read_status_z80(line_10 + 300) & 0x20, 0);
    }

    #[test]
    fn frame_interrupt_wins_acknowledge() {
        let mut vdp = mode5_vdp();
        vdp.write_control_68k(0x8014, 0, &mut Ram(vec![0]));
        vdp.write_control_68k(0x8164, 0, &mut Ram(vec![0]));
        vdp.irq.hint_pending = true;
        vdp.set_vint_flag();
        vdp.raise_vint();
        assert_eq!(vdp.m68k_irq().level, 6);

        assert!(vdp.acknowledge_interrupt());
        assert_eq!(vdp.m68k_irq().level, 4);
        assert_eq!(vdp.status().bits() & 0x80, 0);
        assert!(!vdp.acknowledge_interrupt());
        assert_eq!(vdp.m68k_irq().level, 0);
    }

    #[test]
    fn observable_paths() {
        let vdp = mode5_vdp();
        assert_eq!(vdp.query("reg.1"), Some(Value::U8(0x44)));
        assert_eq!(vdp.query("mode"), Some(Value::Str("mode5")));
        assert_eq!(vdp.query("v_counter"), Some(Value::U16(10)));
        assert_eq!(vdp.query("vram.0x10000"), None);
        assert_eq!(vdp.query("reg.30"), None);
        assert_eq!(vdp.query("bogus"), None);
    }
}
