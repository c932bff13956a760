//! Control port: address/code commands, register writes and DMA start.

use super::{NoBus, Vdp};
use crate::dma::{DmaKind, DmaSource, FillLatch};
use crate::fifo::latency_for;
use crate::port::{ControlCommand, Target};

/// Cycles before the render boundary where enabling the display still
/// shows sprites, but fewer of them.
const LATE_ENABLE_WINDOW: i64 = 500;
const LATE_ENABLE_SPRITES: usize = 5;

impl Vdp {
    /// 68000 control port write.
    ///
    /// Returns the cycle the 68000 is frozen until when the write started a
    /// bus DMA.
    pub fn write_control_68k(&mut self, data: u16, now: u32, bus: &mut dyn DmaSource) -> Option<u32> {
        // Second half of a long write that started a bus DMA with its first
        // word. It lands when the transfer ends.
        if !self.port.pending() && self.dma.active() && self.dma.kind.freezes_cpu() {
            log::trace!("control word {data:#06X} deferred behind DMA");
            self.deferred = Some(data);
            return None;
        }

        let mut freeze = None;
        match self.port.write_word(data, self.regs.is_mode5()) {
            ControlCommand::Register { index, value } => {
                self.write_register(usize::from(index), value, now);
            }
            ControlCommand::Dma if self.regs.dma_enabled() => {
                freeze = self.start_dma_68k(now, bus);
            }
            _ => {}
        }

        self.fifo.latency = latency_for(self.regs.h40(), self.port.target() == Target::VramWrite);
        freeze
    }

    fn start_dma_68k(&mut self, now: u32, bus: &mut dyn DmaSource) -> Option<u32> {
        let code = self.port.code;
        match self.regs.get(23) >> 6 {
            2 => {
                if Target::from_code(code) == Target::VramWrite {
                    self.dma.fill = FillLatch::Armed;
                }
                None
            }
            3 => {
                if code & 0x1F != 0x10 {
                    return None;
                }
                self.dma.start(DmaKind::Copy, self.regs.dma_length());
                self.update_dma(now, bus)
            }
            _ => {
                let kind = if code & 0x06 != 0 {
                    DmaKind::BusToColor
                } else {
                    DmaKind::BusToVram
                };
                self.dma.start(kind, self.regs.dma_length());
                self.update_dma(now, bus)
            }
        }
    }

    /// Z80 control port write.
    pub fn write_control_z80(&mut self, data: u8, now: u32) {
        match self.port.write_byte(data, self.regs.is_mode5()) {
            ControlCommand::Register { index, value } => {
                self.write_register(usize::from(index), value, now);
            }
            ControlCommand::ReadAhead => {
                self.read_buffer = self.mem.vram[usize::from(self.port.addr & 0x3FFF)];
                self.port.advance(self.regs.auto_increment() + 1);
            }
            ControlCommand::Dma if self.regs.dma_enabled() => self.start_dma_z80(now),
            _ => {}
        }
    }

    /// The Z80 cannot lend its bus, so only fill and copy start from here.
    fn start_dma_z80(&mut self, now: u32) {
        let code = self.port.code;
        match self.regs.get(23) >> 6 {
            2 => {
                if Target::from_code(code) == Target::VramWrite {
                    self.dma.fill = FillLatch::Armed;
                }
            }
            3 => {
                if code & 0x1F == 0x10 {
                    self.dma.start(DmaKind::Copy, self.regs.dma_length());
                    let _ = self.update_dma(now, &mut NoBus);
                }
            }
            _ => log::warn!("bus DMA requested from the Z80 port, ignored"),
        }
    }

    /// Store a register and apply its side effects at cycle `now`.
    pub(crate) fn write_register(&mut self, index: usize, value: u8, now: u32) {
        if !self.regs.is_mode5() && index > 10 {
            log::debug!("register {index} ignored in Mode 4 ({value:#04X})");
            return;
        }

        let old = self.regs.write(index, value);
        let changed = old ^ value;
        log::trace!("reg {index} = {value:#04X}");

        match index {
            0 => {
                if changed & 0x10 != 0 {
                    self.irq
                        .hint_enable_changed(self.regs.hint_enabled(), self.regs.vint_enabled());
                }
                if changed & 0x04 != 0 {
                    self.rebuild_palette();
                }
                if changed & 0x02 != 0 && self.regs.is_mode5() {
                    self.hvc_latch = if value & 0x02 != 0 {
                        u32::from(self.read_hv(now)) | 0x1_0000
                    } else {
                        0
                    };
                }
            }
            1 => {
                if changed & 0x40 != 0 && self.timing.in_active_display() {
                    self.display_toggled(value & 0x40 != 0, now);
                }
                if changed & 0x20 != 0 {
                    self.irq
                        .vint_enable_changed(self.regs.vint_enabled(), self.regs.hint_enabled());
                }
                if changed & 0x08 != 0 && self.regs.is_mode5() {
                    self.height_changed();
                }
                if changed & 0x04 != 0 {
                    self.mode_switched(now);
                }
            }
            // Redrawn even when the base is unchanged: VRAM or the sprite
            // list may have moved on since the first pass.
            2..=4 => {
                if self.line_redrawable(now) {
                    self.render_line(self.timing.v_counter);
                }
            }
            5 => self.mem.set_sat_window(self.regs.sat_window),
            7 => self.backdrop_changed(now),
            8 => self.catch_up_line(now),
            11 => self.reselect_renderers(),
            12 => self.reg12_changed(old, value, now),
            _ => {}
        }
    }

    /// Display enable flipped in the middle of an active line.
    fn display_toggled(&mut self, enabled: bool, now: u32) {
        let line = self.timing.v_counter;
        let offset = self.timing.boundary_offset(now);

        if offset <= 0 {
            if enabled && offset >= -LATE_ENABLE_WINDOW {
                self.renderer.limit_sprites(line, LATE_ENABLE_SPRITES);
            }
            self.render_line(line);
            return;
        }

        let pixel = if self.regs.h40() {
            offset / 8
        } else {
            offset / 10 + 16
        };
        let pixel = pixel as usize;
        let width = usize::from(self.timing.viewport.width);
        if pixel >= width {
            return;
        }
        let mode5 = self.regs.is_mode5();
        if enabled {
            self.render_line(line);
            self.renderer.blank_line(line, 0, pixel, mode5);
        } else {
            self.renderer.blank_line(line, pixel, width - pixel, mode5);
        }
    }

    fn height_changed(&mut self) {
        if self.timing.in_active_display() {
            self.timing.viewport.height = self.regs.height();
        } else {
            self.timing.viewport.pending_change = true;
        }
    }

    fn mode_switched(&mut self, now: u32) {
        log::debug!(
            "switched to {:?} at line {}",
            self.regs.mode(),
            self.timing.v_counter
        );
        self.reselect_renderers();
        self.height_changed();

        self.hvc_latch = 0;
        if !self.regs.is_mode5() || self.regs.get(0) & 0x02 != 0 {
            self.hvc_latch = u32::from(self.read_hv(now)) | 0x1_0000;
        }
    }

    fn backdrop_changed(&mut self, now: u32) {
        let border = self.regs.backdrop();
        if border == self.border {
            return;
        }
        self.border = border;

        if self.regs.is_mode5() {
            let full = self.regs.get(0) & 0x04 != 0;
            let color = self.mem.cram[usize::from(border)];
            self.renderer.palette.update_m5(0, color, full);
        } else {
            let color = self.mem.cram[usize::from(0x10 | (border & 0x0F))];
            self.renderer
                .palette
                .update_m4(crate::render::palette::MODE4_BACKDROP, color);
        }

        if self.timing.in_active_display() && self.timing.before_render_boundary(now) {
            self.remap_current_line();
        }
    }

    /// Horizontal scroll written while the scheduler is behind the CPU:
    /// render the line the beam has actually reached.
    fn catch_up_line(&mut self, now: u32) {
        let lines = u32::from(self.timing.lines_per_frame);
        let line = ((lines + now / crate::MCYCLES_PER_LINE - 1) % lines) as u16;
        if line > self.timing.v_counter && line < self.timing.viewport.height {
            self.timing.v_counter = line;
            self.render_line(line);
        }
    }

    fn reg12_changed(&mut self, old: u8, value: u8, now: u32) {
        let changed = old ^ value;

        if changed & 0x08 != 0 {
            self.rebuild_palette();
            self.reselect_renderers();
        }
        if changed & 0x06 != 0 {
            self.timing.viewport.pending_change = true;
        }
        if changed & 0x01 != 0 {
            self.mem.set_sat_window(self.regs.sat_window);
            self.fifo.latency = latency_for(self.regs.h40(), self.port.target() == Target::VramWrite);
            if self.timing.in_active_display() && self.timing.before_render_boundary(now) {
                self.timing.viewport.width = self.regs.width();
                self.render_line(self.timing.v_counter);
            } else {
                self.timing.viewport.pending_change = true;
            }
        }
    }
}
