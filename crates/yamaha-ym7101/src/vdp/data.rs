//! Data port: VRAM, CRAM and VSRAM accesses from both CPUs.

use super::Vdp;
use crate::dma::{DmaKind, FillLatch};
use crate::memory::{pack_cram, unpack_cram};
use crate::port::Target;
use crate::render::palette::MODE4_BACKDROP;
use crate::status::Status;

/// Mode 4 VRAM word index as seen from the 68000's 16-bit data port.
fn interleaved_index(addr: u16) -> usize {
    usize::from(((addr << 1) & 0x3FC) | ((addr & 0x200) >> 8) | (addr & 0x3C00))
}

impl Vdp {
    /// 68000 data port write.
    ///
    /// Returns the cycle the 68000 must stall to when the write FIFO was
    /// full.
    pub fn write_data_68k(&mut self, data: u16, now: u32) -> Option<u32> {
        self.port.clear_pending();

        let stall = if !self.status.contains(Status::VBLANK) && self.regs.display_enabled() {
            self.fifo.push(now, &mut self.status)
        } else {
            None
        };
        if let Some(until) = stall {
            log::trace!("FIFO full, 68000 stalled to {until}");
        }

        if self.regs.is_mode5() {
            self.bus_write(data, now);
            if self.dma.fill == FillLatch::Armed {
                self.start_fill((data >> 8) as u8, now);
            }
        } else {
            self.write_word_m4(data);
        }
        stall
    }

    /// Store one Mode 5 word at the address register and advance it. Shared
    /// by the data port and bus DMA.
    pub(crate) fn bus_write(&mut self, data: u16, now: u32) {
        let addr = self.port.addr;
        match self.port.target() {
            Target::VramWrite => self.mem.write_vram_word(addr, data),
            Target::CramWrite => {
                let index = ((addr >> 1) & 0x3F) as u8;
                self.store_cram_m5(index, pack_cram(data), now);
            }
            Target::VsramWrite => {
                self.mem.vsram[usize::from((addr & 0x7E) >> 1)] = data;
                if self.regs.column_vscroll() && self.line_redrawable(now) {
                    self.render_line(self.timing.v_counter);
                }
            }
            _ => log::warn!("data write with code {:#04X} ignored", self.port.code),
        }
        self.port.advance(self.regs.auto_increment());
    }

    fn start_fill(&mut self, byte: u8, now: u32) {
        self.dma.fill = FillLatch::Idle;
        self.dma.fill_byte = byte;
        self.dma.start(DmaKind::Fill, self.regs.dma_length());
        self.update_internal_dma(now);
    }

    fn store_cram_m5(&mut self, index: u8, color: u16, now: u32) {
        let slot = &mut self.mem.cram[usize::from(index)];
        if *slot == color {
            return;
        }
        *slot = color;

        let full = self.regs.get(0) & 0x04 != 0;
        if index & 0x0F != 0 {
            self.renderer.palette.update_m5(index, color, full);
        }
        if index == self.border {
            self.renderer.palette.update_m5(0, color, full);
        }
        if self.line_redrawable(now) {
            self.remap_current_line();
        }
    }

    fn store_cram_m4(&mut self, index: u8, color: u16) {
        let slot = &mut self.mem.cram[usize::from(index)];
        if *slot == color {
            return;
        }
        *slot = color;
        self.renderer.palette.update_m4(index, color);
        if index == 0x10 | (self.border & 0x0F) {
            self.renderer.palette.update_m4(MODE4_BACKDROP, color);
        }
    }

    fn write_word_m4(&mut self, data: u16) {
        let addr = self.port.addr;
        if self.port.code & 0x02 != 0 {
            let color = ((data & 0xE00) >> 3) | (data & 0x3F);
            self.store_cram_m4((addr & 0x1F) as u8, color);
        } else {
            let data = if addr & 1 != 0 { data.swap_bytes() } else { data };
            let index = interleaved_index(addr);
            let bytes = data.to_le_bytes();
            if self.mem.vram[index..index + 2] != bytes {
                self.mem.vram[index..index + 2].copy_from_slice(&bytes);
                self.mem.mark_pattern_dirty(index as u16);
            }
        }
        self.port.advance(self.regs.auto_increment() + 1);
    }

    /// 68000 data port read.
    pub fn read_data_68k(&mut self, _now: u32) -> u16 {
        self.port.clear_pending();
        let addr = self.port.addr;

        if !self.regs.is_mode5() {
            let index = interleaved_index(addr);
            let data = u16::from_le_bytes([self.mem.vram[index], self.mem.vram[index + 1]]);
            self.port.advance(self.regs.auto_increment() + 1);
            return data;
        }

        let data = match self.port.target() {
            Target::VramRead => self.mem.read_vram_word(addr & 0xFFFE),
            Target::VsramRead => self.mem.vsram[usize::from((addr & 0x7E) >> 1)],
            Target::CramRead => unpack_cram(self.mem.cram[usize::from((addr >> 1) & 0x3F)]),
            _ => {
                log::debug!("data read with code {:#04X}", self.port.code);
                0
            }
        };
        self.port.advance(self.regs.auto_increment());
        data
    }

    /// Z80 data port write.
    pub fn write_data_z80(&mut self, data: u8, now: u32) {
        self.port.clear_pending();
        let addr = self.port.addr;

        if !self.regs.is_mode5() {
            if self.port.code & 0x02 != 0 {
                self.store_cram_m4((addr & 0x1F) as u8, u16::from(data));
            } else {
                let index = usize::from(addr & 0x3FFF);
                if self.mem.vram[index] != data {
                    self.mem.vram[index] = data;
                    self.mem.mark_pattern_dirty(index as u16);
                }
            }
            self.port.advance(self.regs.auto_increment() + 1);
            return;
        }

        match self.port.target() {
            Target::VramWrite => self.mem.write_vram_byte(addr ^ 1, data),
            Target::CramWrite => {
                let index = ((addr >> 1) & 0x3F) as u8;
                let old = self.mem.cram[usize::from(index)];
                let data = u16::from(data);
                let color = if addr & 1 != 0 {
                    (old & 0x03F) | ((data & 0x0E) << 5)
                } else {
                    (old & 0x1C0) | ((data & 0x0E) >> 1) | ((data & 0xE0) >> 2)
                };
                self.store_cram_m5(index, color, now);
            }
            Target::VsramWrite => {
                let word = &mut self.mem.vsram[usize::from((addr & 0x7E) >> 1)];
                *word = if addr & 1 != 0 {
                    (*word & 0x00FF) | (u16::from(data) << 8)
                } else {
                    (*word & 0xFF00) | u16::from(data)
                };
            }
            _ => log::warn!("Z80 data write with code {:#04X} ignored", self.port.code),
        }
        self.port.advance(self.regs.auto_increment());

        if self.dma.fill == FillLatch::Armed {
            self.start_fill(data, now);
        }
    }

    /// Z80 data port read.
    pub fn read_data_z80(&mut self, _now: u32) -> u8 {
        self.port.clear_pending();
        let addr = self.port.addr;

        if !self.regs.is_mode5() {
            let data = self.read_buffer;
            self.read_buffer = self.mem.vram[usize::from(addr & 0x3FFF)];
            self.port.advance(self.regs.auto_increment() + 1);
            return data;
        }

        let data = match self.port.target() {
            Target::VramRead => self.mem.vram[usize::from(addr ^ 1)],
            Target::VsramRead => {
                let word = self.mem.vsram[usize::from((addr & 0x7E) >> 1)];
                if addr & 1 != 0 { (word >> 8) as u8 } else { word as u8 }
            }
            Target::CramRead => {
                let color = unpack_cram(self.mem.cram[usize::from((addr >> 1) & 0x3F)]);
                if addr & 1 != 0 { (color >> 8) as u8 } else { color as u8 }
            }
            _ => {
                log::debug!("Z80 data read with code {:#04X}", self.port.code);
                0
            }
        };
        self.port.advance(self.regs.auto_increment());
        data
    }
}
