//! Control register file and the fields derived from it.
//!
//! The VDP has 24 meaningful registers (the index field is five bits, so
//! 32 slots are kept). Renderers never decode raw register bits on the hot
//! path; every address base and mask they need is recomputed here when the
//! register that defines it is written.

use crate::config::Region;
use crate::memory::SatWindow;

/// Horizontal scroll line masks, indexed by reg 11 bits 1-0.
pub const HSCROLL_MASK_TABLE: [u16; 4] = [0x00, 0x07, 0xF8, 0xFF];

/// Name table row shift, indexed by reg 16 bits 1-0.
pub const PLAYFIELD_SHIFT_TABLE: [u8; 4] = [6, 7, 0, 8];

/// Name table column mask in 2-cell units, indexed by reg 16 bits 1-0.
pub const PLAYFIELD_COL_MASK_TABLE: [u16; 4] = [0x0F, 0x1F, 0x0F, 0x3F];

/// Name table row mask in lines, indexed by reg 16 bits 5-4.
pub const PLAYFIELD_ROW_MASK_TABLE: [u16; 4] = [0x0FF, 0x1FF, 0x2FF, 0x3FF];

/// Last V counter value before the counter jumps back, indexed by
/// reg 1 bits 3-2 (V30, Mode 5) then PAL.
pub const VC_MAX_TABLE: [[u16; 2]; 4] = [
    [0xDA, 0xF2],
    [0xEA, 0x102],
    [0xDA, 0xF2],
    [0x106, 0x10A],
];

/// Display mode selected by reg 1 bit 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Master System compatible tile mode.
    Mode4,
    /// Native Mega Drive mode.
    Mode5,
}

/// Window plane horizontal split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowClip {
    /// Split point in 8-pixel cells.
    pub column: u16,
    /// Window occupies the columns right of the split.
    pub right: bool,
}

/// The 32-entry register file.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    regs: [u8; 32],
    region: Region,

    pub plane_a_base: u16,
    pub window_base: u16,
    pub plane_b_base: u16,
    pub hscroll_base: u16,
    pub hscroll_mask: u16,
    pub playfield_shift: u8,
    pub playfield_col_mask: u16,
    pub playfield_row_mask: u16,
    pub sat_window: SatWindow,
    pub window_clip: WindowClip,
    pub vc_max: u16,
}

impl RegisterFile {
    #[must_use]
    pub fn new(region: Region) -> Self {
        let mut regs = Self {
            regs: [0; 32],
            region,
            plane_a_base: 0,
            window_base: 0,
            plane_b_base: 0,
            hscroll_base: 0,
            hscroll_mask: 0,
            playfield_shift: 0,
            playfield_col_mask: 0,
            playfield_row_mask: 0,
            sat_window: SatWindow::H32,
            window_clip: WindowClip::default(),
            vc_max: 0,
        };
        regs.rederive();
        regs
    }

    /// Raw register value.
    #[must_use]
    pub fn get(&self, index: usize) -> u8 {
        self.regs[index & 0x1F]
    }

    /// All 32 raw values.
    #[must_use]
    pub fn raw(&self) -> &[u8; 32] {
        &self.regs
    }

    /// Store a register and recompute what depends on it.
    ///
    /// Returns the previous value so the caller can act on changed bits.
    pub fn write(&mut self, index: usize, value: u8) -> u8 {
        let index = index & 0x1F;
        let old = self.regs[index];
        self.regs[index] = value;

        match index {
            1 => {
                self.update_vc_max();
                self.update_window_clip();
            }
            2 => self.plane_a_base = (u16::from(value) << 10) & 0xE000,
            3 => self.update_window_base(),
            4 => self.plane_b_base = (u16::from(value) << 13) & 0xE000,
            5 => self.update_sat_base(),
            11 => self.hscroll_mask = HSCROLL_MASK_TABLE[usize::from(value & 3)],
            12 => {
                self.sat_window = if self.h40() {
                    SatWindow::H40
                } else {
                    SatWindow::H32
                };
                self.update_sat_base();
                self.update_window_base();
                self.update_window_clip();
            }
            13 => self.hscroll_base = (u16::from(value) << 10) & 0xFC00,
            16 => {
                let size = usize::from(value & 3);
                self.playfield_shift = PLAYFIELD_SHIFT_TABLE[size];
                self.playfield_col_mask = PLAYFIELD_COL_MASK_TABLE[size];
                self.playfield_row_mask = PLAYFIELD_ROW_MASK_TABLE[usize::from((value >> 4) & 3)];
            }
            17 => self.update_window_clip(),
            _ => {}
        }
        old
    }

    /// Replace every register at once and recompute all derived fields.
    pub fn load(&mut self, values: &[u8; 32]) {
        self.regs = *values;
        self.rederive();
    }

    /// Clear every register.
    pub fn reset(&mut self) {
        self.load(&[0; 32]);
    }

    fn rederive(&mut self) {
        for index in [1, 2, 4, 11, 12, 13, 16] {
            self.write(index, self.regs[index]);
        }
    }

    fn update_vc_max(&mut self) {
        let row = usize::from((self.regs[1] >> 2) & 3);
        self.vc_max = VC_MAX_TABLE[row][usize::from(self.region.is_pal())];
    }

    fn update_window_base(&mut self) {
        let mask = if self.h40() { 0xF000 } else { 0xF800 };
        self.window_base = (u16::from(self.regs[3]) << 10) & mask;
    }

    fn update_sat_base(&mut self) {
        self.sat_window.base = (u16::from(self.regs[5]) << 9) & self.sat_window.base_mask;
    }

    fn update_window_clip(&mut self) {
        let columns = self.width() / 8;
        let split = u16::from(self.regs[17] & 0x1F) * 2;
        self.window_clip = WindowClip {
            column: split.min(columns),
            right: self.regs[17] & 0x80 != 0,
        };
    }

    #[must_use]
    pub fn mode(&self) -> DisplayMode {
        if self.regs[1] & 0x04 != 0 {
            DisplayMode::Mode5
        } else {
            DisplayMode::Mode4
        }
    }

    #[must_use]
    pub fn is_mode5(&self) -> bool {
        self.mode() == DisplayMode::Mode5
    }

    #[must_use]
    pub fn display_enabled(&self) -> bool {
        self.regs[1] & 0x40 != 0
    }

    #[must_use]
    pub fn dma_enabled(&self) -> bool {
        self.regs[1] & 0x10 != 0
    }

    #[must_use]
    pub fn hint_enabled(&self) -> bool {
        self.regs[0] & 0x10 != 0
    }

    #[must_use]
    pub fn vint_enabled(&self) -> bool {
        self.regs[1] & 0x20 != 0
    }

    #[must_use]
    pub fn h40(&self) -> bool {
        self.regs[12] & 0x01 != 0
    }

    #[must_use]
    pub fn shadow_highlight(&self) -> bool {
        self.regs[12] & 0x08 != 0
    }

    #[must_use]
    pub fn column_vscroll(&self) -> bool {
        self.regs[11] & 0x04 != 0
    }

    /// Backdrop palette index.
    #[must_use]
    pub fn backdrop(&self) -> u8 {
        self.regs[7] & 0x3F
    }

    /// Address increment applied after every data port access.
    #[must_use]
    pub fn auto_increment(&self) -> u16 {
        u16::from(self.regs[15])
    }

    /// DMA length from regs 20:19. Zero means 65536.
    #[must_use]
    pub fn dma_length(&self) -> u32 {
        let length = (u32::from(self.regs[20]) << 8) | u32::from(self.regs[19]);
        if length == 0 { 0x1_0000 } else { length }
    }

    /// Active display width in pixels.
    #[must_use]
    pub fn width(&self) -> u16 {
        if self.is_mode5() {
            256 + (u16::from(self.regs[12] & 1) << 6)
        } else {
            256
        }
    }

    /// Active display height in lines.
    #[must_use]
    pub fn height(&self) -> u16 {
        if self.is_mode5() {
            224 + (u16::from(self.regs[1] & 8) << 1)
        } else {
            192
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_bases_match_reference_tables_for_every_value() {
        let mut regs = RegisterFile::new(Region::Ntsc);
        for value in 0..=255u8 {
            let v = u16::from(value);
            regs.write(2, value);
            regs.write(4, value);
            regs.write(13, value);
            regs.write(11, value);
            regs.write(16, value);
            assert_eq!(regs.plane_a_base, (v << 10) & 0xE000);
            assert_eq!(regs.plane_b_base, (v << 13) & 0xE000);
            assert_eq!(regs.hscroll_base, (v << 10) & 0xFC00);
            assert_eq!(regs.hscroll_mask, HSCROLL_MASK_TABLE[usize::from(value & 3)]);
            assert_eq!(
                regs.playfield_shift,
                PLAYFIELD_SHIFT_TABLE[usize::from(value & 3)]
            );
            assert_eq!(
                regs.playfield_row_mask,
                PLAYFIELD_ROW_MASK_TABLE[usize::from((value >> 4) & 3)]
            );
        }
    }

    #[test]
    fn window_and_sat_bases_follow_h40() {
        let mut regs = RegisterFile::new(Region::Ntsc);
        regs.write(3, 0x3E);
        regs.write(5, 0x7F);
        assert_eq!(regs.window_base, 0xF800);
        assert_eq!(regs.sat_window.base, 0xFE00);

        regs.write(12, 0x81);
        assert_eq!(regs.window_base, 0xF000);
        assert_eq!(regs.sat_window.base, 0xFC00);
        assert_eq!(regs.sat_window.addr_mask, 0x3FF);
    }

    #[test]
    fn vc_max_indexed_by_mode_and_region() {
        let mut ntsc = RegisterFile::new(Region::Ntsc);
        let mut pal = RegisterFile::new(Region::Pal);
        for (value, expected) in [(0x00, [0xDA, 0xF2]), (0x04, [0xEA, 0x102]), (0x0C, [0x106, 0x10A])] {
            ntsc.write(1, value);
            pal.write(1, value);
            assert_eq!([ntsc.vc_max, pal.vc_max], expected, "reg1 = {value:#04X}");
        }
    }

    #[test]
    fn viewport_dimensions_depend_on_mode() {
        let mut regs = RegisterFile::new(Region::Pal);
        assert_eq!((regs.width(), regs.height()), (256, 192));
        regs.write(1, 0x0C);
        regs.write(12, 0x81);
        assert_eq!((regs.width(), regs.height()), (320, 240));
    }

    #[test]
    fn zero_dma_length_means_full_64k() {
        let mut regs = RegisterFile::new(Region::Ntsc);
        assert_eq!(regs.dma_length(), 0x1_0000);
        regs.write(19, 0x34);
        regs.write(20, 0x12);
        assert_eq!(regs.dma_length(), 0x1234);
    }

    #[test]
    fn load_rederives_every_field() {
        let mut values = [0u8; 32];
        values[2] = 0x30;
        values[5] = 0x78;
        values[12] = 0x81;
        let mut regs = RegisterFile::new(Region::Ntsc);
        regs.load(&values);
        assert_eq!(regs.plane_a_base, 0xC000);
        assert_eq!(regs.sat_window.base, 0xF000);
        assert!(regs.h40());
    }

    #[test]
    fn window_clip_is_capped_at_screen_width() {
        let mut regs = RegisterFile::new(Region::Ntsc);
        regs.write(1, 0x04);
        regs.write(17, 0x9F);
        assert_eq!(regs.window_clip, WindowClip { column: 32, right: true });
        regs.write(17, 0x05);
        assert_eq!(regs.window_clip, WindowClip { column: 10, right: false });
    }
}
