//! Color palette cache (ARGB32).
//!
//! Line buffers hold palette indices; the framebuffer is produced by looking
//! each index up here. Mode 5 layout:
//!
//! - `0x00` backdrop, `0x01..=0x3F` CRAM entries (entry 0 of each palette is
//!   never shown, so those slots stay unused)
//! - `0x40..=0x7F` the same colors shadowed
//! - `0x80..=0xBF` the same colors highlighted
//!
//! Mode 4 uses `0x00..=0x1F` for CRAM and `0x40` for the backdrop.

/// Slot holding the Mode 4 backdrop.
pub const MODE4_BACKDROP: u8 = 0x40;

pub const SHADOW: u8 = 0x40;
pub const HIGHLIGHT: u8 = 0x80;

/// When reg 0 bit 2 is clear only the LSB of each component is driven.
const REDUCED_MASK: u16 = 0x049;

fn argb(r: u32, g: u32, b: u32) -> u32 {
    0xFF00_0000 | (r << 16) | (g << 8) | b
}

pub struct Palette {
    colors: [u32; 0x100],
}

impl Palette {
    #[must_use]
    pub fn new() -> Self {
        Self {
            colors: [argb(0, 0, 0); 0x100],
        }
    }

    #[must_use]
    pub fn color(&self, index: u8) -> u32 {
        self.colors[usize::from(index)]
    }

    /// Set one Mode 5 slot and its shadow/highlight variants.
    pub fn update_m5(&mut self, index: u8, color: u16, full: bool) {
        let color = if full { color } else { color & REDUCED_MASK };
        let channel = |shift: u16| u32::from((color >> shift) & 7);
        let (r, g, b) = (channel(0), channel(3), channel(6));

        let i = usize::from(index & 0x3F);
        self.colors[i] = argb(r * 36, g * 36, b * 36);
        self.colors[i | usize::from(SHADOW)] = argb(r * 18, g * 18, b * 18);
        self.colors[i | usize::from(HIGHLIGHT)] = argb(126 + r * 18, 126 + g * 18, 126 + b * 18);
    }

    /// Set one Mode 4 slot from a `--BBGGRR` color.
    pub fn update_m4(&mut self, index: u8, color: u16) {
        let channel = |shift: u16| u32::from((color >> shift) & 3) * 85;
        self.colors[usize::from(index)] = argb(channel(0), channel(2), channel(4));
    }

    /// Recompute every slot from CRAM.
    pub fn rebuild(&mut self, cram: &[u16; 64], backdrop: u8, mode5: bool, full: bool) {
        if mode5 {
            self.update_m5(0, cram[usize::from(backdrop & 0x3F)], full);
            for index in 1..0x40u8 {
                self.update_m5(index, cram[usize::from(index)], full);
            }
        } else {
            for index in 0..0x20u8 {
                self.update_m4(index, cram[usize::from(index)]);
            }
            self.update_m4(MODE4_BACKDROP, cram[usize::from(0x10 | (backdrop & 0x0F))]);
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode5_color_expands_to_argb() {
        let mut palette = Palette::new();
        palette.update_m5(1, 0x007, true); // red 7
        assert_eq!(palette.color(1), 0xFFFC_0000);
        assert_eq!(palette.color(0x41), 0xFF7E_0000);
        assert_eq!(palette.color(0x81), 0xFFFC_7E7E);
    }

    #[test]
    fn reduced_palette_keeps_component_lsb_only() {
        let mut palette = Palette::new();
        palette.update_m5(2, 0x1FF, false);
        assert_eq!(palette.color(2), argb(36, 36, 36));
    }

    #[test]
    fn rebuild_tracks_backdrop_entry() {
        let mut cram = [0u16; 64];
        cram[0x23] = 0x038; // green 7
        let mut palette = Palette::new();
        palette.rebuild(&cram, 0x23, true, true);
        assert_eq!(palette.color(0), palette.color(0x23));
    }

    #[test]
    fn mode4_backdrop_uses_sprite_palette() {
        let mut cram = [0u16; 64];
        cram[0x15] = 0x30; // blue 3
        let mut palette = Palette::new();
        palette.rebuild(&cram, 0x05, false, true);
        assert_eq!(palette.color(MODE4_BACKDROP), 0xFF00_00FF);
    }
}
