//! Decoded pattern cache.
//!
//! Every 8x8 pattern is kept decoded to one byte per pixel in all four flip
//! orientations, so renderers index pixels directly:
//!
//! ```text
//! index = flip << 17 | name << 6 | row << 3 | column
//! flip  = vflip << 1 | hflip
//! ```

use crate::memory::{PATTERN_COUNT, VideoMemory};

pub const PATTERN_CACHE_SIZE: usize = 4 * PATTERN_COUNT * 64;

/// Pattern decoder for the active display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheUpdater {
    /// Four interleaved bitplanes per row.
    Mode4,
    /// Packed 4bpp, high nibble first.
    Mode5,
}

impl CacheUpdater {
    /// Number of patterns reachable in this mode.
    #[must_use]
    pub fn pattern_count(self) -> usize {
        match self {
            Self::Mode4 => 0x200,
            Self::Mode5 => PATTERN_COUNT,
        }
    }

    fn decode_row(self, bytes: [u8; 4]) -> [u8; 8] {
        let mut row = [0u8; 8];
        match self {
            Self::Mode4 => {
                for (x, px) in row.iter_mut().enumerate() {
                    let bit = 7 - x;
                    *px = bytes
                        .iter()
                        .enumerate()
                        .fold(0, |acc, (plane, b)| acc | (((b >> bit) & 1) << plane));
                }
            }
            Self::Mode5 => {
                for (x, px) in row.iter_mut().enumerate() {
                    let b = bytes[x / 2];
                    *px = if x & 1 == 0 { b >> 4 } else { b & 0x0F };
                }
            }
        }
        row
    }
}

pub struct PatternCache {
    pixels: Box<[u8]>,
}

impl PatternCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pixels: vec![0; PATTERN_CACHE_SIZE].into_boxed_slice(),
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Pixel `(x, row)` of pattern `name` seen through `flip`.
    #[inline]
    #[must_use]
    pub fn pixel(&self, flip: u16, name: u16, row: u16, x: u16) -> u8 {
        let index = (usize::from(flip & 3) << 17)
            | (usize::from(name & 0x7FF) << 6)
            | (usize::from(row & 7) << 3)
            | usize::from(x & 7);
        self.pixels[index]
    }

    /// Re-decode every dirty row.
    pub fn update(&mut self, updater: CacheUpdater, mem: &mut VideoMemory) {
        if mem.dirty.is_empty() {
            return;
        }
        let VideoMemory { vram, dirty, .. } = mem;
        dirty.drain(|name, rows| {
            for row in 0..8u16 {
                if rows & (1 << row) == 0 {
                    continue;
                }
                let addr = usize::from(name) * 32 + usize::from(row) * 4;
                let bytes = [vram[addr], vram[addr + 1], vram[addr + 2], vram[addr + 3]];
                let decoded = updater.decode_row(bytes);
                self.store_row(name, row, &decoded);
            }
        });
    }

    fn store_row(&mut self, name: u16, row: u16, decoded: &[u8; 8]) {
        let base = usize::from(name) << 6;
        for flip in 0..4usize {
            let dest_row = if flip & 2 != 0 { 7 - row } else { row };
            let line = (flip << 17) | base | (usize::from(dest_row) << 3);
            for (x, &px) in decoded.iter().enumerate() {
                let dest_x = if flip & 1 != 0 { 7 - x } else { x };
                self.pixels[line | dest_x] = px;
            }
        }
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode5_row_decodes_nibbles_in_order() {
        let mut mem = VideoMemory::new();
        mem.write_vram_word(0x0020, 0x1234);
        mem.write_vram_word(0x0022, 0x5678);
        let mut cache = PatternCache::new();
        cache.update(CacheUpdater::Mode5, &mut mem);

        let row: Vec<u8> = (0..8).map(|x| cache.pixel(0, 1, 0, x)).collect();
        assert_eq!(row, [1, 2, 3, 4, 5, 6, 7, 8]);
        let flipped: Vec<u8> = (0..8).map(|x| cache.pixel(1, 1, 0, x)).collect();
        assert_eq!(flipped, [8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(cache.pixel(2, 1, 7, 0), 1, "vflip moves row 0 to row 7");
        assert!(mem.dirty.is_empty());
    }

    #[test]
    fn mode4_row_combines_bitplanes() {
        let mut mem = VideoMemory::new();
        // Leftmost pixel: planes 0 and 3 set -> color 9.
        mem.vram[0] = 0x80;
        mem.vram[3] = 0x80;
        mem.vram[1] = 0x01; // rightmost pixel: plane 1 -> color 2
        mem.dirty.mark(0);
        let mut cache = PatternCache::new();
        cache.update(CacheUpdater::Mode4, &mut mem);
        assert_eq!(cache.pixel(0, 0, 0, 0), 9);
        assert_eq!(cache.pixel(0, 0, 0, 7), 2);
    }

    #[test]
    fn pattern_counts_per_mode() {
        assert_eq!(CacheUpdater::Mode4.pattern_count(), 0x200);
        assert_eq!(CacheUpdater::Mode5.pattern_count(), 0x800);
        assert_eq!(PATTERN_CACHE_SIZE, 0x8_0000);
    }
}
