//! Video memory bank: VRAM, CRAM, VSRAM and the sprite attribute shadow.
//!
//! VRAM is stored in VDP address order: the byte at even address `n` is the
//! high byte of the 16-bit word at `n`.
//!
//! The chip keeps an internal copy of the first part of the sprite attribute
//! table (Y position, size and link for each sprite). Every VRAM write that
//! lands inside the current table window is mirrored into it, and the
//! sprite parser reads from the copy rather than VRAM. Software that moves
//! the table base without rewriting it sees stale sprites, as on hardware.

/// VRAM size in bytes.
pub const VRAM_SIZE: usize = 0x1_0000;

/// Size of the internal sprite attribute shadow.
pub const SAT_SHADOW_SIZE: usize = 0x400;

/// Number of 8x8 patterns addressable in VRAM.
pub const PATTERN_COUNT: usize = 0x800;

/// Current sprite attribute table window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SatWindow {
    /// Table base address (already masked).
    pub base: u16,
    /// Mask selecting the address bits compared against `base`.
    pub base_mask: u16,
    /// Mask selecting the offset within the shadow.
    pub addr_mask: u16,
}

impl SatWindow {
    /// H32 masks: 64 sprites, table aligned on 512 bytes.
    pub const H32: Self = Self {
        base: 0,
        base_mask: 0xFE00,
        addr_mask: 0x01FF,
    };

    /// H40 masks: 80 sprites, table aligned on 1 KiB.
    pub const H40: Self = Self {
        base: 0,
        base_mask: 0xFC00,
        addr_mask: 0x03FF,
    };

    #[must_use]
    pub fn contains(&self, addr: u16) -> bool {
        addr & self.base_mask == self.base
    }

    #[must_use]
    pub fn offset(&self, addr: u16) -> usize {
        usize::from(addr & self.addr_mask)
    }
}

/// Per-pattern dirty rows awaiting a pattern cache refresh.
///
/// Each pattern has one bit per 4-byte row. A pattern is pushed onto the
/// work list the first time one of its rows goes dirty, so the cache updater
/// only visits patterns that actually changed.
pub struct DirtyPatterns {
    rows: Box<[u8; PATTERN_COUNT]>,
    list: Vec<u16>,
}

impl DirtyPatterns {
    fn new() -> Self {
        Self {
            rows: Box::new([0; PATTERN_COUNT]),
            list: Vec::with_capacity(PATTERN_COUNT),
        }
    }

    /// Record a write to the VRAM byte at `addr`.
    #[inline]
    pub fn mark(&mut self, addr: u16) {
        let name = usize::from(addr >> 5) & (PATTERN_COUNT - 1);
        if self.rows[name] == 0 {
            self.list.push(name as u16);
        }
        self.rows[name] |= 1 << ((addr >> 2) & 7);
    }

    /// Mark every row of the first `count` patterns dirty.
    pub fn invalidate(&mut self, count: usize) {
        let count = count.min(PATTERN_COUNT);
        self.rows[..count].fill(0xFF);
        self.list.clear();
        self.list.extend(
            (0..PATTERN_COUNT)
                .filter(|&name| self.rows[name] != 0)
                .map(|name| name as u16),
        );
    }

    /// Visit each dirty pattern with its dirty-row mask and clear it.
    pub fn drain(&mut self, mut f: impl FnMut(u16, u8)) {
        for &name in &self.list {
            let idx = usize::from(name);
            f(name, self.rows[idx]);
            self.rows[idx] = 0;
        }
        self.list.clear();
    }

    /// Dirty-row mask of one pattern.
    #[must_use]
    pub fn rows(&self, name: usize) -> u8 {
        self.rows[name & (PATTERN_COUNT - 1)]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    fn clear(&mut self) {
        self.rows.fill(0);
        self.list.clear();
    }
}

/// VDP-owned memories.
pub struct VideoMemory {
    pub vram: Box<[u8; VRAM_SIZE]>,
    /// Packed colors, `BBBGGGRRR`.
    pub cram: [u16; 64],
    pub vsram: [u16; 64],
    pub sat: [u8; SAT_SHADOW_SIZE],
    pub sat_window: SatWindow,
    pub dirty: DirtyPatterns,
}

impl VideoMemory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            vram: Box::new([0; VRAM_SIZE]),
            cram: [0; 64],
            vsram: [0; 64],
            sat: [0; SAT_SHADOW_SIZE],
            sat_window: SatWindow::H32,
            dirty: DirtyPatterns::new(),
        }
    }

    pub fn reset(&mut self) {
        self.vram.fill(0);
        self.cram = [0; 64];
        self.vsram = [0; 64];
        self.sat = [0; SAT_SHADOW_SIZE];
        self.sat_window = SatWindow::H32;
        self.dirty.clear();
    }

    /// Read the big-endian word containing `addr`.
    #[must_use]
    pub fn read_vram_word(&self, addr: u16) -> u16 {
        let index = usize::from(addr & 0xFFFE);
        u16::from_be_bytes([self.vram[index], self.vram[index + 1]])
    }

    /// Write a word through the 16-bit data path.
    ///
    /// An odd address swaps the bytes; the word always lands on the even
    /// address below it.
    pub fn write_vram_word(&mut self, addr: u16, data: u16) {
        let data = if addr & 1 != 0 { data.swap_bytes() } else { data };
        let index = addr & 0xFFFE;

        if self.sat_window.contains(addr) {
            let offset = self.sat_window.offset(addr) & !1;
            self.sat[offset..offset + 2].copy_from_slice(&data.to_be_bytes());
        }

        if self.read_vram_word(index) != data {
            let i = usize::from(index);
            self.vram[i..i + 2].copy_from_slice(&data.to_be_bytes());
            self.mark_pattern_dirty(index);
        }
    }

    /// Write one byte (fill, copy and the Z80 data path).
    pub fn write_vram_byte(&mut self, addr: u16, data: u8) {
        if self.sat_window.contains(addr) {
            self.sat[self.sat_window.offset(addr)] = data;
        }
        self.vram[usize::from(addr)] = data;
        self.mark_pattern_dirty(addr);
    }

    /// Flag the pattern row holding `addr` for re-decoding.
    #[inline]
    pub fn mark_pattern_dirty(&mut self, addr: u16) {
        self.dirty.mark(addr);
    }

    /// Move the sprite table window. The shadow keeps its contents.
    pub fn set_sat_window(&mut self, window: SatWindow) {
        self.sat_window = window;
    }
}

impl Default for VideoMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Pack a 68000-side color word (`----BBB-GGG-RRR-`) into 9 bits.
#[must_use]
pub const fn pack_cram(data: u16) -> u16 {
    ((data & 0xE00) >> 3) | ((data & 0x0E0) >> 2) | ((data & 0x00E) >> 1)
}

/// Expand a packed 9-bit color back to the data-port layout.
#[must_use]
pub const fn unpack_cram(color: u16) -> u16 {
    ((color & 0x1C0) << 3) | ((color & 0x038) << 2) | ((color & 0x007) << 1)
}
