//! Line renderers and the per-mode dispatch table.
//!
//! A line is rendered into palette-index layers, composed into one index
//! line, then mapped through the palette cache into the framebuffer. The
//! index line is kept so a palette or backdrop change early in the line can
//! recolor it without re-rendering.
//!
//! Which background renderer, sprite renderer, sprite table parser and
//! pattern decoder run depends on the display mode, interlace mode 2, the
//! vertical scroll mode and shadow/highlight. The four are always swapped
//! together through [`RenderTable`].

mod cache;
mod mode4;
mod mode5;
pub mod palette;

pub use cache::{CacheUpdater, PATTERN_CACHE_SIZE, PatternCache};
pub use palette::Palette;

use crate::memory::VideoMemory;
use crate::registers::{DisplayMode, RegisterFile};
use crate::status::Status;
use crate::timing::{Interlace, Timing};

/// Framebuffer dimensions (widest and tallest Mode 5 display).
pub const FB_WIDTH: usize = 320;
pub const FB_HEIGHT: usize = 240;

/// Layer pixel priority bit. The low six bits hold the palette index.
pub(crate) const PRIORITY: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundRenderer {
    Mode4,
    Mode5,
    /// 2-cell vertical scroll.
    Mode5Column,
    /// Interlace mode 2.
    Mode5Double,
    Mode5DoubleColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteRenderer {
    Mode4,
    Mode5,
    Mode5ShadowHighlight,
    Mode5Double,
    Mode5DoubleShadowHighlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatParser {
    Mode4,
    Mode5,
    Mode5Double,
}

/// The four mode-dependent rendering operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTable {
    pub background: BackgroundRenderer,
    pub sprites: SpriteRenderer,
    pub sat_parser: SatParser,
    pub cache_updater: CacheUpdater,
}

impl RenderTable {
    /// Power-on selection.
    pub const MODE4: Self = Self {
        background: BackgroundRenderer::Mode4,
        sprites: SpriteRenderer::Mode4,
        sat_parser: SatParser::Mode4,
        cache_updater: CacheUpdater::Mode4,
    };

    /// Table for the current registers and the frame's interlace mode.
    #[must_use]
    pub fn select(regs: &RegisterFile, interlace: Interlace) -> Self {
        if regs.mode() == DisplayMode::Mode4 {
            return Self::MODE4;
        }
        let double = interlace == Interlace::Double;
        let background = match (double, regs.column_vscroll()) {
            (false, false) => BackgroundRenderer::Mode5,
            (false, true) => BackgroundRenderer::Mode5Column,
            (true, false) => BackgroundRenderer::Mode5Double,
            (true, true) => BackgroundRenderer::Mode5DoubleColumn,
        };
        let sprites = match (double, regs.shadow_highlight()) {
            (false, false) => SpriteRenderer::Mode5,
            (false, true) => SpriteRenderer::Mode5ShadowHighlight,
            (true, false) => SpriteRenderer::Mode5Double,
            (true, true) => SpriteRenderer::Mode5DoubleShadowHighlight,
        };
        Self {
            background,
            sprites,
            sat_parser: if double {
                SatParser::Mode5Double
            } else {
                SatParser::Mode5
            },
            cache_updater: CacheUpdater::Mode5,
        }
    }
}

/// One sprite selected for the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteEntry {
    /// Sprite number in the attribute table.
    pub index: u8,
    /// First line covered (interlaced lines in mode 2).
    pub top: i16,
    /// Size byte: bits 3-2 width - 1, bits 1-0 height - 1 (cells).
    pub size: u8,
}

/// Sprites found by the last table parse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpriteList {
    pub entries: [SpriteEntry; 20],
    pub count: usize,
}

impl SpriteList {
    #[must_use]
    pub fn visible(&self) -> &[SpriteEntry] {
        &self.entries[..self.count]
    }

    pub fn limit(&mut self, max: usize) {
        self.count = self.count.min(max);
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }

    fn push(&mut self, entry: SpriteEntry) {
        self.entries[self.count] = entry;
        self.count += 1;
    }
}

/// Renderer state that a recolor or re-render of the current line reads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineState {
    /// Composed palette indices of the last rendered line.
    pub indices: Vec<u8>,
    /// Sprites that line was drawn with.
    pub drawn: Vec<SpriteEntry>,
    pub last_line: Option<u16>,
    pub collision_line: Option<u16>,
}

/// Read-only inputs to one line.
pub(crate) struct Scene<'a> {
    pub mem: &'a VideoMemory,
    pub regs: &'a RegisterFile,
    pub timing: &'a Timing,
}

impl Scene<'_> {
    fn width(&self) -> usize {
        usize::from(self.timing.viewport.width).min(FB_WIDTH)
    }

    /// Line number in interlace mode 2 units.
    fn double_line(&self, line: i32) -> i32 {
        line * 2 + i32::from(self.timing.odd_frame)
    }
}

pub struct Renderer {
    table: RenderTable,
    cache: PatternCache,
    pub palette: Palette,
    pub sprites: SpriteList,
    /// List the last rendered line was drawn with, kept for re-renders.
    drawn: SpriteList,
    last_line: Option<u16>,
    /// Line the last sprite collision was found on.
    collision_line: Option<u16>,
    indices: [u8; FB_WIDTH],
    plane_a: [u8; FB_WIDTH],
    plane_b: [u8; FB_WIDTH],
    sprite_layer: [u8; FB_WIDTH],
    framebuffer: Vec<u32>,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RenderTable::MODE4,
            cache: PatternCache::new(),
            palette: Palette::new(),
            sprites: SpriteList::default(),
            drawn: SpriteList::default(),
            last_line: None,
            collision_line: None,
            indices: [0; FB_WIDTH],
            plane_a: [0; FB_WIDTH],
            plane_b: [0; FB_WIDTH],
            sprite_layer: [0; FB_WIDTH],
            framebuffer: vec![0xFF00_0000; FB_WIDTH * FB_HEIGHT],
        }
    }

    pub fn reset(&mut self) {
        self.table = RenderTable::MODE4;
        self.cache.clear();
        self.palette = Palette::new();
        self.sprites.clear();
        self.drawn.clear();
        self.last_line = None;
        self.collision_line = None;
        self.indices = [0; FB_WIDTH];
        self.framebuffer.fill(0xFF00_0000);
    }

    #[must_use]
    pub fn table(&self) -> RenderTable {
        self.table
    }

    /// Install a new table. Returns true when it differs from the old one.
    pub fn set_table(&mut self, table: RenderTable) -> bool {
        let changed = self.table != table;
        self.table = table;
        changed
    }

    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    /// Render one active line. Returns the status flags it raised.
    pub(crate) fn render_line(
        &mut self,
        line: u16,
        mem: &mut VideoMemory,
        regs: &RegisterFile,
        timing: &Timing,
    ) -> Status {
        debug_assert!(usize::from(line) < FB_HEIGHT, "line {line} outside the frame");
        if usize::from(line) >= FB_HEIGHT {
            return Status::empty();
        }

        let mut raised = Status::empty();
        let width = usize::from(timing.viewport.width).min(FB_WIDTH);

        // The list already moved on to the next line after the first pass.
        if self.last_line == Some(line) {
            self.sprites.clone_from(&self.drawn);
        } else {
            self.drawn.clone_from(&self.sprites);
            self.last_line = Some(line);
        }

        if regs.display_enabled() {
            self.cache.update(self.table.cache_updater, mem);
            let scene = Scene {
                mem,
                regs,
                timing,
            };
            match self.table.background {
                BackgroundRenderer::Mode4 => self.background_m4(line, &scene),
                BackgroundRenderer::Mode5 => self.background_m5(line, &scene, false, false),
                BackgroundRenderer::Mode5Column => self.background_m5(line, &scene, true, false),
                BackgroundRenderer::Mode5Double => self.background_m5(line, &scene, false, true),
                BackgroundRenderer::Mode5DoubleColumn => {
                    self.background_m5(line, &scene, true, true);
                }
            }
            raised |= match self.table.sprites {
                SpriteRenderer::Mode4 => self.sprites_m4(line, &scene),
                SpriteRenderer::Mode5 => self.sprites_m5(line, &scene, false, false),
                SpriteRenderer::Mode5ShadowHighlight => self.sprites_m5(line, &scene, true, false),
                SpriteRenderer::Mode5Double => self.sprites_m5(line, &scene, false, true),
                SpriteRenderer::Mode5DoubleShadowHighlight => {
                    self.sprites_m5(line, &scene, true, true)
                }
            };
            if raised.contains(Status::SPRITE_COLLISION) {
                self.collision_line = Some(line);
            }
            if line + 1 < timing.viewport.height {
                raised |= self.parse_sprites(i32::from(line), &scene);
            }
        } else {
            self.fill_backdrop(0, width, regs.is_mode5());
        }

        self.remap_line(line, width);
        raised
    }

    /// Select sprites for the line after `line`. `-1` prepares line 0.
    pub(crate) fn parse_sprites(&mut self, line: i32, scene: &Scene<'_>) -> Status {
        match self.table.sat_parser {
            SatParser::Mode4 => self.parse_sprites_m4(line, scene),
            SatParser::Mode5 => self.parse_sprites_m5(line, scene, false),
            SatParser::Mode5Double => self.parse_sprites_m5(line, scene, true),
        }
    }

    /// Parse sprites for line 0 at frame start.
    pub(crate) fn prepare_first_line(
        &mut self,
        mem: &VideoMemory,
        regs: &RegisterFile,
        timing: &Timing,
    ) -> Status {
        let scene = Scene {
            mem,
            regs,
            timing,
        };
        self.last_line = None;
        self.parse_sprites(-1, &scene)
    }

    #[must_use]
    pub fn collision_line(&self) -> Option<u16> {
        self.collision_line
    }

    /// State of the line being drawn, for save states.
    pub(crate) fn line_state(&self) -> LineState {
        LineState {
            indices: self.indices.to_vec(),
            drawn: self.drawn.visible().to_vec(),
            last_line: self.last_line,
            collision_line: self.collision_line,
        }
    }

    /// Put back a saved line state and picture. Lengths are checked by the
    /// caller.
    pub(crate) fn restore_line_state(&mut self, state: &LineState, framebuffer: &[u32]) {
        self.indices.copy_from_slice(&state.indices);
        self.drawn.clear();
        for &entry in state.drawn.iter().take(self.drawn.entries.len()) {
            self.drawn.push(entry);
        }
        self.last_line = state.last_line;
        self.collision_line = state.collision_line;
        self.framebuffer.copy_from_slice(framebuffer);
    }

    /// Replace the sprite list, as parsed for the next line.
    pub(crate) fn load_sprites(&mut self, entries: &[SpriteEntry]) {
        self.sprites.clear();
        for &entry in entries.iter().take(self.sprites.entries.len()) {
            self.sprites.push(entry);
        }
        self.last_line = None;
    }

    /// Cap the sprites drawn on `line`, whether or not it was rendered yet.
    pub(crate) fn limit_sprites(&mut self, line: u16, max: usize) {
        if self.last_line == Some(line) {
            self.drawn.limit(max);
        } else {
            self.sprites.limit(max);
        }
    }

    /// Paint `count` pixels from `offset` with the backdrop.
    pub(crate) fn blank_line(&mut self, line: u16, offset: usize, count: usize, mode5: bool) {
        if usize::from(line) >= FB_HEIGHT {
            return;
        }
        let end = (offset + count).min(FB_WIDTH);
        let offset = offset.min(end);
        self.fill_backdrop(offset, end - offset, mode5);
        self.remap_line_span(line, offset, end);
    }

    /// Recolor the last rendered line through the current palette.
    pub(crate) fn remap_line(&mut self, line: u16, width: usize) {
        if usize::from(line) < FB_HEIGHT {
            self.remap_line_span(line, 0, width.min(FB_WIDTH));
        }
    }

    fn remap_line_span(&mut self, line: u16, start: usize, end: usize) {
        let row = usize::from(line) * FB_WIDTH;
        for x in start..end {
            self.framebuffer[row + x] = self.palette.color(self.indices[x]);
        }
    }

    fn fill_backdrop(&mut self, offset: usize, count: usize, mode5: bool) {
        let backdrop = if mode5 { 0 } else { palette::MODE4_BACKDROP };
        let end = (offset + count).min(FB_WIDTH);
        self.indices[offset..end].fill(backdrop);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch one pixel of a name table tile as a layer pixel.
#[inline]
fn tile_pixel(cache: &PatternCache, entry: u16, row: u16, x: u16, double: bool) -> u8 {
    let priority = if entry & 0x8000 != 0 { PRIORITY } else { 0 };
    let palette = ((entry >> 13) & 3) as u8;
    let color = if double {
        let vflip = entry & 0x1000 != 0;
        let row = if vflip { 15 - (row & 15) } else { row & 15 };
        let name = ((entry & 0x3FF) << 1) | (row >> 3);
        cache.pixel((entry >> 11) & 1, name, row, x)
    } else {
        cache.pixel((entry >> 11) & 3, entry & 0x7FF, row, x)
    };
    if color == 0 {
        priority
    } else {
        priority | (palette << 4) | color
    }
}

#[inline]
fn opaque(pixel: u8) -> bool {
    pixel & 0x0F != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Region;

    #[test]
    fn table_follows_mode_interlace_and_shadow_bits() {
        let mut regs = RegisterFile::new(Region::Ntsc);
        assert_eq!(RenderTable::select(&regs, Interlace::Off), RenderTable::MODE4);

        regs.write(1, 0x04);
        regs.write(11, 0x04);
        regs.write(12, 0x08);
        let table = RenderTable::select(&regs, Interlace::Off);
        assert_eq!(table.background, BackgroundRenderer::Mode5Column);
        assert_eq!(table.sprites, SpriteRenderer::Mode5ShadowHighlight);
        assert_eq!(table.cache_updater, CacheUpdater::Mode5);

        let table = RenderTable::select(&regs, Interlace::Double);
        assert_eq!(table.background, BackgroundRenderer::Mode5DoubleColumn);
        assert_eq!(table.sat_parser, SatParser::Mode5Double);
    }

    #[test]
    fn blank_line_paints_backdrop_from_offset() {
        let mut renderer = Renderer::new();
        renderer.palette.update_m5(0, 0x007, true);
        renderer.indices = [5; FB_WIDTH];
        renderer.remap_line(3, 256);
        renderer.blank_line(3, 100, 156, true);

        let row = &renderer.framebuffer()[3 * FB_WIDTH..4 * FB_WIDTH];
        assert_eq!(row[99], renderer.palette.color(5));
        assert_eq!(row[100], 0xFFFC_0000);
        assert_eq!(row[255], 0xFFFC_0000);
    }
}
