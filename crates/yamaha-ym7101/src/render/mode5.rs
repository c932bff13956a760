//! Mode 5 renderers: two scrolling planes, the window plane and 80 sprites.

use super::palette::{HIGHLIGHT, SHADOW};
use super::{PRIORITY, PatternCache, Renderer, Scene, SpriteEntry, opaque, tile_pixel};
use crate::memory::VideoMemory;
use crate::registers::RegisterFile;
use crate::status::Status;

/// Columns of the current line covered by the window plane.
struct WindowSpan {
    start: usize,
    end: usize,
}

impl WindowSpan {
    fn new(line: u16, regs: &RegisterFile, width: usize) -> Self {
        let reg18 = regs.get(18);
        let split = u16::from(reg18 & 0x1F) << 3;
        let full = if reg18 & 0x80 != 0 {
            line >= split
        } else {
            line < split
        };
        if full {
            return Self { start: 0, end: width };
        }

        let column = (usize::from(regs.window_clip.column) * 8).min(width);
        if regs.window_clip.right {
            Self {
                start: column,
                end: width,
            }
        } else {
            Self {
                start: 0,
                end: column,
            }
        }
    }

    fn contains(&self, x: usize) -> bool {
        (self.start..self.end).contains(&x)
    }
}

fn plane_pixel(
    cache: &PatternCache,
    mem: &VideoMemory,
    base: u16,
    shift: u8,
    px: u16,
    py: u16,
    double: bool,
) -> u8 {
    let cell_y = if double { py >> 4 } else { py >> 3 };
    let addr = base.wrapping_add((cell_y << shift).wrapping_add((px >> 3) << 1));
    tile_pixel(cache, mem.read_vram_word(addr), py, px & 7, double)
}

/// Highest priority pixel of the three layers. The flag is set when the
/// sprite layer won.
fn resolve(a: u8, b: u8, s: u8) -> (u8, bool) {
    let high = |p: u8| opaque(p) && p & PRIORITY != 0;
    if high(s) {
        (s, true)
    } else if high(a) {
        (a, false)
    } else if high(b) {
        (b, false)
    } else if opaque(s) {
        (s, true)
    } else if opaque(a) {
        (a, false)
    } else if opaque(b) {
        (b, false)
    } else {
        (0, false)
    }
}

fn shadow_highlight(a: u8, b: u8, s: u8) -> u8 {
    let shadowed = (a | b) & PRIORITY == 0;

    // Palette 3 colors 14 and 15 are operators on whatever lies beneath.
    let operator = s & 0x3F;
    if opaque(s) && (operator == 0x3E || operator == 0x3F) {
        let under = resolve(a, b, 0).0 & 0x3F;
        return match (operator, shadowed) {
            (0x3F, _) => under | SHADOW,
            (_, true) => under,
            _ => under | HIGHLIGHT,
        };
    }

    let (pixel, sprite) = resolve(a, b, s);
    let index = pixel & 0x3F;
    if shadowed && !(sprite && pixel & PRIORITY != 0) {
        index | SHADOW
    } else {
        index
    }
}

impl Renderer {
    pub(super) fn background_m5(
        &mut self,
        line: u16,
        scene: &Scene<'_>,
        column_vscroll: bool,
        double: bool,
    ) {
        let (mem, regs) = (scene.mem, scene.regs);
        let width = scene.width();

        let (line_pos, vscroll_mask, row_mask) = if double {
            (
                scene.double_line(i32::from(line)) as u16,
                0x7FF,
                (regs.playfield_row_mask << 1) | 1,
            )
        } else {
            (line, 0x3FF, regs.playfield_row_mask)
        };
        let plane_mask = ((regs.playfield_col_mask + 1) << 4) - 1;
        let shift = regs.playfield_shift;

        let hscroll = regs.hscroll_base.wrapping_add((line & regs.hscroll_mask) << 2);
        let hscroll_a = mem.read_vram_word(hscroll) & 0x3FF;
        let hscroll_b = mem.read_vram_word(hscroll.wrapping_add(2)) & 0x3FF;

        let window = WindowSpan::new(line, regs, width);
        let window_shift: u8 = if regs.h40() { 7 } else { 6 };
        let window_cell_y = if double { line_pos >> 4 } else { line_pos >> 3 };
        let window_row = regs.window_base.wrapping_add(window_cell_y << window_shift);

        for x in 0..width {
            let xx = x as u16;
            let (vscroll_a, vscroll_b) = if column_vscroll {
                let column = (x >> 4) << 1;
                (mem.vsram[column], mem.vsram[column + 1])
            } else {
                (mem.vsram[0], mem.vsram[1])
            };

            let b = plane_pixel(
                &self.cache,
                mem,
                regs.plane_b_base,
                shift,
                xx.wrapping_sub(hscroll_b) & plane_mask,
                line_pos.wrapping_add(vscroll_b & vscroll_mask) & row_mask,
                double,
            );
            let a = if window.contains(x) {
                let entry = mem.read_vram_word(window_row.wrapping_add((xx >> 3) << 1));
                tile_pixel(&self.cache, entry, line_pos, xx & 7, double)
            } else {
                plane_pixel(
                    &self.cache,
                    mem,
                    regs.plane_a_base,
                    shift,
                    xx.wrapping_sub(hscroll_a) & plane_mask,
                    line_pos.wrapping_add(vscroll_a & vscroll_mask) & row_mask,
                    double,
                )
            };
            self.plane_a[x] = a;
            self.plane_b[x] = b;
        }
    }

    /// Draw the parsed sprites, then compose all layers into the index line.
    pub(super) fn sprites_m5(
        &mut self,
        line: u16,
        scene: &Scene<'_>,
        shadow_highlight: bool,
        double: bool,
    ) -> Status {
        let mem = scene.mem;
        let width = scene.width();
        let (line_pos, cell_rows) = if double {
            (scene.double_line(i32::from(line)), 16)
        } else {
            (i32::from(line), 8)
        };

        let mut raised = Status::empty();
        self.sprite_layer[..width].fill(0);
        let mut seen_visible = false;

        for i in 0..self.sprites.count {
            let SpriteEntry { index, top, size } = self.sprites.entries[i];
            let entry = scene.regs.sat_window.base.wrapping_add(u16::from(index) << 3);
            let attr = mem.read_vram_word(entry.wrapping_add(4));
            let xpos = mem.read_vram_word(entry.wrapping_add(6)) & 0x1FF;

            // X = 0 hides every lower priority sprite on the line once a
            // sprite elsewhere on it has been seen.
            if xpos == 0 {
                if seen_visible {
                    break;
                }
                continue;
            }
            seen_visible = true;

            let hcells = u16::from((size >> 2) & 3) + 1;
            let vcells = u16::from(size & 3) + 1;
            let mut row = (line_pos - i32::from(top)) as u16;
            if row >= vcells * cell_rows {
                continue;
            }
            if attr & 0x1000 != 0 {
                row = vcells * cell_rows - 1 - row;
            }
            let hflip = attr & 0x0800 != 0;
            let priority = if attr & 0x8000 != 0 { PRIORITY } else { 0 };
            let pixel_bits = priority | ((((attr >> 13) & 3) as u8) << 4);
            let left = i32::from(xpos) - 128;

            for c in 0..hcells {
                let cell = if hflip { hcells - 1 - c } else { c };
                let name = if double {
                    ((attr & 0x3FF) << 1) + cell * vcells * 2 + (row >> 3)
                } else {
                    (attr & 0x7FF) + cell * vcells + (row >> 3)
                } & 0x7FF;

                for px in 0..8u16 {
                    let sx = left + i32::from(c * 8 + px);
                    if sx < 0 || sx >= width as i32 {
                        continue;
                    }
                    let color = self.cache.pixel(u16::from(hflip), name, row & 7, px);
                    if color == 0 {
                        continue;
                    }
                    let slot = &mut self.sprite_layer[sx as usize];
                    if opaque(*slot) {
                        raised |= Status::SPRITE_COLLISION;
                    } else {
                        *slot = pixel_bits | color;
                    }
                }
            }
        }

        self.compose_m5(width, shadow_highlight);
        raised
    }

    fn compose_m5(&mut self, width: usize, shadow_highlight_enabled: bool) {
        for x in 0..width {
            let (a, b, s) = (self.plane_a[x], self.plane_b[x], self.sprite_layer[x]);
            self.indices[x] = if shadow_highlight_enabled {
                shadow_highlight(a, b, s)
            } else {
                resolve(a, b, s).0 & 0x3F
            };
        }
    }

    /// Select the sprites covering the line after `line` from the
    /// attribute shadow.
    pub(super) fn parse_sprites_m5(&mut self, line: i32, scene: &Scene<'_>, double: bool) -> Status {
        let h40 = scene.regs.h40();
        let per_line = if h40 { 20 } else { 16 };
        let total = if h40 { 80 } else { 64 };
        let (target, cell_rows) = if double {
            (scene.double_line(line + 1), 16)
        } else {
            (line + 1, 8)
        };

        self.sprites.clear();
        let sat = &scene.mem.sat;
        let mut index = 0usize;
        for _ in 0..total {
            let offset = index * 8;
            let ypos = u16::from_be_bytes([sat[offset], sat[offset + 1]]);
            let size = sat[offset + 2];
            let top = if double {
                i32::from(ypos & 0x3FF) - 256
            } else {
                i32::from(ypos & 0x1FF) - 128
            };
            let height = (i32::from(size & 3) + 1) * cell_rows;

            if (top..top + height).contains(&target) {
                if self.sprites.count == per_line {
                    return Status::SPRITE_OVERFLOW;
                }
                self.sprites.push(SpriteEntry {
                    index: index as u8,
                    top: top as i16,
                    size,
                });
            }

            let link = usize::from(sat[offset + 3] & 0x7F);
            if link == 0 || link >= total {
                break;
            }
            index = link;
        }
        Status::empty()
    }
}
