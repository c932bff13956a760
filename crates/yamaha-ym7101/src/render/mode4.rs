//! Mode 4 renderer: the Master System compatible tile mode.
//!
//! VRAM is addressed linearly here. Name table entries are little-endian
//! words: bits 8-0 pattern, 9 hflip, 10 vflip, 11 sprite palette, 12
//! priority over sprites.

use super::palette::MODE4_BACKDROP;
use super::{PRIORITY, Renderer, Scene, SpriteEntry};
use crate::status::Status;

const SPRITES_PER_LINE: usize = 8;

/// Rows of the scrolling background before it wraps.
const BG_ROWS: u16 = 224;

fn sat_base(scene: &Scene<'_>) -> usize {
    usize::from((u16::from(scene.regs.get(5)) << 7) & 0x3F00)
}

fn sprite_height(scene: &Scene<'_>) -> i32 {
    if scene.regs.get(1) & 0x02 != 0 { 16 } else { 8 }
}

impl Renderer {
    pub(super) fn background_m4(&mut self, line: u16, scene: &Scene<'_>) {
        let (regs, vram) = (scene.regs, &scene.mem.vram);
        let reg0 = regs.get(0);
        let name_table = (u16::from(regs.get(2)) << 10) & 0x3800;
        let hscroll = if reg0 & 0x40 != 0 && line < 16 {
            0
        } else {
            u16::from(regs.get(8))
        };
        let scrolled_line = (line + u16::from(regs.get(9))) % BG_ROWS;

        for x in 0..scene.width() {
            // Reg 0 bit 7 locks the rightmost eight columns vertically.
            let py = if reg0 & 0x80 != 0 && x >= 192 {
                line
            } else {
                scrolled_line
            };
            let px = (x as u16).wrapping_sub(hscroll) & 0xFF;
            let addr = usize::from(name_table + ((py >> 3) << 6) + ((px >> 3) << 1));
            let entry = u16::from_le_bytes([vram[addr], vram[addr + 1]]);

            let color = self.cache.pixel((entry >> 9) & 3, entry & 0x1FF, py, px);
            let palette = if entry & 0x0800 != 0 { 0x10 } else { 0 };
            let priority = if entry & 0x1000 != 0 && color != 0 {
                PRIORITY
            } else {
                0
            };
            self.plane_a[x] = priority | palette | color;
        }
    }

    pub(super) fn sprites_m4(&mut self, line: u16, scene: &Scene<'_>) -> Status {
        let (regs, vram) = (scene.regs, &scene.mem.vram);
        let width = scene.width();
        let base = sat_base(scene);
        let height = sprite_height(scene);
        let shift = if regs.get(0) & 0x08 != 0 { 8 } else { 0 };
        let name_high = u16::from(regs.get(6) & 0x04) << 6;

        let mut raised = Status::empty();
        self.sprite_layer[..width].fill(0);

        for entry in self.sprites.visible() {
            let row = i32::from(line) - i32::from(entry.top);
            if !(0..height).contains(&row) {
                continue;
            }
            let row = row as u16;
            let i = usize::from(entry.index);
            let left = i32::from(vram[base + 0x80 + i * 2]) - shift;
            let mut name = u16::from(vram[base + 0x81 + i * 2]) | name_high;
            if height == 16 {
                name &= !1;
            }
            name += row >> 3;

            for px in 0..8u16 {
                let sx = left + i32::from(px);
                if sx < 0 || sx >= width as i32 {
                    continue;
                }
                let color = self.cache.pixel(0, name & 0x1FF, row, px);
                if color == 0 {
                    continue;
                }
                let slot = &mut self.sprite_layer[sx as usize];
                if *slot != 0 {
                    raised |= Status::SPRITE_COLLISION;
                } else {
                    *slot = 0x10 | color;
                }
            }
        }

        let blank_left = regs.get(0) & 0x20 != 0;
        for x in 0..width {
            let (bg, sprite) = (self.plane_a[x], self.sprite_layer[x]);
            self.indices[x] = if blank_left && x < 8 {
                MODE4_BACKDROP
            } else if sprite != 0 && bg & PRIORITY == 0 {
                sprite
            } else {
                bg & 0x1F
            };
        }
        raised
    }

    pub(super) fn parse_sprites_m4(&mut self, line: i32, scene: &Scene<'_>) -> Status {
        let vram = &scene.mem.vram;
        let base = sat_base(scene);
        let height = sprite_height(scene);
        let target = line + 1;

        self.sprites.clear();
        for index in 0..64u8 {
            let y = vram[base + usize::from(index)];
            if y == 0xD0 {
                break;
            }
            let mut top = i32::from(y) + 1;
            if top > 0xF0 {
                top -= 0x100;
            }
            if (top..top + height).contains(&target) {
                if self.sprites.count == SPRITES_PER_LINE {
                    return Status::SPRITE_OVERFLOW;
                }
                self.sprites.push(SpriteEntry {
                    index,
                    top: top as i16,
                    size: 0,
                });
            }
        }
        Status::empty()
    }
}
