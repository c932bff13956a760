//! HV counter.
//!
//! The H counter is not linear in master cycles: it counts up through the
//! active area, then jumps back during horizontal sync. H32 runs
//! `0x00..=0x93` then `0xE9..=0xFF`; H40 runs `0x00..=0xB6` then
//! `0xE4..=0xFF`. Line boundaries fall at H counter `0x85` (H32) and
//! `0xA5` (H40), which is where the line interrupt fires.
//!
//! The tables below spread each sequence evenly over the 3420 master
//! cycles of a line.

use crate::MCYCLES_PER_LINE;
use crate::timing::Interlace;

const LINE: usize = MCYCLES_PER_LINE as usize;

const fn build_hc_table(first_end: u8, second_start: u8, line_start: u8) -> [u8; LINE] {
    let first_len = first_end as usize + 1;
    let len = first_len + (0x100 - second_start as usize);
    let mut table = [0u8; LINE];
    let mut cycle = 0;
    while cycle < LINE {
        let pos = (line_start as usize + cycle * len / LINE) % len;
        table[cycle] = if pos < first_len {
            pos as u8
        } else {
            (second_start as usize + pos - first_len) as u8
        };
        cycle += 1;
    }
    table
}

/// H counter by cycle within the line, H32.
pub static HC_TABLE_H32: [u8; LINE] = build_hc_table(0x93, 0xE9, 0x85);

/// H counter by cycle within the line, H40.
pub static HC_TABLE_H40: [u8; LINE] = build_hc_table(0xB6, 0xE4, 0xA5);

/// H counter at `now`.
#[must_use]
pub fn h_counter(now: u32, h40: bool) -> u8 {
    let table = if h40 { &HC_TABLE_H40 } else { &HC_TABLE_H32 };
    table[(now % MCYCLES_PER_LINE) as usize]
}

/// V counter at `now`, as returned in the high byte of an HV read.
///
/// `now` is frame-relative; the first line of the frame is the previous
/// frame's last line, hence the `- 1`.
#[must_use]
pub fn v_counter(now: u32, vc_max: u16, lines_per_frame: u16, interlace: Interlace) -> u8 {
    let mut vc = (now / MCYCLES_PER_LINE) as i32 - 1;
    if vc > i32::from(vc_max) {
        vc -= i32::from(lines_per_frame);
    }
    if interlace.enabled() {
        if interlace == Interlace::Double {
            vc <<= 1;
        }
        vc = (vc & !1) | ((vc >> 8) & 1);
    }
    vc as u8
}
