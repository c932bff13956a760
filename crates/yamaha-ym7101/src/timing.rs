//! Beam position and per-frame display geometry.

use crate::MCYCLES_PER_LINE;
use crate::config::Region;

/// Interlace mode latched at frame start from reg 12 bits 2-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interlace {
    #[default]
    Off,
    /// Normal interlace: same picture on both fields.
    Normal,
    /// Double resolution: 8x16 tiles, alternate lines per field.
    Double,
}

impl Interlace {
    #[must_use]
    pub fn from_reg12(value: u8) -> Self {
        match value & 0x06 {
            0x02 => Self::Normal,
            0x06 => Self::Double,
            _ => Self::Off,
        }
    }

    #[must_use]
    pub fn enabled(self) -> bool {
        self != Self::Off
    }
}

/// Active display area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
    /// Width, height or interlace changed outside active display; applied at
    /// the next frame start.
    pub pending_change: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 256,
            height: 192,
            pending_change: false,
        }
    }
}

/// Scanline timeline shared by the VDP and the frame scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    /// Master cycle at which the current line started.
    pub line_start: u32,
    /// Line being displayed. Equals `lines_per_frame - 1` during the
    /// pre-line that opens each frame.
    pub v_counter: u16,
    pub lines_per_frame: u16,
    pub odd_frame: bool,
    pub interlace: Interlace,
    pub viewport: Viewport,
}

impl Timing {
    #[must_use]
    pub fn new(region: Region) -> Self {
        let lines_per_frame = region.lines_per_frame();
        Self {
            line_start: 0,
            v_counter: lines_per_frame - 1,
            lines_per_frame,
            odd_frame: false,
            interlace: Interlace::Off,
            viewport: Viewport::default(),
        }
    }

    /// Total master cycles in one frame.
    #[must_use]
    pub fn frame_cycles(&self) -> u32 {
        u32::from(self.lines_per_frame) * MCYCLES_PER_LINE
    }

    /// The current line is inside the active display.
    #[must_use]
    pub fn in_active_display(&self) -> bool {
        self.v_counter < self.viewport.height
    }

    /// `now` is still early enough in the current line for a full re-render.
    #[must_use]
    pub fn before_render_boundary(&self, now: u32) -> bool {
        now <= self.line_start + crate::RENDER_BOUNDARY_CYCLES
    }

    /// Signed distance from the re-render boundary.
    #[must_use]
    pub fn boundary_offset(&self, now: u32) -> i64 {
        i64::from(now) - i64::from(self.line_start) - i64::from(crate::RENDER_BOUNDARY_CYCLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interlace_decoding() {
        assert_eq!(Interlace::from_reg12(0x00), Interlace::Off);
        assert_eq!(Interlace::from_reg12(0x02), Interlace::Normal);
        assert_eq!(Interlace::from_reg12(0x04), Interlace::Off);
        assert_eq!(Interlace::from_reg12(0x06), Interlace::Double);
    }

    #[test]
    fn frame_cycles_by_region() {
        assert_eq!(Timing::new(Region::Ntsc).frame_cycles(), 262 * 3420);
        assert_eq!(Timing::new(Region::Pal).frame_cycles(), 313 * 3420);
    }

    #[test]
    fn boundary_is_inclusive() {
        let mut timing = Timing::new(Region::Ntsc);
        timing.line_start = 3420;
        assert!(timing.before_render_boundary(3420 + 860));
        assert!(!timing.before_render_boundary(3420 + 861));
        assert_eq!(timing.boundary_offset(3420), -860);
    }
}
