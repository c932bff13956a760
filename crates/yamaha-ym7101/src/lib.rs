//! Sega Mega Drive / Genesis VDP (315-5313, integrated as YM7101).
//!
//! Time is counted in master clock cycles (crystal, ~53.7 MHz NTSC). A line
//! is 3420 master cycles whatever the width: 262 lines per NTSC frame, 313
//! per PAL frame. All cycle arguments are frame-relative, with line 0 of the
//! frame starting at cycle 3420 (the first line is the previous frame's
//! last, used to prepare sprites).
//!
//! The VDP does not run on its own. A scheduler (the machine crate) calls
//! the frame hooks on [`Vdp`] between CPU slices, and the CPUs reach the
//! VDP through its port methods, passing the cycle of each access.

mod config;
pub mod dma;
mod fifo;
pub mod hvc;
mod irq;
pub mod memory;
mod port;
pub mod registers;
pub mod render;
mod snapshot;
mod status;
pub mod timing;
mod vdp;

pub use config::{IrqTarget, Region, VdpConfig};
pub use dma::{DmaKind, DmaSource};
pub use irq::{InterruptController, IrqLine, LEVEL_HINT, LEVEL_VINT};
pub use port::Phase;
pub use snapshot::{SNAPSHOT_VERSION, SnapshotError, VdpSnapshot};
pub use status::Status;
pub use timing::{Interlace, Viewport};
pub use vdp::Vdp;

/// Master cycles per scanline.
pub const MCYCLES_PER_LINE: u32 = 3420;

/// Offset into a line after which register changes no longer re-render it.
pub const RENDER_BOUNDARY_CYCLES: u32 = 860;

/// Offset into a line where horizontal blanking ends.
pub const HBLANK_END_CYCLES: u32 = 588;

/// Offset into the first blanking line where the frame interrupt flag sets.
pub const VINT_FLAG_CYCLES: u32 = 588;

/// Offset into the first blanking line where the frame interrupt fires.
pub const VINT_CYCLES: u32 = 788;
