//! Sega Mega Drive / Genesis line scheduler.
//!
//! Drives the 68000, the Z80 and the VDP through one frame at a time, one
//! scanline at a time. The CPUs are supplied by the caller: anything that
//! implements [`emu_core::Processor`] over the [`Vdp`] bus. The 68000 must
//! also be a [`DmaSource`] so the VDP can pull words from its bus during DMA.
//!
//! One frame = 3420 master cycles x 262 lines (NTSC) or 313 lines (PAL).

mod config;
mod megadrive;

pub use config::MegaDriveConfig;
pub use megadrive::MegaDrive;
pub use yamaha_ym7101::{self, DmaSource, Region, Vdp};
