//! Mega Drive configuration.

use yamaha_ym7101::{IrqTarget, Region, VdpConfig};

/// Mega Drive configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MegaDriveConfig {
    /// Video region (NTSC or PAL). Defaults to NTSC.
    pub region: Region,
    /// Start with the VDP registers the TMSS boot code leaves behind, as if
    /// the boot ROM had already run.
    pub boot_registers: bool,
}

impl MegaDriveConfig {
    /// VDP configuration for this machine. Interrupts always go to the 68000.
    #[must_use]
    pub fn vdp_config(&self) -> VdpConfig {
        VdpConfig {
            region: self.region,
            boot_registers: self.boot_registers,
            irq_target: IrqTarget::M68k,
        }
    }

    /// Frames per second for the region.
    #[must_use]
    pub fn frame_rate(&self) -> f64 {
        let cycles = u32::from(self.region.lines_per_frame()) * yamaha_ym7101::MCYCLES_PER_LINE;
        f64::from(self.region.master_clock_hz()) / f64::from(cycles)
    }
}
