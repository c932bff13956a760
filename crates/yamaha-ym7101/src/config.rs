//! VDP configuration.

/// Video region. Determines frame length and the PAL status bit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Region {
    /// NTSC: 60 Hz, 262 lines.
    #[default]
    Ntsc,
    /// PAL: 50 Hz, 313 lines.
    Pal,
}

impl Region {
    /// Total lines per frame, including blanking.
    #[must_use]
    pub const fn lines_per_frame(self) -> u16 {
        match self {
            Self::Ntsc => 262,
            Self::Pal => 313,
        }
    }

    /// Master crystal frequency in Hz.
    #[must_use]
    pub const fn master_clock_hz(self) -> u32 {
        match self {
            Self::Ntsc => 53_693_175,
            Self::Pal => 53_203_424,
        }
    }

    #[must_use]
    pub const fn is_pal(self) -> bool {
        matches!(self, Self::Pal)
    }
}

/// Which processor receives the VDP interrupt output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IrqTarget {
    /// Mega Drive: levels 4 and 6 on the 68000, plus a one-line Z80 INT
    /// pulse at frame start.
    #[default]
    M68k,
    /// Master System compatibility: every interrupt drives the Z80 INT line.
    Z80,
}

/// VDP configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VdpConfig {
    /// Video region. Defaults to NTSC.
    pub region: Region,
    /// Load the register values the boot ROM leaves behind on reset.
    pub boot_registers: bool,
    /// Interrupt output routing.
    pub irq_target: IrqTarget,
}

impl Default for VdpConfig {
    fn default() -> Self {
        Self {
            region: Region::Ntsc,
            boot_registers: false,
            irq_target: IrqTarget::M68k,
        }
    }
}

/// Register values written by the boot ROM before handing over to software.
pub(crate) const BOOT_REGISTERS: [(u8, u8); 5] =
    [(0, 0x04), (1, 0x04), (10, 0xFF), (12, 0x81), (15, 0x02)];
