//! Status register bits.

use bitflags::bitflags;

bitflags! {
    /// Control port status word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u16 {
        const PAL              = 0x0001;
        const DMA_BUSY         = 0x0002;
        const HBLANK           = 0x0004;
        const VBLANK           = 0x0008;
        const ODD_FIELD        = 0x0010;
        const SPRITE_COLLISION = 0x0020;
        const SPRITE_OVERFLOW  = 0x0040;
        const VINT_OCCURRED    = 0x0080;
        const FIFO_FULL        = 0x0100;
        const FIFO_EMPTY       = 0x0200;
    }
}

impl Status {
    /// Bits cleared by every status port read.
    pub const READ_ONCE: Self = Self::SPRITE_COLLISION.union(Self::SPRITE_OVERFLOW);

    /// Bits cleared at the start of every frame.
    pub const FRAME_START_CLEAR: Self = Self::DMA_BUSY
        .union(Self::VBLANK)
        .union(Self::ODD_FIELD)
        .union(Self::FIFO_FULL);

    /// Status after power-on.
    #[must_use]
    pub fn power_on(pal: bool) -> Self {
        let mut status = Self::FIFO_EMPTY;
        status.set(Self::PAL, pal);
        status
    }
}
