//! Control port address/code latch.
//!
//! A command is two 16-bit words. The first carries CD1-CD0 and A13-A0, the
//! second CD5-CD2 and A15-A14:
//!
//! ```text
//! first:  CD1 CD0 A13 A12 A11 A10 A9 A8 A7 A6 A5 A4 A3 A2 A1 A0
//! second:  0   0   0   0   0   0   0  0 CD5 CD4 CD3 CD2 0 0 A15 A14
//! ```
//!
//! A first word of the form `10xR RRRR VVVV VVVV` is a register write and
//! completes immediately. In Mode 4 every command is a single word.
//!
//! The Z80 sees the same port one byte at a time, so it walks four phases
//! instead of two.

/// Where the latch is within a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for the first word (or its low byte on the Z80).
    #[default]
    Idle,
    /// Z80: low byte of the first word latched.
    FirstHighByte,
    /// Z80: waiting for the low byte of the second word.
    SecondLowByte,
    /// Z80: low byte of the second word latched.
    SecondHighByte,
    /// 68000: first word seen, waiting for the second.
    SecondWord,
}

impl Phase {
    /// Snapshot encoding.
    #[must_use]
    pub fn to_bits(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::FirstHighByte => 1,
            Self::SecondLowByte => 2,
            Self::SecondHighByte => 3,
            Self::SecondWord => 4,
        }
    }

    #[must_use]
    pub fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits {
            0 => Self::Idle,
            1 => Self::FirstHighByte,
            2 => Self::SecondLowByte,
            3 => Self::SecondHighByte,
            4 => Self::SecondWord,
            _ => return None,
        })
    }
}

/// What a control port write asks the VDP to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Address/code updated, nothing else.
    None,
    /// Register write.
    Register { index: u8, value: u8 },
    /// Second word completed with CD5 set.
    Dma,
    /// Z80 Mode 4 read command: fetch the read-ahead byte.
    ReadAhead,
}

/// Destination selected by the low four bits of the access code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    VramRead,
    VramWrite,
    CramWrite,
    VsramRead,
    VsramWrite,
    CramRead,
    Invalid,
}

impl Target {
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code & 0x0F {
            0x00 => Self::VramRead,
            0x01 => Self::VramWrite,
            0x03 => Self::CramWrite,
            0x04 => Self::VsramRead,
            0x05 => Self::VsramWrite,
            0x08 => Self::CramRead,
            _ => Self::Invalid,
        }
    }
}

/// Address register, access code and pending phase.
#[derive(Debug, Clone, Default)]
pub struct AddressPort {
    pub addr: u16,
    /// A15-A14 from the last second word.
    pub addr_latch: u16,
    pub code: u8,
    pub phase: Phase,
    /// Low byte held between Z80 writes.
    pub byte_latch: u8,
}

impl AddressPort {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> bool {
        self.phase != Phase::Idle
    }

    #[must_use]
    pub fn target(&self) -> Target {
        Target::from_code(self.code)
    }

    /// Data port accesses always finish any half-written command.
    pub fn clear_pending(&mut self) {
        self.phase = Phase::Idle;
    }

    /// 68000 control word.
    pub fn write_word(&mut self, data: u16, mode5: bool) -> ControlCommand {
        if self.phase == Phase::Idle {
            let command = if data & 0xC000 == 0x8000 {
                ControlCommand::Register {
                    index: ((data >> 8) & 0x1F) as u8,
                    value: data as u8,
                }
            } else {
                if mode5 {
                    self.phase = Phase::SecondWord;
                }
                ControlCommand::None
            };
            self.addr = self.addr_latch | (data & 0x3FFF);
            self.code = (self.code & 0x3C) | ((data >> 14) & 3) as u8;
            command
        } else {
            self.phase = Phase::Idle;
            self.addr_latch = (data & 3) << 14;
            self.addr = self.addr_latch | (self.addr & 0x3FFF);
            self.code = (self.code & 0x03) | ((data >> 2) & 0x3C) as u8;
            if self.code & 0x20 != 0 {
                ControlCommand::Dma
            } else {
                ControlCommand::None
            }
        }
    }

    /// Z80 control byte.
    pub fn write_byte(&mut self, data: u8, mode5: bool) -> ControlCommand {
        match self.phase {
            Phase::Idle | Phase::SecondWord => {
                self.byte_latch = data;
                self.phase = Phase::FirstHighByte;
                ControlCommand::None
            }
            Phase::FirstHighByte => {
                self.addr = (self.addr & 0xC000)
                    | (u16::from(data & 0x3F) << 8)
                    | u16::from(self.byte_latch);
                self.code = (self.code & 0x3C) | ((data >> 6) & 3);

                if self.code & 3 == 2 {
                    self.phase = Phase::Idle;
                    return ControlCommand::Register {
                        index: data & 0x1F,
                        value: self.byte_latch,
                    };
                }

                if mode5 {
                    self.phase = Phase::SecondLowByte;
                    ControlCommand::None
                } else {
                    self.phase = Phase::Idle;
                    if self.code & 3 == 0 {
                        ControlCommand::ReadAhead
                    } else {
                        ControlCommand::None
                    }
                }
            }
            Phase::SecondLowByte => {
                self.byte_latch = data;
                self.phase = Phase::SecondHighByte;
                ControlCommand::None
            }
            Phase::SecondHighByte => {
                self.phase = Phase::Idle;
                let latch = u16::from(self.byte_latch);
                self.addr = ((latch & 3) << 14) | (self.addr & 0x3FFF);
                self.code = (self.code & 0x03) | ((latch >> 2) & 0x3C) as u8;
                if self.code & 0x20 != 0 {
                    ControlCommand::Dma
                } else {
                    ControlCommand::None
                }
            }
        }
    }

    pub fn advance(&mut self, increment: u16) {
        self.addr = self.addr.wrapping_add(increment);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
