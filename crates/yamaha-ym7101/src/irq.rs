//! Line and frame interrupt latches.
//!
//! The VDP raises two interrupt classes on the 68000: the line interrupt
//! (level 4, every reg 10 + 1 lines) and the frame interrupt (level 6, start
//! of vertical blanking). Each has a pending latch that survives being
//! masked, so enabling the interrupt later fires it at once. The frame
//! interrupt always wins.

use crate::config::IrqTarget;

/// 68000 line level.
pub const LEVEL_HINT: u8 = 4;
pub const LEVEL_VINT: u8 = 6;

/// State of the interrupt output towards one CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IrqLine {
    pub level: u8,
    /// Taken one instruction late. Set when software enables an interrupt
    /// whose latch is already pending.
    pub delayed: bool,
}

impl IrqLine {
    #[must_use]
    pub fn asserted(&self) -> bool {
        self.level != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptController {
    pub hint_pending: bool,
    pub vint_pending: bool,
    /// Line interrupt countdown. Goes negative for one step before reload.
    pub h_counter: i32,
    pub m68k: IrqLine,
    pub z80_int: bool,
    target: IrqTarget,
}

impl InterruptController {
    #[must_use]
    pub fn new(target: IrqTarget) -> Self {
        Self {
            hint_pending: false,
            vint_pending: false,
            h_counter: 0,
            m68k: IrqLine::default(),
            z80_int: false,
            target,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.target);
    }

    fn set_line(&mut self, level: u8, delayed: bool) {
        match self.target {
            IrqTarget::M68k => self.m68k = IrqLine { level, delayed },
            IrqTarget::Z80 => self.z80_int = level != 0,
        }
    }

    /// Reload the countdown at frame start.
    pub fn reload(&mut self, reload: u8) {
        self.h_counter = i32::from(reload);
    }

    /// Count one line. Returns true when the line interrupt fires.
    pub fn tick_line(&mut self, reload: u8, enabled: bool) -> bool {
        self.h_counter -= 1;
        if self.h_counter >= 0 {
            return false;
        }
        self.h_counter = i32::from(reload);
        self.hint_pending = true;
        if enabled {
            // ORed in: a pending level 6 stays level 6.
            self.set_line(self.m68k.level | LEVEL_HINT, false);
        }
        true
    }

    /// Latch the frame interrupt.
    pub fn raise_vint(&mut self, enabled: bool) {
        self.vint_pending = true;
        if enabled {
            self.set_line(LEVEL_VINT, false);
        }
    }

    /// 68000 interrupt acknowledge cycle.
    ///
    /// Returns true when the frame interrupt was the one acknowledged.
    pub fn acknowledge(&mut self, vint_enabled: bool, hint_enabled: bool) -> bool {
        if self.vint_pending && vint_enabled {
            self.vint_pending = false;
            if self.hint_pending && hint_enabled {
                self.set_line(LEVEL_HINT, false);
            } else {
                self.set_line(0, false);
            }
            true
        } else {
            self.hint_pending = false;
            self.set_line(0, false);
            false
        }
    }

    /// Reg 0 bit 4 toggled.
    pub fn hint_enable_changed(&mut self, hint_enabled: bool, vint_enabled: bool) {
        if !self.hint_pending {
            return;
        }
        if self.vint_pending && vint_enabled {
            self.set_line(LEVEL_VINT, false);
        } else if hint_enabled {
            self.set_line(LEVEL_HINT, true);
        } else {
            self.set_line(0, false);
        }
    }

    /// Reg 1 bit 5 toggled.
    pub fn vint_enable_changed(&mut self, vint_enabled: bool, hint_enabled: bool) {
        if !self.vint_pending {
            return;
        }
        if vint_enabled {
            self.set_line(LEVEL_VINT, true);
        } else if self.hint_pending && hint_enabled {
            self.set_line(LEVEL_HINT, false);
        } else {
            self.set_line(0, false);
        }
    }

    /// Z80 status read: both latches and the Z80 line drop.
    pub fn clear_for_z80_read(&mut self) {
        self.hint_pending = false;
        self.vint_pending = false;
        self.z80_int = false;
    }

    /// Frame-start Z80 INT pulse on the Mega Drive.
    pub fn set_z80_int(&mut self, asserted: bool) {
        self.z80_int = asserted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> InterruptController {
        InterruptController::new(IrqTarget::M68k)
    }

    #[test]
    fn countdown_fires_every_reload_plus_one_lines() {
        let mut irq = controller();
        irq.reload(2);
        let fired: Vec<bool> = (0..6).map(|_| irq.tick_line(2, true)).collect();
        assert_eq!(fired, [false, false, true, false, false, true]);
        assert_eq!(irq.m68k.level, LEVEL_HINT);
    }

    #[test]
    fn masked_line_interrupt_stays_latched() {
        let mut irq = controller();
        irq.reload(0);
        assert!(irq.tick_line(0, false));
        assert!(irq.hint_pending);
        assert!(!irq.m68k.asserted());

        irq.hint_enable_changed(true, false);
        assert_eq!(irq.m68k, IrqLine { level: 4, delayed: true });
    }

    #[test]
    fn frame_interrupt_acknowledged_before_line_interrupt() {
        let mut irq = controller();
        irq.reload(0);
        irq.tick_line(0, true);
        irq.raise_vint(true);
        assert_eq!(irq.m68k.level, LEVEL_VINT);

        assert!(irq.acknowledge(true, true));
        assert!(irq.hint_pending, "line latch untouched");
        assert_eq!(irq.m68k.level, LEVEL_HINT);

        assert!(!irq.acknowledge(true, true));
        assert!(!irq.hint_pending);
        assert_eq!(irq.m68k.level, 0);
    }

    #[test]
    fn enabling_line_interrupt_under_pending_frame_keeps_level_six() {
        let mut irq = controller();
        irq.hint_pending = true;
        irq.vint_pending = true;
        irq.hint_enable_changed(true, true);
        assert_eq!(irq.m68k, IrqLine { level: 6, delayed: false });
    }

    #[test]
    fn disabling_frame_interrupt_falls_back_to_line_level() {
        let mut irq = controller();
        irq.hint_pending = true;
        irq.raise_vint(true);
        irq.vint_enable_changed(false, true);
        assert_eq!(irq.m68k.level, LEVEL_HINT);
        irq.vint_enable_changed(true, true);
        assert_eq!(irq.m68k, IrqLine { level: 6, delayed: true });
    }

    #[test]
    fn line_interrupt_does_not_lower_frame_level() {
        let mut irq = controller();
        irq.raise_vint(true);
        irq.reload(0);
        assert!(irq.tick_line(0, true));
        assert_eq!(irq.m68k.level, LEVEL_VINT);
    }

    #[test]
    fn z80_target_routes_levels_to_int_line() {
        let mut irq = InterruptController::new(IrqTarget::Z80);
        irq.raise_vint(true);
        assert!(irq.z80_int);
        assert!(!irq.m68k.asserted());
        irq.clear_for_z80_read();
        assert!(!irq.z80_int);
        assert!(!irq.vint_pending);
    }
}
