#![allow(dead_code)]

use std::collections::VecDeque;

use emu_core::Processor;
use machine_megadrive::{DmaSource, MegaDrive, MegaDriveConfig, Vdp};

pub const LINE: u64 = 3420;
pub const NTSC_FRAME: u64 = 262 * LINE;

/// One bus access performed by a scripted CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Control(u16),
    Data(u16),
    Status,
    Acknowledge,
    ControlZ80(u8),
    DataZ80(u8),
    StatusZ80,
}

/// What came back from an access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Cycle counter after the access (includes stalls and freezes).
    Done { index: usize, cycles_after: u64 },
    Status(u16),
    Acknowledged { vint: bool, level_after: u8 },
    /// 68000 interrupt level (or Z80 INT as 0/1) changed.
    Irq(u8),
}

/// CPU stand-in that performs a fixed list of port accesses at fixed
/// absolute cycles, idling in between.
pub struct ScriptCpu {
    cycles: u32,
    epoch: u64,
    script: VecDeque<(u64, Op)>,
    done: usize,
    pub events: Vec<(u64, Event)>,
    pub ram: Vec<u16>,
    pub running: bool,
    /// Acknowledge any interrupt seen at the start of a slice.
    pub auto_ack: bool,
    watch_z80_int: bool,
    last_irq: u8,
}

impl ScriptCpu {
    pub fn new(script: &[(u64, Op)]) -> Self {
        Self {
            cycles: 0,
            epoch: 0,
            script: script.iter().copied().collect(),
            done: 0,
            events: Vec::new(),
            ram: vec![0; 0x8000],
            running: true,
            auto_ack: false,
            watch_z80_int: false,
            last_irq: 0,
        }
    }

    pub fn idle() -> Self {
        Self::new(&[])
    }

    /// Track the Z80 INT line instead of the 68000 level.
    pub fn watching_z80_int(mut self) -> Self {
        self.watch_z80_int = true;
        self
    }

    pub fn now(&self) -> u64 {
        self.epoch + u64::from(self.cycles)
    }

    fn record(&mut self, event: Event) {
        let now = self.now();
        self.events.push((now, event));
    }

    fn check_irq(&mut self, vdp: &mut Vdp) {
        let level = if self.watch_z80_int {
            u8::from(vdp.z80_int())
        } else {
            vdp.m68k_irq().level
        };
        if level != self.last_irq {
            self.last_irq = level;
            self.record(Event::Irq(level));
        }
        if self.auto_ack && level != 0 && !self.watch_z80_int {
            self.acknowledge(vdp);
        }
    }

    fn acknowledge(&mut self, vdp: &mut Vdp) {
        let vint = vdp.acknowledge_interrupt();
        let level_after = vdp.m68k_irq().level;
        self.last_irq = level_after;
        self.record(Event::Acknowledged { vint, level_after });
    }

    fn stall_to(&mut self, until: Option<u32>) {
        if let Some(until) = until {
            self.cycles = self.cycles.max(until);
        }
    }

    fn perform(&mut self, op: Op, vdp: &mut Vdp) {
        let now = self.cycles;
        match op {
            Op::Control(word) => {
                let freeze = vdp.write_control_68k(word, now, self);
                self.stall_to(freeze);
            }
            Op::Data(word) => {
                let stall = vdp.write_data_68k(word, now);
                self.stall_to(stall);
            }
            Op::Status => {
                let value = vdp.read_status_68k(now);
                self.record(Event::Status(value));
            }
            Op::Acknowledge => self.acknowledge(vdp),
            Op::ControlZ80(byte) => vdp.write_control_z80(byte, now),
            Op::DataZ80(byte) => vdp.write_data_z80(byte, now),
            Op::StatusZ80 => {
                let value = vdp.read_status_z80(now);
                self.record(Event::Status(value));
            }
        }
        let cycles_after = self.now();
        self.events.push((
            cycles_after,
            Event::Done {
                index: self.done,
                cycles_after,
            },
        ));
        self.done += 1;
    }

    /// Cycle counter right after the `index`th scripted access.
    pub fn after(&self, index: usize) -> Option<u64> {
        self.events.iter().find_map(|&(_, event)| match event {
            Event::Done { index: i, cycles_after } if i == index => Some(cycles_after),
            _ => None,
        })
    }

    pub fn statuses(&self) -> Vec<(u64, u16)> {
        self.events
            .iter()
            .filter_map(|&(at, event)| match event {
                Event::Status(value) => Some((at, value)),
                _ => None,
            })
            .collect()
    }

    pub fn irq_changes(&self) -> Vec<(u64, u8)> {
        self.events
            .iter()
            .filter_map(|&(at, event)| match event {
                Event::Irq(level) => Some((at, level)),
                _ => None,
            })
            .collect()
    }

    pub fn acknowledgements(&self) -> Vec<(u64, bool, u8)> {
        self.events
            .iter()
            .filter_map(|&(at, event)| match event {
                Event::Acknowledged { vint, level_after } => Some((at, vint, level_after)),
                _ => None,
            })
            .collect()
    }
}

impl Processor<Vdp> for ScriptCpu {
    fn cycles(&self) -> u32 {
        self.cycles
    }

    fn set_cycles(&mut self, cycles: u32) {
        self.cycles = cycles;
    }

    fn run(&mut self, to_cycle: u32, bus: &mut Vdp) -> u32 {
        self.check_irq(bus);
        let target = self.epoch + u64::from(to_cycle);
        while let Some(&(at, op)) = self.script.front() {
            if at >= target {
                break;
            }
            self.script.pop_front();
            if at > self.now() {
                self.cycles = (at - self.epoch) as u32;
            }
            self.perform(op, bus);
            self.check_irq(bus);
        }
        self.cycles = self.cycles.max(to_cycle);
        self.cycles
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn rebase(&mut self, frame_cycles: u32) {
        self.epoch += u64::from(frame_cycles);
        self.cycles = self.cycles.wrapping_sub(frame_cycles);
    }
}

impl DmaSource for ScriptCpu {
    fn read_word(&mut self, address: u32) -> u16 {
        self.ram[(address as usize >> 1) % self.ram.len()]
    }
}

pub type TestMachine = MegaDrive<ScriptCpu, ScriptCpu>;

/// Mode 5 machine with the boot register values.
pub fn machine(m68k: ScriptCpu, z80: ScriptCpu) -> TestMachine {
    let config = MegaDriveConfig {
        boot_registers: true,
        ..MegaDriveConfig::default()
    };
    MegaDrive::new(config, m68k, z80)
}

/// Absolute cycle of `offset` into `line` of `frame`.
pub fn at(frame: u64, line: u64, offset: u64) -> u64 {
    // Line 0 follows the pre-line.
    frame * NTSC_FRAME + (line + 1) * LINE + offset
}

/// Absolute cycle inside the pre-line of `frame`.
pub fn pre_line(frame: u64, offset: u64) -> u64 {
    frame * NTSC_FRAME + offset
}

/// Two-word command sequence at one cycle.
pub fn command(cycle: u64, long: u32) -> [(u64, Op); 2] {
    [
        (cycle, Op::Control((long >> 16) as u16)),
        (cycle, Op::Control(long as u16)),
    ]
}
