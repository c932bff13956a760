mod common;

use common::{Op, ScriptCpu, at, command, machine, pre_line};
use emu_core::{Observable, Value};
use pretty_assertions::assert_eq;

fn setup(cycle: u64, regs: &[u16]) -> Vec<(u64, Op)> {
    regs.iter().map(|&r| (cycle, Op::Control(r))).collect()
}

#[test]
fn full_length_fill_covers_all_of_vram() {
    // Display off, DMA on, increment 1, length 0 (= 65536), fill mode.
    let mut script = setup(pre_line(0, 10), &[0x8114, 0x8F01, 0x9300, 0x9400, 0x9780]);
    script.extend(command(pre_line(0, 20), 0x4000_0080));
    script.push((pre_line(0, 30), Op::Data(0xABAB)));

    let mut md = machine(ScriptCpu::new(&script), ScriptCpu::idle());
    md.run_frame();
    assert_eq!(md.query("vdp.dma.kind"), Some(Value::Str("fill")));
    assert!(md.vdp().dma().active(), "65536 bytes do not fit in one frame");
    md.run_frame();

    assert!(!md.vdp().dma().active());
    let memory = md.vdp().memory();
    assert!(memory.vram.iter().all(|&b| b == 0xAB));
    // The sprite table shadow follows the fill through the whole window.
    let window = md.vdp().registers().sat_window;
    let (base, len) = (usize::from(window.base), usize::from(window.addr_mask) + 1);
    assert_eq!(&memory.sat[..len], &memory.vram[base..base + len]);
    assert_eq!(md.vdp().registers().get(19), 0);
    assert_eq!(md.vdp().registers().get(20), 0);
}

#[test]
fn fill_sets_dma_busy_until_done() {
    let mut script = setup(pre_line(0, 10), &[0x8114, 0x8F01, 0x9310, 0x9400, 0x9780]);
    script.extend(command(at(0, 10, 100), 0x4000_0080));
    script.push((at(0, 10, 200), Op::Data(0x1100)));
    script.push((at(0, 10, 300), Op::Status));
    script.push((at(0, 12, 0), Op::Status));

    let mut md = machine(ScriptCpu::new(&script), ScriptCpu::idle());
    md.run_frame();

    let busy: Vec<u16> = md.m68k().statuses().iter().map(|&(_, s)| s & 0x02).collect();
    assert_eq!(busy, [0x02, 0]);
    // Data word at 0, then addresses 1..=16 through the opposite lane.
    let vram = &md.vdp().memory().vram;
    assert_eq!(&vram[..4], &[0x11, 0x00, 0x11, 0x11]);
    assert_eq!(vram[0x10], 0x00);
    assert_eq!(vram[0x11], 0x11);
}

#[test]
fn bus_dma_freezes_the_68000() {
    // Display on, two words from 68000 address 0 to VRAM 0, H40.
    let mut script = setup(
        pre_line(0, 10),
        &[0x8154, 0x9302, 0x9400, 0x9500, 0x9600, 0x9700],
    );
    script.extend(command(at(0, 10, 1000), 0x4000_0080));
    let mut m68k = ScriptCpu::new(&script);
    m68k.ram[0] = 0x1234;
    m68k.ram[1] = 0x5678;

    let mut md = machine(m68k, ScriptCpu::idle());
    md.run_frame();

    // Active display, H40, VRAM target: 9 words per line.
    assert_eq!(md.m68k().after(7), Some(at(0, 10, 1000 + 760)));
    assert_eq!(&md.vdp().memory().vram[..4], &[0x12, 0x34, 0x56, 0x78]);
}

#[test]
fn control_write_during_bus_dma_lands_when_it_ends() {
    let mut script = setup(
        pre_line(0, 10),
        &[0x8154, 0x8F02, 0x9364, 0x9400, 0x9500, 0x9600, 0x9700],
    );
    script.extend(command(at(0, 10, 1000), 0x4000_0080));
    script.push((at(0, 10, 1000), Op::Control(0x8F04)));
    let mut m68k = ScriptCpu::new(&script);
    for (i, word) in m68k.ram.iter_mut().take(100).enumerate() {
        *word = i as u16 + 1;
    }

    let mut md = machine(m68k, ScriptCpu::idle());
    md.run_frame();

    assert!(!md.vdp().dma().active());
    assert_eq!(md.vdp().registers().get(15), 4);
    let vram = &md.vdp().memory().vram;
    assert_eq!(&vram[196..200], &[0x00, 0x63, 0x00, 0x64]);
    assert_eq!(&vram[200..202], &[0, 0]);
}

#[test]
fn fifth_data_write_stalls_for_one_slot() {
    let mut script = setup(pre_line(0, 10), &[0x8144]);
    script.extend(command(at(0, 10, 1000), 0x4000_0000));
    for i in 0..5 {
        script.push((at(0, 10, 1000), Op::Data(i)));
    }

    let mut md = machine(ScriptCpu::new(&script), ScriptCpu::idle());
    md.run_frame();

    let m68k = md.m68k();
    assert_eq!(m68k.after(6), Some(at(0, 10, 1000)));
    // H40 VRAM writes drain every 380 cycles.
    assert_eq!(m68k.after(7), Some(at(0, 10, 1000 + 380)));
}

#[test]
fn no_stall_with_display_off() {
    let mut script = setup(pre_line(0, 10), &[0x8104]);
    script.extend(command(at(0, 10, 1000), 0x4000_0000));
    for i in 0..8 {
        script.push((at(0, 10, 1000), Op::Data(i)));
    }

    let mut md = machine(ScriptCpu::new(&script), ScriptCpu::idle());
    md.run_frame();
    assert_eq!(md.m68k().after(10), Some(at(0, 10, 1000)));
}
