mod common;

use common::{Op, ScriptCpu, command, machine, pre_line};
use machine_megadrive::yamaha_ym7101::{SnapshotError, VdpSnapshot};
use pretty_assertions::assert_eq;

fn painted_machine() -> common::TestMachine {
    let mut script = vec![
        (pre_line(0, 10), Op::Control(0x8144)),
        (pre_line(0, 10), Op::Control(0x8700)),
    ];
    script.extend(command(pre_line(0, 20), 0xC000_0000));
    script.push((pre_line(0, 30), Op::Data(0x000E)));
    // A few pattern bytes so the cache has something to decode.
    script.extend(command(pre_line(0, 40), 0x4020_0000));
    for word in [0x1111, 0x2222, 0x3333, 0x4444] {
        script.push((pre_line(0, 50), Op::Data(word)));
    }
    let mut md = machine(ScriptCpu::new(&script), ScriptCpu::idle());
    md.run_frame();
    md
}

#[test]
fn snapshot_survives_json_and_restores_identically() {
    let mut original = painted_machine();
    let snap = original.vdp().snapshot();

    let json = serde_json::to_string(&snap).expect("serialize");
    let decoded: VdpSnapshot = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, snap);

    let mut restored = machine(ScriptCpu::idle(), ScriptCpu::idle());
    restored.vdp_mut().restore(&decoded).expect("restore");
    assert_eq!(restored.vdp().snapshot(), snap);

    original.run_frame();
    restored.run_frame();
    assert_eq!(original.vdp().snapshot(), restored.vdp().snapshot());
    assert!(original.framebuffer() == restored.framebuffer());
    assert_eq!(restored.framebuffer()[0], 0xFFFC_0000);
}

#[test]
fn restore_rejects_a_pal_snapshot_on_ntsc() {
    let md = painted_machine();
    let mut snap = md.vdp().snapshot();
    snap.region = machine_megadrive::Region::Pal;

    let mut other = machine(ScriptCpu::idle(), ScriptCpu::idle());
    let before = other.vdp().snapshot();
    assert!(matches!(
        other.vdp_mut().restore(&snap),
        Err(SnapshotError::RegionMismatch { .. })
    ));
    assert_eq!(other.vdp().snapshot(), before);
}
