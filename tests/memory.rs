use smc4_rs::exec::IntExecutor;
use smc4_rs::isa::smc4::Smc4Decoder;
use smc4_rs::observe::{NullSink, Recorder, TextSink};
use smc4_rs::{assemble, Cpu, CpuConfig, Dump, Exit, LinearMemory, Trap};

#[test]
fn store_then_load_round_trips_through_memory() {
    let prog = assemble("
addi 42 0 2
store 2 1234
load 3 1234
store 3 ffff
halt
")
    .unwrap()
    .program()
    .unwrap();
    let mut cpu = Cpu::new(CpuConfig::default());
    let mut mem = LinearMemory::default();
    let exit = cpu
        .run(&prog, &mut mem, &Smc4Decoder::new(), &IntExecutor, &mut NullSink)
        .unwrap();
    assert_eq!(exit, Exit::Halted);
    assert_eq!(mem.mem[0x1234], 42);
    assert_eq!(mem.mem[0xFFFF], 42);
    assert_eq!(cpu.regs[3], 42);
}

#[test]
fn address_uses_both_bytes() {
    // 0x0102 must not alias 0x0012
    let prog = assemble("addi 9 0 2\nstore 2 0102\nload 4 0012\nhalt")
        .unwrap()
        .program()
        .unwrap();
    let mut cpu = Cpu::new(CpuConfig::default());
    let mut mem = LinearMemory::default();
    cpu.run(&prog, &mut mem, &Smc4Decoder::new(), &IntExecutor, &mut NullSink)
        .unwrap();
    assert_eq!(mem.mem[0x0102], 9);
    assert_eq!(mem.mem[0x0012], 0);
    assert_eq!(cpu.regs[4], 0);
}

#[test]
fn bus_errors_surface_as_traps() {
    let prog = assemble("store 2 0010").unwrap().program().unwrap();
    let mut cpu = Cpu::new(CpuConfig::default());
    let mut mem = LinearMemory::new(16);
    let err = cpu
        .run(&prog, &mut mem, &Smc4Decoder::new(), &IntExecutor, &mut NullSink)
        .unwrap_err();
    assert!(matches!(err, Trap::Bus { addr: 0x10, .. }));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn recorder_sees_trace_and_dumps() {
    let prog = assemble("addi 1 0 2\nhalt").unwrap().program().unwrap();
    let dump = Dump::TRACE | Dump::REGS_EACH_STEP | Dump::REGS_AT_END | Dump::MEMORY_AT_END;
    let mut cpu = Cpu::new(CpuConfig { step_limit: None, dump });
    let mut mem = LinearMemory::default();
    let mut rec = Recorder::default();
    cpu.run(&prog, &mut mem, &Smc4Decoder::new(), &IntExecutor, &mut rec)
        .unwrap();

    assert_eq!(rec.fetches, vec![(0, [0x01, 1, 0, 2]), (4, [0xFE; 4])]);
    assert_eq!(rec.registers.len(), 3);
    assert_eq!(rec.registers.last().unwrap().as_slice(), &cpu.regs[..]);
    assert_eq!(rec.memory.as_ref().map(Vec::len), Some(0x1_0000));
}

#[test]
fn no_dumps_by_default() {
    let prog = assemble("addi 1 0 2\nhalt").unwrap().program().unwrap();
    let mut cpu = Cpu::new(CpuConfig::default());
    let mut mem = LinearMemory::default();
    let mut rec = Recorder::default();
    cpu.run(&prog, &mut mem, &Smc4Decoder::new(), &IntExecutor, &mut rec)
        .unwrap();
    assert!(rec.fetches.is_empty());
    assert!(rec.registers.is_empty());
    assert!(rec.memory.is_none());
}

#[test]
fn text_dump_of_final_registers() {
    let prog = assemble("addi 3 0 2\nhalt").unwrap().program().unwrap();
    let mut cpu = Cpu::new(CpuConfig { step_limit: None, dump: Dump::REGS_AT_END });
    let mut mem = LinearMemory::default();
    let mut sink = TextSink::new(Vec::new());
    cpu.run(&prog, &mut mem, &Smc4Decoder::new(), &IntExecutor, &mut sink)
        .unwrap();
    let text = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(text, "registers: 0 0 3 0 0 0 0 0 0 0 0 0 0 0 0 0\n");
}
