use smc4_rs::exec::IntExecutor;
use smc4_rs::isa::smc4::Smc4Decoder;
use smc4_rs::observe::NullSink;
use smc4_rs::{assemble, Cpu, CpuConfig, Exit, LinearMemory, Program, Trap};

fn run(prog: &Program, cfg: CpuConfig) -> (Cpu, Result<Exit, Trap>) {
    let mut cpu = Cpu::new(cfg);
    let mut mem = LinearMemory::default();
    let res = cpu.run(prog, &mut mem, &Smc4Decoder::new(), &IntExecutor, &mut NullSink);
    (cpu, res)
}

#[test]
fn add_single_step() {
    let prog = assemble("add 1 2 3").unwrap().program().unwrap();
    let mut mem = LinearMemory::default();
    let dec = Smc4Decoder::new();
    let exec = IntExecutor;

    let mut cpu = Cpu::new(CpuConfig::default());
    cpu.regs[1] = 4;
    cpu.regs[2] = 5;
    let stop = cpu.step(&prog, &mut mem, &dec, &exec, &mut NullSink).unwrap();
    assert_eq!(stop, None);
    assert_eq!(cpu.regs[3], 9);
    assert_eq!(cpu.pc, 4);

    // past the last word
    let stop = cpu.step(&prog, &mut mem, &dec, &exec, &mut NullSink).unwrap();
    assert_eq!(stop, Some(Exit::EndOfImage));
}

#[test]
fn lone_halt() {
    let asm = assemble("halt").unwrap();
    assert_eq!(asm.image, vec![0xFE; 4]);

    let (cpu, res) = run(&asm.program().unwrap(), CpuConfig::default());
    assert_eq!(res.unwrap(), Exit::Halted);
    assert_eq!(cpu.regs, [0; 16]);
    assert_eq!(cpu.pc, 0);
    assert_eq!(cpu.steps, 1);
}

#[test]
fn empty_image_ends_immediately() {
    let (cpu, res) = run(&Program::new(Vec::new()).unwrap(), CpuConfig::default());
    assert_eq!(res.unwrap(), Exit::EndOfImage);
    assert_eq!(cpu.steps, 0);
}

#[test]
fn image_length_checked_before_execution() {
    let err = Program::new(vec![0xFE; 5]).unwrap_err();
    assert!(matches!(err, Trap::ImageLength { len: 5 }));
    assert_eq!(err.to_string(), "amount of bytes (5) is not divisible by four");
}

#[test]
fn unknown_and_malformed_opcodes_trap() {
    for word in [[0x42, 0, 0, 0], [0xFE, 0xFE, 0xFE, 0x01], [0xFF, 0x00, 0xFF, 0xFF]] {
        let mut bytes = vec![0xFF; 4];
        bytes.extend_from_slice(&word);
        let (cpu, res) = run(&Program::new(bytes).unwrap(), CpuConfig::default());
        match res {
            Err(Trap::UnknownOpcode { pc, opcode }) => {
                assert_eq!(pc, 4);
                assert_eq!(opcode, word[0]);
            }
            other => panic!("expected unknown opcode, got {other:?}"),
        }
        assert_eq!(cpu.pc, 4);
    }
}

#[test]
fn out_of_range_register_byte_traps() {
    let (_, res) = run(&Program::new(vec![0x00, 1, 2, 16]).unwrap(), CpuConfig::default());
    assert!(matches!(res, Err(Trap::UnknownOpcode { pc: 0, opcode: 0 })));
}

#[test]
fn step_limit_stops_infinite_loop() {
    let prog = assemble(".spin\njmp spin").unwrap().program().unwrap();
    let cfg = CpuConfig { step_limit: Some(10), ..CpuConfig::default() };
    let (cpu, res) = run(&prog, cfg);
    assert!(matches!(res, Err(Trap::StepLimit { limit: 10 })));
    assert_eq!(cpu.steps, 10);
}

#[test]
fn unaligned_jump_target_traps() {
    let prog = assemble("jmp 5").unwrap().program().unwrap();
    let (_, res) = run(&prog, CpuConfig::default());
    assert!(matches!(res, Err(Trap::Unaligned { pc: 0, target: 5 })));
}

#[test]
fn jump_past_end_finishes() {
    let prog = assemble("jmp 400\naddi 1 0 2").unwrap().program().unwrap();
    let (cpu, res) = run(&prog, CpuConfig::default());
    assert_eq!(res.unwrap(), Exit::EndOfImage);
    assert_eq!(cpu.regs[2], 0);
    assert_eq!(cpu.pc, 400);
}
