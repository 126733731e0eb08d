use smc4_rs::exec::IntExecutor;
use smc4_rs::isa::smc4::Smc4Decoder;
use smc4_rs::observe::NullSink;
use smc4_rs::{assemble, Cpu, CpuConfig, Exit, Flag, LinearMemory};

fn run(src: &str) -> Cpu {
    let prog = assemble(src).unwrap().program().unwrap();
    let mut cpu = Cpu::new(CpuConfig::default());
    let mut mem = LinearMemory::default();
    let exit = cpu
        .run(&prog, &mut mem, &Smc4Decoder::new(), &IntExecutor, &mut NullSink)
        .unwrap();
    assert_eq!(exit, Exit::Halted);
    cpu
}

#[test]
fn cmp_writes_one_outcome_to_flag_register() {
    let cpu = run("addi 3 0 2\naddi 5 0 3\ncmp 2 3\nhalt");
    assert_eq!(cpu.flag(), Some(Flag::Less));
    assert_eq!(cpu.regs[1], 3);

    let cpu = run("addi 3 0 2\naddi 5 0 3\ncmp 3 2\nhalt");
    assert_eq!(cpu.flag(), Some(Flag::Greater));

    let cpu = run("addi 3 0 2\naddi 3 0 3\ncmp 2 3\nhalt");
    assert_eq!(cpu.flag(), Some(Flag::Equal));
}

#[test]
fn jmp_replaces_pc_without_increment() {
    let prog = assemble("jmp .end\nnoop\n.end\nhalt").unwrap().program().unwrap();
    let mut cpu = Cpu::new(CpuConfig::default());
    let mut mem = LinearMemory::default();
    let stop = cpu
        .step(&prog, &mut mem, &Smc4Decoder::new(), &IntExecutor, &mut NullSink)
        .unwrap();
    assert_eq!(stop, None);
    assert_eq!(cpu.pc, 8);
}

#[test]
fn counting_loop_with_jne() {
    let cpu = run("
addi 5 0 2      ; limit
.loop
addi 1 3 3
cmp 3 2
jne loop
halt
");
    assert_eq!(cpu.regs[3], 5);
    assert_eq!(cpu.flag(), Some(Flag::Equal));
    // 1 + 5 * (pad, addi, cmp, jne) + halt, after the leading blank line
    assert_eq!(cpu.steps, 23);
}

#[test]
fn less_and_greater_branches() {
    let cpu = run("
addi 1 0 2
addi 2 0 3
cmp 2 3
jgt .bad
jlt .good
.bad
addi 99 0 4
halt
.good
addi 7 0 5
halt
");
    assert_eq!(cpu.regs[4], 0);
    assert_eq!(cpu.regs[5], 7);
}

#[test]
fn jne_needs_a_comparison() {
    // flag register still 0: not a comparison outcome
    let cpu = run("jne 8\naddi 1 0 2\nhalt");
    assert_eq!(cpu.regs[2], 1);
}

#[test]
fn not_equal_flag_set_by_hand() {
    let cpu = run("addi 2 0 comp\njeq 16\njne 16\naddi 1 0 5\nhalt");
    assert_eq!(cpu.flag(), Some(Flag::NotEqual));
    assert_eq!(cpu.regs[5], 0);
}

#[test]
fn equal_flag_falls_through_jne() {
    let cpu = run("cmp 2 3\njne 16\njlt 16\naddi 1 0 5\nhalt");
    assert_eq!(cpu.flag(), Some(Flag::Equal));
    assert_eq!(cpu.regs[5], 1);
}
