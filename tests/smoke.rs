use dozen_rs::parse::parse_program;
use dozen_rs::program::{op, r};
use dozen_rs::{
    resolve, BaseOp, DirectExecutor, Fault, Halt, Machine, MachineConfig, Program, SparseMemory,
    Step,
};

#[test]
fn add1_output_return_terminates_explicitly() {
    let mut p = Program::new();
    p.push(op(BaseOp::Zero, &[r(0)]))
        .push(op(BaseOp::Add1, &[r(0)]))
        .push(op(BaseOp::Output, &[r(0)]))
        .push(op(BaseOp::Return, &[]));

    let mut mem = SparseMemory::new();
    let mut m = Machine::new(MachineConfig::default());
    let exec = DirectExecutor;
    assert_eq!(m.step(&p, &mut mem, &exec).unwrap(), Step::Continue);
    assert_eq!(m.step(&p, &mut mem, &exec).unwrap(), Step::Continue);
    assert_eq!(m.step(&p, &mut mem, &exec).unwrap(), Step::Continue);
    assert_eq!(m.step(&p, &mut mem, &exec).unwrap(), Step::Halted(Halt::Return));
    assert_eq!(m.output, vec![1]);
    assert_eq!(m.pc, 3);
}

#[test]
fn running_off_the_end_is_a_normal_halt() {
    let mut p = Program::new();
    p.push(op(BaseOp::Zero, &[r(3)])).push(op(BaseOp::Add1, &[r(3)]));

    let mut mem = SparseMemory::new();
    let mut m = Machine::new(MachineConfig::default());
    let halt = m.run(&p, &mut mem, &DirectExecutor, 100).unwrap();
    assert_eq!(halt, Halt::EndOfProgram);
    assert_eq!(m.regs[3], 1);
    // further steps stay halted and change nothing
    assert_eq!(
        m.step(&p, &mut mem, &DirectExecutor).unwrap(),
        Step::Halted(Halt::EndOfProgram)
    );
    assert_eq!(m.pc, 2);
}

#[test]
fn empty_program_halts_immediately() {
    let p = Program::new();
    let mut m = Machine::new(MachineConfig::default());
    let halt = m.run(&p, &mut SparseMemory::new(), &DirectExecutor, 1).unwrap();
    assert_eq!(halt, Halt::EndOfProgram);
}

#[test]
fn assembled_text_prints_characters() {
    let src = "\
; prints \"Hi\"
    NumBuild #6, #0   ; 'H' = 72
    Output r0
    NumBuild #8, #9   ; 'i' = 105
    Output r0
    NumBuild #0, #0
    NumBuild #0, #0
    Return
";
    let p = resolve(parse_program(src).unwrap()).unwrap();
    let mut m = Machine::new(MachineConfig::default());
    let halt = m.run(&p, &mut SparseMemory::new(), &DirectExecutor, 100).unwrap();
    assert_eq!(halt, Halt::Return);
    let text: String = m.output.iter().map(|&c| char::from_u32(c as u32).unwrap()).collect();
    assert_eq!(text, "Hi");
}

#[test]
fn step_limit_stops_runaway_loops() {
    let src = "\
    Zero r3
top:
    NumBuild #0, #0
    NumBuild #0, #0
    JumpBwd top
";
    let p = resolve(parse_program(src).unwrap()).unwrap();
    let mut m = Machine::new(MachineConfig::default());
    let trap = m.run(&p, &mut SparseMemory::new(), &DirectExecutor, 50).unwrap_err();
    assert_eq!(trap.fault, Fault::StepLimit(50));
}

#[test]
fn jump_back_to_first_instruction_faults() {
    // pc 2 - 3 is -1, which names no instruction
    let src = "\
top:
    NumBuild #0, #0
    NumBuild #0, #0
    JumpBwd top
";
    let p = resolve(parse_program(src).unwrap()).unwrap();
    let mut mem = SparseMemory::new();
    let mut m = Machine::new(MachineConfig::default());
    assert_eq!(m.step(&p, &mut mem, &DirectExecutor).unwrap(), Step::Continue);
    assert_eq!(m.step(&p, &mut mem, &DirectExecutor).unwrap(), Step::Continue);
    let trap = m.step(&p, &mut mem, &DirectExecutor).unwrap_err();
    assert_eq!(trap.pc, 2);
    assert_eq!(trap.fault, Fault::JumpOutOfBounds { target: -1, len: 3 });
}
