use dozen_rs::machine::Chain;
use dozen_rs::program::{imm, op, r, Instruction, Operand, Word};
use dozen_rs::{BaseOp, DirectExecutor, Fault, Machine, MachineConfig, Program, SparseMemory};

fn program(instrs: &[Instruction]) -> Program {
    let mut p = Program::new();
    for i in instrs {
        p.push(i.clone());
    }
    p
}

fn run_with(p: &Program, regs: &[(usize, Word)]) -> Result<Machine, Fault> {
    let mut m = Machine::new(MachineConfig::default());
    for &(i, v) in regs {
        m.regs[i] = v;
    }
    m.run(p, &mut SparseMemory::new(), &DirectExecutor, 1000)
        .map_err(|t| t.fault)?;
    Ok(m)
}

#[test]
fn move_add_mult() {
    let p = program(&[
        op(BaseOp::Move, &[r(3), r(1)]),
        op(BaseOp::Add, &[r(3), r(2)]),
        op(BaseOp::Add1, &[r(3)]),
        op(BaseOp::Move, &[r(4), r(3)]),
        op(BaseOp::Mult, &[r(4), r(3)]),
    ]);
    let m = run_with(&p, &[]).unwrap();
    assert_eq!(m.regs[3], 257);
    assert_eq!(m.regs[4], 257 * 257);
}

#[test]
fn move_rejects_same_register() {
    let p = program(&[op(BaseOp::Move, &[r(5), r(5)])]);
    assert_eq!(
        run_with(&p, &[]).unwrap_err(),
        Fault::SameRegister { op: "Move", reg: 5 }
    );
}

#[test]
fn numbuild_chains_only_from_the_previous_step() {
    let p = program(&[
        op(BaseOp::NumBuild, &[imm(1), imm(2)]),
        op(BaseOp::NumBuild, &[imm(3), imm(4)]),
    ]);
    let m = run_with(&p, &[]).unwrap();
    assert_eq!(m.regs[0], 14 * 144 + 40);
    assert_eq!(m.chain, Chain::NumBuild);

    let p = program(&[
        op(BaseOp::NumBuild, &[imm(1), imm(2)]),
        op(BaseOp::Zero, &[r(5)]),
        op(BaseOp::NumBuild, &[imm(3), imm(4)]),
    ]);
    assert_eq!(run_with(&p, &[]).unwrap().regs[0], 40);

    // three in a row keep widening
    let p = program(&[
        op(BaseOp::NumBuild, &[imm(0), imm(1)]),
        op(BaseOp::NumBuild, &[imm(0), imm(0)]),
        op(BaseOp::NumBuild, &[imm(0), imm(0)]),
    ]);
    assert_eq!(run_with(&p, &[]).unwrap().regs[0], 144 * 144);
}

#[test]
fn numbuild_digits_must_be_base12() {
    let p = program(&[op(BaseOp::NumBuild, &[imm(12), imm(0)])]);
    assert_eq!(run_with(&p, &[]).unwrap_err(), Fault::ImmediateOutOfRange(12));
    let p = program(&[op(BaseOp::NumBuild, &[imm(0), imm(-1)])]);
    assert_eq!(run_with(&p, &[]).unwrap_err(), Fault::ImmediateOutOfRange(-1));
}

#[test]
fn divide_splits_quotient_and_remainder() {
    let p = program(&[op(BaseOp::Divide, &[r(3)])]);
    for divisor in 1..=13 {
        for dividend in -40..=40 {
            let m = run_with(&p, &[(0, divisor), (3, dividend)]).unwrap();
            let (rem, quot) = (m.regs[3], m.regs[6]);
            assert_eq!(dividend, divisor * quot + rem, "{dividend} / {divisor}");
            assert!((0..divisor).contains(&rem), "{dividend} % {divisor} = {rem}");
            assert_eq!(m.flag, quot != 0);
        }
    }
}

#[test]
fn divide_setup_is_checked() {
    let p = program(&[op(BaseOp::Divide, &[r(3)])]);
    assert_eq!(
        run_with(&p, &[(0, 0), (3, 9)]).unwrap_err(),
        Fault::InvalidDivide { dst: 3, divisor: 0 }
    );
    let p = program(&[op(BaseOp::Divide, &[r(6)])]);
    assert!(matches!(
        run_with(&p, &[(0, 2)]).unwrap_err(),
        Fault::InvalidDivide { dst: 6, .. }
    ));
    let p = program(&[op(BaseOp::Divide, &[r(0)])]);
    assert!(matches!(
        run_with(&p, &[(0, 2)]).unwrap_err(),
        Fault::InvalidDivide { dst: 0, .. }
    ));
}

#[test]
fn malformed_operands_fault() {
    let p = program(&[op(BaseOp::Zero, &[r(12)])]);
    assert_eq!(run_with(&p, &[]).unwrap_err(), Fault::RegisterOutOfRange(12));

    let p = program(&[op(BaseOp::Zero, &[imm(3)])]);
    assert_eq!(
        run_with(&p, &[]).unwrap_err(),
        Fault::ExpectedRegister { index: 0, found: Operand::Immediate(3) }
    );

    let p = program(&[op(BaseOp::NumBuild, &[r(1), imm(3)])]);
    assert_eq!(
        run_with(&p, &[]).unwrap_err(),
        Fault::ExpectedImmediate { index: 0, found: Operand::Register(1) }
    );

    let p = program(&[op(BaseOp::Add, &[r(1)])]);
    assert_eq!(
        run_with(&p, &[]).unwrap_err(),
        Fault::OperandCount { expected: 2, found: 1 }
    );

    let p = program(&[op(BaseOp::JumpFwd, &[Operand::Label("top".into())])]);
    assert!(matches!(
        run_with(&p, &[]).unwrap_err(),
        Fault::ExpectedRegister { index: 0, .. }
    ));
}

#[test]
fn overflow_is_a_fault_not_a_wrap() {
    let p = program(&[op(BaseOp::Mult, &[r(3), r(4)])]);
    assert_eq!(
        run_with(&p, &[(3, Word::MAX / 2), (4, 3)]).unwrap_err(),
        Fault::Overflow
    );
    let p = program(&[op(BaseOp::Add1, &[r(3)])]);
    assert_eq!(run_with(&p, &[(3, Word::MAX)]).unwrap_err(), Fault::Overflow);
}

#[test]
fn products_of_32_bit_patterns_are_exact() {
    let p = program(&[
        op(BaseOp::Mult, &[r(3), r(4)]),
        op(BaseOp::Divide, &[r(3)]),
    ]);
    let m = run_with(&p, &[(3, 0xFFFF_FFFF), (4, 0xFFFF_FFFF), (0, 0xFFFF_FFFF)]).unwrap();
    // 0xFFFF_FFFF^2 = 18446744065119617025, an exact multiple of the divisor
    assert_eq!(m.regs[6], 0xFFFF_FFFF);
    assert_eq!(m.regs[3], 0);
    assert!(m.flag);

    let p = program(&[op(BaseOp::Mult, &[r(3), r(4)])]);
    let m = run_with(&p, &[(3, 0xFFFF_FFFF), (4, 0xFFFF_FFFF)]).unwrap();
    assert_eq!(m.regs[3], 18_446_744_065_119_617_025);
}

#[test]
fn values_past_32_bits_are_kept() {
    let p = program(&[op(BaseOp::Mult, &[r(3), r(3)])]);
    let m = run_with(&p, &[(3, 1 << 20)]).unwrap();
    assert_eq!(m.regs[3], 1 << 40);
}

#[test]
fn trap_reports_location() {
    let p = program(&[op(BaseOp::Add1, &[r(3)]), op(BaseOp::Move, &[r(2), r(2)])]);
    let mut m = Machine::new(MachineConfig::default());
    let trap = m.run(&p, &mut SparseMemory::new(), &DirectExecutor, 10).unwrap_err();
    assert_eq!(trap.pc, 1);
    assert_eq!(trap.instr, "Move r2, r2");
    assert_eq!(
        trap.to_string(),
        "fault at instruction 1 (`Move r2, r2`): Move cannot use r2 for both operands"
    );
}
