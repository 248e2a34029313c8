use crate::program::{Instruction, Program};

pub fn fmt_instruction(instr: &Instruction) -> String {
    if instr.operands.is_empty() {
        return instr.opcode.mnemonic().to_string();
    }
    let args: Vec<String> = instr.operands.iter().map(|o| o.to_string()).collect();
    format!("{} {}", instr.opcode.mnemonic(), args.join(", "))
}

/// One line per instruction, with labels on their own lines before the
/// instruction they name.
pub fn fmt_program(program: &Program) -> String {
    let mut labels: Vec<(&str, usize)> = program
        .labels
        .iter()
        .map(|(name, &at)| (name.as_str(), at))
        .collect();
    labels.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));

    let mut out = String::new();
    let mut next = labels.iter().peekable();
    for (i, instr) in program.instructions.iter().enumerate() {
        while let Some((name, _)) = next.next_if(|(_, at)| *at == i) {
            out.push_str(&format!("{name}:\n"));
        }
        out.push_str(&format!("{i:>5}  {}\n", fmt_instruction(instr)));
    }
    for (name, _) in next {
        out.push_str(&format!("{name}:\n"));
    }
    out
}
