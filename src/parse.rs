//! Line-oriented assembly text.
//!
//! ```text
//! # whole-line comment
//! loop:                 ; label
//!     NumBuild #0, #0   ; jump slot
//!     NumBuild #0, #0
//!     JumpBwdNF loop
//! ```

use crate::instructions::{desc_for, macro_desc_for, OperandKind};
use crate::opcode::Opcode;
use crate::program::{Instruction, Operand, Program, ProgramError};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: unknown instruction `{name}`")]
    UnknownInstruction { line: usize, name: String },
    #[error("line {line}: {name} takes {expected} operands, got {found}")]
    Arity {
        line: usize,
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: bad operand `{token}`")]
    BadOperand { line: usize, token: String },
    #[error("line {line}: {source}")]
    Program {
        line: usize,
        #[source]
        source: ProgramError,
    },
}

enum Item {
    Label(String),
    Instr(Instruction),
}

pub fn parse_program(src: &str) -> Result<Program, ParseError> {
    let mut program = Program::new();
    for (i, text) in src.lines().enumerate() {
        let line = i + 1;
        match parse_line(line, text)? {
            Some(Item::Label(name)) => program
                .bind_label(name)
                .map_err(|source| ParseError::Program { line, source })?,
            Some(Item::Instr(instr)) => {
                program.push(instr);
            }
            None => {}
        }
    }
    Ok(program)
}

fn parse_line(line: usize, text: &str) -> Result<Option<Item>, ParseError> {
    let ls = text.trim_start();
    if ls.starts_with('#') {
        return Ok(None);
    }
    let s = text.split(';').next().unwrap_or_default().trim();
    if s.is_empty() || s.starts_with('.') {
        return Ok(None);
    }
    if let Some(name) = s.strip_suffix(':') {
        return Ok(Some(Item::Label(name.trim().to_string())));
    }

    let (name, rest) = match s.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (s, ""),
    };
    let opcode = Opcode::from_mnemonic(name).ok_or_else(|| ParseError::UnknownInstruction {
        line,
        name: name.to_string(),
    })?;
    let kinds = match opcode {
        Opcode::Base(op) => desc_for(op).operands,
        Opcode::Macro(op) => macro_desc_for(op).operands,
    };
    let tokens: Vec<&str> = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',').map(str::trim).collect()
    };
    if tokens.len() != kinds.len() {
        return Err(ParseError::Arity {
            line,
            name: name.to_string(),
            expected: kinds.len(),
            found: tokens.len(),
        });
    }
    let operands = tokens
        .iter()
        .zip(kinds)
        .map(|(tok, kind)| parse_operand(line, tok, *kind))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(Item::Instr(Instruction::new(opcode, operands))))
}

fn parse_operand(line: usize, tok: &str, kind: OperandKind) -> Result<Operand, ParseError> {
    let bad = || ParseError::BadOperand {
        line,
        token: tok.to_string(),
    };
    let reg = |t: &str| t.strip_prefix('r').and_then(|n| n.parse::<u8>().ok());
    match kind {
        OperandKind::Reg => reg(tok).map(Operand::Register).ok_or_else(bad),
        OperandKind::Imm => tok
            .strip_prefix('#')
            .and_then(|n| n.parse::<i64>().ok())
            .map(Operand::Immediate)
            .ok_or_else(bad),
        OperandKind::Target => match reg(tok) {
            Some(r) => Ok(Operand::Register(r)),
            None if is_label(tok) => Ok(Operand::Label(tok.to_string())),
            None => Err(bad()),
        },
    }
}

fn is_label(tok: &str) -> bool {
    let mut chars = tok.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '.')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{BaseOp, MacroOp};
    use crate::program::{imm, label, mac, op, r};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_labels_comments_and_operands() {
        let src = "\
# header comment
.text
start:
    NumBuild #0, #5   ; slot
    NumBuild #0, #0
    JumpFwd done
    ADD_IMM_MACRO r1, #-8
done:
    Return
";
        let p = parse_program(src).unwrap();
        assert_eq!(
            p.instructions,
            vec![
                op(BaseOp::NumBuild, &[imm(0), imm(5)]),
                op(BaseOp::NumBuild, &[imm(0), imm(0)]),
                op(BaseOp::JumpFwd, &[label("done")]),
                mac(MacroOp::AddImm, &[r(1), imm(-8)]),
                op(BaseOp::Return, &[]),
            ]
        );
        assert_eq!(p.label("start"), Some(0));
        assert_eq!(p.label("done"), Some(4));
    }

    #[test]
    fn reports_line_numbers() {
        assert_eq!(
            parse_program("Zero r1\nFrobnicate r2\n").unwrap_err(),
            ParseError::UnknownInstruction { line: 2, name: "Frobnicate".into() }
        );
        assert_eq!(
            parse_program("Move r1\n").unwrap_err(),
            ParseError::Arity { line: 1, name: "Move".into(), expected: 2, found: 1 }
        );
        assert_eq!(
            parse_program("Zero #1\n").unwrap_err(),
            ParseError::BadOperand { line: 1, token: "#1".into() }
        );
        assert_eq!(
            parse_program("a:\nZero r1\na:\n").unwrap_err(),
            ParseError::Program { line: 3, source: ProgramError::DuplicateLabel("a".into()) }
        );
    }
}
