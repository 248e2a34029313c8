use serde::Serialize;

use dozen_rs::disasm::fmt_instruction;
use dozen_rs::isa::card::{project, EncodeError, SymbolTable};
use dozen_rs::Program;

#[derive(Debug, Clone, Serialize)]
pub struct CardOut {
    pub index: usize,
    pub text: String,
    pub fields: [u8; 3],
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub instructions: usize,
    pub cards: Vec<CardOut>,
}

pub fn build_report(program: &Program, table: &SymbolTable) -> Result<Report, EncodeError> {
    let cards = project(program)?;
    let cards = program
        .instructions
        .iter()
        .zip(cards)
        .enumerate()
        .map(|(index, (instr, card))| {
            let symbols = table
                .render(&card)
                .ok_or_else(|| EncodeError::FieldOutOfRange {
                    index,
                    value: card.fields.iter().copied().max().unwrap_or_default() as i64,
                })?;
            Ok(CardOut {
                index,
                text: fmt_instruction(instr),
                fields: card.fields,
                symbols: symbols.into_iter().map(String::from).collect(),
            })
        })
        .collect::<Result<Vec<_>, EncodeError>>()?;
    Ok(Report {
        instructions: program.len(),
        cards,
    })
}

pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    for c in &report.cards {
        out.push_str(&format!(
            "{:>5}  {}  {:<24} {:?}\n",
            c.index,
            c.symbols.concat(),
            c.text,
            c.fields
        ));
    }
    out
}
