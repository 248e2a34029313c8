use anyhow::{Context, Result};
use std::path::Path;

use dozen_rs::parse::parse_program;
use dozen_rs::{resolve, Program};

/// Parses and resolves assembly text, ready for projection.
pub fn resolve_source(src: &str) -> Result<Program> {
    let program = parse_program(src)?;
    Ok(resolve(program)?)
}

pub fn load_source(path: &Path) -> Result<Program> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    resolve_source(&src).with_context(|| format!("assembling {}", path.display()))
}
