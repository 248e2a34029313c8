use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dozen_rs::{
    parse::parse_program, resolve, DirectExecutor, Halt, Machine, MachineConfig, SparseMemory,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble and run a program on the dozen-rs interpreter"
)]
struct Opts {
    /// Step limit for runaway programs
    #[arg(long, default_value_t = 10_000_000u64)]
    max_steps: u64,
    /// Initial value of r1 and r2
    #[arg(long, default_value_t = MachineConfig::default().stack_top)]
    stack_top: i64,
    /// Print the final machine state as JSON instead of the output text
    #[arg(long)]
    dump_state: bool,
    #[arg(value_name = "SOURCE")]
    input: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let src = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input))?;
    let program = resolve(parse_program(&src)?)?;

    let mut mem = SparseMemory::new();
    let mut m = Machine::new(MachineConfig {
        stack_top: opts.stack_top,
    });
    let halt = m.run(&program, &mut mem, &DirectExecutor, opts.max_steps)?;

    if opts.dump_state {
        let state = serde_json::json!({ "halt": halt, "machine": m, "memory": mem });
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let text: String = m
        .output
        .iter()
        .map(|&c| u32::try_from(c).ok().and_then(char::from_u32).unwrap_or('\u{FFFD}'))
        .collect();
    println!("{text}");
    if halt == Halt::EndOfProgram {
        eprintln!("program ran off the end without returning");
    }
    Ok(())
}
