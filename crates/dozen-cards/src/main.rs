use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::Path;

use dozen_cards::{build_report, load_source, render_text};
use dozen_rs::disasm::fmt_program;
use dozen_rs::isa::card::SymbolTable;

#[derive(Parser, Debug)]
#[command(name = "dozen-cards", version, about = "dozen-rs card exporter CLI", long_about = None)]
struct Cli {
    /// Input assembly path
    #[arg(value_name = "SOURCE")]
    input: String,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved program, one instruction per line
    Listing,
    /// Project the resolved program to cards
    Cards {
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Twelve characters used as the symbols for 0..=11
        #[arg(long, value_name = "CHARS")]
        symbols: Option<String>,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let program = load_source(Path::new(&cli.input))?;

    match cli.cmd {
        Command::Listing => print!("{}", fmt_program(&program)),
        Command::Cards { format, symbols, out } => {
            let table = match symbols {
                Some(s) => SymbolTable::from_chars(&s)
                    .ok_or_else(|| anyhow!("--symbols needs exactly 12 characters"))?,
                None => SymbolTable::default(),
            };
            let report = build_report(&program, &table)?;
            let text = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
                OutputFormat::Text => render_text(&report),
            };
            if let Some(path) = out {
                std::fs::write(path, text)?;
            } else {
                print!("{text}");
            }
        }
    }

    Ok(())
}
