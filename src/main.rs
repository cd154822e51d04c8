use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::info;

use chip8_dis::{
  write_listing,
  Address,
  DisassemblerConfig,
  ListingFormat,
  Program,
  UnrecognizedPolicy
};

#[derive(Parser)]
#[command(name = "chip8-dis", version, about = "Disassemble a CHIP-8 program image")]
struct Cli {
  /// Program image to disassemble.
  rom: Option<PathBuf>,

  /// Listing format: text, table, or asm.
  #[arg(short, long, default_value = "text", value_parser = parse_format)]
  format: ListingFormat,

  /// Load address of the first byte, in hex.
  #[arg(long, default_value = "0x200", value_parser = parse_origin)]
  origin: Address,

  /// Print a placeholder for each unrecognized word and keep decoding.
  #[arg(short, long)]
  keep_going: bool,
}

fn parse_format(text: &str) -> Result<ListingFormat, String> {
  ListingFormat::from_str(text).map_err(|_| format!("unknown format `{}`; expected text, table, or asm", text))
}

fn parse_origin(text: &str) -> Result<Address, String> {
  let digits =
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
  let value  = u16::from_str_radix(digits, 16).map_err(|e| format!("`{}`: {}", text, e))?;
  Address::new(value).ok_or_else(|| format!("0x{:X} is outside the 12 bit address space", value))
}

fn main() -> Result<()> {
  env_logger::init();
  let cli = Cli::parse();

  let rom =
    match cli.rom {
      Some(rom) => rom,
      None      => {
        Cli::command().print_help()?;
        return Ok(());
      }
    };

  let bytes = fs::read(&rom).with_context(|| format!("Failed to read {}", rom.display()))?;
  info!("size: {}", bytes.len());

  let program =
    Program::new(bytes)
      .with_context(|| format!("{} is not a program image", rom.display()))?;

  let config = DisassemblerConfig {
    origin: cli.origin,
    policy: match cli.keep_going {
      true  => UnrecognizedPolicy::Continue,
      false => UnrecognizedPolicy::Halt
    }
  };

  let stdout  = io::stdout();
  let mut out = BufWriter::new(stdout.lock());
  let summary = write_listing(&mut out, &program, &config, cli.format)?;
  out.flush()?;

  match summary.halted_at {
    Some(error) => info!("Stopped after {} instructions: {}", summary.decoded, error),
    None        => info!(
      "Decoded {} of {} words ({} unrecognized).",
      summary.decoded, program.instruction_count(), summary.unrecognized
    )
  }

  Ok(())
}
