use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use chip8_dis::bytecode::assemble;

#[derive(Parser)]
#[command(name = "chip8-asm", version, about = "Assemble CHIP-8 assembly text into a program image")]
struct Cli {
  /// Assembly source, one instruction per line.
  source: PathBuf,

  /// Where to write the program image.
  #[arg(short, long)]
  output: PathBuf,
}

fn main() -> Result<()> {
  env_logger::init();
  let cli = Cli::parse();

  let text =
    fs::read_to_string(&cli.source)
      .with_context(|| format!("Failed to read {}", cli.source.display()))?;

  let image =
    assemble(&text)
      .with_context(|| format!("Failed to assemble {}", cli.source.display()))?;

  fs::write(&cli.output, &image)
    .with_context(|| format!("Failed to write {}", cli.output.display()))?;

  info!("Wrote {} instructions to {}.", image.len() / 2, cli.output.display());
  Ok(())
}
