/*!
  A disassembler for the CHIP-8 instruction set.

  A program image is a flat sequence of big-endian 16 bit words. Each word decodes to at most
  one `Instruction`; a word that matches nothing is a `DecodeError`, and by default the first
  one ends the listing. Decoding is pure: no instruction is executed and no machine state
  exists anywhere in this crate. Registers only ever appear as labels in the output.

  ```
  use chip8_dis::{DisassemblerConfig, Program};
  use chip8_dis::render::describe;

  let program = Program::new(vec![0x61, 0x42, 0xA2, 0x34]).unwrap();
  for item in program.disassemble(&DisassemblerConfig::default()) {
    let record = item.unwrap();
    println!("{} {}", record.opcode, describe(&record.instruction));
  }
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod bytecode;
pub mod disassembler;
pub mod error;
pub mod opcode;
pub mod operand;
pub mod render;

pub use bytecode::{Instruction, Operation};
pub use disassembler::{Decoded, Disassembler, DisassemblerConfig, Program, UnrecognizedPolicy};
pub use error::{AssemblyError, DecodeError, ImageError};
pub use opcode::Opcode;
pub use operand::{Address, Register};
pub use render::{write_listing, ListingFormat, ListingSummary};
