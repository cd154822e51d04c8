//! Turning decoded records into text: English descriptions, and the three listing formats.

use std::fmt::{Display, Formatter};
use std::io::Write;

use prettytable::{format as TableFormat, Table};
use strum_macros::{Display as StrumDisplay, EnumString};

use crate::bytecode::Instruction;
use crate::disassembler::{Decoded, DisassemblerConfig, Program, UnrecognizedPolicy};
use crate::error::DecodeError;
use crate::opcode::Opcode;
use crate::operand::{Address, AddressNumberType, Register};

const UNRECOGNIZED: &str = "Unrecognized instruction.";

#[derive(StrumDisplay, EnumString, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum ListingFormat {
  /// A header line and an indented description per instruction.
  #[strum(serialize = "text")]
  Text,
  /// A single table.
  #[strum(serialize = "table")]
  Table,
  /// Assembly form only; reassembles to the same image when nothing was unrecognized.
  #[strum(serialize = "asm")]
  Asm,
}

impl Default for ListingFormat {
  fn default() -> ListingFormat {
    ListingFormat::Text
  }
}


// `v[X]`, as the descriptions name registers.
struct V(Register);

impl Display for V {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "v[{:X}]", self.0.idx())
  }
}

/// The raw word as `0x` and four uppercase hex digits.
pub fn header(opcode: Opcode) -> String {
  opcode.to_string()
}

/// A plain English account of what the instruction would do. Pure; nothing is executed.
pub fn describe(instruction: &Instruction) -> String {
  use Instruction::*;
  match *instruction {
    ClearScreen => "Clear the screen".to_string(),
    Return      => "Return from the current subroutine".to_string(),

    CallNative { address } => format!("Execute the machine language subroutine at address {}", address),
    Jump       { address } => format!("Jump to address {}", address),
    Call       { address } => format!("Execute subroutine at address {}", address),

    SkipEqImmediate { x, byte } => {
      format!("Skip the next instruction if {} is equal to 0x{:02X}", V(x), byte)
    }
    SkipNeImmediate { x, byte } => {
      format!("Skip the next instruction if {} is not equal to 0x{:02X}", V(x), byte)
    }
    SkipEqRegister { x, y } => {
      format!("Skip the following instruction if register {} is equal to the register {}", V(x), V(y))
    }

    LoadImmediate { x, byte } => format!("Load value 0x{:02X} into register {}", byte, V(x)),
    AddImmediate  { x, byte } => format!("Add value 0x{:02X} into register {}", byte, V(x)),

    Assign { x, y } => format!("Store the value of register {} in register {}", V(y), V(x)),
    Or     { x, y } => format!("Set {} to ({} OR {})",  V(x), V(x), V(y)),
    And    { x, y } => format!("Set {} to ({} AND {})", V(x), V(x), V(y)),
    Xor    { x, y } => format!("Set {} to ({} XOR {})", V(x), V(x), V(y)),

    AddCarry { x, y } => format!(
      "Add the value of {} to {}.  Set v[F] to 0x01 if carry occurs.  \
       Set v[F] to 0x00 if carry does not occur.",
      V(y), V(x)
    ),
    SubBorrow { x, y } => format!(
      "Subtract the value of {} from {}.  Set v[F] to 0x00 if a borrow occurs.  \
       Set v[F] to 0x01 if borrow does not occur.",
      V(y), V(x)
    ),
    ShiftRight { x, y } => format!(
      "Store the value of register {} shifted right one bit in {}.  \
       Set v[F] to the lsb prior to the shift.",
      V(y), V(x)
    ),
    SubReverse { x, y } => format!(
      "Set register {} to the value {} minus {}.  Set v[F] to 0x00 if a borrow occurs.  \
       Set v[F] to 0x01 if borrow does not occur.",
      V(x), V(y), V(x)
    ),
    ShiftLeft { x, y } => format!(
      "Store the value of register {} shifted left one bit in {}.  \
       Set v[F] to the msb prior to the shift.",
      V(y), V(x)
    ),

    SkipNeRegister { x, y } => format!(
      "Skip the following instruction if the value of register {} is not equal to the value \
       of register {}",
      V(x), V(y)
    ),

    LoadIndex  { address } => format!("Load the value {} in register I", address),
    JumpOffset { address } => format!("Jump to address {} + v[0]", address),

    Random { x, mask } => format!("Set {} to a random number with a mask of 0x{:02X}", V(x), mask),

    Draw { x, y, height } => format!(
      "Draw a {:X} byte sprite starting at memory location stored in register I at {} {}",
      height & 0xF, V(x), V(y)
    ),

    SkipKeyPressed { x } => format!(
      "Skip the following instruction if the key corresponding to the hex value currently \
       stored in register {} is pressed",
      V(x)
    ),
    SkipKeyNotPressed { x } => format!(
      "Skip the following instruction if the key corresponding to the hex value currently \
       stored in register {} is not pressed",
      V(x)
    ),

    ReadDelay { x } => format!("Store the current value of the delay timer in register {}", V(x)),
    WaitKey   { x } => format!("Wait for input and store result in register {}", V(x)),
    SetDelay  { x } => format!("Set the delay timer to the value stored in register {}", V(x)),
    AddIndex  { x } => format!("Add the value stored in register {} to register I", V(x)),
  }
}

fn failure_address(error: &DecodeError, origin: Address) -> Address {
  origin + error.offset() as AddressNumberType
}

/// The raw word of a failure, or the lone byte of a truncated tail.
fn failure_word(error: &DecodeError) -> String {
  match error {
    DecodeError::Unrecognized { bytes, .. } => format!("0x{:02X}{:02X}", bytes[0], bytes[1]),
    DecodeError::Truncated { byte, .. }     => format!("0x{:02X}", byte),
    _                                       => String::new()
  }
}

fn failure_text(error: &DecodeError) -> String {
  match error {
    DecodeError::Unrecognized { .. } => UNRECOGNIZED.to_string(),
    other                            => format!("{}.", other)
  }
}

// region Text format

/// `ADDR  0xOPCD  Mnemonic(...)` followed by the indented description.
pub fn text_record(record: &Decoded, origin: Address) -> String {
  format!(
    "{}  {}  {}\n{:15}{}",
    record.address(origin), header(record.opcode), record.instruction, "", describe(&record.instruction)
  )
}

pub fn text_failure(error: &DecodeError, origin: Address) -> String {
  format!(
    "{}  {:6}  {}",
    failure_address(error, origin), failure_word(error), failure_text(error)
  )
}

// endregion

// region Asm format

pub fn asm_record(record: &Decoded) -> String {
  record.instruction.to_string()
}

/// Failures have no assembly form, so they become comments.
pub fn asm_failure(error: &DecodeError, origin: Address) -> String {
  format!(
    "# {}: {} {}",
    failure_address(error, origin), failure_word(error), failure_text(error)
  )
}

// endregion

// region Table format

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

/// Collects a listing row by row and prints as one table.
pub struct ListingTable {
  table : Table,
  origin: Address,
}

impl ListingTable {

  pub fn new(origin: Address) -> ListingTable {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ub->"Opcode", ubl->"Instruction", ubl->"Description"]);
    ListingTable { table, origin }
  }

  pub fn add_record(&mut self, record: &Decoded) {
    self.table.add_row(row![
      r->record.address(self.origin),
      header(record.opcode),
      record.instruction,
      describe(&record.instruction)
    ]);
  }

  pub fn add_failure(&mut self, error: &DecodeError) {
    self.table.add_row(row![
      r->failure_address(error, self.origin),
      failure_word(error),
      "",
      failure_text(error)
    ]);
  }

  pub fn len(&self) -> usize {
    self.table.len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.is_empty()
  }
}

impl Display for ListingTable {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.table)
  }
}

// endregion


/// Counts from one listing run.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct ListingSummary {
  pub decoded     : usize,
  pub unrecognized: usize,
  /// The failure that ended the pass, if one did.
  pub halted_at   : Option<DecodeError>,
}

/**
  Runs one decode pass over `program` and writes it to `out` in `format`. Failures are
  written in place as placeholder lines; whether the pass goes on after one is up to
  `config.policy`.
*/
pub fn write_listing<W: Write>(
    out    : &mut W,
    program: &Program,
    config : &DisassemblerConfig,
    format : ListingFormat
  ) -> std::io::Result<ListingSummary>
{
  let mut summary = ListingSummary::default();
  let mut table   = ListingTable::new(config.origin);

  for item in program.disassemble(config) {
    match item {

      Ok(record) => {
        summary.decoded += 1;
        match format {
          ListingFormat::Text  => writeln!(out, "{}", text_record(&record, config.origin))?,
          ListingFormat::Asm   => writeln!(out, "{}", asm_record(&record))?,
          ListingFormat::Table => table.add_record(&record),
        }
      }

      Err(error) => {
        if error.is_recoverable() {
          summary.unrecognized += 1;
        }
        if !error.is_recoverable() || config.policy == UnrecognizedPolicy::Halt {
          summary.halted_at = Some(error);
        }
        match format {
          ListingFormat::Text  => writeln!(out, "{}", text_failure(&error, config.origin))?,
          ListingFormat::Asm   => writeln!(out, "{}", asm_failure(&error, config.origin))?,
          ListingFormat::Table => table.add_failure(&error),
        }
      }

    } // end match item
  } // end for

  if format == ListingFormat::Table && !table.is_empty() {
    write!(out, "{}", table)?;
  }

  Ok(summary)
}
