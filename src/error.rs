//! Error types for decoding, image validation, and assembly. Decode failures are ordinary
//! values: the caller decides whether a failure ends the listing.

use thiserror::Error;

use crate::bytecode::Operation;

/// The ways a single decode step can fail.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum DecodeError {
  /// The word at `offset` matches no entry of the decode table.
  #[error("unrecognized instruction 0x{:02X}{:02X} at offset 0x{:04X}", .bytes[0], .bytes[1], .offset)]
  Unrecognized {
    offset: usize,
    bytes : [u8; 2]
  },

  /// Only a single byte remains at `offset`.
  #[error("truncated instruction at offset 0x{offset:04X}: trailing byte 0x{byte:02X}")]
  Truncated {
    offset: usize,
    byte  : u8
  },

  /// The offset lies at or past the end of the buffer.
  #[error("offset 0x{offset:04X} is outside a buffer of {len} bytes")]
  OutOfBounds {
    offset: usize,
    len   : usize
  },

  /// Instructions are two bytes wide, so decoding only starts at even offsets.
  #[error("offset 0x{offset:04X} is not aligned to an instruction boundary")]
  Misaligned {
    offset: usize
  },
}

impl DecodeError {
  pub fn offset(&self) -> usize {
    match self {
      | DecodeError::Unrecognized { offset, .. }
      | DecodeError::Truncated    { offset, .. }
      | DecodeError::OutOfBounds  { offset, .. }
      | DecodeError::Misaligned   { offset }      => *offset
    }
  }

  /// Only an unrecognized word leaves the rest of the buffer decodable.
  pub fn is_recoverable(&self) -> bool {
    match self {
      DecodeError::Unrecognized { .. } => true,
      _                                => false
    }
  }
}


/// Shape problems with a program image, caught before any decoding happens.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum ImageError {
  #[error("program image is empty")]
  Empty,

  #[error("program image has odd length {0}; instructions are two bytes wide")]
  OddLength(usize),
}


/// Assembly errors. Every variant records the 1-based source line.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AssemblyError {
  #[error("Error on line {line}: cannot parse `{text}`.")]
  Syntax {
    line: usize,
    text: String
  },

  #[error("Error on line {line}: {name} is not an operation.")]
  NotAnOperation {
    line: usize,
    name: String
  },

  #[error("Error on line {line}: {operation} expects operands {expected} but was given ({given}).")]
  WrongOperands {
    line     : usize,
    operation: Operation,
    expected : &'static str,
    given    : String
  },

  #[error("Error on line {line}: {text} cannot be encoded; its word decodes as something else.")]
  Unencodable {
    line: usize,
    text: String
  },

  #[error("Error on line {line}: 0x{value:X} does not fit in {bits} bits.")]
  OutOfRange {
    line : usize,
    value: u64,
    bits : u32
  },
}
