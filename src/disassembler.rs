//! A program image and the lazy decode pass over it.

use std::iter::FusedIterator;

use log::{debug, warn};
#[cfg(feature = "trace_decoding")]
use log::trace;

use crate::bytecode::{decode_at, encode_instruction, Instruction};
use crate::error::{DecodeError, ImageError};
use crate::opcode::{Opcode, INSTRUCTION_SIZE};
use crate::operand::{Address, AddressNumberType};

/// Programs are conventionally loaded here, above the interpreter's reserved area.
pub const PROGRAM_START: AddressNumberType = 0x200;
/// Bytes available between `PROGRAM_START` and the end of the 4K address space.
pub const PROGRAM_SPACE: usize = 0x1000 - PROGRAM_START as usize;

/// What a pass does when it meets a word it cannot decode.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum UnrecognizedPolicy {
  /// Yield the failure and end the pass.
  Halt,
  /// Yield the failure and carry on with the next word.
  Continue,
}

impl Default for UnrecognizedPolicy {
  fn default() -> UnrecognizedPolicy {
    UnrecognizedPolicy::Halt
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DisassemblerConfig {
  /// Load address of offset zero. Only affects how addresses are printed.
  pub origin: Address,
  pub policy: UnrecognizedPolicy,
}

impl Default for DisassemblerConfig {
  fn default() -> DisassemblerConfig {
    DisassemblerConfig {
      origin: Address::from_bits(PROGRAM_START),
      policy: UnrecognizedPolicy::default(),
    }
  }
}


/// One successfully decoded word.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Decoded {
  pub offset     : usize,
  pub opcode     : Opcode,
  pub instruction: Instruction,
}

impl Decoded {
  /// Where this instruction sits once the image is loaded at `origin`.
  pub fn address(&self, origin: Address) -> Address {
    origin + self.offset as AddressNumberType
  }
}


/// A validated program image: non-empty and a whole number of instructions long.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Program {
  bytes: Vec<u8>
}

impl Program {

  pub fn new(bytes: Vec<u8>) -> Result<Program, ImageError> {
    match bytes.len() {
      0 => Err(ImageError::Empty),
      len if len % INSTRUCTION_SIZE != 0 => Err(ImageError::OddLength(len)),
      len => {
        if len > PROGRAM_SPACE {
          warn!(
            "Image is {} bytes, more than the {} bytes available above 0x{:03X}.",
            len, PROGRAM_SPACE, PROGRAM_START
          );
        }
        debug!("Loaded a {} byte image ({} instructions).", len, len / INSTRUCTION_SIZE);
        Ok(Program { bytes })
      }
    }
  }

  pub fn bytes(&self) -> &[u8] {
    &self.bytes
  }

  pub fn instruction_count(&self) -> usize {
    self.bytes.len() / INSTRUCTION_SIZE
  }

  /// Starts a fresh pass from offset zero. Passes are independent of one another.
  pub fn disassemble(&self, config: &DisassemblerConfig) -> Disassembler<'_> {
    Disassembler::new(&self.bytes, config.policy)
  }
}


/**
  A single forward pass over a buffer, yielding one item per word. Under
  `UnrecognizedPolicy::Halt` the first failure is the last item. A trailing odd byte or a
  bounds failure always ends the pass, whatever the policy.
*/
pub struct Disassembler<'a> {
  buffer  : &'a [u8],
  offset  : usize,
  policy  : UnrecognizedPolicy,
  finished: bool,
}

impl<'a> Disassembler<'a> {

  /// A pass over an unvalidated buffer. An odd trailing byte is reported as
  /// `DecodeError::Truncated` when the pass reaches it.
  pub fn new(buffer: &'a [u8], policy: UnrecognizedPolicy) -> Disassembler<'a> {
    Disassembler {
      buffer,
      offset: 0,
      policy,
      finished: false,
    }
  }

  /// The offset the next item will be decoded from.
  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn is_finished(&self) -> bool {
    self.finished || self.offset >= self.buffer.len()
  }
}

impl<'a> Iterator for Disassembler<'a> {
  type Item = Result<Decoded, DecodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.is_finished() {
      return None;
    }

    match decode_at(self.buffer, self.offset) {

      Ok((instruction, next)) => {
        let decoded = Decoded {
          offset: self.offset,
          opcode: encode_instruction(&instruction),
          instruction
        };
        #[cfg(feature = "trace_decoding")]
        trace!("0x{:04X}: {} {}", decoded.offset, decoded.opcode, decoded.instruction);
        self.offset = next;
        Some(Ok(decoded))
      }

      Err(error) => {
        match (self.policy, error.is_recoverable()) {
          (UnrecognizedPolicy::Continue, true) => {
            debug!("Skipping: {}", error);
            self.offset += INSTRUCTION_SIZE;
          }
          _ => {
            debug!("Halting: {}", error);
            self.finished = true;
          }
        }
        Some(Err(error))
      }

    } // end match decode_at
  }
}

impl<'a> FusedIterator for Disassembler<'a> {}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::operand::Register;

  fn run(bytes: &[u8], policy: UnrecognizedPolicy) -> Vec<Result<Decoded, DecodeError>> {
    Disassembler::new(bytes, policy).collect()
  }

  fn instructions(bytes: &[u8]) -> Vec<Instruction> {
    run(bytes, UnrecognizedPolicy::Halt)
      .into_iter()
      .filter_map(Result::ok)
      .map(|d| d.instruction)
      .collect()
  }

  #[test]
  fn clear_screen(){
    let mut pass = Disassembler::new(&[0x00, 0xE0], UnrecognizedPolicy::Halt);
    let first = pass.next();
    assert_eq!(
      first,
      Some(Ok(Decoded { offset: 0, opcode: Opcode(0x00E0), instruction: Instruction::ClearScreen }))
    );
    assert_eq!(pass.offset(), 2);
    assert_eq!(pass.next(), None);
  }

  #[test]
  fn load_immediate(){
    assert_eq!(
      instructions(&[0x61, 0x42]),
      vec![Instruction::LoadImmediate { x: Register::from_nibble(1), byte: 0x42 }]
    );
  }

  #[test]
  fn load_index(){
    assert_eq!(
      instructions(&[0xA2, 0x34]),
      vec![Instruction::LoadIndex { address: Address::from_bits(0x234) }]
    );
  }

  #[test]
  fn halts_after_first_unrecognized(){
    let items = run(&[0x61, 0x42, 0x00, 0xFF, 0x00, 0xE0], UnrecognizedPolicy::Halt);
    assert_eq!(items.len(), 2);
    assert_eq!(
      items[0],
      Ok(Decoded {
        offset: 0,
        opcode: Opcode(0x6142),
        instruction: Instruction::LoadImmediate { x: Register::from_nibble(1), byte: 0x42 }
      })
    );
    assert_eq!(items[1], Err(DecodeError::Unrecognized { offset: 2, bytes: [0x00, 0xFF] }));
  }

  #[test]
  fn unrecognized_register_form(){
    assert_eq!(
      run(&[0x83, 0x18], UnrecognizedPolicy::Halt),
      vec![Err(DecodeError::Unrecognized { offset: 0, bytes: [0x83, 0x18] })]
    );
  }

  #[test]
  fn continue_policy_skips_unrecognized(){
    let items = run(&[0x83, 0x18, 0x00, 0xE0, 0xF0, 0x29], UnrecognizedPolicy::Continue);
    assert_eq!(items.len(), 3);
    assert!(items[0].is_err());
    assert_eq!(items[1].as_ref().map(|d| d.instruction), Ok(Instruction::ClearScreen));
    assert_eq!(items[2], Err(DecodeError::Unrecognized { offset: 4, bytes: [0xF0, 0x29] }));
  }

  #[test]
  fn truncated_tail_ends_every_pass(){
    for &policy in [UnrecognizedPolicy::Halt, UnrecognizedPolicy::Continue].iter() {
      let items = run(&[0x00, 0xEE, 0x12], policy);
      assert_eq!(items.len(), 2);
      assert_eq!(items[1], Err(DecodeError::Truncated { offset: 2, byte: 0x12 }));
    }
  }

  #[test]
  fn passes_restart_from_zero(){
    let program = Program::new(vec![0x12, 0x00, 0x00, 0xE0]).unwrap();
    let config  = DisassemblerConfig::default();
    let first : Vec<_> = program.disassemble(&config).collect();
    let second: Vec<_> = program.disassemble(&config).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
  }

  #[test]
  fn image_validation(){
    assert_eq!(Program::new(vec![]), Err(ImageError::Empty));
    assert_eq!(Program::new(vec![0x00, 0xE0, 0x12]), Err(ImageError::OddLength(3)));
    let program = Program::new(vec![0x00, 0xE0]).unwrap();
    assert_eq!(program.instruction_count(), 1);
    assert_eq!(program.bytes(), &[0x00, 0xE0]);
  }

  #[test]
  fn oversized_images_are_accepted(){
    let program = Program::new(vec![0x00; PROGRAM_SPACE + 2]);
    assert!(program.is_ok());
  }

  #[test]
  fn addresses_follow_origin(){
    let decoded = Decoded { offset: 6, opcode: Opcode(0x00E0), instruction: Instruction::ClearScreen };
    assert_eq!(decoded.address(DisassemblerConfig::default().origin).value(), 0x206);
    assert_eq!(decoded.address(Address::from_bits(0)).value(), 0x006);
  }

  #[test]
  fn passes_share_a_program_across_threads(){
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Program>();
    assert_send_sync::<Decoded>();

    let program = std::sync::Arc::new(Program::new(vec![0x61, 0x42, 0xA2, 0x34]).unwrap());
    let handles: Vec<_> = (0..4).map(|_| {
      let program = program.clone();
      std::thread::spawn(move || {
        program.disassemble(&DisassemblerConfig::default()).filter(Result::is_ok).count()
      })
    }).collect();
    for handle in handles {
      assert_eq!(handle.join().unwrap(), 2);
    }
  }
}
