/*!
  This module is responsible for the encoding and decoding of binary instructions.

  Decoding is a two level discrimination. The two whole-word literals `00E0` and `00EE` are
  matched first, since they share `group1 == 0` with the machine code call `0NNN`. Everything
  else dispatches on `group1`, and the `5`, `8`, `9`, `E`, and `F` groups dispatch a second
  time on `group4` or the low byte.
*/
use std::convert::TryFrom;

use super::{Instruction, KeyOp, MiscOp, RegisterOp};
use crate::error::DecodeError;
use crate::opcode::{Opcode, INSTRUCTION_SIZE};

const CLEAR_SCREEN: u16 = 0x00E0;
const RETURN      : u16 = 0x00EE;

/**
  Decodes a single word. `None` means the word matches no entry of the decode table.

  The `00NN` page holds only the two literals above; any other word there is unrecognized
  rather than a call to a machine code routine in the first 256 bytes.
*/
pub fn try_decode_instruction(opcode: Opcode) -> Option<Instruction> {
  match opcode.0 {
    CLEAR_SCREEN => return Some(Instruction::ClearScreen),
    RETURN       => return Some(Instruction::Return),
    _            => {}
  }

  let x = opcode.x();
  let y = opcode.y();

  let instruction =
    match opcode.group1() {
      0x0 if opcode.group2() == 0 => return None,
      0x0 => Instruction::CallNative { address: opcode.nnn() },
      0x1 => Instruction::Jump       { address: opcode.nnn() },
      0x2 => Instruction::Call       { address: opcode.nnn() },
      0x3 => Instruction::SkipEqImmediate { x, byte: opcode.kk() },
      0x4 => Instruction::SkipNeImmediate { x, byte: opcode.kk() },
      0x5 => match opcode.n() {
        0 => Instruction::SkipEqRegister { x, y },
        _ => return None
      },
      0x6 => Instruction::LoadImmediate { x, byte: opcode.kk() },
      0x7 => Instruction::AddImmediate  { x, byte: opcode.kk() },
      0x8 => {
        let op = RegisterOp::try_from(opcode.n()).ok()?;
        Instruction::from_register_op(op, x, y)
      },
      0x9 => match opcode.n() {
        0 => Instruction::SkipNeRegister { x, y },
        _ => return None
      },
      0xA => Instruction::LoadIndex  { address: opcode.nnn() },
      0xB => Instruction::JumpOffset { address: opcode.nnn() },
      0xC => Instruction::Random { x, mask: opcode.kk() },
      0xD => Instruction::Draw   { x, y, height: opcode.n() },
      0xE => match KeyOp::try_from(opcode.kk()).ok()? {
        KeyOp::Pressed    => Instruction::SkipKeyPressed { x },
        KeyOp::NotPressed => Instruction::SkipKeyNotPressed { x },
      },
      0xF => match MiscOp::try_from(opcode.kk()).ok()? {
        MiscOp::ReadDelay => Instruction::ReadDelay { x },
        MiscOp::WaitKey   => Instruction::WaitKey { x },
        MiscOp::SetDelay  => Instruction::SetDelay { x },
        MiscOp::AddIndex  => Instruction::AddIndex { x },
      },
      _ => return None
    };

  Some(instruction)
}

/**
  Decodes the instruction at `offset` in `buffer`, returning it with the offset of the next
  instruction. Never reads past the end of `buffer`.
*/
pub fn decode_at(buffer: &[u8], offset: usize) -> Result<(Instruction, usize), DecodeError> {
  let opcode = read_opcode(buffer, offset)?;
  match try_decode_instruction(opcode) {
    Some(instruction) => Ok((instruction, offset + INSTRUCTION_SIZE)),
    None              => Err(DecodeError::Unrecognized { offset, bytes: opcode.bytes() })
  }
}

/// Reads the word at `offset`, checking alignment and bounds first.
pub fn read_opcode(buffer: &[u8], offset: usize) -> Result<Opcode, DecodeError> {
  if offset % INSTRUCTION_SIZE != 0 {
    return Err(DecodeError::Misaligned { offset });
  }
  match (buffer.get(offset), buffer.get(offset + 1)) {
    (Some(high), Some(low)) => Ok(Opcode::from_bytes(*high, *low)),
    (Some(byte), None)      => Err(DecodeError::Truncated { offset, byte: *byte }),
    _                       => Err(DecodeError::OutOfBounds { offset, len: buffer.len() })
  }
}

/// Encodes the instruction into its binary word. This is the inverse of
/// `try_decode_instruction` on every word that function accepts.
pub fn encode_instruction(instruction: &Instruction) -> Opcode {
  use Instruction::*;
  match *instruction {
    ClearScreen => Opcode(CLEAR_SCREEN),
    Return      => Opcode(RETURN),

    CallNative { address } => Opcode::pack_address(0x0, address),
    Jump       { address } => Opcode::pack_address(0x1, address),
    Call       { address } => Opcode::pack_address(0x2, address),
    LoadIndex  { address } => Opcode::pack_address(0xA, address),
    JumpOffset { address } => Opcode::pack_address(0xB, address),

    SkipEqImmediate { x, byte } => Opcode::pack_xkk(0x3, x, byte),
    SkipNeImmediate { x, byte } => Opcode::pack_xkk(0x4, x, byte),
    LoadImmediate   { x, byte } => Opcode::pack_xkk(0x6, x, byte),
    AddImmediate    { x, byte } => Opcode::pack_xkk(0x7, x, byte),
    Random          { x, mask } => Opcode::pack_xkk(0xC, x, mask),

    SkipEqRegister { x, y } => Opcode::pack_xyn(0x5, x, y, 0),
    SkipNeRegister { x, y } => Opcode::pack_xyn(0x9, x, y, 0),
    Assign         { x, y } => Opcode::pack_xyn(0x8, x, y, RegisterOp::Assign.into()),
    Or             { x, y } => Opcode::pack_xyn(0x8, x, y, RegisterOp::Or.into()),
    And            { x, y } => Opcode::pack_xyn(0x8, x, y, RegisterOp::And.into()),
    Xor            { x, y } => Opcode::pack_xyn(0x8, x, y, RegisterOp::Xor.into()),
    AddCarry       { x, y } => Opcode::pack_xyn(0x8, x, y, RegisterOp::AddCarry.into()),
    SubBorrow      { x, y } => Opcode::pack_xyn(0x8, x, y, RegisterOp::SubBorrow.into()),
    ShiftRight     { x, y } => Opcode::pack_xyn(0x8, x, y, RegisterOp::ShiftRight.into()),
    SubReverse     { x, y } => Opcode::pack_xyn(0x8, x, y, RegisterOp::SubReverse.into()),
    ShiftLeft      { x, y } => Opcode::pack_xyn(0x8, x, y, RegisterOp::ShiftLeft.into()),

    Draw { x, y, height } => Opcode::pack_xyn(0xD, x, y, height),

    SkipKeyPressed    { x } => Opcode::pack_xkk(0xE, x, KeyOp::Pressed.into()),
    SkipKeyNotPressed { x } => Opcode::pack_xkk(0xE, x, KeyOp::NotPressed.into()),
    ReadDelay         { x } => Opcode::pack_xkk(0xF, x, MiscOp::ReadDelay.into()),
    WaitKey           { x } => Opcode::pack_xkk(0xF, x, MiscOp::WaitKey.into()),
    SetDelay          { x } => Opcode::pack_xkk(0xF, x, MiscOp::SetDelay.into()),
    AddIndex          { x } => Opcode::pack_xkk(0xF, x, MiscOp::AddIndex.into()),
  }
}
