use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::operand::{Address, Register};

/**
  Operations of the instruction set, without operands. The variant names double as the
  mnemonic names of the assembly form, so renaming a variant changes the text format.

  The comment on each variant is the opcode pattern it is decoded from.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter,
  Clone,        Copy,          Eq,         PartialEq,  Debug, Hash
)]
pub enum Operation {
  ClearScreen,        // 00E0
  Return,             // 00EE
  CallNative,         // 0NNN
  Jump,               // 1NNN
  Call,               // 2NNN
  SkipEqImmediate,    // 3XKK
  SkipNeImmediate,    // 4XKK
  SkipEqRegister,     // 5XY0
  LoadImmediate,      // 6XKK
  AddImmediate,       // 7XKK
  Assign,             // 8XY0
  Or,                 // 8XY1
  And,                // 8XY2
  Xor,                // 8XY3
  AddCarry,           // 8XY4
  SubBorrow,          // 8XY5
  ShiftRight,         // 8XY6
  SubReverse,         // 8XY7
  ShiftLeft,          // 8XYE
  SkipNeRegister,     // 9XY0
  LoadIndex,          // ANNN
  JumpOffset,         // BNNN
  Random,             // CXKK
  Draw,               // DXYN
  SkipKeyPressed,     // EX9E
  SkipKeyNotPressed,  // EXA1
  ReadDelay,          // FX07
  WaitKey,            // FX0A
  SetDelay,           // FX15
  AddIndex,           // FX1E
}

/// The operand layouts an operation can take.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Shape {
  Nullary,
  Address,
  RegisterByte,
  RegisterPair,
  Sprite,
  Register,
}

impl Operation {
  pub fn shape(&self) -> Shape {
    use Operation::*;
    match self {
      ClearScreen | Return => Shape::Nullary,

      | CallNative
      | Jump
      | Call
      | LoadIndex
      | JumpOffset => Shape::Address,

      | SkipEqImmediate
      | SkipNeImmediate
      | LoadImmediate
      | AddImmediate
      | Random => Shape::RegisterByte,

      | SkipEqRegister
      | SkipNeRegister
      | Assign
      | Or
      | And
      | Xor
      | AddCarry
      | SubBorrow
      | ShiftRight
      | SubReverse
      | ShiftLeft => Shape::RegisterPair,

      Draw => Shape::Sprite,

      | SkipKeyPressed
      | SkipKeyNotPressed
      | ReadDelay
      | WaitKey
      | SetDelay
      | AddIndex => Shape::Register,
    }
  }

  /// The operand list the assembler expects, for error messages.
  pub fn signature(&self) -> &'static str {
    match self.shape() {
      Shape::Nullary      => "()",
      Shape::Address      => "(NNN)",
      Shape::RegisterByte => "(VX, KK)",
      Shape::RegisterPair => "(VX, VY)",
      Shape::Sprite       => "(VX, VY, N)",
      Shape::Register     => "(VX)",
    }
  }
}


// region Sub-table selectors

/// `8XY?`: the low nibble picks the register-register operation.
#[derive(TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, PartialEq, Debug, Hash)]
#[repr(u8)]
pub enum RegisterOp {
  Assign     = 0x0,
  Or         = 0x1,
  And        = 0x2,
  Xor        = 0x3,
  AddCarry   = 0x4,
  SubBorrow  = 0x5,
  ShiftRight = 0x6,
  SubReverse = 0x7,
  ShiftLeft  = 0xE,
}

/// `EX??`: the low byte picks the key test.
#[derive(TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, PartialEq, Debug, Hash)]
#[repr(u8)]
pub enum KeyOp {
  Pressed    = 0x9E,
  NotPressed = 0xA1,
}

/// `FX??`: the low byte picks the timer/key/index operation. Only these four are decoded.
#[derive(TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, PartialEq, Debug, Hash)]
#[repr(u8)]
pub enum MiscOp {
  ReadDelay = 0x07,
  WaitKey   = 0x0A,
  SetDelay  = 0x15,
  AddIndex  = 0x1E,
}

// endregion


/// The operands of an instruction, grouped by `Shape`.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Operands {
  Nullary,
  Address(Address),
  RegisterByte(Register, u8),
  RegisterPair(Register, Register),
  Sprite(Register, Register, u8),
  Register(Register),
}

impl Operands {
  pub fn shape(&self) -> Shape {
    match self {
      Operands::Nullary            => Shape::Nullary,
      Operands::Address(_)         => Shape::Address,
      Operands::RegisterByte(..)   => Shape::RegisterByte,
      Operands::RegisterPair(..)   => Shape::RegisterPair,
      Operands::Sprite(..)         => Shape::Sprite,
      Operands::Register(_)        => Shape::Register,
    }
  }
}

impl Display for Operands {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Operands::Nullary                  => Ok(()),
      Operands::Address(address)         => write!(f, "({})", address),
      Operands::RegisterByte(x, byte)    => write!(f, "({}, 0x{:02X})", x, byte),
      Operands::RegisterPair(x, y)       => write!(f, "({}, {})", x, y),
      Operands::Sprite(x, y, height)     => write!(f, "({}, {}, 0x{:X})", x, y, height),
      Operands::Register(x)              => write!(f, "({})", x),
    }
  }
}


/**
  A decoded instruction: one variant per operation, each holding exactly the operands that
  operation takes. Register operands are labels only.
*/
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Instruction {
  ClearScreen,
  Return,
  CallNative        { address: Address },
  Jump              { address: Address },
  Call              { address: Address },
  SkipEqImmediate   { x: Register, byte: u8 },
  SkipNeImmediate   { x: Register, byte: u8 },
  SkipEqRegister    { x: Register, y: Register },
  LoadImmediate     { x: Register, byte: u8 },
  AddImmediate      { x: Register, byte: u8 },
  Assign            { x: Register, y: Register },
  Or                { x: Register, y: Register },
  And               { x: Register, y: Register },
  Xor               { x: Register, y: Register },
  AddCarry          { x: Register, y: Register },
  SubBorrow         { x: Register, y: Register },
  ShiftRight        { x: Register, y: Register },
  SubReverse        { x: Register, y: Register },
  ShiftLeft         { x: Register, y: Register },
  SkipNeRegister    { x: Register, y: Register },
  LoadIndex         { address: Address },
  JumpOffset        { address: Address },
  Random            { x: Register, mask: u8 },
  /// `height` is the sprite height in bytes. Only its low nibble is meaningful; build through
  /// `Instruction::new` to have a wider value rejected instead.
  Draw              { x: Register, y: Register, height: u8 },
  SkipKeyPressed    { x: Register },
  SkipKeyNotPressed { x: Register },
  ReadDelay         { x: Register },
  WaitKey           { x: Register },
  SetDelay          { x: Register },
  AddIndex          { x: Register },
}

impl Instruction {

  pub fn operation(&self) -> Operation {
    match self {
      Instruction::ClearScreen              => Operation::ClearScreen,
      Instruction::Return                   => Operation::Return,
      Instruction::CallNative { .. }        => Operation::CallNative,
      Instruction::Jump { .. }              => Operation::Jump,
      Instruction::Call { .. }              => Operation::Call,
      Instruction::SkipEqImmediate { .. }   => Operation::SkipEqImmediate,
      Instruction::SkipNeImmediate { .. }   => Operation::SkipNeImmediate,
      Instruction::SkipEqRegister { .. }    => Operation::SkipEqRegister,
      Instruction::LoadImmediate { .. }     => Operation::LoadImmediate,
      Instruction::AddImmediate { .. }      => Operation::AddImmediate,
      Instruction::Assign { .. }            => Operation::Assign,
      Instruction::Or { .. }                => Operation::Or,
      Instruction::And { .. }               => Operation::And,
      Instruction::Xor { .. }               => Operation::Xor,
      Instruction::AddCarry { .. }          => Operation::AddCarry,
      Instruction::SubBorrow { .. }         => Operation::SubBorrow,
      Instruction::ShiftRight { .. }        => Operation::ShiftRight,
      Instruction::SubReverse { .. }        => Operation::SubReverse,
      Instruction::ShiftLeft { .. }         => Operation::ShiftLeft,
      Instruction::SkipNeRegister { .. }    => Operation::SkipNeRegister,
      Instruction::LoadIndex { .. }         => Operation::LoadIndex,
      Instruction::JumpOffset { .. }        => Operation::JumpOffset,
      Instruction::Random { .. }            => Operation::Random,
      Instruction::Draw { .. }              => Operation::Draw,
      Instruction::SkipKeyPressed { .. }    => Operation::SkipKeyPressed,
      Instruction::SkipKeyNotPressed { .. } => Operation::SkipKeyNotPressed,
      Instruction::ReadDelay { .. }         => Operation::ReadDelay,
      Instruction::WaitKey { .. }           => Operation::WaitKey,
      Instruction::SetDelay { .. }          => Operation::SetDelay,
      Instruction::AddIndex { .. }          => Operation::AddIndex,
    }
  }

  pub fn operands(&self) -> Operands {
    use Instruction::*;
    match *self {
      ClearScreen | Return => Operands::Nullary,

      | CallNative { address }
      | Jump       { address }
      | Call       { address }
      | LoadIndex  { address }
      | JumpOffset { address } => Operands::Address(address),

      | SkipEqImmediate { x, byte }
      | SkipNeImmediate { x, byte }
      | LoadImmediate   { x, byte }
      | AddImmediate    { x, byte }
      | Random          { x, mask: byte } => Operands::RegisterByte(x, byte),

      | SkipEqRegister { x, y }
      | SkipNeRegister { x, y }
      | Assign         { x, y }
      | Or             { x, y }
      | And            { x, y }
      | Xor            { x, y }
      | AddCarry       { x, y }
      | SubBorrow      { x, y }
      | ShiftRight     { x, y }
      | SubReverse     { x, y }
      | ShiftLeft      { x, y } => Operands::RegisterPair(x, y),

      Draw { x, y, height } => Operands::Sprite(x, y, height & 0xF),

      | SkipKeyPressed    { x }
      | SkipKeyNotPressed { x }
      | ReadDelay         { x }
      | WaitKey           { x }
      | SetDelay          { x }
      | AddIndex          { x } => Operands::Register(x),
    }
  }

  /**
    Assembles an instruction from its parts. Returns `None` if the operands do not have the
    shape the operation requires, or if a sprite height does not fit in a nibble.
  */
  pub fn new(operation: Operation, operands: Operands) -> Option<Instruction> {
    use Operation as Op;
    let instruction =
      match (operation, operands) {
        (Op::ClearScreen, Operands::Nullary) => Instruction::ClearScreen,
        (Op::Return,      Operands::Nullary) => Instruction::Return,

        (Op::CallNative, Operands::Address(address)) => Instruction::CallNative { address },
        (Op::Jump,       Operands::Address(address)) => Instruction::Jump { address },
        (Op::Call,       Operands::Address(address)) => Instruction::Call { address },
        (Op::LoadIndex,  Operands::Address(address)) => Instruction::LoadIndex { address },
        (Op::JumpOffset, Operands::Address(address)) => Instruction::JumpOffset { address },

        (Op::SkipEqImmediate, Operands::RegisterByte(x, byte)) => Instruction::SkipEqImmediate { x, byte },
        (Op::SkipNeImmediate, Operands::RegisterByte(x, byte)) => Instruction::SkipNeImmediate { x, byte },
        (Op::LoadImmediate,   Operands::RegisterByte(x, byte)) => Instruction::LoadImmediate { x, byte },
        (Op::AddImmediate,    Operands::RegisterByte(x, byte)) => Instruction::AddImmediate { x, byte },
        (Op::Random,          Operands::RegisterByte(x, mask)) => Instruction::Random { x, mask },

        (Op::SkipEqRegister, Operands::RegisterPair(x, y)) => Instruction::SkipEqRegister { x, y },
        (Op::SkipNeRegister, Operands::RegisterPair(x, y)) => Instruction::SkipNeRegister { x, y },
        (Op::Assign,         Operands::RegisterPair(x, y)) => Instruction::Assign { x, y },
        (Op::Or,             Operands::RegisterPair(x, y)) => Instruction::Or { x, y },
        (Op::And,            Operands::RegisterPair(x, y)) => Instruction::And { x, y },
        (Op::Xor,            Operands::RegisterPair(x, y)) => Instruction::Xor { x, y },
        (Op::AddCarry,       Operands::RegisterPair(x, y)) => Instruction::AddCarry { x, y },
        (Op::SubBorrow,      Operands::RegisterPair(x, y)) => Instruction::SubBorrow { x, y },
        (Op::ShiftRight,     Operands::RegisterPair(x, y)) => Instruction::ShiftRight { x, y },
        (Op::SubReverse,     Operands::RegisterPair(x, y)) => Instruction::SubReverse { x, y },
        (Op::ShiftLeft,      Operands::RegisterPair(x, y)) => Instruction::ShiftLeft { x, y },

        (Op::Draw, Operands::Sprite(x, y, height)) if height <= 0xF => Instruction::Draw { x, y, height },

        (Op::SkipKeyPressed,    Operands::Register(x)) => Instruction::SkipKeyPressed { x },
        (Op::SkipKeyNotPressed, Operands::Register(x)) => Instruction::SkipKeyNotPressed { x },
        (Op::ReadDelay,         Operands::Register(x)) => Instruction::ReadDelay { x },
        (Op::WaitKey,           Operands::Register(x)) => Instruction::WaitKey { x },
        (Op::SetDelay,          Operands::Register(x)) => Instruction::SetDelay { x },
        (Op::AddIndex,          Operands::Register(x)) => Instruction::AddIndex { x },

        _ => return None
      };
    Some(instruction)
  }

  /// The 8XY? variant selected by `op`.
  pub fn from_register_op(op: RegisterOp, x: Register, y: Register) -> Instruction {
    match op {
      RegisterOp::Assign     => Instruction::Assign { x, y },
      RegisterOp::Or         => Instruction::Or { x, y },
      RegisterOp::And        => Instruction::And { x, y },
      RegisterOp::Xor        => Instruction::Xor { x, y },
      RegisterOp::AddCarry   => Instruction::AddCarry { x, y },
      RegisterOp::SubBorrow  => Instruction::SubBorrow { x, y },
      RegisterOp::ShiftRight => Instruction::ShiftRight { x, y },
      RegisterOp::SubReverse => Instruction::SubReverse { x, y },
      RegisterOp::ShiftLeft  => Instruction::ShiftLeft { x, y },
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}{}", self.operation(), self.operands())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;
  use strum::IntoEnumIterator;

  fn v(idx: u8) -> Register {
    Register::from_nibble(idx)
  }

  #[test]
  fn mnemonic_form(){
    assert_eq!(Instruction::ClearScreen.to_string(), "ClearScreen");
    assert_eq!(
      Instruction::LoadImmediate { x: v(1), byte: 0x42 }.to_string(),
      "LoadImmediate(V1, 0x42)"
    );
    assert_eq!(
      Instruction::LoadIndex { address: Address::from_bits(0x234) }.to_string(),
      "LoadIndex(0x234)"
    );
    assert_eq!(
      Instruction::Draw { x: v(0xA), y: v(0xB), height: 5 }.to_string(),
      "Draw(VA, VB, 0x5)"
    );
    assert_eq!(Instruction::WaitKey { x: v(0xF) }.to_string(), "WaitKey(VF)");
    assert_eq!(Instruction::SubReverse { x: v(2), y: v(3) }.to_string(), "SubReverse(V2, V3)");
  }

  #[test]
  fn operation_names_parse_back(){
    for operation in Operation::iter() {
      let name: &'static str = operation.into();
      assert_eq!(Operation::from_str(name), Ok(operation));
    }
    assert!(Operation::from_str("Load").is_err());
  }

  #[test]
  fn parts_round_trip(){
    let samples = [
      Instruction::Return,
      Instruction::Call { address: Address::from_bits(0xFFF) },
      Instruction::Random { x: v(4), mask: 0x0F },
      Instruction::ShiftLeft { x: v(1), y: v(2) },
      Instruction::Draw { x: v(0), y: v(1), height: 0xF },
      Instruction::AddIndex { x: v(9) },
    ];
    for instruction in samples.iter() {
      assert_eq!(
        Instruction::new(instruction.operation(), instruction.operands()),
        Some(*instruction)
      );
      assert_eq!(instruction.operation().shape(), instruction.operands().shape());
    }
  }

  #[test]
  fn wrong_shape_is_rejected(){
    assert_eq!(Instruction::new(Operation::Jump, Operands::Register(v(1))), None);
    assert_eq!(Instruction::new(Operation::ClearScreen, Operands::Address(Address::from_bits(0))), None);
    assert_eq!(Instruction::new(Operation::Draw, Operands::Sprite(v(0), v(1), 0x10)), None);
  }

  #[test]
  fn register_op_covers_nine_forms(){
    use std::convert::TryFrom;
    let recognized: Vec<u8> = (0u8..16).filter(|n| RegisterOp::try_from(*n).is_ok()).collect();
    assert_eq!(recognized, vec![0, 1, 2, 3, 4, 5, 6, 7, 0xE]);
  }
}
