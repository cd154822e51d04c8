/*!
  The raw 16 bit instruction word and its fields. The four nibbles of a word are named by
  position:

  ```text
    [group1:4][group2:4][group3:4][group4:4]
     bits 15-12  11-8     7-4      3-0
  ```

  `group1` is the primary discriminator. The operand views overlap the lower three groups:

  ```text
    X   = group2              (register)
    Y   = group3              (register)
    N   = group4              (count or sub-opcode)
    KK  = group3 ‖ group4     (immediate byte or sub-opcode)
    NNN = group2 ‖ group3 ‖ group4   (address)
  ```
*/

use std::fmt::{Display, Formatter};

use crate::operand::{Address, Register};

/// The width of one instruction in bytes.
pub const INSTRUCTION_SIZE: usize = 2;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Opcode(pub u16);

impl Opcode {
  /// Big-endian: the first byte occupies bits 8-15.
  pub fn from_bytes(high: u8, low: u8) -> Opcode {
    Opcode(((high as u16) << 8) | low as u16)
  }

  pub fn bytes(&self) -> [u8; 2] {
    self.0.to_be_bytes()
  }

  pub fn group1(&self) -> u8 { ((self.0 >> 12) & 0xF) as u8 }
  pub fn group2(&self) -> u8 { ((self.0 >>  8) & 0xF) as u8 }
  pub fn group3(&self) -> u8 { ((self.0 >>  4) & 0xF) as u8 }
  pub fn group4(&self) -> u8 { ( self.0        & 0xF) as u8 }

  pub fn x(&self) -> Register {
    Register::from_nibble(self.group2())
  }

  pub fn y(&self) -> Register {
    Register::from_nibble(self.group3())
  }

  /// The low nibble.
  pub fn n(&self) -> u8 {
    self.group4()
  }

  /// The low byte.
  pub fn kk(&self) -> u8 {
    (self.0 & 0xFF) as u8
  }

  pub fn nnn(&self) -> Address {
    Address::from_bits(self.0)
  }

  // region Field packing

  /// `[group1][NNN]`
  pub fn pack_address(group1: u8, address: Address) -> Opcode {
    Opcode(((group1 as u16 & 0xF) << 12) | address.value())
  }

  /// `[group1][X][KK]`
  pub fn pack_xkk(group1: u8, x: Register, kk: u8) -> Opcode {
    Opcode(((group1 as u16 & 0xF) << 12) | ((x.idx() as u16) << 8) | kk as u16)
  }

  /// `[group1][X][Y][N]`
  pub fn pack_xyn(group1: u8, x: Register, y: Register, n: u8) -> Opcode {
    Opcode(
      ((group1 as u16 & 0xF) << 12) |
      ((x.idx()   as u16)    <<  8) |
      ((y.idx()   as u16)    <<  4) |
      (n          as u16 & 0xF)
    )
  }

  // endregion
}

impl Display for Opcode {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "0x{:04X}", self.0)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn high_byte_takes_a_full_byte_shift(){
    assert_eq!(Opcode::from_bytes(0x61, 0x42), Opcode(0x6142));
    assert_eq!(Opcode::from_bytes(0x00, 0xE0), Opcode(0x00E0));
    assert_eq!(Opcode::from_bytes(0xFF, 0xFF), Opcode(0xFFFF));
    assert_eq!(Opcode(0xA234).bytes(), [0xA2, 0x34]);
  }

  #[test]
  fn nibble_groups(){
    let op = Opcode(0xD5A7);
    assert_eq!(op.group1(), 0xD);
    assert_eq!(op.group2(), 0x5);
    assert_eq!(op.group3(), 0xA);
    assert_eq!(op.group4(), 0x7);
    assert_eq!(op.x().idx(), 0x5);
    assert_eq!(op.y().idx(), 0xA);
    assert_eq!(op.n(), 0x7);
    assert_eq!(op.kk(), 0xA7);
    assert_eq!(op.nnn().value(), 0x5A7);
  }

  #[test]
  fn packing(){
    let x = Register::from_nibble(0x3);
    let y = Register::from_nibble(0xC);
    assert_eq!(Opcode::pack_address(0xA, Address::from_bits(0x234)), Opcode(0xA234));
    assert_eq!(Opcode::pack_xkk(0x6, x, 0x42), Opcode(0x6342));
    assert_eq!(Opcode::pack_xyn(0x8, x, y, 0xE), Opcode(0x83CE));
  }

  #[test]
  fn display(){
    assert_eq!(Opcode(0x00E0).to_string(), "0x00E0");
    assert_eq!(Opcode(0xa2f0).to_string(), "0xA2F0");
  }
}
