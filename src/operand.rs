//! Operand newtypes: a register index and a 12-bit address, with the textual forms used by
//! the mnemonic listing.

use std::fmt::{Display, Formatter};
use std::ops::Add;

pub type AddressNumberType = u16;

pub const REGISTER_COUNT: u8 = 16;
pub const ADDRESS_MASK  : AddressNumberType = 0x0FFF;

/// One of the sixteen general purpose registers `V0`..`VF`. Only ever a label; no register
/// storage exists anywhere in this crate.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Register(u8);

impl Register {
  /// Keeps the low nibble, so any nibble pulled out of an opcode is a valid register.
  pub fn from_nibble(nibble: u8) -> Register {
    Register(nibble & 0x0F)
  }

  /// `None` if `idx` does not name a register.
  pub fn new(idx: u8) -> Option<Register> {
    match idx < REGISTER_COUNT {
      true  => Some(Register(idx)),
      false => None
    }
  }

  pub fn idx(&self) -> u8 {
    self.0
  }
}

impl Display for Register {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "V{:X}", self.0)
  }
}


/// A location in the 4K address space, i.e. the `NNN` field of an opcode.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Address(AddressNumberType);

impl Address {
  /// Truncates to 12 bits.
  pub fn from_bits(bits: AddressNumberType) -> Address {
    Address(bits & ADDRESS_MASK)
  }

  /// `None` if `value` does not fit in 12 bits.
  pub fn new(value: AddressNumberType) -> Option<Address> {
    match value & !ADDRESS_MASK {
      0 => Some(Address(value)),
      _ => None
    }
  }

  pub fn value(&self) -> AddressNumberType {
    self.0
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "0x{:03X}", self.0)
  }
}

// Increment an address, wrapping inside the 12 bit space.
impl Add<AddressNumberType> for Address {
  type Output = Address;
  fn add(self, rhs: AddressNumberType) -> Address {
    Address::from_bits(self.0.wrapping_add(rhs))
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn register_display(){
    assert_eq!(Register::from_nibble(0x1).to_string(), "V1");
    assert_eq!(Register::from_nibble(0xF).to_string(), "VF");
  }

  #[test]
  fn register_bounds(){
    assert_eq!(Register::new(15).map(|r| r.idx()), Some(15));
    assert_eq!(Register::new(16), None);
    assert_eq!(Register::from_nibble(0x3A).idx(), 0xA);
  }

  #[test]
  fn address_display_is_three_digits(){
    assert_eq!(Address::from_bits(0x34).to_string(), "0x034");
    assert_eq!(Address::from_bits(0x234).to_string(), "0x234");
  }

  #[test]
  fn address_bounds(){
    assert_eq!(Address::new(0xFFF).map(|a| a.value()), Some(0xFFF));
    assert_eq!(Address::new(0x1000), None);
    assert_eq!(Address::from_bits(0xA234).value(), 0x234);
  }

  #[test]
  fn address_add_wraps(){
    assert_eq!((Address::from_bits(0xFFE) + 4).value(), 0x002);
    assert_eq!((Address::from_bits(0x200) + 2).value(), 0x202);
  }
}
