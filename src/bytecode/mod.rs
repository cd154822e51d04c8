/*!

  The machine uses a 16 bit big-endian instruction word. Every instruction is exactly one
  word, and a program image is a flat sequence of words starting at offset zero. The word
  splits into four nibbles; the top nibble selects an instruction group and the remaining
  twelve bits hold operands, sometimes together with a sub-opcode:

  ```text
    Address form:   [group1:4][Address:12]
    Immediate form: [group1:4][X:4][Byte:8]
    Register form:  [group1:4][X:4][Y:4][N:4]
  ```

  Unlike a bytecode that stores only an opcode byte and leaves operand layout to the reader,
  a decoded instruction here is an enum with one variant per operation, each holding its own
  operand fields. An `Instruction` is a few bytes, and decoded instructions are produced one
  at a time and handed to the caller, so nothing is gained by packing them.

  Three textual forms exist for an instruction:

  ```text
    `0x6142`                             the raw word (`Opcode`'s `Display`)
    `LoadImmediate(V1, 0x42)`            the assembly form (`Instruction`'s `Display`)
    `Load value 0x42 into register v[1]` the description (`crate::render::describe`)
  ```

  Only the assembly form can be parsed back; see `assembly`.

*/

mod assembly;
mod binary;
mod instruction;

pub use assembly::{assemble, parse_assembly, parse_line};
pub use binary::{decode_at, encode_instruction, read_opcode, try_decode_instruction};
pub use instruction::{Instruction, KeyOp, MiscOp, Operands, Operation, RegisterOp, Shape};
