/*!
  The human readable textual form of an instruction is called assembly. This module parses
  the assembly form written by `Instruction`'s `Display` back into instructions, leaning on
  the `strum` derives of `Operation` for the names. One instruction per line:

  ```text
    LoadImmediate(V1, 0x42)   # comments run to the end of the line
    ClearScreen
  ```

  Registers are `V0`..`VF`, and every number is hexadecimal with a `0x` prefix.
*/

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nom::{
  IResult,
  branch::alt,
  bytes::complete::tag_no_case,
  character::complete::{
    alpha1,
    char as one_char,
    hex_digit1,
    one_of,
    space0
  },
  combinator::{all_consuming, map, map_opt, opt},
  multi::separated_list,
  sequence::{delimited, preceded, terminated, tuple}
};

use super::{encode_instruction, try_decode_instruction, Instruction, Operands, Operation, Shape};
use crate::error::AssemblyError;
use crate::operand::{Address, Register};

const COMMENT: char = '#';

/// An operand as written, before it is checked against the operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Token {
  Register(Register),
  Literal(u64)
}

impl Display for Token {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Token::Register(r) => write!(f, "{}", r),
      Token::Literal(v)  => write!(f, "0x{:X}", v),
    }
  }
}

// region Parsers

fn register_p(input: &str) -> IResult<&str, Token> {
  map_opt(
    preceded(one_of("vV"), one_of("0123456789abcdefABCDEF")),
    |digit: char| digit.to_digit(16).map(|n| Token::Register(Register::from_nibble(n as u8)))
  )(input)
}

/// Hex digits only, so the sole parse failure is overflow, which saturates for `fit` to report.
fn literal_p(input: &str) -> IResult<&str, Token> {
  map(
    preceded(tag_no_case("0x"), hex_digit1),
    |digits: &str| Token::Literal(u64::from_str_radix(digits, 16).unwrap_or(u64::MAX))
  )(input)
}

fn operand_list_p(input: &str) -> IResult<&str, Vec<Token>> {
  delimited(
    terminated(one_char('('), space0),
    separated_list(
      delimited(space0, one_char(','), space0),
      alt((register_p, literal_p))
    ),
    preceded(space0, one_char(')'))
  )(input)
}

/// `Name` or `Name(operand, ...)`, with nothing left over.
fn line_p(input: &str) -> IResult<&str, (&str, Option<Vec<Token>>)> {
  map(
    all_consuming(
      terminated(
        tuple((alpha1, space0, opt(operand_list_p))),
        space0
      )
    ),
    |(name, _, tokens)| (name, tokens)
  )(input)
}

// endregion

/// Checks that `value` fits in `bits` bits.
fn fit(line: usize, value: u64, bits: u32) -> Result<u64, AssemblyError> {
  match value >> bits {
    0 => Ok(value),
    _ => Err(AssemblyError::OutOfRange { line, value, bits })
  }
}

fn build_operands(line: usize, operation: Operation, tokens: &[Token])
  -> Result<Operands, AssemblyError>
{
  let operands =
    match (operation.shape(), tokens) {

      (Shape::Nullary, []) => Operands::Nullary,

      (Shape::Address, [Token::Literal(value)]) => {
        Operands::Address(Address::from_bits(fit(line, *value, 12)? as u16))
      }

      (Shape::RegisterByte, [Token::Register(x), Token::Literal(value)]) => {
        Operands::RegisterByte(*x, fit(line, *value, 8)? as u8)
      }

      (Shape::RegisterPair, [Token::Register(x), Token::Register(y)]) => {
        Operands::RegisterPair(*x, *y)
      }

      (Shape::Sprite, [Token::Register(x), Token::Register(y), Token::Literal(value)]) => {
        Operands::Sprite(*x, *y, fit(line, *value, 4)? as u8)
      }

      (Shape::Register, [Token::Register(x)]) => Operands::Register(*x),

      _ => {
        return Err(AssemblyError::WrongOperands {
          line,
          operation,
          expected: operation.signature(),
          given: tokens.iter().map(Token::to_string).collect::<Vec<String>>().join(", ")
        });
      }

    };
  Ok(operands)
}

/**
  Parses one source line. Blank and comment-only lines give `Ok(None)`. `line` is only used
  for error reporting.
*/
pub fn parse_line(line: usize, text: &str) -> Result<Option<Instruction>, AssemblyError> {
  let code =
    match text.find(COMMENT) {
      Some(idx) => &text[..idx],
      None      => text
    }.trim();

  if code.is_empty() {
    return Ok(None);
  }

  let (name, tokens) =
    match line_p(code) {
      Ok((_rest, parsed)) => parsed,
      Err(_e)             => return Err(AssemblyError::Syntax { line, text: code.to_string() })
    };

  let operation =
    Operation::from_str(name)
      .map_err(|_| AssemblyError::NotAnOperation { line, name: name.to_string() })?;

  let tokens   = tokens.unwrap_or_default();
  let operands = build_operands(line, operation, &tokens)?;

  let instruction =
    match Instruction::new(operation, operands) {
      Some(instruction) => instruction,
      None              => {
        return Err(AssemblyError::WrongOperands {
          line,
          operation,
          expected: operation.signature(),
          given: operands.to_string()
        });
      }
    };

  // A machine code call into the 00NN page encodes to a word that decodes as something else.
  match try_decode_instruction(encode_instruction(&instruction)) {
    Some(decoded) if decoded == instruction => Ok(Some(instruction)),
    _ => Err(AssemblyError::Unencodable { line, text: code.to_string() })
  }
}

/// Parses a whole source text, stopping at the first error.
pub fn parse_assembly(text: &str) -> Result<Vec<Instruction>, AssemblyError> {
  let mut instructions = vec![];
  for (idx, line) in text.lines().enumerate() {
    if let Some(instruction) = parse_line(idx + 1, line)? {
      instructions.push(instruction);
    }
  }
  Ok(instructions)
}

/// Parses a source text and encodes it into a big-endian program image.
pub fn assemble(text: &str) -> Result<Vec<u8>, AssemblyError> {
  let instructions = parse_assembly(text)?;
  Ok(
    instructions
      .iter()
      .flat_map(|instruction| encode_instruction(instruction).bytes().to_vec())
      .collect()
  )
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::opcode::Opcode;

  fn v(idx: u8) -> Register {
    Register::from_nibble(idx)
  }

  #[test]
  fn every_shape(){
    assert_eq!(parse_line(1, "ClearScreen"), Ok(Some(Instruction::ClearScreen)));
    assert_eq!(parse_line(1, "Return()"),    Ok(Some(Instruction::Return)));
    assert_eq!(
      parse_line(1, "Jump(0x234)"),
      Ok(Some(Instruction::Jump { address: Address::from_bits(0x234) }))
    );
    assert_eq!(
      parse_line(1, "LoadImmediate(V1, 0x42)"),
      Ok(Some(Instruction::LoadImmediate { x: v(1), byte: 0x42 }))
    );
    assert_eq!(
      parse_line(1, "Xor(VA, vb)"),
      Ok(Some(Instruction::Xor { x: v(0xA), y: v(0xB) }))
    );
    assert_eq!(
      parse_line(1, "Draw(V0, V1, 0xF)"),
      Ok(Some(Instruction::Draw { x: v(0), y: v(1), height: 0xF }))
    );
    assert_eq!(parse_line(1, "SetDelay(V3)"), Ok(Some(Instruction::SetDelay { x: v(3) })));
  }

  #[test]
  fn whitespace_and_comments(){
    assert_eq!(parse_line(1, ""), Ok(None));
    assert_eq!(parse_line(1, "   # nothing here"), Ok(None));
    assert_eq!(
      parse_line(1, "  Random ( V4 ,0x0f )   # mask"),
      Ok(Some(Instruction::Random { x: v(4), mask: 0x0F }))
    );
  }

  #[test]
  fn errors_carry_line_numbers(){
    assert_eq!(
      parse_assembly("ClearScreen\n\nLoad(V1, 0x42)"),
      Err(AssemblyError::NotAnOperation { line: 3, name: "Load".to_string() })
    );
    assert_eq!(
      parse_line(7, "Jump(0x234"),
      Err(AssemblyError::Syntax { line: 7, text: "Jump(0x234".to_string() })
    );
    assert_eq!(
      parse_line(2, "Jump(V1)"),
      Err(AssemblyError::WrongOperands {
        line: 2,
        operation: Operation::Jump,
        expected: "(NNN)",
        given: "V1".to_string()
      })
    );
    assert_eq!(
      parse_line(4, "LoadImmediate(V1, 0x142)"),
      Err(AssemblyError::OutOfRange { line: 4, value: 0x142, bits: 8 })
    );
    assert_eq!(
      parse_line(5, "Draw(V1, V2, 0x10)"),
      Err(AssemblyError::OutOfRange { line: 5, value: 0x10, bits: 4 })
    );
  }

  #[test]
  fn wide_literals_are_out_of_range(){
    assert_eq!(
      parse_line(1, "Jump(0x100000000)"),
      Err(AssemblyError::OutOfRange { line: 1, value: 0x1_0000_0000, bits: 12 })
    );
    assert_eq!(
      parse_line(2, "Jump(0x123456789ABCDEF0123)"),
      Err(AssemblyError::OutOfRange { line: 2, value: u64::MAX, bits: 12 })
    );
    assert_eq!(
      parse_line(3, "Jump(0x000000000000000000234)"),
      Ok(Some(Instruction::Jump { address: Address::from_bits(0x234) }))
    );
  }

  #[test]
  fn reserved_page_calls_are_rejected(){
    assert_eq!(
      parse_line(1, "CallNative(0x0E0)"),
      Err(AssemblyError::Unencodable { line: 1, text: "CallNative(0x0E0)".to_string() })
    );
    assert_eq!(
      parse_line(1, "CallNative(0x100)"),
      Ok(Some(Instruction::CallNative { address: Address::from_bits(0x100) }))
    );
  }

  #[test]
  fn display_form_parses_back(){
    for word in (0..=u16::MAX).step_by(3) {
      if let Some(instruction) = try_decode_instruction(Opcode(word)) {
        let text = instruction.to_string();
        assert_eq!(parse_line(1, &text), Ok(Some(instruction)), "{}", text);
      }
    }
  }

  #[test]
  fn assemble_to_bytes(){
    let source = "\
      LoadImmediate(V1, 0x42)\n\
      LoadIndex(0x234)   # sprite data\n\
      Draw(V1, V1, 0x5)\n";
    assert_eq!(assemble(source), Ok(vec![0x61, 0x42, 0xA2, 0x34, 0xD1, 0x15]));
  }
}
