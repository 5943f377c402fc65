use crate::token::LineNumber;
use crate::value::Value;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum OpCode {
  Constant,
  ConstantLong,
  Nil,
  True,
  False,
  Pop,
  Duplicate,
  GetLocal,
  SetLocal,
  DefineGlobal,
  DefineGlobalLong,
  GetGlobal,
  GetGlobalLong,
  SetGlobal,
  SetGlobalLong,
  Equal,
  Greater,
  Less,
  Add,
  Subtract,
  Multiply,
  Divide,
  Not,
  Negate,
  Print,
  Jump,
  JumpIfFalse,
  Loop,
  Return,
}

fn get_op_code(code: u8) -> Option<OpCode> {
  FromPrimitive::from_u8(code)
}

/// Grows a chunk during compilation, appending only.
#[derive(Debug, Clone, Default)]
pub struct ChunkBuilder {
  code: Vec<u8>,
  constants: Vec<Value>,
  lines: Vec<LineNumber>,
}

impl ChunkBuilder {
  pub fn new() -> Self {
    Self {
      code: Vec::new(),
      constants: Vec::new(),
      lines: Vec::new(),
    }
  }

  pub fn length(&self) -> usize {
    self.code.len()
  }

  pub fn write_opcode(&mut self, code: OpCode, line: LineNumber) {
    self.write_value(code as u8, line);
  }

  pub fn write_value(&mut self, code: u8, line: LineNumber) {
    self.code.push(code);
    self.lines.push(line);
  }

  pub fn write_long_value(&mut self, code: u16, line: LineNumber) {
    let [high, low] = code.to_be_bytes();
    self.write_value(high, line);
    self.write_value(low, line);
  }

  /// Index of the constant, reusing an identical constant if one exists.
  pub fn add_constant(&mut self, value: Value) -> usize {
    self
      .constants
      .iter()
      .position(|x| value.is_same(x))
      .unwrap_or_else(|| {
        self.constants.push(value);
        self.constants.len() - 1
      })
  }

  /// Constants added so far, which the collector must keep alive.
  pub fn constants(&self) -> &[Value] {
    &self.constants
  }

  pub fn set_long_value(&mut self, offset: usize, value: u16) {
    let [high, low] = value.to_be_bytes();
    self.code[offset] = high;
    self.code[offset + 1] = low;
  }

  pub fn finalize(mut self) -> Chunk {
    self.code.shrink_to_fit();
    self.constants.shrink_to_fit();
    self.lines.shrink_to_fit();

    Chunk {
      code: self.code,
      constants: self.constants,
      lines: self.lines,
    }
  }
}

/// Compiled bytecode, its constant pool and a source line for every byte.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
  code: Vec<u8>,
  constants: Vec<Value>,
  lines: Vec<LineNumber>,
}

impl Chunk {
  pub fn length(&self) -> usize {
    self.code.len()
  }

  pub fn is_empty(&self) -> bool {
    self.code.is_empty()
  }

  pub fn get(&self, position: usize) -> Option<OpCode> {
    self.code.get(position).copied().and_then(get_op_code)
  }

  pub fn get_value(&self, position: usize) -> Option<u8> {
    self.code.get(position).copied()
  }

  pub fn get_long_value(&self, position: usize) -> Option<u16> {
    let first_byte = self.get_value(position)?;
    let second_byte = self.get_value(position + 1)?;

    Some(u16::from_be_bytes([first_byte, second_byte]))
  }

  pub fn get_constant(&self, pointer: usize) -> Option<Value> {
    self.constants.get(pointer).copied()
  }

  pub fn constants(&self) -> &[Value] {
    &self.constants
  }

  pub fn get_line_number(&self, opcode_position: usize) -> LineNumber {
    self
      .lines
      .get(opcode_position)
      .or_else(|| self.lines.last())
      .copied()
      .unwrap_or(0)
  }
}

#[cfg(test)]
mod test {
  use super::{ChunkBuilder, OpCode};
  use crate::value::Value;

  #[test]
  fn every_byte_has_a_line() {
    let mut builder = ChunkBuilder::new();
    builder.write_opcode(OpCode::Nil, 1);
    builder.write_opcode(OpCode::Jump, 2);
    builder.write_long_value(300, 2);
    builder.write_opcode(OpCode::Return, 5);
    let chunk = builder.finalize();

    assert_eq!(chunk.length(), 5);
    let lines: Vec<_> = (0..5).map(|i| chunk.get_line_number(i)).collect();
    assert_eq!(lines, vec![1, 2, 2, 2, 5]);
    assert_eq!(chunk.get_line_number(100), 5);
  }

  #[test]
  fn decodes_opcodes_and_operands() {
    let mut builder = ChunkBuilder::new();
    builder.write_opcode(OpCode::Constant, 1);
    builder.write_value(7, 1);
    builder.write_opcode(OpCode::Loop, 1);
    builder.write_long_value(0x1234, 1);
    builder.write_value(250, 1);
    let chunk = builder.finalize();

    assert_eq!(chunk.get(0), Some(OpCode::Constant));
    assert_eq!(chunk.get_value(1), Some(7));
    assert_eq!(chunk.get(2), Some(OpCode::Loop));
    assert_eq!(chunk.get_long_value(3), Some(0x1234));
    assert_eq!(chunk.get(5), None);
    assert_eq!(chunk.get(6), None);
    assert_eq!(chunk.get_long_value(5), None);
  }

  #[test]
  fn patching_jumps() {
    let mut builder = ChunkBuilder::new();
    builder.write_opcode(OpCode::Jump, 1);
    builder.write_long_value(u16::MAX, 1);
    builder.set_long_value(1, 42);

    assert_eq!(builder.finalize().get_long_value(1), Some(42));
  }

  #[test]
  fn constants_are_deduplicated() {
    let mut builder = ChunkBuilder::new();

    assert_eq!(builder.add_constant(Value::from(1.0)), 0);
    assert_eq!(builder.add_constant(Value::from(2.0)), 1);
    assert_eq!(builder.add_constant(Value::from(1.0)), 0);
    assert_eq!(builder.constants().len(), 2);

    let chunk = builder.finalize();
    assert!(matches!(chunk.get_constant(1), Some(Value::Number(n)) if n == 2.0));
    assert!(chunk.get_constant(2).is_none());
  }
}
