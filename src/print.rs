use crate::chunk::{Chunk, OpCode};
use crate::error::{CompileError, RuntimeError};
use crate::heap::Heap;
use crate::token::{LineNumber, Token};
use crate::value::Value;

use ariadne::{Label, Report, ReportKind, Source};

fn red(text: &str) -> String {
  format!("\u{001b}[31m{}\u{001b}[0m", text)
}

fn bold(text: &str) -> String {
  format!("\u{001b}[1m{}\u{001b}[0m", text)
}

fn code_frame(file: &str, source: &str, line_number: LineNumber) {
  let line_number = line_number as usize;

  eprintln!("    ╭─[{}]", file);
  if line_number > 2 {
    eprintln!("    ·");
  } else {
    eprintln!("    │");
  }

  let start = line_number.saturating_sub(2).max(1);
  for i in start..=line_number {
    if let Some(line) = source.lines().nth(i - 1) {
      eprintln!("{:>3} │ {}", i, line);
    }
  }
  if line_number < source.lines().count() {
    eprintln!("    ·");
  }
  eprintln!("────╯");
}

pub fn compile_error(file: &str, source: &str, error: &CompileError) {
  for diagnostic in &error.diagnostics {
    // an error at the end of the file has nothing to underline
    let start = diagnostic.start.min(source.len());
    let end = diagnostic.end.max(start + 1);

    let report = Report::build(ReportKind::Error, file, start)
      .with_message(diagnostic.to_string())
      .with_label(Label::new((file, start..end)).with_message(&diagnostic.label))
      .with_note(&diagnostic.note)
      .finish()
      .eprint((file, Source::from(source)));

    if report.is_err() {
      eprintln!("{}", diagnostic);
    }
  }
}

pub fn runtime_error(file: &str, source: &str, error: &RuntimeError) {
  eprintln!("{} {}\n", bold(&red("Error:")), bold(&error.message));
  eprintln!("[line {}] in script", error.line_number);

  if error.line_number > 0 {
    code_frame(file, source, error.line_number);
  }
}

pub fn error_message(message: &str) {
  eprintln!("{} {}", bold(&red("Error:")), bold(message));
}

pub fn token(source: &str, token: &Token) {
  println!(
    "{:>4} │ {:?} ({})",
    token.line,
    token.token_type,
    token.get_value(source)
  );
}

pub fn stack(stack: &[Value], heap: &Heap) {
  let values: Vec<_> = stack.iter().map(|value| heap.format_value(value)).collect();
  println!("          [ {} ]", values.join(" | "));
}

pub fn chunk(chunk: &Chunk, heap: &Heap, name: &str) {
  println!("          ╭─[Bytecode:{}]", name);

  let mut position: usize = 0;
  let mut last_line_number = 0;

  while position < chunk.length() {
    let line_number = chunk.get_line_number(position);
    if line_number == last_line_number {
      print!("     {:0>4} │ ", position);
    } else {
      print!("{:<4} {:0>4} │ ", line_number, position);
      last_line_number = line_number;
    }

    position = instruction(chunk, heap, position);
  }
  println!("──────────╯");
}

/// Prints the instruction at the position, returning where the next one starts.
pub fn instruction(chunk: &Chunk, heap: &Heap, position: usize) -> usize {
  match chunk.get(position) {
    Some(OpCode::Constant) => constant_instruction("Constant", chunk, heap, position),
    Some(OpCode::ConstantLong) => constant_long_instruction("Constant Long", chunk, heap, position),
    Some(OpCode::Nil) => simple_instruction("Nil", position),
    Some(OpCode::True) => simple_instruction("True", position),
    Some(OpCode::False) => simple_instruction("False", position),
    Some(OpCode::Pop) => simple_instruction("Pop", position),
    Some(OpCode::Duplicate) => simple_instruction("Duplicate", position),
    Some(OpCode::GetLocal) => byte_instruction("Get Local", chunk, position),
    Some(OpCode::SetLocal) => byte_instruction("Set Local", chunk, position),
    Some(OpCode::DefineGlobal) => constant_instruction("Define Global", chunk, heap, position),
    Some(OpCode::DefineGlobalLong) => {
      constant_long_instruction("Define Global Long", chunk, heap, position)
    }
    Some(OpCode::GetGlobal) => constant_instruction("Get Global", chunk, heap, position),
    Some(OpCode::GetGlobalLong) => constant_long_instruction("Get Global Long", chunk, heap, position),
    Some(OpCode::SetGlobal) => constant_instruction("Set Global", chunk, heap, position),
    Some(OpCode::SetGlobalLong) => constant_long_instruction("Set Global Long", chunk, heap, position),
    Some(OpCode::Equal) => simple_instruction("Equal", position),
    Some(OpCode::Greater) => simple_instruction("Greater", position),
    Some(OpCode::Less) => simple_instruction("Less", position),
    Some(OpCode::Add) => simple_instruction("Add", position),
    Some(OpCode::Subtract) => simple_instruction("Subtract", position),
    Some(OpCode::Multiply) => simple_instruction("Multiply", position),
    Some(OpCode::Divide) => simple_instruction("Divide", position),
    Some(OpCode::Not) => simple_instruction("Not", position),
    Some(OpCode::Negate) => simple_instruction("Negate", position),
    Some(OpCode::Print) => simple_instruction("Print", position),
    Some(OpCode::Jump) => jump_instruction("Jump", 1, chunk, position),
    Some(OpCode::JumpIfFalse) => jump_instruction("Jump If False", 1, chunk, position),
    Some(OpCode::Loop) => jump_instruction("Loop", -1, chunk, position),
    Some(OpCode::Return) => simple_instruction("Return", position),
    None => simple_instruction("Unknown OpCode", position),
  }
}

fn simple_instruction(name: &str, position: usize) -> usize {
  println!("{}", name);
  position + 1
}

fn constant_instruction(name: &str, chunk: &Chunk, heap: &Heap, position: usize) -> usize {
  let constant_location = chunk.get_value(position + 1).unwrap_or(0);
  let constant = chunk.get_constant(constant_location as usize).unwrap_or(Value::Nil);

  println!(
    "{} '{}' ({})",
    name,
    heap.format_value(&constant),
    constant_location
  );

  position + 2
}

fn constant_long_instruction(name: &str, chunk: &Chunk, heap: &Heap, position: usize) -> usize {
  let constant_location = chunk.get_long_value(position + 1).unwrap_or(0);
  let constant = chunk.get_constant(constant_location as usize).unwrap_or(Value::Nil);

  println!(
    "{} '{}' ({})",
    name,
    heap.format_value(&constant),
    constant_location
  );
  position + 3
}

fn byte_instruction(name: &str, chunk: &Chunk, position: usize) -> usize {
  let value = chunk.get_value(position + 1).unwrap_or(0);

  println!("{} {}", name, value);
  position + 2
}

fn jump_instruction(name: &str, direction: i32, chunk: &Chunk, position: usize) -> usize {
  let jump = i32::from(chunk.get_long_value(position + 1).unwrap_or(0));
  let target = position as i32 + 3 + direction * jump;

  println!("{} {} -> {}", name, jump * direction, target);
  position + 3
}
