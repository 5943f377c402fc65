use crate::chunk::{Chunk, ChunkBuilder, OpCode};
use crate::diagnostic::Diagnostic;
use crate::error::{self, CompileError, Error};
use crate::heap::{Heap, Roots};
use crate::scanner::Scanner;
use crate::token::{Token, TokenType};
use crate::value::Value;

#[cfg(feature = "debug-bytecode")]
use crate::print;

const MAX_LOCALS: usize = u8::MAX as usize + 1;
const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
  None,
  Assignment, // =
  Or,         // or
  And,        // and
  Equality,   // == !=
  Comparison, // < > <= >=
  Term,       // + -
  Factor,     // * /
  Unary,      // ! -
  Call,       // . ()
  Primary,
}

impl Precedence {
  fn next(self) -> Self {
    match self {
      Self::None => Self::Assignment,
      Self::Assignment => Self::Or,
      Self::Or => Self::And,
      Self::And => Self::Equality,
      Self::Equality => Self::Comparison,
      Self::Comparison => Self::Term,
      Self::Term => Self::Factor,
      Self::Factor => Self::Unary,
      Self::Unary => Self::Call,
      Self::Call | Self::Primary => Self::Primary,
    }
  }
}

#[derive(Debug, Clone, Copy)]
enum ParseFn {
  Grouping,
  Unary,
  Binary,
  Number,
  String,
  Literal,
  Variable,
  And,
  Or,
}

struct ParseRule {
  prefix: Option<ParseFn>,
  infix: Option<ParseFn>,
  precedence: Precedence,
}

fn get_rule(token_type: TokenType) -> ParseRule {
  let (prefix, infix, precedence) = match token_type {
    TokenType::LeftParen => (Some(ParseFn::Grouping), None, Precedence::None),
    TokenType::Minus => (Some(ParseFn::Unary), Some(ParseFn::Binary), Precedence::Term),
    TokenType::Plus => (None, Some(ParseFn::Binary), Precedence::Term),
    TokenType::Slash | TokenType::Star => (None, Some(ParseFn::Binary), Precedence::Factor),
    TokenType::Bang => (Some(ParseFn::Unary), None, Precedence::None),
    TokenType::BangEqual | TokenType::EqualEqual => {
      (None, Some(ParseFn::Binary), Precedence::Equality)
    }
    TokenType::Greater | TokenType::GreaterEqual | TokenType::Less | TokenType::LessEqual => {
      (None, Some(ParseFn::Binary), Precedence::Comparison)
    }
    TokenType::Identifier => (Some(ParseFn::Variable), None, Precedence::None),
    TokenType::String => (Some(ParseFn::String), None, Precedence::None),
    TokenType::Number => (Some(ParseFn::Number), None, Precedence::None),
    TokenType::And => (None, Some(ParseFn::And), Precedence::And),
    TokenType::Or => (None, Some(ParseFn::Or), Precedence::Or),
    TokenType::False | TokenType::True | TokenType::Nil => {
      (Some(ParseFn::Literal), None, Precedence::None)
    }
    _ => (None, None, Precedence::None),
  };

  ParseRule {
    prefix,
    infix,
    precedence,
  }
}

struct Local<'s> {
  name: &'s str,
  /// None until the initializer has been compiled
  depth: Option<usize>,
}

struct Compiler<'s, 'h> {
  source: &'s str,
  scanner: Scanner<'s>,

  previous: Token,
  current: Token,

  chunk: ChunkBuilder,
  heap: &'h mut Heap,
  roots: Roots<'h>,

  locals: Vec<Local<'s>>,
  scope_depth: usize,
  nesting: usize,

  diagnostics: Vec<Diagnostic>,
  panic_mode: bool,
}

// Emit Bytecode
impl<'s, 'h> Compiler<'s, 'h> {
  fn emit_opcode(&mut self, code: OpCode) {
    self.chunk.write_opcode(code, self.previous.line);
  }

  fn emit_opcodes(&mut self, first: OpCode, second: OpCode) {
    self.emit_opcode(first);
    self.emit_opcode(second);
  }

  fn emit_value(&mut self, value: u8) {
    self.chunk.write_value(value, self.previous.line);
  }

  fn emit_long_value(&mut self, value: u16) {
    self.chunk.write_long_value(value, self.previous.line);
  }

  fn emit_constant(&mut self, value: Value) {
    let constant_position = self.chunk.add_constant(value);

    if let Ok(constant_position) = u8::try_from(constant_position) {
      self.emit_opcode(OpCode::Constant);
      self.emit_value(constant_position);
    } else if let Ok(constant_position) = u16::try_from(constant_position) {
      self.emit_opcode(OpCode::ConstantLong);
      self.emit_long_value(constant_position);
    } else {
      self.error(Error::TooManyConstants);
    }
  }

  fn emit_jump(&mut self, instruction: OpCode) -> usize {
    self.emit_opcode(instruction);
    self.emit_long_value(u16::MAX);
    self.chunk.length() - 2
  }

  fn patch_jump(&mut self, offset: usize) {
    // skip over the jump's own operand
    let jump = self.chunk.length() - offset - 2;

    match u16::try_from(jump) {
      Ok(jump) => self.chunk.set_long_value(offset, jump),
      Err(_) => self.error(Error::TooBigJump),
    }
  }

  fn emit_loop(&mut self, loop_start: usize) {
    self.emit_opcode(OpCode::Loop);

    let offset = self.chunk.length() - loop_start + 2;
    match u16::try_from(offset) {
      Ok(offset) => self.emit_long_value(offset),
      Err(_) => {
        self.error(Error::TooBigLoop);
        self.emit_long_value(0);
      }
    }
  }

  /// Interns the bytes, keeping the constants compiled so far alive.
  fn make_string(&mut self, bytes: &[u8]) -> Value {
    let roots = Roots {
      constants: self.chunk.constants(),
      ..self.roots
    };

    Value::from(self.heap.intern(bytes, roots))
  }

  fn identifier_constant(&mut self, name: Token) -> usize {
    let source = self.source;
    let value = self.make_string(name.get_bytes(source.as_bytes()));
    self.chunk.add_constant(value)
  }

  /// Emits a global variable instruction, using the long form when the name's
  /// constant doesn't fit in a byte.
  fn emit_global(&mut self, short: OpCode, long: OpCode, global: usize) {
    if let Ok(global) = u8::try_from(global) {
      self.emit_opcode(short);
      self.emit_value(global);
    } else if let Ok(global) = u16::try_from(global) {
      self.emit_opcode(long);
      self.emit_long_value(global);
    } else {
      self.error(Error::TooManyConstants);
    }
  }
}

// Token Stream
impl<'s, 'h> Compiler<'s, 'h> {
  fn new(source: &'s str, heap: &'h mut Heap, roots: Roots<'h>) -> Self {
    let start = Token {
      token_type: TokenType::EndOfFile,
      line: 1,
      start: 0,
      end: 0,
      error_value: None,
    };

    let mut compiler = Self {
      source,
      scanner: Scanner::new(source),
      previous: start,
      current: start,
      chunk: ChunkBuilder::new(),
      heap,
      roots,
      locals: Vec::new(),
      scope_depth: 0,
      nesting: 0,
      diagnostics: Vec::new(),
      panic_mode: false,
    };

    compiler.advance();
    compiler
  }

  fn advance(&mut self) {
    self.previous = self.current;

    loop {
      self.current = self.scanner.get_token();

      #[cfg(feature = "debug-token")]
      crate::print::token(self.source, &self.current);

      if self.current.token_type != TokenType::Error {
        break;
      }

      let error = self.current.error_value.unwrap_or(Error::UnknownCharacter);
      self.error_at_current(error);
    }
  }

  fn check(&self, token_type: TokenType) -> bool {
    self.current.token_type == token_type
  }

  fn matches(&mut self, token_type: TokenType) -> bool {
    if self.check(token_type) {
      self.advance();
      true
    } else {
      false
    }
  }

  fn consume(&mut self, token_type: TokenType, error: Error) {
    if self.check(token_type) {
      self.advance();
    } else {
      self.error_at_current(error);
    }
  }

  fn error_at(&mut self, token: Token, error: Error) {
    if self.panic_mode {
      return;
    }

    self.panic_mode = true;
    self
      .diagnostics
      .push(error::get_message(error, self.source, &token));
  }

  fn error(&mut self, error: Error) {
    self.error_at(self.previous, error);
  }

  fn error_at_current(&mut self, error: Error) {
    self.error_at(self.current, error);
  }

  fn synchronize(&mut self) {
    self.panic_mode = false;

    while !self.check(TokenType::EndOfFile) {
      if self.previous.token_type == TokenType::Semicolon {
        return;
      }

      match self.current.token_type {
        TokenType::Class
        | TokenType::Fun
        | TokenType::Var
        | TokenType::For
        | TokenType::If
        | TokenType::While
        | TokenType::Print
        | TokenType::Return => return,
        _ => self.advance(),
      }
    }
  }
}

// Scopes and Variables
impl<'s, 'h> Compiler<'s, 'h> {
  fn begin_scope(&mut self) {
    self.scope_depth += 1;
  }

  fn end_scope(&mut self) {
    self.scope_depth -= 1;

    while let Some(local) = self.locals.last() {
      if local.depth.map_or(true, |depth| depth > self.scope_depth) {
        self.locals.pop();
        self.emit_opcode(OpCode::Pop);
      } else {
        break;
      }
    }
  }

  fn add_local(&mut self, name: &'s str) {
    if self.locals.len() == MAX_LOCALS {
      self.error(Error::TooManyLocals);
      return;
    }

    self.locals.push(Local { name, depth: None });
  }

  fn declare_variable(&mut self) {
    if self.scope_depth == 0 {
      return;
    }

    let name = self.previous.get_value(self.source);
    let already_exists = self
      .locals
      .iter()
      .rev()
      .take_while(|local| local.depth.map_or(true, |depth| depth >= self.scope_depth))
      .any(|local| local.name == name);

    if already_exists {
      self.error(Error::VariableAlreadyExists);
    }

    self.add_local(name);
  }

  fn parse_variable(&mut self, error: Error) -> usize {
    self.consume(TokenType::Identifier, error);

    self.declare_variable();
    if self.scope_depth > 0 {
      return 0;
    }

    self.identifier_constant(self.previous)
  }

  fn mark_initialized(&mut self) {
    let depth = self.scope_depth;
    if let Some(local) = self.locals.last_mut() {
      local.depth = Some(depth);
    }
  }

  fn define_variable(&mut self, global: usize) {
    if self.scope_depth > 0 {
      self.mark_initialized();
      return;
    }

    self.emit_global(OpCode::DefineGlobal, OpCode::DefineGlobalLong, global);
  }

  fn resolve_local(&mut self, name: &str) -> Option<u8> {
    let (slot, initialized) = self
      .locals
      .iter()
      .enumerate()
      .rev()
      .find(|(_, local)| local.name == name)
      .map(|(slot, local)| (slot, local.depth.is_some()))?;

    if !initialized {
      self.error(Error::ReadInOwnInitializer);
    }

    u8::try_from(slot).ok()
  }

  fn named_variable(&mut self, name: Token, can_assign: bool) {
    let local = self.resolve_local(name.get_value(self.source));
    let global = match local {
      Some(_) => 0,
      None => self.identifier_constant(name),
    };

    let assign = can_assign && self.matches(TokenType::Equal);
    if assign {
      self.expression();
    }

    match (local, assign) {
      (Some(slot), true) => {
        self.emit_opcode(OpCode::SetLocal);
        self.emit_value(slot);
      }
      (Some(slot), false) => {
        self.emit_opcode(OpCode::GetLocal);
        self.emit_value(slot);
      }
      (None, true) => self.emit_global(OpCode::SetGlobal, OpCode::SetGlobalLong, global),
      (None, false) => self.emit_global(OpCode::GetGlobal, OpCode::GetGlobalLong, global),
    }
  }
}

// Statements
impl<'s, 'h> Compiler<'s, 'h> {
  fn declaration(&mut self) {
    if self.matches(TokenType::Var) {
      self.var_declaration();
    } else {
      self.statement();
    }

    if self.panic_mode {
      self.synchronize();
    }
  }

  fn var_declaration(&mut self) {
    let global = self.parse_variable(Error::ExpectedVariableName);

    if self.matches(TokenType::Equal) {
      self.expression();
    } else {
      self.emit_opcode(OpCode::Nil);
    }

    self.consume(TokenType::Semicolon, Error::ExpectedSemicolonAfterVariable);
    self.define_variable(global);
  }

  fn statement(&mut self) {
    if self.nesting == MAX_NESTING {
      self.error_at_current(Error::TooDeeplyNested);
      // always make progress, synchronizing could stop on this same token
      self.advance();
      return;
    }

    self.nesting += 1;
    self.nested_statement();
    self.nesting -= 1;
  }

  fn nested_statement(&mut self) {
    if self.matches(TokenType::Print) {
      self.print_statement();
    } else if self.matches(TokenType::For) {
      self.for_statement();
    } else if self.matches(TokenType::If) {
      self.if_statement();
    } else if self.matches(TokenType::Return) {
      self.return_statement();
    } else if self.matches(TokenType::While) {
      self.while_statement();
    } else if self.matches(TokenType::LeftBrace) {
      self.begin_scope();
      self.block();
      self.end_scope();
    } else {
      self.expression_statement();
    }
  }

  fn print_statement(&mut self) {
    self.expression();
    self.consume(TokenType::Semicolon, Error::ExpectedSemicolonAfterValue);
    self.emit_opcode(OpCode::Print);
  }

  fn return_statement(&mut self) {
    self.error(Error::ReturnFromTopLevel);

    if !self.matches(TokenType::Semicolon) {
      self.expression();
      self.consume(TokenType::Semicolon, Error::ExpectedSemicolonAfterValue);
    }
  }

  fn expression_statement(&mut self) {
    self.expression();
    self.consume(TokenType::Semicolon, Error::ExpectedSemicolonAfterExpression);
    self.emit_opcode(OpCode::Pop);
  }

  fn block(&mut self) {
    while !self.check(TokenType::RightBrace) && !self.check(TokenType::EndOfFile) {
      self.declaration();
    }

    self.consume(TokenType::RightBrace, Error::ExpectedEndOfBlock);
  }

  fn if_statement(&mut self) {
    self.consume(TokenType::LeftParen, Error::ExpectedBracketBeforeCondition);
    self.expression();
    self.consume(TokenType::RightParen, Error::ExpectedBracketAfterCondition);

    let then_jump = self.emit_jump(OpCode::JumpIfFalse);
    self.emit_opcode(OpCode::Pop);
    self.statement();

    let else_jump = self.emit_jump(OpCode::Jump);
    self.patch_jump(then_jump);
    self.emit_opcode(OpCode::Pop);

    if self.matches(TokenType::Else) {
      self.statement();
    }
    self.patch_jump(else_jump);
  }

  fn while_statement(&mut self) {
    let loop_start = self.chunk.length();

    self.consume(TokenType::LeftParen, Error::ExpectedBracketBeforeCondition);
    self.expression();
    self.consume(TokenType::RightParen, Error::ExpectedBracketAfterCondition);

    let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
    self.emit_opcode(OpCode::Pop);
    self.statement();
    self.emit_loop(loop_start);

    self.patch_jump(exit_jump);
    self.emit_opcode(OpCode::Pop);
  }

  fn for_statement(&mut self) {
    self.begin_scope();
    self.consume(TokenType::LeftParen, Error::ExpectedBracketBeforeCondition);

    if self.matches(TokenType::Semicolon) {
      // no initializer
    } else if self.matches(TokenType::Var) {
      self.var_declaration();
    } else {
      self.expression_statement();
    }

    let mut loop_start = self.chunk.length();
    let mut exit_jump = None;

    if !self.matches(TokenType::Semicolon) {
      self.expression();
      self.consume(TokenType::Semicolon, Error::ExpectedSemicolonAfterLoopCondition);

      exit_jump = Some(self.emit_jump(OpCode::JumpIfFalse));
      self.emit_opcode(OpCode::Pop);
    }

    if !self.matches(TokenType::RightParen) {
      let body_jump = self.emit_jump(OpCode::Jump);
      let increment_start = self.chunk.length();

      self.expression();
      self.emit_opcode(OpCode::Pop);
      self.consume(TokenType::RightParen, Error::ExpectedBracketAfterClauses);

      self.emit_loop(loop_start);
      loop_start = increment_start;
      self.patch_jump(body_jump);
    }

    self.statement();
    self.emit_loop(loop_start);

    if let Some(exit_jump) = exit_jump {
      self.patch_jump(exit_jump);
      self.emit_opcode(OpCode::Pop);
    }

    self.end_scope();
  }
}

// Expressions
impl<'s, 'h> Compiler<'s, 'h> {
  fn expression(&mut self) {
    self.parse_precedence(Precedence::Assignment);
  }

  fn parse_precedence(&mut self, precedence: Precedence) {
    if self.nesting == MAX_NESTING {
      self.error_at_current(Error::TooDeeplyNested);
      return;
    }

    self.nesting += 1;
    self.parse_nested_precedence(precedence);
    self.nesting -= 1;
  }

  fn parse_nested_precedence(&mut self, precedence: Precedence) {
    self.advance();

    let prefix = match get_rule(self.previous.token_type).prefix {
      Some(prefix) => prefix,
      None => {
        self.error(Error::ExpectedExpression);
        return;
      }
    };

    let can_assign = precedence <= Precedence::Assignment;
    self.apply(prefix, can_assign);

    while precedence <= get_rule(self.current.token_type).precedence {
      self.advance();

      if let Some(infix) = get_rule(self.previous.token_type).infix {
        self.apply(infix, can_assign);
      }
    }

    if can_assign && self.matches(TokenType::Equal) {
      self.error(Error::InvalidAssignmentTarget);
    }
  }

  fn apply(&mut self, parse_fn: ParseFn, can_assign: bool) {
    match parse_fn {
      ParseFn::Grouping => self.grouping(),
      ParseFn::Unary => self.unary(),
      ParseFn::Binary => self.binary(),
      ParseFn::Number => self.number(),
      ParseFn::String => self.string(),
      ParseFn::Literal => self.literal(),
      ParseFn::Variable => self.named_variable(self.previous, can_assign),
      ParseFn::And => self.and(),
      ParseFn::Or => self.or(),
    }
  }

  fn grouping(&mut self) {
    self.expression();
    self.consume(TokenType::RightParen, Error::ExpectedBracket);
  }

  fn number(&mut self) {
    match self.previous.get_value(self.source).parse::<f64>() {
      Ok(value) => self.emit_constant(Value::from(value)),
      Err(_) => self.error(Error::ExpectedExpression),
    }
  }

  fn string(&mut self) {
    let token = self.previous;
    let source = self.source;
    // trim the quotes
    let bytes = &source.as_bytes()[token.start + 1..token.end - 1];

    let value = self.make_string(bytes);
    self.emit_constant(value);
  }

  fn literal(&mut self) {
    match self.previous.token_type {
      TokenType::False => self.emit_opcode(OpCode::False),
      TokenType::True => self.emit_opcode(OpCode::True),
      TokenType::Nil => self.emit_opcode(OpCode::Nil),
      _ => {}
    }
  }

  fn unary(&mut self) {
    let operator = self.previous.token_type;

    self.parse_precedence(Precedence::Unary);

    match operator {
      TokenType::Minus => self.emit_opcode(OpCode::Negate),
      TokenType::Bang => self.emit_opcode(OpCode::Not),
      _ => {}
    }
  }

  fn binary(&mut self) {
    let operator = self.previous.token_type;
    let rule = get_rule(operator);

    self.parse_precedence(rule.precedence.next());

    match operator {
      TokenType::BangEqual => self.emit_opcodes(OpCode::Equal, OpCode::Not),
      TokenType::EqualEqual => self.emit_opcode(OpCode::Equal),
      TokenType::Greater => self.emit_opcode(OpCode::Greater),
      TokenType::GreaterEqual => self.emit_opcodes(OpCode::Less, OpCode::Not),
      TokenType::Less => self.emit_opcode(OpCode::Less),
      TokenType::LessEqual => self.emit_opcodes(OpCode::Greater, OpCode::Not),
      TokenType::Plus => self.emit_opcode(OpCode::Add),
      TokenType::Minus => self.emit_opcode(OpCode::Subtract),
      TokenType::Star => self.emit_opcode(OpCode::Multiply),
      TokenType::Slash => self.emit_opcode(OpCode::Divide),
      _ => {}
    }
  }

  fn and(&mut self) {
    let end_jump = self.emit_jump(OpCode::JumpIfFalse);

    self.emit_opcode(OpCode::Pop);
    self.parse_precedence(Precedence::And);

    self.patch_jump(end_jump);
  }

  fn or(&mut self) {
    let else_jump = self.emit_jump(OpCode::JumpIfFalse);
    let end_jump = self.emit_jump(OpCode::Jump);

    self.patch_jump(else_jump);
    self.emit_opcode(OpCode::Pop);

    self.parse_precedence(Precedence::Or);
    self.patch_jump(end_jump);
  }
}

/// Compiles the source into a chunk in a single pass.
///
/// Strings are interned into the heap as they are found; `roots` are the
/// values the caller needs kept alive should a collection run meanwhile.
pub fn compile(source: &str, heap: &mut Heap, roots: Roots) -> Result<Chunk, CompileError> {
  let mut compiler = Compiler::new(source, heap, roots);

  while !compiler.matches(TokenType::EndOfFile) {
    compiler.declaration();
  }

  compiler.emit_opcode(OpCode::Return);

  if !compiler.diagnostics.is_empty() {
    return Err(CompileError {
      diagnostics: compiler.diagnostics,
    });
  }

  let chunk = compiler.chunk.finalize();

  #[cfg(feature = "debug-bytecode")]
  print::chunk(&chunk, compiler.heap, "<script>");

  Ok(chunk)
}

#[cfg(test)]
mod test {
  use super::compile;
  use crate::chunk::OpCode;
  use crate::heap::{Heap, Roots};

  fn opcodes(source: &str) -> Vec<Option<OpCode>> {
    let mut heap = Heap::new();
    let chunk = compile(source, &mut heap, Roots::default()).unwrap();

    let mut position = 0;
    let mut codes = Vec::new();
    while position < chunk.length() {
      let code = chunk.get(position);
      position += match code {
        Some(OpCode::Constant | OpCode::GetLocal | OpCode::SetLocal) => 2,
        Some(OpCode::DefineGlobal | OpCode::GetGlobal | OpCode::SetGlobal) => 2,
        Some(OpCode::DefineGlobalLong | OpCode::GetGlobalLong | OpCode::SetGlobalLong) => 3,
        Some(OpCode::ConstantLong | OpCode::Jump | OpCode::JumpIfFalse | OpCode::Loop) => 3,
        _ => 1,
      };
      codes.push(code);
    }
    codes
  }

  #[test]
  fn precedence_is_encoded_in_emission_order() {
    assert_eq!(
      opcodes("print 1 + 2 * 3;"),
      vec![
        Some(OpCode::Constant),
        Some(OpCode::Constant),
        Some(OpCode::Constant),
        Some(OpCode::Multiply),
        Some(OpCode::Add),
        Some(OpCode::Print),
        Some(OpCode::Return),
      ]
    );
  }

  #[test]
  fn comparison_operators_are_composed() {
    assert_eq!(
      opcodes("1 >= 2;"),
      vec![
        Some(OpCode::Constant),
        Some(OpCode::Constant),
        Some(OpCode::Less),
        Some(OpCode::Not),
        Some(OpCode::Pop),
        Some(OpCode::Return),
      ]
    );
  }

  #[test]
  fn locals_use_stack_slots() {
    assert_eq!(
      opcodes("{ var a = 1; a = 2; }"),
      vec![
        Some(OpCode::Constant),
        Some(OpCode::Constant),
        Some(OpCode::SetLocal),
        Some(OpCode::Pop),
        Some(OpCode::Pop),
        Some(OpCode::Return),
      ]
    );
  }

  #[test]
  fn strings_and_names_are_interned_while_compiling() {
    let mut heap = Heap::new();
    compile("var a = \"x\"; var b = a + \"b\";", &mut heap, Roots::default()).unwrap();

    // "b" is both a variable name and a string literal
    assert_eq!(heap.len(), 3);
  }

  #[test]
  fn reports_every_independent_error() {
    let mut heap = Heap::new();
    let error = compile("print 1 +;\nvar = 2;\nprint (3;", &mut heap, Roots::default())
      .unwrap_err();

    let lines: Vec<_> = error.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);
    assert_eq!(error.diagnostics[0].to_string(), "[line 1] Error at ';': Expect expression.");
    assert_eq!(
      error.diagnostics[1].to_string(),
      "[line 2] Error at '=': Expect variable name."
    );
    assert_eq!(
      error.diagnostics[2].to_string(),
      "[line 3] Error at ';': Expect ')' after expression."
    );
  }

  #[test]
  fn scan_errors_become_diagnostics() {
    let mut heap = Heap::new();
    let error = compile("print 1;\nprint \"open;", &mut heap, Roots::default()).unwrap_err();

    assert_eq!(error.diagnostics.len(), 1);
    assert_eq!(error.diagnostics[0].to_string(), "[line 2] Error: Unterminated string.");
  }

  #[test]
  fn globals_past_the_first_256_constants_use_long_operands() {
    let mut source: String = (0..256).map(|i| format!("{};", i)).collect();
    source.push_str("var late = 1; late = late;");

    let codes = opcodes(&source);
    assert_eq!(
      codes[codes.len() - 6..],
      [
        Some(OpCode::Constant),
        Some(OpCode::DefineGlobalLong),
        Some(OpCode::GetGlobalLong),
        Some(OpCode::SetGlobalLong),
        Some(OpCode::Pop),
        Some(OpCode::Return),
      ][..]
    );
  }

  #[test]
  fn deep_nesting_is_a_compile_error() {
    let mut heap = Heap::new();
    let source = format!("print {}1{};", "(".repeat(100_000), ")".repeat(100_000));
    let error = compile(&source, &mut heap, Roots::default()).unwrap_err();

    assert_eq!(
      error.diagnostics[0].to_string(),
      "[line 1] Error at '(': Too much nesting."
    );

    let source = format!("{}print 1;{}", "{".repeat(100_000), "}".repeat(100_000));
    assert!(compile(&source, &mut heap, Roots::default()).is_err());

    let source = format!("print {}1;", "-".repeat(100_000));
    assert!(compile(&source, &mut heap, Roots::default()).is_err());
  }

  #[test]
  fn nesting_within_the_limit_compiles() {
    let mut heap = Heap::new();
    let source = format!("print {}1{};", "(".repeat(200), ")".repeat(200));
    assert!(compile(&source, &mut heap, Roots::default()).is_ok());
  }

  #[test]
  fn error_at_end_of_file() {
    let mut heap = Heap::new();
    let error = compile("print 1", &mut heap, Roots::default()).unwrap_err();

    assert_eq!(
      error.diagnostics[0].to_string(),
      "[line 1] Error at end: Expect ';' after value."
    );
  }
}
