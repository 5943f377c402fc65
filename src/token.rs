use crate::error::Error;

pub type LineNumber = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
  // Brackets
  LeftParen,
  RightParen,
  LeftBrace,
  RightBrace,

  // Separators
  Comma,
  Dot,
  Semicolon,

  // Operators
  Minus,
  Plus,
  Slash,
  Star,
  Bang,

  // Comparators
  BangEqual,
  Equal,
  EqualEqual,
  Greater,
  GreaterEqual,
  Less,
  LessEqual,

  // Values
  Identifier,
  String,
  Number,
  True,
  False,
  Nil,

  // Keywords
  And,
  Class,
  Else,
  For,
  Fun,
  If,
  Or,
  Print,
  Return,
  Super,
  This,
  Var,
  While,

  Error,
  EndOfFile,
}

/// A view into the source text, the lexeme is never copied out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
  pub token_type: TokenType,
  pub line: LineNumber,

  pub start: usize,
  pub end: usize,

  pub error_value: Option<Error>,
}

impl Token {
  pub fn get_value<'s>(&self, source: &'s str) -> &'s str {
    source.get(self.start..self.end).unwrap_or("")
  }

  pub fn get_bytes<'s>(&self, source: &'s [u8]) -> &'s [u8] {
    source.get(self.start..self.end).unwrap_or(&[])
  }
}
