use crate::token::LineNumber;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub title: String,
  pub label: String,
  pub note: String,

  /// Where the problem was found, empty for errors raised by the scanner
  pub location: String,
  pub line: LineNumber,
  pub start: usize,
  pub end: usize,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[line {}] Error{}: {}", self.line, self.location, self.title)
  }
}
