use crate::error::Error;
use crate::token::{LineNumber, Token, TokenType};

/// Produces tokens on demand from the source, one call at a time.
pub struct Scanner<'s> {
  source: &'s [u8],

  start: usize,
  current: usize,
  line: LineNumber,

  finished: bool,
}

impl<'s> Scanner<'s> {
  pub fn new(source: &'s str) -> Self {
    Self {
      source: source.as_bytes(),
      start: 0,
      current: 0,
      line: 1,
      finished: false,
    }
  }

  fn at_end(&self) -> bool {
    self.current >= self.source.len()
  }

  fn advance(&mut self) -> u8 {
    self.current += 1;
    self.source[self.current - 1]
  }

  fn peek(&self) -> Option<u8> {
    self.source.get(self.current).copied()
  }

  fn peek_equals(&self, expected: u8) -> bool {
    self.peek() == Some(expected)
  }

  fn peek_next(&self) -> Option<u8> {
    self.source.get(self.current + 1).copied()
  }

  fn matches(&mut self, expected: u8) -> bool {
    if self.peek_equals(expected) {
      self.current += 1;
      true
    } else {
      false
    }
  }

  pub fn get_token(&mut self) -> Token {
    skip_whitespace(self);
    self.start = self.current;

    if self.at_end() {
      return make_token(self, TokenType::EndOfFile);
    }

    let character = self.advance();

    match character {
      b'0'..=b'9' => number_token(self),
      b'_' | b'a'..=b'z' | b'A'..=b'Z' => identifier_token(self),
      b'"' => string_token(self),
      b'(' => make_token(self, TokenType::LeftParen),
      b')' => make_token(self, TokenType::RightParen),
      b'{' => make_token(self, TokenType::LeftBrace),
      b'}' => make_token(self, TokenType::RightBrace),
      b';' => make_token(self, TokenType::Semicolon),
      b',' => make_token(self, TokenType::Comma),
      b'.' => make_token(self, TokenType::Dot),
      b'-' => make_token(self, TokenType::Minus),
      b'+' => make_token(self, TokenType::Plus),
      b'/' => make_token(self, TokenType::Slash),
      b'*' => make_token(self, TokenType::Star),
      b'!' => {
        let token_type = if self.matches(b'=') { TokenType::BangEqual } else { TokenType::Bang };
        make_token(self, token_type)
      }
      b'=' => {
        let token_type = if self.matches(b'=') { TokenType::EqualEqual } else { TokenType::Equal };
        make_token(self, token_type)
      }
      b'<' => {
        let token_type = if self.matches(b'=') { TokenType::LessEqual } else { TokenType::Less };
        make_token(self, token_type)
      }
      b'>' => {
        let token_type = if self.matches(b'=') {
          TokenType::GreaterEqual
        } else {
          TokenType::Greater
        };
        make_token(self, token_type)
      }
      _ => {
        // a multi-byte character is reported once, not once per byte
        while matches!(self.peek(), Some(byte) if byte & 0b1100_0000 == 0b1000_0000) {
          self.advance();
        }
        error_token(self, Error::UnknownCharacter)
      }
    }
  }
}

impl<'s> Iterator for Scanner<'s> {
  type Item = Token;

  /// Yields every token up to and including the end of file token.
  fn next(&mut self) -> Option<Token> {
    if self.finished {
      return None;
    }

    let token = self.get_token();
    if token.token_type == TokenType::EndOfFile {
      self.finished = true;
    }
    Some(token)
  }
}

fn make_token(scanner: &Scanner, token_type: TokenType) -> Token {
  Token {
    token_type,
    line: scanner.line,
    error_value: None,
    start: scanner.start,
    end: scanner.current,
  }
}

fn error_token(scanner: &Scanner, error: Error) -> Token {
  Token {
    token_type: TokenType::Error,
    line: scanner.line,
    error_value: Some(error),
    start: scanner.start,
    end: scanner.current,
  }
}

fn skip_whitespace(scanner: &mut Scanner) {
  loop {
    match scanner.peek() {
      Some(b'\n') => {
        scanner.advance();
        scanner.line = scanner.line.saturating_add(1);
      }
      //  Ignore whitespace
      Some(b' ' | b'\t' | b'\r') => {
        scanner.advance();
      }
      // Skip Comments
      Some(b'/') => match scanner.peek_next() {
        Some(b'/') => {
          while !scanner.peek_equals(b'\n') && !scanner.at_end() {
            scanner.advance();
          }
        }
        _ => break,
      },
      _ => break,
    };
  }
}

fn string_token(scanner: &mut Scanner) -> Token {
  let start_line = scanner.line;

  while !scanner.peek_equals(b'"') && !scanner.at_end() {
    if scanner.peek_equals(b'\n') {
      scanner.line = scanner.line.saturating_add(1);
    }
    scanner.advance();
  }

  let mut token = if scanner.at_end() {
    error_token(scanner, Error::UnterminatedString)
  } else {
    scanner.advance(); // closing quote
    make_token(scanner, TokenType::String)
  };

  token.line = start_line;
  token
}

fn number_token(scanner: &mut Scanner) -> Token {
  while is_digit(scanner.peek()) {
    scanner.advance();
  }

  if scanner.peek_equals(b'.') && is_digit(scanner.peek_next()) {
    scanner.advance();

    while is_digit(scanner.peek()) {
      scanner.advance();
    }
  }

  make_token(scanner, TokenType::Number)
}

fn identifier_token(scanner: &mut Scanner) -> Token {
  while is_alpha(scanner.peek()) || is_digit(scanner.peek()) {
    scanner.advance();
  }

  make_token(scanner, identifier_type(scanner))
}

fn identifier_type(scanner: &Scanner) -> TokenType {
  match scanner.source.get(scanner.start) {
    Some(b'a') => check_keyword(scanner, "and", TokenType::And),
    Some(b'c') => check_keyword(scanner, "class", TokenType::Class),
    Some(b'e') => check_keyword(scanner, "else", TokenType::Else),
    Some(b'f') => match scanner.source.get(scanner.start + 1) {
      Some(b'a') => check_keyword(scanner, "false", TokenType::False),
      Some(b'o') => check_keyword(scanner, "for", TokenType::For),
      Some(b'u') => check_keyword(scanner, "fun", TokenType::Fun),
      _ => TokenType::Identifier,
    },
    Some(b'i') => check_keyword(scanner, "if", TokenType::If),
    Some(b'n') => check_keyword(scanner, "nil", TokenType::Nil),
    Some(b'o') => check_keyword(scanner, "or", TokenType::Or),
    Some(b'p') => check_keyword(scanner, "print", TokenType::Print),
    Some(b'r') => check_keyword(scanner, "return", TokenType::Return),
    Some(b's') => check_keyword(scanner, "super", TokenType::Super),
    Some(b't') => match scanner.source.get(scanner.start + 1) {
      Some(b'h') => check_keyword(scanner, "this", TokenType::This),
      Some(b'r') => check_keyword(scanner, "true", TokenType::True),
      _ => TokenType::Identifier,
    },
    Some(b'v') => check_keyword(scanner, "var", TokenType::Var),
    Some(b'w') => check_keyword(scanner, "while", TokenType::While),
    _ => TokenType::Identifier,
  }
}

fn check_keyword(scanner: &Scanner, keyword: &str, token_type: TokenType) -> TokenType {
  if &scanner.source[scanner.start..scanner.current] == keyword.as_bytes() {
    token_type
  } else {
    TokenType::Identifier
  }
}

fn is_digit(c: Option<u8>) -> bool {
  matches!(c, Some(b'0'..=b'9'))
}

fn is_alpha(c: Option<u8>) -> bool {
  matches!(c, Some(b'a'..=b'z' | b'A'..=b'Z' | b'_'))
}
