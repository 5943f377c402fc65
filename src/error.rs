use crate::diagnostic::Diagnostic;
use crate::token::{LineNumber, Token, TokenType};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  UnterminatedString,
  UnknownCharacter,
  ExpectedExpression,
  ExpectedVariableName,
  ExpectedSemicolonAfterValue,
  ExpectedSemicolonAfterExpression,
  ExpectedSemicolonAfterVariable,
  ExpectedSemicolonAfterLoopCondition,
  ExpectedBracket,
  ExpectedBracketBeforeCondition,
  ExpectedBracketAfterCondition,
  ExpectedBracketAfterClauses,
  ExpectedEndOfBlock,
  InvalidAssignmentTarget,
  VariableAlreadyExists,
  ReadInOwnInitializer,
  TooManyLocals,
  TooManyConstants,
  TooBigJump,
  TooBigLoop,
  TooDeeplyNested,
  ReturnFromTopLevel,
}

impl Error {
  fn title(self) -> &'static str {
    match self {
      Self::UnterminatedString => "Unterminated string.",
      Self::UnknownCharacter => "Unexpected character.",
      Self::ExpectedExpression => "Expect expression.",
      Self::ExpectedVariableName => "Expect variable name.",
      Self::ExpectedSemicolonAfterValue => "Expect ';' after value.",
      Self::ExpectedSemicolonAfterExpression => "Expect ';' after expression.",
      Self::ExpectedSemicolonAfterVariable => "Expect ';' after variable declaration.",
      Self::ExpectedSemicolonAfterLoopCondition => "Expect ';' after loop condition.",
      Self::ExpectedBracket => "Expect ')' after expression.",
      Self::ExpectedBracketBeforeCondition => "Expect '(' before condition.",
      Self::ExpectedBracketAfterCondition => "Expect ')' after condition.",
      Self::ExpectedBracketAfterClauses => "Expect ')' after for clauses.",
      Self::ExpectedEndOfBlock => "Expect '}' after block.",
      Self::InvalidAssignmentTarget => "Invalid assignment target.",
      Self::VariableAlreadyExists => "Already a variable with this name in this scope.",
      Self::ReadInOwnInitializer => "Can't read local variable in its own initializer.",
      Self::TooManyLocals => "Too many local variables in function.",
      Self::TooManyConstants => "Too many constants in one chunk.",
      Self::TooBigJump => "Too much code to jump over.",
      Self::TooBigLoop => "Loop body too large.",
      Self::TooDeeplyNested => "Too much nesting.",
      Self::ReturnFromTopLevel => "Can't return from top-level code.",
    }
  }

  fn label(self, value: &str) -> String {
    match self {
      Self::UnterminatedString => "Missing closing quote \"".to_string(),
      Self::UnknownCharacter => format!("Unknown character '{}'", value),
      Self::ExpectedExpression => "Expected expression here".to_string(),
      Self::ExpectedVariableName => "Variable not assigned a name".to_string(),
      Self::ExpectedSemicolonAfterValue
      | Self::ExpectedSemicolonAfterExpression
      | Self::ExpectedSemicolonAfterVariable
      | Self::ExpectedSemicolonAfterLoopCondition => "Expected ';' before this".to_string(),
      Self::ExpectedBracket | Self::ExpectedBracketAfterCondition | Self::ExpectedBracketAfterClauses => {
        "Expected ')' before this".to_string()
      }
      Self::ExpectedBracketBeforeCondition => "Expected '(' before this".to_string(),
      Self::ExpectedEndOfBlock => "Expected '}' before this".to_string(),
      Self::InvalidAssignmentTarget => "Assignment target is not a variable".to_string(),
      Self::VariableAlreadyExists => format!("Variable '{}' already exists", value),
      Self::ReadInOwnInitializer => format!("Variable '{}' is not initialised yet", value),
      Self::TooManyLocals => "There is a limit of 256 local variables in scope".to_string(),
      Self::TooManyConstants | Self::TooBigJump | Self::TooBigLoop => {
        "Couldn't construct bytecode for this".to_string()
      }
      Self::TooDeeplyNested => "Nested too deeply to compile".to_string(),
      Self::ReturnFromTopLevel => "Return outside of a function".to_string(),
    }
  }

  fn note(self) -> &'static str {
    match self {
      Self::UnterminatedString => "Add \" to close the string",
      Self::UnknownCharacter => "Try deleting the character",
      Self::ExpectedExpression => "Add an expression here",
      Self::ExpectedVariableName => "Add the name for your variable",
      Self::ExpectedSemicolonAfterValue
      | Self::ExpectedSemicolonAfterExpression
      | Self::ExpectedSemicolonAfterVariable
      | Self::ExpectedSemicolonAfterLoopCondition => "Add a ; to end the statement",
      Self::ExpectedBracket | Self::ExpectedBracketAfterCondition | Self::ExpectedBracketAfterClauses => {
        "Add a ) to close the brackets"
      }
      Self::ExpectedBracketBeforeCondition => "Add a ( before the condition",
      Self::ExpectedEndOfBlock => "Add a } to close the block",
      Self::InvalidAssignmentTarget => "Assign to a variable rather than an expression",
      Self::VariableAlreadyExists => "You could try a new name for your variable",
      Self::ReadInOwnInitializer => "Use a different name for the new variable",
      Self::TooManyLocals => "Try moving some variables into a new block",
      Self::TooManyConstants | Self::TooBigJump | Self::TooBigLoop => {
        "Try splitting the code into smaller pieces"
      }
      Self::TooDeeplyNested => "Try moving part of the expression into a variable",
      Self::ReturnFromTopLevel => "Remove the return statement",
    }
  }
}

/// Builds the diagnostic for an error found at the given token.
pub fn get_message(error: Error, source: &str, token: &Token) -> Diagnostic {
  let value = token.get_value(source);

  let location = match token.token_type {
    TokenType::EndOfFile => " at end".to_string(),
    TokenType::Error => String::new(),
    _ => format!(" at '{}'", value),
  };

  Diagnostic {
    title: error.title().to_string(),
    label: error.label(value),
    note: error.note().to_string(),
    location,
    line: token.line,
    start: token.start,
    end: token.end,
  }
}

/// Every diagnostic recorded while compiling, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
  pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Display for CompileError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (index, diagnostic) in self.diagnostics.iter().enumerate() {
      if index > 0 {
        writeln!(f)?;
      }
      write!(f, "{}", diagnostic)?;
    }
    Ok(())
  }
}

impl std::error::Error for CompileError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
  pub message: String,
  pub line_number: LineNumber,
}

impl fmt::Display for RuntimeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}\n[line {}] in script", self.message, self.line_number)
  }
}

impl std::error::Error for RuntimeError {}
