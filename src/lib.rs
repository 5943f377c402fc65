pub mod chunk;
pub mod compiler;
mod diagnostic;
pub mod error;
pub mod heap;
pub mod object;
pub mod print;
mod scanner;
pub mod table;
mod token;
mod value;
pub mod vm;

pub use chunk::{Chunk, OpCode};
pub use compiler::compile;
pub use diagnostic::Diagnostic;
pub use error::{CompileError, RuntimeError};
pub use heap::{Heap, Roots};
pub use object::{ObjectRef, StringRef};
pub use scanner::Scanner;
pub use table::Table;
pub use token::{Token, TokenType};
pub use value::Value;
pub use vm::{InterpretResult, VM};

/// Compiles and runs the source on a fresh VM.
pub fn interpret(source: &str) -> InterpretResult {
  VM::new().interpret(source)
}
