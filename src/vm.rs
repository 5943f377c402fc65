use crate::chunk::{Chunk, OpCode};
use crate::compiler::compile;
use crate::error::{CompileError, RuntimeError};
use crate::heap::{Heap, Roots};
use crate::print;
use crate::table::Table;
use crate::value::Value;

use std::io::{self, Write};

pub const STACK_MAX: usize = 64 * 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretResult {
  Ok,
  CompileError,
  RuntimeError,
}

macro_rules! runtime_error {
  ( $vm:expr, $chunk:expr, $ip:expr, $($message:tt)+ ) => {{
    $vm.stack.clear();
    Err(RuntimeError {
      message: format!($($message)+),
      line_number: $chunk.get_line_number($ip),
    })
  }};
}

macro_rules! get_safe {
  ( $vm:expr, $chunk:expr, $ip:expr, $x:expr ) => {
    match $x {
      Some(value) => value,
      None => break runtime_error!($vm, $chunk, $ip, "Malformed bytecode at {}.", $ip),
    }
  };
}

macro_rules! pop {
  ( $vm:expr, $chunk:expr, $ip:expr ) => {
    match $vm.stack.pop() {
      Some(value) => value,
      None => break runtime_error!($vm, $chunk, $ip, "Stack underflow."),
    }
  };
}

macro_rules! peek {
  ( $vm:expr, $chunk:expr, $ip:expr, $distance:expr ) => {
    match $vm.stack.len().checked_sub(1 + $distance) {
      Some(index) => $vm.stack[index],
      None => break runtime_error!($vm, $chunk, $ip, "Stack underflow."),
    }
  };
}

macro_rules! push {
  ( $vm:expr, $chunk:expr, $ip:expr, $value:expr ) => {
    if $vm.stack.len() >= STACK_MAX {
      break runtime_error!($vm, $chunk, $ip, "Stack overflow.");
    } else {
      $vm.stack.push($value);
    }
  };
}

macro_rules! numeric_expression {
  ( $vm:expr, $chunk:expr, $ip:expr, $token:tt ) => {
    numeric_expression!($vm, $chunk, $ip, $token, Number)
  };

  ( $vm:expr, $chunk:expr, $ip:expr, $token:tt, $type:ident ) => {
    let right = pop!($vm, $chunk, $ip);
    let left = pop!($vm, $chunk, $ip);

    match (left, right) {
      (Value::Number(left), Value::Number(right)) => {
        push!($vm, $chunk, $ip, Value::$type(left $token right))
      }
      _ => {
        break runtime_error!(
          $vm,
          $chunk,
          $ip,
          "Operands of '{}' must be numbers.",
          stringify!($token)
        )
      }
    }
  };
}

/// Reads the name operand of a global instruction, giving the name and the
/// length of the instruction.
macro_rules! read_global_name {
  ( $vm:expr, $chunk:expr, $ip:expr, $long:expr ) => {{
    let (location, length) = if $long {
      ($chunk.get_long_value($ip + 1).map(usize::from), 3)
    } else {
      ($chunk.get_value($ip + 1).map(usize::from), 2)
    };

    let location = get_safe!($vm, $chunk, $ip, location);
    let constant = get_safe!($vm, $chunk, $ip, $chunk.get_constant(location));
    let name = get_safe!(
      $vm,
      $chunk,
      $ip,
      constant
        .as_object()
        .and_then(|object| $vm.heap.string_ref(object))
    );

    (name, length)
  }};
}

/// Owns the heap, the globals and the value stack. Globals and interned
/// strings live as long as the VM, so a REPL can interpret line by line.
pub struct VM {
  stack: Vec<Value>,
  globals: Table,
  heap: Heap,
  output: Box<dyn Write>,
  from: String,
}

impl VM {
  pub fn new() -> Self {
    Self {
      stack: Vec::with_capacity(256),
      globals: Table::new(),
      heap: Heap::new(),
      output: Box::new(io::stdout()),
      from: String::from("<script>"),
    }
  }

  /// Sends the output of `print` statements somewhere other than stdout.
  pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
    self.output = output;
    self
  }

  /// Sets the number of bytes allocated before the first collection.
  pub fn with_gc_threshold(mut self, threshold: usize) -> Self {
    self.heap = Heap::with_threshold(threshold);
    self.globals = Table::new();
    self
  }

  /// Sets the file name shown in error messages.
  pub fn with_name(mut self, from: &str) -> Self {
    self.from = from.to_string();
    self
  }

  /// Compiles against this VM's heap, so the chunk can be run on it.
  pub fn compile(&mut self, source: &str) -> Result<Chunk, CompileError> {
    let roots = Roots {
      stack: &self.stack,
      globals: Some(&self.globals),
      constants: &[],
    };

    compile(source, &mut self.heap, roots)
  }

  pub fn interpret(&mut self, source: &str) -> InterpretResult {
    match self.compile(source) {
      Ok(chunk) => match self.run(&chunk) {
        Ok(()) => InterpretResult::Ok,
        Err(error) => {
          print::runtime_error(&self.from, source, &error);
          InterpretResult::RuntimeError
        }
      },
      Err(error) => {
        print::compile_error(&self.from, source, &error);
        InterpretResult::CompileError
      }
    }
  }

  pub fn run(&mut self, chunk: &Chunk) -> Result<(), RuntimeError> {
    let mut ip = 0;
    self.stack.clear();

    loop {
      if ip >= chunk.length() {
        break Ok(());
      }

      if cfg!(feature = "debug-stack") {
        print::stack(&self.stack, &self.heap);
        print::instruction(chunk, &self.heap, ip);
      }

      match chunk.get(ip) {
        Some(OpCode::Constant) => {
          let location = get_safe!(self, chunk, ip, chunk.get_value(ip + 1));
          let constant = get_safe!(self, chunk, ip, chunk.get_constant(location as usize));
          push!(self, chunk, ip, constant);
          ip += 2;
        }
        Some(OpCode::ConstantLong) => {
          let location = get_safe!(self, chunk, ip, chunk.get_long_value(ip + 1));
          let constant = get_safe!(self, chunk, ip, chunk.get_constant(location as usize));
          push!(self, chunk, ip, constant);
          ip += 3;
        }
        Some(OpCode::Nil) => {
          push!(self, chunk, ip, Value::Nil);
          ip += 1;
        }
        Some(OpCode::True) => {
          push!(self, chunk, ip, Value::from(true));
          ip += 1;
        }
        Some(OpCode::False) => {
          push!(self, chunk, ip, Value::from(false));
          ip += 1;
        }
        Some(OpCode::Pop) => {
          pop!(self, chunk, ip);
          ip += 1;
        }
        Some(OpCode::Duplicate) => {
          let value = peek!(self, chunk, ip, 0);
          push!(self, chunk, ip, value);
          ip += 1;
        }

        Some(OpCode::GetLocal) => {
          let slot = get_safe!(self, chunk, ip, chunk.get_value(ip + 1));
          let value = get_safe!(self, chunk, ip, self.stack.get(slot as usize).copied());
          push!(self, chunk, ip, value);
          ip += 2;
        }
        Some(OpCode::SetLocal) => {
          let slot = get_safe!(self, chunk, ip, chunk.get_value(ip + 1)) as usize;
          let value = peek!(self, chunk, ip, 0);
          if slot >= self.stack.len() {
            break runtime_error!(self, chunk, ip, "Stack underflow.");
          }
          self.stack[slot] = value;
          ip += 2;
        }

        Some(code @ (OpCode::DefineGlobal | OpCode::DefineGlobalLong)) => {
          let long = code == OpCode::DefineGlobalLong;
          let (name, length) = read_global_name!(self, chunk, ip, long);
          // stays on the stack until stored, so a collection can still see it
          let value = peek!(self, chunk, ip, 0);
          self.globals.set(name, value);
          pop!(self, chunk, ip);
          ip += length;
        }
        Some(code @ (OpCode::GetGlobal | OpCode::GetGlobalLong)) => {
          let long = code == OpCode::GetGlobalLong;
          let (name, length) = read_global_name!(self, chunk, ip, long);
          match self.globals.get(name) {
            Some(value) => push!(self, chunk, ip, value),
            None => {
              let name = self.heap.format_value(&Value::from(name));
              break runtime_error!(self, chunk, ip, "Undefined variable '{}'.", name);
            }
          }
          ip += length;
        }
        Some(code @ (OpCode::SetGlobal | OpCode::SetGlobalLong)) => {
          let long = code == OpCode::SetGlobalLong;
          let (name, length) = read_global_name!(self, chunk, ip, long);
          let value = peek!(self, chunk, ip, 0);
          if self.globals.set(name, value) {
            self.globals.delete(name);
            let name = self.heap.format_value(&Value::from(name));
            break runtime_error!(self, chunk, ip, "Undefined variable '{}'.", name);
          }
          ip += length;
        }

        Some(OpCode::Equal) => {
          let right = pop!(self, chunk, ip);
          let left = pop!(self, chunk, ip);
          push!(self, chunk, ip, Value::from(self.heap.values_equal(&left, &right)));
          ip += 1;
        }
        Some(OpCode::Greater) => {
          numeric_expression!(self, chunk, ip, >, Boolean);
          ip += 1;
        }
        Some(OpCode::Less) => {
          numeric_expression!(self, chunk, ip, <, Boolean);
          ip += 1;
        }
        Some(OpCode::Add) => {
          let right = peek!(self, chunk, ip, 0);
          let left = peek!(self, chunk, ip, 1);

          let result = match (left, right) {
            (Value::Number(left), Value::Number(right)) => Value::from(left + right),
            (Value::Object(left), Value::Object(right)) => {
              let concatenated = match (self.heap.get_string(left), self.heap.get_string(right)) {
                (Some(left), Some(right)) => [left.as_bytes(), right.as_bytes()].concat(),
                _ => {
                  break runtime_error!(
                    self,
                    chunk,
                    ip,
                    "Operands of '+' must be two numbers or two strings."
                  )
                }
              };

              // both operands are still on the stack while the result is allocated
              let roots = Roots {
                stack: &self.stack,
                globals: Some(&self.globals),
                constants: chunk.constants(),
              };
              Value::from(self.heap.take_string(concatenated, roots))
            }
            _ => {
              break runtime_error!(
                self,
                chunk,
                ip,
                "Operands of '+' must be two numbers or two strings."
              )
            }
          };

          pop!(self, chunk, ip);
          pop!(self, chunk, ip);
          push!(self, chunk, ip, result);
          ip += 1;
        }
        Some(OpCode::Subtract) => {
          numeric_expression!(self, chunk, ip, -);
          ip += 1;
        }
        Some(OpCode::Multiply) => {
          numeric_expression!(self, chunk, ip, *);
          ip += 1;
        }
        Some(OpCode::Divide) => {
          numeric_expression!(self, chunk, ip, /);
          ip += 1;
        }
        Some(OpCode::Not) => {
          let value = pop!(self, chunk, ip);
          push!(self, chunk, ip, Value::from(value.is_falsy()));
          ip += 1;
        }
        Some(OpCode::Negate) => {
          match peek!(self, chunk, ip, 0) {
            Value::Number(n) => {
              pop!(self, chunk, ip);
              push!(self, chunk, ip, Value::from(-n));
            }
            _ => break runtime_error!(self, chunk, ip, "Operand of '-' must be a number."),
          }
          ip += 1;
        }

        Some(OpCode::Print) => {
          let value = pop!(self, chunk, ip);
          let text = self.heap.format_value(&value);
          if writeln!(self.output, "{}", text).is_err() {
            break runtime_error!(self, chunk, ip, "Could not write output.");
          }
          ip += 1;
        }

        Some(OpCode::Jump) => {
          let offset = get_safe!(self, chunk, ip, chunk.get_long_value(ip + 1));
          ip += 3 + offset as usize;
        }
        Some(OpCode::JumpIfFalse) => {
          let offset = get_safe!(self, chunk, ip, chunk.get_long_value(ip + 1));
          if peek!(self, chunk, ip, 0).is_falsy() {
            ip += 3 + offset as usize;
          } else {
            ip += 3;
          }
        }
        Some(OpCode::Loop) => {
          let offset = get_safe!(self, chunk, ip, chunk.get_long_value(ip + 1));
          ip = get_safe!(self, chunk, ip, (ip + 3).checked_sub(offset as usize));
        }

        Some(OpCode::Return) => break Ok(()),
        None => {
          let code = chunk.get_value(ip).unwrap_or(0);
          break runtime_error!(self, chunk, ip, "Unknown opcode {}.", code);
        }
      }
    }
  }

  /// Value of a global variable, without interning the name.
  pub fn get_global(&self, name: &str) -> Option<Value> {
    let name = self.heap.find_string(name.as_bytes())?;
    self.globals.get(name)
  }

  /// Interns a string on this VM's heap.
  pub fn new_string(&mut self, string: &str) -> Value {
    let roots = Roots {
      stack: &self.stack,
      globals: Some(&self.globals),
      constants: &[],
    };

    Value::from(self.heap.intern(string.as_bytes(), roots))
  }

  pub fn values_equal(&self, a: &Value, b: &Value) -> bool {
    self.heap.values_equal(a, b)
  }

  pub fn format_value(&self, value: &Value) -> String {
    self.heap.format_value(value)
  }

  pub fn heap(&self) -> &Heap {
    &self.heap
  }

  pub fn globals(&self) -> &Table {
    &self.globals
  }

  /// Collects now rather than waiting for the threshold. Returns the number of
  /// objects freed.
  pub fn collect_garbage(&mut self) -> usize {
    let roots = Roots {
      stack: &self.stack,
      globals: Some(&self.globals),
      constants: &[],
    };

    self.heap.collect_garbage(roots)
  }
}

impl Default for VM {
  fn default() -> Self {
    Self::new()
  }
}
