use lox::{print, InterpretResult, VM};

use rustyline::error::ReadlineError;
use rustyline::Editor;

use std::{env, fs, process};

const EXIT_USAGE: i32 = 64;
const EXIT_COMPILE_ERROR: i32 = 65;
const EXIT_RUNTIME_ERROR: i32 = 70;
const EXIT_IO_ERROR: i32 = 74;

fn repl() {
  let mut rl = Editor::<()>::new();
  let mut vm = VM::new().with_name("REPL");

  loop {
    match rl.readline("> ") {
      Ok(line) => {
        rl.add_history_entry(&line);
        vm.interpret(&line);
      }
      Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
        break;
      }
      Err(err) => {
        print::error_message(&format!("{:?}", err));
        break;
      }
    }
  }
}

fn run_file(filename: &str) -> i32 {
  let source = match fs::read_to_string(filename) {
    Ok(source) => source,
    Err(_) => {
      print::error_message(&format!("Could not open file \"{}\".", filename));
      return EXIT_IO_ERROR;
    }
  };

  match VM::new().with_name(filename).interpret(&source) {
    InterpretResult::Ok => 0,
    InterpretResult::CompileError => EXIT_COMPILE_ERROR,
    InterpretResult::RuntimeError => EXIT_RUNTIME_ERROR,
  }
}

fn main() {
  let args: Vec<String> = env::args().collect();

  let code = match args.as_slice() {
    [_] => {
      repl();
      0
    }
    [_, filename] => run_file(filename),
    _ => {
      eprintln!("Usage: lox [path]");
      EXIT_USAGE
    }
  };

  process::exit(code);
}
