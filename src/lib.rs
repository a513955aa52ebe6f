use log::trace;
use memory::Heap;
use vm::Vm;

pub mod chunk;
pub mod compiler;
pub mod config;
pub mod debug;
pub mod memory;
pub mod object;
pub mod opcodes;
pub mod repl;
pub mod scanner;
pub mod token;
pub mod value;
pub mod vm;

pub use vm::{InterpreterError, InterpreterResult};

/// Compiles and runs `source` on a fresh VM, printing the result to stdout
/// and any diagnostic to stderr.
pub fn interpret(source: &str) -> InterpreterResult {
    trace!("interpreting {} bytes of source", source.len());
    let heap = Heap::new();
    let mut vm = Vm::new(&heap);

    let result = vm.interpret(source);
    if let Err(err) = &result {
        eprintln!("{}", err);
    }
    result
}
