use std::{
    convert::TryFrom,
    io::{self, Stdout, Write},
};

use log::{log_enabled, trace, Level};
use thiserror::Error;

use crate::{
    chunk::Chunk,
    compiler::{compile, CompilationError},
    config::Config,
    debug::disassemble_instruction,
    memory::Heap,
    opcodes::Op,
    value::{values_equal, Value},
};

pub type InterpreterResult = Result<(), InterpreterError>;

#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error(transparent)]
    CompileError(#[from] CompilationError),
    #[error(transparent)]
    RuntimeError(#[from] RuntimeError),
    #[error("could not write result: {0}")]
    Output(#[from] io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}\n[line {line}] in script")]
pub struct RuntimeError {
    pub message: String,
    pub line: u32,
}

pub struct Vm<'heap, W: Write = Stdout> {
    heap: &'heap Heap,
    stack: Vec<Value<'heap>>,
    ip: usize,
    config: Config,
    out: W,
}

impl<'heap> Vm<'heap, Stdout> {
    pub fn new(heap: &'heap Heap) -> Self {
        Self::with_output(heap, io::stdout())
    }
}

impl<'heap, W: Write> Vm<'heap, W> {
    pub fn with_output(heap: &'heap Heap, out: W) -> Self {
        Self::with_config(heap, Config::default(), out)
    }

    pub fn with_config(heap: &'heap Heap, config: Config, out: W) -> Self {
        Vm {
            heap,
            stack: Vec::with_capacity(config.stack_max),
            ip: 0,
            config,
            out,
        }
    }

    /// Compiles and runs `source`. The chunk only lives for this call.
    pub fn interpret(&mut self, source: &str) -> InterpreterResult {
        let mut chunk = Chunk::init();
        let result = match compile(source, &mut chunk, self.heap) {
            Ok(()) => self.execute(&chunk),
            Err(err) => Err(err.into()),
        };
        chunk.release();
        result
    }

    pub fn execute(&mut self, chunk: &Chunk<'heap>) -> InterpreterResult {
        self.reset_stack();
        self.ip = 0;
        let result = self.run(chunk);
        if result.is_err() {
            self.reset_stack();
        }
        result
    }

    pub fn stack(&self) -> &[Value<'heap>] {
        &self.stack
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn run(&mut self, chunk: &Chunk<'heap>) -> InterpreterResult {
        while self.ip < chunk.len() {
            if self.config.trace_execution && log_enabled!(Level::Trace) {
                self.trace_instruction(chunk);
            }

            let byte = self.next_byte(chunk)?;
            let instruction = match Op::try_from(byte) {
                Ok(op) => op,
                Err(err) => return Err(self.runtime_error(chunk, &err.to_string())),
            };

            match instruction {
                Op::Constant => {
                    let index = self.next_byte(chunk)?;
                    let constant = self.read_constant(chunk, index)?;
                    self.push(chunk, constant)?;
                }
                Op::Nil => self.push(chunk, Value::Nil)?,
                Op::True => self.push(chunk, Value::Bool(true))?,
                Op::False => self.push(chunk, Value::Bool(false))?,
                Op::Equal => {
                    let b = self.pop(chunk)?;
                    let a = self.pop(chunk)?;
                    self.push(chunk, Value::Bool(values_equal(&a, &b)))?;
                }
                Op::Greater => self.binary_number_op(chunk, |a, b| Value::Bool(a > b))?,
                Op::Less => self.binary_number_op(chunk, |a, b| Value::Bool(a < b))?,
                Op::Add => self.binary_number_op(chunk, |a, b| Value::Number(a + b))?,
                Op::Subtract => self.binary_number_op(chunk, |a, b| Value::Number(a - b))?,
                Op::Multiply => self.binary_number_op(chunk, |a, b| Value::Number(a * b))?,
                Op::Divide => self.binary_number_op(chunk, |a, b| Value::Number(a / b))?,
                Op::Not => {
                    let value = self.pop(chunk)?;
                    self.push(chunk, Value::Bool(value.is_falsey()))?;
                }
                Op::Negate => match self.peek(chunk, 0)?.as_number() {
                    Some(n) => {
                        self.pop(chunk)?;
                        self.push(chunk, Value::Number(-n))?;
                    }
                    None => return Err(self.runtime_error(chunk, "Operand must be a number.")),
                },
                Op::Return => {
                    let value = self.pop(chunk)?;
                    writeln!(self.out, "{}", value)?;
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Type-checks both operands before popping them, so a failed check leaves
    /// the stack untouched.
    fn binary_number_op<F>(&mut self, chunk: &Chunk<'heap>, op: F) -> InterpreterResult
    where
        F: Fn(f64, f64) -> Value<'heap>,
    {
        match (self.peek(chunk, 1)?.as_number(), self.peek(chunk, 0)?.as_number()) {
            (Some(a), Some(b)) => {
                self.pop(chunk)?;
                self.pop(chunk)?;
                self.push(chunk, op(a, b))
            }
            _ => Err(self.runtime_error(chunk, "Operands must be numbers.")),
        }
    }

    fn next_byte(&mut self, chunk: &Chunk<'heap>) -> Result<u8, InterpreterError> {
        match chunk.code().get(self.ip) {
            Some(&byte) => {
                self.ip += 1;
                Ok(byte)
            }
            None => Err(self.runtime_error(chunk, "Unexpected end of bytecode.")),
        }
    }

    fn read_constant(&self, chunk: &Chunk<'heap>, index: u8) -> Result<Value<'heap>, InterpreterError> {
        chunk.constant(index).ok_or_else(|| {
            self.runtime_error(chunk, &format!("Constant index {} out of range.", index))
        })
    }

    fn push(&mut self, chunk: &Chunk<'heap>, value: Value<'heap>) -> InterpreterResult {
        if self.stack.len() >= self.config.stack_max {
            return Err(self.runtime_error(chunk, "Stack overflow."));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self, chunk: &Chunk<'heap>) -> Result<Value<'heap>, InterpreterError> {
        match self.stack.pop() {
            Some(value) => Ok(value),
            None => Err(self.runtime_error(chunk, "Stack underflow.")),
        }
    }

    fn peek(&self, chunk: &Chunk<'heap>, distance: usize) -> Result<Value<'heap>, InterpreterError> {
        self.stack
            .len()
            .checked_sub(1 + distance)
            .map(|slot| self.stack[slot])
            .ok_or_else(|| self.runtime_error(chunk, "Stack underflow."))
    }

    fn reset_stack(&mut self) {
        self.stack.clear();
    }

    // `ip` already points past the failing instruction's opcode.
    fn runtime_error(&self, chunk: &Chunk<'heap>, message: &str) -> InterpreterError {
        let line = chunk
            .line_at(self.ip.saturating_sub(1))
            .unwrap_or_default();
        RuntimeError {
            message: message.to_string(),
            line,
        }
        .into()
    }

    fn trace_instruction(&self, chunk: &Chunk<'heap>) {
        let stack: String = self
            .stack
            .iter()
            .map(|value| format!("[ {} ]", value))
            .collect();
        trace!("          {}", stack);
        let (instruction, _) = disassemble_instruction(chunk, self.ip);
        trace!("{}", instruction);
    }
}
