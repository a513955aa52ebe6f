use crate::{opcodes::Op, value::Value};

const MIN_CAPACITY: usize = 8;

pub fn grow_capacity(capacity: usize) -> usize {
    if capacity < MIN_CAPACITY {
        MIN_CAPACITY
    } else {
        capacity * 2
    }
}

/// A compiled unit: bytecode, the source line of every byte, and the
/// constants the bytecode refers to.
#[derive(Debug, Default)]
pub struct Chunk<'heap> {
    code: Vec<u8>,
    lines: Vec<u32>,
    constants: Vec<Value<'heap>>,
}

impl<'heap> Chunk<'heap> {
    pub fn init() -> Self {
        Self {
            code: Vec::new(),
            lines: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn write(&mut self, byte: u8, line: u32) {
        if self.code.len() == self.code.capacity() {
            let capacity = grow_capacity(self.code.capacity());
            self.code.reserve_exact(capacity - self.code.len());
            self.lines.reserve_exact(capacity - self.lines.len());
        }
        self.code.push(byte);
        self.lines.push(line);
        debug_assert_eq!(self.code.len(), self.lines.len());
    }

    pub fn write_op(&mut self, op: Op, line: u32) {
        self.write(op.u8(), line)
    }

    pub fn add_constant(&mut self, value: Value<'heap>) -> usize {
        if self.constants.len() == self.constants.capacity() {
            let capacity = grow_capacity(self.constants.capacity());
            self.constants
                .reserve_exact(capacity - self.constants.len());
        }
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Frees all storage; the chunk can be written to again afterwards.
    pub fn release(&mut self) {
        *self = Self::init();
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    pub fn constants(&self) -> &[Value<'heap>] {
        &self.constants
    }

    pub fn constant(&self, index: u8) -> Option<Value<'heap>> {
        self.constants.get(index as usize).copied()
    }

    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    pub fn capacity(&self) -> usize {
        self.code.capacity()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
