use std::convert::TryFrom;

use thiserror::Error;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Op {
    Return = 0,
    Constant,
    Nil,
    True,
    False,
    Equal,
    Greater,
    Less,
    Add,
    Subtract,
    Multiply,
    Divide,
    Not,
    Negate,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown opcode {0}.")]
pub struct UnknownOpcode(pub u8);

impl Op {
    pub const fn u8(self) -> u8 {
        self as u8
    }

    /// Bytes of inline operand following the opcode.
    pub fn operand_len(self) -> usize {
        match self {
            Op::Constant => 1,
            _ => 0,
        }
    }

    /// Net change in stack depth after the instruction runs.
    pub fn stack_effect(self) -> isize {
        match self {
            Op::Constant | Op::Nil | Op::True | Op::False => 1,
            Op::Equal
            | Op::Greater
            | Op::Less
            | Op::Add
            | Op::Subtract
            | Op::Multiply
            | Op::Divide => -1,
            Op::Not | Op::Negate => 0,
            Op::Return => -1,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Return => "OP_RETURN",
            Op::Constant => "OP_CONSTANT",
            Op::Nil => "OP_NIL",
            Op::True => "OP_TRUE",
            Op::False => "OP_FALSE",
            Op::Equal => "OP_EQUAL",
            Op::Greater => "OP_GREATER",
            Op::Less => "OP_LESS",
            Op::Add => "OP_ADD",
            Op::Subtract => "OP_SUBTRACT",
            Op::Multiply => "OP_MULTIPLY",
            Op::Divide => "OP_DIVIDE",
            Op::Not => "OP_NOT",
            Op::Negate => "OP_NEGATE",
        }
    }
}

impl TryFrom<u8> for Op {
    type Error = UnknownOpcode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let op = match value {
            0 => Op::Return,
            1 => Op::Constant,
            2 => Op::Nil,
            3 => Op::True,
            4 => Op::False,
            5 => Op::Equal,
            6 => Op::Greater,
            7 => Op::Less,
            8 => Op::Add,
            9 => Op::Subtract,
            10 => Op::Multiply,
            11 => Op::Divide,
            12 => Op::Not,
            13 => Op::Negate,
            _ => return Err(UnknownOpcode(value)),
        };
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_round_trip_through_try_from() {
        for byte in 0..=Op::Negate.u8() {
            let op = Op::try_from(byte).unwrap();
            assert_eq!(op.u8(), byte);
        }
        assert_eq!(Op::try_from(Op::Negate.u8() + 1), Err(UnknownOpcode(14)));
    }
}
