use std::{convert::TryFrom, fmt::Write};

use crate::{chunk::Chunk, opcodes::Op};

pub fn disassemble(chunk: &Chunk, name: &str) -> String {
    let mut out = format!("== {} ==\n", name);
    let mut offset = 0;
    while offset < chunk.len() {
        let (line, next) = disassemble_instruction(chunk, offset);
        out.push_str(&line);
        out.push('\n');
        offset = next;
    }
    out
}

/// Renders the instruction at `offset`, returning it along with the offset of
/// the next instruction.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize) -> (String, usize) {
    let mut out = format!("{:04} ", offset);
    let line = chunk.line_at(offset);
    if offset > 0 && line == chunk.line_at(offset - 1) {
        out.push_str("   | ");
    } else {
        let _ = write!(out, "{:4} ", line.unwrap_or_default());
    }

    let byte = match chunk.code().get(offset) {
        Some(&byte) => byte,
        None => {
            out.push_str("<truncated>");
            return (out, offset + 1);
        }
    };
    match Op::try_from(byte) {
        Ok(op @ Op::Constant) => {
            let (text, next) = constant_instruction(chunk, op, offset);
            out.push_str(&text);
            (out, next)
        }
        Ok(op) => {
            out.push_str(op.mnemonic());
            (out, offset + 1)
        }
        Err(_) => {
            let _ = write!(out, "Unknown opcode {}", byte);
            (out, offset + 1)
        }
    }
}

fn constant_instruction(chunk: &Chunk, op: Op, offset: usize) -> (String, usize) {
    let index = match chunk.code().get(offset + 1) {
        Some(&index) => index,
        None => return (format!("{:<16} <truncated>", op.mnemonic()), offset + 1),
    };
    let value = match chunk.constant(index) {
        Some(value) => format!("'{}'", value),
        None => "<out-of-bounds>".to_string(),
    };
    (
        format!("{:<16} {:4} {}", op.mnemonic(), index, value),
        offset + 1 + op.operand_len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn prints_offsets_lines_and_constants() {
        let mut chunk = Chunk::init();
        let idx = chunk.add_constant(Value::Number(1.2));
        chunk.write_op(Op::Constant, 123);
        chunk.write(idx as u8, 123);
        chunk.write_op(Op::Negate, 123);
        chunk.write_op(Op::Return, 124);

        assert_eq!(
            disassemble(&chunk, "test chunk"),
            "== test chunk ==\n\
             0000  123 OP_CONSTANT         0 '1.2'\n\
             0002    | OP_NEGATE\n\
             0003  124 OP_RETURN\n"
        );
    }

    #[test]
    fn unknown_bytes_and_bad_indexes() {
        let mut chunk = Chunk::init();
        chunk.write(200, 1);
        chunk.write_op(Op::Constant, 1);
        chunk.write(9, 1);

        let text = disassemble(&chunk, "bad");
        assert!(text.contains("0000    1 Unknown opcode 200"));
        assert!(text.contains("0001    | OP_CONSTANT         9 <out-of-bounds>"));
    }

    #[test]
    fn offsets_past_the_end_are_truncated() {
        let mut chunk = Chunk::init();
        chunk.write_op(Op::Return, 7);

        let (text, next) = disassemble_instruction(&chunk, 1);
        assert_eq!(text, "0001    0 <truncated>");
        assert_eq!(next, 2);

        let (text, _) = disassemble_instruction(&Chunk::init(), 0);
        assert_eq!(text, "0000    0 <truncated>");
    }
}
