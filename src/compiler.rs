use std::convert::TryFrom;

use log::{debug, log_enabled, Level};
use thiserror::Error;

use crate::{
    chunk::Chunk,
    debug::disassemble,
    memory::Heap,
    opcodes::Op,
    scanner::Scanner,
    token::{Token, TokenKind},
    value::Value,
};

pub type CompilationResult = Result<(), CompilationError>;

/// Deepest chain of nested sub-expressions the compiler will recurse into.
pub const MAX_NESTING: usize = 256;

/// Every diagnostic reported while compiling, in source order.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", .diagnostics.join("\n"))]
pub struct CompilationError {
    pub diagnostics: Vec<String>,
}

/// Compiles `source` into `chunk`, allocating string literals on `heap`.
///
/// On error the chunk still holds whatever was emitted and must be discarded.
pub fn compile<'heap>(
    source: &str,
    chunk: &mut Chunk<'heap>,
    heap: &'heap Heap,
) -> CompilationResult {
    let mut parser = Parser::new(Scanner::new(source), chunk, heap);
    parser.compile()
}

pub struct Parser<'source, 'chunk, 'heap> {
    scanner: Scanner<'source>,
    current: Token<'source>,
    previous: Token<'source>,
    current_chunk: &'chunk mut Chunk<'heap>,
    heap: &'heap Heap,
    had_error: bool,
    panic_mode: bool,
    depth: usize,
    diagnostics: Vec<String>,
}

impl<'source, 'chunk, 'heap> Parser<'source, 'chunk, 'heap> {
    pub fn new(
        scanner: Scanner<'source>,
        chunk: &'chunk mut Chunk<'heap>,
        heap: &'heap Heap,
    ) -> Self {
        let start = Token::new(TokenKind::Eof, "", 1);
        Self {
            scanner,
            current: start,
            previous: start,
            current_chunk: chunk,
            heap,
            had_error: false,
            panic_mode: false,
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn compile(&mut self) -> CompilationResult {
        self.advance();
        self.expression();
        self.consume(TokenKind::Eof, "Expect end of expression.");
        self.end_compiler();

        if self.had_error {
            Err(CompilationError {
                diagnostics: std::mem::take(&mut self.diagnostics),
            })
        } else {
            Ok(())
        }
    }

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.scanner.scan_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            let message = self.current.lexeme;
            self.error_at_current(message);
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.current.kind == kind {
            self.advance();
            return;
        }
        self.error_at_current(message);
    }

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        if self.depth >= MAX_NESTING {
            self.error_at_current("Expression nesting too deep.");
            return;
        }
        self.depth += 1;
        self.parse_operand(precedence);
        self.depth -= 1;
    }

    fn parse_operand(&mut self, precedence: Precedence) {
        self.advance();
        match find_rule(self.previous.kind).prefix {
            Some(prefix) => self.prefix(prefix),
            None => {
                self.error("Expect expression.");
                return;
            }
        }

        while precedence <= find_rule(self.current.kind).precedence {
            self.advance();
            if let Some(infix) = find_rule(self.previous.kind).infix {
                self.infix(infix);
            }
        }
    }

    fn prefix(&mut self, rule: Prefix) {
        match rule {
            Prefix::Grouping => self.grouping(),
            Prefix::Unary => self.unary(),
            Prefix::Number => self.number(),
            Prefix::String => self.string(),
            Prefix::Literal => self.literal(),
        }
    }

    fn infix(&mut self, rule: Infix) {
        match rule {
            Infix::Binary => self.binary(),
        }
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.")
    }

    fn number(&mut self) {
        match self.previous.lexeme.parse::<f64>() {
            Ok(value) => self.emit_constant(Value::Number(value)),
            Err(_) => self.error("Invalid number literal."),
        }
    }

    fn string(&mut self) {
        let lexeme = self.previous.lexeme;
        // trim the surrounding quotes
        let contents = &lexeme[1..lexeme.len() - 1];
        let object = self.heap.alloc_string(contents);
        self.emit_constant(Value::Obj(object));
    }

    fn literal(&mut self) {
        match self.previous.kind {
            TokenKind::False => self.emit_op(Op::False),
            TokenKind::True => self.emit_op(Op::True),
            TokenKind::Nil => self.emit_op(Op::Nil),
            _ => unreachable!("literal rule on non-literal token"),
        }
    }

    fn unary(&mut self) {
        let op_kind = self.previous.kind;

        // compile operand
        self.parse_precedence(Precedence::Unary);

        match op_kind {
            TokenKind::Minus => self.emit_op(Op::Negate),
            TokenKind::Bang => self.emit_op(Op::Not),
            _ => unreachable!("unary rule on non-unary token"),
        }
    }

    fn binary(&mut self) {
        let op_kind = self.previous.kind;
        let rule = find_rule(op_kind);
        self.parse_precedence(rule.precedence.next());

        // `>=` and `<=` are negations of `<` and `>`, which is wrong for NaN
        match op_kind {
            TokenKind::Plus => self.emit_op(Op::Add),
            TokenKind::Minus => self.emit_op(Op::Subtract),
            TokenKind::Star => self.emit_op(Op::Multiply),
            TokenKind::Slash => self.emit_op(Op::Divide),
            TokenKind::BangEqual => self.emit_ops(Op::Equal, Op::Not),
            TokenKind::EqualEqual => self.emit_op(Op::Equal),
            TokenKind::Greater => self.emit_op(Op::Greater),
            TokenKind::GreaterEqual => self.emit_ops(Op::Less, Op::Not),
            TokenKind::Less => self.emit_op(Op::Less),
            TokenKind::LessEqual => self.emit_ops(Op::Greater, Op::Not),
            _ => unreachable!("binary rule on non-operator token"),
        }
    }

    fn emit_byte(&mut self, byte: u8) {
        self.current_chunk.write(byte, self.previous.line)
    }

    fn emit_op(&mut self, op: Op) {
        self.emit_byte(op.u8())
    }

    fn emit_ops(&mut self, op1: Op, op2: Op) {
        self.emit_op(op1);
        self.emit_op(op2)
    }

    fn emit_constant(&mut self, value: Value<'heap>) {
        let konst = self.make_constant(value);
        self.emit_op(Op::Constant);
        self.emit_byte(konst)
    }

    fn make_constant(&mut self, value: Value<'heap>) -> u8 {
        let index = self.current_chunk.add_constant(value);
        match u8::try_from(index) {
            Ok(index) => index,
            Err(_) => {
                self.error("Too many constants in one chunk.");
                0
            }
        }
    }

    fn end_compiler(&mut self) {
        self.emit_op(Op::Return);
        if !self.had_error && log_enabled!(Level::Debug) {
            debug!("{}", disassemble(&*self.current_chunk, "code"));
        }
    }

    fn error(&mut self, message: &str) {
        self.error_at(self.previous, message)
    }

    fn error_at_current(&mut self, message: &str) {
        self.error_at(self.current, message);
    }

    // No statement boundaries exist yet, so panic mode lasts until the end
    // of compilation.
    fn error_at(&mut self, token: Token, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;

        let location = match token.kind {
            TokenKind::Eof => " at end".to_string(),
            TokenKind::Error => String::new(),
            _ => format!(" at '{}'", token.lexeme),
        };
        self.diagnostics
            .push(format!("[line {}] Error{}: {}", token.line, location, message));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment, // =
    Or,         // or
    And,        // and
    Equality,   // == !=
    Comparison, // < > <= >=
    Term,       // + -
    Factor,     // * /
    Unary,      // ! -
    Call,       // . ()
    Primary,
}

impl Precedence {
    fn next(self) -> Self {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Prefix {
    Grouping,
    Unary,
    Number,
    String,
    Literal,
}

#[derive(Clone, Copy, Debug)]
enum Infix {
    Binary,
}

struct ParseRule {
    prefix: Option<Prefix>,
    infix: Option<Infix>,
    precedence: Precedence,
}

impl ParseRule {
    const fn new(prefix: Option<Prefix>, infix: Option<Infix>, precedence: Precedence) -> Self {
        Self {
            prefix,
            infix,
            precedence,
        }
    }

    const fn none() -> Self {
        Self::new(None, None, Precedence::None)
    }
}

fn find_rule(kind: TokenKind) -> ParseRule {
    use Precedence as P;
    match kind {
        TokenKind::LeftParen => ParseRule::new(Some(Prefix::Grouping), None, P::None),
        TokenKind::Minus => ParseRule::new(Some(Prefix::Unary), Some(Infix::Binary), P::Term),
        TokenKind::Plus => ParseRule::new(None, Some(Infix::Binary), P::Term),
        TokenKind::Slash | TokenKind::Star => ParseRule::new(None, Some(Infix::Binary), P::Factor),
        TokenKind::Bang => ParseRule::new(Some(Prefix::Unary), None, P::None),
        TokenKind::BangEqual | TokenKind::EqualEqual => {
            ParseRule::new(None, Some(Infix::Binary), P::Equality)
        }
        TokenKind::Greater
        | TokenKind::GreaterEqual
        | TokenKind::Less
        | TokenKind::LessEqual => ParseRule::new(None, Some(Infix::Binary), P::Comparison),
        TokenKind::String => ParseRule::new(Some(Prefix::String), None, P::None),
        TokenKind::Number => ParseRule::new(Some(Prefix::Number), None, P::None),
        TokenKind::False | TokenKind::True | TokenKind::Nil => {
            ParseRule::new(Some(Prefix::Literal), None, P::None)
        }
        TokenKind::RightParen
        | TokenKind::LeftBrace
        | TokenKind::RightBrace
        | TokenKind::Comma
        | TokenKind::Dot
        | TokenKind::Semicolon
        | TokenKind::Equal
        | TokenKind::Identifier
        | TokenKind::And
        | TokenKind::Class
        | TokenKind::Else
        | TokenKind::For
        | TokenKind::Fun
        | TokenKind::If
        | TokenKind::Or
        | TokenKind::Print
        | TokenKind::Return
        | TokenKind::Super
        | TokenKind::This
        | TokenKind::Var
        | TokenKind::While
        | TokenKind::Error
        | TokenKind::Eof => ParseRule::none(),
    }
}
