use crate::token::{Token, TokenKind};

pub struct Scanner<'source> {
    source: &'source str,
    start: usize,
    current: usize,
    line: u32,
}

impl<'source> Scanner<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_token(&mut self) -> Token<'source> {
        self.skip_whitespace();
        self.start = self.current;

        let c = match self.advance() {
            Some(c) => c,
            None => return self.make_token(TokenKind::Eof),
        };

        if is_alpha(c) {
            return self.identifier();
        }
        if c.is_ascii_digit() {
            return self.number();
        }

        match c {
            b'(' => self.make_token(TokenKind::LeftParen),
            b')' => self.make_token(TokenKind::RightParen),
            b'{' => self.make_token(TokenKind::LeftBrace),
            b'}' => self.make_token(TokenKind::RightBrace),
            b';' => self.make_token(TokenKind::Semicolon),
            b',' => self.make_token(TokenKind::Comma),
            b'.' => self.make_token(TokenKind::Dot),
            b'-' => self.make_token(TokenKind::Minus),
            b'+' => self.make_token(TokenKind::Plus),
            b'/' => self.make_token(TokenKind::Slash),
            b'*' => self.make_token(TokenKind::Star),
            b'!' => self.make_paired(b'=', TokenKind::BangEqual, TokenKind::Bang),
            b'=' => self.make_paired(b'=', TokenKind::EqualEqual, TokenKind::Equal),
            b'<' => self.make_paired(b'=', TokenKind::LessEqual, TokenKind::Less),
            b'>' => self.make_paired(b'=', TokenKind::GreaterEqual, TokenKind::Greater),
            b'"' => self.string(),
            _ => {
                self.skip_rest_of_char();
                self.error_token("Unexpected character.")
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.source.as_bytes().get(self.current).copied()?;
        self.current += 1;
        Some(byte)
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.current).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.source.as_bytes().get(self.current + 1).copied()
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    // keeps `current` on a char boundary after a multi-byte character
    fn skip_rest_of_char(&mut self) {
        while !self.is_at_end() && !self.source.is_char_boundary(self.current) {
            self.current += 1;
        }
    }

    fn lexeme(&self) -> &'source str {
        &self.source[self.start..self.current]
    }

    fn make_token(&self, kind: TokenKind) -> Token<'source> {
        Token::new(kind, self.lexeme(), self.line)
    }

    fn make_paired(&mut self, second: u8, paired: TokenKind, single: TokenKind) -> Token<'source> {
        if self.match_byte(second) {
            self.make_token(paired)
        } else {
            self.make_token(single)
        }
    }

    fn error_token(&self, message: &'static str) -> Token<'source> {
        Token::new(TokenKind::Error, message, self.line)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                b' ' | b'\r' | b'\t' => self.current += 1,
                b'\n' => {
                    self.line += 1;
                    self.current += 1;
                }
                b'/' if self.peek_next() == Some(b'/') => {
                    while !matches!(self.peek(), Some(b'\n') | None) {
                        self.current += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn string(&mut self) -> Token<'source> {
        loop {
            match self.advance() {
                Some(b'"') => return self.make_token(TokenKind::String),
                Some(b'\n') => self.line += 1,
                Some(_) => {}
                None => return self.error_token("Unterminated string."),
            }
        }
    }

    fn number(&mut self) -> Token<'source> {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.current += 1;
        }

        // fractional part only when a digit follows the dot
        if self.peek() == Some(b'.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            self.current += 1;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.current += 1;
            }
        }

        self.make_token(TokenKind::Number)
    }

    fn identifier(&mut self) -> Token<'source> {
        while matches!(self.peek(), Some(c) if is_alpha(c) || c.is_ascii_digit()) {
            self.current += 1;
        }
        self.make_token(self.identifier_kind())
    }

    fn identifier_kind(&self) -> TokenKind {
        let lexeme = self.lexeme().as_bytes();
        match lexeme[0] {
            b'a' => check_keyword(lexeme, 1, "nd", TokenKind::And),
            b'c' => check_keyword(lexeme, 1, "lass", TokenKind::Class),
            b'e' => check_keyword(lexeme, 1, "lse", TokenKind::Else),
            b'f' if lexeme.len() > 1 => match lexeme[1] {
                b'a' => check_keyword(lexeme, 2, "lse", TokenKind::False),
                b'o' => check_keyword(lexeme, 2, "r", TokenKind::For),
                b'u' => check_keyword(lexeme, 2, "n", TokenKind::Fun),
                _ => TokenKind::Identifier,
            },
            b'i' => check_keyword(lexeme, 1, "f", TokenKind::If),
            b'n' => check_keyword(lexeme, 1, "il", TokenKind::Nil),
            b'o' => check_keyword(lexeme, 1, "r", TokenKind::Or),
            b'p' => check_keyword(lexeme, 1, "rint", TokenKind::Print),
            b'r' => check_keyword(lexeme, 1, "eturn", TokenKind::Return),
            b's' => check_keyword(lexeme, 1, "uper", TokenKind::Super),
            b't' if lexeme.len() > 1 => match lexeme[1] {
                b'h' => check_keyword(lexeme, 2, "is", TokenKind::This),
                b'r' => check_keyword(lexeme, 2, "ue", TokenKind::True),
                _ => TokenKind::Identifier,
            },
            b'v' => check_keyword(lexeme, 1, "ar", TokenKind::Var),
            b'w' => check_keyword(lexeme, 1, "hile", TokenKind::While),
            _ => TokenKind::Identifier,
        }
    }
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn check_keyword(lexeme: &[u8], start: usize, rest: &str, kind: TokenKind) -> TokenKind {
    if lexeme.len() == start + rest.len() && &lexeme[start..] == rest.as_bytes() {
        kind
    } else {
        TokenKind::Identifier
    }
}

/// Yields every token before `Eof`, error tokens included.
impl<'source> Iterator for Scanner<'source> {
    type Item = Token<'source>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.scan_token();
        match token.kind {
            TokenKind::Eof => None,
            _ => Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source).map(|t| t.kind).collect()
    }

    #[test]
    fn scans_punctuation_and_operators() {
        assert_eq!(
            kinds("(){},.-+;/* ! != = == > >= < <="),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Semicolon,
                TokenKind::Slash,
                TokenKind::Star,
                TokenKind::Bang,
                TokenKind::BangEqual,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ]
        );
    }

    #[test]
    fn keywords_need_an_exact_match() {
        assert_eq!(
            kinds("and class else false for fun if nil or print return super this true var while"),
            vec![
                TokenKind::And,
                TokenKind::Class,
                TokenKind::Else,
                TokenKind::False,
                TokenKind::For,
                TokenKind::Fun,
                TokenKind::If,
                TokenKind::Nil,
                TokenKind::Or,
                TokenKind::Print,
                TokenKind::Return,
                TokenKind::Super,
                TokenKind::This,
                TokenKind::True,
                TokenKind::Var,
                TokenKind::While,
            ]
        );
        assert_eq!(
            kinds("andy f t fals trues _nil nil2"),
            vec![TokenKind::Identifier; 7]
        );
    }

    #[test]
    fn numbers_have_no_trailing_or_leading_dot() {
        let tokens: Vec<_> = Scanner::new("12.5 7. .5").collect();
        let lexemes: Vec<_> = tokens.iter().map(|t| (t.kind, t.lexeme)).collect();
        assert_eq!(
            lexemes,
            vec![
                (TokenKind::Number, "12.5"),
                (TokenKind::Number, "7"),
                (TokenKind::Dot, "."),
                (TokenKind::Dot, "."),
                (TokenKind::Number, "5"),
            ]
        );
    }

    #[test]
    fn skips_comments_and_counts_lines() {
        let tokens: Vec<_> = Scanner::new("1 // one\n// two\n  2").collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn strings_span_lines() {
        let mut scanner = Scanner::new("\"a\nb\" x");
        let string = scanner.scan_token();
        assert_eq!(string.kind, TokenKind::String);
        assert_eq!(string.lexeme, "\"a\nb\"");
        let ident = scanner.scan_token();
        assert_eq!(ident.line, 2);
    }

    #[test]
    fn lexical_errors_become_tokens() {
        let mut scanner = Scanner::new("@ \"open");
        let bad = scanner.scan_token();
        assert_eq!(bad.kind, TokenKind::Error);
        assert_eq!(bad.lexeme, "Unexpected character.");
        let unterminated = scanner.scan_token();
        assert_eq!(unterminated.kind, TokenKind::Error);
        assert_eq!(unterminated.lexeme, "Unterminated string.");
        assert_eq!(scanner.scan_token().kind, TokenKind::Eof);
    }

    #[test]
    fn multibyte_characters_do_not_split() {
        assert_eq!(kinds("é1"), vec![TokenKind::Error, TokenKind::Number]);
    }

    #[test]
    fn eof_is_sticky() {
        let mut scanner = Scanner::new("");
        assert_eq!(scanner.scan_token().kind, TokenKind::Eof);
        assert_eq!(scanner.scan_token().kind, TokenKind::Eof);
        assert_eq!(scanner.scan_token().kind, TokenKind::Eof);
    }
}
