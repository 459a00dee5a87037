//! Lexical scanner for script expressions.
//!
//! A small byte-driven tokenizer for the strict expression engine. The
//! interesting part is disambiguating `.`: it can start a number (`.5`),
//! form an elementwise operator (`.*`, `./`, `.^`), or be a stray character
//! (an error — the evaluation chain falls back on errors, it never panics).

use plotlab_graphics::types::Scalar;

use crate::error::{EngineError, ErrorKind, EvalResult};
use crate::token::{Span, Token, TokenKind};

/// Lexical scanner over one expression string.
pub struct Scanner {
    src: Vec<u8>,
    pos: usize,
}

impl Scanner {
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            src: source.as_bytes().to_vec(),
            pos: 0,
        }
    }

    /// Tokenize an entire expression, appending the trailing `Eof`.
    pub fn tokenize(source: &str) -> EvalResult<Vec<Token>> {
        let mut scanner = Self::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn mark(&self) -> u32 {
        self.pos as u32
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> EvalResult<Token> {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }

        let start = self.mark();
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::at(start),
            });
        };

        let kind = match c {
            b'0'..=b'9' => return self.scan_number(),
            b'.' => match self.peek_at(1) {
                Some(b'0'..=b'9') => return self.scan_number(),
                Some(b'*') => {
                    self.pos += 2;
                    TokenKind::DotStar
                }
                Some(b'/') => {
                    self.pos += 2;
                    TokenKind::DotSlash
                }
                Some(b'^') => {
                    self.pos += 2;
                    TokenKind::DotCaret
                }
                _ => {
                    return Err(EngineError::new(
                        ErrorKind::InvalidCharacter,
                        format!("stray `.` at byte {start}"),
                    ));
                }
            },
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => return Ok(self.scan_ident()),
            b'+' => {
                self.pos += 1;
                TokenKind::Plus
            }
            b'-' => {
                self.pos += 1;
                TokenKind::Minus
            }
            b'*' => {
                self.pos += 1;
                TokenKind::Star
            }
            b'/' => {
                self.pos += 1;
                TokenKind::Slash
            }
            b'^' => {
                self.pos += 1;
                TokenKind::Caret
            }
            b'\'' => {
                self.pos += 1;
                TokenKind::Quote
            }
            b'(' => {
                self.pos += 1;
                TokenKind::LParen
            }
            b')' => {
                self.pos += 1;
                TokenKind::RParen
            }
            other => {
                return Err(EngineError::new(
                    ErrorKind::InvalidCharacter,
                    format!("unexpected byte 0x{other:02x} at {start}"),
                ));
            }
        };

        Ok(Token {
            kind,
            span: Span::new(start, self.mark()),
        })
    }

    /// Scan a decimal literal with optional fraction and exponent.
    fn scan_number(&mut self) -> EvalResult<Token> {
        let start = self.mark();
        let begin = self.pos;

        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        // Fraction — but not when the dot starts an elementwise operator.
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        } else if self.peek() == Some(b'.')
            && !matches!(self.peek_at(1), Some(b'*' | b'/' | b'^'))
        {
            // Trailing dot as in `2.`
            self.pos += 1;
        }
        // Exponent: `e`/`E`, optional sign, at least one digit.
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mut ahead = 1;
            if matches!(self.peek_at(1), Some(b'+' | b'-')) {
                ahead = 2;
            }
            if matches!(self.peek_at(ahead), Some(b'0'..=b'9')) {
                self.pos += ahead;
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            }
        }

        let text = std::str::from_utf8(&self.src[begin..self.pos])
            .map_err(|_| EngineError::new(ErrorKind::Internal, "non-UTF-8 number"))?;
        // A trailing bare dot (`2.`) is not accepted by f64::from_str.
        let text = text.strip_suffix('.').unwrap_or(text);
        let value: Scalar = text.parse().map_err(|_| {
            EngineError::new(
                ErrorKind::InvalidCharacter,
                format!("malformed number `{text}`"),
            )
        })?;

        Ok(Token {
            kind: TokenKind::Number(value),
            span: Span::new(start, self.mark()),
        })
    }

    fn scan_ident(&mut self) -> Token {
        let start = self.mark();
        let begin = self.pos;
        while matches!(
            self.peek(),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')
        ) {
            self.pos += 1;
        }
        let name = String::from_utf8_lossy(&self.src[begin..self.pos]).into_owned();
        Token {
            kind: TokenKind::Ident(name),
            span: Span::new(start, self.mark()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::tokenize(source)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scans_numbers() {
        assert_eq!(
            kinds("1 3.5 .25 2."),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Number(3.5),
                TokenKind::Number(0.25),
                TokenKind::Number(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_exponents() {
        assert_eq!(
            kinds("1e4 2.5e-3 1E+2"),
            vec![
                TokenKind::Number(1e4),
                TokenKind::Number(2.5e-3),
                TokenKind::Number(1e2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn exponent_requires_digits() {
        // `2e` is the number 2 followed by the identifier `e`.
        assert_eq!(
            kinds("2e"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Ident("e".to_owned()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_elementwise_operators() {
        assert_eq!(
            kinds("a .* b ./ c .^ 2"),
            vec![
                TokenKind::Ident("a".to_owned()),
                TokenKind::DotStar,
                TokenKind::Ident("b".to_owned()),
                TokenKind::DotSlash,
                TokenKind::Ident("c".to_owned()),
                TokenKind::DotCaret,
                TokenKind::Number(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_then_elementwise_operator() {
        // `2.*x` is 2 .* x, not the number `2.` followed by `*`.
        assert_eq!(
            kinds("2.*x"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::DotStar,
                TokenKind::Ident("x".to_owned()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_transpose_and_parens() {
        assert_eq!(
            kinds("(i')"),
            vec![
                TokenKind::LParen,
                TokenKind::Ident("i".to_owned()),
                TokenKind::Quote,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn rejects_stray_dot() {
        let err = Scanner::tokenize("1 + .").expect_err("stray dot");
        assert_eq!(err.kind, ErrorKind::InvalidCharacter);
    }

    #[test]
    fn rejects_unknown_bytes() {
        let err = Scanner::tokenize("x # y").expect_err("hash");
        assert_eq!(err.kind, ErrorKind::InvalidCharacter);
        let err = Scanner::tokenize("x = 1").expect_err("equals");
        assert_eq!(err.kind, ErrorKind::InvalidCharacter);
    }
}
