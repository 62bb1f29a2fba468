//! Tokenizer for JSON templates.
//!
//! Standard JSON tokens plus [`TokenKind::Hole`], the template sentinel.

use std::fmt;

use stencil_core::SENTINEL;

use super::JsonError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Null,
    True,
    False,
    Int,
    Float,
    String,
    LeftCurly,
    RightCurly,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    /// A parameter position
    Hole,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Null => "null",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Int => "integer",
            TokenKind::Float => "number",
            TokenKind::String => "string",
            TokenKind::LeftCurly => "'{'",
            TokenKind::RightCurly => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Hole => "hole",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}

/// A token. String tokens carry their unescaped contents in `text`; number
/// tokens carry the raw lexeme.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset in the template.
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Fail unless this token is a `kind`.
    pub fn expect(self, kind: TokenKind) -> Result<Token, JsonError> {
        if self.kind == kind {
            Ok(self)
        } else {
            Err(self.unexpected(&[kind]))
        }
    }

    pub fn unexpected(&self, expected: &[TokenKind]) -> JsonError {
        JsonError::UnexpectedToken {
            expected: expected
                .iter()
                .map(TokenKind::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            found: self.kind,
            offset: self.offset,
        }
    }
}

pub struct Lexer<'src> {
    source: &'src str,
    offset: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, offset: 0 }
    }

    fn rest(&self) -> &'src str {
        &self.source[self.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| matches!(c, ' ' | '\t' | '\n' | '\r')) {
            self.offset += 1;
        }
    }

    pub fn next_token(&mut self) -> Result<Token, JsonError> {
        self.skip_whitespace();
        let start = self.offset;
        let Some(c) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, "", start));
        };

        let kind = match c {
            '{' => TokenKind::LeftCurly,
            '}' => TokenKind::RightCurly,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            SENTINEL => TokenKind::Hole,
            '"' => return self.scan_string(start),
            '-' | '0'..='9' => return self.scan_number(start),
            c if c.is_ascii_alphabetic() => return self.scan_keyword(start),
            c => return Err(JsonError::UnexpectedChar { ch: c, offset: start }),
        };
        Ok(Token::new(kind, &self.source[start..self.offset], start))
    }

    fn scan_keyword(&mut self, start: usize) -> Result<Token, JsonError> {
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.offset += 1;
        }
        let word = &self.source[start..self.offset];
        let kind = match word {
            "null" => TokenKind::Null,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => {
                return Err(JsonError::UnknownLiteral {
                    word: word.to_owned(),
                    offset: start,
                });
            }
        };
        Ok(Token::new(kind, word, start))
    }

    fn scan_number(&mut self, start: usize) -> Result<Token, JsonError> {
        let mut kind = TokenKind::Int;
        self.consume_digits();
        if self.peek() == Some('.') {
            kind = TokenKind::Float;
            self.offset += 1;
            self.consume_digits();
        }
        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            kind = TokenKind::Float;
            self.offset += 1;
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.offset += 1;
            }
            self.consume_digits();
        }
        let text = &self.source[start..self.offset];
        if !text.bytes().any(|b| b.is_ascii_digit()) {
            return Err(JsonError::InvalidNumber {
                text: text.to_owned(),
                offset: start,
            });
        }
        Ok(Token::new(kind, text, start))
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.offset += 1;
        }
    }

    fn scan_string(&mut self, start: usize) -> Result<Token, JsonError> {
        let mut text = String::new();
        loop {
            match self.advance() {
                None => return Err(JsonError::UnterminatedString { offset: start }),
                Some('"') => return Ok(Token::new(TokenKind::String, text, start)),
                Some('\\') => {
                    let escape_at = self.offset - 1;
                    let c = match self.advance() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('u') => self.scan_unicode_escape(escape_at)?,
                        _ => return Err(JsonError::InvalidEscape { offset: escape_at }),
                    };
                    text.push(c);
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn scan_unicode_escape(&mut self, escape_at: usize) -> Result<char, JsonError> {
        let digits = self.rest().get(..4).ok_or(JsonError::InvalidEscape { offset: escape_at })?;
        let code = u32::from_str_radix(digits, 16)
            .map_err(|_| JsonError::InvalidEscape { offset: escape_at })?;
        self.offset += 4;
        char::from_u32(code).ok_or(JsonError::InvalidEscape { offset: escape_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token.is(TokenKind::Eof) {
                return out;
            }
            out.push(token.kind);
        }
    }

    #[test]
    fn punctuation_and_holes() {
        assert_eq!(
            kinds("{ \"a\": \u{FFFC}, \"b\": [1, 2.5] }"),
            vec![
                TokenKind::LeftCurly,
                TokenKind::String,
                TokenKind::Colon,
                TokenKind::Hole,
                TokenKind::Comma,
                TokenKind::String,
                TokenKind::Colon,
                TokenKind::LeftBracket,
                TokenKind::Int,
                TokenKind::Comma,
                TokenKind::Float,
                TokenKind::RightBracket,
                TokenKind::RightCurly,
            ]
        );
    }

    #[test]
    fn keywords() {
        assert_eq!(
            kinds("null true false"),
            vec![TokenKind::Null, TokenKind::True, TokenKind::False]
        );
        assert!(matches!(
            Lexer::new("nope").next_token(),
            Err(JsonError::UnknownLiteral { .. })
        ));
    }

    #[test]
    fn numbers() {
        let mut lexer = Lexer::new("-12 3.24 1e3");
        let a = lexer.next_token().unwrap();
        assert_eq!((a.kind, a.text.as_str()), (TokenKind::Int, "-12"));
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Float);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Float);
        assert!(Lexer::new("-").next_token().is_err());
    }

    #[test]
    fn string_escapes() {
        let token = Lexer::new(r#""a\"b\nA""#).next_token().unwrap();
        assert_eq!(token.text, "a\"b\nA");
        assert!(matches!(
            Lexer::new("\"open").next_token(),
            Err(JsonError::UnterminatedString { offset: 0 })
        ));
        assert!(matches!(
            Lexer::new(r#""\q""#).next_token(),
            Err(JsonError::InvalidEscape { offset: 1 })
        ));
    }

    #[test]
    fn token_offsets() {
        let mut lexer = Lexer::new("  [ \u{FFFC} ]");
        assert_eq!(lexer.next_token().unwrap().offset, 2);
        let hole = lexer.next_token().unwrap();
        assert_eq!((hole.kind, hole.offset), (TokenKind::Hole, 4));
        assert_eq!(lexer.next_token().unwrap().offset, 8);
    }
}
