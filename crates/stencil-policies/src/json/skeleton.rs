//! Parsed JSON templates with holes.
//!
//! A [`Skeleton`] is parsed once and filled many times. Holes are numbered
//! in the order they appear, which is also the parameter order of the
//! template.

use ordered_float::OrderedFloat;
use rustc_hash::FxHashSet;
use stencil_core::Dynamic;

use super::JsonError;
use super::lexer::{Lexer, Token, TokenKind};
use super::value::{JsonObject, JsonValue};

/// Deepest nesting of arrays and objects a template may use.
const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Value(JsonValue),
    Hole(usize),
    Array(Vec<Node>),
    Object(Vec<(String, Node)>),
}

/// A JSON document whose leaves may be holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    root: Node,
    holes: usize,
}

impl Skeleton {
    /// Parse a template. The top level must be an object or an array.
    pub fn parse(source: &str) -> Result<Self, JsonError> {
        let mut parser = Parser {
            lexer: Lexer::new(source),
            holes: 0,
            depth: 0,
        };
        let token = parser.next()?;
        let root = match token.kind {
            TokenKind::LeftCurly | TokenKind::LeftBracket => parser.parse_nested(&token)?,
            _ => return Err(token.unexpected(&[TokenKind::LeftCurly, TokenKind::LeftBracket])),
        };
        parser.next()?.expect(TokenKind::Eof)?;
        Ok(Self {
            root,
            holes: parser.holes,
        })
    }

    /// Number of holes.
    pub fn holes(&self) -> usize {
        self.holes
    }

    /// Build a value, taking hole `i` from `args[i]`.
    pub fn fill(&self, args: &[Dynamic]) -> Result<JsonValue, JsonError> {
        if args.len() != self.holes {
            return Err(JsonError::ArgumentCount {
                expected: self.holes,
                actual: args.len(),
            });
        }
        fill_node(&self.root, args)
    }
}

fn fill_node(node: &Node, args: &[Dynamic]) -> Result<JsonValue, JsonError> {
    Ok(match node {
        Node::Value(value) => value.clone(),
        Node::Hole(index) => {
            let arg = args.get(*index).ok_or(JsonError::ArgumentCount {
                expected: index + 1,
                actual: args.len(),
            })?;
            JsonValue::from_dynamic(arg)?
        }
        Node::Array(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| fill_node(item, args))
                .collect::<Result<_, _>>()?,
        ),
        Node::Object(entries) => {
            let mut object = JsonObject::new();
            for (key, value) in entries {
                object.push(key.clone(), fill_node(value, args)?);
            }
            JsonValue::Object(object)
        }
    })
}

struct Parser<'src> {
    lexer: Lexer<'src>,
    holes: usize,
    depth: usize,
}

impl Parser<'_> {
    fn next(&mut self) -> Result<Token, JsonError> {
        self.lexer.next_token()
    }

    fn parse_value(&mut self, token: Token) -> Result<Node, JsonError> {
        Ok(match token.kind {
            TokenKind::Null => Node::Value(JsonValue::Null),
            TokenKind::True => Node::Value(JsonValue::Bool(true)),
            TokenKind::False => Node::Value(JsonValue::Bool(false)),
            TokenKind::Int => {
                let value = token.text.parse::<i64>().map_err(|_| JsonError::InvalidNumber {
                    text: token.text.clone(),
                    offset: token.offset,
                })?;
                Node::Value(JsonValue::Int(value))
            }
            TokenKind::Float => {
                let value = token.text.parse::<f64>().map_err(|_| JsonError::InvalidNumber {
                    text: token.text.clone(),
                    offset: token.offset,
                })?;
                Node::Value(JsonValue::Float(OrderedFloat(value)))
            }
            TokenKind::String => Node::Value(JsonValue::String(token.text)),
            TokenKind::Hole => {
                let index = self.holes;
                self.holes += 1;
                Node::Hole(index)
            }
            TokenKind::LeftCurly | TokenKind::LeftBracket => self.parse_nested(&token)?,
            _ => {
                return Err(token.unexpected(&[
                    TokenKind::Null,
                    TokenKind::True,
                    TokenKind::False,
                    TokenKind::Int,
                    TokenKind::Float,
                    TokenKind::String,
                    TokenKind::Hole,
                    TokenKind::LeftCurly,
                    TokenKind::LeftBracket,
                ]));
            }
        })
    }

    /// Parse the array or object opened by `token`, one level deeper.
    fn parse_nested(&mut self, token: &Token) -> Result<Node, JsonError> {
        if self.depth >= MAX_DEPTH {
            return Err(JsonError::TooDeep {
                limit: MAX_DEPTH,
                offset: token.offset,
            });
        }
        self.depth += 1;
        let node = if token.is(TokenKind::LeftCurly) {
            self.parse_object(token.offset)
        } else {
            self.parse_array()
        };
        self.depth -= 1;
        node
    }

    fn parse_object(&mut self, start: usize) -> Result<Node, JsonError> {
        let mut entries = Vec::new();
        let mut seen = FxHashSet::default();
        let mut token = self.next()?;
        if token.is(TokenKind::RightCurly) {
            return Ok(Node::Object(entries));
        }
        loop {
            let key = token.expect(TokenKind::String)?;
            if !seen.insert(key.text.clone()) {
                return Err(JsonError::DuplicateKey {
                    key: key.text,
                    offset: key.offset,
                });
            }
            self.next()?.expect(TokenKind::Colon)?;
            let value_token = self.next()?;
            let value = self.parse_value(value_token)?;
            entries.push((key.text, value));

            token = self.next()?;
            match token.kind {
                TokenKind::RightCurly => return Ok(Node::Object(entries)),
                TokenKind::Comma => token = self.next()?,
                TokenKind::Eof => return Err(JsonError::Unclosed { offset: start }),
                _ => return Err(token.unexpected(&[TokenKind::Comma, TokenKind::RightCurly])),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Node, JsonError> {
        let mut items = Vec::new();
        let mut token = self.next()?;
        if token.is(TokenKind::RightBracket) {
            return Ok(Node::Array(items));
        }
        loop {
            items.push(self.parse_value(token)?);
            token = self.next()?;
            match token.kind {
                TokenKind::RightBracket => return Ok(Node::Array(items)),
                TokenKind::Comma => token = self.next()?,
                _ => return Err(token.unexpected(&[TokenKind::Comma, TokenKind::RightBracket])),
            }
        }
    }
}
