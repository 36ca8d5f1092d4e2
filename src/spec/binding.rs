//! Binding expressions: `@binding(<path>[, converter=<name>])`.
//!
//! A property value in the specification tree is either a literal or a
//! binding expression. The surface form is recognized by its wrapper alone:
//! any string that does not start with `@binding(` and end with `)` is a
//! literal. Inside the wrapper a small closed grammar applies:
//!
//! ```text
//! binding   := path ( "," "converter" "=" ident )?
//! path      := ident ( "." ident )*
//! ```
//!
//! The inner text is tokenized with logos and parsed once, when the node is
//! built or deserialized, into a typed [`BindingExpr`].

use std::fmt;

use logos::Logos;

const PREFIX: &str = "@binding(";
const SUFFIX: &str = ")";
const CONVERTER: &str = "converter";

/// Errors from parsing the inner text of a binding expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("invalid character in binding expression at byte {position}")]
    InvalidCharacter { position: usize },
    #[error("unexpected token at byte {position}: expected {expected}, got '{found}'")]
    UnexpectedToken {
        position: usize,
        expected: &'static str,
        found: String,
    },
    #[error("unexpected end of binding expression: expected {0}")]
    UnexpectedEnd(&'static str),
    #[error("unknown binding option '{0}'")]
    UnknownOption(String),
}

// Lets builders accept already-typed values next to surface text.
impl From<std::convert::Infallible> for BindingError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// Token produced by the binding lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r]+")]
enum Token {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[token(".")]
    Dot,

    #[token(",")]
    Comma,

    #[token("=")]
    Equals,
}

/// A token with its source text and byte offset.
#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    position: usize,
}

fn tokenize(input: &str) -> Result<Vec<PToken>, BindingError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => tokens.push(PToken {
                token,
                text: input[span.clone()].to_string(),
                position: span.start,
            }),
            Err(()) => return Err(BindingError::InvalidCharacter { position: span.start }),
        }
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// BindingExpr
// ---------------------------------------------------------------------------

/// A parsed binding expression.
///
/// The path is rooted at the handler: every segment but the last is an
/// attribute lookup yielding a nested object, the last is the bound property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingExpr {
    path: Vec<String>,
    converter: Option<String>,
}

impl BindingExpr {
    /// Build a binding expression directly from its parts.
    ///
    /// `path` is a dotted attribute path such as `"sub.value"`.
    pub fn new(path: &str, converter: Option<&str>) -> Result<Self, BindingError> {
        let mut parser = Parser::new(tokenize(path)?);
        let path = parser.parse_path()?;
        parser.expect_end()?;
        Ok(Self {
            path,
            converter: converter.map(str::to_owned),
        })
    }

    /// Recognize and parse a property value.
    ///
    /// Returns `Ok(None)` when `input` is not wrapped in `@binding(...)`; the
    /// caller treats it as a literal. Returns an error only when the wrapper
    /// is present but its contents do not follow the grammar.
    pub fn parse(input: &str) -> Result<Option<Self>, BindingError> {
        let Some(inner) = input
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.strip_suffix(SUFFIX))
        else {
            return Ok(None);
        };
        if inner.is_empty() {
            return Ok(None);
        }
        let mut parser = Parser::new(tokenize(inner)?);
        let path = parser.parse_path()?;
        let converter = parser.parse_options()?;
        parser.expect_end()?;
        Ok(Some(Self { path, converter }))
    }

    /// Whether `input` carries the binding wrapper.
    pub fn is_binding(input: &str) -> bool {
        input.len() > PREFIX.len() + SUFFIX.len()
            && input.starts_with(PREFIX)
            && input.ends_with(SUFFIX)
    }

    /// All path segments, including the leaf property.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Segments leading to the source object (everything but the leaf).
    pub fn source_path(&self) -> &[String] {
        &self.path[..self.path.len() - 1]
    }

    /// The leaf property name on the source object.
    pub fn property(&self) -> &str {
        &self.path[self.path.len() - 1]
    }

    /// The converter name, resolved against the root handler.
    pub fn converter(&self) -> Option<&str> {
        self.converter.as_deref()
    }

    /// Set the converter (builder).
    pub fn with_converter(mut self, converter: impl Into<String>) -> Self {
        self.converter = Some(converter.into());
        self
    }
}

impl fmt::Display for BindingExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.path.join("."))?;
        if let Some(converter) = &self.converter {
            write!(f, ", {CONVERTER}={converter}")?;
        }
        write!(f, "{SUFFIX}")
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<PToken>,
    cursor: usize,
}

impl Parser {
    fn new(tokens: Vec<PToken>) -> Self {
        Self { tokens, cursor: 0 }
    }

    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> Result<PToken, BindingError> {
        match self.tokens.get(self.cursor) {
            Some(tok) if tok.token == expected => {
                self.cursor += 1;
                Ok(tok.clone())
            }
            Some(tok) => Err(BindingError::UnexpectedToken {
                position: tok.position,
                expected: what,
                found: tok.text.clone(),
            }),
            None => Err(BindingError::UnexpectedEnd(what)),
        }
    }

    fn parse_path(&mut self) -> Result<Vec<String>, BindingError> {
        let mut segments = vec![self.expect(Token::Ident, "attribute name")?.text];
        while matches!(self.peek(), Some(tok) if tok.token == Token::Dot) {
            self.cursor += 1;
            segments.push(self.expect(Token::Ident, "attribute name")?.text);
        }
        Ok(segments)
    }

    fn parse_options(&mut self) -> Result<Option<String>, BindingError> {
        let mut converter = None;
        while matches!(self.peek(), Some(tok) if tok.token == Token::Comma) {
            self.cursor += 1;
            let option = self.expect(Token::Ident, "option name")?;
            if option.text != CONVERTER {
                return Err(BindingError::UnknownOption(option.text));
            }
            self.expect(Token::Equals, "'='")?;
            converter = Some(self.expect(Token::Ident, "converter name")?.text);
        }
        Ok(converter)
    }

    fn expect_end(&self) -> Result<(), BindingError> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => Err(BindingError::UnexpectedToken {
                position: tok.position,
                expected: "end of expression",
                found: tok.text.clone(),
            }),
        }
    }
}
