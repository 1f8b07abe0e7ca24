use std::fmt;

/// What went wrong while tokenizing or parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// A character that cannot start any token
    UnexpectedCharacter(char),
    /// A well-formed token in the wrong place
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
    },
    /// Input ended inside a value
    UnexpectedEnd,
    UnterminatedString,
    /// Unknown escape or malformed `\uXXXX`
    InvalidEscape,
    InvalidNumber,
    /// A complete value was followed by more tokens
    TrailingContent,
    /// Nesting deeper than [`MAX_DEPTH`](super::MAX_DEPTH)
    DepthLimitExceeded,
}

/// The single parse-failure condition. No partial result is ever returned
/// alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset into the input where the problem was detected
    pub position: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::UnexpectedCharacter(c) => {
                write!(f, "unexpected character '{}' at {}", c.escape_debug(), self.position)
            }
            ParseErrorKind::UnexpectedToken { expected, found } => write!(
                f,
                "expected {expected} but found {found} at {}",
                self.position
            ),
            ParseErrorKind::UnexpectedEnd => write!(f, "unexpected end of input at {}", self.position),
            ParseErrorKind::UnterminatedString => {
                write!(f, "unterminated string starting at {}", self.position)
            }
            ParseErrorKind::InvalidEscape => write!(f, "invalid escape sequence at {}", self.position),
            ParseErrorKind::InvalidNumber => write!(f, "invalid number at {}", self.position),
            ParseErrorKind::TrailingContent => {
                write!(f, "unexpected content after document at {}", self.position)
            }
            ParseErrorKind::DepthLimitExceeded => {
                write!(f, "document nested too deeply at {}", self.position)
            }
        }
    }
}

impl std::error::Error for ParseError {}
