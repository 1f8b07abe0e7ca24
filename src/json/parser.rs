use super::error::{ParseError, ParseErrorKind};
use super::token::{Token, Tokenizer};
use super::value::{Map, Value};
use super::MAX_DEPTH;

/// Parse a complete JSON document.
///
/// Exactly one value is read; anything but whitespace after it is an error.
/// Duplicate object keys are allowed and the last occurrence wins.
///
/// # Errors
///
/// Returns [`ParseError`] for any lexical or grammatical problem, including
/// nesting deeper than [`MAX_DEPTH`].
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut parser = Parser {
        tokens: Tokenizer::new(text),
        depth: 0,
    };
    let value = parser.parse_value()?;
    let end = parser.tokens.token_start();
    match parser.tokens.next_token()? {
        Token::EndOfInput => Ok(value),
        _ => Err(ParseError::new(ParseErrorKind::TrailingContent, end)),
    }
}

struct Parser<'a> {
    tokens: Tokenizer<'a>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let start = self.tokens.token_start();
        match self.tokens.next_token()? {
            Token::OpenBrace => self.nested(start, Self::parse_object),
            Token::OpenBracket => self.nested(start, Self::parse_array),
            Token::String(s) => Ok(Value::String(s.into_owned())),
            Token::Number(n) => Ok(Value::Number(n)),
            Token::True => Ok(Value::Bool(true)),
            Token::False => Ok(Value::Bool(false)),
            Token::Null => Ok(Value::Null),
            Token::EndOfInput => Err(ParseError::new(ParseErrorKind::UnexpectedEnd, start)),
            other => Err(unexpected("a value", &other, start)),
        }
    }

    fn nested(
        &mut self,
        start: usize,
        body: fn(&mut Self) -> Result<Value, ParseError>,
    ) -> Result<Value, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::new(ParseErrorKind::DepthLimitExceeded, start));
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    // Opening brace already consumed.
    fn parse_object(&mut self) -> Result<Value, ParseError> {
        let mut map = Map::new();
        if self.tokens.peek_token()? == &Token::CloseBrace {
            self.tokens.next_token()?;
            return Ok(Value::Object(map));
        }
        loop {
            let at = self.tokens.token_start();
            let key = match self.tokens.next_token()? {
                Token::String(s) => s.into_owned(),
                other => return Err(unexpected("a member name", &other, at)),
            };
            self.expect(&Token::Colon, "':'")?;
            let value = self.parse_value()?;
            map.insert(key, value);

            let at = self.tokens.token_start();
            match self.tokens.next_token()? {
                Token::Comma => continue,
                Token::CloseBrace => return Ok(Value::Object(map)),
                other => return Err(unexpected("',' or '}'", &other, at)),
            }
        }
    }

    // Opening bracket already consumed.
    fn parse_array(&mut self) -> Result<Value, ParseError> {
        let mut items = Vec::new();
        if self.tokens.peek_token()? == &Token::CloseBracket {
            self.tokens.next_token()?;
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            let at = self.tokens.token_start();
            match self.tokens.next_token()? {
                Token::Comma => continue,
                Token::CloseBracket => return Ok(Value::Array(items)),
                other => return Err(unexpected("',' or ']'", &other, at)),
            }
        }
    }

    fn expect(&mut self, want: &Token<'_>, expected: &'static str) -> Result<(), ParseError> {
        let at = self.tokens.token_start();
        let got = self.tokens.next_token()?;
        if &got == want {
            Ok(())
        } else {
            Err(unexpected(expected, &got, at))
        }
    }
}

fn unexpected(expected: &'static str, found: &Token<'_>, at: usize) -> ParseError {
    if *found == Token::EndOfInput {
        return ParseError::new(ParseErrorKind::UnexpectedEnd, at);
    }
    ParseError::new(
        ParseErrorKind::UnexpectedToken {
            expected,
            found: found.describe(),
        },
        at,
    )
}
