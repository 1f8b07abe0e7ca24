use std::borrow::Cow;

use super::error::{ParseError, ParseErrorKind};

/// Lexical tokens of a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Colon,
    Comma,
    /// Unescaped string contents; borrowed when the literal had no escapes
    String(Cow<'a, str>),
    Number(f64),
    True,
    False,
    Null,
    EndOfInput,
}

impl Token<'_> {
    /// Short description used in parse errors.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Token::OpenBrace => "'{'",
            Token::CloseBrace => "'}'",
            Token::OpenBracket => "'['",
            Token::CloseBracket => "']'",
            Token::Colon => "':'",
            Token::Comma => "','",
            Token::String(_) => "string",
            Token::Number(_) => "number",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::EndOfInput => "end of input",
        }
    }
}

/// Lazy tokenizer over a borrowed buffer.
///
/// `peek_token` never moves the position; `next_token` does. The position is
/// a plain byte offset, so a scan can be restarted anywhere with `seek`.
#[derive(Debug)]
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    /// Token starting at `pos` and the offset just past it
    peeked: Option<(Token<'a>, usize)>,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            peeked: None,
        }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Restart scanning at `pos` (clamped to the input length).
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.src.len());
        self.peeked = None;
    }

    /// Offset of the next token once leading whitespace is skipped.
    #[must_use]
    pub fn token_start(&self) -> usize {
        self.skip_whitespace(self.pos)
    }

    /// Look at the next token without consuming it.
    ///
    /// # Errors
    ///
    /// Lexical errors in the upcoming token.
    pub fn peek_token(&mut self) -> Result<&Token<'a>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan(self.pos)?);
        }
        match &self.peeked {
            Some((token, _)) => Ok(token),
            None => Err(ParseError::new(ParseErrorKind::UnexpectedEnd, self.pos)),
        }
    }

    /// Consume and return the next token.
    ///
    /// # Errors
    ///
    /// Lexical errors in the upcoming token.
    pub fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        let (token, end) = match self.peeked.take() {
            Some(scanned) => scanned,
            None => self.scan(self.pos)?,
        };
        self.pos = end;
        Ok(token)
    }

    fn skip_whitespace(&self, mut pos: usize) -> usize {
        let bytes = self.src.as_bytes();
        while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\r' | b'\n') {
            pos += 1;
        }
        pos
    }

    fn scan(&self, from: usize) -> Result<(Token<'a>, usize), ParseError> {
        let start = self.skip_whitespace(from);
        let bytes = self.src.as_bytes();
        let Some(&b) = bytes.get(start) else {
            return Ok((Token::EndOfInput, start));
        };
        let single = |t: Token<'a>| Ok((t, start + 1));
        match b {
            b'{' => single(Token::OpenBrace),
            b'}' => single(Token::CloseBrace),
            b'[' => single(Token::OpenBracket),
            b']' => single(Token::CloseBracket),
            b':' => single(Token::Colon),
            b',' => single(Token::Comma),
            b'"' => self.scan_string(start),
            b'-' | b'0'..=b'9' => self.scan_number(start),
            b't' => self.scan_literal(start, "true", Token::True),
            b'f' => self.scan_literal(start, "false", Token::False),
            b'n' => self.scan_literal(start, "null", Token::Null),
            _ => Err(self.unexpected_char(start)),
        }
    }

    fn unexpected_char(&self, pos: usize) -> ParseError {
        let c = self.src[pos..].chars().next().unwrap_or('\0');
        ParseError::new(ParseErrorKind::UnexpectedCharacter(c), pos)
    }

    fn scan_literal(
        &self,
        start: usize,
        word: &'static str,
        token: Token<'a>,
    ) -> Result<(Token<'a>, usize), ParseError> {
        if self.src[start..].starts_with(word) {
            Ok((token, start + word.len()))
        } else {
            Err(self.unexpected_char(start))
        }
    }

    fn scan_number(&self, start: usize) -> Result<(Token<'a>, usize), ParseError> {
        let bytes = self.src.as_bytes();
        let invalid = || ParseError::new(ParseErrorKind::InvalidNumber, start);
        let digits = |mut p: usize| {
            let from = p;
            while p < bytes.len() && bytes[p].is_ascii_digit() {
                p += 1;
            }
            (p, p - from)
        };

        let mut pos = start;
        if bytes[pos] == b'-' {
            pos += 1;
        }
        let (end, count) = digits(pos);
        // No leading zeros: `0` is fine, `01` is not.
        if count == 0 || (count > 1 && bytes[pos] == b'0') {
            return Err(invalid());
        }
        pos = end;
        if bytes.get(pos) == Some(&b'.') {
            let (end, count) = digits(pos + 1);
            if count == 0 {
                return Err(invalid());
            }
            pos = end;
        }
        if matches!(bytes.get(pos), Some(b'e' | b'E')) {
            pos += 1;
            if matches!(bytes.get(pos), Some(b'+' | b'-')) {
                pos += 1;
            }
            let (end, count) = digits(pos);
            if count == 0 {
                return Err(invalid());
            }
            pos = end;
        }
        let n: f64 = self.src[start..pos].parse().map_err(|_| invalid())?;
        if !n.is_finite() {
            return Err(invalid());
        }
        Ok((Token::Number(n), pos))
    }

    fn scan_string(&self, start: usize) -> Result<(Token<'a>, usize), ParseError> {
        let bytes = self.src.as_bytes();
        let body = start + 1;

        // Fast path: no escapes, borrow the slice as-is.
        let mut pos = body;
        while pos < bytes.len() && bytes[pos] != b'"' && bytes[pos] != b'\\' {
            pos += 1;
        }
        match bytes.get(pos) {
            None => return Err(ParseError::new(ParseErrorKind::UnterminatedString, start)),
            Some(b'"') => return Ok((Token::String(Cow::Borrowed(&self.src[body..pos])), pos + 1)),
            Some(_) => {}
        }

        let mut out = String::with_capacity(pos - body + 16);
        out.push_str(&self.src[body..pos]);
        loop {
            match bytes.get(pos) {
                None => return Err(ParseError::new(ParseErrorKind::UnterminatedString, start)),
                Some(b'"') => return Ok((Token::String(Cow::Owned(out)), pos + 1)),
                Some(b'\\') => {
                    pos = self.unescape(pos, &mut out)?;
                }
                Some(_) => {
                    let run = pos;
                    while pos < bytes.len() && bytes[pos] != b'"' && bytes[pos] != b'\\' {
                        pos += 1;
                    }
                    out.push_str(&self.src[run..pos]);
                }
            }
        }
    }

    /// Decode the escape at `pos` (which holds the backslash) into `out`,
    /// returning the offset just past it.
    fn unescape(&self, pos: usize, out: &mut String) -> Result<usize, ParseError> {
        let bytes = self.src.as_bytes();
        let invalid = || ParseError::new(ParseErrorKind::InvalidEscape, pos);
        let Some(&esc) = bytes.get(pos + 1) else {
            return Err(invalid());
        };
        let simple = match esc {
            b'"' => Some('"'),
            b'\\' => Some('\\'),
            b'/' => Some('/'),
            b'b' => Some('\u{0008}'),
            b'f' => Some('\u{000C}'),
            b'n' => Some('\n'),
            b'r' => Some('\r'),
            b't' => Some('\t'),
            b'u' => None,
            _ => return Err(invalid()),
        };
        if let Some(c) = simple {
            out.push(c);
            return Ok(pos + 2);
        }

        let unit = self.hex4(pos + 2).ok_or_else(invalid)?;
        let mut next = pos + 6;
        let c = match unit {
            0xD800..=0xDBFF => {
                // High surrogate: pair with a following \uDC00-\uDFFF if present.
                let low = if self.src[next..].starts_with("\\u") {
                    self.hex4(next + 2).filter(|u| (0xDC00..=0xDFFF).contains(u))
                } else {
                    None
                };
                match low {
                    Some(low) => {
                        next += 6;
                        let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                        char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
                    }
                    None => char::REPLACEMENT_CHARACTER,
                }
            }
            _ => char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER),
        };
        out.push(c);
        Ok(next)
    }

    fn hex4(&self, pos: usize) -> Option<u32> {
        let digits = self.src.get(pos..pos + 4)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok()
    }
}
