//! Tokenizer for PVL label text.

use crate::{Span, Token, TokenKind, TokenValue, TokenizeError, TokenizeErrorKind};
use tracing::trace;

/// A tokenizer that reads PVL statements from label bytes.
///
/// Reading stops at the end of input, at the first NUL byte, or right after
/// the terminator statement (normally `End`).
#[derive(Clone)]
pub struct Tokenizer<'src> {
    /// The source bytes not yet consumed.
    remaining: &'src [u8],
    /// Current byte position in the original source.
    pos: u32,
}

impl<'src> Tokenizer<'src> {
    /// Create a new tokenizer for the given source bytes.
    pub fn new(source: &'src [u8]) -> Self {
        Self::at(source, 0)
    }

    /// Create a tokenizer for a fragment that starts at `offset` in a larger source.
    fn at(source: &'src [u8], offset: u32) -> Self {
        Self {
            remaining: source,
            pos: offset,
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Peek at the next byte. NUL reads as end of input.
    #[inline]
    fn peek(&self) -> Result<Option<u8>, TokenizeError> {
        match self.remaining.first() {
            None | Some(0) => Ok(None),
            Some(&b) if is_text_byte(b) => Ok(Some(b)),
            Some(_) => Err(TokenizeError::new(
                TokenizeErrorKind::BinaryData,
                Span::new(self.pos, self.pos + 1),
            )),
        }
    }

    /// Peek at the nth byte without validating it.
    #[inline]
    fn peek_nth(&self, n: usize) -> Option<u8> {
        self.remaining.get(n).copied()
    }

    /// Advance by one byte.
    #[inline]
    fn advance(&mut self) {
        if !self.remaining.is_empty() {
            self.pos += 1;
            self.remaining = &self.remaining[1..];
        }
    }

    /// Check if the remaining text starts with the given prefix.
    #[inline]
    fn starts_with(&self, prefix: &[u8]) -> bool {
        self.remaining.starts_with(prefix)
    }

    fn unterminated(&self, delimiter: &'static str, start: u32) -> TokenizeError {
        TokenizeError::new(
            TokenizeErrorKind::Unterminated { delimiter },
            Span::new(start, self.pos.max(start)),
        )
    }

    /// Read every statement up to and including the terminator.
    pub fn load(mut self, terminator: &str) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut newline_pending = false;

        loop {
            let newline = self.skip_whitespace()? | std::mem::take(&mut newline_pending);
            let Some(c) = self.peek()? else {
                return Ok(tokens);
            };

            if c == b'#' || (c == b'/' && matches!(self.peek_nth(1), Some(b'*' | b'/'))) {
                let start = self.pos;
                let text = if c == b'/' && self.peek_nth(1) == Some(b'*') {
                    self.read_block_comment()?
                } else {
                    self.read_line_comment()?
                };
                match tokens.last_mut() {
                    Some(previous) if !newline && !previous.is_comment() => {
                        trace!("Inline comment for {:?}: {:?}", previous.key, text);
                        previous.inline_comment = Some(text);
                    }
                    _ => tokens.push(self.token(Token::comment(text, Span::new(start, self.pos)))),
                }
                continue;
            }

            let start = self.pos;
            let key = self.read_bare(false)?;
            let span = Span::new(start, self.pos);
            let kind = TokenKind::classify(&key, terminator);
            let mut token = Token::new(kind, key, span);

            if kind == TokenKind::End {
                tokens.push(self.token(token));
                return Ok(tokens);
            }

            newline_pending = self.skip_whitespace()?;
            if self.peek()? != Some(b'=') {
                tokens.push(self.token(token));
                continue;
            }
            self.advance();
            newline_pending = false;
            self.skip_whitespace()?;

            let values = self
                .read_value()
                .map_err(|e| e.with_key(token.key.clone()))?;
            token.values = values;
            tokens.push(self.token(token));
        }
    }

    fn token(&self, token: Token) -> Token {
        trace!(
            "Token {:?} at {:?}: {:?} = {:?}",
            token.kind, token.span, token.key, token.values
        );
        token
    }

    /// Read the right-hand side of an assignment.
    fn read_value(&mut self) -> Result<Vec<TokenValue>, TokenizeError> {
        match self.peek()? {
            None => Ok(Vec::new()),
            Some(b'(') => self.read_list(b'(', b')', ")"),
            Some(b'{') => self.read_list(b'{', b'}', "}"),
            Some(q @ (b'"' | b'\'')) => {
                let text = self.read_quoted(q)?;
                let unit = self.read_unit()?;
                Ok(vec![TokenValue { text, unit }])
            }
            Some(_) => {
                let text = self.read_bare(true)?;
                let unit = self.read_unit()?;
                Ok(vec![TokenValue { text, unit }])
            }
        }
    }

    /// Skip whitespace and report whether a line break was crossed.
    fn skip_whitespace(&mut self) -> Result<bool, TokenizeError> {
        let mut newline = false;
        while let Some(c) = self.peek()? {
            if !is_space(c) {
                break;
            }
            if c == b'\n' || c == b'\r' {
                newline = true;
            }
            self.advance();
        }
        Ok(newline)
    }

    /// Skip spaces and tabs only.
    fn skip_blanks(&mut self) -> Result<(), TokenizeError> {
        while let Some(b' ' | b'\t') = self.peek()? {
            self.advance();
        }
        Ok(())
    }

    /// Read a `#` or `//` comment up to the end of the line.
    fn read_line_comment(&mut self) -> Result<String, TokenizeError> {
        let mut text = Vec::new();
        while let Some(c) = self.peek()? {
            if c == b'\n' || c == b'\r' {
                break;
            }
            text.push(c);
            self.advance();
        }
        Ok(into_string(text).trim_end().to_string())
    }

    /// Read a `/* ... */` comment including its delimiters.
    fn read_block_comment(&mut self) -> Result<String, TokenizeError> {
        let start = self.pos;
        let mut text = b"/*".to_vec();
        self.advance();
        self.advance();
        loop {
            if self.starts_with(b"*/") {
                self.advance();
                self.advance();
                text.extend_from_slice(b"*/");
                return Ok(into_string(text));
            }
            match self.peek()? {
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
                None => return Err(self.unterminated("*/", start)),
            }
        }
    }

    /// Read an unquoted run. Keys stop at whitespace or `=`, values also stop at `<`.
    ///
    /// A value ending in `-` at the end of a line continues on the next one:
    /// the `-` and the line break are dropped.
    fn read_bare(&mut self, is_value: bool) -> Result<String, TokenizeError> {
        let mut text = Vec::new();
        loop {
            while let Some(c) = self.peek()? {
                if is_space(c) || c == b'=' || (is_value && c == b'<' && !text.is_empty()) {
                    break;
                }
                text.push(c);
                self.advance();
            }
            if !(is_value && text.last() == Some(&b'-') && self.at_line_end()) {
                break;
            }
            text.pop();
            self.skip_whitespace()?;
        }
        Ok(into_string(text))
    }

    /// Whether only spaces or tabs stand between the cursor and a line break.
    fn at_line_end(&self) -> bool {
        self.remaining
            .iter()
            .find(|&&c| c != b' ' && c != b'\t')
            .is_some_and(|&c| c == b'\n' || c == b'\r')
    }

    /// Read a quoted string, starting at the opening quote.
    fn read_quoted(&mut self, quote: u8) -> Result<String, TokenizeError> {
        let raw = self.read_quoted_raw(quote)?;
        Ok(collapse_newlines(&raw))
    }

    fn read_quoted_raw(&mut self, quote: u8) -> Result<String, TokenizeError> {
        let start = self.pos;
        self.advance();
        let mut text = Vec::new();
        loop {
            match self.peek()? {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(into_string(text));
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
                None => {
                    let delimiter = if quote == b'"' { "\"" } else { "'" };
                    return Err(self.unterminated(delimiter, start));
                }
            }
        }
    }

    /// Read a bracketed body, starting at the opening bracket.
    ///
    /// Nested brackets of the same kind and quoted text are kept verbatim.
    fn read_enclosed(
        &mut self,
        open: u8,
        close: u8,
        delimiter: &'static str,
    ) -> Result<String, TokenizeError> {
        let start = self.pos;
        self.advance();
        let mut depth = 1usize;
        let mut body = Vec::new();
        loop {
            match self.peek()? {
                None => return Err(self.unterminated(delimiter, start)),
                Some(q @ (b'"' | b'\'')) => {
                    let quoted = self.read_quoted_raw(q)?;
                    body.push(q);
                    body.extend_from_slice(quoted.as_bytes());
                    body.push(q);
                }
                Some(c) => {
                    self.advance();
                    if c == open {
                        depth += 1;
                    } else if c == close {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(into_string(body));
                        }
                    }
                    body.push(c);
                }
            }
        }
    }

    /// Read a `(...)` or `{...}` list and the unit that may follow it.
    fn read_list(
        &mut self,
        open: u8,
        close: u8,
        delimiter: &'static str,
    ) -> Result<Vec<TokenValue>, TokenizeError> {
        let body_start = self.pos + 1;
        let body = self.read_enclosed(open, close, delimiter)?;
        let mut values = Tokenizer::at(body.as_bytes(), body_start).list_elements()?;
        if let Some(unit) = self.read_unit()? {
            for value in values.iter_mut().filter(|v| v.unit.is_none()) {
                value.unit = Some(unit.clone());
            }
        }
        Ok(values)
    }

    /// Split a list body on top-level commas.
    fn list_elements(mut self) -> Result<Vec<TokenValue>, TokenizeError> {
        let mut values = Vec::new();
        let mut current = TokenValue::default();
        let mut continued = false;
        loop {
            let before = self.pos;
            self.skip_whitespace()?;
            let had_space = self.pos > before;
            let Some(c) = self.peek()? else { break };
            match c {
                b',' => {
                    self.advance();
                    values.push(std::mem::take(&mut current));
                    continued = false;
                }
                b'"' | b'\'' => {
                    let text = self.read_quoted(c)?;
                    current.text.push_str(&text);
                }
                b'(' | b'{' => {
                    let (close, delimiter) = if c == b'(' { (b')', ")") } else { (b'}', "}") };
                    let inner = self.read_enclosed(c, close, delimiter)?;
                    current.text.push(c as char);
                    current.text.push_str(&inner);
                    current.text.push(close as char);
                }
                b'<' => {
                    current.unit = self.read_unit()?;
                }
                _ => {
                    let mut run = self.read_list_run()?;
                    if had_space && !continued && !current.text.is_empty() {
                        current.text.push(' ');
                    }
                    continued = run.ends_with('-') && self.at_line_end();
                    if continued {
                        run.pop();
                    }
                    current.text.push_str(&run);
                }
            }
        }
        values.push(current);
        Ok(values)
    }

    /// Read an unquoted run inside a list body.
    fn read_list_run(&mut self) -> Result<String, TokenizeError> {
        let mut text = Vec::new();
        while let Some(c) = self.peek()? {
            if is_space(c) || matches!(c, b',' | b'<' | b'(' | b'{' | b'"' | b'\'') {
                break;
            }
            text.push(c);
            self.advance();
        }
        if text.is_empty() {
            // A stray closing bracket or similar: take it literally.
            if let Some(c) = self.peek()? {
                text.push(c);
                self.advance();
            }
        }
        Ok(into_string(text))
    }

    /// Read a `<unit>` if one follows on the same line.
    fn read_unit(&mut self) -> Result<Option<String>, TokenizeError> {
        self.skip_blanks()?;
        if self.peek()? != Some(b'<') {
            return Ok(None);
        }
        let start = self.pos;
        self.advance();
        let mut text = Vec::new();
        loop {
            match self.peek()? {
                Some(b'>') => {
                    self.advance();
                    return Ok(Some(into_string(text).trim().to_string()));
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
                None => return Err(self.unterminated(">", start)),
            }
        }
    }
}

/// Tokenize `source`, stopping after `terminator`.
pub fn tokenize(source: &[u8], terminator: &str) -> Result<Vec<Token>, TokenizeError> {
    Tokenizer::new(source).load(terminator)
}

/// Split the body of a bracketed value list into its values.
///
/// Commas nested inside quotes or brackets do not split. Nested brackets are
/// kept verbatim, quotes are removed, and a trailing `<unit>` is attached to
/// the element it follows.
pub fn parse_comma_list(body: &str) -> Result<Vec<TokenValue>, TokenizeError> {
    Tokenizer::new(body.as_bytes()).list_elements()
}

/// Collapse line breaks inside a quoted value.
///
/// Each break and the whitespace around it becomes one space, or nothing
/// when the text after the break starts with a comma. A `-` ending the line
/// joins the two lines directly and is dropped.
fn collapse_newlines(raw: &str) -> String {
    let mut text = raw.to_string();
    while let Some(pos) = text.find(['\n', '\r']) {
        let first = text[..pos].trim_end();
        let second = text[pos + 1..].trim_start();
        let (first, joiner) = match first.strip_suffix('-') {
            Some(stem) => (stem, ""),
            None if first.is_empty() || second.is_empty() || second.starts_with(',') => (first, ""),
            None => (first, " "),
        };
        text = format!("{}{}{}", first, joiner, second);
    }
    text
}

#[inline]
fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

#[inline]
fn is_text_byte(c: u8) -> bool {
    (0x20..0x7f).contains(&c) || is_space(c)
}

/// The tokenizer only ever collects validated ASCII bytes.
fn into_string(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
