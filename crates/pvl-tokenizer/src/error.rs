//! Tokenizer errors.

use crate::Span;

/// What went wrong while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeErrorKind {
    /// A byte that is neither printable ASCII nor whitespace.
    BinaryData,
    /// A quote, bracket, unit or block comment was never closed.
    Unterminated {
        /// The closing delimiter that was expected.
        delimiter: &'static str,
    },
}

/// A tokenizer error with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeError {
    /// The kind of error.
    pub kind: TokenizeErrorKind,
    /// Where the problem starts.
    pub span: Span,
    /// Key of the statement being read, if any.
    pub key: Option<String>,
}

impl TokenizeError {
    /// Create a new tokenizer error.
    pub fn new(kind: TokenizeErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            key: None,
        }
    }

    /// Attach the key of the statement that was being read.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Short description without location.
    pub fn message(&self) -> String {
        let base = match &self.kind {
            TokenizeErrorKind::BinaryData => {
                "ASCII data expected but found unprintable (binary) data".to_string()
            }
            TokenizeErrorKind::Unterminated { delimiter } => {
                format!("Missing {} [{}]", delimiter_name(delimiter), delimiter)
            }
        };
        match &self.key {
            Some(key) => format!("{} while reading keyword [{}]", base, key),
            None => base,
        }
    }
}

fn delimiter_name(delimiter: &str) -> &'static str {
    match delimiter {
        ")" => "right parenthesis",
        "}" => "right brace",
        "\"" => "right double quote",
        "'" => "right single quote",
        ">" => "right angle bracket",
        "*/" => "end of comment",
        _ => "closing delimiter",
    }
}

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message(), self.span.start)
    }
}

impl std::error::Error for TokenizeError {}
