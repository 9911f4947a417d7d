//! Error type shared by every PVL crate.

use pvl_tokenizer::{Span, TokenizeError, TokenizeErrorKind};

/// Broad category of a [`PvlError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed label text or structure.
    Parse,
    /// A keyword, group or object is absent.
    NotFound,
    /// An index outside `[0, len)`.
    Index,
    /// A file could not be opened, read or written.
    Io,
    /// A document does not satisfy a validation template.
    Validation,
}

impl ErrorKind {
    fn label(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse error",
            ErrorKind::NotFound => "not found",
            ErrorKind::Index => "index out of range",
            ErrorKind::Io => "i/o error",
            ErrorKind::Validation => "validation error",
        }
    }
}

/// An error raised while reading, querying, writing or validating PVL.
///
/// Context is added by wrapping: [`PvlError::context`] returns a new error
/// whose [`cause`](PvlError::cause) is the original.
#[derive(Debug, Clone, PartialEq)]
pub struct PvlError {
    /// The kind of error.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Source location, when the error came from label text.
    pub span: Option<Span>,
    /// Suggestion shown in rendered diagnostics.
    pub help: Option<String>,
    /// The error this one wraps.
    pub cause: Option<Box<PvlError>>,
}

impl PvlError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            help: None,
            cause: None,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn index(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Index, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Attach a source location.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a suggestion for rendered diagnostics.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach an underlying cause.
    pub fn with_cause(mut self, cause: PvlError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Wrap this error in a new one of the same kind carrying `message`.
    ///
    /// The span of the innermost located error is kept so diagnostics still
    /// point at the offending text.
    pub fn context(self, message: impl Into<String>) -> Self {
        PvlError {
            kind: self.kind,
            message: message.into(),
            span: self.span,
            help: None,
            cause: Some(Box::new(self)),
        }
    }

    /// The wrapped error, if any.
    pub fn cause(&self) -> Option<&PvlError> {
        self.cause.as_deref()
    }

    /// This error followed by every error it wraps.
    pub fn chain(&self) -> impl Iterator<Item = &PvlError> {
        std::iter::successors(Some(self), |e| e.cause())
    }

    /// The innermost error in the chain.
    pub fn root_cause(&self) -> &PvlError {
        self.chain().last().unwrap_or(self)
    }

    /// Every message in the chain, outermost first, one per line.
    pub fn report(&self) -> String {
        self.chain()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_parse(&self) -> bool {
        self.kind == ErrorKind::Parse
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_index(&self) -> bool {
        self.kind == ErrorKind::Index
    }

    pub fn is_io(&self) -> bool {
        self.kind == ErrorKind::Io
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }
}

impl std::fmt::Display for PvlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl std::error::Error for PvlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<TokenizeError> for PvlError {
    fn from(err: TokenizeError) -> Self {
        let help = match &err.kind {
            TokenizeErrorKind::BinaryData => {
                "labels must be plain ASCII text up to the terminator".to_string()
            }
            TokenizeErrorKind::Unterminated { delimiter } => {
                format!("add the closing `{}`", delimiter)
            }
        };
        PvlError::parse(err.message())
            .with_span(err.span)
            .with_help(help)
    }
}

impl From<std::io::Error> for PvlError {
    fn from(err: std::io::Error) -> Self {
        PvlError::io(err.to_string())
    }
}

/// Result alias used across the PVL crates.
pub type Result<T, E = PvlError> = std::result::Result<T, E>;
