//! Token types for the PVL tokenizer.

use crate::Span;

/// Key given to comment tokens.
pub const COMMENT_KEY: &str = "_COMMENT_";

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A comment on its own line: `# ...` or `/* ... */`
    Comment,
    /// An ordinary keyword statement: `NAME` or `NAME = value`
    Keyword,
    /// `Group = NAME`
    Group,
    /// `End_Group`
    EndGroup,
    /// `Object = NAME`
    Object,
    /// `End_Object`
    EndObject,
    /// The document terminator (`End` unless overridden)
    End,
}

impl TokenKind {
    /// Classify a statement key. Comments are never produced here.
    pub fn classify(key: &str, terminator: &str) -> TokenKind {
        if names_match(key, terminator) || names_match(key, "End") {
            TokenKind::End
        } else if names_match(key, "Group") {
            TokenKind::Group
        } else if names_match(key, "EndGroup") {
            TokenKind::EndGroup
        } else if names_match(key, "Object") {
            TokenKind::Object
        } else if names_match(key, "EndObject") {
            TokenKind::EndObject
        } else {
            TokenKind::Keyword
        }
    }

    /// Whether this token opens or closes a container.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TokenKind::Group | TokenKind::EndGroup | TokenKind::Object | TokenKind::EndObject
        )
    }
}

/// One value read from the right-hand side of a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenValue {
    /// The value text with any surrounding quotes removed.
    pub text: String,
    /// The `<unit>` that followed the value, without angle brackets.
    pub unit: Option<String>,
}

impl TokenValue {
    /// A value without a unit.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            unit: None,
        }
    }

    /// A value carrying a unit.
    pub fn with_unit(text: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            unit: Some(unit.into()),
        }
    }
}

/// A single statement (or comment) read from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The statement key, or [`COMMENT_KEY`] for comments.
    pub key: String,
    /// Values in source order. A comment token holds its text as the only value.
    pub values: Vec<TokenValue>,
    /// A comment that followed the statement on the same line.
    pub inline_comment: Option<String>,
    /// Location of the key in the source.
    pub span: Span,
}

impl Token {
    /// Create a statement token with no values.
    pub fn new(kind: TokenKind, key: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            key: key.into(),
            values: Vec::new(),
            inline_comment: None,
            span,
        }
    }

    /// Create a comment token.
    pub fn comment(text: impl Into<String>, span: Span) -> Self {
        Self {
            kind: TokenKind::Comment,
            key: COMMENT_KEY.to_string(),
            values: vec![TokenValue::new(text)],
            inline_comment: None,
            span,
        }
    }

    /// Whether this is a comment token.
    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    /// The key in upper case.
    pub fn key_upper(&self) -> String {
        self.key.to_ascii_uppercase()
    }

    /// Append a value.
    pub fn add_value(&mut self, value: TokenValue) {
        self.values.push(value);
    }

    /// Text of the value at `index`.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(|v| v.text.as_str())
    }
}

/// Compare two PVL names.
///
/// Names match when they are equal after dropping whitespace and underscores
/// and ignoring ASCII case, so `End_Object` matches `EndObject`.
pub fn names_match(a: &str, b: &str) -> bool {
    fn significant(s: &str) -> impl Iterator<Item = u8> + '_ {
        s.bytes()
            .filter(|b| !b.is_ascii_whitespace() && *b != b'_')
            .map(|b| b.to_ascii_uppercase())
    }
    significant(a).eq(significant(b))
}
