//! A tokenizer for PVL label text.
//!
//! The tokenizer turns raw label bytes into a flat list of [`Token`]s, one per
//! keyword statement or comment. Structural statements (`Object = X`,
//! `End_Group`, `End`) are ordinary tokens whose [`TokenKind`] tells the tree
//! builder what to do with them.

mod span;
pub use span::Span;

mod token;
pub use token::{COMMENT_KEY, Token, TokenKind, TokenValue, names_match};

mod error;
pub use error::{TokenizeError, TokenizeErrorKind};

mod tokenizer;
pub use tokenizer::{Tokenizer, parse_comma_list, tokenize};
