//! Parameter Value Language (PVL) documents.
//!
//! PVL is the label format of ISIS cubes and PDS products: keywords holding
//! values, grouped into `Group`s and nested `Object`s, ended by `End`.
//!
//! ```
//! use pvl::{FindOptions, Keyword, Pvl};
//!
//! let mut pvl: Pvl = "Object = A\n  Keyword1 = 5\n  Group = B\n    Keyword2 = (1,2,3)\n  EndGroup\nEndObject\nEnd"
//!     .parse()
//!     .unwrap();
//!
//! let keyword = pvl.find_keyword("Keyword2", FindOptions::Traverse).unwrap();
//! assert_eq!(keyword.values(), &["1", "2", "3"]);
//!
//! pvl.add_keyword(Keyword::new("Version").with_value("2"));
//! assert!(pvl.to_string().starts_with("Version = 2\n"));
//! ```
//!
//! Documents render through a [`Formatter`]; [`PdsFormat`] produces PDS
//! labels. [`Pvl::validate_pvl`] checks a document against a template.

mod document;

pub use document::{DEFAULT_TERMINATOR, Pvl, ROOT_NAME};
pub use pvl_format::{
    FormatOptions, Formatter, KeywordType, PdsFormat, PvlFormat, PvlWriter, TEMPLATE_INCLUDE_KEYWORD, TypeMap,
};
pub use pvl_schema::{KeywordRule, Validator};
pub use pvl_tree::{
    Container, ContainerKind, ErrorKind, FindOptions, FlatConstraints, FlatMap, Group, InsertMode, Keyword, Object,
    PvlError, Result, Span, names_match,
};
