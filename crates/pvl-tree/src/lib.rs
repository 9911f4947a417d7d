//! Document model for PVL labels.
//!
//! A label is a tree: an [`Object`] holds [`Keyword`]s, [`Group`]s and nested
//! objects, and a group holds only keywords. Every container keeps insertion
//! order and allows duplicate names; by-name lookups return the first match.
//!
//! ```
//! use pvl_tree::{FindOptions, parse};
//!
//! let root = parse(b"Object = Cube\n  Group = Dimensions\n    Lines = 100\n  End_Group\nEnd_Object\nEnd", "End").unwrap();
//! let lines = root.find_keyword("Lines", FindOptions::Traverse).unwrap();
//! assert_eq!(lines.value(0).unwrap(), "100");
//! ```

mod builder;
mod container;
mod diagnostic;
mod error;
mod flat;
mod keyword;
mod object;

pub use builder::{TreeBuilder, parse};
pub use container::{Container, ContainerKind, Group, InsertMode};
pub use error::{ErrorKind, PvlError, Result};
pub use flat::{FlatConstraints, FlatMap};
pub use keyword::{Keyword, NULL_VALUES};
pub use object::{BreadthFirst, FindOptions, Object};
pub use pvl_tokenizer::{Span, names_match};
