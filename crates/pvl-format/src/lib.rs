//! Rendering of PVL documents.
//!
//! A [`PvlWriter`] walks a tree from `pvl-tree` and asks a [`Formatter`] how
//! each name, value and end statement is spelled. [`PvlFormat`] writes plain
//! PVL and [`PdsFormat`] writes PDS labels.

mod format;
mod options;
mod pds;
mod scalar;
mod wrap;
mod writer;

pub use format::{Formatter, KeywordType, PvlFormat, TypeMap};
pub use options::FormatOptions;
pub use pds::PdsFormat;
pub use scalar::{add_quotes, needs_quotes, pds_add_quotes};
pub use writer::{PvlWriter, TEMPLATE_INCLUDE_KEYWORD, expand_template};
