//! Validation of PVL documents against templates.
//!
//! A template is itself a PVL document. Each keyword in it names the type of
//! the same-named keyword in the user document, and `__Required`,
//! `__Repeated`, `__Range`, `__Value` and `__Type` companions refine the check.
//! See [`rule`] for the template conventions.

pub mod rule;
mod validate;

pub use rule::{KeywordRule, Sign, ValueKind};
pub use validate::{Validator, validate_pvl};
