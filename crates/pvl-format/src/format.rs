//! Formatting strategies for keyword names, values and end statements.

use std::collections::BTreeMap;
use std::path::Path;

use pvl_tree::{FlatConstraints, FlatMap, Keyword, Object, PvlError, Result};
use tracing::debug;

use crate::scalar::add_quotes;

/// The declared type of a keyword in a type map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeywordType {
    #[default]
    NoType,
    String,
    Bool,
    Integer,
    Real,
    Octal,
    Hex,
    Binary,
    Enum,
}

impl KeywordType {
    /// Parse a type name as written in a type map. Unknown names are [`KeywordType::NoType`].
    pub fn from_name(name: &str) -> KeywordType {
        match name.trim().to_ascii_uppercase().as_str() {
            "STRING" => KeywordType::String,
            "BOOL" => KeywordType::Bool,
            "INTEGER" => KeywordType::Integer,
            "REAL" => KeywordType::Real,
            "OCTAL" => KeywordType::Octal,
            "HEX" => KeywordType::Hex,
            "BINARY" => KeywordType::Binary,
            "ENUM" => KeywordType::Enum,
            _ => KeywordType::NoType,
        }
    }
}

/// Rendering rules consulted for every keyword, group and object written.
pub trait Formatter {
    /// Line terminator.
    fn format_eol(&self) -> &str {
        "\n"
    }

    /// The keyword name as written.
    fn format_name(&self, keyword: &Keyword) -> String {
        keyword.name().to_string()
    }

    /// The text for value `index` of `keyword`, including any list
    /// punctuation and units that belong with it.
    ///
    /// Index 0 of a keyword without values yields the null spelling.
    fn format_value(&self, keyword: &Keyword, index: usize) -> String;

    /// The statement closing a container, e.g. `End_Object`.
    fn format_end(&self, end: &str, name_keyword: &Keyword) -> String;

    /// Quote a scalar value if it needs it.
    fn add_quotes(&self, value: &str) -> String;

    /// The declared type of `keyword`.
    fn keyword_type(&self, keyword: &Keyword) -> KeywordType;

    /// The declared accuracy (decimal places or byte count) of `keyword`.
    fn accuracy(&self, keyword: &Keyword) -> Option<usize>;
}

/// Keyword types and accuracies keyed by upper-case keyword name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMap {
    entries: BTreeMap<String, (KeywordType, Option<usize>)>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from keywords of the form `NAME = (TYPE[, ACCURACY])`,
    /// anywhere in the tree.
    pub fn from_object(object: &Object) -> Self {
        let flat = FlatMap::from_object(object, &FlatConstraints::new());
        let mut map = Self::new();
        for (_, keyword) in flat.iter() {
            let kind = keyword.values().first().map_or(KeywordType::NoType, |t| {
                KeywordType::from_name(t)
            });
            let accuracy = keyword
                .values()
                .get(1)
                .and_then(|a| a.trim().parse::<usize>().ok());
            map.insert(keyword.name(), kind, accuracy);
        }
        map
    }

    /// Read a type map file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            PvlError::io(format!("Unable to open type map file [{}]", path.display()))
                .with_cause(e.into())
        })?;
        let root = pvl_tree::parse(&bytes, "End")
            .map_err(|e| e.context(format!("Unable to read type map file [{}]", path.display())))?;
        let map = Self::from_object(&root);
        debug!("Loaded {} keyword types from {}", map.len(), path.display());
        Ok(map)
    }

    pub fn insert(&mut self, name: &str, kind: KeywordType, accuracy: Option<usize>) {
        self.entries
            .insert(name.to_ascii_uppercase(), (kind, accuracy));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keyword_type(&self, name: &str) -> KeywordType {
        self.entries
            .get(&name.to_ascii_uppercase())
            .map_or(KeywordType::NoType, |(kind, _)| *kind)
    }

    pub fn accuracy(&self, name: &str) -> Option<usize> {
        self.entries
            .get(&name.to_ascii_uppercase())
            .and_then(|(_, accuracy)| *accuracy)
    }
}

/// Unit written once after a list when every value has that same unit.
fn shared_unit(keyword: &Keyword) -> Option<&str> {
    let first = keyword.units().first()?.as_deref()?;
    keyword
        .units()
        .iter()
        .all(|u| u.as_deref() == Some(first))
        .then_some(first)
}

/// The default PVL formatter.
///
/// Writes names as they are, quotes only values that would not read back
/// otherwise and renders a keyword without values as `Null`.
#[derive(Debug, Clone, Default)]
pub struct PvlFormat {
    types: TypeMap,
}

impl PvlFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(types: TypeMap) -> Self {
        Self { types }
    }

    /// A formatter whose type map is read from a PVL file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_types(TypeMap::from_file(path)?))
    }

    /// A formatter whose type map is taken from an already-read tree.
    pub fn from_pvl(object: &Object) -> Self {
        Self::with_types(TypeMap::from_object(object))
    }

    pub fn types(&self) -> &TypeMap {
        &self.types
    }
}

impl Formatter for PvlFormat {
    fn format_value(&self, keyword: &Keyword, index: usize) -> String {
        let count = keyword.len();
        let Some(value) = keyword.values().get(index) else {
            return "Null".to_string();
        };
        let shared = shared_unit(keyword);

        let mut text = String::new();
        if count > 1 && index == 0 {
            text.push('(');
        }
        text.push_str(&self.add_quotes(value));
        if shared.is_none()
            && let Some(Some(unit)) = keyword.units().get(index)
        {
            text.push_str(&format!(" <{}>", unit));
        }
        if index + 1 != count {
            text.push_str(", ");
        } else if count > 1 {
            text.push(')');
        }
        if index + 1 == count
            && let Some(unit) = shared
        {
            text.push_str(&format!(" <{}>", unit));
        }
        text
    }

    fn format_end(&self, end: &str, _name_keyword: &Keyword) -> String {
        end.to_string()
    }

    fn add_quotes(&self, value: &str) -> String {
        add_quotes(value)
    }

    fn keyword_type(&self, keyword: &Keyword) -> KeywordType {
        self.types.keyword_type(keyword.name())
    }

    fn accuracy(&self, keyword: &Keyword) -> Option<usize> {
        self.types.accuracy(keyword.name())
    }
}
