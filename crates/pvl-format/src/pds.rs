//! PDS label formatting.

use std::path::Path;

use pvl_tree::{Keyword, Object, Result};

use crate::format::{Formatter, KeywordType, PvlFormat, TypeMap};
use crate::scalar::{add_quotes, pds_add_quotes, pds_special};

/// Formatter for PDS labels.
///
/// Names and container names are upper-cased, lines end in `\r\n`, each
/// value carries its own unit and values are rendered according to the
/// keyword's declared type.
#[derive(Debug, Clone, Default)]
pub struct PdsFormat {
    base: PvlFormat,
}

impl PdsFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(types: TypeMap) -> Self {
        Self {
            base: PvlFormat::with_types(types),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            base: PvlFormat::from_file(path)?,
        })
    }

    pub fn from_pvl(object: &Object) -> Self {
        Self {
            base: PvlFormat::from_pvl(object),
        }
    }

    pub fn types(&self) -> &TypeMap {
        self.base.types()
    }

    /// Render a single value with no list punctuation or unit.
    fn render(&self, kind: KeywordType, accuracy: Option<usize>, value: &str) -> String {
        if let Some(special) = pds_special(value) {
            return special;
        }
        match kind {
            KeywordType::String => pds_add_quotes(value),
            KeywordType::Real => match (accuracy, value.trim().parse::<f64>()) {
                (Some(places), Ok(v)) => format!("{:.*}", places, v),
                _ => value.to_string(),
            },
            KeywordType::Hex => render_hex(value, accuracy),
            KeywordType::Binary => render_binary(value, accuracy),
            KeywordType::Integer | KeywordType::Enum | KeywordType::Bool | KeywordType::Octal => {
                value.to_string()
            }
            KeywordType::NoType => add_quotes(value),
        }
    }
}

/// `16#..#` in upper case, zero-padded to two digits per declared byte.
/// Two and four byte accuracies truncate to that width.
fn render_hex(value: &str, bytes: Option<usize>) -> String {
    let Ok(n) = value.trim().parse::<i64>() else {
        return value.to_string();
    };
    let width = bytes.map_or(0, |b| b * 2);
    let digits = match bytes {
        Some(2) => format!("{:0width$X}", n as u16),
        Some(4) => format!("{:0width$X}", n as u32),
        _ => format!("{:0width$X}", n),
    };
    format!("16#{}#", digits)
}

/// `2#..#`, zero-padded to `bits` digits.
fn render_binary(value: &str, bits: Option<usize>) -> String {
    let Ok(n) = value.trim().parse::<u64>() else {
        return value.to_string();
    };
    format!("2#{:0width$b}#", n, width = bits.unwrap_or(0))
}

impl Formatter for PdsFormat {
    fn format_eol(&self) -> &str {
        "\r\n"
    }

    fn format_name(&self, keyword: &Keyword) -> String {
        keyword.name().to_ascii_uppercase()
    }

    fn format_value(&self, keyword: &Keyword, index: usize) -> String {
        let name = keyword.name();
        if name.eq_ignore_ascii_case("OBJECT") || name.eq_ignore_ascii_case("GROUP") {
            return keyword.values().join(", ").to_ascii_uppercase();
        }

        let count = keyword.len();
        let Some(value) = keyword.values().get(index) else {
            return "NULL".to_string();
        };
        let kind = self.keyword_type(keyword);

        let mut text = String::new();
        if count > 1 && index == 0 {
            text.push('(');
        }
        if value.is_empty() {
            text.push_str("NULL");
        } else {
            text.push_str(&self.render(kind, self.accuracy(keyword), value));
        }
        if kind != KeywordType::Bool
            && let Some(Some(unit)) = keyword.units().get(index)
        {
            text.push_str(&format!(" <{}>", unit));
        }
        if index + 1 != count {
            text.push_str(", ");
        } else if count > 1 {
            text.push(')');
        }
        text
    }

    fn format_end(&self, end: &str, name_keyword: &Keyword) -> String {
        format!(
            "{} = {}",
            end.to_ascii_uppercase(),
            name_keyword.values().join(", ").to_ascii_uppercase()
        )
    }

    fn add_quotes(&self, value: &str) -> String {
        pds_add_quotes(value)
    }

    fn keyword_type(&self, keyword: &Keyword) -> KeywordType {
        self.base.keyword_type(keyword)
    }

    fn accuracy(&self, keyword: &Keyword) -> Option<usize> {
        self.base.accuracy(keyword)
    }
}
