//! The keyword: a named, ordered list of values.

use pvl_tokenizer::names_match;

use crate::{PvlError, Result};

/// Column at which [`Keyword::add_comment_wrapped`] breaks comment text.
const COMMENT_WRAP_WIDTH: usize = 72;

/// Values treated as a null placeholder by [`Keyword::is_null`].
pub const NULL_VALUES: &[&str] = &["NULL", "N/A", "UNK", "", "\"\"", "''"];

/// A named value in a PVL document.
///
/// Values and units are parallel: `units[i]` belongs to `values[i]`. A keyword
/// with no values (`KEY` or `KEY =`) is distinct from one holding a single
/// empty string (`KEY = ""`).
#[derive(Debug, Clone, Default)]
pub struct Keyword {
    name: String,
    values: Vec<String>,
    units: Vec<Option<String>>,
    comments: Vec<String>,
    inline_comment: Option<String>,
}

impl Keyword {
    /// Create a keyword with no values.
    ///
    /// The name is trimmed but not validated; use [`Keyword::try_new`] for names
    /// that come from user input.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            ..Self::default()
        }
    }

    /// Create a keyword, rejecting names that contain whitespace.
    pub fn try_new(name: impl Into<String>) -> Result<Self> {
        let mut keyword = Self::default();
        keyword.set_name(name)?;
        Ok(keyword)
    }

    /// Builder form of [`Keyword::add_value`].
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.add_value(value);
        self
    }

    /// Builder form of [`Keyword::add_value_with_unit`].
    pub fn with_value_unit(mut self, value: impl Into<String>, unit: impl Into<String>) -> Self {
        self.add_value_with_unit(value, unit);
        self
    }

    /// Builder that appends every value in `values`.
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.add_value(value);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the keyword.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.chars().any(char::is_whitespace) {
            return Err(PvlError::parse(format!(
                "[{}] is invalid. Keyword name cannot contain whitespace.",
                trimmed
            )));
        }
        self.name = trimmed.to_string();
        Ok(())
    }

    /// Whether `name` refers to this keyword (case, spaces and underscores ignored).
    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }

    /// Replace all values with a single value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.clear();
        self.add_value(value);
    }

    /// Replace all values with a single value carrying a unit.
    pub fn set_value_with_unit(&mut self, value: impl Into<String>, unit: impl Into<String>) {
        self.clear();
        self.add_value_with_unit(value, unit);
    }

    /// Append a value without a unit.
    pub fn add_value(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
        self.units.push(None);
    }

    /// Append a value with a unit.
    pub fn add_value_with_unit(&mut self, value: impl Into<String>, unit: impl Into<String>) {
        self.values.push(value.into());
        self.units.push(Some(unit.into()));
    }

    /// Append a value whose unit may be absent.
    pub fn push(&mut self, value: impl Into<String>, unit: Option<String>) {
        self.values.push(value.into());
        self.units.push(unit);
    }

    /// Remove every value and unit. Comments are kept.
    pub fn clear(&mut self) {
        self.values.clear();
        self.units.clear();
    }

    /// The value at `index`.
    pub fn value(&self, index: usize) -> Result<&str> {
        self.values
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Mutable access to the value at `index`.
    pub fn value_mut(&mut self, index: usize) -> Result<&mut String> {
        let err = self.out_of_range(index);
        self.values.get_mut(index).ok_or(err)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// The unit of the value at `index`.
    pub fn unit(&self, index: usize) -> Result<Option<&str>> {
        self.units
            .get(index)
            .map(|u| u.as_deref())
            .ok_or_else(|| self.out_of_range(index))
    }

    pub fn units(&self) -> &[Option<String>] {
        &self.units
    }

    /// Give every value the same unit.
    pub fn set_units(&mut self, unit: impl Into<String>) {
        let unit = unit.into();
        for slot in &mut self.units {
            *slot = Some(unit.clone());
        }
    }

    /// Set the unit of the first value equal to `value`. Later equal values
    /// keep their units.
    pub fn set_unit_for(&mut self, value: &str, unit: impl Into<String>) -> Result<()> {
        match self.values.iter().position(|v| v == value) {
            Some(index) => {
                self.units[index] = Some(unit.into());
                Ok(())
            }
            None => Err(PvlError::not_found(format!(
                "Cannot set units for value [{}] which does not exist in keyword [{}]",
                value, self.name
            ))),
        }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the keyword has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the value at `index` is a null placeholder.
    ///
    /// A keyword with no values is always null.
    pub fn is_null(&self, index: usize) -> Result<bool> {
        if self.values.is_empty() {
            return Ok(true);
        }
        let value = self.value(index)?;
        Ok(NULL_VALUES.iter().any(|null| names_match(null, value)))
    }

    /// Whether the value at `index` matches `text` under name matching rules.
    pub fn is_equivalent(&self, text: &str, index: usize) -> Result<bool> {
        Ok(names_match(self.value(index)?, text))
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// The comment at `index`.
    pub fn comment(&self, index: usize) -> Result<&str> {
        self.comments
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Add a leading comment.
    ///
    /// Comments already starting with `#`, `//` or `/*` are kept verbatim,
    /// anything else gets a `# ` prefix and an empty comment becomes `#`.
    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(normalize_comment(comment.into()));
    }

    /// Add several leading comments.
    pub fn add_comments<I, S>(&mut self, comments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for comment in comments {
            self.add_comment(comment);
        }
    }

    /// Add a long comment, split into lines of at most 72 columns.
    pub fn add_comment_wrapped(&mut self, comment: &str) {
        let mut line = String::new();
        for word in comment.split_whitespace() {
            if !line.is_empty() && line.len() + word.len() + 1 >= COMMENT_WRAP_WIDTH {
                self.add_comment(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() {
            self.add_comment(line);
        }
    }

    pub fn clear_comments(&mut self) {
        self.comments.clear();
    }

    /// The comment written after the value on the same line.
    pub fn inline_comment(&self) -> Option<&str> {
        self.inline_comment.as_deref()
    }

    pub fn set_inline_comment(&mut self, comment: Option<String>) {
        self.inline_comment = comment.map(normalize_comment);
    }

    fn out_of_range(&self, index: usize) -> PvlError {
        PvlError::index(format!(
            "Index [{}] is out of range for keyword [{}]",
            index, self.name
        ))
    }
}

/// Keywords are equal when their names match and their values are identical.
impl PartialEq for Keyword {
    fn eq(&self, other: &Self) -> bool {
        names_match(&self.name, &other.name) && self.values == other.values
    }
}

pub(crate) fn normalize_comment(comment: String) -> String {
    if comment.is_empty() {
        "#".to_string()
    } else if comment.starts_with('#') || comment.starts_with("//") || comment.starts_with("/*") {
        comment
    } else {
        format!("# {}", comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_and_units_are_parallel() {
        let mut kw = Keyword::new("  Radii ");
        kw.add_value("3396.19");
        kw.add_value_with_unit("3376.2", "km");
        assert_eq!(kw.name(), "Radii");
        assert_eq!(kw.len(), 2);
        assert_eq!(kw.unit(0).unwrap(), None);
        assert_eq!(kw.unit(1).unwrap(), Some("km"));

        kw.set_units("m");
        assert_eq!(kw.units(), &[Some("m".to_string()), Some("m".to_string())]);

        kw.set_unit_for("3396.19", "km").unwrap();
        assert_eq!(kw.unit(0).unwrap(), Some("km"));
        assert!(kw.set_unit_for("1", "km").unwrap_err().is_not_found());

        let mut repeated = Keyword::new("Scale").with_values(["2", "2"]);
        repeated.set_unit_for("2", "m").unwrap();
        assert_eq!(repeated.units(), &[Some("m".to_string()), None]);
    }

    #[test]
    fn test_index_errors() {
        let kw = Keyword::new("A").with_value("1");
        assert_eq!(kw.value(0).unwrap(), "1");
        assert!(kw.value(1).unwrap_err().is_index());
        assert!(kw.unit(3).unwrap_err().is_index());
        assert!(kw.comment(0).unwrap_err().is_index());
    }

    #[test]
    fn test_set_value_replaces() {
        let mut kw = Keyword::new("A").with_values(["1", "2"]);
        kw.set_value("3");
        assert_eq!(kw.values(), &["3".to_string()]);
        kw.set_value_with_unit("4", "s");
        assert_eq!(kw.unit(0).unwrap(), Some("s"));
        kw.clear();
        assert!(kw.is_empty());
    }

    #[test]
    fn test_name_validation() {
        assert!(Keyword::try_new("Good_Name").is_ok());
        let err = Keyword::try_new("Bad Name").unwrap_err();
        assert!(err.is_parse());
        assert_eq!(
            err.message,
            "[Bad Name] is invalid. Keyword name cannot contain whitespace."
        );
    }

    #[test]
    fn test_null_detection() {
        assert!(Keyword::new("Empty").is_null(0).unwrap());
        let kw = Keyword::new("A").with_values(["NULL", "n/a", "", "\"\"", "5", "Unk"]);
        let nulls: Vec<bool> = (0..kw.len()).map(|i| kw.is_null(i).unwrap()).collect();
        assert_eq!(nulls, vec![true, true, true, true, false, true]);
        assert!(kw.is_null(10).unwrap_err().is_index());
    }

    #[test]
    fn test_valueless_differs_from_empty_string() {
        let valueless = Keyword::new("Key");
        let empty = Keyword::new("Key").with_value("");
        assert_ne!(valueless, empty);
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn test_equality_ignores_name_case() {
        let a = Keyword::new("Sample_Count").with_value("5");
        let b = Keyword::new("SAMPLECOUNT").with_value("5");
        let c = Keyword::new("SAMPLECOUNT").with_value("6");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_named("sample count"));
        assert!(a.is_equivalent("5", 0).unwrap());
    }

    #[test]
    fn test_comment_normalization() {
        let mut kw = Keyword::new("A");
        kw.add_comment("");
        kw.add_comment("# already");
        kw.add_comment("/* block */");
        kw.add_comment("// slashes");
        kw.add_comment("plain");
        assert_eq!(
            kw.comments(),
            &["#", "# already", "/* block */", "// slashes", "# plain"]
        );
        kw.clear_comments();
        assert!(kw.comments().is_empty());
    }

    #[test]
    fn test_wrapped_comment() {
        let mut kw = Keyword::new("A");
        let text = "word ".repeat(30);
        kw.add_comment_wrapped(&text);
        assert!(kw.comments().len() > 1);
        for comment in kw.comments() {
            assert!(comment.starts_with("# word"));
            assert!(comment.len() <= COMMENT_WRAP_WIDTH + 2);
        }
        let words: usize = kw
            .comments()
            .iter()
            .map(|c| c.split_whitespace().count() - 1)
            .sum();
        assert_eq!(words, 30);
    }
}
