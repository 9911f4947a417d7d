//! Quoting rules for scalar values.

/// Values that PDS labels always write as quoted upper-case strings.
const PDS_SPECIAL_VALUES: &[&str] = &["N/A", "NULL", "UNK"];

/// Check if a value already carries its own delimiters.
///
/// Lists, sets and quoted text are written verbatim. A value that only opens
/// a delimiter is not delimited.
fn is_delimited(value: &str) -> bool {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(b'('), Some(b')')) | (Some(b'{'), Some(b'}')) => true,
        (Some(&open @ (b'"' | b'\'')), Some(&close)) => bytes.len() > 1 && open == close,
        _ => false,
    }
}

/// Check if a value must be quoted to read back as a single value.
///
/// A value needs quotes when:
/// 1. It's empty
/// 2. It contains whitespace or one of `(){},=<>`
/// 3. It contains a comment opener (`#`, `//` or `/*`) or a quote character
/// 4. It ends with `-`, which would continue it on the next line
pub fn needs_quotes(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    value.contains("/*")
        || value.contains("//")
        || value.ends_with('-')
        || value.chars().any(|c| {
            c.is_whitespace()
                || matches!(c, '(' | ')' | '{' | '}' | ',' | '=' | '<' | '>' | '#' | '"' | '\'')
        })
}

/// Quote a value for plain PVL output.
///
/// Values that need quotes get double quotes, or single quotes when the value
/// itself contains a double quote. Delimited values are left alone.
pub fn add_quotes(value: &str) -> String {
    if !value.is_empty() && is_delimited(value) {
        return value.to_string();
    }
    if !needs_quotes(value) {
        value.to_string()
    } else if value.contains('"') {
        format!("'{}'", value)
    } else {
        format!("\"{}\"", value)
    }
}

/// Quote a value for PDS output.
///
/// PDS quotes every string, switching to single quotes for text with both
/// a space and a double quote.
pub fn pds_add_quotes(value: &str) -> String {
    if is_delimited(value) {
        value.to_string()
    } else if value.contains(' ') && value.contains('"') {
        format!("'{}'", value)
    } else {
        format!("\"{}\"", value)
    }
}

/// The quoted upper-case spelling of a PDS special value, if `value` is one.
pub fn pds_special(value: &str) -> Option<String> {
    let upper = value.to_ascii_uppercase();
    PDS_SPECIAL_VALUES
        .contains(&upper.as_str())
        .then(|| format!("\"{}\"", upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_quotes() {
        assert_eq!(add_quotes("Cassini"), "Cassini");
        assert_eq!(add_quotes("12.5"), "12.5");
        assert_eq!(add_quotes("N/A"), "N/A");
        assert_eq!(add_quotes(""), "\"\"");
        assert_eq!(add_quotes("two words"), "\"two words\"");
        assert_eq!(add_quotes("a,b"), "\"a,b\"");
        assert_eq!(add_quotes("x=y"), "\"x=y\"");
        assert_eq!(add_quotes("#tag"), "\"#tag\"");
        assert_eq!(add_quotes("a/*b"), "\"a/*b\"");
        assert_eq!(add_quotes("say \"hi\""), "'say \"hi\"'");
        assert_eq!(add_quotes("it's"), "\"it's\"");
        assert_eq!(add_quotes("a<b"), "\"a<b\"");
        assert_eq!(add_quotes("x>y<z>"), "\"x>y<z>\"");
        assert_eq!(add_quotes("a//b"), "\"a//b\"");
        assert_eq!(add_quotes("abc-"), "\"abc-\"");
        assert_eq!(add_quotes("-5"), "-5");
        assert_eq!(add_quotes("(open"), "\"(open\"");
        assert_eq!(add_quotes("\"half"), "'\"half'");
    }

    #[test]
    fn test_delimited_values_untouched() {
        assert_eq!(add_quotes("(b,c)"), "(b,c)");
        assert_eq!(add_quotes("{1, 2}"), "{1, 2}");
        assert_eq!(pds_add_quotes("(b,c)"), "(b,c)");
        assert_eq!(pds_add_quotes("'quoted'"), "'quoted'");
    }

    #[test]
    fn test_pds_quotes() {
        assert_eq!(pds_add_quotes("Cassini"), "\"Cassini\"");
        assert_eq!(pds_add_quotes("a \"b\""), "'a \"b\"'");
        assert_eq!(pds_add_quotes("a\"b"), "\"a\"b\"");
        assert_eq!(pds_add_quotes(""), "\"\"");
    }

    #[test]
    fn test_pds_special() {
        assert_eq!(pds_special("n/a").as_deref(), Some("\"N/A\""));
        assert_eq!(pds_special("Null").as_deref(), Some("\"NULL\""));
        assert_eq!(pds_special("unk").as_deref(), Some("\"UNK\""));
        assert_eq!(pds_special("unknown"), None);
    }
}
