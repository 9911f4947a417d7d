//! Keyword rules read from a validation template.
//!
//! A template keyword `X = (type, ...)` says what values `X` may hold.
//! Sibling keywords refine it:
//!
//! - `X__Required = true` fails validation when `X` is absent
//! - `X__Repeated = true` checks every keyword named `X`, not only the first
//! - `X__Range = (min, max)` bounds numeric values, inclusive
//! - `X__Value = (a, b, ...)` lists the allowed values
//! - `X__Type = positive|negative` restricts the sign of numeric values

use pvl_tree::{Container, Keyword, PvlError, Result};

const REQUIRED_SUFFIX: &str = "__Required";
const REPEATED_SUFFIX: &str = "__Repeated";
const RANGE_SUFFIX: &str = "__Range";
const VALUE_SUFFIX: &str = "__Value";
const TYPE_SUFFIX: &str = "__Type";

const OPTION_SUFFIXES: &[&str] = &[
    REQUIRED_SUFFIX,
    REPEATED_SUFFIX,
    RANGE_SUFFIX,
    VALUE_SUFFIX,
    TYPE_SUFFIX,
];

/// Check if a template keyword is an option for another keyword rather than
/// a keyword to validate.
pub fn is_option_keyword(name: &str) -> bool {
    OPTION_SUFFIXES.iter().any(|suffix| name.contains(suffix))
}

/// The `true`/`false` value of the option keyword `name + suffix`.
fn flag(template: &Container, name: &str, suffix: &str) -> bool {
    template
        .get(&format!("{}{}", name, suffix))
        .and_then(|k| k.values().first())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Check if `name` must be present, per `name__Required` in `template`.
pub fn is_required(template: &Container, name: &str) -> bool {
    flag(template, name, REQUIRED_SUFFIX)
}

/// The values a keyword may hold.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Integer,
    Double,
    Boolean,
    /// Any text. A non-empty list restricts it to those values (ASCII case ignored).
    String(Vec<String>),
    /// No type named, or one that is not checked.
    Any,
}

impl ValueKind {
    fn from_template(keyword: &Keyword) -> Self {
        let Some(kind) = keyword.values().first() else {
            return ValueKind::Any;
        };
        match kind.to_ascii_lowercase().as_str() {
            "integer" => ValueKind::Integer,
            "double" => ValueKind::Double,
            "boolean" => ValueKind::Boolean,
            "string" => ValueKind::String(keyword.values()[1..].to_vec()),
            _ => ValueKind::Any,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Double)
    }
}

/// Sign restriction from `X__Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

/// Everything a template says about one keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRule {
    pub name: String,
    pub kind: ValueKind,
    pub required: bool,
    pub repeated: bool,
    pub range: Option<(f64, f64)>,
    pub allowed: Option<Vec<String>>,
    pub sign: Option<Sign>,
}

impl KeywordRule {
    /// Read the rule for `keyword` and its options from `template`.
    pub fn from_template(template: &Container, keyword: &Keyword) -> Result<Self> {
        let name = keyword.name();
        let option = |suffix: &str| template.get(&format!("{}{}", name, suffix));

        let range = match option(RANGE_SUFFIX) {
            Some(range) => {
                let bound = |i: usize| range.values().get(i).and_then(|v| v.trim().parse::<f64>().ok());
                match (bound(0), bound(1)) {
                    (Some(min), Some(max)) => Some((min, max)),
                    _ => {
                        return Err(PvlError::validation(format!(
                            "Keyword \"{}{}\" must hold a minimum and a maximum",
                            name, RANGE_SUFFIX
                        )));
                    }
                }
            }
            None => None,
        };

        let sign = match option(TYPE_SUFFIX).and_then(|k| k.values().first()) {
            Some(sign) if sign.eq_ignore_ascii_case("positive") => Some(Sign::Positive),
            Some(sign) if sign.eq_ignore_ascii_case("negative") => Some(Sign::Negative),
            _ => None,
        };

        Ok(Self {
            name: name.to_string(),
            kind: ValueKind::from_template(keyword),
            required: is_required(template, name),
            repeated: flag(template, name, REPEATED_SUFFIX),
            range,
            allowed: option(VALUE_SUFFIX).map(|k| k.values().to_vec()),
            sign,
        })
    }

    fn wrong_type(&self, reason: String) -> PvlError {
        PvlError::validation(format!("Wrong Type of value in the Keyword \"{}\"", self.name))
            .with_cause(PvlError::validation(reason))
    }

    /// Check every value of `keyword`. `null` values always pass.
    pub fn check(&self, keyword: &Keyword) -> Result<()> {
        for value in keyword.values() {
            if value.eq_ignore_ascii_case("null") {
                continue;
            }
            self.check_value(value)?;
        }
        Ok(())
    }

    fn check_value(&self, value: &str) -> Result<()> {
        let number = match &self.kind {
            ValueKind::Integer => match value.trim().parse::<i64>() {
                Ok(n) => Some(n as f64),
                Err(_) => return Err(self.wrong_type(format!("[{}] is not an integer", value))),
            },
            ValueKind::Double => match value.trim().parse::<f64>() {
                Ok(n) => Some(n),
                Err(_) => return Err(self.wrong_type(format!("[{}] is not a number", value))),
            },
            ValueKind::Boolean => {
                if !value.eq_ignore_ascii_case("true") && !value.eq_ignore_ascii_case("false") {
                    return Err(self.wrong_type(format!("[{}] is not true or false", value)));
                }
                None
            }
            ValueKind::String(choices) => {
                if !choices.is_empty() && !choices.iter().any(|c| c.eq_ignore_ascii_case(value)) {
                    return Err(self.wrong_type(format!(
                        "[{}] is not one of ({})",
                        value,
                        choices.join(", ")
                    )));
                }
                None
            }
            ValueKind::Any => None,
        };

        if let Some(n) = number {
            match self.sign {
                Some(Sign::Positive) if n < 0.0 => {
                    return Err(self.wrong_type(format!("[{}] is not positive", value)));
                }
                Some(Sign::Negative) if n > 0.0 => {
                    return Err(self.wrong_type(format!("[{}] is not negative", value)));
                }
                _ => {}
            }
            if let Some((min, max)) = self.range
                && (n < min || n > max)
            {
                return Err(self.wrong_type(format!(
                    "[{}] is outside the range [{}, {}]",
                    value, min, max
                )));
            }
        }

        if let Some(allowed) = &self.allowed
            && !allowed.iter().any(|a| self.same_value(a, value))
        {
            return Err(self.wrong_type(format!(
                "[{}] is not one of ({})",
                value,
                allowed.join(", ")
            )));
        }
        Ok(())
    }

    /// Numbers compare by value; everything else ignores ASCII case.
    fn same_value(&self, allowed: &str, value: &str) -> bool {
        if self.kind.is_numeric()
            && let (Ok(a), Ok(v)) = (allowed.trim().parse::<f64>(), value.trim().parse::<f64>())
        {
            return a == v;
        }
        allowed.eq_ignore_ascii_case(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvl_tree::Group;

    fn rule(template: &Group, name: &str) -> KeywordRule {
        KeywordRule::from_template(template, template.find_keyword(name).unwrap()).unwrap()
    }

    #[test]
    fn test_option_keywords() {
        assert!(is_option_keyword("Lines__Required"));
        assert!(is_option_keyword("Lines__Range"));
        assert!(!is_option_keyword("Lines"));
        assert!(!is_option_keyword("Lines_Required"));
    }

    #[test]
    fn test_rule_from_template() {
        let template = Group::new("T")
            .with_keyword(Keyword::new("Lines").with_value("integer"))
            .with_keyword(Keyword::new("Lines__Required").with_value("true"))
            .with_keyword(Keyword::new("Lines__Range").with_values(["1", "100"]))
            .with_keyword(Keyword::new("Lines__Type").with_value("positive"))
            .with_keyword(Keyword::new("Mode").with_values(["string", "fast", "slow"]));

        let lines = rule(&template, "Lines");
        assert_eq!(lines.kind, ValueKind::Integer);
        assert!(lines.required);
        assert!(!lines.repeated);
        assert_eq!(lines.range, Some((1.0, 100.0)));
        assert_eq!(lines.sign, Some(Sign::Positive));

        let mode = rule(&template, "Mode");
        assert_eq!(mode.kind, ValueKind::String(vec!["fast".into(), "slow".into()]));
        assert!(!mode.required);
    }

    #[test]
    fn test_type_checks() {
        let template = Group::new("T")
            .with_keyword(Keyword::new("I").with_value("integer"))
            .with_keyword(Keyword::new("D").with_value("double"))
            .with_keyword(Keyword::new("B").with_value("boolean"))
            .with_keyword(Keyword::new("S").with_values(["string", "a", "b"]))
            .with_keyword(Keyword::new("Free").with_value("string"));

        let i = rule(&template, "I");
        assert!(i.check(&Keyword::new("I").with_values(["1", "-2", "NULL"])).is_ok());
        assert!(i.check(&Keyword::new("I").with_value("1.5")).is_err());

        let d = rule(&template, "D");
        assert!(d.check(&Keyword::new("D").with_values(["1.5", "2e3"])).is_ok());
        assert!(d.check(&Keyword::new("D").with_value("abc")).is_err());

        let b = rule(&template, "B");
        assert!(b.check(&Keyword::new("B").with_values(["TRUE", "false"])).is_ok());
        assert!(b.check(&Keyword::new("B").with_value("yes")).is_err());

        let s = rule(&template, "S");
        assert!(s.check(&Keyword::new("S").with_value("A")).is_ok());
        assert!(s.check(&Keyword::new("S").with_value("c")).is_err());

        let free = rule(&template, "Free");
        assert!(free.check(&Keyword::new("Free").with_value("anything")).is_ok());
    }

    #[test]
    fn test_range_sign_and_values() {
        let template = Group::new("T")
            .with_keyword(Keyword::new("Gain").with_value("double"))
            .with_keyword(Keyword::new("Gain__Range").with_values(["0", "10"]))
            .with_keyword(Keyword::new("Offset").with_value("integer"))
            .with_keyword(Keyword::new("Offset__Type").with_value("negative"))
            .with_keyword(Keyword::new("Bin").with_value("integer"))
            .with_keyword(Keyword::new("Bin__Value").with_values(["1", "2", "4"]));

        let gain = rule(&template, "Gain");
        assert!(gain.check(&Keyword::new("Gain").with_value("10")).is_ok());
        let err = gain.check(&Keyword::new("Gain").with_value("10.5")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.message, "Wrong Type of value in the Keyword \"Gain\"");
        assert_eq!(err.root_cause().message, "[10.5] is outside the range [0, 10]");

        let offset = rule(&template, "Offset");
        assert!(offset.check(&Keyword::new("Offset").with_value("-3")).is_ok());
        assert!(offset.check(&Keyword::new("Offset").with_value("3")).is_err());

        let bin = rule(&template, "Bin");
        assert!(bin.check(&Keyword::new("Bin").with_value("04")).is_ok());
        assert!(bin.check(&Keyword::new("Bin").with_value("3")).is_err());
    }

    #[test]
    fn test_bad_range() {
        let template = Group::new("T")
            .with_keyword(Keyword::new("Gain").with_value("double"))
            .with_keyword(Keyword::new("Gain__Range").with_value("low"));
        let keyword = template.find_keyword("Gain").unwrap();
        let err = KeywordRule::from_template(&template, keyword).unwrap_err();
        assert_eq!(err.message, "Keyword \"Gain__Range\" must hold a minimum and a maximum");
    }
}
