//! Template-driven validation of PVL documents.

use pvl_tree::{Container, FindOptions, Group, Object, PvlError, Result, names_match};
use tracing::{debug, trace};

use crate::rule::{KeywordRule, is_option_keyword, is_required};

/// Bytes of a name that take part in matching, folded the way
/// `names_match` folds them.
fn folded(name: &str) -> Vec<u8> {
    name.bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b'_')
        .map(|b| b.to_ascii_uppercase())
        .collect()
}

/// Edit distance between two folded names, kept in a single row.
fn edit_distance(a: &[u8], b: &[u8]) -> usize {
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, &x) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &y) in b.iter().enumerate() {
            let substitute = diagonal + usize::from(x != y);
            diagonal = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(diagonal + 1);
        }
    }
    row[b.len()]
}

/// A present name close enough to `missing` to be a likely typo. Names that
/// only differ in case, spaces or underscores are taken first.
fn suggest_similar<'a>(missing: &str, present: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let target = folded(missing);
    let mut best: Option<(&str, usize)> = None;
    for name in present {
        if names_match(name, missing) {
            return Some(name);
        }
        let distance = edit_distance(&target, &folded(name));
        if distance > 2 || distance >= target.len().max(1) {
            continue;
        }
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((name, distance));
        }
    }
    best.map(|(name, _)| name)
}

fn not_found<'a>(what: &str, name: &str, present: impl Iterator<Item = &'a str>) -> PvlError {
    let err = PvlError::validation(format!("{} \"{}\" Not Found in the Template File", what, name));
    match suggest_similar(name, present) {
        Some(similar) => err.with_help(format!("did you mean '{}'?", similar)),
        None => err,
    }
}

/// Validates documents against a template document.
///
/// Validation works on a copy of the user document and removes what the
/// template covers: checked keywords are deleted, and objects and groups left
/// empty are deleted too. The returned tree holds what the template did not
/// mention.
pub struct Validator<'a> {
    template: &'a Object,
}

impl<'a> Validator<'a> {
    /// Create a new validator with the given template.
    pub fn new(template: &'a Object) -> Self {
        Self { template }
    }

    /// Validate a whole document, returning the uncovered remainder.
    pub fn validate(&self, user: &Object) -> Result<Object> {
        let mut result = user.clone();
        self.validate_object(self.template, &mut result)?;
        debug!(
            "Validation left {} keywords, {} objects and {} groups",
            result.keyword_count(),
            result.object_count(),
            result.group_count()
        );
        Ok(result)
    }

    /// Validate `target` in place against the template object `template`:
    /// child objects, then groups, then keywords.
    pub fn validate_object(&self, template: &Object, target: &mut Object) -> Result<()> {
        for guide in template.objects() {
            let name = guide.name();
            match target.find_object_mut(name, FindOptions::None) {
                Ok(object) => {
                    trace!("Validating object {}", name);
                    self.validate_object(guide, object)?;
                    if object.is_empty() {
                        target.delete_object(name)?;
                    }
                }
                Err(_) if is_required(guide, name) => {
                    return Err(not_found("Object", name, target.objects().iter().map(|o| o.name())));
                }
                Err(_) => {}
            }
        }

        for guide in template.groups() {
            let name = guide.name();
            match target.find_group_mut(name, FindOptions::None) {
                Ok(group) => {
                    trace!("Validating group {}", name);
                    self.validate_group(guide, group)?;
                    if group.keyword_count() == 0 {
                        target.delete_group(name)?;
                    }
                }
                Err(_) if is_required(guide, name) => {
                    return Err(not_found("Group", name, target.groups().iter().map(|g| g.name())));
                }
                Err(_) => {}
            }
        }

        self.validate_keywords(template, target)
    }

    /// Validate the keywords of a group.
    pub fn validate_group(&self, template: &Group, target: &mut Group) -> Result<()> {
        self.validate_keywords(template, target)
    }

    /// Check and remove every keyword the template describes.
    pub fn validate_keywords(&self, template: &Container, target: &mut Container) -> Result<()> {
        for guide in template {
            let name = guide.name();
            if is_option_keyword(name) {
                continue;
            }
            let rule = KeywordRule::from_template(template, guide)?;

            match target.get(name) {
                Some(keyword) => {
                    rule.check(keyword)?;
                    target.delete_keyword(name)?;
                }
                None if rule.required => {
                    return Err(not_found("Keyword", name, target.iter().map(|k| k.name())));
                }
                None => {}
            }

            if rule.repeated {
                while let Some(keyword) = target.get(name) {
                    rule.check(keyword)?;
                    target.delete_keyword(name)?;
                }
            }
        }
        Ok(())
    }
}

/// Validate `user` against `template`, returning the part of `user` the
/// template does not cover.
pub fn validate_pvl(template: &Object, user: &Object) -> Result<Object> {
    Validator::new(template).validate(user)
}
