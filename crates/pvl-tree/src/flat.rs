//! A flat, name-keyed view of the keywords in a tree.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::{Container, Keyword, Object, PvlError, Result};

/// Filters applied while flattening a tree.
///
/// Names compare without regard to ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatConstraints {
    excludes: Vec<String>,
    includes: Vec<String>,
    key_list: Vec<String>,
}

impl FlatConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constraints that skip the named objects and groups.
    pub fn with_excludes<I, S>(excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excludes: excludes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Constraints that load only the named objects and groups.
    pub fn with_includes<I, S>(includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            includes: includes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Read a key list file: one keyword name per line, blank lines ignored.
    pub fn from_key_list_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PvlError::io(format!("Unable to read key list file [{}]", path.display()))
                .with_cause(e.into())
        })?;
        let mut constraints = Self::default();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            constraints.add_key(line);
        }
        debug!(
            "Loaded {} key names from {}",
            constraints.key_list.len(),
            path.display()
        );
        Ok(constraints)
    }

    pub fn add_exclude(&mut self, name: impl Into<String>) {
        self.excludes.push(name.into());
    }

    pub fn add_include(&mut self, name: impl Into<String>) {
        self.includes.push(name.into());
    }

    pub fn add_key(&mut self, name: impl Into<String>) {
        self.key_list.push(name.into());
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn key_list(&self) -> &[String] {
        &self.key_list
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excludes.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn is_included(&self, name: &str) -> bool {
        self.includes.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn is_key_in_list(&self, name: &str) -> bool {
        self.key_list.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    fn has_container_rules(&self) -> bool {
        !self.excludes.is_empty() || !self.includes.is_empty()
    }

    fn has_both(&self) -> bool {
        !self.excludes.is_empty() && !self.includes.is_empty()
    }

    /// With both lists, an object loads only when it is included.
    fn skips_object(&self, name: &str) -> bool {
        if !self.has_container_rules() {
            return false;
        }
        if self.has_both() {
            return !self.is_included(name);
        }
        self.skips_by_default(name)
    }

    /// With both lists, a group is skipped only when it is excluded.
    fn skips_group(&self, name: &str) -> bool {
        if !self.has_container_rules() {
            return false;
        }
        if self.has_both() {
            return self.is_excluded(name);
        }
        self.skips_by_default(name)
    }

    fn skips_by_default(&self, name: &str) -> bool {
        self.is_excluded(name) || (!self.includes.is_empty() && !self.is_included(name))
    }
}

/// Keywords keyed by lower-case name. A later keyword replaces an earlier
/// one with the same name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatMap {
    keywords: BTreeMap<String, Keyword>,
}

impl FlatMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten an object: its own keywords, then its groups, then each child
    /// object recursively. Constraints apply to nested objects and groups;
    /// the starting object is always loaded.
    pub fn from_object(object: &Object, constraints: &FlatConstraints) -> Self {
        let mut map = Self::new();
        let loaded = map.load_object_contents(object, constraints);
        debug!("Flattened {} keywords from {:?}", loaded, object.name());
        map
    }

    /// Flatten a single container's keywords.
    pub fn from_container(container: &Container, constraints: &FlatConstraints) -> Self {
        let mut map = Self::new();
        map.load_keywords(container, constraints);
        map
    }

    fn load_object_contents(&mut self, object: &Object, constraints: &FlatConstraints) -> usize {
        let mut total = self.load_keywords(object, constraints);
        for group in object.groups() {
            if !constraints.skips_group(group.name()) {
                total += self.load_keywords(group, constraints);
            }
        }
        for child in object.objects() {
            if !constraints.skips_object(child.name()) {
                total += self.load_object_contents(child, constraints);
            }
        }
        total
    }

    fn load_keywords(&mut self, container: &Container, constraints: &FlatConstraints) -> usize {
        let mut n = 0;
        for keyword in container {
            if constraints.key_list().is_empty() || constraints.is_key_in_list(keyword.name()) {
                self.add(keyword.clone());
                n += 1;
            }
        }
        n
    }

    fn key(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn exists(&self, key: &str) -> bool {
        self.keywords.contains_key(&Self::key(key))
    }

    /// Number of values held for `key`, zero when absent.
    pub fn count(&self, key: &str) -> usize {
        self.keywords.get(&Self::key(key)).map_or(0, Keyword::len)
    }

    /// Whether value `index` of `key` is null. Missing keys are null.
    pub fn is_null(&self, key: &str, index: usize) -> bool {
        match self.keywords.get(&Self::key(key)) {
            Some(keyword) => keyword.is_null(index).unwrap_or(true),
            None => true,
        }
    }

    /// Insert a keyword, replacing any keyword with the same name.
    pub fn add(&mut self, keyword: Keyword) {
        self.keywords.insert(Self::key(keyword.name()), keyword);
    }

    /// Add the keyword's values to an existing entry, or insert it.
    pub fn append(&mut self, keyword: Keyword) {
        match self.keywords.get_mut(&Self::key(keyword.name())) {
            Some(existing) => {
                for (value, unit) in keyword.values().iter().zip(keyword.units()) {
                    existing.push(value.clone(), unit.clone());
                }
            }
            None => self.add(keyword),
        }
    }

    /// Remove `key`. Returns whether it was present.
    pub fn erase(&mut self, key: &str) -> bool {
        self.keywords.remove(&Self::key(key)).is_some()
    }

    /// Value `index` of `key`.
    pub fn get(&self, key: &str, index: usize) -> Result<&str> {
        let keyword = self.keyword(key)?;
        keyword.values().get(index).map(String::as_str).ok_or_else(|| {
            PvlError::index(format!("Index {} does not exist for keyword {}!", index, key))
        })
    }

    /// Value `index` of `key`, or `default` when either is missing.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str, index: usize) -> &'a str {
        self.get(key, index).unwrap_or(default)
    }

    /// Every value of `key`; empty when absent.
    pub fn all_values(&self, key: &str) -> Vec<String> {
        self.keywords
            .get(&Self::key(key))
            .map(|k| k.values().to_vec())
            .unwrap_or_default()
    }

    pub fn keyword(&self, key: &str) -> Result<&Keyword> {
        self.keywords
            .get(&Self::key(key))
            .ok_or_else(|| PvlError::not_found(format!("Keyword {} does not exist!", key)))
    }

    /// Copy every keyword of `other` into this map, replacing same-named ones.
    pub fn merge(&mut self, other: &FlatMap) -> usize {
        for keyword in other.keywords.values() {
            self.add(keyword.clone());
        }
        other.len()
    }

    /// Keywords in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Keyword)> {
        self.keywords.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Group;

    fn kw(name: &str, value: &str) -> Keyword {
        Keyword::new(name).with_value(value)
    }

    fn label() -> Object {
        Object::new("Root")
            .with_keyword(kw("Mission", "Cassini"))
            .with_group(Group::new("Dimensions").with_keyword(kw("Lines", "10")))
            .with_object(
                Object::new("Core")
                    .with_keyword(kw("Format", "Tile"))
                    .with_group(Group::new("Pixels").with_keyword(kw("Type", "Real")))
                    .with_object(Object::new("History").with_keyword(kw("Lines", "20"))),
            )
            .with_object(Object::new("Table").with_keyword(kw("Records", "5")))
    }

    #[test]
    fn test_later_keywords_replace_earlier() {
        let map = FlatMap::from_object(&label(), &FlatConstraints::new());
        assert_eq!(map.len(), 5);
        assert_eq!(map.get("LINES", 0).unwrap(), "20");
        assert_eq!(map.get("mission", 0).unwrap(), "Cassini");
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["format", "lines", "mission", "records", "type"]);
    }

    #[test]
    fn test_excludes() {
        let constraints = FlatConstraints::with_excludes(["core", "Dimensions"]);
        let map = FlatMap::from_object(&label(), &constraints);
        assert!(!map.exists("Lines"));
        assert!(!map.exists("Format"));
        assert!(map.exists("Records"));
    }

    #[test]
    fn test_includes() {
        let constraints = FlatConstraints::with_includes(["Core", "Pixels"]);
        let map = FlatMap::from_object(&label(), &constraints);
        assert!(map.exists("Mission"));
        assert!(map.exists("Format"));
        assert!(map.exists("Type"));
        assert!(!map.exists("Lines"));
        assert!(!map.exists("Records"));
    }

    #[test]
    fn test_includes_with_excludes() {
        let mut constraints = FlatConstraints::with_includes(["Core"]);
        constraints.add_exclude("Pixels");
        let map = FlatMap::from_object(&label(), &constraints);
        assert!(map.exists("Format"));
        assert!(!map.exists("Type"));
        // groups not named in either list still load
        assert_eq!(map.get("Lines", 0).unwrap(), "10");
        assert!(!map.exists("Records"));
    }

    #[test]
    fn test_key_list() {
        let mut constraints = FlatConstraints::new();
        constraints.add_key("records");
        constraints.add_key("Type");
        let map = FlatMap::from_object(&label(), &constraints);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_accessors() {
        let mut map = FlatMap::new();
        map.add(Keyword::new("Bands").with_values(["1", "NULL"]));
        assert_eq!(map.count("bands"), 2);
        assert_eq!(map.count("missing"), 0);
        assert!(!map.is_null("Bands", 0));
        assert!(map.is_null("Bands", 1));
        assert!(map.is_null("Bands", 5));
        assert!(map.is_null("missing", 0));

        map.append(kw("Bands", "3"));
        assert_eq!(map.all_values("BANDS"), vec!["1", "NULL", "3"]);
        assert_eq!(map.get_or("Bands", "none", 9), "none");
        assert_eq!(map.get_or("Other", "none", 0), "none");

        let err = map.get("Bands", 3).unwrap_err();
        assert!(err.is_index());
        assert_eq!(err.message, "Index 3 does not exist for keyword Bands!");
        let err = map.keyword("Other").unwrap_err();
        assert_eq!(err.message, "Keyword Other does not exist!");

        let mut other = FlatMap::new();
        other.add(kw("Bands", "7"));
        other.add(kw("Other", "x"));
        assert_eq!(map.merge(&other), 2);
        assert_eq!(map.all_values("Bands"), vec!["7"]);

        assert!(map.erase("other"));
        assert!(!map.erase("other"));
    }
}
