//! Ordered keyword containers: the common part of groups and objects.

use std::ops::{Deref, DerefMut};

use pvl_tokenizer::names_match;

use crate::keyword::normalize_comment;
use crate::{Keyword, PvlError, Result};

/// Statement type of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// `Group = NAME ... End_Group`
    Group,
    /// `Object = NAME ... End_Object`, also used for the document root.
    Object,
}

impl ContainerKind {
    /// The keyword that opens this kind of container.
    pub fn keyword(&self) -> &'static str {
        match self {
            ContainerKind::Group => "Group",
            ContainerKind::Object => "Object",
        }
    }

    /// The keyword that closes this kind of container.
    pub fn end_keyword(&self) -> &'static str {
        match self {
            ContainerKind::Group => "End_Group",
            ContainerKind::Object => "End_Object",
        }
    }
}

/// How [`Container::add_keyword_with`] treats an existing keyword of the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertMode {
    /// Always append.
    #[default]
    Append,
    /// Replace the first keyword with the same name, appending if there is none.
    Replace,
}

/// A named, ordered list of keywords with leading comments.
///
/// Duplicate names are allowed. Lookups by name return the first match.
#[derive(Debug, Clone)]
pub struct Container {
    kind: ContainerKind,
    name: String,
    keywords: Vec<Keyword>,
    comments: Vec<String>,
    filename: Option<String>,
}

impl Container {
    pub fn new(kind: ContainerKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            keywords: Vec::new(),
            comments: Vec::new(),
            filename: None,
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Whether `name` refers to this container.
    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }

    /// The file this container was read from, used in error messages.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: Option<String>) {
        self.filename = filename;
    }

    /// `[Group = NAME]`, as used in error messages.
    pub fn describe(&self) -> String {
        format!("[{} = {}]", self.kind.keyword(), self.name)
    }

    pub(crate) fn in_file(&self) -> String {
        match &self.filename {
            Some(f) if !f.is_empty() => format!(" in file [{}]", f),
            _ => String::new(),
        }
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn keywords_mut(&mut self) -> &mut Vec<Keyword> {
        &mut self.keywords
    }

    /// Number of keywords.
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// The keyword at `index`.
    pub fn keyword(&self, index: usize) -> Result<&Keyword> {
        let err = self.index_error();
        self.keywords.get(index).ok_or(err)
    }

    pub fn keyword_mut(&mut self, index: usize) -> Result<&mut Keyword> {
        let err = self.index_error();
        self.keywords.get_mut(index).ok_or(err)
    }

    /// Append a keyword.
    pub fn add_keyword(&mut self, keyword: Keyword) {
        self.keywords.push(keyword);
    }

    /// Add a keyword using the given [`InsertMode`].
    pub fn add_keyword_with(&mut self, keyword: Keyword, mode: InsertMode) {
        if mode == InsertMode::Replace
            && let Some(existing) = self.get_mut(keyword.name())
        {
            *existing = keyword;
            return;
        }
        self.keywords.push(keyword);
    }

    /// Insert a keyword before `index`.
    pub fn insert_keyword(&mut self, index: usize, keyword: Keyword) -> Result<()> {
        if index > self.keywords.len() {
            return Err(self.index_error());
        }
        self.keywords.insert(index, keyword);
        Ok(())
    }

    /// The first keyword named `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.is_named(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Keyword> {
        self.keywords.iter_mut().find(|k| k.is_named(name))
    }

    /// The first keyword named `name`.
    pub fn find_keyword(&self, name: &str) -> Result<&Keyword> {
        match self.get(name) {
            Some(keyword) => Ok(keyword),
            None => Err(self.missing_keyword(name)),
        }
    }

    pub fn find_keyword_mut(&mut self, name: &str) -> Result<&mut Keyword> {
        let err = self.missing_keyword(name);
        self.get_mut(name).ok_or(err)
    }

    pub fn has_keyword(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove and return the first keyword named `name`.
    pub fn delete_keyword(&mut self, name: &str) -> Result<Keyword> {
        match self.keywords.iter().position(|k| k.is_named(name)) {
            Some(index) => Ok(self.keywords.remove(index)),
            None => Err(self.missing_keyword(name)),
        }
    }

    /// Remove and return the keyword at `index`.
    pub fn delete_keyword_at(&mut self, index: usize) -> Result<Keyword> {
        if index >= self.keywords.len() {
            return Err(self.index_error());
        }
        Ok(self.keywords.remove(index))
    }

    /// Remove keywords that repeat an earlier keyword's name and values.
    pub fn clean_duplicate_keywords(&mut self) {
        let mut kept: Vec<Keyword> = Vec::with_capacity(self.keywords.len());
        for keyword in self.keywords.drain(..) {
            if !kept.contains(&keyword) {
                kept.push(keyword);
            }
        }
        self.keywords = kept;
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Add a leading comment, normalized like [`Keyword::add_comment`].
    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(normalize_comment(comment.into()));
    }

    pub fn clear_comments(&mut self) {
        self.comments.clear();
    }

    /// The `Group = NAME` / `Object = NAME` statement, carrying this container's comments.
    pub fn name_keyword(&self) -> Keyword {
        let mut keyword = Keyword::new(self.kind.keyword()).with_value(self.name.clone());
        keyword.add_comments(self.comments.iter().cloned());
        keyword
    }

    /// Iterate over the keywords.
    pub fn iter(&self) -> std::slice::Iter<'_, Keyword> {
        self.keywords.iter()
    }

    fn missing_keyword(&self, name: &str) -> PvlError {
        PvlError::not_found(format!(
            "PVL Keyword [{}] does not exist in {}{}",
            name,
            self.describe(),
            self.in_file()
        ))
    }

    pub(crate) fn index_error(&self) -> PvlError {
        PvlError::index(format!(
            "The specified index is out of bounds in PVL {}",
            self.describe()
        ))
    }
}

/// Containers are equal when their names match and their keywords are equal.
impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && names_match(&self.name, &other.name) && self.keywords == other.keywords
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = &'a Keyword;
    type IntoIter = std::slice::Iter<'a, Keyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.keywords.iter()
    }
}

/// A named flat collection of keywords.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    container: Container,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            container: Container::new(ContainerKind::Group, name),
        }
    }

    /// Builder that appends a keyword.
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.container.add_keyword(keyword);
        self
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }
}

impl Deref for Group {
    type Target = Container;

    fn deref(&self) -> &Container {
        &self.container
    }
}

impl DerefMut for Group {
    fn deref_mut(&mut self) -> &mut Container {
        &mut self.container
    }
}
