//! Objects: containers that also own nested groups and objects.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};

use crate::{Container, ContainerKind, Group, Keyword, PvlError, Result};

/// How far a lookup searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FindOptions {
    /// Only the object's own keywords, groups or objects.
    #[default]
    None,
    /// Breadth-first through every nested object.
    Traverse,
}

/// A named collection of keywords, groups and nested objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    container: Container,
    groups: Vec<Group>,
    objects: Vec<Object>,
}

/// Where a traversing keyword lookup found its match.
enum KeywordSlot {
    Own(usize),
    InGroup(usize, usize),
}

impl Object {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            container: Container::new(ContainerKind::Object, name),
            groups: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Builder that appends a keyword.
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.container.add_keyword(keyword);
        self
    }

    /// Builder that appends a group.
    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Builder that appends an object.
    pub fn with_object(mut self, object: Object) -> Self {
        self.objects.push(object);
        self
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    /// Whether the object holds no keywords, groups or objects.
    pub fn is_empty(&self) -> bool {
        self.container.keyword_count() == 0 && self.groups.is_empty() && self.objects.is_empty()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut Vec<Group> {
        &mut self.groups
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut Vec<Object> {
        &mut self.objects
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// The group at `index`.
    pub fn group(&self, index: usize) -> Result<&Group> {
        let err = self.container.index_error();
        self.groups.get(index).ok_or(err)
    }

    pub fn group_mut(&mut self, index: usize) -> Result<&mut Group> {
        let err = self.container.index_error();
        self.groups.get_mut(index).ok_or(err)
    }

    /// The object at `index`.
    pub fn object(&self, index: usize) -> Result<&Object> {
        let err = self.container.index_error();
        self.objects.get(index).ok_or(err)
    }

    pub fn object_mut(&mut self, index: usize) -> Result<&mut Object> {
        let err = self.container.index_error();
        self.objects.get_mut(index).ok_or(err)
    }

    /// Append a group. Duplicate names are allowed.
    pub fn add_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    /// Append an object. Duplicate names are allowed.
    pub fn add_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    /// This object followed by every nested object, breadth first.
    pub fn breadth_first(&self) -> BreadthFirst<'_> {
        BreadthFirst {
            queue: VecDeque::from([(self, Vec::new())]),
        }
    }

    /// Find the first keyword named `name`.
    ///
    /// With [`FindOptions::Traverse`] each object is searched in breadth-first
    /// order: its own keywords first, then the keywords of its groups.
    pub fn find_keyword(&self, name: &str, options: FindOptions) -> Result<&Keyword> {
        if options == FindOptions::None {
            return self.container.find_keyword(name);
        }
        let (path, slot) = self
            .locate_keyword(name)
            .ok_or_else(|| self.unable_to_find("keyword", name))?;
        let object = self.descend(&path);
        Ok(match slot {
            KeywordSlot::Own(k) => &object.container.keywords()[k],
            KeywordSlot::InGroup(g, k) => &object.groups[g].keywords()[k],
        })
    }

    pub fn find_keyword_mut(&mut self, name: &str, options: FindOptions) -> Result<&mut Keyword> {
        if options == FindOptions::None {
            return self.container.find_keyword_mut(name);
        }
        let (path, slot) = self
            .locate_keyword(name)
            .ok_or_else(|| self.unable_to_find("keyword", name))?;
        let object = self.descend_mut(&path);
        Ok(match slot {
            KeywordSlot::Own(k) => &mut object.container.keywords_mut()[k],
            KeywordSlot::InGroup(g, k) => &mut object.groups[g].keywords_mut()[k],
        })
    }

    pub fn has_keyword(&self, name: &str, options: FindOptions) -> bool {
        match options {
            FindOptions::None => self.container.has_keyword(name),
            FindOptions::Traverse => self.locate_keyword(name).is_some(),
        }
    }

    /// Find the first group named `name`.
    pub fn find_group(&self, name: &str, options: FindOptions) -> Result<&Group> {
        let (path, index) = self
            .locate_group(name, options)
            .ok_or_else(|| self.unable_to_find("group", name))?;
        Ok(&self.descend(&path).groups[index])
    }

    pub fn find_group_mut(&mut self, name: &str, options: FindOptions) -> Result<&mut Group> {
        let (path, index) = self
            .locate_group(name, options)
            .ok_or_else(|| self.unable_to_find("group", name))?;
        Ok(&mut self.descend_mut(&path).groups[index])
    }

    pub fn has_group(&self, name: &str, options: FindOptions) -> bool {
        self.locate_group(name, options).is_some()
    }

    /// Find the first nested object named `name`. The object itself never matches.
    pub fn find_object(&self, name: &str, options: FindOptions) -> Result<&Object> {
        let (path, index) = self
            .locate_object(name, options)
            .ok_or_else(|| self.unable_to_find("object", name))?;
        Ok(&self.descend(&path).objects[index])
    }

    pub fn find_object_mut(&mut self, name: &str, options: FindOptions) -> Result<&mut Object> {
        let (path, index) = self
            .locate_object(name, options)
            .ok_or_else(|| self.unable_to_find("object", name))?;
        Ok(&mut self.descend_mut(&path).objects[index])
    }

    pub fn has_object(&self, name: &str, options: FindOptions) -> bool {
        self.locate_object(name, options).is_some()
    }

    /// Remove and return the first group named `name`.
    pub fn delete_group(&mut self, name: &str) -> Result<Group> {
        match self.groups.iter().position(|g| g.is_named(name)) {
            Some(index) => Ok(self.groups.remove(index)),
            None => Err(self.unable_to_delete("group", name)),
        }
    }

    /// Remove and return the group at `index`.
    pub fn delete_group_at(&mut self, index: usize) -> Result<Group> {
        if index >= self.groups.len() {
            return Err(self.container.index_error());
        }
        Ok(self.groups.remove(index))
    }

    /// Remove and return the first object named `name`.
    pub fn delete_object(&mut self, name: &str) -> Result<Object> {
        match self.objects.iter().position(|o| o.is_named(name)) {
            Some(index) => Ok(self.objects.remove(index)),
            None => Err(self.unable_to_delete("object", name)),
        }
    }

    /// Remove and return the object at `index`.
    pub fn delete_object_at(&mut self, index: usize) -> Result<Object> {
        if index >= self.objects.len() {
            return Err(self.container.index_error());
        }
        Ok(self.objects.remove(index))
    }

    fn locate_keyword(&self, name: &str) -> Option<(Vec<usize>, KeywordSlot)> {
        self.breadth_first().find_map(|(object, path)| {
            if let Some(k) = object.keywords().iter().position(|kw| kw.is_named(name)) {
                return Some((path, KeywordSlot::Own(k)));
            }
            object.groups.iter().enumerate().find_map(|(g, group)| {
                group
                    .keywords()
                    .iter()
                    .position(|kw| kw.is_named(name))
                    .map(|k| (path.clone(), KeywordSlot::InGroup(g, k)))
            })
        })
    }

    fn locate_group(&self, name: &str, options: FindOptions) -> Option<(Vec<usize>, usize)> {
        let position = |object: &Object| object.groups.iter().position(|g| g.is_named(name));
        match options {
            FindOptions::None => position(self).map(|i| (Vec::new(), i)),
            FindOptions::Traverse => self
                .breadth_first()
                .find_map(|(object, path)| position(object).map(|i| (path, i))),
        }
    }

    fn locate_object(&self, name: &str, options: FindOptions) -> Option<(Vec<usize>, usize)> {
        let position = |object: &Object| object.objects.iter().position(|o| o.is_named(name));
        match options {
            FindOptions::None => position(self).map(|i| (Vec::new(), i)),
            FindOptions::Traverse => self
                .breadth_first()
                .find_map(|(object, path)| position(object).map(|i| (path, i))),
        }
    }

    /// Follow a path of child-object indices produced by [`Object::breadth_first`].
    fn descend(&self, path: &[usize]) -> &Object {
        path.iter().fold(self, |object, &i| &object.objects[i])
    }

    fn descend_mut(&mut self, path: &[usize]) -> &mut Object {
        path.iter().fold(self, |object, &i| &mut object.objects[i])
    }

    fn unable_to_find(&self, what: &str, name: &str) -> PvlError {
        PvlError::not_found(format!(
            "Unable to find PVL {} [{}]{}",
            what,
            name,
            self.container.in_file()
        ))
    }

    fn unable_to_delete(&self, what: &str, name: &str) -> PvlError {
        PvlError::not_found(format!(
            "Unable to find PVL {} [{}] in Object [{}]{}",
            what,
            name,
            self.name(),
            self.container.in_file()
        ))
    }
}

impl Deref for Object {
    type Target = Container;

    fn deref(&self) -> &Container {
        &self.container
    }
}

impl DerefMut for Object {
    fn deref_mut(&mut self) -> &mut Container {
        &mut self.container
    }
}

/// Breadth-first walk over an object tree, yielding each object with its
/// path of child indices from the starting object.
pub struct BreadthFirst<'a> {
    queue: VecDeque<(&'a Object, Vec<usize>)>,
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = (&'a Object, Vec<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        let (object, path) = self.queue.pop_front()?;
        for (i, child) in object.objects.iter().enumerate() {
            let mut child_path = path.clone();
            child_path.push(i);
            self.queue.push_back((child, child_path));
        }
        Some((object, path))
    }
}
