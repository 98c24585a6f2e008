//! Tags and criteria.
//!
//! Workers and gangs carry a set of string tags and a list of criteria. A
//! stage is active for a pull only when every criterion passes; an empty list
//! always passes. Criteria are plain closures over the tagged item itself.

use std::fmt;
use std::rc::Rc;

/// Something that carries tags and can be tested by criteria.
pub trait Taggable {
    fn tags(&self) -> TagSet;

    fn has_tag(&self, tag: &str) -> bool {
        self.tags().contains(tag)
    }
}

/// A predicate deciding whether a stage does its work on this pull.
pub type Criterion = Rc<dyn Fn(&dyn Taggable) -> bool>;

/// Wrap a closure as a [`Criterion`].
pub fn criterion<F>(f: F) -> Criterion
where
    F: Fn(&dyn Taggable) -> bool + 'static,
{
    Rc::new(f)
}

/// Evaluate criteria against `subject`; an empty list always passes.
pub fn criteria_pass(criteria: &[Criterion], subject: &dyn Taggable) -> bool {
    criteria.iter().all(|c| c(subject))
}

/// A de-duplicated set of labels. Insertion order is kept for display but
/// ignored by equality.
#[derive(Clone, Default)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        before != self.tags.len()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl PartialEq for TagSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|t| other.contains(t))
    }
}

impl Eq for TagSet {}

impl fmt::Debug for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.tags.iter()).finish()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl From<&str> for TagSet {
    fn from(tag: &str) -> Self {
        std::iter::once(tag).collect()
    }
}

impl<S: Into<String>> From<Vec<S>> for TagSet {
    fn from(tags: Vec<S>) -> Self {
        tags.into_iter().collect()
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for TagSet {
    fn from(tags: [S; N]) -> Self {
        tags.into_iter().collect()
    }
}
