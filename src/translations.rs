//! Per-culture templates for one translation key, and the culture fallback lookup.

use crate::{culture::Culture, error::Error};

/// An insertion-ordered mapping from culture to template.
///
/// Insertion order is observable: when several entries share a language, the
/// loose match in [`TranslationMap::lookup`] returns the first one inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMap {
    entries: Vec<(Culture, String)>,
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from raw tag strings. Tags that fail to parse are dropped.
    pub fn from_tags<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = TranslationMap::new();
        for (tag, template) in entries {
            match Culture::parse(tag.as_ref()) {
                Ok(culture) => map.insert(culture, template),
                Err(err) => tracing::warn!("Skipping translation with invalid culture: {}", err),
            }
        }
        map
    }

    /// Adds or overwrites the template for `culture`.
    ///
    /// Overwriting keeps the culture's original position.
    pub fn insert(&mut self, culture: Culture, template: impl Into<String>) {
        let template = template.into();
        match self.entries.iter_mut().find(|(c, _)| *c == culture) {
            Some((_, existing)) => *existing = template,
            None => self.entries.push((culture, template)),
        }
    }

    /// The template stored for exactly `culture`.
    pub fn get(&self, culture: &Culture) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == culture)
            .map(|(_, template)| template.as_str())
    }

    /// Finds the template for `culture` through the fallback chain:
    /// exact match, then the parent culture (for non-neutral cultures whose
    /// parent is not invariant), then the first entry sharing the language.
    pub fn lookup(&self, culture: &Culture) -> Option<(&Culture, &str)> {
        self.find(|c| c == culture)
            .or_else(|| {
                let parent = culture.parent();
                if culture.is_neutral() || parent.is_invariant() {
                    return None;
                }
                self.find(|c| *c == parent)
            })
            .or_else(|| self.find(|c| c.is_language_equivalent(culture)))
    }

    /// Like [`lookup`](Self::lookup), failing with an error that names `key`.
    pub fn resolve(&self, culture: &Culture, key: &str) -> Result<&str, Error> {
        self.lookup(culture)
            .map(|(_, template)| template)
            .ok_or_else(|| Error::not_found(culture, key))
    }

    pub fn cultures(&self) -> impl Iterator<Item = &Culture> {
        self.entries.iter().map(|(culture, _)| culture)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Culture, &str)> {
        self.entries
            .iter()
            .map(|(culture, template)| (culture, template.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, predicate: impl Fn(&Culture) -> bool) -> Option<(&Culture, &str)> {
        self.entries
            .iter()
            .find(|(culture, _)| predicate(culture))
            .map(|(culture, template)| (culture, template.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(Culture, S)> for TranslationMap {
    fn from_iter<T: IntoIterator<Item = (Culture, S)>>(iter: T) -> Self {
        let mut map = TranslationMap::new();
        for (culture, template) in iter {
            map.insert(culture, template);
        }
        map
    }
}
