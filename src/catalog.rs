//! A keyed collection of translation units sharing one registry.
//!
//! Generated accessor code typically owns one [`Catalog`] and exposes each
//! key as a typed getter over [`Catalog::get`].

use std::collections::{BTreeMap, btree_map::Entry};

use crate::{
    error::Error, registry::CultureRegistry, translations::TranslationMap, unit::TranslationUnit,
};

/// Translation units by key.
#[derive(Debug)]
pub struct Catalog {
    registry: CultureRegistry,
    units: BTreeMap<String, TranslationUnit>,
}

impl Catalog {
    /// Creates an empty catalog whose units follow `registry`.
    pub fn new(registry: &CultureRegistry) -> Self {
        Catalog {
            registry: registry.clone(),
            units: BTreeMap::new(),
        }
    }

    /// Builds a catalog from `key → (tag → template)` entries.
    ///
    /// Fails on the first key without a template for the current culture.
    pub fn from_entries<I, K, M, T, V>(registry: &CultureRegistry, entries: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<String>,
        M: IntoIterator<Item = (T, V)>,
        T: AsRef<str>,
        V: Into<String>,
    {
        let mut catalog = Catalog::new(registry);
        for (key, templates) in entries {
            catalog.insert(key, TranslationMap::from_tags(templates))?;
        }
        Ok(catalog)
    }

    /// Creates the unit for `key`, replacing (and disposing) any previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        translations: TranslationMap,
    ) -> Result<&TranslationUnit, Error> {
        let key = key.into();
        let unit = TranslationUnit::with_registry(key.clone(), translations, &self.registry)?;
        match self.units.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(unit).dispose();
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => Ok(slot.insert(unit)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&TranslationUnit> {
        self.units.get(key)
    }

    /// The current value for `key`.
    pub fn value(&self, key: &str) -> Option<String> {
        self.get(key).map(TranslationUnit::value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.units.contains_key(key)
    }

    /// Removes and disposes the unit for `key`.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.units.remove(key) {
            Some(mut unit) => {
                unit.dispose();
                true
            }
            None => false,
        }
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn registry(&self) -> &CultureRegistry {
        &self.registry
    }

    /// Disposes every unit and empties the catalog.
    pub fn dispose(&mut self) {
        for (_, mut unit) in std::mem::take(&mut self.units) {
            unit.dispose();
        }
    }
}
