//! The indexed/named parameter bag owned by each translation unit.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fmt,
    rc::Rc,
};

use crate::{
    signal::{Observers, Subscription},
    value::ParamValue,
};

/// What a successful mutation of a [`ParameterStore`] touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterChange {
    Indexed(usize),
    Named(String),
    IndexedReplaced,
    NamedReplaced,
    Cleared,
}

#[derive(Default)]
struct Bag {
    indexed: HashMap<usize, ParamValue>,
    named: HashMap<String, ParamValue>,
}

/// A mutable bag of indexed and named parameter values.
///
/// Every single-entry mutation that actually changes the contents emits
/// exactly one [`ParameterChange`]. Assigning a value equal to the stored one,
/// removing an absent entry or clearing an empty store emits nothing. A bulk
/// replace always emits one event.
///
/// Cloning yields another handle to the same bag.
#[derive(Clone, Default)]
pub struct ParameterStore {
    bag: Rc<RefCell<Bag>>,
    changes: Rc<Observers<ParameterChange>>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_indexed(&self, index: usize) -> Option<ParamValue> {
        self.bag.borrow().indexed.get(&index).cloned()
    }

    pub fn get_named(&self, name: &str) -> Option<ParamValue> {
        self.bag.borrow().named.get(name).cloned()
    }

    pub fn set_indexed(&self, index: usize, value: impl Into<ParamValue>) {
        self.assign_indexed(index, Some(value.into()));
    }

    pub fn set_named(&self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.assign_named(name, Some(value.into()));
    }

    pub fn remove_indexed(&self, index: usize) {
        self.assign_indexed(index, None);
    }

    pub fn remove_named(&self, name: &str) {
        self.assign_named(name, None);
    }

    /// Stores `value` at `index`; `None` removes the entry.
    pub fn assign_indexed(&self, index: usize, value: Option<ParamValue>) {
        let changed = assign(&mut self.bag.borrow_mut().indexed, index, value);
        if changed {
            self.notify(ParameterChange::Indexed(index));
        }
    }

    /// Stores `value` under `name`; `None` removes the entry.
    pub fn assign_named(&self, name: impl Into<String>, value: Option<ParamValue>) {
        let name = name.into();
        let changed = assign(&mut self.bag.borrow_mut().named, name.clone(), value);
        if changed {
            self.notify(ParameterChange::Named(name));
        }
    }

    /// Replaces every indexed parameter with `values`, position by position.
    ///
    /// `None` entries leave a gap. Always emits exactly one event.
    pub fn replace_indexed<I, V>(&self, values: I)
    where
        I: IntoIterator<Item = Option<V>>,
        V: Into<ParamValue>,
    {
        let next: HashMap<usize, ParamValue> = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| value.map(|v| (index, v.into())))
            .collect();

        self.bag.borrow_mut().indexed = next;
        self.notify(ParameterChange::IndexedReplaced);
    }

    /// Replaces every named parameter with `values`. `None` values are skipped.
    ///
    /// Always emits exactly one event.
    pub fn replace_named<I, K, V>(&self, values: I)
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let next: HashMap<String, ParamValue> = values
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.into(), v.into())))
            .collect();

        self.bag.borrow_mut().named = next;
        self.notify(ParameterChange::NamedReplaced);
    }

    /// Removes every parameter. Emits one event iff the store was non-empty.
    pub fn clear(&self) {
        let had_parameters = {
            let mut bag = self.bag.borrow_mut();
            let had = !bag.indexed.is_empty() || !bag.named.is_empty();
            bag.indexed.clear();
            bag.named.clear();
            had
        };
        if had_parameters {
            self.notify(ParameterChange::Cleared);
        }
    }

    pub fn has_parameters(&self) -> bool {
        let bag = self.bag.borrow();
        !bag.indexed.is_empty() || !bag.named.is_empty()
    }

    pub fn indexed_count(&self) -> usize {
        self.bag.borrow().indexed.len()
    }

    pub fn named_count(&self) -> usize {
        self.bag.borrow().named.len()
    }

    pub fn contains_indexed(&self, index: usize) -> bool {
        self.bag.borrow().indexed.contains_key(&index)
    }

    pub fn contains_named(&self, name: &str) -> bool {
        self.bag.borrow().named.contains_key(name)
    }

    /// A snapshot of the indexed parameters. Indices are sparse.
    pub fn to_indexed_map(&self) -> BTreeMap<usize, ParamValue> {
        self.bag
            .borrow()
            .indexed
            .iter()
            .map(|(index, value)| (*index, value.clone()))
            .collect()
    }

    /// A snapshot of the named parameters.
    pub fn to_named_map(&self) -> BTreeMap<String, ParamValue> {
        self.bag
            .borrow()
            .named
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Calls `handler` after every effective mutation.
    pub fn subscribe(&self, handler: impl FnMut(&ParameterChange) + 'static) -> Subscription {
        self.changes.subscribe(handler)
    }

    pub(crate) fn clear_subscribers(&self) {
        self.changes.clear();
    }

    fn notify(&self, change: ParameterChange) {
        tracing::trace!(?change, "parameters changed");
        self.changes.notify(&change);
    }
}

fn assign<K: std::hash::Hash + Eq>(
    map: &mut HashMap<K, ParamValue>,
    key: K,
    value: Option<ParamValue>,
) -> bool {
    match value {
        None => map.remove(&key).is_some(),
        Some(value) => {
            if map.get(&key) == Some(&value) {
                false
            } else {
                map.insert(key, value);
                true
            }
        }
    }
}

impl fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterStore")
            .field("indexed", &self.to_indexed_map())
            .field("named", &self.to_named_map())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting(store: &ParameterStore) -> (Rc<Cell<usize>>, Subscription) {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let subscription = store.subscribe(move |_| counter.set(counter.get() + 1));
        (count, subscription)
    }

    #[test]
    fn test_set_and_get_indexed() {
        let store = ParameterStore::new();
        store.set_indexed(0, "zero");
        store.set_indexed(2, 2);
        assert_eq!(store.get_indexed(0), Some(ParamValue::from("zero")));
        assert_eq!(store.get_indexed(2), Some(ParamValue::from(2)));
        assert_eq!(store.get_indexed(1), None);
        assert_eq!(store.indexed_count(), 2);
    }

    #[test]
    fn test_set_and_get_named() {
        let store = ParameterStore::new();
        store.set_named("username", "John");
        assert_eq!(store.get_named("username"), Some(ParamValue::from("John")));
        assert_eq!(store.get_named("nonexistent"), None);
        assert_eq!(store.named_count(), 1);
    }

    #[test]
    fn test_same_value_does_not_notify() {
        let store = ParameterStore::new();
        store.set_indexed(0, "same");
        store.set_named("n", 1);
        let (count, _subscription) = counting(&store);

        store.set_indexed(0, "same");
        store.set_named("n", 1);
        assert_eq!(count.get(), 0);

        store.set_indexed(0, "other");
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_repeated_nan_notifies_once() {
        let store = ParameterStore::new();
        let (count, _subscription) = counting(&store);

        for _ in 0..3 {
            store.set_indexed(0, f64::NAN);
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_none_removes_entry() {
        let store = ParameterStore::new();
        store.set_indexed(0, "value");
        store.set_indexed(1, "value");
        let (count, _subscription) = counting(&store);

        store.assign_indexed(0, None);
        assert_eq!(store.get_indexed(0), None);
        assert_eq!(store.indexed_count(), 1);
        assert_eq!(count.get(), 1);

        store.remove_indexed(0);
        store.remove_named("missing");
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_change_events_describe_mutation() {
        let store = ParameterStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = store.subscribe(move |change| sink.borrow_mut().push(change.clone()));

        store.set_indexed(3, true);
        store.set_named("name", "x");
        store.clear();

        assert_eq!(
            *seen.borrow(),
            vec![
                ParameterChange::Indexed(3),
                ParameterChange::Named("name".to_string()),
                ParameterChange::Cleared,
            ]
        );
    }

    #[test]
    fn test_clear_notifies_only_when_non_empty() {
        let store = ParameterStore::new();
        let (count, _subscription) = counting(&store);

        store.clear();
        assert_eq!(count.get(), 0);

        store.set_indexed(0, "indexed");
        store.set_named("named", "value");
        store.clear();
        assert_eq!(count.get(), 3);
        assert!(!store.has_parameters());
        assert_eq!(store.get_indexed(0), None);
        assert_eq!(store.get_named("named"), None);
    }

    #[test]
    fn test_has_parameters() {
        let store = ParameterStore::new();
        assert!(!store.has_parameters());
        store.set_named("named", "value");
        assert!(store.has_parameters());
        store.remove_named("named");
        store.set_indexed(0, "value");
        assert!(store.has_parameters());
    }

    #[test]
    fn test_indexed_map_is_sparse() {
        let store = ParameterStore::new();
        assert!(store.to_indexed_map().is_empty());

        store.set_indexed(0, "zero");
        store.set_indexed(5, "five");
        store.set_indexed(usize::MAX, "last");
        store.set_named("ignored", "x");

        let values = store.to_indexed_map();
        assert_eq!(values.len(), 3);
        assert_eq!(values[&0], ParamValue::from("zero"));
        assert_eq!(values[&usize::MAX], ParamValue::from("last"));
        assert!(store.contains_indexed(5));
        assert!(!store.contains_indexed(1));
        assert!(store.contains_named("ignored"));
        assert!(format!("{store:?}").contains("last"));
    }

    #[test]
    fn test_named_map_is_snapshot() {
        let store = ParameterStore::new();
        store.set_named("string", "text");
        store.set_named("number", 42);
        store.set_named("decimal", 2.5);
        store.set_named("boolean", false);
        store.set_indexed(0, "ignored");

        let snapshot = store.to_named_map();
        store.set_named("late", "x");

        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot["number"], ParamValue::from(42));
        assert_eq!(snapshot["boolean"], ParamValue::from(false));
        assert!(!snapshot.contains_key("late"));
    }

    #[test]
    fn test_replace_emits_single_event() {
        let store = ParameterStore::new();
        store.set_indexed(7, "stale");
        let (count, _subscription) = counting(&store);

        store.replace_indexed([Some("a"), None, Some("c")]);
        assert_eq!(count.get(), 1);
        assert_eq!(store.get_indexed(7), None);
        assert_eq!(store.get_indexed(1), None);
        assert_eq!(store.get_indexed(2), Some(ParamValue::from("c")));

        store.replace_indexed([Some("a"), None, Some("c")]);
        assert_eq!(count.get(), 2);

        store.replace_named([("x", Some(1)), ("y", None), ("z", Some(3))]);
        assert_eq!(count.get(), 3);
        assert_eq!(store.named_count(), 2);
    }

    #[test]
    fn test_clones_share_the_bag() {
        let store = ParameterStore::new();
        let handle = store.clone();
        let (count, _subscription) = counting(&store);

        handle.set_named("shared", 1);
        assert_eq!(store.get_named("shared"), Some(ParamValue::from(1)));
        assert_eq!(count.get(), 1);
    }
}
