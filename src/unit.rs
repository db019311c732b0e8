//! Translation units: one localizable string that follows the current culture
//! and its bound parameters.

use std::{cell::Cell, fmt, rc::Rc};

use crate::{
    culture::Culture,
    error::Error,
    parameters::ParameterStore,
    registry::CultureRegistry,
    signal::{Subscription, ValueSignal},
    template,
    translations::TranslationMap,
};

struct Shared {
    key: String,
    translations: TranslationMap,
    parameters: ParameterStore,
    value: ValueSignal<String>,
    registry: CultureRegistry,
    disposed: Cell<bool>,
}

impl Shared {
    fn on_culture_changed(&self, culture: &Culture) -> Result<(), Error> {
        if self.disposed.get() {
            return Ok(());
        }
        let value = resolve_value(&self.key, &self.translations, &self.parameters, culture)?;
        self.value.set(value);
        Ok(())
    }

    fn on_parameters_changed(&self) {
        if self.disposed.get() {
            return;
        }
        let culture = self.registry.current();
        match resolve_value(&self.key, &self.translations, &self.parameters, &culture) {
            Ok(value) => self.value.set(value),
            Err(err) => tracing::warn!(key = %self.key, "Keeping previous value: {}", err),
        }
    }
}

/// A localizable string with a live, always-current value.
///
/// The value is recomputed eagerly whenever the registry's culture or one of
/// the unit's parameters changes, and every recomputation is pushed to
/// subscribers before the triggering call returns.
///
/// ```rust
/// use langlive::{Culture, CultureRegistry, TranslationMap, TranslationUnit};
///
/// let registry = CultureRegistry::new(Culture::parse("en-US")?);
/// let unit = TranslationUnit::with_registry(
///     "greeting",
///     TranslationMap::from_tags([("en", "Hello {0}"), ("fr", "Bonjour {0}")]),
///     &registry,
/// )?;
///
/// unit.parameters().set_indexed(0, "Ada");
/// assert_eq!(unit.value(), "Hello Ada");
///
/// registry.set_culture_tag("fr-FR")?;
/// assert_eq!(unit.value(), "Bonjour Ada");
/// # Ok::<(), langlive::Error>(())
/// ```
pub struct TranslationUnit {
    shared: Rc<Shared>,
    subscriptions: Vec<Subscription>,
}

impl TranslationUnit {
    /// Creates a unit that follows the thread's default registry.
    pub fn new(key: impl Into<String>, translations: TranslationMap) -> Result<Self, Error> {
        Self::with_registry(key, translations, &CultureRegistry::global())
    }

    /// Creates a unit from raw culture tags, following the default registry.
    ///
    /// Tags that do not parse are skipped.
    pub fn from_tags<I, K, V>(key: impl Into<String>, entries: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::new(key, TranslationMap::from_tags(entries))
    }

    /// Creates a unit that follows `registry`.
    ///
    /// Fails if no template matches the registry's current culture.
    pub fn with_registry(
        key: impl Into<String>,
        translations: TranslationMap,
        registry: &CultureRegistry,
    ) -> Result<Self, Error> {
        let key = key.into();
        let parameters = ParameterStore::new();
        let culture = registry.current();
        let initial = resolve_value(&key, &translations, &parameters, &culture)?;

        let shared = Rc::new(Shared {
            key,
            translations,
            parameters,
            value: ValueSignal::new(initial),
            registry: registry.clone(),
            disposed: Cell::new(false),
        });

        let weak = Rc::downgrade(&shared);
        let on_culture = registry.subscribe(move |culture| match weak.upgrade() {
            Some(shared) => shared.on_culture_changed(culture),
            None => Ok(()),
        });

        let weak = Rc::downgrade(&shared);
        let on_parameters = shared.parameters.subscribe(move |_| {
            if let Some(shared) = weak.upgrade() {
                shared.on_parameters_changed();
            }
        });

        tracing::debug!(key = %shared.key, culture = %culture, "Created translation unit");
        Ok(TranslationUnit {
            shared,
            subscriptions: vec![on_culture, on_parameters],
        })
    }

    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn translations(&self) -> &TranslationMap {
        &self.shared.translations
    }

    /// The current resolved string.
    pub fn value(&self) -> String {
        self.shared.value.get()
    }

    /// Delivers the current value to `handler` right away, then every new one.
    pub fn subscribe(&self, mut handler: impl FnMut(&str) + 'static) -> Subscription {
        self.shared.value.subscribe(move |value: &String| handler(value))
    }

    /// The unit's parameters. Every effective change re-resolves the value.
    pub fn parameters(&self) -> &ParameterStore {
        &self.shared.parameters
    }

    /// The culture of the registry this unit follows.
    pub fn culture(&self) -> Culture {
        self.shared.registry.current()
    }

    pub fn registry(&self) -> &CultureRegistry {
        &self.shared.registry
    }

    /// Stops following culture and parameter changes and drops value subscribers.
    ///
    /// The last value stays readable. Disposing twice is harmless.
    pub fn dispose(&mut self) {
        if self.shared.disposed.replace(true) {
            return;
        }
        self.subscriptions.clear();
        self.shared.parameters.clear_subscribers();
        self.shared.value.clear_subscribers();
        tracing::debug!(key = %self.shared.key, "Disposed translation unit");
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.get()
    }
}

impl Drop for TranslationUnit {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Display for TranslationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value())
    }
}

impl fmt::Debug for TranslationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationUnit")
            .field("key", &self.shared.key)
            .field("value", &self.value())
            .field("cultures", &self.shared.translations.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

fn resolve_value(
    key: &str,
    translations: &TranslationMap,
    parameters: &ParameterStore,
    culture: &Culture,
) -> Result<String, Error> {
    let template = translations.resolve(culture, key)?;
    Ok(apply_parameters(key, template, parameters))
}

/// Substitutes parameters into `template`.
///
/// Named parameters are preferred: if any are set and they cover every name
/// the template uses, the names are filled in and index placeholders stay as
/// written. Otherwise, if indexed parameters cover every index, those are
/// filled in. Anything short of that returns the template untouched.
fn apply_parameters(key: &str, template: &str, parameters: &ParameterStore) -> String {
    if !parameters.has_parameters() || !template::has_placeholders(template) {
        return template.to_string();
    }

    let names = template::required_names(template);
    let resolved = if parameters.named_count() > 0
        && names.iter().all(|name| parameters.contains_named(name))
    {
        template::resolve_named(template, &parameters.to_named_map())
    } else if parameters.indexed_count() > 0
        && template::required_indices(template)
            .iter()
            .all(|&index| parameters.contains_indexed(index))
    {
        template::resolve_indexed_map(template, &parameters.to_indexed_map())
    } else {
        return template.to_string();
    };

    resolved.unwrap_or_else(|err| {
        tracing::debug!(key = %key, "Keeping unresolved template: {}", err);
        template.to_string()
    })
}
