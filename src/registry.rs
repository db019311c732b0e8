//! The current-culture state that translation units follow.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    culture::Culture,
    error::Error,
    options::RegistryOptions,
    signal::{Observers, Subscription},
};

thread_local! {
    static GLOBAL: CultureRegistry = CultureRegistry::from_env();
}

struct Inner {
    initial: Culture,
    current: RefCell<Culture>,
    observers: Observers<Culture, Result<(), Error>>,
}

/// Holds the active culture and broadcasts changes to subscribers.
///
/// Cloning yields another handle to the same registry. Independent registries
/// can coexist; [`CultureRegistry::global`] is the shared default that
/// application code uses when it does not pass one explicitly.
#[derive(Clone)]
pub struct CultureRegistry {
    inner: Rc<Inner>,
}

impl CultureRegistry {
    pub fn new(initial: Culture) -> Self {
        CultureRegistry {
            inner: Rc::new(Inner {
                current: RefCell::new(initial.clone()),
                initial,
                observers: Observers::new(),
            }),
        }
    }

    pub fn with_options(options: &RegistryOptions) -> Result<Self, Error> {
        Ok(Self::new(options.initial()?))
    }

    /// A registry starting from the environment's locale, or `en-US`.
    pub fn from_env() -> Self {
        let options = RegistryOptions::default();
        let initial = options.initial().unwrap_or_else(|err| {
            tracing::warn!("Falling back to invariant culture: {}", err);
            Culture::invariant()
        });
        Self::new(initial)
    }

    /// The default registry for this thread, created from the environment on first use.
    pub fn global() -> Self {
        GLOBAL.with(CultureRegistry::clone)
    }

    pub fn current(&self) -> Culture {
        self.inner.current.borrow().clone()
    }

    /// The culture the registry started with and returns to on [`reset`](Self::reset).
    pub fn initial(&self) -> &Culture {
        &self.inner.initial
    }

    /// Makes `culture` current and notifies every subscriber before returning.
    ///
    /// Setting the current culture again does nothing. Every subscriber is
    /// notified even if an earlier one fails; the first failure is returned.
    /// The new culture stays current either way.
    ///
    /// Called from inside a subscriber, the change is queued behind the
    /// broadcast in progress and its failures surface from the outer call.
    pub fn set_culture(&self, culture: Culture) -> Result<(), Error> {
        if *self.inner.current.borrow() == culture {
            return Ok(());
        }

        tracing::debug!(
            culture = %culture,
            subscribers = self.inner.observers.len(),
            "Changing culture"
        );
        *self.inner.current.borrow_mut() = culture.clone();

        let mut first_error = None;
        for result in self.inner.observers.notify(&culture) {
            if let Err(err) = result {
                if first_error.is_none() {
                    first_error = Some(err);
                } else {
                    tracing::warn!("Additional failure while changing culture: {}", err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Parses `tag` and makes it current.
    pub fn set_culture_tag(&self, tag: &str) -> Result<(), Error> {
        self.set_culture(Culture::parse(tag)?)
    }

    /// Calls `handler` with every new culture until the guard is dropped.
    pub fn subscribe(
        &self,
        handler: impl FnMut(&Culture) -> Result<(), Error> + 'static,
    ) -> Subscription {
        self.inner.observers.subscribe(handler)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.observers.len()
    }

    /// Drops all subscribers and restores the initial culture without notifying.
    pub fn reset(&self) {
        self.inner.observers.clear();
        *self.inner.current.borrow_mut() = self.inner.initial.clone();
    }

    /// Whether both handles point at the same registry.
    pub fn ptr_eq(&self, other: &CultureRegistry) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for CultureRegistry {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for CultureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CultureRegistry")
            .field("current", &self.current())
            .field("initial", &self.inner.initial)
            .field("subscribers", &self.inner.observers.len())
            .finish()
    }
}
