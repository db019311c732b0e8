#![forbid(unsafe_code)]
//! Reactive, culture-aware translation units for desktop UIs.
//!
//! A [`TranslationUnit`] holds one localizable string in several cultures and
//! keeps a live value that follows the current culture of a
//! [`CultureRegistry`] and the unit's own [`ParameterStore`].
//!
//! # Quick Start
//!
//! ```rust
//! use langlive::{Culture, CultureRegistry, TranslationMap, TranslationUnit};
//!
//! let registry = CultureRegistry::new(Culture::parse("en-US")?);
//! let unit = TranslationUnit::with_registry(
//!     "welcome",
//!     TranslationMap::from_tags([
//!         ("en", "Welcome {name}, you have {count} items"),
//!         ("de", "Willkommen {name}, Sie haben {count} Artikel"),
//!     ]),
//!     &registry,
//! )?;
//!
//! let _label = unit.subscribe(|text| println!("label: {text}"));
//!
//! unit.parameters().set_named("name", "Alice");
//! unit.parameters().set_named("count", 3);
//! assert_eq!(unit.value(), "Welcome Alice, you have 3 items");
//!
//! registry.set_culture_tag("de-DE")?;
//! assert_eq!(unit.value(), "Willkommen Alice, Sie haben 3 Artikel");
//! # Ok::<(), langlive::Error>(())
//! ```
//!
//! # Resolution rules
//!
//! - Templates are looked up by exact culture, then parent culture, then any
//!   culture sharing the language (first inserted wins).
//! - Placeholders are `{0}` or `{name}`; `{{` and `}}` escape braces.
//! - Named parameters are applied when they cover every `{name}` in the
//!   template; otherwise indexed parameters are applied when they cover every
//!   `{i}`. Partial coverage shows the raw template.
//!
//! Everything is single threaded and synchronous: by the time a setter
//! returns, every affected unit holds its new value. A setter called from a
//! subscriber queues its change, which settles before the outermost call
//! returns.

pub mod catalog;
pub mod culture;
pub mod error;
pub mod options;
pub mod parameters;
pub mod registry;
pub mod signal;
pub mod template;
pub mod translations;
pub mod unit;
pub mod value;

// Re-export most used types for easy consumption
pub use crate::{
    catalog::Catalog,
    culture::Culture,
    error::Error,
    options::RegistryOptions,
    parameters::{ParameterChange, ParameterStore},
    registry::CultureRegistry,
    signal::Subscription,
    translations::TranslationMap,
    unit::TranslationUnit,
    value::ParamValue,
};
