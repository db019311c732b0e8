//! All error types for the langlive crate.
//!
//! Lookup failures surface from unit construction and culture changes.
//! Resolver failures are only ever seen by direct callers of [`crate::template`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no translation found for culture `{culture}` and key `{key}`")]
    TranslationNotFound { culture: String, key: String },

    #[error("parameter index {index} is out of range ({len} parameters available)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("parameter `{name}` not found (available: {available})")]
    MissingParameter { name: String, available: String },

    #[error("invalid culture tag `{tag}`: {source}")]
    InvalidCulture {
        tag: String,
        #[source]
        source: unic_langid::LanguageIdentifierError,
    },
}

impl Error {
    /// Creates a lookup failure for `culture` and `key`.
    pub fn not_found(culture: impl ToString, key: impl Into<String>) -> Self {
        Error::TranslationNotFound {
            culture: culture.to_string(),
            key: key.into(),
        }
    }

    /// Whether this is a lookup failure rather than a resolver or parse failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TranslationNotFound { .. })
    }
}
