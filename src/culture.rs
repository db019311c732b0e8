//! Culture identifiers and the derived forms used by the fallback chain.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use unic_langid::LanguageIdentifier;

use crate::error::Error;

/// A normalized locale tag such as `en-US`.
///
/// Parsing canonicalizes subtag casing, so equality is case-insensitive on the
/// tag: `EN-us` and `en-US` are the same culture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Culture(LanguageIdentifier);

impl Culture {
    /// Parses a BCP 47 tag. Underscore separators (`en_US`) are accepted.
    pub fn parse(tag: &str) -> Result<Self, Error> {
        tag.trim()
            .replace('_', "-")
            .parse::<LanguageIdentifier>()
            .map(Culture)
            .map_err(|source| Error::InvalidCulture {
                tag: tag.to_string(),
                source,
            })
    }

    /// The root culture (`und`), which every neutral culture falls back to.
    pub fn invariant() -> Self {
        Culture(LanguageIdentifier::default())
    }

    pub fn is_invariant(&self) -> bool {
        self.0 == LanguageIdentifier::default()
    }

    /// A neutral culture carries no region: `en`, `zh-Hans`.
    pub fn is_neutral(&self) -> bool {
        self.0.region.is_none()
    }

    /// The next culture up the chain.
    ///
    /// `en-US` → `en`, `zh-Hans-CN` → `zh-Hans`, `zh-Hans` → `zh`, `en` → invariant.
    pub fn parent(&self) -> Culture {
        let id = &self.0;
        if id.region.is_some() || id.variants().next().is_some() {
            Culture(LanguageIdentifier::from_parts(id.language, id.script, None, &[]))
        } else if id.script.is_some() {
            Culture(LanguageIdentifier::from_parts(id.language, None, None, &[]))
        } else {
            Culture::invariant()
        }
    }

    /// The bare language subtag, used for loose matching (`en` for `en-GB`).
    pub fn language(&self) -> &str {
        self.0.language.as_str()
    }

    /// Two cultures are language-equivalent when their language subtags match.
    pub fn is_language_equivalent(&self, other: &Culture) -> bool {
        self.0.language == other.0.language
    }

    pub fn langid(&self) -> &LanguageIdentifier {
        &self.0
    }
}

impl FromStr for Culture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Culture::parse(s)
    }
}

impl From<LanguageIdentifier> for Culture {
    fn from(id: LanguageIdentifier) -> Self {
        Culture(id)
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Culture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Culture {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Culture::parse(&tag).map_err(serde::de::Error::custom)
    }
}
