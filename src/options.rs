//! Options controlling how a [`crate::CultureRegistry`] picks its initial culture.

use serde::{Deserialize, Serialize};

use crate::{culture::Culture, error::Error};

/// Environment variables consulted, in order, when no initial culture is set.
pub const DEFAULT_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Culture used when neither the options nor the environment name one.
pub const DEFAULT_FALLBACK_CULTURE: &str = "en-US";

/// Startup configuration for a culture registry.
///
/// Deserializable so applications can embed it in their own settings files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
    /// Explicit initial culture. Takes precedence over the environment.
    pub initial_culture: Option<String>,
    /// Environment variables holding POSIX locale names such as `de_DE.UTF-8`.
    pub env_vars: Vec<String>,
    /// Used when nothing else yields a valid culture.
    pub fallback_culture: String,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        RegistryOptions {
            initial_culture: None,
            env_vars: DEFAULT_ENV_VARS.iter().map(|v| v.to_string()).collect(),
            fallback_culture: DEFAULT_FALLBACK_CULTURE.to_string(),
        }
    }
}

impl RegistryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit initial culture.
    pub fn with_initial_culture(mut self, culture: Option<String>) -> Self {
        self.initial_culture = culture;
        self
    }

    /// Replaces the environment variables consulted for the default culture.
    pub fn with_env_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_vars = vars.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the culture used when nothing else applies.
    pub fn with_fallback_culture(mut self, culture: impl Into<String>) -> Self {
        self.fallback_culture = culture.into();
        self
    }

    /// Determines the initial culture, reading the process environment.
    pub fn initial(&self) -> Result<Culture, Error> {
        self.initial_with(|var| std::env::var(var).ok())
    }

    /// Determines the initial culture using `lookup_env` for environment access.
    ///
    /// An explicit `initial_culture` must parse. Environment values that are
    /// unset, `C`, `POSIX` or malformed are skipped.
    pub fn initial_with(
        &self,
        lookup_env: impl Fn(&str) -> Option<String>,
    ) -> Result<Culture, Error> {
        if let Some(tag) = &self.initial_culture {
            return Culture::parse(tag);
        }

        for var in &self.env_vars {
            let Some(value) = lookup_env(var) else {
                continue;
            };
            match culture_from_posix(&value) {
                Some(culture) => {
                    tracing::debug!(var = %var, culture = %culture, "Initial culture from environment");
                    return Ok(culture);
                }
                None => tracing::debug!(var = %var, value = %value, "Ignoring locale value"),
            }
        }

        Culture::parse(&self.fallback_culture)
    }
}

/// Converts a POSIX locale name (`de_DE.UTF-8@euro`) into a culture (`de-DE`).
pub fn culture_from_posix(value: &str) -> Option<Culture> {
    let name = value.split(['.', '@']).next()?.trim();
    if name.is_empty() || name == "C" || name == "POSIX" {
        return None;
    }
    Culture::parse(name).ok()
}
