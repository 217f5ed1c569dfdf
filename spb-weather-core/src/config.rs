use std::fmt;

use crate::provider::ProviderId;

pub const TOMORROWIO_KEY_VAR: &str = "APIKEY_TOMORROWIO";
pub const STORMGLASS_KEY_VAR: &str = "APIKEY_STORMGLASS";

/// Credentials for the upstream providers, read once at startup.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub tomorrowio_api_key: String,
    pub stormglass_api_key: String,
}

impl Config {
    /// Read both keys from the process environment.
    ///
    /// A missing variable becomes an empty key; the upstream call then fails with
    /// its own authentication error.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup, so tests need not touch the real environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            tomorrowio_api_key: lookup(TOMORROWIO_KEY_VAR).unwrap_or_default(),
            stormglass_api_key: lookup(STORMGLASS_KEY_VAR).unwrap_or_default(),
        }
    }

    pub fn provider_api_key(&self, id: ProviderId) -> &str {
        match id {
            ProviderId::Tomorrowio => &self.tomorrowio_api_key,
            ProviderId::Stormglass => &self.stormglass_api_key,
        }
    }

    pub fn is_provider_configured(&self, id: ProviderId) -> bool {
        !self.provider_api_key(id).is_empty()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = |key: &str| if key.is_empty() { "<unset>" } else { "<redacted>" };

        f.debug_struct("Config")
            .field("tomorrowio_api_key", &shown(&self.tomorrowio_api_key))
            .field("stormglass_api_key", &shown(&self.stormglass_api_key))
            .finish()
    }
}
