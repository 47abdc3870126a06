/// Application-level constants
pub const APP_NAME: &str = "Labwise";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Model used for the one-shot report analysis.
pub const ANALYSIS_MODEL: &str = "gemini-1.5-pro";

/// Model used for chat turns.
pub const CHAT_MODEL: &str = "gemini-1.5-flash";

/// Google Generative Language REST endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Per-request timeout for generative calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variables read by `GenerativeConfig::from_env`.
pub const ENV_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_BASE_URL: &str = "LABWISE_GEMINI_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "LABWISE_TIMEOUT_SECS";

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "labwise=info"
}

/// Connection settings for the generative model.
///
/// Passed explicitly into `GeminiClient`; library code never looks at the
/// process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerativeConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GenerativeConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build from a variable lookup. `from_env` passes `std::env::var`;
    /// tests pass a closure over a fixed map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let api_key = lookup(ENV_API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let base_url = lookup(ENV_BASE_URL)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or(defaults.base_url);
        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Ignoring unparseable timeout, using default");
                defaults.timeout_secs
            }),
            None => defaults.timeout_secs,
        };

        Self {
            api_key,
            base_url,
            timeout_secs,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}
