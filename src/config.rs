use std::env;

const API_KEY_ENV: &str = "OPENAI_API_KEY";
const API_BASE_ENV: &str = "OPENAI_API_BASE";
const MODEL_ENV: &str = "REFORM_MODEL";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

/// Provider settings, read once at process start and treated as immutable for
/// the process lifetime. Passed into the client explicitly rather than held
/// in a global, so tests can substitute a mock endpoint.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var(API_KEY_ENV).unwrap_or_default(),
            base_url: env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }

    /// An all-whitespace key counts as missing; /api/health reports this and
    /// dispatch refuses to attempt a call without it.
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Build a full endpoint URL, tolerating a trailing slash on the base.
    pub fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}
