//! Client configuration.
//!
//! All remote-call behaviour is controlled through [`ClientConfig`], built via
//! [`ClientConfigBuilder`] or loaded from the environment with
//! [`ClientConfig::from_env`]. The config is an explicit value handed to
//! [`crate::client::VisionClient::new`]; there is no process-wide client.

use crate::error::VisionError;
use std::fmt;

/// Environment variables consulted for the credential, in priority order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for table extraction.
pub const DEFAULT_EXTRACTION_MODEL: &str = "gemini-2.5-flash";

/// Default model for instruction-driven image editing.
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image";

/// Secret API key. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key. Returns `None` for an empty or whitespace-only string.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    /// The raw secret, for building the request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Configuration for a [`crate::client::VisionClient`].
///
/// # Example
/// ```rust
/// use tablesnap::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .api_key("test-key")
///     .timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.extraction_model, "gemini-2.5-flash");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Credential for the generation API. `None` is allowed at build time so
    /// the library can report [`VisionError::MissingCredential`] at the call
    /// site, before any network activity.
    pub api_key: Option<ApiKey>,

    /// API base URL without trailing slash. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Model used by `extract_table`. Default: `gemini-2.5-flash`.
    pub extraction_model: String,

    /// Model used by `edit_image`. Default: `gemini-2.5-flash-image`.
    pub edit_model: String,

    /// Per-request timeout in seconds. Default: 120.
    ///
    /// Image generation routinely takes 10–30 s; the generous default keeps
    /// slow edits from surfacing as spurious timeouts.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            extraction_model: DEFAULT_EXTRACTION_MODEL.to_string(),
            edit_model: DEFAULT_EDIT_MODEL.to_string(),
            timeout_secs: 120,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("extraction_model", &self.extraction_model)
            .field("edit_model", &self.edit_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Default config with the credential read from [`API_KEY_ENV_VARS`].
    pub fn from_env() -> Self {
        Self {
            api_key: api_key_from_env(),
            ..Self::default()
        }
    }

    /// The configured credential, or [`VisionError::MissingCredential`].
    pub fn require_api_key(&self) -> Result<&ApiKey, VisionError> {
        self.api_key
            .as_ref()
            .ok_or_else(|| VisionError::MissingCredential {
                hint: format!(
                    "Set {} (or {}) to your Gemini API key.",
                    API_KEY_ENV_VARS[0], API_KEY_ENV_VARS[1]
                ),
            })
    }
}

/// Read the first non-empty credential from [`API_KEY_ENV_VARS`].
pub fn api_key_from_env() -> Option<ApiKey> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(ApiKey::new)
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = ApiKey::new(key);
        self
    }

    pub fn api_key_opt(mut self, key: Option<ApiKey>) -> Self {
        self.config.api_key = key;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn extraction_model(mut self, model: impl Into<String>) -> Self {
        self.config.extraction_model = model.into();
        self
    }

    pub fn edit_model(mut self, model: impl Into<String>) -> Self {
        self.config.edit_model = model.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, VisionError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(VisionError::InvalidConfig(format!(
                "Base URL must be http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.timeout_secs == 0 {
            return Err(VisionError::InvalidConfig("Timeout must be ≥ 1s".into()));
        }
        if c.extraction_model.trim().is_empty() || c.edit_model.trim().is_empty() {
            return Err(VisionError::InvalidConfig("Model names must not be empty".into()));
        }
        Ok(self.config)
    }
}
