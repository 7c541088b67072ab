//! Provider configuration
//!
//! One [`ProviderConfig`] per adapter, built from per-provider defaults and
//! overridden from the environment or a config file. Configs are taken by
//! value at construction and never change during a run.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff (milliseconds)
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Default completion budget for providers that require one
pub const DEFAULT_MAX_TOKENS: u32 = 4_096;

/// Wire format spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `POST /chat/completions` with a bearer token
    OpenAiChat,
    /// `POST /v1/messages` with `x-api-key`
    AnthropicMessages,
    /// `POST /v1beta/models/{model}:generateContent` with `x-goog-api-key`
    GeminiGenerate,
}

/// Closed set of supported providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenRouter gateway
    #[serde(rename = "openrouter")]
    OpenRouter,
    /// OpenAI
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic
    Anthropic,
    /// OpenCode Zen
    #[serde(rename = "opencode_zen")]
    OpenCodeZen,
    /// DeepSeek
    #[serde(rename = "deepseek")]
    DeepSeek,
    /// Google Gemini
    Gemini,
}

impl ProviderKind {
    /// Every provider, in registration order
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::OpenRouter,
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::OpenCodeZen,
        ProviderKind::DeepSeek,
        ProviderKind::Gemini,
    ];

    /// Lowercase selection key
    pub fn key(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenCodeZen => "opencode_zen",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Human readable name used in logs and fallback messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "OpenRouter",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
            ProviderKind::OpenCodeZen => "OpenCode Zen",
            ProviderKind::DeepSeek => "DeepSeek",
            ProviderKind::Gemini => "Gemini",
        }
    }

    /// Prefix of the provider's environment variables
    pub fn env_prefix(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "OPENROUTER",
            ProviderKind::OpenAi => "OPENAI",
            ProviderKind::Anthropic => "ANTHROPIC",
            ProviderKind::OpenCodeZen => "OPENCODEZEN",
            ProviderKind::DeepSeek => "DEEPSEEK",
            ProviderKind::Gemini => "GEMINI",
        }
    }

    /// Wire format
    pub fn dialect(&self) -> Dialect {
        match self {
            ProviderKind::Anthropic => Dialect::AnthropicMessages,
            ProviderKind::Gemini => Dialect::GeminiGenerate,
            _ => Dialect::OpenAiChat,
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "https://openrouter.ai/api/v1",
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::OpenCodeZen => "https://opencode.ai/zen/v1",
            ProviderKind::DeepSeek => "https://api.deepseek.com",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "anthropic/claude-3-haiku",
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-3-haiku-20240307",
            ProviderKind::OpenCodeZen => "grok-code",
            ProviderKind::DeepSeek => "deepseek-chat",
            ProviderKind::Gemini => "gemini-2.0-flash",
        }
    }

    fn default_timeout_secs(&self) -> u64 {
        match self {
            ProviderKind::OpenRouter | ProviderKind::OpenCodeZen => 30,
            _ => 60,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    /// Case-insensitive, whitespace tolerant
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|k| k.key() == key)
            .ok_or_else(|| ConfigError::UnknownProvider(s.trim().to_string()))
    }
}

/// Cost policy for models missing from the price table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum UnknownModelPricing {
    /// Cheapest known tier of the same provider
    #[default]
    CheapestKnown,
    /// Do not charge
    Zero,
    /// Explicit USD per million tokens
    Fixed {
        /// Input price
        input: f64,
        /// Output price
        output: f64,
    },
}

/// Settings for one provider adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Which provider this configures
    pub kind: ProviderKind,

    /// Credential; adapters are unavailable without it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API root, without a trailing slash
    pub base_url: String,

    /// Model id
    pub model: String,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Retries after the first attempt
    pub max_retries: u32,

    /// First backoff delay (milliseconds)
    pub backoff_base_ms: u64,

    /// Completion budget sent to providers that require one
    pub max_tokens: u32,

    /// Cost policy for unpriced models
    #[serde(default)]
    pub unknown_model_pricing: UnknownModelPricing,
}

impl ProviderConfig {
    /// Defaults for a provider, without credentials
    pub fn for_kind(kind: ProviderKind) -> Self {
        Self {
            kind,
            api_key: None,
            base_url: kind.default_base_url().to_string(),
            model: kind.default_model().to_string(),
            timeout_secs: kind.default_timeout_secs(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            max_tokens: DEFAULT_MAX_TOKENS,
            unknown_model_pricing: UnknownModelPricing::default(),
        }
    }

    /// Defaults overridden from process environment variables
    pub fn from_env(kind: ProviderKind) -> Self {
        Self::from_lookup(kind, |name| std::env::var(name).ok())
    }

    /// Defaults overridden through an arbitrary variable lookup.
    ///
    /// Reads `<PREFIX>_API_KEY`, `<PREFIX>_BASE_URL`, `<PREFIX>_MODEL`,
    /// `<PREFIX>_TIMEOUT` and `<PREFIX>_MAX_RETRIES`. Gemini also accepts
    /// `GOOGLE_API_KEY`. Blank and unparsable values are ignored.
    pub fn from_lookup<F>(kind: ProviderKind, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::for_kind(kind).with_overrides(&ProviderOverrides::from_lookup(kind, lookup))
    }

    /// Name of the variable that supplies the credential
    pub fn api_key_setting(&self) -> String {
        format!("{}_API_KEY", self.kind.env_prefix())
    }

    /// Credential, if present and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Fail with the missing setting when no credential is configured
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key().ok_or_else(|| ConfigError::MissingSetting {
            provider: self.kind.display_name().to_string(),
            setting: self.api_key_setting(),
        })
    }

    /// Per-request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Total attempts per call, first attempt included
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!("base_url must be an http(s) URL, got '{}'", self.base_url));
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if let UnknownModelPricing::Fixed { input, output } = self.unknown_model_pricing {
            if input < 0.0 || output < 0.0 {
                return Err("fixed pricing must not be negative".to_string());
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    /// Apply optional overrides, e.g. from a config file section
    pub fn with_overrides(mut self, overrides: &ProviderOverrides) -> Self {
        if let Some(key) = overrides.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.clone());
        }
        if let Some(url) = &overrides.base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = &overrides.model {
            self.model = model.clone();
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(retries) = overrides.max_retries {
            self.max_retries = retries;
        }
        if let Some(base) = overrides.backoff_base_ms {
            self.backoff_base_ms = base;
        }
        if let Some(tokens) = overrides.max_tokens {
            self.max_tokens = tokens;
        }
        if let Some(pricing) = overrides.unknown_model_pricing {
            self.unknown_model_pricing = pricing;
        }
        self
    }
}

/// Partial provider settings; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOverrides {
    /// Credential
    pub api_key: Option<String>,
    /// API root
    pub base_url: Option<String>,
    /// Model id
    pub model: Option<String>,
    /// Per-request timeout (seconds)
    pub timeout_secs: Option<u64>,
    /// Retries after the first attempt
    pub max_retries: Option<u32>,
    /// First backoff delay (milliseconds)
    pub backoff_base_ms: Option<u64>,
    /// Completion budget
    pub max_tokens: Option<u32>,
    /// Cost policy for unpriced models
    pub unknown_model_pricing: Option<UnknownModelPricing>,
}

impl ProviderOverrides {
    /// Overrides present in a variable lookup; see [`ProviderConfig::from_lookup`]
    pub fn from_lookup<F>(kind: ProviderKind, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = kind.env_prefix();
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let var = |suffix: &str| read(&format!("{}_{}", prefix, suffix));

        let mut api_key = var("API_KEY");
        if api_key.is_none() && kind == ProviderKind::Gemini {
            api_key = read("GOOGLE_API_KEY");
        }
        Self {
            api_key,
            base_url: var("BASE_URL"),
            model: var("MODEL"),
            timeout_secs: var("TIMEOUT").and_then(|v| v.parse().ok()),
            max_retries: var("MAX_RETRIES").and_then(|v| v.parse().ok()),
            ..Self::default()
        }
    }

    /// True when nothing is overridden
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
