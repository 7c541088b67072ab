//! Extractor selection and per-provider settings

use docket_llm::{ProviderConfig, ProviderKind, ProviderOverrides};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default document extractor key
pub const DEFAULT_DOC_EXTRACTOR: &str = "local";

/// Default event extractor key
pub const DEFAULT_EVENT_EXTRACTOR: &str = "gemini";

/// Which extractor fills each slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Document extractor key
    pub doc_extractor: String,
    /// Event extractor (provider) key
    pub event_extractor: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            doc_extractor: DEFAULT_DOC_EXTRACTOR.to_string(),
            event_extractor: DEFAULT_EVENT_EXTRACTOR.to_string(),
        }
    }
}

impl SelectionConfig {
    /// Selection for one provider with the default document extractor
    pub fn for_provider(key: impl Into<String>) -> Self {
        Self {
            event_extractor: key.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `DOC_EXTRACTOR` and `EVENT_EXTRACTOR`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut selection = Self::default();
        if let Some(doc) = var("DOC_EXTRACTOR") {
            selection.doc_extractor = doc;
        }
        if let Some(event) = var("EVENT_EXTRACTOR") {
            selection.event_extractor = event;
        }
        selection
    }
}

/// Resolved settings for every provider
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    configs: HashMap<ProviderKind, ProviderConfig>,
}

impl ProviderSettings {
    /// Built-in defaults for every provider, no credentials
    pub fn new() -> Self {
        Self::default()
    }

    /// Every provider read from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Every provider read through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let configs = ProviderKind::ALL
            .into_iter()
            .map(|kind| (kind, ProviderConfig::from_lookup(kind, &lookup)))
            .collect();
        Self { configs }
    }

    /// Settings for `kind`, built-in defaults when none were given
    pub fn get(&self, kind: ProviderKind) -> ProviderConfig {
        self.configs
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| ProviderConfig::for_kind(kind))
    }

    /// Replace the settings of one provider
    pub fn set(&mut self, config: ProviderConfig) {
        self.configs.insert(config.kind, config);
    }

    /// Apply partial settings to one provider
    pub fn apply(&mut self, kind: ProviderKind, overrides: &ProviderOverrides) {
        let config = self.get(kind).with_overrides(overrides);
        self.set(config);
    }

    /// Providers that have a credential
    pub fn configured(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).api_key().is_some())
            .collect()
    }
}
