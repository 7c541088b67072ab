//! Native JSON-mode support per (provider, model)

use crate::config::ProviderKind;

const OPENAI_JSON_PREFIXES: &[&str] = &["gpt-4o", "gpt-4.1", "gpt-4-turbo"];

const OPENAI_JSON_EXACT: &[&str] = &[
    "gpt-4-1106-preview",
    "gpt-4-0125-preview",
    "gpt-3.5-turbo-1106",
    "gpt-3.5-turbo-0125",
];

const GEMINI_JSON_PREFIXES: &[&str] = &["gemini-1.5", "gemini-2"];

/// Whether the provider can constrain this model's output to JSON.
///
/// Providers without native support fall back to prompt-only enforcement
/// and have code fences stripped before parsing.
pub fn supports_json_mode(kind: ProviderKind, model: &str) -> bool {
    let model = model.trim().to_ascii_lowercase();
    match kind {
        ProviderKind::OpenRouter => true,
        ProviderKind::OpenAi => {
            OPENAI_JSON_EXACT.contains(&model.as_str())
                || OPENAI_JSON_PREFIXES.iter().any(|p| model.starts_with(p))
        }
        ProviderKind::DeepSeek => model == "deepseek-chat",
        ProviderKind::Gemini => {
            let bare = model.strip_prefix("models/").unwrap_or(&model);
            GEMINI_JSON_PREFIXES.iter().any(|p| bare.starts_with(p))
        }
        ProviderKind::Anthropic | ProviderKind::OpenCodeZen => false,
    }
}
