//! Request and response shapes of each provider wire format

use crate::config::{Dialect, ProviderConfig, ProviderKind};
use crate::error::ProviderError;
use crate::transport::ProviderRequest;
use docket_domain::{JSON_ARRAY_INSTRUCTION, JSON_OBJECT_INSTRUCTION, LEGAL_EVENTS_PROMPT};
use serde_json::{json, Value};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Token usage reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    /// Input tokens
    pub prompt_tokens: u64,
    /// Output tokens
    pub completion_tokens: u64,
}

/// Content of a successful call
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Model text that should contain JSON
    Text(String),
    /// Body that already is the event payload
    Json(Value),
}

/// Decoded provider response
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Events payload
    pub payload: Payload,
    /// Usage, when reported
    pub usage: Option<Usage>,
}

/// System prompt for the requested enforcement mode
pub fn system_prompt(json_mode: bool) -> String {
    let instruction = if json_mode {
        JSON_OBJECT_INSTRUCTION
    } else {
        JSON_ARRAY_INSTRUCTION
    };
    format!("{}\n\n{}", LEGAL_EVENTS_PROMPT, instruction)
}

/// User message carrying the document text
pub fn user_prompt(text: &str) -> String {
    format!("Extract the legal events from this document:\n\n{}", text)
}

/// Build the single POST for one attempt
pub fn build_request(
    config: &ProviderConfig,
    api_key: &str,
    json_mode: bool,
    text: &str,
) -> ProviderRequest {
    let base = config.base_url.trim_end_matches('/');
    let system = system_prompt(json_mode);
    let user = user_prompt(text);

    match config.kind.dialect() {
        Dialect::OpenAiChat => {
            let mut body = json!({
                "model": config.model,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": user},
                ],
                "temperature": 0.0,
            });
            if json_mode {
                body["response_format"] = json!({"type": "json_object"});
            }
            let mut headers = vec![
                ("Authorization".to_string(), format!("Bearer {}", api_key)),
                ("Content-Type".to_string(), "application/json".to_string()),
            ];
            if config.kind == ProviderKind::OpenRouter {
                headers.push(("X-Title".to_string(), "docket".to_string()));
            }
            ProviderRequest {
                url: format!("{}/chat/completions", base),
                headers,
                body,
            }
        }
        Dialect::AnthropicMessages => ProviderRequest {
            url: format!("{}/v1/messages", base),
            headers: vec![
                ("x-api-key".to_string(), api_key.to_string()),
                ("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: json!({
                "model": config.model,
                "max_tokens": config.max_tokens,
                "system": system,
                "messages": [{"role": "user", "content": user}],
                "temperature": 0.0,
            }),
        },
        Dialect::GeminiGenerate => {
            let model = config.model.strip_prefix("models/").unwrap_or(&config.model);
            let mut generation_config = json!({"temperature": 0.0});
            if json_mode {
                generation_config["responseMimeType"] = json!("application/json");
            }
            ProviderRequest {
                url: format!("{}/v1beta/models/{}:generateContent", base, model),
                headers: vec![
                    ("x-goog-api-key".to_string(), api_key.to_string()),
                    ("Content-Type".to_string(), "application/json".to_string()),
                ],
                body: json!({
                    "systemInstruction": {"parts": [{"text": system}]},
                    "contents": [{"role": "user", "parts": [{"text": user}]}],
                    "generationConfig": generation_config,
                }),
            }
        }
    }
}

/// Extract the payload and usage from a 2xx body
pub fn read_completion(dialect: Dialect, body: Value) -> Result<Completion, ProviderError> {
    match dialect {
        Dialect::OpenAiChat => read_openai(body),
        Dialect::AnthropicMessages => read_anthropic(body),
        Dialect::GeminiGenerate => read_gemini(body),
    }
}

fn usage_from(value: Option<&Value>, prompt_key: &str, completion_key: &str) -> Option<Usage> {
    let usage = value?;
    let prompt = usage.get(prompt_key).and_then(Value::as_u64);
    let completion = usage.get(completion_key).and_then(Value::as_u64);
    if prompt.is_none() && completion.is_none() {
        return None;
    }
    Some(Usage {
        prompt_tokens: prompt.unwrap_or(0),
        completion_tokens: completion.unwrap_or(0),
    })
}

fn non_empty(text: String) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::EmptyResponse)
    } else {
        Ok(text)
    }
}

fn read_openai(body: Value) -> Result<Completion, ProviderError> {
    let usage = usage_from(body.get("usage"), "prompt_tokens", "completion_tokens");

    if let Some(choices) = body.get("choices") {
        let content = choices
            .get(0)
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .ok_or(ProviderError::EmptyResponse)?;
        return Ok(Completion {
            payload: Payload::Text(non_empty(content.to_string())?),
            usage,
        });
    }

    // Some gateways answer with the event payload directly
    if ["events", "extractions", "results"]
        .iter()
        .any(|k| body.get(*k).is_some())
    {
        return Ok(Completion {
            payload: Payload::Json(body),
            usage,
        });
    }

    if let Some(message) = body
        .get("error")
        .and_then(|e| e.get("message").or(Some(e)))
    {
        return Err(ProviderError::Parse(format!("Provider returned an error body: {}", message)));
    }
    Err(ProviderError::Parse("Response has no choices".to_string()))
}

fn read_anthropic(body: Value) -> Result<Completion, ProviderError> {
    let usage = usage_from(body.get("usage"), "input_tokens", "output_tokens");
    let blocks = body
        .get("content")
        .and_then(Value::as_array)
        .ok_or(ProviderError::EmptyResponse)?;
    let text: String = blocks
        .iter()
        .filter_map(|b| b.get("text").and_then(Value::as_str))
        .collect();
    Ok(Completion {
        payload: Payload::Text(non_empty(text)?),
        usage,
    })
}

fn read_gemini(body: Value) -> Result<Completion, ProviderError> {
    let usage = usage_from(
        body.get("usageMetadata"),
        "promptTokenCount",
        "candidatesTokenCount",
    );
    let parts = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .ok_or(ProviderError::EmptyResponse)?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    Ok(Completion {
        payload: Payload::Text(non_empty(text)?),
        usage,
    })
}
