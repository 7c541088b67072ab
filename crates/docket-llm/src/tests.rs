//! Adapter scenarios across every provider variant

use crate::adapter::{REASON_NO_EVENTS, REASON_NO_TEXT};
use crate::config::Dialect;
use crate::*;
use docket_domain::{
    DocumentMetadata, EventExtractor, ExtractionMethod, DEFAULT_NO_CITATION, FALLBACK_CITATION,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn metadata() -> DocumentMetadata {
    DocumentMetadata::for_path("/matters/2024/complaint.pdf", ExtractionMethod::Native)
}

fn config(kind: ProviderKind) -> ProviderConfig {
    let mut config = ProviderConfig::for_kind(kind);
    config.api_key = Some("test-key".to_string());
    config.backoff_base_ms = 0;
    config
}

fn adapter(config: ProviderConfig, transport: &MockTransport) -> ProviderAdapter {
    ProviderAdapter::with_transport(config, Arc::new(transport.clone())).unwrap()
}

/// A 2xx body in the provider's own shape, carrying `content` as model text
fn success_body(kind: ProviderKind, content: &str) -> Value {
    match kind.dialect() {
        Dialect::OpenAiChat => json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 1000, "completion_tokens": 200}
        }),
        Dialect::AnthropicMessages => json!({
            "content": [{"type": "text", "text": content}],
            "usage": {"input_tokens": 1000, "output_tokens": 200}
        }),
        Dialect::GeminiGenerate => json!({
            "candidates": [{"content": {"parts": [{"text": content}]}}],
            "usageMetadata": {"promptTokenCount": 1000, "candidatesTokenCount": 200}
        }),
    }
}

const TWO_EVENTS: &str = r#"[
    {"event_particulars": "Complaint filed in district court",
     "citation": "28 U.S.C. 1332", "date": "2024-01-15"},
    {"event_particulars": "Defendant served", "citation": "", "date": ""}
]"#;

#[tokio::test]
async fn test_unavailable_adapter_never_calls_transport() {
    for kind in ProviderKind::ALL {
        let transport = MockTransport::always_ok(success_body(kind, TWO_EVENTS));
        let mut cfg = config(kind);
        cfg.api_key = None;
        let adapter = adapter(cfg, &transport);

        assert!(!adapter.is_available());
        let records = adapter.extract_events("Some document text", &metadata()).await;

        assert_eq!(records.len(), 1, "{kind}");
        assert!(records[0].is_fallback());
        assert_eq!(
            records[0].fallback_reason(),
            Some(format!("{} not available", kind.display_name()).as_str())
        );
        assert_eq!(transport.call_count(), 0, "{kind}");
    }
}

#[tokio::test]
async fn test_empty_text_never_calls_transport() {
    for kind in ProviderKind::ALL {
        let transport = MockTransport::always_ok(success_body(kind, TWO_EVENTS));
        let adapter = adapter(config(kind), &transport);
        assert!(adapter.is_available());

        for text in ["", "   \n\t "] {
            let records = adapter.extract_events(text, &metadata()).await;
            assert_eq!(records.len(), 1);
            assert!(records[0].is_fallback());
            assert_eq!(records[0].fallback_reason(), Some(REASON_NO_TEXT));
        }
        assert_eq!(transport.call_count(), 0, "{kind}");
    }
}

#[tokio::test]
async fn test_transient_failure_exhausts_attempts() {
    for kind in ProviderKind::ALL {
        let transport = MockTransport::always_err(ProviderError::Server {
            status: 503,
            message: "overloaded".into(),
        });
        let cfg = config(kind);
        let expected_calls = 1 + cfg.max_retries as usize;
        let adapter = adapter(cfg, &transport);

        let records = adapter.extract_events("text", &metadata()).await;

        assert_eq!(transport.call_count(), expected_calls, "{kind}");
        assert_eq!(expected_calls, 4);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_fallback());
        assert!(records[0].fallback_reason().unwrap().contains("overloaded"));
        assert_eq!(records[0].citation, FALLBACK_CITATION);
        assert_eq!(records[0].document_reference, "complaint.pdf");
    }
}

#[tokio::test]
async fn test_rate_limited_twice_then_success() {
    for kind in ProviderKind::ALL {
        let rate_limited = ProviderError::from_status(429, "slow down", None);
        let transport = MockTransport::new()
            .then_err(rate_limited.clone())
            .then_err(rate_limited)
            .then_ok(success_body(kind, TWO_EVENTS));
        let adapter = adapter(config(kind), &transport);

        let records = adapter.extract_events("text", &metadata()).await;

        assert_eq!(transport.call_count(), 3, "{kind}");
        assert_eq!(records.len(), 2);
        assert!(!records[0].is_fallback());
        assert_eq!(records[0].number, 1);
        assert_eq!(records[1].number, 2);
        assert_eq!(records[1].citation, DEFAULT_NO_CITATION);
    }
}

#[tokio::test]
async fn test_permanent_failure_is_not_retried() {
    for error in [
        ProviderError::from_status(401, "invalid key", None),
        ProviderError::from_status(400, "bad request", None),
    ] {
        let transport = MockTransport::always_err(error);
        let adapter = adapter(config(ProviderKind::Anthropic), &transport);

        let records = adapter.extract_events("text", &metadata()).await;

        assert_eq!(transport.call_count(), 1);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_fallback());
    }
}

#[tokio::test]
async fn test_parse_failure_retried_once() {
    let kind = ProviderKind::OpenAi;
    let transport = MockTransport::always_ok(success_body(kind, "I could not find JSON."));
    let adapter = adapter(config(kind), &transport);

    let records = adapter.extract_events("text", &metadata()).await;

    assert_eq!(transport.call_count(), 2);
    assert_eq!(records.len(), 1);
    assert!(records[0].is_fallback());

    let transport = MockTransport::new()
        .then_ok(success_body(kind, "garbage"))
        .then_ok(success_body(kind, TWO_EVENTS));
    let adapter = self::adapter(config(kind), &transport);
    let records = adapter.extract_events("text", &metadata()).await;
    assert_eq!(transport.call_count(), 2);
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_zero_valid_events_becomes_fallback() {
    let kind = ProviderKind::Gemini;
    let transport = MockTransport::always_ok(success_body(
        kind,
        r#"{"events": [{"event_particulars": ""}, {"citation": "x"}]}"#,
    ));
    let adapter = adapter(config(kind), &transport);

    let records = adapter.extract_events("text", &metadata()).await;

    assert_eq!(transport.call_count(), 1);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fallback_reason(), Some(REASON_NO_EVENTS));
    assert_eq!(
        records[0].event_particulars,
        format!(
            "Failed to extract legal events from complaint.pdf using Gemini: {}",
            REASON_NO_EVENTS
        )
    );
}

#[tokio::test]
async fn test_single_event_scenario() {
    let kind = ProviderKind::DeepSeek;
    let transport = MockTransport::always_ok(success_body(
        kind,
        r#"[{"event_particulars":"X","citation":"","date":"2024-01-15"}]"#,
    ));
    let adapter = adapter(config(kind), &transport);

    let records = adapter.extract_events("text", &metadata()).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].number, 1);
    assert_eq!(records[0].citation, DEFAULT_NO_CITATION);
    assert_eq!(records[0].date, "2024-01-15");
    assert_eq!(records[0].document_reference, "complaint.pdf");
}

#[tokio::test]
async fn test_document_name_overrides_basename() {
    let kind = ProviderKind::OpenRouter;
    let transport = MockTransport::always_ok(success_body(kind, TWO_EVENTS));
    let adapter = adapter(config(kind), &transport);
    let mut meta = metadata();
    meta.document_name = Some("Client upload".into());

    let records = adapter.extract_events("text", &meta).await;
    assert!(records.iter().all(|r| r.document_reference == "Client upload"));
}

#[tokio::test]
async fn test_json_mode_follows_capabilities() {
    let mut cfg = config(ProviderKind::OpenAi);
    cfg.model = "gpt-3.5-turbo".into();
    let transport = MockTransport::always_ok(success_body(ProviderKind::OpenAi, TWO_EVENTS));
    let adapter = adapter(cfg, &transport);
    assert!(!adapter.json_mode());
    adapter.extract_events("text", &metadata()).await;
    let request = transport.last_request().unwrap();
    assert!(request.body.get("response_format").is_none());

    let transport = MockTransport::always_ok(success_body(
        ProviderKind::OpenAi,
        r#"{"events": [{"event_particulars": "A"}]}"#,
    ));
    let adapter = self::adapter(config(ProviderKind::OpenAi), &transport);
    assert!(adapter.json_mode());
    let records = adapter.extract_events("text", &metadata()).await;
    assert_eq!(records.len(), 1);
    let request = transport.last_request().unwrap();
    assert_eq!(request.body["response_format"]["type"], "json_object");
}

#[tokio::test]
async fn test_anthropic_fenced_output() {
    let kind = ProviderKind::Anthropic;
    let fenced = format!("```json\n{}\n```", TWO_EVENTS);
    let transport = MockTransport::always_ok(success_body(kind, &fenced));
    let adapter = adapter(config(kind), &transport);
    assert!(!adapter.json_mode());

    let records = adapter.extract_events("text", &metadata()).await;
    assert_eq!(records.len(), 2);
    let request = transport.last_request().unwrap();
    assert_eq!(request.header("x-api-key"), Some("test-key"));
}

#[tokio::test]
async fn test_opencode_zen_direct_events_body() {
    let transport = MockTransport::always_ok(json!({
        "events": [{
            "event_particulars": "Arbitration award issued",
            "citation": "9 U.S.C. 10",
            "date": "2023-11-02",
            "confidence": 0.87,
            "char_start": 120,
            "char_end": 310
        }]
    }));
    let adapter = adapter(config(ProviderKind::OpenCodeZen), &transport);

    let records = adapter.extract_events("text", &metadata()).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].attributes.get("confidence"), Some(&json!(0.87)));
    assert_eq!(records[0].attributes.get("char_span"), Some(&json!([120, 310])));
    assert_eq!(records[0].attributes.get("provider"), Some(&json!("OpenCode Zen")));
    assert_eq!(adapter.get_stats().total_tokens, 0);
}

#[tokio::test]
async fn test_cost_accounting() {
    let kind = ProviderKind::OpenAi;
    let transport = MockTransport::always_ok(success_body(kind, TWO_EVENTS));
    let adapter = adapter(config(kind), &transport);

    adapter.extract_events("text", &metadata()).await;
    adapter.extract_events("more text", &metadata()).await;

    let stats = adapter.get_stats();
    assert_eq!(stats.model, "gpt-4o-mini");
    assert_eq!(stats.prompt_tokens, 2000);
    assert_eq!(stats.completion_tokens, 400);
    assert_eq!(stats.total_tokens, 2400);
    let expected = (2000.0 * 0.15 + 400.0 * 0.60) / 1_000_000.0;
    assert!((stats.total_cost - expected).abs() < 1e-12);
}

#[tokio::test]
async fn test_unknown_model_uses_cheapest_known_price() {
    let kind = ProviderKind::OpenAi;
    let mut cfg = config(kind);
    cfg.model = "gpt-5-preview".into();
    let transport = MockTransport::always_ok(success_body(kind, TWO_EVENTS));
    let adapter = adapter(cfg, &transport);

    adapter.extract_events("text", &metadata()).await;

    let stats = adapter.get_stats();
    let expected = (1000.0 * 0.15 + 200.0 * 0.60) / 1_000_000.0;
    assert!((stats.total_cost - expected).abs() < 1e-12);
}

#[tokio::test]
async fn test_usage_counted_even_when_parse_fails() {
    let kind = ProviderKind::Anthropic;
    let transport = MockTransport::always_ok(success_body(kind, "not json"));
    let adapter = adapter(config(kind), &transport);

    adapter.extract_events("text", &metadata()).await;

    assert_eq!(adapter.get_stats().prompt_tokens, 2000);
}

#[test]
fn test_new_requires_api_key() {
    let err = ProviderAdapter::new(ProviderConfig::for_kind(ProviderKind::OpenAi))
        .err()
        .unwrap();
    assert_eq!(
        err,
        ConfigError::MissingSetting {
            provider: "OpenAI".into(),
            setting: "OPENAI_API_KEY".into(),
        }
    );
}

#[test]
fn test_new_rejects_invalid_config() {
    let mut cfg = config(ProviderKind::OpenAi);
    cfg.timeout_secs = 0;
    assert!(matches!(
        ProviderAdapter::new(cfg),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_new_with_key_is_available() {
    let adapter = ProviderAdapter::new(config(ProviderKind::Gemini)).unwrap();
    assert!(adapter.is_available());
    assert!(adapter.is_available());
    assert_eq!(adapter.name(), "Gemini");
    assert_eq!(adapter.model(), "gemini-2.0-flash");
}
