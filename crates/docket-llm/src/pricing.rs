//! Per-model prices and running cost accounting

use crate::config::{ProviderKind, UnknownModelPricing};
use docket_domain::ExtractorStats;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::warn;

/// Price of one model in USD per million tokens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    /// Model id prefix this price applies to
    pub model: &'static str,
    /// Provider that serves the model natively
    pub vendor: ProviderKind,
    /// Input (prompt) price
    pub input: f64,
    /// Output (completion) price
    pub output: f64,
}

impl ModelPrice {
    const fn new(model: &'static str, vendor: ProviderKind, input: f64, output: f64) -> Self {
        Self {
            model,
            vendor,
            input,
            output,
        }
    }

    /// Cost of a call with the given usage
    pub fn cost(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        (prompt_tokens as f64 * self.input + completion_tokens as f64 * self.output) / 1_000_000.0
    }
}

/// Known prices
pub const PRICE_TABLE: &[ModelPrice] = &[
    ModelPrice::new("gpt-4o", ProviderKind::OpenAi, 2.50, 10.00),
    ModelPrice::new("gpt-4o-mini", ProviderKind::OpenAi, 0.15, 0.60),
    ModelPrice::new("gpt-4-turbo", ProviderKind::OpenAi, 10.00, 30.00),
    ModelPrice::new("gpt-3.5-turbo", ProviderKind::OpenAi, 0.50, 1.50),
    ModelPrice::new("claude-3-haiku", ProviderKind::Anthropic, 0.25, 1.25),
    ModelPrice::new("claude-3-5-haiku", ProviderKind::Anthropic, 0.80, 4.00),
    ModelPrice::new("claude-3-5-sonnet", ProviderKind::Anthropic, 3.00, 15.00),
    ModelPrice::new("deepseek-chat", ProviderKind::DeepSeek, 0.27, 1.10),
    ModelPrice::new("deepseek-reasoner", ProviderKind::DeepSeek, 0.55, 2.19),
    ModelPrice::new("gemini-2.0-flash", ProviderKind::Gemini, 0.10, 0.40),
    ModelPrice::new("gemini-1.5-flash", ProviderKind::Gemini, 0.075, 0.30),
    ModelPrice::new("gemini-1.5-pro", ProviderKind::Gemini, 1.25, 5.00),
];

/// Price of a known model.
///
/// Strips a `vendor/` prefix and picks the longest matching model prefix,
/// so `openai/gpt-4o-mini-2024-07-18` resolves to `gpt-4o-mini`.
pub fn lookup_price(model: &str) -> Option<ModelPrice> {
    let model = model.trim().to_ascii_lowercase();
    let bare = model.rsplit('/').next().unwrap_or(&model);
    PRICE_TABLE
        .iter()
        .filter(|p| bare.starts_with(p.model))
        .max_by_key(|p| p.model.len())
        .copied()
}

/// Cheapest known price served by `kind`, or the cheapest overall for gateways
pub fn cheapest_for(kind: ProviderKind) -> ModelPrice {
    let by_total = |a: &&ModelPrice, b: &&ModelPrice| {
        (a.input + a.output).total_cmp(&(b.input + b.output))
    };
    PRICE_TABLE
        .iter()
        .filter(|p| p.vendor == kind)
        .min_by(by_total)
        .or_else(|| PRICE_TABLE.iter().min_by(by_total))
        .copied()
        .unwrap_or(ModelPrice::new("unpriced", kind, 0.0, 0.0))
}

/// Resolve the price an adapter charges for its model
pub fn resolve_price(
    kind: ProviderKind,
    model: &str,
    policy: UnknownModelPricing,
) -> (ModelPrice, bool) {
    match lookup_price(model) {
        Some(price) => (price, true),
        None => {
            let price = match policy {
                UnknownModelPricing::CheapestKnown => cheapest_for(kind),
                UnknownModelPricing::Zero => ModelPrice::new("unpriced", kind, 0.0, 0.0),
                UnknownModelPricing::Fixed { input, output } => {
                    ModelPrice::new("fixed", kind, input, output)
                }
            };
            (price, false)
        }
    }
}

#[derive(Debug, Default)]
struct Totals {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_cost: f64,
}

/// Accumulates token usage and cost for one adapter
#[derive(Debug)]
pub struct CostTracker {
    model: String,
    price: ModelPrice,
    known: bool,
    warned: AtomicBool,
    totals: Mutex<Totals>,
}

impl CostTracker {
    /// Tracker for `model` served by `kind`
    pub fn new(kind: ProviderKind, model: impl Into<String>, policy: UnknownModelPricing) -> Self {
        let model = model.into();
        let (price, known) = resolve_price(kind, &model, policy);
        Self {
            model,
            price,
            known,
            warned: AtomicBool::new(false),
            totals: Mutex::new(Totals::default()),
        }
    }

    /// Price used for this tracker's model
    pub fn price(&self) -> ModelPrice {
        self.price
    }

    /// Record the usage of one call and return its cost
    pub fn record(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        if !self.known && !self.warned.swap(true, Ordering::Relaxed) {
            warn!(
                "No price known for model '{}'; charging {} input / {} output USD per 1M tokens",
                self.model, self.price.input, self.price.output
            );
        }
        let cost = self.price.cost(prompt_tokens, completion_tokens);
        let mut totals = self.totals.lock().unwrap_or_else(|e| e.into_inner());
        totals.prompt_tokens = totals.prompt_tokens.saturating_add(prompt_tokens);
        totals.completion_tokens = totals.completion_tokens.saturating_add(completion_tokens);
        totals.total_cost += cost;
        cost
    }

    /// Snapshot of accumulated usage
    pub fn stats(&self) -> ExtractorStats {
        let totals = self.totals.lock().unwrap_or_else(|e| e.into_inner());
        ExtractorStats {
            total_tokens: totals.prompt_tokens.saturating_add(totals.completion_tokens),
            prompt_tokens: totals.prompt_tokens,
            completion_tokens: totals.completion_tokens,
            total_cost: totals.total_cost,
            model: self.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_longest_prefix_wins() {
        assert_eq!(lookup_price("gpt-4o-mini").unwrap().model, "gpt-4o-mini");
        assert_eq!(lookup_price("gpt-4o-2024-08-06").unwrap().model, "gpt-4o");
        assert_eq!(
            lookup_price("claude-3-haiku-20240307").unwrap().model,
            "claude-3-haiku"
        );
        assert_eq!(
            lookup_price("anthropic/claude-3-5-sonnet").unwrap().model,
            "claude-3-5-sonnet"
        );
        assert!(lookup_price("llama-3-70b").is_none());
    }

    #[test]
    fn test_cheapest_per_provider() {
        assert_eq!(cheapest_for(ProviderKind::OpenAi).model, "gpt-4o-mini");
        assert_eq!(cheapest_for(ProviderKind::Anthropic).model, "claude-3-haiku");
        assert_eq!(cheapest_for(ProviderKind::Gemini).model, "gemini-1.5-flash");
        assert_eq!(cheapest_for(ProviderKind::OpenCodeZen).model, "gemini-1.5-flash");
    }

    #[test]
    fn test_unknown_model_policies() {
        let (price, known) =
            resolve_price(ProviderKind::OpenAi, "gpt-9", UnknownModelPricing::CheapestKnown);
        assert!(!known);
        assert_eq!(price.model, "gpt-4o-mini");

        let (price, _) = resolve_price(ProviderKind::OpenAi, "gpt-9", UnknownModelPricing::Zero);
        assert!(approx(price.cost(1_000_000, 1_000_000), 0.0));

        let (price, _) = resolve_price(
            ProviderKind::OpenAi,
            "gpt-9",
            UnknownModelPricing::Fixed {
                input: 1.0,
                output: 2.0,
            },
        );
        assert!(approx(price.cost(1_000_000, 1_000_000), 3.0));
    }

    #[test]
    fn test_tracker_accumulates() {
        let tracker = CostTracker::new(
            ProviderKind::OpenAi,
            "gpt-4o-mini",
            UnknownModelPricing::CheapestKnown,
        );
        let first = tracker.record(1_000, 500);
        assert!(approx(first, (1_000.0 * 0.15 + 500.0 * 0.60) / 1_000_000.0));
        tracker.record(2_000, 0);

        let stats = tracker.stats();
        assert_eq!(stats.prompt_tokens, 3_000);
        assert_eq!(stats.completion_tokens, 500);
        assert_eq!(stats.total_tokens, 3_500);
        assert_eq!(stats.model, "gpt-4o-mini");
        assert!(approx(stats.total_cost, (3_000.0 * 0.15 + 500.0 * 0.60) / 1_000_000.0));
    }

    #[test]
    fn test_token_totals_saturate() {
        let tracker =
            CostTracker::new(ProviderKind::Anthropic, "claude-3-haiku", UnknownModelPricing::Zero);
        tracker.record(u64::MAX - 10, u64::MAX / 2);
        tracker.record(100, u64::MAX);

        let stats = tracker.stats();
        assert_eq!(stats.prompt_tokens, u64::MAX);
        assert_eq!(stats.completion_tokens, u64::MAX);
        assert_eq!(stats.total_tokens, u64::MAX);
        assert!(stats.total_cost.is_finite());
    }
}
