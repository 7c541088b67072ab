//! Benchmark command implementation.

use crate::cli::BenchmarkArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docket_pipeline::{BenchmarkConfig, BenchmarkRunner, ExtractorRegistry, ProviderSettings};
use std::fs;
use std::sync::Arc;

/// Execute the benchmark command.
pub async fn execute_benchmark(
    args: BenchmarkArgs,
    config: &Config,
    providers: ProviderSettings,
    formatter: &Formatter,
) -> Result<()> {
    let registry = Arc::new(ExtractorRegistry::with_defaults());
    let benchmark = benchmark_config(&args, config, &providers)?;

    for provider in &benchmark.providers {
        registry.provider_for(provider)?;
    }

    let documents = registry.build_document(&config.selection.doc_extractor, &config.document)?;
    let runner = BenchmarkRunner::new(registry, documents, providers, benchmark)
        .map_err(CliError::InvalidInput)?;
    let report = runner.run().await;

    if let Some(path) = &args.report {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        eprintln!("{}", formatter.success(&format!("Report written to {}", path.display())));
    }

    println!("{}", formatter.format_report(&report)?);
    Ok(())
}

/// Providers default to every configured one; workers to the config file.
pub fn benchmark_config(
    args: &BenchmarkArgs,
    config: &Config,
    providers: &ProviderSettings,
) -> Result<BenchmarkConfig> {
    let selected: Vec<String> = if args.providers.is_empty() {
        providers.configured().into_iter().map(|kind| kind.key().to_string()).collect()
    } else {
        args.providers
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    };
    if selected.is_empty() {
        return Err(CliError::InvalidInput(
            "No providers configured; set an API key or pass --providers".to_string(),
        ));
    }

    Ok(BenchmarkConfig {
        max_workers: args.workers.unwrap_or(config.benchmark.max_workers),
        providers: selected,
        documents: args.documents.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_llm::{ProviderKind, ProviderOverrides};
    use std::path::PathBuf;

    fn args(providers: &[&str], workers: Option<usize>) -> BenchmarkArgs {
        BenchmarkArgs {
            documents: vec![PathBuf::from("a.pdf"), PathBuf::from("b.txt")],
            providers: providers.iter().map(|p| p.to_string()).collect(),
            workers,
            report: None,
        }
    }

    fn with_key(kind: ProviderKind) -> ProviderSettings {
        let mut providers = ProviderSettings::new();
        providers.apply(
            kind,
            &ProviderOverrides {
                api_key: Some("key".into()),
                ..ProviderOverrides::default()
            },
        );
        providers
    }

    #[test]
    fn test_defaults_to_configured_providers() {
        let config = Config::default();
        let benchmark =
            benchmark_config(&args(&[], None), &config, &with_key(ProviderKind::DeepSeek)).unwrap();
        assert_eq!(benchmark.providers, vec!["deepseek"]);
        assert_eq!(benchmark.max_workers, config.benchmark.max_workers);
        assert_eq!(benchmark.task_count(), 2);
    }

    #[test]
    fn test_explicit_providers_and_workers() {
        let benchmark = benchmark_config(
            &args(&["openai", " anthropic "], Some(1)),
            &Config::default(),
            &ProviderSettings::new(),
        )
        .unwrap();
        assert_eq!(benchmark.providers, vec!["openai", "anthropic"]);
        assert_eq!(benchmark.max_workers, 1);
    }

    #[test]
    fn test_nothing_to_run() {
        let err = benchmark_config(&args(&[], None), &Config::default(), &ProviderSettings::new())
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }
}
