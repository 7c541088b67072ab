//! End-to-end checks of configuration layering and command setup that need
//! no network access.

use docket_cli::cli::{BenchmarkArgs, Cli, Command};
use docket_cli::commands::{execute_benchmark, execute_extract, providers::provider_rows};
use docket_cli::config::OutputFormat;
use docket_cli::{CliError, Config, Formatter};
use docket_llm::ProviderKind;
use docket_pipeline::{ExtractorRegistry, PipelineError};
use clap::Parser;
use std::collections::HashMap;
use std::fs;

fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + Copy + 'a {
    move |name: &str| vars.iter().find(|(k, _)| *k == name).map(|(_, v)| v.to_string())
}

fn extract_args(argv: Vec<String>) -> docket_cli::cli::ExtractArgs {
    let mut full = vec!["docket".to_string(), "extract".to_string()];
    full.extend(argv);
    match Cli::parse_from(full).command {
        Command::Extract(args) => args,
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_file_then_environment_layering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[selection]
event_extractor = "deepseek"

[providers.deepseek]
api_key = "file-key"
model = "deepseek-reasoner"

[providers.gemini]
model = "gemini-1.5-pro"
"#,
    )
    .unwrap();

    let vars = [("GEMINI_API_KEY", "env-gemini"), ("DEEPSEEK_MODEL", "deepseek-chat")];
    let mut config = Config::load(Some(&path)).unwrap();
    config.apply_env(lookup(&vars));
    let providers = config.provider_settings(lookup(&vars)).unwrap();

    assert_eq!(config.selection.event_extractor, "deepseek");
    let deepseek = providers.get(ProviderKind::DeepSeek);
    assert_eq!(deepseek.api_key(), Some("file-key"));
    assert_eq!(deepseek.model, "deepseek-chat");

    let rows = provider_rows(&ExtractorRegistry::with_defaults(), &providers).unwrap();
    let configured: HashMap<&str, bool> = rows
        .iter()
        .map(|r| (r.key.as_str(), r.configured))
        .collect();
    assert!(configured["deepseek"]);
    assert!(configured["gemini"]);
    assert!(!configured["openai"]);
    let gemini = rows.iter().find(|r| r.key == "gemini").unwrap();
    assert_eq!(gemini.model, "gemini-1.5-pro");
}

#[tokio::test]
async fn test_extract_rejects_missing_files() {
    let config = Config::default();
    let providers = config.provider_settings(lookup(&[])).unwrap();
    let formatter = Formatter::new(OutputFormat::Quiet, false);

    let args = extract_args(vec!["/definitely/not/here.pdf".to_string()]);
    let err = execute_extract(args, &config, providers, &formatter).await.unwrap_err();
    assert!(matches!(err, CliError::InvalidInput(_)));
}

#[tokio::test]
async fn test_extract_without_credentials_fails_before_processing() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, "On 2024-01-15 the complaint was filed.").unwrap();
    let output = dir.path().join("events.csv");

    let config = Config::default();
    let providers = config.provider_settings(lookup(&[])).unwrap();
    let formatter = Formatter::new(OutputFormat::Quiet, false);

    let args = extract_args(vec![
        file.display().to_string(),
        "--provider".to_string(),
        "anthropic".to_string(),
        "--output".to_string(),
        output.display().to_string(),
    ]);
    let err = execute_extract(args, &config, providers, &formatter).await.unwrap_err();
    assert!(matches!(err, CliError::Pipeline(PipelineError::Provider(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_benchmark_rejects_unknown_provider() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, "text").unwrap();

    let config = Config::default();
    let providers = config.provider_settings(lookup(&[])).unwrap();
    let formatter = Formatter::new(OutputFormat::Quiet, false);

    let args = BenchmarkArgs {
        documents: vec![file],
        providers: vec!["cohere".to_string()],
        workers: None,
        report: None,
    };
    let err = execute_benchmark(args, &config, providers, &formatter).await.unwrap_err();
    match err {
        CliError::Pipeline(PipelineError::UnknownExtractor { key, .. }) => {
            assert_eq!(key, "cohere")
        }
        other => panic!("unexpected error: {}", other),
    }
}
