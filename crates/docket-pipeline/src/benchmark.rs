//! Provider × document benchmark on a bounded worker pool

use crate::pipeline::{LegalEventsPipeline, PipelineOptions, StageTiming};
use crate::registry::ExtractorRegistry;
use crate::settings::ProviderSettings;
use docket_domain::{DocumentExtractor, ExtractorStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Default pool width; small to respect provider rate limits
pub const DEFAULT_MAX_WORKERS: usize = 3;

/// What to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Concurrent tasks
    pub max_workers: usize,
    /// Event extractor keys
    pub providers: Vec<String>,
    /// Files to process with every provider
    pub documents: Vec<PathBuf>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            providers: Vec::new(),
            documents: Vec::new(),
        }
    }
}

impl BenchmarkConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".to_string());
        }
        if self.providers.is_empty() {
            return Err("at least one provider is required".to_string());
        }
        if self.documents.is_empty() {
            return Err("at least one document is required".to_string());
        }
        Ok(())
    }

    /// Number of (provider, document) tasks
    pub fn task_count(&self) -> usize {
        self.providers.len() * self.documents.len()
    }
}

/// Outcome of one (provider, document) task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Event extractor key
    pub provider: String,
    /// File name
    pub document: String,
    /// At least one real (non-fallback) event was extracted
    pub success: bool,
    /// Construction error or fallback reason
    pub error: Option<String>,
    /// Records returned, fallbacks included
    pub event_count: usize,
    /// Stage timings
    pub timing: StageTiming,
    /// Provider usage for this task
    pub stats: ExtractorStats,
}

/// Everything the pool produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// One entry per finished task, ordered by provider then document
    pub results: Vec<BenchmarkResult>,
    /// Tasks that panicked or were cancelled
    pub failed_tasks: usize,
    /// Wall-clock duration of the whole run
    pub wall_seconds: f64,
}

impl BenchmarkReport {
    /// Successful tasks
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// Summed cost across tasks
    pub fn total_cost(&self) -> f64 {
        self.results.iter().map(|r| r.stats.total_cost).sum()
    }

    /// Results grouped by provider
    pub fn by_provider(&self) -> BTreeMap<&str, Vec<&BenchmarkResult>> {
        let mut groups: BTreeMap<&str, Vec<&BenchmarkResult>> = BTreeMap::new();
        for result in &self.results {
            groups.entry(result.provider.as_str()).or_default().push(result);
        }
        groups
    }

    /// Human readable summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Benchmark Summary".to_string(),
            "=================".to_string(),
            format!(
                "Tasks: {} ({} succeeded, {} failed to run)",
                self.results.len() + self.failed_tasks,
                self.success_count(),
                self.failed_tasks
            ),
            format!("Wall time: {:.2}s", self.wall_seconds),
            format!("Total cost: ${:.6}", self.total_cost()),
        ];
        for (provider, results) in self.by_provider() {
            let ok = results.iter().filter(|r| r.success).count();
            let events: usize = results.iter().map(|r| r.event_count).sum();
            let seconds: f64 = results.iter().map(|r| r.timing.extractor_seconds).sum();
            lines.push(format!(
                "  {}: {}/{} ok, {} events, {:.2}s extracting",
                provider,
                ok,
                results.len(),
                events,
                seconds
            ));
        }
        lines.join("\n")
    }
}

/// Runs every (provider, document) pair with at most `max_workers` in flight.
///
/// Each task builds its own event extractor, so retry state and cost
/// tracking are never shared. Results are gathered only through the
/// pool's join loop.
pub struct BenchmarkRunner {
    registry: Arc<ExtractorRegistry>,
    documents: Arc<dyn DocumentExtractor>,
    providers: Arc<ProviderSettings>,
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    /// Create a runner
    pub fn new(
        registry: Arc<ExtractorRegistry>,
        documents: Arc<dyn DocumentExtractor>,
        providers: ProviderSettings,
        config: BenchmarkConfig,
    ) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            registry,
            documents,
            providers: Arc::new(providers),
            config,
        })
    }

    /// Run all tasks to completion
    pub async fn run(&self) -> BenchmarkReport {
        let started = Instant::now();
        let permits = Arc::new(Semaphore::new(self.config.max_workers));
        let mut tasks = JoinSet::new();

        info!(
            "Benchmark: {} providers x {} documents, {} workers",
            self.config.providers.len(),
            self.config.documents.len(),
            self.config.max_workers
        );

        for provider in &self.config.providers {
            for document in &self.config.documents {
                let permits = Arc::clone(&permits);
                let registry = Arc::clone(&self.registry);
                let documents = Arc::clone(&self.documents);
                let providers = Arc::clone(&self.providers);
                let provider = provider.clone();
                let document = document.clone();

                tasks.spawn(async move {
                    let _permit = permits.acquire_owned().await.ok();
                    run_task(&registry, documents, &providers, provider, document).await
                });
            }
        }

        let mut report = BenchmarkReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    debug!(
                        "Finished {} on {}: success={}, events={}",
                        result.provider, result.document, result.success, result.event_count
                    );
                    report.results.push(result);
                }
                Err(e) => {
                    error!("Benchmark task failed: {}", e);
                    report.failed_tasks += 1;
                }
            }
        }

        report.results.sort_by(|a, b| {
            (a.provider.as_str(), a.document.as_str())
                .cmp(&(b.provider.as_str(), b.document.as_str()))
        });
        report.wall_seconds = started.elapsed().as_secs_f64();
        info!(
            "Benchmark finished: {}/{} tasks succeeded in {:.2}s",
            report.success_count(),
            self.config.task_count(),
            report.wall_seconds
        );
        report
    }
}

async fn run_task(
    registry: &ExtractorRegistry,
    documents: Arc<dyn DocumentExtractor>,
    providers: &ProviderSettings,
    provider: String,
    document: PathBuf,
) -> BenchmarkResult {
    let name = document
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| document.display().to_string());

    let events = match registry.build_event(&provider, providers) {
        Ok(events) => events,
        Err(e) => {
            return BenchmarkResult {
                provider,
                document: name,
                success: false,
                error: Some(e.to_string()),
                event_count: 0,
                timing: StageTiming::default(),
                stats: ExtractorStats::default(),
            }
        }
    };

    let pipeline = LegalEventsPipeline::new(
        documents,
        Arc::clone(&events),
        PipelineOptions { timing: true },
    );
    let outcome = pipeline.process_file(&document).await;

    let error = outcome
        .records
        .iter()
        .find(|r| r.is_fallback())
        .map(|r| r.fallback_reason().unwrap_or(&r.event_particulars).to_string());
    let success = outcome.records.iter().any(|r| !r.is_fallback());

    BenchmarkResult {
        provider,
        document: name,
        success,
        error: if success { None } else { error },
        event_count: outcome.records.len(),
        timing: outcome.timing.unwrap_or_default(),
        stats: events.get_stats(),
    }
}
