//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docket_document::DocumentConfig;
use docket_llm::ProviderOverrides;
use docket_pipeline::{ExtractorRegistry, LegalEventsPipeline, ProviderSettings};
use docket_table::{export, summarize, ExportFormat};
use std::fs;
use std::path::Path;
use tracing::info;

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    mut providers: ProviderSettings,
    formatter: &Formatter,
) -> Result<()> {
    if let Some(missing) = args.files.iter().find(|f| !f.exists()) {
        return Err(CliError::InvalidInput(format!("File not found: {}", missing.display())));
    }

    let registry = ExtractorRegistry::global();

    let mut selection = config.selection.clone();
    if let Some(provider) = &args.provider {
        selection.event_extractor = provider.clone();
    }
    if let Some(model) = &args.model {
        let kind = registry.provider_for(&selection.event_extractor)?;
        providers.apply(
            kind,
            &ProviderOverrides {
                model: Some(model.clone()),
                ..ProviderOverrides::default()
            },
        );
    }

    let document = document_config(&args, &config.document)?;
    let mut options = config.pipeline_options();
    if args.no_timing {
        options.timing = false;
    }

    // Resolve the export format before spending tokens
    let export_format = match &args.output {
        Some(path) => Some(resolve_export_format(args.export_format.map(Into::into), path)?),
        None => None,
    };

    let pipeline =
        LegalEventsPipeline::from_registry(registry, &document, &providers, &selection, options)?;
    let (table, warning) = pipeline.process(&args.files).await;

    if let Some(warning) = warning {
        eprintln!("{}", formatter.warning(&warning));
    }

    match (&args.output, export_format) {
        (Some(path), Some(format)) => {
            let bytes = export(&table, format);
            fs::write(path, &bytes)?;
            info!("Wrote {} bytes to {}", bytes.len(), path.display());
            println!(
                "{}",
                formatter.success(&format!("Wrote {} event(s) to {}", table.len(), path.display()))
            );
        }
        _ => println!("{}", formatter.format_events(&table)?),
    }

    if formatter.format() == OutputFormat::Table {
        println!("{}", formatter.format_summary(&summarize(&table))?);
        let stats = pipeline.stats();
        if stats.total_tokens > 0 {
            println!(
                "{}",
                formatter.info(&format!(
                    "{} ({}): {} tokens, ${:.6}",
                    pipeline.provider_name(),
                    stats.model,
                    stats.total_tokens,
                    stats.total_cost
                ))
            );
        }
    }

    Ok(())
}

/// Apply OCR flags on top of the configured document settings.
fn document_config(args: &ExtractArgs, base: &DocumentConfig) -> Result<DocumentConfig> {
    let mut document = base.clone();
    if args.ocr {
        document.do_ocr = true;
    }
    if args.no_auto_ocr {
        document.auto_ocr_detection = false;
    }
    if let Some(engine) = args.engine {
        document.ocr_engine = engine.into();
    }
    document.validate().map_err(CliError::Config)?;
    Ok(document)
}

/// Explicit format wins; otherwise the output extension decides.
pub fn resolve_export_format(
    explicit: Option<ExportFormat>,
    output: &Path,
) -> Result<ExportFormat> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    let extension = output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| {
            CliError::InvalidInput(format!(
                "Cannot infer export format from {}; use --export-format",
                output.display()
            ))
        })?;
    extension
        .parse::<ExportFormat>()
        .map_err(|e| CliError::InvalidInput(e.to_string()))
}
