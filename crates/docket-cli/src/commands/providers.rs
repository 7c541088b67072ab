//! Providers command implementation.

use crate::error::Result;
use crate::output::{Formatter, ProviderRow};
use docket_llm::capabilities::supports_json_mode;
use docket_pipeline::{ExtractorRegistry, ProviderSettings};

/// Execute the providers command.
pub fn execute_providers(providers: &ProviderSettings, formatter: &Formatter) -> Result<()> {
    let rows = provider_rows(ExtractorRegistry::global(), providers)?;
    println!("{}", formatter.format_providers(&rows)?);
    Ok(())
}

/// One row per registered event extractor key.
pub fn provider_rows(
    registry: &ExtractorRegistry,
    providers: &ProviderSettings,
) -> Result<Vec<ProviderRow>> {
    registry
        .event_keys()
        .into_iter()
        .map(|key| -> Result<ProviderRow> {
            let kind = registry.provider_for(key)?;
            let config = providers.get(kind);
            Ok(ProviderRow {
                key: key.to_string(),
                provider: kind.display_name().to_string(),
                json_mode: supports_json_mode(kind, &config.model),
                configured: config.api_key().is_some(),
                model: config.model,
            })
        })
        .collect()
}
