use crate::output::print_json;
use anyhow::Context;
use warren_provider::WarrenProvider;

pub async fn handle(provider: &WarrenProvider, data_type: &str, query: &str) -> anyhow::Result<()> {
    let query: serde_json::Value =
        serde_json::from_str(query).with_context(|| format!("query is not valid JSON: {}", query))?;

    tracing::debug!("Looking up {} with {}", data_type, query);

    let result = provider
        .read_data_source(data_type, query)
        .await
        .with_context(|| format!("{} lookup failed", data_type))?;

    print_json(&result)
}
