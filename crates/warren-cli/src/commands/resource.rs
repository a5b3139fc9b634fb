//! Commands on managed resources

use crate::output::print_json;
use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use warren_cloud::ResourceProvider;
use warren_provider::{DATA_SOURCE_TYPES, WarrenProvider};

pub fn types() -> anyhow::Result<()> {
    let provider = WarrenProvider::default();

    println!("{}", "Resources:".bold());
    for resource_type in provider.resource_types() {
        println!("  • {}", resource_type.cyan());
    }

    println!("{}", "Data sources:".bold());
    for data_type in DATA_SOURCE_TYPES {
        println!("  • {}", data_type.cyan());
    }
    Ok(())
}

pub async fn import(provider: &WarrenProvider, resource_type: &str, id: &str) -> anyhow::Result<()> {
    let state = provider
        .import(resource_type, id)
        .await
        .with_context(|| format!("failed to import {} {}", resource_type, id))?;

    print_json(&state.into_value())
}

pub async fn read(provider: &WarrenProvider, resource_type: &str, id: &str) -> anyhow::Result<()> {
    let state = provider
        .read(resource_type, json!({ "id": id }))
        .await
        .with_context(|| format!("failed to read {} {}", resource_type, id))?;

    match state {
        Some(state) => print_json(&state.into_value()),
        None => anyhow::bail!("{} {} no longer exists", resource_type, id),
    }
}

pub async fn delete(provider: &WarrenProvider, resource_type: &str, id: &str) -> anyhow::Result<()> {
    provider
        .delete(resource_type, json!({ "id": id }))
        .await
        .with_context(|| format!("failed to delete {} {}", resource_type, id))?;

    eprintln!("{} {} {}", "✓ Deleted".green(), resource_type, id.cyan());
    Ok(())
}
