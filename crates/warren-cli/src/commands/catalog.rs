//! Listings of platform reference data

use crate::output::print_json;
use colored::Colorize;
use warren_provider::WarrenProvider;
use warren_provider::mapper::{base_image_to_model, location_to_model};

pub async fn locations(provider: &WarrenProvider) -> anyhow::Result<()> {
    let client = provider.client()?;
    let locations = client.locations().list().await?;

    eprintln!("{}", format!("{} locations", locations.len()).bold());
    let models: Vec<_> = locations.iter().map(location_to_model).collect();
    print_json(&models)
}

pub async fn images(provider: &WarrenProvider) -> anyhow::Result<()> {
    let client = provider.client()?;
    let images = client.virtual_machines().base_images().await?;

    eprintln!("{}", format!("{} OS base images", images.len()).bold());
    let models: Vec<_> = images
        .iter()
        .map(|image| base_image_to_model(image, None))
        .collect();
    print_json(&models)
}
