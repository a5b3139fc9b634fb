use colored::Colorize;
use warren_cloud::ResourceProvider;
use warren_provider::WarrenProvider;

pub async fn handle(provider: &WarrenProvider) -> anyhow::Result<()> {
    let status = provider.check_auth().await?;

    if !status.authenticated {
        anyhow::bail!(
            "authentication failed: {}",
            status.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    eprintln!(
        "{} {}",
        "✓ Authenticated:".green(),
        status.account_info.unwrap_or_default()
    );
    Ok(())
}
