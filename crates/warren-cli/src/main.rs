mod commands;
mod output;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use warren_provider::{ProviderConfig, WarrenProvider};

#[derive(Parser)]
#[command(name = "warren")]
#[command(about = "Inspect and manage resources on the Warren platform", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// API URL, optionally ending in a location slug (https://host/v1/tll)
    #[arg(long, env = "WARREN_API_URL", global = true)]
    api_url: Option<String>,

    /// API token
    #[arg(long, env = "WARREN_API_TOKEN", hide_env_values = true, global = true)]
    api_token: Option<String>,

    /// Location slug
    #[arg(short, long, env = "WARREN_API_LOCATION", global = true)]
    location: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

impl ConnectionArgs {
    fn into_config(self) -> ProviderConfig {
        ProviderConfig {
            api_token: self.api_token,
            api_url: self.api_url,
            location: self.location,
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the API token against the configured endpoint
    Auth,
    /// List the resource and data source type names
    Types,
    /// Import an existing resource and print its state
    Import {
        /// Resource type (warren_disk, warren_floating_ip, warren_network, warren_virtual_machine)
        resource_type: String,
        /// Resource id (UUID, or the numeric id of a floating IP)
        id: String,
    },
    /// Refresh a resource; exits with an error when it no longer exists
    Read {
        resource_type: String,
        id: String,
    },
    /// Delete a resource; deleting a missing resource succeeds
    Delete {
        resource_type: String,
        id: String,
    },
    /// Look up reference data with a JSON query, e.g. '{"name": "backend"}'
    Data {
        /// Data source type (warren_location, warren_network, warren_os_base_image)
        data_type: String,
        #[arg(default_value = "{}")]
        query: String,
    },
    /// List the platform's locations
    Locations,
    /// List the OS base images offered for new machines
    Images,
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Commands that need no connection
    match cli.command {
        Commands::Version => {
            println!("warren {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Types => return commands::resource::types(),
        _ => {}
    }

    let provider = WarrenProvider::default();
    provider
        .configure(cli.connection.into_config())
        .context("failed to configure the Warren provider")?;

    let result = run(&provider, cli.command).await;
    provider.shutdown();
    result
}

async fn run(provider: &WarrenProvider, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Auth => commands::auth::handle(provider).await,
        Commands::Import { resource_type, id } => {
            commands::resource::import(provider, &resource_type, &id).await
        }
        Commands::Read { resource_type, id } => {
            commands::resource::read(provider, &resource_type, &id).await
        }
        Commands::Delete { resource_type, id } => {
            commands::resource::delete(provider, &resource_type, &id).await
        }
        Commands::Data { data_type, query } => {
            commands::data::handle(provider, &data_type, &query).await
        }
        Commands::Locations => commands::catalog::locations(provider).await,
        Commands::Images => commands::catalog::images(provider).await,
        Commands::Types | Commands::Version => Ok(()),
    }
}
