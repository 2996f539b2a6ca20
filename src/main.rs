use anyhow::Context;
use clap::{Parser, Subcommand};
use kino_releases::app::releases_use_case::ReleaseSettings;
use kino_releases::app::{CatalogPort, ReleasesUseCase};
use kino_releases::config::Config;
use kino_releases::infra::TmdbClient;
use kino_releases::observability::{self, metrics};
use kino_releases::server::{self, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "kino_releases")]
#[command(about = "Movie release aggregation over the TMDB catalog")]
#[command(version)]
struct Cli {
    /// Path to an optional TOML config file
    #[arg(long, global = true, default_value = kino_releases::constants::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides PORT and the config file)
        #[arg(long)]
        port: Option<u16>,
        /// Install the Prometheus recorder and expose /metrics
        #[arg(long)]
        metrics: bool,
    },
    /// Aggregate releases once and print them as JSON
    Releases {
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start_date: Option<String>,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end_date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_logging();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config).context("loading configuration")?;
    let catalog: Arc<dyn CatalogPort> =
        Arc::new(TmdbClient::from_config(&config.tmdb).context("building TMDB client")?);

    match cli.command {
        Commands::Serve { port, metrics: with_metrics } => {
            let mut state = AppState::new(catalog, &config);
            if with_metrics {
                match metrics::init() {
                    Ok(handle) => state = state.with_metrics(handle),
                    Err(e) => error!("Metrics disabled: {}", e),
                }
            }
            let port = port.unwrap_or(config.server.port);
            server::start_server(state, port)
                .await
                .map_err(|e| anyhow::anyhow!("server error: {e}"))?;
        }
        Commands::Releases { start_date, end_date } => {
            let use_case = ReleasesUseCase::new(catalog, ReleaseSettings::from_config(&config));
            let response = use_case
                .releases_between(start_date.as_deref(), end_date.as_deref())
                .await?;
            info!("Aggregated {} releases", response.total_results);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}
