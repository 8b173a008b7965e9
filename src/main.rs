use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use infra_map::config::AppConfig;
use infra_map::fullscreen::StaticHost;
use infra_map::render::dashboard_view;
use infra_map::types::{Category, RecordId};
use infra_map::view::ViewMode;
use infra_map::{Dashboard, DashboardState, Dataset};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard API
    Serve {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Print the dashboard view for a filter/selection as JSON
    Summary {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Category to toggle on; repeatable
        #[arg(short, long, value_name = "CATEGORY")]
        filter: Vec<Category>,
        /// Record to select after filtering
        #[arg(short, long, value_name = "ID")]
        select: Option<u32>,
    },
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            info!("Loading config from {:?}", path);
            AppConfig::load_from_file(path)
        }
        None => Ok(AppConfig::default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let dataset = Arc::new(Dataset::builtin().context("loading built-in dataset")?);

    match cli.command {
        Commands::Serve { config } => {
            let app_config = load_config(config.as_deref())?;
            infra_map::server::start_server(app_config, dataset).await?;
        }
        Commands::Summary { config, filter, select } => {
            let app_config = load_config(config.as_deref())?;
            let host = Arc::new(StaticHost::new(app_config.fullscreen.supported));
            let initial = DashboardState::new(ViewMode::new(app_config.view.chart, app_config.view.tile_layer));
            let dashboard = Dashboard::spawn(dataset.clone(), initial, host);

            for category in filter {
                dashboard.set_filter(category).await?;
            }
            if let Some(id) = select {
                dashboard.select(RecordId(id)).await?;
            }

            let snapshot = dashboard.snapshot().await?;
            let view = dashboard_view(&app_config, dataset.bounds(), &snapshot);
            println!("{}", serde_json::to_string_pretty(&view)?);
            dashboard.shutdown().await;
        }
    }

    Ok(())
}
