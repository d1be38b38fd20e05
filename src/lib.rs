pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::data::ExportTarget;
use crate::core::config::AppConfig;
use crate::core::filter::{FilterState, SortState};
use anyhow::Result;
use tracing::{debug, info};

/// A page of the dashboard, with the parameters it was opened with.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Dashboard,
    Startups {
        filters: FilterState,
    },
    Data {
        filters: FilterState,
        sort: SortState,
        export: Option<ExportTarget>,
    },
    Investors {
        search: String,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Startup dashboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let source =
        providers::StartupApiProvider::new(&config.api.base_url, config.api.timeout())?;

    match command {
        AppCommand::Dashboard => {
            cli::dashboard::run(&source, &config, chrono::Local::now()).await
        }
        AppCommand::Startups { filters } => cli::startups::run(&source, &config, &filters).await,
        AppCommand::Data {
            filters,
            sort,
            export,
        } => cli::data::run(&source, &config, &filters, &sort, export.as_ref()).await,
        AppCommand::Investors { search } => cli::investors::run(&source, &config, &search).await,
    }
}
