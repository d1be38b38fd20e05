use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use startdash::cli::data::ExportTarget;
use startdash::core::filter::{FilterState, RangePreset, SortDirection, SortField, SortState};
use startdash::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive search over name, sector, country and investor
    #[arg(short, long, default_value = "")]
    search: String,

    /// Exact sector
    #[arg(long)]
    sector: Option<String>,

    /// Exact country
    #[arg(long)]
    country: Option<String>,
}

impl FilterArgs {
    fn into_state(self) -> FilterState {
        FilterState {
            search_term: self.search,
            sector: self.sector,
            country: self.country,
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display KPIs, recent startups and investment by year
    Dashboard,
    /// Browse startups with filters
    Startups {
        #[command(flatten)]
        filters: FilterArgs,

        /// Lead (first-listed) investor
        #[arg(long)]
        investor: Option<String>,

        /// Investment range: 0-5m, 5-15m, 15-25m or 25m+
        #[arg(long)]
        range: Option<String>,
    },
    /// Display the sortable data table, optionally exporting it as CSV
    Data {
        #[command(flatten)]
        filters: FilterArgs,

        /// Exact stage
        #[arg(long)]
        stage: Option<String>,

        /// Sort field: name, sector, country, city, founded, investment, investor, stage, website, status
        #[arg(long, default_value = "name")]
        sort: String,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Export the filtered and sorted view as CSV (defaults to the configured file name)
        #[arg(long, num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },
    /// Display investor totals and ranking
    Investors {
        /// Case-insensitive search over investor names
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

impl TryFrom<Commands> for startdash::AppCommand {
    type Error = anyhow::Error;

    fn try_from(cmd: Commands) -> Result<startdash::AppCommand> {
        Ok(match cmd {
            Commands::Dashboard => startdash::AppCommand::Dashboard,
            Commands::Startups {
                filters,
                investor,
                range,
            } => {
                let investment_range = range
                    .map(|r| r.parse::<RangePreset>())
                    .transpose()?
                    .map(|preset| preset.range());
                startdash::AppCommand::Startups {
                    filters: FilterState {
                        investor,
                        investment_range,
                        ..filters.into_state()
                    },
                }
            }
            Commands::Data {
                filters,
                stage,
                sort,
                desc,
                export,
            } => startdash::AppCommand::Data {
                filters: FilterState {
                    stage,
                    ..filters.into_state()
                },
                sort: SortState {
                    field: sort.parse::<SortField>()?,
                    direction: if desc {
                        SortDirection::Descending
                    } else {
                        SortDirection::Ascending
                    },
                },
                export: export.map(|path| path.map_or(ExportTarget::Configured, ExportTarget::Path)),
            },
            Commands::Investors { search } => startdash::AppCommand::Investors { search },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => startdash::cli::setup::setup(),
        Some(cmd) => match startdash::AppCommand::try_from(cmd) {
            Ok(command) => startdash::run_command(command, cli.config_path.as_deref()).await,
            Err(e) => Err(e),
        },
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
