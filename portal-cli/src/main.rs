mod commands;
mod display;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use portal::{load_config, FileStore, PortalConfig, RecordStore};

use commands::{CliError, ListArgs};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Record collections the portal serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Collection {
    Leads,
    Projects,
    Sites,
    Srecs,
    Invoices,
    Tasks,
}

/// Partner portal record store.
#[derive(Parser)]
#[command(name = "portal", version, about = "Partner portal record store")]
struct Cli {
    /// Path to a portal config JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory, overriding the config
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List records, filtered and paginated
    List {
        #[arg(value_enum)]
        collection: Collection,
        #[command(flatten)]
        args: ListArgs,
    },

    /// Show one record
    Get {
        #[arg(value_enum)]
        collection: Collection,
        id: String,
    },

    /// Create a record from a JSON draft
    Create {
        #[arg(value_enum)]
        collection: Collection,
        /// Draft attributes as a JSON object
        draft: String,
    },

    /// Merge a JSON object patch into a record
    Update {
        #[arg(value_enum)]
        collection: Collection,
        id: String,
        /// Fields to change as a JSON object
        patch: String,
    },

    /// Move a record to the next stage of its workflow
    Advance {
        #[arg(value_enum)]
        collection: Collection,
        id: String,
    },

    /// Print a collection's stage workflow
    Stages {
        #[arg(value_enum)]
        collection: Collection,
    },

    /// Count records per stage
    Summary {
        #[arg(value_enum)]
        collection: Collection,
    },

    /// Load records from a JSON array file unless the collection already exists
    Seed {
        #[arg(value_enum)]
        collection: Collection,
        /// Path to a JSON array of records
        file: PathBuf,
    },
}

fn init_logging(json: bool) -> Result<(), CliError> {
    tracing_log::LogTracer::init().map_err(|e| CliError::Logging(e.to_string()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        tracing::subscriber::set_global_default(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        )
    } else {
        tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
    };
    result.map_err(|e| CliError::Logging(e.to_string()))
}

fn resolve_config(cli: &Cli) -> Result<PortalConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path).map_err(portal::PortalError::from)?,
        None => PortalConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_directory = Some(dir.clone());
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(&cli)?;
    let data_dir = config
        .data_directory()
        .ok_or(CliError::NoDataDirectory)?;
    log::debug!("Using data directory {}", data_dir.display());

    let backend = FileStore::new(&data_dir).with_quota(config.storage_quota_bytes);
    let store = RecordStore::from_config(backend, &config);
    let output = cli.output;

    match cli.command {
        Commands::List { collection, args } => {
            commands::list(&store, &config, collection, &args, output).await
        }
        Commands::Get { collection, id } => commands::get(&store, collection, &id, output).await,
        Commands::Create { collection, draft } => {
            commands::create(&store, collection, &draft, output).await
        }
        Commands::Update {
            collection,
            id,
            patch,
        } => commands::update(&store, collection, &id, &patch, output).await,
        Commands::Advance { collection, id } => {
            commands::advance(&store, collection, &id, output).await
        }
        Commands::Stages { collection } => commands::stages(collection, output),
        Commands::Summary { collection } => commands::summary(&store, collection, output).await,
        Commands::Seed { collection, file } => {
            commands::seed(&store, collection, &file, output).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_json) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if e.is_retryable() {
                eprintln!("hint: storage could not be read or written; try again");
            }
            ExitCode::FAILURE
        }
    }
}
