use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use elasticstack_provider::config::Config;
use elasticstack_provider::kibana::client::KibanaClient;
use elasticstack_provider::kibana::http::format_api_error;
use elasticstack_provider::resource::{self, ResourceData, SavedObjectResource};
use elasticstack_provider::{slo, ProviderError};
use std::io::Read;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Manage Kibana saved objects declaratively
#[derive(Parser, Debug)]
#[command(name = "elasticstack-provider", version, about, long_about = None)]
struct Args {
    /// Kibana endpoint (overrides KIBANA_ENDPOINT and the config file)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Kibana space (overrides KIBANA_SPACE_ID and the config file)
    #[arg(short, long, global = true)]
    space: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or overwrite a saved object and print the resulting state
    Apply {
        /// Saved object kind, e.g. dashboard
        kind: String,
        /// File holding the attributes JSON ("-" for stdin)
        #[arg(short, long)]
        attributes: PathBuf,
        /// Use this id instead of letting Kibana assign one
        #[arg(long)]
        id: Option<String>,
    },
    /// Read a saved object by its "<space>/<id>" token
    Read { kind: String, token: String },
    /// Delete a saved object (not supported by Kibana for these kinds)
    Delete { kind: String, token: String },
    /// Print the error budget of an SLO
    ErrorBudget { slo_id: String },
    /// List the saved object kinds this provider manages
    Kinds,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("elasticstack-provider started with log level: {:?}", level);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("elasticstack-provider").join("provider.log");
    }
    PathBuf::from("elasticstack-provider.log")
}

fn read_attributes(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read attributes from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Log a provider error and turn it into a user-facing message
fn api_error(err: ProviderError) -> anyhow::Error {
    tracing::error!("{}", err);
    anyhow::anyhow!(format_api_error(&err))
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();
    if args.endpoint.is_some() {
        config.endpoint = args.endpoint.clone();
    }
    if args.space.is_some() {
        config.space_id = args.space.clone();
    }

    if let Command::Kinds = args.command {
        for kind in resource::get_registry().values() {
            println!(
                "{:<16} {:<20} {}",
                kind.object_type, kind.display_name, kind.description
            );
        }
        return Ok(());
    }

    let client = KibanaClient::new(&config.connection()).map_err(api_error)?;

    match args.command {
        Command::Apply {
            kind,
            attributes,
            id,
        } => {
            let handler = SavedObjectResource::for_type(client, &kind).map_err(api_error)?;
            let raw = read_attributes(&attributes)?;
            let mut data = ResourceData::desired(
                id.as_deref().unwrap_or_default(),
                &config.effective_space(),
                &raw,
            );
            handler.create(&mut data).await.map_err(api_error)?;
            print_state(&data)?;
        }
        Command::Read { kind, token } => {
            let handler = SavedObjectResource::for_type(client, &kind).map_err(api_error)?;
            let mut data = ResourceData::from_token(&token);
            handler.read(&mut data).await.map_err(api_error)?;
            print_state(&data)?;
        }
        Command::Delete { kind, token } => {
            let handler = SavedObjectResource::for_type(client, &kind).map_err(api_error)?;
            let mut data = ResourceData::from_token(&token);
            handler.delete(&mut data).await.map_err(api_error)?;
        }
        Command::ErrorBudget { slo_id } => {
            let budget = slo::get_error_budget(&client, &config.effective_space(), &slo_id)
                .await
                .map_err(api_error)?;
            print_json(&budget).context("Failed to print error budget")?;
        }
        Command::Kinds => {}
    }

    Ok(())
}

fn print_state(data: &ResourceData) -> Result<()> {
    if data.is_absent() {
        println!("absent");
        return Ok(());
    }
    print_json(data).context("Failed to print state")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    run(args).await
}
