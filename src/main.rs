use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use driftscan::aws::{self, AwsS3Client, AwsSqsClient, AwsSupplierDeps};
use driftscan::config::Config;
use driftscan::provider::HttpResourceReader;
use driftscan::resource::{get_resource_def, ResourceType};
use driftscan::EnumerationContext;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Enumerate live AWS resources for drift detection
#[derive(Parser, Debug)]
#[command(name = "driftscan", version, about, long_about = None)]
struct Args {
    /// AWS region to enumerate
    #[arg(short, long)]
    region: Option<String>,

    /// AWS shared config profile
    #[arg(long)]
    profile: Option<String>,

    /// Provider gateway base URL
    #[arg(long)]
    provider_endpoint: Option<String>,

    /// Concurrent reads per resource type
    #[arg(short = 'j', long)]
    parallelism: Option<usize>,

    /// Only enumerate this resource type (repeatable)
    #[arg(short = 't', long = "resource-type")]
    resource_types: Vec<String>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,

    /// List supported resource types and exit
    #[arg(long)]
    list_types: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
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

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, err);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG refines the level per module when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("driftscan started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("driftscan").join("driftscan.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".driftscan").join("driftscan.log");
    }
    PathBuf::from("driftscan.log")
}

impl Args {
    /// Command line values as a config overlay
    fn overrides(&self) -> Config {
        Config {
            region: self.region.clone(),
            profile: self.profile.clone(),
            provider_endpoint: self.provider_endpoint.clone(),
            parallelism: self.parallelism,
            request_timeout_secs: None,
            resource_types: if self.resource_types.is_empty() {
                None
            } else {
                Some(self.resource_types.clone())
            },
        }
    }
}

fn print_resource_types(types: &[&ResourceType]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    for resource_type in types {
        let display_name = get_resource_def(resource_type)
            .map(|def| def.display_name.as_str())
            .unwrap_or("-");
        let parent = get_resource_def(resource_type)
            .and_then(|def| def.parent.as_deref())
            .map(|p| format!(" (via {})", p))
            .unwrap_or_default();
        writeln!(stdout, "{:<40} {}{}", resource_type, display_name, parent)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let factory = aws::supplier_factory();
    if args.list_types {
        return print_resource_types(&factory.resource_types());
    }

    // CLI > config file > defaults
    let file_config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let config = file_config.merge(args.overrides());

    let ctx = EnumerationContext::new();
    {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling enumeration");
                ctx.cancel();
            }
        });
    }

    let sdk_config = aws::load_sdk_config(config.region.as_deref(), config.profile.as_deref()).await;
    tracing::info!(
        "Enumerating region {}",
        sdk_config
            .region()
            .map(|r| r.as_ref())
            .unwrap_or("<default>")
    );

    let reader = HttpResourceReader::new(
        &config.effective_provider_endpoint(),
        config.request_timeout(),
    )?;

    let deps = AwsSupplierDeps {
        s3: Arc::new(AwsS3Client::new(&sdk_config)),
        sqs: Arc::new(AwsSqsClient::new(&sdk_config)),
        reader: Arc::new(reader),
        ctx,
        parallelism: config.effective_parallelism(),
    };

    let filter = config.resource_type_filter();
    let registry = factory.build_registry(filter.as_deref(), &deps)?;
    let inventory = registry.drain().await;

    let report = inventory.report();
    let rendered = match args.output {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report).context("Failed to render inventory")?
        }
        OutputFormat::Yaml => serde_yaml::to_string(&report).context("Failed to render inventory")?,
    };
    println!("{}", rendered);

    for failure in &report.failures {
        eprintln!("Error: {}", failure.message);
    }
    if !inventory.is_complete() {
        return Err(anyhow::anyhow!(
            "{} resource type(s) could not be enumerated",
            report.failures.len()
        ));
    }

    Ok(())
}
