use anyhow::{Context, Result};
use aws_resolvers::aws::AwsClient;
use aws_resolvers::config::Config;
use aws_resolvers::resolver::Resolver;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Resolve an AWS key (supported prefixes: ecs, ess, kinesis, dynamodb, rds, ec2)
#[derive(Parser, Debug)]
#[command(name = "aws-resolvers", version, long_about = None)]
struct Args {
    /// The key to resolve, e.g. aws:kinesis:my-stream:StreamARN
    #[arg(short, long)]
    key: String,

    /// AWS region to use
    #[arg(short, long)]
    region: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
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
    /// Filter directive for this crate, `None` when logging is off
    fn to_filter_directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("aws_resolvers=error"),
            LogLevel::Warn => Some("aws_resolvers=warn"),
            LogLevel::Info => Some("aws_resolvers=info"),
            LogLevel::Debug => Some("aws_resolvers=debug"),
            LogLevel::Trace => Some("aws_resolvers=trace"),
        }
    }
}

// stdout carries the resolved value, so logs always go to a file
fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let directive = level.to_filter_directive()?;
    // RUST_LOG, when set, refines the filter (e.g. to include aws_config)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

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
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("aws-resolvers started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("aws-resolvers").join("aws-resolvers.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".aws-resolvers").join("aws-resolvers.log");
    }
    PathBuf::from("aws-resolvers.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let config = Config::load();
    let region = config.effective_region(args.region.as_deref());
    tracing::info!("Resolving {} (region: {:?}, strict: {})", args.key, region, config.strict);

    let client = AwsClient::load(region.as_deref(), config.endpoint_url.as_deref()).await?;
    let resolver = Resolver::new(client);

    let value = resolver
        .resolve(&args.key, region.as_deref(), config.strict)
        .await
        .with_context(|| format!("Failed to resolve {}", args.key))?;

    println!("{}", serde_json::to_string(&value)?);

    Ok(())
}
