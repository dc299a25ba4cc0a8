//! zone-reporter: serve the configured zone as JSON.
//!
//! This is the application entry point. It parses the command line, loads and
//! validates configuration, initializes tracing, builds the router and runs the
//! HTTP server until a shutdown signal arrives.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use zone_reporter::config::{
    config_path, AppConfig, ConfigOverrides, LogFormat, DEFAULT_LOG_FILTER,
};
use zone_reporter::http::start_server;
use zone_reporter::{create_router, AppState};

/// zone-reporter: report the configured deployment zone over HTTP
#[derive(Parser, Debug)]
#[command(name = "zone-reporter", version, about)]
struct Args {
    /// Path to configuration file (defaults to config/default.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Zone to report (overrides ZONE and the config file)
    #[arg(short, long)]
    zone: Option<String>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides SERVER_PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level filter (e.g., "zone_reporter=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            zone: self.zone.clone(),
            host: self.host.clone(),
            port: self.port,
            log_format: self.log_format,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Configuration is loaded before tracing so the configured format applies,
    // but any error is only reported once tracing is up.
    let loaded = AppConfig::load(args.config.as_deref(), &args.overrides());

    let log_filter = args
        .log_level
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    let log_format = match &loaded {
        Ok(config) => config.logging.format,
        Err(_) => args.log_format.unwrap_or_default(),
    };
    init_tracing(&log_filter, log_format);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            match config_path(args.config.as_deref()) {
                Some(path) => tracing::error!(
                    error = %e,
                    config = %path.display(),
                    "Invalid configuration, refusing to start"
                ),
                None => tracing::error!(
                    error = %e,
                    "Invalid configuration, refusing to start"
                ),
            }
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        zone = %config.zone,
        host = %config.http.host,
        port = config.http.port,
        "Loaded configuration"
    );

    let app = create_router(AppState::new(config.zone.clone()));

    match start_server(app, &config.http).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing with the given filter and output format. Logs go to stderr.
fn init_tracing(filter: &str, format: LogFormat) {
    let fmt_layer = match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(fmt_layer)
        .init();
}
