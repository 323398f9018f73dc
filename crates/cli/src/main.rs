mod lifecycle;

use std::{path::PathBuf, time::Duration};

use {
    clap::Parser,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use lifecycle::{ENV_CONFIG_FILENAME, ENV_USERNAME, RequiredInputs, RuntimeOptions};

#[derive(Parser)]
#[command(
    name = "httpchat",
    version,
    about = "httpchat — browser front end for an HTTP chat server"
)]
struct Cli {
    /// Name to chat and ping as.
    #[arg(long, env = ENV_USERNAME)]
    username: Option<String>,

    /// Config file (JSON, or TOML/YAML by extension).
    #[arg(long, env = ENV_CONFIG_FILENAME, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address the local web UI binds to.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Milliseconds between heartbeat pings.
    #[arg(long, default_value_t = 3000)]
    heartbeat_interval_ms: u64,

    /// Timeout for each call to the chat server.
    #[arg(long, default_value_t = 10)]
    remote_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "httpchat starting");

    let inputs = RequiredInputs::resolve(cli.username.clone(), cli.config.clone())?;
    let options = RuntimeOptions {
        bind: cli.bind.clone(),
        heartbeat_period: Duration::from_millis(cli.heartbeat_interval_ms),
        remote_timeout: Duration::from_secs(cli.remote_timeout_secs),
    };

    lifecycle::run(inputs, options, shutdown_signal()).await
}
