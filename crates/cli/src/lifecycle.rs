//! Startup ordering for the client process.
//!
//! 1. Resolve the required inputs (identity, config path); missing ones are fatal
//! 2. Load config, degrading to defaults on a bad file
//! 3. Build the backend gateway and the local router
//! 4. Start the heartbeat, then bind and serve until shutdown

use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use {
    anyhow::Context,
    tokio::net::TcpListener,
    tracing::{error, info},
};

use {
    httpchat_common::LocalIdentity,
    httpchat_heartbeat::HeartbeatScheduler,
    httpchat_remote::{HttpChatGateway, RemoteChatGateway},
    httpchat_web::PresentationServer,
};

pub const ENV_USERNAME: &str = "HTTPCHAT_USERNAME";
pub const ENV_CONFIG_FILENAME: &str = "CONFIG_FILENAME";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StartupError {
    #[error("environment variable {0} is required")]
    MissingInput(&'static str),
}

/// Inputs the process refuses to start without.
#[derive(Debug)]
pub struct RequiredInputs {
    pub identity: LocalIdentity,
    pub config_path: PathBuf,
}

impl RequiredInputs {
    /// Empty values count as missing.
    pub fn resolve(
        username: Option<String>,
        config_path: Option<PathBuf>,
    ) -> Result<Self, StartupError> {
        let identity = username
            .and_then(|name| LocalIdentity::new(name).ok())
            .ok_or(StartupError::MissingInput(ENV_USERNAME))?;
        let config_path = config_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(StartupError::MissingInput(ENV_CONFIG_FILENAME))?;
        Ok(Self {
            identity,
            config_path,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub bind: String,
    pub heartbeat_period: Duration,
    pub remote_timeout: Duration,
}

/// Run the client until `shutdown` resolves or the listener fails.
pub async fn run(
    inputs: RequiredInputs,
    options: RuntimeOptions,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let RequiredInputs {
        identity,
        config_path,
    } = inputs;

    let config = httpchat_config::load_or_default(&config_path);

    let gateway = HttpChatGateway::with_timeout(&config, options.remote_timeout)
        .context("failed to build chat server client")?;
    let backend_url = gateway.base_url().to_string();
    let gateway: Arc<dyn RemoteChatGateway> = Arc::new(gateway);

    let router =
        Arc::new(PresentationServer::new(Arc::clone(&gateway), identity.clone())).router();

    let mut heartbeat = HeartbeatScheduler::new(gateway, identity.clone())
        .with_period(options.heartbeat_period);
    heartbeat.start()?;

    let listener = match TcpListener::bind((options.bind.as_str(), config.web_server_port)).await
    {
        Ok(listener) => listener,
        Err(e) => {
            heartbeat.stop().await;
            return Err(e).with_context(|| {
                format!(
                    "failed to listen on {}:{}",
                    options.bind, config.web_server_port
                )
            });
        },
    };
    let addr = listener
        .local_addr()
        .context("failed to read listen address")?;

    // Startup banner.
    let lines = [
        format!("httpchat v{}", env!("CARGO_PKG_VERSION")),
        format!("user {identity}, listening on http://{addr}"),
        format!("chat server {backend_url}"),
        format!("ping every {} ms", heartbeat.period().as_millis()),
    ];
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));

    let served = httpchat_web::serve(listener, router, shutdown).await;
    heartbeat.stop().await;

    if let Err(e) = &served {
        error!(error = %e, "local web server failed");
    }
    served.context("local web server failed")
}
