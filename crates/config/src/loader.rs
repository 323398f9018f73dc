use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::schema::ChatConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

/// Load config from the given path and fill in per-field defaults.
///
/// The parser is picked by extension: `.toml`, `.yaml`/`.yml`, and JSON for
/// anything else (including extension-less files).
pub fn load_config(path: &Path) -> Result<ChatConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw, path).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let config = config.with_defaults();
    debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

/// Load config, falling back to the built-in defaults when the file cannot be
/// read or parsed.
///
/// A broken config file never stops the client from starting.
pub fn load_or_default(path: &Path) -> ChatConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            ChatConfig::default()
        },
    }
}

fn parse_config(raw: &str, path: &Path) -> Result<ChatConfig, BoxError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        _ => Ok(serde_json::from_str(raw)?),
    }
}
