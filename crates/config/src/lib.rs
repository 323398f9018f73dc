//! Configuration for the httpchat client.
//!
//! A single file names the remote chat backend and the local listen port. It
//! is read once at startup and never mutated afterwards.

pub mod loader;
pub mod schema;

pub use {
    loader::{ConfigError, load_config, load_or_default},
    schema::{
        ChatConfig, DEFAULT_CHAT_SERVER_FQDN, DEFAULT_CHAT_SERVER_PORT, DEFAULT_WEB_SERVER_PORT,
    },
};
