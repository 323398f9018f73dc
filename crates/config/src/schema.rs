//! Config schema for the chat client, keyed the way existing config files
//! spell them (`chat-server-fqdn`, ...).

use serde::{Deserialize, Serialize};

pub const DEFAULT_CHAT_SERVER_FQDN: &str = "chat.server.net";
pub const DEFAULT_CHAT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_WEB_SERVER_PORT: u16 = 99;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Host name of the remote chat backend.
    #[serde(rename = "chat-server-fqdn")]
    pub chat_server_fqdn: String,

    /// TCP port of the remote chat backend.
    #[serde(rename = "chat-server-port")]
    pub chat_server_port: u16,

    /// Port the local web UI listens on.
    #[serde(rename = "web-server-port-number")]
    pub web_server_port: u16,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            chat_server_fqdn: DEFAULT_CHAT_SERVER_FQDN.into(),
            chat_server_port: DEFAULT_CHAT_SERVER_PORT,
            web_server_port: DEFAULT_WEB_SERVER_PORT,
        }
    }
}

impl ChatConfig {
    /// Replace zero ports and a blank host with their defaults.
    ///
    /// Files may spell a field out as `0` or `""`; those count as unset.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        if self.chat_server_fqdn.trim().is_empty() {
            self.chat_server_fqdn = DEFAULT_CHAT_SERVER_FQDN.into();
        }
        if self.chat_server_port == 0 {
            self.chat_server_port = DEFAULT_CHAT_SERVER_PORT;
        }
        if self.web_server_port == 0 {
            self.web_server_port = DEFAULT_WEB_SERVER_PORT;
        }
        self
    }

    /// Base URL of the remote backend, without a trailing slash.
    pub fn chat_server_url(&self) -> String {
        format!("http://{}:{}", self.chat_server_fqdn, self.chat_server_port)
    }
}
