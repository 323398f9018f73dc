//! reqwest-backed [`RemoteChatGateway`].

use std::time::Duration;

use {
    async_trait::async_trait,
    reqwest::{Client, StatusCode},
    serde::{Serialize, de::DeserializeOwned},
    tracing::{debug, info, warn},
};

use {
    httpchat_common::{ActiveUser, ChatMessage, HeartbeatSignal, LocalIdentity},
    httpchat_config::ChatConfig,
};

use crate::{RemoteChatGateway, endpoints, error::RemoteError};

/// Upper bound on a single remote call, connect through body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to the chat backend over plain HTTP + JSON.
///
/// The client keeps no idle connections: each call opens its own connection
/// and releases it before returning, so calls never share transport state.
#[derive(Debug, Clone)]
pub struct HttpChatGateway {
    client: Client,
    base_url: String,
}

impl HttpChatGateway {
    pub fn new(config: &ChatConfig) -> Result<Self, RemoteError> {
        Self::with_timeout(config, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(config: &ChatConfig, timeout: Duration) -> Result<Self, RemoteError> {
        Self::from_base_url(config.chat_server_url(), timeout)
    }

    /// Point at an explicit base URL such as `http://127.0.0.1:8080`.
    pub fn from_base_url(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Client)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn try_post_message(&self, message: &ChatMessage) -> Result<(), RemoteError> {
        self.post_json(endpoints::MESSAGES, message).await
    }

    pub async fn try_fetch_messages(&self) -> Result<Vec<ChatMessage>, RemoteError> {
        self.get_json(endpoints::MESSAGES).await
    }

    pub async fn try_fetch_active_users(&self) -> Result<Vec<ActiveUser>, RemoteError> {
        self.get_json(endpoints::USERS).await
    }

    pub async fn try_send_heartbeat(&self, signal: &HeartbeatSignal) -> Result<(), RemoteError> {
        self.post_json(endpoints::PING, signal).await
    }

    /// POST `body` as JSON; only `201 Created` counts as success.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), RemoteError> {
        let url = self.url(path);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                endpoint: url.clone(),
                source,
            })?;
        expect_status(&url, resp.status(), StatusCode::CREATED)
    }

    /// GET `path` and decode the JSON body; only `200 OK` counts as success.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let url = self.url(path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                endpoint: url.clone(),
                source,
            })?;
        expect_status(&url, resp.status(), StatusCode::OK)?;
        let bytes = resp.bytes().await.map_err(|source| RemoteError::Transport {
            endpoint: url.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| RemoteError::Decode {
            endpoint: url,
            source,
        })
    }
}

fn expect_status(url: &str, status: StatusCode, expected: StatusCode) -> Result<(), RemoteError> {
    if status == expected {
        Ok(())
    } else {
        Err(RemoteError::UnexpectedStatus {
            endpoint: url.to_string(),
            status,
            expected,
        })
    }
}

#[async_trait]
impl RemoteChatGateway for HttpChatGateway {
    async fn post_message(&self, identity: &LocalIdentity, body: &str) -> bool {
        let message = ChatMessage::new(identity, body);
        info!(username = %identity, "sending message");
        match self.try_post_message(&message).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to post message");
                false
            },
        }
    }

    async fn fetch_messages(&self) -> Vec<ChatMessage> {
        debug!("fetching messages");
        self.try_fetch_messages().await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to get messages");
            Vec::new()
        })
    }

    async fn fetch_active_users(&self) -> Vec<ActiveUser> {
        debug!("fetching active users");
        self.try_fetch_active_users().await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to get active users");
            Vec::new()
        })
    }

    async fn send_heartbeat(&self, identity: &LocalIdentity) -> bool {
        let signal = HeartbeatSignal::now(identity);
        match self.try_send_heartbeat(&signal).await {
            Ok(()) => {
                debug!(username = %identity, time_sent = %signal.time_sent, "sent ping");
                true
            },
            Err(e) => {
                warn!(error = %e, "failed to send ping");
                false
            },
        }
    }
}
