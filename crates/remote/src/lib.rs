//! Remote chat backend access.
//!
//! Every remote interaction is fire-and-forget from the caller's point of
//! view: failures are logged and turned into an empty result or `false`, so
//! the local UI keeps working while the backend is down.

pub mod error;
pub mod http;

use {
    async_trait::async_trait,
    httpchat_common::{ActiveUser, ChatMessage, LocalIdentity},
};

pub use {error::RemoteError, http::HttpChatGateway};

/// Paths on the remote backend.
pub mod endpoints {
    pub const MESSAGES: &str = "/messages";
    pub const USERS: &str = "/users";
    pub const PING: &str = "/ping";
}

/// The capability the rest of the client needs from the chat backend.
///
/// Implementations hold no per-call state; calls are independent and may run
/// concurrently from the web handlers and the heartbeat task.
#[async_trait]
pub trait RemoteChatGateway: Send + Sync {
    /// Post a message as `identity`. Returns whether the backend accepted it.
    async fn post_message(&self, identity: &LocalIdentity, body: &str) -> bool;

    /// Full message list in backend order, or empty on any failure.
    async fn fetch_messages(&self) -> Vec<ChatMessage>;

    /// Users the backend considers active, or empty on any failure.
    async fn fetch_active_users(&self) -> Vec<ActiveUser>;

    /// Announce that `identity` is still online.
    async fn send_heartbeat(&self, identity: &LocalIdentity) -> bool;
}
