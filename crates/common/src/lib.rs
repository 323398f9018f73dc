//! Shared data model for the httpchat client.
//!
//! Everything here mirrors the remote chat backend's JSON wire format. Values
//! are immutable once built; the backend owns their lifecycle.

pub mod identity;
pub mod types;

pub use {
    identity::{IdentityError, LocalIdentity},
    types::{ActiveUser, ChatMessage, HeartbeatSignal},
};
