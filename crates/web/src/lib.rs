//! Local web UI: an index page with two self-refreshing frames (messages and
//! users) and a form that forwards a message to the chat backend.
//!
//! Handlers never surface an error status to the browser. Backend failures
//! show up as empty lists, and bad form submissions redirect to the index.

pub mod server;
pub mod views;

pub use server::{PresentationServer, routes, serve};
