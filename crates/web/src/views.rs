//! HTML views. Backend text is escaped by askama before it reaches the page.

use {
    askama::Template,
    httpchat_common::{ActiveUser, ChatMessage},
    tracing::error,
};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage<'a> {
    pub identity: &'a str,
    pub messages_path: &'a str,
    pub users_path: &'a str,
    pub send_path: &'a str,
    pub field: &'a str,
}

/// A titled, self-refreshing list of lines separated by `<br/>`.
#[derive(Template)]
#[template(path = "list.html")]
pub struct ListPage<'a> {
    pub title: &'a str,
    pub heading: &'a str,
    pub refresh_secs: u32,
    pub entries: Vec<String>,
}

/// `(index)[username] message`, 0-based, in backend order.
pub fn message_lines(messages: &[ChatMessage]) -> Vec<String> {
    messages
        .iter()
        .enumerate()
        .map(|(idx, msg)| format!("({idx})[{}] {}", msg.username, msg.message))
        .collect()
}

/// `(index) username`, 0-based, in backend order.
pub fn user_lines(users: &[ActiveUser]) -> Vec<String> {
    users
        .iter()
        .enumerate()
        .map(|(idx, user)| format!("({idx}) {}", user.username))
        .collect()
}

/// Render a page, logging and returning an empty body if the template fails.
pub fn render(page: &impl Template) -> String {
    page.render().unwrap_or_else(|e| {
        error!(error = %e, "failed to render page");
        String::new()
    })
}
