use std::{future::Future, sync::Arc};

use {
    axum::{
        Form, Router,
        extract::{State, rejection::FormRejection},
        response::{Html, IntoResponse, Json, Redirect},
        routing::get,
    },
    serde::Deserialize,
    tokio::net::TcpListener,
    tower_http::trace::TraceLayer,
    tracing::warn,
};

use {
    httpchat_common::LocalIdentity,
    httpchat_remote::RemoteChatGateway,
};

use crate::views::{IndexPage, ListPage, message_lines, render, user_lines};

// ── Routes ───────────────────────────────────────────────────────────────────

pub mod routes {
    pub const INDEX: &str = "/";
    pub const MESSAGES: &str = "/get-messages";
    pub const USERS: &str = "/get-users";
    pub const SEND_MESSAGE: &str = "/send-message";
    pub const HEALTH: &str = "/health";
}

/// Form field carrying the outgoing message text.
pub const FORM_KEY_MESSAGE: &str = "message";

pub const MESSAGES_REFRESH_SECS: u32 = 1;
pub const USERS_REFRESH_SECS: u32 = 5;

#[derive(Debug, Deserialize)]
struct SendMessageForm {
    #[serde(default)]
    message: String,
}

// ── Presentation server ──────────────────────────────────────────────────────

/// Renders the local views on top of a [`RemoteChatGateway`].
///
/// Holds no mutable state; every view re-fetches from the backend.
pub struct PresentationServer {
    gateway: Arc<dyn RemoteChatGateway>,
    identity: LocalIdentity,
}

impl PresentationServer {
    pub fn new(gateway: Arc<dyn RemoteChatGateway>, identity: LocalIdentity) -> Self {
        Self { gateway, identity }
    }

    pub fn identity(&self) -> &LocalIdentity {
        &self.identity
    }

    /// Static page embedding both views and the send form. No remote calls.
    pub fn index_page(&self) -> String {
        render(&IndexPage {
            identity: self.identity.as_str(),
            messages_path: routes::MESSAGES,
            users_path: routes::USERS,
            send_path: routes::SEND_MESSAGE,
            field: FORM_KEY_MESSAGE,
        })
    }

    pub async fn messages_page(&self) -> String {
        let messages = self.gateway.fetch_messages().await;
        render(&ListPage {
            title: "messages",
            heading: "Chat Messages:",
            refresh_secs: MESSAGES_REFRESH_SECS,
            entries: message_lines(&messages),
        })
    }

    pub async fn users_page(&self) -> String {
        let users = self.gateway.fetch_active_users().await;
        render(&ListPage {
            title: "users",
            heading: "Users:",
            refresh_secs: USERS_REFRESH_SECS,
            entries: user_lines(&users),
        })
    }

    /// Forward `text` as the local user. The outcome is only logged.
    pub async fn send_message(&self, text: &str) -> bool {
        self.gateway.post_message(&self.identity, text).await
    }

    /// Build the router serving all local routes.
    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route(routes::INDEX, get(index_handler))
            .route(routes::MESSAGES, get(messages_handler))
            .route(routes::USERS, get(users_handler))
            .route(
                routes::SEND_MESSAGE,
                get(send_message_handler).post(send_message_handler),
            )
            .route(routes::HEALTH, get(health_handler))
            .fallback(index_handler)
            .layer(TraceLayer::new_for_http())
            .with_state(self)
    }
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// Only returns an error when the listener itself fails.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn index_handler(State(server): State<Arc<PresentationServer>>) -> Html<String> {
    Html(server.index_page())
}

async fn messages_handler(State(server): State<Arc<PresentationServer>>) -> Html<String> {
    Html(server.messages_page().await)
}

async fn users_handler(State(server): State<Arc<PresentationServer>>) -> Html<String> {
    Html(server.users_page().await)
}

/// Accepts the form on POST (and on GET via the query string, for plain
/// `<form>` tags without a method). Always redirects back to the index.
async fn send_message_handler(
    State(server): State<Arc<PresentationServer>>,
    form: Result<Form<SendMessageForm>, FormRejection>,
) -> Redirect {
    match form {
        Ok(Form(form)) => {
            server.send_message(&form.message).await;
        },
        Err(e) => {
            warn!(error = %e, "failed to parse send-message form");
        },
    }
    Redirect::to(routes::INDEX)
}

async fn health_handler(State(server): State<Arc<PresentationServer>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "identity": server.identity.as_str(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use {
        async_trait::async_trait,
        axum::{
            body::{Body, to_bytes},
            http::{Request, StatusCode, header},
        },
        chrono::Utc,
        httpchat_common::{ActiveUser, ChatMessage},
        tower::ServiceExt,
    };

    use super::*;

    #[derive(Default)]
    struct FakeGateway {
        messages: Vec<ChatMessage>,
        users: Vec<ActiveUser>,
        reject_posts: bool,
        posts: Mutex<Vec<(String, String)>>,
    }

    impl FakeGateway {
        fn with_messages(pairs: &[(&str, &str)]) -> Self {
            Self {
                messages: pairs
                    .iter()
                    .map(|(username, message)| ChatMessage {
                        username: (*username).into(),
                        message: (*message).into(),
                        time_sent: Utc::now(),
                    })
                    .collect(),
                ..Self::default()
            }
        }

        fn with_users(names: &[&str]) -> Self {
            Self {
                users: names
                    .iter()
                    .map(|name| ActiveUser {
                        username: (*name).into(),
                        last_ping: Utc::now(),
                    })
                    .collect(),
                ..Self::default()
            }
        }

        fn posts(&self) -> Vec<(String, String)> {
            self.posts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteChatGateway for FakeGateway {
        async fn post_message(&self, identity: &LocalIdentity, body: &str) -> bool {
            self.posts
                .lock()
                .unwrap()
                .push((identity.to_string(), body.to_string()));
            !self.reject_posts
        }

        async fn fetch_messages(&self) -> Vec<ChatMessage> {
            self.messages.clone()
        }

        async fn fetch_active_users(&self) -> Vec<ActiveUser> {
            self.users.clone()
        }

        async fn send_heartbeat(&self, _identity: &LocalIdentity) -> bool {
            true
        }
    }

    fn app(gateway: &Arc<FakeGateway>) -> Router {
        let gateway: Arc<dyn RemoteChatGateway> = Arc::clone(gateway) as _;
        let server = PresentationServer::new(gateway, LocalIdentity::new("alice").unwrap());
        Arc::new(server).router()
    }

    async fn get_page(app: Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn form_post(body: &'static str) -> Request<Body> {
        Request::post(routes::SEND_MESSAGE)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn assert_redirects_home(resp: &axum::response::Response) {
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn index_embeds_frames_and_form() {
        let gw = Arc::new(FakeGateway::default());
        let (status, html) = get_page(app(&gw), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"src="/get-messages""#));
        assert!(html.contains(r#"src="/get-users""#));
        assert!(html.contains(r#"<form method="post" action="/send-message">"#));
        assert!(html.contains(r#"name="message""#));
    }

    #[tokio::test]
    async fn unknown_path_serves_index() {
        let gw = Arc::new(FakeGateway::default());
        let (status, html) = get_page(app(&gw), "/whatever").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"action="/send-message""#));
    }

    #[tokio::test]
    async fn messages_view_lists_every_entry_in_order() {
        let gw = Arc::new(FakeGateway::with_messages(&[
            ("bob", "first"),
            ("alice", "second"),
            ("bob", "first"),
        ]));
        let (status, html) = get_page(app(&gw), "/get-messages").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"<meta http-equiv="refresh" content="1">"#));
        assert!(html.contains("(0)[bob] first<br/>(1)[alice] second<br/>(2)[bob] first"));
        assert!(!html.contains("(3)"));
    }

    #[tokio::test]
    async fn messages_view_empty_backend() {
        let gw = Arc::new(FakeGateway::default());
        let (status, html) = get_page(app(&gw), "/get-messages").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Chat Messages:"));
        assert!(!html.contains("(0)"));
    }

    #[tokio::test]
    async fn users_view_lists_identities() {
        let gw = Arc::new(FakeGateway::with_users(&["alice", "bob"]));
        let (status, html) = get_page(app(&gw), "/get-users").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"<meta http-equiv="refresh" content="5">"#));
        assert!(html.contains("(0) alice<br/>(1) bob"));
    }

    #[tokio::test]
    async fn send_message_posts_once_and_redirects() {
        let gw = Arc::new(FakeGateway::default());
        let resp = app(&gw).oneshot(form_post("message=hello")).await.unwrap();
        assert_redirects_home(&resp);
        assert_eq!(gw.posts(), [("alice".to_string(), "hello".to_string())]);
    }

    #[tokio::test]
    async fn send_message_decodes_form_encoding() {
        let gw = Arc::new(FakeGateway::default());
        let resp = app(&gw)
            .oneshot(form_post("message=hi+there%21"))
            .await
            .unwrap();
        assert_redirects_home(&resp);
        assert_eq!(gw.posts()[0].1, "hi there!");
    }

    #[tokio::test]
    async fn send_message_without_field_posts_empty_text() {
        let gw = Arc::new(FakeGateway::default());
        let resp = app(&gw).oneshot(form_post("other=x")).await.unwrap();
        assert_redirects_home(&resp);
        assert_eq!(gw.posts(), [("alice".to_string(), String::new())]);
    }

    #[tokio::test]
    async fn rejected_post_still_redirects() {
        let gw = Arc::new(FakeGateway {
            reject_posts: true,
            ..FakeGateway::default()
        });
        let resp = app(&gw).oneshot(form_post("message=hello")).await.unwrap();
        assert_redirects_home(&resp);
        assert_eq!(gw.posts().len(), 1);
    }

    #[tokio::test]
    async fn malformed_form_redirects_without_posting() {
        let gw = Arc::new(FakeGateway::default());
        let req = Request::post(routes::SEND_MESSAGE)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"message": "hello"}"#))
            .unwrap();
        let resp = app(&gw).oneshot(req).await.unwrap();
        assert_redirects_home(&resp);
        assert!(gw.posts().is_empty());
    }

    #[tokio::test]
    async fn send_message_accepts_query_string() {
        let gw = Arc::new(FakeGateway::default());
        let req = Request::get("/send-message?message=yo")
            .body(Body::empty())
            .unwrap();
        let resp = app(&gw).oneshot(req).await.unwrap();
        assert_redirects_home(&resp);
        assert_eq!(gw.posts(), [("alice".to_string(), "yo".to_string())]);
    }

    #[tokio::test]
    async fn health_reports_identity() {
        let gw = Arc::new(FakeGateway::default());
        let (status, body) = get_page(app(&gw), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["identity"], "alice");
    }
}
