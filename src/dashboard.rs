//! Admin dashboard: fetches the user list once and renders it.
//!
//! [`Dashboard::mount`] spawns a single fetch task that writes into the view
//! state. Until (or unless) that fetch succeeds the view renders an empty
//! list; failures are only logged.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use constcat::concat;
use derive_more::From;
use tokio::{sync::watch, task};
use tracing::{debug, warn};

use crate::api;

pub const API_ORIGIN: &str = "http://localhost:3000";

pub const USERS_URL: &str = concat!(API_ORIGIN, "/users");

/// Address the dashboard page is served on.
pub const ADDR: &str = "127.0.0.1:5173";

pub const TITLE: &str = "Admin Dashboard";

/// Where the dashboard gets its users from.
#[async_trait]
pub trait Source: Send + Sync + 'static {
    async fn users(&self) -> Result<Vec<api::User>, reqwest::Error>;
}

/// Fetches users from the API over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(USERS_URL)
    }
}

#[async_trait]
impl Source for HttpSource {
    async fn users(&self) -> Result<Vec<api::User>, reqwest::Error> {
        Ok(self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<api::Response<Vec<api::User>>>()
            .await?
            .data)
    }
}

pub struct Dashboard {
    users: watch::Receiver<Vec<api::User>>,
}

impl Dashboard {
    /// Creates an empty view and spawns the one-off fetch filling it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount<S: Source>(source: S) -> Self {
        let (tx, rx) = watch::channel(Vec::new());

        task::spawn(async move {
            match source.users().await {
                Ok(users) => {
                    debug!(count = users.len(), "fetched users");
                    tx.send_replace(users);
                }
                Err(e) => warn!("failed to fetch users: {e}"),
            }
        });

        Self { users: rx }
    }

    /// Waits for the view state to change.
    ///
    /// Returns `false` once the fetch task is gone and nothing new is left to
    /// observe.
    pub async fn changed(&mut self) -> bool {
        self.users.changed().await.is_ok()
    }

    pub fn users(&self) -> Vec<api::User> {
        self.users.borrow().clone()
    }

    pub fn view(&self) -> Result<View, serde_json::Error> {
        Ok(View {
            title: TITLE,
            body: serde_json::to_string_pretty(&*self.users.borrow())?,
        })
    }
}

/// Rendered dashboard: a heading over a preformatted JSON dump.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct View {
    pub title: &'static str,
    pub body: String,
}

impl View {
    pub fn to_html(&self) -> String {
        let title = escape(self.title);
        let body = escape(&self.body);
        format!(
            "<!doctype html>\n\
             <html lang=\"en\">\n\
             <head>\n\
             <meta charset=\"utf-8\" />\n\
             <title>{title}</title>\n\
             </head>\n\
             <body>\n\
             <main class=\"container\">\n\
             <h1>{title}</h1>\n\
             <pre>{body}</pre>\n\
             </main>\n\
             </body>\n\
             </html>\n"
        )
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn router(dashboard: Arc<Dashboard>) -> Router {
    Router::new().route("/", get(page)).with_state(dashboard)
}

async fn page(
    State(dashboard): State<Arc<Dashboard>>,
) -> Result<Html<String>, RenderError> {
    Ok(Html(dashboard.view()?.to_html()))
}

#[derive(Debug, From)]
pub enum RenderError {
    #[from]
    Json(serde_json::Error),
}

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        match self {
            Self::Json(e) => {
                warn!("failed to render dashboard: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        .into_response()
    }
}
