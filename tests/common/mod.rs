use std::net::{Ipv4Addr, SocketAddr};

use axum::Router;
use reqwest::StatusCode;
use sample_users::{api, config, server};
use tokio::{net::TcpListener, task};

/// Serves `app` on an ephemeral localhost port in the background.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("failed to get local address");

    task::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });

    addr
}

pub struct Client {
    inner: reqwest::Client,
    pub base_url: String,
}

impl Client {
    /// Starts an API server with the default config and points at it.
    pub async fn spawn() -> Self {
        let app = server::router(&config::Cors::default())
            .expect("invalid CORS config");
        let addr = spawn(app).await;

        Self {
            inner: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn users(
        &self,
    ) -> Result<(StatusCode, api::Response<Vec<api::User>>), StatusCode> {
        let res = self
            .inner
            .get(self.url("/users"))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?;
        let status = res.status();

        Ok((
            status,
            res.json::<api::Response<Vec<api::User>>>()
                .await
                .expect("failed to get a response"),
        ))
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.inner
            .get(self.url(path))
            .send()
            .await
            .expect("failed to send a request")
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}
