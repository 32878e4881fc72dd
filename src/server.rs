use std::{io, net::Ipv4Addr};

use axum::{
    http::{header::InvalidHeaderValue, HeaderValue, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{api, config};

/// Builds the API router: a single `GET /users` route.
///
/// Fails if one of the configured CORS origins is not a valid header value.
pub fn router(cors: &config::Cors) -> Result<Router, InvalidHeaderValue> {
    Ok(Router::new()
        .route("/users", get(list_users))
        .layer(cors_layer(cors)?)
        .layer(TraceLayer::new_for_http()))
}

/// Binds the API listener on all interfaces.
///
/// An occupied port surfaces as [`io::ErrorKind::AddrInUse`].
pub async fn bind(port: u16) -> io::Result<TcpListener> {
    TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await
}

/// Binds like [`bind`] and announces the bound port at `info` level.
pub async fn start(port: u16) -> io::Result<TcpListener> {
    let listener = bind(port).await?;
    info!("API server started on port {}", listener.local_addr()?.port());
    Ok(listener)
}

/// The hardcoded payload served by `GET /users`.
pub fn users() -> Vec<api::User> {
    vec![api::User {
        id: api::user::Id::from("1"),
        email: "admin@example.com".to_owned(),
        name: "Admin".to_owned(),
        role: api::user::Role::Admin,
    }]
}

async fn list_users() -> api::Response<Vec<api::User>> {
    api::Response::ok(users())
}

fn cors_layer(cors: &config::Cors) -> Result<CorsLayer, InvalidHeaderValue> {
    let layer = CorsLayer::new().allow_methods([Method::GET]);
    if cors.allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = cors
        .allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}
