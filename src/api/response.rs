use axum::{
    http::StatusCode,
    response::{self, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};

/// Envelope wrapping every API payload.
///
/// `status` is the HTTP status the envelope is sent with: converting it into
/// a response uses this very value, so the two never diverge.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Response<T> {
    pub data: T,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Response<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            data,
            status: status.as_u16(),
            message: None,
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, data)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> response::Response {
        // Only reachable through a hand-built `status` outside 100..=999.
        let status = StatusCode::from_u16(self.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
