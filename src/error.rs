use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing '{0}'.")]
    MissingParam(&'static str),
    #[error("Invalid rules: {0}")]
    InvalidRules(String),
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),
    #[error("Missing BROWSERLESS_TOKEN env var")]
    MissingToken,
    #[error("Browserless {status}")]
    Upstream { status: u16, url: String },
    #[error("{0}")]
    Fetch(#[from] reqwest::Error),
}

impl Error {
    /// An upstream status is forwarded verbatim; everything else maps to
    /// 400 or 500.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MissingParam(_) | Error::InvalidRules(_) | Error::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::MissingToken | Error::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = match &self {
            // The upstream error body echoes the requested url.
            Error::Upstream { url, .. } => json!({ "error": self.to_string(), "url": url }),
            _ => json!({ "error": self.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}
