//! Error handling for catalog API operations.

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Common error type for catalog API operations.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    /// A request was sent (or attempted) and did not succeed.
    #[error("{method} {url} failed")]
    RequestFailed {
        method: Method,
        url: String,
        #[source]
        cause: RequestFailure,
    },
    #[error("invalid catalog client configuration: {0}")]
    InvalidConfig(String),
}

impl CatalogClientError {
    /// The HTTP status of the failed request, if the server responded at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CatalogClientError::RequestFailed {
                cause: RequestFailure::Status { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

/// Why a request failed.
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error("{}", fmt_status(.status, .detail.as_deref()))]
    Status {
        status: StatusCode,
        /// Error message reported by the server, kept for diagnostics.
        detail: Option<String>,
    },
    #[error("could not reach the catalog")]
    Transport(#[source] reqwest::Error),
    #[error("malformed response body")]
    MalformedBody(#[source] serde_json::Error),
}

fn fmt_status(status: &StatusCode, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!("{status}: {detail}"),
        None => format!("{status}"),
    }
}

/// Keys an error message is reported under, in order of preference.
///
/// Flask style APIs use `error` or `message`, FastAPI style ones use `detail`.
const ERROR_KEYS: [&str; 3] = ["error", "message", "detail"];

/// Turn the body of an unsuccessful response into an optional detail message.
///
/// We never forward raw bodies since they may contain HTML garbage.
pub(crate) fn parse_error_detail(body: &[u8]) -> Option<String> {
    let serde_json::Value::Object(fields) = serde_json::from_slice(body).ok()? else {
        return None;
    };

    ERROR_KEYS
        .iter()
        .filter_map(|key| fields.get(*key))
        .find_map(|value| match value {
            serde_json::Value::String(message) => Some(message.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
}
