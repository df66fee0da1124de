//! Error types for the FloodSync client.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned by [`FloodServiceClient`](crate::FloodServiceClient).
///
/// The two request operations only ever return `Transport`, `Service` or
/// `Decode`. The remaining variants come from client construction.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend could not be reached, the exchange timed out, or the
    /// response body could not be read.
    #[error("Transport error calling {endpoint}: {source}")]
    Transport {
        /// Endpoint path that was being called.
        endpoint: &'static str,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a failure.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The backend answered with success but the body has the wrong shape.
    #[error("Failed to decode response from {endpoint}: {reason}")]
    Decode {
        /// Endpoint path that was being called.
        endpoint: &'static str,
        /// What was wrong with the body.
        reason: String,
    },

    /// The configured base URL is not an absolute http(s) URL.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// True if this is a transport failure caused by a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport { source, .. } if source.is_timeout())
    }

    /// True for connection, DNS and timeout failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }

    /// The service failure, if this is one.
    pub fn as_service(&self) -> Option<&ServiceError> {
        match self {
            ClientError::Service(e) => Some(e),
            _ => None,
        }
    }

    /// Short label used for metrics and logs.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            ClientError::Transport { .. } => "transport",
            ClientError::Service(_) => "service",
            ClientError::Decode { .. } => "decode",
            ClientError::InvalidBaseUrl(_) | ClientError::Http(_) => "config",
        }
    }
}

/// A reachable backend reported a failure.
///
/// Usually a non-2xx status. The backend may also report an error in-band
/// with a 2xx status and `"status": "error"`, in which case `status` holds
/// the 2xx code actually received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Backend returned HTTP {status} for {endpoint}: {}", summarize(.body))]
pub struct ServiceError {
    /// Endpoint path that was being called.
    pub endpoint: &'static str,
    /// HTTP status code received.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl ServiceError {
    /// Human-readable message from the body, if the backend sent one.
    ///
    /// Recognises `{"detail": "..."}` and `{"message": "..."}`.
    pub fn detail(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        ["detail", "message"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .map(str::to_string)
    }
}

const MAX_BODY_IN_MESSAGE: usize = 200;

fn summarize(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "<empty body>".to_string();
    }
    match body.char_indices().nth(MAX_BODY_IN_MESSAGE) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// A flood map request that should not be sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Country name was empty or whitespace.
    #[error("Country name is required")]
    EmptyCountry,

    /// A date string was not `YYYY-MM-DD`.
    #[error("Invalid {field} '{value}' (expected YYYY-MM-DD)")]
    InvalidDate {
        /// Which field was being parsed.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Start date falls after end date.
    #[error("start_date {start} is after end_date {end}")]
    DateOrder {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },
}
