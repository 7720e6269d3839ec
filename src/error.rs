//! Errors surfaced by REST calls.
//!
//! ERROR HANDLING
//! ==============
//! Every failure, whether the server answered with a non-2xx status or the
//! request never completed, arrives as an `ApiError`. Controllers turn it into
//! a notice; only `401` carries extra policy (session clear + redirect).

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde::Deserialize;

pub const UNAUTHORIZED: u16 = 401;

/// Errors produced by remote resource operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request did not complete (DNS, connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A success response body could not be decoded.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// A request body could not be encoded.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// `true` for the one distinguished status: an expired or missing session.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: UNAUTHORIZED, .. })
    }

    /// Text appended to an operation prefix in a user-facing notice.
    #[must_use]
    pub fn notice_detail(&self) -> String {
        match self {
            Self::Status { status, message } => format!("{status} {message}"),
            Self::Transport(msg) | Self::Parse(msg) | Self::Encode(msg) | Self::HttpClientBuild(msg) => msg.clone(),
        }
    }

    /// The server's message (or the transport text) without the status code.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Status { message, .. } => message,
            Self::Transport(msg) | Self::Parse(msg) | Self::Encode(msg) | Self::HttpClientBuild(msg) => msg,
        }
    }

    /// Build a status error from a raw response body.
    ///
    /// The server renders errors as `{ "status": .., "message": .. }`; bodies
    /// that do not match fall back to the canonical reason phrase.
    #[must_use]
    pub fn from_status_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<String>,
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| reason_phrase(status).to_owned());
        Self::Status { status, message }
    }
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Error")
}
