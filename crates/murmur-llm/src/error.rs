//! Error types for language-model calls.

use thiserror::Error;

/// Errors that can occur while requesting a chat completion.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The HTTP request itself failed (connect, TLS, timeout).
    #[error("chat completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("chat completion API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body did not carry a completion.
    #[error("malformed chat completion response: {0}")]
    MalformedResponse(String),
}
