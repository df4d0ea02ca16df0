//! HTTP client for the identity endpoint.

use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

/// Default timeout for the identity lookup. Resolution happens once at
/// session start and must not stall the worker indefinitely.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves the identity token that selects a memory partition.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    endpoint: String,
    client: Client,
    timeout: Duration,
}

impl IdentityResolver {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
            timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    /// Overrides the lookup timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetches the identity token from the configured endpoint.
    ///
    /// Expects a JSON body of the form `{"email": "user@example.com"}`.
    /// Returns `None` on any failure; the caller treats that as a
    /// session without memory partitioning.
    pub async fn resolve(&self) -> Option<String> {
        let response = match self
            .client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "identity lookup failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                endpoint = %self.endpoint,
                status = %response.status(),
                "identity endpoint returned non-success status"
            );
            return None;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "identity response was not valid JSON");
                return None;
            }
        };

        match parse_identity(&body) {
            Some(email) => {
                info!(email = %email, "resolved session identity");
                Some(email)
            }
            None => {
                warn!(endpoint = %self.endpoint, "identity response had no email field");
                None
            }
        }
    }
}

/// Extracts the identity token from a response body.
///
/// Separate from the network path so the contract is testable offline.
fn parse_identity(body: &serde_json::Value) -> Option<String> {
    body.get("email")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
