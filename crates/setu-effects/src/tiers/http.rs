//! Shared plumbing for the HTTP-backed tiers

use setu_core::{SetuError, TierError, TierKind, TierOperation};
use std::time::Duration;

/// Client with a per-request timeout
pub(crate) fn client(timeout: Duration) -> Result<reqwest::Client, SetuError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SetuError::config(format!("Failed to build HTTP client: {e}")))
}

/// Strip trailing slashes so paths can be appended with `/`
pub(crate) fn base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Map a transport failure onto the tier error model
pub(crate) fn transport_error(
    tier: TierKind,
    operation: TierOperation,
    timeout: Duration,
    error: reqwest::Error,
) -> TierError {
    if error.is_timeout() {
        return TierError::Timeout {
            tier,
            operation,
            elapsed_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };
    }
    let message = format!("Failed to reach {tier} service: {error}");
    match operation {
        TierOperation::Write => TierError::write(tier, message),
        TierOperation::Read => TierError::read(tier, message),
    }
}

/// Map a non-success status onto the tier error model
pub(crate) async fn status_error(
    tier: TierKind,
    operation: TierOperation,
    locator: &str,
    response: reqwest::Response,
) -> TierError {
    let status = response.status();
    if operation == TierOperation::Read && status == reqwest::StatusCode::NOT_FOUND {
        return TierError::not_found(tier, locator);
    }
    let body = response.text().await.unwrap_or_default();
    let body: String = body.chars().take(200).collect();
    let message = format!("{tier} service returned {status}: {body}");
    match operation {
        TierOperation::Write => TierError::write(tier, message),
        TierOperation::Read => TierError::read(tier, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trims_slashes() {
        assert_eq!(base_url("https://gw.example/ "), "https://gw.example");
        assert_eq!(base_url("http://127.0.0.1:9000//"), "http://127.0.0.1:9000");
    }
}
