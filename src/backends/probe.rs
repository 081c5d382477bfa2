use std::time::Duration;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// GET `url` and report whether it answered 2xx within `timeout`.
///
/// Network errors, non-success statuses and timeouts all read as
/// unavailable. No retries.
pub async fn is_available(
    client: &reqwest::Client,
    url: &str,
    bearer_token: Option<&str>,
    timeout: Duration,
) -> bool {
    let mut request = client.get(url);
    if let Some(token) = bearer_token {
        request = request.bearer_auth(token);
    }

    match tokio::time::timeout(timeout, request.send()).await {
        Ok(Ok(response)) => response.status().is_success(),
        Ok(Err(_)) | Err(_) => false,
    }
}
