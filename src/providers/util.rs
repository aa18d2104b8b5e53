use crate::core::error::{QuoteError, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error};

const USER_AGENT: &str = concat!("finboard/", env!("CARGO_PKG_VERSION"));
const RETRIES: usize = 3;
const RETRY_DELAY_MS: u64 = 500;

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, reqwest::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// GETs `url` and decodes the JSON body. Transport failures are retried;
/// a non-2xx status or an undecodable body is not.
pub async fn fetch_json<T: DeserializeOwned>(source_name: &'static str, url: &str) -> Result<T> {
    debug!("Requesting {} data from {}", source_name, url);

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| QuoteError::upstream(source_name, e.to_string()))?;
    let response = with_retry(|| client.get(url).send(), RETRIES, RETRY_DELAY_MS)
        .await
        .map_err(|e| QuoteError::upstream(source_name, format!("Request error: {e} URL: {url}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(QuoteError::upstream(
            source_name,
            format!("HTTP error: {status} URL: {url}"),
        ));
    }

    let text = response
        .text()
        .await
        .map_err(|e| QuoteError::upstream(source_name, format!("Failed to read body: {e}")))?;

    serde_json::from_str(&text).map_err(|e| {
        error!(
            error = ?e,
            response = %text,
            "Failed to parse {} response", source_name
        );
        QuoteError::upstream(source_name, format!("Failed to parse JSON response: {e}"))
    })
}

/// Escapes a ticker for use as a URL path segment (`^GSPC` -> `%5EGSPC`).
pub fn percent_encode_symbol(symbol: &str) -> String {
    let mut encoded = String::with_capacity(symbol.len());
    for byte in symbol.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~' | b'=') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}
