//! Shared request plumbing: error mapping and response decoding.

use std::time::Duration;

use bodymesh_core::error::UpstreamError;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Builds the HTTP client shared by every adapter.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("bodymesh/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Maps a reqwest failure onto the upstream error taxonomy.
pub(crate) fn request_error(url: &str, err: &reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout {
            url: url.to_string(),
        }
    } else if err.is_decode() {
        UpstreamError::Malformed {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else {
        UpstreamError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Passes successful responses through and turns the rest into errors.
pub(crate) async fn ensure_success(
    url: &str,
    response: Response,
) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// Reads a successful response body as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(
    url: &str,
    response: Response,
) -> Result<T, UpstreamError> {
    let bytes = ensure_success(url, response)
        .await?
        .bytes()
        .await
        .map_err(|e| request_error(url, &e))?;
    decode_json(url, &bytes)
}

/// Reads a successful response body as raw bytes.
pub(crate) async fn read_bytes(url: &str, response: Response) -> Result<Vec<u8>, UpstreamError> {
    let bytes = ensure_success(url, response)
        .await?
        .bytes()
        .await
        .map_err(|e| request_error(url, &e))?;
    Ok(bytes.to_vec())
}

pub(crate) fn decode_json<T: DeserializeOwned>(
    url: &str,
    bytes: &[u8],
) -> Result<T, UpstreamError> {
    serde_json::from_slice(bytes).map_err(|e| UpstreamError::Malformed {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Joins a base URL and a path without doubling the slash.
pub(crate) fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Sized {
        size: String,
    }

    #[test]
    fn test_join() {
        assert_eq!(join("https://a.test/", "/v3/sessions/"), "https://a.test/v3/sessions/");
        assert_eq!(
            join("https://a.test", "register-and-fit"),
            "https://a.test/register-and-fit"
        );
    }

    #[test]
    fn test_decode_json_malformed() {
        let err = decode_json::<Sized>("https://size.test", b"<html>").unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_decode_json_ok() {
        let parsed: Sized = decode_json("https://size.test", br#"{"size":"L"}"#).unwrap();
        assert_eq!(parsed.size, "L");
    }
}
