//! HTTP bridge to a provider gateway
//!
//! `POST {endpoint}/v1/resources/{type}/read` with `{"id", "attributes"}`,
//! answered by `{"state": <value>}` or `{"error": "<message>"}`.

use super::{ReadResourceArgs, ResourceReader};
use crate::value::RawValue;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default endpoint of a locally running provider gateway
pub const DEFAULT_PROVIDER_ENDPOINT: &str = "http://127.0.0.1:8089";

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

#[derive(Serialize)]
struct ReadRequest<'a> {
    id: &'a str,
    attributes: &'a BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct ReadResponse {
    #[serde(default)]
    state: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Resource reader backed by a provider gateway over HTTP
#[derive(Clone)]
pub struct HttpResourceReader {
    client: Client,
    endpoint: Url,
}

impl HttpResourceReader {
    /// Create a reader for the gateway at `endpoint`
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let mut endpoint =
            Url::parse(endpoint).with_context(|| format!("Invalid provider endpoint: {}", endpoint))?;
        // Url::join replaces the last segment unless the base ends with '/'
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(concat!("driftscan/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn read_url(&self, args: &ReadResourceArgs) -> Result<Url> {
        let path = format!(
            "v1/resources/{}/read",
            urlencoding::encode(args.resource_type.as_str())
        );
        self.endpoint
            .join(&path)
            .with_context(|| format!("Failed to build read URL for {}", args.resource_type))
    }
}

#[async_trait]
impl ResourceReader for HttpResourceReader {
    async fn read_resource(&self, args: &ReadResourceArgs) -> Result<RawValue> {
        let url = self.read_url(args)?;
        tracing::debug!("POST {} id={}", url, args.id);

        let response = self
            .client
            .post(url)
            .json(&ReadRequest {
                id: args.id.as_str(),
                attributes: &args.attributes,
            })
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only log sanitized/truncated error body
            tracing::error!("Provider error: {} - {}", status, sanitize_for_log(&body));
            return Err(anyhow::anyhow!(
                "Provider request failed for {} {}: {}",
                args.resource_type,
                args.id,
                status
            ));
        }

        let parsed: ReadResponse =
            serde_json::from_str(&body).context("Failed to parse provider response JSON")?;

        if let Some(message) = parsed.error {
            return Err(anyhow::anyhow!(
                "Provider could not read {} {}: {}",
                args.resource_type,
                args.id,
                message
            ));
        }

        match parsed.state {
            None | Some(serde_json::Value::Null) => Err(anyhow::anyhow!(
                "{} {} not found",
                args.resource_type,
                args.id
            )),
            Some(state) => Ok(RawValue::from(state)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ResourceId, AWS_SQS_QUEUE};

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("500 bytes total"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc d"), "abc d");
    }

    #[test]
    fn test_read_url_keeps_endpoint_path() {
        let reader =
            HttpResourceReader::new("http://gateway:9000/aws", Duration::from_secs(5)).unwrap();
        let args = ReadResourceArgs::new(AWS_SQS_QUEUE, ResourceId::from("q"));
        assert_eq!(
            reader.read_url(&args).unwrap().as_str(),
            "http://gateway:9000/aws/v1/resources/aws_sqs_queue/read"
        );
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        assert!(HttpResourceReader::new("not a url", Duration::from_secs(5)).is_err());
    }
}
