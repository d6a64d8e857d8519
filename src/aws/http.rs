//! HTTP utilities for signed AWS API calls

use super::auth::{sign_request, Credentials, RequestParts};
use anyhow::{Context, Result};
use reqwest::{Client, Method};
use std::time::SystemTime;
use thiserror::Error;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
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

/// Non-2xx answer from an AWS endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("API request failed: {status}{}{}", .code.as_ref().map(|c| format!(" ({})", c)).unwrap_or_default(), .message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct ApiError {
    pub status: u16,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ApiError {
    /// Build from a status and an error body in either JSON or XML form
    pub fn from_body(status: u16, body: &str) -> Self {
        let (code, message) = parse_error_body(body);
        Self {
            status,
            code,
            message,
        }
    }
}

fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let field = |names: &[&str]| {
            names
                .iter()
                .find_map(|n| json.get(*n).and_then(|v| v.as_str()))
                .map(str::to_string)
        };
        // JSON protocol codes look like "com.amazonaws.kinesis#ResourceNotFoundException"
        let code = field(&["__type", "code", "Code"])
            .map(|c| c.rsplit('#').next().unwrap_or(&c).to_string());
        return (code, field(&["message", "Message"]));
    }

    (xml_tag(body, "Code"), xml_tag(body, "Message"))
}

fn xml_tag(body: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].trim().to_string())
}

/// A request ready to be signed and sent
#[derive(Debug, Clone)]
pub struct AwsRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// HTTP client wrapper for AWS API calls
#[derive(Clone)]
pub struct AwsHttpClient {
    client: Client,
}

impl AwsHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("aws-resolvers/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Sign and send a request, returning the response body on success
    pub async fn send(
        &self,
        request: AwsRequest,
        credentials: &Credentials,
        signing_name: &str,
        region: &str,
    ) -> Result<String> {
        tracing::debug!("{} {}", request.method, request.url);

        let signable = RequestParts {
            method: request.method.as_str(),
            url: request.url.as_str(),
            headers: &request.headers,
            body: &request.body,
        };
        let auth_headers = sign_request(
            credentials,
            signing_name,
            region,
            &signable,
            SystemTime::now(),
        )?;

        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in request.headers.iter().chain(auth_headers.iter()) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await.context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::from_body(status.as_u16(), &body).into());
        }

        Ok(body)
    }
}
