//! AWS Authentication
//!
//! Credentials and the default region come from the standard provider chain
//! of `aws-config`: environment variables, the shared `~/.aws/config` and
//! `~/.aws/credentials` profiles, SSO, web identity, and container or
//! instance metadata. Requests are signed with Signature Version 4 through
//! `aws-sigv4`.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningParams, SigningSettings};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use std::time::SystemTime;

pub use aws_credential_types::Credentials;

/// Load the shared AWS configuration from the default chain.
///
/// `region` and `endpoint_url` override whatever the chain would find.
pub async fn load_sdk_config(region: Option<&str>, endpoint_url: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    if let Some(url) = endpoint_url {
        loader = loader.endpoint_url(url);
    }
    loader.load().await
}

/// Ask a provider for the credentials to sign the next request with
pub async fn resolve_credentials(provider: &SharedCredentialsProvider) -> Result<Credentials> {
    let credentials = provider.provide_credentials().await.context(
        "Failed to load AWS credentials. Configure a profile, environment variables or an instance role",
    )?;
    tracing::trace!("Using credentials {}", credentials.access_key_id());
    Ok(credentials)
}

/// The parts of a request covered by the signature
#[derive(Debug)]
pub struct RequestParts<'a> {
    pub method: &'a str,
    pub url: &'a str,
    /// Extra headers to sign (content-type, x-amz-target, ...)
    pub headers: &'a [(String, String)],
    pub body: &'a [u8],
}

/// Sign a request, returning the headers that must be added to it
/// (`x-amz-date`, `x-amz-security-token` when present, `authorization`)
pub fn sign_request(
    credentials: &Credentials,
    signing_name: &str,
    region: &str,
    request: &RequestParts<'_>,
    time: SystemTime,
) -> Result<Vec<(String, String)>> {
    let identity: Identity = credentials.clone().into();
    let params: SigningParams<'_> = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(signing_name)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .context("Invalid signing parameters")?
        .into();

    let signable = SignableRequest::new(
        request.method,
        request.url,
        request
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
        SignableBody::Bytes(request.body),
    )
    .context("Request cannot be signed")?;

    let (instructions, _signature) = sign(signable, &params)
        .context("Failed to sign request")?
        .into_parts();
    let (headers, _query) = instructions.into_parts();

    Ok(headers
        .into_iter()
        .map(|header| (header.name().to_string(), header.value().to_string()))
        .collect())
}
