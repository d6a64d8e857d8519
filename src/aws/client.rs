//! AWS Client
//!
//! Main client for the describe calls the resolver issues, combining
//! credentials, endpoint selection and the per-protocol request encoding.

use super::auth::{self, Credentials};
use super::http::{AwsHttpClient, AwsRequest};
use super::{xml, AwsService, DescribeApi, DescribeCall, Parameters, Protocol};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::provider::SharedCredentialsProvider;
use reqwest::Method;
use serde_json::{json, Value};
use url::form_urlencoded;
use url::Url;

/// Main AWS client
#[derive(Clone)]
pub struct AwsClient {
    pub http: AwsHttpClient,
    /// Region used when the call does not name one
    pub default_region: Option<String>,
    /// Single base URL for every service (local emulators, tests)
    pub endpoint_url: Option<Url>,
    credentials: Option<SharedCredentialsProvider>,
}

impl AwsClient {
    /// Create a new AWS client without a credentials provider
    pub fn new(default_region: Option<&str>, endpoint_url: Option<&str>) -> Result<Self> {
        let endpoint_url = endpoint_url
            .map(|u| Url::parse(u).with_context(|| format!("Invalid endpoint URL: {}", u)))
            .transpose()?;

        Ok(Self {
            http: AwsHttpClient::new()?,
            default_region: default_region.map(str::to_string),
            endpoint_url,
            credentials: None,
        })
    }

    /// Create a client from the default AWS configuration chain.
    ///
    /// `region` and `endpoint_url` take precedence over the environment and
    /// the shared config files.
    pub async fn load(region: Option<&str>, endpoint_url: Option<&str>) -> Result<Self> {
        let sdk_config = auth::load_sdk_config(region, endpoint_url).await;
        Self::from_sdk_config(&sdk_config)
    }

    /// Create a client from an already loaded AWS configuration
    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Result<Self> {
        let region = sdk_config.region().map(|r| r.as_ref());
        tracing::debug!("AWS config loaded (region: {:?})", region);

        let mut client = Self::new(region, sdk_config.endpoint_url())?;
        client.credentials = sdk_config.credentials_provider();
        Ok(client)
    }

    /// Use fixed credentials instead of the default chain
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(SharedCredentialsProvider::new(credentials));
        self
    }

    /// Region for one call: call parameters, then the client default
    pub fn region_for(&self, params: &Parameters) -> Result<String> {
        params
            .region
            .clone()
            .or_else(|| self.default_region.clone())
            .ok_or_else(|| {
                anyhow!("No AWS region configured. Set AWS_REGION, a profile region or pass a region")
            })
    }

    /// Build the endpoint URL for a service in a region
    pub fn endpoint(&self, service: AwsService, region: &str) -> Result<Url> {
        if let Some(url) = &self.endpoint_url {
            return Ok(url.clone());
        }
        let url = format!(
            "https://{}.{}.amazonaws.com/",
            service.endpoint_prefix(),
            region
        );
        Url::parse(&url).with_context(|| format!("Invalid endpoint URL: {}", url))
    }

    async fn credentials(&self) -> Result<Credentials> {
        let provider = self
            .credentials
            .as_ref()
            .ok_or_else(|| anyhow!("No AWS credentials provider configured"))?;
        auth::resolve_credentials(provider).await
    }

    fn build_request(&self, call: &DescribeCall, endpoint: Url) -> Result<AwsRequest> {
        let service = call.service();

        match service.protocol() {
            Protocol::Query => {
                let mut form = form_urlencoded::Serializer::new(String::new());
                form.append_pair("Action", call.action());
                form.append_pair("Version", service.api_version());
                for (key, value) in query_params(call) {
                    form.append_pair(&key, &value);
                }
                Ok(AwsRequest {
                    method: Method::POST,
                    url: endpoint,
                    headers: vec![(
                        "content-type".to_string(),
                        "application/x-www-form-urlencoded; charset=utf-8".to_string(),
                    )],
                    body: form.finish().into_bytes(),
                })
            }
            Protocol::Json {
                version,
                target_prefix,
            } => Ok(AwsRequest {
                method: Method::POST,
                url: endpoint,
                headers: vec![
                    (
                        "content-type".to_string(),
                        format!("application/x-amz-json-{}", version),
                    ),
                    (
                        "x-amz-target".to_string(),
                        format!("{}.{}", target_prefix, call.action()),
                    ),
                ],
                body: serde_json::to_vec(&json_body(call))?,
            }),
            Protocol::RestJson => {
                let DescribeCall::ElasticsearchDomain { domain_name } = call else {
                    return Err(anyhow!("No REST mapping for {}", call));
                };
                let mut url = endpoint;
                url.path_segments_mut()
                    .map_err(|_| anyhow!("Endpoint URL cannot be a base"))?
                    .pop_if_empty()
                    .extend([service.api_version(), "es", "domain", domain_name.as_str()]);
                Ok(AwsRequest {
                    method: Method::GET,
                    url,
                    headers: Vec::new(),
                    body: Vec::new(),
                })
            }
        }
    }
}

/// Query protocol parameters for a call
fn query_params(call: &DescribeCall) -> Vec<(String, String)> {
    fn filter(index: usize, name: &str, value: &str) -> [(String, String); 2] {
        [
            (format!("Filter.{}.Name", index), name.to_string()),
            (format!("Filter.{}.Value.1", index), value.to_string()),
        ]
    }

    match call {
        DescribeCall::CacheClusters { cluster_id } => vec![
            ("CacheClusterId".to_string(), cluster_id.clone()),
            ("ShowCacheNodeInfo".to_string(), "true".to_string()),
        ],
        DescribeCall::Vpcs { tag_value } | DescribeCall::Subnets { tag_value } => {
            filter(1, "tag-value", tag_value).to_vec()
        }
        DescribeCall::SecurityGroups { group_name, vpc_id } => {
            let mut params = filter(1, "group-name", group_name).to_vec();
            params.extend(filter(2, "vpc-id", vpc_id));
            params
        }
        DescribeCall::DbInstances { identifier } => {
            vec![("DBInstanceIdentifier".to_string(), identifier.clone())]
        }
        _ => Vec::new(),
    }
}

/// JSON protocol body for a call
fn json_body(call: &DescribeCall) -> Value {
    match call {
        DescribeCall::Stream { stream_name } => json!({ "StreamName": stream_name }),
        DescribeCall::Table { table_name } => json!({ "TableName": table_name }),
        _ => json!({}),
    }
}

#[async_trait]
impl DescribeApi for AwsClient {
    async fn describe(&self, call: DescribeCall, params: &Parameters) -> Result<Value> {
        let service = call.service();
        let region = self.region_for(params)?;
        let credentials = self.credentials().await?;
        let endpoint = self.endpoint(service, &region)?;

        tracing::debug!("describe: call={}, region={}", call, region);

        let request = self.build_request(&call, endpoint)?;
        let body = self
            .http
            .send(request, &credentials, service.endpoint_prefix(), &region)
            .await?;

        match (service.protocol(), service) {
            (Protocol::Query, AwsService::Ec2) => xml::ec2_response(&body),
            (Protocol::Query, _) => xml::query_result(&body, call.action(), xml::shapes_for(service)),
            _ if body.trim().is_empty() => Ok(Value::Null),
            _ => serde_json::from_str(&body).context("Failed to parse response JSON"),
        }
    }
}
