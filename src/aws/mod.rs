//! AWS API interaction module
//!
//! This module provides the provider boundary the resolver talks to: a single
//! "describe" capability, plus the production client that implements it over
//! the public AWS endpoints.
//!
//! # Module Structure
//!
//! - [`auth`] - Credentials and Signature Version 4 request signing
//! - [`client`] - Main AWS client mapping describe calls onto service endpoints
//! - [`http`] - HTTP utilities for signed API calls
//! - [`xml`] - Conversion of Query protocol XML responses into JSON trees
//!
//! # Example
//!
//! ```ignore
//! use aws_resolvers::aws::{AwsClient, DescribeApi, DescribeCall, Parameters};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = AwsClient::new(Some("eu-west-1"), None)?;
//!     let call = DescribeCall::Stream { stream_name: "events".into() };
//!     let response = client.describe(call, &Parameters::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod xml;

pub use client::AwsClient;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Per-call parameters handed to every lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    pub region: Option<String>,
}

impl Parameters {
    /// Build parameters, keeping the region only when it is non-empty
    pub fn for_region(region: Option<&str>) -> Self {
        Self {
            region: region
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        }
    }
}

/// AWS services reachable through [`DescribeApi`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AwsService {
    ElastiCache,
    Elasticsearch,
    Ec2,
    Kinesis,
    DynamoDb,
    Rds,
}

/// Wire protocol spoken by a service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Form-encoded POST, XML response
    Query,
    /// POST with `X-Amz-Target`, JSON body and response
    Json { version: &'static str, target_prefix: &'static str },
    /// Resource paths, JSON response
    RestJson,
}

impl AwsService {
    /// Endpoint prefix, which is also the SigV4 signing name
    pub fn endpoint_prefix(self) -> &'static str {
        match self {
            AwsService::ElastiCache => "elasticache",
            AwsService::Elasticsearch => "es",
            AwsService::Ec2 => "ec2",
            AwsService::Kinesis => "kinesis",
            AwsService::DynamoDb => "dynamodb",
            AwsService::Rds => "rds",
        }
    }

    pub fn api_version(self) -> &'static str {
        match self {
            AwsService::ElastiCache => "2015-02-02",
            AwsService::Elasticsearch => "2015-01-01",
            AwsService::Ec2 => "2016-11-15",
            AwsService::Kinesis => "2013-12-02",
            AwsService::DynamoDb => "2012-08-10",
            AwsService::Rds => "2014-10-31",
        }
    }

    pub fn protocol(self) -> Protocol {
        match self {
            AwsService::ElastiCache | AwsService::Ec2 | AwsService::Rds => Protocol::Query,
            AwsService::Elasticsearch => Protocol::RestJson,
            AwsService::Kinesis => Protocol::Json {
                version: "1.1",
                target_prefix: "Kinesis_20131202",
            },
            AwsService::DynamoDb => Protocol::Json {
                version: "1.0",
                target_prefix: "DynamoDB_20120810",
            },
        }
    }
}

/// One describe-style call against a provider API
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DescribeCall {
    CacheClusters { cluster_id: String },
    ElasticsearchDomain { domain_name: String },
    Vpcs { tag_value: String },
    Subnets { tag_value: String },
    SecurityGroups { group_name: String, vpc_id: String },
    Stream { stream_name: String },
    Table { table_name: String },
    DbInstances { identifier: String },
}

impl DescribeCall {
    pub fn service(&self) -> AwsService {
        match self {
            DescribeCall::CacheClusters { .. } => AwsService::ElastiCache,
            DescribeCall::ElasticsearchDomain { .. } => AwsService::Elasticsearch,
            DescribeCall::Vpcs { .. }
            | DescribeCall::Subnets { .. }
            | DescribeCall::SecurityGroups { .. } => AwsService::Ec2,
            DescribeCall::Stream { .. } => AwsService::Kinesis,
            DescribeCall::Table { .. } => AwsService::DynamoDb,
            DescribeCall::DbInstances { .. } => AwsService::Rds,
        }
    }

    /// API action name, as used in `Action=` and `X-Amz-Target`
    pub fn action(&self) -> &'static str {
        match self {
            DescribeCall::CacheClusters { .. } => "DescribeCacheClusters",
            DescribeCall::ElasticsearchDomain { .. } => "DescribeElasticsearchDomain",
            DescribeCall::Vpcs { .. } => "DescribeVpcs",
            DescribeCall::Subnets { .. } => "DescribeSubnets",
            DescribeCall::SecurityGroups { .. } => "DescribeSecurityGroups",
            DescribeCall::Stream { .. } => "DescribeStream",
            DescribeCall::Table { .. } => "DescribeTable",
            DescribeCall::DbInstances { .. } => "DescribeDBInstances",
        }
    }
}

impl fmt::Display for DescribeCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service().endpoint_prefix(), self.action())
    }
}

/// The capability every lookup handler relies on: given one describe call,
/// return the provider's response payload shaped like the SDK output.
///
/// Transport, auth and throttling failures are returned as-is; implementors
/// never retry.
#[async_trait]
pub trait DescribeApi: Send + Sync {
    async fn describe(&self, call: DescribeCall, params: &Parameters) -> Result<Value>;
}

#[async_trait]
impl<T: DescribeApi + ?Sized> DescribeApi for Arc<T> {
    async fn describe(&self, call: DescribeCall, params: &Parameters) -> Result<Value> {
        (**self).describe(call, params).await
    }
}
