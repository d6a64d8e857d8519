//! Service lookup handlers
//!
//! Each handler turns one lookup key into exactly one descriptor record, or
//! fails. Provider errors pass through untouched.

use crate::aws::{DescribeApi, DescribeCall, Parameters};
use crate::error::{ResolveError, Result};
use serde_json::Value;

/// Take the first element of a list field, if any
fn take_first(mut response: Value, field: &str) -> Option<Value> {
    match response.get_mut(field).map(Value::take) {
        Some(Value::Array(items)) => items.into_iter().next(),
        _ => None,
    }
}

/// Take a non-null object field
fn take_field(mut response: Value, field: &str) -> Option<Value> {
    response
        .get_mut(field)
        .map(Value::take)
        .filter(|v| !v.is_null())
}

/// ElastiCache cluster by id
pub async fn cache_cluster(api: &dyn DescribeApi, key: &str, params: &Parameters) -> Result<Value> {
    tracing::debug!("Resolving ElastiCache cluster with name {}", key);
    let call = DescribeCall::CacheClusters {
        cluster_id: key.to_string(),
    };
    let response = api.describe(call, params).await?;

    take_first(response, "CacheClusters").ok_or_else(|| ResolveError::NotFound {
        what: "ElastiCache cluster",
        key: key.to_string(),
    })
}

/// Elasticsearch domain by name
pub async fn search_domain(api: &dyn DescribeApi, key: &str, params: &Parameters) -> Result<Value> {
    tracing::debug!("Resolving ElasticSearch cluster with name {}", key);
    let call = DescribeCall::ElasticsearchDomain {
        domain_name: key.to_string(),
    };
    let response = api.describe(call, params).await?;

    take_field(response, "DomainStatus").ok_or_else(|| ResolveError::NotFound {
        what: "ElasticSearch cluster",
        key: key.to_string(),
    })
}

/// Kinesis stream by name
pub async fn stream(api: &dyn DescribeApi, key: &str, params: &Parameters) -> Result<Value> {
    tracing::debug!("Resolving Kinesis stream with name {}", key);
    let call = DescribeCall::Stream {
        stream_name: key.to_string(),
    };
    let response = api.describe(call, params).await?;

    take_field(response, "StreamDescription").ok_or_else(|| ResolveError::NotFound {
        what: "Kinesis stream",
        key: key.to_string(),
    })
}

/// DynamoDB table by name
pub async fn table(api: &dyn DescribeApi, key: &str, params: &Parameters) -> Result<Value> {
    tracing::debug!("Resolving DynamoDB table with name {}", key);
    let call = DescribeCall::Table {
        table_name: key.to_string(),
    };
    let response = api.describe(call, params).await?;

    take_field(response, "Table").ok_or_else(|| ResolveError::NotFound {
        what: "DynamoDB table",
        key: key.to_string(),
    })
}

/// RDS instance by identifier; anything but exactly one match fails
pub async fn db_instance(api: &dyn DescribeApi, key: &str, params: &Parameters) -> Result<Value> {
    tracing::debug!("Resolving RDS database with name {}", key);
    let call = DescribeCall::DbInstances {
        identifier: key.to_string(),
    };
    let mut response = api.describe(call, params).await?;

    let instances = match response.get_mut("DBInstances").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    match instances.len() {
        0 => Err(ResolveError::NotFound {
            what: "RDS database",
            key: key.to_string(),
        }),
        1 => Ok(instances.into_iter().next().unwrap_or_default()),
        count => Err(ResolveError::Ambiguous {
            key: key.to_string(),
            count,
        }),
    }
}

/// EC2 family: `vpc:<name>`, `subnet:<name>` or `securityGroup:<vpcName>-<groupName>`
pub async fn network(api: &dyn DescribeApi, key: &str, params: &Parameters) -> Result<Value> {
    let (kind, name) = key.split_once(':').unwrap_or((key, ""));

    match kind {
        "vpc" | "subnet" | "securityGroup" if name.is_empty() => Err(ResolveError::InvalidKey {
            service: "ec2",
            key: key.to_string(),
            reason: "expected <kind>:<name>",
        }),
        "vpc" => vpc(api, name, params).await,
        "subnet" => subnet(api, name, params).await,
        "securityGroup" => security_group(api, name, params).await,
        _ => Err(ResolveError::UnsupportedSubKind {
            kind: kind.to_string(),
        }),
    }
}

/// VPC whose tags carry the given value
pub async fn vpc(api: &dyn DescribeApi, name: &str, params: &Parameters) -> Result<Value> {
    tracing::debug!("Resolving vpc with name {}", name);
    let call = DescribeCall::Vpcs {
        tag_value: name.to_string(),
    };
    let response = api.describe(call, params).await?;

    take_first(response, "Vpcs").ok_or_else(|| ResolveError::NotFound {
        what: "vpc",
        key: name.to_string(),
    })
}

/// Subnet whose tags carry the given value
pub async fn subnet(api: &dyn DescribeApi, name: &str, params: &Parameters) -> Result<Value> {
    tracing::debug!("Resolving subnet with name {}", name);
    let call = DescribeCall::Subnets {
        tag_value: name.to_string(),
    };
    let response = api.describe(call, params).await?;

    take_first(response, "Subnets").ok_or_else(|| ResolveError::NotFound {
        what: "subnet",
        key: name.to_string(),
    })
}

/// Split `<vpcName>-<groupName>` on the first dash. VPC names cannot
/// contain a dash here; group names can.
pub fn split_security_group_key(key: &str) -> Result<(&str, &str)> {
    match key.split_once('-') {
        Some((vpc, group)) if !vpc.is_empty() && !group.is_empty() => Ok((vpc, group)),
        _ => Err(ResolveError::InvalidKey {
            service: "ec2",
            key: key.to_string(),
            reason: "expected <vpcName>-<groupName>",
        }),
    }
}

/// Security group by name inside the VPC resolved from the key
pub async fn security_group(api: &dyn DescribeApi, key: &str, params: &Parameters) -> Result<Value> {
    let (vpc_name, group_name) = split_security_group_key(key)?;
    tracing::debug!("Resolving security group {} in vpc {}", group_name, vpc_name);

    let vpc_record = vpc(api, vpc_name, params).await?;
    let vpc_id = vpc_record
        .get("VpcId")
        .and_then(Value::as_str)
        .ok_or_else(|| ResolveError::NotFound {
            what: "VpcId for vpc",
            key: vpc_name.to_string(),
        })?;

    let call = DescribeCall::SecurityGroups {
        group_name: group_name.to_string(),
        vpc_id: vpc_id.to_string(),
    };
    let response = api.describe(call, params).await?;

    take_first(response, "SecurityGroups").ok_or_else(|| ResolveError::NotFound {
        what: "security group",
        key: format!("{} in {}", group_name, vpc_id),
    })
}
