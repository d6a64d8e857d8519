//! # aws-resolvers
//!
//! Resolves `aws:<service>[:<subKind>]:<key>:<property>` references into live
//! values read from deployed AWS infrastructure, so a deployment description
//! can point at a cache endpoint, a VPC id or a table ARN without copying
//! them by hand.
//!
//! ## Modules
//!
//! - [`resolver`]: Reference grammar, service lookups, property extraction and the strict/non-strict policy
//! - [`aws`]: The describe-call boundary and the signed HTTP client behind it
//! - [`host`]: Adapter for configuration hosts that resolve variables one source at a time
//! - [`config`]: Persistent user configuration
//! - [`error`]: The error taxonomy shared by every layer
//!
//! ## Supported references
//!
//! | Prefix | Resource | Example |
//! |---|---|---|
//! | `ecs` | ElastiCache cluster | `aws:ecs:my-cluster:CacheNodes[0].Endpoint.Address` |
//! | `ess` | Elasticsearch domain | `aws:ess:logs:Endpoint` |
//! | `kinesis` | Kinesis stream | `aws:kinesis:events:StreamARN` |
//! | `dynamodb` | DynamoDB table | `aws:dynamodb:orders:LatestStreamArn` |
//! | `rds` | RDS instance | `aws:rds:orders-db:Endpoint.Address` |
//! | `ec2` | VPC, subnet, security group | `aws:ec2:securityGroup:alpha-web:GroupId` |

pub mod aws;
pub mod config;
pub mod error;
pub mod host;
pub mod resolver;

pub use error::{ResolveError, Result};
pub use resolver::Resolver;
