//! Reference grammar
//!
//! `aws:{service}:{key}:{property}` or
//! `aws:{service}:{subKind}:{key}:{property}`. The two shapes are told apart
//! by their number of segments, never by the service name.

use crate::error::{ResolveError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Literal tag every reference starts with
pub const AWS_PREFIX: &str = "aws";

const STANDARD_PATTERN: &str = r"^aws:\w+:[\w\-.]+:[\w\-.\[\]]+$";
const SUB_SERVICE_PATTERN: &str = r"^aws:\w+:\w+:[\w\-.]+:[\w\-.\[\]]+$";

static STANDARD: OnceLock<Regex> = OnceLock::new();
static SUB_SERVICE: OnceLock<Regex> = OnceLock::new();

fn standard() -> &'static Regex {
    STANDARD.get_or_init(|| Regex::new(STANDARD_PATTERN).unwrap_or_else(|e| panic!("Invalid reference pattern: {}", e)))
}

fn sub_service() -> &'static Regex {
    SUB_SERVICE.get_or_init(|| Regex::new(SUB_SERVICE_PATTERN).unwrap_or_else(|e| panic!("Invalid reference pattern: {}", e)))
}

/// Supported services, keyed by their reference prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// `ecs` - ElastiCache cluster
    CacheCluster,
    /// `ess` - Elasticsearch domain
    SearchDomain,
    /// `kinesis` - Kinesis stream
    Stream,
    /// `dynamodb` - DynamoDB table
    Table,
    /// `rds` - RDS instance
    DbInstance,
    /// `ec2` - VPC, subnet and security group lookups
    Network,
}

impl Service {
    pub const ALL: [Service; 6] = [
        Service::CacheCluster,
        Service::SearchDomain,
        Service::Stream,
        Service::Table,
        Service::DbInstance,
        Service::Network,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Service::CacheCluster => "ecs",
            Service::SearchDomain => "ess",
            Service::Stream => "kinesis",
            Service::Table => "dynamodb",
            Service::DbInstance => "rds",
            Service::Network => "ec2",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.prefix() == prefix)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Get all service prefixes (for usage text)
pub fn supported_prefixes() -> Vec<&'static str> {
    Service::ALL.iter().map(|s| s.prefix()).collect()
}

/// Which of the two grammar shapes a string has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Standard,
    SubService,
}

/// Match a string against the grammar
pub fn shape_of(reference: &str) -> Option<Shape> {
    if standard().is_match(reference) {
        Some(Shape::Standard)
    } else if sub_service().is_match(reference) {
        Some(Shape::SubService)
    } else {
        None
    }
}

/// True when the string claims to be an AWS reference (it may still be malformed)
pub fn is_aws_reference(variable: &str) -> bool {
    variable
        .strip_prefix(AWS_PREFIX)
        .is_some_and(|rest| rest.starts_with(':'))
}

/// A reference split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub service: Service,
    /// Key handed to the service handler; `subKind:key` for the sub-service shape
    pub lookup_key: String,
    /// Property path into the descriptor record
    pub property: String,
}

impl Reference {
    pub fn parse(reference: &str) -> Result<Self> {
        let shape = shape_of(reference).ok_or_else(|| ResolveError::Format {
            reference: reference.to_string(),
        })?;

        // The grammar guarantees the prefix and the segment count
        let rest = &reference[AWS_PREFIX.len() + 1..];
        let segments: Vec<&str> = rest.split(':').collect();

        let service = Service::from_prefix(segments[0]).ok_or_else(|| {
            ResolveError::UnknownService {
                rest: rest.to_string(),
            }
        })?;

        let (lookup_key, property) = match shape {
            Shape::Standard => (segments[1].to_string(), segments[2]),
            Shape::SubService => (segments[1..3].join(":"), segments[3]),
        };

        Ok(Self {
            service,
            lookup_key,
            property: property.to_string(),
        })
    }
}

impl FromStr for Reference {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            AWS_PREFIX, self.service, self.lookup_key, self.property
        )
    }
}
