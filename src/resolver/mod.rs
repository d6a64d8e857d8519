//! Reference resolution engine
//!
//! Turns `aws:<service>[:<subKind>]:<key>:<property>` strings into values
//! read from live AWS resources.
//!
//! # Architecture
//!
//! - [`reference`] - Grammar, service registry and the parsed reference
//! - [`handlers`] - One lookup per service, returning a single descriptor record
//! - [`dispatch`] - Maps a parsed reference onto its handler
//! - [`extract`] - Property paths over descriptor records
//! - [`policy`] - Strict/non-strict error policy and the public entry point
//!
//! # Example
//!
//! ```ignore
//! use aws_resolvers::aws::AwsClient;
//! use aws_resolvers::resolver::Resolver;
//!
//! async fn endpoint() -> anyhow::Result<()> {
//!     let resolver = Resolver::new(AwsClient::new(Some("us-east-1"), None)?);
//!     let address = resolver
//!         .resolve("aws:ecs:my-cluster:CacheNodes[0].Endpoint.Address", None, true)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod dispatch;
pub mod extract;
pub mod handlers;
pub mod policy;
pub mod reference;

pub use dispatch::dispatch;
pub use extract::{extract_property, parse_path, top_level_keys, PathSegment};
pub use policy::Resolver;
pub use reference::{is_aws_reference, supported_prefixes, Reference, Service, Shape, AWS_PREFIX};
