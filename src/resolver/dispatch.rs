//! Dispatch
//!
//! Maps a parsed reference onto its service lookup handler.

use super::handlers;
use super::reference::{Reference, Service};
use crate::aws::{DescribeApi, Parameters};
use crate::error::Result;
use serde_json::Value;

/// Look up the descriptor record a reference points at
pub async fn dispatch(
    api: &dyn DescribeApi,
    reference: &Reference,
    params: &Parameters,
) -> Result<Value> {
    tracing::debug!(
        "dispatch: service={}, key={}",
        reference.service,
        reference.lookup_key
    );

    let key = reference.lookup_key.as_str();
    match reference.service {
        Service::CacheCluster => handlers::cache_cluster(api, key, params).await,
        Service::SearchDomain => handlers::search_domain(api, key, params).await,
        Service::Stream => handlers::stream(api, key, params).await,
        Service::Table => handlers::table(api, key, params).await,
        Service::DbInstance => handlers::db_instance(api, key, params).await,
        Service::Network => handlers::network(api, key, params).await,
    }
}
