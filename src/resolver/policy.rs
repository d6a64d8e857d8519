//! Resolution policy
//!
//! Parse, look up, extract. In non-strict mode a failed lookup resolves to
//! `None`; a malformed reference, a multiplicity violation or a missing
//! property always fails.

use super::dispatch::dispatch;
use super::extract::{extract_property, top_level_keys};
use super::reference::Reference;
use crate::aws::{DescribeApi, Parameters};
use crate::error::{ResolveError, Result};
use serde_json::Value;

/// Resolves `aws:` references against a provider API
#[derive(Debug, Clone)]
pub struct Resolver<A> {
    api: A,
}

impl<A: DescribeApi> Resolver<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Resolve a reference into the value at its property path.
    ///
    /// `region` is passed to the provider only when non-empty. Returns
    /// `Ok(None)` only when `strict` is false and the lookup itself failed.
    pub async fn resolve(
        &self,
        reference: &str,
        region: Option<&str>,
        strict: bool,
    ) -> Result<Option<Value>> {
        let parsed = Reference::parse(reference)?;
        let params = Parameters::for_region(region);

        let record = match dispatch(&self.api, &parsed, &params).await {
            Ok(record) => record,
            Err(e) if !strict && e.is_soft() => {
                tracing::debug!("Error while resolving {}: {}", reference, e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match extract_property(&record, &parsed.property) {
            Some(value) => Ok(Some(value.clone())),
            None => Err(ResolveError::Extraction {
                reference: reference.to_string(),
                property: parsed.property,
                candidates: top_level_keys(&record),
            }),
        }
    }

    /// Resolve with strict mode on, the host default
    pub async fn resolve_strict(&self, reference: &str, region: Option<&str>) -> Result<Value> {
        // Strict mode never yields None
        self.resolve(reference, region, true)
            .await
            .map(Option::unwrap_or_default)
    }
}
