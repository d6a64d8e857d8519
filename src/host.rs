//! Host integration
//!
//! The configuration host asks a [`VariableSource`] for every `${...}`
//! variable it meets. [`AwsVariableSource`] answers the `aws:` ones and hands
//! everything else to the source it wraps.

use crate::aws::DescribeApi;
use crate::resolver::{is_aws_reference, Resolver};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::Value;

/// Something that can produce a value for a configuration variable
#[async_trait]
pub trait VariableSource: Send + Sync {
    /// `Ok(None)` leaves the variable unset for the host to handle
    async fn get_value(&self, variable: &str) -> Result<Option<Value>>;
}

/// Host-level settings relevant to AWS references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    /// The provider region of the deployment
    pub region: Option<String>,
    /// `awsResolvers.strict`, true unless the host says otherwise
    pub strict: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            region: None,
            strict: true,
        }
    }
}

/// Variable source that resolves `aws:` references and delegates the rest
pub struct AwsVariableSource<A, D> {
    resolver: Resolver<A>,
    delegate: D,
    settings: HostSettings,
}

impl<A: DescribeApi, D: VariableSource> AwsVariableSource<A, D> {
    pub fn new(resolver: Resolver<A>, delegate: D, settings: HostSettings) -> Self {
        Self {
            resolver,
            delegate,
            settings,
        }
    }

    pub fn settings(&self) -> &HostSettings {
        &self.settings
    }

    /// Resolve many variables concurrently; the first hard error aborts the pass
    pub async fn get_values(&self, variables: &[&str]) -> Result<Vec<Option<Value>>> {
        try_join_all(variables.iter().map(|v| self.get_value(v))).await
    }
}

#[async_trait]
impl<A: DescribeApi, D: VariableSource> VariableSource for AwsVariableSource<A, D> {
    async fn get_value(&self, variable: &str) -> Result<Option<Value>> {
        if !is_aws_reference(variable) {
            return self.delegate.get_value(variable).await;
        }

        let region = self
            .settings
            .region
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| anyhow!("Cannot hydrate AWS variables without a region"))?;

        self.resolver
            .resolve(variable, Some(region), self.settings.strict)
            .await
            .with_context(|| format!("Failed to resolve variable {}", variable))
    }
}
