//! Tool result aggregation.
//!
//! Providers are dispatched concurrently and joined in registration order, so
//! the prompt never depends on which provider finished first. A provider that
//! fails is skipped; its error is reported alongside the results instead of
//! aborting the others.

use std::sync::{Arc, RwLock};

use futures::future::join_all;
use skychat_core::message::ChannelMessage;
use skychat_core::tool::{ToolProvider, ToolResult};
use tracing::{debug, warn};

/// A provider that failed during aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
}

/// Everything gathered for one message.
#[derive(Debug, Clone, Default)]
pub struct ToolAggregation {
    /// Results in provider registration order, then each provider's own order.
    pub results: Vec<ToolResult>,
    pub failures: Vec<ProviderFailure>,
}

/// Append-only registry of tool providers.
///
/// Reads take a snapshot of the registry, so a provider registered while a
/// request is in flight only takes part in later requests.
#[derive(Default)]
pub struct ToolResultAggregator {
    providers: RwLock<Vec<Arc<dyn ToolProvider>>>,
}

impl ToolResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_providers(providers: Vec<Arc<dyn ToolProvider>>) -> Self {
        Self {
            providers: RwLock::new(providers),
        }
    }

    /// Register an additional provider at runtime.
    pub fn register(&self, provider: Arc<dyn ToolProvider>) {
        debug!(provider = %provider.name(), "Registered tool provider");
        self.providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(provider);
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Arc<dyn ToolProvider>> {
        self.providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Gather results from every registered provider for `message`.
    ///
    /// With no providers registered nothing is invoked.
    pub async fn gather(&self, message: &ChannelMessage) -> ToolAggregation {
        let providers = self.snapshot();
        if providers.is_empty() {
            return ToolAggregation::default();
        }

        // join_all yields outputs in input order regardless of completion order.
        let outcomes = join_all(providers.iter().map(|provider| async move {
            (provider.name().to_string(), provider.gather(message).await)
        }))
        .await;

        let mut aggregation = ToolAggregation::default();
        for (provider, outcome) in outcomes {
            match outcome {
                Ok(results) => {
                    debug!(provider = %provider, count = results.len(), "Tool provider returned");
                    aggregation.results.extend(results);
                }
                Err(e) => {
                    warn!(provider = %provider, error = %e, "Tool provider failed, skipping");
                    aggregation.failures.push(ProviderFailure {
                        provider,
                        error: e.to_string(),
                    });
                }
            }
        }
        aggregation
    }
}
