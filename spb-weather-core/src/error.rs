use thiserror::Error;

use crate::provider::ProviderId;

/// Failure of a single provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure or non-success status from the upstream API.
    #[error("Failed to retrieve weather data: {0}")]
    Upstream(String),

    /// The response body did not have the expected structure.
    #[error("Failed to parse weather data: {0}")]
    Parse(String),
}

/// A provider failure tagged with the provider that caused it.
///
/// Displays as e.g. `Tommorowio error: Failed to retrieve weather data: ...`.
#[derive(Debug, Error)]
#[error("{} error: {source}", .provider.error_label())]
pub struct AggregateError {
    pub provider: ProviderId,
    #[source]
    pub source: ProviderError,
}
