//! Core library for the Saint Petersburg weather service.
//!
//! This crate defines:
//! - Provider credentials (`Config`)
//! - The `WeatherProvider` abstraction and the Tomorrow.io / Stormglass adapters
//! - The normalized `WeatherRecord` and the `Aggregator` that combines both providers
//!
//! It is used by `spb-weather-server`, but has no HTTP-server dependencies of its own.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use aggregator::Aggregator;
pub use config::Config;
pub use error::{AggregateError, ProviderError};
pub use model::{AggregatedWeather, NO_DATA, WeatherRecord};
pub use provider::{ProviderId, WeatherProvider};
