use tracing::{error, info};

use crate::{
    AggregateError, AggregatedWeather, Config, WeatherRecord,
    provider::{ProviderId, WeatherProvider, provider_from_config},
};

/// Queries Tomorrow.io and then Stormglass, one after the other.
///
/// Any provider failure aborts the whole operation; there are no partial results.
#[derive(Debug)]
pub struct Aggregator {
    tomorrowio: Box<dyn WeatherProvider>,
    stormglass: Box<dyn WeatherProvider>,
}

impl Aggregator {
    pub fn new(tomorrowio: Box<dyn WeatherProvider>, stormglass: Box<dyn WeatherProvider>) -> Self {
        Self {
            tomorrowio,
            stormglass,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            provider_from_config(ProviderId::Tomorrowio, config),
            provider_from_config(ProviderId::Stormglass, config),
        )
    }

    pub async fn aggregate(&self) -> Result<AggregatedWeather, AggregateError> {
        let tomorrowio = fetch_from(self.tomorrowio.as_ref(), ProviderId::Tomorrowio).await?;
        let stormglass = fetch_from(self.stormglass.as_ref(), ProviderId::Stormglass).await?;

        Ok(AggregatedWeather {
            tomorrowio,
            stormglass,
        })
    }
}

async fn fetch_from(
    provider: &dyn WeatherProvider,
    slot: ProviderId,
) -> Result<WeatherRecord, AggregateError> {
    match provider.fetch_current().await {
        Ok(record) => {
            info!(
                provider = %slot,
                temperature_c = record.temperature_celsius,
                "Fetched current weather"
            );
            Ok(record)
        }
        Err(source) => {
            error!(provider = %slot, error = %source, "Provider call failed");
            Err(AggregateError {
                provider: slot,
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderError;
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    /// Returns a fixed temperature, or fails, and logs its call order.
    #[derive(Debug)]
    struct FakeProvider {
        id: ProviderId,
        temperature: Option<f64>,
        log: Arc<CallLog>,
    }

    #[derive(Debug, Default)]
    struct CallLog {
        next: AtomicUsize,
        tomorrowio_at: AtomicUsize,
        stormglass_at: AtomicUsize,
    }

    impl CallLog {
        fn slot(&self, id: ProviderId) -> &AtomicUsize {
            match id {
                ProviderId::Tomorrowio => &self.tomorrowio_at,
                ProviderId::Stormglass => &self.stormglass_at,
            }
        }

        /// 0 means never called, otherwise the 1-based call position.
        fn position(&self, id: ProviderId) -> usize {
            self.slot(id).load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn fetch_current(&self) -> Result<WeatherRecord, ProviderError> {
            let position = self.log.next.fetch_add(1, Ordering::SeqCst) + 1;
            self.log.slot(self.id).store(position, Ordering::SeqCst);

            match self.temperature {
                Some(t) => {
                    let mut record = WeatherRecord::new(t);
                    record.apply_defaults();
                    Ok(record)
                }
                None => Err(ProviderError::Upstream("boom".into())),
            }
        }
    }

    fn aggregator(tomorrowio: Option<f64>, stormglass: Option<f64>) -> (Aggregator, Arc<CallLog>) {
        let log = Arc::new(CallLog::default());
        let fake = |id, temperature| -> Box<dyn WeatherProvider> {
            Box::new(FakeProvider {
                id,
                temperature,
                log: Arc::clone(&log),
            })
        };
        let agg = Aggregator::new(
            fake(ProviderId::Tomorrowio, tomorrowio),
            fake(ProviderId::Stormglass, stormglass),
        );
        (agg, log)
    }

    #[tokio::test]
    async fn calls_tomorrowio_then_stormglass() {
        let (agg, log) = aggregator(Some(1.0), Some(2.0));

        let result = agg.aggregate().await.unwrap();

        assert_eq!(result.tomorrowio.temperature_celsius, 1.0);
        assert_eq!(result.stormglass.temperature_celsius, 2.0);
        assert_eq!(log.position(ProviderId::Tomorrowio), 1);
        assert_eq!(log.position(ProviderId::Stormglass), 2);
    }

    #[tokio::test]
    async fn tomorrowio_failure_skips_stormglass() {
        let (agg, log) = aggregator(None, Some(2.0));

        let err = agg.aggregate().await.unwrap_err();

        assert_eq!(err.provider, ProviderId::Tomorrowio);
        assert!(err.to_string().starts_with("Tommorowio error:"));
        assert_eq!(log.position(ProviderId::Stormglass), 0);
    }

    #[tokio::test]
    async fn stormglass_failure_discards_tomorrowio_result() {
        let (agg, log) = aggregator(Some(1.0), None);

        let err = agg.aggregate().await.unwrap_err();

        assert_eq!(err.provider, ProviderId::Stormglass);
        assert_eq!(
            err.to_string(),
            "Stormglass error: Failed to retrieve weather data: boom"
        );
        assert_eq!(log.position(ProviderId::Tomorrowio), 1);
    }

    #[test]
    fn from_config_wires_both_providers() {
        let agg = Aggregator::from_config(&Config::default());

        assert_eq!(agg.tomorrowio.id(), ProviderId::Tomorrowio);
        assert_eq!(agg.stormglass.id(), ProviderId::Stormglass);
    }
}
