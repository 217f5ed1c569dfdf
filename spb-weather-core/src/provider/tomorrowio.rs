use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::fmt;
use tracing::debug;

use crate::{
    ProviderError, WeatherRecord,
    provider::{LATITUDE, LONGITUDE, ProviderId, Reading, fetch_body, select_current},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.tomorrow.io/v4";
const FIELDS: &str =
    "temperature,cloudCover,humidity,precipitationProbability,windSpeed,windDirection";

#[derive(Clone)]
pub struct TomorrowioProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl TomorrowioProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the provider at a different host, e.g. a mock server.
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

impl fmt::Debug for TomorrowioProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TomorrowioProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TmForecastResponse {
    timelines: TmTimelines,
}

#[derive(Debug, Deserialize)]
struct TmTimelines {
    minutely: Vec<TmInterval>,
}

/// `values` stays raw until its interval is picked; other intervals may be incomplete.
#[derive(Debug, Deserialize)]
struct TmInterval {
    time: DateTime<Utc>,
    values: Option<Box<RawValue>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TmValues {
    temperature: f64,
    cloud_cover: Reading,
    humidity: Reading,
    precipitation_probability: Reading,
    wind_speed: Reading,
    wind_direction: Reading,
}

fn parse_error(e: serde_json::Error) -> ProviderError {
    ProviderError::Parse(format!("Unexpected Tomorrow.io forecast JSON: {e}"))
}

/// Turn a forecast body into the record for the minute of `now`.
fn normalize(body: &str, now: DateTime<Utc>) -> Result<WeatherRecord, ProviderError> {
    let parsed: TmForecastResponse = serde_json::from_str(body).map_err(parse_error)?;

    let entry = select_current(
        ProviderId::Tomorrowio,
        &parsed.timelines.minutely,
        now.minute(),
        |e| e.time.minute(),
    )?;
    let values = entry.values.as_deref().ok_or_else(|| {
        ProviderError::Parse(format!("Tomorrow.io interval {} has no values", entry.time))
    })?;
    let values: TmValues = serde_json::from_str(values.get()).map_err(parse_error)?;

    let mut record = WeatherRecord::new(values.temperature);
    record.cloudiness = Some(values.cloud_cover.to_text());
    record.humidity = Some(values.humidity.to_text());
    record.precipitation = Some(values.precipitation_probability.to_text());
    record.wind_speed = Some(values.wind_speed.to_text());
    record.wind_direction = Some(values.wind_direction.to_text());
    record.apply_defaults();

    Ok(record)
}

#[async_trait]
impl WeatherProvider for TomorrowioProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Tomorrowio
    }

    async fn fetch_current(&self) -> Result<WeatherRecord, ProviderError> {
        let url = format!("{}/weather/forecast", self.base_url);
        let location = format!("{LATITUDE},{LONGITUDE}");

        debug!(%url, "Requesting Tomorrow.io forecast");

        let request = self.http.get(&url).query(&[
            ("apikey", self.api_key.as_str()),
            ("location", location.as_str()),
            ("fields", FIELDS),
        ]);

        let body = fetch_body(ProviderId::Tomorrowio, request).await?;
        normalize(&body, Utc::now())
    }
}
