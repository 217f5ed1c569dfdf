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

const DEFAULT_BASE_URL: &str = "https://api.stormglass.io/v2";
const PARAMS: &str = "airTemperature,cloudCover,humidity,gust,windWaveDirection";

#[derive(Clone)]
pub struct StormglassProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl StormglassProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

impl fmt::Debug for StormglassProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StormglassProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Hours stay raw until one is picked: sources cover different forecast
/// ranges, so later hours may lack some of them.
#[derive(Debug, Deserialize)]
struct SgPointResponse {
    hours: Vec<Box<RawValue>>,
}

#[derive(Debug, Deserialize)]
struct SgTime {
    time: DateTime<Utc>,
}

/// Each parameter is an object keyed by data source (`noaa`, `dwd`, `sg`, ...).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SgHour {
    air_temperature: SgNoaa<f64>,
    cloud_cover: SgNoaa<Reading>,
    humidity: SgNoaa<Reading>,
    gust: SgNoaa<Reading>,
    wind_wave_direction: SgDwd,
}

#[derive(Debug, Deserialize)]
struct SgNoaa<T> {
    noaa: T,
}

#[derive(Debug, Deserialize)]
struct SgDwd {
    dwd: Reading,
}

fn parse_error(e: serde_json::Error) -> ProviderError {
    ProviderError::Parse(format!("Unexpected Stormglass point JSON: {e}"))
}

/// Turn a point body into the record for the hour of `now`.
///
/// Wind fields are crossed over: `windWaveDirection` lands in `wind_speed` and
/// `gust` in `wind_direction`. Clients depend on this mapping.
fn normalize(body: &str, now: DateTime<Utc>) -> Result<WeatherRecord, ProviderError> {
    let parsed: SgPointResponse = serde_json::from_str(body).map_err(parse_error)?;

    let stamped = parsed
        .hours
        .iter()
        .map(|raw| -> Result<_, serde_json::Error> {
            let stamp: SgTime = serde_json::from_str(raw.get())?;
            Ok((stamp.time, raw.get()))
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()
        .map_err(parse_error)?;

    let (_, raw) =
        select_current(ProviderId::Stormglass, &stamped, now.hour(), |entry| entry.0.hour())?;
    let hour: SgHour = serde_json::from_str(raw).map_err(parse_error)?;

    let mut record = WeatherRecord::new(hour.air_temperature.noaa);
    record.cloudiness = Some(hour.cloud_cover.noaa.to_text());
    record.humidity = Some(hour.humidity.noaa.to_text());
    record.wind_speed = Some(hour.wind_wave_direction.dwd.to_text());
    record.wind_direction = Some(hour.gust.noaa.to_text());
    record.apply_defaults();

    Ok(record)
}

#[async_trait]
impl WeatherProvider for StormglassProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Stormglass
    }

    async fn fetch_current(&self) -> Result<WeatherRecord, ProviderError> {
        let url = format!("{}/weather/point", self.base_url);

        debug!(%url, "Requesting Stormglass point forecast");

        let request = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.api_key.as_str())
            .query(&[("lat", LATITUDE), ("lng", LONGITUDE), ("params", PARAMS)]);

        let body = fetch_body(ProviderId::Stormglass, request).await?;
        normalize(&body, Utc::now())
    }
}
