use crate::{
    Config, ProviderError, WeatherRecord,
    provider::{stormglass::StormglassProvider, tomorrowio::TomorrowioProvider},
};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::fmt::Debug;
use tracing::warn;

pub mod stormglass;
pub mod tomorrowio;

/// Central Saint Petersburg.
pub const LATITUDE: &str = "59.9343";
pub const LONGITUDE: &str = "30.3351";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Tomorrowio,
    Stormglass,
}

impl ProviderId {
    /// Key used in the aggregated response.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Tomorrowio => "tomorrowio",
            ProviderId::Stormglass => "stormglass",
        }
    }

    /// Prefix used when a failure is reported to clients. The Tomorrow.io
    /// spelling is what existing clients match on.
    pub fn error_label(&self) -> &'static str {
        match self {
            ProviderId::Tomorrowio => "Tommorowio",
            ProviderId::Stormglass => "Stormglass",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Tomorrowio => "Tomorrow.io",
            ProviderId::Stormglass => "Stormglass",
        }
    }

    /// All providers, in the order they are queried.
    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Tomorrowio, ProviderId::Stormglass]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Fetch the reading closest to the current UTC time, fully defaulted.
    async fn fetch_current(&self) -> Result<WeatherRecord, ProviderError>;
}

/// Construct a provider for `id` using the key stored in `config`.
pub fn provider_from_config(id: ProviderId, config: &Config) -> Box<dyn WeatherProvider> {
    let api_key = config.provider_api_key(id).to_owned();

    match id {
        ProviderId::Tomorrowio => Box::new(TomorrowioProvider::new(api_key)),
        ProviderId::Stormglass => Box::new(StormglassProvider::new(api_key)),
    }
}

/// A provider value kept exactly as its JSON text (`50`, `91.20`, `null`, `"calm"`).
///
/// The field itself must be present: a missing key is a parse error.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub(crate) struct Reading(Box<RawValue>);

impl Reading {
    pub(crate) fn to_text(&self) -> String {
        self.0.get().to_owned()
    }
}

/// Pick the first entry whose time bucket (minute or hour) equals `target`,
/// falling back to the first entry.
pub(crate) fn select_current<T, F>(
    provider: ProviderId,
    entries: &[T],
    target: u32,
    bucket: F,
) -> Result<&T, ProviderError>
where
    F: Fn(&T) -> u32,
{
    if let Some(entry) = entries.iter().find(|e| bucket(*e) == target) {
        return Ok(entry);
    }

    let first = entries.first().ok_or_else(|| {
        ProviderError::Parse(format!("{} response contained no data", provider.display_name()))
    })?;

    warn!(%provider, target, "No entry matches the current time, using the first one");
    Ok(first)
}

/// Send `request` and return the body of a successful response.
pub(crate) async fn fetch_body(
    provider: ProviderId,
    request: RequestBuilder,
) -> Result<String, ProviderError> {
    let name = provider.display_name();

    let res = request
        .send()
        .await
        .map_err(|e| ProviderError::Upstream(format!("Failed to send request to {name}: {e}")))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| ProviderError::Upstream(format!("Failed to read {name} response body: {e}")))?;

    if !status.is_success() {
        return Err(ProviderError::Upstream(format!(
            "{name} request failed with status {status}: {}",
            truncate_body(&body),
        )));
    }

    Ok(body)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        value: Reading,
    }

    #[test]
    fn provider_ids_in_query_order() {
        let keys: Vec<_> = ProviderId::all().iter().map(|id| id.as_str()).collect();
        assert_eq!(keys, vec!["tomorrowio", "stormglass"]);
        assert_eq!(ProviderId::Tomorrowio.to_string(), "tomorrowio");
    }

    #[test]
    fn provider_from_config_uses_matching_key() {
        let cfg = Config {
            tomorrowio_api_key: "T".into(),
            stormglass_api_key: "S".into(),
        };

        for id in ProviderId::all() {
            assert_eq!(provider_from_config(*id, &cfg).id(), *id);
        }
    }

    #[test]
    fn reading_keeps_raw_json_text() {
        let text = |body: &str| serde_json::from_str::<Holder>(body).unwrap().value.to_text();

        assert_eq!(text(r#"{"value": 50}"#), "50");
        assert_eq!(text(r#"{"value": 91.20}"#), "91.20");
        assert_eq!(text(r#"{"value": 1e2}"#), "1e2");
        assert_eq!(text(r#"{"value": "calm"}"#), "\"calm\"");
        assert_eq!(text(r#"{"value": null}"#), "null");
    }

    #[test]
    fn reading_absent_key_is_error() {
        let err = serde_json::from_str::<Holder>("{}").unwrap_err();
        assert!(err.to_string().contains("missing field `value`"));
    }

    #[test]
    fn select_current_prefers_match_then_first() {
        let entries = [10u32, 20, 30, 20];

        let hit = select_current(ProviderId::Tomorrowio, &entries, 20, |e| *e).unwrap();
        assert!(std::ptr::eq(hit, &entries[1]));

        let miss = select_current(ProviderId::Tomorrowio, &entries, 45, |e| *e).unwrap();
        assert!(std::ptr::eq(miss, &entries[0]));
    }

    #[test]
    fn select_current_errors_on_empty() {
        let entries: [u32; 0] = [];
        let err = select_current(ProviderId::Stormglass, &entries, 3, |e| *e).unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let short = "short body";
        assert_eq!(truncate_body(short), short);

        let long = "ж".repeat(150);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 203);
    }
}
