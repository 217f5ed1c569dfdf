use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::provider::ProviderId;

/// Placeholder shown to clients for any reading the provider did not supply.
pub const NO_DATA: &str = "Данных нет";

/// One normalized observation, independent of which provider produced it.
///
/// Text readings keep the provider's exact JSON text (`"50"`, `"3.50"`), with
/// no unit conversion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherRecord {
    pub temperature_celsius: f64,
    pub cloudiness: Option<String>,
    pub humidity: Option<String>,
    pub precipitation: Option<String>,
    pub wind_direction: Option<String>,
    pub wind_speed: Option<String>,
}

impl WeatherRecord {
    pub fn new(temperature_celsius: f64) -> Self {
        Self {
            temperature_celsius,
            ..Self::default()
        }
    }

    /// Derived Fahrenheit reading: `32 + trunc(C / 0.5566)`, rounding toward zero.
    ///
    /// This is not the canonical `C * 9/5 + 32`. Existing clients compare against
    /// this exact value, so it must stay as written.
    pub fn temperature_fahrenheit(&self) -> f64 {
        32.0 + (self.temperature_celsius / 0.5566).trunc()
    }

    /// Fill every missing text reading with [`NO_DATA`]. Present values are left alone.
    pub fn apply_defaults(&mut self) {
        for field in [
            &mut self.cloudiness,
            &mut self.humidity,
            &mut self.precipitation,
            &mut self.wind_direction,
            &mut self.wind_speed,
        ] {
            field.get_or_insert_with(|| NO_DATA.to_string());
        }
    }
}

impl Serialize for WeatherRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = |field: &Option<String>| field.as_deref().unwrap_or(NO_DATA).to_owned();

        let mut s = serializer.serialize_struct("WeatherRecord", 7)?;
        s.serialize_field("temperatureCelsius", &self.temperature_celsius)?;
        s.serialize_field("temperatureFahrenheit", &self.temperature_fahrenheit())?;
        s.serialize_field("cloudiness", &text(&self.cloudiness))?;
        s.serialize_field("humidity", &text(&self.humidity))?;
        s.serialize_field("precipitation", &text(&self.precipitation))?;
        s.serialize_field("windDirection", &text(&self.wind_direction))?;
        s.serialize_field("windSpeed", &text(&self.wind_speed))?;
        s.end()
    }
}

/// Both providers' readings for the same moment, serialized as
/// `{"tomorrowio": …, "stormglass": …}` in that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedWeather {
    pub tomorrowio: WeatherRecord,
    pub stormglass: WeatherRecord,
}

impl AggregatedWeather {
    pub fn get(&self, id: ProviderId) -> &WeatherRecord {
        match id {
            ProviderId::Tomorrowio => &self.tomorrowio,
            ProviderId::Stormglass => &self.stormglass,
        }
    }

    /// Entries in output order.
    pub fn iter(&self) -> impl Iterator<Item = (ProviderId, &WeatherRecord)> {
        ProviderId::all().iter().map(move |id| (*id, self.get(*id)))
    }
}
