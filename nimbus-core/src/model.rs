use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A position on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Normalized forecast fields submitted to the hail model.
///
/// Field names on the wire are the ones the model was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherFeatureRecord {
    #[serde(rename = "PRCP")]
    pub precipitation: f64,
    #[serde(rename = "SNWD")]
    pub snow_depth: f64,
    #[serde(rename = "TAVG")]
    pub temperature_avg: f64,
    #[serde(rename = "TMAX")]
    pub temperature_max: f64,
    #[serde(rename = "TMIN")]
    pub temperature_min: f64,
    #[serde(rename = "om_weather_code")]
    pub weather_code: i64,
    #[serde(rename = "om_rain_sum")]
    pub rain_sum: f64,
    #[serde(rename = "om_snowfall_sum")]
    pub snowfall_sum: f64,
    #[serde(rename = "om_precipitation_hours")]
    pub precipitation_hours: u32,
    #[serde(rename = "om_wind_gusts_10m_max")]
    pub wind_gusts_max: f64,
    #[serde(rename = "om_wind_direction_10m_dominant")]
    pub wind_direction_dominant: i64,
    #[serde(rename = "om_shortwave_radiation_sum")]
    pub shortwave_radiation_sum: f64,
    #[serde(rename = "om_et0_fao_evapotranspiration")]
    pub et0_evapotranspiration: f64,
    #[serde(rename = "om_dew_point_2m_mean")]
    pub dew_point_mean: f64,
    #[serde(rename = "om_relative_humidity_2m_mean")]
    pub relative_humidity_mean: f64,
    #[serde(rename = "om_pressure_msl_mean")]
    pub pressure_msl_mean: f64,
    #[serde(rename = "mes")]
    pub month: u32,
    #[serde(rename = "dia_del_año")]
    pub day_of_year: u32,
    #[serde(rename = "rango_temp_diario")]
    pub daily_temperature_range: f64,
}

impl WeatherFeatureRecord {
    /// Record used when the forecast API cannot be reached or returns
    /// something unusable. Only the calendar fields depend on `today`.
    pub fn fallback(today: NaiveDate) -> Self {
        Self {
            precipitation: 0.0,
            snow_depth: 0.0,
            temperature_avg: 15.0,
            temperature_max: 35.0,
            temperature_min: 10.0,
            weather_code: 0,
            rain_sum: 0.0,
            snowfall_sum: 0.0,
            precipitation_hours: 0,
            wind_gusts_max: 15.0,
            wind_direction_dominant: 180,
            shortwave_radiation_sum: 0.0,
            et0_evapotranspiration: 0.0,
            dew_point_mean: 8.0,
            relative_humidity_mean: 45.0,
            pressure_msl_mean: 1013.0,
            month: today.month(),
            day_of_year: today.ordinal(),
            daily_temperature_range: 25.0,
        }
    }
}

/// Body of the prediction request: the caller's position plus the record.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub record: WeatherFeatureRecord,
}

impl PredictionRequest {
    pub fn new(coords: Coordinates, record: WeatherFeatureRecord) -> Self {
        Self {
            latitude: coords.latitude,
            longitude: coords.longitude,
            record,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Hail probability in `[0, 1]`.
    pub probability: f64,
    pub advisory: Option<String>,
}

/// Outcome of a successful call to the prediction endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Available(PredictionResult),
    /// The endpoint answered but did not include a probability.
    Unavailable,
}

/// The `current_weather` block the local backend relays from Open-Meteo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: Option<f64>,
    pub windspeed: Option<f64>,
    pub winddirection: Option<f64>,
    pub weathercode: Option<i64>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WeatherEnvelope {
    current_weather: Option<CurrentWeather>,
}

/// Backend payload for a single city or for the caller's IP.
///
/// The backend nests `current_weather` under `weather`, but a bare
/// top-level `current_weather` is accepted as well.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityWeather {
    pub city: Option<String>,
    #[serde(default)]
    weather: Option<WeatherEnvelope>,
    #[serde(default)]
    current_weather: Option<CurrentWeather>,
}

impl CityWeather {
    pub fn current(&self) -> Option<&CurrentWeather> {
        self.weather
            .as_ref()
            .and_then(|w| w.current_weather.as_ref())
            .or(self.current_weather.as_ref())
    }

    /// Current weather with a usable temperature reading.
    pub fn current_with_temperature(&self) -> Option<&CurrentWeather> {
        self.current().filter(|c| c.temperature.is_some())
    }
}

/// A fixed city shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEntry {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl CityEntry {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_record_uses_model_field_names() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let value = serde_json::to_value(WeatherFeatureRecord::fallback(today)).unwrap();

        assert_eq!(value["PRCP"], 0.0);
        assert_eq!(value["om_pressure_msl_mean"], 1013.0);
        assert_eq!(value["om_wind_direction_10m_dominant"], 180);
        assert_eq!(value["mes"], 3);
        assert_eq!(value["dia_del_año"], 61);
        assert_eq!(value["rango_temp_diario"], 25.0);
    }

    #[test]
    fn prediction_request_flattens_record() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let req = PredictionRequest::new(
            Coordinates::new(-32.8908, -68.8272),
            WeatherFeatureRecord::fallback(today),
        );
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["latitude"], -32.8908);
        assert_eq!(value["TMAX"], 35.0);
        assert!(value.get("record").is_none());
    }

    #[test]
    fn city_weather_accepts_nested_and_flat_current() {
        let nested: CityWeather = serde_json::from_value(serde_json::json!({
            "weather": { "current_weather": { "temperature": 21.5 } }
        }))
        .unwrap();
        assert_eq!(nested.current().and_then(|c| c.temperature), Some(21.5));

        let flat: CityWeather = serde_json::from_value(serde_json::json!({
            "current_weather": { "temperature": 3.0, "weathercode": 71 }
        }))
        .unwrap();
        assert_eq!(flat.current().and_then(|c| c.weathercode), Some(71));

        let empty: CityWeather = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(empty.current().is_none());
    }
}
