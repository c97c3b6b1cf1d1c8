use chrono::{Datelike, Local, NaiveDate};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{GatewayError, GatewayResult},
    model::WeatherFeatureRecord,
};

use super::read_body;

const HOURLY_FIELDS: &str = "temperature_2m,relativehumidity_2m,precipitation,weathercode,\
windgusts_10m,winddirection_10m,snowfall,snow_depth,shortwave_radiation,\
et0_fao_evapotranspiration,dewpoint_2m,pressure_msl";

const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_sum,snowfall_sum,shortwave_radiation_sum";

const DEFAULT_TAVG: f64 = 15.0;
const DEFAULT_PRESSURE_HPA: f64 = 1013.0;

/// Client for the public Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct WeatherGateway {
    forecast_url: String,
    http: Client,
}

impl WeatherGateway {
    pub fn new(forecast_url: impl Into<String>) -> Self {
        Self::with_client(forecast_url, Client::new())
    }

    pub fn with_client(forecast_url: impl Into<String>, http: Client) -> Self {
        Self {
            forecast_url: forecast_url.into(),
            http,
        }
    }

    /// Fetch today's forecast and normalize it into a feature record.
    ///
    /// Never fails: any transport, status or shape problem yields
    /// [`WeatherFeatureRecord::fallback`] as a whole.
    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> WeatherFeatureRecord {
        let today = Local::now().date_naive();

        match self.try_fetch(lat, lon, today).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, lat, lon, "forecast unavailable, using fallback record");
                WeatherFeatureRecord::fallback(today)
            }
        }
    }

    async fn try_fetch(
        &self,
        lat: f64,
        lon: f64,
        today: NaiveDate,
    ) -> GatewayResult<WeatherFeatureRecord> {
        tracing::debug!(lat, lon, "requesting forecast");

        let res = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", lat.to_string().as_str()),
                ("longitude", lon.to_string().as_str()),
                ("current_weather", "true"),
                ("hourly", HOURLY_FIELDS),
                ("daily", DAILY_FIELDS),
                ("timezone", "auto"),
            ])
            .send()
            .await?;

        let body = read_body(res, "HTTP").await?;
        let parsed: ForecastResponse = serde_json::from_str(&body)?;

        build_feature_record(&parsed, today)
    }
}

type Series = Option<Vec<Option<f64>>>;

/// Raw Open-Meteo forecast payload, limited to the fields we read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    current_weather: Option<OmCurrentWeather>,
    hourly: Option<OmHourly>,
    daily: Option<OmDaily>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OmCurrentWeather {
    temperature: Option<f64>,
    weathercode: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OmHourly {
    precipitation: Series,
    snow_depth: Series,
    windgusts_10m: Series,
    winddirection_10m: Series,
    et0_fao_evapotranspiration: Series,
    dewpoint_2m: Series,
    relativehumidity_2m: Series,
    pressure_msl: Series,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OmDaily {
    temperature_2m_max: Series,
    temperature_2m_min: Series,
    precipitation_sum: Series,
    snowfall_sum: Series,
    shortwave_radiation_sum: Series,
}

fn series<'a>(values: &'a Series, name: &'static str) -> GatewayResult<&'a [Option<f64>]> {
    values.as_deref().ok_or(GatewayError::Malformed(name))
}

fn first(values: &[Option<f64>]) -> Option<f64> {
    values.first().copied().flatten()
}

/// Normalize a forecast payload. `today` supplies the calendar fields.
pub fn build_feature_record(
    raw: &ForecastResponse,
    today: NaiveDate,
) -> GatewayResult<WeatherFeatureRecord> {
    let current = raw
        .current_weather
        .as_ref()
        .ok_or(GatewayError::Malformed("current_weather"))?;
    let hourly = raw.hourly.as_ref().ok_or(GatewayError::Malformed("hourly"))?;
    let daily = raw.daily.as_ref().ok_or(GatewayError::Malformed("daily"))?;

    let temperature_max = first(series(&daily.temperature_2m_max, "temperature_2m_max")?)
        .ok_or(GatewayError::Malformed("temperature_2m_max"))?;
    let temperature_min = first(series(&daily.temperature_2m_min, "temperature_2m_min")?)
        .ok_or(GatewayError::Malformed("temperature_2m_min"))?;

    let precipitation = series(&hourly.precipitation, "precipitation")?;
    let wind_direction_dominant =
        dominant_wind_direction(series(&hourly.winddirection_10m, "winddirection_10m")?)
            .ok_or(GatewayError::Malformed("winddirection_10m"))?;

    Ok(WeatherFeatureRecord {
        precipitation: first(precipitation).unwrap_or(0.0),
        snow_depth: first(series(&hourly.snow_depth, "snow_depth")?).unwrap_or(0.0),
        temperature_avg: current.temperature.unwrap_or(DEFAULT_TAVG),
        temperature_max,
        temperature_min,
        weather_code: current.weathercode.map(|c| c as i64).unwrap_or(0),
        rain_sum: first(series(&daily.precipitation_sum, "precipitation_sum")?).unwrap_or(0.0),
        snowfall_sum: first(series(&daily.snowfall_sum, "snowfall_sum")?).unwrap_or(0.0),
        precipitation_hours: precipitation_hours(precipitation),
        wind_gusts_max: first(series(&hourly.windgusts_10m, "windgusts_10m")?).unwrap_or(0.0),
        wind_direction_dominant,
        shortwave_radiation_sum: first(series(
            &daily.shortwave_radiation_sum,
            "shortwave_radiation_sum",
        )?)
        .unwrap_or(0.0),
        et0_evapotranspiration: first(series(
            &hourly.et0_fao_evapotranspiration,
            "et0_fao_evapotranspiration",
        )?)
        .unwrap_or(0.0),
        dew_point_mean: first(series(&hourly.dewpoint_2m, "dewpoint_2m")?).unwrap_or(0.0),
        relative_humidity_mean: first(series(&hourly.relativehumidity_2m, "relativehumidity_2m")?)
            .unwrap_or(0.0),
        pressure_msl_mean: first(series(&hourly.pressure_msl, "pressure_msl")?)
            .unwrap_or(DEFAULT_PRESSURE_HPA),
        month: today.month(),
        day_of_year: today.ordinal(),
        daily_temperature_range: temperature_max - temperature_min,
    })
}

/// Number of hourly samples with measurable precipitation.
pub fn precipitation_hours(samples: &[Option<f64>]) -> u32 {
    samples.iter().flatten().filter(|&&v| v > 0.0).count() as u32
}

/// Most frequent wind direction, truncated to whole degrees.
///
/// Ties go to the direction seen first. Missing samples are skipped;
/// `None` when there is nothing to count.
pub fn dominant_wind_direction(samples: &[Option<f64>]) -> Option<i64> {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for &dir in samples.iter().flatten() {
        match counts.iter_mut().find(|(seen, _)| *seen == dir) {
            Some((_, n)) => *n += 1,
            None => counts.push((dir, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None::<(f64, usize)>, |best, (dir, n)| match best {
            Some((_, max)) if n <= max => best,
            _ => Some((dir, n)),
        })
        .map(|(dir, _)| dir.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 20).unwrap()
    }

    fn sample_payload() -> serde_json::Value {
        json!({
            "current_weather": { "temperature": 27.4, "weathercode": 95, "windspeed": 12.0 },
            "hourly": {
                "precipitation": [0.0, 0.1, 0.0, 2.0, 0.0],
                "snow_depth": [0.0, 0.0, 0.0, 0.0, 0.0],
                "windgusts_10m": [31.0, 40.0, 22.0, 18.0, 10.0],
                "winddirection_10m": [200, 210, 210, 200, 90],
                "et0_fao_evapotranspiration": [0.12, 0.3, 0.4, 0.2, 0.1],
                "dewpoint_2m": [9.5, 9.0, 8.0, 8.2, 7.9],
                "relativehumidity_2m": [38, 40, 41, 45, 50],
                "pressure_msl": [1008.2, 1008.0, 1007.5, 1007.0, 1006.9]
            },
            "daily": {
                "temperature_2m_max": [33.1],
                "temperature_2m_min": [17.6],
                "precipitation_sum": [2.1],
                "snowfall_sum": [0.0],
                "shortwave_radiation_sum": [27.9]
            }
        })
    }

    fn parse(value: serde_json::Value) -> ForecastResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn precipitation_hours_counts_positive_samples() {
        let samples = [Some(0.0), Some(0.1), Some(0.0), Some(2.0), Some(0.0)];
        assert_eq!(precipitation_hours(&samples), 2);
        assert_eq!(precipitation_hours(&[]), 0);
        assert_eq!(precipitation_hours(&[None, Some(0.4)]), 1);
    }

    #[test]
    fn dominant_direction_picks_most_frequent() {
        let samples = [Some(10.0), Some(10.0), Some(20.0)];
        assert_eq!(dominant_wind_direction(&samples), Some(10));
    }

    #[test]
    fn dominant_direction_tie_goes_to_first_seen() {
        assert_eq!(dominant_wind_direction(&[Some(10.0), Some(20.0)]), Some(10));
        assert_eq!(dominant_wind_direction(&[Some(20.0), Some(10.0)]), Some(20));
        assert_eq!(
            dominant_wind_direction(&[Some(5.0), Some(7.0), Some(7.0), Some(5.0)]),
            Some(5)
        );
    }

    #[test]
    fn dominant_direction_skips_missing_samples() {
        assert_eq!(dominant_wind_direction(&[None, None, Some(90.0)]), Some(90));
        assert_eq!(dominant_wind_direction(&[None]), None);
        assert_eq!(dominant_wind_direction(&[]), None);
    }

    #[test]
    fn builds_record_from_first_samples() {
        let record = build_feature_record(&parse(sample_payload()), today()).unwrap();

        assert_eq!(record.precipitation, 0.0);
        assert_eq!(record.temperature_avg, 27.4);
        assert_eq!(record.weather_code, 95);
        assert_eq!(record.precipitation_hours, 2);
        assert_eq!(record.wind_gusts_max, 31.0);
        assert_eq!(record.wind_direction_dominant, 200);
        assert_eq!(record.dew_point_mean, 9.5);
        assert_eq!(record.relative_humidity_mean, 38.0);
        assert_eq!(record.pressure_msl_mean, 1008.2);
        assert_eq!(record.rain_sum, 2.1);
        assert_eq!(record.shortwave_radiation_sum, 27.9);
        assert_eq!(record.month, 11);
        assert_eq!(record.day_of_year, 325);
        assert!((record.daily_temperature_range - 15.5).abs() < 1e-9);
    }

    #[test]
    fn missing_samples_use_field_defaults() {
        let mut payload = sample_payload();
        payload["current_weather"] = json!({});
        payload["hourly"]["pressure_msl"] = json!([null]);
        payload["hourly"]["dewpoint_2m"] = json!([]);
        payload["daily"]["snowfall_sum"] = json!([null]);

        let record = build_feature_record(&parse(payload), today()).unwrap();

        assert_eq!(record.temperature_avg, 15.0);
        assert_eq!(record.weather_code, 0);
        assert_eq!(record.pressure_msl_mean, 1013.0);
        assert_eq!(record.dew_point_mean, 0.0);
        assert_eq!(record.snowfall_sum, 0.0);
    }

    #[test]
    fn zero_readings_are_kept() {
        let mut payload = sample_payload();
        payload["current_weather"] = json!({ "temperature": 0.0, "weathercode": 0 });
        payload["hourly"]["pressure_msl"] = json!([0.0, 1008.0]);
        payload["hourly"]["windgusts_10m"] = json!([0.0]);

        let record = build_feature_record(&parse(payload), today()).unwrap();

        assert_eq!(record.temperature_avg, 0.0);
        assert_eq!(record.weather_code, 0);
        assert_eq!(record.pressure_msl_mean, 0.0);
        assert_eq!(record.wind_gusts_max, 0.0);
    }

    #[test]
    fn structural_gaps_are_malformed() {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("daily");
        let err = build_feature_record(&parse(payload), today()).unwrap_err();
        assert!(matches!(err, GatewayError::Malformed("daily")));

        let mut payload = sample_payload();
        payload["hourly"].as_object_mut().unwrap().remove("snow_depth");
        let err = build_feature_record(&parse(payload), today()).unwrap_err();
        assert!(matches!(err, GatewayError::Malformed("snow_depth")));

        let mut payload = sample_payload();
        payload["daily"]["temperature_2m_max"] = json!([]);
        let err = build_feature_record(&parse(payload), today()).unwrap_err();
        assert!(matches!(err, GatewayError::Malformed("temperature_2m_max")));
    }

    #[tokio::test]
    async fn fetch_forecast_sends_query_and_normalizes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "-32.8908"))
            .and(query_param("longitude", "-68.8272"))
            .and(query_param("current_weather", "true"))
            .and(query_param("timezone", "auto"))
            .and(query_param("hourly", HOURLY_FIELDS))
            .and(query_param("daily", DAILY_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_payload()))
            .mount(&mock_server)
            .await;

        let gateway = WeatherGateway::new(format!("{}/v1/forecast", mock_server.uri()));
        let record = gateway.fetch_forecast(-32.8908, -68.8272).await;

        assert_eq!(record.weather_code, 95);
        assert_eq!(record.precipitation_hours, 2);
    }

    #[tokio::test]
    async fn fetch_forecast_falls_back_on_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let gateway = WeatherGateway::new(format!("{}/v1/forecast", mock_server.uri()));
        let record = gateway.fetch_forecast(0.0, 0.0).await;
        let expected = WeatherFeatureRecord::fallback(Local::now().date_naive());

        assert_eq!(record.temperature_max, expected.temperature_max);
        assert_eq!(record.wind_direction_dominant, 180);
        assert_eq!(record.daily_temperature_range, 25.0);
        assert_eq!(record.relative_humidity_mean, 45.0);
    }

    #[tokio::test]
    async fn fetch_forecast_falls_back_on_garbage_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let gateway = WeatherGateway::new(mock_server.uri());
        let record = gateway.fetch_forecast(0.0, 0.0).await;

        assert_eq!(record.temperature_max, 35.0);
        assert_eq!(record.temperature_min, 10.0);
    }
}
