use reqwest::{Client, Url};

use crate::{error::GatewayResult, model::CityWeather};

use super::{endpoint, read_body};

const COORDS_PATH: &str = "/api/meteo/coords";
const IP_PATH: &str = "/api/meteo/ip";

/// Client for the local backend that relays per-city weather.
#[derive(Debug, Clone)]
pub struct CityWeatherGateway {
    backend_url: String,
    http: Client,
}

impl CityWeatherGateway {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self::with_client(backend_url, Client::new())
    }

    pub fn with_client(backend_url: impl Into<String>, http: Client) -> Self {
        Self {
            backend_url: backend_url.into(),
            http,
        }
    }

    pub fn coords_endpoint(&self) -> GatewayResult<Url> {
        endpoint(&self.backend_url, COORDS_PATH)
    }

    pub fn ip_endpoint(&self) -> GatewayResult<Url> {
        endpoint(&self.backend_url, IP_PATH)
    }

    pub async fn fetch_by_coords(&self, lat: f64, lon: f64) -> GatewayResult<CityWeather> {
        let url = self.coords_endpoint()?;
        tracing::debug!(lat, lon, "requesting city weather");

        let res = self
            .http
            .get(url)
            .query(&[("lat", lat.to_string()), ("lon", lon.to_string())])
            .send()
            .await?;

        let body = read_body(res, "HTTP").await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Weather for wherever the backend geolocates the caller's IP.
    pub async fn fetch_by_ip(&self) -> GatewayResult<CityWeather> {
        let url = self.ip_endpoint()?;
        tracing::debug!("requesting weather by IP");

        let res = self.http.get(url).send().await?;
        let body = read_body(res, "Error:").await?;
        Ok(serde_json::from_str(&body)?)
    }
}
