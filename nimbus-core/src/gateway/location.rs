use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

use crate::{Config, model::Coordinates};

use super::CityWeatherGateway;

/// Shown when the backend cannot tell where the caller is.
pub const UNKNOWN_LOCATION: &str = "Ubicación desconocida";

/// Knobs passed to a geolocation source.
///
/// Only `timeout` is enforced, by [`LocationResolver`]. Sources that have
/// no notion of accuracy or cached fixes ignore the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix a source may hand back.
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: false,
            timeout: Duration::from_secs(5),
            maximum_age: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported")]
    Unsupported,
    #[error("User denied geolocation")]
    PermissionDenied,
    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait GeolocationSource: Send + Sync + Debug {
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<Coordinates, GeolocationError>;
}

/// No geolocation support at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationSource for NoGeolocation {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// A position known ahead of time (configuration or command line).
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl GeolocationSource for FixedPosition {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// Pick the geolocation source the config asks for.
pub fn geolocation_from_config(config: &Config) -> Box<dyn GeolocationSource> {
    match config.position {
        Some(coords) => Box::new(FixedPosition(coords)),
        None => Box::new(NoGeolocation),
    }
}

/// Works out where the user is. Both lookups degrade to a fixed value
/// instead of failing.
#[derive(Debug)]
pub struct LocationResolver {
    source: Box<dyn GeolocationSource>,
    options: GeolocationOptions,
    fallback: Coordinates,
    backend: CityWeatherGateway,
}

impl LocationResolver {
    pub fn new(
        source: Box<dyn GeolocationSource>,
        options: GeolocationOptions,
        fallback: Coordinates,
        backend: CityWeatherGateway,
    ) -> Self {
        Self {
            source,
            options,
            fallback,
            backend,
        }
    }

    pub fn from_config(config: &Config, backend: CityWeatherGateway) -> Self {
        let options = GeolocationOptions {
            timeout: config.geolocation_timeout(),
            ..GeolocationOptions::default()
        };

        Self::new(
            geolocation_from_config(config),
            options,
            config.fallback,
            backend,
        )
    }

    /// Current position, or the fallback if the source fails or takes
    /// longer than the configured timeout.
    pub async fn get_coordinates(&self) -> Coordinates {
        let lookup = self.source.current_position(&self.options);

        match tokio::time::timeout(self.options.timeout, lookup).await {
            Ok(Ok(coords)) => coords,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "geolocation failed, using fallback position");
                self.fallback
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.options.timeout.as_millis() as u64,
                    "geolocation timed out, using fallback position"
                );
                self.fallback
            }
        }
    }

    /// City name for the caller's IP, or [`UNKNOWN_LOCATION`].
    pub async fn get_city_name(&self) -> String {
        match self.backend.fetch_by_ip().await {
            Ok(data) => data.city.unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            Err(err) => {
                tracing::warn!(error = %err, "could not resolve city by IP");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}
