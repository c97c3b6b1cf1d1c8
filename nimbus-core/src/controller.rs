//! Sequences gateway calls for each dashboard entry point and writes the
//! outcome into the [`Document`].
//!
//! Every entry point is split into a `resolve_*` step, which does the I/O
//! and returns a typed state, and that state's `render`, which is the only
//! place the document is touched.

use futures::future::join_all;

use crate::{
    Config,
    error::{GatewayError, GatewayResult},
    gateway::{CityWeatherGateway, LocationResolver, PredictionGateway, WeatherGateway},
    model::{
        CityEntry, CityWeather, Coordinates, CurrentWeather, Prediction, PredictionRequest,
        PredictionResult,
    },
    page::{Document, ElementId},
    registry::{CityRegistry, ZoneSelection},
    render,
};

/// Zone loaded on page load.
pub const INITIAL_ZONE: &str = "norte";

/// Classes the alert card gains once a prediction is shown.
const ALERT_CLASSES: &[&str] = &["border", "border-warning", "shadow-sm"];

/// Result of fetching one city's weather.
#[derive(Debug)]
pub struct CityOutcome {
    pub city: CityEntry,
    pub result: GatewayResult<CityWeather>,
}

impl CityOutcome {
    pub fn card(&self) -> String {
        match &self.result {
            Ok(data) => render::build_city_card(&self.city.name, data),
            Err(err) => render::city_error_card(&self.city.name, &err.to_string()),
        }
    }
}

/// Lifecycle of one zone load.
#[derive(Debug, Default)]
pub enum ZoneLoadState {
    #[default]
    Idle,
    Loading {
        zone: ZoneSelection,
    },
    /// One outcome per city, in registry order.
    Loaded {
        zone: ZoneSelection,
        cities: Vec<CityOutcome>,
    },
    EmptyZone {
        zone: ZoneSelection,
    },
    Failed {
        zone: ZoneSelection,
        message: String,
    },
}

impl ZoneLoadState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Loaded { .. } | Self::EmptyZone { .. } | Self::Failed { .. }
        )
    }

    pub fn render(&self, doc: &mut Document) {
        match self {
            Self::Idle => {}
            Self::Loading { zone } => {
                doc.set_html(ElementId::WeatherContainer, render::loading_panel(zone));
            }
            Self::Loaded { zone, cities } => {
                doc.set_html(ElementId::WeatherContainer, "");
                for outcome in cities {
                    doc.append_html(ElementId::WeatherContainer, &outcome.card());
                }
                doc.set_text(ElementId::ZoneSubtitle, &render::zone_subtitle(zone));
                doc.set_active_zone(zone.as_str());
            }
            Self::EmptyZone { zone } => {
                doc.set_html(ElementId::WeatherContainer, render::empty_zone_panel(zone));
            }
            Self::Failed { message, .. } => {
                doc.set_html(ElementId::WeatherContainer, render::zone_error_panel(message));
            }
        }
    }
}

/// Lifecycle of the hail alert card.
#[derive(Debug, Default)]
pub enum AlertState {
    #[default]
    Pending,
    Ready {
        result: PredictionResult,
        city: String,
        coords: Coordinates,
    },
    Unavailable,
    Failed {
        message: String,
    },
}

impl AlertState {
    pub fn render(&self, doc: &mut Document) {
        match self {
            Self::Pending => doc.set_html(ElementId::AlertCard, render::alert_pending()),
            Self::Ready {
                result,
                city,
                coords,
            } => {
                doc.set_html(
                    ElementId::AlertCard,
                    render::alert_card(result, city, *coords),
                );
                doc.add_classes(ElementId::AlertCard, ALERT_CLASSES);
            }
            Self::Unavailable => doc.set_html(ElementId::AlertCard, render::alert_unavailable()),
            Self::Failed { message } => {
                doc.set_html(ElementId::AlertCard, render::alert_connection_error(message));
            }
        }
    }
}

/// Lifecycle of the "my location" card.
#[derive(Debug, Default)]
pub enum LocationCardState {
    #[default]
    Loading,
    Ready {
        city: String,
        current: CurrentWeather,
    },
    Failed {
        message: String,
    },
}

impl LocationCardState {
    pub fn render(&self, doc: &mut Document) {
        let html = match self {
            Self::Loading => render::location_pending(),
            Self::Ready { city, current } => render::location_card(city, current),
            Self::Failed { message } => render::location_error_card(message),
        };
        doc.set_html(ElementId::LocationContainer, html);
    }
}

#[derive(Debug)]
pub struct PageController {
    registry: CityRegistry,
    location: LocationResolver,
    weather: WeatherGateway,
    prediction: PredictionGateway,
    city: CityWeatherGateway,
}

impl PageController {
    pub fn new(
        registry: CityRegistry,
        location: LocationResolver,
        weather: WeatherGateway,
        prediction: PredictionGateway,
        city: CityWeatherGateway,
    ) -> Self {
        Self {
            registry,
            location,
            weather,
            prediction,
            city,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let city = CityWeatherGateway::new(config.backend_url.as_str());

        Self::new(
            config.registry(),
            LocationResolver::from_config(config, city.clone()),
            WeatherGateway::new(config.forecast_url.as_str()),
            PredictionGateway::new(config.predict_url.as_str()),
            city,
        )
    }

    pub fn registry(&self) -> &CityRegistry {
        &self.registry
    }

    /// Show the spinner, load every city in `zone`, render the result.
    pub async fn load_zone(&self, zone: &ZoneSelection, doc: &mut Document) -> ZoneLoadState {
        ZoneLoadState::Loading { zone: zone.clone() }.render(doc);

        let state = self.resolve_zone(zone).await;
        state.render(doc);
        state
    }

    pub async fn resolve_zone(&self, zone: &ZoneSelection) -> ZoneLoadState {
        let cities = self.registry.cities(zone);
        if cities.is_empty() {
            tracing::warn!(%zone, "no cities registered for zone");
            return ZoneLoadState::EmptyZone { zone: zone.clone() };
        }

        if let Err(err) = self.city.coords_endpoint() {
            tracing::error!(%zone, error = %err, "cannot load zone");
            return ZoneLoadState::Failed {
                zone: zone.clone(),
                message: err.to_string(),
            };
        }

        let requests = cities.into_iter().map(|city| async move {
            let result = self.city.fetch_by_coords(city.lat, city.lng).await;
            if let Err(err) = &result {
                tracing::warn!(city = %city.name, error = %err, "city weather failed");
            }
            CityOutcome {
                city: city.clone(),
                result,
            }
        });

        let outcomes = join_all(requests).await;
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::info!(%zone, cities = outcomes.len(), failed, "zone loaded");

        ZoneLoadState::Loaded {
            zone: zone.clone(),
            cities: outcomes,
        }
    }

    /// Compute and render the hail alert for the user's position.
    pub async fn run_alert(&self, doc: &mut Document) -> AlertState {
        AlertState::Pending.render(doc);

        let state = self.resolve_alert().await;
        state.render(doc);
        state
    }

    pub async fn resolve_alert(&self) -> AlertState {
        let coords = self.location.get_coordinates().await;
        let city = self.location.get_city_name().await;
        tracing::info!(lat = coords.latitude, lon = coords.longitude, %city, "resolved location");

        let record = self
            .weather
            .fetch_forecast(coords.latitude, coords.longitude)
            .await;
        let request = PredictionRequest::new(coords, record);

        match self.prediction.predict_hail(&request).await {
            Ok(Prediction::Available(result)) => {
                tracing::info!(probability = result.probability, "hail prediction received");
                AlertState::Ready {
                    result,
                    city,
                    coords,
                }
            }
            Ok(Prediction::Unavailable) => AlertState::Unavailable,
            Err(err) => {
                tracing::error!(error = %err, "hail alert failed");
                AlertState::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    /// Render the compact card for the caller's IP location.
    pub async fn load_location(&self, doc: &mut Document) -> LocationCardState {
        LocationCardState::Loading.render(doc);

        let state = self.resolve_location().await;
        state.render(doc);
        state
    }

    pub async fn resolve_location(&self) -> LocationCardState {
        let data = match self.city.fetch_by_ip().await {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(error = %err, "location card unavailable");
                return LocationCardState::Failed {
                    message: err.to_string(),
                };
            }
        };

        match data.current() {
            Some(current) => LocationCardState::Ready {
                city: data.city.clone().unwrap_or_else(|| "Tu ubicación".to_string()),
                current: current.clone(),
            },
            None => LocationCardState::Failed {
                message: GatewayError::MissingWeather.to_string(),
            },
        }
    }

    /// Everything the dashboard does when it first opens: the location
    /// card, the initial zone and the hail alert, fetched concurrently.
    pub async fn page_load(&self, zone: &ZoneSelection, doc: &mut Document) {
        LocationCardState::Loading.render(doc);
        ZoneLoadState::Loading { zone: zone.clone() }.render(doc);
        AlertState::Pending.render(doc);

        let (location, zone_state, alert) = tokio::join!(
            self.resolve_location(),
            self.resolve_zone(zone),
            self.resolve_alert(),
        );

        location.render(doc);
        zone_state.render(doc);
        alert.render(doc);
    }
}
