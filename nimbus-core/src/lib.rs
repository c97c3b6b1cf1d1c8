//! Core library for the Nimbus weather dashboard.
//!
//! This crate defines:
//! - Configuration and the zone/city registry
//! - Gateways for geolocation, Open-Meteo, the local backend and the hail model
//! - HTML rendering and an in-memory page the controller writes to
//!
//! It is used by `nimbus-cli`, but the controller can drive any front end
//! that can display a [`Document`].

pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod model;
pub mod page;
pub mod registry;
pub mod render;

pub use config::Config;
pub use controller::{AlertState, LocationCardState, PageController, ZoneLoadState};
pub use error::{GatewayError, GatewayResult};
pub use model::{
    CityEntry, CityWeather, Coordinates, CurrentWeather, Prediction, PredictionRequest,
    PredictionResult, WeatherFeatureRecord,
};
pub use page::{Document, ElementId};
pub use registry::{CityRegistry, Zone, ZoneSelection};
