//! Fixed cities grouped by zone.

use serde::{Deserialize, Serialize};

use crate::model::CityEntry;

/// Selector value meaning "every zone".
pub const ALL_ZONES: &str = "todas";

/// What a nav link asks to load, parsed from its `data-zona` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneSelection {
    All,
    Named(String),
}

impl ZoneSelection {
    pub fn as_str(&self) -> &str {
        match self {
            ZoneSelection::All => ALL_ZONES,
            ZoneSelection::Named(name) => name,
        }
    }

    /// Heading used in the zone subtitle, e.g. "Zona Sur".
    pub fn title(&self) -> String {
        match self {
            ZoneSelection::All => "Todas las Zonas".to_string(),
            ZoneSelection::Named(name) => format!("Zona {}", capitalize(name)),
        }
    }
}

impl std::fmt::Display for ZoneSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ZoneSelection {
    fn from(value: &str) -> Self {
        if value == ALL_ZONES {
            ZoneSelection::All
        } else {
            ZoneSelection::Named(value.to_string())
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One named zone and its cities, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub cities: Vec<CityEntry>,
}

/// Immutable zone -> cities table, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRegistry {
    zones: Vec<Zone>,
}

impl CityRegistry {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// The Mendoza cities the dashboard ships with.
    pub fn mendoza() -> Self {
        let zone = |name: &str, cities: &[(&str, f64, f64)]| Zone {
            name: name.to_string(),
            cities: cities
                .iter()
                .map(|&(city, lat, lng)| CityEntry::new(city, lat, lng))
                .collect(),
        };

        Self::new(vec![
            zone(
                "norte",
                &[
                    ("Mendoza Capital", -32.8908, -68.8272),
                    ("Guaymallén", -32.8847, -68.8272),
                    ("Godoy Cruz", -32.9333, -68.8333),
                    ("Las Heras", -32.8500, -68.8167),
                    ("Maipú", -32.9667, -68.7500),
                    ("Luján de Cuyo", -33.0333, -68.8833),
                    ("Lavalle", -32.7000, -68.5833),
                ],
            ),
            zone(
                "centro",
                &[
                    ("Tunuyán", -33.5667, -69.0167),
                    ("Tupungato", -33.3667, -69.1500),
                    ("San Carlos", -33.7667, -69.0333),
                ],
            ),
            zone(
                "este",
                &[
                    ("Junín", -33.1500, -68.4833),
                    ("Rivadavia", -33.1833, -68.4667),
                    ("San Martín", -33.0833, -68.4667),
                    ("Santa Rosa", -33.2500, -68.1500),
                    ("La Paz", -33.4667, -67.5500),
                ],
            ),
            zone(
                "sur",
                &[
                    ("San Rafael", -34.6177, -68.3301),
                    ("General Alvear", -34.9667, -67.7000),
                    ("Malargüe", -35.4667, -69.5833),
                ],
            ),
        ])
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// Cities for a selection, in registry order. Unknown zones yield none.
    pub fn cities(&self, selection: &ZoneSelection) -> Vec<&CityEntry> {
        match selection {
            ZoneSelection::All => self.zones.iter().flat_map(|z| z.cities.iter()).collect(),
            ZoneSelection::Named(name) => self
                .zone(name)
                .map(|z| z.cities.iter().collect())
                .unwrap_or_default(),
        }
    }
}

impl Default for CityRegistry {
    fn default() -> Self {
        Self::mendoza()
    }
}
