//! HTML fragments for the dashboard.
//!
//! Everything here is pure. Strings that come from outside the program
//! (city names, zone names, backend timestamps, error messages, advisory
//! text) go through [`escape_html`] before being interpolated.

use crate::{
    model::{CityWeather, Coordinates, CurrentWeather, PredictionResult},
    registry::ZoneSelection,
};

pub const DEFAULT_ICON: &str = "🌈";
pub const DEFAULT_DESCRIPTION: &str = "Condiciones variables";
pub const NO_ADVISORY: &str = "Sin alerta activa";

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Glyph for a WMO weather code.
pub fn weather_icon(code: i64) -> &'static str {
    match code {
        0 => "☀️",
        1..=3 => "🌤️",
        45..=48 => "🌫️",
        51..=67 => "🌧️",
        71..=77 => "❄️",
        80..=82 => "⛈️",
        95..=99 => "⚡",
        _ => DEFAULT_ICON,
    }
}

/// Spanish description for a WMO weather code.
pub fn weather_description(code: i64) -> &'static str {
    match code {
        0 => "Despejado",
        1 => "Mayormente despejado",
        2 => "Parcialmente nublado",
        3 => "Nublado",
        45 => "Niebla",
        48 => "Niebla helada",
        51 => "Llovizna ligera",
        53 => "Llovizna moderada",
        55 => "Llovizna intensa",
        61 => "Lluvia ligera",
        63 => "Lluvia moderada",
        65 => "Lluvia intensa",
        71 => "Nieve ligera",
        73 => "Nieve moderada",
        75 => "Nieve intensa",
        77 => "Granizo",
        80 => "Chubascos ligeros",
        81 => "Chubascos moderados",
        82 => "Chubascos intensos",
        95 => "Tormenta eléctrica",
        96 => "Tormenta con granizo ligero",
        99 => "Tormenta con granizo intenso",
        _ => DEFAULT_DESCRIPTION,
    }
}

fn icon_for(code: Option<i64>) -> &'static str {
    code.map(weather_icon).unwrap_or(DEFAULT_ICON)
}

fn description_for(code: Option<i64>) -> &'static str {
    code.map(weather_description).unwrap_or(DEFAULT_DESCRIPTION)
}

fn reading(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "--".to_string())
}

/// Card for one city. Falls back to a "data unavailable" card when the
/// backend sent no usable current weather.
pub fn build_city_card(name: &str, data: &CityWeather) -> String {
    let name = escape_html(name);

    let Some(current) = data.current_with_temperature() else {
        return format!(
            r#"<div class="col-12 col-md-6 col-lg-4">
    <div class="card h-100 border-warning">
        <div class="card-body text-center">
            <h5>{name}</h5>
            <p class="text-warning">❌ Datos no disponibles</p>
        </div>
    </div>
</div>
"#
        );
    };

    format!(
        r#"<div class="col-12 col-md-6 col-lg-4">
    <div class="card h-100 shadow-sm">
        <div class="card-body text-center">
            <h5 class="card-title">{name}</h5>
            <div class="display-6">{icon}</div>
            <h3 class="text-primary">{temp}°C</h3>
            <p class="text-muted">{description}</p>
            <div class="row mt-3">
                <div class="col-6">
                    <small>🌬️ Viento</small>
                    <p class="mb-0">{wind} km/h</p>
                </div>
                <div class="col-6">
                    <small>🧭 Dirección</small>
                    <p class="mb-0">{direction}°</p>
                </div>
            </div>
            <small class="text-muted mt-2">{time}</small>
        </div>
    </div>
</div>
"#,
        icon = icon_for(current.weathercode),
        temp = reading(current.temperature),
        description = description_for(current.weathercode),
        wind = reading(current.windspeed),
        direction = reading(current.winddirection),
        time = escape_html(current.time.as_deref().unwrap_or_default()),
    )
}

/// Card for a city whose fetch failed.
pub fn city_error_card(name: &str, message: &str) -> String {
    format!(
        r#"<div class="col-12 col-md-6 col-lg-4">
    <div class="card h-100 border-danger">
        <div class="card-body text-center text-danger">
            <h5>{name}</h5>
            <p>❌ Error cargando datos</p>
            <small>{message}</small>
        </div>
    </div>
</div>
"#,
        name = escape_html(name),
        message = escape_html(message),
    )
}

pub fn loading_panel(zone: &ZoneSelection) -> String {
    format!(
        r#"<div class="col-12 text-center py-5">
    <div class="spinner-border text-info" role="status">
        <span class="visually-hidden">Consultando meteorología...</span>
    </div>
    <p class="mt-2 text-muted">Cargando clima para zona {zone}...</p>
</div>
"#,
        zone = escape_html(zone.as_str()),
    )
}

pub fn empty_zone_panel(zone: &ZoneSelection) -> String {
    format!(
        r#"<div class="col-12 text-center py-5">
    <div class="alert alert-warning">
        <h4>🌍 Zona no encontrada</h4>
        <p>No hay ciudades registradas para la zona <strong>{zone}</strong>.</p>
    </div>
</div>
"#,
        zone = escape_html(zone.as_str()),
    )
}

pub fn zone_error_panel(message: &str) -> String {
    format!(
        r#"<div class="col-12 text-center py-5">
    <div class="alert alert-danger">
        <h4>❌ Error al cargar clima</h4>
        <p>No se pudieron cargar los datos meteorológicos.</p>
        <small>Error: {message}</small>
    </div>
</div>
"#,
        message = escape_html(message),
    )
}

/// Text for the `subtitulo-zona` heading.
pub fn zone_subtitle(zone: &ZoneSelection) -> String {
    format!("Clima en {}", zone.title())
}

pub fn alert_pending() -> String {
    r#"<div class="card-body"><p>Consultando Pronóstico...</p></div>"#.to_string()
}

/// Hail alert with probability, advisory and where it applies.
pub fn alert_card(result: &PredictionResult, city: &str, coords: Coordinates) -> String {
    format!(
        r#"<div class="card-body">
    <h4>⚠️ Alerta Meteorológica</h4>
    <p class="fs-5">Probabilidad de Granizo: <strong>{probability:.1}%</strong></p>
    <p class="text-muted">{advisory}</p>
    <small class="text-info">📍 Ubicación: {city} ({lat:.4}, {lon:.4})</small>
</div>
"#,
        probability = result.probability * 100.0,
        advisory = escape_html(result.advisory.as_deref().unwrap_or(NO_ADVISORY)),
        city = escape_html(city),
        lat = coords.latitude,
        lon = coords.longitude,
    )
}

pub fn alert_unavailable() -> String {
    r#"<p class="text-warning">⚠️ No se pudo obtener la predicción.</p>"#.to_string()
}

pub fn alert_connection_error(message: &str) -> String {
    format!(
        r#"<p class="text-danger">⚠️ Error al conectar con los servicios meteorológicos.</p>
<small>Detalle: {message}</small>
"#,
        message = escape_html(message),
    )
}

const LOCATION_HEADER: &str = r#"<div class="card-header bg-primary text-white py-2">
        <h5 class="card-title mb-0 fs-6">📍 Mi Ubicación</h5>
    </div>"#;

/// Compact card for the caller's own location.
pub fn location_card(city: &str, current: &CurrentWeather) -> String {
    format!(
        r#"<div class="card h-100 shadow-sm" style="max-height: 300px;">
    {LOCATION_HEADER}
    <div class="card-body d-flex flex-column p-3">
        <div class="text-center flex-grow-1 d-flex flex-column justify-content-center">
            <div class="display-5 fw-bold text-primary mb-1">{temp}°C</div>
            <p class="mb-1 fw-semibold">{city}</p>
            <p class="small text-muted mb-2">{description}</p>
            <div class="d-flex justify-content-around small text-muted">
                <div>
                    <div class="fw-bold">{wind} km/h</div>
                    <small>Viento</small>
                </div>
                <div>
                    <div class="fw-bold">{direction}°</div>
                    <small>Dirección</small>
                </div>
            </div>
        </div>
    </div>
</div>
"#,
        temp = reading(current.temperature),
        city = escape_html(city),
        description = description_for(current.weathercode),
        wind = reading(current.windspeed),
        direction = reading(current.winddirection),
    )
}

pub fn location_pending() -> String {
    format!(
        r#"<div class="card h-100 shadow-sm" style="max-height: 300px;">
    {LOCATION_HEADER}
    <div class="card-body text-center p-3">
        <div class="spinner-border spinner-border-sm text-primary" role="status"></div>
        <p class="small text-muted mt-2 mb-0">Detectando ubicación...</p>
    </div>
</div>
"#
    )
}

pub fn location_error_card(message: &str) -> String {
    format!(
        r#"<div class="card shadow-sm border-0 h-100" style="max-height: 300px;">
    {LOCATION_HEADER}
    <div class="card-body d-flex flex-column p-3">
        <div class="text-center flex-grow-1 d-flex align-items-center justify-content-center">
            <div class="text-warning">
                <p class="mb-1">No se pudo detectar ubicación</p>
                <small class="text-muted">{message}</small>
            </div>
        </div>
    </div>
</div>
"#,
        message = escape_html(message),
    )
}
