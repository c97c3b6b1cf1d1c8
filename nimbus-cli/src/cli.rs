use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};
use nimbus_core::{
    Config, Coordinates, Document, ElementId, PageController, ZoneSelection,
    controller::INITIAL_ZONE,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nimbus", version, about = "Mendoza weather dashboard and hail alerts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Overrides geolocation with a known position.
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct PositionArgs {
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl PositionArgs {
    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set backend, prediction and forecast endpoints interactively.
    Configure,

    /// List zones and their cities.
    Zones,

    /// Render the weather cards for a zone ("todas" for every zone).
    Zone {
        /// Zone name, as used in the nav links' data-zona attribute.
        zone: String,
    },

    /// Render the card for the current IP location.
    Location,

    /// Render the hail alert for the current position.
    Alert {
        #[command(flatten)]
        position: PositionArgs,
    },

    /// Render the whole dashboard page.
    Dashboard {
        /// Zone shown initially.
        #[arg(long, default_value = INITIAL_ZONE)]
        zone: String,

        /// Write the page here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        position: PositionArgs,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(config)?,
            Command::Zones => {
                for zone in config.registry().zones() {
                    println!("{}", zone.name);
                    for city in &zone.cities {
                        println!("  {} ({:.4}, {:.4})", city.name, city.lat, city.lng);
                    }
                }
            }
            Command::Zone { zone } => {
                let controller = PageController::from_config(&config);
                let mut doc = Document::new();
                controller
                    .load_zone(&ZoneSelection::from(zone.as_str()), &mut doc)
                    .await;

                println!("<!-- {} -->", doc.inner_html(ElementId::ZoneSubtitle));
                print!("{}", doc.inner_html(ElementId::WeatherContainer));
            }
            Command::Location => {
                let controller = PageController::from_config(&config);
                let mut doc = Document::new();
                controller.load_location(&mut doc).await;

                print!("{}", doc.inner_html(ElementId::LocationContainer));
            }
            Command::Alert { position } => {
                if let Some(coords) = position.coordinates() {
                    config.position = Some(coords);
                }
                let controller = PageController::from_config(&config);
                let mut doc = Document::new();
                controller.run_alert(&mut doc).await;

                print!("{}", doc.inner_html(ElementId::AlertCard));
            }
            Command::Dashboard {
                zone,
                out,
                position,
            } => {
                if let Some(coords) = position.coordinates() {
                    config.position = Some(coords);
                }
                let controller = PageController::from_config(&config);
                let mut doc = Document::new();
                controller
                    .page_load(&ZoneSelection::from(zone.as_str()), &mut doc)
                    .await;

                let page = doc.render_page(controller.registry());
                match out {
                    Some(path) => {
                        fs::write(&path, page)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        tracing::info!(path = %path.display(), "dashboard written");
                    }
                    None => print!("{page}"),
                }
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    config.backend_url = Text::new("Local backend URL:")
        .with_default(&config.backend_url)
        .prompt()?;

    config.predict_url = Text::new("Hail prediction endpoint:")
        .with_default(&config.predict_url)
        .prompt()?;

    config.forecast_url = Text::new("Forecast API URL:")
        .with_default(&config.forecast_url)
        .prompt()?;

    let fixed = Confirm::new("Use a fixed position instead of geolocation?")
        .with_default(config.position.is_some())
        .prompt()?;

    config.position = if fixed {
        let current = config.position.unwrap_or(config.fallback);
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_default(current.latitude)
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_default(current.longitude)
            .prompt()?;
        Some(Coordinates::new(latitude, longitude))
    } else {
        None
    };

    config.save()?;
    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}
