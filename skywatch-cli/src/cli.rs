use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use std::path::{Path, PathBuf};
use tracing::debug;

use skywatch_core::{
    Config, IconCache, LocationQuery, WeatherReport, WeatherSource, client_from_config,
    icon_cache_from_config,
};

use crate::state::LastSearch;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skywatch", version, about = "Current weather from OpenWeather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key used for lookups.
    Configure,

    /// Show current weather for a place. With no city, repeats the last search.
    Show {
        /// City name, forwarded to the service as-is.
        city: Option<String>,

        /// State or region; may be empty.
        #[arg(long, default_value = "")]
        state: String,

        /// Country code; may be empty.
        #[arg(long, default_value = "")]
        country: String,

        /// Write the condition icon PNG to this path.
        #[arg(long)]
        save_icon: Option<PathBuf>,
    },

    /// Show current weather for a latitude/longitude pair.
    Coords {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        #[arg(allow_negative_numbers = true)]
        longitude: f64,

        /// Write the condition icon PNG to this path.
        #[arg(long)]
        save_icon: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                state,
                country,
                save_icon,
            } => {
                let (query, remember) = resolve_place(city, state, country)?;
                show(query, remember, save_icon).await
            }
            Command::Coords {
                latitude,
                longitude,
                save_icon,
            } => {
                show(
                    LocationQuery::coordinates(latitude, longitude),
                    None,
                    save_icon,
                )
                .await
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key from prompt")?;

    config.set_api_key(key);
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Load config, letting the environment override the stored credential.
fn load_config() -> Result<Config> {
    let mut config = Config::load()?;
    if let Ok(key) = std::env::var("OPENWEATHER_API_KEY") {
        config.set_api_key(key);
    }
    Ok(config)
}

/// Turn the `show` arguments into a query, falling back to the last search.
/// Returns the place to remember once the lookup succeeds.
fn resolve_place(
    city: Option<String>,
    state: String,
    country: String,
) -> Result<(LocationQuery, Option<LastSearch>)> {
    match city {
        Some(city) => {
            let remember = LastSearch {
                city: city.clone(),
                state: state.clone(),
                country: country.clone(),
            };
            Ok((LocationQuery::named(city, state, country), Some(remember)))
        }
        None => {
            let last = LastSearch::load()?.ok_or_else(|| {
                anyhow!(
                    "No city given and no previous search to repeat.\n\
                     Hint: run `skywatch show <CITY>` once; later runs can omit it."
                )
            })?;
            let query = LocationQuery::named(
                last.city.clone(),
                last.state.clone(),
                last.country.clone(),
            );
            Ok((query, None))
        }
    }
}

async fn show(
    query: LocationQuery,
    remember: Option<LastSearch>,
    save_icon: Option<PathBuf>,
) -> Result<()> {
    let config = load_config()?;
    let client = client_from_config(&config)?;
    let source: &dyn WeatherSource = &client;

    let report = source.current(&query).await?;
    print!("{}", format_report(&report));

    if let Some(last) = remember {
        // Remember the place only once the service accepted it.
        if let Err(e) = last.save() {
            debug!(error = %e, "could not persist last search");
        }
    }

    if let Some(path) = save_icon {
        save_primary_icon(&icon_cache_from_config(&config), &report, &path).await;
    }

    Ok(())
}

/// Best effort: a missing pictogram never fails the weather display.
async fn save_primary_icon(cache: &IconCache, report: &WeatherReport, path: &Path) {
    let Some(condition) = report.primary() else {
        debug!("no condition reported, skipping icon");
        return;
    };

    match cache.get(&condition.icon_id).await {
        Ok(bytes) => match std::fs::write(path, &bytes) {
            Ok(()) => println!("Icon saved to {}", path.display()),
            Err(e) => debug!(error = %e, "could not write icon file"),
        },
        Err(e) => debug!(error = %e, icon_id = %condition.icon_id, "icon download failed"),
    }
}

fn format_report(report: &WeatherReport) -> String {
    let mut out = String::new();

    let place = report.location_name.as_deref().unwrap_or("requested location");
    out.push_str(&format!("Weather for {place}\n"));
    out.push_str(&format!(
        "  Temperature: {:.1} °C / {:.1} °F\n",
        report.temperature_c,
        report.temperature_f()
    ));

    match report.primary() {
        Some(condition) => out.push_str(&format!("  Conditions:  {}\n", condition.description)),
        None => out.push_str("  Conditions:  (none reported)\n"),
    }

    if let Some(observed) = report.observed_at {
        let local = observed.with_timezone(&Local);
        out.push_str(&format!(
            "  Observed:    {}\n",
            local.format("%Y-%m-%d %H:%M")
        ));
    }

    out
}
