//! Core library for the `skywatch` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The current-weather HTTP client and its typed error taxonomy
//! - The condition-icon cache (at most one download per icon code)
//! - Stale-result tracking for overlapping lookups
//!
//! It is used by `skywatch-cli`, but can also be reused by other shells or
//! services.

pub mod client;
pub mod config;
pub mod error;
pub mod icons;
pub mod model;
pub mod session;

pub use client::{DEFAULT_WEATHER_URL, WeatherClient, WeatherSource, client_from_config};
pub use config::Config;
pub use error::Error;
pub use icons::{DEFAULT_ICON_URL, IconCache, icon_cache_from_config};
pub use model::{Condition, LocationQuery, WeatherReport};
pub use session::{Generation, SearchSession};
