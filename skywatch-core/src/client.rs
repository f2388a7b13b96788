use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::Error;
use crate::model::{Condition, LocationQuery, WeatherReport};

/// OpenWeather current-weather endpoint.
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// The seam the presentation layer consumes. Lets shells swap the real
/// client for a fake without touching the display code.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, query: &LocationQuery) -> Result<WeatherReport, Error>;
}

/// HTTP client for current-weather lookups.
///
/// Each lookup is a single GET with query-string parameters; the endpoint
/// is a stateless read-only lookup, so there is no session, retry, or
/// timeout handling beyond the transport defaults.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_WEATHER_URL)
    }

    /// Client against a non-default endpoint (tests, mirrors). The URL is
    /// validated when the first request is built.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Current weather for a city/state/country triple.
    ///
    /// Fields go into the `q` parameter exactly as supplied, empty strings
    /// included, and are percent-encoded by the URL layer. The service
    /// decides what constitutes a valid location.
    #[instrument(skip(self))]
    pub async fn fetch_by_location(
        &self,
        city: &str,
        state: &str,
        country: &str,
    ) -> Result<WeatherReport, Error> {
        let q = format!("{city},{state},{country}");
        self.request(&[("q", q)]).await
    }

    /// Current weather for a coordinate pair. No range validation; values
    /// are forwarded as decimal strings.
    #[instrument(skip(self))]
    pub async fn fetch_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReport, Error> {
        self.request(&[("lat", latitude.to_string()), ("lon", longitude.to_string())])
            .await
    }

    async fn request(&self, params: &[(&str, String)]) -> Result<WeatherReport, Error> {
        let url = Url::parse(&self.base_url)
            .map_err(|_| Error::MalformedRequest(self.base_url.clone()))?;

        let res = self
            .http
            .get(url)
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(Error::Network)?;

        let status = res.status();
        let body = res.text().await.map_err(Error::Network)?;

        if !status.is_success() {
            debug!(%status, body = %truncate_body(&body), "weather request rejected");
            return Err(Error::Http(status));
        }

        let parsed: CurrentResponse =
            serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))?;

        Ok(parsed.into())
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn current(&self, query: &LocationQuery) -> Result<WeatherReport, Error> {
        match query {
            LocationQuery::Named {
                city,
                state,
                country,
            } => self.fetch_by_location(city, state, country).await,
            LocationQuery::Coordinates {
                latitude,
                longitude,
            } => self.fetch_by_coordinates(*latitude, *longitude).await,
        }
    }
}

/// Construct a client from config, resolving the credential and any
/// endpoint override.
pub fn client_from_config(config: &Config) -> anyhow::Result<WeatherClient> {
    let api_key = config.api_key()?;

    let client = match &config.weather_url {
        Some(url) => WeatherClient::with_base_url(api_key, url),
        None => WeatherClient::new(api_key),
    };

    Ok(client)
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: MainReadings,
    weather: Vec<ConditionEntry>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    description: String,
    icon: String,
}

impl From<CurrentResponse> for WeatherReport {
    fn from(raw: CurrentResponse) -> Self {
        WeatherReport {
            temperature_c: raw.main.temp,
            conditions: raw
                .weather
                .into_iter()
                .map(|w| Condition {
                    description: w.description,
                    icon_id: w.icon,
                })
                .collect(),
            location_name: raw.name.filter(|name| !name.is_empty()),
            observed_at: raw.dt.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_documented_response_shape() {
        let body = r#"{"main":{"temp":20.0},"weather":[{"description":"clear sky","icon":"01d"}]}"#;
        let parsed: CurrentResponse = serde_json::from_str(body).expect("schema body parses");
        let report = WeatherReport::from(parsed);

        assert_eq!(report.temperature_c, 20.0);
        let primary = report.primary().expect("one condition present");
        assert_eq!(primary.description, "clear sky");
        assert_eq!(primary.icon_id, "01d");
        assert!(report.location_name.is_none());
        assert!(report.observed_at.is_none());
    }

    #[test]
    fn decodes_optional_name_and_observation_time() {
        let body = r#"{"main":{"temp":4.5},"weather":[],"name":"Austin","dt":1700000000}"#;
        let parsed: CurrentResponse = serde_json::from_str(body).expect("body parses");
        let report = WeatherReport::from(parsed);

        assert_eq!(report.location_name.as_deref(), Some("Austin"));
        assert_eq!(
            report.observed_at.expect("dt present").timestamp(),
            1_700_000_000
        );
        assert!(report.conditions.is_empty());
    }

    #[test]
    fn missing_temperature_fails_to_decode() {
        let body = r#"{"main":{},"weather":[]}"#;
        assert!(serde_json::from_str::<CurrentResponse>(body).is_err());
    }

    #[test]
    fn missing_weather_array_fails_to_decode() {
        let body = r#"{"main":{"temp":20.0}}"#;
        assert!(serde_json::from_str::<CurrentResponse>(body).is_err());
    }

    #[tokio::test]
    async fn invalid_base_url_is_a_malformed_request() {
        let client = WeatherClient::with_base_url("KEY", "not a url");

        let err = client.fetch_by_location("a", "b", "c").await.unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));
    }

    #[test]
    fn client_from_config_requires_an_api_key() {
        let cfg = Config::default();
        let err = client_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn client_from_config_applies_endpoint_override() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            weather_url: Some("http://127.0.0.1:9/weather".into()),
            icon_url: None,
        };

        let client = client_from_config(&cfg).expect("key is configured");
        assert_eq!(client.base_url, "http://127.0.0.1:9/weather");
    }
}
