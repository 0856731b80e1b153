//! Open-Meteo geocoding and forecast clients.
//!
//! Both remote operations go through the [`Gateway`] trait so the pipeline
//! can be exercised against canned responses; [`HttpGateway`] is the real
//! blocking client with a configurable timeout.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const USER_AGENT: &str = concat!("wxdash/", env!("CARGO_PKG_VERSION"));

/// Failure of a single remote operation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response missing current conditions")]
    MissingCurrent,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

/// Minimal HTTP seam: fetch a URL, hand back the response body.
pub trait Gateway: Send + Sync {
    fn get_json(&self, url: &str) -> Result<String, ApiError>;
}

/// Blocking reqwest client. Non-2xx statuses and timeouts surface as
/// [`ApiError::Transport`].
pub struct HttpGateway {
    client: reqwest::blocking::Client,
}

impl HttpGateway {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Gateway for HttpGateway {
    fn get_json(&self, url: &str) -> Result<String, ApiError> {
        let body = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .text()?;
        Ok(body)
    }
}

pub mod geocoding {
    use super::*;
    use crate::weather::Location;

    #[derive(Deserialize, Debug, Default)]
    struct SearchResponse {
        results: Option<Vec<Candidate>>,
    }

    /// One geocoded place result.
    #[derive(Deserialize, Debug, Clone, PartialEq)]
    pub struct Candidate {
        pub name: String,

        #[serde(rename = "admin1")]
        pub admin_region: Option<String>,

        pub country: Option<String>,

        pub latitude: f64,
        pub longitude: f64,
    }

    impl Candidate {
        /// `name[, adminRegion][, country]`, omitting absent parts.
        pub fn display_label(&self) -> String {
            let mut label = self.name.clone();
            for part in [&self.admin_region, &self.country] {
                if let Some(part) = part {
                    label.push_str(", ");
                    label.push_str(part);
                }
            }
            label
        }

        pub fn to_location(&self) -> Location {
            Location {
                display_name: self.display_label(),
                latitude: self.latitude,
                longitude: self.longitude,
            }
        }
    }

    fn search_url(query: &str, limit: usize) -> String {
        format!(
            "{GEOCODING_URL}?name={}&count={limit}&language=en",
            urlencoding::encode(query)
        )
    }

    /// Ranked candidates for a free-text query. Queries shorter than two
    /// characters short-circuit to an empty list without touching the
    /// network; an empty list is a valid, non-error outcome.
    pub fn suggest<G: Gateway + ?Sized>(
        gateway: &G,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, ApiError> {
        let query = query.trim();
        if query.chars().count() < 2 {
            return Ok(Vec::new());
        }
        let body = gateway.get_json(&search_url(query, limit))?;
        let response: SearchResponse = serde_json::from_str(&body)?;
        Ok(response.results.unwrap_or_default())
    }

    /// The top match for a query, `None` when the service knows no such
    /// place. Service failure is an error distinct from `None`.
    pub fn resolve_first<G: Gateway + ?Sized>(
        gateway: &G,
        query: &str,
    ) -> Result<Option<Candidate>, ApiError> {
        let body = gateway.get_json(&search_url(query.trim(), 1))?;
        let response: SearchResponse = serde_json::from_str(&body)?;
        Ok(response.results.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }))
    }
}

pub mod forecast {
    use super::*;

    /// Raw forecast response. Replaced wholesale on every successful fetch.
    ///
    /// Hourly and daily blocks may be absent or partially populated; the
    /// render pipeline substitutes placeholders field by field. Within each
    /// series the parallel vectors are index-aligned by the service.
    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct ForecastPayload {
        pub current_weather: Option<CurrentWeather>,

        pub hourly: Option<HourlySeries>,

        pub daily: Option<DailySeries>,
    }

    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct CurrentWeather {
        pub temperature: Option<f64>,

        pub windspeed: Option<f64>,

        pub weathercode: Option<i32>,
    }

    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct HourlySeries {
        #[serde(default)]
        pub time: Vec<String>,

        #[serde(default)]
        pub temperature_2m: Vec<Option<f64>>,

        #[serde(default)]
        pub relativehumidity_2m: Vec<Option<f64>>,

        #[serde(default)]
        pub windspeed_10m: Vec<Option<f64>>,

        #[serde(default)]
        pub precipitation: Vec<Option<f64>>,

        #[serde(default)]
        pub weathercode: Vec<Option<i32>>,
    }

    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct DailySeries {
        #[serde(default)]
        pub time: Vec<String>,

        #[serde(default)]
        pub temperature_2m_max: Vec<Option<f64>>,

        #[serde(default)]
        pub temperature_2m_min: Vec<Option<f64>>,

        #[serde(default)]
        pub precipitation_sum: Vec<Option<f64>>,

        #[serde(default)]
        pub weathercode: Vec<Option<i32>>,
    }

    fn forecast_url(latitude: f64, longitude: f64) -> String {
        format!(
            "{FORECAST_URL}?latitude={latitude}&longitude={longitude}\
             &current_weather=true\
             &hourly=temperature_2m,relativehumidity_2m,windspeed_10m,precipitation,weathercode\
             &daily=weathercode,temperature_2m_max,temperature_2m_min,precipitation_sum\
             &timezone=auto"
        )
    }

    /// Current + hourly + daily blocks for a coordinate pair, timestamps
    /// localized to the location's own timezone. A response without the
    /// current-conditions block is a fetch error; missing hourly/daily
    /// blocks are tolerated.
    pub fn fetch<G: Gateway + ?Sized>(
        gateway: &G,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastPayload, ApiError> {
        let body = gateway.get_json(&forecast_url(latitude, longitude))?;
        let payload: ForecastPayload = serde_json::from_str(&body)?;
        if payload.current_weather.is_none() {
            return Err(ApiError::MissingCurrent);
        }
        Ok(payload)
    }
}
