//! National Weather Service API (api.weather.gov) adapter.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::core::error::ToolError;
use crate::core::fetch::JsonFetch;

#[derive(Clone)]
pub struct NwsClient {
    base: String,
    fetch: Arc<dyn JsonFetch>,
}

/// `features[n]` / top-level GeoJSON wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature<T> {
    pub properties: T,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection<T> {
    features: Vec<Feature<T>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointProperties {
    pub grid_id: String,
    pub grid_x: u32,
    pub grid_y: u32,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub relative_location: Option<Feature<RelativeLocation>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelativeLocation {
    pub city: String,
    pub state: String,
}

impl PointProperties {
    pub fn place(&self) -> Option<String> {
        self.relative_location
            .as_ref()
            .map(|l| format!("{}, {}", l.properties.city, l.properties.state))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    #[serde(default)]
    pub name: String,
    pub start_time: String,
    pub temperature: f64,
    pub temperature_unit: String,
    #[serde(default)]
    pub probability_of_precipitation: Option<Measurement>,
    #[serde(default)]
    pub wind_speed: Option<String>,
    #[serde(default)]
    pub wind_direction: Option<String>,
    pub short_forecast: String,
    #[serde(default)]
    pub detailed_forecast: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub station_identifier: String,
    pub name: String,
}

/// A quantitative value; `value` is null when the station did not report it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub value: Option<f64>,
    #[serde(default)]
    pub unit_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub timestamp: String,
    #[serde(default)]
    pub text_description: Option<String>,
    #[serde(default)]
    pub temperature: Measurement,
    #[serde(default)]
    pub dewpoint: Measurement,
    #[serde(default)]
    pub relative_humidity: Measurement,
    #[serde(default)]
    pub wind_direction: Measurement,
    #[serde(default)]
    pub wind_speed: Measurement,
    #[serde(default)]
    pub barometric_pressure: Measurement,
}

impl NwsClient {
    pub fn new(base: impl Into<String>, fetch: Arc<dyn JsonFetch>) -> Self {
        Self { base: base.into().trim_end_matches('/').to_string(), fetch }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn gridpoint_url(&self, office: &str, x: u32, y: u32) -> String {
        format!("{}/gridpoints/{office}/{x},{y}", self.base)
    }

    pub async fn point(&self, latitude: f64, longitude: f64, user_agent: &str) -> Result<PointProperties, ToolError> {
        let url = format!("{}/points/{latitude},{longitude}", self.base);
        let feature: Feature<PointProperties> = self.get(&url, user_agent).await?;
        Ok(feature.properties)
    }

    pub async fn forecast(
        &self,
        gridpoint_url: &str,
        hourly: bool,
        units: &str,
        user_agent: &str,
    ) -> Result<Vec<ForecastPeriod>, ToolError> {
        let path = if hourly { "forecast/hourly" } else { "forecast" };
        let url = format!("{gridpoint_url}/{path}?units={units}");
        let feature: Feature<ForecastProperties> = self.get(&url, user_agent).await?;
        Ok(feature.properties.periods)
    }

    pub async fn stations(&self, gridpoint_url: &str, user_agent: &str) -> Result<Vec<Station>, ToolError> {
        let url = format!("{gridpoint_url}/stations");
        let collection: FeatureCollection<Station> = self.get(&url, user_agent).await?;
        Ok(collection.features.into_iter().map(|f| f.properties).collect())
    }

    pub async fn latest_observation(&self, station_id: &str, user_agent: &str) -> Result<Observation, ToolError> {
        let url = format!("{}/stations/{station_id}/observations/latest", self.base);
        let feature: Feature<Observation> = self.get(&url, user_agent).await?;
        Ok(feature.properties)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, user_agent: &str) -> Result<T, ToolError> {
        let body = self.fetch.get_json(url, user_agent).await?;
        decode(url, body)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(url: &str, body: JsonValue) -> Result<T, ToolError> {
    serde_json::from_value(body).map_err(|e| ToolError::MalformedResponse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
