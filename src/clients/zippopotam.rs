use std::sync::Arc;

use serde::Deserialize;

use crate::clients::nws::decode;
use crate::core::error::ToolError;
use crate::core::fetch::JsonFetch;

/// US ZIP code lookup against a zippopotam.us-compatible service.
#[derive(Clone)]
pub struct ZippopotamClient {
    base: String,
    fetch: Arc<dyn JsonFetch>,
}

#[derive(Debug, Deserialize)]
struct PostCodeWire {
    places: Vec<PlaceWire>,
}

#[derive(Debug, Deserialize)]
struct PlaceWire {
    #[serde(rename = "place name")]
    place_name: String,
    #[serde(rename = "state abbreviation")]
    state_abbreviation: String,
    latitude: String,
    longitude: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZipLocation {
    pub place_name: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ZippopotamClient {
    pub fn new(base: impl Into<String>, fetch: Arc<dyn JsonFetch>) -> Self {
        Self { base: base.into().trim_end_matches('/').to_string(), fetch }
    }

    pub async fn lookup(&self, zip: &str, user_agent: &str) -> Result<ZipLocation, ToolError> {
        let url = format!("{}/us/{zip}", self.base);
        let body = self.fetch.get_json(&url, user_agent).await?;
        let wire: PostCodeWire = decode(&url, body)?;
        let place = wire
            .places
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::missing_field("places[0]", url.as_str()))?;
        Ok(ZipLocation {
            latitude: parse_coordinate(&url, "latitude", &place.latitude)?,
            longitude: parse_coordinate(&url, "longitude", &place.longitude)?,
            place_name: place.place_name,
            state: place.state_abbreviation,
        })
    }
}

fn parse_coordinate(url: &str, field: &str, raw: &str) -> Result<f64, ToolError> {
    raw.trim().parse::<f64>().map_err(|_| ToolError::MalformedResponse {
        url: url.to_string(),
        reason: format!("`{field}` is not a number: {raw:?}"),
    })
}
