use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::content::{ContentBlock, ToolResponse};
use crate::core::error::ToolError;
use crate::core::params;
use crate::core::schema::{InputSchema, SchemaType};
use crate::core::tool::{Params, Tool, ToolSpec};
use crate::tools::common::round4;
use crate::tools::context::ToolContext;

pub const NAME: &str = "get_grid_point";
const LATITUDE: &str = "latitude";
const LONGITUDE: &str = "longitude";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Args {
    latitude: f64,
    longitude: f64,
}

/// Resolves coordinates to the forecast office grid cell every forecast tool takes.
pub struct GetGridPoint {
    ctx: ToolContext,
}

impl GetGridPoint {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    pub fn factory(ctx: &ToolContext) -> Arc<dyn Tool> {
        Arc::new(Self::new(ctx.clone()))
    }
}

impl ToolSpec for GetGridPoint {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Look up the National Weather Service grid point for a US latitude and longitude. \
         Returns the gridPointUrl required by the forecast and current conditions tools."
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::object()
            .required(LATITUDE, SchemaType::Number, "Latitude in decimal degrees, -90 to 90")
            .required(LONGITUDE, SchemaType::Number, "Longitude in decimal degrees, -180 to 180")
    }
}

#[async_trait]
impl Tool for GetGridPoint {
    fn validate_with_defaults(&self, params: &Params) -> Result<Params, ToolError> {
        let latitude = params::required_number(
            params,
            LATITUDE,
            -90.0..=90.0,
            "a latitude in decimal degrees between -90 and 90",
        )?;
        let longitude = params::required_number(
            params,
            LONGITUDE,
            -180.0..=180.0,
            "a longitude in decimal degrees between -180 and 180",
        )?;
        Ok(params::to_params(&Args { latitude: round4(latitude), longitude: round4(longitude) }))
    }

    async fn process_tool_workflow(&self, params: Params) -> Result<ToolResponse, ToolError> {
        let Args { latitude, longitude } = params::from_params(params)?;
        let ua = self.ctx.user_agent_header_text()?;
        let nws = self.ctx.nws();
        let point = nws.point(latitude, longitude, &ua).await?;
        let grid_point_url = nws.gridpoint_url(&point.grid_id, point.grid_x, point.grid_y);

        let mut text = format!(
            "Grid point for {latitude}, {longitude}: office {} at {},{}.",
            point.grid_id, point.grid_x, point.grid_y
        );
        if let Some(place) = point.place() {
            text.push_str(&format!(" Nearest place: {place}."));
        }
        text.push_str(&format!("\ngridPointUrl: {grid_point_url}"));

        let mut block = ContentBlock::text(text)
            .with_annotation("latitude", latitude)
            .with_annotation("longitude", longitude)
            .with_annotation("gridId", point.grid_id.clone())
            .with_annotation("gridX", point.grid_x)
            .with_annotation("gridY", point.grid_y)
            .with_annotation("gridPointUrl", grid_point_url);
        if let Some(tz) = point.time_zone {
            block = block.with_annotation("timeZone", tz);
        }
        Ok(ToolResponse::from_block(block))
    }
}
