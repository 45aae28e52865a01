use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clients::nws::Observation;
use crate::core::content::{ContentBlock, ToolResponse};
use crate::core::error::ToolError;
use crate::core::params;
use crate::core::schema::{InputSchema, SchemaType};
use crate::core::tool::{Params, Tool, ToolSpec};
use crate::tools::common::{self, format_time, GRID_POINT_URL, UNITS};
use crate::tools::context::ToolContext;

pub const NAME: &str = "get_current_conditions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Args {
    grid_point_url: String,
    units: String,
}

/// Latest observation from the first station serving a grid point.
pub struct GetCurrentConditions {
    ctx: ToolContext,
}

impl GetCurrentConditions {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    pub fn factory(ctx: &ToolContext) -> Arc<dyn Tool> {
        Arc::new(Self::new(ctx.clone()))
    }
}

fn render(station: &str, obs: &Observation, units: &str) -> String {
    let mut lines = vec![format!("Current conditions at {station} as of {}:", format_time(&obs.timestamp))];
    if let Some(desc) = obs.text_description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("Sky: {desc}"));
    }
    lines.push(format!("Temperature: {}", common::temperature(&obs.temperature, units)));
    lines.push(format!("Dewpoint: {}", common::temperature(&obs.dewpoint, units)));
    lines.push(format!("Humidity: {}", common::percent(&obs.relative_humidity)));
    lines.push(format!(
        "Wind: {} from {}",
        common::wind_speed(&obs.wind_speed, units),
        common::degrees(&obs.wind_direction)
    ));
    lines.push(format!("Pressure: {}", common::pressure(&obs.barometric_pressure, units)));
    lines.join("\n")
}

impl ToolSpec for GetCurrentConditions {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Get the latest observed weather near a grid point. Requires the gridPointUrl \
         returned by get_grid_point."
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::object()
            .required(GRID_POINT_URL, SchemaType::String, "gridPointUrl from get_grid_point")
            .optional(UNITS, SchemaType::String, "\"us\" (default) or \"si\"")
    }
}

#[async_trait]
impl Tool for GetCurrentConditions {
    fn validate_with_defaults(&self, params: &Params) -> Result<Params, ToolError> {
        let grid_point_url = common::grid_point_url(params, self.ctx.nws_base_url())?;
        let units = common::units(params)?;
        Ok(params::to_params(&Args { grid_point_url, units: units.into() }))
    }

    async fn process_tool_workflow(&self, params: Params) -> Result<ToolResponse, ToolError> {
        let args: Args = params::from_params(params)?;
        let ua = self.ctx.user_agent_header_text()?;
        let nws = self.ctx.nws();

        let stations = nws.stations(&args.grid_point_url, &ua).await?;
        let station = stations.into_iter().next().ok_or_else(|| {
            ToolError::missing_field("features[0]", format!("{}/stations", args.grid_point_url))
        })?;
        let obs = nws.latest_observation(&station.station_identifier, &ua).await?;

        let label = format!("{} ({})", station.name, station.station_identifier);
        Ok(ToolResponse::from_block(
            ContentBlock::text(render(&label, &obs, &args.units))
                .with_annotation("gridPointUrl", args.grid_point_url)
                .with_annotation("stationId", station.station_identifier)
                .with_annotation("observedAt", obs.timestamp)
                .with_annotation("units", args.units),
        ))
    }
}
