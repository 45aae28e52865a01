//! `get_daily_forecast` and `get_hourly_forecast`: one implementation,
//! parameterized by [`ForecastKind`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clients::nws::ForecastPeriod;
use crate::core::content::{ContentBlock, ToolResponse};
use crate::core::error::ToolError;
use crate::core::params;
use crate::core::schema::{InputSchema, SchemaType};
use crate::core::tool::{Params, Tool, ToolSpec};
use crate::tools::common::{self, format_time, GRID_POINT_URL, UNITS};
use crate::tools::context::ToolContext;

pub const DAILY: &str = "get_daily_forecast";
pub const HOURLY: &str = "get_hourly_forecast";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastKind {
    Daily,
    Hourly,
}

impl ForecastKind {
    fn limit_key(self) -> &'static str {
        match self {
            ForecastKind::Daily => "maxPeriods",
            ForecastKind::Hourly => "maxHours",
        }
    }

    fn limit_range(self) -> std::ops::RangeInclusive<u64> {
        match self {
            ForecastKind::Daily => 1..=14,
            ForecastKind::Hourly => 1..=156,
        }
    }

    fn limit_default(self) -> u64 {
        match self {
            ForecastKind::Daily => 14,
            ForecastKind::Hourly => 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Args {
    grid_point_url: String,
    units: String,
}

pub struct GetForecast {
    ctx: ToolContext,
    kind: ForecastKind,
}

impl GetForecast {
    pub fn new(ctx: ToolContext, kind: ForecastKind) -> Self {
        Self { ctx, kind }
    }

    pub fn daily(ctx: &ToolContext) -> Arc<dyn Tool> {
        Arc::new(Self::new(ctx.clone(), ForecastKind::Daily))
    }

    pub fn hourly(ctx: &ToolContext) -> Arc<dyn Tool> {
        Arc::new(Self::new(ctx.clone(), ForecastKind::Hourly))
    }

    fn render_period(&self, p: &ForecastPeriod) -> String {
        let label = match self.kind {
            ForecastKind::Daily if !p.name.is_empty() => p.name.clone(),
            _ => format_time(&p.start_time),
        };
        let mut line = format!("{label}: {:.0}°{}, {}", p.temperature, p.temperature_unit, p.short_forecast);
        if let Some(pop) = p.probability_of_precipitation.as_ref().and_then(|m| m.value) {
            line.push_str(&format!(", {pop:.0}% chance of precipitation"));
        }
        if let Some(speed) = p.wind_speed.as_deref().filter(|s| !s.is_empty()) {
            match p.wind_direction.as_deref().filter(|d| !d.is_empty()) {
                Some(dir) => line.push_str(&format!(", wind {dir} {speed}")),
                None => line.push_str(&format!(", wind {speed}")),
            }
        }
        if self.kind == ForecastKind::Daily {
            if let Some(detail) = p.detailed_forecast.as_deref().filter(|s| !s.is_empty()) {
                line.push_str(&format!("\n  {detail}"));
            }
        }
        line
    }
}

impl ToolSpec for GetForecast {
    fn name(&self) -> &'static str {
        match self.kind {
            ForecastKind::Daily => DAILY,
            ForecastKind::Hourly => HOURLY,
        }
    }

    fn description(&self) -> &'static str {
        match self.kind {
            ForecastKind::Daily => {
                "Get the day and night forecast periods for a grid point. Requires the \
                 gridPointUrl returned by get_grid_point."
            }
            ForecastKind::Hourly => {
                "Get the hour-by-hour forecast for a grid point. Requires the gridPointUrl \
                 returned by get_grid_point."
            }
        }
    }

    fn input_schema(&self) -> InputSchema {
        let limit_desc = match self.kind {
            ForecastKind::Daily => "Number of forecast periods to return, 1 to 14 (default 14)",
            ForecastKind::Hourly => "Number of hours to return, 1 to 156 (default 12)",
        };
        InputSchema::object()
            .required(GRID_POINT_URL, SchemaType::String, "gridPointUrl from get_grid_point")
            .optional(UNITS, SchemaType::String, "\"us\" (default) or \"si\"")
            .optional(self.kind.limit_key(), SchemaType::Integer, limit_desc)
    }
}

#[async_trait]
impl Tool for GetForecast {
    fn validate_with_defaults(&self, params: &Params) -> Result<Params, ToolError> {
        let grid_point_url = common::grid_point_url(params, self.ctx.nws_base_url())?;
        let units = common::units(params)?;
        let limit = params::optional_integer(
            params,
            self.kind.limit_key(),
            self.kind.limit_range(),
            self.kind.limit_default(),
        )?;
        let mut out = params::to_params(&Args { grid_point_url, units: units.into() });
        out.insert(self.kind.limit_key().into(), limit.into());
        Ok(out)
    }

    async fn process_tool_workflow(&self, params: Params) -> Result<ToolResponse, ToolError> {
        let limit = params
            .get(self.kind.limit_key())
            .and_then(|v| v.as_u64())
            .unwrap_or(self.kind.limit_default());
        let args: Args = params::from_params(params)?;
        let ua = self.ctx.user_agent_header_text()?;
        let hourly = self.kind == ForecastKind::Hourly;
        let periods = self
            .ctx
            .nws()
            .forecast(&args.grid_point_url, hourly, &args.units, &ua)
            .await?;

        let shown: Vec<String> = periods
            .iter()
            .take(limit as usize)
            .map(|p| self.render_period(p))
            .collect();
        let heading = match self.kind {
            ForecastKind::Daily => "Forecast",
            ForecastKind::Hourly => "Hourly forecast",
        };
        let text = if shown.is_empty() {
            format!("{heading}: no periods available for {}.", args.grid_point_url)
        } else {
            format!("{heading} ({} units):\n{}", args.units, shown.join("\n"))
        };
        Ok(ToolResponse::from_block(
            ContentBlock::text(text)
                .with_annotation("gridPointUrl", args.grid_point_url)
                .with_annotation("units", args.units)
                .with_annotation("periods", shown.len()),
        ))
    }
}
