pub mod common;
pub mod context;
pub mod current_conditions;
pub mod forecast;
pub mod grid_point;
pub mod registry;
pub mod zip_to_coordinates;

use std::sync::Arc;

use crate::core::tool::Tool;
use context::ToolContext;

pub type ToolFactory = fn(&ToolContext) -> Arc<dyn Tool>;

/// Every tool the gateway can serve. Adding a tool means adding it here.
pub const BUILTIN_TOOLS: &[ToolFactory] = &[
    zip_to_coordinates::ZipToCoordinates::factory,
    grid_point::GetGridPoint::factory,
    forecast::GetForecast::daily,
    forecast::GetForecast::hourly,
    current_conditions::GetCurrentConditions::factory,
];
