// src/core/commands/get_zone.rs

use crate::core::FencelineError;
use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::grammar;
use crate::core::handler::command_router::{ExecutionContext, RouteResponse};
use async_trait::async_trait;

/// `getZone <device>` replies with the device's zone lines joined by
/// newlines, or the zone sentinel when no zone is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetZone {
    pub device: String,
}

impl ParseCommand for GetZone {
    fn parse(args: Option<&str>) -> Result<Self, FencelineError> {
        match args {
            Some(device) if grammar::is_device_name(device) => Ok(GetZone {
                device: device.to_string(),
            }),
            _ => Err(FencelineError::GrammarMismatch("getZone".to_string())),
        }
    }
}

#[async_trait]
impl ExecutableCommand for GetZone {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RouteResponse, FencelineError> {
        let zone = ctx.state.store.get_zone(&self.device).await?;
        Ok(RouteResponse::Reply(zone))
    }
}
