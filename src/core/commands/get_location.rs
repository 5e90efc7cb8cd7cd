// src/core/commands/get_location.rs

use crate::core::FencelineError;
use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::grammar;
use crate::core::handler::command_router::{ExecutionContext, RouteResponse};
use async_trait::async_trait;

/// `getLocation <device>` replies with the most recent location recorded for
/// the device, or the location sentinel when the history is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetLocation {
    pub device: String,
}

impl ParseCommand for GetLocation {
    fn parse(args: Option<&str>) -> Result<Self, FencelineError> {
        match args {
            Some(device) if grammar::is_device_name(device) => Ok(GetLocation {
                device: device.to_string(),
            }),
            _ => Err(FencelineError::GrammarMismatch("getLocation".to_string())),
        }
    }
}

#[async_trait]
impl ExecutableCommand for GetLocation {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RouteResponse, FencelineError> {
        let location = ctx.state.store.get_location(&self.device).await?;
        Ok(RouteResponse::Reply(location))
    }
}
