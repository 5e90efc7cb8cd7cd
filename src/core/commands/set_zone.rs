// src/core/commands/set_zone.rs

use crate::core::FencelineError;
use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::grammar;
use crate::core::handler::command_router::{ExecutionContext, RouteResponse};
use async_trait::async_trait;

/// `setZone <device> <zone-text>` replaces the device's zone wholesale with
/// the newline-split lines of the payload. Sends no reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetZone {
    pub device: String,
    pub zone_text: String,
}

impl ParseCommand for SetZone {
    fn parse(args: Option<&str>) -> Result<Self, FencelineError> {
        args.and_then(grammar::set_zone_args)
            .map(|(device, zone_text)| SetZone { device, zone_text })
            .ok_or_else(|| FencelineError::GrammarMismatch("setZone".to_string()))
    }
}

#[async_trait]
impl ExecutableCommand for SetZone {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RouteResponse, FencelineError> {
        ctx.state
            .store
            .set_zone(&self.device, &self.zone_text)
            .await?;
        Ok(RouteResponse::NoReply)
    }
}
