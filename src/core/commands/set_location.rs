// src/core/commands/set_location.rs

use crate::core::FencelineError;
use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::grammar;
use crate::core::handler::command_router::{ExecutionContext, RouteResponse};
use async_trait::async_trait;

/// `setLocation <device> <location>` appends one coordinate pair to the
/// device's location history. Sends no reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetLocation {
    pub device: String,
    pub location: String,
}

impl ParseCommand for SetLocation {
    fn parse(args: Option<&str>) -> Result<Self, FencelineError> {
        args.and_then(grammar::set_location_args)
            .map(|(device, location)| SetLocation { device, location })
            .ok_or_else(|| FencelineError::GrammarMismatch("setLocation".to_string()))
    }
}

#[async_trait]
impl ExecutableCommand for SetLocation {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RouteResponse, FencelineError> {
        ctx.state
            .store
            .set_location(&self.device, &self.location)
            .await?;
        Ok(RouteResponse::NoReply)
    }
}
