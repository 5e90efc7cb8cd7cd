// src/core/commands/goodbye.rs

use crate::core::FencelineError;
use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::handler::command_router::{ExecutionContext, RouteResponse};
use async_trait::async_trait;

/// `Goodbye` ends the session immediately. Takes no arguments and sends no
/// reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Goodbye;

impl ParseCommand for Goodbye {
    fn parse(args: Option<&str>) -> Result<Self, FencelineError> {
        match args {
            None => Ok(Goodbye),
            Some(_) => Err(FencelineError::GrammarMismatch("Goodbye".to_string())),
        }
    }
}

#[async_trait]
impl ExecutableCommand for Goodbye {
    async fn execute(&self, _ctx: &mut ExecutionContext) -> Result<RouteResponse, FencelineError> {
        Ok(RouteResponse::Terminate)
    }
}
