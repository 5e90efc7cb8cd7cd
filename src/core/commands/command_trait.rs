// src/core/commands/command_trait.rs

//! Defines the core traits for all executable commands.

use crate::core::FencelineError;
use crate::core::handler::command_router::{ExecutionContext, RouteResponse};
use async_trait::async_trait;
use bitflags::bitflags;

bitflags! {
    /// Flags that describe the properties and behavior of a command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct CommandFlags: u32 {
        /// The command modifies device records.
        const WRITE      = 1 << 0;
        /// The command only reads device records.
        const READONLY   = 1 << 1;
        /// The command ends the session after execution.
        const TERMINATES = 1 << 2;
    }
}

/// A trait for parsing a command's argument text.
///
/// `args` is everything after the verb and its separating space, or `None`
/// when the line consisted of the verb alone. Arguments either match the
/// verb's anchored pattern in full or the command is rejected.
pub trait ParseCommand {
    fn parse(args: Option<&str>) -> Result<Self, FencelineError>
    where
        Self: Sized;
}

/// A trait for the actual execution logic of a command.
/// Implemented by each command's struct (e.g., `GetLocation`, `SetZone`).
#[async_trait]
pub trait ExecutableCommand {
    /// The core logic for the command's execution.
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RouteResponse, FencelineError>;
}
