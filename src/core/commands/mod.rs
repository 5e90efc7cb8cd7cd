// src/core/commands/mod.rs

//! This module defines all supported commands, the strict grammar they are
//! validated against, and the central `Command` enum that encapsulates their
//! parsed state.

use crate::core::FencelineError;
use crate::core::handler::command_router::{ExecutionContext, RouteResponse};
use crate::core::roster::ClientRole;
use async_trait::async_trait;

pub mod command_trait;
pub mod get_location;
pub mod get_zone;
pub mod goodbye;
pub mod grammar;
pub mod set_location;
pub mod set_zone;

pub use command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
pub use get_location::GetLocation;
pub use get_zone::GetZone;
pub use goodbye::Goodbye;
pub use set_location::SetLocation;
pub use set_zone::SetZone;

/// One fully parsed and validated command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GetLocation(GetLocation),
    SetLocation(SetLocation),
    GetZone(GetZone),
    SetZone(SetZone),
    Goodbye(Goodbye),
}

impl Command {
    /// Parses one command line against the strict grammar.
    ///
    /// The verb is the text up to the first space; its arguments must match
    /// that verb's anchored pattern exactly. Anything else is rejected,
    /// before the store is ever consulted.
    pub fn parse(line: &str) -> Result<Command, FencelineError> {
        let (verb, args) = match line.split_once(' ') {
            Some((verb, args)) => (verb, Some(args)),
            None => (line, None),
        };

        match verb {
            "getLocation" => GetLocation::parse(args).map(Command::GetLocation),
            "setLocation" => SetLocation::parse(args).map(Command::SetLocation),
            "getZone" => GetZone::parse(args).map(Command::GetZone),
            "setZone" => SetZone::parse(args).map(Command::SetZone),
            "Goodbye" => Goodbye::parse(args).map(Command::Goodbye),
            _ => Err(FencelineError::UnknownVerb(verb.to_string())),
        }
    }

    /// The wire-level verb for this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetLocation(_) => "getLocation",
            Command::SetLocation(_) => "setLocation",
            Command::GetZone(_) => "getZone",
            Command::SetZone(_) => "setZone",
            Command::Goodbye(_) => "Goodbye",
        }
    }

    /// The behavior flags for this command.
    pub fn flags(&self) -> CommandFlags {
        match self {
            Command::GetLocation(_) | Command::GetZone(_) => CommandFlags::READONLY,
            Command::SetLocation(_) | Command::SetZone(_) => CommandFlags::WRITE,
            Command::Goodbye(_) => CommandFlags::TERMINATES,
        }
    }

    /// The advisory role this verb implies for an unclassified peer, if any.
    pub fn classification_hint(&self) -> Option<ClientRole> {
        match self {
            Command::SetZone(_) => Some(ClientRole::Observer),
            Command::SetLocation(_) => Some(ClientRole::Tracker),
            _ => None,
        }
    }

    /// The argument text as it should appear in log events.
    pub fn args_for_log(&self) -> String {
        match self {
            Command::GetLocation(cmd) => cmd.device.clone(),
            Command::SetLocation(cmd) => format!("{} {}", cmd.device, cmd.location),
            Command::GetZone(cmd) => cmd.device.clone(),
            Command::SetZone(cmd) => format!("{} {}", cmd.device, cmd.zone_text),
            Command::Goodbye(_) => String::new(),
        }
    }
}

#[async_trait]
impl ExecutableCommand for Command {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RouteResponse, FencelineError> {
        match self {
            Command::GetLocation(cmd) => cmd.execute(ctx).await,
            Command::SetLocation(cmd) => cmd.execute(ctx).await,
            Command::GetZone(cmd) => cmd.execute(ctx).await,
            Command::SetZone(cmd) => cmd.execute(ctx).await,
            Command::Goodbye(cmd) => cmd.execute(ctx).await,
        }
    }
}
