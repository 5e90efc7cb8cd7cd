// src/core/handler/command_router.rs

//! The central component for routing parsed commands to their handlers.
//!
//! The `Router` receives a fully validated `Command` from the
//! `ConnectionHandler`, applies the advisory peer classification, executes
//! the command against shared state, and records the exchange for
//! observability.

use crate::connection::SessionState;
use crate::core::commands::command_trait::ExecutableCommand;
use crate::core::events::CommandEvent;
use crate::core::roster::ClientRole;
use crate::core::state::ServerState;
use crate::core::{Command, FencelineError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, info_span};

/// Represents the response a command produces for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResponse {
    /// A single framed text reply.
    Reply(String),
    /// The command completed but sends nothing back.
    NoReply,
    /// The session must end, with no further reply.
    Terminate,
}

impl RouteResponse {
    /// The reply text, when there is one.
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            RouteResponse::Reply(text) => Some(text),
            _ => None,
        }
    }
}

/// Everything a command needs at execution time.
pub struct ExecutionContext {
    pub state: Arc<ServerState>,
    pub peer: SocketAddr,
    pub session_id: u64,
}

/// The `Router` directs one parsed command through classification, execution,
/// and event recording.
pub struct Router<'a> {
    state: Arc<ServerState>,
    session_id: u64,
    addr: SocketAddr,
    session: &'a mut SessionState,
}

impl<'a> Router<'a> {
    /// Creates a new `Router` for a given command and session.
    pub fn new(
        state: Arc<ServerState>,
        session_id: u64,
        addr: SocketAddr,
        session: &'a mut SessionState,
    ) -> Self {
        Self {
            state,
            session_id,
            addr,
            session,
        }
    }

    /// The main entry point for routing a command.
    pub async fn route(&mut self, command: Command) -> Result<RouteResponse, FencelineError> {
        self.state.stats.increment_total_commands();

        // Instrument the whole command flow with key metadata about the
        // command and client.
        let span = info_span!(
            "command",
            name = %command.name(),
            client.addr = %self.addr,
            client.id = %self.session_id,
        );

        async move {
            let newly_classified = self.classify_peer(&command);
            self.touch_client(newly_classified).await;

            let mut ctx = ExecutionContext {
                state: self.state.clone(),
                peer: self.addr,
                session_id: self.session_id,
            };
            let response = command.execute(&mut ctx).await?;

            self.state.events.record(CommandEvent::new(
                self.addr,
                command.name(),
                command.args_for_log(),
                response.reply_text().map(str::to_string),
            ));

            Ok(response)
        }
        .instrument(span)
        .await
    }

    /// Assigns the advisory role on the first classifiable verb from a peer
    /// that has never been classified. Returns the role only when this call
    /// assigned it.
    fn classify_peer(&mut self, command: &Command) -> Option<ClientRole> {
        if self.session.classification.is_some() {
            return None;
        }
        let hint = command.classification_hint()?;
        let role = self.state.roster.classify(self.addr.ip(), hint);
        self.session.classification = Some(role);
        debug!(peer = %self.addr, role = %role, "Peer classified");
        Some(role)
    }

    /// Updates the connection registry entry for this session: last activity
    /// time, and the role when it was just assigned.
    async fn touch_client(&self, role: Option<ClientRole>) {
        let client_info = self
            .state
            .clients
            .get(&self.session_id)
            .map(|entry| entry.value().0.clone());

        if let Some(info) = client_info {
            let mut info = info.lock().await;
            info.last_command_time = Instant::now();
            if role.is_some() {
                info.role = role;
            }
        }
    }
}
