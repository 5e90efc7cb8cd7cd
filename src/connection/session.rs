// src/connection/session.rs

//! Defines the state associated with a single client session.

use crate::core::roster::ClientRole;

/// Where a session is in its lifecycle. A session alternates between waiting
/// for a frame and processing one until a terminal event closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingFrame,
    Processing,
    Closed,
}

/// Holds the state specific to a single client session.
#[derive(Debug)]
pub struct SessionState {
    /// The advisory role of the peer. Fixed once assigned, possibly during an
    /// earlier run of the server.
    pub classification: Option<ClientRole>,
    /// The current lifecycle phase.
    pub phase: SessionPhase,
    /// Number of commands executed on this session.
    pub commands_processed: u64,
}

impl SessionState {
    /// Creates a new `SessionState`, seeded with the peer's remembered role
    /// when its address is already in the roster.
    pub(crate) fn new(classification: Option<ClientRole>) -> Self {
        Self {
            classification,
            phase: SessionPhase::AwaitingFrame,
            commands_processed: 0,
        }
    }
}
