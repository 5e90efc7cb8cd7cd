// src/connection/handler.rs

//! Defines the `ConnectionHandler` which manages the full lifecycle of a client connection.

use super::guard::ConnectionGuard;
use super::session::{SessionPhase, SessionState};
use crate::core::events::truncate_for_log;
use crate::core::handler::command_router::{RouteResponse, Router};
use crate::core::protocol::FrameCodec;
use crate::core::state::ServerState;
use crate::core::{Command, FencelineError};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// The next step for the connection's main loop to take.
enum NextAction {
    Continue,
    ExitLoop,
}

/// Manages the full lifecycle of a client connection.
pub struct ConnectionHandler {
    framed: Framed<TcpStream, FrameCodec>,
    addr: SocketAddr,
    state: Arc<ServerState>,
    session_id: u64,
    shutdown_rx: broadcast::Receiver<()>,
    global_shutdown_rx: broadcast::Receiver<()>,
    session: SessionState,
    idle_timeout: Duration,
}

impl ConnectionHandler {
    /// Creates a new `ConnectionHandler`. The session starts with the peer's
    /// remembered role when its address was classified in an earlier session.
    pub fn new(
        socket: TcpStream,
        addr: SocketAddr,
        state: Arc<ServerState>,
        session_id: u64,
        shutdown_rx: broadcast::Receiver<()>,
        global_shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        let known_role = state.roster.role_of(addr.ip());
        state.roster.note_seen(addr.ip());
        let idle_timeout = state.config.idle_timeout;
        Self {
            framed: Framed::new(socket, FrameCodec),
            addr,
            state,
            session_id,
            shutdown_rx,
            global_shutdown_rx,
            session: SessionState::new(known_role),
            idle_timeout,
        }
    }

    /// The main event loop for the connection: reads frames until a terminal
    /// event ends the session (Goodbye, idle timeout, decode failure, peer
    /// disconnect, or server shutdown).
    pub async fn run(&mut self) -> Result<(), FencelineError> {
        let _guard = ConnectionGuard::new(self.state.clone(), self.session_id, self.addr);

        'main_loop: loop {
            self.session.phase = SessionPhase::AwaitingFrame;

            tokio::select! {
                // Prioritize shutdown signals over client traffic.
                biased;
                _ = self.global_shutdown_rx.recv() => {
                    info!(
                        "Connection handler for {} received GLOBAL shutdown signal.",
                        self.addr
                    );
                    break 'main_loop;
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Connection handler for {} received kill signal.", self.addr);
                    break 'main_loop;
                }
                result = tokio::time::timeout(self.idle_timeout, self.framed.next()) => {
                    match result {
                        // A quiet connection is finished, not broken.
                        Err(_elapsed) => {
                            debug!(
                                "Session {} for {} idle for {:?}; closing.",
                                self.session_id, self.addr, self.idle_timeout
                            );
                            break 'main_loop;
                        }
                        Ok(Some(Ok(line))) => {
                            self.session.phase = SessionPhase::Processing;
                            match self.process_line(line).await {
                                Ok(NextAction::Continue) => {}
                                Ok(NextAction::ExitLoop) => break 'main_loop,
                                Err(e) => {
                                    warn!("Connection error for {}: {}", self.addr, e);
                                    break 'main_loop;
                                }
                            }
                        }
                        Ok(Some(Err(e))) => {
                            if is_normal_disconnect(&e) {
                                debug!("Connection from {} closed by peer: {}", self.addr, e);
                            } else {
                                warn!("Frame decode failed for {}: {}", self.addr, e);
                            }
                            break 'main_loop;
                        }
                        Ok(None) => {
                            debug!("Connection from {} closed by peer.", self.addr);
                            break 'main_loop;
                        }
                    }
                }
            }
        }

        self.session.phase = SessionPhase::Closed;
        debug!(
            "Session {} for {} closed after {} command(s).",
            self.session_id, self.addr, self.session.commands_processed
        );
        Ok(())
    }

    /// Parses one line, routes it, and writes the reply when there is one.
    ///
    /// Lines that fail grammar validation are dropped without a reply and
    /// without touching the store. A store failure is contained to that one
    /// command and the session stays alive. Only a failed reply write ends
    /// the session.
    async fn process_line(&mut self, line: String) -> Result<NextAction, FencelineError> {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) if e.is_grammar_mismatch() => {
                self.state.stats.increment_rejected_commands();
                warn!(
                    peer = %self.addr,
                    line = %truncate_for_log(&line),
                    "Dropped command that failed grammar validation: {e}"
                );
                return Ok(NextAction::Continue);
            }
            Err(e) => return Err(e),
        };

        let mut router = Router::new(
            self.state.clone(),
            self.session_id,
            self.addr,
            &mut self.session,
        );

        match router.route(command).await {
            Ok(RouteResponse::Reply(reply)) => {
                self.session.commands_processed += 1;
                self.framed.send(reply).await?;
                Ok(NextAction::Continue)
            }
            Ok(RouteResponse::NoReply) => {
                self.session.commands_processed += 1;
                Ok(NextAction::Continue)
            }
            Ok(RouteResponse::Terminate) => {
                self.session.commands_processed += 1;
                debug!("Session {} for {} said goodbye.", self.session_id, self.addr);
                Ok(NextAction::ExitLoop)
            }
            Err(e) => {
                warn!(
                    peer = %self.addr,
                    "Command failed; session continues with no reply: {e}"
                );
                Ok(NextAction::Continue)
            }
        }
    }
}

/// Distinguishes orderly peer disconnects from unexpected I/O failures.
fn is_normal_disconnect(e: &FencelineError) -> bool {
    matches!(e, FencelineError::Io(err) if matches!(
        err.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionAborted
    ))
}
