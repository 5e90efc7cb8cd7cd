// src/connection/mod.rs

//! Manages the lifecycle of a single client TCP connection, including frame
//! decoding, grammar validation, execution routing, and session state.

mod guard;
mod handler;
mod session;

pub use guard::ConnectionGuard;
pub use handler::ConnectionHandler;
pub use session::{SessionPhase, SessionState};
