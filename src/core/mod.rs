// src/core/mod.rs

//! The central module containing the core logic and data structures of Fenceline.

pub mod commands;
pub mod errors;
pub mod events;
pub mod handler;
pub mod protocol;
pub mod roster;
pub mod state;
pub mod store;
pub mod tasks;

pub use commands::Command;
pub use errors::FencelineError;
pub use protocol::FrameCodec;
