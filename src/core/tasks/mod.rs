// src/core/tasks/mod.rs

//! This module contains the long-running background tasks that support the
//! server's core functionality.

pub mod roster_saver;

pub use roster_saver::RosterSaverTask;
