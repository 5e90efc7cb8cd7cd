// src/core/tasks/roster_saver.rs

//! Implements the known-client roster auto-saver background task.
//! It periodically persists the roster when classifications or last-seen
//! updates have accumulated, and performs a final save on shutdown.

use crate::core::state::ServerState;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// The background task struct for the roster auto-saver.
pub struct RosterSaverTask {
    state: Arc<ServerState>,
}

impl RosterSaverTask {
    /// Creates a new RosterSaverTask.
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// The main run loop: saves on a fixed interval while dirty, and handles
    /// graceful shutdown with a final save.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!("Roster auto-saver task started.");
        let mut interval = tokio::time::interval(self.state.config.roster.save_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if !self.state.roster.is_dirty() {
                        continue;
                    }
                    match self.state.roster.save_if_dirty().await {
                        Ok(()) => debug!(
                            "Known-client roster saved ({} peer(s)).",
                            self.state.roster.len()
                        ),
                        Err(e) => error!("Failed to save known-client roster: {}", e),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Roster auto-saver task received shutdown signal.");
                    if self.state.roster.is_dirty() {
                        info!("Performing final roster save on shutdown...");
                        if let Err(e) = self.state.roster.save_if_dirty().await {
                            error!("Final roster save on shutdown failed: {}", e);
                        }
                    }
                    return;
                }
            }
        }
    }
}
