// src/server/initialization.rs

//! Handles the complete server initialization process, from state setup and
//! storage scanning to binding the listener.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::state::ServerState;
use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, broadcast};
use tokio::task::JoinSet;
use tracing::info;

/// Initializes all server components before starting the main loop.
pub async fn setup(config: Config) -> Result<ServerContext> {
    log_startup_info(&config);
    let (shutdown_tx, _) = broadcast::channel(1);

    let server_state = ServerState::initialize(config.clone())?;
    info!(
        "Server state initialized. run_id: {}, known devices: {}, known clients: {}",
        server_state.run_id,
        server_state.store.device_count(),
        server_state.roster.len()
    );

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(
        "Fenceline server listening on {}:{}",
        config.host, config.port
    );
    let connection_permits = Arc::new(Semaphore::new(config.max_clients));

    Ok(ServerContext {
        state: server_state,
        listener,
        shutdown_tx,
        background_tasks: JoinSet::new(),
        connection_permits,
    })
}

/// Logs key configuration parameters at startup.
fn log_startup_info(config: &Config) {
    info!("Device records stored under '{}'.", config.storage.dir);
    info!(
        "Idle sessions are finished after {:?} without a complete frame.",
        config.idle_timeout
    );
    info!(
        "Accepting at most {} concurrent clients.",
        config.max_clients
    );
}
