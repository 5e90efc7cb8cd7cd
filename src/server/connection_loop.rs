// src/server/connection_loop.rs

//! Contains the main server loop for accepting connections and handling graceful shutdown.

use super::context::ServerContext;
use crate::connection::ConnectionHandler;
use crate::core::state::ClientInfo;
use anyhow::anyhow;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// The main server loop that accepts connections and handles graceful shutdown.
pub async fn run(mut ctx: ServerContext) {
    let mut session_id_counter: u64 = 0;
    let mut client_tasks = JoinSet::new();

    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow!("Failed to register SIGINT handler: {}", e))
        .expect("Failed to create SIGINT stream");
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow!("Failed to register SIGTERM handler: {}", e))
        .expect("Failed to create SIGTERM stream");

    loop {
        tokio::select! {
            biased;

            _ = sigint.recv() => {
                info!("SIGINT received, initiating graceful shutdown.");
                break;
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, initiating graceful shutdown.");
                break;
            }

            Some(res) = ctx.background_tasks.join_next() => {
                match res {
                    Ok(Ok(())) => warn!("A background task finished unexpectedly without an error."),
                    Ok(Err(e)) => { error!("CRITICAL: Background task failed: {}. Shutting down.", e); break; }
                    Err(e) => { error!("CRITICAL: Background task panicked: {e:?}. Shutting down."); break; }
                }
            },

            res = ctx.listener.accept() => {
                if let Ok((socket, addr)) = res {
                    let permit = match ctx.connection_permits.clone().try_acquire_owned() {
                        Ok(permit) => permit,
                        Err(_) => {
                            warn!(
                                "Connection from {} refused: max client limit ({}) reached.",
                                addr, ctx.state.config.max_clients
                            );
                            continue;
                        }
                    };

                    info!("Accepted new connection from: {}", addr);
                    ctx.state.stats.increment_total_connections();

                    session_id_counter = session_id_counter.wrapping_add(1);
                    let session_id = session_id_counter;
                    let state_clone = ctx.state.clone();

                    let (conn_shutdown_tx, conn_shutdown_rx) = broadcast::channel(1);
                    let global_shutdown_rx = ctx.shutdown_tx.subscribe();

                    let client_info = Arc::new(Mutex::new(ClientInfo {
                        addr,
                        session_id,
                        role: state_clone.roster.role_of(addr.ip()),
                        created: Instant::now(),
                        last_command_time: Instant::now(),
                    }));
                    state_clone.clients.insert(session_id, (client_info, conn_shutdown_tx));

                    client_tasks.spawn(async move {
                        let _permit = permit;
                        let mut handler = ConnectionHandler::new(
                            socket,
                            addr,
                            state_clone,
                            session_id,
                            conn_shutdown_rx,
                            global_shutdown_rx,
                        );
                        if let Err(e) = handler.run().await {
                            warn!("Connection from {} terminated unexpectedly: {}", addr, e);
                        }
                    });
                } else if let Err(e) = res {
                    error!("Failed to accept connection: {}", e);
                }
            },

            Some(res) = client_tasks.join_next() => {
                if let Err(e) = res {
                    if e.is_panic() {
                        error!("A client handler panicked: {e:?}");
                    }
                }
            },
        }
    }

    info!("Shutting down. Sending signal to all tasks.");
    if ctx.shutdown_tx.send(()).is_err() {
        error!("Failed to send shutdown signal. Some tasks may not terminate gracefully.");
    }

    client_tasks.shutdown().await;
    info!("All client connections closed.");

    // Client sessions may have classified peers after the saver's own final
    // save ran, so check the roster once more before exiting.
    if ctx.state.roster.is_dirty() {
        info!("Persisting known-client roster changes made during shutdown...");
        if let Err(e) = ctx.state.roster.save_if_dirty().await {
            error!("CRITICAL: Final roster save on shutdown failed: {}", e);
        }
    }

    info!("Waiting for background tasks to finish...");
    if tokio::time::timeout(Duration::from_secs(10), async {
        while ctx.background_tasks.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        warn!("Timed out waiting for background tasks to finish cleanly.");
    };

    info!(
        "Served {} connection(s) and {} command(s) ({} dropped for grammar mismatch).",
        ctx.state.stats.get_total_connections(),
        ctx.state.stats.get_total_commands(),
        ctx.state.stats.get_rejected_commands()
    );
    info!("Server shutdown complete.");
}
