// src/server/spawner.rs

//! Spawns the server's long-running background tasks.

use super::context::ServerContext;
use crate::core::tasks::RosterSaverTask;
use anyhow::Result;
use tracing::info;

/// Spawns all background tasks into the provided JoinSet.
pub fn spawn_all(ctx: &mut ServerContext) -> Result<()> {
    let roster_saver = RosterSaverTask::new(ctx.state.clone());
    let shutdown_rx_roster = ctx.shutdown_tx.subscribe();
    ctx.background_tasks.spawn(async move {
        roster_saver.run(shutdown_rx_roster).await;
        Ok(())
    });

    info!("All background tasks have been spawned.");
    Ok(())
}
