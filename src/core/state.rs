// src/core/state.rs

//! Defines the shared `ServerState` and its per-connection bookkeeping.

use crate::config::Config;
use crate::core::errors::FencelineError;
use crate::core::events::EventLog;
use crate::core::roster::{ClientRole, ClientRoster};
use crate::core::store::DeviceStore;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::{Mutex, broadcast};

/// The sending half of a per-connection shutdown channel.
pub type ShutdownSender = broadcast::Sender<()>;

/// The value stored for each connected client.
pub type ClientStateTuple = (Arc<Mutex<ClientInfo>>, ShutdownSender);

/// The global map of connected clients, keyed by session id.
pub type ClientMap = Arc<DashMap<u64, ClientStateTuple>>;

/// Metadata about a single connected client.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub addr: SocketAddr,
    pub session_id: u64,
    /// Advisory role, filled in once the peer is classified.
    pub role: Option<ClientRole>,
    pub created: Instant,
    pub last_command_time: Instant,
}

/// Holds all state and logic related to server-wide statistics.
#[derive(Debug)]
pub struct StatsState {
    /// Connections accepted since startup.
    total_connections: AtomicU64,
    /// Commands executed since startup.
    total_commands: AtomicU64,
    /// Command lines dropped by grammar validation since startup.
    rejected_commands: AtomicU64,
}

impl Default for StatsState {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsState {
    /// Creates a new `StatsState` with initialized counters.
    pub fn new() -> Self {
        Self {
            total_connections: AtomicU64::new(0),
            total_commands: AtomicU64::new(0),
            rejected_commands: AtomicU64::new(0),
        }
    }

    /// Atomically increments the total number of connections received.
    pub fn increment_total_connections(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the total number of connections received.
    pub fn get_total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    /// Atomically increments the total number of commands executed.
    pub fn increment_total_commands(&self) {
        self.total_commands.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the total number of commands executed.
    pub fn get_total_commands(&self) -> u64 {
        self.total_commands.load(Ordering::Relaxed)
    }

    /// Atomically increments the number of rejected command lines.
    pub fn increment_rejected_commands(&self) {
        self.rejected_commands.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the number of rejected command lines.
    pub fn get_rejected_commands(&self) -> u64 {
        self.rejected_commands.load(Ordering::Relaxed)
    }
}

/// The single shared state for the whole server process.
#[derive(Debug)]
pub struct ServerState {
    pub config: Config,
    pub store: DeviceStore,
    pub roster: ClientRoster,
    pub clients: ClientMap,
    pub events: EventLog,
    pub stats: StatsState,
    /// Random id generated at boot, for correlating logs across restarts.
    pub run_id: String,
}

impl ServerState {
    /// Initializes the entire server state from the given configuration:
    /// generates the run id, opens the device store (registering existing
    /// records), and loads the known-client roster.
    pub fn initialize(config: Config) -> Result<Arc<Self>, FencelineError> {
        let mut run_id_bytes = [0u8; 20];
        getrandom::fill(&mut run_id_bytes)
            .map_err(|e| FencelineError::Internal(e.to_string()))?;
        let run_id = hex::encode(run_id_bytes);

        let store = DeviceStore::open(config.storage.dir.clone())?;
        let roster = ClientRoster::open(config.roster_path())?;

        Ok(Arc::new(ServerState {
            config,
            store,
            roster,
            clients: Arc::new(DashMap::new()),
            events: EventLog::new(),
            stats: StatsState::new(),
            run_id,
        }))
    }
}
