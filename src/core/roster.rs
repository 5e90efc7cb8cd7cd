// src/core/roster.rs

//! The known-client roster: an advisory map from peer IP address to the role
//! inferred from the first classifiable verb that peer issued, persisted
//! across restarts.

use crate::core::errors::FencelineError;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// The advisory role a peer plays: `setZone` marks an observer, `setLocation`
/// a tracker. Roles never affect which verbs a peer may issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    Observer,
    Tracker,
}

impl fmt::Display for ClientRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientRole::Observer => write!(f, "observer"),
            ClientRole::Tracker => write!(f, "tracker"),
        }
    }
}

/// One remembered peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownClient {
    pub role: ClientRole,
    /// Unix timestamp of the last connection or classification.
    #[serde(default)]
    pub last_seen: i64,
}

/// Peer-address role bookkeeping with dirty tracking for the background
/// saver.
#[derive(Debug)]
pub struct ClientRoster {
    path: PathBuf,
    clients: DashMap<IpAddr, KnownClient>,
    dirty: AtomicBool,
}

impl ClientRoster {
    /// Loads the roster from `path`. A missing file is an empty roster; a
    /// file that exists but does not parse is a startup error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, FencelineError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let clients = DashMap::new();
        match std::fs::read(&path) {
            Ok(bytes) => {
                let stored: BTreeMap<IpAddr, KnownClient> = serde_json::from_slice(&bytes)
                    .map_err(|source| FencelineError::RecordCorrupt {
                        path: path.clone(),
                        source,
                    })?;
                for (ip, client) in stored {
                    clients.insert(ip, client);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(ClientRoster {
            path,
            clients,
            dirty: AtomicBool::new(false),
        })
    }

    /// Records `role` for `ip` unless the peer already has one, and returns
    /// the authoritative role either way. The first classification wins,
    /// including classifications from previous runs.
    pub fn classify(&self, ip: IpAddr, role: ClientRole) -> ClientRole {
        let entry = self.clients.entry(ip).or_insert_with(|| {
            self.dirty.store(true, Ordering::Release);
            KnownClient {
                role,
                last_seen: chrono::Utc::now().timestamp(),
            }
        });
        entry.role
    }

    /// The remembered role for `ip`, if any.
    pub fn role_of(&self, ip: IpAddr) -> Option<ClientRole> {
        self.clients.get(&ip).map(|entry| entry.role)
    }

    /// Bumps the last-seen timestamp for an already-known peer.
    pub fn note_seen(&self, ip: IpAddr) {
        if let Some(mut entry) = self.clients.get_mut(&ip) {
            entry.last_seen = chrono::Utc::now().timestamp();
            self.dirty.store(true, Ordering::Release);
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Whether there are changes not yet persisted.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Persists the roster when it has unsaved changes. On failure the dirty
    /// flag is restored so a later attempt retries.
    pub async fn save_if_dirty(&self) -> Result<(), FencelineError> {
        if self.dirty.swap(false, Ordering::AcqRel)
            && let Err(e) = self.save().await
        {
            self.dirty.store(true, Ordering::Release);
            return Err(e);
        }
        Ok(())
    }

    /// Writes the roster to its file via a randomized temp sibling and an
    /// atomic rename.
    pub async fn save(&self) -> Result<(), FencelineError> {
        let snapshot: BTreeMap<IpAddr, KnownClient> = self
            .clients
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        let payload = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| FencelineError::Internal(format!("roster serialization failed: {e}")))?;

        let temp_path = self
            .path
            .with_extension(format!("tmp.{}", rand::random::<u32>()));

        if let Err(e) = tokio::fs::write(&temp_path, &payload).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// The roster file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
