// src/core/store/device.rs

//! A single tracked device: its on-disk record and its write lock.

use crate::core::errors::FencelineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// The durable, human-inspectable representation of one device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Location history, append-only, most recent last.
    #[serde(default)]
    pub location: Vec<String>,
    /// Zone lines, replaced wholesale on update.
    #[serde(default)]
    pub zone: Vec<String>,
}

/// One tracked device. The record file is the authoritative copy; the handle
/// carries the file path and the write lock, so record and lock always exist
/// together.
#[derive(Debug)]
pub struct Device {
    name: String,
    path: PathBuf,
    /// Serializes read-modify-write cycles on the record file. Writers hold
    /// it for the whole cycle; readers never take it and rely on the atomic
    /// rename in the write path instead.
    pub write_lock: Mutex<()>,
    on_disk: AtomicBool,
}

impl Device {
    pub(crate) fn new(name: &str, path: PathBuf) -> Self {
        Device {
            name: name.to_string(),
            path,
            write_lock: Mutex::new(()),
            on_disk: AtomicBool::new(false),
        }
    }

    /// A handle for a record file discovered on disk at startup.
    pub(crate) fn existing(name: &str, path: PathBuf) -> Self {
        Device {
            name: name.to_string(),
            path,
            write_lock: Mutex::new(()),
            on_disk: AtomicBool::new(true),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the initial empty record if this device has never touched disk.
    ///
    /// Runs under the write lock so concurrent first references collapse into
    /// one initial write. A failed write leaves the flag unset and the next
    /// reference retries.
    pub(crate) async fn ensure_on_disk(&self) -> Result<(), FencelineError> {
        if self.on_disk.load(Ordering::Acquire) {
            return Ok(());
        }

        let _guard = self.write_lock.lock().await;
        if self.on_disk.load(Ordering::Acquire) {
            return Ok(());
        }

        if !tokio::fs::try_exists(&self.path).await? {
            self.write_record(&DeviceRecord::default()).await?;
        }
        self.on_disk.store(true, Ordering::Release);
        Ok(())
    }

    /// Reads the current record without taking the write lock. Racing a
    /// concurrent rewrite is safe because writers replace the file atomically
    /// via rename.
    pub async fn load(&self) -> Result<DeviceRecord, FencelineError> {
        let bytes = tokio::fs::read(&self.path).await?;
        serde_json::from_slice(&bytes).map_err(|source| FencelineError::RecordCorrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Appends one location to the history under the write lock.
    pub async fn append_location(&self, location: &str) -> Result<(), FencelineError> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.load().await?;
        record.location.push(location.to_string());
        self.write_record(&record).await
    }

    /// Replaces the zone wholesale under the write lock. Empty text clears
    /// the zone; anything else is stored as its newline-split lines.
    pub async fn replace_zone(&self, zone_text: &str) -> Result<(), FencelineError> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.load().await?;
        record.zone = if zone_text.is_empty() {
            Vec::new()
        } else {
            zone_text.split('\n').map(str::to_string).collect()
        };
        self.write_record(&record).await
    }

    /// Rewrites the record file in full: serialize to a randomized temp
    /// sibling, then rename over the original, so a concurrent reader never
    /// observes a partially written record.
    async fn write_record(&self, record: &DeviceRecord) -> Result<(), FencelineError> {
        let payload = serde_json::to_vec_pretty(record)
            .map_err(|e| FencelineError::Internal(format!("record serialization failed: {e}")))?;

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
}
