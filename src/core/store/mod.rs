// src/core/store/mod.rs

//! The device store: a keyed collection of per-device records with lazy
//! creation, per-device write locking, and one JSON file per device as the
//! authoritative copy.
//!
//! The store never blocks one device's operations on another's. Writers
//! serialize through the device's own lock; readers go straight to the file
//! and rely on atomic replacement for consistency.

mod device;

pub use device::{Device, DeviceRecord};

use crate::core::commands::grammar;
use crate::core::errors::FencelineError;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Reply sent when a device has no recorded location yet.
pub const LOCATION_SENTINEL: &str = "0.0N,0.0E";

/// Reply sent when a device has no zone assigned yet.
pub const ZONE_SENTINEL: &str = "0.0N,0.0E,0.0";

/// Process-wide collection of devices, keyed by device name.
#[derive(Debug)]
pub struct DeviceStore {
    dir: PathBuf,
    devices: DashMap<String, Arc<Device>>,
}

impl DeviceStore {
    /// Opens the store rooted at `dir`, creating the directory if needed and
    /// registering every `BB_<digits>.json` record already on disk.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, FencelineError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let store = DeviceStore {
            dir,
            devices: DashMap::new(),
        };
        store.scan_existing()?;
        Ok(store)
    }

    /// Registers record files left by previous runs. Only exact
    /// `<device>.json` names with a well-formed device name count; temp files
    /// and foreign files are ignored.
    fn scan_existing(&self) -> Result<(), FencelineError> {
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(device_name) = name.strip_suffix(".json") else {
                continue;
            };
            if !grammar::is_device_name(device_name) {
                continue;
            }
            let device = Device::existing(device_name, entry.path());
            self.devices
                .insert(device_name.to_string(), Arc::new(device));
        }

        if !self.devices.is_empty() {
            info!(
                "Registered {} device record(s) from {}",
                self.devices.len(),
                self.dir.display()
            );
        }
        Ok(())
    }

    /// Returns the device handle for `name`, creating the record (in memory
    /// and on disk) on first reference. Concurrent first calls for the same
    /// name produce exactly one record.
    pub async fn ensure_device(&self, name: &str) -> Result<Arc<Device>, FencelineError> {
        if !grammar::is_device_name(name) {
            return Err(FencelineError::InvalidDeviceName(name.to_string()));
        }

        // Get-or-insert is atomic under the map; the on-disk initialization
        // then runs under the device's own lock, so no map guard is ever held
        // across an await.
        let device = self
            .devices
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(Device::new(name, self.dir.join(format!("{name}.json"))))
            })
            .clone();

        device.ensure_on_disk().await?;
        Ok(device)
    }

    /// The most recent location recorded for `name`, or the sentinel when
    /// the history is empty.
    pub async fn get_location(&self, name: &str) -> Result<String, FencelineError> {
        let device = self.ensure_device(name).await?;
        let record = device.load().await?;
        Ok(record
            .location
            .last()
            .cloned()
            .unwrap_or_else(|| LOCATION_SENTINEL.to_string()))
    }

    /// Appends `location` to the history of `name`.
    pub async fn set_location(&self, name: &str, location: &str) -> Result<(), FencelineError> {
        let device = self.ensure_device(name).await?;
        device.append_location(location).await
    }

    /// The zone lines of `name` joined by newlines, or the sentinel when no
    /// zone is assigned.
    pub async fn get_zone(&self, name: &str) -> Result<String, FencelineError> {
        let device = self.ensure_device(name).await?;
        let record = device.load().await?;
        if record.zone.is_empty() {
            Ok(ZONE_SENTINEL.to_string())
        } else {
            Ok(record.zone.join("\n"))
        }
    }

    /// Replaces the zone of `name` wholesale.
    pub async fn set_zone(&self, name: &str, zone_text: &str) -> Result<(), FencelineError> {
        let device = self.ensure_device(name).await?;
        device.replace_zone(zone_text).await
    }

    /// The device handle for `name`, if one exists.
    pub fn get_device(&self, name: &str) -> Option<Arc<Device>> {
        self.devices.get(name).map(|entry| entry.value().clone())
    }

    /// Number of devices currently registered.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// The directory holding the record files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
