//! Filesystem change monitoring through the engine.
//!
//! A [`FileMonitor`] is created by
//! [`DeviceManager::monitor`](crate::DeviceManager::monitor) in the disabled
//! state. Enable/disable transitions are strict: enabling an enabled monitor
//! or disabling a disabled one is an `InvalidOperation`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{MiruError, Result};
use crate::manager::{lock_unpoisoned, Shared};
use crate::types::MonitorId;

/// Monitor for changes under one filesystem path
pub struct FileMonitor
{
    shared: Arc<Shared>,
    path: PathBuf,
    id: Mutex<Option<MonitorId>>,
}

impl FileMonitor
{
    pub(crate) fn new(shared: Arc<Shared>, path: PathBuf) -> Self
    {
        Self {
            shared,
            path,
            id: Mutex::new(None),
        }
    }

    /// Path this monitor watches.
    #[must_use]
    pub fn path(&self) -> &Path
    {
        &self.path
    }

    /// Whether the monitor is currently active.
    #[must_use]
    pub fn is_enabled(&self) -> bool
    {
        lock_unpoisoned(&self.id).is_some()
    }

    /// Start watching the path.
    ///
    /// ## Errors
    ///
    /// [`MiruError::InvalidOperation`] when the monitor is already enabled.
    pub fn enable(&self) -> Result<()>
    {
        self.shared.ensure_open()?;
        let mut id = lock_unpoisoned(&self.id);
        if id.is_some() {
            return Err(MiruError::InvalidOperation("monitor is already enabled".to_owned()));
        }
        *id = Some(self.shared.engine.enable_monitor(&self.path)?);
        Ok(())
    }

    /// Stop watching the path.
    ///
    /// ## Errors
    ///
    /// [`MiruError::InvalidOperation`] when the monitor is not enabled.
    pub fn disable(&self) -> Result<()>
    {
        self.shared.ensure_open()?;
        let mut id = lock_unpoisoned(&self.id);
        let Some(active) = id.take() else {
            return Err(MiruError::InvalidOperation("monitor is not enabled".to_owned()));
        };
        self.shared.engine.disable_monitor(active)
    }
}

impl std::fmt::Debug for FileMonitor
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("FileMonitor")
            .field("path", &self.path)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
