//! # Device Manager
//!
//! Entry point for everything in these bindings.
//!
//! A [`DeviceManager`] owns one engine and hands out [`Device`] handles into
//! it. It is an explicitly constructed context object, not process-wide
//! state: construct as many independent managers as you like (tests do), use
//! them, and close them. Clones of a manager share the same engine and close
//! together.
//!
//! ## Lifecycle
//!
//! Once [`DeviceManager::close`] runs, the manager and every handle derived
//! from it fail further operations with
//! [`MiruError::InvalidOperation`]; construct a new manager instead of
//! reusing a closed one. A close that lands while a discovery wait is in
//! flight aborts that wait with [`MiruError::OperationCancelled`].
//!
//! ## Waiting for devices
//!
//! The timeout-bearing accessors poll the engine's device list on a short
//! interval. A zero timeout means "look once": if nothing matches right now
//! the call fails immediately with [`MiruError::InvalidArgument`] rather
//! than blocking. A nonzero timeout that elapses yields
//! [`MiruError::TimedOut`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use miru_core::{DeviceManager, SpawnOptions};
//!
//! fn main() -> miru_core::Result<()>
//! {
//!     let manager = DeviceManager::new()?;
//!     let device = manager.get_local_device()?;
//!     let pid = device.spawn(&SpawnOptions::new("/bin/cat"))?;
//!     device.resume(pid)?;
//!     device.kill(pid)?;
//!     manager.close()
//! }
//! ```

use std::path::Path;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cancellable::Cancellable;
use crate::device::Device;
use crate::engine::Engine;
use crate::error::{MiruError, Result};
use crate::loader;
use crate::monitor::FileMonitor;
use crate::types::{DeviceInfo, DeviceKind};

/// How often in-flight discovery waits re-poll the engine.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// State shared between a manager, its clones, and the handles it minted.
pub(crate) struct Shared
{
    pub(crate) engine: Arc<dyn Engine>,
    closed: Mutex<bool>,
    cond: Condvar,
}

impl Shared
{
    /// Fail with `InvalidOperation` once the manager has been closed.
    pub(crate) fn ensure_open(&self) -> Result<()>
    {
        if *lock_unpoisoned(&self.closed) {
            Err(MiruError::InvalidOperation("device manager is closed".to_owned()))
        } else {
            Ok(())
        }
    }
}

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T>
{
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to an engine and the devices it knows about
///
/// Cheap to clone; all clones share the engine and the closed flag.
#[derive(Clone)]
pub struct DeviceManager
{
    shared: Arc<Shared>,
}

impl DeviceManager
{
    /// Load the native engine (see [`loader`]) and wrap it in a manager.
    ///
    /// ## Errors
    ///
    /// [`MiruError::Load`] when the extension is missing or unusable; the
    /// loader prints its diagnostic banner before this returns.
    pub fn new() -> Result<Self>
    {
        let engine = loader::load()?;
        Ok(Self::with_engine(Arc::from(engine)))
    }

    /// Wrap an already-acquired engine. This is how alternative backends
    /// (including the test engines) enter the bindings.
    #[must_use]
    pub fn with_engine(engine: Arc<dyn Engine>) -> Self
    {
        Self {
            shared: Arc::new(Shared {
                engine,
                closed: Mutex::new(false),
                cond: Condvar::new(),
            }),
        }
    }

    /// Version string of the engine behind this manager.
    #[must_use]
    pub fn version(&self) -> String
    {
        self.shared.engine.version().to_owned()
    }

    /// Snapshot of the devices the engine currently knows about.
    pub fn enumerate_devices(&self) -> Result<Vec<Device>>
    {
        self.shared.ensure_open()?;
        let infos = self.shared.engine.enumerate_devices()?;
        Ok(infos
            .into_iter()
            .map(|info| Device::new(self.shared.clone(), info))
            .collect())
    }

    /// Get the local device. It always exists while the manager is open.
    pub fn get_local_device(&self) -> Result<Device>
    {
        self.find_now(|info| info.kind == DeviceKind::Local, "local device")
    }

    /// Get the first remote device in the device list.
    pub fn get_remote_device(&self) -> Result<Device>
    {
        self.find_now(|info| info.kind == DeviceKind::Remote, "remote device")
    }

    /// Get the first USB device, waiting up to `timeout` for one to appear.
    pub fn get_usb_device(&self, timeout: Duration) -> Result<Device>
    {
        self.wait_for(|info| info.kind == DeviceKind::Usb, timeout, None, "usb device")
    }

    /// Cancellable variant of [`DeviceManager::get_usb_device`].
    pub fn get_usb_device_cancellable(&self, timeout: Duration, cancellable: &Cancellable) -> Result<Device>
    {
        self.wait_for(|info| info.kind == DeviceKind::Usb, timeout, Some(cancellable), "usb device")
    }

    /// Get a device by id, waiting up to `timeout` for it to appear.
    pub fn get_device(&self, id: &str, timeout: Duration) -> Result<Device>
    {
        self.wait_for(|info| info.id.as_str() == id, timeout, None, "device")
    }

    /// Cancellable variant of [`DeviceManager::get_device`].
    pub fn get_device_cancellable(&self, id: &str, timeout: Duration, cancellable: &Cancellable) -> Result<Device>
    {
        self.wait_for(|info| info.id.as_str() == id, timeout, Some(cancellable), "device")
    }

    /// Get the first device matching `predicate`, waiting up to `timeout`.
    pub fn get_device_matching<F>(&self, predicate: F, timeout: Duration) -> Result<Device>
    where
        F: Fn(&DeviceInfo) -> bool,
    {
        self.wait_for(predicate, timeout, None, "matching device")
    }

    /// Cancellable variant of [`DeviceManager::get_device_matching`].
    pub fn get_device_matching_cancellable<F>(
        &self,
        predicate: F,
        timeout: Duration,
        cancellable: &Cancellable,
    ) -> Result<Device>
    where
        F: Fn(&DeviceInfo) -> bool,
    {
        self.wait_for(predicate, timeout, Some(cancellable), "matching device")
    }

    /// Create a monitor for a filesystem path. The monitor is inert until
    /// [`FileMonitor::enable`] is called.
    #[must_use]
    pub fn monitor(&self, path: impl AsRef<Path>) -> FileMonitor
    {
        FileMonitor::new(self.shared.clone(), path.as_ref().to_path_buf())
    }

    /// Close the manager, releasing the engine's resources.
    ///
    /// Closing is idempotent: the first call shuts the engine down, later
    /// calls are no-ops. Every in-flight discovery wait on this manager
    /// fails with [`MiruError::OperationCancelled`].
    pub fn close(&self) -> Result<()>
    {
        self.close_inner(None)
    }

    /// Cancellable variant of [`DeviceManager::close`]. A token cancelled
    /// before the call leaves the manager open and fails with
    /// [`MiruError::OperationCancelled`].
    pub fn close_cancellable(&self, cancellable: &Cancellable) -> Result<()>
    {
        self.close_inner(Some(cancellable))
    }

    fn close_inner(&self, cancellable: Option<&Cancellable>) -> Result<()>
    {
        if let Some(cancellable) = cancellable {
            cancellable.err_if_cancelled("close")?;
        }

        {
            let mut closed = lock_unpoisoned(&self.shared.closed);
            if *closed {
                return Ok(());
            }
            *closed = true;
            self.shared.cond.notify_all();
        }

        debug!("device manager closed");
        self.shared.engine.close()
    }

    /// Single-shot lookup used by the accessors with immediate semantics.
    fn find_now<F>(&self, predicate: F, what: &str) -> Result<Device>
    where
        F: Fn(&DeviceInfo) -> bool,
    {
        self.shared.ensure_open()?;
        self.shared
            .engine
            .enumerate_devices()?
            .into_iter()
            .find(|info| predicate(info))
            .map(|info| Device::new(self.shared.clone(), info))
            .ok_or_else(|| MiruError::InvalidArgument(format!("{what} not found")))
    }

    /// Poll the device list until `predicate` matches, the timeout elapses,
    /// the caller cancels, or the manager is closed.
    fn wait_for<F>(
        &self,
        predicate: F,
        timeout: Duration,
        cancellable: Option<&Cancellable>,
        what: &str,
    ) -> Result<Device>
    where
        F: Fn(&DeviceInfo) -> bool,
    {
        self.shared.ensure_open()?;
        let deadline = (!timeout.is_zero()).then(|| Instant::now() + timeout);

        loop {
            if let Some(info) = self
                .shared
                .engine
                .enumerate_devices()?
                .into_iter()
                .find(|info| predicate(info))
            {
                return Ok(Device::new(self.shared.clone(), info));
            }

            let Some(deadline) = deadline else {
                // Zero timeout: one look, no blocking.
                return Err(MiruError::InvalidArgument(format!("{what} not found")));
            };
            if Instant::now() >= deadline {
                return Err(MiruError::TimedOut(format!("timed out waiting for {what}")));
            }
            if let Some(cancellable) = cancellable {
                if cancellable.is_cancelled() {
                    return Err(MiruError::OperationCancelled(format!("cancelled while waiting for {what}")));
                }
            }

            // Never sleep past the deadline.
            let sleep = POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now()));

            // Sleep on the manager condvar so close() interrupts the wait; a
            // cancelled token is noticed on the next wakeup.
            let closed = lock_unpoisoned(&self.shared.closed);
            let closed = match self.shared.cond.wait_timeout(closed, sleep) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
            if *closed {
                return Err(MiruError::OperationCancelled(format!(
                    "device manager closed while waiting for {what}"
                )));
            }
        }
    }
}

impl std::fmt::Debug for DeviceManager
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("DeviceManager")
            .field("version", &self.shared.engine.version())
            .field("closed", &*lock_unpoisoned(&self.shared.closed))
            .finish()
    }
}
