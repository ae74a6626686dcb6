//! # Device
//!
//! Process control and code injection on one device.
//!
//! A [`Device`] is obtained from a [`DeviceManager`](crate::DeviceManager)
//! accessor and stays tied to that manager: once the manager closes, every
//! operation on the device fails with
//! [`MiruError::InvalidOperation`](crate::MiruError::InvalidOperation).
//!
//! Process-targeting methods take `impl Into<ProcessTarget>`, so a raw pid,
//! a [`Pid`], or a process name all work:
//!
//! ```rust,no_run
//! # fn demo(device: &miru_core::Device) -> miru_core::Result<()> {
//! device.resume(1337u32)?;
//! device.kill("Twitter")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::manager::Shared;
use crate::session::Session;
use crate::types::{AttachOptions, DeviceId, DeviceInfo, DeviceKind, InjectionId, Pid, ProcessTarget, SpawnOptions};

/// Handle to one device known to the engine
#[derive(Clone)]
pub struct Device
{
    shared: Arc<Shared>,
    info: DeviceInfo,
}

impl Device
{
    pub(crate) fn new(shared: Arc<Shared>, info: DeviceInfo) -> Self
    {
        Self { shared, info }
    }

    /// Stable identifier of this device.
    #[must_use]
    pub fn id(&self) -> &DeviceId
    {
        &self.info.id
    }

    /// Human-readable device name.
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.info.name
    }

    /// How this device is reached.
    #[must_use]
    pub fn kind(&self) -> DeviceKind
    {
        self.info.kind
    }

    /// Query host-system facts (OS, arch, access level, ...) for this
    /// device. The shape of the returned document is owned by the engine.
    pub fn query_system_parameters(&self) -> Result<Value>
    {
        self.shared.ensure_open()?;
        self.shared.engine.query_system_parameters(&self.info.id)
    }

    /// Spawn a program into a suspended state.
    ///
    /// The new process does not run a single instruction until
    /// [`Device::resume`] is called on it, so instrumentation can be put in
    /// place first.
    ///
    /// ## Errors
    ///
    /// [`MiruError::ExecutableNotFound`](crate::MiruError::ExecutableNotFound)
    /// when the program path does not resolve on the device,
    /// [`MiruError::ExecutableNotSupported`](crate::MiruError::ExecutableNotSupported)
    /// when it resolves to something the device cannot execute.
    pub fn spawn(&self, options: &SpawnOptions) -> Result<Pid>
    {
        self.shared.ensure_open()?;
        let pid = self.shared.engine.spawn(&self.info.id, options)?;
        debug!(device = %self.info.id, program = options.program.as_str(), pid = %pid, "spawned");
        Ok(pid)
    }

    /// Resume a process previously spawned in the suspended state.
    pub fn resume(&self, target: impl Into<ProcessTarget>) -> Result<()>
    {
        self.shared.ensure_open()?;
        self.shared.engine.resume(&self.info.id, &target.into())
    }

    /// Terminate a process. Suspended processes that were never resumed are
    /// killed too.
    pub fn kill(&self, target: impl Into<ProcessTarget>) -> Result<()>
    {
        self.shared.ensure_open()?;
        self.shared.engine.kill(&self.info.id, &target.into())
    }

    /// Attach to a process with default options.
    pub fn attach(&self, target: impl Into<ProcessTarget>) -> Result<Session>
    {
        self.attach_with_options(target, &AttachOptions::default())
    }

    /// Attach to a process, selecting realm and persistence behavior.
    ///
    /// ## Errors
    ///
    /// [`MiruError::ProcessNotFound`](crate::MiruError::ProcessNotFound) when
    /// the target does not resolve,
    /// [`MiruError::PermissionDenied`](crate::MiruError::PermissionDenied)
    /// when the device refuses access to it.
    pub fn attach_with_options(&self, target: impl Into<ProcessTarget>, options: &AttachOptions) -> Result<Session>
    {
        self.shared.ensure_open()?;
        let target = target.into();
        let session = self.shared.engine.attach(&self.info.id, &target, options)?;
        debug!(device = %self.info.id, target = %target, session = %session, "attached");
        Ok(Session::new(self.shared.clone(), session))
    }

    /// Inject the shared library at `path` into a process. `data` is an
    /// opaque string handed to `entrypoint` inside the target.
    pub fn inject_library_file(
        &self,
        target: impl Into<ProcessTarget>,
        path: impl AsRef<Path>,
        entrypoint: &str,
        data: &str,
    ) -> Result<InjectionId>
    {
        self.shared.ensure_open()?;
        self.shared
            .engine
            .inject_library_file(&self.info.id, &target.into(), path.as_ref(), entrypoint, data)
    }

    /// Inject an in-memory shared library image into a process.
    pub fn inject_library_blob(
        &self,
        target: impl Into<ProcessTarget>,
        blob: &[u8],
        entrypoint: &str,
        data: &str,
    ) -> Result<InjectionId>
    {
        self.shared.ensure_open()?;
        self.shared
            .engine
            .inject_library_blob(&self.info.id, &target.into(), blob, entrypoint, data)
    }
}

impl std::fmt::Debug for Device
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Device")
            .field("id", &self.info.id)
            .field("name", &self.info.name)
            .field("kind", &self.info.kind)
            .finish()
    }
}
