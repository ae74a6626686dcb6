//! # Engine Trait
//!
//! The boundary between the bindings and the native instrumentation engine.
//!
//! Everything behaviorally significant — process control, code injection,
//! script compilation and execution, device discovery — happens on the far
//! side of this trait. The bindings own none of it: they translate idiomatic
//! calls into these operations and hand back whatever the engine returns,
//! errors included.
//!
//! ## Implementations
//!
//! - [`loader::LoadedEngine`](crate::loader::LoadedEngine): the production
//!   implementation, backed by the dynamically loaded extension library and
//!   its C vtable.
//! - Test backends: any in-process type may implement this trait to stand in
//!   for the engine (the integration tests carry one).
//!
//! ## Thread safety
//!
//! Implementations must be safe to invoke concurrently; this contract is
//! inherited from the native engine, which performs its own internal
//! synchronization. The bindings add no locking on top.

use std::path::Path;

use serde_json::Value;

use crate::error::Result;
use crate::types::{
    AttachOptions, DeviceId, DeviceInfo, InjectionId, MonitorId, Pid, ProcessTarget, ScriptId, ScriptSource,
    SessionId, SpawnOptions,
};

/// Operations the native engine exposes to the bindings
///
/// Handles (`SessionId`, `ScriptId`, `MonitorId`) are minted by the engine
/// and remain meaningful only for the engine instance that produced them.
/// Lifecycle of the underlying resources is entirely the engine's
/// responsibility; dropping a binding-side handle releases nothing.
pub trait Engine: Send + Sync
{
    /// Version string of the engine build.
    fn version(&self) -> &str;

    /// Snapshot of the devices currently known to the engine.
    fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>>;

    /// Query host-system facts (OS, arch, access level, ...) for a device.
    /// The shape of the returned map is owned by the engine.
    fn query_system_parameters(&self, device: &DeviceId) -> Result<Value>;

    /// Spawn a process on `device` into a suspended, attachable state.
    /// The process does not execute until [`Engine::resume`] is called.
    fn spawn(&self, device: &DeviceId, options: &SpawnOptions) -> Result<Pid>;

    /// Resume a suspended process.
    ///
    /// ## Errors
    ///
    /// - `ProcessNotFound`: the target does not resolve to a process
    /// - `InvalidOperation`: the target is not in a resumable state
    fn resume(&self, device: &DeviceId, target: &ProcessTarget) -> Result<()>;

    /// Terminate a process. Works on suspended processes that were never
    /// resumed as well as on running ones.
    fn kill(&self, device: &DeviceId, target: &ProcessTarget) -> Result<()>;

    /// Establish a session against a process.
    fn attach(&self, device: &DeviceId, target: &ProcessTarget, options: &AttachOptions) -> Result<SessionId>;

    /// Tear down a session established with [`Engine::attach`].
    fn detach(&self, session: SessionId) -> Result<()>;

    /// Inject the shared library at `path` into the target. `data` is an
    /// opaque string delivered to `entrypoint` inside the target.
    fn inject_library_file(
        &self,
        device: &DeviceId,
        target: &ProcessTarget,
        path: &Path,
        entrypoint: &str,
        data: &str,
    ) -> Result<InjectionId>;

    /// Inject an in-memory shared library image into the target.
    fn inject_library_blob(
        &self,
        device: &DeviceId,
        target: &ProcessTarget,
        blob: &[u8],
        entrypoint: &str,
        data: &str,
    ) -> Result<InjectionId>;

    /// Create a script inside a session from source text or bytecode.
    fn create_script(&self, session: SessionId, source: &ScriptSource) -> Result<ScriptId>;

    /// Compile source text to engine bytecode without creating a script.
    /// The output is opaque and only meaningful to
    /// [`Engine::create_script`] with [`ScriptSource::Bytes`].
    fn compile_script(&self, session: SessionId, name: &str, source: &str) -> Result<Vec<u8>>;

    /// Load a created script into the target process.
    fn load_script(&self, script: ScriptId) -> Result<()>;

    /// Unload a previously loaded script.
    fn unload_script(&self, script: ScriptId) -> Result<()>;

    /// Names exported by a loaded script, exactly as the script declared
    /// them. The set is dynamic: it is whatever the script registered at
    /// load time.
    fn script_exports(&self, script: ScriptId) -> Result<Vec<String>>;

    /// Invoke a script export by its declared name, blocking for the reply.
    fn call_export(&self, script: ScriptId, name: &str, args: &[Value]) -> Result<Value>;

    /// Begin monitoring a filesystem path for changes.
    fn enable_monitor(&self, path: &Path) -> Result<MonitorId>;

    /// Stop a monitor started with [`Engine::enable_monitor`].
    fn disable_monitor(&self, monitor: MonitorId) -> Result<()>;

    /// Release the engine's resources (sessions, transports, watchers).
    /// Called once by [`DeviceManager::close`](crate::DeviceManager::close).
    fn close(&self) -> Result<()>;
}
