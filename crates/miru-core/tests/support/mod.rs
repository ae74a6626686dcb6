//! Shared in-process engine used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::{json, Value};

use miru_core::engine::Engine;
use miru_core::types::{
    AttachOptions, DeviceId, DeviceInfo, DeviceKind, InjectionId, MonitorId, Pid, ProcessTarget, ScriptId,
    ScriptSource, SessionId, SpawnOptions,
};
use miru_core::{MiruError, Result};

/// Magic prefix the mock compiler stamps onto bytecode.
const BYTECODE_MAGIC: &[u8] = b"MIRUBC\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcState
{
    Suspended,
    Running,
}

#[derive(Debug, Clone)]
struct ScriptState
{
    source: String,
    loaded: bool,
}

/// In-process [`Engine`] with just enough behavior to exercise the bindings.
///
/// Starts with one local device; more can be added at any time (including
/// from another thread, which the discovery tests rely on).
pub struct MockEngine
{
    devices: Mutex<Vec<DeviceInfo>>,
    processes: Mutex<HashMap<u32, ProcState>>,
    sessions: Mutex<HashMap<u64, ()>>,
    scripts: Mutex<HashMap<u64, ScriptState>>,
    monitors: Mutex<HashMap<u64, String>>,
    next_pid: AtomicU32,
    next_id: AtomicU64,
}

impl Default for MockEngine
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl MockEngine
{
    pub fn new() -> Self
    {
        Self {
            devices: Mutex::new(vec![DeviceInfo::new("local", "Local System", DeviceKind::Local)]),
            processes: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            scripts: Mutex::new(HashMap::new()),
            monitors: Mutex::new(HashMap::new()),
            next_pid: AtomicU32::new(1000),
            next_id: AtomicU64::new(1),
        }
    }

    /// Make another device visible to `enumerate_devices`.
    pub fn add_device(&self, id: &str, name: &str, kind: DeviceKind)
    {
        self.devices.lock().unwrap().push(DeviceInfo::new(id, name, kind));
    }

    fn next_id(&self) -> u64
    {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn resolve_pid(&self, target: &ProcessTarget) -> Result<u32>
    {
        match target {
            ProcessTarget::Pid(pid) => {
                let processes = self.processes.lock().unwrap();
                if processes.contains_key(&pid.raw()) {
                    Ok(pid.raw())
                } else {
                    Err(MiruError::ProcessNotFound(format!("no process with pid {pid}")))
                }
            }
            ProcessTarget::Name(name) => Err(MiruError::ProcessNotFound(format!("no process named '{name}'"))),
        }
    }

    /// Pull `name:` keys out of `rpc.exports = { ... }` style source. Good
    /// enough for test scripts; not a parser.
    fn parse_exports(source: &str) -> Vec<String>
    {
        let mut names = Vec::new();
        for line in source.lines() {
            let line = line.trim();
            if let Some(colon) = line.find(':') {
                let candidate = line[..colon].trim();
                if !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    names.push(candidate.to_owned());
                }
            }
        }
        names
    }
}

impl Engine for MockEngine
{
    fn version(&self) -> &str
    {
        "17.0.0-mock"
    }

    fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>>
    {
        Ok(self.devices.lock().unwrap().clone())
    }

    fn query_system_parameters(&self, device: &DeviceId) -> Result<Value>
    {
        let devices = self.devices.lock().unwrap();
        if !devices.iter().any(|info| &info.id == device) {
            return Err(MiruError::InvalidArgument(format!("unknown device: {device}")));
        }
        Ok(json!({
            "os": { "id": "linux" },
            "arch": "x86_64",
            "access": "full",
        }))
    }

    fn spawn(&self, _device: &DeviceId, options: &SpawnOptions) -> Result<Pid>
    {
        if options.program.ends_with("/nonexistent") {
            return Err(MiruError::ExecutableNotFound(options.program.clone()));
        }
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.processes.lock().unwrap().insert(pid, ProcState::Suspended);
        Ok(Pid(pid))
    }

    fn resume(&self, _device: &DeviceId, target: &ProcessTarget) -> Result<()>
    {
        let pid = self.resolve_pid(target)?;
        let mut processes = self.processes.lock().unwrap();
        match processes.get(&pid) {
            Some(ProcState::Suspended) => {
                processes.insert(pid, ProcState::Running);
                Ok(())
            }
            Some(ProcState::Running) => Err(MiruError::InvalidOperation(format!("pid {pid} is not suspended"))),
            None => Err(MiruError::ProcessNotFound(format!("no process with pid {pid}"))),
        }
    }

    fn kill(&self, _device: &DeviceId, target: &ProcessTarget) -> Result<()>
    {
        let pid = self.resolve_pid(target)?;
        self.processes.lock().unwrap().remove(&pid);
        Ok(())
    }

    fn attach(&self, _device: &DeviceId, target: &ProcessTarget, _options: &AttachOptions) -> Result<SessionId>
    {
        // Pid 0 attaches to the system session, which always exists.
        if !matches!(target, ProcessTarget::Pid(Pid(0))) {
            self.resolve_pid(target)?;
        }
        let id = self.next_id();
        self.sessions.lock().unwrap().insert(id, ());
        Ok(SessionId(id))
    }

    fn detach(&self, session: SessionId) -> Result<()>
    {
        if self.sessions.lock().unwrap().remove(&session.0).is_none() {
            return Err(MiruError::InvalidOperation(format!("no session {session}")));
        }
        Ok(())
    }

    fn inject_library_file(
        &self,
        _device: &DeviceId,
        target: &ProcessTarget,
        _path: &Path,
        _entrypoint: &str,
        _data: &str,
    ) -> Result<InjectionId>
    {
        self.resolve_pid(target)?;
        Ok(InjectionId(self.next_id() as u32))
    }

    fn inject_library_blob(
        &self,
        _device: &DeviceId,
        target: &ProcessTarget,
        blob: &[u8],
        _entrypoint: &str,
        _data: &str,
    ) -> Result<InjectionId>
    {
        if blob.is_empty() {
            return Err(MiruError::InvalidArgument("empty library blob".to_owned()));
        }
        self.resolve_pid(target)?;
        Ok(InjectionId(self.next_id() as u32))
    }

    fn create_script(&self, session: SessionId, source: &ScriptSource) -> Result<ScriptId>
    {
        if !self.sessions.lock().unwrap().contains_key(&session.0) {
            return Err(MiruError::InvalidOperation(format!("no session {session}")));
        }
        let text = match source {
            ScriptSource::Source { text, .. } => text.clone(),
            ScriptSource::Bytes(bytes) => {
                let stripped = bytes
                    .strip_prefix(BYTECODE_MAGIC)
                    .ok_or_else(|| MiruError::InvalidArgument("not valid script bytecode".to_owned()))?;
                String::from_utf8(stripped.to_vec())
                    .map_err(|_| MiruError::InvalidArgument("not valid script bytecode".to_owned()))?
            }
        };
        let id = self.next_id();
        self.scripts.lock().unwrap().insert(
            id,
            ScriptState {
                source: text,
                loaded: false,
            },
        );
        Ok(ScriptId(id))
    }

    fn compile_script(&self, session: SessionId, _name: &str, source: &str) -> Result<Vec<u8>>
    {
        if !self.sessions.lock().unwrap().contains_key(&session.0) {
            return Err(MiruError::InvalidOperation(format!("no session {session}")));
        }
        let mut bytecode = BYTECODE_MAGIC.to_vec();
        bytecode.extend_from_slice(source.as_bytes());
        Ok(bytecode)
    }

    fn load_script(&self, script: ScriptId) -> Result<()>
    {
        let mut scripts = self.scripts.lock().unwrap();
        let state = scripts
            .get_mut(&script.0)
            .ok_or_else(|| MiruError::InvalidOperation(format!("no script {script}")))?;
        state.loaded = true;
        Ok(())
    }

    fn unload_script(&self, script: ScriptId) -> Result<()>
    {
        let mut scripts = self.scripts.lock().unwrap();
        let state = scripts
            .get_mut(&script.0)
            .ok_or_else(|| MiruError::InvalidOperation(format!("no script {script}")))?;
        if !state.loaded {
            return Err(MiruError::InvalidOperation(format!("script {script} is not loaded")));
        }
        state.loaded = false;
        Ok(())
    }

    fn script_exports(&self, script: ScriptId) -> Result<Vec<String>>
    {
        let scripts = self.scripts.lock().unwrap();
        let state = scripts
            .get(&script.0)
            .ok_or_else(|| MiruError::InvalidOperation(format!("no script {script}")))?;
        if !state.loaded {
            return Err(MiruError::InvalidOperation(format!("script {script} is not loaded")));
        }
        Ok(Self::parse_exports(&state.source))
    }

    fn call_export(&self, script: ScriptId, name: &str, args: &[Value]) -> Result<Value>
    {
        let scripts = self.scripts.lock().unwrap();
        let state = scripts
            .get(&script.0)
            .ok_or_else(|| MiruError::InvalidOperation(format!("no script {script}")))?;
        if !state.loaded {
            return Err(MiruError::InvalidOperation(format!("script {script} is not loaded")));
        }
        Ok(json!({ "export": name, "args": args }))
    }

    fn enable_monitor(&self, path: &Path) -> Result<MonitorId>
    {
        let id = self.next_id();
        self.monitors.lock().unwrap().insert(id, path.display().to_string());
        Ok(MonitorId(id))
    }

    fn disable_monitor(&self, monitor: MonitorId) -> Result<()>
    {
        if self.monitors.lock().unwrap().remove(&monitor.0).is_none() {
            return Err(MiruError::InvalidOperation(format!("no monitor {monitor}")));
        }
        Ok(())
    }

    fn close(&self) -> Result<()>
    {
        Ok(())
    }
}
