//! # Extension Loader
//!
//! Locates and loads the native engine extension library.
//!
//! The engine ships as a separate shared library (the "extension"). The
//! loader resolves its path, dlopens it, validates the ABI, and wraps the
//! resulting handle in [`LoadedEngine`], the production implementation of
//! [`Engine`].
//!
//! The one behavior deployment depends on: **a missing extension is reported
//! differently from a broken one**. [`LoadError::NotFound`] means the library
//! file could not be located (fix the search path); [`LoadError::Rejected`]
//! means it was found but could not be used (rebuild or update it). Both
//! failures print a short banner to stderr before propagating, so interactive
//! users see the cause even when the caller only surfaces the error value.
//!
//! ## Locating the extension
//!
//! 1. `MIRU_EXTENSION` environment variable, if set: the exact path to load.
//! 2. Otherwise the platform library name (`libmiru-core.so`,
//!    `libmiru-core.dylib`, or `miru-core.dll`) resolved through the system
//!    loader's search path.

use std::env;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::ptr;

use libloading::Library;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::engine::Engine;
use crate::error::{MiruError, Result};
use crate::ffi::{EntryFn, RawEngine, RawEngineApi, ENGINE_ABI_VERSION, ENTRY_SYMBOL};
use crate::rpc::{self, Request};
use crate::types::{
    AttachOptions, DeviceId, DeviceInfo, InjectionId, MonitorId, Pid, ProcessTarget, ScriptId, ScriptSource,
    SessionId, SpawnOptions,
};

/// Environment variable naming the exact extension path to load.
pub const EXTENSION_ENV: &str = "MIRU_EXTENSION";

/// Failure to acquire the native engine
///
/// The two variants are deliberately distinct: in deployment, "the file is
/// not where you think it is" and "the file is there but wrong" call for
/// different fixes, and conflating them is the dominant cause of wasted
/// integration debugging.
#[derive(Error, Debug)]
pub enum LoadError
{
    /// The extension library file could not be located.
    #[error("Miru native extension not found at '{path}'; check MIRU_EXTENSION or your library search path")]
    NotFound
    {
        /// The path (or bare library name) that failed to resolve.
        path: PathBuf,
    },

    /// The extension was located but could not be loaded: unreadable binary,
    /// missing entry symbol, ABI mismatch, or the engine refused to open.
    #[error("Failed to load the Miru native extension: {reason}")]
    Rejected
    {
        /// Text of the underlying failure.
        reason: String,
    },
}

/// Load the engine from the default location (see module docs).
pub fn load() -> std::result::Result<Box<dyn Engine>, LoadError>
{
    let path = match env::var_os(EXTENSION_ENV) {
        Some(explicit) => PathBuf::from(explicit),
        None => PathBuf::from(default_library_name()),
    };
    load_from(&path)
}

/// Load the engine from an explicit path.
///
/// ## Errors
///
/// [`LoadError::NotFound`] when the library file cannot be located,
/// [`LoadError::Rejected`] for every other load failure. Either way a
/// two-line diagnostic is printed to stderr before the error is returned.
pub fn load_from(path: &Path) -> std::result::Result<Box<dyn Engine>, LoadError>
{
    match open_extension(path) {
        Ok(engine) => {
            debug!(path = %path.display(), version = engine.version.as_str(), "loaded engine extension");
            Ok(Box::new(engine))
        }
        Err(error) => {
            // Interactive users read this; automated callers match on the
            // error value that follows.
            match &error {
                LoadError::NotFound { .. } => {
                    eprintln!("Miru native extension not found");
                    eprintln!("Please check {EXTENSION_ENV} or your library search path.");
                }
                LoadError::Rejected { reason } => {
                    eprintln!("Failed to load the Miru native extension: {reason}");
                    eprintln!("Please ensure that the extension was compiled correctly.");
                }
            }
            Err(error)
        }
    }
}

/// Platform file name of the extension library.
#[must_use]
pub fn default_library_name() -> &'static str
{
    if cfg!(target_os = "windows") {
        "miru-core.dll"
    } else if cfg!(target_os = "macos") {
        "libmiru-core.dylib"
    } else {
        "libmiru-core.so"
    }
}

fn open_extension(path: &Path) -> std::result::Result<LoadedEngine, LoadError>
{
    let library = match unsafe { Library::new(path) } {
        Ok(library) => library,
        Err(error) => {
            // A file that exists but will not load is a different problem
            // than a file that is not there. Bare library names defer to the
            // system search path, which we cannot inspect portably; absence
            // at the literal path is the best available signal.
            return Err(if path.exists() {
                LoadError::Rejected {
                    reason: error.to_string(),
                }
            } else {
                LoadError::NotFound {
                    path: path.to_path_buf(),
                }
            });
        }
    };

    let api = {
        let entry = unsafe { library.get::<EntryFn>(ENTRY_SYMBOL) }.map_err(|error| LoadError::Rejected {
            reason: format!("entry symbol missing: {error}"),
        })?;
        unsafe { entry() }
    };
    if api.is_null() {
        return Err(LoadError::Rejected {
            reason: "extension returned no API table".to_owned(),
        });
    }

    let abi_version = unsafe { (*api).abi_version };
    if abi_version != ENGINE_ABI_VERSION {
        return Err(LoadError::Rejected {
            reason: format!("ABI mismatch: extension speaks revision {abi_version}, bindings expect {ENGINE_ABI_VERSION}"),
        });
    }

    let handle = unsafe { ((*api).open)() };
    if handle.is_null() {
        return Err(LoadError::Rejected {
            reason: "engine refused to initialize".to_owned(),
        });
    }

    let version = {
        let raw = unsafe { ((*api).version)(handle) };
        if raw.is_null() {
            "unknown".to_owned()
        } else {
            unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
        }
    };

    Ok(LoadedEngine {
        api,
        handle,
        version,
        _library: library,
    })
}

/// The production [`Engine`]: forwards every operation through the loaded
/// extension's C vtable as JSON request/reply strings.
pub struct LoadedEngine
{
    api: *const RawEngineApi,
    handle: *mut RawEngine,
    version: String,
    // Keeps the extension mapped for as long as `api`/`handle` are live.
    _library: Library,
}

// The engine performs its own internal synchronization; the vtable is
// documented safe to invoke from any thread.
unsafe impl Send for LoadedEngine {}
unsafe impl Sync for LoadedEngine {}

impl Drop for LoadedEngine
{
    fn drop(&mut self)
    {
        unsafe { ((*self.api).close)(self.handle) };
    }
}

impl LoadedEngine
{
    /// Run one request, returning the raw reply text.
    fn invoke_raw(&self, request: &Request<'_>) -> Result<String>
    {
        let encoded = serde_json::to_string(request)
            .map_err(|error| MiruError::Protocol(format!("failed to encode request: {error}")))?;
        let request_c = CString::new(encoded)
            .map_err(|error| MiruError::Protocol(format!("request contains NUL byte: {error}")))?;

        let mut reply: *mut c_char = ptr::null_mut();
        let status = unsafe { ((*self.api).invoke)(self.handle, request_c.as_ptr(), &mut reply) };

        let reply_text = if reply.is_null() {
            String::new()
        } else {
            let text = unsafe { CStr::from_ptr(reply) }.to_string_lossy().into_owned();
            unsafe { ((*self.api).free_reply)(reply) };
            text
        };

        if status == 0 {
            Ok(reply_text)
        } else {
            Err(MiruError::from_code(status, reply_text))
        }
    }

    /// Run one request and decode its JSON reply.
    fn invoke<T: DeserializeOwned>(&self, request: &Request<'_>) -> Result<T>
    {
        let reply = self.invoke_raw(request)?;
        serde_json::from_str(&reply).map_err(|error| MiruError::Protocol(format!("malformed engine reply: {error}")))
    }

    /// Run one request, discarding any reply payload.
    fn invoke_unit(&self, request: &Request<'_>) -> Result<()>
    {
        self.invoke_raw(request).map(|_| ())
    }
}

impl Engine for LoadedEngine
{
    fn version(&self) -> &str
    {
        &self.version
    }

    fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>>
    {
        self.invoke(&Request::EnumerateDevices)
    }

    fn query_system_parameters(&self, device: &DeviceId) -> Result<Value>
    {
        self.invoke(&Request::QuerySystemParameters { device })
    }

    fn spawn(&self, device: &DeviceId, options: &SpawnOptions) -> Result<Pid>
    {
        debug!(device = %device, program = options.program.as_str(), "spawn");
        self.invoke(&Request::Spawn { device, options })
    }

    fn resume(&self, device: &DeviceId, target: &ProcessTarget) -> Result<()>
    {
        self.invoke_unit(&Request::Resume { device, target })
    }

    fn kill(&self, device: &DeviceId, target: &ProcessTarget) -> Result<()>
    {
        self.invoke_unit(&Request::Kill { device, target })
    }

    fn attach(&self, device: &DeviceId, target: &ProcessTarget, options: &AttachOptions) -> Result<SessionId>
    {
        debug!(device = %device, target = %target, "attach");
        self.invoke(&Request::Attach { device, target, options })
    }

    fn detach(&self, session: SessionId) -> Result<()>
    {
        self.invoke_unit(&Request::Detach { session })
    }

    fn inject_library_file(
        &self,
        device: &DeviceId,
        target: &ProcessTarget,
        path: &Path,
        entrypoint: &str,
        data: &str,
    ) -> Result<InjectionId>
    {
        let path = path.to_string_lossy();
        self.invoke(&Request::InjectLibraryFile {
            device,
            target,
            path: &path,
            entrypoint,
            data,
        })
    }

    fn inject_library_blob(
        &self,
        device: &DeviceId,
        target: &ProcessTarget,
        blob: &[u8],
        entrypoint: &str,
        data: &str,
    ) -> Result<InjectionId>
    {
        self.invoke(&Request::InjectLibraryBlob {
            device,
            target,
            blob: rpc::encode_blob(blob),
            entrypoint,
            data,
        })
    }

    fn create_script(&self, session: SessionId, source: &ScriptSource) -> Result<ScriptId>
    {
        match source {
            ScriptSource::Source { name, text } => self.invoke(&Request::CreateScript {
                session,
                name: name.as_deref(),
                source: text,
            }),
            ScriptSource::Bytes(bytecode) => self.invoke(&Request::CreateScriptFromBytes {
                session,
                bytecode: rpc::encode_blob(bytecode),
            }),
        }
    }

    fn compile_script(&self, session: SessionId, name: &str, source: &str) -> Result<Vec<u8>>
    {
        let encoded: String = self.invoke(&Request::CompileScript { session, name, source })?;
        rpc::decode_blob(&encoded).map_err(|error| MiruError::Protocol(format!("malformed bytecode reply: {error}")))
    }

    fn load_script(&self, script: ScriptId) -> Result<()>
    {
        self.invoke_unit(&Request::LoadScript { script })
    }

    fn unload_script(&self, script: ScriptId) -> Result<()>
    {
        self.invoke_unit(&Request::UnloadScript { script })
    }

    fn script_exports(&self, script: ScriptId) -> Result<Vec<String>>
    {
        self.invoke(&Request::ScriptExports { script })
    }

    fn call_export(&self, script: ScriptId, name: &str, args: &[Value]) -> Result<Value>
    {
        self.invoke(&Request::CallExport { script, name, args })
    }

    fn enable_monitor(&self, path: &Path) -> Result<MonitorId>
    {
        let path = path.to_string_lossy();
        self.invoke(&Request::EnableMonitor { path: &path })
    }

    fn disable_monitor(&self, monitor: MonitorId) -> Result<()>
    {
        self.invoke_unit(&Request::DisableMonitor { monitor })
    }

    fn close(&self) -> Result<()>
    {
        debug!("closing engine");
        self.invoke_unit(&Request::Close)
    }
}
