//! # miru-core
//!
//! Rust bindings to the Miru dynamic instrumentation engine.
//!
//! All instrumentation work happens inside a native engine that ships as a
//! separate shared library (the "extension"). This crate provides:
//! - Loading and ABI validation of the extension ([`loader`])
//! - Device discovery with timeouts and cancellation ([`DeviceManager`])
//! - Process control and library injection ([`Device`])
//! - Script compilation, loading, and export calls ([`Session`], [`Script`])
//!
//! The bindings are deliberately thin: behavior lives in the engine, and
//! errors it reports come back unchanged through the shared taxonomy
//! ([`MiruError`]).
//!
//! ## Why unsafe code is needed
//!
//! The engine is reached over a C vtable resolved from a dynamically loaded
//! library. Calling through raw function pointers and handing C strings
//! across the boundary cannot be expressed in safe Rust. The unsafe surface
//! is confined to [`loader`] and [`ffi`]; everything above it is safe.
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
//!
//!     let pid = device.spawn(&SpawnOptions::new("/bin/cat").argv(["cat", "/etc/hosts"]))?;
//!     let session = device.attach(pid)?;
//!     let script = session.create_script(Some("explore"), "rpc.exports = { listThreads() { return []; } };")?;
//!     script.load()?;
//!     let threads = script.exports()?.call("list_threads", &[])?;
//!     println!("{threads}");
//!
//!     device.resume(pid)?;
//!     manager.close()
//! }
//! ```

#![allow(unsafe_code)] // Required for the dynamically loaded engine's C vtable

pub mod cancellable;
pub mod device;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod loader;
mod manager;
pub mod monitor;
pub mod prelude;
pub mod rpc;
pub mod script;
pub mod session;
pub mod types;

pub use cancellable::Cancellable;
pub use device::Device;
pub use engine::Engine;
// Re-export commonly used types
pub use error::{MiruError, Result};
pub use loader::{LoadError, EXTENSION_ENV};
pub use manager::DeviceManager;
pub use monitor::FileMonitor;
pub use script::{Exports, Script};
pub use session::Session;
pub use types::{
    AttachOptions, DeviceId, DeviceInfo, DeviceKind, InjectionId, MonitorId, Pid, ProcessTarget, Realm, ScriptId,
    ScriptSource, SessionId, SpawnOptions, Stdio,
};
