//! # Types
//!
//! Engine-agnostic types used throughout the bindings.
//!
//! Everything that crosses the engine boundary is expressed with these types:
//! process identifiers and spawn parameters, device descriptors, and the
//! session/script handle identifiers minted by the engine.

pub mod device;
pub mod process;
pub mod script;

// Re-export all public types
pub use device::{DeviceId, DeviceInfo, DeviceKind};
pub use process::{InjectionId, Pid, ProcessTarget, SpawnOptions, Stdio};
pub use script::{AttachOptions, MonitorId, Realm, ScriptId, ScriptSource, SessionId};
