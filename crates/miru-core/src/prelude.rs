//! Common module for library exports

pub use crate::cancellable::Cancellable;
pub use crate::device::Device;
pub use crate::error::{MiruError, Result};
pub use crate::manager::DeviceManager;
pub use crate::script::{Exports, Script};
pub use crate::session::Session;
pub use crate::types::{AttachOptions, DeviceKind, Pid, ProcessTarget, Realm, SpawnOptions, Stdio};
