//! # Error Types
//!
//! The error taxonomy shared with the native engine.
//!
//! Every failure the engine reports arrives as one of the fourteen kinds
//! below, and the bindings propagate it unchanged: nothing in this crate
//! swallows, retries, or re-kinds an engine error. Callers are expected to
//! discriminate on the variant, not on message text.
//!
//! The kinds carry stable integer codes (see [`MiruError::code`]) because the
//! same taxonomy crosses the C boundary in `ffi`/`loader`; the codes are part
//! of the extension ABI.

use thiserror::Error;

use crate::loader::LoadError;

/// Error raised by an engine operation (or, for [`MiruError::Load`], by the
/// attempt to load the engine itself)
///
/// ## Error categories
///
/// 1. **Connectivity**: ServerNotRunning, AddressInUse, Transport, Protocol
/// 2. **Target lookup**: ExecutableNotFound, ExecutableNotSupported,
///    ProcessNotFound, ProcessNotResponding
/// 3. **Caller mistakes**: InvalidArgument, InvalidOperation, NotSupported
/// 4. **Environment**: PermissionDenied
/// 5. **Waiting**: TimedOut, OperationCancelled
#[derive(Error, Debug)]
pub enum MiruError
{
    /// The remote engine server the device routes through is not running.
    #[error("Server not running: {0}")]
    ServerNotRunning(String),

    /// The program handed to `spawn` could not be found on the device.
    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    /// The program exists but the engine cannot host it (wrong architecture,
    /// unsupported binary format, and so on).
    #[error("Executable not supported: {0}")]
    ExecutableNotSupported(String),

    /// The PID or name did not resolve to a process on the device.
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    /// The process exists but did not answer the engine in time.
    #[error("Process not responding: {0}")]
    ProcessNotResponding(String),

    /// An argument was rejected before the operation started. Also raised by
    /// discovery calls with a zero timeout when no matching device exists.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation does not apply in the current state, e.g. resuming a
    /// process that is not suspended, or using a closed device manager.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The operating system refused the engine access to the target.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A listen address needed by the engine is already taken.
    #[error("Address in use: {0}")]
    AddressInUse(String),

    /// A bounded wait elapsed before the operation could complete.
    #[error("Operation timed out: {0}")]
    TimedOut(String),

    /// The engine build in use does not implement the requested operation.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// The engine and its remote peer (or these bindings) disagreed about
    /// message framing or contents.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The connection carrying the operation broke.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The operation was aborted through a [`Cancellable`](crate::Cancellable)
    /// or because the device manager was closed mid-wait.
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// The native engine could not be loaded at all. See [`LoadError`] for
    /// the not-found / rejected distinction.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl MiruError
{
    /// The stable code for this kind, as used on the extension ABI
    ///
    /// [`MiruError::Load`] never originates from the engine and maps to `0`,
    /// which the ABI reserves for success and which [`MiruError::from_code`]
    /// will never produce.
    #[must_use]
    pub fn code(&self) -> i32
    {
        match self {
            MiruError::ServerNotRunning(_) => 1,
            MiruError::ExecutableNotFound(_) => 2,
            MiruError::ExecutableNotSupported(_) => 3,
            MiruError::ProcessNotFound(_) => 4,
            MiruError::ProcessNotResponding(_) => 5,
            MiruError::InvalidArgument(_) => 6,
            MiruError::InvalidOperation(_) => 7,
            MiruError::PermissionDenied(_) => 8,
            MiruError::AddressInUse(_) => 9,
            MiruError::TimedOut(_) => 10,
            MiruError::NotSupported(_) => 11,
            MiruError::Protocol(_) => 12,
            MiruError::Transport(_) => 13,
            MiruError::OperationCancelled(_) => 14,
            MiruError::Load(_) => 0,
        }
    }

    /// Rebuild an error from a code and message received over the ABI
    ///
    /// Codes outside the taxonomy degrade to [`MiruError::Protocol`] so that
    /// a newer engine never makes the bindings panic.
    #[must_use]
    pub fn from_code(code: i32, message: impl Into<String>) -> Self
    {
        let message = message.into();
        match code {
            1 => MiruError::ServerNotRunning(message),
            2 => MiruError::ExecutableNotFound(message),
            3 => MiruError::ExecutableNotSupported(message),
            4 => MiruError::ProcessNotFound(message),
            5 => MiruError::ProcessNotResponding(message),
            6 => MiruError::InvalidArgument(message),
            7 => MiruError::InvalidOperation(message),
            8 => MiruError::PermissionDenied(message),
            9 => MiruError::AddressInUse(message),
            10 => MiruError::TimedOut(message),
            11 => MiruError::NotSupported(message),
            12 => MiruError::Protocol(message),
            13 => MiruError::Transport(message),
            14 => MiruError::OperationCancelled(message),
            other => MiruError::Protocol(format!("unknown engine error code {other}: {message}")),
        }
    }
}

/// Convenience type alias for `Result<T, MiruError>`
///
/// ```rust
/// use miru_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, MiruError>;
