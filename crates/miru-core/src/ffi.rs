//! Raw C ABI exposed by the extension library.
//!
//! The extension exports a single entry symbol, [`ENTRY_SYMBOL`], returning a
//! pointer to a [`RawEngineApi`] vtable. All operations funnel through
//! `invoke` as JSON request/reply strings (see `rpc` for the shapes): a zero
//! status means success and `reply` holds the JSON result; a nonzero status
//! is an error code from the shared taxonomy and `reply` holds the message.
//! Replies are allocated by the extension and must be returned to it through
//! `free_reply`.

use std::os::raw::{c_char, c_int, c_uint};

/// ABI revision these bindings speak. The loader refuses extensions that
/// report anything else.
pub const ENGINE_ABI_VERSION: u32 = 1;

/// Name of the entry symbol resolved from the extension library.
pub const ENTRY_SYMBOL: &[u8] = b"miru_engine_api\0";

/// Opaque engine instance owned by the extension.
#[repr(C)]
pub struct RawEngine
{
    _private: [u8; 0],
}

/// Vtable returned by the extension's entry symbol.
#[repr(C)]
pub struct RawEngineApi
{
    /// ABI revision the extension was built against.
    pub abi_version: c_uint,

    /// Create an engine instance. Null on failure.
    pub open: unsafe extern "C" fn() -> *mut RawEngine,

    /// Destroy an engine instance. The handle is invalid afterwards.
    pub close: unsafe extern "C" fn(engine: *mut RawEngine),

    /// Version string of the engine build. Owned by the extension; valid for
    /// the life of the engine instance.
    pub version: unsafe extern "C" fn(engine: *mut RawEngine) -> *const c_char,

    /// Execute one operation. `request` is a NUL-terminated JSON document;
    /// on return `*reply` points at a NUL-terminated buffer (result JSON on
    /// success, message text on failure) or is null when there is nothing to
    /// say. Returns 0 on success, an error-taxonomy code otherwise.
    pub invoke: unsafe extern "C" fn(engine: *mut RawEngine, request: *const c_char, reply: *mut *mut c_char) -> c_int,

    /// Release a reply buffer produced by `invoke`.
    pub free_reply: unsafe extern "C" fn(reply: *mut c_char),
}

/// Signature of the entry symbol.
pub type EntryFn = unsafe extern "C" fn() -> *const RawEngineApi;
