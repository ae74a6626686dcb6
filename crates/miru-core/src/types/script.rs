//! Session, script, and attach-time types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Execution context variant selected at attach time
///
/// Which realms exist for a given process is decided entirely by the engine;
/// the bindings only carry the selection across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Realm
{
    /// The process's native execution context.
    Native,
    /// An emulated context hosted inside the process (where supported).
    Emulated,
}

impl fmt::Display for Realm
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Realm::Native => f.write_str("native"),
            Realm::Emulated => f.write_str("emulated"),
        }
    }
}

/// Options for [`Device::attach_with_options`](crate::Device::attach_with_options).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AttachOptions
{
    /// Execution context to attach to. Engine default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<Realm>,

    /// How long, in seconds, the session survives the target's disappearance
    /// before the engine tears it down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_timeout: Option<u32>,
}

impl AttachOptions
{
    /// Select an execution context.
    #[must_use]
    pub fn realm(mut self, realm: Realm) -> Self
    {
        self.realm = Some(realm);
        self
    }

    /// Set the session persistence timeout, in seconds.
    #[must_use]
    pub fn persist_timeout(mut self, seconds: u32) -> Self
    {
        self.persist_timeout = Some(seconds);
        self
    }
}

/// Handle to an attached session, minted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// Handle to a script created within a session, minted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptId(pub u64);

impl fmt::Display for ScriptId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// Handle to an enabled file monitor, minted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorId(pub u64);

impl fmt::Display for MonitorId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// The two forms a script can take when handed to the engine
///
/// Source text is written in the engine's embedded scripting language;
/// bytecode is whatever the engine's compiler produced earlier. Both are
/// opaque to the bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource
{
    /// Script source text, optionally named for diagnostics.
    Source
    {
        /// Name shown in engine-side diagnostics.
        name: Option<String>,
        /// The source text itself.
        text: String,
    },
    /// Precompiled script bytecode.
    Bytes(Vec<u8>),
}
