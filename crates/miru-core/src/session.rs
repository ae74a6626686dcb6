//! # Session
//!
//! An instrumentation session against one process.
//!
//! Sessions come from [`Device::attach`](crate::Device::attach). They are the
//! anchor for scripts: source text or precompiled bytecode becomes a
//! [`Script`] here, and [`Session::compile_script`] turns source into
//! bytecode for later use.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::manager::Shared;
use crate::script::Script;
use crate::types::{ScriptSource, SessionId};

/// Handle to an instrumentation session
#[derive(Clone)]
pub struct Session
{
    shared: Arc<Shared>,
    id: SessionId,
}

impl Session
{
    pub(crate) fn new(shared: Arc<Shared>, id: SessionId) -> Self
    {
        Self { shared, id }
    }

    /// Engine-assigned identifier of this session.
    #[must_use]
    pub fn id(&self) -> SessionId
    {
        self.id
    }

    /// Create a script from source text. `name` labels the script in engine
    /// diagnostics; pass `None` for an unnamed script.
    ///
    /// The script exists but is inert until [`Script::load`] is called.
    pub fn create_script(&self, name: Option<&str>, source: &str) -> Result<Script>
    {
        self.create(&ScriptSource::Source {
            name: name.map(str::to_owned),
            text: source.to_owned(),
        })
    }

    /// Create a script from bytecode previously produced by
    /// [`Session::compile_script`].
    ///
    /// ## Errors
    ///
    /// [`MiruError::InvalidArgument`](crate::MiruError::InvalidArgument) when
    /// the bytes are not valid bytecode for this engine build.
    pub fn create_script_from_bytes(&self, bytecode: &[u8]) -> Result<Script>
    {
        self.create(&ScriptSource::Bytes(bytecode.to_vec()))
    }

    /// Compile source text to engine bytecode without creating a script.
    ///
    /// The output is opaque: hand it back to
    /// [`Session::create_script_from_bytes`], on a session against the same
    /// engine build, and nothing else.
    pub fn compile_script(&self, name: &str, source: &str) -> Result<Vec<u8>>
    {
        self.shared.ensure_open()?;
        self.shared.engine.compile_script(self.id, name, source)
    }

    /// Tear the session down. Scripts created in it are invalidated.
    pub fn detach(self) -> Result<()>
    {
        self.shared.ensure_open()?;
        debug!(session = %self.id, "detaching");
        self.shared.engine.detach(self.id)
    }

    fn create(&self, source: &ScriptSource) -> Result<Script>
    {
        self.shared.ensure_open()?;
        let script = self.shared.engine.create_script(self.id, source)?;
        Ok(Script::new(self.shared.clone(), script))
    }
}

impl std::fmt::Debug for Session
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}
