//! # Script
//!
//! Loaded instrumentation code and its exported functions.
//!
//! A [`Script`] is created inside a [`Session`](crate::Session) and does
//! nothing until loaded. Once loaded, [`Script::exports`] returns an
//! [`Exports`] proxy over whatever functions the script registered; the set
//! is dynamic, discovered at load time rather than declared in these
//! bindings.
//!
//! Export names are matched as declared, with one convenience: a snake_case
//! name is retried in camelCase, so `exports.call("list_threads", &[])`
//! reaches an export declared as `listThreads`.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{MiruError, Result};
use crate::manager::Shared;
use crate::types::ScriptId;

/// Handle to a script created in a session
#[derive(Clone)]
pub struct Script
{
    shared: Arc<Shared>,
    id: ScriptId,
}

impl Script
{
    pub(crate) fn new(shared: Arc<Shared>, id: ScriptId) -> Self
    {
        Self { shared, id }
    }

    /// Engine-assigned identifier of this script.
    #[must_use]
    pub fn id(&self) -> ScriptId
    {
        self.id
    }

    /// Load the script into the target process. Its top-level code runs and
    /// its exports become callable.
    pub fn load(&self) -> Result<()>
    {
        self.shared.ensure_open()?;
        debug!(script = %self.id, "loading script");
        self.shared.engine.load_script(self.id)
    }

    /// Unload the script from the target process.
    ///
    /// ## Errors
    ///
    /// [`MiruError::InvalidOperation`] when the script is not loaded.
    pub fn unload(&self) -> Result<()>
    {
        self.shared.ensure_open()?;
        self.shared.engine.unload_script(self.id)
    }

    /// Snapshot the script's exported functions.
    ///
    /// ## Errors
    ///
    /// [`MiruError::InvalidOperation`] when the script has not been loaded.
    pub fn exports(&self) -> Result<Exports>
    {
        self.shared.ensure_open()?;
        let names = self.shared.engine.script_exports(self.id)?;
        Ok(Exports {
            shared: self.shared.clone(),
            id: self.id,
            names,
        })
    }
}

impl std::fmt::Debug for Script
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Script").field("id", &self.id).finish()
    }
}

/// Callable view over a loaded script's exports
///
/// Holds the export names as they were at the time of the
/// [`Script::exports`] call.
#[derive(Clone)]
pub struct Exports
{
    shared: Arc<Shared>,
    id: ScriptId,
    names: Vec<String>,
}

impl Exports
{
    /// Export names as the script declared them.
    #[must_use]
    pub fn names(&self) -> &[String]
    {
        &self.names
    }

    /// Whether `name` resolves to an export, directly or through the
    /// snake_case retry.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool
    {
        self.resolve(name).is_some()
    }

    /// Call an export and block for its reply.
    ///
    /// ## Errors
    ///
    /// [`MiruError::InvalidArgument`] when `name` resolves to no export,
    /// even after the snake_case-to-camelCase retry.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value>
    {
        self.shared.ensure_open()?;
        let resolved = self
            .resolve(name)
            .ok_or_else(|| MiruError::InvalidArgument(format!("no export named '{name}'")))?;
        self.shared.engine.call_export(self.id, resolved, args)
    }

    fn resolve(&self, name: &str) -> Option<&str>
    {
        if let Some(exact) = self.names.iter().find(|candidate| *candidate == name) {
            return Some(exact);
        }
        let camel = snake_to_camel(name);
        self.names.iter().find(|candidate| **candidate == camel).map(String::as_str)
    }
}

impl std::fmt::Debug for Exports
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Exports").field("id", &self.id).field("names", &self.names).finish()
    }
}

/// `list_threads` becomes `listThreads`. Names without underscores pass
/// through unchanged.
fn snake_to_camel(name: &str) -> String
{
    let mut result = String::with_capacity(name.len());
    let mut capitalize_next = false;
    for ch in name.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}
