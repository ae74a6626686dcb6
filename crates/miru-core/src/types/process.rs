//! Process identifiers, targets, and spawn parameters.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Process identifier (PID)
///
/// A PID is the number the operating system assigned to a process on the
/// device that hosts it. The engine mints PIDs when spawning and accepts them
/// back for resume/kill/attach/inject calls.
///
/// Wrapping the raw `u32` in a newtype keeps PIDs from being confused with
/// other numeric handles the engine hands out (session ids, injection ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(pub u32);

impl Pid
{
    /// Get the raw `u32` value of the identifier.
    #[must_use]
    pub const fn raw(self) -> u32
    {
        self.0
    }
}

impl From<u32> for Pid
{
    fn from(pid: u32) -> Self
    {
        Pid(pid)
    }
}

impl From<Pid> for u32
{
    fn from(pid: Pid) -> Self
    {
        pid.0
    }
}

impl fmt::Display for Pid
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// Identifier returned by the engine for a completed library injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InjectionId(pub u32);

impl fmt::Display for InjectionId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// A process selector accepted by resume/kill/attach/inject operations
///
/// Operations that act on an existing process accept either its PID or its
/// name; name resolution happens inside the engine, on the device that hosts
/// the process.
///
/// ## Example
///
/// ```rust
/// use miru_core::types::{Pid, ProcessTarget};
///
/// let by_pid: ProcessTarget = 1234u32.into();
/// let by_name: ProcessTarget = "Twitter".into();
/// assert_eq!(by_pid, ProcessTarget::Pid(Pid(1234)));
/// assert_eq!(by_name, ProcessTarget::Name("Twitter".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessTarget
{
    /// Select a process by its numeric identifier.
    Pid(Pid),
    /// Select a process by name; resolution is performed by the engine.
    Name(String),
}

impl From<Pid> for ProcessTarget
{
    fn from(pid: Pid) -> Self
    {
        ProcessTarget::Pid(pid)
    }
}

impl From<u32> for ProcessTarget
{
    fn from(pid: u32) -> Self
    {
        ProcessTarget::Pid(Pid(pid))
    }
}

impl From<&str> for ProcessTarget
{
    fn from(name: &str) -> Self
    {
        ProcessTarget::Name(name.to_owned())
    }
}

impl From<String> for ProcessTarget
{
    fn from(name: String) -> Self
    {
        ProcessTarget::Name(name)
    }
}

impl fmt::Display for ProcessTarget
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            ProcessTarget::Pid(pid) => write!(f, "pid {pid}"),
            ProcessTarget::Name(name) => write!(f, "process '{name}'"),
        }
    }
}

/// Standard stream disposition for spawned processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stdio
{
    /// The spawned process shares the stdio of the hosting environment.
    Inherit,
    /// The engine captures stdio and delivers it through its own channels.
    Pipe,
}

/// Parameters for spawning a process into a suspended, attachable state
///
/// Only `program` is required; every other field is forwarded to the engine
/// untouched when present. Auxiliary options the engine understands but the
/// bindings do not model (per-platform flags and the like) travel in `aux` as
/// opaque JSON values.
///
/// ## Example
///
/// ```rust
/// use miru_core::types::{SpawnOptions, Stdio};
///
/// let options = SpawnOptions::new("/bin/cat")
///     .argv(["cat", "/etc/hosts"])
///     .env([("TERM", "dumb")])
///     .cwd("/tmp")
///     .stdio(Stdio::Pipe);
/// assert_eq!(options.program, "/bin/cat");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnOptions
{
    /// Path or name of the program to spawn.
    pub program: String,

    /// Argument vector, including `argv[0]`. When absent the engine derives
    /// one from `program`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argv: Option<Vec<String>>,

    /// Complete replacement environment for the spawned process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envp: Option<HashMap<String, String>>,

    /// Additions/overrides applied on top of the inherited environment.
    /// Ignored by the engine when `envp` is also set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<HashMap<String, String>>,

    /// Working directory for the spawned process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Standard stream disposition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdio: Option<Stdio>,

    /// Engine-specific auxiliary options, passed through opaquely.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub aux: serde_json::Map<String, Value>,
}

impl SpawnOptions
{
    /// Create options for spawning `program` with engine defaults.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self
    {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Set the argument vector (including `argv[0]`).
    #[must_use]
    pub fn argv<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv = Some(argv.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the spawned process's environment entirely.
    #[must_use]
    pub fn envp<I, K, V>(mut self, envp: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.envp = Some(envp.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Add to / override the inherited environment.
    #[must_use]
    pub fn env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(env.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self
    {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set the standard stream disposition.
    #[must_use]
    pub fn stdio(mut self, stdio: Stdio) -> Self
    {
        self.stdio = Some(stdio);
        self
    }

    /// Attach an engine-specific auxiliary option.
    #[must_use]
    pub fn aux(mut self, key: impl Into<String>, value: Value) -> Self
    {
        self.aux.insert(key.into(), value);
        self
    }
}
