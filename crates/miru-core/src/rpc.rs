//! Wire shapes for requests crossing the extension ABI.
//!
//! Requests serialize as `{"op": "...", ...}` documents; binary payloads
//! (library blobs, script bytecode) travel as base64 strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::Value;

use crate::types::{AttachOptions, DeviceId, MonitorId, ProcessTarget, ScriptId, SessionId, SpawnOptions};

/// One operation request, borrowed from the caller's arguments.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum Request<'a>
{
    EnumerateDevices,
    QuerySystemParameters
    {
        device: &'a DeviceId,
    },
    Spawn
    {
        device: &'a DeviceId,
        options: &'a SpawnOptions,
    },
    Resume
    {
        device: &'a DeviceId,
        target: &'a ProcessTarget,
    },
    Kill
    {
        device: &'a DeviceId,
        target: &'a ProcessTarget,
    },
    Attach
    {
        device: &'a DeviceId,
        target: &'a ProcessTarget,
        options: &'a AttachOptions,
    },
    Detach
    {
        session: SessionId,
    },
    InjectLibraryFile
    {
        device: &'a DeviceId,
        target: &'a ProcessTarget,
        path: &'a str,
        entrypoint: &'a str,
        data: &'a str,
    },
    InjectLibraryBlob
    {
        device: &'a DeviceId,
        target: &'a ProcessTarget,
        blob: String,
        entrypoint: &'a str,
        data: &'a str,
    },
    CreateScript
    {
        session: SessionId,
        name: Option<&'a str>,
        source: &'a str,
    },
    CreateScriptFromBytes
    {
        session: SessionId,
        bytecode: String,
    },
    CompileScript
    {
        session: SessionId,
        name: &'a str,
        source: &'a str,
    },
    LoadScript
    {
        script: ScriptId,
    },
    UnloadScript
    {
        script: ScriptId,
    },
    ScriptExports
    {
        script: ScriptId,
    },
    CallExport
    {
        script: ScriptId,
        name: &'a str,
        args: &'a [Value],
    },
    EnableMonitor
    {
        path: &'a str,
    },
    DisableMonitor
    {
        monitor: MonitorId,
    },
    Close,
}

/// Encode a binary payload for transport.
#[must_use]
pub fn encode_blob(bytes: &[u8]) -> String
{
    STANDARD.encode(bytes)
}

/// Decode a binary payload received from the engine.
pub fn decode_blob(encoded: &str) -> Result<Vec<u8>, base64::DecodeError>
{
    STANDARD.decode(encoded)
}
