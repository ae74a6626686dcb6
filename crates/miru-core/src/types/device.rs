//! Device descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for a device, assigned by the engine
///
/// The local device always exists and carries a well-known id; remote and USB
/// devices come and go as the engine observes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId
{
    /// View the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str
    {
        &self.0
    }
}

impl From<&str> for DeviceId
{
    fn from(id: &str) -> Self
    {
        DeviceId(id.to_owned())
    }
}

impl From<String> for DeviceId
{
    fn from(id: String) -> Self
    {
        DeviceId(id)
    }
}

impl fmt::Display for DeviceId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.0)
    }
}

/// The transport class a device is reachable over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind
{
    /// The machine the bindings are running on.
    Local,
    /// A device reached over the network (e.g. a portal or remote server).
    Remote,
    /// A device attached over USB.
    Usb,
}

impl fmt::Display for DeviceKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            DeviceKind::Local => f.write_str("local"),
            DeviceKind::Remote => f.write_str("remote"),
            DeviceKind::Usb => f.write_str("usb"),
        }
    }
}

/// Description of a device as reported by the engine's enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo
{
    /// Stable identifier used to re-request the same device later.
    pub id: DeviceId,
    /// Human-readable name.
    pub name: String,
    /// Transport class.
    pub kind: DeviceKind,
}

impl DeviceInfo
{
    /// Create a device descriptor.
    #[must_use]
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>, kind: DeviceKind) -> Self
    {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}
