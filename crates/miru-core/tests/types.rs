//! Tests for the plain data types and their conversions.

use miru_core::types::{
    AttachOptions, DeviceId, DeviceInfo, DeviceKind, Pid, ProcessTarget, Realm, SpawnOptions, Stdio,
};

#[test]
fn test_process_target_conversions()
{
    assert_eq!(ProcessTarget::from(1234u32), ProcessTarget::Pid(Pid(1234)));
    assert_eq!(ProcessTarget::from(Pid(7)), ProcessTarget::Pid(Pid(7)));
    assert_eq!(ProcessTarget::from("Twitter"), ProcessTarget::Name("Twitter".to_string()));
    assert_eq!(
        ProcessTarget::from("Safari".to_string()),
        ProcessTarget::Name("Safari".to_string())
    );
}

#[test]
fn test_process_target_display()
{
    assert_eq!(ProcessTarget::from(1234u32).to_string(), "pid 1234");
    assert_eq!(ProcessTarget::from("Twitter").to_string(), "process 'Twitter'");
}

#[test]
fn test_process_target_serializes_untagged()
{
    assert_eq!(serde_json::to_value(ProcessTarget::from(42u32)).unwrap(), serde_json::json!(42));
    assert_eq!(
        serde_json::to_value(ProcessTarget::from("cat")).unwrap(),
        serde_json::json!("cat")
    );
}

#[test]
fn test_spawn_options_builder()
{
    let options = SpawnOptions::new("/bin/cat")
        .argv(["cat", "/etc/hosts"])
        .env([("TERM", "dumb")])
        .cwd("/tmp")
        .stdio(Stdio::Pipe);

    assert_eq!(options.program, "/bin/cat");
    assert_eq!(options.argv.as_deref(), Some(&["cat".to_string(), "/etc/hosts".to_string()][..]));
    assert_eq!(options.env.as_ref().unwrap()["TERM"], "dumb");
    assert_eq!(options.cwd.as_deref(), Some(std::path::Path::new("/tmp")));
    assert_eq!(options.stdio, Some(Stdio::Pipe));
    assert!(options.envp.is_none());
}

#[test]
fn test_spawn_options_omits_unset_fields_on_the_wire()
{
    let encoded = serde_json::to_value(SpawnOptions::new("/bin/ls")).unwrap();
    let object = encoded.as_object().unwrap();
    assert_eq!(object.len(), 1, "only `program` should be present: {object:?}");
    assert_eq!(object["program"], "/bin/ls");
}

#[test]
fn test_stdio_serializes_lowercase()
{
    assert_eq!(serde_json::to_value(Stdio::Inherit).unwrap(), serde_json::json!("inherit"));
    assert_eq!(serde_json::to_value(Stdio::Pipe).unwrap(), serde_json::json!("pipe"));
}

#[test]
fn test_realm_serializes_lowercase()
{
    assert_eq!(serde_json::to_value(Realm::Native).unwrap(), serde_json::json!("native"));
    assert_eq!(serde_json::to_value(Realm::Emulated).unwrap(), serde_json::json!("emulated"));
}

#[test]
fn test_attach_options_builder()
{
    let options = AttachOptions::default().realm(Realm::Emulated).persist_timeout(30);
    assert_eq!(options.realm, Some(Realm::Emulated));
    assert_eq!(options.persist_timeout, Some(30));

    let defaults = AttachOptions::default();
    assert!(defaults.realm.is_none());
    assert!(defaults.persist_timeout.is_none());
}

#[test]
fn test_device_kind_display()
{
    assert_eq!(DeviceKind::Local.to_string(), "local");
    assert_eq!(DeviceKind::Remote.to_string(), "remote");
    assert_eq!(DeviceKind::Usb.to_string(), "usb");
}

#[test]
fn test_device_info_construction()
{
    let info = DeviceInfo::new("local", "Local System", DeviceKind::Local);
    assert_eq!(info.id, DeviceId::from("local"));
    assert_eq!(info.name, "Local System");
    assert_eq!(info.kind, DeviceKind::Local);
}
