//! Tests for process control: spawn, resume, kill, inject.

mod support;

use std::sync::Arc;

use miru_core::{DeviceManager, MiruError, SpawnOptions};

use support::MockEngine;

fn local_device() -> (DeviceManager, miru_core::Device)
{
    let manager = DeviceManager::with_engine(Arc::new(MockEngine::new()));
    let device = manager.get_local_device().unwrap();
    (manager, device)
}

#[test]
fn test_spawn_resume_kill()
{
    let (_manager, device) = local_device();
    let pid = device.spawn(&SpawnOptions::new("/bin/cat").argv(["cat"])).unwrap();
    device.resume(pid).unwrap();
    device.kill(pid).unwrap();
}

#[test]
fn test_spawned_process_can_be_killed_without_resume()
{
    // A process spawned suspended and never resumed must still be killable.
    let (_manager, device) = local_device();
    let pid = device.spawn(&SpawnOptions::new("/bin/cat")).unwrap();
    device.kill(pid).unwrap();
}

#[test]
fn test_resume_twice_is_an_invalid_operation()
{
    let (_manager, device) = local_device();
    let pid = device.spawn(&SpawnOptions::new("/bin/cat")).unwrap();
    device.resume(pid).unwrap();
    assert!(matches!(device.resume(pid), Err(MiruError::InvalidOperation(_))));
}

#[test]
fn test_spawn_missing_program_reports_executable_not_found()
{
    let (_manager, device) = local_device();
    match device.spawn(&SpawnOptions::new("/bin/nonexistent")) {
        Err(MiruError::ExecutableNotFound(message)) => assert!(message.contains("/bin/nonexistent")),
        other => panic!("expected ExecutableNotFound, got {other:?}"),
    }
}

#[test]
fn test_operations_on_unknown_pid_report_process_not_found()
{
    let (_manager, device) = local_device();
    assert!(matches!(device.resume(99999u32), Err(MiruError::ProcessNotFound(_))));
    assert!(matches!(device.kill(99999u32), Err(MiruError::ProcessNotFound(_))));
}

#[test]
fn test_inject_library_file_into_spawned_process()
{
    let (_manager, device) = local_device();
    let pid = device.spawn(&SpawnOptions::new("/bin/cat")).unwrap();
    let injection = device
        .inject_library_file(pid, "/usr/lib/agent.so", "agent_main", "config")
        .unwrap();
    assert!(injection.0 > 0);
}

#[test]
fn test_inject_library_blob_rejects_empty_blob()
{
    let (_manager, device) = local_device();
    let pid = device.spawn(&SpawnOptions::new("/bin/cat")).unwrap();
    assert!(matches!(
        device.inject_library_blob(pid, &[], "agent_main", ""),
        Err(MiruError::InvalidArgument(_))
    ));
    assert!(device.inject_library_blob(pid, b"\x7fELF...", "agent_main", "").is_ok());
}

#[test]
fn test_query_system_parameters()
{
    let (_manager, device) = local_device();
    let params = device.query_system_parameters().unwrap();
    assert_eq!(params["os"]["id"], "linux");
    assert_eq!(params["arch"], "x86_64");
}
