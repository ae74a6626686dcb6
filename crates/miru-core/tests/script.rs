//! Tests for sessions, scripts, and the exports proxy.

mod support;

use std::sync::Arc;

use miru_core::{DeviceManager, MiruError, Session, SpawnOptions};

use support::MockEngine;

const EXPLORER_SOURCE: &str = r"
rpc.exports = {
    listThreads: function () { return []; },
    getModuleBaseAddress: function (name) { return ptr(0); },
    dispose: function () {},
};
";

fn attached_session() -> (DeviceManager, Session)
{
    let manager = DeviceManager::with_engine(Arc::new(MockEngine::new()));
    let device = manager.get_local_device().unwrap();
    let pid = device.spawn(&SpawnOptions::new("/bin/cat")).unwrap();
    let session = device.attach(pid).unwrap();
    (manager, session)
}

#[test]
fn test_attach_to_unknown_process_fails()
{
    let manager = DeviceManager::with_engine(Arc::new(MockEngine::new()));
    let device = manager.get_local_device().unwrap();
    assert!(matches!(device.attach(99999u32), Err(MiruError::ProcessNotFound(_))));
}

#[test]
fn test_attach_to_system_session()
{
    // Pid 0 is the system session and always attachable.
    let manager = DeviceManager::with_engine(Arc::new(MockEngine::new()));
    let device = manager.get_local_device().unwrap();
    assert!(device.attach(0u32).is_ok());
}

#[test]
fn test_script_load_and_list_exports()
{
    let (_manager, session) = attached_session();
    let script = session.create_script(Some("explorer"), EXPLORER_SOURCE).unwrap();
    script.load().unwrap();

    let exports = script.exports().unwrap();
    assert!(exports.names().contains(&"listThreads".to_string()));
    assert!(exports.names().contains(&"dispose".to_string()));
}

#[test]
fn test_exports_before_load_is_an_invalid_operation()
{
    let (_manager, session) = attached_session();
    let script = session.create_script(None, EXPLORER_SOURCE).unwrap();
    assert!(matches!(script.exports(), Err(MiruError::InvalidOperation(_))));
}

#[test]
fn test_call_export_with_snake_case_name()
{
    let (_manager, session) = attached_session();
    let script = session.create_script(None, EXPLORER_SOURCE).unwrap();
    script.load().unwrap();
    let exports = script.exports().unwrap();

    // Declared as listThreads; callable under both spellings.
    let reply = exports.call("list_threads", &[]).unwrap();
    assert_eq!(reply["export"], "listThreads");
    let reply = exports.call("listThreads", &[]).unwrap();
    assert_eq!(reply["export"], "listThreads");

    assert!(exports.contains("get_module_base_address"));
    assert!(!exports.contains("no_such_export"));
}

#[test]
fn test_call_unknown_export_is_an_invalid_argument()
{
    let (_manager, session) = attached_session();
    let script = session.create_script(None, EXPLORER_SOURCE).unwrap();
    script.load().unwrap();
    match script.exports().unwrap().call("no_such_export", &[]) {
        Err(MiruError::InvalidArgument(message)) => assert!(message.contains("no_such_export")),
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
}

#[test]
fn test_compiled_bytecode_behaves_like_source()
{
    let (_manager, session) = attached_session();

    let from_source = session.create_script(Some("explorer"), EXPLORER_SOURCE).unwrap();
    from_source.load().unwrap();
    let source_exports = from_source.exports().unwrap().names().to_vec();

    let bytecode = session.compile_script("explorer", EXPLORER_SOURCE).unwrap();
    let from_bytes = session.create_script_from_bytes(&bytecode).unwrap();
    from_bytes.load().unwrap();
    let bytecode_exports = from_bytes.exports().unwrap().names().to_vec();

    assert_eq!(source_exports, bytecode_exports);
}

#[test]
fn test_garbage_bytecode_is_rejected()
{
    let (_manager, session) = attached_session();
    match session.create_script_from_bytes(b"definitely not bytecode") {
        Err(MiruError::InvalidArgument(message)) => assert!(message.contains("bytecode")),
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
}

#[test]
fn test_unload_requires_loaded_script()
{
    let (_manager, session) = attached_session();
    let script = session.create_script(None, EXPLORER_SOURCE).unwrap();
    assert!(matches!(script.unload(), Err(MiruError::InvalidOperation(_))));

    script.load().unwrap();
    script.unload().unwrap();
    assert!(matches!(script.unload(), Err(MiruError::InvalidOperation(_))));
}

#[test]
fn test_detach_invalidates_session()
{
    let (_manager, session) = attached_session();
    let probe = session.clone();
    session.detach().unwrap();
    assert!(matches!(probe.detach(), Err(MiruError::InvalidOperation(_))));
}

#[test]
fn test_script_operations_fail_after_manager_close()
{
    let (manager, session) = attached_session();
    let script = session.create_script(None, EXPLORER_SOURCE).unwrap();
    manager.close().unwrap();
    assert!(matches!(script.load(), Err(MiruError::InvalidOperation(_))));
}
