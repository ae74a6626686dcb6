//! Compile a script to bytecode in one session and run it in another.
//!
//! Compilation happens against the system session (pid 0), so no target
//! process is needed until the bytecode is actually used.

use miru_core::{DeviceManager, Result};

const SOURCE: &str = r"
rpc.exports = {
    listThreads: function () {
        return Process.enumerateThreads().map(function (thread) {
            return thread.id;
        });
    },
};
";

fn main() -> Result<()>
{
    let manager = DeviceManager::new()?;
    let device = manager.get_local_device()?;

    let system_session = device.attach(0u32)?;
    let bytecode = system_session.compile_script("explorer", SOURCE)?;
    system_session.detach()?;

    let session = device.attach("Twitter")?;
    let script = session.create_script_from_bytes(&bytecode)?;
    script.load()?;

    let threads = script.exports()?.call("list_threads", &[])?;
    println!("threads: {threads}");

    session.detach()?;
    manager.close()
}
