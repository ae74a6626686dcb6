use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use miru_core::{DeviceManager, ProcessTarget, Realm, Result as MiruResult, SpawnOptions};
use miru_utils::{info, init_logging};

/// Command-line frontend for the Miru dynamic instrumentation engine.
#[derive(Parser, Debug)]
#[command(name = "miru")]
#[command(version)]
#[command(about = "Dynamic instrumentation from the command line", long_about = None)]
struct Cli
{
    /// Device to operate on (default: the local device)
    #[arg(short = 'D', long, global = true)]
    device: Option<String>,

    /// Seconds to wait for the selected device to appear
    #[arg(long, global = true, default_value_t = 5)]
    device_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// List the devices the engine currently knows about
    Devices,
    /// Show host-system parameters of the selected device
    Params,
    /// Spawn a program in a suspended state
    Spawn
    {
        /// Path to the program to spawn
        program: String,
        /// Arguments to pass to the program (argv, including argv[0])
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
        /// Resume the process immediately after spawning
        #[arg(long, default_value_t = false)]
        resume: bool,
        /// Working directory for the spawned process
        #[arg(long)]
        cwd: Option<String>,
    },
    /// Resume a suspended process
    Resume
    {
        /// Process to resume (PID or name)
        target: String,
    },
    /// Terminate a process
    Kill
    {
        /// Process to kill (PID or name)
        target: String,
    },
    /// Attach to a process and load an instrumentation script
    Attach
    {
        /// Process to attach to (PID or name)
        target: String,
        /// Path to the script source to load after attaching
        #[arg(short, long)]
        script: Option<String>,
        /// Realm to attach to (native or emulated)
        #[arg(long)]
        realm: Option<String>,
    },
    /// Inject a shared library into a process
    Inject
    {
        /// Process to inject into (PID or name)
        target: String,
        /// Path to the shared library
        library: String,
        /// Entrypoint symbol to invoke in the target
        #[arg(long, default_value = "miru_main")]
        entrypoint: String,
        /// Opaque string delivered to the entrypoint
        #[arg(long, default_value = "")]
        data: String,
    },
}

fn main()
{
    // Initialize logging (reads from RUST_LOG env var)
    // Defaults to INFO level and Pretty format if not set
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let cli = Cli::parse();

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> MiruResult<()>
{
    let manager = DeviceManager::new()?;
    let result = dispatch(&cli, &manager);
    manager.close()?;
    result
}

fn dispatch(cli: &Cli, manager: &DeviceManager) -> MiruResult<()>
{
    match &cli.command {
        Commands::Devices => {
            for device in manager.enumerate_devices()? {
                println!("{}\t{}\t{}", device.id(), device.kind(), device.name());
            }
            Ok(())
        }
        Commands::Params => {
            let device = select_device(cli, manager)?;
            let params = device.query_system_parameters()?;
            println!("{}", serde_json::to_string_pretty(&params).unwrap_or_default());
            Ok(())
        }
        Commands::Spawn {
            program,
            args,
            resume,
            cwd,
        } => {
            let device = select_device(cli, manager)?;
            info!("Spawning program: {} with args: {:?}", program, args);

            let mut options = SpawnOptions::new(program);
            if !args.is_empty() {
                options = options.argv(args.clone());
            }
            if let Some(cwd) = cwd {
                options = options.cwd(cwd);
            }

            let pid = device.spawn(&options)?;
            println!("Spawned {} (PID: {})", program, pid);

            if *resume {
                device.resume(pid)?;
                println!("Process resumed and running");
            }
            Ok(())
        }
        Commands::Resume { target } => {
            let device = select_device(cli, manager)?;
            device.resume(parse_target(target))?;
            println!("Resumed {}", target);
            Ok(())
        }
        Commands::Kill { target } => {
            let device = select_device(cli, manager)?;
            device.kill(parse_target(target))?;
            println!("Killed {}", target);
            Ok(())
        }
        Commands::Attach { target, script, realm } => {
            let device = select_device(cli, manager)?;
            let mut options = miru_core::AttachOptions::default();
            if let Some(realm) = realm {
                options = options.realm(parse_realm(realm)?);
            }

            let session = device.attach_with_options(parse_target(target), &options)?;
            println!("Attached to {} (session {})", target, session.id());

            if let Some(script_path) = script {
                let source = std::fs::read_to_string(script_path)
                    .map_err(|e| miru_core::MiruError::InvalidArgument(format!("cannot read {script_path}: {e}")))?;
                let script = session.create_script(Some(script_path.as_str()), &source)?;
                script.load()?;
                println!("Loaded script {} with exports: {:?}", script_path, script.exports()?.names());
            }

            session.detach()
        }
        Commands::Inject {
            target,
            library,
            entrypoint,
            data,
        } => {
            let device = select_device(cli, manager)?;
            let id = device.inject_library_file(parse_target(target), library, entrypoint, data)?;
            println!("Injected {} into {} (injection {})", library, target, id);
            Ok(())
        }
    }
}

/// Resolve the device the global flags select: an explicit id with the
/// configured wait, or the local device.
fn select_device(cli: &Cli, manager: &DeviceManager) -> MiruResult<miru_core::Device>
{
    match &cli.device {
        Some(id) => manager.get_device(id, Duration::from_secs(cli.device_timeout)),
        None => manager.get_local_device(),
    }
}

/// A target that parses as a number is a PID; anything else is a name.
fn parse_target(target: &str) -> ProcessTarget
{
    match target.parse::<u32>() {
        Ok(pid) => ProcessTarget::from(pid),
        Err(_) => ProcessTarget::from(target),
    }
}

fn parse_realm(realm: &str) -> MiruResult<Realm>
{
    match realm.to_lowercase().as_str() {
        "native" => Ok(Realm::Native),
        "emulated" => Ok(Realm::Emulated),
        _ => Err(miru_core::MiruError::InvalidArgument(format!(
            "unknown realm: {realm}. Use 'native' or 'emulated'"
        ))),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_target()
    {
        assert_eq!(parse_target("1234"), ProcessTarget::from(1234u32));
        assert_eq!(parse_target("Twitter"), ProcessTarget::from("Twitter"));
    }

    #[test]
    fn test_parse_realm()
    {
        assert_eq!(parse_realm("native").unwrap(), Realm::Native);
        assert_eq!(parse_realm("EMULATED").unwrap(), Realm::Emulated);
        assert!(parse_realm("other").is_err());
    }
}
