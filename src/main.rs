//! adeploy - Wireless adb pairing, connection and deploy
//!
//! This is the binary entry point. All workflow logic lives in `adeploy-app`.

mod cli;

use std::future::Future;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use tracing::{error, info, warn};

use adeploy_app::config::default_settings_path;
use adeploy_app::{
    AdbLocator, AdbRunner, BuildCompleted, DeployReport, DeployStage, Engine, InstallOptions,
    SettingsStore,
};
use adeploy_core::{Error, OperationResult};

use cli::{Args, Command, Toggle};

const WIRELESS_DEBUGGING_DOCS: &str =
    "https://developer.android.com/tools/adb#connect-to-a-device-over-wi-fi";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    adeploy_core::logging::init()?;

    let settings_path = args.config.clone().unwrap_or_else(default_settings_path);
    info!("Settings file: {}", settings_path.display());
    let store = SettingsStore::load(settings_path);

    match args.command {
        Command::BuildComplete {
            artifact,
            platform,
            failed,
            application_id,
        } => {
            let event = BuildCompleted {
                output_path: artifact,
                succeeded: !failed,
                platform,
                application_id,
            };
            let report = build_complete(store, &event, |adb_path| async move {
                AdbLocator::locate(adb_path.as_deref()).await
            })
            .await;
            // Never fail the calling build
            deploy_report(report, false)
        }
        command => run_with_adb(store, command).await,
    }
}

/// Post-build hook; adb is only looked up once there is something to deploy
async fn build_complete<L, F>(
    store: SettingsStore,
    event: &BuildCompleted,
    locate_adb: L,
) -> DeployReport
where
    L: FnOnce(Option<PathBuf>) -> F,
    F: Future<Output = AdbLocator>,
{
    if let Err(skipped) = event.auto_deploy_target(store.settings()) {
        info!("{}", skipped);
        return skipped;
    }

    let locator = locate_adb(store.settings().adb_path.clone()).await;
    if let Some(message) = locator.unavailable_message() {
        warn!("Auto-deploy: {}", message);
        return DeployReport::Failed {
            stage: DeployStage::Connect,
            message: message.to_string(),
        };
    }

    let runner = locator.adb_path.map(AdbRunner::new).unwrap_or_default();
    let mut engine = Engine::new(runner, store);
    let report = engine.auto_deploy_on_build_complete(event).await;
    engine.shutdown();
    report
}

async fn run_with_adb(store: SettingsStore, command: Command) -> Result<()> {
    let locator = AdbLocator::locate(store.settings().adb_path.as_deref()).await;
    if command.needs_adb() {
        if let Some(message) = locator.unavailable_message() {
            eprintln!("❌ {}", message);
            std::process::exit(1);
        }
    }

    let runner = locator
        .adb_path
        .clone()
        .map(AdbRunner::new)
        .unwrap_or_default();
    let mut engine = Engine::new(runner, store);

    let result = run(&mut engine, &locator, command).await;
    if let Err(ref e) = result {
        match e.downcast_ref::<Error>() {
            Some(err) if err.is_recoverable() => warn!("Command not run: {}", err),
            _ => {
                error!("Command failed: {}", e);
                if let Ok(log_file) = adeploy_core::logging::get_current_log_file() {
                    eprintln!("Details in {}", log_file.display());
                }
            }
        }
    }

    engine.shutdown();
    result
}

async fn run(engine: &mut Engine<AdbRunner>, locator: &AdbLocator, command: Command) -> Result<()> {
    match command {
        Command::Devices => {
            let candidates = engine.scan().await;
            if candidates.is_empty() {
                println!("No devices. Pair with `adeploy pair` or connect with `adeploy connect`.");
            }
            for candidate in candidates {
                println!("{}", candidate.display_string());
            }
            Ok(())
        }

        Command::Pair {
            address,
            port,
            code,
        } => {
            let result = engine.pair(&address, port, &code).await;
            report(result)?;
            println!("Paired. Connect with `adeploy connect {}`.", address);
            Ok(())
        }

        Command::Connect { address, port } => {
            let address = address.unwrap_or_else(|| engine.settings().connect_address.clone());
            if address.trim().is_empty() {
                return Err(
                    Error::precondition("No address given and no previous connect address saved")
                        .into(),
                );
            }
            let port = port.unwrap_or(engine.settings().connect_port);
            report(engine.connect(&address, port).await)
        }

        Command::Disconnect { serial } => {
            let serial = require_serial(engine, serial.as_deref())?;
            engine.adopt_connection(&serial);
            let remaining = engine.disconnect().await;
            println!("Disconnected {}", serial);
            for candidate in remaining {
                println!("  {}", candidate.display_string());
            }
            Ok(())
        }

        Command::Install {
            artifact,
            serial,
            no_downgrade,
            no_grant,
        } => {
            let serial = require_serial(engine, serial.as_deref())?;
            let artifact = artifact
                .or_else(|| engine.settings().last_artifact_path.clone())
                .ok_or_else(|| Error::precondition("No artifact given and none installed before"))?;
            let options = InstallOptions {
                allow_downgrade: !no_downgrade,
                grant_permissions: !no_grant,
            };
            report(engine.install(&serial, &artifact, options).await)
        }

        Command::Uninstall { package, serial } => {
            let serial = require_serial(engine, serial.as_deref())?;
            report(engine.uninstall(&serial, &package).await)
        }

        Command::Launch { package, serial } => {
            let serial = require_serial(engine, serial.as_deref())?;
            let package = require_package(engine, package)?;
            report(engine.launch(&serial, &package).await)
        }

        Command::Stop { package, serial } => {
            let serial = require_serial(engine, serial.as_deref())?;
            let package = require_package(engine, package)?;
            report(engine.stop(&serial, &package).await)
        }

        Command::Apps {
            all,
            relevant,
            uninstall,
            serial,
        } => {
            if all || relevant {
                engine.set_show_all_apps(all);
            }
            let serial = require_serial(engine, serial.as_deref())?;
            let refreshed = engine.refresh_apps(&serial).await;
            if !refreshed.success {
                return Err(eyre!("{}", refreshed.message));
            }

            if let Some(package) = uninstall {
                let record = engine
                    .inventory()
                    .apps()
                    .iter()
                    .find(|a| a.package_id == package)
                    .cloned()
                    .ok_or_else(|| eyre!("{} is not installed on {}", package, serial))?;
                report(engine.uninstall_app(&serial, &record).await)?;
            }

            for app in engine.visible_apps() {
                println!("{:<32} {}", app.display_name, app.package_id);
            }
            Ok(())
        }

        Command::Forget { address } => {
            match engine.forget_device(&address) {
                0 => println!("No saved device at {}", address),
                n => println!("Forgot {} ({} record{})", address, n, if n == 1 { "" } else { "s" }),
            }
            Ok(())
        }

        Command::Rename { address, name } => {
            if engine.rename_device(&address, &name) {
                println!("Renamed {} to {}", address, name);
                Ok(())
            } else {
                Err(eyre!("No saved device at {}", address))
            }
        }

        Command::Deploy => deploy_report(engine.quick_deploy().await, true),

        Command::BuildComplete { .. } => unreachable!("build-complete is dispatched before adb lookup"),

        Command::AutoDeploy { mode } => {
            let enabled = match mode {
                Toggle::On => {
                    engine.set_auto_deploy(true);
                    true
                }
                Toggle::Off => {
                    engine.set_auto_deploy(false);
                    false
                }
                Toggle::Toggle => engine.toggle_auto_deploy(),
            };
            println!(
                "Auto-deploy after build: {}",
                if enabled { "on" } else { "off" }
            );
            Ok(())
        }

        Command::Sdk => match locator.sdk_location() {
            Some(path) => {
                println!("{}", path.display());
                Ok(())
            }
            None => Err(eyre!(
                "Android SDK not found. Set ANDROID_HOME or ANDROID_SDK_ROOT."
            )),
        },

        Command::Docs => {
            println!("{}", WIRELESS_DEBUGGING_DOCS);
            Ok(())
        }

        Command::Version => {
            let path = locator.adb_path.clone().unwrap_or_else(|| PathBuf::from("adb"));
            println!(
                "{} (version {})",
                path.display(),
                locator.version.as_deref().unwrap_or("unknown")
            );
            Ok(())
        }
    }
}

/// Print a workflow result; failures become the command's error
fn report(result: OperationResult) -> Result<()> {
    if result.success {
        if !result.message.is_empty() {
            println!("{}", result.message);
        }
        Ok(())
    } else {
        Err(eyre!("{}", result.message))
    }
}

fn deploy_report(report: DeployReport, fail_on_error: bool) -> Result<()> {
    match report {
        DeployReport::Failed { .. } if fail_on_error => Err(eyre!("{}", report)),
        DeployReport::Failed { .. } => {
            eprintln!("{}", report);
            Ok(())
        }
        _ => {
            println!("{}", report);
            Ok(())
        }
    }
}

fn require_serial(engine: &Engine<AdbRunner>, explicit: Option<&str>) -> Result<String> {
    let serial = engine
        .target_serial(explicit)
        .ok_or_else(|| Error::precondition("No device. Pass --serial or connect first."))?;
    Ok(serial)
}

fn require_package(engine: &Engine<AdbRunner>, explicit: Option<String>) -> Result<String> {
    let package = explicit
        .or_else(|| engine.settings().application_id.clone())
        .ok_or_else(|| Error::precondition("No package given and no application_id in settings"))?;
    Ok(package)
}
