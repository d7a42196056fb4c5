use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;
use log::info;

mod adb;
mod catalog;
mod cli;
mod demo;
mod models;
mod report;
mod reporters;
mod scanner;
mod scoring;

use adb::AdbBridge;
use catalog::{PermissionCatalog, SdkCatalog};
use cli::{Args, Commands, OutputFormat};
use reporters::Reporter;
use scanner::Scanner;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let adb = AdbBridge::new(args.device.clone());
    let permissions = PermissionCatalog::builtin();
    let sdk = SdkCatalog::builtin();

    match args.command {
        Commands::Scan {
            system,
            deep,
            output,
            output_dir,
        } => {
            ensure_device(&adb)?;
            show_device(&adb);

            println!("\n{}", "Starting security scan...".cyan().bold());
            if deep {
                println!("{}", "Deep scan enabled - this may take longer".yellow());
            }

            let mut scanner = Scanner::new(&adb, &permissions, &sdk, system);
            scanner.scan_all(deep)?;
            let full_report = scanner.full_report();

            scanner::display_scan_summary(&full_report);

            if output == OutputFormat::Cli {
                scanner::display_high_risk_apps(&full_report);
            } else {
                println!("\n{}", "Generating reports...".cyan().bold());
                let reporter = Reporter::new(&output_dir);
                for path in reporter.write(&full_report, output)? {
                    println!("  ✓ {}", path.display());
                }
            }
        }

        Commands::Analyze { package, deep } => {
            ensure_device(&adb)?;
            println!("\n{}", format!("Analyzing {}...", package).cyan().bold());

            let scanner = Scanner::new(&adb, &permissions, &sdk, true);
            match scanner.scan_app(&package, deep) {
                Some(report) => scanner::display_app_report(&report),
                None => bail!("could not analyze {}; is it installed?", package),
            }
        }

        Commands::ListApps { system } => {
            ensure_device(&adb)?;
            println!("\n{}", "Fetching installed apps...".cyan().bold());

            let packages = adb.list_packages(system)?;
            for (i, package) in packages.iter().enumerate() {
                println!("  {:>4}  {:<45} {}", i + 1, package, adb.app_label(package).green());
            }
            println!("\n{}", format!("Total: {} apps", packages.len()).bold());
        }

        Commands::Uninstall { package } => {
            ensure_device(&adb)?;
            adb.uninstall_app(&package)?;
            println!("{}", format!("✓ Uninstalled {}", package).green().bold());
        }

        Commands::Open { package } => {
            ensure_device(&adb)?;
            adb.open_app(&package)?;
            println!("{}", format!("✓ Opened {}", package).green().bold());
        }

        Commands::ForceStop { package } => {
            ensure_device(&adb)?;
            adb.force_stop_app(&package)?;
            println!("{}", format!("✓ Force stopped {}", package).green().bold());
        }

        Commands::Demo { output_dir } => {
            println!(
                "{}",
                "Demo mode: scoring sample data, no device needed".cyan().bold()
            );

            let full_report = demo::sample_report(&permissions, &sdk);
            scanner::display_scan_summary(&full_report);
            scanner::display_high_risk_apps(&full_report);

            let reporter = Reporter::new(&output_dir);
            let written = reporter.write_as(&full_report, OutputFormat::All, "demo_report")?;
            println!("\n{}", "Demo reports generated:".cyan().bold());
            for path in written {
                println!("  ✓ {}", path.display());
            }
        }
    }

    Ok(())
}

/// Fails fast with connection guidance when no device is reachable
fn ensure_device(adb: &AdbBridge) -> Result<()> {
    if adb.check_connection() {
        return Ok(());
    }
    bail!(
        "no Android device connected\n\n\
         Please ensure:\n\
         1. USB debugging is enabled on your device\n\
         2. The device is connected via USB\n\
         3. You have authorized this computer for debugging\n\
         4. ADB is installed and in your PATH"
    );
}

fn show_device(adb: &AdbBridge) {
    let info = adb.device_info();
    let get = |key: &str| info.get(key).map(String::as_str).unwrap_or("Unknown");

    info!("device: {} {}", get("manufacturer"), get("model"));
    println!("\n{}", "Connected Device".cyan().bold());
    println!("  {}: {} {}", "Device".bold(), get("manufacturer"), get("model"));
    println!(
        "  {}: {} (SDK {})",
        "Android".bold(),
        get("android_version"),
        get("sdk_version")
    );
    println!("  {}: {}", "Security Patch".bold(), get("security_patch"));
}
