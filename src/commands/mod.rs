pub mod ports;
pub mod reset;

use anyhow::Result;
use colored::*;

use crate::cli::Cli;
use crate::devices;

pub async fn handle_command(command: &str, cli_args: &Cli) -> Result<()> {
    match command {
        "reset" => {
            reset::run_reset_from_args(cli_args).await?;
        }
        "ports" => {
            ports::list_ports()?;
        }
        "devices" => {
            list_devices();
        }
        _ => {
            eprintln!("Unknown command '{}'", command);
        }
    }
    Ok(())
}

/// Print the supported device catalog.
pub fn list_devices() {
    println!("{}", "Supported devices:".bold());
    for device in devices::DEVICES {
        println!(
            "  {:<16} {:<8} {}",
            device.model,
            device.category.to_string().cyan(),
            match device.boot_environment {
                devices::BootEnvironment::Rommon => "ROMMON",
                devices::BootEnvironment::SwitchBootloader => "switch bootloader",
            }
            .dimmed()
        );
    }
}
