use std::io::{self, Write};

use anyhow::Result;
use colored::*;

use crate::commands;
use crate::devices;
use crate::options::ResetOptions;
use crate::patterns;
use crate::transport::{SerialLinkConfig, SerialTransport};

const MAX_INPUT_LENGTH: usize = 1024;

pub async fn interactive_shell() -> Result<()> {
    println!("Welcome to the ciscoreset shell.");
    println!("Type 'help' for a list of commands. Type 'exit' or 'quit' to leave.");

    loop {
        print!("{}", "csr> ".cyan().bold());
        io::stdout().flush()?;

        let mut raw_input = String::new();
        io::stdin().read_line(&mut raw_input)?;

        if raw_input.len() > MAX_INPUT_LENGTH {
            println!(
                "{}",
                format!(
                    "[!] Input length exceeds {} characters and was ignored.",
                    MAX_INPUT_LENGTH
                )
                .yellow()
            );
            continue;
        }

        match raw_input.trim() {
            "" => continue,
            "exit" | "quit" => {
                println!("Exiting...");
                break;
            }
            "help" | "?" => print_help(),
            "ports" => {
                if let Err(e) = commands::ports::list_ports() {
                    println!("{}", format!("[-] {}", e).red());
                }
            }
            "devices" => commands::list_devices(),
            "probe" => {
                if let Err(e) = probe().await {
                    println!("{}", format!("[-] {}", e).red());
                }
            }
            "reset" => {
                if let Err(e) = reset_wizard().await {
                    println!("{}", format!("[-] {}", e).red());
                }
            }
            other => {
                println!(
                    "{}",
                    format!("Unknown command '{}'. Type 'help' for a list.", other).yellow()
                );
            }
        }
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  ports    List serial ports on this machine");
    println!("  devices  List supported device models");
    println!("  probe    Show which prompt a connected device is sitting at");
    println!("  reset    Run the password reset wizard");
    println!("  exit     Leave the shell");
}

/// Ask which prompt the connected device currently shows, without
/// changing anything on it.
async fn probe() -> Result<()> {
    let link = ask_link()?;

    let output = tokio::task::spawn_blocking(move || {
        let mut transport = SerialTransport::open(&link)?;
        let output = transport.probe_mode();
        transport.close();
        output
    })
    .await??;

    if output.trim().is_empty() {
        println!("{}", "[-] No response from the device.".yellow());
    } else {
        println!("{}", "[*] Device output:".cyan());
        println!("{}", output.trim_end());
        match patterns::identify_mode(&output) {
            Some(mode) => {
                println!("{}", format!("[+] Device is at the {} prompt.", mode).green())
            }
            None => println!("{}", "[-] Prompt not recognized.".yellow()),
        }
    }
    Ok(())
}

/// Collect a full reset request interactively, confirm, and run it.
async fn reset_wizard() -> Result<()> {
    let link = ask_link()?;

    commands::list_devices();
    let model = prompt("Device model: ");
    let device = *devices::find_device(&model)
        .ok_or_else(|| anyhow::anyhow!("Unknown device model '{}'", model))?;

    let remove_enable = ask_yes_no("Remove the privileged exec (enable) password?");
    let new_enable = if remove_enable && ask_yes_no("Set a new privileged exec password?") {
        Some(prompt("New privileged exec password: "))
    } else {
        None
    };
    let encrypt = new_enable.is_some() && ask_yes_no("Store it as an enable secret (hashed)?");

    let remove_line = ask_yes_no("Remove the line console password?");
    let new_line = if remove_line && ask_yes_no("Set a new line console password?") {
        Some(prompt("New line console password: "))
    } else {
        None
    };

    if !remove_enable && !remove_line {
        println!("{}", "Nothing to do.".yellow());
        return Ok(());
    }

    let options = ResetOptions::new(remove_enable, remove_line, encrypt, new_enable, new_line)?;

    println!(
        "{}",
        "[!] This will reboot the device twice and overwrite its startup configuration.".yellow()
    );
    if !ask_yes_no("Proceed?") {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    commands::reset::run_reset(commands::reset::ResetRequest {
        link,
        device,
        options,
    })
    .await
}

fn ask_link() -> Result<SerialLinkConfig> {
    // Show what is plugged in before asking.
    let _ = commands::ports::list_ports();

    let port = prompt("Serial port: ");
    if port.is_empty() {
        return Err(anyhow::anyhow!("A serial port is required"));
    }
    let baud_rate = prompt("Baud rate (default 9600): ").parse().unwrap_or(9600);
    Ok(SerialLinkConfig { port, baud_rate })
}

fn ask_yes_no(question: &str) -> bool {
    prompt(&format!("{} (y/n): ", question)).eq_ignore_ascii_case("y")
}

fn prompt(msg: &str) -> String {
    print!("{}", msg);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    let _ = io::stdin().read_line(&mut buf);
    buf.trim().to_string()
}
