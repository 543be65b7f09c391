use anyhow::{anyhow, Context, Result};
use colored::*;

use crate::cli::Cli;
use crate::devices::{self, Device};
use crate::options::ResetOptions;
use crate::sequencer::ResetSequencer;
use crate::transport::{SerialLinkConfig, SerialTransport};

/// Everything one reset run needs, collected up front.
pub struct ResetRequest {
    pub link: SerialLinkConfig,
    pub device: Device,
    pub options: ResetOptions,
}

pub async fn run_reset_from_args(cli_args: &Cli) -> Result<()> {
    let port = cli_args
        .port
        .clone()
        .context("--port is required for the reset command")?;
    let model = cli_args
        .model
        .clone()
        .context("--model is required for the reset command (see the 'devices' command)")?;
    let device = *devices::find_device(&model)
        .ok_or_else(|| anyhow!("Unknown device model '{}' (see the 'devices' command)", model))?;

    if !cli_args.remove_enable && !cli_args.remove_line {
        return Err(anyhow!(
            "Nothing to do: pass --remove-enable and/or --remove-line"
        ));
    }

    let options = ResetOptions::new(
        cli_args.remove_enable,
        cli_args.remove_line,
        cli_args.encrypt,
        cli_args.new_enable.clone(),
        cli_args.new_line.clone(),
    )?;

    run_reset(ResetRequest {
        link: SerialLinkConfig {
            port,
            baud_rate: cli_args.baud,
        },
        device,
        options,
    })
    .await
}

/// Run the blocking recovery sequence off the async runtime. Spans two
/// device reboots, so this can take minutes.
pub async fn run_reset(request: ResetRequest) -> Result<()> {
    println!(
        "{}",
        format!(
            "[*] Starting password reset for {} on {} @ {} bps",
            request.device.model, request.link.port, request.link.baud_rate
        )
        .cyan()
    );
    println!(
        "{}",
        "[!] The device will be rebooted twice and its startup configuration rewritten.".yellow()
    );

    let ResetRequest {
        link,
        device,
        options,
    } = request;

    tokio::task::spawn_blocking(move || {
        let transport = SerialTransport::open(&link)?;
        ResetSequencer::new(transport).run(&device, &options)
    })
    .await
    .context("Password reset task panicked")??;

    println!("{}", "[+] Password reset completed.".green().bold());
    Ok(())
}
