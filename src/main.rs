use anyhow::Result;
use clap::Parser;

mod catalog;
mod cli;
mod commands;
mod devices;
mod error;
mod options;
mod patterns;
mod sequencer;
mod shell;
mod transport;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli_args = cli::Cli::parse();

    // If the user provided a subcommand from the CLI, handle it directly;
    // otherwise launch the interactive shell.
    if let Some(cmd) = &cli_args.command {
        commands::handle_command(cmd, &cli_args).await?;
    } else {
        shell::interactive_shell().await?;
    }

    Ok(())
}
