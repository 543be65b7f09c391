use clap::Parser;

/// Cisco serial-console password recovery tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run ("reset", "ports", "devices")
    pub command: Option<String>,

    /// Serial port to use (e.g. /dev/ttyUSB0 or COM3)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate of the console line
    #[arg(short, long, default_value_t = 9600)]
    pub baud: u32,

    /// Device model, as listed by the "devices" command
    #[arg(short, long)]
    pub model: Option<String>,

    /// Remove the enable password and enable secret
    #[arg(long)]
    pub remove_enable: bool,

    /// Remove the line console password
    #[arg(long)]
    pub remove_line: bool,

    /// New privileged exec password to set after removal
    #[arg(long, requires = "remove_enable")]
    pub new_enable: Option<String>,

    /// New line console password to set after removal
    #[arg(long, requires = "remove_line")]
    pub new_line: Option<String>,

    /// Store the new privileged password as an enable secret (hashed)
    #[arg(long, requires = "new_enable")]
    pub encrypt: bool,
}
