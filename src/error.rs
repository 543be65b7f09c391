use thiserror::Error;

/// Fatal errors aborting a password reset run.
///
/// Every variant stops the sequence immediately; there is no retry. A
/// `PromptMismatch` can leave the device mid-sequence in an intermediate
/// configuration mode that needs manual console recovery.
#[derive(Debug, Error)]
pub enum ResetError {
    /// The serial port could not be opened at all.
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// A read, write, buffer clear or break signal failed at the I/O level.
    #[error("serial I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial port error: {0}")]
    Port(#[from] serialport::Error),

    /// The device never produced the prompt a step required.
    #[error("expected {expected} prompt after {}", command_label(command))]
    PromptMismatch {
        command: Option<String>,
        expected: &'static str,
    },

    /// The break-signal loop exhausted its retry budget without the device
    /// emitting a single byte.
    #[error("boot interrupt produced no output after {attempts} break signals")]
    BootInterrupt { attempts: u32 },
}

fn command_label(command: &Option<String>) -> String {
    match command {
        Some(c) => format!("sending '{}'", c),
        None => "pressing enter".to_string(),
    }
}

/// Rejected `ResetOptions`, raised before any device I/O begins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("new privileged exec mode password cannot be empty")]
    EmptyPrivilegedPassword,
    #[error("new line console password cannot be empty")]
    EmptyLinePassword,
}
