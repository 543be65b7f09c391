//! Serial console transport.
//!
//! Owns one physical serial connection and implements the read loop the
//! whole tool depends on: write a command line, then accumulate output
//! until the expected prompt appears or the line goes quiet. The loop is
//! generic over [`ConsoleLink`] so the tests can drive it with an
//! in-memory fake instead of real hardware.

use std::io::{Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use serialport::{ClearBuffer, SerialPort};

use crate::error::ResetError;
use crate::patterns::PromptPattern;

const READ_CHUNK: u32 = 4096;
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const BREAK_PULSE: Duration = Duration::from_millis(100);
const BREAK_INTERVAL: Duration = Duration::from_millis(100);

/// Default cap on break signals during a boot interrupt. At one pulse per
/// ~200 ms this allows roughly a minute of boot time before giving up.
const DEFAULT_MAX_BREAK_ATTEMPTS: u32 = 300;

/// Serial line parameters supplied per run.
#[derive(Debug, Clone)]
pub struct SerialLinkConfig {
    pub port: String,
    pub baud_rate: u32,
}

/// The raw byte-level operations the transport needs from a serial line.
pub trait ConsoleLink {
    fn bytes_to_read(&mut self) -> Result<u32, ResetError>;
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, ResetError>;
    fn write_all(&mut self, data: &[u8]) -> Result<(), ResetError>;
    /// Discard anything queued on the line in either direction.
    fn clear_buffers(&mut self) -> Result<(), ResetError>;
    fn set_break(&mut self, enabled: bool) -> Result<(), ResetError>;
}

impl ConsoleLink for Box<dyn SerialPort> {
    fn bytes_to_read(&mut self) -> Result<u32, ResetError> {
        Ok((**self).bytes_to_read()?)
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, ResetError> {
        Ok(Read::read(self, buf)?)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), ResetError> {
        Write::write_all(self, data)?;
        Write::flush(self)?;
        Ok(())
    }

    fn clear_buffers(&mut self) -> Result<(), ResetError> {
        Ok(self.clear(ClearBuffer::All)?)
    }

    fn set_break(&mut self, enabled: bool) -> Result<(), ResetError> {
        if enabled {
            Ok((**self).set_break()?)
        } else {
            Ok((**self).clear_break()?)
        }
    }
}

/// One exclusively owned serial console connection.
pub struct SerialTransport<L: ConsoleLink> {
    link: L,
    port_name: String,
    max_break_attempts: u32,
}

impl SerialTransport<Box<dyn SerialPort>> {
    /// Open the physical port and drop any stale bytes queued on it.
    pub fn open(config: &SerialLinkConfig) -> Result<Self, ResetError> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(POLL_INTERVAL)
            .open()
            .map_err(|source| ResetError::Open {
                port: config.port.clone(),
                source,
            })?;
        let mut transport = SerialTransport::from_link(port, &config.port);
        transport.link.clear_buffers()?;
        info!("opened serial port {} @ {} bps", config.port, config.baud_rate);
        Ok(transport)
    }
}

impl<L: ConsoleLink> SerialTransport<L> {
    pub fn from_link(link: L, port_name: &str) -> Self {
        SerialTransport {
            link,
            port_name: port_name.to_string(),
            max_break_attempts: DEFAULT_MAX_BREAK_ATTEMPTS,
        }
    }

    #[cfg(test)]
    fn with_max_break_attempts(mut self, max: u32) -> Self {
        self.max_break_attempts = max;
        self
    }

    /// Write `command` (or just a newline when `None`) and wait for the
    /// expected prompt.
    ///
    /// With `expected` set, succeeds the instant the accumulated output
    /// matches and fails once no new bytes arrive for `timeout`. With
    /// `expected` absent, performs one quiescence-bounded read and always
    /// succeeds; used to drain boot and reload banners.
    pub fn send(
        &mut self,
        command: Option<&str>,
        expected: Option<&PromptPattern>,
        timeout: Duration,
    ) -> Result<(), ResetError> {
        self.link.clear_buffers()?;

        let mut line = command.unwrap_or("").to_string();
        line.push('\n');
        match command {
            Some(c) => debug!("sending '{}' to {}", c, self.port_name),
            None => debug!("pressing enter on {}", self.port_name),
        }
        self.link.write_all(line.as_bytes())?;

        match expected {
            Some(pattern) => {
                if self.read_until(pattern, timeout)? {
                    Ok(())
                } else {
                    Err(ResetError::PromptMismatch {
                        command: command.map(str::to_string),
                        expected: pattern.name(),
                    })
                }
            }
            None => {
                self.read_output(timeout)?;
                Ok(())
            }
        }
    }

    /// Interrupt the device's boot by pulsing the break signal until it
    /// produces output, then validate that output against `expected`
    /// without clearing it first (the banner the break induced is the
    /// thing we want to see).
    pub fn interrupt_boot(
        &mut self,
        expected: &PromptPattern,
        timeout: Duration,
    ) -> Result<(), ResetError> {
        info!("interrupting boot on {}", self.port_name);
        let mut attempts = 0;
        loop {
            self.link.set_break(true)?;
            thread::sleep(BREAK_PULSE);
            self.link.set_break(false)?;
            attempts += 1;

            if self.link.bytes_to_read()? > 0 {
                break;
            }
            if attempts >= self.max_break_attempts {
                return Err(ResetError::BootInterrupt { attempts });
            }
            thread::sleep(BREAK_INTERVAL);
        }
        debug!("device responded after {} break signals", attempts);

        if self.read_until(expected, timeout)? {
            Ok(())
        } else {
            Err(ResetError::PromptMismatch {
                command: None,
                expected: expected.name(),
            })
        }
    }

    /// Send a bare newline and capture roughly a second of output, enough
    /// to show which prompt the device is currently sitting at.
    pub fn probe_mode(&mut self) -> Result<String, ResetError> {
        self.link.write_all(b"\n")?;
        thread::sleep(POLL_INTERVAL);
        self.read_output(Duration::from_secs(1))
    }

    pub fn close(self) {
        info!("closed serial port {}", self.port_name);
    }

    /// Accumulate output until `expected` matches (true) or no new bytes
    /// arrive for `timeout` (false). Every received chunk resets the
    /// quiescence clock and is match-tested immediately.
    fn read_until(
        &mut self,
        expected: &PromptPattern,
        timeout: Duration,
    ) -> Result<bool, ResetError> {
        let mut raw: Vec<u8> = Vec::new();
        let mut last_data = Instant::now();

        loop {
            let waiting = self.link.bytes_to_read()?;
            if waiting > 0 {
                let mut buf = vec![0u8; waiting.min(READ_CHUNK) as usize];
                let n = self.link.read_chunk(&mut buf)?;
                raw.extend_from_slice(&buf[..n]);
                last_data = Instant::now();

                let output = String::from_utf8_lossy(&raw);
                if expected.is_match(&output) {
                    return Ok(true);
                }
            } else {
                if last_data.elapsed() >= timeout {
                    debug!("no data for {:?}, stopping read", timeout);
                    return Ok(false);
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
    }

    /// Read until the line has been quiet for `timeout` and return
    /// everything seen, decoded leniently.
    fn read_output(&mut self, timeout: Duration) -> Result<String, ResetError> {
        let mut raw: Vec<u8> = Vec::new();
        let mut last_data = Instant::now();

        loop {
            let waiting = self.link.bytes_to_read()?;
            if waiting > 0 {
                let mut buf = vec![0u8; waiting.min(READ_CHUNK) as usize];
                let n = self.link.read_chunk(&mut buf)?;
                raw.extend_from_slice(&buf[..n]);
                last_data = Instant::now();
            } else {
                if last_data.elapsed() >= timeout {
                    break;
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}
