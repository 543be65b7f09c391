//! The password-reset state machine.
//!
//! Drives the transport through the full recovery script: force the
//! device past its startup configuration, reboot into a known state,
//! strip and/or set passwords across the nested configuration modes,
//! save, and reboot into the new configuration. Every step names the
//! prompt it must land in; the first unmet expectation aborts the run.
//! No command is ever retried, since a command issued in the wrong mode
//! can corrupt the device's configuration.

use std::time::Duration;

use log::{debug, info};

use crate::catalog::{bootloader, ios, rommon, with_password};
use crate::devices::{BootEnvironment, Device};
use crate::error::ResetError;
use crate::options::ResetOptions;
use crate::patterns;
use crate::patterns::PromptPattern;
use crate::transport::{ConsoleLink, SerialTransport};

/// Per-step read timeouts. Interactive prompt exchanges settle in a few
/// seconds; reboot and copy banners need longer.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub prompt: Duration,
    pub reboot: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            prompt: Duration::from_secs(5),
            reboot: Duration::from_secs(10),
        }
    }
}

pub struct ResetSequencer<L: ConsoleLink> {
    transport: SerialTransport<L>,
    timeouts: Timeouts,
}

impl<L: ConsoleLink> ResetSequencer<L> {
    pub fn new(transport: SerialTransport<L>) -> Self {
        ResetSequencer {
            transport,
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Run the full reset script. The transport is closed on both the
    /// success and the failure path; the run either completes in full or
    /// stops dead at the first mismatched step.
    pub fn run(mut self, device: &Device, options: &ResetOptions) -> Result<(), ResetError> {
        info!("starting password reset for {}", device.model);
        let result = self.execute(device, options);
        self.transport.close();
        match &result {
            Ok(()) => info!("password reset finished"),
            Err(e) => info!("password reset aborted: {}", e),
        }
        result
    }

    fn execute(&mut self, device: &Device, options: &ResetOptions) -> Result<(), ResetError> {
        self.bypass_startup_config(device)?;

        debug!("entering global configuration mode");
        self.step(
            Some(ios::ENTER_GLOBAL_CONFIGURATION),
            &patterns::GLOBAL_CONFIGURATION_MODE,
        )?;

        if options.remove_privileged_password() {
            self.reset_privileged_password(options)?;
        }
        if options.remove_line_password() {
            self.reset_line_password(options)?;
        }

        // Undo the boot-bypass register so the device boots normally from
        // now on. Only meaningful for ROMMON platforms.
        if device.boot_environment == BootEnvironment::Rommon {
            debug!("restoring configuration register");
            self.step(
                Some(ios::RESET_CONFIG_REGISTER),
                &patterns::GLOBAL_CONFIGURATION_MODE,
            )?;
        }

        self.save_and_reload()
    }

    /// Get the device booted with its saved startup configuration loaded
    /// into an unauthenticated privileged session.
    fn bypass_startup_config(&mut self, device: &Device) -> Result<(), ResetError> {
        match device.boot_environment {
            BootEnvironment::Rommon => {
                // The register change only suppresses auto-load; the saved
                // configuration file itself is untouched and gets pulled
                // into the running config below.
                self.transport
                    .interrupt_boot(&patterns::ROMMON, self.timeouts.prompt)?;
                self.step(Some(rommon::IGNORE_STARTUP_CONFIG), &patterns::ROMMON)?;
                debug!("configuration register set to bypass startup config, reloading");
                self.step_long(Some(rommon::RELOAD), &patterns::INITIAL_SETUP_DIALOG)?;
                self.step(Some(ios::NO), &patterns::EXEC_MODE)?;
                debug!("device rebooted without startup config");
                self.step(Some(ios::ENABLE), &patterns::PRIVILEGED_EXEC_MODE)?;
                debug!("copying startup config into running config");
                self.step(
                    Some(ios::COPY_STARTUP_TO_RUNNING),
                    &patterns::DESTINATION_FILENAME,
                )?;
                self.step_long(None, &patterns::PRIVILEGED_EXEC_MODE)?;
            }
            BootEnvironment::SwitchBootloader => {
                // The bootloader cannot skip the config by register, so the
                // file is renamed out of the way and renamed back after boot.
                self.step(None, &patterns::BOOTLOADER)?;
                self.step_long(Some(bootloader::INITIALIZE_FLASH), &patterns::BOOTLOADER)?;
                self.step(Some(bootloader::HIDE_STARTUP_CONFIG), &patterns::BOOTLOADER)?;
                debug!("startup config renamed, booting");
                self.step_long(Some(bootloader::BOOT), &patterns::INITIAL_SETUP_DIALOG)?;
                self.step(Some(ios::NO), &patterns::EXEC_MODE)?;
                debug!("device booted without startup config");
                self.step(Some(ios::ENABLE), &patterns::PRIVILEGED_EXEC_MODE)?;
                self.step(
                    Some(ios::RESTORE_STARTUP_CONFIG_NAME),
                    &patterns::DESTINATION_FILENAME,
                )?;
                self.step(None, &patterns::PRIVILEGED_EXEC_MODE)?;
                debug!("copying old startup config into running config");
                self.step(
                    Some(ios::COPY_CONFIG_FILE_TO_RUNNING),
                    &patterns::DESTINATION_FILENAME,
                )?;
                self.step_long(None, &patterns::PRIVILEGED_EXEC_MODE)?;
            }
        }
        Ok(())
    }

    fn reset_privileged_password(&mut self, options: &ResetOptions) -> Result<(), ResetError> {
        debug!("removing privileged exec mode password");
        self.step(
            Some(ios::REMOVE_ENABLE_PASSWORD),
            &patterns::GLOBAL_CONFIGURATION_MODE,
        )?;
        self.step(
            Some(ios::REMOVE_ENABLE_SECRET),
            &patterns::GLOBAL_CONFIGURATION_MODE,
        )?;
        info!("removed privileged exec mode password");

        if let Some(password) = options.new_privileged_password() {
            let template = if options.encrypt_privileged_password() {
                debug!("setting new enable secret");
                ios::SET_ENABLE_SECRET
            } else {
                debug!("setting new enable password");
                ios::SET_ENABLE_PASSWORD
            };
            let command = with_password(template, password);
            self.step(Some(&command), &patterns::GLOBAL_CONFIGURATION_MODE)?;
            info!("new privileged exec mode password set");
        }
        Ok(())
    }

    fn reset_line_password(&mut self, options: &ResetOptions) -> Result<(), ResetError> {
        debug!("removing line console password");
        self.step(
            Some(ios::ENTER_LINE_CONSOLE),
            &patterns::LINE_CONFIGURATION_MODE,
        )?;
        self.step(Some(ios::DISABLE_LOGIN), &patterns::LINE_CONFIGURATION_MODE)?;
        self.step(
            Some(ios::REMOVE_LINE_PASSWORD),
            &patterns::LINE_CONFIGURATION_MODE,
        )?;
        info!("removed line console password");

        if let Some(password) = options.new_line_password() {
            let command = with_password(ios::SET_LINE_PASSWORD, password);
            self.step(Some(&command), &patterns::LINE_CONFIGURATION_MODE)?;
            self.step(Some(ios::ENABLE_LOGIN), &patterns::LINE_CONFIGURATION_MODE)?;
            info!("new line console password set");
        }

        self.step(Some(ios::EXIT), &patterns::GLOBAL_CONFIGURATION_MODE)?;
        Ok(())
    }

    fn save_and_reload(&mut self) -> Result<(), ResetError> {
        info!("saving new configuration");
        self.drain(Some(ios::END))?;
        self.step(None, &patterns::PRIVILEGED_EXEC_MODE)?;
        debug!("copying running config to startup config");
        self.step(
            Some(ios::COPY_RUNNING_TO_STARTUP),
            &patterns::DESTINATION_FILENAME,
        )?;
        self.step(None, &patterns::PRIVILEGED_EXEC_MODE)?;
        info!("new configuration saved, reloading device");
        self.step(Some(ios::RELOAD), &patterns::PROCEED_WITH_RELOAD)?;
        self.drain(None)?;
        Ok(())
    }

    fn step(&mut self, command: Option<&str>, expected: &PromptPattern) -> Result<(), ResetError> {
        self.transport
            .send(command, Some(expected), self.timeouts.prompt)
    }

    /// A step that crosses a reboot or a long copy, using the reboot
    /// timeout.
    fn step_long(
        &mut self,
        command: Option<&str>,
        expected: &PromptPattern,
    ) -> Result<(), ResetError> {
        self.transport
            .send(command, Some(expected), self.timeouts.reboot)
    }

    /// A step whose output is drained but never validated.
    fn drain(&mut self, command: Option<&str>) -> Result<(), ResetError> {
        self.transport.send(command, None, self.timeouts.prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::find_device;
    use crate::transport::fake::{FakeLink, Op};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fast_timeouts() -> Timeouts {
        Timeouts {
            prompt: Duration::from_millis(80),
            reboot: Duration::from_millis(80),
        }
    }

    fn written_lines(state: &Rc<RefCell<crate::transport::fake::FakeState>>) -> Vec<String> {
        state
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn rommon_run_sends_the_exact_command_sequence() {
        let (link, state) = FakeLink::scripted(&[
            "rommon 1 >",                                          // break
            "rommon 2 >",                                          // confreg
            "Would you like to enter the initial configuration dialog? [yes/no]:", // reset
            "Router>",                                             // no
            "Router#",                                             // enable
            "Destination filename [running-config]?",              // copy start->run
            "Router#",                                             // enter
            "Router(config)#",                                     // configure terminal
            "Router(config)#",                                     // no enable password
            "Router(config)#",                                     // no enable secret
            "Router(config)#",                                     // enable password pass1
            "Router(config-line)#",                                // line console 0
            "Router(config-line)#",                                // no login
            "Router(config-line)#",                                // no password
            "Router(config-line)#",                                // password pass2
            "Router(config-line)#",                                // login
            "Router(config)#",                                     // exit
            "Router(config)#",                                     // config-register
            "Router#",                                             // end (drained)
            "Router#",                                             // enter
            "Destination filename [startup-config]?",              // copy run->start
            "Router#",                                             // enter
            "Proceed with reload? [confirm]",                      // reload
        ]);
        let transport = SerialTransport::from_link(link, "test");
        let device = find_device("ISR 4321").unwrap();
        let options = ResetOptions::new(
            true,
            true,
            false,
            Some("pass1".into()),
            Some("pass2".into()),
        )
        .unwrap();

        ResetSequencer::new(transport)
            .with_timeouts(fast_timeouts())
            .run(device, &options)
            .unwrap();

        let expected = vec![
            "confreg 0x2142\n",
            "reset\n",
            "no\n",
            "enable\n",
            "copy startup-config running-config\n",
            "\n",
            "configure terminal\n",
            "no enable password\n",
            "no enable secret\n",
            "enable password pass1\n",
            "line console 0\n",
            "no login\n",
            "no password\n",
            "password pass2\n",
            "login\n",
            "exit\n",
            "config-register 0x2102\n",
            "end\n",
            "\n",
            "copy running-config startup-config\n",
            "\n",
            "reload\n",
            "\n",
        ];
        assert_eq!(written_lines(&state), expected);
        assert!(state.borrow().breaks >= 1);
        assert!(state.borrow().closed);
    }

    #[test]
    fn switch_run_never_touches_the_configuration_register() {
        let (link, state) = FakeLink::scripted(&[
            "switch:",                                             // enter
            "Initializing Flash...\nswitch:",                      // flash_init
            "switch:",                                             // rename
            "Would you like to enter the initial configuration dialog? [yes/no]:", // boot
            "Switch>",                                             // no
            "Switch#",                                             // enable
            "Destination filename [config.text]?",                 // rename back
            "Switch#",                                             // enter
            "Destination filename [running-config]?",              // copy file->run
            "Switch#",                                             // enter
            "Switch(config)#",                                     // configure terminal
            "Switch(config)#",                                     // no enable password
            "Switch(config)#",                                     // no enable secret
            "Switch(config-line)#",                                // line console 0
            "Switch(config-line)#",                                // no login
            "Switch(config-line)#",                                // no password
            "Switch(config)#",                                     // exit
            "Switch#",                                             // end (drained)
            "Switch#",                                             // enter
            "Destination filename [startup-config]?",              // copy run->start
            "Switch#",                                             // enter
            "Proceed with reload? [confirm]",                      // reload
        ]);
        let transport = SerialTransport::from_link(link, "test");
        let device = find_device("Catalyst 2960").unwrap();
        let options = ResetOptions::new(true, true, false, None, None).unwrap();

        ResetSequencer::new(transport)
            .with_timeouts(fast_timeouts())
            .run(device, &options)
            .unwrap();

        let lines = written_lines(&state);
        assert!(lines.iter().any(|l| l == "flash_init\n"));
        assert!(lines
            .iter()
            .any(|l| l == "rename flash:config.text flash:config.text.old\n"));
        assert!(lines.iter().any(|l| l == "boot\n"));
        assert!(!lines.iter().any(|l| l.contains("confreg")));
        assert!(!lines.iter().any(|l| l.contains("config-register")));
        // No break signals either; the bootloader is entered with a plain
        // newline.
        assert_eq!(state.borrow().breaks, 0);
    }

    #[test]
    fn first_mismatched_prompt_halts_the_sequence() {
        let (link, state) = FakeLink::scripted(&[
            "rommon 1 >",
            "rommon 2 >",
            "rommon 3 >", // wrong: reset should produce the setup dialog
        ]);
        let transport = SerialTransport::from_link(link, "test");
        let device = find_device("ISR 4321").unwrap();
        let options = ResetOptions::new(true, false, false, None, None).unwrap();

        let err = ResetSequencer::new(transport)
            .with_timeouts(fast_timeouts())
            .run(device, &options)
            .unwrap_err();

        match err {
            ResetError::PromptMismatch { command, expected } => {
                assert_eq!(command.as_deref(), Some("reset"));
                assert_eq!(expected, "initial setup dialog");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let lines = written_lines(&state);
        assert_eq!(lines.last().map(String::as_str), Some("reset\n"));
        // The transport still gets closed on the failure path.
        assert!(state.borrow().closed);
    }

    #[test]
    fn removal_only_run_skips_password_setting_commands() {
        let (link, state) = FakeLink::scripted(&[
            "rommon 1 >",
            "rommon 2 >",
            "Would you like to enter the initial configuration dialog? [yes/no]:",
            "Router>",
            "Router#",
            "Destination filename [running-config]?",
            "Router#",
            "Router(config)#", // configure terminal
            "Router(config)#", // no enable password
            "Router(config)#", // no enable secret
            "Router(config)#", // config-register
            "Router#",         // end (drained)
            "Router#",
            "Destination filename [startup-config]?",
            "Router#",
            "Proceed with reload? [confirm]",
        ]);
        let transport = SerialTransport::from_link(link, "test");
        let device = find_device("ASR 1001-X").unwrap();
        let options = ResetOptions::new(true, false, false, None, None).unwrap();

        ResetSequencer::new(transport)
            .with_timeouts(fast_timeouts())
            .run(device, &options)
            .unwrap();

        let lines = written_lines(&state);
        assert!(!lines.iter().any(|l| l.starts_with("enable password")));
        assert!(!lines.iter().any(|l| l.starts_with("enable secret")));
        assert!(!lines.iter().any(|l| l == "line console 0\n"));
    }
}
