//! Command text sent to the device, kept apart from the sequencer so its
//! logic talks in names rather than literal IOS strings.

/// IOS commands valid once an operating system is booted.
pub mod ios {
    pub const ENABLE: &str = "enable";
    pub const EXIT: &str = "exit";
    pub const END: &str = "end";
    pub const NO: &str = "no";
    pub const RELOAD: &str = "reload";

    pub const ENTER_GLOBAL_CONFIGURATION: &str = "configure terminal";
    pub const ENTER_LINE_CONSOLE: &str = "line console 0";

    pub const REMOVE_ENABLE_PASSWORD: &str = "no enable password";
    pub const REMOVE_ENABLE_SECRET: &str = "no enable secret";
    pub const SET_ENABLE_PASSWORD: &str = "enable password {password}";
    pub const SET_ENABLE_SECRET: &str = "enable secret password {password}";

    pub const ENABLE_LOGIN: &str = "login";
    pub const DISABLE_LOGIN: &str = "no login";
    pub const REMOVE_LINE_PASSWORD: &str = "no password";
    pub const SET_LINE_PASSWORD: &str = "password {password}";

    pub const RESET_CONFIG_REGISTER: &str = "config-register 0x2102";

    pub const COPY_STARTUP_TO_RUNNING: &str = "copy startup-config running-config";
    pub const COPY_RUNNING_TO_STARTUP: &str = "copy running-config startup-config";

    pub const RESTORE_STARTUP_CONFIG_NAME: &str = "rename flash:config.text.old flash:config.text";
    pub const COPY_CONFIG_FILE_TO_RUNNING: &str = "copy flash:config.text system:running-config";
}

/// ROM monitor commands.
pub mod rommon {
    /// Configuration register value that skips the startup configuration
    /// on the next boot.
    pub const IGNORE_STARTUP_CONFIG: &str = "confreg 0x2142";
    pub const RELOAD: &str = "reset";
}

/// Catalyst switch bootloader commands.
pub mod bootloader {
    pub const INITIALIZE_FLASH: &str = "flash_init";
    pub const HIDE_STARTUP_CONFIG: &str = "rename flash:config.text flash:config.text.old";
    pub const BOOT: &str = "boot";
}

/// Substitute a password into a `{password}` command template.
pub fn with_password(template: &str, password: &str) -> String {
    template.replace("{password}", password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_template_round_trip() {
        assert_eq!(
            with_password(ios::SET_ENABLE_SECRET, "hunter2"),
            "enable secret password hunter2"
        );
        assert_eq!(
            with_password(ios::SET_LINE_PASSWORD, "console pass"),
            "password console pass"
        );
    }

    #[test]
    fn template_without_placeholder_is_untouched() {
        assert_eq!(with_password(ios::ENABLE, "hunter2"), "enable");
    }
}
