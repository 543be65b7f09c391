//! Console prompt recognition.
//!
//! One compiled pattern per device command-line mode. The sequencer only
//! ever refers to these by name; no literal regex appears outside this
//! module. Prompts arrive as the last, unterminated line of a read, so
//! the end-of-line anchors also match at end of buffer.

use once_cell::sync::Lazy;
use regex::Regex;

/// A named response pattern denoting one device mode.
#[derive(Debug)]
pub struct PromptPattern {
    name: &'static str,
    regex: Regex,
}

impl PromptPattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        // The pattern table is fixed at compile time, so a bad regex is a
        // programming error caught by the pattern tests.
        PromptPattern {
            name,
            regex: Regex::new(pattern).unwrap(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_match(&self, output: &str) -> bool {
        self.regex.is_match(output)
    }
}

/// ROM monitor prompt, e.g. `rommon 1 >`.
pub static ROMMON: Lazy<PromptPattern> =
    Lazy::new(|| PromptPattern::new("ROMMON", r"(?im)rommon|rommon.*\d+>|rommon.*>"));

/// Catalyst bootloader prompt, `switch:`.
pub static BOOTLOADER: Lazy<PromptPattern> =
    Lazy::new(|| PromptPattern::new("bootloader", r"(?im)^switch:\s*$"));

/// User exec mode, `Router>`.
pub static EXEC_MODE: Lazy<PromptPattern> =
    Lazy::new(|| PromptPattern::new("exec mode", r"(?m)^[^\n\r]*>$"));

/// Privileged exec mode, `Router#`.
pub static PRIVILEGED_EXEC_MODE: Lazy<PromptPattern> =
    Lazy::new(|| PromptPattern::new("privileged exec mode", r"(?m)^[^\n\r]*#$"));

/// Global configuration mode, `Router(config)#`.
pub static GLOBAL_CONFIGURATION_MODE: Lazy<PromptPattern> = Lazy::new(|| {
    PromptPattern::new("global configuration mode", r"(?m)^[^\n\r]*\(config\)#$")
});

/// Line configuration mode, `Router(config-line)#`.
pub static LINE_CONFIGURATION_MODE: Lazy<PromptPattern> = Lazy::new(|| {
    PromptPattern::new(
        "line configuration mode",
        r"(?m)^[^\n\r]*\([^\n\r]*-line\)#$",
    )
});

/// Interface configuration mode, `Router(config-if)#`.
pub static INTERFACE_CONFIGURATION_MODE: Lazy<PromptPattern> = Lazy::new(|| {
    PromptPattern::new(
        "interface configuration mode",
        r"(?m)^[^\n\r]*\([^\n\r]*-if\)#$",
    )
});

/// Router configuration mode, `Router(config-router)#`.
pub static ROUTER_CONFIGURATION_MODE: Lazy<PromptPattern> = Lazy::new(|| {
    PromptPattern::new(
        "router configuration mode",
        r"(?m)^[^\n\r]*\([^\n\r]*-router\)#$",
    )
});

/// Sub-interface configuration mode, `Router(config-subif)#`.
pub static SUB_INTERFACE_CONFIGURATION_MODE: Lazy<PromptPattern> = Lazy::new(|| {
    PromptPattern::new(
        "sub-interface configuration mode",
        r"(?m)^[^\n\r]*\([^\n\r]*-subif\)#$",
    )
});

/// First boot question after the startup configuration is bypassed.
pub static INITIAL_SETUP_DIALOG: Lazy<PromptPattern> = Lazy::new(|| {
    PromptPattern::new(
        "initial setup dialog",
        r"(?im)^Would you like to enter the initial configuration dialog\?",
    )
});

/// `Destination filename [startup-config]?` from the copy commands.
pub static DESTINATION_FILENAME: Lazy<PromptPattern> = Lazy::new(|| {
    PromptPattern::new(
        "destination filename prompt",
        r"(?im)Destination\s+filename\s*\[[^\]]*\]\s*\?",
    )
});

/// `Proceed with reload? [confirm]`.
pub static PROCEED_WITH_RELOAD: Lazy<PromptPattern> = Lazy::new(|| {
    PromptPattern::new("proceed with reload prompt", r"(?im)Proceed\s+with\s+reload\??")
});

/// Classify a piece of console output by the first pattern it matches.
///
/// Ordered most specific first: the privileged-exec pattern would also
/// match any configuration-mode prompt, and the exec pattern any ROMMON
/// prompt, so those come last.
pub fn identify_mode(output: &str) -> Option<&'static str> {
    let ordered: [&Lazy<PromptPattern>; 12] = [
        &INITIAL_SETUP_DIALOG,
        &DESTINATION_FILENAME,
        &PROCEED_WITH_RELOAD,
        &ROMMON,
        &BOOTLOADER,
        &LINE_CONFIGURATION_MODE,
        &INTERFACE_CONFIGURATION_MODE,
        &ROUTER_CONFIGURATION_MODE,
        &SUB_INTERFACE_CONFIGURATION_MODE,
        &GLOBAL_CONFIGURATION_MODE,
        &PRIVILEGED_EXEC_MODE,
        &EXEC_MODE,
    ];
    ordered
        .iter()
        .find(|p| p.is_match(output))
        .map(|p| p.name())
}
