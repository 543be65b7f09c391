use crate::error::OptionsError;

/// What the reset run should do to the device's passwords.
///
/// Validated when constructed and immutable afterwards, so no command is
/// ever built from an unchecked password string.
#[derive(Debug, Clone)]
pub struct ResetOptions {
    remove_privileged_password: bool,
    remove_line_password: bool,
    encrypt_privileged_password: bool,
    new_privileged_password: Option<String>,
    new_line_password: Option<String>,
}

impl ResetOptions {
    /// Build a validated option set. A requested replacement password
    /// (`Some`) must be non-empty.
    pub fn new(
        remove_privileged_password: bool,
        remove_line_password: bool,
        encrypt_privileged_password: bool,
        new_privileged_password: Option<String>,
        new_line_password: Option<String>,
    ) -> Result<Self, OptionsError> {
        if matches!(new_privileged_password.as_deref(), Some("")) {
            return Err(OptionsError::EmptyPrivilegedPassword);
        }
        if matches!(new_line_password.as_deref(), Some("")) {
            return Err(OptionsError::EmptyLinePassword);
        }
        Ok(ResetOptions {
            remove_privileged_password,
            remove_line_password,
            encrypt_privileged_password,
            new_privileged_password,
            new_line_password,
        })
    }

    pub fn remove_privileged_password(&self) -> bool {
        self.remove_privileged_password
    }

    pub fn remove_line_password(&self) -> bool {
        self.remove_line_password
    }

    pub fn encrypt_privileged_password(&self) -> bool {
        self.encrypt_privileged_password
    }

    pub fn new_privileged_password(&self) -> Option<&str> {
        self.new_privileged_password.as_deref()
    }

    pub fn new_line_password(&self) -> Option<&str> {
        self.new_line_password.as_deref()
    }
}
