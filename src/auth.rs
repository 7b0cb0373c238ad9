use crate::dialog::{Dialog, DialogResult, Outcome, Prompt};
use crate::error::{CafeError, Result};

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub const MSG_PASSWORD_EMPTY: &str = "Please enter the password";
pub const MSG_PASSWORD_WRONG: &str = "Incorrect password";

/// Shared-secret check in front of the admin and trash screens. A speed bump,
/// not access control.
#[derive(Debug, Clone)]
pub struct AdminGate {
    secret: String,
}

impl AdminGate {
    pub fn new(secret: impl Into<String>) -> Self {
        AdminGate {
            secret: secret.into(),
        }
    }

    /// The validation message for `input`, if it is not the secret.
    pub fn check(&self, input: &str) -> std::result::Result<(), String> {
        if input.is_empty() {
            Err(MSG_PASSWORD_EMPTY.to_string())
        } else if input != self.secret {
            Err(MSG_PASSWORD_WRONG.to_string())
        } else {
            Ok(())
        }
    }

    pub fn verify(&self, input: &str) -> Result<()> {
        self.check(input).map_err(CafeError::Validation)
    }

    /// Asks for the password until it is right or the user gives up.
    pub fn prompt(&self, dialog: &mut dyn Dialog, title: &str) -> Outcome<()> {
        let prompt = Prompt::new(title, "Enter the admin password to continue");
        match dialog.input(&prompt, &|value: &str| self.check(value)) {
            DialogResult::Confirmed(_) => Outcome::Done(()),
            DialogResult::Cancelled => Outcome::Cancelled,
        }
    }
}

impl Default for AdminGate {
    fn default() -> Self {
        AdminGate::new(DEFAULT_ADMIN_PASSWORD)
    }
}
