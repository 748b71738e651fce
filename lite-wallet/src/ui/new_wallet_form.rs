use std::fmt::Write as _;

use zeroize::Zeroizing;

use crate::types::DraftWallet;

pub const PASSWORD_PLACEHOLDER: &str = "PK password";
pub const CREATE_BUTTON: &str = "Create";
pub const CANCEL_BUTTON: &str = "Cancel";
pub const GENERATE_NEW: &str = "Generate new wallet";
pub const FINISH_PROMPT: &str = "Enter password to finish creation:";

/// Password field of the creation form.
#[derive(Default)]
pub struct NewWalletForm {
    password: Zeroizing<String>,
}

impl NewWalletForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_password(&mut self, value: &str) {
        self.password = Zeroizing::new(value.to_string());
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn clear(&mut self) {
        self.password = Zeroizing::new(String::new());
    }

    /// Never renders the draft's private key.
    pub fn render(&self, draft: Option<&DraftWallet>) -> String {
        let mut out = String::new();
        match draft {
            Some(draft) => {
                let _ = writeln!(out, "New wallet Address: {}", draft.address);
                let _ = writeln!(out, "   {}", FINISH_PROMPT);
                let masked = "*".repeat(self.password.chars().count());
                let _ = writeln!(
                    out,
                    "   {}: {} [{}] [{}]",
                    PASSWORD_PLACEHOLDER, masked, CREATE_BUTTON, CANCEL_BUTTON
                );
            }
            None => {
                let _ = writeln!(out, "[{}]", GENERATE_NEW);
            }
        }
        out
    }
}
