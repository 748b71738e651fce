use std::fmt::{self, Write as _};

use zeroize::Zeroizing;

use crate::types::{Balance, WalletRecord};

pub const PASSWORD_PLACEHOLDER: &str = "PK password";
pub const HIDE: &str = "Hide";
pub const CANCEL: &str = "Cancel";
pub const SHOW: &str = "Show";
pub const SHOW_PRIVATE_KEY: &str = "Show private key";
pub const LOAD_BALANCE: &str = "Load";
pub const REFRESH_BALANCE: &str = "Refresh";
pub const BALANCE_ERROR: &str = "Failed to load balance";

pub fn format_balance(balance: Option<Balance>) -> String {
    match balance {
        Some(balance) => format!("Balance {}", balance),
        None => "Balance not loaded yet".to_string(),
    }
}

/// What the private-key area of a wallet shows.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyPanel<'a> {
    Hidden,
    PromptingPassword { error: Option<&'a str> },
    Revealed { private_key: &'a str },
}

#[derive(Default)]
enum PasswordPrompt {
    #[default]
    Closed,
    Open { password: Zeroizing<String> },
}

impl fmt::Debug for PasswordPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordPrompt::Closed => f.write_str("Closed"),
            PasswordPrompt::Open { .. } => f.write_str("Open(<redacted>)"),
        }
    }
}

/// Per-wallet UI state. Wallet data itself lives in the collection; this
/// only tracks what the user is doing with it.
#[derive(Debug, Default)]
pub struct WalletView {
    prompt: PasswordPrompt,
    balance_loading: bool,
    balance_error: Option<String>,
}

impl WalletView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_prompt(&mut self) {
        if matches!(self.prompt, PasswordPrompt::Closed) {
            self.prompt = PasswordPrompt::Open {
                password: Zeroizing::new(String::new()),
            };
        }
    }

    pub fn close_prompt(&mut self) {
        self.prompt = PasswordPrompt::Closed;
    }

    pub fn is_prompting(&self) -> bool {
        matches!(self.prompt, PasswordPrompt::Open { .. })
    }

    /// Replace the typed password. Ignored while the prompt is closed.
    pub fn type_password(&mut self, value: &str) {
        if let PasswordPrompt::Open { password } = &mut self.prompt {
            *password = Zeroizing::new(value.to_string());
        }
    }

    /// The typed password, if the prompt is open.
    pub fn password(&self) -> Option<&str> {
        match &self.prompt {
            PasswordPrompt::Open { password } => Some(password.as_str()),
            PasswordPrompt::Closed => None,
        }
    }

    /// Mark a balance request as started. Returns `false` when one is
    /// already in flight.
    pub fn start_balance_load(&mut self) -> bool {
        if self.balance_loading {
            return false;
        }
        self.balance_loading = true;
        self.balance_error = None;
        true
    }

    pub fn finish_balance_load(&mut self, error: Option<String>) {
        self.balance_loading = false;
        self.balance_error = error;
    }

    pub fn is_balance_loading(&self) -> bool {
        self.balance_loading
    }

    pub fn balance_error(&self) -> Option<&str> {
        self.balance_error.as_deref()
    }

    pub fn key_panel<'a>(&self, record: &'a WalletRecord, error: Option<&'a str>) -> KeyPanel<'a> {
        if let Some(private_key) = &record.private_key {
            return KeyPanel::Revealed {
                private_key: private_key.expose(),
            };
        }
        match self.prompt {
            PasswordPrompt::Open { .. } => KeyPanel::PromptingPassword { error },
            PasswordPrompt::Closed => KeyPanel::Hidden,
        }
    }

    pub fn render(&self, index: usize, record: &WalletRecord, error: Option<&str>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "#{} Address: {}", index, record.address);

        let balance_button = if record.balance.is_none() {
            LOAD_BALANCE
        } else {
            REFRESH_BALANCE
        };
        let _ = write!(out, "   {} [{}]", format_balance(record.balance), balance_button);
        if self.balance_loading {
            out.push_str(" ...");
        }
        out.push('\n');
        if let Some(balance_error) = &self.balance_error {
            let _ = writeln!(out, "   ! {}", balance_error);
        }

        match self.key_panel(record, error) {
            KeyPanel::Revealed { private_key } => {
                let _ = writeln!(out, "   {}", private_key);
                let _ = writeln!(out, "   [{}]", HIDE);
            }
            KeyPanel::PromptingPassword { error } => {
                let masked = "*".repeat(self.password().map_or(0, |p| p.chars().count()));
                let _ = writeln!(
                    out,
                    "   {}: {} [{}] [{}]",
                    PASSWORD_PLACEHOLDER, masked, SHOW, CANCEL
                );
                if let Some(error) = error {
                    let _ = writeln!(out, "   ! {}", error);
                }
            }
            KeyPanel::Hidden => {
                let _ = writeln!(out, "   [{}]", SHOW_PRIVATE_KEY);
            }
        }
        out
    }
}
