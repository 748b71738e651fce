use std::sync::Arc;

use secrecy::SecretString;

use crate::errors::{WalletError, WalletResult};
use crate::provider::CryptoProvider;
use crate::types::{DraftWallet, WalletRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Idle,
    Drafting(DraftWallet),
}

/// Drives the "create wallet" flow: generate a draft, then either protect it
/// with a password and hand it over, or throw it away.
pub struct NewWalletFlow {
    state: FlowState,
    crypto: Arc<dyn CryptoProvider>,
}

impl NewWalletFlow {
    pub fn new(crypto: Arc<dyn CryptoProvider>) -> Self {
        Self {
            state: FlowState::Idle,
            crypto,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn draft(&self) -> Option<&DraftWallet> {
        match &self.state {
            FlowState::Idle => None,
            FlowState::Drafting(draft) => Some(draft),
        }
    }

    pub fn is_drafting(&self) -> bool {
        matches!(self.state, FlowState::Drafting(_))
    }

    /// Generate a draft key pair.
    pub fn begin(&mut self) -> WalletResult<&DraftWallet> {
        if self.is_drafting() {
            return Err(WalletError::InvalidState(
                "A new wallet is already being created".to_string(),
            ));
        }

        let draft = self.crypto.generate_key_pair()?;
        tracing::info!(address = %draft.address, "generated draft wallet");
        self.state = FlowState::Drafting(draft);
        self.draft()
            .ok_or_else(|| WalletError::InvalidState("Draft missing after generation".to_string()))
    }

    /// Drop the draft without encrypting or persisting anything.
    pub fn cancel(&mut self) {
        if let FlowState::Drafting(draft) = &self.state {
            tracing::debug!(address = %draft.address, "discarded draft wallet");
        }
        self.state = FlowState::Idle;
    }

    /// Encrypt the draft with `password` and pass the committed record to
    /// `on_created`.
    ///
    /// Returns `Ok(None)` when there is no draft. If encryption fails the
    /// draft is kept so the user can try again.
    pub fn save<F, T>(&mut self, password: &SecretString, on_created: F) -> WalletResult<Option<T>>
    where
        F: FnOnce(WalletRecord) -> WalletResult<T>,
    {
        let FlowState::Drafting(draft) = &self.state else {
            return Ok(None);
        };

        let encrypted = self.crypto.encrypt(password, &draft.private_key)?;
        let record = WalletRecord::encrypted(draft.address.clone(), encrypted);
        self.state = FlowState::Idle;

        on_created(record).map(Some)
    }
}
