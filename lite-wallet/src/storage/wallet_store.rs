use std::sync::Arc;

use crate::errors::WalletResult;
use crate::storage::KeyValueStorage;
use crate::types::{PersistedWallet, WalletRecord};

/// Storage key used when the configuration does not name one.
pub const DEFAULT_WALLETS_KEY: &str = "lite-wallet.wallets";

/// Persistence capability for the wallet list.
pub trait WalletPersistence: Send + Sync {
    /// Write the whole list. Only addresses and encrypted keys reach here.
    fn persist(&self, wallets: &[PersistedWallet]) -> WalletResult<()>;

    /// `None` when nothing was ever persisted.
    fn restore(&self) -> WalletResult<Option<Vec<WalletRecord>>>;
}

/// Wallet list stored as a JSON array under one fixed key.
pub struct LocalWalletStore<S: KeyValueStorage> {
    storage: Arc<S>,
    key: String,
}

impl<S: KeyValueStorage> LocalWalletStore<S> {
    pub fn new(storage: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }
}

impl<S: KeyValueStorage> WalletPersistence for LocalWalletStore<S> {
    fn persist(&self, wallets: &[PersistedWallet]) -> WalletResult<()> {
        let serialized = serde_json::to_string(wallets)?;
        self.storage.set_item(&self.key, &serialized)?;
        tracing::debug!(count = wallets.len(), key = %self.key, "persisted wallet list");
        Ok(())
    }

    fn restore(&self) -> WalletResult<Option<Vec<WalletRecord>>> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(None);
        };
        let persisted: Vec<PersistedWallet> = serde_json::from_str(&raw)?;
        tracing::debug!(count = persisted.len(), key = %self.key, "restored wallet list");
        Ok(Some(persisted.into_iter().map(WalletRecord::from).collect()))
    }
}
