//! Wallet collection manager.
//!
//! Holds the ordered wallet list and the per-address reveal errors. Every
//! change replaces a whole record; records are never edited in place.

use std::collections::HashMap;
use std::sync::Arc;

use secrecy::SecretString;

use crate::errors::WalletResult;
use crate::provider::CryptoProvider;
use crate::storage::WalletPersistence;
use crate::types::{Balance, PersistedWallet, WalletRecord};

/// Error shown when a reveal attempt fails for any reason.
pub const WRONG_PASSWORD_ERROR_MESSAGE: &str = "wrong password";

/// Result of a reveal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Revealed,
    WrongPassword,
    /// No record at the index, or the record has nothing to decrypt.
    Skipped,
}

pub struct WalletCollection {
    wallets: Vec<WalletRecord>,
    errors: HashMap<String, String>,
    initialized: bool,
    crypto: Arc<dyn CryptoProvider>,
    store: Arc<dyn WalletPersistence>,
}

impl WalletCollection {
    pub fn new(crypto: Arc<dyn CryptoProvider>, store: Arc<dyn WalletPersistence>) -> Self {
        Self {
            wallets: Vec::new(),
            errors: HashMap::new(),
            initialized: false,
            crypto,
            store,
        }
    }

    /// Load persisted wallets. Only the first call does anything.
    pub fn initialize(&mut self) -> WalletResult<()> {
        if self.initialized {
            return Ok(());
        }
        let restored = self.store.restore()?;
        self.initialized = true;
        if let Some(wallets) = restored {
            tracing::info!(count = wallets.len(), "restored persisted wallets");
            self.wallets = wallets;
        }
        Ok(())
    }

    pub fn reveal_private_key(&mut self, index: usize, password: &SecretString) -> RevealOutcome {
        let Some(record) = self.wallets.get(index) else {
            return RevealOutcome::Skipped;
        };
        let Some(encrypted) = record.encrypted.as_ref() else {
            return RevealOutcome::Skipped;
        };

        match self.crypto.decrypt(password, encrypted) {
            Ok(private_key) => {
                let revealed = record.with_private_key(private_key);
                self.errors.remove(&revealed.address);
                tracing::debug!(address = %revealed.address, "private key revealed");
                self.wallets[index] = revealed;
                RevealOutcome::Revealed
            }
            Err(err) => {
                tracing::warn!(address = %record.address, error = %err, "private key decryption failed");
                self.errors.insert(
                    record.address.clone(),
                    WRONG_PASSWORD_ERROR_MESSAGE.to_string(),
                );
                RevealOutcome::WrongPassword
            }
        }
    }

    pub fn hide_private_key(&mut self, index: usize) {
        let Some(record) = self.wallets.get(index) else {
            return;
        };
        let hidden = record.without_private_key();
        self.errors.remove(&hidden.address);
        self.wallets[index] = hidden;
    }

    /// Fetch the balance of the wallet at `index` and store it on the record.
    ///
    /// Returns `Ok(None)` when there is no wallet at `index`. A failed fetch
    /// leaves the record untouched.
    pub async fn request_balance(&mut self, index: usize) -> WalletResult<Option<Balance>> {
        let Some(address) = self.wallets.get(index).map(|w| w.address.clone()) else {
            return Ok(None);
        };

        let balance = self.crypto.get_balance(&address).await.map_err(|err| {
            tracing::warn!(%address, error = %err, "balance request failed");
            err
        })?;

        // The list is append-only, so the index still names the same wallet.
        let updated = self.wallets[index].with_balance(balance);
        self.wallets[index] = updated;
        tracing::debug!(%address, %balance, "balance updated");
        Ok(Some(balance))
    }

    /// Append a committed wallet and persist the whole list.
    pub fn add_wallet(&mut self, record: WalletRecord) -> WalletResult<()> {
        tracing::info!(address = %record.address, "adding wallet");
        self.wallets.push(record);
        let projection: Vec<PersistedWallet> =
            self.wallets.iter().map(WalletRecord::to_persisted).collect();
        self.store.persist(&projection)
    }

    pub fn wallets(&self) -> &[WalletRecord] {
        &self.wallets
    }

    pub fn get(&self, index: usize) -> Option<&WalletRecord> {
        self.wallets.get(index)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn errors(&self) -> &HashMap<String, String> {
        &self.errors
    }

    pub fn error_for(&self, address: &str) -> Option<&str> {
        self.errors.get(address).map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use secrecy::{ExposeSecret, SecretString};
    use serde_json::json;

    use crate::errors::{WalletError, WalletResult};
    use crate::provider::CryptoProvider;
    use crate::storage::WalletPersistence;
    use crate::types::{
        Balance, DraftWallet, EncryptedBlob, PersistedWallet, PrivateKey, WalletRecord,
    };

    pub const RIGHT_PASSWORD: &str = "12345";
    pub const DECRYPTED_KEY: &str = "0xdecrypted";

    /// Deterministic provider: any blob opens with [`RIGHT_PASSWORD`].
    #[derive(Default)]
    pub struct MockCrypto {
        pub generated: Mutex<Vec<DraftWallet>>,
        pub encrypt_calls: Mutex<Vec<(String, String)>>,
        pub fail_encrypt: Mutex<bool>,
        pub balance: Mutex<Option<Balance>>,
    }

    #[async_trait]
    impl CryptoProvider for MockCrypto {
        fn generate_key_pair(&self) -> WalletResult<DraftWallet> {
            let mut generated = self.generated.lock();
            let n = generated.len() + 1;
            let draft = DraftWallet {
                address: format!("address-{n}"),
                private_key: PrivateKey::new(format!("private-key-{n}")),
            };
            generated.push(draft.clone());
            Ok(draft)
        }

        fn encrypt(
            &self,
            password: &SecretString,
            private_key: &PrivateKey,
        ) -> WalletResult<EncryptedBlob> {
            if *self.fail_encrypt.lock() {
                return Err(WalletError::CryptoError("encryption unavailable".into()));
            }
            self.encrypt_calls.lock().push((
                password.expose_secret().to_string(),
                private_key.expose().to_string(),
            ));
            Ok(EncryptedBlob::from(json!({ "thisIsEncrypted": true })))
        }

        fn decrypt(
            &self,
            password: &SecretString,
            _encrypted: &EncryptedBlob,
        ) -> WalletResult<PrivateKey> {
            if password.expose_secret() == RIGHT_PASSWORD {
                Ok(PrivateKey::new(DECRYPTED_KEY))
            } else {
                Err(WalletError::InvalidPassword)
            }
        }

        async fn get_balance(&self, _address: &str) -> WalletResult<Balance> {
            (*self.balance.lock())
                .ok_or_else(|| WalletError::NetworkError("node unreachable".into()))
        }
    }

    /// Records every persisted snapshot.
    #[derive(Default)]
    pub struct MockStore {
        pub restored: Mutex<Option<Vec<WalletRecord>>>,
        pub persisted: Mutex<Vec<Vec<PersistedWallet>>>,
    }

    impl WalletPersistence for MockStore {
        fn persist(&self, wallets: &[PersistedWallet]) -> WalletResult<()> {
            self.persisted.lock().push(wallets.to_vec());
            Ok(())
        }

        fn restore(&self) -> WalletResult<Option<Vec<WalletRecord>>> {
            Ok(self.restored.lock().clone())
        }
    }

    pub fn persisted_wallets() -> Vec<WalletRecord> {
        (1..=3)
            .map(|i| {
                WalletRecord::encrypted(
                    format!("address-{i}"),
                    EncryptedBlob::from(json!(format!("encrypted-key-{i}"))),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::types::{EncryptedBlob, PrivateKey};
    use serde_json::json;

    fn secret(password: &str) -> SecretString {
        SecretString::from(password.to_string())
    }

    fn collection_with(
        restored: Option<Vec<WalletRecord>>,
    ) -> (WalletCollection, Arc<MockCrypto>, Arc<MockStore>) {
        let crypto = Arc::new(MockCrypto::default());
        let store = Arc::new(MockStore::default());
        *store.restored.lock() = restored;
        let mut collection = WalletCollection::new(crypto.clone(), store.clone());
        collection.initialize().unwrap();
        (collection, crypto, store)
    }

    #[test]
    fn initialize_restores_persisted_wallets() {
        let (collection, _, _) = collection_with(Some(persisted_wallets()));
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.wallets(), persisted_wallets().as_slice());
    }

    #[test]
    fn initialize_without_persisted_data_is_empty() {
        let (collection, _, _) = collection_with(None);
        assert!(collection.is_empty());
    }

    #[test]
    fn initialize_runs_once() {
        let (mut collection, _, store) = collection_with(Some(persisted_wallets()));
        *store.restored.lock() = Some(Vec::new());
        collection.initialize().unwrap();
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn reveal_with_correct_password() {
        let (mut collection, _, _) = collection_with(Some(persisted_wallets()));

        let outcome = collection.reveal_private_key(0, &secret(RIGHT_PASSWORD));

        assert_eq!(outcome, RevealOutcome::Revealed);
        assert_eq!(
            collection.get(0).unwrap().private_key,
            Some(PrivateKey::new(DECRYPTED_KEY))
        );
        assert_eq!(collection.wallets()[1..], persisted_wallets()[1..]);
        assert_eq!(collection.error_for("address-1"), None);
    }

    #[test]
    fn reveal_with_wrong_password_sets_error() {
        let (mut collection, _, _) = collection_with(Some(persisted_wallets()));

        let outcome = collection.reveal_private_key(0, &secret("54321"));

        assert_eq!(outcome, RevealOutcome::WrongPassword);
        assert_eq!(collection.get(0), persisted_wallets().first());
        assert_eq!(collection.error_for("address-1"), Some("wrong password"));
        assert_eq!(collection.errors().len(), 1);
    }

    #[test]
    fn successful_reveal_clears_previous_error() {
        let (mut collection, _, _) = collection_with(Some(persisted_wallets()));
        collection.reveal_private_key(0, &secret("nope"));
        collection.reveal_private_key(0, &secret(RIGHT_PASSWORD));
        assert!(collection.errors().is_empty());
    }

    #[test]
    fn reveal_skips_missing_index_and_unencrypted_records() {
        let (mut collection, _, _) = collection_with(None);
        assert_eq!(
            collection.reveal_private_key(0, &secret(RIGHT_PASSWORD)),
            RevealOutcome::Skipped
        );

        let bare = WalletRecord {
            address: "bare".into(),
            balance: None,
            private_key: None,
            encrypted: None,
        };
        collection.add_wallet(bare).unwrap();
        assert_eq!(
            collection.reveal_private_key(0, &secret(RIGHT_PASSWORD)),
            RevealOutcome::Skipped
        );
        assert!(collection.errors().is_empty());
    }

    #[test]
    fn hide_removes_key_and_error() {
        let (mut collection, _, _) = collection_with(Some(persisted_wallets()));

        collection.reveal_private_key(0, &secret(RIGHT_PASSWORD));
        collection.hide_private_key(0);
        assert!(collection.get(0).unwrap().private_key.is_none());

        collection.reveal_private_key(1, &secret("wrong"));
        collection.hide_private_key(1);
        assert_eq!(collection.error_for("address-2"), None);

        // Hiding an already hidden wallet is harmless.
        collection.hide_private_key(2);
        assert_eq!(collection.get(2), persisted_wallets().get(2));
        collection.hide_private_key(42);
    }

    #[tokio::test]
    async fn balance_updates_only_target_record() {
        let (mut collection, crypto, _) = collection_with(Some(persisted_wallets()));
        *crypto.balance.lock() = Some(Balance(1_234_556));

        let balance = collection.request_balance(0).await.unwrap();

        assert_eq!(balance, Some(Balance(1_234_556)));
        assert_eq!(collection.get(0).unwrap().balance, Some(Balance(1_234_556)));
        assert_eq!(collection.get(1).unwrap().balance, None);
    }

    #[tokio::test]
    async fn failed_balance_leaves_record_unchanged() {
        let (mut collection, _, _) = collection_with(Some(persisted_wallets()));

        let err = collection.request_balance(0).await.unwrap_err();

        assert!(matches!(err, crate::errors::WalletError::NetworkError(_)));
        assert_eq!(collection.get(0), persisted_wallets().first());
    }

    #[tokio::test]
    async fn balance_for_missing_index_is_none() {
        let (mut collection, _, _) = collection_with(None);
        assert_eq!(collection.request_balance(3).await.unwrap(), None);
    }

    #[test]
    fn add_wallet_appends_and_persists_full_list() {
        let (mut collection, _, store) = collection_with(Some(persisted_wallets()));
        let record = WalletRecord::encrypted("address-new", EncryptedBlob::from(json!({"e": 1})));

        collection.add_wallet(record.clone()).unwrap();

        assert_eq!(collection.len(), 4);
        let persisted = store.persisted.lock();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].len(), 4);
        assert_eq!(persisted[0][3], record.to_persisted());
        let restored: Vec<PersistedWallet> = persisted_wallets()
            .iter()
            .map(WalletRecord::to_persisted)
            .collect();
        assert_eq!(persisted[0][..3], restored[..]);
    }

    #[test]
    fn revealed_key_never_reaches_persistence() {
        let (mut collection, _, store) = collection_with(Some(persisted_wallets()));
        assert_eq!(
            collection.reveal_private_key(0, &secret(RIGHT_PASSWORD)),
            RevealOutcome::Revealed
        );
        let with_balance = collection.wallets[1].with_balance(Balance(99));
        collection.wallets[1] = with_balance;

        let record = WalletRecord::encrypted("address-new", EncryptedBlob::from(json!({"e": 1})));
        collection.add_wallet(record).unwrap();

        let persisted = store.persisted.lock();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0][0], persisted_wallets()[0].to_persisted());
        let raw = serde_json::to_string(&persisted[0]).unwrap();
        assert!(!raw.contains(DECRYPTED_KEY));
        assert!(!raw.contains("balance"));
        assert!(collection.get(0).unwrap().is_revealed());
    }
}
