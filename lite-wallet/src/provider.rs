//! Crypto provider seam.
//!
//! The managers never touch key material or the network directly; they go
//! through [`CryptoProvider`]. [`NodeCryptoProvider`] is the production
//! implementation backed by [`crate::crypto`] and a JSON-RPC node.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::blockchain_client::BlockchainClient;
use crate::crypto::{self, KdfSettings};
use crate::errors::WalletResult;
use crate::types::{Balance, DraftWallet, EncryptedBlob, PrivateKey};

#[async_trait]
pub trait CryptoProvider: Send + Sync {
    /// Produce a new random key pair.
    fn generate_key_pair(&self) -> WalletResult<DraftWallet>;

    /// Seal a private key so that only `password` opens it again.
    fn encrypt(&self, password: &SecretString, private_key: &PrivateKey)
        -> WalletResult<EncryptedBlob>;

    /// Open a blob produced by [`CryptoProvider::encrypt`]. Must fail on a
    /// wrong password.
    fn decrypt(&self, password: &SecretString, encrypted: &EncryptedBlob)
        -> WalletResult<PrivateKey>;

    async fn get_balance(&self, address: &str) -> WalletResult<Balance>;
}

pub struct NodeCryptoProvider {
    client: BlockchainClient,
    kdf: KdfSettings,
}

impl NodeCryptoProvider {
    pub fn new(client: BlockchainClient, kdf: KdfSettings) -> Self {
        Self { client, kdf }
    }
}

#[async_trait]
impl CryptoProvider for NodeCryptoProvider {
    fn generate_key_pair(&self) -> WalletResult<DraftWallet> {
        Ok(crypto::generate_key_pair())
    }

    fn encrypt(
        &self,
        password: &SecretString,
        private_key: &PrivateKey,
    ) -> WalletResult<EncryptedBlob> {
        crypto::encrypt_private_key(password, private_key, &self.kdf)
    }

    fn decrypt(
        &self,
        password: &SecretString,
        encrypted: &EncryptedBlob,
    ) -> WalletResult<PrivateKey> {
        crypto::decrypt_private_key(password, encrypted)
    }

    async fn get_balance(&self, address: &str) -> WalletResult<Balance> {
        self.client.get_balance(address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WalletError;
    use std::time::Duration;

    fn provider() -> NodeCryptoProvider {
        let client = BlockchainClient::new("http://127.0.0.1:1", Duration::from_millis(200))
            .unwrap();
        NodeCryptoProvider::new(
            client,
            KdfSettings {
                m_cost_kib: 1024,
                t_cost: 1,
                p_cost: 1,
            },
        )
    }

    #[test]
    fn round_trips_generated_key() {
        let provider = provider();
        let draft = provider.generate_key_pair().unwrap();
        let password = SecretString::from("correct horse".to_string());

        let blob = provider.encrypt(&password, &draft.private_key).unwrap();
        let opened = provider.decrypt(&password, &blob).unwrap();
        assert_eq!(opened, draft.private_key);

        let wrong = SecretString::from("battery staple".to_string());
        assert_eq!(
            provider.decrypt(&wrong, &blob).unwrap_err(),
            WalletError::InvalidPassword
        );
    }

    #[tokio::test]
    async fn unreachable_node_is_a_network_error() {
        let provider = provider();
        let err = provider
            .get_balance("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf")
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::NetworkError(_)));
    }
}
