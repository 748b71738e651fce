use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain_client::BlockchainClient;
use crate::config_store::{ConfigStore, WalletConfig};
use crate::errors::WalletResult;
use crate::new_wallet::NewWalletFlow;
use crate::provider::{CryptoProvider, NodeCryptoProvider};
use crate::storage::{FileStorage, LocalWalletStore, WalletPaths, WalletPersistence};
use crate::wallets::WalletCollection;

/// Environment variable selecting the configuration environment.
pub const ENVIRONMENT_ENV_VAR: &str = "LITE_WALLET_ENV";

/// Everything the wallet needs at startup: paths, configuration and the
/// injected providers.
pub struct WalletContext {
    paths: WalletPaths,
    config: WalletConfig,
    crypto: Arc<dyn CryptoProvider>,
    store: Arc<dyn WalletPersistence>,
}

impl WalletContext {
    /// Build the context rooted at `root_dir`. `endpoint_override` beats both
    /// the environment and the configuration file.
    pub fn initialize(root_dir: PathBuf, endpoint_override: Option<String>) -> WalletResult<Self> {
        let environment =
            std::env::var(ENVIRONMENT_ENV_VAR).unwrap_or_else(|_| "development".to_string());
        let paths = WalletPaths::new(&root_dir)?;
        paths.ensure_directories()?;

        let config_store = ConfigStore::from_paths(&paths);
        let config = config_store.load_or_default(environment.as_str())?;

        let endpoint = endpoint_override.unwrap_or_else(|| config.effective_endpoint());
        let client = BlockchainClient::new(
            endpoint,
            Duration::from_secs(config.network.request_timeout_secs.max(1)),
        )?;
        tracing::info!(endpoint = %client.base_url(), "using node endpoint");
        let crypto: Arc<dyn CryptoProvider> = Arc::new(NodeCryptoProvider::new(client, config.kdf));

        let storage = Arc::new(FileStorage::new(paths.storage_file()));
        let store: Arc<dyn WalletPersistence> = Arc::new(LocalWalletStore::new(
            storage,
            config.storage.wallets_key.clone(),
        ));

        tracing::info!(
            root = %paths.root_dir().display(),
            environment = %environment,
            "wallet context initialized"
        );

        Ok(Self {
            paths,
            config,
            crypto,
            store,
        })
    }

    pub fn paths(&self) -> &WalletPaths {
        &self.paths
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn crypto(&self) -> Arc<dyn CryptoProvider> {
        self.crypto.clone()
    }

    pub fn store(&self) -> Arc<dyn WalletPersistence> {
        self.store.clone()
    }

    /// Fresh managers sharing this context's providers.
    pub fn managers(&self) -> (WalletCollection, NewWalletFlow) {
        (
            WalletCollection::new(self.crypto(), self.store()),
            NewWalletFlow::new(self.crypto()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStorage, DEFAULT_WALLETS_KEY};
    use tempfile::TempDir;

    #[test]
    fn initialize_creates_layout_and_config() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("wallet-data");

        let context =
            WalletContext::initialize(root.clone(), Some("http://127.0.0.1:9".into())).unwrap();

        assert!(root.is_dir());
        assert!(context.paths().config_file().exists());
        assert_eq!(context.config().storage.wallets_key, DEFAULT_WALLETS_KEY);
    }

    #[test]
    fn managers_share_the_file_store() {
        let temp = TempDir::new().unwrap();
        let context =
            WalletContext::initialize(temp.path().to_path_buf(), Some("http://127.0.0.1:9".into()))
                .unwrap();
        let storage = FileStorage::new(context.paths().storage_file());
        storage
            .set_item(
                DEFAULT_WALLETS_KEY,
                r#"[{"address":"a1","encrypted":"e1"}]"#,
            )
            .unwrap();

        let (mut wallets, flow) = context.managers();
        wallets.initialize().unwrap();

        assert_eq!(wallets.len(), 1);
        assert!(!flow.is_drafting());
    }
}
