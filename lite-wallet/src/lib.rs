// lib.rs - Core library structure for the wallet

pub mod app_state;
pub mod blockchain_client;
pub mod config_store;
pub mod crypto;
pub mod errors;
pub mod new_wallet;
pub mod provider;
pub mod storage;
pub mod types;
pub mod ui;
pub mod wallets;

// Re-export common types
pub use app_state::WalletContext;
pub use blockchain_client::BlockchainClient;
pub use config_store::{ConfigStore, NetworkConfig, StorageConfig, WalletConfig};
pub use crypto::KdfSettings;
pub use errors::{WalletError, WalletResult};
pub use new_wallet::{FlowState, NewWalletFlow};
pub use provider::{CryptoProvider, NodeCryptoProvider};
pub use storage::{
    FileStorage, KeyValueStorage, LocalWalletStore, MemoryStorage, WalletPaths, WalletPersistence,
};
pub use types::{Balance, DraftWallet, EncryptedBlob, PersistedWallet, PrivateKey, WalletRecord};
pub use ui::{Intent, WalletApp};
pub use wallets::{RevealOutcome, WalletCollection, WRONG_PASSWORD_ERROR_MESSAGE};
