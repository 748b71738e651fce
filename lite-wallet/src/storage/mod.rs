pub mod local_store;
pub mod paths;
pub mod wallet_store;

pub use local_store::{FileStorage, KeyValueStorage, MemoryStorage};
pub use paths::WalletPaths;
pub use wallet_store::{LocalWalletStore, WalletPersistence, DEFAULT_WALLETS_KEY};
