//! Text front end over the wallet managers.

pub mod app;
pub mod new_wallet_form;
pub mod wallet_view;

pub use app::{Intent, WalletApp};
pub use new_wallet_form::NewWalletForm;
pub use wallet_view::{KeyPanel, WalletView};
