use secrecy::SecretString;

use crate::errors::WalletResult;
use crate::new_wallet::NewWalletFlow;
use crate::ui::new_wallet_form::NewWalletForm;
use crate::ui::wallet_view::{WalletView, BALANCE_ERROR};
use crate::wallets::{RevealOutcome, WalletCollection};

/// A user action, addressed to a wallet by its position in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    OpenPasswordPrompt(usize),
    ClosePasswordPrompt(usize),
    TypePassword(usize, String),
    SubmitPassword(usize),
    HidePrivateKey(usize),
    RequestBalance(usize),
    GenerateNewWallet,
    TypeNewWalletPassword(String),
    CreateNewWallet,
    CancelNewWallet,
}

/// Top-level screen: the wallet list followed by the creation form.
pub struct WalletApp {
    wallets: WalletCollection,
    flow: NewWalletFlow,
    views: Vec<WalletView>,
    form: NewWalletForm,
}

impl WalletApp {
    pub fn new(wallets: WalletCollection, flow: NewWalletFlow) -> Self {
        let mut app = Self {
            wallets,
            flow,
            views: Vec::new(),
            form: NewWalletForm::new(),
        };
        app.sync_views();
        app
    }

    /// Restore persisted wallets. Call once before the first render.
    pub fn initialize(&mut self) -> WalletResult<()> {
        self.wallets.initialize()?;
        self.sync_views();
        Ok(())
    }

    pub fn wallets(&self) -> &WalletCollection {
        &self.wallets
    }

    pub fn flow(&self) -> &NewWalletFlow {
        &self.flow
    }

    pub fn view(&self, index: usize) -> Option<&WalletView> {
        self.views.get(index)
    }

    pub async fn dispatch(&mut self, intent: Intent) -> WalletResult<()> {
        match intent {
            Intent::OpenPasswordPrompt(index) => {
                if let Some(view) = self.views.get_mut(index) {
                    view.open_prompt();
                }
            }
            Intent::ClosePasswordPrompt(index) => {
                if let Some(view) = self.views.get_mut(index) {
                    view.close_prompt();
                }
            }
            Intent::TypePassword(index, password) => {
                if let Some(view) = self.views.get_mut(index) {
                    view.type_password(&password);
                }
            }
            Intent::SubmitPassword(index) => {
                let Some(password) = self.views.get(index).and_then(WalletView::password) else {
                    return Ok(());
                };
                let password = SecretString::from(password.to_string());
                if self.wallets.reveal_private_key(index, &password) == RevealOutcome::Revealed {
                    self.views[index].close_prompt();
                }
            }
            Intent::HidePrivateKey(index) => {
                self.wallets.hide_private_key(index);
                if let Some(view) = self.views.get_mut(index) {
                    view.close_prompt();
                }
            }
            Intent::RequestBalance(index) => {
                let Some(view) = self.views.get_mut(index) else {
                    return Ok(());
                };
                if !view.start_balance_load() {
                    return Ok(());
                }
                let result = self.wallets.request_balance(index).await;
                let error = result.err().map(|_| BALANCE_ERROR.to_string());
                self.views[index].finish_balance_load(error);
            }
            Intent::GenerateNewWallet => {
                self.flow.begin()?;
            }
            Intent::TypeNewWalletPassword(password) => {
                self.form.type_password(&password);
            }
            Intent::CreateNewWallet => {
                let password = SecretString::from(self.form.password().to_string());
                let wallets = &mut self.wallets;
                let saved = self.flow.save(&password, |record| wallets.add_wallet(record));
                self.sync_views();
                if saved?.is_some() {
                    self.form.clear();
                }
            }
            Intent::CancelNewWallet => {
                self.form.clear();
                self.flow.cancel();
            }
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, (record, view)) in self.wallets.wallets().iter().zip(&self.views).enumerate() {
            out.push_str(&view.render(index, record, self.wallets.error_for(&record.address)));
        }
        out.push_str(&self.form.render(self.flow.draft()));
        out
    }

    fn sync_views(&mut self) {
        self.views.resize_with(self.wallets.len(), WalletView::new);
    }
}
