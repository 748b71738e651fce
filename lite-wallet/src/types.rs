//! Wallet data model shared by the managers, the providers and the views.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

use crate::errors::{WalletError, WalletResult};

/// Hex-encoded private key held in zeroizing memory.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Zeroizing<String>);

impl PrivateKey {
    pub fn new(hex_key: impl Into<String>) -> Self {
        Self(Zeroizing::new(hex_key.into()))
    }

    /// Borrow the key text. Keep the borrow short.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Provider-defined encrypted private key. Opaque to everything but the
/// crypto provider that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedBlob(serde_json::Value);

impl EncryptedBlob {
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_json(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for EncryptedBlob {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Account balance in the chain's smallest unit (wei).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Balance(pub u128);

impl Balance {
    /// Parse a JSON-RPC hex quantity such as `0x1bc16d674ec80000`.
    pub fn from_hex_quantity(quantity: &str) -> WalletResult<Self> {
        let digits = quantity.strip_prefix("0x").ok_or_else(|| {
            WalletError::InvalidResponse(format!("Quantity is not 0x-prefixed: {}", quantity))
        })?;
        if digits.is_empty() {
            return Err(WalletError::InvalidResponse(
                "Quantity has no digits".to_string(),
            ));
        }
        u128::from_str_radix(digits, 16)
            .map(Balance)
            .map_err(|e| WalletError::InvalidResponse(format!("Invalid quantity {}: {}", quantity, e)))
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One wallet as the collection holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletRecord {
    pub address: String,
    pub balance: Option<Balance>,
    /// Present only while revealed. Never persisted.
    pub private_key: Option<PrivateKey>,
    pub encrypted: Option<EncryptedBlob>,
}

impl WalletRecord {
    /// A committed record that carries only its encrypted key.
    pub fn encrypted(address: impl Into<String>, encrypted: EncryptedBlob) -> Self {
        Self {
            address: address.into(),
            balance: None,
            private_key: None,
            encrypted: Some(encrypted),
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn with_private_key(&self, private_key: PrivateKey) -> Self {
        Self {
            private_key: Some(private_key),
            ..self.clone()
        }
    }

    pub fn without_private_key(&self) -> Self {
        Self {
            private_key: None,
            ..self.clone()
        }
    }

    pub fn with_balance(&self, balance: Balance) -> Self {
        Self {
            balance: Some(balance),
            ..self.clone()
        }
    }

    /// Serializable projection written to storage.
    pub fn to_persisted(&self) -> PersistedWallet {
        PersistedWallet {
            address: self.address.clone(),
            encrypted: self.encrypted.clone(),
        }
    }
}

/// Stored form of a wallet: address and encrypted key, nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedWallet {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<EncryptedBlob>,
}

impl From<PersistedWallet> for WalletRecord {
    fn from(persisted: PersistedWallet) -> Self {
        Self {
            address: persisted.address,
            balance: None,
            private_key: None,
            encrypted: persisted.encrypted,
        }
    }
}

/// Freshly generated key pair that has not been password protected yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftWallet {
    pub address: String,
    pub private_key: PrivateKey,
}
