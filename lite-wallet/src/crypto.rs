//! Wallet key generation and password-based keystore encryption.
//!
//! Keys are secp256k1 with Ethereum-style addresses. Private keys are sealed
//! with AES-256-GCM under an Argon2id-derived key and serialized into a JSON
//! keystore that travels through the rest of the crate as an opaque
//! [`EncryptedBlob`].
use argon2::{Algorithm, Argon2, Params, Version};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::errors::{WalletError, WalletResult};
use crate::types::{DraftWallet, EncryptedBlob, PrivateKey};

const KEYSTORE_VERSION: u8 = 1;
const CIPHER_NAME: &str = "aes-256-gcm";
const KDF_NAME: &str = "argon2id";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const PRIVATE_KEY_LEN: usize = 32;

// Upper bounds on stored Argon2 costs.
const MAX_M_COST_KIB: u32 = 256 * 1024;
const MAX_T_COST: u32 = 10;
const MAX_P_COST: u32 = 16;

/// Argon2id cost parameters used when sealing new keystores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfSettings {
    pub m_cost_kib: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfSettings {
    fn default() -> Self {
        Self {
            m_cost_kib: 64 * 1024, // 64 MiB
            t_cost: 3,
            p_cost: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Keystore {
    version: u8,
    id: Uuid,
    address: String,
    crypto: KeystoreCrypto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeystoreCrypto {
    cipher: String,
    ciphertext: String,
    cipherparams: CipherParams,
    kdf: String,
    kdfparams: KdfParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CipherParams {
    nonce: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KdfParameters {
    m_cost_kib: u32,
    t_cost: u32,
    p_cost: u32,
    dklen: usize,
    salt: String,
}

/// Generate a fresh secp256k1 key pair from the OS RNG.
pub fn generate_key_pair() -> DraftWallet {
    let signing_key = SigningKey::random(&mut OsRng);
    let address = address_for(&signing_key);
    let private_key = encode_private_key(&signing_key);
    DraftWallet {
        address,
        private_key,
    }
}

/// Derive the `0x`-prefixed address of a hex private key.
pub fn address_from_private_key(private_key: &PrivateKey) -> WalletResult<String> {
    let signing_key = decode_private_key(private_key)?;
    Ok(address_for(&signing_key))
}

/// Seal a private key under `password`.
pub fn encrypt_private_key(
    password: &SecretString,
    private_key: &PrivateKey,
    settings: &KdfSettings,
) -> WalletResult<EncryptedBlob> {
    let signing_key = decode_private_key(private_key)?;
    let address = address_for(&signing_key);

    let mut rng = OsRng;
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let kdf = KdfParameters {
        m_cost_kib: settings.m_cost_kib,
        t_cost: settings.t_cost,
        p_cost: settings.p_cost,
        dklen: KEY_LEN,
        salt: hex::encode(salt),
    };
    let key = derive_key(password, &kdf, &salt)?;

    let plaintext = Zeroizing::new(signing_key.to_bytes().to_vec());
    let ciphertext = encrypt_aes_gcm(
        &key,
        Nonce::assume_unique_for_key(nonce_bytes),
        &plaintext,
    )?;

    let keystore = Keystore {
        version: KEYSTORE_VERSION,
        id: Uuid::new_v4(),
        address: address.trim_start_matches("0x").to_string(),
        crypto: KeystoreCrypto {
            cipher: CIPHER_NAME.to_string(),
            ciphertext: hex::encode(ciphertext),
            cipherparams: CipherParams {
                nonce: hex::encode(nonce_bytes),
            },
            kdf: KDF_NAME.to_string(),
            kdfparams: kdf,
        },
    };

    Ok(EncryptedBlob::from(serde_json::to_value(keystore)?))
}

/// Open a keystore blob with `password`.
///
/// A wrong password surfaces as [`WalletError::InvalidPassword`].
pub fn decrypt_private_key(
    password: &SecretString,
    blob: &EncryptedBlob,
) -> WalletResult<PrivateKey> {
    let keystore: Keystore = serde_json::from_value(blob.as_json().clone())?;
    if keystore.version != KEYSTORE_VERSION {
        return Err(WalletError::ValidationError(format!(
            "Unsupported keystore version: {}",
            keystore.version
        )));
    }
    if keystore.crypto.cipher != CIPHER_NAME || keystore.crypto.kdf != KDF_NAME {
        return Err(WalletError::ValidationError(format!(
            "Unsupported keystore scheme: {}/{}",
            keystore.crypto.kdf, keystore.crypto.cipher
        )));
    }

    let salt = decode_hex_field("salt", &keystore.crypto.kdfparams.salt)?;
    let nonce_bytes: [u8; NONCE_LEN] = decode_hex_field("nonce", &keystore.crypto.cipherparams.nonce)?
        .try_into()
        .map_err(|_| WalletError::ValidationError("Keystore nonce has wrong length".to_string()))?;
    let ciphertext = decode_hex_field("ciphertext", &keystore.crypto.ciphertext)?;

    let key = derive_key(password, &keystore.crypto.kdfparams, &salt)?;
    let plaintext = decrypt_aes_gcm(&key, Nonce::assume_unique_for_key(nonce_bytes), &ciphertext)?;

    let signing_key = SigningKey::from_slice(&plaintext)
        .map_err(|e| WalletError::InvalidKey(format!("Decrypted key is not valid: {e}")))?;
    let address = address_for(&signing_key);
    if !address
        .trim_start_matches("0x")
        .eq_ignore_ascii_case(&keystore.address)
    {
        return Err(WalletError::CryptoError(
            "Decrypted key does not match keystore address".to_string(),
        ));
    }

    Ok(encode_private_key(&signing_key))
}

fn address_for(signing_key: &SigningKey) -> String {
    let public_key = signing_key.verifying_key().to_encoded_point(false);
    let digest = Keccak256::digest(&public_key.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

fn encode_private_key(signing_key: &SigningKey) -> PrivateKey {
    let bytes = Zeroizing::new(signing_key.to_bytes().to_vec());
    PrivateKey::new(format!("0x{}", hex::encode(bytes.as_slice())))
}

fn decode_private_key(private_key: &PrivateKey) -> WalletResult<SigningKey> {
    let text = private_key.expose();
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let bytes = Zeroizing::new(
        hex::decode(digits).map_err(|e| WalletError::InvalidKey(format!("Invalid hex: {e}")))?,
    );
    if bytes.len() != PRIVATE_KEY_LEN {
        return Err(WalletError::InvalidKey(format!(
            "Expected {} bytes, got {}",
            PRIVATE_KEY_LEN,
            bytes.len()
        )));
    }
    SigningKey::from_slice(&bytes)
        .map_err(|e| WalletError::InvalidKey(format!("Not a secp256k1 scalar: {e}")))
}

fn decode_hex_field(name: &str, value: &str) -> WalletResult<Vec<u8>> {
    hex::decode(value)
        .map_err(|e| WalletError::ValidationError(format!("Keystore {name} is not hex: {e}")))
}

fn derive_key(
    password: &SecretString,
    params: &KdfParameters,
    salt: &[u8],
) -> WalletResult<Zeroizing<[u8; KEY_LEN]>> {
    if params.dklen != KEY_LEN {
        return Err(WalletError::ValidationError(format!(
            "Unsupported derived key length: {}",
            params.dklen
        )));
    }
    if params.m_cost_kib > MAX_M_COST_KIB
        || params.t_cost > MAX_T_COST
        || params.p_cost > MAX_P_COST
    {
        return Err(WalletError::ValidationError(format!(
            "KDF costs exceed limits: m_cost_kib={} t_cost={} p_cost={}",
            params.m_cost_kib, params.t_cost, params.p_cost
        )));
    }

    let argon_params = Params::new(params.m_cost_kib, params.t_cost, params.p_cost, Some(KEY_LEN))
        .map_err(|e| WalletError::CryptoError(format!("Invalid Argon2 params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password.expose_secret().as_bytes(), salt, key.as_mut())
        .map_err(|e| WalletError::CryptoError(format!("KDF failed: {e}")))?;
    Ok(key)
}

fn encrypt_aes_gcm(
    key: &Zeroizing<[u8; KEY_LEN]>,
    nonce: Nonce,
    plaintext: &[u8],
) -> WalletResult<Vec<u8>> {
    let unbound_key = UnboundKey::new(&aead::AES_256_GCM, key.as_ref())
        .map_err(|e| WalletError::CryptoError(format!("Invalid encryption key: {e}")))?;
    let key = LessSafeKey::new(unbound_key);

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| WalletError::CryptoError("Encryption failure".to_string()))?;
    Ok(in_out)
}

fn decrypt_aes_gcm(
    key: &Zeroizing<[u8; KEY_LEN]>,
    nonce: Nonce,
    ciphertext: &[u8],
) -> WalletResult<Zeroizing<Vec<u8>>> {
    let unbound_key = UnboundKey::new(&aead::AES_256_GCM, key.as_ref())
        .map_err(|e| WalletError::CryptoError(format!("Invalid encryption key: {e}")))?;
    let key = LessSafeKey::new(unbound_key);

    if ciphertext.len() < aead::AES_256_GCM.tag_len() {
        return Err(WalletError::ValidationError(
            "Ciphertext shorter than authentication tag".to_string(),
        ));
    }

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    // Tag mismatch means the password (or the blob) is wrong.
    let plaintext_len = key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| WalletError::InvalidPassword)?
        .len();
    in_out.truncate(plaintext_len);
    Ok(in_out)
}
